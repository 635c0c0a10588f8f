//! Catalog - the ordered questions of one document.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{InputType, Question};
use crate::domain::foundation::DocumentId;

/// Ordered questions of a document plus option lists for choice inputs.
///
/// An unknown document resolves to an empty catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    document_id: DocumentId,
    questions: Vec<Question>,
    options: HashMap<String, Vec<String>>,
}

/// A run of questions sharing a section label, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    pub title: &'a str,
    pub questions: Vec<&'a Question>,
}

impl Catalog {
    /// Builds a catalog, dropping meta questions handled by other views.
    pub fn new(
        document_id: DocumentId,
        questions: Vec<Question>,
        options: HashMap<String, Vec<String>>,
    ) -> Self {
        let questions = questions
            .into_iter()
            .filter(|q| !q.input_type.is_meta())
            .collect();
        Self {
            document_id,
            questions,
            options,
        }
    }

    /// Catalog with no questions.
    pub fn empty(document_id: DocumentId) -> Self {
        Self::new(document_id, Vec::new(), HashMap::new())
    }

    pub fn document_id(&self) -> DocumentId {
        self.document_id
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Looks up a question by field name.
    pub fn get(&self, field_name: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.field_name == field_name)
    }

    /// Options for a choice question, in configured order.
    pub fn options_for(&self, field_name: &str) -> &[String] {
        self.options
            .get(field_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Mandatory questions only.
    pub fn required(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(|q| q.required)
    }

    /// Groups questions by section, sections in first-appearance order.
    pub fn sections(&self) -> Vec<Section<'_>> {
        let mut sections: Vec<Section<'_>> = Vec::new();
        for question in &self.questions {
            match sections.iter_mut().find(|s| s.title == question.section) {
                Some(section) => section.questions.push(question),
                None => sections.push(Section {
                    title: &question.section,
                    questions: vec![question],
                }),
            }
        }
        sections
    }

    /// Signature grid questions with a day ordinal, ordered by day.
    pub fn signature_grid_days(&self) -> Vec<(u32, &Question)> {
        let mut days: Vec<(u32, &Question)> = self
            .questions
            .iter()
            .filter(|q| q.input_type == InputType::SignatureGrid)
            .filter_map(|q| q.day_ordinal().map(|day| (day, q)))
            .collect();
        days.sort_by_key(|(day, _)| *day);
        days
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::questionnaire::question::fixtures::question;

    fn in_section(mut q: Question, section: &str) -> Question {
        q.section = section.to_string();
        q
    }

    #[test]
    fn competency_grid_is_filtered_out() {
        let catalog = Catalog::new(
            DocumentId::new(1),
            vec![
                question("name", InputType::Text, true),
                question("competencies", InputType::CompetencyGrid, true),
            ],
            HashMap::new(),
        );
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("competencies").is_none());
    }

    #[test]
    fn sections_preserve_first_appearance_order() {
        let catalog = Catalog::new(
            DocumentId::new(1),
            vec![
                in_section(question("a", InputType::Text, false), "Intro"),
                in_section(question("b", InputType::Text, false), "Safety"),
                in_section(question("c", InputType::Text, false), "Intro"),
            ],
            HashMap::new(),
        );

        let sections = catalog.sections();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Intro");
        assert_eq!(
            sections[0].questions.iter().map(|q| q.field_name.as_str()).collect::<Vec<_>>(),
            vec!["a", "c"]
        );
        assert_eq!(sections[1].title, "Safety");
    }

    #[test]
    fn required_filters_mandatory_questions() {
        let catalog = Catalog::new(
            DocumentId::new(1),
            vec![
                question("a", InputType::Text, true),
                question("b", InputType::Text, false),
            ],
            HashMap::new(),
        );
        let required: Vec<_> = catalog.required().map(|q| q.field_name.as_str()).collect();
        assert_eq!(required, vec!["a"]);
    }

    #[test]
    fn signature_grid_days_are_sorted_by_ordinal() {
        let catalog = Catalog::new(
            DocumentId::new(1),
            vec![
                question("day_3_sign", InputType::SignatureGrid, true),
                question("day_1_sign", InputType::SignatureGrid, true),
                question("notes", InputType::Text, false),
                question("day_2_sign", InputType::SignatureGrid, true),
            ],
            HashMap::new(),
        );
        let days: Vec<u32> = catalog.signature_grid_days().iter().map(|(d, _)| *d).collect();
        assert_eq!(days, vec![1, 2, 3]);
    }

    #[test]
    fn options_default_to_empty() {
        let mut options = HashMap::new();
        options.insert("level".to_string(), vec!["Pass".to_string(), "Fail".to_string()]);
        let catalog = Catalog::new(
            DocumentId::new(1),
            vec![question("level", InputType::Dropdown, true)],
            options,
        );
        assert_eq!(catalog.options_for("level"), ["Pass".to_string(), "Fail".to_string()]);
        assert!(catalog.options_for("missing").is_empty());
    }
}
