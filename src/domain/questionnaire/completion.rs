//! Completion rules - how far through its mandatory questions a document is.

use super::{InputType, Question, Response, ResponseMap, ResponseValue};
use crate::domain::foundation::Percentage;

/// Evaluates one required question against its response.
///
/// The stored `completed` flag is authoritative when set. Otherwise the
/// value itself is inspected, which reconciles rows written before the
/// flag existed or flagged inconsistently.
pub fn is_question_complete(question: &Question, response: Option<&Response>) -> bool {
    let Some(response) = response else {
        return false;
    };
    if response.completed {
        return true;
    }
    match (question.input_type, &response.value) {
        (InputType::Upload, ResponseValue::Files(files)) if question.allow_multiple => {
            !files.is_empty()
        }
        (InputType::Upload, ResponseValue::Text(file)) => !file.trim().is_empty(),
        (_, value) => !value.string_form().trim().is_empty(),
    }
}

/// Snapshot of mandatory-question completion for one document instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSummary {
    required: usize,
    completed: usize,
    incomplete_fields: Vec<String>,
}

impl CompletionSummary {
    /// Evaluates every required question in `questions`; optional ones are ignored.
    pub fn evaluate<'a>(
        questions: impl IntoIterator<Item = &'a Question>,
        responses: &ResponseMap,
    ) -> Self {
        let mut required = 0;
        let mut completed = 0;
        let mut incomplete_fields = Vec::new();

        for question in questions.into_iter().filter(|q| q.required) {
            required += 1;
            if is_question_complete(question, responses.get(&question.field_name)) {
                completed += 1;
            } else {
                incomplete_fields.push(question.field_name.clone());
            }
        }

        Self {
            required,
            completed,
            incomplete_fields,
        }
    }

    pub fn required_count(&self) -> usize {
        self.required
    }

    pub fn completed_count(&self) -> usize {
        self.completed
    }

    /// Required fields still outstanding, in catalog order.
    pub fn incomplete_fields(&self) -> &[String] {
        &self.incomplete_fields
    }

    /// Rounded percentage; a document with nothing required is complete.
    pub fn percentage(&self) -> Percentage {
        Percentage::from_ratio(self.completed, self.required)
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.required
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::TraineeId;
    use crate::domain::questionnaire::question::fixtures::question;
    use crate::domain::questionnaire::{GridCell, TraineeGrid, TriState};

    fn response(value: ResponseValue, completed: bool) -> Response {
        Response {
            value,
            completed,
            comments: String::new(),
        }
    }

    fn text(s: &str) -> ResponseValue {
        ResponseValue::Text(s.to_string())
    }

    fn multi_upload() -> Question {
        let mut q = question("evidence", InputType::Upload, true);
        q.allow_multiple = true;
        q
    }

    #[test]
    fn completed_flag_wins_over_blank_value() {
        let q = question("name", InputType::Text, true);
        assert!(is_question_complete(&q, Some(&response(text(""), true))));
    }

    #[test]
    fn missing_response_is_incomplete() {
        let q = question("name", InputType::Text, true);
        assert!(!is_question_complete(&q, None));
    }

    #[test]
    fn whitespace_text_is_incomplete() {
        let q = question("name", InputType::Text, true);
        assert!(!is_question_complete(&q, Some(&response(text("   "), false))));
        assert!(is_question_complete(&q, Some(&response(text("Ann"), false))));
    }

    #[test]
    fn multi_upload_needs_at_least_one_file() {
        let q = multi_upload();
        assert!(!is_question_complete(&q, Some(&response(ResponseValue::Files(vec![]), false))));
        assert!(is_question_complete(
            &q,
            Some(&response(ResponseValue::Files(vec!["f1.pdf".to_string()]), false))
        ));
    }

    #[test]
    fn single_upload_needs_a_file_name() {
        let q = question("cert", InputType::Upload, true);
        assert!(!is_question_complete(&q, Some(&response(text(" "), false))));
        assert!(is_question_complete(&q, Some(&response(text("cert.pdf"), false))));
    }

    #[test]
    fn explicit_false_checkbox_counts_as_answered() {
        let q = question("confirm", InputType::Checkbox, true);
        let unticked = ResponseValue::decode(&q, "false").unwrap();
        let blank = ResponseValue::decode(&q, "").unwrap();

        assert!(is_question_complete(&q, Some(&response(unticked, false))));
        assert!(!is_question_complete(&q, Some(&response(blank, false))));
    }

    #[test]
    fn neutral_toggle_and_empty_grid_are_incomplete() {
        let toggle = question("agree", InputType::YesNo, true);
        assert!(!is_question_complete(
            &toggle,
            Some(&response(ResponseValue::TriState(TriState::Neutral), false))
        ));
        assert!(is_question_complete(
            &toggle,
            Some(&response(ResponseValue::TriState(TriState::No), false))
        ));

        let grid_q = question("day_1", InputType::SignatureGrid, true);
        assert!(!is_question_complete(
            &grid_q,
            Some(&response(ResponseValue::Grid(TraineeGrid::new()), false))
        ));
        let mut grid = TraineeGrid::new();
        grid.insert(TraineeId::new(1), GridCell::skip());
        assert!(is_question_complete(&grid_q, Some(&response(ResponseValue::Grid(grid), false))));
    }

    #[test]
    fn no_required_questions_is_vacuously_complete() {
        let questions = vec![
            question("a", InputType::Text, false),
            question("b", InputType::Text, false),
        ];
        let summary = CompletionSummary::evaluate(&questions, &ResponseMap::new());
        assert_eq!(summary.required_count(), 0);
        assert_eq!(summary.percentage(), Percentage::HUNDRED);
        assert!(summary.is_complete());
    }

    #[test]
    fn three_of_seven_rounds_to_43() {
        let questions: Vec<Question> = (0..7)
            .map(|i| question(&format!("q{}", i), InputType::Text, true))
            .collect();
        let mut responses = ResponseMap::new();
        for (i, q) in questions.iter().enumerate() {
            let value = if i < 3 { text("done") } else { text("") };
            responses.insert(q.field_name.clone(), response(value, false));
        }

        let summary = CompletionSummary::evaluate(&questions, &responses);
        assert_eq!(summary.completed_count(), 3);
        assert_eq!(summary.percentage().value(), 43);
        assert_eq!(summary.incomplete_fields(), ["q3", "q4", "q5", "q6"]);
    }

    #[test]
    fn optional_questions_do_not_count() {
        let questions = vec![
            question("req", InputType::Text, true),
            question("opt", InputType::Text, false),
        ];
        let mut responses = ResponseMap::new();
        responses.insert("req".to_string(), response(text("yes"), false));
        let summary = CompletionSummary::evaluate(&questions, &responses);
        assert_eq!(summary.percentage(), Percentage::HUNDRED);
    }
}
