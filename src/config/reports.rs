//! Report output configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Serialization used for written reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Yaml,
}

impl ReportFormat {
    /// File extension for this format, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Yaml => "yaml",
        }
    }
}

/// Where and how document reports are written.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportsConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    #[serde(default)]
    pub format: ReportFormat,
}

impl ReportsConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.output_dir.trim().is_empty() {
            return Err(ValidationError::MissingRequired("REPORTS__OUTPUT_DIR"));
        }
        Ok(())
    }
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            format: ReportFormat::default(),
        }
    }
}

fn default_output_dir() -> String {
    "reports".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_defaults() {
        let config = ReportsConfig::default();
        assert_eq!(config.output_dir, "reports");
        assert_eq!(config.format, ReportFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_format_extensions() {
        assert_eq!(ReportFormat::Json.extension(), "json");
        assert_eq!(ReportFormat::Yaml.extension(), "yaml");
    }

    #[test]
    fn test_format_deserializes_lowercase() {
        let format: ReportFormat = serde_json::from_str("\"yaml\"").unwrap();
        assert_eq!(format, ReportFormat::Yaml);
    }

    #[test]
    fn test_empty_output_dir_rejected() {
        let config = ReportsConfig {
            output_dir: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
