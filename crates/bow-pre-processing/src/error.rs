use std::fmt;

use thiserror::Error;

/// Step of the normalization chain, in the order the steps are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalizationStep {
    LowerCase,
    StopWords,
    Numbers,
    Punctuation,
    Urls,
    Lemmatization,
}

impl NormalizationStep {
    /// All steps in application order.
    pub const ORDER: [Self; 6] = [
        Self::LowerCase,
        Self::StopWords,
        Self::Numbers,
        Self::Punctuation,
        Self::Urls,
        Self::Lemmatization,
    ];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::LowerCase => "lower_case",
            Self::StopWords => "remove_stop_words",
            Self::Numbers => "remove_numbers",
            Self::Punctuation => "remove_punctuation",
            Self::Urls => "remove_urls",
            Self::Lemmatization => "lemmatization",
        }
    }
}

impl fmt::Display for NormalizationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised while cleaning or vectorizing a corpus.
///
/// Every variant is fatal for the run: nothing here is retried or skipped.
#[derive(Debug, Error)]
pub enum PreProcessingError {
    /// Source table is malformed or lacks a required column.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A configuration value is out of range.
    #[error("invalid parameter `{name}` = {value}: {constraint}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        constraint: &'static str,
    },

    /// Fitting produced no usable tokens.
    #[error("vocabulary is empty after examining {rows_examined} training documents")]
    EmptyVocabulary { rows_examined: usize },

    /// A normalization step failed for one row.
    #[error("normalization step `{step}` failed on row {row}: {reason}")]
    TransformFailure {
        row: usize,
        step: NormalizationStep,
        reason: String,
    },
}

impl PreProcessingError {
    pub(crate) fn invalid_parameter(
        name: &'static str,
        value: impl fmt::Display,
        constraint: &'static str,
    ) -> Self {
        Self::InvalidParameter {
            name,
            value: value.to_string(),
            constraint,
        }
    }
}

pub type Result<T, E = PreProcessingError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_failure_names_row_and_step() {
        let err = PreProcessingError::TransformFailure {
            row: 7,
            step: NormalizationStep::Lemmatization,
            reason: "lemma table unavailable".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("row 7"));
        assert!(msg.contains("lemmatization"));
    }

    #[test]
    fn test_empty_vocabulary_reports_row_count() {
        let err = PreProcessingError::EmptyVocabulary { rows_examined: 0 };
        assert!(err.to_string().contains("0 training documents"));
    }

    #[test]
    fn test_step_order_starts_with_lower_case() {
        assert_eq!(NormalizationStep::ORDER[0], NormalizationStep::LowerCase);
        assert_eq!(
            NormalizationStep::ORDER[5],
            NormalizationStep::Lemmatization
        );
    }
}
