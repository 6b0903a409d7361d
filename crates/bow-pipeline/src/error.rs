use bow_pre_processing::PreProcessingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    PreProcessing(#[from] PreProcessingError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Feature table does not have the column layout the model was fitted on.
    #[error("feature schema mismatch: expected {expected} feature columns, found {found}")]
    SchemaMismatch { expected: usize, found: usize },

    /// Probability columns do not line up with the label set.
    #[error("probabilities cover {found} classes but the labels contain {expected}")]
    ClassCountMismatch { expected: usize, found: usize },

    #[error("AUC is undefined: {0}")]
    UndefinedAuc(String),

    #[error("model error: {0}")]
    Model(String),
}

impl PipelineError {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::PreProcessing(PreProcessingError::InvalidInput(message.into()))
    }
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
