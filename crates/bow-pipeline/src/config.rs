//! `params.yaml` loading and validation.
//!
//! Only `feature.max_features` is required; every other key has a default.
//!
//! ```yaml
//! feature:
//!   max_features: 50
//!   frequency: term          # term | document
//! preprocessing:
//!   text_column: content
//!   label_column: sentiment
//! filter:
//!   short_documents: disabled  # disabled | before_fit | after_fit
//!   min_tokens: 3
//! model:
//!   alpha: 1.0
//! ```

use std::path::Path;

use bow_pre_processing::{
    DEFAULT_MIN_TOKENS, PreProcessingError,
    pre_processor::{FrequencyMode, VectorizerParams},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Params {
    pub feature: FeatureParams,
    #[serde(default)]
    pub preprocessing: PreprocessingParams,
    #[serde(default)]
    pub filter: FilterParams,
    #[serde(default)]
    pub model: ModelParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureParams {
    /// Signed so that a negative value reaches validation instead of failing
    /// to parse.
    pub max_features: i64,
    #[serde(default)]
    pub frequency: FrequencyMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingParams {
    pub text_column: String,
    pub label_column: String,
}

impl Default for PreprocessingParams {
    fn default() -> Self {
        Self {
            text_column: "content".to_string(),
            label_column: "sentiment".to_string(),
        }
    }
}

/// Where the short-document filter runs relative to vocabulary fitting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortDocumentFilter {
    /// Keep every row.
    #[default]
    Disabled,
    /// Drop short rows while preprocessing; they never reach the vocabulary.
    BeforeFit,
    /// Fit on every training row, then drop short rows from both feature tables.
    AfterFit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    pub short_documents: ShortDocumentFilter,
    pub min_tokens: usize,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            short_documents: ShortDocumentFilter::default(),
            min_tokens: DEFAULT_MIN_TOKENS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    /// Additive (Laplace) smoothing for the naive Bayes classifier.
    pub alpha: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self { alpha: 1.0 }
    }
}

impl Params {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let params: Self = serde_yaml::from_str(yaml)?;
        params.validate()?;
        Ok(params)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)?;
        let params = Self::from_yaml_str(&yaml)?;
        debug!(path = %path.display(), "Parameters retrieved");
        Ok(params)
    }

    /// Reject out-of-range values. Nothing is clamped.
    pub fn validate(&self) -> Result<()> {
        self.vectorizer_params()?;

        let columns = &self.preprocessing;
        if columns.text_column.is_empty() || columns.label_column.is_empty() {
            return Err(invalid(
                "preprocessing",
                format!("{}/{}", columns.text_column, columns.label_column),
                "column names must not be empty",
            ));
        }
        if columns.text_column == columns.label_column {
            return Err(invalid(
                "preprocessing.label_column",
                &columns.label_column,
                "must differ from text_column",
            ));
        }
        if !(self.model.alpha.is_finite() && self.model.alpha > 0.0) {
            return Err(invalid(
                "model.alpha",
                self.model.alpha,
                "must be a positive finite number",
            ));
        }
        Ok(())
    }

    pub fn vectorizer_params(&self) -> Result<VectorizerParams> {
        let params = VectorizerParams::try_from(self.feature.max_features)?;
        Ok(params.with_frequency(self.feature.frequency))
    }
}

fn invalid(
    name: &'static str,
    value: impl std::fmt::Display,
    constraint: &'static str,
) -> PipelineError {
    PreProcessingError::InvalidParameter {
        name,
        value: value.to_string(),
        constraint,
    }
    .into()
}
