use serde::{Deserialize, Serialize};

use crate::error::{PreProcessingError, Result};

/// How token frequency is measured when ranking vocabulary candidates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyMode {
    /// Total occurrences across the training corpus.
    #[default]
    Term,
    /// Number of training documents containing the token.
    Document,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorizerParams {
    /// Upper bound on vocabulary size (number of feature columns).
    max_features: usize,
    frequency: FrequencyMode,
}

impl VectorizerParams {
    /// Fails with `InvalidParameter` when `max_features` is zero.
    pub fn new(max_features: usize) -> Result<Self> {
        if max_features == 0 {
            return Err(PreProcessingError::invalid_parameter(
                "max_features",
                max_features,
                "must be a positive integer",
            ));
        }
        Ok(Self {
            max_features,
            frequency: FrequencyMode::default(),
        })
    }

    #[must_use]
    pub fn with_frequency(mut self, frequency: FrequencyMode) -> Self {
        self.frequency = frequency;
        self
    }

    #[must_use]
    pub fn max_features(&self) -> usize {
        self.max_features
    }

    #[must_use]
    pub fn frequency(&self) -> FrequencyMode {
        self.frequency
    }
}

/// Accepts the signed value read from configuration so negative counts are
/// reported as `InvalidParameter` instead of being wrapped or clamped.
impl TryFrom<i64> for VectorizerParams {
    type Error = PreProcessingError;

    fn try_from(max_features: i64) -> Result<Self> {
        let max_features = usize::try_from(max_features).map_err(|_| {
            PreProcessingError::invalid_parameter(
                "max_features",
                max_features,
                "must be a positive integer",
            )
        })?;
        Self::new(max_features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_max_features_is_invalid() {
        let err = VectorizerParams::new(0).unwrap_err();
        assert!(matches!(
            err,
            PreProcessingError::InvalidParameter {
                name: "max_features",
                ..
            }
        ));
    }

    #[test]
    fn test_negative_max_features_is_invalid() {
        let err = VectorizerParams::try_from(-5).unwrap_err();
        assert!(err.to_string().contains("-5"));
    }

    #[test]
    fn test_defaults_to_term_frequency() {
        let params = VectorizerParams::new(10).unwrap();
        assert_eq!(params.max_features(), 10);
        assert_eq!(params.frequency(), FrequencyMode::Term);
        let params = params.with_frequency(FrequencyMode::Document);
        assert_eq!(params.frequency(), FrequencyMode::Document);
    }
}
