use ahash::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::PreProcessingError;

/// Fitted token → column mapping.
///
/// Built once from the training corpus and never modified afterwards. The
/// same value is handed by reference to every transform, so the train and
/// test matrices share one column layout. Serializes as the list of tokens in
/// column order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    tokens: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// `tokens` must be distinct; their position becomes the column index.
    pub(crate) fn from_tokens(tokens: Vec<String>) -> Result<Self, PreProcessingError> {
        let mut index = HashMap::default();
        for (idx, token) in tokens.iter().enumerate() {
            if index.insert(token.clone(), idx).is_some() {
                return Err(PreProcessingError::InvalidInput(format!(
                    "duplicate vocabulary token `{token}`"
                )));
            }
        }
        Ok(Self { tokens, index })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    /// Tokens in column order.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    #[must_use]
    pub fn token(&self, column: usize) -> Option<&str> {
        self.tokens.get(column).map(String::as_str)
    }
}

impl TryFrom<Vec<String>> for Vocabulary {
    type Error = PreProcessingError;

    fn try_from(tokens: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_tokens(tokens)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.tokens
    }
}
