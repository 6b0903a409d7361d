//! Text normalization and bag-of-words vectorization.
//!
//! ```rust
//! use bow_pre_processing::pre_processor::{CountVectorizer, TextNormalizer, VectorizerParams};
//!
//! let normalizer = TextNormalizer::new();
//! let train = ["The cat runs 2 fast!!", "Dogs bark loudly"]
//!     .iter()
//!     .map(|doc| normalizer.normalize(doc))
//!     .collect::<Result<Vec<_>, _>>()?;
//! let test = vec![normalizer.normalize("Cats run")?];
//!
//! let vectorizer = CountVectorizer::new(VectorizerParams::new(10)?);
//! let splits = vectorizer.fit_transform(&train, &test)?;
//! assert_eq!(splits.train.cols(), splits.test.cols());
//! # Ok::<(), bow_pre_processing::PreProcessingError>(())
//! ```

mod corpus;
mod error;
pub mod pre_processor;

pub use corpus::{Corpus, Row};
pub use error::{NormalizationStep, PreProcessingError, Result};

/// Documents with fewer whitespace tokens than this are short-document
/// filter candidates.
pub const DEFAULT_MIN_TOKENS: usize = 3;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pre_processor::{CountVectorizer, TextNormalizer, VectorizerParams};

    fn corpus(rows: &[(&str, &str)]) -> Corpus {
        rows.iter().copied().collect()
    }

    #[test]
    fn test_end_to_end_train_test_alignment() {
        let normalizer = TextNormalizer::new();
        let train = normalizer
            .normalize_corpus(corpus(&[
                ("The cat runs 2 fast!!", "happy"),
                ("Dogs bark loudly", "sad"),
            ]))
            .unwrap();
        let test = normalizer
            .normalize_corpus(corpus(&[("Cats run", "happy")]))
            .unwrap();
        assert_eq!(
            train.documents().unwrap(),
            vec!["cat run fast", "dog bark loudly"]
        );

        let vectorizer = CountVectorizer::new(VectorizerParams::new(10).unwrap());
        let splits = vectorizer
            .fit_transform(&train.documents().unwrap(), &test.documents().unwrap())
            .unwrap();

        assert_eq!(splits.vocabulary.len(), 6);
        assert_eq!(splits.train.cols(), splits.test.cols());

        let dense = splits.test.to_dense();
        for token in ["cat", "run"] {
            let col = splits.vocabulary.index_of(token).unwrap();
            assert_eq!(dense[[0, col]], 1);
        }
        assert_eq!(dense.row(0).sum(), 2);
    }

    #[test]
    fn test_short_filter_keeps_documents_and_labels_aligned() {
        let normalizer = TextNormalizer::new();
        let mut normalized = normalizer
            .normalize_corpus(corpus(&[
                ("The cat runs 2 fast!!", "happy"),
                ("Dogs bark", "sad"),
                ("the of and", "neutral"),
                ("Birds sing every morning", "happy"),
            ]))
            .unwrap();
        assert_eq!(normalized.len(), 4);

        normalized.mark_short_documents(DEFAULT_MIN_TOKENS);
        assert_eq!(normalized.len(), 4);

        let (docs, labels) = normalized.drop_missing().into_parts();
        assert_eq!(docs, vec!["cat run fast", "bird sing every morning"]);
        assert_eq!(labels, vec!["happy", "happy"]);
    }

    #[test]
    fn test_test_split_never_adds_columns() {
        let vectorizer = CountVectorizer::new(VectorizerParams::new(50).unwrap());
        let train = ["alpha beta", "beta gamma"];
        let vocabulary = vectorizer.fit(&train).unwrap();

        let train_matrix = CountVectorizer::transform(&train, &vocabulary);
        let test_matrix =
            CountVectorizer::transform(&["delta epsilon alpha", "", "zeta"], &vocabulary);
        assert_eq!(train_matrix.cols(), test_matrix.cols());
        assert_eq!(vocabulary.len(), 3);
    }
}
