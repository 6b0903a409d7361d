//! Text normalization.
//!
//! [`TextNormalizer`] applies a fixed chain of lossy transforms to every
//! document:
//!
//! 1. lowercase
//! 2. stop-word removal
//! 3. digit removal
//! 4. punctuation removal
//! 5. URL removal
//! 6. lemmatization
//!
//! The order is part of the contract. Corpus normalization may run rows in
//! parallel but always returns them in input order, labels untouched.

mod lemmatizer;
mod steps;
mod stopwords;

use indicatif::{ParallelProgressIterator, ProgressIterator};
use rayon::prelude::*;
use tracing::{debug, error};

pub use lemmatizer::{EnglishLemmatizer, LemmaError, Lemmatizer};
pub use steps::{
    PUNCTUATION, lemmatize, lower_case, remove_numbers, remove_punctuation, remove_stop_words,
    remove_urls,
};
pub use stopwords::{ENGLISH_STOP_WORDS, StopWords};

use super::parallel::{progress_bar_setup, should_use_parallel};
use crate::{
    corpus::{Corpus, Row},
    error::{NormalizationStep, PreProcessingError, Result},
};

pub struct TextNormalizer {
    stop_words: StopWords,
    lemmatizer: Box<dyn Lemmatizer>,
}

impl TextNormalizer {
    /// English stop words and the built-in English lemmatizer.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    #[must_use]
    pub fn builder() -> TextNormalizerBuilder {
        TextNormalizerBuilder::default()
    }

    /// Normalize a single document.
    ///
    /// Errors are reported against row 0; use [`TextNormalizer::normalize_row`]
    /// when the document belongs to a table.
    pub fn normalize(&self, document: &str) -> Result<String> {
        self.normalize_row(0, document)
    }

    /// Normalize the document at `row`, naming the row and step on failure.
    pub fn normalize_row(&self, row: usize, document: &str) -> Result<String> {
        let text = lower_case(document);
        let text = remove_stop_words(&text, &self.stop_words);
        let text = remove_numbers(&text);
        let text = remove_punctuation(&text);
        let text = remove_urls(&text);
        lemmatize(&text, self.lemmatizer.as_ref()).map_err(|e| {
            PreProcessingError::TransformFailure {
                row,
                step: NormalizationStep::Lemmatization,
                reason: e.to_string(),
            }
        })
    }

    fn normalize_corpus_row(&self, idx: usize, row: Row) -> Result<Row> {
        let document = row
            .document
            .as_deref()
            .map(|doc| self.normalize_row(idx, doc))
            .transpose()?;
        Ok(Row {
            document,
            label: row.label,
        })
    }

    /// Normalize every document of `corpus`, keeping row count and order.
    ///
    /// Rows already marked missing stay missing. Any failing row aborts the
    /// whole corpus; no partially normalized corpus is returned.
    pub fn normalize_corpus(&self, corpus: Corpus) -> Result<Corpus> {
        let num_rows = corpus.len();
        debug!(num_rows, "Normalizing corpus");

        let parallel = should_use_parallel(
            num_rows,
            corpus
                .rows()
                .iter()
                .map(|row| row.document.as_ref().map_or(0, String::len)),
        );
        let rows = corpus.into_iter().collect::<Vec<_>>();

        let normalized = if parallel {
            debug!(num_rows, "Using parallel normalization");
            let pb = progress_bar_setup(num_rows, "Normalizing texts in parallel");
            let result = rows
                .into_par_iter()
                .enumerate()
                .progress_with(pb.clone())
                .map(|(idx, row)| self.normalize_corpus_row(idx, row))
                .collect::<Result<Vec<_>>>();
            pb.finish_with_message("Parallel normalization complete");
            result
        } else {
            debug!(num_rows, "Using sequential normalization");
            let pb = progress_bar_setup(num_rows, "Normalizing texts");
            let result = rows
                .into_iter()
                .enumerate()
                .progress_with(pb.clone())
                .map(|(idx, row)| self.normalize_corpus_row(idx, row))
                .collect::<Result<Vec<_>>>();
            pb.finish_with_message("Normalization complete");
            result
        };

        let rows = normalized.inspect_err(|e| error!(error = %e, "Text normalization failed"))?;
        debug!(
            num_rows = rows.len(),
            steps = ?NormalizationStep::ORDER,
            "Text normalization completed"
        );
        Ok(rows.into_iter().collect())
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TextNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextNormalizer")
            .field("stop_words", &self.stop_words.len())
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct TextNormalizerBuilder {
    stop_words: Option<StopWords>,
    lemmatizer: Option<Box<dyn Lemmatizer>>,
}

impl TextNormalizerBuilder {
    #[must_use]
    pub fn stop_words(mut self, stop_words: StopWords) -> Self {
        self.stop_words = Some(stop_words);
        self
    }

    #[must_use]
    pub fn lemmatizer(mut self, lemmatizer: impl Lemmatizer + 'static) -> Self {
        self.lemmatizer = Some(Box::new(lemmatizer));
        self
    }

    #[must_use]
    pub fn build(self) -> TextNormalizer {
        TextNormalizer {
            stop_words: self.stop_words.unwrap_or_default(),
            lemmatizer: self
                .lemmatizer
                .unwrap_or_else(|| Box::new(EnglishLemmatizer::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingLemmatizer;

    impl Lemmatizer for FailingLemmatizer {
        fn lemmatize(&self, token: &str) -> Result<String, LemmaError> {
            if token == "boom" {
                Err(LemmaError("lemma table unavailable".to_string()))
            } else {
                Ok(token.to_string())
            }
        }
    }

    #[test]
    fn test_normalize_examples() {
        let normalizer = TextNormalizer::new();
        assert_eq!(
            normalizer.normalize("The cat runs 2 fast!!").unwrap(),
            "cat run fast"
        );
        assert_eq!(
            normalizer.normalize("Dogs bark loudly").unwrap(),
            "dog bark loudly"
        );
        assert_eq!(normalizer.normalize("Cats run").unwrap(), "cat run");
    }

    #[test]
    fn test_empty_and_stop_word_only_documents() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("").unwrap(), "");
        assert_eq!(normalizer.normalize("The and of IS").unwrap(), "");
    }

    #[test]
    fn test_digits_inside_tokens() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("abc123 xyz").unwrap(), "abc xyz");
    }

    #[test]
    fn test_custom_stop_words() {
        let normalizer = TextNormalizer::builder()
            .stop_words(StopWords::new(["cat"]))
            .build();
        assert_eq!(normalizer.normalize("the cat sat").unwrap(), "the sat");
    }

    #[test]
    fn test_failure_names_row_and_step() {
        let normalizer = TextNormalizer::builder()
            .lemmatizer(FailingLemmatizer)
            .build();
        let corpus: Corpus = [("fine words", "a"), ("big boom here", "b")]
            .into_iter()
            .collect();

        let err = normalizer.normalize_corpus(corpus).unwrap_err();
        match err {
            PreProcessingError::TransformFailure { row, step, .. } => {
                assert_eq!(row, 1);
                assert_eq!(step, NormalizationStep::Lemmatization);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_normalize_corpus_preserves_rows_and_labels() {
        let normalizer = TextNormalizer::new();
        let corpus: Corpus = [
            ("The cat runs 2 fast!!", "happy"),
            ("", "neutral"),
            ("Dogs bark loudly", "sad"),
        ]
        .into_iter()
        .collect();

        let normalized = normalizer.normalize_corpus(corpus).unwrap();
        assert_eq!(normalized.len(), 3);
        assert_eq!(normalized.labels(), vec!["happy", "neutral", "sad"]);
        assert_eq!(
            normalized.documents().unwrap(),
            vec!["cat run fast", "", "dog bark loudly"]
        );
    }

    #[test]
    fn test_parallel_path_keeps_order() {
        let normalizer = TextNormalizer::new();
        let corpus: Corpus = (0..250)
            .map(|i| (format!("Dogs {i} bark number{i}"), i.to_string()))
            .collect();

        let normalized = normalizer.normalize_corpus(corpus).unwrap();
        assert_eq!(normalized.len(), 250);
        for (i, row) in normalized.rows().iter().enumerate() {
            assert_eq!(row.label, i.to_string());
            assert_eq!(row.document.as_deref(), Some("dog bark number"));
        }
    }

    #[test]
    fn test_missing_rows_stay_missing() {
        let normalizer = TextNormalizer::new();
        let mut corpus: Corpus = [("one", "a"), ("cats dogs birds", "b")]
            .into_iter()
            .collect();
        corpus.mark_short_documents(3);

        let normalized = normalizer.normalize_corpus(corpus).unwrap();
        assert!(normalized.rows()[0].is_missing());
        assert_eq!(
            normalized.rows()[1].document.as_deref(),
            Some("cat dog bird")
        );
    }
}
