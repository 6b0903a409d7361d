use ahash::HashMap;
use dashmap::DashMap;
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;
use sprs::CsMat;
use tracing::{debug, error};

use super::{
    params::{FrequencyMode, VectorizerParams},
    tokenizer,
    vocabulary::Vocabulary,
};
use crate::{
    error::{PreProcessingError, Result},
    pre_processor::parallel::progress_bar_setup,
};

/// Integer term-count matrix in CSR layout, one row per document.
pub type CountMatrix = CsMat<u64>;

/// Ranking statistics for one candidate token.
#[derive(Clone, Copy, Debug)]
struct TokenStats {
    frequency: usize,
    /// `(row, position)` of the token's first occurrence.
    first_seen: (usize, usize),
}

/// Output of [`CountVectorizer::fit_transform`].
#[derive(Clone, Debug)]
pub struct FittedSplits {
    pub vocabulary: Vocabulary,
    pub train: CountMatrix,
    pub test: CountMatrix,
}

#[derive(Clone, Debug)]
pub struct CountVectorizer {
    params: VectorizerParams,
}

impl CountVectorizer {
    #[must_use]
    pub fn new(params: VectorizerParams) -> Self {
        Self { params }
    }

    #[must_use]
    pub fn params(&self) -> &VectorizerParams {
        &self.params
    }

    /// Build a vocabulary of at most `max_features` tokens from `texts`.
    ///
    /// Tokens are ranked by frequency; ties go to the token seen first. The
    /// selected tokens are then laid out in lexicographic order, which fixes
    /// the column index of each one.
    pub fn fit<T: AsRef<str> + Sync>(&self, texts: &[T]) -> Result<Vocabulary> {
        debug!(num_texts = texts.len(), "Fitting CountVectorizer");
        let tokenized_texts = tokenizer::tokenize(texts);
        self.fit_from_tokenized(&tokenized_texts)
    }

    fn fit_from_tokenized(&self, tokenized_texts: &[Vec<&str>]) -> Result<Vocabulary> {
        debug!(
            frequency = ?self.params.frequency(),
            "Counting token frequencies"
        );
        let stats = count_tokens(tokenized_texts, self.params.frequency());
        let candidates = stats.len();

        let mut ranked = stats.into_iter().collect::<Vec<_>>();
        ranked.sort_unstable_by(|(_, a), (_, b)| {
            b.frequency
                .cmp(&a.frequency)
                .then_with(|| a.first_seen.cmp(&b.first_seen))
        });
        ranked.truncate(self.params.max_features());

        let mut tokens = ranked
            .into_iter()
            .map(|(token, _)| token.to_string())
            .collect::<Vec<_>>();
        tokens.sort_unstable();

        if tokens.is_empty() {
            let err = PreProcessingError::EmptyVocabulary {
                rows_examined: tokenized_texts.len(),
            };
            error!(error = %err, "Vocabulary fitting failed");
            return Err(err);
        }

        let vocabulary = Vocabulary::from_tokens(tokens)?;
        debug!(
            candidates,
            vocab_size = vocabulary.len(),
            max_features = self.params.max_features(),
            "CountVectorizer fitting complete"
        );
        Ok(vocabulary)
    }

    /// Count vocabulary tokens in each text.
    ///
    /// Row `i` holds the counts for `texts[i]`; tokens outside the vocabulary
    /// are ignored and an empty text yields an all-zero row.
    pub fn transform<T: AsRef<str> + Sync>(texts: &[T], vocabulary: &Vocabulary) -> CountMatrix {
        debug!(
            num_texts = texts.len(),
            vocab_size = vocabulary.len(),
            "Transforming texts using CountVectorizer"
        );
        let tokenized_texts = tokenizer::tokenize(texts);
        Self::transform_from_tokenized(&tokenized_texts, vocabulary)
    }

    fn transform_from_tokenized(
        tokenized_texts: &[Vec<&str>],
        vocabulary: &Vocabulary,
    ) -> CountMatrix {
        let rows = tokenized_texts
            .par_iter()
            .map(|tokens| count_row(tokens, vocabulary))
            .collect::<Vec<_>>();

        // Build CSR format directly
        let mut indptr = Vec::with_capacity(rows.len() + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);
        for row in rows {
            for (col_idx, count) in row {
                indices.push(col_idx);
                data.push(count);
            }
            indptr.push(indices.len());
        }

        debug!(
            non_zero_entries = data.len(),
            "Text transformation complete"
        );
        CsMat::new(
            (tokenized_texts.len(), vocabulary.len()),
            indptr,
            indices,
            data,
        )
    }

    /// Fit on `train` only, then transform both splits with that vocabulary.
    ///
    /// The training texts are tokenized once and reused for both steps.
    pub fn fit_transform<T, U>(&self, train: &[T], test: &[U]) -> Result<FittedSplits>
    where
        T: AsRef<str> + Sync,
        U: AsRef<str> + Sync,
    {
        debug!(
            num_train = train.len(),
            num_test = test.len(),
            "fit_transform: fitting on the training split only"
        );
        let tokenized_train = tokenizer::tokenize(train);
        let vocabulary = self.fit_from_tokenized(&tokenized_train)?;

        let train = Self::transform_from_tokenized(&tokenized_train, &vocabulary);
        let test = Self::transform(test, &vocabulary);
        debug_assert_eq!(train.cols(), test.cols());

        Ok(FittedSplits {
            vocabulary,
            train,
            test,
        })
    }
}

fn count_row(tokens: &[&str], vocabulary: &Vocabulary) -> Vec<(usize, u64)> {
    let mut counts: HashMap<usize, u64> = HashMap::default();
    for token in tokens {
        if let Some(col_idx) = vocabulary.index_of(token) {
            *counts.entry(col_idx).or_insert(0) += 1;
        }
    }
    let mut row_entries = counts.into_iter().collect::<Vec<_>>();
    row_entries.sort_unstable_by_key(|(col_idx, _)| *col_idx);
    row_entries
}

/// Both the frequency sum and the earliest `(row, position)` are independent
/// of the order rows are visited in, so the parallel count is deterministic.
fn count_tokens<'a>(
    tokenized_texts: &[Vec<&'a str>],
    mode: FrequencyMode,
) -> DashMap<&'a str, TokenStats, ahash::RandomState> {
    let stats = DashMap::with_hasher(ahash::RandomState::default());
    let pb = progress_bar_setup(tokenized_texts.len(), "Building vocabulary");

    tokenized_texts
        .par_iter()
        .enumerate()
        .progress_with(pb.clone())
        .for_each(|(row, tokens)| {
            let mut seen_in_row = ahash::HashSet::default();
            for (position, &token) in tokens.iter().enumerate() {
                let first_in_row = seen_in_row.insert(token);
                let increment = match mode {
                    FrequencyMode::Term => 1,
                    FrequencyMode::Document => usize::from(first_in_row),
                };
                stats
                    .entry(token)
                    .and_modify(|entry: &mut TokenStats| {
                        entry.frequency += increment;
                        entry.first_seen = entry.first_seen.min((row, position));
                    })
                    .or_insert(TokenStats {
                        frequency: increment,
                        first_seen: (row, position),
                    });
            }
        });

    pb.finish_with_message("Vocabulary counted");
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vectorizer(max_features: usize) -> CountVectorizer {
        CountVectorizer::new(VectorizerParams::new(max_features).unwrap())
    }

    fn dense_row(matrix: &CountMatrix, row: usize) -> Vec<u64> {
        let dense = matrix.to_dense();
        dense.row(row).to_vec()
    }

    #[test]
    fn test_fit_lays_out_tokens_lexicographically() {
        let vocabulary = vectorizer(10)
            .fit(&["cat run fast", "dog bark loudly"])
            .unwrap();
        assert_eq!(
            vocabulary.tokens(),
            &["bark", "cat", "dog", "fast", "loudly", "run"]
        );
    }

    #[test]
    fn test_fit_keeps_most_frequent_tokens() {
        let vocabulary = vectorizer(2)
            .fit(&["zebra apple apple", "zebra mango apple", "kiwi"])
            .unwrap();
        assert_eq!(vocabulary.tokens(), &["apple", "zebra"]);
    }

    #[test]
    fn test_fit_breaks_ties_by_first_occurrence() {
        // every token appears once; the first two encountered win
        let vocabulary = vectorizer(2).fit(&["pear fig", "apple"]).unwrap();
        assert_eq!(vocabulary.tokens(), &["fig", "pear"]);

        let vocabulary = vectorizer(2).fit(&["apple", "pear fig"]).unwrap();
        assert_eq!(vocabulary.tokens(), &["apple", "pear"]);
    }

    #[test]
    fn test_document_frequency_mode() {
        let texts = ["spam spam spam spam", "ham egg", "ham egg"];
        let params = VectorizerParams::new(2)
            .unwrap()
            .with_frequency(FrequencyMode::Document);
        let vocabulary = CountVectorizer::new(params).fit(&texts).unwrap();
        assert_eq!(vocabulary.tokens(), &["egg", "ham"]);

        let vocabulary = vectorizer(1).fit(&texts).unwrap();
        assert_eq!(vocabulary.tokens(), &["spam"]);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let texts = (0..500)
            .map(|i| format!("w{} w{} common", i % 37, i % 11))
            .collect::<Vec<_>>();
        let first = vectorizer(15).fit(&texts).unwrap();
        for _ in 0..5 {
            assert_eq!(vectorizer(15).fit(&texts).unwrap(), first);
        }
    }

    #[test]
    fn test_empty_training_corpus() {
        let texts: [&str; 0] = [];
        let err = vectorizer(100).fit(&texts).unwrap_err();
        assert!(matches!(
            err,
            PreProcessingError::EmptyVocabulary { rows_examined: 0 }
        ));
    }

    #[test]
    fn test_all_empty_documents() {
        let err = vectorizer(100).fit(&["", "  "]).unwrap_err();
        assert!(matches!(
            err,
            PreProcessingError::EmptyVocabulary { rows_examined: 2 }
        ));
    }

    #[test]
    fn test_transform_counts_and_zero_rows() {
        let vocabulary = vectorizer(10).fit(&["a b", "c"]).unwrap();
        let matrix = CountVectorizer::transform(&["", "a a a"], &vocabulary);

        assert_eq!(matrix.shape(), (2, 3));
        assert_eq!(dense_row(&matrix, 0), vec![0, 0, 0]);
        let a = vocabulary.index_of("a").unwrap();
        let row = dense_row(&matrix, 1);
        assert_eq!(row[a], 3);
        assert_eq!(row.iter().sum::<u64>(), 3);
    }

    #[test]
    fn test_transform_ignores_unknown_tokens() {
        let vocabulary = vectorizer(10).fit(&["cat dog"]).unwrap();
        let matrix = CountVectorizer::transform(&["cat bird bird"], &vocabulary);
        assert_eq!(matrix.nnz(), 1);
        assert_eq!(vocabulary.len(), 2);
    }

    #[test]
    fn test_fit_transform_shares_columns() {
        let splits = vectorizer(10)
            .fit_transform(
                &["cat run fast", "dog bark loudly"],
                &["cat run", "unseen words only"],
            )
            .unwrap();

        assert_eq!(splits.vocabulary.len(), 6);
        assert_eq!(splits.train.cols(), splits.test.cols());
        assert_eq!(splits.train.rows(), 2);
        assert_eq!(splits.test.rows(), 2);

        let cat = splits.vocabulary.index_of("cat").unwrap();
        let run = splits.vocabulary.index_of("run").unwrap();
        let row = dense_row(&splits.test, 0);
        assert_eq!(row[cat], 1);
        assert_eq!(row[run], 1);
        assert_eq!(row.iter().sum::<u64>(), 2);
        assert_eq!(dense_row(&splits.test, 1).iter().sum::<u64>(), 0);
    }

    #[test]
    fn test_fit_transform_matches_separate_calls() {
        let train = ["cat cat dog", "bird"];
        let vectorizer = vectorizer(3);
        let splits = vectorizer.fit_transform(&train, &train).unwrap();
        let vocabulary = vectorizer.fit(&train).unwrap();

        assert_eq!(splits.vocabulary, vocabulary);
        assert_eq!(
            splits.train,
            CountVectorizer::transform(&train, &vocabulary)
        );
        assert_eq!(splits.train, splits.test);
    }
}
