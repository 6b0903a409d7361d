use indicatif::{ParallelProgressIterator, ProgressIterator};
use rayon::prelude::*;
use tracing::debug;

use crate::pre_processor::parallel::{progress_bar_setup, should_use_parallel};

fn tokenize_texts_par<T: AsRef<str> + Sync>(texts: &[T]) -> Vec<Vec<&str>> {
    debug!(num_texts = texts.len(), "Using parallel tokenization");
    let pb = progress_bar_setup(texts.len(), "Tokenizing texts in parallel");
    let result = texts
        .par_iter()
        .progress_with(pb.clone())
        .map(|text| text.as_ref().split_whitespace().collect())
        .collect();
    pb.finish_with_message("Parallel tokenization complete");
    result
}

fn tokenize_texts<T: AsRef<str>>(texts: &[T]) -> Vec<Vec<&str>> {
    debug!(num_texts = texts.len(), "Using sequential tokenization");
    let pb = progress_bar_setup(texts.len(), "Tokenizing texts");
    let result = texts
        .iter()
        .progress_with(pb.clone())
        .map(|text| text.as_ref().split_whitespace().collect())
        .collect();
    pb.finish_with_message("Tokenization complete");
    result
}

/// Split every text on whitespace. Output order matches input order.
pub fn tokenize<T: AsRef<str> + Sync>(texts: &[T]) -> Vec<Vec<&str>> {
    let lengths = texts.iter().map(|text| text.as_ref().len());
    if should_use_parallel(texts.len(), lengths) {
        tokenize_texts_par(texts)
    } else {
        tokenize_texts(texts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_on_whitespace() {
        let tokens = tokenize(&["cat  run\tfast", "", "dog"]);
        assert_eq!(
            tokens,
            vec![vec!["cat", "run", "fast"], vec![], vec!["dog"]]
        );
    }

    #[test]
    fn test_parallel_tokenize_keeps_order() {
        let texts = (0..300).map(|i| format!("tok{i} x")).collect::<Vec<_>>();
        let tokens = tokenize(&texts);
        assert_eq!(tokens.len(), 300);
        assert_eq!(tokens[123], vec!["tok123", "x"]);
    }
}
