use std::borrow::Cow;

use indicatif::{ProgressBar, ProgressStyle};

/// Minimum number of texts to consider parallelization
const MIN_TEXTS_FOR_PARALLEL: usize = 100;

/// Minimum total character count to consider parallelization
const MIN_CHARS_FOR_PARALLEL: usize = 10_000;

/// Texts sampled to estimate total workload
const LENGTH_SAMPLE: usize = 20;

pub(crate) fn progress_bar_setup(len: usize, message: impl Into<Cow<'static, str>>) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .expect("progress template is valid")
            .progress_chars("#>-"),
    );
    pb.set_message(message);
    pb
}

/// Decide whether row-wise work is worth spreading over the rayon pool.
///
/// True when there are many texts (>= 100) or the estimated total character
/// count is large (>= 10,000). Above 20 texts only the first 20 are measured.
#[inline]
pub(crate) fn should_use_parallel<I>(num_texts: usize, lengths: I) -> bool
where
    I: IntoIterator<Item = usize>,
{
    if num_texts >= MIN_TEXTS_FOR_PARALLEL {
        return true;
    }

    let total_chars: usize = if num_texts > LENGTH_SAMPLE {
        let sample_chars: usize = lengths.into_iter().take(LENGTH_SAMPLE).sum();
        (sample_chars * num_texts) / LENGTH_SAMPLE
    } else {
        lengths.into_iter().sum()
    };

    total_chars >= MIN_CHARS_FOR_PARALLEL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_many_texts_go_parallel() {
        assert!(should_use_parallel(150, std::iter::repeat_n(1, 150)));
    }

    #[test]
    fn test_few_short_texts_stay_sequential() {
        assert!(!should_use_parallel(3, [10, 20, 30]));
    }

    #[test]
    fn test_few_long_texts_go_parallel() {
        assert!(should_use_parallel(2, [6_000, 6_000]));
    }

    #[test]
    fn test_large_estimate_from_sample() {
        assert!(should_use_parallel(50, std::iter::repeat_n(500, 50)));
    }
}
