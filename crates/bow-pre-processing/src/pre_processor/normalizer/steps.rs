//! The individual normalization steps.
//!
//! Each step takes the previous step's output and returns a new string.
//! Every step is idempotent on its own output.

use std::sync::LazyLock;

use regex::Regex;

use super::{
    lemmatizer::{LemmaError, Lemmatizer},
    stopwords::StopWords,
};

/// ASCII punctuation, the same set as Python's `string.punctuation`.
pub const PUNCTUATION: &str = r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##;

/// Deleted outright rather than replaced by a space.
const ARABIC_SEMICOLON: char = '\u{061B}';

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://\S+|www\.\S+").expect("URL pattern is valid")
});

/// Decimal digits in any script plus super/subscript digits. Vulgar fractions
/// and roman numerals are not digits.
static DIGIT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{Nd}\u{00B2}\u{00B3}\u{00B9}\u{2070}\u{2074}-\u{2079}\u{2080}-\u{2089}]")
        .expect("digit pattern is valid")
});

pub fn lower_case(text: &str) -> String {
    text.to_lowercase()
}

pub fn remove_stop_words(text: &str, stop_words: &StopWords) -> String {
    text.split_whitespace()
        .filter(|token| !stop_words.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drops digit characters only; the rest of a token survives (`abc123` -> `abc`).
pub fn remove_numbers(text: &str) -> String {
    DIGIT_PATTERN.replace_all(text, "").into_owned()
}

pub fn remove_punctuation(text: &str) -> String {
    let spaced = text
        .chars()
        .filter(|&c| c != ARABIC_SEMICOLON)
        .map(|c| if PUNCTUATION.contains(c) { ' ' } else { c })
        .collect::<String>();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn remove_urls(text: &str) -> String {
    URL_PATTERN.replace_all(text, "").into_owned()
}

pub fn lemmatize<L: Lemmatizer + ?Sized>(
    text: &str,
    lemmatizer: &L,
) -> Result<String, LemmaError> {
    let lemmas = text
        .split_whitespace()
        .map(|token| lemmatizer.lemmatize(token))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lemmas.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pre_processor::normalizer::lemmatizer::EnglishLemmatizer;

    #[test]
    fn test_lower_case() {
        assert_eq!(lower_case("The Cat RUNS"), "the cat runs");
        assert_eq!(lower_case(""), "");
    }

    #[test]
    fn test_remove_stop_words_rejoins_with_single_spaces() {
        let stop_words = StopWords::english();
        assert_eq!(
            remove_stop_words("the  cat   is on the mat", &stop_words),
            "cat mat"
        );
        assert_eq!(remove_stop_words("the a an", &stop_words), "");
    }

    #[test]
    fn test_remove_numbers_keeps_letters() {
        assert_eq!(remove_numbers("abc123"), "abc");
        assert_eq!(remove_numbers("cat runs 2 fast"), "cat runs  fast");
    }

    #[test]
    fn test_remove_numbers_only_drops_digits() {
        assert_eq!(remove_numbers("x\u{0663}y"), "xy");
        assert_eq!(remove_numbers("e=mc\u{00B2}"), "e=mc");
        assert_eq!(remove_numbers("\u{00BD} cup"), "\u{00BD} cup");
        assert_eq!(remove_numbers("chapter \u{216B}"), "chapter \u{216B}");
    }

    #[test]
    fn test_remove_punctuation_collapses_whitespace() {
        assert_eq!(remove_punctuation("fast!!"), "fast");
        assert_eq!(remove_punctuation("  well...done, you  "), "well done you");
        assert_eq!(remove_punctuation("a\u{061B}b"), "ab");
        assert_eq!(remove_punctuation("!!!"), "");
    }

    #[test]
    fn test_remove_urls() {
        assert_eq!(
            remove_urls("see https://example.com/x?y=1 now"),
            "see  now"
        );
        assert_eq!(remove_urls("go www.example.org today"), "go  today");
        assert_eq!(remove_urls("no links here"), "no links here");
    }

    #[test]
    fn test_punctuation_runs_before_url_removal_breaks_urls() {
        let cleaned = remove_urls(&remove_punctuation("visit http://example.com"));
        assert_eq!(cleaned, "visit http example com");
    }

    #[test]
    fn test_lemmatize_rejoins_tokens() {
        let lemmatizer = EnglishLemmatizer::new();
        assert_eq!(
            lemmatize("dogs  bark loudly", &lemmatizer).unwrap(),
            "dog bark loudly"
        );
        assert_eq!(lemmatize("", &lemmatizer).unwrap(), "");
    }

    #[test]
    fn test_single_steps_are_idempotent() {
        let lemmatizer = EnglishLemmatizer::new();
        for text in [
            "The Cats RUN fast!!",
            "  dogs, birds & mice... ",
            "Visit www.example.com or http://x.io/a?b",
            "",
        ] {
            let lowered = lower_case(text);
            assert_eq!(lower_case(&lowered), lowered);

            let stripped = remove_punctuation(text);
            assert_eq!(remove_punctuation(&stripped), stripped);

            let lemmas = lemmatize(&stripped, &lemmatizer).unwrap();
            assert_eq!(lemmatize(&lemmas, &lemmatizer).unwrap(), lemmas);
        }
    }
}
