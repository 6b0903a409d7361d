//! Token lemmatization.
//!
//! The default [`EnglishLemmatizer`] reduces plural nouns to their singular
//! form with an irregular-form table followed by suffix rules, the same shape
//! as WordNet's noun morphology but without a dictionary lookup. Anything it
//! does not recognise passes through unchanged.

use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct LemmaError(pub String);

/// Maps a token to its dictionary base form.
pub trait Lemmatizer: Send + Sync {
    fn lemmatize(&self, token: &str) -> Result<String, LemmaError>;
}

const IRREGULAR: &[(&str, &str)] = &[
    ("men", "man"),
    ("women", "woman"),
    ("children", "child"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("mice", "mouse"),
    ("lice", "louse"),
    ("oxen", "ox"),
    ("quizzes", "quiz"),
    ("movies", "movie"),
    ("cookies", "cookie"),
    ("zombies", "zombie"),
    ("calories", "calorie"),
    ("lies", "lie"),
    ("ties", "tie"),
    ("pies", "pie"),
    // -ves -> -f / -fe
    ("wolves", "wolf"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("lives", "life"),
    ("wives", "wife"),
    ("halves", "half"),
    ("shelves", "shelf"),
    ("thieves", "thief"),
    ("calves", "calf"),
    ("loaves", "loaf"),
    // -oes -> -o
    ("heroes", "hero"),
    ("potatoes", "potato"),
    ("tomatoes", "tomato"),
    ("echoes", "echo"),
    ("vetoes", "veto"),
];

/// Words ending in `s` whose base form keeps it.
const INVARIANT: &[&str] = &[
    "news", "series", "species", "physics", "mathematics", "economics", "politics", "lens",
    "always", "perhaps", "sometimes", "afterwards", "towards", "whereas",
];

/// Suffixes after which only `es` is removed (`classes` -> `class`).
const ES_SUFFIXES: &[&str] = &["sses", "zzes", "ches", "shes", "xes"];

/// Shortest token the suffix rules will touch.
const MIN_RULE_LEN: usize = 4;

#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishLemmatizer;

impl EnglishLemmatizer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn irregular(token: &str) -> Option<&'static str> {
        IRREGULAR
            .iter()
            .find_map(|&(form, lemma)| (form == token).then_some(lemma))
    }

    fn strip_plural(token: &str) -> Option<String> {
        if token.chars().count() < MIN_RULE_LEN || INVARIANT.contains(&token) {
            return None;
        }
        if ["ss", "us", "is"].iter().any(|end| token.ends_with(end)) {
            return None;
        }
        if ES_SUFFIXES.iter().any(|suffix| token.ends_with(suffix)) {
            return token.strip_suffix("es").map(str::to_string);
        }
        if token.chars().count() > MIN_RULE_LEN
            && let Some(stem) = token.strip_suffix("ies")
        {
            return Some(format!("{stem}y"));
        }
        token.strip_suffix('s').map(str::to_string)
    }
}

impl Lemmatizer for EnglishLemmatizer {
    fn lemmatize(&self, token: &str) -> Result<String, LemmaError> {
        if let Some(lemma) = Self::irregular(token) {
            return Ok(lemma.to_string());
        }
        let lemma = Self::strip_plural(token).unwrap_or_else(|| token.to_string());
        // A stripped form can itself be irregular (`feets` -> `feet` -> `foot`).
        Ok(Self::irregular(&lemma).map_or(lemma, str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lemma(token: &str) -> String {
        EnglishLemmatizer::new().lemmatize(token).unwrap()
    }

    #[test]
    fn test_regular_plurals() {
        assert_eq!(lemma("cats"), "cat");
        assert_eq!(lemma("dogs"), "dog");
        assert_eq!(lemma("runs"), "run");
        assert_eq!(lemma("houses"), "house");
    }

    #[test]
    fn test_es_and_ies_plurals() {
        assert_eq!(lemma("boxes"), "box");
        assert_eq!(lemma("classes"), "class");
        assert_eq!(lemma("churches"), "church");
        assert_eq!(lemma("stories"), "story");
        assert_eq!(lemma("flies"), "fly");
        assert_eq!(lemma("wolves"), "wolf");
        assert_eq!(lemma("knives"), "knife");
        assert_eq!(lemma("leaves"), "leaf");
        assert_eq!(lemma("heroes"), "hero");
        assert_eq!(lemma("potatoes"), "potato");
    }

    #[test]
    fn test_irregular_forms() {
        assert_eq!(lemma("children"), "child");
        assert_eq!(lemma("feet"), "foot");
        assert_eq!(lemma("movies"), "movie");
    }

    #[test]
    fn test_protected_endings_unchanged() {
        for token in ["glass", "bus", "analysis", "news", "fast", "was", "gas"] {
            assert_eq!(lemma(token), token);
        }
    }

    #[test]
    fn test_lemmatize_is_idempotent() {
        let lemmatizer = EnglishLemmatizer::new();
        for token in [
            "cats", "boxes", "stories", "children", "feets", "classes", "buzzes", "happiness",
            "loudly", "sizes", "ties", "abc", "wolves", "knives", "lives", "heroes", "echoes",
        ] {
            let once = lemmatizer.lemmatize(token).unwrap();
            let twice = lemmatizer.lemmatize(&once).unwrap();
            assert_eq!(once, twice, "lemmatize not idempotent for {token}");
        }
    }
}
