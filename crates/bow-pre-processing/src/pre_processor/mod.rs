mod normalizer;
mod parallel;
mod vectorizer;

pub use normalizer::{
    ENGLISH_STOP_WORDS, EnglishLemmatizer, LemmaError, Lemmatizer, PUNCTUATION, StopWords,
    TextNormalizer, TextNormalizerBuilder, lemmatize, lower_case, remove_numbers,
    remove_punctuation, remove_stop_words, remove_urls,
};
pub use vectorizer::{
    CountMatrix, CountVectorizer, FittedSplits, FrequencyMode, VectorizerParams, Vocabulary,
    tokenize,
};
