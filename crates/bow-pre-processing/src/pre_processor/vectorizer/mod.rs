mod count_vectorizer;
mod params;
mod tokenizer;
mod vocabulary;

pub use count_vectorizer::{CountMatrix, CountVectorizer, FittedSplits};
pub use params::{FrequencyMode, VectorizerParams};
pub use tokenizer::tokenize;
pub use vocabulary::Vocabulary;
