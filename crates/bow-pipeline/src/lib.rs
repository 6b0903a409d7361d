//! # bow-pipeline
//!
//! Batch pipeline over two labeled CSV tables: normalize the text column,
//! fit a bag-of-words vocabulary on the training split, write count tables
//! for both splits, train a multinomial naive Bayes classifier and score it.
//!
//! ```rust,no_run
//! use bow_pipeline::{Params, Pipeline, PipelinePaths};
//!
//! let params = Params::load("params.yaml")?;
//! let pipeline = Pipeline::new(params, PipelinePaths::new("."));
//! let metrics = pipeline.run()?;
//! println!("accuracy: {:.3}", metrics.accuracy);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! The stage logic is also available without the filesystem through
//! [`preprocess_table`], [`featurize_corpora`] and [`train_classifier`].

#[cfg(feature = "cli")]
pub mod cli;

mod config;
mod data;
mod error;
mod evaluate;
mod model;
mod pipeline;

pub use config::{
    FeatureParams, FilterParams, ModelParams, Params, PreprocessingParams, ShortDocumentFilter,
};
pub use data::{FeatureTable, LABEL_COLUMN, Table};
pub use error::{PipelineError, Result};
pub use evaluate::{
    Classifier, Metrics, accuracy, evaluate, precision_macro, recall_macro, roc_auc_ovr,
};
pub use model::MultinomialNaiveBayes;
pub use pipeline::{
    Features, Pipeline, PipelinePaths, featurize_corpora, preprocess_table, train_classifier,
};
