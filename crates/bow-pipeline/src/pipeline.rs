//! Batch stages: preprocess, featurize, train, evaluate.
//!
//! Each stage reads the previous stage's files under a project root and
//! writes its own. The `*_table`/`*_corpora` functions hold the stage logic
//! without touching the filesystem.

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use anyhow::Context;
use bow_pre_processing::{
    Corpus,
    pre_processor::{CountVectorizer, TextNormalizer, VectorizerParams, Vocabulary},
};
use tracing::{debug, info, info_span, warn};

use crate::{
    config::{FilterParams, ModelParams, Params, ShortDocumentFilter},
    data::{FeatureTable, Table},
    error::Result,
    evaluate::{Metrics, evaluate},
    model::MultinomialNaiveBayes,
};

/// File layout of a pipeline project, relative to its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelinePaths {
    root: PathBuf,
}

impl PipelinePaths {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn raw_train(&self) -> PathBuf {
        self.root.join("data/raw/train.csv")
    }

    #[must_use]
    pub fn raw_test(&self) -> PathBuf {
        self.root.join("data/raw/test.csv")
    }

    #[must_use]
    pub fn interim_train(&self) -> PathBuf {
        self.root.join("data/interim/train_processed.csv")
    }

    #[must_use]
    pub fn interim_test(&self) -> PathBuf {
        self.root.join("data/interim/test_processed.csv")
    }

    #[must_use]
    pub fn bow_train(&self) -> PathBuf {
        self.root.join("data/processed/train_bow.csv")
    }

    #[must_use]
    pub fn bow_test(&self) -> PathBuf {
        self.root.join("data/processed/test_bow.csv")
    }

    #[must_use]
    pub fn vocabulary(&self) -> PathBuf {
        self.root.join("data/processed/vocabulary.json")
    }

    #[must_use]
    pub fn model(&self) -> PathBuf {
        self.root.join("models/model.json")
    }

    #[must_use]
    pub fn metrics(&self) -> PathBuf {
        self.root.join("reports/metrics.json")
    }
}

/// Normalize the text column of `table`.
///
/// With [`ShortDocumentFilter::BeforeFit`] short rows are dropped here, whole
/// records at a time.
pub fn preprocess_table(
    normalizer: &TextNormalizer,
    table: Table,
    filter: &FilterParams,
) -> Result<Table> {
    let mut corpus = normalizer.normalize_corpus(table.corpus())?;
    if filter.short_documents == ShortDocumentFilter::BeforeFit {
        let dropped = corpus.mark_short_documents(filter.min_tokens);
        info!(
            dropped,
            min_tokens = filter.min_tokens,
            "Dropping short documents before fit"
        );
    }
    table.replace_corpus(corpus)
}

/// Vocabulary plus the two aligned feature tables.
#[derive(Debug, Clone)]
pub struct Features {
    pub vocabulary: Vocabulary,
    pub train: FeatureTable,
    pub test: FeatureTable,
}

/// Fit the vocabulary on every training document, then build both feature
/// tables from it.
///
/// With [`ShortDocumentFilter::AfterFit`] short rows are removed from both
/// splits between fitting and transforming.
pub fn featurize_corpora(
    params: VectorizerParams,
    filter: &FilterParams,
    train: Corpus,
    test: Corpus,
) -> Result<Features> {
    let vectorizer = CountVectorizer::new(params);
    let vocabulary = vectorizer.fit(&train.documents()?)?;

    let (train, test) = if filter.short_documents == ShortDocumentFilter::AfterFit {
        (
            drop_short(train, filter.min_tokens),
            drop_short(test, filter.min_tokens),
        )
    } else {
        (train, test)
    };

    let to_table = |corpus: Corpus| -> Result<FeatureTable> {
        let (documents, labels) = corpus.into_parts();
        let matrix = CountVectorizer::transform(&documents, &vocabulary);
        FeatureTable::new(matrix, labels)
    };
    let train = to_table(train)?;
    let test = to_table(test)?;

    info!(
        vocab_size = vocabulary.len(),
        train_rows = train.len(),
        test_rows = test.len(),
        "Feature tables built"
    );
    Ok(Features {
        vocabulary,
        train,
        test,
    })
}

fn drop_short(mut corpus: Corpus, min_tokens: usize) -> Corpus {
    let dropped = corpus.mark_short_documents(min_tokens);
    info!(dropped, min_tokens, "Dropping short documents after fit");
    corpus.drop_missing()
}

pub fn train_classifier(
    table: &FeatureTable,
    params: &ModelParams,
) -> Result<MultinomialNaiveBayes> {
    MultinomialNaiveBayes::fit(table, params.alpha)
}

/// Runs the stages against the files under a [`PipelinePaths`] root.
#[derive(Debug)]
pub struct Pipeline {
    params: Params,
    paths: PipelinePaths,
    normalizer: TextNormalizer,
}

impl Pipeline {
    #[must_use]
    pub fn new(params: Params, paths: PipelinePaths) -> Self {
        Self {
            params,
            paths,
            normalizer: TextNormalizer::new(),
        }
    }

    #[must_use]
    pub fn with_normalizer(mut self, normalizer: TextNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    #[must_use]
    pub fn paths(&self) -> &PipelinePaths {
        &self.paths
    }

    /// Both splits are normalized before either interim table is written.
    pub fn preprocess(&self) -> anyhow::Result<()> {
        let _span = info_span!("stage", name = "preprocess").entered();
        let splits = [
            (self.paths.raw_train(), self.paths.interim_train()),
            (self.paths.raw_test(), self.paths.interim_test()),
        ]
        .into_iter()
        .map(|(input, output)| -> anyhow::Result<(PathBuf, Table)> {
            let table = self.read_table(&input)?;
            let rows_in = table.len();
            let table = preprocess_table(&self.normalizer, table, &self.params.filter)
                .with_context(|| format!("Failed to preprocess {}", input.display()))?;
            info!(
                input = %input.display(),
                rows_in,
                rows_out = table.len(),
                "Table preprocessed"
            );
            Ok((output, table))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

        for (output, table) in &splits {
            write_with(output, |file| table.write(file))?;
            debug!(output = %output.display(), "Interim table written");
        }
        Ok(())
    }

    pub fn featurize(&self) -> anyhow::Result<()> {
        let _span = info_span!("stage", name = "featurize").entered();
        let train = self.read_table(&self.paths.interim_train())?.corpus();
        let test = self.read_table(&self.paths.interim_test())?.corpus();

        let vectorizer_params = self.params.vectorizer_params()?;
        let features = featurize_corpora(vectorizer_params, &self.params.filter, train, test)
            .context("Failed to build feature tables")?;
        if features.train.is_empty() {
            warn!("Every training row was filtered out");
        }

        write_with(&self.paths.bow_train(), |file| features.train.write(file))?;
        write_with(&self.paths.bow_test(), |file| features.test.write(file))?;
        write_with(&self.paths.vocabulary(), |file| {
            Ok(serde_json::to_writer_pretty(file, &features.vocabulary)?)
        })?;
        Ok(())
    }

    pub fn train(&self) -> anyhow::Result<()> {
        let _span = info_span!("stage", name = "train").entered();
        let table = read_feature_table(&self.paths.bow_train())?;
        let model = train_classifier(&table, &self.params.model)
            .context("Failed to train the classifier")?;

        let path = self.paths.model();
        create_parent(&path)?;
        model
            .save(&path)
            .with_context(|| format!("Failed to save model to {}", path.display()))?;
        info!(path = %path.display(), "Model saved");
        Ok(())
    }

    pub fn evaluate(&self) -> anyhow::Result<Metrics> {
        let _span = info_span!("stage", name = "evaluate").entered();
        let model_path = self.paths.model();
        let model = MultinomialNaiveBayes::load(&model_path)
            .with_context(|| format!("Failed to load model from {}", model_path.display()))?;
        let table = read_feature_table(&self.paths.bow_test())?;

        let metrics = evaluate(&model, &table).context("Failed to evaluate the model")?;
        write_with(&self.paths.metrics(), |file| {
            Ok(serde_json::to_writer_pretty(file, &metrics)?)
        })?;
        info!(
            accuracy = metrics.accuracy,
            precision = metrics.precision,
            recall = metrics.recall,
            auc = metrics.auc,
            "Metrics saved"
        );
        Ok(metrics)
    }

    /// All stages in order.
    pub fn run(&self) -> anyhow::Result<Metrics> {
        self.preprocess()?;
        self.featurize()?;
        self.train()?;
        self.evaluate()
    }

    fn read_table(&self, path: &Path) -> anyhow::Result<Table> {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let columns = &self.params.preprocessing;
        Table::read(
            BufReader::new(file),
            &columns.text_column,
            &columns.label_column,
        )
        .with_context(|| format!("Failed to read {}", path.display()))
    }
}

fn read_feature_table(path: &Path) -> anyhow::Result<FeatureTable> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    FeatureTable::read(BufReader::new(file))
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn create_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

fn write_with<F>(path: &Path, write: F) -> anyhow::Result<()>
where
    F: FnOnce(BufWriter<File>) -> Result<()>,
{
    create_parent(path)?;
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write(BufWriter::new(file)).with_context(|| format!("Failed to write {}", path.display()))
}
