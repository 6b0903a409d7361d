//! Classifier scoring.
//!
//! [`evaluate`] runs a [`Classifier`] over a feature table and reports
//! accuracy, macro precision, macro recall and one-vs-rest AUC.

use std::collections::BTreeSet;

use bow_pre_processing::pre_processor::CountMatrix;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{
    data::FeatureTable,
    error::{PipelineError, Result},
};

/// A trained classifier over bag-of-words count rows.
pub trait Classifier {
    /// Class labels in the column order of [`Classifier::predict_probabilities`].
    fn classes(&self) -> &[String];

    /// Number of feature columns the classifier was trained on.
    fn num_features(&self) -> usize;

    fn predict(&self, features: &CountMatrix) -> Result<Vec<String>>;

    /// One row per document, one column per entry of [`Classifier::classes`].
    fn predict_probabilities(&self, features: &CountMatrix) -> Result<Array2<f64>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub auc: f64,
}

pub fn evaluate<C: Classifier + ?Sized>(classifier: &C, table: &FeatureTable) -> Result<Metrics> {
    if table.is_empty() {
        return Err(PipelineError::invalid_input(
            "cannot evaluate on an empty feature table",
        ));
    }
    if table.num_features() != classifier.num_features() {
        return Err(PipelineError::SchemaMismatch {
            expected: classifier.num_features(),
            found: table.num_features(),
        });
    }

    let y_true = table.labels();
    let y_pred = classifier.predict(table.matrix())?;
    let probabilities = classifier.predict_probabilities(table.matrix())?;
    if y_pred.len() != y_true.len() || probabilities.nrows() != y_true.len() {
        return Err(PipelineError::Model(format!(
            "classifier returned {} predictions and {} probability rows for {} documents",
            y_pred.len(),
            probabilities.nrows(),
            y_true.len()
        )));
    }

    let metrics = Metrics {
        accuracy: accuracy(y_true, &y_pred),
        precision: precision_macro(y_true, &y_pred),
        recall: recall_macro(y_true, &y_pred),
        auc: roc_auc_ovr(y_true, classifier.classes(), &probabilities)
            .inspect_err(|e| error!(error = %e, "AUC computation failed"))?,
    };
    debug!(?metrics, "Model evaluation metrics calculated");
    Ok(metrics)
}

#[must_use]
pub fn accuracy(y_true: &[String], y_pred: &[String]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

/// Per-label (true positives, predicted count, actual count) over the sorted
/// union of true and predicted labels.
fn label_counts<'a>(y_true: &'a [String], y_pred: &'a [String]) -> Vec<(usize, usize, usize)> {
    let labels = y_true
        .iter()
        .chain(y_pred)
        .map(String::as_str)
        .collect::<BTreeSet<&'a str>>();

    labels
        .into_iter()
        .map(|label| {
            let tp = y_true
                .iter()
                .zip(y_pred)
                .filter(|(t, p)| *t == label && *p == label)
                .count();
            let predicted = y_pred.iter().filter(|p| *p == label).count();
            let actual = y_true.iter().filter(|t| *t == label).count();
            (tp, predicted, actual)
        })
        .collect()
}

fn safe_ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn macro_average(scores: impl ExactSizeIterator<Item = f64>) -> f64 {
    let n = scores.len();
    if n == 0 {
        return 0.0;
    }
    scores.sum::<f64>() / n as f64
}

/// Unweighted mean of per-label precision; labels never predicted score 0.
#[must_use]
pub fn precision_macro(y_true: &[String], y_pred: &[String]) -> f64 {
    let counts = label_counts(y_true, y_pred);
    macro_average(
        counts
            .iter()
            .map(|&(tp, predicted, _)| safe_ratio(tp, predicted)),
    )
}

/// Unweighted mean of per-label recall.
#[must_use]
pub fn recall_macro(y_true: &[String], y_pred: &[String]) -> f64 {
    let counts = label_counts(y_true, y_pred);
    macro_average(
        counts
            .iter()
            .map(|&(tp, _, actual)| safe_ratio(tp, actual)),
    )
}

/// Area under the ROC curve, one-vs-rest, macro averaged.
///
/// Column `j` of `probabilities` scores `classes[j]`. The number of columns
/// must equal the number of distinct labels in `y_true`, and every one of
/// those labels must be a known class. With exactly two labels the AUC of
/// the second (sorted) label is returned, matching the binary definition.
pub fn roc_auc_ovr(
    y_true: &[String],
    classes: &[String],
    probabilities: &Array2<f64>,
) -> Result<f64> {
    let labels = y_true.iter().map(String::as_str).collect::<BTreeSet<_>>();
    if probabilities.ncols() != labels.len() {
        return Err(PipelineError::ClassCountMismatch {
            expected: labels.len(),
            found: probabilities.ncols(),
        });
    }
    if labels.len() < 2 {
        return Err(PipelineError::UndefinedAuc(
            "only one class is present in the labels".to_string(),
        ));
    }

    let column_of = |label: &str| {
        classes.iter().position(|c| c == label).ok_or_else(|| {
            PipelineError::UndefinedAuc(format!("label `{label}` is not a class of the model"))
        })
    };

    let labels = labels.into_iter().collect::<Vec<_>>();
    if labels.len() == 2 {
        let positive = labels[1];
        let column = column_of(positive)?;
        return binary_auc(y_true, positive, probabilities.column(column));
    }

    let per_class = labels
        .iter()
        .map(|&label| {
            let column = column_of(label)?;
            binary_auc(y_true, label, probabilities.column(column))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(macro_average(per_class.into_iter()))
}

/// Mann-Whitney form of the ROC AUC, tied scores sharing their average rank.
fn binary_auc(y_true: &[String], positive: &str, scores: ArrayView1<'_, f64>) -> Result<f64> {
    let mut scored = y_true
        .iter()
        .zip(scores.iter())
        .map(|(label, &score)| (score, label == positive))
        .collect::<Vec<_>>();

    let n_pos = scored.iter().filter(|(_, is_pos)| *is_pos).count();
    let n_neg = scored.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(PipelineError::UndefinedAuc(format!(
            "class `{positive}` needs both positive and negative samples"
        )));
    }

    scored.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    while start < scored.len() {
        let mut end = start;
        while end + 1 < scored.len() && scored[end + 1].0 == scored[start].0 {
            end += 1;
        }
        // 1-based ranks start+1 ..= end+1
        let average_rank = (start + end) as f64 / 2.0 + 1.0;
        let positives = scored[start..=end].iter().filter(|(_, p)| *p).count();
        positive_rank_sum += average_rank * positives as f64;
        start = end + 1;
    }

    let n_pos = n_pos as f64;
    let n_neg = n_neg as f64;
    Ok((positive_rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}
