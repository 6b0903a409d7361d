use std::{
    collections::BTreeSet,
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use bow_pre_processing::{PreProcessingError, pre_processor::CountMatrix};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    data::FeatureTable,
    error::{PipelineError, Result},
    evaluate::Classifier,
};

/// Multinomial naive Bayes over term counts with additive (Laplace) smoothing.
///
/// Classes are kept in sorted order; probability column `j` belongs to
/// `classes()[j]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNaiveBayes {
    alpha: f64,
    classes: Vec<String>,
    class_log_prior: Array1<f64>,
    /// `(classes, features)` log P(feature | class).
    feature_log_prob: Array2<f64>,
}

impl MultinomialNaiveBayes {
    pub fn fit(table: &FeatureTable, alpha: f64) -> Result<Self> {
        if !(alpha.is_finite() && alpha > 0.0) {
            return Err(PreProcessingError::InvalidParameter {
                name: "model.alpha",
                value: alpha.to_string(),
                constraint: "must be a positive finite number",
            }
            .into());
        }
        if table.is_empty() {
            return Err(PipelineError::invalid_input(
                "cannot train on an empty feature table",
            ));
        }

        let classes = table
            .labels()
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();
        if classes.len() < 2 {
            return Err(PipelineError::Model(format!(
                "training needs at least two classes, found {}",
                classes.len()
            )));
        }

        let num_features = table.num_features();
        let mut class_count = Array1::<f64>::zeros(classes.len());
        let mut feature_count = Array2::<f64>::zeros((classes.len(), num_features));

        for (row, label) in table.matrix().outer_iterator().zip(table.labels()) {
            // `classes` is sorted and holds every label.
            let Ok(class) = classes.binary_search(label) else {
                continue;
            };
            class_count[class] += 1.0;
            for (col, &count) in row.iter() {
                feature_count[[class, col]] += count as f64;
            }
        }

        let total = class_count.sum();
        let class_log_prior = class_count.mapv(|count| (count / total).ln());

        let smoothed = feature_count.mapv(|count| count + alpha);
        let class_totals = smoothed.sum_axis(Axis(1));
        let mut feature_log_prob = smoothed.mapv(f64::ln);
        for (mut row, total) in feature_log_prob.outer_iter_mut().zip(class_totals.iter()) {
            let log_total = total.ln();
            row.mapv_inplace(|value| value - log_total);
        }

        info!(
            num_classes = classes.len(),
            num_features,
            num_documents = table.len(),
            "Naive Bayes model fitted"
        );
        Ok(Self {
            alpha,
            classes,
            class_log_prior,
            feature_log_prob,
        })
    }

    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Unnormalized log posterior per (document, class).
    fn joint_log_likelihood(&self, features: &CountMatrix) -> Result<Array2<f64>> {
        if features.cols() != self.num_features() {
            return Err(PipelineError::SchemaMismatch {
                expected: self.num_features(),
                found: features.cols(),
            });
        }

        let mut joint = Array2::<f64>::zeros((features.rows(), self.classes.len()));
        for (mut out, row) in joint.outer_iter_mut().zip(features.outer_iterator()) {
            for (class, value) in out.iter_mut().enumerate() {
                let log_prob = self.feature_log_prob.row(class);
                *value = self.class_log_prior[class]
                    + row
                        .iter()
                        .map(|(col, &count)| count as f64 * log_prob[col])
                        .sum::<f64>();
            }
        }
        Ok(joint)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        debug!(path = %path.display(), "Model saved");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let model = serde_json::from_reader::<_, Self>(reader)?;
        model.check_shapes()?;
        debug!(
            path = %path.display(),
            classes = ?model.classes,
            "Model loaded"
        );
        Ok(model)
    }

    fn check_shapes(&self) -> Result<()> {
        let num_classes = self.classes.len();
        if self.class_log_prior.len() != num_classes
            || self.feature_log_prob.nrows() != num_classes
        {
            return Err(PipelineError::Model(format!(
                "inconsistent model: {num_classes} classes, {} priors, {} likelihood rows",
                self.class_log_prior.len(),
                self.feature_log_prob.nrows()
            )));
        }
        Ok(())
    }
}

impl Classifier for MultinomialNaiveBayes {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn num_features(&self) -> usize {
        self.feature_log_prob.ncols()
    }

    /// Highest posterior wins; ties go to the earlier class.
    fn predict(&self, features: &CountMatrix) -> Result<Vec<String>> {
        let joint = self.joint_log_likelihood(features)?;
        Ok(joint
            .outer_iter()
            .map(|row| {
                let mut best = 0;
                for (class, &value) in row.iter().enumerate() {
                    if value > row[best] {
                        best = class;
                    }
                }
                self.classes[best].clone()
            })
            .collect())
    }

    fn predict_probabilities(&self, features: &CountMatrix) -> Result<Array2<f64>> {
        let mut joint = self.joint_log_likelihood(features)?;
        for mut row in joint.outer_iter_mut() {
            let max = row.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
            let log_norm = max + row.mapv(|v| (v - max).exp()).sum().ln();
            row.mapv_inplace(|v| (v - log_norm).exp());
        }
        Ok(joint)
    }
}
