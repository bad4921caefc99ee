#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Next-day price direction classifier.
//!
//! [`train`] engineers features from a price-history frame, standardizes
//! them, and fits three classifiers, reporting train/validation metrics
//! for each.

use fundlens_core::{PipelineError, Result};
use ndarray::Array2;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::logistic_regression::LogisticRegression;
use smartcore::metrics::{accuracy, f1, precision, recall};
use smartcore::model_selection::train_test_split;
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier, DecisionTreeClassifierParameters,
};
use std::fmt::Write as _;
use tracing::debug;

/// Feature engineering from daily price bars.
pub mod features;

pub use features::{Dataset, FEATURE_NAMES, build_dataset};

/// Minimum number of samples worth training on.
const MIN_SAMPLES: usize = 20;

/// Training configuration.
#[derive(Clone, Debug)]
pub struct TrainConfig {
    /// Fraction of samples held out for validation.
    pub test_size: f32,
    /// Shuffle/ensemble seed, for reproducible runs.
    pub seed: u64,
    /// Number of trees in the random forest.
    pub forest_trees: u16,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            test_size: 0.1,
            seed: 2022,
            forest_trees: 100,
        }
    }
}

/// Metrics for one fitted classifier.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelScore {
    /// Classifier name.
    pub model: String,
    /// Accuracy on the training split.
    pub train_accuracy: f64,
    /// Accuracy on the validation split.
    pub validation_accuracy: f64,
    /// Validation precision for the "up" class.
    pub precision: f64,
    /// Validation recall for the "up" class.
    pub recall: f64,
    /// Validation F1 for the "up" class.
    pub f1: f64,
}

/// Outcome of a training run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Total engineered samples.
    pub samples: usize,
    /// Samples held out for validation.
    pub holdout: usize,
    /// Feature names, in matrix order.
    pub features: Vec<String>,
    /// Per-classifier metrics.
    pub scores: Vec<ModelScore>,
}

impl TrainingReport {
    /// Renders a human-readable summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Direction Model Training");
        let _ = writeln!(out, "========================");
        let _ = writeln!(
            out,
            "Samples: {} ({} held out) | Features: {}",
            self.samples,
            self.holdout,
            self.features.join(", ")
        );
        for score in &self.scores {
            let _ = writeln!(
                out,
                "\n{}\n  train accuracy:      {:.3}\n  validation accuracy: {:.3}\n  precision/recall/F1: {:.3} / {:.3} / {:.3}",
                score.model,
                score.train_accuracy,
                score.validation_accuracy,
                score.precision,
                score.recall,
                score.f1
            );
        }
        out
    }
}

/// Standardizes features to zero mean and unit variance.
///
/// Near-constant columns keep their values unscaled to avoid dividing by
/// a vanishing deviation.
#[derive(Clone, Debug)]
struct StandardScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    fn fit(data: &Array2<f64>) -> Self {
        let (n_samples, n_features) = data.dim();
        let mut means = vec![0.0; n_features];
        let mut stds = vec![1.0; n_features];

        for j in 0..n_features {
            let mut sum = 0.0;
            for i in 0..n_samples {
                sum += data[[i, j]];
            }
            means[j] = sum / n_samples as f64;

            let mut sum_sq = 0.0;
            for i in 0..n_samples {
                let diff = data[[i, j]] - means[j];
                sum_sq += diff * diff;
            }
            let std = (sum_sq / (n_samples.max(2) - 1) as f64).sqrt();
            stds[j] = if std < 1e-10 { 1.0 } else { std };
        }

        Self { means, stds }
    }

    fn transform(&self, data: &Array2<f64>) -> Array2<f64> {
        let (n_samples, n_features) = data.dim();
        let mut scaled = Array2::zeros((n_samples, n_features));
        for i in 0..n_samples {
            for j in 0..n_features {
                scaled[[i, j]] = (data[[i, j]] - self.means[j]) / self.stds[j];
            }
        }
        scaled
    }
}

/// Trains all classifiers on a price-history frame.
pub fn train(history: &DataFrame, config: &TrainConfig) -> Result<TrainingReport> {
    let dataset = build_dataset(history)?;

    if dataset.len() < MIN_SAMPLES {
        return Err(PipelineError::Model(format!(
            "need at least {MIN_SAMPLES} samples, got {}",
            dataset.len()
        )));
    }
    if !dataset.labels.contains(&1) || !dataset.labels.contains(&0) {
        return Err(PipelineError::Model(
            "price direction labels are single-class".to_string(),
        ));
    }

    let scaler = StandardScaler::fit(&dataset.features);
    let scaled = scaler.transform(&dataset.features);

    let (rows, cols) = scaled.dim();
    let flat: Vec<f64> = scaled.iter().copied().collect();
    let matrix =
        DenseMatrix::new(rows, cols, flat, false).map_err(|e| PipelineError::Model(e.to_string()))?;

    let (x_train, x_test, y_train, y_test) = train_test_split(
        &matrix,
        &dataset.labels,
        config.test_size,
        true,
        Some(config.seed),
    );
    debug!(
        train = y_train.len(),
        test = y_test.len(),
        "Split direction dataset"
    );

    let mut scores = Vec::with_capacity(3);

    let logistic = LogisticRegression::fit(&x_train, &y_train, Default::default())
        .map_err(|e| PipelineError::Model(e.to_string()))?;
    scores.push(score(
        "logistic_regression",
        &y_train,
        &predict(&|x| logistic.predict(x), &x_train)?,
        &y_test,
        &predict(&|x| logistic.predict(x), &x_test)?,
    ));

    let tree = DecisionTreeClassifier::fit(
        &x_train,
        &y_train,
        DecisionTreeClassifierParameters::default(),
    )
    .map_err(|e| PipelineError::Model(e.to_string()))?;
    scores.push(score(
        "decision_tree",
        &y_train,
        &predict(&|x| tree.predict(x), &x_train)?,
        &y_test,
        &predict(&|x| tree.predict(x), &x_test)?,
    ));

    let forest_params = RandomForestClassifierParameters::default()
        .with_n_trees(config.forest_trees)
        .with_seed(config.seed);
    let forest = RandomForestClassifier::fit(&x_train, &y_train, forest_params)
        .map_err(|e| PipelineError::Model(e.to_string()))?;
    scores.push(score(
        "random_forest",
        &y_train,
        &predict(&|x| forest.predict(x), &x_train)?,
        &y_test,
        &predict(&|x| forest.predict(x), &x_test)?,
    ));

    Ok(TrainingReport {
        samples: dataset.len(),
        holdout: y_test.len(),
        features: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        scores,
    })
}

type PredictFn<'a> = &'a dyn Fn(
    &DenseMatrix<f64>,
) -> std::result::Result<Vec<i32>, smartcore::error::Failed>;

fn predict(model: PredictFn<'_>, x: &DenseMatrix<f64>) -> Result<Vec<i32>> {
    model(x).map_err(|e| PipelineError::Model(e.to_string()))
}

fn score(
    name: &str,
    y_train: &[i32],
    train_preds: &[i32],
    y_test: &[i32],
    test_preds: &[i32],
) -> ModelScore {
    let y_test_f64: Vec<f64> = y_test.iter().map(|&v| f64::from(v)).collect();
    let test_preds_f64: Vec<f64> = test_preds.iter().map(|&v| f64::from(v)).collect();

    ModelScore {
        model: name.to_string(),
        train_accuracy: accuracy(&y_train.to_vec(), &train_preds.to_vec()),
        validation_accuracy: accuracy(&y_test.to_vec(), &test_preds.to_vec()),
        precision: precision(&y_test_f64, &test_preds_f64),
        recall: recall(&y_test_f64, &test_preds_f64),
        f1: f1(&y_test_f64, &test_preds_f64, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::Column;

    /// Builds a learnable history: the close alternates up and down, and
    /// the open sits on the opposite side of the close each day.
    fn synthetic_history(rows: usize) -> DataFrame {
        let mut dates = Vec::with_capacity(rows);
        let mut opens = Vec::with_capacity(rows);
        let mut highs = Vec::with_capacity(rows);
        let mut lows = Vec::with_capacity(rows);
        let mut closes = Vec::with_capacity(rows);

        for i in 0..rows {
            let up_day = i % 2 == 0;
            let close = if up_day { 10.0 } else { 11.0 };
            dates.push(format!("2023-{:02}-{:02}", 1 + i / 28, 1 + i % 28));
            opens.push(close + if up_day { 0.4 } else { -0.4 });
            highs.push(close + 0.6);
            lows.push(close - 0.6);
            closes.push(close);
        }

        DataFrame::new(vec![
            Column::new("date".into(), dates),
            Column::new("open".into(), opens),
            Column::new("high".into(), highs),
            Column::new("low".into(), lows),
            Column::new("close".into(), closes),
        ])
        .unwrap()
    }

    #[test]
    fn scaler_standardizes_columns() {
        let data = Array2::from_shape_vec((4, 1), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let scaler = StandardScaler::fit(&data);
        let scaled = scaler.transform(&data);

        let mean: f64 = scaled.column(0).iter().sum::<f64>() / 4.0;
        assert!(mean.abs() < 1e-12);
        assert!(scaled[[0, 0]] < 0.0 && scaled[[3, 0]] > 0.0);
    }

    #[test]
    fn scaler_leaves_constant_columns_finite() {
        let data = Array2::from_shape_vec((3, 1), vec![1.0, 1.0, 1.0]).unwrap();
        let scaler = StandardScaler::fit(&data);
        let scaled = scaler.transform(&data);
        assert!(scaled.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn trains_all_three_models() {
        let report = train(&synthetic_history(60), &TrainConfig::default()).unwrap();

        assert_eq!(report.samples, 59);
        assert!(report.holdout > 0);
        assert_eq!(report.scores.len(), 3);
        for score in &report.scores {
            assert!((0.0..=1.0).contains(&score.train_accuracy));
            assert!((0.0..=1.0).contains(&score.validation_accuracy));
        }

        let summary = report.summary();
        assert!(summary.contains("logistic_regression"));
        assert!(summary.contains("random_forest"));
    }

    #[test]
    fn refuses_tiny_datasets() {
        let err = train(&synthetic_history(5), &TrainConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Model(_)));
    }
}
