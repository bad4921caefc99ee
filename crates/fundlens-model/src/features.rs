//! Feature engineering from daily price bars.

use chrono::Datelike;
use fundlens_core::{PipelineError, Result, frame};
use ndarray::Array2;
use polars::prelude::DataFrame;

/// Feature column names, in matrix order.
pub const FEATURE_NAMES: [&str; 3] = ["open_close", "low_high", "is_quarter_end"];

/// Engineered features with next-day direction labels.
#[derive(Clone, Debug)]
pub struct Dataset {
    /// One row per usable bar, columns per [`FEATURE_NAMES`].
    pub features: Array2<f64>,
    /// 1 when the next close is above the current close, else 0.
    pub labels: Vec<i32>,
}

impl Dataset {
    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if no samples were built.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Builds the feature matrix and labels from a price-history frame.
///
/// Bars with missing values are skipped, and the final bar is dropped
/// because it has no next close to label against.
pub fn build_dataset(history: &DataFrame) -> Result<Dataset> {
    let dates = frame::date_column(history, "date")?;
    let opens = frame::f64_column(history, "open")?;
    let highs = frame::f64_column(history, "high")?;
    let lows = frame::f64_column(history, "low")?;
    let closes = frame::f64_column(history, "close")?;

    let rows = history.height();
    let mut values = Vec::new();
    let mut labels = Vec::new();

    for i in 0..rows.saturating_sub(1) {
        let (Some(date), Some(open), Some(high), Some(low), Some(close), Some(next_close)) = (
            dates[i], opens[i], highs[i], lows[i], closes[i], closes[i + 1],
        ) else {
            continue;
        };

        values.push(open - close);
        values.push(low - high);
        // Quarter-end months are multiples of 3.
        values.push(if date.month() % 3 == 0 { 1.0 } else { 0.0 });
        labels.push(i32::from(next_close > close));
    }

    if labels.is_empty() {
        return Err(PipelineError::Model(
            "no usable price bars to build features from".to_string(),
        ));
    }

    let features = Array2::from_shape_vec((labels.len(), FEATURE_NAMES.len()), values)
        .map_err(|e| PipelineError::Model(e.to_string()))?;

    Ok(Dataset { features, labels })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::Column;

    fn history() -> DataFrame {
        DataFrame::new(vec![
            Column::new(
                "date".into(),
                vec!["2024-02-28", "2024-03-01", "2024-03-04", "2024-03-05"],
            ),
            Column::new("open".into(), vec![10.5, 11.0, 10.8, 11.2]),
            Column::new("high".into(), vec![11.0, 11.5, 11.3, 11.6]),
            Column::new("low".into(), vec![10.0, 10.6, 10.4, 10.9]),
            Column::new("close".into(), vec![10.8, 10.7, 11.1, 11.0]),
        ])
        .unwrap()
    }

    #[test]
    fn builds_features_and_labels() {
        let dataset = build_dataset(&history()).unwrap();

        // Final bar has no next close: three samples from four bars.
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.features.dim(), (3, 3));

        // First bar: open - close, low - high, February is not quarter end.
        assert!((dataset.features[[0, 0]] - (10.5 - 10.8)).abs() < 1e-12);
        assert!((dataset.features[[0, 1]] - (10.0 - 11.0)).abs() < 1e-12);
        assert_eq!(dataset.features[[0, 2]], 0.0);
        // March is a quarter-end month.
        assert_eq!(dataset.features[[1, 2]], 1.0);

        // Closes: 10.8 -> 10.7 (down), 10.7 -> 11.1 (up), 11.1 -> 11.0 (down).
        assert_eq!(dataset.labels, vec![0, 1, 0]);
    }

    #[test]
    fn skips_bars_with_missing_values() {
        let df = DataFrame::new(vec![
            Column::new("date".into(), vec!["2024-01-02", "2024-01-03", "2024-01-04"]),
            Column::new("open".into(), vec![Some(10.0), None, Some(10.4)]),
            Column::new("high".into(), vec![10.5, 10.9, 10.8]),
            Column::new("low".into(), vec![9.8, 10.2, 10.1]),
            Column::new("close".into(), vec![10.2, 10.6, 10.3]),
        ])
        .unwrap();

        let dataset = build_dataset(&df).unwrap();
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn empty_history_is_an_error() {
        let df = DataFrame::new(vec![
            Column::new("date".into(), Vec::<String>::new()),
            Column::new("open".into(), Vec::<f64>::new()),
            Column::new("high".into(), Vec::<f64>::new()),
            Column::new("low".into(), Vec::<f64>::new()),
            Column::new("close".into(), Vec::<f64>::new()),
        ])
        .unwrap();
        assert!(build_dataset(&df).is_err());
    }
}
