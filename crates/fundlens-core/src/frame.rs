//! Helpers for reading typed columns out of price-history DataFrames.
//!
//! Price history moves through the pipeline as a polars DataFrame; these
//! helpers centralize the column access the metrics, cache, and model
//! crates all need, including the date column which may arrive either as a
//! native Date column (from a source) or as strings (from a stored CSV).

use chrono::NaiveDate;
use polars::prelude::{DataFrame, DataType};

use crate::error::{PipelineError, Result};

/// Extracts a column as `f64` values, casting numeric types as needed.
pub fn f64_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|e| PipelineError::Parse(format!("missing column {name}: {e}")))?;
    let cast = column
        .cast(&DataType::Float64)
        .map_err(|e| PipelineError::Parse(format!("column {name} is not numeric: {e}")))?;
    let values = cast
        .f64()
        .map_err(|e| PipelineError::Parse(e.to_string()))?
        .into_iter()
        .collect();
    Ok(values)
}

/// Extracts the date column as `NaiveDate` values.
///
/// Accepts either a native Date column or ISO-8601 strings.
pub fn date_column(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDate>>> {
    let column = df
        .column(name)
        .map_err(|e| PipelineError::Parse(format!("missing column {name}: {e}")))?;

    match column.dtype() {
        DataType::Date => {
            // The physical representation of a Date column is days since epoch.
            let days = column
                .cast(&DataType::Int32)
                .map_err(|e| PipelineError::Parse(e.to_string()))?;
            let values = days
                .i32()
                .map_err(|e| PipelineError::Parse(e.to_string()))?
                .into_iter()
                .map(|d| d.map(|d| NaiveDate::default() + chrono::Duration::days(i64::from(d))))
                .collect();
            Ok(values)
        }
        DataType::String => {
            let values = column
                .str()
                .map_err(|e| PipelineError::Parse(e.to_string()))?
                .into_iter()
                .map(|s| s.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()))
                .collect();
            Ok(values)
        }
        other => Err(PipelineError::Parse(format!(
            "column {name} has unsupported dtype {other}"
        ))),
    }
}
