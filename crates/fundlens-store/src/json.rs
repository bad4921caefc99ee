//! JSON-safe conversion of heterogeneous values.
//!
//! Persisted JSON must never contain non-finite numbers, and DataFrames and
//! dates need an explicit mapping; this module is the single place those
//! conversions happen.

use chrono::NaiveDate;
use fundlens_core::{PipelineError, Result};
use polars::prelude::{AnyValue, DataFrame};
use serde::Serialize;
use serde_json::{Map, Value};

/// Converts a float to a JSON value, mapping non-finite floats to null.
#[must_use]
pub fn number(value: f64) -> Value {
    if value.is_finite() {
        Value::from(value)
    } else {
        Value::Null
    }
}

/// Serializes any serde value to JSON, sanitizing non-finite numbers.
pub fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    // serde_json already maps non-finite floats to null during conversion.
    serde_json::to_value(value).map_err(|e| PipelineError::Store(e.to_string()))
}

/// Converts a DataFrame into an array of row objects.
///
/// Column values map to JSON as: null, booleans, integers, finite floats,
/// strings, and dates as ISO-8601 strings; anything else falls back to its
/// display form.
pub fn frame_to_records(df: &DataFrame) -> Result<Value> {
    let columns = df.get_columns();
    let mut records = Vec::with_capacity(df.height());

    for row in 0..df.height() {
        let mut object = Map::with_capacity(columns.len());
        for column in columns {
            let value = column
                .get(row)
                .map_err(|e| PipelineError::Store(e.to_string()))?;
            object.insert(column.name().to_string(), any_value_to_json(&value));
        }
        records.push(Value::Object(object));
    }

    Ok(Value::Array(records))
}

fn any_value_to_json(value: &AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::from(*b),
        AnyValue::String(s) => Value::from(*s),
        AnyValue::StringOwned(s) => Value::from(s.as_str()),
        AnyValue::Int8(v) => Value::from(*v),
        AnyValue::Int16(v) => Value::from(*v),
        AnyValue::Int32(v) => Value::from(*v),
        AnyValue::Int64(v) => Value::from(*v),
        AnyValue::UInt8(v) => Value::from(*v),
        AnyValue::UInt16(v) => Value::from(*v),
        AnyValue::UInt32(v) => Value::from(*v),
        AnyValue::UInt64(v) => Value::from(*v),
        AnyValue::Float32(v) => number(f64::from(*v)),
        AnyValue::Float64(v) => number(*v),
        AnyValue::Date(days) => Value::from(
            (NaiveDate::default() + chrono::Duration::days(i64::from(*days))).to_string(),
        ),
        other => Value::from(format!("{other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{Column, DataType};

    #[test]
    fn non_finite_numbers_become_null() {
        assert_eq!(number(f64::NAN), Value::Null);
        assert_eq!(number(f64::INFINITY), Value::Null);
        assert_eq!(number(1.5), Value::from(1.5));
    }

    #[test]
    fn serde_conversion_sanitizes() {
        #[derive(Serialize)]
        struct Payload {
            good: f64,
            bad: f64,
        }
        let value = to_value(&Payload {
            good: 2.0,
            bad: f64::NAN,
        })
        .unwrap();
        assert_eq!(value["good"], Value::from(2.0));
        assert_eq!(value["bad"], Value::Null);
    }

    #[test]
    fn frame_rows_become_objects() {
        let date_col = Column::new("date".into(), vec![19_814i32, 19_815])
            .cast(&DataType::Date)
            .unwrap();
        let df = DataFrame::new(vec![
            Column::new("symbol".into(), vec!["AAPL", "AAPL"]),
            date_col,
            Column::new("close".into(), vec![Some(185.64), None]),
            Column::new("volume".into(), vec![82_488_700u64, 58_414_500]),
        ])
        .unwrap();

        let records = frame_to_records(&df).unwrap();
        let rows = records.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["symbol"], Value::from("AAPL"));
        assert_eq!(rows[0]["date"], Value::from("2024-04-01"));
        assert_eq!(rows[0]["close"], Value::from(185.64));
        assert_eq!(rows[1]["close"], Value::Null);
        assert_eq!(rows[1]["volume"], Value::from(58_414_500u64));
    }
}
