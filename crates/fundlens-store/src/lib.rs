#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Per-ticker directory persistence.
//!
//! [`TickerStore`] owns the layout of one ticker's output directory and the
//! writers for each artifact. The [`json`] module handles JSON-safe
//! conversion; [`report`] renders the plain-text summary.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use fundlens_core::{
    CompanyFacts, CompanyProfile, FactSeries, MarketSnapshot, PipelineError, Result, Symbol,
};
use fundlens_metrics::{GrowthReport, RatioReport, RiskReport};
use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

/// JSON-safe conversion of heterogeneous values.
pub mod json;
/// Human-readable summary report.
pub mod report;

pub use report::SummaryInputs;

const RAW_DIR: &str = "01_raw";
const STATEMENTS_DIR: &str = "02_statements";
const METRICS_DIR: &str = "03_metrics";
const MARKET_DIR: &str = "04_market";
const FILINGS_DIR: &str = "05_filings";

const PRICE_HISTORY_FILE: &str = "Price_History.csv";
const SUMMARY_FILE: &str = "SUMMARY_REPORT.txt";

/// Writer for one ticker's output directory.
#[derive(Clone, Debug)]
pub struct TickerStore {
    symbol: Symbol,
    ticker_dir: PathBuf,
}

impl TickerStore {
    /// Creates a store rooted at `<root>/<TICKER>`.
    ///
    /// Nothing is written until [`TickerStore::reset`] or a writer is called.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, symbol: &Symbol) -> Self {
        let ticker_dir = root.into().join(symbol.as_str());
        Self {
            symbol: symbol.clone(),
            ticker_dir,
        }
    }

    /// The ticker's directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.ticker_dir
    }

    /// Where the price history CSV lives.
    #[must_use]
    pub fn price_history_path(&self) -> PathBuf {
        self.ticker_dir.join(MARKET_DIR).join(PRICE_HISTORY_FILE)
    }

    /// Removes any previous run and recreates the directory layout.
    pub fn reset(&self) -> Result<()> {
        if self.ticker_dir.exists() {
            fs::remove_dir_all(&self.ticker_dir).map_err(store_err)?;
            debug!(path = %self.ticker_dir.display(), "Cleaned previous output");
        }
        for dir in [RAW_DIR, STATEMENTS_DIR, METRICS_DIR, MARKET_DIR, FILINGS_DIR] {
            fs::create_dir_all(self.ticker_dir.join(dir)).map_err(store_err)?;
        }
        Ok(())
    }

    fn write_json<T: Serialize>(&self, dir: &str, file: &str, value: &T) -> Result<()> {
        let json_value = json::to_value(value)?;
        let text =
            serde_json::to_string_pretty(&json_value).map_err(|e| store_err_str(e.to_string()))?;
        let path = self.ticker_dir.join(dir).join(file);
        fs::write(&path, text).map_err(store_err)?;
        debug!(path = %path.display(), "Wrote JSON");
        Ok(())
    }

    /// Writes the filer profile to `01_raw/Company_Profile.json`.
    pub fn write_profile(&self, profile: &CompanyProfile) -> Result<()> {
        self.write_json(RAW_DIR, "Company_Profile.json", profile)
    }

    /// Writes the market snapshot to `01_raw/Market_Snapshot.json`.
    pub fn write_snapshot(&self, snapshot: &MarketSnapshot) -> Result<()> {
        self.write_json(RAW_DIR, "Market_Snapshot.json", snapshot)
    }

    /// Writes the extracted facts to `01_raw/Company_Facts.json` and one CSV
    /// per concept under `02_statements/`.
    ///
    /// Returns the number of statement CSVs written.
    pub fn write_facts(&self, facts: &CompanyFacts) -> Result<usize> {
        self.write_json(RAW_DIR, "Company_Facts.json", facts)?;

        let mut written = 0;
        for series in facts.series() {
            let mut df = series_frame(series)?;
            let path = self
                .ticker_dir
                .join(STATEMENTS_DIR)
                .join(format!("{}.csv", series.concept()));
            let mut file = fs::File::create(&path).map_err(store_err)?;
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(&mut df)
                .map_err(|e| store_err_str(e.to_string()))?;
            written += 1;
        }
        debug!(symbol = %self.symbol, count = written, "Wrote statement CSVs");
        Ok(written)
    }

    /// Writes the ratio/growth/risk reports under `03_metrics/`.
    pub fn write_metrics(
        &self,
        ratios: &RatioReport,
        growth: &GrowthReport,
        risk: &RiskReport,
    ) -> Result<()> {
        self.write_json(METRICS_DIR, "Financial_Ratios.json", ratios)?;
        self.write_json(METRICS_DIR, "Growth_Metrics.json", growth)?;
        self.write_json(METRICS_DIR, "Risk_Metrics.json", risk)
    }

    /// Writes the price history to `04_market/Price_History.csv`, plus a
    /// JSON record dump under `01_raw/`.
    pub fn write_price_history(&self, history: &DataFrame) -> Result<()> {
        let records = json::frame_to_records(history)?;
        self.write_json(RAW_DIR, "Price_History.json", &records)?;

        let path = self.price_history_path();
        let mut file = fs::File::create(&path).map_err(store_err)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut history.clone())
            .map_err(|e| store_err_str(e.to_string()))?;
        debug!(path = %path.display(), rows = history.height(), "Wrote price history");
        Ok(())
    }

    /// Writes filing text to `05_filings/Latest_10K.txt`.
    pub fn write_filing_text(&self, text: &str) -> Result<()> {
        let path = self.ticker_dir.join(FILINGS_DIR).join("Latest_10K.txt");
        let mut file = fs::File::create(&path).map_err(store_err)?;
        file.write_all(text.as_bytes()).map_err(store_err)?;
        Ok(())
    }

    /// Renders and writes the summary report.
    pub fn write_summary(&self, inputs: &SummaryInputs<'_>) -> Result<()> {
        let text = report::render(&self.symbol, inputs);
        fs::write(self.ticker_dir.join(SUMMARY_FILE), text).map_err(store_err)
    }
}

/// Builds the per-concept CSV frame: one row per observation.
fn series_frame(series: &FactSeries) -> Result<DataFrame> {
    let points = series.points();

    let statements: Vec<&str> = points.iter().map(|_| series.statement().as_str()).collect();
    let values: Vec<f64> = points.iter().map(|p| p.value).collect();
    let period_starts: Vec<Option<String>> = points
        .iter()
        .map(|p| p.period_start.map(|d| d.to_string()))
        .collect();
    let period_ends: Vec<String> = points.iter().map(|p| p.period_end.to_string()).collect();
    let fiscal_years: Vec<Option<i32>> = points.iter().map(|p| p.fiscal_year).collect();
    let fiscal_periods: Vec<Option<String>> =
        points.iter().map(|p| p.fiscal_period.clone()).collect();
    let forms: Vec<Option<String>> = points.iter().map(|p| p.form.clone()).collect();
    let filed: Vec<Option<String>> = points
        .iter()
        .map(|p| p.filed.map(|d| d.to_string()))
        .collect();

    DataFrame::new(vec![
        Column::new("statement".into(), statements),
        Column::new("value".into(), values),
        Column::new("period_start".into(), period_starts),
        Column::new("period_end".into(), period_ends),
        Column::new("fiscal_year".into(), fiscal_years),
        Column::new("fiscal_period".into(), fiscal_periods),
        Column::new("form".into(), forms),
        Column::new("filed".into(), filed),
    ])
    .map_err(|e| store_err_str(e.to_string()))
}

fn store_err(e: std::io::Error) -> PipelineError {
    PipelineError::Store(e.to_string())
}

fn store_err_str(e: String) -> PipelineError {
    PipelineError::Store(e)
}
