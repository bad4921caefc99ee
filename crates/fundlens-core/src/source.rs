//! Source traits for fetching company data.
//!
//! - [`DataSource`] - Base trait for all sources
//! - [`FactSource`] - SEC filing facts and company metadata
//! - [`MarketSource`] - Price history and market snapshots

use async_trait::async_trait;
use chrono::NaiveDate;
use polars::prelude::DataFrame;
use std::fmt::Debug;

use crate::{
    error::Result,
    types::{CompanyFacts, CompanyProfile, MarketSnapshot, Symbol},
};

/// Base trait for all data sources.
pub trait DataSource: Send + Sync + Debug {
    /// Returns the name of this source (e.g. "SEC EDGAR").
    fn name(&self) -> &str;

    /// Returns a description of this source.
    fn description(&self) -> &str;
}

/// Source of filing-derived fundamentals.
///
/// Implement this trait to provide XBRL facts and filer metadata.
#[async_trait]
pub trait FactSource: DataSource {
    /// Fetches all extractable fact series for a ticker.
    async fn company_facts(&self, symbol: &Symbol) -> Result<CompanyFacts>;

    /// Fetches filer metadata for a ticker.
    async fn company_profile(&self, symbol: &Symbol) -> Result<CompanyProfile>;

    /// Fetches the plain text of the most recent filing of the given form
    /// type (e.g. "10-K").
    async fn latest_filing_text(&self, symbol: &Symbol, form: &str) -> Result<String>;

    /// Lists every ticker the source knows about.
    async fn universe(&self) -> Result<Vec<Symbol>>;
}

/// Source of market price data.
#[async_trait]
pub trait MarketSource: DataSource {
    /// Fetches daily OHLCV history for a ticker.
    ///
    /// Returns a DataFrame with columns: symbol, date, open, high, low,
    /// close, volume, adjusted_close. A `None` bound means "as far as the
    /// source goes" on that side.
    async fn daily_history(
        &self,
        symbol: &Symbol,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<DataFrame>;

    /// Fetches point-in-time market scalars for a ticker.
    async fn market_snapshot(&self, symbol: &Symbol) -> Result<MarketSnapshot>;
}
