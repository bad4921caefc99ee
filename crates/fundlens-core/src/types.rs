//! Core data types for company fundamentals.
//!
//! This module defines the fundamental data structures:
//!
//! - [`Symbol`] - Ticker symbol
//! - [`Cik`] - SEC Central Index Key
//! - [`FactPoint`] / [`FactSeries`] - XBRL fact observations per concept
//! - [`CompanyFacts`] - All extracted fact series for a filer
//! - [`CompanyProfile`] - Filer metadata from EDGAR submissions
//! - [`MarketSnapshot`] - Point-in-time market scalars from a quote source

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::period::{PeriodType, StatementKind};

/// A ticker symbol.
///
/// Symbols are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// SEC Central Index Key.
///
/// Stored zero-padded to 10 digits, the form the EDGAR data APIs expect.
/// The archive URLs use the unpadded integer form, available via
/// [`Cik::unpadded`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cik(String);

impl Cik {
    /// Creates a CIK from any digit string or integer-like string,
    /// zero-padding to 10 digits.
    #[must_use]
    pub fn new(raw: impl fmt::Display) -> Self {
        Self(format!("{:0>10}", raw))
    }

    /// Returns the zero-padded 10-digit form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the unpadded form used in EDGAR archive paths.
    #[must_use]
    pub fn unpadded(&self) -> &str {
        let trimmed = self.0.trim_start_matches('0');
        if trimmed.is_empty() { "0" } else { trimmed }
    }
}

impl fmt::Display for Cik {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Cik {
    fn from(raw: u64) -> Self {
        Self::new(raw)
    }
}

/// A single XBRL fact observation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FactPoint {
    /// Reported value.
    pub value: f64,
    /// Start of the reporting period (absent for instant facts).
    pub period_start: Option<NaiveDate>,
    /// End of the reporting period.
    pub period_end: NaiveDate,
    /// Date the carrying filing was submitted.
    pub filed: Option<NaiveDate>,
    /// Fiscal year of the filing.
    pub fiscal_year: Option<i32>,
    /// Fiscal period label (FY, Q1..Q4).
    pub fiscal_period: Option<String>,
    /// Form type of the carrying filing (10-K, 10-Q, ...).
    pub form: Option<String>,
    /// Accession number of the carrying filing.
    pub accession: Option<String>,
    /// XBRL frame identifier, when assigned.
    pub frame: Option<String>,
}

impl FactPoint {
    /// Creates a fact point with just a value and period end.
    #[must_use]
    pub fn new(value: f64, period_end: NaiveDate) -> Self {
        Self {
            value,
            period_start: None,
            period_end,
            filed: None,
            fiscal_year: None,
            fiscal_period: None,
            form: None,
            accession: None,
            frame: None,
        }
    }

    /// Returns true if this point was reported in an annual (10-K) filing.
    #[must_use]
    pub fn is_annual(&self) -> bool {
        self.form
            .as_deref()
            .is_some_and(|form| PeriodType::Annual.matches_form(form))
    }
}

/// A named time series of fact observations for one accounting concept.
///
/// Points are kept sorted by `(period_end, filed)` and the series is
/// immutable once constructed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FactSeries {
    concept: String,
    statement: StatementKind,
    points: Vec<FactPoint>,
}

impl FactSeries {
    /// Creates a series for a concept, sorting the points chronologically.
    #[must_use]
    pub fn new(
        concept: impl Into<String>,
        statement: StatementKind,
        mut points: Vec<FactPoint>,
    ) -> Self {
        points.sort_by(|a, b| (a.period_end, a.filed).cmp(&(b.period_end, b.filed)));
        Self {
            concept: concept.into(),
            statement,
            points,
        }
    }

    /// The semantic concept name (e.g. "revenue").
    #[must_use]
    pub fn concept(&self) -> &str {
        &self.concept
    }

    /// The statement this concept belongs to.
    #[must_use]
    pub const fn statement(&self) -> StatementKind {
        self.statement
    }

    /// The observations, oldest first.
    #[must_use]
    pub fn points(&self) -> &[FactPoint] {
        &self.points
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the series has no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The most recent observation by `(period_end, filed)`.
    #[must_use]
    pub fn latest(&self) -> Option<&FactPoint> {
        self.points.last()
    }

    /// The most recent reported value.
    #[must_use]
    pub fn latest_value(&self) -> Option<f64> {
        self.latest().map(|p| p.value)
    }

    /// The annual (10-K) observations, one per period end.
    ///
    /// Company-facts responses repeat each period across later filings;
    /// deduplication keeps the most recently filed point per period end.
    #[must_use]
    pub fn annual(&self) -> Self {
        let mut by_period: BTreeMap<NaiveDate, FactPoint> = BTreeMap::new();
        for point in self.points.iter().filter(|p| p.is_annual()) {
            // Input is sorted by filed date within a period, so later wins.
            by_period.insert(point.period_end, point.clone());
        }
        Self {
            concept: self.concept.clone(),
            statement: self.statement,
            points: by_period.into_values().collect(),
        }
    }

    /// The raw values, oldest first.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// All extracted fact series for a filer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompanyFacts {
    /// The filer's CIK.
    pub cik: Cik,
    /// Entity name as registered with the SEC.
    pub entity_name: String,
    series: Vec<FactSeries>,
}

impl CompanyFacts {
    /// Creates a fact collection.
    #[must_use]
    pub fn new(cik: Cik, entity_name: impl Into<String>, series: Vec<FactSeries>) -> Self {
        Self {
            cik,
            entity_name: entity_name.into(),
            series,
        }
    }

    /// All extracted series.
    #[must_use]
    pub fn series(&self) -> &[FactSeries] {
        &self.series
    }

    /// Looks up a series by concept name.
    #[must_use]
    pub fn get(&self, concept: &str) -> Option<&FactSeries> {
        self.series.iter().find(|s| s.concept() == concept)
    }

    /// The most recent value for a concept, if any.
    #[must_use]
    pub fn latest_value(&self, concept: &str) -> Option<f64> {
        self.get(concept).and_then(FactSeries::latest_value)
    }

    /// Number of extracted series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Returns true if no series were extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Filer metadata from the EDGAR submissions endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// Ticker symbol the profile was requested for.
    pub symbol: Symbol,
    /// Registered entity name.
    pub name: String,
    /// SIC code.
    pub sic: Option<String>,
    /// SIC code description (EDGAR's industry classification).
    pub sic_description: Option<String>,
    /// Exchanges the filer lists on.
    pub exchanges: Vec<String>,
    /// All tickers registered for the filer.
    pub tickers: Vec<String>,
    /// Fiscal year end as MMDD.
    pub fiscal_year_end: Option<String>,
}

/// Point-in-time market scalars from a quote source.
///
/// Every numeric field may be absent; downstream consumers treat missing
/// values as a normal case.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Ticker symbol.
    pub symbol: Symbol,
    /// Market capitalization.
    pub market_cap: Option<f64>,
    /// Enterprise value.
    pub enterprise_value: Option<f64>,
    /// Shares outstanding.
    pub shares_outstanding: Option<f64>,
    /// Beta coefficient.
    pub beta: Option<f64>,
    /// Trailing price-to-earnings ratio.
    pub trailing_pe: Option<f64>,
    /// Forward price-to-earnings ratio.
    pub forward_pe: Option<f64>,
    /// Price/earnings-to-growth ratio.
    pub peg_ratio: Option<f64>,
    /// Price-to-book ratio.
    pub price_to_book: Option<f64>,
    /// Trailing price-to-sales ratio.
    pub price_to_sales: Option<f64>,
    /// Enterprise value to revenue.
    pub ev_to_revenue: Option<f64>,
    /// Enterprise value to EBITDA.
    pub ev_to_ebitda: Option<f64>,
    /// EBITDA.
    pub ebitda: Option<f64>,
    /// Dividend yield.
    pub dividend_yield: Option<f64>,
    /// Business sector.
    pub sector: Option<String>,
    /// Industry within the sector.
    pub industry: Option<String>,
}

impl MarketSnapshot {
    /// Creates an empty snapshot for a symbol.
    #[must_use]
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            ..Default::default()
        }
    }
}
