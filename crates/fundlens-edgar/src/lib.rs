#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! SEC EDGAR data source.
//!
//! This crate provides access to SEC EDGAR filings:
//!
//! - CIK (Central Index Key) lookup from ticker symbols
//! - Company facts from the XBRL company-facts API
//! - Extraction of fact series through the [`concepts`] table
//! - Filer metadata from the submissions API
//! - Plain-text 10-K retrieval
//!
//! # Example
//!
//! ```no_run
//! use fundlens_edgar::EdgarClient;
//! use fundlens_core::{FactSource, Symbol};
//!
//! #[tokio::main]
//! async fn main() -> fundlens_core::Result<()> {
//!     let client = EdgarClient::new("MyApp/1.0 (contact@example.com)");
//!
//!     let symbol = Symbol::new("AAPL");
//!     let facts = client.company_facts(&symbol).await?;
//!     println!(
//!         "{}: latest revenue {:?}",
//!         facts.entity_name,
//!         facts.latest_value("revenue")
//!     );
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use fundlens_core::{
    Cik, CompanyFacts, CompanyProfile, DataSource, FactPoint, FactSeries, FactSource,
    PipelineError, Result, Symbol,
};
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::debug;

pub mod concepts;

/// SEC EDGAR data API base URL.
const EDGAR_BASE_URL: &str = "https://data.sec.gov";

/// SEC company tickers listing URL.
const COMPANY_TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";

/// SEC filing archives base URL.
const ARCHIVES_BASE_URL: &str = "https://www.sec.gov/Archives/edgar/data";

/// Minimum interval between requests (SEC allows at most 10 per second).
const SEC_MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Serializes requests so the SEC rate limit is never exceeded.
#[derive(Debug)]
struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Instant::now() - min_interval,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}

/// A row of the SEC company tickers listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickerListing {
    /// Ticker symbol.
    pub symbol: Symbol,
    /// The filer's CIK.
    pub cik: Cik,
    /// Registered entity name.
    pub title: String,
}

/// SEC EDGAR client.
///
/// The SEC requires an identifying User-Agent ("AppName/Version
/// (contact@email.com)") and limits clients to 10 requests per second;
/// both are enforced here.
#[derive(Debug)]
pub struct EdgarClient {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl EdgarClient {
    /// Creates a client with the given identifying User-Agent.
    #[must_use]
    pub fn new(user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");
        Self::with_client(client)
    }

    /// Creates a client around a pre-configured `reqwest::Client`.
    ///
    /// The client should already carry an identifying User-Agent.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(SEC_MIN_INTERVAL))),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.rate_limiter.lock().await.wait().await;

        debug!(url, "EDGAR request");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PipelineError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PipelineError::RateLimited {
                provider: "SEC EDGAR".to_string(),
                retry_after: Some(Duration::from_secs(60)),
            });
        }

        if !response.status().is_success() {
            return Err(PipelineError::Network(format!(
                "HTTP {} for {}",
                response.status(),
                url
            )));
        }

        response
            .json()
            .await
            .map_err(|e| PipelineError::Parse(e.to_string()))
    }

    /// Fetches the full SEC ticker listing.
    pub async fn company_tickers(&self) -> Result<Vec<TickerListing>> {
        let data: HashMap<String, TickerEntry> = self.get_json(COMPANY_TICKERS_URL).await?;

        let mut listings: Vec<TickerListing> = data
            .into_values()
            .map(|entry| TickerListing {
                symbol: Symbol::new(entry.ticker),
                cik: Cik::from(entry.cik_str),
                title: entry.title,
            })
            .collect();
        listings.sort_by(|a, b| a.symbol.as_str().cmp(b.symbol.as_str()));
        Ok(listings)
    }

    /// Looks up a company's CIK from its ticker symbol.
    pub async fn lookup_cik(&self, symbol: &Symbol) -> Result<Cik> {
        if symbol.as_str().is_empty() {
            return Err(PipelineError::InvalidParameter("Empty ticker".to_string()));
        }

        let data: HashMap<String, TickerEntry> = self.get_json(COMPANY_TICKERS_URL).await?;
        for entry in data.values() {
            if entry.ticker.to_uppercase() == symbol.as_str() {
                let cik = Cik::from(entry.cik_str);
                debug!(%cik, %symbol, "Resolved CIK");
                return Ok(cik);
            }
        }

        Err(PipelineError::TickerNotFound(symbol.to_string()))
    }

    async fn fetch_submissions(&self, cik: &Cik) -> Result<SubmissionsResponse> {
        let url = format!("{EDGAR_BASE_URL}/submissions/CIK{cik}.json");
        self.get_json(&url).await
    }

    async fn fetch_company_facts(&self, cik: &Cik) -> Result<CompanyFactsResponse> {
        let url = format!("{EDGAR_BASE_URL}/api/xbrl/companyfacts/CIK{cik}.json");
        self.get_json(&url).await
    }

    async fn fetch_document(&self, url: &str) -> Result<String> {
        self.rate_limiter.lock().await.wait().await;

        debug!(url, "EDGAR document request");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PipelineError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::Network(format!(
                "HTTP {} for {}",
                response.status(),
                url
            )));
        }

        response
            .text()
            .await
            .map_err(|e| PipelineError::Network(e.to_string()))
    }
}

impl DataSource for EdgarClient {
    fn name(&self) -> &str {
        "SEC EDGAR"
    }

    fn description(&self) -> &str {
        "SEC EDGAR source for XBRL company facts, filer metadata, and filing text"
    }
}

#[async_trait]
impl FactSource for EdgarClient {
    async fn company_facts(&self, symbol: &Symbol) -> Result<CompanyFacts> {
        let cik = self.lookup_cik(symbol).await?;
        let response = self.fetch_company_facts(&cik).await?;
        let facts = extract_facts(&response);
        debug!(%symbol, series = facts.len(), "Extracted fact series");
        Ok(facts)
    }

    async fn company_profile(&self, symbol: &Symbol) -> Result<CompanyProfile> {
        let cik = self.lookup_cik(symbol).await?;
        let submissions = self.fetch_submissions(&cik).await?;

        Ok(CompanyProfile {
            symbol: symbol.clone(),
            name: submissions.name,
            sic: submissions.sic,
            sic_description: submissions.sic_description,
            exchanges: submissions.exchanges,
            tickers: submissions.tickers,
            fiscal_year_end: submissions.fiscal_year_end,
        })
    }

    async fn latest_filing_text(&self, symbol: &Symbol, form: &str) -> Result<String> {
        let cik = self.lookup_cik(symbol).await?;
        let submissions = self.fetch_submissions(&cik).await?;

        let recent = submissions
            .filings
            .map(|f| f.recent)
            .ok_or_else(|| PipelineError::DataNotAvailable {
                symbol: symbol.to_string(),
                detail: "no filings listed".to_string(),
            })?;

        let index = recent
            .form
            .iter()
            .position(|f| f == form)
            .ok_or_else(|| PipelineError::DataNotAvailable {
                symbol: symbol.to_string(),
                detail: format!("no {form} filing found"),
            })?;

        let accession = recent
            .accession_number
            .get(index)
            .map(|a| a.replace('-', ""))
            .unwrap_or_default();
        let document = recent.primary_document.get(index).cloned().unwrap_or_default();
        if accession.is_empty() || document.is_empty() {
            return Err(PipelineError::Parse(format!(
                "incomplete filing index entry for {symbol}"
            )));
        }

        let url = format!(
            "{ARCHIVES_BASE_URL}/{}/{accession}/{document}",
            cik.unpadded()
        );
        let html = self.fetch_document(&url).await?;
        Ok(html_to_text(&html))
    }

    async fn universe(&self) -> Result<Vec<Symbol>> {
        let listings = self.company_tickers().await?;
        Ok(listings.into_iter().map(|l| l.symbol).collect())
    }
}

// =============================================================================
// Fact extraction
// =============================================================================

/// Unit preference order for fact values.
///
/// Monetary concepts report in USD; per-share and share-count concepts use
/// the other units.
const UNIT_PREFERENCE: &[&str] = &["USD", "USD/shares", "shares", "pure"];

fn extract_facts(response: &CompanyFactsResponse) -> CompanyFacts {
    let mut series = Vec::new();

    for concept in concepts::CONCEPTS {
        if let Some(points) = extract_concept(response, concept) {
            series.push(FactSeries::new(concept.name, concept.statement, points));
        }
    }

    CompanyFacts::new(
        Cik::from(response.cik),
        response.entity_name.as_str(),
        series,
    )
}

fn extract_concept(
    response: &CompanyFactsResponse,
    concept: &concepts::Concept,
) -> Option<Vec<FactPoint>> {
    // US-GAAP first; a few concepts (share counts) live in DEI.
    for taxonomy in ["us-gaap", "dei"] {
        let Some(taxonomy_facts) = response.facts.get(taxonomy) else {
            continue;
        };
        for tag in concept.tags {
            let Some(tag_facts) = taxonomy_facts.get(*tag) else {
                continue;
            };
            let Some(units) = &tag_facts.units else {
                continue;
            };
            for unit in UNIT_PREFERENCE {
                if let Some(raw_facts) = units.get(*unit) {
                    let points: Vec<FactPoint> =
                        raw_facts.iter().filter_map(to_fact_point).collect();
                    if !points.is_empty() {
                        return Some(points);
                    }
                }
            }
        }
    }
    None
}

fn to_fact_point(raw: &RawFact) -> Option<FactPoint> {
    let period_end = parse_date(&raw.end)?;
    Some(FactPoint {
        value: raw.val,
        period_start: raw.start.as_deref().and_then(parse_date),
        period_end,
        filed: raw.filed.as_deref().and_then(parse_date),
        fiscal_year: raw.fy,
        fiscal_period: raw.fp.clone(),
        form: raw.form.clone(),
        accession: raw.accn.clone(),
        frame: raw.frame.clone(),
    })
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Strips an EDGAR filing document down to its visible text.
fn html_to_text(html: &str) -> String {
    let document = scraper::Html::parse_document(html);
    let mut text = String::new();
    for chunk in document.root_element().text() {
        let trimmed = chunk.trim();
        if !trimmed.is_empty() {
            text.push_str(trimmed);
            text.push('\n');
        }
    }
    text
}

// =============================================================================
// SEC API response types
// =============================================================================

/// Row of the SEC company tickers JSON.
#[derive(Debug, Deserialize)]
struct TickerEntry {
    cik_str: u64,
    ticker: String,
    title: String,
}

/// Response from the XBRL company-facts API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompanyFactsResponse {
    cik: u64,
    entity_name: String,
    /// Facts organized by taxonomy, then tag.
    facts: HashMap<String, HashMap<String, TagFacts>>,
}

/// Facts reported under a single XBRL tag.
#[derive(Debug, Deserialize)]
struct TagFacts {
    #[serde(default)]
    #[allow(dead_code)]
    label: Option<String>,
    /// Unit (USD, shares, ...) to reported values.
    units: Option<HashMap<String, Vec<RawFact>>>,
}

/// A single reported value with filing metadata.
#[derive(Debug, Deserialize)]
struct RawFact {
    end: String,
    val: f64,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    accn: Option<String>,
    #[serde(default)]
    fy: Option<i32>,
    #[serde(default)]
    fp: Option<String>,
    #[serde(default)]
    form: Option<String>,
    #[serde(default)]
    filed: Option<String>,
    #[serde(default)]
    frame: Option<String>,
}

/// Response from the submissions API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionsResponse {
    name: String,
    #[serde(default)]
    sic: Option<String>,
    #[serde(default)]
    sic_description: Option<String>,
    #[serde(default)]
    exchanges: Vec<String>,
    #[serde(default)]
    tickers: Vec<String>,
    #[serde(default)]
    fiscal_year_end: Option<String>,
    #[serde(default)]
    filings: Option<Filings>,
}

#[derive(Debug, Deserialize)]
struct Filings {
    recent: RecentFilings,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecentFilings {
    #[serde(default)]
    form: Vec<String>,
    #[serde(default)]
    accession_number: Vec<String>,
    #[serde(default)]
    primary_document: Vec<String>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_response() -> CompanyFactsResponse {
        let value = json!({
            "cik": 320193,
            "entityName": "Apple Inc.",
            "facts": {
                "us-gaap": {
                    "RevenueFromContractWithCustomerExcludingAssessedTax": {
                        "label": "Revenue",
                        "units": {
                            "USD": [
                                {
                                    "end": "2022-09-24",
                                    "val": 394328000000.0,
                                    "fy": 2022,
                                    "fp": "FY",
                                    "form": "10-K",
                                    "filed": "2022-10-28",
                                    "start": "2021-09-26"
                                },
                                {
                                    "end": "2023-09-30",
                                    "val": 383285000000.0,
                                    "fy": 2023,
                                    "fp": "FY",
                                    "form": "10-K",
                                    "filed": "2023-11-03",
                                    "start": "2022-09-25"
                                }
                            ]
                        }
                    },
                    "EarningsPerShareBasic": {
                        "label": "EPS",
                        "units": {
                            "USD/shares": [
                                {
                                    "end": "2023-09-30",
                                    "val": 6.16,
                                    "fy": 2023,
                                    "fp": "FY",
                                    "form": "10-K",
                                    "filed": "2023-11-03"
                                }
                            ]
                        }
                    }
                },
                "dei": {
                    "EntityCommonStockSharesOutstanding": {
                        "label": "Shares",
                        "units": {
                            "shares": [
                                {
                                    "end": "2023-10-20",
                                    "val": 15552752000.0,
                                    "fy": 2023,
                                    "fp": "FY",
                                    "form": "10-K",
                                    "filed": "2023-11-03"
                                }
                            ]
                        }
                    }
                }
            }
        });
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn extracts_revenue_via_candidate_tag() {
        let facts = extract_facts(&sample_response());
        let revenue = facts.get("revenue").expect("revenue series");
        assert_eq!(revenue.len(), 2);
        assert_eq!(revenue.latest_value(), Some(383_285_000_000.0));
        assert_eq!(
            revenue.latest().unwrap().fiscal_period.as_deref(),
            Some("FY")
        );
    }

    #[test]
    fn extracts_per_share_units() {
        let facts = extract_facts(&sample_response());
        assert_eq!(facts.latest_value("eps_basic"), Some(6.16));
    }

    #[test]
    fn falls_back_to_dei_taxonomy() {
        let facts = extract_facts(&sample_response());
        assert_eq!(
            facts.latest_value("shares_outstanding"),
            Some(15_552_752_000.0)
        );
    }

    #[test]
    fn missing_concepts_produce_no_series() {
        let facts = extract_facts(&sample_response());
        assert!(facts.get("inventory").is_none());
        assert_eq!(facts.entity_name, "Apple Inc.");
        assert_eq!(facts.cik.as_str(), "0000320193");
    }

    #[test]
    fn html_text_extraction() {
        let html = "<html><body><h1>ANNUAL REPORT</h1><p>Item 1. <b>Business</b></p></body></html>";
        let text = html_to_text(html);
        assert!(text.contains("ANNUAL REPORT"));
        assert!(text.contains("Business"));
        assert!(!text.contains('<'));
    }

    #[test]
    fn client_metadata() {
        let client = EdgarClient::new("Test/1.0 (test@example.com)");
        assert_eq!(client.name(), "SEC EDGAR");
        assert!(!client.description().is_empty());
    }
}
