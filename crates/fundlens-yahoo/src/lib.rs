#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Yahoo Finance data source.
//!
//! Implements [`MarketSource`] on top of Yahoo's chart and quote-summary
//! APIs.
//!
//! # Example
//!
//! ```no_run
//! use fundlens_yahoo::YahooClient;
//! use fundlens_core::{MarketSource, Symbol};
//! use chrono::NaiveDate;
//!
//! # async fn example() -> fundlens_core::Result<()> {
//! let client = YahooClient::new();
//! let symbol = Symbol::new("AAPL");
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
//!
//! let df = client.daily_history(&symbol, Some(start), Some(end)).await?;
//! println!("Fetched {} rows", df.height());
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use fundlens_core::{
    DataSource, MarketSnapshot, MarketSource, PipelineError, Result, Symbol,
};
use polars::prelude::*;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::debug;

/// Yahoo Finance chart API base URL.
const CHART_API_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance quote summary API base URL.
const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";

/// Quote summary modules the snapshot needs.
const QUOTE_SUMMARY_MODULES: &str = "assetProfile,summaryDetail,defaultKeyStatistics,financialData";

/// Default minimum delay between requests, in milliseconds.
const DEFAULT_RATE_LIMIT_MS: u64 = 1000;

/// User agent for HTTP requests.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Yahoo Finance client.
///
/// Implements [`DataSource`] and [`MarketSource`].
#[derive(Debug)]
pub struct YahooClient {
    client: reqwest::Client,
    rate_limit_ms: u64,
    last_request_ms: AtomicU64,
}

impl YahooClient {
    /// Creates a client with default settings (one request per second).
    #[must_use]
    pub fn new() -> Self {
        Self::with_rate_limit(Duration::from_millis(DEFAULT_RATE_LIMIT_MS))
    }

    /// Creates a client with a custom minimum delay between requests.
    #[must_use]
    pub fn with_rate_limit(rate_limit: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            rate_limit_ms: rate_limit.as_millis() as u64,
            last_request_ms: AtomicU64::new(0),
        }
    }

    /// Creates a client around a pre-configured `reqwest::Client`.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
            last_request_ms: AtomicU64::new(0),
        }
    }

    fn now_ms() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    async fn apply_rate_limit(&self) {
        let elapsed = Self::now_ms().saturating_sub(self.last_request_ms.load(Ordering::Relaxed));
        if elapsed < self.rate_limit_ms {
            let wait = self.rate_limit_ms - elapsed;
            debug!("Rate limiting: waiting {}ms", wait);
            sleep(Duration::from_millis(wait)).await;
        }
        self.last_request_ms.store(Self::now_ms(), Ordering::Relaxed);
    }

    /// Builds the chart API URL for a symbol and optional date range.
    ///
    /// An open start means "from the beginning of the listing"; an open end
    /// means "up to now".
    fn build_chart_url(
        &self,
        symbol: &Symbol,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> String {
        let start_ts = start
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| Utc.from_utc_datetime(&dt).timestamp())
            .unwrap_or(0);

        let end_ts = end
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .map(|dt| Utc.from_utc_datetime(&dt).timestamp())
            .unwrap_or_else(|| Utc::now().timestamp());

        format!(
            "{}/{}?period1={}&period2={}&interval=1d&includeAdjustedClose=true",
            CHART_API_URL,
            symbol.as_str(),
            start_ts,
            end_ts,
        )
    }

    async fn get(&self, symbol: &Symbol, url: &str) -> Result<reqwest::Response> {
        self.apply_rate_limit().await;

        debug!(url, "Yahoo request");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PipelineError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PipelineError::RateLimited {
                provider: "Yahoo Finance".to_string(),
                retry_after: Some(Duration::from_secs(60)),
            });
        }

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PipelineError::TickerNotFound(symbol.to_string()));
        }

        if !response.status().is_success() {
            return Err(PipelineError::Network(format!(
                "HTTP {} for {}",
                response.status(),
                symbol
            )));
        }

        Ok(response)
    }

    /// Converts a chart response into the canonical price-history frame.
    fn parse_chart_response(&self, symbol: &Symbol, response: ChartResponse) -> Result<DataFrame> {
        if let Some(error) = response.chart.error {
            if error.code == "Not Found" {
                return Err(PipelineError::TickerNotFound(symbol.to_string()));
            }
            return Err(PipelineError::Other(format!(
                "{}: {}",
                error.code, error.description
            )));
        }

        let result = response
            .chart
            .result
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::TickerNotFound(symbol.to_string()))?;

        let timestamps = result.timestamp.unwrap_or_default();
        if timestamps.is_empty() {
            return Err(PipelineError::DataNotAvailable {
                symbol: symbol.to_string(),
                detail: "empty price history".to_string(),
            });
        }

        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::Parse("Missing quote data".to_string()))?;

        let adj_close = result
            .indicators
            .adjclose
            .and_then(|ac| ac.into_iter().next())
            .map(|ac| ac.adjclose)
            .unwrap_or_default();

        // Timestamps arrive as epoch seconds; the frame carries plain dates.
        let epoch = NaiveDate::default();
        let dates: Vec<i32> = timestamps
            .iter()
            .map(|&ts| {
                Utc.timestamp_opt(ts, 0)
                    .single()
                    .map_or(0, |dt| (dt.date_naive() - epoch).num_days() as i32)
            })
            .collect();

        let adj_closes = if adj_close.len() == dates.len() {
            adj_close
        } else {
            quote.close.clone()
        };

        let volumes: Vec<Option<f64>> = quote
            .volume
            .iter()
            .map(|v| v.map(|v| v as f64))
            .collect();

        let date_col = Column::new("date".into(), dates)
            .cast(&DataType::Date)
            .map_err(|e| PipelineError::Other(e.to_string()))?;

        DataFrame::new(vec![
            Column::new("symbol".into(), vec![symbol.as_str(); timestamps.len()]),
            date_col,
            Column::new("open".into(), quote.open),
            Column::new("high".into(), quote.high),
            Column::new("low".into(), quote.low),
            Column::new("close".into(), quote.close),
            Column::new("volume".into(), volumes),
            Column::new("adjusted_close".into(), adj_closes),
        ])
        .map_err(|e| PipelineError::Other(e.to_string()))
    }
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSource for YahooClient {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    fn description(&self) -> &str {
        "Yahoo Finance source for daily price history and market snapshots"
    }
}

#[async_trait]
impl MarketSource for YahooClient {
    async fn daily_history(
        &self,
        symbol: &Symbol,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<DataFrame> {
        if let (Some(start), Some(end)) = (start, end)
            && start > end
        {
            return Err(PipelineError::InvalidParameter(format!(
                "Start date {start} is after end date {end}"
            )));
        }

        let url = self.build_chart_url(symbol, start, end);
        let response = self.get(symbol, &url).await?;

        let chart: ChartResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Parse(e.to_string()))?;

        self.parse_chart_response(symbol, chart)
    }

    async fn market_snapshot(&self, symbol: &Symbol) -> Result<MarketSnapshot> {
        let url = format!(
            "{}/{}?modules={}",
            QUOTE_SUMMARY_URL,
            symbol.as_str(),
            QUOTE_SUMMARY_MODULES,
        );
        let response = self.get(symbol, &url).await?;

        let summary: QuoteSummaryResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Parse(e.to_string()))?;

        let result = summary
            .quote_summary
            .result
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::TickerNotFound(symbol.to_string()))?;

        Ok(build_snapshot(symbol, result))
    }
}

fn build_snapshot(symbol: &Symbol, data: QuoteSummaryData) -> MarketSnapshot {
    let profile = data.asset_profile.unwrap_or_default();
    let detail = data.summary_detail.unwrap_or_default();
    let stats = data.default_key_statistics.unwrap_or_default();
    let financial = data.financial_data.unwrap_or_default();

    MarketSnapshot {
        symbol: symbol.clone(),
        market_cap: detail.market_cap.raw(),
        enterprise_value: stats.enterprise_value.raw(),
        shares_outstanding: stats.shares_outstanding.raw(),
        beta: stats.beta.raw().or(detail.beta.raw()),
        trailing_pe: detail.trailing_pe.raw(),
        forward_pe: stats.forward_pe.raw().or(detail.forward_pe.raw()),
        peg_ratio: stats.peg_ratio.raw(),
        price_to_book: stats.price_to_book.raw(),
        price_to_sales: detail.price_to_sales_trailing_12_months.raw(),
        ev_to_revenue: stats.enterprise_to_revenue.raw(),
        ev_to_ebitda: stats.enterprise_to_ebitda.raw(),
        ebitda: financial.ebitda.raw(),
        dividend_yield: detail.dividend_yield.raw(),
        sector: profile.sector,
        industry: profile.industry,
    }
}

// ============================================================================
// Yahoo Finance API response types
// ============================================================================

/// Chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    result: Vec<ChartData>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    adjclose: Vec<Option<f64>>,
}

/// Quote summary API response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummaryResult,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    #[serde(default)]
    result: Vec<QuoteSummaryData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryData {
    asset_profile: Option<AssetProfile>,
    summary_detail: Option<SummaryDetail>,
    default_key_statistics: Option<KeyStatistics>,
    financial_data: Option<FinancialData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetProfile {
    sector: Option<String>,
    industry: Option<String>,
}

/// Yahoo wraps numbers as `{"raw": 1.23, "fmt": "1.23"}`.
#[derive(Debug, Default, Deserialize)]
struct FmtValue {
    #[serde(default)]
    raw: Option<f64>,
}

impl FmtValue {
    fn raw(&self) -> Option<f64> {
        self.raw
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    #[serde(default)]
    market_cap: FmtValue,
    #[serde(default)]
    trailing_pe: FmtValue,
    #[serde(default)]
    forward_pe: FmtValue,
    #[serde(default)]
    beta: FmtValue,
    #[serde(default)]
    dividend_yield: FmtValue,
    #[serde(default)]
    price_to_sales_trailing_12_months: FmtValue,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatistics {
    #[serde(default)]
    enterprise_value: FmtValue,
    #[serde(default)]
    shares_outstanding: FmtValue,
    #[serde(default)]
    beta: FmtValue,
    #[serde(default)]
    forward_pe: FmtValue,
    #[serde(default)]
    peg_ratio: FmtValue,
    #[serde(default)]
    price_to_book: FmtValue,
    #[serde(default)]
    enterprise_to_revenue: FmtValue,
    #[serde(default)]
    enterprise_to_ebitda: FmtValue,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialData {
    #[serde(default)]
    ebitda: FmtValue,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chart_url_with_range() {
        let client = YahooClient::new();
        let symbol = Symbol::new("AAPL");
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();

        let url = client.build_chart_url(&symbol, Some(start), Some(end));
        assert!(url.contains("/AAPL?"));
        assert!(url.contains("interval=1d"));
        assert!(url.contains("includeAdjustedClose=true"));
        assert!(url.contains("period1=1704067200"));
    }

    #[test]
    fn chart_url_open_start_is_full_history() {
        let client = YahooClient::new();
        let url = client.build_chart_url(&Symbol::new("MSFT"), None, None);
        assert!(url.contains("period1=0"));
    }

    #[test]
    fn parse_chart_response_builds_frame() {
        let client = YahooClient::new();
        let symbol = Symbol::new("AAPL");
        let response: ChartResponse = serde_json::from_value(json!({
            "chart": {
                "result": [{
                    "timestamp": [1704153600i64, 1704240000i64],
                    "indicators": {
                        "quote": [{
                            "open": [187.15, 184.22],
                            "high": [188.44, 185.88],
                            "low": [183.89, 183.43],
                            "close": [185.64, 184.25],
                            "volume": [82488700u64, 58414500u64]
                        }],
                        "adjclose": [{"adjclose": [184.94, 183.56]}]
                    }
                }],
                "error": null
            }
        }))
        .unwrap();

        let df = client.parse_chart_response(&symbol, response).unwrap();
        assert_eq!(df.height(), 2);
        let names: Vec<&str> = df
            .get_column_names()
            .into_iter()
            .map(|s| s.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "symbol",
                "date",
                "open",
                "high",
                "low",
                "close",
                "volume",
                "adjusted_close"
            ]
        );
        assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
    }

    #[test]
    fn parse_chart_response_maps_api_error() {
        let client = YahooClient::new();
        let response: ChartResponse = serde_json::from_value(json!({
            "chart": {
                "result": [],
                "error": {"code": "Not Found", "description": "No data found"}
            }
        }))
        .unwrap();

        let err = client
            .parse_chart_response(&Symbol::new("NOPE"), response)
            .unwrap_err();
        assert!(matches!(err, PipelineError::TickerNotFound(_)));
    }

    #[test]
    fn snapshot_reads_raw_values() {
        let data: QuoteSummaryData = serde_json::from_value(json!({
            "assetProfile": {"sector": "Technology", "industry": "Consumer Electronics"},
            "summaryDetail": {
                "marketCap": {"raw": 2.9e12, "fmt": "2.9T"},
                "trailingPE": {"raw": 30.1},
                "dividendYield": {"raw": 0.0045}
            },
            "defaultKeyStatistics": {
                "sharesOutstanding": {"raw": 1.55e10},
                "beta": {"raw": 1.28},
                "pegRatio": {}
            },
            "financialData": {"ebitda": {"raw": 1.3e11}}
        }))
        .unwrap();

        let snapshot = build_snapshot(&Symbol::new("AAPL"), data);
        assert_eq!(snapshot.market_cap, Some(2.9e12));
        assert_eq!(snapshot.beta, Some(1.28));
        assert_eq!(snapshot.peg_ratio, None);
        assert_eq!(snapshot.ebitda, Some(1.3e11));
        assert_eq!(snapshot.sector.as_deref(), Some("Technology"));
    }

    #[test]
    fn client_metadata() {
        let client = YahooClient::default();
        assert_eq!(client.name(), "Yahoo Finance");
        assert!(!client.description().is_empty());
    }
}
