//! Fetch → derive → persist orchestration.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use polars::prelude::DataFrame;
use tracing::{debug, info, warn};

use fundlens_core::{
    CompanyFacts, CompanyProfile, FactSource, FetchCache, MarketSnapshot, MarketSource,
    PeriodType, PipelineError, Result, Symbol,
};
use fundlens_metrics::{GrowthReport, RatioReport, RiskReport, growth, ratios, risk};
use fundlens_store::{SummaryInputs, TickerStore};

/// Pipeline configuration.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Root directory for per-ticker output.
    pub output_root: PathBuf,
    /// Start of the price-history window (open start when `None`).
    pub history_start: Option<NaiveDate>,
    /// End of the price-history window (up to now when `None`).
    pub history_end: Option<NaiveDate>,
    /// Whether to fetch the latest 10-K text.
    pub fetch_filing_text: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("stock_data"),
            history_start: None,
            history_end: None,
            fetch_filing_text: true,
        }
    }
}

/// Everything fetched for one ticker; every stage may come up empty.
#[derive(Debug, Default)]
pub struct CompanyBundle {
    /// The requested ticker.
    pub symbol: Symbol,
    /// Filer metadata, when the fact source delivered it.
    pub profile: Option<CompanyProfile>,
    /// Extracted fact series.
    pub facts: Option<CompanyFacts>,
    /// Market snapshot scalars.
    pub snapshot: Option<MarketSnapshot>,
    /// Daily price history.
    pub history: Option<DataFrame>,
    /// Latest 10-K text.
    pub filing_text: Option<String>,
}

/// Metrics derived from a bundle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DerivedReports {
    /// Financial ratios.
    pub ratios: RatioReport,
    /// Growth metrics.
    pub growth: GrowthReport,
    /// Risk metrics.
    pub risk: RiskReport,
}

/// What a completed run produced.
#[derive(Clone, Debug)]
pub struct RunSummary {
    /// The ticker that ran.
    pub symbol: Symbol,
    /// Where the output landed.
    pub store_path: PathBuf,
    /// Statement CSVs written.
    pub series_written: usize,
    /// Price bars persisted.
    pub history_rows: usize,
    /// Whether filing text was captured.
    pub wrote_filing_text: bool,
}

/// Orchestrates sources, cache, calculators, and the store.
pub struct Pipeline {
    fact_source: Arc<dyn FactSource>,
    market_source: Arc<dyn MarketSource>,
    cache: Option<Arc<dyn FetchCache>>,
    config: PipelineConfig,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("fact_source", &self.fact_source.name())
            .field("market_source", &self.market_source.name())
            .field("cache", &self.cache.as_ref().map(|_| "configured"))
            .field("config", &self.config)
            .finish()
    }
}

impl Pipeline {
    /// Creates a pipeline over explicit sources.
    #[must_use]
    pub fn new(
        fact_source: Arc<dyn FactSource>,
        market_source: Arc<dyn MarketSource>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            fact_source,
            market_source,
            cache: None,
            config,
        }
    }

    /// Creates a pipeline over SEC EDGAR and Yahoo Finance.
    ///
    /// The User-Agent identifies the application to the SEC.
    #[cfg(all(feature = "edgar", feature = "yahoo"))]
    #[must_use]
    pub fn with_default_sources(user_agent: &str, config: PipelineConfig) -> Self {
        Self::new(
            Arc::new(fundlens_edgar::EdgarClient::new(user_agent)),
            Arc::new(fundlens_yahoo::YahooClient::new()),
            config,
        )
    }

    /// Attaches a cache consulted before each source call.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn FetchCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    async fn cached_facts(&self, symbol: &Symbol) -> Option<CompanyFacts> {
        let cache = self.cache.as_ref()?;
        match cache.get_facts(self.fact_source.name(), symbol).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(%symbol, error = %e, "Facts cache read failed");
                None
            }
        }
    }

    async fn cached_history(&self, symbol: &Symbol) -> Option<DataFrame> {
        let cache = self.cache.as_ref()?;
        match cache.get_history(self.market_source.name(), symbol).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(%symbol, error = %e, "History cache read failed");
                None
            }
        }
    }

    /// Fetches everything for a ticker, best-effort per stage.
    pub async fn fetch(&self, symbol: &Symbol) -> CompanyBundle {
        let mut bundle = CompanyBundle {
            symbol: symbol.clone(),
            ..CompanyBundle::default()
        };

        bundle.facts = match self.cached_facts(symbol).await {
            Some(facts) => {
                debug!(%symbol, "Facts cache hit");
                Some(facts)
            }
            None => match self.fact_source.company_facts(symbol).await {
                Ok(facts) => {
                    if let Some(cache) = &self.cache
                        && let Err(e) = cache
                            .put_facts(self.fact_source.name(), symbol, &facts)
                            .await
                    {
                        warn!(%symbol, error = %e, "Failed to cache facts");
                    }
                    Some(facts)
                }
                Err(e) => {
                    warn!(%symbol, error = %e, "Company facts fetch failed");
                    None
                }
            },
        };

        bundle.profile = match self.fact_source.company_profile(symbol).await {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(%symbol, error = %e, "Company profile fetch failed");
                None
            }
        };

        bundle.snapshot = match self.market_source.market_snapshot(symbol).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(%symbol, error = %e, "Market snapshot fetch failed");
                None
            }
        };

        bundle.history = match self.cached_history(symbol).await {
            Some(history) => {
                debug!(%symbol, "History cache hit");
                Some(history)
            }
            None => {
                let fetched = self
                    .market_source
                    .daily_history(symbol, self.config.history_start, self.config.history_end)
                    .await;
                match fetched {
                    Ok(history) => {
                        if let Some(cache) = &self.cache
                            && let Err(e) = cache
                                .put_history(self.market_source.name(), symbol, &history)
                                .await
                        {
                            warn!(%symbol, error = %e, "Failed to cache history");
                        }
                        Some(history)
                    }
                    Err(e) => {
                        warn!(%symbol, error = %e, "Price history fetch failed");
                        None
                    }
                }
            }
        };

        if self.config.fetch_filing_text {
            let form = PeriodType::Annual.form();
            bundle.filing_text = match self.fact_source.latest_filing_text(symbol, form).await {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!(%symbol, error = %e, "Filing text fetch failed");
                    None
                }
            };
        }

        bundle
    }

    /// Derives all metric reports from whatever the bundle holds.
    #[must_use]
    pub fn derive(&self, bundle: &CompanyBundle) -> DerivedReports {
        let mut reports = DerivedReports::default();

        if let Some(facts) = &bundle.facts {
            reports.ratios = ratios::compute(facts, bundle.snapshot.as_ref());
            reports.growth = growth::compute(facts);
        }

        if let Some(history) = &bundle.history {
            match risk::daily_returns(history) {
                Ok(returns) => reports.risk = risk::compute(&returns),
                Err(e) => warn!(symbol = %bundle.symbol, error = %e, "Return computation failed"),
            }
        }

        reports
    }

    /// Runs the full pipeline for one ticker.
    ///
    /// Fails only when no source produced anything at all; partial data is
    /// persisted as far as it goes.
    pub async fn run(&self, symbol: &Symbol) -> Result<RunSummary> {
        info!(%symbol, "Running pipeline");
        let bundle = self.fetch(symbol).await;

        if bundle.facts.is_none() && bundle.history.is_none() {
            return Err(PipelineError::DataNotAvailable {
                symbol: symbol.to_string(),
                detail: "no facts and no price history".to_string(),
            });
        }

        let reports = self.derive(&bundle);

        let store = TickerStore::new(&self.config.output_root, symbol);
        store.reset()?;

        let mut series_written = 0;
        if let Some(profile) = &bundle.profile {
            store.write_profile(profile)?;
        }
        if let Some(snapshot) = &bundle.snapshot {
            store.write_snapshot(snapshot)?;
        }
        if let Some(facts) = &bundle.facts {
            series_written = store.write_facts(facts)?;
        }
        let mut history_rows = 0;
        if let Some(history) = &bundle.history {
            store.write_price_history(history)?;
            history_rows = history.height();
        }
        if let Some(text) = &bundle.filing_text {
            store.write_filing_text(text)?;
        }

        store.write_summary(&SummaryInputs {
            profile: bundle.profile.as_ref(),
            snapshot: bundle.snapshot.as_ref(),
            ratios: Some(&reports.ratios),
            growth: Some(&reports.growth),
            risk: Some(&reports.risk),
        })?;

        info!(%symbol, path = %store.path().display(), "Run complete");
        Ok(RunSummary {
            symbol: symbol.clone(),
            store_path: store.path().to_path_buf(),
            series_written,
            history_rows,
            wrote_filing_text: bundle.filing_text.is_some(),
        })
    }

    /// Runs the pipeline over the source's ticker universe.
    ///
    /// Per-ticker failures are logged and skipped; the summaries of the
    /// successful runs are returned.
    pub async fn run_universe(&self, limit: Option<usize>) -> Result<Vec<RunSummary>> {
        let mut symbols = self.fact_source.universe().await?;
        if let Some(limit) = limit {
            symbols.truncate(limit);
        }
        info!(count = symbols.len(), "Running ticker universe");

        let mut summaries = Vec::new();
        for symbol in &symbols {
            match self.run(symbol).await {
                Ok(summary) => summaries.push(summary),
                Err(e) => warn!(%symbol, error = %e, "Skipping ticker"),
            }
        }
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use fundlens_cache::MemoryCache;
    use fundlens_core::{Cik, DataSource, FactPoint, FactSeries, StatementKind};
    use polars::prelude::Column;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct StubFacts {
        calls: AtomicUsize,
    }

    fn stub_facts_payload() -> CompanyFacts {
        let end = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let annual = |value: f64, year: i32| FactPoint {
            form: Some("10-K".to_string()),
            ..FactPoint::new(value, NaiveDate::from_ymd_opt(year, 12, 31).unwrap())
        };
        CompanyFacts::new(
            Cik::new("1234"),
            "Stub Co",
            vec![
                FactSeries::new(
                    "revenue",
                    StatementKind::Income,
                    vec![annual(1000.0, 2022), annual(1100.0, 2023)],
                ),
                FactSeries::new(
                    "net_income",
                    StatementKind::Income,
                    vec![FactPoint::new(250.0, end)],
                ),
            ],
        )
    }

    impl DataSource for StubFacts {
        fn name(&self) -> &str {
            "stub-facts"
        }
        fn description(&self) -> &str {
            "stub"
        }
    }

    #[async_trait]
    impl FactSource for StubFacts {
        async fn company_facts(&self, _symbol: &Symbol) -> Result<CompanyFacts> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(stub_facts_payload())
        }

        async fn company_profile(&self, symbol: &Symbol) -> Result<CompanyProfile> {
            Ok(CompanyProfile {
                symbol: symbol.clone(),
                name: "Stub Co".to_string(),
                ..CompanyProfile::default()
            })
        }

        async fn latest_filing_text(&self, _symbol: &Symbol, _form: &str) -> Result<String> {
            Ok("ANNUAL REPORT".to_string())
        }

        async fn universe(&self) -> Result<Vec<Symbol>> {
            Ok(vec![Symbol::new("STUB")])
        }
    }

    #[derive(Debug, Default)]
    struct StubMarket;

    impl DataSource for StubMarket {
        fn name(&self) -> &str {
            "stub-market"
        }
        fn description(&self) -> &str {
            "stub"
        }
    }

    #[async_trait]
    impl MarketSource for StubMarket {
        async fn daily_history(
            &self,
            symbol: &Symbol,
            _start: Option<NaiveDate>,
            _end: Option<NaiveDate>,
        ) -> Result<DataFrame> {
            DataFrame::new(vec![
                Column::new("symbol".into(), vec![symbol.as_str(); 3]),
                Column::new("date".into(), vec!["2024-01-02", "2024-01-03", "2024-01-04"]),
                Column::new("open".into(), vec![10.0, 10.5, 10.2]),
                Column::new("high".into(), vec![10.6, 10.9, 10.8]),
                Column::new("low".into(), vec![9.9, 10.1, 10.0]),
                Column::new("close".into(), vec![10.4, 10.2, 10.6]),
                Column::new("volume".into(), vec![1e6, 1.1e6, 0.9e6]),
                Column::new("adjusted_close".into(), vec![10.4, 10.2, 10.6]),
            ])
            .map_err(|e| PipelineError::Other(e.to_string()))
        }

        async fn market_snapshot(&self, symbol: &Symbol) -> Result<MarketSnapshot> {
            Ok(MarketSnapshot {
                trailing_pe: Some(20.0),
                ..MarketSnapshot::new(symbol.clone())
            })
        }
    }

    /// A market source that always fails, for degraded-mode tests.
    #[derive(Debug, Default)]
    struct DownMarket;

    impl DataSource for DownMarket {
        fn name(&self) -> &str {
            "down-market"
        }
        fn description(&self) -> &str {
            "always fails"
        }
    }

    #[async_trait]
    impl MarketSource for DownMarket {
        async fn daily_history(
            &self,
            symbol: &Symbol,
            _start: Option<NaiveDate>,
            _end: Option<NaiveDate>,
        ) -> Result<DataFrame> {
            Err(PipelineError::Network(format!("down for {symbol}")))
        }

        async fn market_snapshot(&self, symbol: &Symbol) -> Result<MarketSnapshot> {
            Err(PipelineError::Network(format!("down for {symbol}")))
        }
    }

    fn config(root: &std::path::Path) -> PipelineConfig {
        PipelineConfig {
            output_root: root.to_path_buf(),
            ..PipelineConfig::default()
        }
    }

    #[tokio::test]
    async fn run_persists_everything() {
        let tmp = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(
            Arc::new(StubFacts::default()),
            Arc::new(StubMarket),
            config(tmp.path()),
        );

        let summary = pipeline.run(&Symbol::new("STUB")).await.unwrap();
        assert_eq!(summary.series_written, 2);
        assert_eq!(summary.history_rows, 3);
        assert!(summary.wrote_filing_text);

        assert!(summary.store_path.join("SUMMARY_REPORT.txt").is_file());
        assert!(
            summary
                .store_path
                .join("02_statements")
                .join("revenue.csv")
                .is_file()
        );
        assert!(
            summary
                .store_path
                .join("04_market")
                .join("Price_History.csv")
                .is_file()
        );
    }

    #[tokio::test]
    async fn derive_computes_all_reports() {
        let tmp = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(
            Arc::new(StubFacts::default()),
            Arc::new(StubMarket),
            config(tmp.path()),
        );

        let bundle = pipeline.fetch(&Symbol::new("STUB")).await;
        let reports = pipeline.derive(&bundle);

        // net_income / revenue from the stub facts.
        assert!(
            (reports.ratios.net_profit_margin.unwrap() - 250.0 / 1100.0).abs() < 1e-12
        );
        assert_eq!(reports.ratios.pe_ratio, Some(20.0));
        assert!((reports.growth.revenue_yoy_growth.unwrap() - 0.1).abs() < 1e-12);
        assert!(reports.risk.volatility_daily.is_some());
    }

    #[tokio::test]
    async fn market_outage_degrades_gracefully() {
        let tmp = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(
            Arc::new(StubFacts::default()),
            Arc::new(DownMarket),
            config(tmp.path()),
        );

        let summary = pipeline.run(&Symbol::new("STUB")).await.unwrap();
        assert_eq!(summary.history_rows, 0);
        assert_eq!(summary.series_written, 2);
    }

    #[tokio::test]
    async fn cache_short_circuits_second_fetch() {
        let tmp = tempfile::tempdir().unwrap();
        let facts = Arc::new(StubFacts::default());
        let pipeline = Pipeline::new(facts.clone(), Arc::new(StubMarket), config(tmp.path()))
            .with_cache(Arc::new(MemoryCache::new()));

        let symbol = Symbol::new("STUB");
        let _ = pipeline.fetch(&symbol).await;
        let _ = pipeline.fetch(&symbol).await;

        assert_eq!(facts.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn universe_run_covers_listed_tickers() {
        let tmp = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(
            Arc::new(StubFacts::default()),
            Arc::new(StubMarket),
            config(tmp.path()),
        );

        let summaries = pipeline.run_universe(Some(5)).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].symbol, Symbol::new("STUB"));
    }
}
