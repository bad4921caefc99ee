#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Core types and traits
pub use fundlens_core::*;

// Cache implementations
pub use fundlens_cache::MemoryCache;
#[cfg(feature = "cache-sqlite")]
pub use fundlens_cache::SqliteCache;

// Sources
#[cfg(feature = "edgar")]
pub use fundlens_edgar::EdgarClient;
#[cfg(feature = "yahoo")]
pub use fundlens_yahoo::YahooClient;

// Calculators and persistence
pub use fundlens_metrics::{GrowthReport, RatioReport, RiskReport};
pub use fundlens_store::TickerStore;

mod pipeline;
pub use pipeline::{CompanyBundle, DerivedReports, Pipeline, PipelineConfig, RunSummary};
