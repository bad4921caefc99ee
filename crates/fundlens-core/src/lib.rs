#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for company fundamentals pipelines.
//!
//! This crate provides the foundational abstractions for the fundlens
//! workspace:
//!
//! - [`FactSource`](source::FactSource) - XBRL facts and filer metadata
//! - [`MarketSource`](source::MarketSource) - price history and snapshots
//! - [`FetchCache`](cache::FetchCache) - caching abstraction
//! - [`FactSeries`](types::FactSeries) - per-concept fact time series
//! - [`PipelineError`](error::PipelineError) - the shared error type

/// Cache trait for fetched company data.
pub mod cache;
/// Error type for pipeline operations.
pub mod error;
/// DataFrame column helpers shared across the workspace.
pub mod frame;
/// Reporting period and statement classification.
pub mod period;
/// Source traits for fetching company data.
pub mod source;
/// Core data types (Symbol, Cik, FactSeries, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use cache::FetchCache;
pub use error::{PipelineError, Result};
pub use period::{PeriodType, StatementKind};
pub use source::{DataSource, FactSource, MarketSource};
pub use types::{
    Cik, CompanyFacts, CompanyProfile, FactPoint, FactSeries, MarketSnapshot, Symbol,
};
