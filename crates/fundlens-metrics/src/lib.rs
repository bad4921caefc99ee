#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Financial ratio, growth, and risk calculators.
//!
//! Each module is a pure function over already-fetched inputs:
//!
//! - [`ratios::compute`] - ratios from latest facts + market snapshot
//! - [`growth::compute`] - YoY growth and five-year CAGR over annual series
//! - [`risk::compute`] - volatility, Sharpe/Sortino, drawdown, VaR

/// Growth metrics over annual fact series.
pub mod growth;
/// Financial ratios from the latest facts and a market snapshot.
pub mod ratios;
/// Risk metrics from daily returns.
pub mod risk;

pub use growth::GrowthReport;
pub use ratios::RatioReport;
pub use risk::RiskReport;
