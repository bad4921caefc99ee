//! Cache trait for fetched company data.
//!
//! [`FetchCache`] lets the pipeline skip repeated source calls for company
//! facts and price history, the two payloads that are expensive to refetch.

use async_trait::async_trait;
use polars::prelude::DataFrame;
use std::time::Duration;

use crate::{
    error::Result,
    types::{CompanyFacts, Symbol},
};

/// Trait for caching fetched company data.
///
/// Implementations may store data in memory or on disk. Entries are keyed
/// by `(source name, symbol)`.
#[async_trait]
pub trait FetchCache: Send + Sync {
    /// Retrieves cached company facts.
    ///
    /// Returns `Ok(Some(facts))` on a hit, `Ok(None)` on a miss.
    async fn get_facts(&self, source: &str, symbol: &Symbol) -> Result<Option<CompanyFacts>>;

    /// Stores company facts.
    async fn put_facts(&self, source: &str, symbol: &Symbol, facts: &CompanyFacts) -> Result<()>;

    /// Retrieves cached daily price history.
    ///
    /// Returns `Ok(Some(df))` on a hit, `Ok(None)` on a miss.
    async fn get_history(&self, source: &str, symbol: &Symbol) -> Result<Option<DataFrame>>;

    /// Stores daily price history.
    async fn put_history(&self, source: &str, symbol: &Symbol, history: &DataFrame) -> Result<()>;

    /// Removes entries older than the given TTL.
    ///
    /// Returns the number of entries invalidated.
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize>;

    /// Clears all cached data.
    async fn clear(&self) -> Result<()>;
}
