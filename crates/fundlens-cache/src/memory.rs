//! In-memory cache implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fundlens_core::{CompanyFacts, FetchCache, Result, Symbol};
use polars::prelude::DataFrame;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Cache entry with its insertion time for TTL-based invalidation.
#[derive(Clone, Debug)]
struct Entry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

impl<T> Entry<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    fn is_stale(&self, ttl: Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.cached_at);
        age > chrono::TimeDelta::from_std(ttl).unwrap_or(chrono::TimeDelta::MAX)
    }
}

/// Entries are keyed by source name and symbol.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct Key {
    source: String,
    symbol: String,
}

impl Key {
    fn new(source: &str, symbol: &Symbol) -> Self {
        Self {
            source: source.to_string(),
            symbol: symbol.to_string(),
        }
    }
}

/// In-process cache; contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryCache {
    facts: RwLock<HashMap<Key, Entry<CompanyFacts>>>,
    history: RwLock<HashMap<Key, Entry<DataFrame>>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FetchCache for MemoryCache {
    async fn get_facts(&self, source: &str, symbol: &Symbol) -> Result<Option<CompanyFacts>> {
        let cache = self.facts.read().await;
        let hit = cache.get(&Key::new(source, symbol)).map(|e| e.data.clone());
        debug!(source, %symbol, hit = hit.is_some(), "Facts cache lookup");
        Ok(hit)
    }

    async fn put_facts(&self, source: &str, symbol: &Symbol, facts: &CompanyFacts) -> Result<()> {
        let mut cache = self.facts.write().await;
        cache.insert(Key::new(source, symbol), Entry::new(facts.clone()));
        Ok(())
    }

    async fn get_history(&self, source: &str, symbol: &Symbol) -> Result<Option<DataFrame>> {
        let cache = self.history.read().await;
        let hit = cache.get(&Key::new(source, symbol)).map(|e| e.data.clone());
        debug!(source, %symbol, hit = hit.is_some(), "History cache lookup");
        Ok(hit)
    }

    async fn put_history(&self, source: &str, symbol: &Symbol, history: &DataFrame) -> Result<()> {
        let mut cache = self.history.write().await;
        cache.insert(Key::new(source, symbol), Entry::new(history.clone()));
        Ok(())
    }

    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let mut removed = 0;

        let mut facts = self.facts.write().await;
        let before = facts.len();
        facts.retain(|_, entry| !entry.is_stale(ttl));
        removed += before - facts.len();
        drop(facts);

        let mut history = self.history.write().await;
        let before = history.len();
        history.retain(|_, entry| !entry.is_stale(ttl));
        removed += before - history.len();

        debug!(removed, "Invalidated stale cache entries");
        Ok(removed)
    }

    async fn clear(&self) -> Result<()> {
        self.facts.write().await.clear();
        self.history.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fundlens_core::{Cik, FactPoint, FactSeries, StatementKind};
    use polars::prelude::Column;

    fn sample_facts() -> CompanyFacts {
        CompanyFacts::new(
            Cik::new("1234"),
            "Test Co",
            vec![FactSeries::new(
                "revenue",
                StatementKind::Income,
                vec![FactPoint::new(
                    100.0,
                    NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
                )],
            )],
        )
    }

    fn sample_history() -> DataFrame {
        DataFrame::new(vec![Column::new("close".into(), vec![1.0, 2.0])]).unwrap()
    }

    #[tokio::test]
    async fn facts_roundtrip() {
        let cache = MemoryCache::new();
        let symbol = Symbol::new("TEST");

        assert!(cache.get_facts("edgar", &symbol).await.unwrap().is_none());

        cache.put_facts("edgar", &symbol, &sample_facts()).await.unwrap();
        let hit = cache.get_facts("edgar", &symbol).await.unwrap().unwrap();
        assert_eq!(hit.latest_value("revenue"), Some(100.0));

        // Different source key misses.
        assert!(cache.get_facts("other", &symbol).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn history_roundtrip() {
        let cache = MemoryCache::new();
        let symbol = Symbol::new("TEST");

        cache
            .put_history("yahoo", &symbol, &sample_history())
            .await
            .unwrap();
        let hit = cache.get_history("yahoo", &symbol).await.unwrap().unwrap();
        assert_eq!(hit.height(), 2);
    }

    #[tokio::test]
    async fn zero_ttl_invalidates_everything() {
        let cache = MemoryCache::new();
        let symbol = Symbol::new("TEST");
        cache.put_facts("edgar", &symbol, &sample_facts()).await.unwrap();
        cache
            .put_history("yahoo", &symbol, &sample_history())
            .await
            .unwrap();

        let removed = cache.invalidate_stale(Duration::ZERO).await.unwrap();
        assert_eq!(removed, 2);
        assert!(cache.get_facts("edgar", &symbol).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_empties_both_maps() {
        let cache = MemoryCache::new();
        let symbol = Symbol::new("TEST");
        cache.put_facts("edgar", &symbol, &sample_facts()).await.unwrap();
        cache.clear().await.unwrap();
        assert!(cache.get_facts("edgar", &symbol).await.unwrap().is_none());
    }
}
