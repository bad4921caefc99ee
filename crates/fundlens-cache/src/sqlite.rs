//! SQLite-based cache implementation.
//!
//! Company facts are stored as one JSON blob per `(source, symbol)`;
//! price history is stored relationally, one row per bar, and rebuilt
//! into a DataFrame on read.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use fundlens_core::{CompanyFacts, FetchCache, PipelineError, Result, Symbol, frame};
use polars::prelude::*;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// Persistent cache backed by a SQLite database file.
#[derive(Debug)]
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    /// Opens (or creates) a cache database at the given path.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(cache_err)?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Creates an in-memory cache database, mainly for tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(cache_err)?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    fn initialize_schema(&self) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS facts_cache (
                source TEXT NOT NULL,
                symbol TEXT NOT NULL,
                data_json TEXT NOT NULL,
                cached_at TEXT NOT NULL,
                PRIMARY KEY (source, symbol)
            )",
            [],
        )
        .map_err(cache_err)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS history_cache (
                source TEXT NOT NULL,
                symbol TEXT NOT NULL,
                date TEXT NOT NULL,
                open REAL,
                high REAL,
                low REAL,
                close REAL,
                volume REAL,
                adjusted_close REAL,
                cached_at TEXT NOT NULL,
                PRIMARY KEY (source, symbol, date)
            )",
            [],
        )
        .map_err(cache_err)?;

        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| PipelineError::Cache(e.to_string()))
    }
}

#[async_trait]
impl FetchCache for SqliteCache {
    async fn get_facts(&self, source: &str, symbol: &Symbol) -> Result<Option<CompanyFacts>> {
        let conn = self.lock()?;
        let row: Option<String> = conn
            .query_row(
                "SELECT data_json FROM facts_cache WHERE source = ?1 AND symbol = ?2",
                params![source, symbol.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(cache_err)?;

        match row {
            Some(json) => {
                debug!(source, %symbol, "Facts cache hit");
                let facts = serde_json::from_str(&json)
                    .map_err(|e| PipelineError::Cache(e.to_string()))?;
                Ok(Some(facts))
            }
            None => Ok(None),
        }
    }

    async fn put_facts(&self, source: &str, symbol: &Symbol, facts: &CompanyFacts) -> Result<()> {
        let json = serde_json::to_string(facts).map_err(|e| PipelineError::Cache(e.to_string()))?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO facts_cache (source, symbol, data_json, cached_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![source, symbol.as_str(), json, Utc::now().to_rfc3339()],
        )
        .map_err(cache_err)?;
        Ok(())
    }

    async fn get_history(&self, source: &str, symbol: &Symbol) -> Result<Option<DataFrame>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT date, open, high, low, close, volume, adjusted_close
                 FROM history_cache
                 WHERE source = ?1 AND symbol = ?2
                 ORDER BY date",
            )
            .map_err(cache_err)?;

        type BarRow = (
            String,
            Option<f64>,
            Option<f64>,
            Option<f64>,
            Option<f64>,
            Option<f64>,
            Option<f64>,
        );
        let rows: Vec<BarRow> = stmt
            .query_map(params![source, symbol.as_str()], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                ))
            })
            .map_err(cache_err)?
            .collect::<std::result::Result<_, _>>()
            .map_err(cache_err)?;

        if rows.is_empty() {
            return Ok(None);
        }
        debug!(source, %symbol, rows = rows.len(), "History cache hit");

        let epoch = NaiveDate::default();
        let days: Vec<Option<i32>> = rows
            .iter()
            .map(|r| {
                NaiveDate::parse_from_str(&r.0, "%Y-%m-%d")
                    .ok()
                    .map(|d| (d - epoch).num_days() as i32)
            })
            .collect();

        let date_col = Column::new("date".into(), days)
            .cast(&DataType::Date)
            .map_err(|e| PipelineError::Cache(e.to_string()))?;

        let df = DataFrame::new(vec![
            Column::new("symbol".into(), vec![symbol.as_str(); rows.len()]),
            date_col,
            Column::new("open".into(), rows.iter().map(|r| r.1).collect::<Vec<_>>()),
            Column::new("high".into(), rows.iter().map(|r| r.2).collect::<Vec<_>>()),
            Column::new("low".into(), rows.iter().map(|r| r.3).collect::<Vec<_>>()),
            Column::new("close".into(), rows.iter().map(|r| r.4).collect::<Vec<_>>()),
            Column::new(
                "volume".into(),
                rows.iter().map(|r| r.5).collect::<Vec<_>>(),
            ),
            Column::new(
                "adjusted_close".into(),
                rows.iter().map(|r| r.6).collect::<Vec<_>>(),
            ),
        ])
        .map_err(|e| PipelineError::Cache(e.to_string()))?;

        Ok(Some(df))
    }

    async fn put_history(&self, source: &str, symbol: &Symbol, history: &DataFrame) -> Result<()> {
        let dates = frame::date_column(history, "date")?;
        let opens = frame::f64_column(history, "open")?;
        let highs = frame::f64_column(history, "high")?;
        let lows = frame::f64_column(history, "low")?;
        let closes = frame::f64_column(history, "close")?;
        let volumes = frame::f64_column(history, "volume")?;
        let adjusted = frame::f64_column(history, "adjusted_close")?;

        let cached_at = Utc::now().to_rfc3339();
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(cache_err)?;

        tx.execute(
            "DELETE FROM history_cache WHERE source = ?1 AND symbol = ?2",
            params![source, symbol.as_str()],
        )
        .map_err(cache_err)?;

        for (i, date) in dates.iter().enumerate() {
            // A bar without a date cannot be keyed.
            let Some(date) = date else { continue };
            tx.execute(
                "INSERT OR REPLACE INTO history_cache
                 (source, symbol, date, open, high, low, close, volume, adjusted_close, cached_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    source,
                    symbol.as_str(),
                    date.to_string(),
                    opens[i],
                    highs[i],
                    lows[i],
                    closes[i],
                    volumes[i],
                    adjusted[i],
                    cached_at,
                ],
            )
            .map_err(cache_err)?;
        }

        tx.commit().map_err(cache_err)?;
        debug!(source, %symbol, rows = history.height(), "Cached price history");
        Ok(())
    }

    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let Ok(delta) = chrono::TimeDelta::from_std(ttl) else {
            return Ok(0);
        };
        let Some(cutoff) = Utc::now().checked_sub_signed(delta) else {
            return Ok(0);
        };
        let cutoff = cutoff.to_rfc3339();

        let conn = self.lock()?;
        let mut removed = conn
            .execute(
                "DELETE FROM facts_cache WHERE cached_at < ?1",
                params![cutoff],
            )
            .map_err(cache_err)?;
        removed += conn
            .execute(
                "DELETE FROM history_cache WHERE cached_at < ?1",
                params![cutoff],
            )
            .map_err(cache_err)?;

        debug!(removed, "Invalidated stale cache entries");
        Ok(removed)
    }

    async fn clear(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM facts_cache", []).map_err(cache_err)?;
        conn.execute("DELETE FROM history_cache", [])
            .map_err(cache_err)?;
        Ok(())
    }
}

fn cache_err(e: rusqlite::Error) -> PipelineError {
    PipelineError::Cache(e.to_string())
}
