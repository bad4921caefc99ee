#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Cache backends for fetched company data.

/// In-memory cache implementation.
mod memory;
/// SQLite-based cache implementation.
#[cfg(feature = "sqlite")]
mod sqlite;

pub use memory::MemoryCache;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteCache;
