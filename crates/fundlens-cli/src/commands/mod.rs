//! Subcommand implementations.

use std::sync::Arc;

use anyhow::{Context, Result};
use fundlens::{Pipeline, PipelineConfig, SqliteCache};

use crate::cli::CommonArgs;

pub(crate) mod fetch;
pub(crate) mod train;
pub(crate) mod universe;

/// Builds a pipeline from the shared CLI options.
pub(crate) fn build_pipeline(args: &CommonArgs) -> Result<Pipeline> {
    let config = PipelineConfig {
        output_root: args.output_root.clone(),
        history_start: args.start,
        history_end: args.end,
        fetch_filing_text: !args.skip_filing_text,
    };

    let mut pipeline = Pipeline::with_default_sources(&args.user_agent, config);

    if let Some(path) = &args.cache_db {
        let cache = SqliteCache::new(path)
            .with_context(|| format!("Failed to open cache database {}", path.display()))?;
        pipeline = pipeline.with_cache(Arc::new(cache));
    }

    Ok(pipeline)
}
