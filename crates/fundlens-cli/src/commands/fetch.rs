//! `fundlens fetch` - run the pipeline for one ticker.

use anyhow::{Context, Result};
use fundlens::Symbol;

use crate::cli::FetchArgs;

pub(crate) async fn run(args: &FetchArgs) -> Result<()> {
    let pipeline = super::build_pipeline(&args.common)?;
    let symbol = Symbol::new(args.ticker.as_str());

    let summary = pipeline
        .run(&symbol)
        .await
        .with_context(|| format!("Pipeline failed for {symbol}"))?;

    println!(
        "{}: {} statement series, {} price bars{} -> {}",
        summary.symbol,
        summary.series_written,
        summary.history_rows,
        if summary.wrote_filing_text {
            ", 10-K text"
        } else {
            ""
        },
        summary.store_path.display(),
    );
    Ok(())
}
