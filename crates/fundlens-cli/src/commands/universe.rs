//! `fundlens universe` - run the pipeline across the SEC ticker listing.

use anyhow::{Context, Result};

use crate::cli::UniverseArgs;

pub(crate) async fn run(args: &UniverseArgs) -> Result<()> {
    let pipeline = super::build_pipeline(&args.common)?;

    let summaries = pipeline
        .run_universe(args.limit)
        .await
        .context("Universe run failed")?;

    for summary in &summaries {
        println!(
            "{}: {} statement series, {} price bars",
            summary.symbol, summary.series_written, summary.history_rows,
        );
    }
    println!("Completed {} tickers", summaries.len());
    Ok(())
}
