//! `fundlens train` - fit the direction model on stored price history.

use anyhow::{Context, Result};
use fundlens::{Symbol, TickerStore};
use fundlens_model::TrainConfig;
use polars::prelude::*;

use crate::cli::TrainArgs;

pub(crate) fn run(args: &TrainArgs) -> Result<()> {
    let symbol = Symbol::new(args.ticker.as_str());
    let store = TickerStore::new(&args.output_root, &symbol);
    let path = store.price_history_path();

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.clone()))
        .with_context(|| format!("Failed to open {}", path.display()))?
        .finish()
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let report = fundlens_model::train(&df, &TrainConfig::default())
        .with_context(|| format!("Training failed for {symbol}"))?;

    println!("{}", report.summary());
    Ok(())
}
