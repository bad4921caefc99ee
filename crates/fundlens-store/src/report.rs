//! Human-readable summary report.

use chrono::Utc;
use fundlens_core::{CompanyProfile, MarketSnapshot, Symbol};
use fundlens_metrics::{GrowthReport, RatioReport, RiskReport};
use std::fmt::Write as _;

const RULE: &str = "================================================================================";
const SECTION_RULE: &str =
    "--------------------------------------------------------------------------------";

/// Inputs for the summary report; every section is optional.
#[derive(Debug, Default)]
pub struct SummaryInputs<'a> {
    /// Filer profile, when fetched.
    pub profile: Option<&'a CompanyProfile>,
    /// Market snapshot, when fetched.
    pub snapshot: Option<&'a MarketSnapshot>,
    /// Computed ratios.
    pub ratios: Option<&'a RatioReport>,
    /// Computed growth metrics.
    pub growth: Option<&'a GrowthReport>,
    /// Computed risk metrics.
    pub risk: Option<&'a RiskReport>,
}

/// Renders the report text for a ticker.
#[must_use]
pub fn render(symbol: &Symbol, inputs: &SummaryInputs<'_>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "COMPREHENSIVE DATA REPORT FOR {symbol}");
    let _ = writeln!(out, "Generated: {}", Utc::now().format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "{RULE}");
    out.push('\n');

    if let Some(profile) = inputs.profile {
        let _ = writeln!(out, "Company Name: {}", profile.name);
        if let Some(industry) = &profile.sic_description {
            let _ = writeln!(out, "Industry: {industry}");
        }
    }
    if let Some(snapshot) = inputs.snapshot {
        if let Some(sector) = &snapshot.sector {
            let _ = writeln!(out, "Sector: {sector}");
        }
        if let Some(market_cap) = snapshot.market_cap {
            let _ = writeln!(out, "Market Cap: ${market_cap:.0}");
        }
    }
    out.push('\n');

    if let Some(ratios) = inputs.ratios {
        section(&mut out, "KEY FINANCIAL RATIOS", &ratios.fields(), false);
    }
    if let Some(growth) = inputs.growth {
        section(&mut out, "GROWTH METRICS", &growth.fields(), true);
    }
    if let Some(risk) = inputs.risk {
        section(&mut out, "RISK METRICS", &risk.fields(), false);
    }

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Data Sources:");
    let _ = writeln!(out, "- SEC EDGAR (financial statements, filings)");
    let _ = writeln!(out, "- Yahoo Finance (market data)");
    let _ = writeln!(out, "{RULE}");

    out
}

fn section(out: &mut String, title: &str, fields: &[(&str, Option<f64>)], as_percent: bool) {
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{SECTION_RULE}");
    for (name, value) in fields {
        // Absent metrics are simply omitted, not rendered as N/A.
        if let Some(value) = value {
            if as_percent {
                let _ = writeln!(out, "{name}: {:.2}%", value * 100.0);
            } else {
                let _ = writeln!(out, "{name}: {value:.4}");
            }
        }
    }
    out.push('\n');
}
