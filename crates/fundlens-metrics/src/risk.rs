//! Risk metrics from daily returns.

use fundlens_core::{Result, frame};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Trading days per year, used for annualization.
const TRADING_DAYS: f64 = 252.0;

/// Assumed annual risk-free rate for Sharpe/Sortino.
const RISK_FREE_RATE: f64 = 0.04;

/// Computed risk metrics.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    /// Sample standard deviation of daily returns.
    pub volatility_daily: Option<f64>,
    /// Daily volatility annualized by the square root of 252.
    pub volatility_annualized: Option<f64>,
    /// Annualized Sharpe ratio against the assumed risk-free rate.
    pub sharpe_ratio: Option<f64>,
    /// Annualized Sortino ratio (downside deviation denominator).
    pub sortino_ratio: Option<f64>,
    /// Worst peak-to-trough drawdown of the compounded equity curve.
    pub max_drawdown: Option<f64>,
    /// Daily value-at-risk at 95 % confidence (5 % return quantile).
    pub var_95: Option<f64>,
}

impl RiskReport {
    /// Name/value pairs in report order, for summary rendering.
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("volatility_daily", self.volatility_daily),
            ("volatility_annualized", self.volatility_annualized),
            ("sharpe_ratio", self.sharpe_ratio),
            ("sortino_ratio", self.sortino_ratio),
            ("max_drawdown", self.max_drawdown),
            ("var_95", self.var_95),
        ]
    }
}

/// Computes daily returns from the close column of a price-history frame.
///
/// Missing closes are skipped; returns are taken between consecutive
/// observed closes.
pub fn daily_returns(history: &DataFrame) -> Result<Vec<f64>> {
    let closes: Vec<f64> = frame::f64_column(history, "close")?
        .into_iter()
        .flatten()
        .collect();

    Ok(closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect())
}

/// Computes all risk metrics from a daily return series.
///
/// Fewer than two returns leave every metric absent.
#[must_use]
pub fn compute(returns: &[f64]) -> RiskReport {
    if returns.len() < 2 {
        return RiskReport::default();
    }

    let mut report = RiskReport::default();

    let volatility = sample_std(returns);
    report.volatility_daily = Some(volatility);
    report.volatility_annualized = Some(volatility * TRADING_DAYS.sqrt());

    let risk_free_daily = RISK_FREE_RATE / TRADING_DAYS;
    let excess: Vec<f64> = returns.iter().map(|r| r - risk_free_daily).collect();
    let excess_mean = mean(&excess);
    let excess_std = sample_std(&excess);
    if excess_std > 0.0 {
        report.sharpe_ratio = Some(excess_mean / excess_std * TRADING_DAYS.sqrt());
    }

    let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    if downside.len() >= 2 {
        let downside_std = sample_std(&downside);
        if downside_std > 0.0 {
            report.sortino_ratio = Some(excess_mean / downside_std * TRADING_DAYS.sqrt());
        }
    }

    report.max_drawdown = Some(max_drawdown(returns));
    report.var_95 = quantile(returns, 0.05);

    report
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
fn sample_std(values: &[f64]) -> f64 {
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Worst relative drawdown of the compounded equity curve.
fn max_drawdown(returns: &[f64]) -> f64 {
    let mut equity = 1.0;
    let mut peak = 1.0;
    let mut worst = 0.0f64;

    for r in returns {
        equity *= 1.0 + r;
        if equity > peak {
            peak = equity;
        }
        let drawdown = (equity - peak) / peak;
        if drawdown < worst {
            worst = drawdown;
        }
    }
    worst
}

/// Quantile with linear interpolation between order statistics.
fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        return Some(sorted[lower]);
    }
    let weight = position - lower as f64;
    Some(sorted[lower] * (1.0 - weight) + sorted[upper] * weight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::Column;

    #[test]
    fn returns_from_closes() {
        let df = DataFrame::new(vec![Column::new(
            "close".into(),
            vec![Some(100.0), None, Some(110.0), Some(99.0)],
        )])
        .unwrap();
        let returns = daily_returns(&df).unwrap();
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - 0.1).abs() < 1e-12);
        assert!((returns[1] + 0.1).abs() < 1e-12);
    }

    #[test]
    fn too_few_returns_yield_empty_report() {
        assert_eq!(compute(&[0.01]), RiskReport::default());
        assert_eq!(compute(&[]), RiskReport::default());
    }

    #[test]
    fn volatility_is_sample_std() {
        let report = compute(&[0.1, -0.1]);
        // std of {0.1, -0.1} with n-1: sqrt(0.02)
        let expected = 0.02f64.sqrt();
        assert!((report.volatility_daily.unwrap() - expected).abs() < 1e-12);
        assert!(
            (report.volatility_annualized.unwrap() - expected * 252f64.sqrt()).abs() < 1e-12
        );
    }

    #[test]
    fn drawdown_tracks_running_peak() {
        // Equity: 2.0 then 1.0; worst drawdown is -50 % from the peak.
        let report = compute(&[1.0, -0.5]);
        assert!((report.max_drawdown.unwrap() + 0.5).abs() < 1e-12);
    }

    #[test]
    fn monotonic_rise_has_zero_drawdown() {
        let report = compute(&[0.01, 0.02, 0.01]);
        assert_eq!(report.max_drawdown, Some(0.0));
    }

    #[test]
    fn var_interpolates_between_order_statistics() {
        let values = [0.05, 0.04, 0.03, 0.02, 0.01];
        // Sorted positions 0..4; 0.05 * 4 = 0.2 → between 0.01 and 0.02.
        let var = quantile(&values, 0.05).unwrap();
        assert!((var - 0.012).abs() < 1e-12);
    }

    #[test]
    fn sortino_needs_enough_downside() {
        // Only one negative return: Sortino stays absent.
        let report = compute(&[0.01, -0.01, 0.02]);
        assert_eq!(report.sortino_ratio, None);
        assert!(report.sharpe_ratio.is_some());
    }

    #[test]
    fn sharpe_sign_matches_excess_returns() {
        let losing = compute(&[-0.01, -0.02, -0.01, -0.03]);
        assert!(losing.sharpe_ratio.unwrap() < 0.0);

        let winning = compute(&[0.01, 0.02, 0.01, 0.03]);
        assert!(winning.sharpe_ratio.unwrap() > 0.0);
    }
}
