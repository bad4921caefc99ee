//! Growth metrics over annual fact series.

use fundlens_core::{CompanyFacts, FactSeries};
use serde::{Deserialize, Serialize};

/// Number of annual periods in the CAGR window.
const CAGR_PERIODS: usize = 5;

/// Computed growth metrics.
///
/// Values are fractions (0.12 = 12 % growth).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthReport {
    /// Revenue growth versus the prior annual period.
    pub revenue_yoy_growth: Option<f64>,
    /// Five-year revenue CAGR.
    pub revenue_cagr_5y: Option<f64>,
    /// Net income growth versus the prior annual period.
    pub net_income_yoy_growth: Option<f64>,
    /// Five-year net income CAGR.
    pub net_income_cagr_5y: Option<f64>,
    /// Operating cash flow growth versus the prior annual period.
    pub operating_cash_flow_yoy_growth: Option<f64>,
    /// Five-year operating cash flow CAGR.
    pub operating_cash_flow_cagr_5y: Option<f64>,
}

impl GrowthReport {
    /// Name/value pairs in report order, for summary rendering.
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("revenue_yoy_growth", self.revenue_yoy_growth),
            ("revenue_cagr_5y", self.revenue_cagr_5y),
            ("net_income_yoy_growth", self.net_income_yoy_growth),
            ("net_income_cagr_5y", self.net_income_cagr_5y),
            (
                "operating_cash_flow_yoy_growth",
                self.operating_cash_flow_yoy_growth,
            ),
            (
                "operating_cash_flow_cagr_5y",
                self.operating_cash_flow_cagr_5y,
            ),
        ]
    }
}

/// Computes growth metrics from the annual series of the tracked concepts.
#[must_use]
pub fn compute(facts: &CompanyFacts) -> GrowthReport {
    let annual = |concept: &str| facts.get(concept).map(FactSeries::annual);

    let revenue = annual("revenue");
    let net_income = annual("net_income");
    let operating_cash_flow = annual("operating_cash_flow");

    let values = |series: &Option<FactSeries>| series.as_ref().map(FactSeries::values);

    let revenue_values = values(&revenue);
    let net_income_values = values(&net_income);
    let ocf_values = values(&operating_cash_flow);

    GrowthReport {
        revenue_yoy_growth: revenue_values.as_deref().and_then(year_over_year),
        revenue_cagr_5y: revenue_values.as_deref().and_then(cagr),
        net_income_yoy_growth: net_income_values.as_deref().and_then(year_over_year),
        net_income_cagr_5y: net_income_values.as_deref().and_then(cagr),
        operating_cash_flow_yoy_growth: ocf_values.as_deref().and_then(year_over_year),
        operating_cash_flow_cagr_5y: ocf_values.as_deref().and_then(cagr),
    }
}

/// Growth of the latest value versus the one before it.
fn year_over_year(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let latest = values[values.len() - 1];
    let previous = values[values.len() - 2];
    if previous == 0.0 {
        return None;
    }
    Some((latest - previous) / previous.abs())
}

/// Compound annual growth rate over the last [`CAGR_PERIODS`] values.
fn cagr(values: &[f64]) -> Option<f64> {
    if values.len() < CAGR_PERIODS {
        return None;
    }
    let latest = values[values.len() - 1];
    let base = values[values.len() - CAGR_PERIODS];
    if base <= 0.0 {
        return None;
    }
    let rate = (latest / base).powf(1.0 / CAGR_PERIODS as f64) - 1.0;
    rate.is_finite().then_some(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fundlens_core::{Cik, FactPoint, StatementKind};

    fn annual_series(concept: &str, values: &[f64]) -> FactSeries {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &value)| FactPoint {
                form: Some("10-K".to_string()),
                filed: NaiveDate::from_ymd_opt(2019 + i as i32, 2, 1),
                ..FactPoint::new(
                    value,
                    NaiveDate::from_ymd_opt(2018 + i as i32, 12, 31).unwrap(),
                )
            })
            .collect();
        FactSeries::new(concept, StatementKind::Income, points)
    }

    fn facts_with(series: Vec<FactSeries>) -> CompanyFacts {
        CompanyFacts::new(Cik::new("1"), "Test Co", series)
    }

    #[test]
    fn year_over_year_growth() {
        let facts = facts_with(vec![annual_series("revenue", &[100.0, 110.0])]);
        let report = compute(&facts);
        let yoy = report.revenue_yoy_growth.unwrap();
        assert!((yoy - 0.1).abs() < 1e-12);
        // Only two periods: no CAGR.
        assert_eq!(report.revenue_cagr_5y, None);
    }

    #[test]
    fn yoy_divides_by_absolute_previous() {
        let facts = facts_with(vec![annual_series("net_income", &[-100.0, -50.0])]);
        let report = compute(&facts);
        // Loss halved: improvement of +0.5 against |prev|.
        assert!((report.net_income_yoy_growth.unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn five_year_cagr() {
        // Doubling over the window: (200/100)^(1/5) - 1.
        let facts = facts_with(vec![annual_series(
            "revenue",
            &[100.0, 120.0, 150.0, 170.0, 200.0],
        )]);
        let report = compute(&facts);
        let expected = 2.0f64.powf(0.2) - 1.0;
        assert!((report.revenue_cagr_5y.unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn cagr_requires_positive_base() {
        let facts = facts_with(vec![annual_series(
            "operating_cash_flow",
            &[-10.0, 20.0, 30.0, 40.0, 50.0],
        )]);
        let report = compute(&facts);
        assert_eq!(report.operating_cash_flow_cagr_5y, None);
    }

    #[test]
    fn quarterly_points_are_ignored() {
        let mut points = vec![
            FactPoint {
                form: Some("10-K".to_string()),
                ..FactPoint::new(100.0, NaiveDate::from_ymd_opt(2022, 12, 31).unwrap())
            },
            FactPoint {
                form: Some("10-K".to_string()),
                ..FactPoint::new(110.0, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap())
            },
        ];
        points.push(FactPoint {
            form: Some("10-Q".to_string()),
            ..FactPoint::new(999.0, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap())
        });
        let facts = facts_with(vec![FactSeries::new(
            "revenue",
            StatementKind::Income,
            points,
        )]);
        let report = compute(&facts);
        assert!((report.revenue_yoy_growth.unwrap() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn missing_series_yields_empty_report() {
        let facts = facts_with(vec![]);
        assert_eq!(compute(&facts), GrowthReport::default());
    }
}
