//! Financial ratios from the latest facts and a market snapshot.

use fundlens_core::{CompanyFacts, MarketSnapshot};
use serde::{Deserialize, Serialize};

/// Computed financial ratios.
///
/// SEC-derived ratios are fractions (0.25 = 25 %); market ratios are taken
/// from the snapshot as the quote source reports them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RatioReport {
    /// Net income over revenue.
    pub net_profit_margin: Option<f64>,
    /// Operating income over revenue.
    pub operating_margin: Option<f64>,
    /// Gross profit over revenue.
    pub gross_margin: Option<f64>,
    /// Net income over total assets.
    pub roa: Option<f64>,
    /// Net income over stockholders' equity.
    pub roe: Option<f64>,
    /// Current assets over current liabilities.
    pub current_ratio: Option<f64>,
    /// Total liabilities over total assets.
    pub debt_ratio: Option<f64>,
    /// Long-term debt over stockholders' equity.
    pub debt_to_equity: Option<f64>,
    /// Operating income over absolute interest expense.
    pub interest_coverage: Option<f64>,
    /// Operating cash flow minus absolute capital expenditures.
    pub free_cash_flow: Option<f64>,
    /// Stockholders' equity per outstanding share.
    pub book_value_per_share: Option<f64>,
    /// Trailing price-to-earnings ratio.
    pub pe_ratio: Option<f64>,
    /// Forward price-to-earnings ratio.
    pub forward_pe: Option<f64>,
    /// Price/earnings-to-growth ratio.
    pub peg_ratio: Option<f64>,
    /// Price-to-book ratio.
    pub price_to_book: Option<f64>,
    /// Price-to-sales ratio.
    pub price_to_sales: Option<f64>,
    /// Enterprise value to revenue.
    pub ev_to_revenue: Option<f64>,
    /// Enterprise value to EBITDA.
    pub ev_to_ebitda: Option<f64>,
    /// Dividend yield.
    pub dividend_yield: Option<f64>,
    /// Beta coefficient.
    pub beta: Option<f64>,
}

impl RatioReport {
    /// Name/value pairs in report order, for summary rendering.
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("net_profit_margin", self.net_profit_margin),
            ("operating_margin", self.operating_margin),
            ("gross_margin", self.gross_margin),
            ("roa", self.roa),
            ("roe", self.roe),
            ("current_ratio", self.current_ratio),
            ("debt_ratio", self.debt_ratio),
            ("debt_to_equity", self.debt_to_equity),
            ("interest_coverage", self.interest_coverage),
            ("free_cash_flow", self.free_cash_flow),
            ("book_value_per_share", self.book_value_per_share),
            ("pe_ratio", self.pe_ratio),
            ("forward_pe", self.forward_pe),
            ("peg_ratio", self.peg_ratio),
            ("price_to_book", self.price_to_book),
            ("price_to_sales", self.price_to_sales),
            ("ev_to_revenue", self.ev_to_revenue),
            ("ev_to_ebitda", self.ev_to_ebitda),
            ("dividend_yield", self.dividend_yield),
            ("beta", self.beta),
        ]
    }
}

/// Divides when both operands are present and the denominator is non-zero.
fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d),
        _ => None,
    }
}

/// Like [`ratio`] but requires a strictly positive denominator.
fn ratio_positive(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d > 0.0 => Some(n / d),
        _ => None,
    }
}

/// Computes all ratios from the latest fact per concept plus the snapshot.
#[must_use]
pub fn compute(facts: &CompanyFacts, snapshot: Option<&MarketSnapshot>) -> RatioReport {
    let revenue = facts.latest_value("revenue");
    let net_income = facts.latest_value("net_income");
    let gross_profit = facts.latest_value("gross_profit");
    let operating_income = facts.latest_value("operating_income");
    let interest_expense = facts.latest_value("interest_expense");
    let assets = facts.latest_value("assets");
    let liabilities = facts.latest_value("liabilities");
    let equity = facts.latest_value("stockholders_equity");
    let current_assets = facts.latest_value("current_assets");
    let current_liabilities = facts.latest_value("current_liabilities");
    let long_term_debt = facts.latest_value("long_term_debt");
    let operating_cash_flow = facts.latest_value("operating_cash_flow");
    let capex = facts.latest_value("capital_expenditures");

    let mut report = RatioReport {
        net_profit_margin: ratio(net_income, revenue),
        operating_margin: ratio(operating_income, revenue),
        gross_margin: ratio(gross_profit, revenue),
        roa: ratio_positive(net_income, assets),
        roe: ratio_positive(net_income, equity),
        current_ratio: ratio_positive(current_assets, current_liabilities),
        debt_ratio: ratio_positive(liabilities, assets),
        debt_to_equity: ratio_positive(long_term_debt, equity),
        interest_coverage: ratio(operating_income, interest_expense.map(f64::abs)),
        free_cash_flow: match (operating_cash_flow, capex) {
            (Some(ocf), Some(capex)) => Some(ocf - capex.abs()),
            _ => None,
        },
        ..RatioReport::default()
    };

    if let Some(snapshot) = snapshot {
        report.book_value_per_share = ratio_positive(equity, snapshot.shares_outstanding);
        report.pe_ratio = snapshot.trailing_pe;
        report.forward_pe = snapshot.forward_pe;
        report.peg_ratio = snapshot.peg_ratio;
        report.price_to_book = snapshot.price_to_book;
        report.price_to_sales = snapshot.price_to_sales;
        report.ev_to_revenue = snapshot.ev_to_revenue;
        report.ev_to_ebitda = snapshot.ev_to_ebitda;
        report.dividend_yield = snapshot.dividend_yield;
        report.beta = snapshot.beta;
    }

    report
}
