//! Reporting period and statement classification.

use serde::{Deserialize, Serialize};

/// Reporting period of a filing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodType {
    /// Annual reporting period (10-K).
    #[default]
    Annual,
    /// Quarterly reporting period (10-Q).
    Quarterly,
}

impl PeriodType {
    /// Returns the SEC form type that carries this period.
    #[must_use]
    pub const fn form(&self) -> &'static str {
        match self {
            Self::Annual => "10-K",
            Self::Quarterly => "10-Q",
        }
    }

    /// Returns true if the given form type reports this period.
    #[must_use]
    pub fn matches_form(&self, form: &str) -> bool {
        form == self.form()
    }
}

/// Which financial statement an accounting concept belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementKind {
    /// Income statement.
    Income,
    /// Balance sheet.
    BalanceSheet,
    /// Cash flow statement.
    CashFlow,
}

impl StatementKind {
    /// Human-readable statement name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income_statement",
            Self::BalanceSheet => "balance_sheet",
            Self::CashFlow => "cash_flow",
        }
    }
}
