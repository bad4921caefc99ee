//! Accounting concept table.
//!
//! Maps semantic metric names to candidate US-GAAP XBRL tags. Different
//! filers tag the same concept differently, so each concept carries its
//! candidate tags in priority order; extraction takes the first tag that is
//! present in a filer's facts.

use fundlens_core::StatementKind;

/// An accounting concept with its candidate XBRL tags.
#[derive(Clone, Copy, Debug)]
pub struct Concept {
    /// Semantic name used throughout the pipeline (e.g. "revenue").
    pub name: &'static str,
    /// Candidate XBRL tags, highest priority first.
    pub tags: &'static [&'static str],
    /// Statement the concept belongs to.
    pub statement: StatementKind,
}

const fn income(name: &'static str, tags: &'static [&'static str]) -> Concept {
    Concept {
        name,
        tags,
        statement: StatementKind::Income,
    }
}

const fn balance(name: &'static str, tags: &'static [&'static str]) -> Concept {
    Concept {
        name,
        tags,
        statement: StatementKind::BalanceSheet,
    }
}

const fn cash_flow(name: &'static str, tags: &'static [&'static str]) -> Concept {
    Concept {
        name,
        tags,
        statement: StatementKind::CashFlow,
    }
}

/// Every concept the pipeline extracts from company facts.
pub const CONCEPTS: &[Concept] = &[
    // Income statement
    income(
        "revenue",
        &[
            "Revenues",
            "RevenueFromContractWithCustomerExcludingAssessedTax",
            "SalesRevenueNet",
            "RevenueFromContractWithCustomerIncludingAssessedTax",
        ],
    ),
    income(
        "cost_of_revenue",
        &["CostOfRevenue", "CostOfGoodsAndServicesSold", "CostOfGoodsSold"],
    ),
    income("gross_profit", &["GrossProfit"]),
    income("research_development", &["ResearchAndDevelopmentExpense"]),
    income(
        "selling_general_admin",
        &["SellingGeneralAndAdministrativeExpense"],
    ),
    income("operating_expenses", &["OperatingExpenses"]),
    income("operating_income", &["OperatingIncomeLoss"]),
    income("interest_expense", &["InterestExpense"]),
    income("tax_expense", &["IncomeTaxExpenseBenefit"]),
    income(
        "net_income",
        &["NetIncomeLoss", "ProfitLoss"],
    ),
    income("eps_basic", &["EarningsPerShareBasic"]),
    income("eps_diluted", &["EarningsPerShareDiluted"]),
    income(
        "weighted_average_shares",
        &["WeightedAverageNumberOfSharesOutstandingBasic"],
    ),
    income(
        "weighted_average_shares_diluted",
        &["WeightedAverageNumberOfDilutedSharesOutstanding"],
    ),
    // Balance sheet
    balance("assets", &["Assets"]),
    balance("current_assets", &["AssetsCurrent"]),
    balance(
        "cash",
        &[
            "CashAndCashEquivalentsAtCarryingValue",
            "CashCashEquivalentsAndShortTermInvestments",
        ],
    ),
    balance("short_term_investments", &["ShortTermInvestments"]),
    balance(
        "accounts_receivable",
        &["AccountsReceivableNetCurrent", "ReceivablesNetCurrent"],
    ),
    balance("inventory", &["InventoryNet", "Inventories"]),
    balance(
        "property_plant_equipment",
        &["PropertyPlantAndEquipmentNet"],
    ),
    balance("goodwill", &["Goodwill"]),
    balance(
        "intangible_assets",
        &["IntangibleAssetsNetExcludingGoodwill"],
    ),
    balance("liabilities", &["Liabilities"]),
    balance("current_liabilities", &["LiabilitiesCurrent"]),
    balance("accounts_payable", &["AccountsPayableCurrent"]),
    balance("short_term_debt", &["ShortTermBorrowings", "DebtCurrent"]),
    balance(
        "long_term_debt",
        &["LongTermDebt", "LongTermDebtNoncurrent"],
    ),
    balance("long_term_debt_current", &["LongTermDebtCurrent"]),
    balance(
        "stockholders_equity",
        &[
            "StockholdersEquity",
            "StockholdersEquityIncludingPortionAttributableToNoncontrollingInterest",
        ],
    ),
    balance(
        "retained_earnings",
        &["RetainedEarningsAccumulatedDeficit"],
    ),
    balance("common_stock", &["CommonStockValue"]),
    balance("treasury_stock", &["TreasuryStockValue"]),
    balance(
        "shares_outstanding",
        &[
            "CommonStockSharesOutstanding",
            "CommonStockSharesIssued",
            "EntityCommonStockSharesOutstanding",
        ],
    ),
    // Cash flow statement
    cash_flow(
        "operating_cash_flow",
        &[
            "NetCashProvidedByUsedInOperatingActivities",
            "CashProvidedByUsedInOperatingActivities",
        ],
    ),
    cash_flow(
        "investing_cash_flow",
        &["NetCashProvidedByUsedInInvestingActivities"],
    ),
    cash_flow(
        "financing_cash_flow",
        &["NetCashProvidedByUsedInFinancingActivities"],
    ),
    cash_flow(
        "capital_expenditures",
        &[
            "PaymentsToAcquirePropertyPlantAndEquipment",
            "PaymentsForCapitalImprovements",
        ],
    ),
    cash_flow(
        "depreciation_amortization",
        &[
            "DepreciationDepletionAndAmortization",
            "DepreciationAndAmortization",
        ],
    ),
    cash_flow("stock_based_compensation", &["ShareBasedCompensation"]),
    cash_flow(
        "dividends_paid",
        &["PaymentsOfDividends", "PaymentsOfDividendsCommonStock"],
    ),
    cash_flow(
        "stock_repurchases",
        &["PaymentsForRepurchaseOfCommonStock"],
    ),
    cash_flow("debt_issuance", &["ProceedsFromIssuanceOfLongTermDebt"]),
    cash_flow("debt_repayment", &["RepaymentsOfLongTermDebt"]),
    cash_flow(
        "working_capital_change",
        &["IncreaseDecreaseInOperatingCapital"],
    ),
];

/// Looks up a concept by its semantic name.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static Concept> {
    CONCEPTS.iter().find(|c| c.name == name)
}
