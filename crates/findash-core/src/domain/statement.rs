use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// The four statement datasets tracked per ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementType {
    Income,
    BalanceSheet,
    CashFlow,
    Profile,
}

impl StatementType {
    pub const ALL: [Self; 4] = [Self::Income, Self::BalanceSheet, Self::CashFlow, Self::Profile];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::BalanceSheet => "balance_sheet",
            Self::CashFlow => "cash_flow",
            Self::Profile => "profile",
        }
    }

    /// Path segment on the provider API.
    pub const fn api_path(self) -> &'static str {
        match self {
            Self::Income => "income-statement",
            Self::BalanceSheet => "balance-sheet-statement",
            Self::CashFlow => "cash-flow-statement",
            Self::Profile => "profile",
        }
    }

    /// Raw payload field the fiscal-period key is derived from. Profiles
    /// have no reporting date; the listing date stands in as the period key.
    pub const fn period_field(self) -> &'static str {
        match self {
            Self::Profile => "ipoDate",
            _ => "date",
        }
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        match input.trim().to_ascii_lowercase().as_str() {
            "income" | "income-statement" | "income_statement" => Ok(Self::Income),
            "balance-sheet" | "balance_sheet" | "balance-sheet-statement" => Ok(Self::BalanceSheet),
            "cash-flow" | "cash_flow" | "cash-flow-statement" | "cash_flow_statement" => {
                Ok(Self::CashFlow)
            }
            "profile" | "company_profile" => Ok(Self::Profile),
            other => Err(ValidationError::InvalidStatementType {
                value: other.to_string(),
            }),
        }
    }
}

impl Display for StatementType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
