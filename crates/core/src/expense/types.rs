//! Expense domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Expense category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    /// Hotels, camps and homestays.
    Accommodation,
    /// Meals.
    Food,
    /// Vehicles, fuel and tickets.
    Transportation,
    /// Activity fees.
    Activities,
    /// Gear purchase or rental.
    Equipment,
    /// Permits and entry fees.
    Permits,
    /// Guide payments.
    GuideFees,
    /// Medical supplies and care.
    Medical,
    /// Small items.
    Miscellaneous,
    /// Anything else.
    Other,
}

impl ExpenseCategory {
    /// Wire and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accommodation => "accommodation",
            Self::Food => "food",
            Self::Transportation => "transportation",
            Self::Activities => "activities",
            Self::Equipment => "equipment",
            Self::Permits => "permits",
            Self::GuideFees => "guide_fees",
            Self::Medical => "medical",
            Self::Miscellaneous => "miscellaneous",
            Self::Other => "other",
        }
    }
}

/// One expense as far as the roll-ups are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpenseLine {
    /// Category.
    pub category: ExpenseCategory,
    /// Amount spent.
    pub amount: Decimal,
    /// Day the money was spent.
    pub date: NaiveDate,
}
