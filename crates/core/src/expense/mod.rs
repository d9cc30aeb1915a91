//! Trip expense roll-ups.

mod analytics;
mod types;

pub use analytics::{CategoryTotals, DateRange, ExpenseAnalytics, ExpenseSummary};
pub use types::{ExpenseCategory, ExpenseLine};
