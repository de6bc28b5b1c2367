//! Results returned by the mutating operations.
//!
//! Callers use these to decide whether a re-read is needed, instead of
//! being notified implicitly.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The result of a payment registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationOutcome {
    /// Records appended to the ledger.
    pub appended: usize,
    /// Existing records whose amount was replaced.
    pub overwritten: usize,
    /// Pairs skipped because their amount was zero.
    pub skipped_zero: usize,
    /// Periods that already had a record for the employee.
    pub duplicates: Vec<String>,
}

impl RegistrationOutcome {
    /// Returns true if the ledger content changed.
    pub fn changed(&self) -> bool {
        self.appended > 0 || self.overwritten > 0
    }
}

/// The result of annotating per-employee totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsSummary {
    /// Number of employee nodes annotated.
    pub employees: usize,
    /// Sum of all annotated totals.
    pub grand_total: Decimal,
}

/// The result of annotating the ledger grand total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrandTotal {
    /// Number of ledger items summed.
    pub items: usize,
    /// The computed total.
    pub total: Decimal,
    /// The total as written to the document.
    pub formatted: String,
}
