//! Display rows: the dense employee × period matrix handed to presentation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cell value used when an employee has no entry for a period.
pub const MISSING_AMOUNT: &str = "0";

/// One row of the employee × period matrix.
///
/// `periods` holds an entry for every discovered period label. Discovery
/// sorts labels lexicographically, which is also the iteration order of the
/// map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRow {
    /// `"name surname"`.
    pub full_name: String,
    /// Formatted amount per period label.
    pub periods: BTreeMap<String, String>,
    /// Formatted total of the employee.
    pub total: String,
}
