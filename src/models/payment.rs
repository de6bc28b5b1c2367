//! Payment records and the inputs of a payment registration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifies an employee by name and surname.
///
/// The ledger has no employee ids, so this pair is the only identity there is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployeeIdentity {
    /// First name.
    pub name: String,
    /// Surname.
    pub surname: String,
}

impl EmployeeIdentity {
    /// Creates an identity from its parts.
    pub fn new(name: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            surname: surname.into(),
        }
    }

    /// Returns `"name surname"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_ledger::models::EmployeeIdentity;
    ///
    /// let identity = EmployeeIdentity::new("Alice", "Smith");
    /// assert_eq!(identity.full_name(), "Alice Smith");
    /// ```
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }

    /// Returns true if this identity matches the given name and surname exactly.
    pub fn matches(&self, name: &str, surname: &str) -> bool {
        self.name == name && self.surname == surname
    }
}

/// One amount to register for one pay period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodAmount {
    /// The free-form period label.
    pub period: String,
    /// The amount paid; zero means "no payment for this period".
    pub amount: Decimal,
}

impl PeriodAmount {
    /// Creates a period amount.
    pub fn new(period: impl Into<String>, amount: Decimal) -> Self {
        Self {
            period: period.into(),
            amount,
        }
    }
}

/// A single item of the raw ledger, exactly as stored.
///
/// `amount` is kept as the original text; it is only interpreted through
/// the amount parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Employee first name.
    pub name: String,
    /// Employee surname.
    pub surname: String,
    /// Free-form numeric text.
    pub amount: String,
    /// Free-form period label.
    pub period: String,
}
