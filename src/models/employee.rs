//! Employee model and its salary entries.
//!
//! An [`Employee`] is read from the normalized tree produced by the
//! transform pipeline: one node per (name, surname) holding that
//! employee's salary entries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::EmployeeIdentity;
use crate::error::AmountOverflow;

/// One payment of an employee for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryEntry {
    /// The free-form period label.
    pub period: String,
    /// The parsed amount.
    pub amount: Decimal,
}

/// An employee with the salary entries recorded for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// First name.
    pub name: String,
    /// Surname.
    pub surname: String,
    /// Salary entries in document order.
    pub salaries: Vec<SalaryEntry>,
}

impl Employee {
    /// Creates an employee without salary entries.
    pub fn new(name: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            surname: surname.into(),
            salaries: Vec::new(),
        }
    }

    /// Returns `"name surname"`.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }

    /// Returns the identity of this employee.
    pub fn identity(&self) -> EmployeeIdentity {
        EmployeeIdentity::new(self.name.clone(), self.surname.clone())
    }

    /// Returns the sum of all salary entries.
    ///
    /// # Errors
    ///
    /// Returns [`AmountOverflow`] if the sum does not fit in a `Decimal`.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_ledger::models::{Employee, SalaryEntry};
    /// use rust_decimal::Decimal;
    ///
    /// let mut employee = Employee::new("Alice", "Smith");
    /// let march = SalaryEntry { period: "march".into(), amount: Decimal::new(10050, 2) };
    /// employee.salaries.push(march);
    /// let january = SalaryEntry { period: "january".into(), amount: Decimal::new(5025, 2) };
    /// employee.salaries.push(january);
    /// assert_eq!(employee.total(), Ok(Decimal::new(15075, 2)));
    /// ```
    pub fn total(&self) -> Result<Decimal, AmountOverflow> {
        self.salaries
            .iter()
            .try_fold(Decimal::ZERO, |acc, s| acc.checked_add(s.amount))
            .ok_or_else(|| AmountOverflow::new(format!("employee '{}'", self.full_name())))
    }

    /// Returns the sum of the entries recorded for `period`, or `None` when
    /// the employee has no entry for it.
    ///
    /// # Errors
    ///
    /// Returns [`AmountOverflow`] if the sum does not fit in a `Decimal`.
    pub fn amount_for(&self, period: &str) -> Result<Option<Decimal>, AmountOverflow> {
        let mut total: Option<Decimal> = None;
        for entry in self.salaries.iter().filter(|s| s.period == period) {
            let sum = total
                .unwrap_or(Decimal::ZERO)
                .checked_add(entry.amount)
                .ok_or_else(|| {
                    AmountOverflow::new(format!(
                        "employee '{}' in period '{}'",
                        self.full_name(),
                        period
                    ))
                })?;
            total = Some(sum);
        }
        Ok(total)
    }
}
