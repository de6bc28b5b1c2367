//! Core data models for the payroll ledger engine.
//!
//! These types are derived transiently from the ledger documents on every
//! read; nothing here is persisted on its own.

mod display_row;
mod employee;
mod outcome;
mod payment;

pub use display_row::{DisplayRow, MISSING_AMOUNT};
pub use employee::{Employee, SalaryEntry};
pub use outcome::{GrandTotal, RegistrationOutcome, TotalsSummary};
pub use payment::{EmployeeIdentity, PaymentRecord, PeriodAmount};
