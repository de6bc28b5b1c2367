//! Payroll ledger transform and aggregation engine.
//!
//! This crate reads an append-only payment ledger, maps it through an
//! externally authored transform definition into a normalized employee
//! tree, annotates per-employee and grand totals, discovers the pay-period
//! labels in use and appends new payments with duplicate detection.
//!
//! The operations are gathered on [`service::PayrollLedger`] and exposed
//! over HTTP by [`api::create_router`].

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod processing;
pub mod service;
