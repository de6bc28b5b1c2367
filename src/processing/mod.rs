//! The processing components of the payroll ledger engine.
//!
//! Each component pairs a pure function over ledger documents with a small
//! struct that loads, applies and saves around it:
//!
//! - [`amount`]: tolerant amount parsing and invariant formatting
//! - [`transform`]: raw ledger to normalized employee tree
//! - [`totals`]: per-employee and grand totals
//! - [`periods`]: discovery of the period labels in use
//! - [`registrar`]: appending payments with duplicate handling
//! - [`display`]: the employee × period matrix

pub mod amount;
pub mod display;
pub mod periods;
pub mod registrar;
pub mod totals;
pub mod transform;

pub use amount::AmountParser;
pub use display::{DisplayProjector, project_rows};
pub use periods::{PeriodDiscovery, discover_periods};
pub use registrar::PaymentRegistrar;
pub use totals::{TotalsAggregator, annotate_employee_totals, annotate_grand_total};
pub use transform::{EngineError, TransformDefinition, TransformOutput, TransformPipeline, apply};
