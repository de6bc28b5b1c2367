//! Configuration loading for the payroll ledger engine.
//!
//! Settings live in a single YAML file, but each component only ever
//! receives the narrow slice it needs: the amount parser gets
//! [`AmountSettings`], the payment registrar gets a [`DuplicatePolicy`],
//! and the HTTP layer gets [`FileSettings`].
//!
//! # Example
//!
//! ```no_run
//! use payroll_ledger::config::ConfigLoader;
//!
//! let settings = ConfigLoader::load("./config/payroll.yaml").unwrap();
//! println!("Ledger: {}", settings.files.ledger.display());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AmountSettings, DuplicatePolicy, FileSettings, LedgerSettings, PaymentSettings, ServerSettings,
};
