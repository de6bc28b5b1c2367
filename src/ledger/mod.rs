//! Ledger documents: navigation, queries and persistence.

pub mod document;
pub mod queries;
pub mod store;

pub use store::{LedgerStore, require_file, require_path};
