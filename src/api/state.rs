//! Application state for the payroll ledger API.

use std::sync::Arc;

use crate::config::FileSettings;
use crate::service::PayrollLedger;

/// Shared application state.
///
/// Holds the ledger engine and the default document locations used when a
/// request does not name a path.
#[derive(Clone)]
pub struct AppState {
    ledger: Arc<PayrollLedger>,
    files: Arc<FileSettings>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(ledger: PayrollLedger, files: FileSettings) -> Self {
        Self {
            ledger: Arc::new(ledger),
            files: Arc::new(files),
        }
    }

    /// Returns a shared handle to the ledger engine.
    pub fn ledger(&self) -> Arc<PayrollLedger> {
        Arc::clone(&self.ledger)
    }

    /// Returns the default document locations.
    pub fn files(&self) -> &FileSettings {
        &self.files
    }
}
