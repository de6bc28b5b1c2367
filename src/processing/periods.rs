//! Discovery of the pay-period labels present in a document.
//!
//! Labels are opaque strings. They are ordered by plain byte-wise string
//! comparison, so `"october"` sorts before `"september"`.

use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{Span, debug};

use crate::error::LedgerResult;
use crate::ledger::LedgerStore;
use crate::ledger::document::{self, nodes};
use crate::logging::component_span;

/// Returns the distinct non-empty period labels of every `salary` and
/// `item` node, sorted ascending.
///
/// Works on both the raw ledger and the normalized tree.
///
/// # Examples
///
/// ```
/// use payroll_ledger::processing::discover_periods;
/// use serde_json::json;
///
/// let ledger = json!({ "Pay": { "item": [
///     { "period": "september" },
///     { "period": "october" },
///     { "mount": "september" },
///     { "period": "" }
/// ] } });
/// assert_eq!(discover_periods(&ledger), vec!["october", "september"]);
/// ```
pub fn discover_periods(doc: &Value) -> Vec<String> {
    let mut labels = BTreeSet::new();
    for key in [nodes::SALARY, nodes::ITEM] {
        for node in document::descendants(doc, key) {
            if let Some(period) = document::period(node).filter(|p| !p.is_empty()) {
                labels.insert(period.into_owned());
            }
        }
    }
    labels.into_iter().collect()
}

/// Reads period labels from documents on disk.
#[derive(Debug, Clone)]
pub struct PeriodDiscovery {
    store: LedgerStore,
    span: Span,
}

impl PeriodDiscovery {
    /// Creates a discovery component logging under `period_discovery`.
    pub fn new(store: LedgerStore) -> Self {
        Self::with_span(store, component_span("period_discovery"))
    }

    /// Creates a discovery component logging under the given span.
    pub fn with_span(store: LedgerStore, span: Span) -> Self {
        Self { store, span }
    }

    /// Loads the document at `path` and returns its period labels.
    pub fn discover(&self, path: &Path) -> LedgerResult<Vec<String>> {
        let doc = self.store.load(path, "discover_periods")?;
        let _enter = self.span.enter();

        let periods = discover_periods(&doc);
        debug!(path = %path.display(), count = periods.len(), "Discovered periods");
        Ok(periods)
    }
}
