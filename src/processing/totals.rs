//! Per-employee and ledger-wide totals.
//!
//! Totals are always recomputed from the source amounts and overwrite any
//! previous annotation, so running an aggregation twice leaves the document
//! unchanged.

use rust_decimal::Decimal;
use serde_json::Value;
use std::path::Path;
use tracing::{Span, info};

use super::AmountParser;
use crate::error::{AmountOverflow, LedgerError, LedgerResult};
use crate::ledger::LedgerStore;
use crate::ledger::document::{self, fields, nodes};
use crate::logging::component_span;
use crate::models::{GrandTotal, TotalsSummary};

/// Sets `totalSalary` on every `Employee` node of a normalized tree.
///
/// Returns `Ok(None)` when the tree has no `Employee` key at all.
///
/// # Errors
///
/// Returns [`AmountOverflow`] when an employee's salaries, or the sum over
/// all employees, do not fit in a `Decimal`. The tree may then be partly
/// annotated and should be discarded.
pub fn annotate_employee_totals(
    doc: &mut Value,
    parser: &AmountParser,
) -> Result<Option<TotalsSummary>, AmountOverflow> {
    if !document::contains_key(doc, nodes::EMPLOYEE) {
        return Ok(None);
    }

    let mut summary = TotalsSummary {
        employees: 0,
        grand_total: Decimal::ZERO,
    };
    let mut overflow: Option<AmountOverflow> = None;
    document::visit_descendants_mut(doc, nodes::EMPLOYEE, &mut |employee| {
        if overflow.is_some() {
            return;
        }
        let salaries = document::descendants_of(employee, nodes::SALARY)
            .into_iter()
            .map(|salary| document::field(salary, fields::AMOUNT));
        let Some(total) = parser.sum(salaries) else {
            overflow = Some(AmountOverflow::new(format!(
                "employee '{} {}'",
                document::text(employee, fields::NAME),
                document::text(employee, fields::SURNAME)
            )));
            return;
        };
        let Some(grand_total) = summary.grand_total.checked_add(total) else {
            overflow = Some(AmountOverflow::new("all employees"));
            return;
        };

        employee.insert(
            fields::TOTAL_SALARY.to_string(),
            Value::String(parser.format(total)),
        );
        summary.employees += 1;
        summary.grand_total = grand_total;
    });

    match overflow {
        Some(overflow) => Err(overflow),
        None => Ok(Some(summary)),
    }
}

/// Sets `totalAmount` on the first `Pay` node of a raw ledger to the sum of
/// every `item` amount in the document.
///
/// Returns `Ok(None)` when the ledger has no `Pay` node.
///
/// # Errors
///
/// Returns [`AmountOverflow`] when the item amounts do not fit in a
/// `Decimal`; the tree is left untouched.
pub fn annotate_grand_total(
    doc: &mut Value,
    parser: &AmountParser,
) -> Result<Option<GrandTotal>, AmountOverflow> {
    if !document::contains_key(doc, nodes::PAY) {
        return Ok(None);
    }

    let items = document::descendants(doc, nodes::ITEM);
    let count = items.len();
    let total = parser
        .sum(items.into_iter().map(|item| document::field(item, fields::AMOUNT)))
        .ok_or_else(|| AmountOverflow::new("ledger items"))?;
    let formatted = parser.format(total);

    let Some(pay) = document::first_node_mut(doc, nodes::PAY) else {
        return Ok(None);
    };
    pay.insert(
        fields::TOTAL_AMOUNT.to_string(),
        Value::String(formatted.clone()),
    );
    Ok(Some(GrandTotal {
        items: count,
        total,
        formatted,
    }))
}

/// Annotates totals on ledger files.
#[derive(Debug, Clone)]
pub struct TotalsAggregator {
    store: LedgerStore,
    parser: AmountParser,
    span: Span,
}

impl TotalsAggregator {
    /// Creates an aggregator logging under the `totals_aggregator` component.
    pub fn new(store: LedgerStore, parser: AmountParser) -> Self {
        Self::with_span(store, parser, component_span("totals_aggregator"))
    }

    /// Creates an aggregator logging under the given span.
    pub fn with_span(store: LedgerStore, parser: AmountParser, span: Span) -> Self {
        Self { store, parser, span }
    }

    /// Writes `totalSalary` onto every employee of the normalized tree at
    /// `path`.
    ///
    /// # Returns
    ///
    /// Returns the number of employees and the sum of their totals, or an
    /// error if:
    /// - The path is empty (`Validation`) or absent (`NotFound`)
    /// - The document has no `Employee` node (`Structural`)
    /// - The salaries do not fit in a `Decimal` (`Overflow`)
    pub fn add_employee_totals(&self, path: &Path) -> LedgerResult<TotalsSummary> {
        const OPERATION: &str = "add_employee_totals";
        let mut doc = self.store.load(path, OPERATION)?;
        let _enter = self.span.enter();

        let summary = annotate_employee_totals(&mut doc, &self.parser)
            .map_err(|source| LedgerError::overflow(OPERATION, path.display().to_string(), source))?
            .ok_or_else(|| LedgerError::Structural {
                operation: OPERATION,
                path: path.display().to_string(),
                node: nodes::EMPLOYEE.to_string(),
            })?;

        self.store.save(path, &doc, OPERATION)?;
        info!(
            path = %path.display(),
            employees = summary.employees,
            total = %summary.grand_total,
            "Employee totals updated"
        );
        Ok(summary)
    }

    /// Writes `totalAmount` onto the `Pay` node of the raw ledger at `path`.
    ///
    /// # Returns
    ///
    /// Returns the item count and the total, or an error if:
    /// - The path is empty (`Validation`) or absent (`NotFound`)
    /// - The ledger has no `Pay` node (`Structural`)
    /// - The item amounts do not fit in a `Decimal` (`Overflow`)
    pub fn add_grand_total(&self, path: &Path) -> LedgerResult<GrandTotal> {
        const OPERATION: &str = "add_grand_total";
        let mut doc = self.store.load(path, OPERATION)?;
        let _enter = self.span.enter();

        let total = annotate_grand_total(&mut doc, &self.parser)
            .map_err(|source| LedgerError::overflow(OPERATION, path.display().to_string(), source))?
            .ok_or_else(|| LedgerError::Structural {
                operation: OPERATION,
                path: path.display().to_string(),
                node: nodes::PAY.to_string(),
            })?;

        self.store.save(path, &doc, OPERATION)?;
        info!(
            path = %path.display(),
            items = total.items,
            total = %total.formatted,
            "Grand total updated"
        );
        Ok(total)
    }
}
