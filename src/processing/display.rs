//! Projection of employees onto the dense employee × period matrix.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{Span, debug};

use super::{AmountParser, discover_periods};
use crate::error::{AmountOverflow, LedgerError, LedgerResult};
use crate::ledger::{LedgerStore, queries};
use crate::logging::component_span;
use crate::models::{DisplayRow, Employee, EmployeeIdentity, MISSING_AMOUNT};

/// Builds one display row per distinct (name, surname), in first-seen order.
///
/// Every row has a cell for each of `periods`: the formatted sum of the
/// employee's entries for that period, or [`MISSING_AMOUNT`] when there are
/// none. The total is recomputed from the entries, never read from a stored
/// annotation.
///
/// # Errors
///
/// Returns [`AmountOverflow`] when a cell or a row total does not fit in a
/// `Decimal`.
///
/// # Examples
///
/// ```
/// use payroll_ledger::models::{Employee, SalaryEntry};
/// use payroll_ledger::processing::{AmountParser, project_rows};
/// use rust_decimal::Decimal;
///
/// let mut alice = Employee::new("Alice", "Smith");
/// alice.salaries.push(SalaryEntry { period: "march".into(), amount: Decimal::new(10050, 2) });
///
/// let periods = vec!["january".to_string(), "march".to_string()];
/// let rows = project_rows(&[alice], &periods, &AmountParser::default()).unwrap();
///
/// assert_eq!(rows[0].full_name, "Alice Smith");
/// assert_eq!(rows[0].periods["january"], "0");
/// assert_eq!(rows[0].periods["march"], "100.50");
/// assert_eq!(rows[0].total, "100.50");
/// ```
pub fn project_rows(
    employees: &[Employee],
    periods: &[String],
    parser: &AmountParser,
) -> Result<Vec<DisplayRow>, AmountOverflow> {
    let mut merged: Vec<Employee> = Vec::new();
    let mut positions: HashMap<EmployeeIdentity, usize> = HashMap::new();
    for employee in employees {
        match positions.get(&employee.identity()) {
            Some(&index) => merged[index].salaries.extend(employee.salaries.iter().cloned()),
            None => {
                positions.insert(employee.identity(), merged.len());
                merged.push(employee.clone());
            }
        }
    }

    merged
        .iter()
        .map(|employee| -> Result<DisplayRow, AmountOverflow> {
            let cells = periods
                .iter()
                .map(|period| -> Result<(String, String), AmountOverflow> {
                    let cell = employee
                        .amount_for(period)?
                        .map(|amount| parser.format(amount))
                        .unwrap_or_else(|| MISSING_AMOUNT.to_string());
                    Ok((period.clone(), cell))
                })
                .collect::<Result<BTreeMap<_, _>, _>>()?;

            Ok(DisplayRow {
                full_name: employee.full_name(),
                periods: cells,
                total: parser.format(employee.total()?),
            })
        })
        .collect()
}

/// Reads display rows from a normalized tree on disk.
#[derive(Debug, Clone)]
pub struct DisplayProjector {
    store: LedgerStore,
    parser: AmountParser,
    span: Span,
}

impl DisplayProjector {
    /// Creates a projector logging under the `display_projector` component.
    pub fn new(store: LedgerStore, parser: AmountParser) -> Self {
        Self::with_span(store, parser, component_span("display_projector"))
    }

    /// Creates a projector logging under the given span.
    pub fn with_span(store: LedgerStore, parser: AmountParser, span: Span) -> Self {
        Self { store, parser, span }
    }

    /// Loads the normalized tree at `path` and projects its employees over
    /// the periods discovered in the same tree.
    ///
    /// # Returns
    ///
    /// Returns the rows, or an error if:
    /// - The path is empty (`Validation`) or absent (`NotFound`)
    /// - The document is not valid JSON (`Parse`)
    /// - A cell or row total does not fit in a `Decimal` (`Overflow`)
    pub fn rows(&self, path: &Path) -> LedgerResult<Vec<DisplayRow>> {
        const OPERATION: &str = "display_rows";
        let doc = self.store.load(path, OPERATION)?;
        let _enter = self.span.enter();

        let employees = queries::employees_from_tree(&doc, &self.parser);
        let periods = discover_periods(&doc);
        let rows = project_rows(&employees, &periods, &self.parser)
            .map_err(|source| {
                LedgerError::overflow(OPERATION, path.display().to_string(), source)
            })?;
        debug!(
            path = %path.display(),
            rows = rows.len(),
            periods = periods.len(),
            "Projected display rows"
        );
        Ok(rows)
    }
}
