//! The payroll ledger facade.
//!
//! [`PayrollLedger`] wires the processing components together behind the
//! operations a host application calls. Every operation reads the current
//! on-disk state; nothing is cached between calls. Mutating operations
//! return their outcome and also publish a [`LedgerEvent`] once the save
//! has succeeded.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;
use tracing::{Span, info};

use crate::config::{AmountSettings, DuplicatePolicy, LedgerSettings};
use crate::error::LedgerResult;
use crate::ledger::{LedgerStore, queries};
use crate::logging::component_span;
use crate::models::{
    DisplayRow, EmployeeIdentity, GrandTotal, PeriodAmount, RegistrationOutcome, TotalsSummary,
};
use crate::processing::{
    AmountParser, DisplayProjector, PaymentRegistrar, PeriodDiscovery, TotalsAggregator,
    TransformOutput, TransformPipeline,
};

const EVENT_CAPACITY: usize = 64;

/// A change written to disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerChange {
    /// A normalized tree was written.
    Transformed {
        /// The written document.
        output: PathBuf,
    },
    /// Employee totals were annotated.
    EmployeeTotals {
        /// The annotated document.
        path: PathBuf,
        /// What was annotated.
        summary: TotalsSummary,
    },
    /// The ledger grand total was annotated.
    GrandTotal {
        /// The annotated ledger.
        path: PathBuf,
        /// What was annotated.
        total: GrandTotal,
    },
    /// Payments were registered.
    PaymentRegistered {
        /// The modified ledger.
        path: PathBuf,
        /// Whose payments were registered.
        employee: EmployeeIdentity,
        /// What was written.
        outcome: RegistrationOutcome,
    },
}

/// A change notification published after a successful save.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEvent {
    /// When the change was saved.
    pub at: DateTime<Utc>,
    /// What changed.
    pub change: LedgerChange,
}

/// The result of a full transform, totals and projection run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessReport {
    /// Name of the applied transform definition.
    pub definition: String,
    /// Where the normalized tree was written.
    pub output: PathBuf,
    /// Employee totals written onto the tree.
    pub totals: TotalsSummary,
    /// Period labels discovered in the tree.
    pub periods: Vec<String>,
    /// The projected display rows.
    pub rows: Vec<DisplayRow>,
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
}

/// The operations of the payroll ledger engine.
#[derive(Debug)]
pub struct PayrollLedger {
    store: LedgerStore,
    parser: AmountParser,
    pipeline: TransformPipeline,
    totals: TotalsAggregator,
    discovery: PeriodDiscovery,
    registrar: PaymentRegistrar,
    projector: DisplayProjector,
    events: broadcast::Sender<LedgerEvent>,
    span: Span,
}

impl PayrollLedger {
    /// Creates a ledger with the given amount settings and duplicate policy.
    pub fn new(amounts: AmountSettings, policy: DuplicatePolicy) -> Self {
        let store = LedgerStore::new();
        let parser = AmountParser::new(amounts);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            pipeline: TransformPipeline::new(store.clone()),
            totals: TotalsAggregator::new(store.clone(), parser),
            discovery: PeriodDiscovery::new(store.clone()),
            registrar: PaymentRegistrar::new(store.clone(), parser, policy),
            projector: DisplayProjector::new(store.clone(), parser),
            store,
            parser,
            events,
            span: component_span("payroll_ledger"),
        }
    }

    /// Creates a ledger from a loaded settings file.
    pub fn from_settings(settings: &LedgerSettings) -> Self {
        Self::new(settings.amounts, settings.payments.duplicate_policy)
    }

    /// Subscribes to change notifications.
    ///
    /// Only changes that reached the disk are published. Events sent while
    /// nobody is subscribed are dropped.
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    /// Returns the amount parser in use.
    pub fn parser(&self) -> &AmountParser {
        &self.parser
    }

    /// Returns the duplicate policy applied to registrations.
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.registrar.policy()
    }

    fn publish(&self, change: LedgerChange) {
        let _ = self.events.send(LedgerEvent { at: Utc::now(), change });
    }

    /// Transforms the raw ledger at `input` into a normalized tree at `output`.
    pub fn transform(
        &self,
        input: &Path,
        definition: &Path,
        output: &Path,
    ) -> LedgerResult<TransformOutput> {
        let result = self.pipeline.run(input, definition, output)?;
        self.publish(LedgerChange::Transformed {
            output: output.to_path_buf(),
        });
        Ok(result)
    }

    /// Transforms, annotates employee totals and projects display rows in
    /// one call.
    pub fn process(
        &self,
        input: &Path,
        definition: &Path,
        output: &Path,
    ) -> LedgerResult<ProcessReport> {
        let transformed = self.transform(input, definition, output)?;
        let totals = self.add_employee_totals(output)?;
        let periods = self.discover_periods(output)?;
        let rows = self.display_rows(output)?;

        let _enter = self.span.enter();
        info!(
            output = %output.display(),
            employees = totals.employees,
            periods = periods.len(),
            "Processed ledger"
        );
        Ok(ProcessReport {
            definition: transformed.definition,
            output: output.to_path_buf(),
            totals,
            periods,
            rows,
            generated_at: Utc::now(),
        })
    }

    /// Writes `totalSalary` onto every employee of the normalized tree.
    pub fn add_employee_totals(&self, path: &Path) -> LedgerResult<TotalsSummary> {
        let summary = self.totals.add_employee_totals(path)?;
        self.publish(LedgerChange::EmployeeTotals {
            path: path.to_path_buf(),
            summary: summary.clone(),
        });
        Ok(summary)
    }

    /// Writes `totalAmount` onto the `Pay` node of the raw ledger.
    pub fn add_grand_total(&self, path: &Path) -> LedgerResult<GrandTotal> {
        let total = self.totals.add_grand_total(path)?;
        self.publish(LedgerChange::GrandTotal {
            path: path.to_path_buf(),
            total: total.clone(),
        });
        Ok(total)
    }

    /// Records payments for an employee in the raw ledger.
    ///
    /// An event is published only when the ledger content changed.
    pub fn register_payment(
        &self,
        path: &Path,
        employee: &EmployeeIdentity,
        amounts: &[PeriodAmount],
    ) -> LedgerResult<RegistrationOutcome> {
        let outcome = self.registrar.register(path, employee, amounts)?;
        if outcome.changed() {
            self.publish(LedgerChange::PaymentRegistered {
                path: path.to_path_buf(),
                employee: employee.clone(),
                outcome: outcome.clone(),
            });
        }
        Ok(outcome)
    }

    /// Returns the sorted, distinct period labels of the document at `path`.
    pub fn discover_periods(&self, path: &Path) -> LedgerResult<Vec<String>> {
        self.discovery.discover(path)
    }

    /// Returns the distinct employees of the raw ledger, sorted by surname
    /// and then by name.
    pub fn list_employees(&self, path: &Path) -> LedgerResult<Vec<EmployeeIdentity>> {
        let doc = self.store.load(path, "list_employees")?;
        Ok(queries::employees_in(&doc))
    }

    /// Returns the (period, amount) pairs recorded for an employee.
    pub fn employee_salaries(
        &self,
        path: &Path,
        name: &str,
        surname: &str,
    ) -> LedgerResult<Vec<PeriodAmount>> {
        let doc = self.store.load(path, "employee_salaries")?;
        Ok(queries::salaries_of(&doc, name, surname, &self.parser))
    }

    /// Returns true if the raw ledger records a payment for the exact
    /// (name, surname, period) triple.
    pub fn payment_exists(
        &self,
        path: &Path,
        name: &str,
        surname: &str,
        period: &str,
    ) -> LedgerResult<bool> {
        let doc = self.store.load(path, "payment_exists")?;
        Ok(queries::contains_payment(&doc, name, surname, period))
    }

    /// Returns the display rows of the normalized tree at `path`.
    pub fn display_rows(&self, path: &Path) -> LedgerResult<Vec<DisplayRow>> {
        self.projector.rows(path)
    }

    /// Parses amount text; never fails.
    pub fn parse_amount(&self, text: Option<&str>) -> Decimal {
        self.parser.parse(text)
    }
}

impl Default for PayrollLedger {
    fn default() -> Self {
        Self::from_settings(&LedgerSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_from_settings_carries_policy_and_amounts() {
        let mut settings = LedgerSettings::default();
        settings.payments.duplicate_policy = DuplicatePolicy::Reject;
        settings.amounts.decimal_places = 3;

        let ledger = PayrollLedger::from_settings(&settings);

        assert_eq!(ledger.duplicate_policy(), DuplicatePolicy::Reject);
        assert_eq!(ledger.parser().format(Decimal::ONE), "1.000");
    }

    #[test]
    fn test_events_published_after_successful_save() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, r#"{"Pay":{}}"#).unwrap();
        let ledger = PayrollLedger::default();
        let mut events = ledger.subscribe();

        ledger
            .register_payment(
                &path,
                &EmployeeIdentity::new("Alice", "Smith"),
                &[PeriodAmount::new("march", Decimal::TEN)],
            )
            .unwrap();

        let event = events.try_recv().unwrap();
        match event.change {
            LedgerChange::PaymentRegistered { outcome, .. } => assert_eq!(outcome.appended, 1),
            other => panic!("Expected PaymentRegistered, got {:?}", other),
        }
    }

    #[test]
    fn test_no_event_for_failed_or_empty_operations() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, r#"{"Pay":{}}"#).unwrap();
        let ledger = PayrollLedger::default();
        let mut events = ledger.subscribe();

        let _ = ledger.add_employee_totals(&path);
        ledger
            .register_payment(
                &path,
                &EmployeeIdentity::new("Alice", "Smith"),
                &[PeriodAmount::new("march", Decimal::ZERO)],
            )
            .unwrap();

        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_parse_amount_never_fails() {
        let ledger = PayrollLedger::default();
        assert_eq!(ledger.parse_amount(Some("1 200,5")), Decimal::new(12005, 1));
        assert_eq!(ledger.parse_amount(Some("garbage")), Decimal::ZERO);
    }
}
