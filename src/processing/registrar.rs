//! Appending payments to the raw ledger.
//!
//! A registration is a full load, mutate and save of the ledger file. A zero
//! amount means "no payment for this period" and is skipped. What happens
//! when the employee already has a record for a period is decided by the
//! configured [`DuplicatePolicy`].

use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tracing::{Span, debug, info, warn};

use super::AmountParser;
use crate::config::DuplicatePolicy;
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::document::{self, Node, fields, nodes};
use crate::ledger::{LedgerStore, queries};
use crate::logging::component_span;
use crate::models::{EmployeeIdentity, PaymentRecord, PeriodAmount, RegistrationOutcome};

/// Registers payments in the raw ledger.
#[derive(Debug, Clone)]
pub struct PaymentRegistrar {
    store: LedgerStore,
    parser: AmountParser,
    policy: DuplicatePolicy,
    span: Span,
}

impl PaymentRegistrar {
    /// Creates a registrar logging under the `payment_registrar` component.
    pub fn new(store: LedgerStore, parser: AmountParser, policy: DuplicatePolicy) -> Self {
        Self::with_span(store, parser, policy, component_span("payment_registrar"))
    }

    /// Creates a registrar logging under the given span.
    pub fn with_span(
        store: LedgerStore,
        parser: AmountParser,
        policy: DuplicatePolicy,
        span: Span,
    ) -> Self {
        Self {
            store,
            parser,
            policy,
            span,
        }
    }

    /// Returns the duplicate policy applied to every batch.
    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Records `amounts` for `employee` in the ledger at `path`.
    ///
    /// # Returns
    ///
    /// Returns what was appended, overwritten and skipped, or an error if:
    /// - The name or surname is blank (`Validation`)
    /// - A non-zero amount has a blank period or lies outside the salary
    ///   range (`Validation`)
    /// - The ledger does not exist (`NotFound`)
    /// - The ledger has no `Pay` node (`Structural`)
    /// - The policy is `reject` and a period is already recorded (`Conflict`)
    ///
    /// On error the ledger file is left as it was.
    pub fn register(
        &self,
        path: &Path,
        employee: &EmployeeIdentity,
        amounts: &[PeriodAmount],
    ) -> LedgerResult<RegistrationOutcome> {
        const OPERATION: &str = "register_payment";
        let _enter = self.span.enter();

        self.validate(employee, amounts)?;

        let mut doc = self.store.load(path, OPERATION)?;
        if document::first_node_mut(&mut doc, nodes::PAY).is_none() {
            return Err(LedgerError::Structural {
                operation: OPERATION,
                path: path.display().to_string(),
                node: nodes::PAY.to_string(),
            });
        }

        if self.policy == DuplicatePolicy::Reject {
            reject_duplicates(&doc, employee, amounts)?;
        }

        let mut outcome = RegistrationOutcome::default();
        for entry in amounts {
            if entry.amount.is_zero() {
                outcome.skipped_zero += 1;
                continue;
            }

            let formatted = self.parser.format(entry.amount);
            let exists =
                queries::contains_payment(&doc, &employee.name, &employee.surname, &entry.period);
            if exists {
                outcome.duplicates.push(entry.period.clone());
            }

            if exists && self.policy == DuplicatePolicy::Overwrite {
                outcome.overwritten +=
                    overwrite_amounts(&mut doc, employee, &entry.period, &formatted);
                debug!(
                    employee = %employee.full_name(),
                    period = %entry.period,
                    "Overwrote payment"
                );
                continue;
            }

            if exists {
                warn!(
                    employee = %employee.full_name(),
                    period = %entry.period,
                    "Payment already recorded, appending another one"
                );
            }
            append_record(
                &mut doc,
                PaymentRecord {
                    name: employee.name.clone(),
                    surname: employee.surname.clone(),
                    amount: formatted,
                    period: entry.period.clone(),
                },
            );
            outcome.appended += 1;
        }

        if outcome.changed() {
            self.store.save(path, &doc, OPERATION)?;
        }
        info!(
            path = %path.display(),
            employee = %employee.full_name(),
            appended = outcome.appended,
            overwritten = outcome.overwritten,
            skipped = outcome.skipped_zero,
            "Payment registered"
        );
        Ok(outcome)
    }

    fn validate(&self, employee: &EmployeeIdentity, amounts: &[PeriodAmount]) -> LedgerResult<()> {
        if employee.name.trim().is_empty() {
            return Err(LedgerError::validation("name", "name must not be blank"));
        }
        if employee.surname.trim().is_empty() {
            return Err(LedgerError::validation("surname", "surname must not be blank"));
        }

        let settings = self.parser.settings();
        for entry in amounts.iter().filter(|e| !e.amount.is_zero()) {
            if entry.period.trim().is_empty() {
                return Err(LedgerError::validation("period", "period must not be blank"));
            }
            if !self.parser.within_bounds(entry.amount) {
                return Err(LedgerError::validation(
                    "amount",
                    format!(
                        "{} for period '{}' is outside [{}, {}]",
                        entry.amount, entry.period, settings.min, settings.max
                    ),
                ));
            }
        }
        Ok(())
    }
}

fn reject_duplicates(
    doc: &Value,
    employee: &EmployeeIdentity,
    amounts: &[PeriodAmount],
) -> LedgerResult<()> {
    let recorded: HashSet<String> = queries::ledger_items(doc)
        .into_iter()
        .filter(|record| employee.matches(&record.name, &record.surname))
        .map(|record| record.period)
        .collect();

    let mut batch: HashSet<&str> = HashSet::new();
    for entry in amounts.iter().filter(|e| !e.amount.is_zero()) {
        if recorded.contains(&entry.period) || !batch.insert(entry.period.as_str()) {
            return Err(LedgerError::Conflict {
                name: employee.name.clone(),
                surname: employee.surname.clone(),
                period: entry.period.clone(),
            });
        }
    }
    Ok(())
}

fn overwrite_amounts(
    doc: &mut Value,
    employee: &EmployeeIdentity,
    period: &str,
    formatted: &str,
) -> usize {
    let mut replaced = 0;
    document::visit_descendants_mut(doc, nodes::ITEM, &mut |item| {
        if queries::is_payment(item, &employee.name, &employee.surname, period) {
            item.insert(fields::AMOUNT.to_string(), Value::String(formatted.to_string()));
            replaced += 1;
        }
    });
    replaced
}

fn append_record(doc: &mut Value, record: PaymentRecord) {
    let mut node = Node::new();
    node.insert(fields::NAME.to_string(), Value::String(record.name));
    node.insert(fields::SURNAME.to_string(), Value::String(record.surname));
    node.insert(fields::AMOUNT.to_string(), Value::String(record.amount));
    node.insert(fields::PERIOD.to_string(), Value::String(record.period));

    if let Some(pay) = document::first_node_mut(doc, nodes::PAY) {
        document::append_child(pay, nodes::ITEM, node);
    }
}
