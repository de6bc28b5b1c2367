//! Read-only queries over ledger documents.
//!
//! Raw-ledger queries look at `item` nodes; [`employees_from_tree`] reads
//! the normalized `Employee` nodes. None of these functions touch the disk.

use serde_json::Value;
use std::collections::HashMap;

use super::document::{self, fields, nodes, Node};
use crate::models::{Employee, EmployeeIdentity, PaymentRecord, PeriodAmount, SalaryEntry};
use crate::processing::AmountParser;

/// Placeholder used for a missing name or surname in listings.
pub const UNKNOWN: &str = "Unknown";

fn identity_of(node: &Node) -> EmployeeIdentity {
    let name = document::field(node, fields::NAME).map(|n| n.into_owned());
    let surname = document::field(node, fields::SURNAME).map(|s| s.into_owned());
    EmployeeIdentity::new(
        name.unwrap_or_else(|| UNKNOWN.to_string()),
        surname.unwrap_or_else(|| UNKNOWN.to_string()),
    )
}

fn belongs_to(node: &Node, name: &str, surname: &str) -> bool {
    document::field(node, fields::NAME).as_deref() == Some(name)
        && document::field(node, fields::SURNAME).as_deref() == Some(surname)
}

/// Returns every payment item of the raw ledger, in document order.
pub fn ledger_items(doc: &Value) -> Vec<PaymentRecord> {
    document::descendants(doc, nodes::ITEM)
        .into_iter()
        .map(|item| PaymentRecord {
            name: document::text(item, fields::NAME),
            surname: document::text(item, fields::SURNAME),
            amount: document::text(item, fields::AMOUNT),
            period: document::period(item).map(|p| p.into_owned()).unwrap_or_default(),
        })
        .collect()
}

/// Returns the distinct employees of the raw ledger, sorted by surname and
/// then by name.
pub fn employees_in(doc: &Value) -> Vec<EmployeeIdentity> {
    let mut identities: Vec<EmployeeIdentity> = document::descendants(doc, nodes::ITEM)
        .into_iter()
        .map(identity_of)
        .collect();

    identities.sort_by(|a, b| a.surname.cmp(&b.surname).then_with(|| a.name.cmp(&b.name)));
    identities.dedup();
    identities
}

/// Returns the (period, amount) pairs recorded for one employee, in
/// document order. Unparsable amounts read as the parser default.
pub fn salaries_of(
    doc: &Value,
    name: &str,
    surname: &str,
    parser: &AmountParser,
) -> Vec<PeriodAmount> {
    document::descendants(doc, nodes::ITEM)
        .into_iter()
        .filter(|item| belongs_to(item, name, surname))
        .map(|item| {
            PeriodAmount::new(
                document::period(item).map(|p| p.into_owned()).unwrap_or_default(),
                parser.parse(document::field(item, fields::AMOUNT).as_deref()),
            )
        })
        .collect()
}

/// Returns true if `item` records a payment for the exact
/// (name, surname, period) triple.
pub fn is_payment(item: &Node, name: &str, surname: &str, period: &str) -> bool {
    belongs_to(item, name, surname) && document::period(item).as_deref() == Some(period)
}

/// Returns true if the raw ledger holds a record for the exact
/// (name, surname, period) triple.
pub fn contains_payment(doc: &Value, name: &str, surname: &str, period: &str) -> bool {
    document::descendants(doc, nodes::ITEM)
        .into_iter()
        .any(|item| is_payment(item, name, surname, period))
}

/// Reads the employees of a normalized tree.
///
/// Several `Employee` nodes with the same name and surname are merged into
/// one employee at the position of the first, keeping their salary entries
/// in document order.
pub fn employees_from_tree(doc: &Value, parser: &AmountParser) -> Vec<Employee> {
    let mut employees: Vec<Employee> = Vec::new();
    let mut positions: HashMap<EmployeeIdentity, usize> = HashMap::new();

    for node in document::descendants(doc, nodes::EMPLOYEE) {
        let identity = identity_of(node);
        let index = *positions.entry(identity.clone()).or_insert_with(|| {
            employees.push(Employee::new(identity.name, identity.surname));
            employees.len() - 1
        });

        let salaries = document::descendants_of(node, nodes::SALARY)
            .into_iter()
            .map(|salary| SalaryEntry {
                period: document::period(salary).map(|p| p.into_owned()).unwrap_or_default(),
                amount: parser.parse(document::field(salary, fields::AMOUNT).as_deref()),
            });
        employees[index].salaries.extend(salaries);
    }

    employees
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn ledger() -> Value {
        json!({
            "Pay": {
                "item": [
                    { "name": "Alice", "surname": "Smith", "amount": "100.50", "period": "march" },
                    { "name": "Boris", "surname": "Ivanov",
                      "amount": "1 200,00", "period": "january" },
                    { "name": "Alice", "surname": "Smith", "amount": "50,25", "period": "january" },
                    { "name": "Boris", "surname": "Ivanov", "amount": 800, "mount": "february" },
                    { "name": "Anna", "surname": "Ivanov", "amount": "oops", "period": "march" }
                ]
            }
        })
    }

    #[test]
    fn test_ledger_items_read_legacy_period_and_numbers() {
        let items = ledger_items(&ledger());
        assert_eq!(items.len(), 5);
        assert_eq!(items[3].period, "february");
        assert_eq!(items[3].amount, "800");
    }

    #[test]
    fn test_employees_sorted_by_surname_then_name_without_duplicates() {
        let names: Vec<String> = employees_in(&ledger())
            .iter()
            .map(EmployeeIdentity::full_name)
            .collect();
        assert_eq!(names, vec!["Anna Ivanov", "Boris Ivanov", "Alice Smith"]);
    }

    #[test]
    fn test_employees_with_missing_names_are_unknown() {
        let doc = json!({ "Pay": { "item": { "amount": "1" } } });
        assert_eq!(employees_in(&doc), vec![EmployeeIdentity::new(UNKNOWN, UNKNOWN)]);
    }

    #[test]
    fn test_salaries_of_keeps_document_order() {
        let salaries = salaries_of(&ledger(), "Alice", "Smith", &AmountParser::default());
        assert_eq!(
            salaries,
            vec![
                PeriodAmount::new("march", Decimal::new(10050, 2)),
                PeriodAmount::new("january", Decimal::new(5025, 2)),
            ]
        );
    }

    #[test]
    fn test_salaries_of_unparsable_amount_is_default() {
        let salaries = salaries_of(&ledger(), "Anna", "Ivanov", &AmountParser::default());
        assert_eq!(salaries, vec![PeriodAmount::new("march", Decimal::ZERO)]);
    }

    #[test]
    fn test_contains_payment_matches_exact_triple() {
        let doc = ledger();
        assert!(contains_payment(&doc, "Alice", "Smith", "march"));
        assert!(contains_payment(&doc, "Boris", "Ivanov", "february"));
        assert!(!contains_payment(&doc, "Alice", "Smith", "february"));
        assert!(!contains_payment(&doc, "alice", "Smith", "march"));
    }

    #[test]
    fn test_employees_from_tree_merges_repeated_nodes() {
        let tree = json!({
            "Employees": {
                "Employee": [
                    { "name": "Alice", "surname": "Smith",
                      "salary": [ { "amount": "1", "period": "march" } ] },
                    { "name": "Boris", "surname": "Ivanov",
                      "salary": { "amount": "2", "period": "march" } },
                    { "name": "Alice", "surname": "Smith",
                      "salary": [ { "amount": "3", "period": "april" } ] }
                ]
            }
        });

        let employees = employees_from_tree(&tree, &AmountParser::default());
        assert_eq!(employees.len(), 2);
        assert_eq!(employees[0].full_name(), "Alice Smith");
        assert_eq!(employees[0].salaries.len(), 2);
        assert_eq!(employees[0].total(), Ok(Decimal::from(4)));
        assert_eq!(employees[1].full_name(), "Boris Ivanov");
    }
}
