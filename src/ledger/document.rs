//! Navigation helpers over ledger documents.
//!
//! Ledger documents are JSON trees in which a node is an object stored
//! under a key, and repeated nodes are arrays of objects under the same
//! key. A key holding a single bare object counts as one node. Lookups
//! search the whole tree, in document order, so callers never depend on
//! the exact nesting depth of a node.

use serde_json::{Map, Value};
use std::borrow::Cow;

/// Node names used by the ledger documents.
pub mod nodes {
    /// Container of the raw payment items.
    pub const PAY: &str = "Pay";
    /// A raw payment item.
    pub const ITEM: &str = "item";
    /// Root of the normalized tree.
    pub const EMPLOYEES: &str = "Employees";
    /// An employee in the normalized tree.
    pub const EMPLOYEE: &str = "Employee";
    /// A salary entry nested in an employee.
    pub const SALARY: &str = "salary";
}

/// Field names used by the ledger documents.
pub mod fields {
    /// Employee first name.
    pub const NAME: &str = "name";
    /// Employee surname.
    pub const SURNAME: &str = "surname";
    /// Amount text.
    pub const AMOUNT: &str = "amount";
    /// Period label.
    pub const PERIOD: &str = "period";
    /// Period label as spelled by older ledgers.
    pub const LEGACY_PERIOD: &str = "mount";
    /// Per-employee total written by the aggregator.
    pub const TOTAL_SALARY: &str = "totalSalary";
    /// Ledger grand total written by the aggregator.
    pub const TOTAL_AMOUNT: &str = "totalAmount";
}

/// A node of a ledger document.
pub type Node = Map<String, Value>;

/// Returns every node stored under `key` anywhere below `root`.
pub fn descendants<'a>(root: &'a Value, key: &str) -> Vec<&'a Node> {
    let mut found = Vec::new();
    collect(root, key, &mut found);
    found
}

/// Returns every node stored under `key` anywhere below `node`.
pub fn descendants_of<'a>(node: &'a Node, key: &str) -> Vec<&'a Node> {
    let mut found = Vec::new();
    collect_from_map(node, key, &mut found);
    found
}

fn collect<'a>(value: &'a Value, key: &str, found: &mut Vec<&'a Node>) {
    match value {
        Value::Object(map) => collect_from_map(map, key, found),
        Value::Array(items) => {
            for item in items {
                collect(item, key, found);
            }
        }
        _ => {}
    }
}

fn collect_from_map<'a>(map: &'a Node, key: &str, found: &mut Vec<&'a Node>) {
    for (name, child) in map {
        if name == key {
            match child {
                Value::Object(node) => found.push(node),
                Value::Array(items) => found.extend(items.iter().filter_map(Value::as_object)),
                _ => {}
            }
        }
        collect(child, key, found);
    }
}

/// Calls `visit` on every node stored under `key` anywhere below `root`.
pub fn visit_descendants_mut(root: &mut Value, key: &str, visit: &mut dyn FnMut(&mut Node)) {
    match root {
        Value::Object(map) => {
            for (name, child) in map.iter_mut() {
                if name == key {
                    match child {
                        Value::Object(node) => visit(node),
                        Value::Array(items) => {
                            for node in items.iter_mut().filter_map(Value::as_object_mut) {
                                visit(node);
                            }
                        }
                        _ => {}
                    }
                }
                visit_descendants_mut(child, key, visit);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                visit_descendants_mut(item, key, visit);
            }
        }
        _ => {}
    }
}

/// Returns true if `key` appears anywhere in the tree, whatever its value.
pub fn contains_key(root: &Value, key: &str) -> bool {
    match root {
        Value::Object(map) => map
            .iter()
            .any(|(name, child)| name == key || contains_key(child, key)),
        Value::Array(items) => items.iter().any(|item| contains_key(item, key)),
        _ => false,
    }
}

fn holds_node(value: &Value) -> bool {
    match value {
        Value::Object(_) => true,
        Value::Array(items) => items.iter().any(Value::is_object),
        _ => false,
    }
}

fn as_node_mut(value: &mut Value) -> Option<&mut Node> {
    match value {
        Value::Object(node) => Some(node),
        Value::Array(items) => items.iter_mut().find_map(Value::as_object_mut),
        _ => None,
    }
}

/// Returns the first node stored under `key`, in document order.
pub fn first_node_mut<'a>(root: &'a mut Value, key: &str) -> Option<&'a mut Node> {
    match root {
        Value::Object(map) => {
            for (name, child) in map.iter_mut() {
                if name == key && holds_node(child) {
                    return as_node_mut(child);
                }
                if let Some(found) = first_node_mut(child, key) {
                    return Some(found);
                }
            }
            None
        }
        Value::Array(items) => items.iter_mut().find_map(|item| first_node_mut(item, key)),
        _ => None,
    }
}

/// Appends `child` under `key` in `parent`, turning a single bare node
/// into an array when needed.
pub fn append_child(parent: &mut Node, key: &str, child: Node) {
    match parent.get_mut(key) {
        Some(Value::Array(items)) => items.push(Value::Object(child)),
        Some(existing @ Value::Object(_)) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, Value::Object(child)]);
        }
        _ => {
            parent.insert(key.to_string(), Value::Array(vec![Value::Object(child)]));
        }
    }
}

/// Reads a scalar field as text. Strings are returned as-is, numbers and
/// booleans in their JSON spelling; anything else counts as absent.
pub fn field<'a>(node: &'a Node, name: &str) -> Option<Cow<'a, str>> {
    match node.get(name)? {
        Value::String(text) => Some(Cow::Borrowed(text.as_str())),
        Value::Number(number) => Some(Cow::Owned(number.to_string())),
        Value::Bool(flag) => Some(Cow::Owned(flag.to_string())),
        _ => None,
    }
}

/// Reads a scalar field as owned text, or an empty string when absent.
pub fn text(node: &Node, name: &str) -> String {
    field(node, name).map(Cow::into_owned).unwrap_or_default()
}

/// Reads the period label of an item or salary node, accepting the
/// legacy `mount` spelling.
pub fn period<'a>(node: &'a Node) -> Option<Cow<'a, str>> {
    field(node, fields::PERIOD).or_else(|| field(node, fields::LEGACY_PERIOD))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_descendants_finds_arrays_and_bare_objects() {
        let doc = json!({
            "Pay": {
                "item": [ { "name": "A" }, { "name": "B" } ],
                "nested": { "item": { "name": "C" } }
            }
        });

        let names: Vec<String> = descendants(&doc, "item")
            .into_iter()
            .map(|n| text(n, "name"))
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_descendants_skip_scalars_under_matching_key() {
        let doc = json!({ "item": "not a node", "list": [ { "item": 3 } ] });
        assert!(descendants(&doc, "item").is_empty());
    }

    #[test]
    fn test_descendants_of_node_stays_inside_node() {
        let doc = json!({
            "Employee": [
                { "name": "A", "salary": [ { "amount": "1" }, { "amount": "2" } ] },
                { "name": "B", "salary": { "amount": "3" } }
            ]
        });

        let employees = descendants(&doc, "Employee");
        assert_eq!(descendants_of(employees[0], "salary").len(), 2);
        assert_eq!(descendants_of(employees[1], "salary").len(), 1);
    }

    #[test]
    fn test_visit_descendants_mut_updates_every_node() {
        let mut doc = json!({ "Employee": [ { "name": "A" }, { "name": "B" } ] });
        visit_descendants_mut(&mut doc, "Employee", &mut |node| {
            node.insert("seen".to_string(), Value::Bool(true));
        });
        assert_eq!(doc["Employee"][0]["seen"], json!(true));
        assert_eq!(doc["Employee"][1]["seen"], json!(true));
    }

    #[test]
    fn test_first_node_mut_finds_nested_container() {
        let mut doc = json!({ "root": { "Pay": { "item": [] } } });
        let pay = first_node_mut(&mut doc, "Pay").unwrap();
        pay.insert("totalAmount".to_string(), json!("0.00"));
        assert_eq!(doc["root"]["Pay"]["totalAmount"], json!("0.00"));
    }

    #[test]
    fn test_first_node_mut_absent() {
        let mut doc = json!({ "Employees": {} });
        assert!(first_node_mut(&mut doc, "Pay").is_none());
    }

    #[test]
    fn test_append_child_promotes_single_node_to_array() {
        let mut pay = json!({ "item": { "name": "A" } });
        let parent = pay.as_object_mut().unwrap();

        let mut child = Node::new();
        child.insert("name".to_string(), json!("B"));
        append_child(parent, "item", child);

        assert_eq!(pay, json!({ "item": [ { "name": "A" }, { "name": "B" } ] }));
    }

    #[test]
    fn test_append_child_creates_missing_key() {
        let mut pay = json!({});
        append_child(pay.as_object_mut().unwrap(), "item", Node::new());
        assert_eq!(pay, json!({ "item": [ {} ] }));
    }

    #[test]
    fn test_field_reads_numbers_as_text() {
        let doc = json!({ "amount": 12.5, "period": "march", "flags": [] });
        let node = doc.as_object().unwrap();
        assert_eq!(field(node, "amount").as_deref(), Some("12.5"));
        assert_eq!(field(node, "period").as_deref(), Some("march"));
        assert_eq!(field(node, "flags"), None);
        assert_eq!(text(node, "missing"), "");
    }

    #[test]
    fn test_period_accepts_legacy_spelling() {
        let doc = json!({ "mount": "february" });
        assert_eq!(period(doc.as_object().unwrap()).as_deref(), Some("february"));

        let both = json!({ "period": "march", "mount": "february" });
        assert_eq!(period(both.as_object().unwrap()).as_deref(), Some("march"));
    }

    #[test]
    fn test_contains_key_sees_empty_containers() {
        let doc = json!({ "Employees": { "Employee": [] } });
        assert!(contains_key(&doc, "Employee"));
        assert!(!contains_key(&doc, "Pay"));
    }
}
