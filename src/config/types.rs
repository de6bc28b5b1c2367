//! Configuration types for the payroll ledger engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML settings file. Every section is optional
//! and falls back to the defaults shown on each type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default locations of the documents the engine works on.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FileSettings {
    /// The raw payment ledger.
    pub ledger: PathBuf,
    /// The transform definition mapping the ledger to the normalized tree.
    pub definition: PathBuf,
    /// Where the normalized employee document is written.
    pub normalized: PathBuf,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            ledger: PathBuf::from("data/ledger.json"),
            definition: PathBuf::from("config/transforms/ledger-to-employees.yaml"),
            normalized: PathBuf::from("data/employees.json"),
        }
    }
}

/// Bounds and precision used when reading and writing amounts.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AmountSettings {
    /// Value returned for empty or unparsable amounts.
    pub default: Decimal,
    /// Smallest salary accepted by the payment registrar.
    pub min: Decimal,
    /// Largest salary accepted by the payment registrar.
    pub max: Decimal,
    /// Number of fractional digits in formatted amounts.
    pub decimal_places: u32,
}

impl Default for AmountSettings {
    fn default() -> Self {
        Self {
            default: Decimal::ZERO,
            min: Decimal::ZERO,
            max: Decimal::from(1_000_000),
            decimal_places: 2,
        }
    }
}

/// What the payment registrar does when a record for the same
/// (name, surname, period) already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Log a warning and append the new record anyway, keeping payment history.
    #[default]
    Append,
    /// Refuse the whole batch with a conflict error.
    Reject,
    /// Replace the amount of the existing record(s).
    Overwrite,
}

/// Payment registration settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PaymentSettings {
    /// Duplicate handling applied to every registered batch.
    pub duplicate_policy: DuplicatePolicy,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

/// The complete settings file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LedgerSettings {
    /// Document locations.
    pub files: FileSettings,
    /// Amount parsing and formatting.
    pub amounts: AmountSettings,
    /// Payment registration.
    pub payments: PaymentSettings,
    /// HTTP server.
    pub server: ServerSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let settings: LedgerSettings = serde_yaml::from_str("{}").unwrap();
        assert_eq!(settings, LedgerSettings::default());
        assert_eq!(settings.amounts.decimal_places, 2);
        assert_eq!(settings.payments.duplicate_policy, DuplicatePolicy::Append);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let yaml = r#"
amounts:
  max: "5000"
payments:
  duplicate_policy: reject
"#;
        let settings: LedgerSettings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.amounts.max, Decimal::from(5000));
        assert_eq!(settings.amounts.min, Decimal::ZERO);
        assert_eq!(settings.payments.duplicate_policy, DuplicatePolicy::Reject);
        assert_eq!(settings.server.bind, "127.0.0.1:8080");
    }

    #[test]
    fn test_duplicate_policy_serialization() {
        assert_eq!(
            serde_json::to_string(&DuplicatePolicy::Overwrite).unwrap(),
            "\"overwrite\""
        );
        let policy: DuplicatePolicy = serde_json::from_str("\"append\"").unwrap();
        assert_eq!(policy, DuplicatePolicy::Append);
    }
}
