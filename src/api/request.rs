//! Request types for the payroll ledger API.
//!
//! Every document path is optional; a missing path falls back to the
//! locations in [`FileSettings`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::FileSettings;
use crate::models::{EmployeeIdentity, PeriodAmount};

/// Body of `POST /transform` and `POST /process`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformRequest {
    /// The raw ledger to read.
    pub input: Option<PathBuf>,
    /// The transform definition to apply.
    pub definition: Option<PathBuf>,
    /// Where the normalized tree is written.
    pub output: Option<PathBuf>,
}

impl TransformRequest {
    /// Returns (input, definition, output), filling gaps from `files`.
    pub fn resolve(self, files: &FileSettings) -> (PathBuf, PathBuf, PathBuf) {
        (
            self.input.unwrap_or_else(|| files.ledger.clone()),
            self.definition.unwrap_or_else(|| files.definition.clone()),
            self.output.unwrap_or_else(|| files.normalized.clone()),
        )
    }
}

/// A single optional document path, used as a body or a query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentRequest {
    /// The document to work on.
    pub path: Option<PathBuf>,
}

impl DocumentRequest {
    /// Returns the requested path or `fallback`.
    pub fn resolve(self, fallback: &Path) -> PathBuf {
        self.path.unwrap_or_else(|| fallback.to_path_buf())
    }
}

/// Body of `POST /payments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterPaymentRequest {
    /// The ledger to append to.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Employee first name.
    pub name: String,
    /// Employee surname.
    pub surname: String,
    /// Amounts per period; zero amounts are skipped.
    pub payments: Vec<PeriodAmount>,
}

impl RegisterPaymentRequest {
    /// Returns the employee the payments belong to.
    pub fn employee(&self) -> EmployeeIdentity {
        EmployeeIdentity::new(self.name.clone(), self.surname.clone())
    }
}

/// Query of `GET /employees/salaries`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalariesQuery {
    /// The ledger to read.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Employee first name.
    pub name: String,
    /// Employee surname.
    pub surname: String,
}

/// Query of `GET /payments/exists`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentExistsQuery {
    /// The ledger to read.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Employee first name.
    pub name: String,
    /// Employee surname.
    pub surname: String,
    /// Period label.
    pub period: String,
}

/// Body of `POST /amounts/parse`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseAmountRequest {
    /// The text to parse; absent text yields the default amount.
    #[serde(default)]
    pub text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_empty_transform_request_uses_configured_files() {
        let request: TransformRequest = serde_json::from_str("{}").unwrap();
        let (input, definition, output) = request.resolve(&FileSettings::default());

        assert_eq!(input, PathBuf::from("data/ledger.json"));
        assert_eq!(definition, PathBuf::from("config/transforms/ledger-to-employees.yaml"));
        assert_eq!(output, PathBuf::from("data/employees.json"));
    }

    #[test]
    fn test_explicit_path_wins() {
        let request: DocumentRequest =
            serde_json::from_str(r#"{ "path": "/tmp/x.json" }"#).unwrap();
        assert_eq!(request.resolve(Path::new("fallback.json")), PathBuf::from("/tmp/x.json"));
    }

    #[test]
    fn test_register_payment_request_deserialization() {
        let json = r#"{
            "name": "Alice",
            "surname": "Smith",
            "payments": [ { "period": "march", "amount": "100.50" } ]
        }"#;

        let request: RegisterPaymentRequest = serde_json::from_str(json).unwrap();

        assert!(request.path.is_none());
        assert_eq!(request.employee(), EmployeeIdentity::new("Alice", "Smith"));
        assert_eq!(request.payments[0].amount, Decimal::new(10050, 2));
    }

    #[test]
    fn test_register_payment_request_requires_name() {
        let json = r#"{ "surname": "Smith", "payments": [] }"#;
        let result: Result<RegisterPaymentRequest, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
