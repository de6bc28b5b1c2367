//! Response types for the payroll ledger API.
//!
//! This module defines the success bodies that are not plain domain models,
//! the error body and the mapping from [`LedgerError`] to HTTP statuses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::error::Error as _;

use crate::error::LedgerError;
use crate::models::{DisplayRow, EmployeeIdentity, PeriodAmount};

/// Body of `GET /periods`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodsResponse {
    /// Distinct period labels, sorted.
    pub periods: Vec<String>,
}

/// Body of `GET /employees`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeesResponse {
    /// Distinct employees, sorted by surname and name.
    pub employees: Vec<EmployeeIdentity>,
}

/// Body of `GET /employees/salaries`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalariesResponse {
    /// The employee the salaries belong to.
    pub employee: EmployeeIdentity,
    /// (period, amount) pairs in ledger order.
    pub salaries: Vec<PeriodAmount>,
}

/// Body of `GET /payments/exists`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentExistsResponse {
    /// Whether a matching record exists.
    pub exists: bool,
}

/// Body of `GET /display`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayResponse {
    /// Period labels, in column order.
    pub periods: Vec<String>,
    /// One row per employee.
    pub rows: Vec<DisplayRow>,
}

/// Body of `POST /amounts/parse`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedAmountResponse {
    /// The parsed value.
    pub amount: Decimal,
    /// The value in invariant formatting.
    pub formatted: String,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates an internal error response.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Pairs an error body with a status.
    pub fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

fn cause_of(error: &LedgerError) -> Option<String> {
    error.source().map(|source| source.to_string())
}

impl From<LedgerError> for ApiErrorResponse {
    fn from(error: LedgerError) -> Self {
        let message = error.to_string();
        let (status, code) = match &error {
            LedgerError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            LedgerError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            LedgerError::Conflict { .. } => (StatusCode::CONFLICT, "PAYMENT_CONFLICT"),
            LedgerError::Structural { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "STRUCTURAL_ERROR")
            }
            LedgerError::Transform { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "TRANSFORM_ERROR"),
            LedgerError::Parse { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "DOCUMENT_PARSE_ERROR"),
            LedgerError::Overflow { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "AMOUNT_OVERFLOW"),
            LedgerError::Io { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
            LedgerError::ConfigParse { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
        };

        let error = match cause_of(&error) {
            Some(cause) => ApiError::with_details(code, message, cause),
            None => ApiError::new(code, message),
        };
        ApiErrorResponse { status, error }
    }
}
