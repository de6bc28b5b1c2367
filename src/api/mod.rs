//! HTTP API module for the payroll ledger engine.
//!
//! This module exposes the ledger operations as JSON endpoints. It is a
//! presentation boundary only: every endpoint maps onto one method of
//! [`PayrollLedger`](crate::service::PayrollLedger).

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    DocumentRequest, ParseAmountRequest, PaymentExistsQuery, RegisterPaymentRequest, SalariesQuery,
    TransformRequest,
};
pub use response::{
    ApiError, ApiErrorResponse, DisplayResponse, EmployeesResponse, ParsedAmountResponse,
    PaymentExistsResponse, PeriodsResponse, SalariesResponse,
};
pub use state::AppState;
