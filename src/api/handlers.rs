//! HTTP request handlers for the payroll ledger API.
//!
//! Every ledger operation does blocking file I/O, so handlers move it onto
//! the blocking pool and only shape the request and the response here.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::LedgerResult;
use crate::models::EmployeeIdentity;

use super::request::{
    DocumentRequest, ParseAmountRequest, PaymentExistsQuery, RegisterPaymentRequest, SalariesQuery,
    TransformRequest,
};
use super::response::{
    ApiError, ApiErrorResponse, DisplayResponse, EmployeesResponse, ParsedAmountResponse,
    PaymentExistsResponse, PeriodsResponse, SalariesResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/transform", post(transform_handler))
        .route("/process", post(process_handler))
        .route("/totals/employees", post(employee_totals_handler))
        .route("/totals/grand", post(grand_total_handler))
        .route("/payments", post(register_payment_handler))
        .route("/payments/exists", get(payment_exists_handler))
        .route("/periods", get(periods_handler))
        .route("/employees", get(employees_handler))
        .route("/employees/salaries", get(salaries_handler))
        .route("/display", get(display_handler))
        .route("/amounts/parse", post(parse_amount_handler))
        .with_state(state)
}

fn json_rejection(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(correlation_id = %correlation_id, error = %body_text, "JSON data error");
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "JSON syntax error");
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    ApiErrorResponse::new(StatusCode::BAD_REQUEST, error).into_response()
}

fn query_rejection(correlation_id: Uuid, rejection: QueryRejection) -> Response {
    let body_text = rejection.body_text();
    warn!(correlation_id = %correlation_id, error = %body_text, "Query string error");
    ApiErrorResponse::new(StatusCode::BAD_REQUEST, ApiError::validation_error(body_text))
        .into_response()
}

/// Runs a ledger operation on the blocking pool and turns its result into
/// a JSON response.
async fn run_blocking<T, F>(correlation_id: Uuid, operation: &'static str, task: F) -> Response
where
    F: FnOnce() -> LedgerResult<T> + Send + 'static,
    T: Serialize + Send + 'static,
{
    let start_time = Instant::now();
    match tokio::task::spawn_blocking(task).await {
        Ok(Ok(body)) => {
            info!(
                correlation_id = %correlation_id,
                operation,
                duration_us = start_time.elapsed().as_micros(),
                "Request completed"
            );
            (StatusCode::OK, Json(body)).into_response()
        }
        Ok(Err(err)) => {
            warn!(correlation_id = %correlation_id, operation, error = %err, "Request failed");
            ApiErrorResponse::from(err).into_response()
        }
        Err(join_error) => {
            error!(
                correlation_id = %correlation_id,
                operation,
                error = %join_error,
                "Worker task failed"
            );
            ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::internal(format!("{} did not complete", operation)),
            )
            .into_response()
        }
    }
}

/// Handler for POST /transform.
async fn transform_handler(
    State(state): State<AppState>,
    payload: Result<Json<TransformRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return json_rejection(correlation_id, rejection),
    };

    let (input, definition, output) = request.resolve(state.files());
    info!(
        correlation_id = %correlation_id,
        input = %input.display(),
        "Processing transform request"
    );
    let ledger = state.ledger();
    run_blocking(correlation_id, "transform", move || {
        ledger.transform(&input, &definition, &output)
    })
    .await
}

/// Handler for POST /process.
async fn process_handler(
    State(state): State<AppState>,
    payload: Result<Json<TransformRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return json_rejection(correlation_id, rejection),
    };

    let (input, definition, output) = request.resolve(state.files());
    info!(correlation_id = %correlation_id, input = %input.display(), "Processing ledger");
    let ledger = state.ledger();
    run_blocking(correlation_id, "process", move || {
        ledger.process(&input, &definition, &output)
    })
    .await
}

/// Handler for POST /totals/employees.
async fn employee_totals_handler(
    State(state): State<AppState>,
    payload: Result<Json<DocumentRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let path = match payload {
        Ok(Json(request)) => request.resolve(&state.files().normalized),
        Err(rejection) => return json_rejection(correlation_id, rejection),
    };

    let ledger = state.ledger();
    run_blocking(correlation_id, "add_employee_totals", move || {
        ledger.add_employee_totals(&path)
    })
    .await
}

/// Handler for POST /totals/grand.
async fn grand_total_handler(
    State(state): State<AppState>,
    payload: Result<Json<DocumentRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let path = match payload {
        Ok(Json(request)) => request.resolve(&state.files().ledger),
        Err(rejection) => return json_rejection(correlation_id, rejection),
    };

    let ledger = state.ledger();
    run_blocking(correlation_id, "add_grand_total", move || ledger.add_grand_total(&path)).await
}

/// Handler for POST /payments.
async fn register_payment_handler(
    State(state): State<AppState>,
    payload: Result<Json<RegisterPaymentRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return json_rejection(correlation_id, rejection),
    };

    let employee = request.employee();
    let path = request.path.unwrap_or_else(|| state.files().ledger.clone());
    info!(
        correlation_id = %correlation_id,
        employee = %employee.full_name(),
        periods = request.payments.len(),
        "Registering payment"
    );
    let ledger = state.ledger();
    let payments = request.payments;
    run_blocking(correlation_id, "register_payment", move || {
        ledger.register_payment(&path, &employee, &payments)
    })
    .await
}

/// Handler for GET /payments/exists.
async fn payment_exists_handler(
    State(state): State<AppState>,
    query: Result<Query<PaymentExistsQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return query_rejection(correlation_id, rejection),
    };

    let path = query.path.unwrap_or_else(|| state.files().ledger.clone());
    let ledger = state.ledger();
    run_blocking(correlation_id, "payment_exists", move || {
        let exists = ledger.payment_exists(&path, &query.name, &query.surname, &query.period)?;
        Ok(PaymentExistsResponse { exists })
    })
    .await
}

/// Handler for GET /periods.
async fn periods_handler(
    State(state): State<AppState>,
    query: Result<Query<DocumentRequest>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let path = match query {
        Ok(Query(query)) => query.resolve(&state.files().normalized),
        Err(rejection) => return query_rejection(correlation_id, rejection),
    };

    let ledger = state.ledger();
    run_blocking(correlation_id, "discover_periods", move || {
        Ok(PeriodsResponse {
            periods: ledger.discover_periods(&path)?,
        })
    })
    .await
}

/// Handler for GET /employees.
async fn employees_handler(
    State(state): State<AppState>,
    query: Result<Query<DocumentRequest>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let path = match query {
        Ok(Query(query)) => query.resolve(&state.files().ledger),
        Err(rejection) => return query_rejection(correlation_id, rejection),
    };

    let ledger = state.ledger();
    run_blocking(correlation_id, "list_employees", move || {
        Ok(EmployeesResponse {
            employees: ledger.list_employees(&path)?,
        })
    })
    .await
}

/// Handler for GET /employees/salaries.
async fn salaries_handler(
    State(state): State<AppState>,
    query: Result<Query<SalariesQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return query_rejection(correlation_id, rejection),
    };

    let path = query.path.unwrap_or_else(|| state.files().ledger.clone());
    let ledger = state.ledger();
    run_blocking(correlation_id, "employee_salaries", move || {
        let salaries = ledger.employee_salaries(&path, &query.name, &query.surname)?;
        Ok(SalariesResponse {
            employee: EmployeeIdentity::new(query.name, query.surname),
            salaries,
        })
    })
    .await
}

/// Handler for GET /display.
async fn display_handler(
    State(state): State<AppState>,
    query: Result<Query<DocumentRequest>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let path = match query {
        Ok(Query(query)) => query.resolve(&state.files().normalized),
        Err(rejection) => return query_rejection(correlation_id, rejection),
    };

    let ledger = state.ledger();
    run_blocking(correlation_id, "display_rows", move || {
        Ok(DisplayResponse {
            periods: ledger.discover_periods(&path)?,
            rows: ledger.display_rows(&path)?,
        })
    })
    .await
}

/// Handler for POST /amounts/parse.
async fn parse_amount_handler(
    State(state): State<AppState>,
    payload: Result<Json<ParseAmountRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return json_rejection(correlation_id, rejection),
    };

    let ledger = state.ledger();
    let amount = ledger.parse_amount(request.text.as_deref());
    let body = ParsedAmountResponse {
        amount,
        formatted: ledger.parser().format(amount),
    };
    (StatusCode::OK, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileSettings;
    use crate::service::PayrollLedger;
    use axum::{body::Body, http::Request};
    use rust_decimal::Decimal;
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn create_test_state(dir: &TempDir) -> AppState {
        let files = FileSettings {
            ledger: dir.path().join("ledger.json"),
            definition: "./config/transforms/ledger-to-employees.yaml".into(),
            normalized: dir.path().join("employees.json"),
        };
        fs::copy("./data/ledger.json", &files.ledger).unwrap();
        AppState::new(PayrollLedger::default(), files)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_of<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_employees_uses_configured_ledger() {
        let dir = TempDir::new().unwrap();
        let router = create_router(create_test_state(&dir));

        let response = router.oneshot(get_request("/employees")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let result: EmployeesResponse = body_of(response).await;
        let surnames: Vec<&str> = result.employees.iter().map(|e| e.surname.as_str()).collect();
        assert_eq!(surnames, vec!["Ivanov", "Li", "Smith"]);
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let dir = TempDir::new().unwrap();
        let router = create_router(create_test_state(&dir));

        let response = router.oneshot(post_json("/payments", "{invalid json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = body_of(response).await;
        assert_eq!(error.code, "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_missing_field_returns_validation_error() {
        let dir = TempDir::new().unwrap();
        let router = create_router(create_test_state(&dir));

        let response = router
            .oneshot(post_json("/payments", r#"{ "surname": "Smith", "payments": [] }"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = body_of(response).await;
        assert_eq!(error.code, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_missing_document_returns_404() {
        let dir = TempDir::new().unwrap();
        let router = create_router(create_test_state(&dir));

        // The normalized tree does not exist until a transform has run.
        let response = router.oneshot(get_request("/display")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let error: ApiError = body_of(response).await;
        assert_eq!(error.code, "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_payment_exists_requires_query_fields() {
        let dir = TempDir::new().unwrap();
        let router = create_router(create_test_state(&dir));

        let response = router.oneshot(get_request("/payments/exists?name=Alice")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_payment_exists_reads_legacy_period() {
        let dir = TempDir::new().unwrap();
        let router = create_router(create_test_state(&dir));

        let response = router
            .oneshot(get_request("/payments/exists?name=Boris&surname=Ivanov&period=february"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let result: PaymentExistsResponse = body_of(response).await;
        assert!(result.exists);
    }

    #[tokio::test]
    async fn test_parse_amount() {
        let dir = TempDir::new().unwrap();
        let router = create_router(create_test_state(&dir));

        let response = router
            .oneshot(post_json("/amounts/parse", r#"{ "text": "1 200,5" }"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let result: ParsedAmountResponse = body_of(response).await;
        assert_eq!(result.amount, Decimal::new(12005, 1));
        assert_eq!(result.formatted, "1200.50");
    }

    #[tokio::test]
    async fn test_grand_total_without_pay_returns_422() {
        let dir = TempDir::new().unwrap();
        let state = create_test_state(&dir);
        let other = dir.path().join("other.json");
        fs::write(&other, r#"{"Employees":{}}"#).unwrap();
        let router = create_router(state);

        let body = serde_json::json!({ "path": other }).to_string();
        let response = router.oneshot(post_json("/totals/grand", &body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let error: ApiError = body_of(response).await;
        assert_eq!(error.code, "STRUCTURAL_ERROR");
    }
}
