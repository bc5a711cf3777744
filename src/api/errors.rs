use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::application::AppError;

/// Error response, so handlers can use `?` on service results.
#[derive(Debug)]
pub struct ApiError(Response);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(app_error_to_response(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.0
    }
}

/// Store failures are reported as 422 like any other rejection; only the log
/// tells them apart.
pub fn app_error_to_response(err: AppError) -> Response {
    if err.is_rejection() {
        tracing::debug!(error = %err, "request rejected");
    } else {
        tracing::error!(error = %err, "store failure");
    }

    match &err {
        AppError::AccountNotFound(_) => {
            json_error(StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        AppError::Validation(_) => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "validation_error",
            err.to_string(),
        ),
        AppError::OverdraftExceeded { .. } => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "overdraft_exceeded",
            err.to_string(),
        ),
        AppError::BalanceOverflow { .. } => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "balance_overflow",
            err.to_string(),
        ),
        AppError::Database(_) => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "transaction_failed",
            "transaction could not be applied",
        ),
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
