use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};

use crate::application::{AppError, LedgerService};
use crate::domain::{AccountId, ValidationError};

use super::dto::{StatementResponse, TransactionRequest, TransactionResponse};
use super::errors::ApiError;

/// A path id that is not an integer is a malformed request, not an unknown account.
fn parse_account_id(raw: &str) -> Result<AccountId, AppError> {
    raw.parse()
        .map_err(|_| ValidationError::InvalidAccountId(raw.to_string()).into())
}

pub async fn submit_transaction(
    State(service): State<Arc<LedgerService>>,
    Path(raw_id): Path<String>,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let Json(request) = payload
        .map_err(|rejection| AppError::from(ValidationError::MalformedBody(rejection.body_text())))?;
    let tx = request.into_new_transaction().map_err(AppError::from)?;
    let account_id = parse_account_id(&raw_id)?;

    let receipt = service.submit_transaction(account_id, tx).await?;
    Ok(Json(TransactionResponse::from(&receipt)))
}

pub async fn get_statement(
    State(service): State<Arc<LedgerService>>,
    Path(raw_id): Path<String>,
) -> Result<Json<StatementResponse>, ApiError> {
    let account_id = parse_account_id(&raw_id)?;
    let statement = service.get_statement(account_id).await?;
    Ok(Json(StatementResponse::from(&statement)))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
