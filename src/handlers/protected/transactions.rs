use axum::{
    extract::{Path, Query, State},
    Extension,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{amount, optional_amount, parse_id, required, ApiJson};
use crate::app::AppState;
use crate::database::models::{NewTransaction, Transaction, TransactionPatch};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Session};
use crate::types::TransactionKind;

use super::Deleted;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQuery {
    pub apartment_id: Option<String>,
}

/// The creator is always the session user; a `createdBy` in the body is ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub apartment_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: Option<TransactionKind>,
    pub category: Option<String>,
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

impl CreateTransactionRequest {
    fn validate(self, created_by: Uuid) -> Result<NewTransaction, ApiError> {
        Ok(NewTransaction {
            apartment_id: required(self.apartment_id, "apartmentId")?,
            kind: required(self.kind, "type")?,
            category: required(self.category.filter(|c| !c.is_empty()), "category")?,
            amount: amount(required(self.amount, "amount")?, "amount")?,
            description: self.description.unwrap_or_default(),
            date: required(self.date, "date")?,
            created_by,
        })
    }
}

fn not_found(id: Uuid) -> ApiError {
    ApiError::not_found(format!("Transaction {} not found", id))
}

/// GET /api/transactions?apartmentId=
pub async fn list(State(state): State<AppState>, Query(query): Query<TransactionQuery>) -> ApiResult<Vec<Transaction>> {
    let apartment_id = query
        .apartment_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| parse_id(s, "apartment"))
        .transpose()?;
    Ok(ApiResponse::success(state.store.list_transactions(apartment_id).await?))
}

/// GET /api/transactions/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Transaction> {
    let id = parse_id(&id, "transaction")?;
    let transaction = state.store.find_transaction(id).await?.ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::success(transaction))
}

/// POST /api/transactions
pub async fn create(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiJson(body): ApiJson<CreateTransactionRequest>,
) -> ApiResult<Transaction> {
    let transaction = state.store.create_transaction(body.validate(session.user_id)?).await?;
    tracing::info!(
        "{} recorded {} of {} for apartment {}",
        session.email,
        transaction.kind,
        transaction.amount,
        transaction.apartment_id
    );
    Ok(ApiResponse::created(transaction))
}

/// PATCH /api/transactions/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(mut patch): ApiJson<TransactionPatch>,
) -> ApiResult<Transaction> {
    let id = parse_id(&id, "transaction")?;
    patch.amount = optional_amount(patch.amount, "amount")?;
    let transaction = state.store.update_transaction(id, patch).await?.ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::success(transaction))
}

/// DELETE /api/transactions/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Deleted> {
    let id = parse_id(&id, "transaction")?;
    if !state.store.delete_transaction(id).await? {
        return Err(not_found(id));
    }
    Ok(ApiResponse::success(Deleted::new(id)))
}
