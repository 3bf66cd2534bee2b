use axum::extract::{Path, Query, State};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{amount, check_month, optional_amount, parse_id, parse_month, parse_year, required, ApiJson};
use crate::app::AppState;
use crate::database::models::{MonthlyRent, MonthlyRentPatch, NewMonthlyRent};
use crate::database::store::PeriodFilter;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

use super::Deleted;

#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub year: Option<String>,
    pub month: Option<String>,
}

impl PeriodQuery {
    pub fn filter(&self, apartment_id: Uuid) -> Result<PeriodFilter, ApiError> {
        Ok(PeriodFilter::apartment(apartment_id)
            .with_year(parse_year(self.year.as_deref())?)
            .with_month(parse_month(self.month.as_deref())?))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRentRequest {
    pub month: Option<i32>,
    pub year: Option<i32>,
    pub amount: Option<Decimal>,
    pub tenant_name: Option<String>,
    pub payment_note: Option<String>,
}

impl CreateRentRequest {
    fn validate(self, apartment_id: Uuid) -> Result<NewMonthlyRent, ApiError> {
        Ok(NewMonthlyRent {
            apartment_id,
            month: check_month(required(self.month, "month")?)?,
            year: required(self.year, "year")?,
            amount: amount(required(self.amount, "amount")?, "amount")?,
            tenant_name: self.tenant_name,
            payment_note: self.payment_note,
        })
    }
}

fn not_found(id: Uuid) -> ApiError {
    ApiError::not_found(format!("Monthly rent entry {} not found", id))
}

/// GET /api/apartments/:id/monthly-rent?year=&month=
pub async fn list(
    State(state): State<AppState>,
    Path(apartment_id): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Vec<MonthlyRent>> {
    let apartment_id = parse_id(&apartment_id, "apartment")?;
    Ok(ApiResponse::success(state.store.list_rent(query.filter(apartment_id)?).await?))
}

/// POST /api/apartments/:id/monthly-rent - always a new row, installments accumulate
pub async fn create(
    State(state): State<AppState>,
    Path(apartment_id): Path<String>,
    ApiJson(body): ApiJson<CreateRentRequest>,
) -> ApiResult<MonthlyRent> {
    let apartment_id = parse_id(&apartment_id, "apartment")?;
    let rent = state.store.insert_rent(body.validate(apartment_id)?).await?;
    tracing::info!("Recorded rent {} for apartment {} {}/{}", rent.amount, apartment_id, rent.month, rent.year);
    Ok(ApiResponse::created(rent))
}

/// GET /api/monthly-rent/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<MonthlyRent> {
    let id = parse_id(&id, "monthly rent")?;
    let rent = state.store.find_rent(id).await?.ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::success(rent))
}

/// PATCH /api/monthly-rent/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(mut patch): ApiJson<MonthlyRentPatch>,
) -> ApiResult<MonthlyRent> {
    let id = parse_id(&id, "monthly rent")?;
    patch.amount = optional_amount(patch.amount, "amount")?;
    let rent = state.store.update_rent(id, patch).await?.ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::success(rent))
}

/// DELETE /api/monthly-rent/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Deleted> {
    let id = parse_id(&id, "monthly rent")?;
    if !state.store.delete_rent(id).await? {
        return Err(not_found(id));
    }
    Ok(ApiResponse::success(Deleted::new(id)))
}
