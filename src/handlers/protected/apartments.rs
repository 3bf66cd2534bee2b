use axum::extract::{Path, State};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::api::{amount, non_negative, optional_amount, parse_id, required, ApiJson};
use crate::app::AppState;
use crate::database::models::{Apartment, ApartmentPatch, NewApartment};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::ApartmentFinancials;
use crate::types::ApartmentStatus;

use super::Deleted;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApartmentRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub rental_price: Option<Decimal>,
    pub total_investment: Option<Decimal>,
    pub status: Option<ApartmentStatus>,
    pub current_tenant: Option<String>,
    pub lease_start_date: Option<NaiveDate>,
    pub lease_end_date: Option<NaiveDate>,
}

impl CreateApartmentRequest {
    fn validate(self) -> Result<NewApartment, ApiError> {
        Ok(NewApartment {
            name: required(self.name, "name")?,
            address: required(self.address, "address")?,
            rental_price: amount(required(self.rental_price, "rentalPrice")?, "rentalPrice")?,
            total_investment: non_negative(
                amount(self.total_investment.unwrap_or_default(), "totalInvestment")?,
                "totalInvestment",
            )?,
            status: self.status.unwrap_or(ApartmentStatus::Vacant),
            current_tenant: self.current_tenant,
            lease_start_date: self.lease_start_date,
            lease_end_date: self.lease_end_date,
        })
    }
}

fn not_found(id: impl std::fmt::Display) -> ApiError {
    ApiError::not_found(format!("Apartment {} not found", id))
}

/// GET /api/apartments
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Apartment>> {
    Ok(ApiResponse::success(state.store.list_apartments().await?))
}

/// GET /api/apartments/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Apartment> {
    let id = parse_id(&id, "apartment")?;
    let apartment = state.store.find_apartment(id).await?.ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::success(apartment))
}

/// POST /api/apartments
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateApartmentRequest>,
) -> ApiResult<Apartment> {
    let apartment = state.store.create_apartment(body.validate()?).await?;
    tracing::info!("Created apartment {} ({})", apartment.id, apartment.name);
    Ok(ApiResponse::created(apartment))
}

/// PATCH /api/apartments/:id - absent fields stay, explicit nulls clear
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(mut patch): ApiJson<ApartmentPatch>,
) -> ApiResult<Apartment> {
    let id = parse_id(&id, "apartment")?;
    patch.rental_price = optional_amount(patch.rental_price, "rentalPrice")?;
    patch.total_investment = optional_amount(patch.total_investment, "totalInvestment")?
        .map(|investment| non_negative(investment, "totalInvestment"))
        .transpose()?;
    let apartment = state.store.update_apartment(id, patch).await?.ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::success(apartment))
}

/// DELETE /api/apartments/:id - also removes its rent, expense and transaction rows
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Deleted> {
    let id = parse_id(&id, "apartment")?;
    if !state.store.delete_apartment(id).await? {
        return Err(not_found(id));
    }
    tracing::info!("Deleted apartment {}", id);
    Ok(ApiResponse::success(Deleted::new(id)))
}

/// GET /api/apartments/:id/financial-stats - all-time recovery figures
pub async fn financial_stats(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ApartmentFinancials> {
    let id = parse_id(&id, "apartment")?;
    Ok(ApiResponse::success(state.financials().apartment(id).await?))
}
