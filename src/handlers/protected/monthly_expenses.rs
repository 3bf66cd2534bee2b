use axum::extract::{Path, Query, State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{amount, check_month, optional_amount, parse_id, parse_month, parse_year, required, ApiJson};
use crate::app::AppState;
use crate::database::models::{MonthlyExpense, MonthlyExpenseInput, MonthlyExpensePatch};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

use super::monthly_rent::PeriodQuery;
use super::Deleted;

/// Missing sub-amounts are stored as zero
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertExpenseRequest {
    pub month: Option<i32>,
    pub year: Option<i32>,
    pub utilities: Option<Decimal>,
    pub gas: Option<Decimal>,
    pub connectivity: Option<Decimal>,
    pub maintenance: Option<Decimal>,
}

impl UpsertExpenseRequest {
    fn validate(self, apartment_id: Uuid) -> Result<MonthlyExpenseInput, ApiError> {
        Ok(MonthlyExpenseInput {
            apartment_id,
            month: check_month(required(self.month, "month")?)?,
            year: required(self.year, "year")?,
            utilities: amount(self.utilities.unwrap_or_default(), "utilities")?,
            gas: amount(self.gas.unwrap_or_default(), "gas")?,
            connectivity: amount(self.connectivity.unwrap_or_default(), "connectivity")?,
            maintenance: amount(self.maintenance.unwrap_or_default(), "maintenance")?,
        })
    }
}

/// A single month (possibly absent) when both year and month are given, else the list
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ExpenseListing {
    Month(Option<MonthlyExpense>),
    All(Vec<MonthlyExpense>),
}

fn not_found(id: Uuid) -> ApiError {
    ApiError::not_found(format!("Monthly expense {} not found", id))
}

/// GET /api/apartments/:id/monthly-expenses?year=&month=
pub async fn list(
    State(state): State<AppState>,
    Path(apartment_id): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<ExpenseListing> {
    let apartment_id = parse_id(&apartment_id, "apartment")?;
    let filter = query.filter(apartment_id)?;
    let rows = state.store.list_expenses(filter).await?;

    let listing = if filter.year.is_some() && filter.month.is_some() {
        ExpenseListing::Month(rows.into_iter().next())
    } else {
        ExpenseListing::All(rows)
    };
    Ok(ApiResponse::success(listing))
}

/// POST /api/apartments/:id/monthly-expenses - replaces the month's bill if one exists
pub async fn upsert(
    State(state): State<AppState>,
    Path(apartment_id): Path<String>,
    ApiJson(body): ApiJson<UpsertExpenseRequest>,
) -> ApiResult<MonthlyExpense> {
    let apartment_id = parse_id(&apartment_id, "apartment")?;
    let expense = state.store.upsert_expense(body.validate(apartment_id)?).await?;
    tracing::info!(
        "Settled expenses of {} for apartment {} {}/{}",
        expense.total(),
        apartment_id,
        expense.month,
        expense.year
    );
    Ok(ApiResponse::created(expense))
}

/// DELETE /api/apartments/:id/monthly-expenses?year=&month= - both parameters required
pub async fn delete_for_month(
    State(state): State<AppState>,
    Path(apartment_id): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<serde_json::Value> {
    let apartment_id = parse_id(&apartment_id, "apartment")?;
    let year = required(parse_year(query.year.as_deref())?, "year")?;
    let month = required(parse_month(query.month.as_deref())?, "month")?;

    if !state.store.delete_expense_for_month(apartment_id, year, month).await? {
        return Err(ApiError::not_found(format!(
            "No expenses recorded for apartment {} in {}/{}",
            apartment_id, month, year
        )));
    }
    Ok(ApiResponse::success(serde_json::json!({
        "apartmentId": apartment_id,
        "year": year,
        "month": month,
        "deleted": true,
    })))
}

/// GET /api/monthly-expenses/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<MonthlyExpense> {
    let id = parse_id(&id, "monthly expense")?;
    let expense = state.store.find_expense(id).await?.ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::success(expense))
}

/// PATCH /api/monthly-expenses/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(mut patch): ApiJson<MonthlyExpensePatch>,
) -> ApiResult<MonthlyExpense> {
    let id = parse_id(&id, "monthly expense")?;
    patch.utilities = optional_amount(patch.utilities, "utilities")?;
    patch.gas = optional_amount(patch.gas, "gas")?;
    patch.connectivity = optional_amount(patch.connectivity, "connectivity")?;
    patch.maintenance = optional_amount(patch.maintenance, "maintenance")?;
    let expense = state.store.update_expense(id, patch).await?.ok_or_else(|| not_found(id))?;
    Ok(ApiResponse::success(expense))
}

/// DELETE /api/monthly-expenses/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Deleted> {
    let id = parse_id(&id, "monthly expense")?;
    if !state.store.delete_expense(id).await? {
        return Err(not_found(id));
    }
    Ok(ApiResponse::success(Deleted::new(id)))
}
