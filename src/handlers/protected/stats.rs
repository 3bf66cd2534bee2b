use axum::extract::{Query, State};
use chrono::{Datelike, Utc};
use serde::Deserialize;

use crate::api::{parse_date, parse_year};
use crate::app::AppState;
use crate::database::store::DateRange;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{KpiSummary, PortfolioFinancials};

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl KpiQuery {
    pub fn range(&self) -> Result<DateRange, ApiError> {
        let range = DateRange {
            start: parse_date(self.start_date.as_deref(), "startDate")?,
            end: parse_date(self.end_date.as_deref(), "endDate")?,
        };
        if let (Some(start), Some(end)) = (range.start, range.end) {
            if start > end {
                return Err(ApiError::field("startDate", "must not be after endDate"));
            }
        }
        Ok(range)
    }
}

/// GET /api/financial-stats?year= - portfolio figures; year defaults to the current one
pub async fn portfolio(State(state): State<AppState>, Query(query): Query<YearQuery>) -> ApiResult<PortfolioFinancials> {
    let year = parse_year(query.year.as_deref())?.unwrap_or_else(|| Utc::now().year());
    Ok(ApiResponse::success(state.financials().portfolio(year).await?))
}

/// GET /api/kpis?startDate=&endDate=
pub async fn kpis(State(state): State<AppState>, Query(query): Query<KpiQuery>) -> ApiResult<KpiSummary> {
    let range = query.range()?;
    Ok(ApiResponse::success(state.financials().kpis(range).await?))
}
