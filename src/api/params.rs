use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::error::ApiError;

/// Treat `?year=` the same as an absent parameter
fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

pub fn required<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::missing_field(field))
}

pub fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::bad_request(format!("Invalid {} id '{}'", what, raw)))
}

pub fn parse_year(raw: Option<&str>) -> Result<Option<i32>, ApiError> {
    present(raw)
        .map(|s| s.parse::<i32>().map_err(|_| ApiError::field("year", format!("'{}' is not a year", s))))
        .transpose()
}

pub fn check_month(month: i32) -> Result<i32, ApiError> {
    if (1..=12).contains(&month) {
        Ok(month)
    } else {
        Err(ApiError::field("month", "must be between 1 and 12"))
    }
}

pub fn parse_month(raw: Option<&str>) -> Result<Option<i32>, ApiError> {
    present(raw)
        .map(|s| {
            s.parse::<i32>()
                .map_err(|_| ApiError::field("month", format!("'{}' is not a month", s)))
                .and_then(check_month)
        })
        .transpose()
}

/// ISO `YYYY-MM-DD`
pub fn parse_date(raw: Option<&str>, field: &str) -> Result<Option<NaiveDate>, ApiError> {
    present(raw)
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|_| ApiError::field(field, format!("'{}' is not a YYYY-MM-DD date", s)))
        })
        .transpose()
}

/// Largest magnitude a `NUMERIC(12,2)` money column holds
pub fn max_amount() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

/// Money at the boundary: rounded to cents the way Postgres stores it, then
/// bounded so every backend accepts the same values.
pub fn amount(value: Decimal, field: &str) -> Result<Decimal, ApiError> {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.abs() > max_amount() {
        Err(ApiError::field(field, format!("must be between -{0} and {0}", max_amount())))
    } else {
        Ok(rounded)
    }
}

pub fn optional_amount(value: Option<Decimal>, field: &str) -> Result<Option<Decimal>, ApiError> {
    value.map(|v| amount(v, field)).transpose()
}

pub fn non_negative(value: Decimal, field: &str) -> Result<Decimal, ApiError> {
    if value.is_sign_negative() && !value.is_zero() {
        Err(ApiError::field(field, "must not be negative"))
    } else {
        Ok(value)
    }
}
