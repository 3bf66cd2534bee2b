use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::ApartmentStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Apartment {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    /// Annual rental price
    pub rental_price: Decimal,
    pub total_investment: Decimal,
    #[sqlx(try_from = "String")]
    pub status: ApartmentStatus,
    pub current_tenant: Option<String>,
    pub lease_start_date: Option<NaiveDate>,
    pub lease_end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewApartment {
    pub name: String,
    pub address: String,
    pub rental_price: Decimal,
    pub total_investment: Decimal,
    pub status: ApartmentStatus,
    pub current_tenant: Option<String>,
    pub lease_start_date: Option<NaiveDate>,
    pub lease_end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApartmentPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub rental_price: Option<Decimal>,
    pub total_investment: Option<Decimal>,
    pub status: Option<ApartmentStatus>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub current_tenant: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub lease_start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub lease_end_date: Option<Option<NaiveDate>>,
}

impl Apartment {
    pub fn apply(&mut self, patch: ApartmentPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(price) = patch.rental_price {
            self.rental_price = price;
        }
        if let Some(investment) = patch.total_investment {
            self.total_investment = investment;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(tenant) = patch.current_tenant {
            self.current_tenant = tenant;
        }
        if let Some(start) = patch.lease_start_date {
            self.lease_start_date = start;
        }
        if let Some(end) = patch.lease_end_date {
            self.lease_end_date = end;
        }
    }
}
