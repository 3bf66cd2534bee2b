use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One rent payment for an apartment/month/year.
///
/// Several rows may share the same (apartment, month, year): partial and
/// installment payments are recorded as separate entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRent {
    pub id: Uuid,
    pub apartment_id: Uuid,
    pub month: i32,
    pub year: i32,
    pub amount: Decimal,
    pub tenant_name: Option<String>,
    pub payment_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMonthlyRent {
    pub apartment_id: Uuid,
    pub month: i32,
    pub year: i32,
    pub amount: Decimal,
    pub tenant_name: Option<String>,
    pub payment_note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRentPatch {
    pub amount: Option<Decimal>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub tenant_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub payment_note: Option<Option<String>>,
}

impl MonthlyRent {
    pub fn apply(&mut self, patch: MonthlyRentPatch) {
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(tenant) = patch.tenant_name {
            self.tenant_name = tenant;
        }
        if let Some(note) = patch.payment_note {
            self.payment_note = note;
        }
    }
}
