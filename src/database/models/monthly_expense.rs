use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The settled utility/maintenance bill for an apartment/month/year.
///
/// Exactly one row exists per (apartment, month, year); writes upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyExpense {
    pub id: Uuid,
    pub apartment_id: Uuid,
    pub month: i32,
    pub year: i32,
    /// Water and electricity
    pub utilities: Decimal,
    pub gas: Decimal,
    /// Internet / wifi
    pub connectivity: Decimal,
    pub maintenance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MonthlyExpense {
    pub fn total(&self) -> Decimal {
        self.utilities + self.gas + self.connectivity + self.maintenance
    }

    pub fn apply(&mut self, patch: MonthlyExpensePatch) {
        if let Some(v) = patch.utilities {
            self.utilities = v;
        }
        if let Some(v) = patch.gas {
            self.gas = v;
        }
        if let Some(v) = patch.connectivity {
            self.connectivity = v;
        }
        if let Some(v) = patch.maintenance {
            self.maintenance = v;
        }
    }
}

/// Full write for the upsert path; missing sub-amounts are zero
#[derive(Debug, Clone)]
pub struct MonthlyExpenseInput {
    pub apartment_id: Uuid,
    pub month: i32,
    pub year: i32,
    pub utilities: Decimal,
    pub gas: Decimal,
    pub connectivity: Decimal,
    pub maintenance: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyExpensePatch {
    pub utilities: Option<Decimal>,
    pub gas: Option<Decimal>,
    pub connectivity: Option<Decimal>,
    pub maintenance: Option<Decimal>,
}
