use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::*;
use crate::types::TransactionKind;

/// Row filter for the monthly ledgers (rent and expenses).
/// `None` means "any" for every field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodFilter {
    pub apartment_id: Option<Uuid>,
    pub year: Option<i32>,
    pub month: Option<i32>,
}

impl PeriodFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn apartment(apartment_id: Uuid) -> Self {
        Self { apartment_id: Some(apartment_id), ..Self::default() }
    }

    pub fn year(year: i32) -> Self {
        Self { year: Some(year), ..Self::default() }
    }

    pub fn with_year(mut self, year: Option<i32>) -> Self {
        self.year = year;
        self
    }

    pub fn with_month(mut self, month: Option<i32>) -> Self {
        self.month = month;
        self
    }

    pub fn matches(&self, apartment_id: Uuid, year: i32, month: i32) -> bool {
        self.apartment_id.map_or(true, |id| id == apartment_id)
            && self.year.map_or(true, |y| y == year)
            && self.month.map_or(true, |m| m == month)
    }
}

/// Inclusive date range over `Transaction.date`; either bound may be open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

/// Summed expense sub-amounts over a set of `MonthlyExpense` rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseBreakdown {
    pub utilities: Decimal,
    pub gas: Decimal,
    pub connectivity: Decimal,
    pub maintenance: Decimal,
}

impl ExpenseBreakdown {
    /// `None` if the sum leaves the `Decimal` range
    pub fn total(&self) -> Option<Decimal> {
        self.utilities
            .checked_add(self.gas)?
            .checked_add(self.connectivity)?
            .checked_add(self.maintenance)
    }

    pub fn checked_add(self, expense: &MonthlyExpense) -> Option<Self> {
        Some(Self {
            utilities: self.utilities.checked_add(expense.utilities)?,
            gas: self.gas.checked_add(expense.gas)?,
            connectivity: self.connectivity.checked_add(expense.connectivity)?,
            maintenance: self.maintenance.checked_add(expense.maintenance)?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OccupancyCounts {
    pub occupied: i64,
    pub vacant: i64,
}

impl OccupancyCounts {
    pub fn total(&self) -> i64 {
        self.occupied + self.vacant
    }
}

/// Persistence contract for the ledger.
///
/// Every method that returns post-write state must produce it from the same
/// atomic write (a single statement, or a single lock acquisition), never
/// from a separate read.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Short tag for logs and health output
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<(), DatabaseError>;

    // Apartments
    async fn list_apartments(&self) -> Result<Vec<Apartment>, DatabaseError>;
    async fn find_apartment(&self, id: Uuid) -> Result<Option<Apartment>, DatabaseError>;
    async fn create_apartment(&self, new: NewApartment) -> Result<Apartment, DatabaseError>;
    async fn update_apartment(&self, id: Uuid, patch: ApartmentPatch) -> Result<Option<Apartment>, DatabaseError>;
    async fn delete_apartment(&self, id: Uuid) -> Result<bool, DatabaseError>;

    // Transactions
    async fn list_transactions(&self, apartment_id: Option<Uuid>) -> Result<Vec<Transaction>, DatabaseError>;
    async fn find_transaction(&self, id: Uuid) -> Result<Option<Transaction>, DatabaseError>;
    async fn create_transaction(&self, new: NewTransaction) -> Result<Transaction, DatabaseError>;
    async fn update_transaction(&self, id: Uuid, patch: TransactionPatch) -> Result<Option<Transaction>, DatabaseError>;
    async fn delete_transaction(&self, id: Uuid) -> Result<bool, DatabaseError>;

    // Monthly rent (insert-only: never collapses rows for the same month)
    async fn list_rent(&self, filter: PeriodFilter) -> Result<Vec<MonthlyRent>, DatabaseError>;
    async fn find_rent(&self, id: Uuid) -> Result<Option<MonthlyRent>, DatabaseError>;
    async fn insert_rent(&self, new: NewMonthlyRent) -> Result<MonthlyRent, DatabaseError>;
    async fn update_rent(&self, id: Uuid, patch: MonthlyRentPatch) -> Result<Option<MonthlyRent>, DatabaseError>;
    async fn delete_rent(&self, id: Uuid) -> Result<bool, DatabaseError>;

    // Monthly expenses (one row per apartment/month/year)
    async fn list_expenses(&self, filter: PeriodFilter) -> Result<Vec<MonthlyExpense>, DatabaseError>;
    async fn find_expense(&self, id: Uuid) -> Result<Option<MonthlyExpense>, DatabaseError>;
    async fn upsert_expense(&self, input: MonthlyExpenseInput) -> Result<MonthlyExpense, DatabaseError>;
    async fn update_expense(&self, id: Uuid, patch: MonthlyExpensePatch) -> Result<Option<MonthlyExpense>, DatabaseError>;
    async fn delete_expense(&self, id: Uuid) -> Result<bool, DatabaseError>;
    async fn delete_expense_for_month(&self, apartment_id: Uuid, year: i32, month: i32) -> Result<bool, DatabaseError>;

    // Users
    async fn list_users(&self) -> Result<Vec<User>, DatabaseError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
    async fn create_user(&self, new: NewUser) -> Result<User, DatabaseError>;

    // Aggregates
    async fn sum_investment(&self) -> Result<Decimal, DatabaseError>;
    async fn sum_rent(&self, filter: PeriodFilter) -> Result<Decimal, DatabaseError>;
    async fn sum_expenses(&self, filter: PeriodFilter) -> Result<ExpenseBreakdown, DatabaseError>;
    async fn sum_transactions(&self, kind: TransactionKind, range: DateRange) -> Result<Decimal, DatabaseError>;
    async fn count_apartments_by_status(&self) -> Result<OccupancyCounts, DatabaseError>;
}
