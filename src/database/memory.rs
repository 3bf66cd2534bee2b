use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::cmp::Reverse;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::*;
use crate::database::store::{DateRange, ExpenseBreakdown, LedgerStore, OccupancyCounts, PeriodFilter};
use crate::types::{ApartmentStatus, TransactionKind};

#[derive(Debug, Default)]
struct Tables {
    apartments: Vec<Apartment>,
    transactions: Vec<Transaction>,
    rent: Vec<MonthlyRent>,
    expenses: Vec<MonthlyExpense>,
    users: Vec<User>,
}

impl Tables {
    fn require_apartment(&self, id: Uuid) -> Result<(), DatabaseError> {
        if self.apartments.iter().any(|a| a.id == id) {
            Ok(())
        } else {
            Err(DatabaseError::NotFound(format!("apartment {} does not exist", id)))
        }
    }

    fn require_user(&self, id: Uuid) -> Result<(), DatabaseError> {
        if self.users.iter().any(|u| u.id == id) {
            Ok(())
        } else {
            Err(DatabaseError::NotFound(format!("user {} does not exist", id)))
        }
    }
}

fn checked_sum(mut values: impl Iterator<Item = Decimal>, what: &'static str) -> Result<Decimal, DatabaseError> {
    values
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
        .ok_or(DatabaseError::Overflow(what))
}

/// `LedgerStore` held in process memory.
///
/// All tables sit behind one lock and every operation takes it exactly once,
/// which gives the same row-level atomicity as the single-statement writes of
/// the Postgres backend. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    tables: RwLock<Tables>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn list_apartments(&self) -> Result<Vec<Apartment>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut rows = tables.apartments.clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn find_apartment(&self, id: Uuid) -> Result<Option<Apartment>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.apartments.iter().find(|a| a.id == id).cloned())
    }

    async fn create_apartment(&self, new: NewApartment) -> Result<Apartment, DatabaseError> {
        let apartment = Apartment {
            id: Uuid::new_v4(),
            name: new.name,
            address: new.address,
            rental_price: new.rental_price,
            total_investment: new.total_investment,
            status: new.status,
            current_tenant: new.current_tenant,
            lease_start_date: new.lease_start_date,
            lease_end_date: new.lease_end_date,
            created_at: Utc::now(),
        };
        self.tables.write().await.apartments.push(apartment.clone());
        Ok(apartment)
    }

    async fn update_apartment(&self, id: Uuid, patch: ApartmentPatch) -> Result<Option<Apartment>, DatabaseError> {
        let mut tables = self.tables.write().await;
        Ok(tables.apartments.iter_mut().find(|a| a.id == id).map(|apartment| {
            apartment.apply(patch);
            apartment.clone()
        }))
    }

    async fn delete_apartment(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.apartments.len();
        tables.apartments.retain(|a| a.id != id);
        if tables.apartments.len() == before {
            return Ok(false);
        }
        // ON DELETE CASCADE
        tables.transactions.retain(|t| t.apartment_id != id);
        tables.rent.retain(|r| r.apartment_id != id);
        tables.expenses.retain(|e| e.apartment_id != id);
        Ok(true)
    }

    async fn list_transactions(&self, apartment_id: Option<Uuid>) -> Result<Vec<Transaction>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Transaction> = tables
            .transactions
            .iter()
            .filter(|t| apartment_id.map_or(true, |id| t.apartment_id == id))
            .cloned()
            .collect();
        rows.sort_by_key(|t| Reverse((t.date, t.created_at)));
        Ok(rows)
    }

    async fn find_transaction(&self, id: Uuid) -> Result<Option<Transaction>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.transactions.iter().find(|t| t.id == id).cloned())
    }

    async fn create_transaction(&self, new: NewTransaction) -> Result<Transaction, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.require_apartment(new.apartment_id)?;
        tables.require_user(new.created_by)?;

        let transaction = Transaction {
            id: Uuid::new_v4(),
            apartment_id: new.apartment_id,
            kind: new.kind,
            category: new.category,
            amount: new.amount,
            description: new.description,
            date: new.date,
            created_by: new.created_by,
            created_at: Utc::now(),
        };
        tables.transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn update_transaction(&self, id: Uuid, patch: TransactionPatch) -> Result<Option<Transaction>, DatabaseError> {
        let mut tables = self.tables.write().await;
        if let Some(apartment_id) = patch.apartment_id {
            tables.require_apartment(apartment_id)?;
        }
        Ok(tables.transactions.iter_mut().find(|t| t.id == id).map(|transaction| {
            transaction.apply(patch);
            transaction.clone()
        }))
    }

    async fn delete_transaction(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.transactions.len();
        tables.transactions.retain(|t| t.id != id);
        Ok(tables.transactions.len() < before)
    }

    async fn list_rent(&self, filter: PeriodFilter) -> Result<Vec<MonthlyRent>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<MonthlyRent> = tables
            .rent
            .iter()
            .filter(|r| filter.matches(r.apartment_id, r.year, r.month))
            .cloned()
            .collect();
        rows.sort_by_key(|r| Reverse((r.year, r.month, r.created_at)));
        Ok(rows)
    }

    async fn find_rent(&self, id: Uuid) -> Result<Option<MonthlyRent>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.rent.iter().find(|r| r.id == id).cloned())
    }

    async fn insert_rent(&self, new: NewMonthlyRent) -> Result<MonthlyRent, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.require_apartment(new.apartment_id)?;

        let now = Utc::now();
        let rent = MonthlyRent {
            id: Uuid::new_v4(),
            apartment_id: new.apartment_id,
            month: new.month,
            year: new.year,
            amount: new.amount,
            tenant_name: new.tenant_name,
            payment_note: new.payment_note,
            created_at: now,
            updated_at: now,
        };
        tables.rent.push(rent.clone());
        Ok(rent)
    }

    async fn update_rent(&self, id: Uuid, patch: MonthlyRentPatch) -> Result<Option<MonthlyRent>, DatabaseError> {
        let mut tables = self.tables.write().await;
        Ok(tables.rent.iter_mut().find(|r| r.id == id).map(|rent| {
            rent.apply(patch);
            rent.updated_at = Utc::now();
            rent.clone()
        }))
    }

    async fn delete_rent(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.rent.len();
        tables.rent.retain(|r| r.id != id);
        Ok(tables.rent.len() < before)
    }

    async fn list_expenses(&self, filter: PeriodFilter) -> Result<Vec<MonthlyExpense>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<MonthlyExpense> = tables
            .expenses
            .iter()
            .filter(|e| filter.matches(e.apartment_id, e.year, e.month))
            .cloned()
            .collect();
        rows.sort_by_key(|e| Reverse((e.year, e.month)));
        Ok(rows)
    }

    async fn find_expense(&self, id: Uuid) -> Result<Option<MonthlyExpense>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.expenses.iter().find(|e| e.id == id).cloned())
    }

    async fn upsert_expense(&self, input: MonthlyExpenseInput) -> Result<MonthlyExpense, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.require_apartment(input.apartment_id)?;

        let now = Utc::now();
        if let Some(existing) = tables.expenses.iter_mut().find(|e| {
            e.apartment_id == input.apartment_id && e.month == input.month && e.year == input.year
        }) {
            existing.utilities = input.utilities;
            existing.gas = input.gas;
            existing.connectivity = input.connectivity;
            existing.maintenance = input.maintenance;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let expense = MonthlyExpense {
            id: Uuid::new_v4(),
            apartment_id: input.apartment_id,
            month: input.month,
            year: input.year,
            utilities: input.utilities,
            gas: input.gas,
            connectivity: input.connectivity,
            maintenance: input.maintenance,
            created_at: now,
            updated_at: now,
        };
        tables.expenses.push(expense.clone());
        Ok(expense)
    }

    async fn update_expense(&self, id: Uuid, patch: MonthlyExpensePatch) -> Result<Option<MonthlyExpense>, DatabaseError> {
        let mut tables = self.tables.write().await;
        Ok(tables.expenses.iter_mut().find(|e| e.id == id).map(|expense| {
            expense.apply(patch);
            expense.updated_at = Utc::now();
            expense.clone()
        }))
    }

    async fn delete_expense(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.expenses.len();
        tables.expenses.retain(|e| e.id != id);
        Ok(tables.expenses.len() < before)
    }

    async fn delete_expense_for_month(&self, apartment_id: Uuid, year: i32, month: i32) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.expenses.len();
        tables
            .expenses
            .retain(|e| !(e.apartment_id == apartment_id && e.year == year && e.month == month));
        Ok(tables.expenses.len() < before)
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut rows = tables.users.clone();
        rows.sort_by_key(|u| Reverse(u.created_at));
        Ok(rows)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, new: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == new.email) {
            return Err(DatabaseError::Conflict(format!("user {} already exists", new.email)));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: new.email,
            password: new.password,
            role: new.role,
            name: new.name,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn sum_investment(&self) -> Result<Decimal, DatabaseError> {
        let tables = self.tables.read().await;
        checked_sum(tables.apartments.iter().map(|a| a.total_investment), "investment")
    }

    async fn sum_rent(&self, filter: PeriodFilter) -> Result<Decimal, DatabaseError> {
        let tables = self.tables.read().await;
        checked_sum(
            tables
                .rent
                .iter()
                .filter(|r| filter.matches(r.apartment_id, r.year, r.month))
                .map(|r| r.amount),
            "rent",
        )
    }

    async fn sum_expenses(&self, filter: PeriodFilter) -> Result<ExpenseBreakdown, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .expenses
            .iter()
            .filter(|e| filter.matches(e.apartment_id, e.year, e.month))
            .try_fold(ExpenseBreakdown::default(), |acc, expense| acc.checked_add(expense))
            .ok_or(DatabaseError::Overflow("expenses"))
    }

    async fn sum_transactions(&self, kind: TransactionKind, range: DateRange) -> Result<Decimal, DatabaseError> {
        let tables = self.tables.read().await;
        checked_sum(
            tables
                .transactions
                .iter()
                .filter(|t| t.kind == kind && range.contains(t.date))
                .map(|t| t.amount),
            "transactions",
        )
    }

    async fn count_apartments_by_status(&self) -> Result<OccupancyCounts, DatabaseError> {
        let tables = self.tables.read().await;
        let mut counts = OccupancyCounts::default();
        for apartment in &tables.apartments {
            match apartment.status {
                ApartmentStatus::Occupied => counts.occupied += 1,
                ApartmentStatus::Vacant => counts.vacant += 1,
            }
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::types::UserRole;

    fn dec(v: i64) -> Decimal {
        Decimal::from(v)
    }

    async fn seeded() -> (MemoryLedgerStore, Uuid) {
        let store = MemoryLedgerStore::new();
        let apartment = store
            .create_apartment(NewApartment {
                name: "Unit 1".to_string(),
                address: "1 Main St".to_string(),
                rental_price: dec(12_000),
                total_investment: dec(100_000),
                status: ApartmentStatus::Occupied,
                current_tenant: None,
                lease_start_date: None,
                lease_end_date: None,
            })
            .await
            .unwrap();
        (store, apartment.id)
    }

    fn expense(apartment_id: Uuid, utilities: i64) -> MonthlyExpenseInput {
        MonthlyExpenseInput {
            apartment_id,
            month: 3,
            year: 2024,
            utilities: dec(utilities),
            gas: dec(10),
            connectivity: dec(20),
            maintenance: dec(0),
        }
    }

    fn rent(apartment_id: Uuid, amount: i64) -> NewMonthlyRent {
        NewMonthlyRent {
            apartment_id,
            month: 3,
            year: 2024,
            amount: dec(amount),
            tenant_name: None,
            payment_note: None,
        }
    }

    #[tokio::test]
    async fn expense_upsert_updates_in_place() {
        let (store, apt) = seeded().await;
        let first = store.upsert_expense(expense(apt, 100)).await.unwrap();
        let second = store.upsert_expense(expense(apt, 250)).await.unwrap();

        assert_eq!(first.id, second.id);
        let rows = store.list_expenses(PeriodFilter::apartment(apt)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].utilities, dec(250));
    }

    #[tokio::test]
    async fn rent_insert_adds_rows_for_same_month() {
        let (store, apt) = seeded().await;
        let first = store.insert_rent(rent(apt, 500)).await.unwrap();
        store.insert_rent(rent(apt, 700)).await.unwrap();

        let rows = store.list_rent(PeriodFilter::apartment(apt).with_year(Some(2024)).with_month(Some(3))).await.unwrap();
        assert_eq!(rows.len(), 2);
        let kept = store.find_rent(first.id).await.unwrap().unwrap();
        assert_eq!(kept, first);
        assert_eq!(store.sum_rent(PeriodFilter::apartment(apt)).await.unwrap(), dec(1_200));
    }

    #[tokio::test]
    async fn update_returns_the_row_it_wrote() {
        let (store, apt) = seeded().await;
        let row = store.insert_rent(rent(apt, 500)).await.unwrap();
        let updated = store
            .update_rent(row.id, MonthlyRentPatch { amount: Some(dec(650)), ..Default::default() })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.amount, dec(650));
        assert_eq!(updated.id, row.id);
        assert!(store.update_rent(Uuid::new_v4(), MonthlyRentPatch::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_apartment_cascades() {
        let (store, apt) = seeded().await;
        let user = store
            .create_user(NewUser {
                email: "owner@example.com".to_string(),
                password: "x".to_string(),
                role: UserRole::Admin,
                name: "Owner".to_string(),
            })
            .await
            .unwrap();
        store.insert_rent(rent(apt, 500)).await.unwrap();
        store.upsert_expense(expense(apt, 100)).await.unwrap();
        store
            .create_transaction(NewTransaction {
                apartment_id: apt,
                kind: TransactionKind::Income,
                category: "rent".to_string(),
                amount: dec(500),
                description: String::new(),
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                created_by: user.id,
            })
            .await
            .unwrap();

        assert!(store.delete_apartment(apt).await.unwrap());
        assert!(store.list_rent(PeriodFilter::all()).await.unwrap().is_empty());
        assert!(store.list_expenses(PeriodFilter::all()).await.unwrap().is_empty());
        assert!(store.list_transactions(None).await.unwrap().is_empty());
        assert!(!store.delete_apartment(apt).await.unwrap());
    }

    #[tokio::test]
    async fn writes_against_missing_apartment_are_not_found() {
        let store = MemoryLedgerStore::new();
        let err = store.insert_rent(rent(Uuid::new_v4(), 10)).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(_)));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryLedgerStore::new();
        let new = NewUser {
            email: "a@example.com".to_string(),
            password: "x".to_string(),
            role: UserRole::Viewer,
            name: "A".to_string(),
        };
        store.create_user(new.clone()).await.unwrap();
        assert!(matches!(store.create_user(new).await, Err(DatabaseError::Conflict(_))));
    }

    #[tokio::test]
    async fn sums_past_the_decimal_range_are_errors() {
        let (store, apt) = seeded().await;
        for _ in 0..2 {
            store
                .insert_rent(NewMonthlyRent { amount: Decimal::MAX, ..rent(apt, 0) })
                .await
                .unwrap();
        }
        store
            .upsert_expense(MonthlyExpenseInput { month: 5, maintenance: Decimal::MAX, ..expense(apt, 0) })
            .await
            .unwrap();
        store
            .upsert_expense(MonthlyExpenseInput { month: 6, maintenance: Decimal::MAX, ..expense(apt, 0) })
            .await
            .unwrap();

        assert!(matches!(store.sum_rent(PeriodFilter::all()).await, Err(DatabaseError::Overflow("rent"))));
        assert!(matches!(
            store.sum_expenses(PeriodFilter::all()).await,
            Err(DatabaseError::Overflow("expenses"))
        ));
    }
}
