use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::*;
use crate::database::store::{DateRange, ExpenseBreakdown, LedgerStore, OccupancyCounts, PeriodFilter};
use crate::types::{ApartmentStatus, TransactionKind};

const APARTMENT_COLUMNS: &str = "id, name, address, rental_price, COALESCE(total_investment, 0) AS total_investment, \
     status, current_tenant, lease_start_date, lease_end_date, created_at";

const TRANSACTION_COLUMNS: &str =
    "id, apartment_id, type, category, amount, description, date, created_by, created_at";

const RENT_COLUMNS: &str =
    "id, apartment_id, month, year, amount, tenant_name, payment_note, created_at, updated_at";

const EXPENSE_COLUMNS: &str =
    "id, apartment_id, month, year, utilities, gas, connectivity, maintenance, created_at, updated_at";

const USER_COLUMNS: &str = "id, email, password, role, name, created_at";

/// Optional-filter predicate shared by the monthly ledger queries ($1..$3)
const PERIOD_PREDICATE: &str = "($1::uuid IS NULL OR apartment_id = $1) \
     AND ($2::int IS NULL OR year = $2) \
     AND ($3::int IS NULL OR month = $3)";

/// `LedgerStore` backed by Postgres through sqlx.
///
/// Writes that hand back the resulting row use `RETURNING`, so the caller
/// always sees exactly the row its own statement produced.
#[derive(Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn list_apartments(&self) -> Result<Vec<Apartment>, DatabaseError> {
        let sql = format!("SELECT {} FROM apartments ORDER BY name", APARTMENT_COLUMNS);
        Ok(sqlx::query_as::<_, Apartment>(&sql).fetch_all(&self.pool).await?)
    }

    async fn find_apartment(&self, id: Uuid) -> Result<Option<Apartment>, DatabaseError> {
        let sql = format!("SELECT {} FROM apartments WHERE id = $1", APARTMENT_COLUMNS);
        Ok(sqlx::query_as::<_, Apartment>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn create_apartment(&self, new: NewApartment) -> Result<Apartment, DatabaseError> {
        let sql = format!(
            "INSERT INTO apartments (id, name, address, rental_price, total_investment, status, \
             current_tenant, lease_start_date, lease_end_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
            APARTMENT_COLUMNS
        );
        sqlx::query_as::<_, Apartment>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new.name)
            .bind(&new.address)
            .bind(new.rental_price)
            .bind(new.total_investment)
            .bind(new.status.as_str())
            .bind(&new.current_tenant)
            .bind(new.lease_start_date)
            .bind(new.lease_end_date)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, "apartment"))
    }

    async fn update_apartment(&self, id: Uuid, patch: ApartmentPatch) -> Result<Option<Apartment>, DatabaseError> {
        let sql = format!(
            "UPDATE apartments SET \
             name = COALESCE($2, name), \
             address = COALESCE($3, address), \
             rental_price = COALESCE($4, rental_price), \
             total_investment = COALESCE($5, total_investment), \
             status = COALESCE($6, status), \
             current_tenant = CASE WHEN $7 THEN $8 ELSE current_tenant END, \
             lease_start_date = CASE WHEN $9 THEN $10 ELSE lease_start_date END, \
             lease_end_date = CASE WHEN $11 THEN $12 ELSE lease_end_date END \
             WHERE id = $1 RETURNING {}",
            APARTMENT_COLUMNS
        );
        sqlx::query_as::<_, Apartment>(&sql)
            .bind(id)
            .bind(patch.name)
            .bind(patch.address)
            .bind(patch.rental_price)
            .bind(patch.total_investment)
            .bind(patch.status.map(|s| s.as_str()))
            .bind(patch.current_tenant.is_some())
            .bind(patch.current_tenant.flatten())
            .bind(patch.lease_start_date.is_some())
            .bind(patch.lease_start_date.flatten())
            .bind(patch.lease_end_date.is_some())
            .bind(patch.lease_end_date.flatten())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, "apartment"))
    }

    async fn delete_apartment(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM apartments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_transactions(&self, apartment_id: Option<Uuid>) -> Result<Vec<Transaction>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM transactions WHERE ($1::uuid IS NULL OR apartment_id = $1) \
             ORDER BY date DESC, created_at DESC",
            TRANSACTION_COLUMNS
        );
        Ok(sqlx::query_as::<_, Transaction>(&sql)
            .bind(apartment_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_transaction(&self, id: Uuid) -> Result<Option<Transaction>, DatabaseError> {
        let sql = format!("SELECT {} FROM transactions WHERE id = $1", TRANSACTION_COLUMNS);
        Ok(sqlx::query_as::<_, Transaction>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn create_transaction(&self, new: NewTransaction) -> Result<Transaction, DatabaseError> {
        let sql = format!(
            "INSERT INTO transactions (id, apartment_id, type, category, amount, description, date, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            TRANSACTION_COLUMNS
        );
        sqlx::query_as::<_, Transaction>(&sql)
            .bind(Uuid::new_v4())
            .bind(new.apartment_id)
            .bind(new.kind.as_str())
            .bind(&new.category)
            .bind(new.amount)
            .bind(&new.description)
            .bind(new.date)
            .bind(new.created_by)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, "transaction"))
    }

    async fn update_transaction(&self, id: Uuid, patch: TransactionPatch) -> Result<Option<Transaction>, DatabaseError> {
        let sql = format!(
            "UPDATE transactions SET \
             apartment_id = COALESCE($2, apartment_id), \
             type = COALESCE($3, type), \
             category = COALESCE($4, category), \
             amount = COALESCE($5, amount), \
             description = COALESCE($6, description), \
             date = COALESCE($7, date) \
             WHERE id = $1 RETURNING {}",
            TRANSACTION_COLUMNS
        );
        sqlx::query_as::<_, Transaction>(&sql)
            .bind(id)
            .bind(patch.apartment_id)
            .bind(patch.kind.map(|k| k.as_str()))
            .bind(patch.category)
            .bind(patch.amount)
            .bind(patch.description)
            .bind(patch.date)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, "transaction"))
    }

    async fn delete_transaction(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_rent(&self, filter: PeriodFilter) -> Result<Vec<MonthlyRent>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM monthly_rent WHERE {} ORDER BY year DESC, month DESC, created_at DESC",
            RENT_COLUMNS, PERIOD_PREDICATE
        );
        Ok(sqlx::query_as::<_, MonthlyRent>(&sql)
            .bind(filter.apartment_id)
            .bind(filter.year)
            .bind(filter.month)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_rent(&self, id: Uuid) -> Result<Option<MonthlyRent>, DatabaseError> {
        let sql = format!("SELECT {} FROM monthly_rent WHERE id = $1", RENT_COLUMNS);
        Ok(sqlx::query_as::<_, MonthlyRent>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn insert_rent(&self, new: NewMonthlyRent) -> Result<MonthlyRent, DatabaseError> {
        let sql = format!(
            "INSERT INTO monthly_rent (id, apartment_id, month, year, amount, tenant_name, payment_note) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            RENT_COLUMNS
        );
        sqlx::query_as::<_, MonthlyRent>(&sql)
            .bind(Uuid::new_v4())
            .bind(new.apartment_id)
            .bind(new.month)
            .bind(new.year)
            .bind(new.amount)
            .bind(&new.tenant_name)
            .bind(&new.payment_note)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, "monthly rent"))
    }

    async fn update_rent(&self, id: Uuid, patch: MonthlyRentPatch) -> Result<Option<MonthlyRent>, DatabaseError> {
        let sql = format!(
            "UPDATE monthly_rent SET \
             amount = COALESCE($2, amount), \
             tenant_name = CASE WHEN $3 THEN $4 ELSE tenant_name END, \
             payment_note = CASE WHEN $5 THEN $6 ELSE payment_note END, \
             updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            RENT_COLUMNS
        );
        sqlx::query_as::<_, MonthlyRent>(&sql)
            .bind(id)
            .bind(patch.amount)
            .bind(patch.tenant_name.is_some())
            .bind(patch.tenant_name.flatten())
            .bind(patch.payment_note.is_some())
            .bind(patch.payment_note.flatten())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, "monthly rent"))
    }

    async fn delete_rent(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM monthly_rent WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_expenses(&self, filter: PeriodFilter) -> Result<Vec<MonthlyExpense>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM monthly_expenses WHERE {} ORDER BY year DESC, month DESC",
            EXPENSE_COLUMNS, PERIOD_PREDICATE
        );
        Ok(sqlx::query_as::<_, MonthlyExpense>(&sql)
            .bind(filter.apartment_id)
            .bind(filter.year)
            .bind(filter.month)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_expense(&self, id: Uuid) -> Result<Option<MonthlyExpense>, DatabaseError> {
        let sql = format!("SELECT {} FROM monthly_expenses WHERE id = $1", EXPENSE_COLUMNS);
        Ok(sqlx::query_as::<_, MonthlyExpense>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn upsert_expense(&self, input: MonthlyExpenseInput) -> Result<MonthlyExpense, DatabaseError> {
        let sql = format!(
            "INSERT INTO monthly_expenses (id, apartment_id, month, year, utilities, gas, connectivity, maintenance) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (apartment_id, month, year) DO UPDATE SET \
             utilities = EXCLUDED.utilities, \
             gas = EXCLUDED.gas, \
             connectivity = EXCLUDED.connectivity, \
             maintenance = EXCLUDED.maintenance, \
             updated_at = NOW() \
             RETURNING {}",
            EXPENSE_COLUMNS
        );
        sqlx::query_as::<_, MonthlyExpense>(&sql)
            .bind(Uuid::new_v4())
            .bind(input.apartment_id)
            .bind(input.month)
            .bind(input.year)
            .bind(input.utilities)
            .bind(input.gas)
            .bind(input.connectivity)
            .bind(input.maintenance)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, "monthly expense"))
    }

    async fn update_expense(&self, id: Uuid, patch: MonthlyExpensePatch) -> Result<Option<MonthlyExpense>, DatabaseError> {
        let sql = format!(
            "UPDATE monthly_expenses SET \
             utilities = COALESCE($2, utilities), \
             gas = COALESCE($3, gas), \
             connectivity = COALESCE($4, connectivity), \
             maintenance = COALESCE($5, maintenance), \
             updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            EXPENSE_COLUMNS
        );
        sqlx::query_as::<_, MonthlyExpense>(&sql)
            .bind(id)
            .bind(patch.utilities)
            .bind(patch.gas)
            .bind(patch.connectivity)
            .bind(patch.maintenance)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, "monthly expense"))
    }

    async fn delete_expense(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM monthly_expenses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_expense_for_month(&self, apartment_id: Uuid, year: i32, month: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM monthly_expenses WHERE apartment_id = $1 AND year = $2 AND month = $3")
            .bind(apartment_id)
            .bind(year)
            .bind(month)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users ORDER BY created_at DESC", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).bind(email).fetch_optional(&self.pool).await?)
    }

    async fn create_user(&self, new: NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (id, email, password, role, name) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new.email)
            .bind(&new.password)
            .bind(new.role.as_str())
            .bind(&new.name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, "user"))
    }

    async fn sum_investment(&self) -> Result<Decimal, DatabaseError> {
        let (total,): (Decimal,) =
            sqlx::query_as("SELECT COALESCE(SUM(COALESCE(total_investment, 0)), 0) FROM apartments")
                .fetch_one(&self.pool)
                .await?;
        Ok(total)
    }

    async fn sum_rent(&self, filter: PeriodFilter) -> Result<Decimal, DatabaseError> {
        let sql = format!("SELECT COALESCE(SUM(amount), 0) FROM monthly_rent WHERE {}", PERIOD_PREDICATE);
        let (total,): (Decimal,) = sqlx::query_as(&sql)
            .bind(filter.apartment_id)
            .bind(filter.year)
            .bind(filter.month)
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn sum_expenses(&self, filter: PeriodFilter) -> Result<ExpenseBreakdown, DatabaseError> {
        let sql = format!(
            "SELECT COALESCE(SUM(utilities), 0), COALESCE(SUM(gas), 0), \
             COALESCE(SUM(connectivity), 0), COALESCE(SUM(maintenance), 0) \
             FROM monthly_expenses WHERE {}",
            PERIOD_PREDICATE
        );
        let (utilities, gas, connectivity, maintenance): (Decimal, Decimal, Decimal, Decimal) = sqlx::query_as(&sql)
            .bind(filter.apartment_id)
            .bind(filter.year)
            .bind(filter.month)
            .fetch_one(&self.pool)
            .await?;
        Ok(ExpenseBreakdown { utilities, gas, connectivity, maintenance })
    }

    async fn sum_transactions(&self, kind: TransactionKind, range: DateRange) -> Result<Decimal, DatabaseError> {
        let (total,): (Decimal,) = sqlx::query_as(
            "SELECT COALESCE(SUM(amount), 0) FROM transactions \
             WHERE type = $1 AND ($2::date IS NULL OR date >= $2) AND ($3::date IS NULL OR date <= $3)",
        )
        .bind(kind.as_str())
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    async fn count_apartments_by_status(&self) -> Result<OccupancyCounts, DatabaseError> {
        let (occupied, vacant): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*) FILTER (WHERE status = $1), COUNT(*) FILTER (WHERE status = $2) FROM apartments",
        )
        .bind(ApartmentStatus::Occupied.as_str())
        .bind(ApartmentStatus::Vacant.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(OccupancyCounts { occupied, vacant })
    }
}
