use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::store::{DateRange, ExpenseBreakdown, LedgerStore, OccupancyCounts, PeriodFilter};
use crate::types::TransactionKind;

/// Divisor for the yearly averages. Months without rows count as zero.
pub const MONTHS_PER_YEAR: i64 = 12;

#[derive(Debug, thiserror::Error)]
pub enum FinancialError {
    #[error("Apartment not found: {0}")]
    ApartmentNotFound(Uuid),
    #[error("Arithmetic overflow computing {0}")]
    Overflow(&'static str),
    #[error(transparent)]
    Store(#[from] DatabaseError),
}

/// `part / whole * 100`, or zero when `whole` is not positive. `None` on overflow.
pub fn percentage(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole > Decimal::ZERO {
        part.checked_mul(Decimal::ONE_HUNDRED)?.checked_div(whole)
    } else {
        Some(Decimal::ZERO)
    }
}

fn difference(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal, FinancialError> {
    a.checked_sub(b).ok_or(FinancialError::Overflow(what))
}

/// All-time recovery figures shared by the apartment and portfolio views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recovery {
    pub total_investment: Decimal,
    pub all_time_rent: Decimal,
    pub all_time_expenses: Decimal,
    pub all_time_net_earnings: Decimal,
    pub remaining_investment: Decimal,
    /// Not clamped; exceeds 100 once earnings pass the investment
    pub recovery_percentage: Decimal,
}

impl Recovery {
    pub fn compute(
        total_investment: Decimal,
        all_time_rent: Decimal,
        all_time_expenses: Decimal,
    ) -> Result<Self, FinancialError> {
        let all_time_net_earnings = difference(all_time_rent, all_time_expenses, "net earnings")?;
        Ok(Self {
            total_investment,
            all_time_rent,
            all_time_expenses,
            all_time_net_earnings,
            remaining_investment: difference(total_investment, all_time_net_earnings, "remaining investment")?,
            recovery_percentage: percentage(all_time_net_earnings, total_investment)
                .ok_or(FinancialError::Overflow("recovery percentage"))?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApartmentFinancials {
    pub apartment_id: Uuid,
    #[serde(flatten)]
    pub recovery: Recovery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioFinancials {
    #[serde(flatten)]
    pub recovery: Recovery,
    pub total_monthly_rent: Decimal,
    pub total_monthly_expenses: Decimal,
    pub net_profit: Decimal,
    pub roi: Decimal,
    pub avg_monthly_rent: Decimal,
    pub avg_monthly_expenses: Decimal,
    pub year: i32,
}

impl PortfolioFinancials {
    pub fn compute(
        recovery: Recovery,
        year: i32,
        year_rent: Decimal,
        year_expenses: Decimal,
    ) -> Result<Self, FinancialError> {
        let net_profit = difference(year_rent, year_expenses, "net profit")?;
        let months = Decimal::from(MONTHS_PER_YEAR);
        Ok(Self {
            roi: percentage(net_profit, recovery.total_investment).ok_or(FinancialError::Overflow("roi"))?,
            recovery,
            total_monthly_rent: year_rent,
            total_monthly_expenses: year_expenses,
            net_profit,
            avg_monthly_rent: year_rent / months,
            avg_monthly_expenses: year_expenses / months,
            year,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSummary {
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub net_profit: Decimal,
    pub occupancy_rate: Decimal,
    pub period: String,
}

impl KpiSummary {
    pub fn compute(
        revenue: Decimal,
        expenses: Decimal,
        occupancy: OccupancyCounts,
        range: &DateRange,
    ) -> Result<Self, FinancialError> {
        Ok(Self {
            total_revenue: revenue,
            total_expenses: expenses,
            net_profit: difference(revenue, expenses, "net profit")?,
            occupancy_rate: percentage(Decimal::from(occupancy.occupied), Decimal::from(occupancy.total()))
                .ok_or(FinancialError::Overflow("occupancy rate"))?,
            period: period_label(range),
        })
    }
}

pub fn period_label(range: &DateRange) -> String {
    let fmt = |d: NaiveDate| d.format("%Y-%m-%d").to_string();
    match (range.start, range.end) {
        (Some(start), Some(end)) => format!("{} - {}", fmt(start), fmt(end)),
        (Some(start), None) => format!("Since {}", fmt(start)),
        (None, Some(end)) => format!("Through {}", fmt(end)),
        (None, None) => "All Time".to_string(),
    }
}

/// Read-only aggregation over a `LedgerStore`.
///
/// Every call recomputes from source rows. The sums a figure depends on are
/// gathered concurrently and the call fails as a whole if any of them fails.
#[derive(Clone)]
pub struct FinancialService {
    store: Arc<dyn LedgerStore>,
}

impl FinancialService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    pub async fn apartment(&self, apartment_id: Uuid) -> Result<ApartmentFinancials, FinancialError> {
        let filter = PeriodFilter::apartment(apartment_id);
        let (apartment, rent, expenses) = futures::try_join!(
            self.store.find_apartment(apartment_id),
            self.store.sum_rent(filter),
            self.store.sum_expenses(filter),
        )?;
        let apartment = apartment.ok_or(FinancialError::ApartmentNotFound(apartment_id))?;

        debug!("Computed financials for apartment {}", apartment_id);
        Ok(ApartmentFinancials {
            apartment_id,
            recovery: Recovery::compute(apartment.total_investment, rent, expense_total(&expenses)?)?,
        })
    }

    pub async fn portfolio(&self, year: i32) -> Result<PortfolioFinancials, FinancialError> {
        let (investment, all_rent, all_expenses, year_rent, year_expenses): (
            Decimal,
            Decimal,
            ExpenseBreakdown,
            Decimal,
            ExpenseBreakdown,
        ) = futures::try_join!(
            self.store.sum_investment(),
            self.store.sum_rent(PeriodFilter::all()),
            self.store.sum_expenses(PeriodFilter::all()),
            self.store.sum_rent(PeriodFilter::year(year)),
            self.store.sum_expenses(PeriodFilter::year(year)),
        )?;

        let recovery = Recovery::compute(investment, all_rent, expense_total(&all_expenses)?)?;
        PortfolioFinancials::compute(recovery, year, year_rent, expense_total(&year_expenses)?)
    }

    pub async fn kpis(&self, range: DateRange) -> Result<KpiSummary, FinancialError> {
        let (revenue, expenses, occupancy) = futures::try_join!(
            self.store.sum_transactions(TransactionKind::Income, range),
            self.store.sum_transactions(TransactionKind::Expense, range),
            self.store.count_apartments_by_status(),
        )?;
        KpiSummary::compute(revenue, expenses, occupancy, &range)
    }
}

fn expense_total(breakdown: &ExpenseBreakdown) -> Result<Decimal, FinancialError> {
    breakdown.total().ok_or(FinancialError::Overflow("expense total"))
}
