pub mod apartment;
pub mod monthly_expense;
pub mod monthly_rent;
pub mod transaction;
pub mod user;

pub use apartment::{Apartment, ApartmentPatch, NewApartment};
pub use monthly_expense::{MonthlyExpense, MonthlyExpenseInput, MonthlyExpensePatch};
pub use monthly_rent::{MonthlyRent, MonthlyRentPatch, NewMonthlyRent};
pub use transaction::{NewTransaction, Transaction, TransactionPatch};
pub use user::{NewUser, User};

use serde::{Deserialize, Deserializer};

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
/// so partial updates can clear nullable columns without touching the others.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
