//! Contract checks for the Postgres backend. Skipped unless TEST_DATABASE_URL
//! points at a disposable database.

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use homes_ledger_api::config::AppConfig;
use homes_ledger_api::database::models::{MonthlyExpenseInput, NewApartment, NewMonthlyRent, NewTransaction, NewUser};
use homes_ledger_api::database::{DatabaseError, DatabaseManager, DateRange, LedgerStore, PeriodFilter, PgLedgerStore};
use homes_ledger_api::types::{ApartmentStatus, TransactionKind, UserRole};

async fn store() -> Result<Option<PgLedgerStore>> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping Postgres contract test");
        return Ok(None);
    };
    let mut config = AppConfig::from_env().database;
    config.url = Some(url);
    let pool = DatabaseManager::connect(&config).await?;
    DatabaseManager::bootstrap(&pool).await?;
    // Applying twice must be harmless
    DatabaseManager::bootstrap(&pool).await?;
    Ok(Some(PgLedgerStore::new(pool)))
}

fn apartment(name: &str, status: ApartmentStatus) -> NewApartment {
    NewApartment {
        name: name.to_string(),
        address: "1 Test Way".to_string(),
        rental_price: Decimal::from(1000),
        total_investment: Decimal::from(50000),
        status,
        current_tenant: None,
        lease_start_date: None,
        lease_end_date: None,
    }
}

#[tokio::test]
async fn postgres_store_honours_the_ledger_contract() -> Result<()> {
    let Some(store) = store().await? else {
        return Ok(());
    };
    store.ping().await?;

    let flat = store.create_apartment(apartment("Contract Flat", ApartmentStatus::Occupied)).await?;
    let filter = PeriodFilter::apartment(flat.id).with_year(Some(2024)).with_month(Some(5));

    // rent accumulates
    for amount in [300, 700] {
        store
            .insert_rent(NewMonthlyRent {
                apartment_id: flat.id,
                month: 5,
                year: 2024,
                amount: Decimal::from(amount),
                tenant_name: None,
                payment_note: None,
            })
            .await?;
    }
    assert_eq!(store.list_rent(filter).await?.len(), 2);
    assert_eq!(store.sum_rent(filter).await?, Decimal::from(1000));

    // expenses upsert in place
    let bill = |utilities: i64| MonthlyExpenseInput {
        apartment_id: flat.id,
        month: 5,
        year: 2024,
        utilities: Decimal::from(utilities),
        gas: Decimal::ZERO,
        connectivity: Decimal::ZERO,
        maintenance: Decimal::ZERO,
    };
    let first = store.upsert_expense(bill(100)).await?;
    let second = store.upsert_expense(bill(180)).await?;
    assert_eq!(first.id, second.id);
    assert_eq!(second.utilities, Decimal::from(180));
    assert_eq!(store.list_expenses(filter).await?.len(), 1);

    // foreign keys surface as NotFound
    let orphan = store
        .insert_rent(NewMonthlyRent {
            apartment_id: uuid::Uuid::new_v4(),
            month: 1,
            year: 2024,
            amount: Decimal::ONE,
            tenant_name: None,
            payment_note: None,
        })
        .await;
    assert!(matches!(orphan, Err(DatabaseError::NotFound(_))));

    // NUMERIC(12,2) overflow and CHECK violations are client errors
    let too_big = store
        .insert_rent(NewMonthlyRent {
            apartment_id: flat.id,
            month: 6,
            year: 2024,
            amount: Decimal::from(1_000_000_000_000i64),
            tenant_name: None,
            payment_note: None,
        })
        .await;
    assert!(matches!(too_big, Err(DatabaseError::InvalidValue(_))));
    let bad_month = store
        .insert_rent(NewMonthlyRent {
            apartment_id: flat.id,
            month: 13,
            year: 2024,
            amount: Decimal::ONE,
            tenant_name: None,
            payment_note: None,
        })
        .await;
    assert!(matches!(bad_month, Err(DatabaseError::InvalidValue(_))));

    let email = format!("contract-{}@example.com", uuid::Uuid::new_v4());
    let user = store
        .create_user(NewUser {
            email: email.clone(),
            password: "sha256$x$y".to_string(),
            role: UserRole::Admin,
            name: "Contract".to_string(),
        })
        .await?;
    let duplicate = store
        .create_user(NewUser {
            email,
            password: "sha256$x$y".to_string(),
            role: UserRole::Viewer,
            name: "Again".to_string(),
        })
        .await;
    assert!(matches!(duplicate, Err(DatabaseError::Conflict(_))));

    let day = NaiveDate::from_ymd_opt(1999, 1, 2).unwrap();
    store
        .create_transaction(NewTransaction {
            apartment_id: flat.id,
            kind: TransactionKind::Income,
            category: "rent".to_string(),
            amount: Decimal::from(42),
            description: String::new(),
            date: day,
            created_by: user.id,
        })
        .await?;
    let range = DateRange { start: Some(day), end: Some(day) };
    assert!(store.sum_transactions(TransactionKind::Income, range).await? >= Decimal::from(42));

    // deleting the apartment cascades to its ledgers
    assert!(store.delete_apartment(flat.id).await?);
    assert!(store.list_rent(PeriodFilter::apartment(flat.id)).await?.is_empty());
    assert!(store.list_expenses(PeriodFilter::apartment(flat.id)).await?.is_empty());
    assert!(store.list_transactions(Some(flat.id)).await?.is_empty());
    Ok(())
}
