mod common;

use anyhow::Result;
use chrono::Datelike;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn apartment_recovery_example() -> Result<()> {
    let server = common::TestServer::start().await?;
    let admin = server.admin().await?;
    let id = admin.create_apartment("Unit", 100000.0, "occupied").await?;

    // 60000 rent and 20000 expenses spread over several years
    admin.add_rent(&id, 2022, 1, 20000.0).await?;
    admin.add_rent(&id, 2023, 1, 20000.0).await?;
    admin.add_rent(&id, 2024, 1, 20000.0).await?;
    admin.settle_expenses(&id, 2023, 1, 15000.0).await?;
    admin.settle_expenses(&id, 2024, 2, 5000.0).await?;

    let (status, body) = admin.get(&format!("/api/apartments/{}/financial-stats", id)).await?;
    assert_eq!(status, StatusCode::OK);
    let stats = &body["data"];
    assert_eq!(stats["apartmentId"], id);
    assert_eq!(stats["totalInvestment"].as_f64(), Some(100000.0));
    assert_eq!(stats["allTimeRent"].as_f64(), Some(60000.0));
    assert_eq!(stats["allTimeExpenses"].as_f64(), Some(20000.0));
    assert_eq!(stats["allTimeNetEarnings"].as_f64(), Some(40000.0));
    assert_eq!(stats["remainingInvestment"].as_f64(), Some(60000.0));
    assert_eq!(stats["recoveryPercentage"].as_f64(), Some(40.0));
    Ok(())
}

#[tokio::test]
async fn fresh_apartment_has_nothing_recovered() -> Result<()> {
    let server = common::TestServer::start().await?;
    let admin = server.admin().await?;
    let id = admin.create_apartment("Unit", 50000.0, "vacant").await?;

    let (_, body) = admin.get(&format!("/api/apartments/{}/financial-stats", id)).await?;
    assert_eq!(body["data"]["allTimeNetEarnings"].as_f64(), Some(0.0));
    assert_eq!(body["data"]["recoveryPercentage"].as_f64(), Some(0.0));
    assert_eq!(body["data"]["remainingInvestment"].as_f64(), Some(50000.0));

    let ghost = "00000000-0000-4000-8000-000000000000";
    let (status, _) = admin.get(&format!("/api/apartments/{}/financial-stats", ghost)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn portfolio_is_scoped_to_the_year() -> Result<()> {
    let server = common::TestServer::start().await?;
    let admin = server.admin().await?;
    let a = admin.create_apartment("A", 60000.0, "occupied").await?;
    let b = admin.create_apartment("B", 40000.0, "occupied").await?;

    admin.add_rent(&a, 2024, 1, 5000.0).await?;
    admin.add_rent(&b, 2024, 1, 7000.0).await?;
    admin.settle_expenses(&a, 2024, 1, 1000.0).await?;
    admin.settle_expenses(&b, 2024, 1, 2000.0).await?;
    admin.add_rent(&a, 2023, 12, 3000.0).await?;
    admin.settle_expenses(&b, 2025, 1, 700.0).await?;

    let (status, body) = admin.get("/api/financial-stats?year=2024").await?;
    assert_eq!(status, StatusCode::OK);
    let stats = &body["data"];
    assert_eq!(stats["year"], 2024);
    assert_eq!(stats["totalMonthlyRent"].as_f64(), Some(12000.0));
    assert_eq!(stats["totalMonthlyExpenses"].as_f64(), Some(3000.0));
    assert_eq!(stats["netProfit"].as_f64(), Some(9000.0));
    assert_eq!(stats["roi"].as_f64(), Some(9.0));
    assert_eq!(stats["avgMonthlyRent"].as_f64(), Some(1000.0));
    assert_eq!(stats["avgMonthlyExpenses"].as_f64(), Some(250.0));
    assert_eq!(stats["totalInvestment"].as_f64(), Some(100000.0));
    assert_eq!(stats["allTimeRent"].as_f64(), Some(15000.0));
    assert_eq!(stats["allTimeExpenses"].as_f64(), Some(3700.0));

    let (_, other) = admin.get("/api/financial-stats?year=2023").await?;
    assert_eq!(other["data"]["netProfit"].as_f64(), Some(3000.0));
    Ok(())
}

#[tokio::test]
async fn portfolio_defaults_to_current_year() -> Result<()> {
    let server = common::TestServer::start().await?;
    let admin = server.admin().await?;

    let (status, body) = admin.get("/api/financial-stats").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["year"].as_i64(), Some(chrono::Utc::now().year() as i64));
    assert_eq!(body["data"]["roi"].as_f64(), Some(0.0));

    let (status, _) = admin.get("/api/financial-stats?year=soon").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn kpis_cover_transactions_and_occupancy() -> Result<()> {
    let server = common::TestServer::start().await?;
    let admin = server.admin().await?;
    let a = admin.create_apartment("A", 1.0, "occupied").await?;
    admin.create_apartment("B", 1.0, "occupied").await?;
    admin.create_apartment("C", 1.0, "occupied").await?;
    admin.create_apartment("D", 1.0, "vacant").await?;

    for (kind, amount, date) in [
        ("income", 1000, "2024-01-15"),
        ("income", 500, "2024-03-01"),
        ("expense", 200, "2024-01-20"),
        ("expense", 100, "2023-12-31"),
    ] {
        let (status, _) = admin
            .post(
                "/api/transactions",
                json!({ "apartmentId": a, "type": kind, "category": "misc", "amount": amount, "date": date }),
            )
            .await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = admin.get("/api/kpis").await?;
    assert_eq!(status, StatusCode::OK);
    let kpis = &body["data"];
    assert_eq!(kpis["occupancyRate"].as_f64(), Some(75.0));
    assert_eq!(kpis["totalRevenue"].as_f64(), Some(1500.0));
    assert_eq!(kpis["totalExpenses"].as_f64(), Some(300.0));
    assert_eq!(kpis["netProfit"].as_f64(), Some(1200.0));
    assert_eq!(kpis["period"], "All Time");

    let (_, body) = admin.get("/api/kpis?startDate=2024-01-01&endDate=2024-01-31").await?;
    assert_eq!(body["data"]["totalRevenue"].as_f64(), Some(1000.0));
    assert_eq!(body["data"]["totalExpenses"].as_f64(), Some(200.0));
    assert_eq!(body["data"]["period"], "2024-01-01 - 2024-01-31");

    let (_, body) = admin.get("/api/kpis?startDate=2024-02-01").await?;
    assert_eq!(body["data"]["totalRevenue"].as_f64(), Some(500.0));
    assert_eq!(body["data"]["period"], "Since 2024-02-01");

    let (status, _) = admin.get("/api/kpis?startDate=01/01/2024").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = admin.get("/api/kpis?startDate=2024-02-01&endDate=2024-01-01").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn kpis_with_no_apartments() -> Result<()> {
    let server = common::TestServer::start().await?;
    let viewer = server.viewer().await?;

    let (status, body) = viewer.get("/api/kpis").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["occupancyRate"].as_f64(), Some(0.0));
    Ok(())
}
