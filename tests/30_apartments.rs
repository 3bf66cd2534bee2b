mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn create_list_get() -> Result<()> {
    let server = common::TestServer::start().await?;
    let admin = server.admin().await?;

    let b = admin.create_apartment("B Unit", 5000.0, "occupied").await?;
    let a = admin.create_apartment("A Unit", 0.0, "vacant").await?;

    let (status, body) = admin.get("/api/apartments").await?;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .map(|rows| rows.iter().filter_map(|r| r["name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, vec!["A Unit", "B Unit"]);

    let (status, body) = admin.get(&format!("/api/apartments/{}", b)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalInvestment"].as_f64(), Some(5000.0));
    assert_eq!(body["data"]["rentalPrice"].as_f64(), Some(12000.0));
    assert_eq!(body["data"]["status"], "occupied");
    assert!(body["data"]["currentTenant"].is_null());

    let (status, _) = admin.get(&format!("/api/apartments/{}", a)).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn create_validates_fields() -> Result<()> {
    let server = common::TestServer::start().await?;
    let admin = server.admin().await?;

    let (status, body) = admin.post("/api/apartments", json!({ "name": "No address", "rentalPrice": 10 })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("address"));

    let (status, body) = admin
        .post(
            "/api/apartments",
            json!({ "name": "X", "address": "Y", "rentalPrice": 10, "totalInvestment": -1 }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["totalInvestment"].is_string());

    let (status, _) = admin
        .post("/api/apartments", json!({ "name": "X", "address": "Y", "rentalPrice": 10, "status": "haunted" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn patch_leaves_absent_fields_and_clears_nulls() -> Result<()> {
    let server = common::TestServer::start().await?;
    let admin = server.admin().await?;
    let id = admin.create_apartment("Unit", 1000.0, "vacant").await?;
    let path = format!("/api/apartments/{}", id);

    let (status, body) = admin
        .patch(&path, json!({ "status": "occupied", "currentTenant": "Dana", "leaseStartDate": "2024-01-01" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["currentTenant"], "Dana");
    assert_eq!(body["data"]["leaseStartDate"], "2024-01-01");

    // absent: unchanged
    let (_, body) = admin.patch(&path, json!({ "rentalPrice": 13000 })).await?;
    assert_eq!(body["data"]["currentTenant"], "Dana");
    assert_eq!(body["data"]["name"], "Unit");
    assert_eq!(body["data"]["rentalPrice"].as_f64(), Some(13000.0));

    // explicit null: cleared
    let (_, body) = admin.patch(&path, json!({ "currentTenant": null, "status": "vacant" })).await?;
    assert!(body["data"]["currentTenant"].is_null());
    assert_eq!(body["data"]["leaseStartDate"], "2024-01-01");

    let (status, _) = admin.patch(&path, json!({ "totalInvestment": -5 })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn missing_and_malformed_ids() -> Result<()> {
    let server = common::TestServer::start().await?;
    let admin = server.admin().await?;
    let ghost = "00000000-0000-4000-8000-000000000000";

    let (status, body) = admin.get(&format!("/api/apartments/{}", ghost)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = admin.patch(&format!("/api/apartments/{}", ghost), json!({ "name": "x" })).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = admin.delete(&format!("/api/apartments/{}", ghost)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = admin.get("/api/apartments/not-a-uuid").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn delete_cascades_to_ledger_rows() -> Result<()> {
    let server = common::TestServer::start().await?;
    let admin = server.admin().await?;
    let id = admin.create_apartment("Doomed", 1000.0, "occupied").await?;

    let rent = admin.add_rent(&id, 2024, 1, 500.0).await?;
    let expense = admin.settle_expenses(&id, 2024, 1, 80.0).await?;
    let (status, tx) = admin
        .post(
            "/api/transactions",
            json!({ "apartmentId": id, "type": "income", "category": "rent", "amount": 500, "date": "2024-01-05" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = admin.delete(&format!("/api/apartments/{}", id)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], true);

    for path in [
        format!("/api/monthly-rent/{}", rent["id"].as_str().unwrap_or_default()),
        format!("/api/monthly-expenses/{}", expense["id"].as_str().unwrap_or_default()),
        format!("/api/transactions/{}", tx["data"]["id"].as_str().unwrap_or_default()),
    ] {
        let (status, _) = admin.get(&path).await?;
        assert_eq!(status, StatusCode::NOT_FOUND, "{} survived", path);
    }
    Ok(())
}
