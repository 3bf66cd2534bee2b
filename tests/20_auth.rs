mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::{ADMIN_EMAIL, VIEWER_EMAIL};

#[tokio::test]
async fn login_issues_token_without_password() -> Result<()> {
    let server = common::TestServer::start().await?;
    let (status, body) = server
        .anonymous()
        .post("/auth/login", json!({ "email": ADMIN_EMAIL, "password": common::ADMIN_PASSWORD }))
        .await?;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(body["data"]["expires_in"].as_i64().is_some_and(|s| s > 0));
    assert_eq!(body["data"]["user"]["email"], ADMIN_EMAIL);
    assert_eq!(body["data"]["user"]["role"], "admin");
    assert!(body["data"]["user"].get("password").is_none());
    Ok(())
}

#[tokio::test]
async fn login_rejects_bad_credentials_uniformly() -> Result<()> {
    let server = common::TestServer::start().await?;
    let anonymous = server.anonymous();

    let (wrong_password, a) = anonymous
        .post("/auth/login", json!({ "email": ADMIN_EMAIL, "password": "nope" }))
        .await?;
    let (unknown_user, b) = anonymous
        .post("/auth/login", json!({ "email": "ghost@example.com", "password": "nope" }))
        .await?;

    assert_eq!(wrong_password, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user, StatusCode::UNAUTHORIZED);
    assert_eq!(a["error"], b["error"]);
    Ok(())
}

#[tokio::test]
async fn login_names_missing_field() -> Result<()> {
    let server = common::TestServer::start().await?;
    let (status, body) = server.anonymous().post("/auth/login", json!({ "email": ADMIN_EMAIL })).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("password"));
    assert!(body["field_errors"]["password"].is_string());
    Ok(())
}

#[tokio::test]
async fn whoami_reflects_session_user() -> Result<()> {
    let server = common::TestServer::start().await?;
    let viewer = server.viewer().await?;

    let (status, body) = viewer.get("/api/auth/whoami").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], VIEWER_EMAIL);
    assert_eq!(body["data"]["role"], "viewer");
    Ok(())
}

#[tokio::test]
async fn viewers_read_but_cannot_write() -> Result<()> {
    let server = common::TestServer::start().await?;
    let admin = server.admin().await?;
    let viewer = server.viewer().await?;
    let id = admin.create_apartment("Unit A", 1000.0, "vacant").await?;

    let (status, _) = viewer.get(&format!("/api/apartments/{}", id)).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = viewer.patch(&format!("/api/apartments/{}", id), json!({ "name": "Mine" })).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = viewer.delete(&format!("/api/apartments/{}", id)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = viewer.get("/api/users").await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = admin.get("/api/users").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    Ok(())
}
