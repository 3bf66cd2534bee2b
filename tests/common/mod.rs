#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use homes_ledger_api::config::{AppConfig, StoreBackend};
use homes_ledger_api::database::{LedgerStore, MemoryLedgerStore};
use homes_ledger_api::services::AccountService;
use homes_ledger_api::types::UserRole;
use homes_ledger_api::{router, AppState};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const VIEWER_EMAIL: &str = "viewer@example.com";
pub const VIEWER_PASSWORD: &str = "viewer123";

/// In-process server on a free port, backed by a fresh in-memory store.
/// Lives as long as the test's runtime.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub store: Arc<dyn LedgerStore>,
    client: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::from_env();
        config.database.backend = StoreBackend::Memory;
        config.api.port = port;
        config.api.enable_request_logging = false;
        config.security.jwt_secret = "integration-test-secret".to_string();

        let store: Arc<dyn LedgerStore> = Arc::new(MemoryLedgerStore::new());
        let state = AppState::from_config(store.clone(), &config)?;

        let accounts = AccountService::new(store.clone(), state.credentials.clone());
        accounts.create(ADMIN_EMAIL, ADMIN_PASSWORD, UserRole::Admin, "Admin User").await?;
        accounts.create(VIEWER_EMAIL, VIEWER_PASSWORD, UserRole::Viewer, "Viewer User").await?;

        let app = router(state, &config);
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let server = Self { port, base_url, store, client: reqwest::Client::new() };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(format!("{}/health", self.base_url)).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    /// Unauthenticated client
    pub fn anonymous(&self) -> Api {
        Api { base_url: self.base_url.clone(), client: self.client.clone(), token: None }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Api> {
        let (status, body) = self
            .anonymous()
            .post("/auth/login", json!({ "email": email, "password": password }))
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed with {}: {}", status, body);
        let token = body["data"]["token"].as_str().context("token missing from login response")?;
        Ok(Api { base_url: self.base_url.clone(), client: self.client.clone(), token: Some(token.to_string()) })
    }

    pub async fn admin(&self) -> Result<Api> {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    pub async fn viewer(&self) -> Result<Api> {
        self.login(VIEWER_EMAIL, VIEWER_PASSWORD).await
    }
}

/// JSON client; every call returns the status and the parsed body
pub struct Api {
    base_url: String,
    client: reqwest::Client,
    token: Option<String>,
}

impl Api {
    pub fn with_token(&self, token: &str) -> Api {
        Api { base_url: self.base_url.clone(), client: self.client.clone(), token: Some(token.to_string()) }
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<(StatusCode, Value)> {
        let req = match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        };
        let res = req.send().await?;
        let status = res.status();
        let body = res.json::<Value>().await.unwrap_or(Value::Null);
        Ok((status, body))
    }

    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        self.send(self.client.get(format!("{}{}", self.base_url, path))).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(self.client.post(format!("{}{}", self.base_url, path)).json(&body)).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(self.client.patch(format!("{}{}", self.base_url, path)).json(&body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<(StatusCode, Value)> {
        self.send(self.client.delete(format!("{}{}", self.base_url, path))).await
    }

    /// Creates an apartment and returns its id
    pub async fn create_apartment(&self, name: &str, investment: f64, status: &str) -> Result<String> {
        let (code, body) = self
            .post(
                "/api/apartments",
                json!({
                    "name": name,
                    "address": format!("{} Main St", name),
                    "rentalPrice": 12000,
                    "totalInvestment": investment,
                    "status": status,
                }),
            )
            .await?;
        anyhow::ensure!(code == StatusCode::CREATED, "create apartment failed with {}: {}", code, body);
        Ok(body["data"]["id"].as_str().context("apartment id missing")?.to_string())
    }

    pub async fn add_rent(&self, apartment_id: &str, year: i32, month: i32, amount: f64) -> Result<Value> {
        let (code, body) = self
            .post(
                &format!("/api/apartments/{}/monthly-rent", apartment_id),
                json!({ "year": year, "month": month, "amount": amount }),
            )
            .await?;
        anyhow::ensure!(code == StatusCode::CREATED, "add rent failed with {}: {}", code, body);
        Ok(body["data"].clone())
    }

    pub async fn settle_expenses(&self, apartment_id: &str, year: i32, month: i32, utilities: f64) -> Result<Value> {
        let (code, body) = self
            .post(
                &format!("/api/apartments/{}/monthly-expenses", apartment_id),
                json!({ "year": year, "month": month, "utilities": utilities }),
            )
            .await?;
        anyhow::ensure!(code == StatusCode::CREATED, "settle expenses failed with {}: {}", code, body);
        Ok(body["data"].clone())
    }
}
