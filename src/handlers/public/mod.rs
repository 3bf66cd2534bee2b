// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Service descriptor, health check and token acquisition.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::middleware::ApiResponse;

pub mod auth;

/// GET / - service descriptor
pub async fn root() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "name": "Homes Ledger API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Bookkeeping API for rental apartments: rent, expenses, transactions and KPIs",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "login": "/auth/login (public - token acquisition)",
            "auth": "/api/auth/whoami (protected)",
            "users": "/api/users (protected, admin)",
            "apartments": "/api/apartments[/:id[/financial-stats|/monthly-rent|/monthly-expenses]] (protected)",
            "monthly_rent": "/api/monthly-rent/:id (protected)",
            "monthly_expenses": "/api/monthly-expenses/:id (protected)",
            "transactions": "/api/transactions[/:id] (protected)",
            "financial_stats": "/api/financial-stats?year= (protected)",
            "kpis": "/api/kpis?startDate=&endDate= (protected)",
        }
    }))
}

/// GET /health - store connectivity check
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => ApiResponse::success(json!({
            "status": "ok",
            "timestamp": now,
            "database": "ok",
            "store": state.store.backend(),
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("Health check failed against {} store: {}", state.store.backend(), e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "store": state.store.backend(),
                    }
                })),
            )
                .into_response()
        }
    }
}
