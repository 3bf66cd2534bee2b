use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{verifier_for, AuthError, CredentialVerifier, SessionIssuer};
use crate::config::{AppConfig, SecurityConfig};
use crate::database::store::LedgerStore;
use crate::handlers::{protected, public};
use crate::middleware::{require_admin_for_writes, require_session};
use crate::services::FinancialService;

/// Shared handles every handler receives
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LedgerStore>,
    pub sessions: Arc<SessionIssuer>,
    pub credentials: Arc<dyn CredentialVerifier>,
}

impl AppState {
    pub fn new(store: Arc<dyn LedgerStore>, sessions: SessionIssuer, credentials: Box<dyn CredentialVerifier>) -> Self {
        Self {
            store,
            sessions: Arc::new(sessions),
            credentials: Arc::from(credentials),
        }
    }

    pub fn from_config(store: Arc<dyn LedgerStore>, config: &AppConfig) -> Result<Self, AuthError> {
        Ok(Self::new(
            store,
            SessionIssuer::from_config(&config.security)?,
            verifier_for(config.security.password_scheme),
        ))
    }

    pub fn financials(&self) -> FinancialService {
        FinancialService::new(self.store.clone())
    }
}

/// Full application router with the configured global layers
pub fn router(state: AppState, config: &AppConfig) -> Router {
    let mut app = Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        app = app.layer(cors_layer(&config.security));
    }
    if config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    app.with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/auth/login", post(public::auth::login))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{apartments, auth, monthly_expenses, monthly_rent, stats, transactions, users};

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami))
        .route("/api/users", get(users::list))
        // Apartments
        .route("/api/apartments", get(apartments::list).post(apartments::create))
        .route(
            "/api/apartments/:id",
            get(apartments::get).patch(apartments::update).delete(apartments::delete),
        )
        .route("/api/apartments/:id/financial-stats", get(apartments::financial_stats))
        // Monthly rent
        .route(
            "/api/apartments/:id/monthly-rent",
            get(monthly_rent::list).post(monthly_rent::create),
        )
        .route(
            "/api/monthly-rent/:id",
            get(monthly_rent::get).patch(monthly_rent::update).delete(monthly_rent::delete),
        )
        // Monthly expenses
        .route(
            "/api/apartments/:id/monthly-expenses",
            get(monthly_expenses::list)
                .post(monthly_expenses::upsert)
                .delete(monthly_expenses::delete_for_month),
        )
        .route(
            "/api/monthly-expenses/:id",
            get(monthly_expenses::get)
                .patch(monthly_expenses::update)
                .delete(monthly_expenses::delete),
        )
        // Transactions
        .route("/api/transactions", get(transactions::list).post(transactions::create))
        .route(
            "/api/transactions/:id",
            get(transactions::get).patch(transactions::update).delete(transactions::delete),
        )
        // Aggregates
        .route("/api/financial-stats", get(stats::portfolio))
        .route("/api/kpis", get(stats::kpis))
        // Layers run bottom-up: session first, then the role check
        .route_layer(middleware::from_fn(require_admin_for_writes))
        .route_layer(middleware::from_fn_with_state(state, require_session))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
