use anyhow::Context;

use homes_ledger_api::{
    config::{self, DEVELOPMENT_JWT_SECRET},
    database, init_tracing, is_production, router,
    services::AccountService,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    init_tracing("info,tower_http=info");

    let config = config::config();
    tracing::info!("Starting Homes Ledger API in {:?} mode", config.environment);

    if let Err(problem) = config.validate() {
        anyhow::bail!("invalid configuration: {}", problem);
    }
    if !is_production!() && config.security.jwt_secret == DEVELOPMENT_JWT_SECRET {
        tracing::warn!("Signing sessions with the development JWT secret");
    }

    let store = database::open_store(&config.database)
        .await
        .context("failed to open the ledger store")?;
    let state = AppState::from_config(store, config).context("failed to set up sessions")?;
    tracing::info!(
        "Ledger store: {}, password scheme: {:?}",
        state.store.backend(),
        state.credentials.scheme()
    );

    if let Some(seed) = &config.security.seed_admin {
        AccountService::new(state.store.clone(), state.credentials.clone())
            .ensure_admin(seed)
            .await
            .context("failed to seed the admin account")?;
    }

    let app = router(state, config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Homes Ledger API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
