use std::sync::Arc;

use shop_server::auth::JwtService;
use shop_server::checkout::PaymentRouter;
use shop_server::db::PgStore;
use shop_server::{AppState, Config, api, logger};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    logger::init_logger(logger::DEFAULT_FILTER, config.log_json)?;

    tracing::info!(
        environment = %config.environment,
        port = config.http_port,
        "Starting shop-server"
    );
    if config.is_development() {
        tracing::warn!("Running in development mode; secrets may be placeholders");
    }

    let store = PgStore::connect(
        &config.database_url,
        config.db_max_connections,
        config.lock_timeout,
    )
    .await?;

    let state = AppState::new(
        Arc::new(store),
        PaymentRouter::new(&config.promptpay_qr_base_url, &config.card_gateway_url),
        JwtService::new(&config.jwt_secret),
    );
    let app = api::create_router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "HTTP server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
