//! Shop server configuration

use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shop server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HS256 secret for bearer tokens
    pub jwt_secret: String,
    pub db_max_connections: u32,
    /// Upper bound on waiting for a product row lock during checkout
    pub lock_timeout: Duration,
    /// PromptPay QR images are served at `{base}/{order_id}.png`
    pub promptpay_qr_base_url: String,
    /// Card checkouts redirect to `{url}?order_id=..&amount=..`
    pub card_gateway_url: String,
    /// Emit JSON log lines instead of the pretty console format
    pub log_json: bool,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
        std::env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: Self::parsed("HTTP_PORT", 8080),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            db_max_connections: Self::parsed("DB_MAX_CONNECTIONS", 10),
            lock_timeout: Duration::from_millis(Self::parsed("LOCK_TIMEOUT_MS", 5000)),
            promptpay_qr_base_url: std::env::var("PROMPTPAY_QR_BASE_URL")
                .unwrap_or_else(|_| "https://pay.example.com/promptpay/qr".into()),
            card_gateway_url: std::env::var("CARD_GATEWAY_URL")
                .unwrap_or_else(|_| "https://pay.example.com/card/checkout".into()),
            log_json: Self::parsed("LOG_JSON", false),
            environment,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
