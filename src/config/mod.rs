//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `PRESKRIPTOR` prefix
//! and nested values are separated by double underscores.
//!
//! Every section has defaults, so an empty environment yields a runnable
//! development setup: in-memory stores, mock checkout, in-memory assistant
//! directory.
//!
//! # Example
//!
//! ```no_run
//! use preskriptor::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod database;
mod error;
mod payment;
mod server;
mod store;

pub use ai::AiConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};
pub use store::StoreConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL; absent means in-memory stores
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Stripe checkout and the plan price table
    #[serde(default)]
    pub payment: PaymentConfig,

    /// OpenAI assistant directory
    #[serde(default)]
    pub ai: AiConfig,

    /// Store read timeouts
    #[serde(default)]
    pub store: StoreConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` if present (development)
    /// 2. Reads variables with the `PRESKRIPTOR` prefix
    /// 3. Splits nested keys on `__`
    ///
    /// - `PRESKRIPTOR__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PRESKRIPTOR__PAYMENT__STRIPE_API_KEY=sk_...` -> `payment.stripe_api_key`
    /// - `PRESKRIPTOR__STORE__FETCH_TIMEOUT_MS=3000` -> `store.fetch_timeout_ms`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PRESKRIPTOR")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic validation of every section.
    ///
    /// Production must talk to real Stripe: the mock checkout provider can
    /// never mark a session paid, so running it there would take orders that
    /// can never complete.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.payment.validate()?;
        self.store.validate()?;

        if self.is_production() {
            if self.payment.stripe_api_key().is_none() {
                return Err(ValidationError::MissingRequired("STRIPE_API_KEY"));
            }
            if self.payment.stripe_webhook_secret().is_none() {
                return Err(ValidationError::MissingRequired("STRIPE_WEBHOOK_SECRET"));
            }
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 5] = [
        "PRESKRIPTOR__SERVER__PORT",
        "PRESKRIPTOR__SERVER__ENVIRONMENT",
        "PRESKRIPTOR__DATABASE__URL",
        "PRESKRIPTOR__PAYMENT__PREMIUM_MONTHLY_PRICE_ID",
        "PRESKRIPTOR__STORE__FETCH_TIMEOUT_MS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_empty_environment_loads_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config.server.port, 8080);
        assert!(config.database.url().is_none());
        assert!(config.payment.stripe_api_key().is_none());
        assert_eq!(config.store.fetch_timeout_ms, 3000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("PRESKRIPTOR__SERVER__PORT", "3000");
        env::set_var("PRESKRIPTOR__SERVER__ENVIRONMENT", "production");
        env::set_var("PRESKRIPTOR__DATABASE__URL", "postgres://localhost/preskriptor");
        env::set_var("PRESKRIPTOR__PAYMENT__PREMIUM_MONTHLY_PRICE_ID", "price_premium");
        env::set_var("PRESKRIPTOR__STORE__FETCH_TIMEOUT_MS", "1500");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.is_production());
        assert_eq!(config.database.url(), Some("postgres://localhost/preskriptor"));
        assert_eq!(config.payment.premium_monthly_price_id.as_deref(), Some("price_premium"));
        assert_eq!(config.store.fetch_timeout_ms, 1500);
    }

    fn production() -> AppConfig {
        AppConfig {
            server: ServerConfig {
                environment: Environment::Production,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_production_requires_stripe_credentials() {
        let config = production();
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("STRIPE_API_KEY"))
        );
    }

    #[test]
    fn test_production_requires_webhook_secret() {
        let mut config = production();
        config.payment.stripe_api_key = Some("sk_live_abc".to_string());
        // the payment section itself catches a key without a secret
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("STRIPE_WEBHOOK_SECRET"))
        );
    }

    #[test]
    fn test_production_with_stripe_credentials_is_valid() {
        let mut config = production();
        config.payment.stripe_api_key = Some("sk_live_abc".to_string());
        config.payment.stripe_webhook_secret = Some("whsec_abc".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_development_may_run_without_stripe() {
        assert!(AppConfig::default().validate().is_ok());
    }
}
