use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info, warn};

use preskriptor::adapters::ai::{OpenAIAssistantDirectory, OpenAIConfig};
use preskriptor::adapters::http::server::{build_app, serve};
use preskriptor::adapters::http::AppState;
use preskriptor::adapters::memory::{
    InMemoryAssistantDirectory, InMemoryModuleRepository, InMemoryPrescriptionWidget,
    InMemorySubscriptionRepository,
};
use preskriptor::adapters::postgres::{PostgresModuleRepository, PostgresSubscriptionRepository};
use preskriptor::adapters::stripe::{MockCheckoutProvider, StripeCheckoutAdapter, StripeConfig};
use preskriptor::application::SubscriptionStateCache;
use preskriptor::config::AppConfig;
use preskriptor::ports::{AssistantDirectory, CheckoutProvider, ModuleRepository, SubscriptionRepository};
use preskriptor::telemetry::init_tracing;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        error!("preskriptor exited with error: {:#}", err);
        eprintln!("preskriptor exited with error: {:#}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    init_tracing(&config.server).context("installing tracing subscriber")?;
    config.validate().context("validating configuration")?;
    info!(environment = ?config.server.environment, "configuration loaded");

    let state = build_state(&config).await?;
    let app = build_app(state, &config.server);
    serve(app, config.server.socket_addr()?).await?;

    info!("server stopped");
    Ok(())
}

async fn build_state(config: &AppConfig) -> Result<AppState> {
    let (subscriptions, modules): (Arc<dyn SubscriptionRepository>, Arc<dyn ModuleRepository>) =
        match config.database.url() {
            Some(url) => {
                let pool = PgPoolOptions::new()
                    .min_connections(config.database.min_connections)
                    .max_connections(config.database.max_connections)
                    .acquire_timeout(config.database.acquire_timeout())
                    .connect(url)
                    .await
                    .context("connecting to PostgreSQL")?;
                if config.database.run_migrations {
                    sqlx::migrate!("./migrations")
                        .run(&pool)
                        .await
                        .context("running migrations")?;
                }
                info!("using PostgreSQL stores");
                (
                    Arc::new(PostgresSubscriptionRepository::new(pool.clone())),
                    Arc::new(PostgresModuleRepository::new(pool)),
                )
            }
            None => {
                warn!("no database URL configured, using in-memory stores");
                (
                    Arc::new(InMemorySubscriptionRepository::new()),
                    Arc::new(InMemoryModuleRepository::new()),
                )
            }
        };

    let payment = &config.payment;
    let checkout: Arc<dyn CheckoutProvider> =
        match (payment.stripe_api_key(), payment.stripe_webhook_secret()) {
            (Some(key), Some(secret)) => {
                info!(test_mode = payment.is_test_mode(), "using Stripe checkout");
                Arc::new(StripeCheckoutAdapter::new(
                    StripeConfig::new(key, secret).with_require_livemode(payment.require_livemode),
                ))
            }
            _ => {
                warn!("no Stripe credentials configured, using mock checkout");
                Arc::new(MockCheckoutProvider::new())
            }
        };

    let assistants: Arc<dyn AssistantDirectory> = match config.ai.openai_api_key() {
        Some(key) => Arc::new(OpenAIAssistantDirectory::new(
            OpenAIConfig::new(key)
                .with_base_url(&config.ai.openai_base_url)
                .with_timeout(config.ai.timeout())
                .with_max_retries(config.ai.max_retries),
        )),
        None => {
            warn!("no OpenAI key configured, assistant directory is empty");
            Arc::new(InMemoryAssistantDirectory::new())
        }
    };

    Ok(AppState {
        subscriptions,
        modules,
        checkout,
        assistants,
        prescriptions: Arc::new(InMemoryPrescriptionWidget::new()),
        catalog: Arc::new(payment.plan_catalog()?),
        cache: SubscriptionStateCache::with_limits(
            config.store.cache_capacity,
            config.store.cache_ttl(),
        ),
        checkout_urls: payment.checkout_urls(),
        fetch_timeout: config.store.fetch_timeout(),
    })
}
