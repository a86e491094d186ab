use sqlx::PgPool;
use stratos_core::config::Settings;
use stratos_core::ingest::source_from_settings;
use stratos_core::recommendation::FallbackRecommender;
use stratos_api::{build_router, AppState, DEFAULT_CORS_ORIGIN};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let pool = connect_or_degrade(&settings).await;
    let source = source_from_settings(&settings)?;
    let recommender = FallbackRecommender::from_settings(&settings)?;

    tracing::info!(
        source = source.name(),
        recommender = %recommender.strategy_name(),
        database = pool.is_some(),
        "api configured"
    );

    let cors_origin =
        std::env::var("CORS_ALLOW_ORIGIN").unwrap_or_else(|_| DEFAULT_CORS_ORIGIN.to_string());
    let app = build_router(AppState::new(pool, source, recommender), &cors_origin)?;

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Stock and analysis routes keep working without a database, so connection or migration
/// failures only disable the storage routes.
async fn connect_or_degrade(settings: &Settings) -> Option<PgPool> {
    let db_url = match settings.require_database_url() {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(error = %e, "starting API without storage routes");
            return None;
        }
    };

    let pool = match stratos_core::storage::connect(db_url).await {
        Ok(pool) => pool,
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %format!("{e:#}"), "db connect failed; starting API in degraded mode");
            return None;
        }
    };

    match stratos_core::storage::migrate(&pool).await {
        Ok(()) => Some(pool),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %format!("{e:#}"), "db migrations failed; starting API in degraded mode");
            None
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
