use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use stratos_core::config::Settings;
use stratos_core::domain::stock::ScreeningCriteria;
use stratos_core::ingest::universe::conservative_universe;
use stratos_core::ingest::{fetch_many, source_from_settings};
use stratos_core::screening;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "stratos_worker")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Evaluate every active alert against a fresh price and mark new triggers.
    CheckAlerts {
        /// Evaluate and report without writing trigger state.
        #[arg(long)]
        dry_run: bool,
    },
    /// Screen the conservative universe and print matches as JSON.
    Screen {
        /// Fill unset thresholds from the conservative defaults.
        #[arg(long)]
        use_defaults: bool,

        #[arg(long)]
        sector: Option<String>,

        /// Start from saved preferences (requires DATABASE_URL).
        #[arg(long)]
        preferences: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let result = match args.command {
        Command::CheckAlerts { dry_run } => check_alerts(&settings, dry_run).await,
        Command::Screen {
            use_defaults,
            sector,
            preferences,
        } => screen(&settings, use_defaults, sector, preferences).await,
    };

    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %format!("{err:#}"), "worker run failed");
    }
    result
}

async fn connect(settings: &Settings) -> anyhow::Result<sqlx::PgPool> {
    let pool = stratos_core::storage::connect(settings.require_database_url()?).await?;
    stratos_core::storage::migrate(&pool).await?;
    Ok(pool)
}

async fn check_alerts(settings: &Settings, dry_run: bool) -> anyhow::Result<()> {
    let pool = connect(settings).await?;
    let source = source_from_settings(settings)?;

    let checks =
        stratos_core::alerts::check_active_alerts(&pool, source.as_ref(), !dry_run).await?;

    let triggered = checks.iter().filter(|c| c.should_trigger).count();
    let unpriced = checks.iter().filter(|c| c.current_price.is_none()).count();
    for check in checks.iter().filter(|c| c.should_trigger) {
        tracing::info!(
            alert_id = %check.alert.id,
            symbol = %check.alert.symbol,
            dry_run,
            message = %check.message,
            "alert condition met"
        );
    }
    tracing::info!(
        checked = checks.len(),
        triggered,
        unpriced,
        dry_run,
        "alert check finished"
    );

    println!(
        "{}",
        serde_json::to_string_pretty(&checks).context("serialize alert checks failed")?
    );
    Ok(())
}

async fn screen(
    settings: &Settings,
    use_defaults: bool,
    sector: Option<String>,
    preferences: Option<String>,
) -> anyhow::Result<()> {
    let mut criteria = match preferences.as_deref() {
        Some(name) => {
            let pool = connect(settings).await?;
            let prefs =
                stratos_core::storage::preferences::get_or_create_default(&pool, name).await?;
            ScreeningCriteria::from(&prefs)
        }
        None => ScreeningCriteria::default(),
    };
    if let Some(sector) = sector.filter(|s| !s.trim().is_empty()) {
        criteria.sector = Some(sector.trim().to_string());
    }
    if use_defaults {
        criteria = criteria.with_defaults();
    }

    let source = source_from_settings(settings)?;
    let records = fetch_many(source.as_ref(), &conservative_universe()).await;
    let stocks = screening::screen(&records, &criteria);

    tracing::info!(
        source = source.name(),
        universe = records.len(),
        matched = stocks.len(),
        "screen finished"
    );

    let out = json!({
        "stocks": stocks,
        "total": stocks.len(),
        "filters_applied": screening::applied_filters(&criteria),
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&out).context("serialize screen result failed")?
    );
    Ok(())
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
