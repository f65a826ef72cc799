//! `openhouse` binary: serve the API, run migrations, or mint a dev token.

use anyhow::Context;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use openhouse_auth::Hs256Verifier;
use openhouse_core::environment::SystemClock;
use openhouse_core::validation::EnumCatalog;
use openhouse_postgres::PgGateway;
use openhouse_server::cli::{Cli, Command, IssueTokenArgs, MigrateDirection};
use openhouse_server::config::{Config, DatabaseConfig};
use openhouse_server::server::{self, AppState, build_router};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("failed to load env file {}", path.display()))?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "openhouse=info,openhouse_server=info,openhouse_core=info,openhouse_postgres=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    match cli.command() {
        Command::Serve => serve(config).await,
        Command::Migrate(args) => migrate(&config, args.direction).await,
        Command::IssueToken(args) => issue_token(&config, &args),
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    info!("Starting Open House server");
    config.validate()?;

    let metrics_addr = config.server.metrics_addr()?;
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .context("failed to install Prometheus exporter")?;
    openhouse_core::metrics::register_business_metrics();
    info!(address = %metrics_addr, "Metrics exporter listening");

    let gateway = connect(&config.database).await?;
    gateway.migrate().await?;

    let verifier = Hs256Verifier::new(config.auth.verifier_config())?;
    let enums = EnumCatalog::builtin()?;
    let state = AppState::new(
        Arc::new(gateway),
        Arc::new(verifier),
        Arc::new(enums),
        config.booking.policy()?,
        Arc::new(SystemClock),
    );
    let router = build_router(state, &config.server);

    let addr = config.server.addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(address = %addr, production = config.server.is_production, "Server listening");

    server::serve(listener, router, config.server.shutdown_timeout()).await
}

async fn migrate(config: &Config, direction: MigrateDirection) -> anyhow::Result<()> {
    let gateway = connect(&config.database).await?;
    match direction {
        MigrateDirection::Up => gateway.migrate().await?,
        MigrateDirection::Down => gateway.migrate_down().await?,
        MigrateDirection::Reset => gateway.migrate_reset().await?,
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn issue_token(config: &Config, args: &IssueTokenArgs) -> anyhow::Result<()> {
    let verifier = Hs256Verifier::new(config.auth.verifier_config())?;
    let claims = args.claims(chrono::Utc::now(), config.auth.issuer.as_deref())?;
    println!("{}", verifier.issue(&claims)?);
    Ok(())
}

async fn connect(database: &DatabaseConfig) -> anyhow::Result<PgGateway> {
    info!(
        max_connections = database.max_connections,
        min_connections = database.min_connections,
        "Connecting to PostgreSQL"
    );
    let pool = PgPoolOptions::new()
        .max_connections(database.max_connections)
        .min_connections(database.min_connections)
        .acquire_timeout(Duration::from_secs(database.connect_timeout))
        .idle_timeout(Duration::from_secs(database.idle_timeout))
        .connect(&database.url)
        .await
        .context("failed to connect to PostgreSQL")?;
    Ok(PgGateway::new(pool))
}
