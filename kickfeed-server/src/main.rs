//! kickfeed server
//!
//! Watches live football matches and posts their timeline to Slack.

mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::file::RunMode;
use config::{ConfigLoader, LoadedConfig, Overrides, StorageSettings};
use kickfeed_core::config::ConfigStore;
use kickfeed_core::processors::{
    DaemonRunner, DaemonScheduler, FleetScanner, MatchMonitor, NotificationSink, QueueScheduler,
    QueueWorker, SlackSink, TimelineFetcher,
};
use kickfeed_core::queue::{ChannelQueue, PgWorkQueue, WorkQueue};
use kickfeed_core::registry::{InMemoryRegistry, MatchRegistry, PgMatchRegistry};
use kickfeed_sdk::client::{FeedClient, SlackClient};
use server::{build_router, run_server};
use shutdown::{spawn_config_reload_handler, spawn_shutdown_listener};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

/// kickfeed - live football timeline notifier
#[derive(Parser, Debug)]
#[command(name = "kickfeed-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./kickfeed-config.toml")]
    config: PathBuf,

    /// Override the run mode from the config file
    #[arg(short, long, value_enum)]
    mode: Option<RunMode>,

    /// Serve the status endpoints on this address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,

    /// Emit logs as JSON lines
    #[arg(long, default_value = "false")]
    log_json: bool,

    /// Slack incoming webhook URL
    #[arg(long, env = "SLACK_WEBHOOK_URL", hide_env_values = true)]
    webhook_url: Option<Url>,

    /// Only register matches of this competition
    #[arg(long, env = "COMPETITION_ID")]
    competition_id: Option<String>,

    /// Postgres connection string, required by the postgres storage backend
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            listen: self.listen,
            mode: self.mode,
            webhook_url: self.webhook_url.clone(),
            competition_id: self.competition_id.clone(),
            database_url: self.database_url.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing(args.log_json);

    tracing::info!("Starting kickfeed-server v{}", env!("CARGO_PKG_VERSION"));

    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.overrides()));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!(
        mode = ?loaded_config.mode,
        "Configuration loaded from {:?}",
        args.config
    );

    let db_pool = match &loaded_config.storage {
        StorageSettings::Memory => None,
        StorageSettings::Postgres { database_url } => {
            Some(connect_database(database_url, args.migrate).await?)
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let signal_handle = spawn_shutdown_listener(shutdown_tx)?;

    let classifier_store = ConfigStore::new(loaded_config.classifier.clone());
    let reload_handle = spawn_config_reload_handler(
        config_loader,
        classifier_store.clone(),
        shutdown_rx.clone(),
    )?;

    let registry: Arc<dyn MatchRegistry> = match &db_pool {
        Some(pool) => Arc::new(PgMatchRegistry::new(pool.clone())),
        None => Arc::new(InMemoryRegistry::new()),
    };
    let http = reqwest::Client::builder()
        .timeout(loaded_config.feed.timeout)
        .build()?;
    let fetcher: Arc<dyn TimelineFetcher> = Arc::new(
        FeedClient::new(
            loaded_config.feed.base_url.clone(),
            loaded_config.feed.language.clone(),
        )
        .with_http_client(http.clone()),
    );
    let sink: Arc<dyn NotificationSink> = Arc::new(SlackSink::new(
        SlackClient::new(loaded_config.webhook_url.clone()).with_http_client(http),
    ));
    let monitor = MatchMonitor::new(
        Arc::clone(&registry),
        Arc::clone(&fetcher),
        sink,
        classifier_store,
    );

    let mut tasks = JoinSet::new();
    spawn_pipeline(
        &mut tasks,
        &loaded_config,
        db_pool.clone(),
        Arc::clone(&registry),
        fetcher,
        monitor,
        shutdown_rx.clone(),
    );

    if let Some(listen_addr) = loaded_config.listen {
        let router = build_router(AppState::new(registry));
        let server_shutdown = shutdown_rx.clone();
        tasks.spawn(async move {
            if let Err(e) = run_server(router, listen_addr, server_shutdown).await {
                tracing::error!("Status server failed: {}", e);
            }
        });
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            tracing::error!("Task panicked: {}", e);
        }
    }

    signal_handle.abort();
    if let Err(e) = reload_handle.await {
        tracing::warn!("Config reload handler ended abnormally: {}", e);
    }

    if let Some(pool) = db_pool {
        tracing::info!("Closing database connections...");
        pool.close().await;
    }
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Spawn the loops of the configured run mode.
fn spawn_pipeline(
    tasks: &mut JoinSet<()>,
    config: &LoadedConfig,
    db_pool: Option<PgPool>,
    registry: Arc<dyn MatchRegistry>,
    fetcher: Arc<dyn TimelineFetcher>,
    monitor: MatchMonitor,
    shutdown_rx: watch::Receiver<bool>,
) {
    let interval = config.monitor.poll_interval;
    match config.mode {
        RunMode::Daemon => {
            let scanner = FleetScanner::new(
                Arc::clone(&registry),
                fetcher,
                Arc::new(DaemonScheduler),
                config.monitor.clone(),
            );
            let runner = DaemonRunner::new(scanner, monitor, registry, interval, shutdown_rx);
            tasks.spawn(runner.run());
        }
        RunMode::Queue => {
            let queue: Arc<dyn WorkQueue> = match db_pool {
                Some(pool) => Arc::new(PgWorkQueue::new(pool)),
                None => Arc::new(ChannelQueue::new()),
            };
            let scheduler = Arc::new(QueueScheduler::new(
                Arc::clone(&queue),
                config.monitor.continuation_delay,
            ));
            let scanner = FleetScanner::new(
                registry,
                fetcher,
                scheduler.clone(),
                config.monitor.clone(),
            );
            tasks.spawn(scanner.run(interval, shutdown_rx.clone()));
            let worker = QueueWorker::new(
                queue,
                monitor,
                scheduler,
                config.monitor.continuation_delay,
                shutdown_rx,
            );
            tasks.spawn(worker.run());
        }
    }
}

async fn connect_database(database_url: &str, migrate: bool) -> anyhow::Result<PgPool> {
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;
    tracing::info!("Database connection established");

    if migrate {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&db_pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to run migrations: {}", e);
                e
            })?;
        tracing::info!("Migrations completed successfully");
    }
    Ok(db_pool)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}
