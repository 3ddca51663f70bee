//! Signal handling for graceful shutdown and config reload.

use crate::config::ConfigLoader;
use kickfeed_core::config::{ClassifierConfig, ConfigStore};
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Raise the shutdown flag on SIGTERM or SIGINT (Ctrl+C).
///
/// The handlers are installed before this returns, so a failure to install
/// them surfaces at start rather than on the first signal.
pub fn spawn_shutdown_listener(
    shutdown_tx: watch::Sender<bool>,
) -> std::io::Result<JoinHandle<()>> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    Ok(tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, initiating graceful shutdown");
            }
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT, initiating graceful shutdown");
            }
        }
        let _ = shutdown_tx.send(true);
    }))
}

/// Spawns a task that listens for SIGHUP and reloads the classifier tables.
///
/// Running polls keep the snapshot they started with; the next poll sees the
/// new tables.
pub fn spawn_config_reload_handler(
    config_loader: Arc<ConfigLoader>,
    classifier_store: ConfigStore<ClassifierConfig>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> std::io::Result<JoinHandle<()>> {
    let mut sighup = signal(SignalKind::hangup())?;

    Ok(tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;

                _ = async { shutdown_rx.wait_for(|stop| *stop).await.map(|_| ()) } => {
                    tracing::debug!("Config reload handler shutting down");
                    break;
                }

                _ = sighup.recv() => {
                    tracing::info!("Received SIGHUP, reloading classifier configuration");
                    match config_loader.reload_classifier() {
                        Ok(classifier) => {
                            classifier_store.update(classifier).await;
                            tracing::info!(
                                version = classifier_store.version(),
                                "Classifier configuration reloaded"
                            );
                        }
                        Err(e) => {
                            tracing::error!("Failed to reload configuration: {}", e);
                        }
                    }
                }
            }
        }
    }))
}
