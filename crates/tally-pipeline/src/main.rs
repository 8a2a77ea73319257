//! tallyd: one binary, two roles.
//!
//! - coordinator: IPC server + aggregator + `/metrics` scrape endpoint
//! - worker: emitter only, shipping deltas to the coordinator's socket
//!
//! Usage: `tallyd [config.yaml]` (default `tally.yaml`); `TALLY_ROLE`
//! overrides the configured role.

use std::process::ExitCode;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

use tally_core::error::{MetricsError, Result};
use tally_pipeline::{app_state::AppState, bootstrap::ProcessRole, config, router};

const DEFAULT_CONFIG_PATH: &str = "tally.yaml";

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.code().as_str(), error = %e, "tallyd failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.into());
    let cfg = config::load_from_file(&path)?;
    let role = ProcessRole::resolve(cfg.role)?;

    let state = AppState::new(cfg, role)?;
    let started = state.start()?;

    let (stop_tx, stop_rx) = watch::channel(false);
    let mut servers = Vec::new();

    if let Some(aggregator) = state.aggregator() {
        let listen = &state.cfg().scrape.listen;
        let listener = bind_tcp(listen).await?;
        tracing::info!(%listen, "metrics available at /metrics");
        servers.push(tokio::spawn(serve(
            "scrape",
            listener,
            router::build_scrape_router(aggregator),
            stop_rx.clone(),
        )));
    }

    if let Some(listen) = &state.cfg().app.listen {
        let listener = bind_tcp(listen).await?;
        tracing::info!(%listen, "app surface listening");
        servers.push(tokio::spawn(serve(
            "app",
            listener,
            router::build_app_router(state.sink()),
            stop_rx.clone(),
        )));
    }

    shutdown_signal().await;
    let _ = stop_tx.send(true);
    for server in servers {
        let _ = server.await;
    }

    if let Some(task) = started.ipc_server {
        task.abort();
    }
    if let Some(socket) = started.socket_path {
        if let Err(e) = std::fs::remove_file(&socket) {
            tracing::warn!(path = %socket.display(), error = %e, "could not remove ipc socket");
        }
    }

    tracing::info!(role = role.as_str(), "tallyd stopped");
    Ok(())
}

async fn bind_tcp(listen: &str) -> Result<TcpListener> {
    TcpListener::bind(listen).await.map_err(|source| MetricsError::Bind {
        target: listen.to_string(),
        source,
    })
}

async fn serve(name: &'static str, listener: TcpListener, app: Router, mut stop: watch::Receiver<bool>) {
    let shutdown = async move {
        let _ = stop.changed().await;
    };
    if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown).await {
        tracing::error!(surface = name, error = %e, "http server failed");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
