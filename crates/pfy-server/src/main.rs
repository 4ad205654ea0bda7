use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use pfy_config::PfyConfig;
use pfy_db::service::PfyService;
use pfy_notify::DueDateSweeper;
use pfy_server::{AppState, build_router};
use tokio_util::sync::CancellationToken;

mod cli;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("projectify error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.log_level())?;

    let mut config =
        PfyConfig::load_with_dotenv(cli.config.as_deref()).context("failed to load configuration")?;
    cli.apply(&mut config);
    config.require_auth().context("set PROJECTIFY_AUTH__JWT_SECRET")?;

    let service = Arc::new(
        PfyService::new_local(&config.database.path)
            .await
            .with_context(|| format!("failed to open database at {}", config.database.path))?,
    );
    let state = AppState::new(service, config.clone());

    let cancel = CancellationToken::new();
    let sweeper = if config.sweeper.enabled {
        let sweeper = DueDateSweeper::new(state.dispatcher.clone(), &config.sweeper);
        Some(sweeper.spawn(cancel.clone()))
    } else {
        tracing::info!("due-date sweeper disabled");
        None
    };

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    tracing::info!(addr = %config.server.bind, "projectify listening");

    let shutdown = cancel.clone();
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            tracing::info!("shutdown requested");
            shutdown.cancel();
        })
        .await
        .context("server failed")?;

    cancel.cancel();
    if let Some(handle) = sweeper {
        if let Err(error) = handle.await {
            tracing::warn!(%error, "sweeper task ended abnormally");
        }
    }
    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                tracing::warn!("signal handlers unavailable; falling back to ctrl-c");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_env("PROJECTIFY_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
