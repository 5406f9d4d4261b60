use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use explore_api::http::{create_router, webhook, AppState};
use explore_core::{logging, Config, Fetcher, ResponseCache};
use explore_media_providers::{build_registry, MedalWall};

#[derive(Parser, Debug)]
#[command(name = "explore-server")]
#[command(about = "Discover sources for Bangumi, CCTV, Tencent Video and Mango TV", long_about = None)]
struct Args {
    /// Configuration file (TOML/YAML/JSON); environment variables override it
    #[arg(long, env = "EXPLORE_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    logging::init_logging(&config.logging)?;

    info!("Starting explore-server v{}", env!("CARGO_PKG_VERSION"));

    if config.host.api_token.is_empty() {
        warn!("host.api_token is empty, every plugin route will answer 401");
    }

    let fetcher = Fetcher::new(&config.host.user_agent, &config.http)
        .context("Failed to build HTTP client")?;
    let cache = ResponseCache::from_config(&config.cache);
    let registry = build_registry(&config.modules, &fetcher, &cache);

    // Builds descriptors once up front so bootstrap requests run before the first request
    let descriptors = registry
        .descriptors(&config.host.api_prefix, &config.host.api_token)
        .await;
    for descriptor in &descriptors {
        info!(
            name = %descriptor.name,
            api_path = %descriptor.api_path,
            filters = descriptor.filter_params.len(),
            rows = descriptor.filter_ui.len(),
            "Discover source ready"
        );
    }
    info!("{} of {} discover sources available", descriptors.len(), registry.len());

    let mut state = AppState::new(registry, &config.host.api_token, &config.host.api_prefix);
    if config.webhook.enabled {
        let sink = webhook::sink_for(config.webhook.forward_url.as_deref(), &config.http);
        state = state.with_message_sink(sink);
    }
    if config.medal.enabled && !config.medal.sites.is_empty() {
        info!(sites = config.medal.sites.len(), "Medal wall enabled");
        let wall = MedalWall::new(fetcher.clone(), cache.clone(), &config.medal);
        state = state.with_medal_wall(Arc::new(wall));
    }

    let mount = state.mount_path();
    let router = create_router(state);

    let address = config.http_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("HTTP server listening on {} (routes under {})", address, mount);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("HTTP server shut down gracefully");
    Ok(())
}

/// Wait for a shutdown signal (SIGTERM or SIGINT/Ctrl+C)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("Received Ctrl+C"); }
        () = terminate => { info!("Received SIGTERM"); }
    }
}
