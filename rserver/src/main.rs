use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use robserve::{CompositeRelayHooks, MetricsRelayHooks, SafeRelayHooks, TracingRelayHooks};
use rprovider::adapters::openai::{OpenAiHttpTransport, OpenAiProvider};
use rserver::config::LoggingConfig;
use rserver::{AppState, ServerConfig, create_router};

#[derive(Debug, Parser)]
#[command(name = "chatrelay", version, about = "Streaming conversation relay")]
struct Cli {
    /// TOML configuration file (defaults to ./chatrelay.toml when present)
    #[arg(long, env = "CHATRELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overriding server.bind
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = ServerConfig::load(cli.config.as_deref()).context("loading configuration")?;
    config
        .apply_port_env(|name: &str| std::env::var(name).ok())
        .context("applying PORT")?;
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }

    init_logging(&config.logging);

    let transport = OpenAiHttpTransport::new(reqwest::Client::new())
        .with_base_url(config.upstream.base_url.clone());
    let provider = OpenAiProvider::new(Arc::new(transport))
        .with_fallback_model(config.upstream.default_model.clone());

    let hooks = SafeRelayHooks::new(
        CompositeRelayHooks::new()
            .with(TracingRelayHooks)
            .with(MetricsRelayHooks),
    );

    let state = AppState::from_config(
        &config,
        Arc::new(provider),
        Arc::new(hooks),
        |name: &str| std::env::var(name).ok(),
    );
    tracing::info!(
        bots = state.relay.profiles().len(),
        upstream = %config.upstream.base_url,
        "relay configured"
    );

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("binding {}", config.server.bind))?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running server")?;

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .ok();
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
        return;
    }

    tracing::info!("shutting down");
}
