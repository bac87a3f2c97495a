use anyhow::Context;
use fxsignal::config::{Config, SourceKind};
use fxsignal::services::SignalPipeline;
use fxsignal::sources::{MarketDataSource, TerminalBridgeClient, YahooFinanceClient};
use fxsignal::AppState;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("invalid configuration")?;
    init_tracing(config.json_logs);

    config.validate().context("invalid signal configuration")?;
    let config = Arc::new(config);

    info!(
        symbol = %config.signal.symbol,
        short_period = config.signal.short_period,
        long_period = config.signal.long_period,
        adr_period = config.signal.adr_period,
        adr_multiplier = config.signal.adr_multiplier,
        source = %config.source.kind,
        "Starting fxsignal server on {}",
        config.bind_addr()
    );

    // The terminal session lives for the whole process and is released on shutdown.
    let terminal = match config.source.kind {
        SourceKind::Terminal => Some(Arc::new(TerminalBridgeClient::new(
            config.source.terminal_url.clone(),
            config.source.timeout(),
        ))),
        SourceKind::Yahoo => None,
    };

    let source: Arc<dyn MarketDataSource> = match &terminal {
        Some(client) => {
            if let Err(e) = client.connect().await {
                warn!(
                    "Terminal bridge at {} unavailable ({}), will retry on first request",
                    client.base_url(),
                    e
                );
            }
            client.clone() as Arc<dyn MarketDataSource>
        }
        None => Arc::new(YahooFinanceClient::new(config.source.timeout())),
    };

    let pipeline = SignalPipeline::new(config.signal.clone(), source, config.source.timeout());

    let state = AppState {
        config: config.clone(),
        pipeline,
    };

    let app = fxsignal::app(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("fxsignal listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(client) = terminal {
        client.shutdown().await;
    }
    info!("fxsignal stopped");

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fxsignal=debug,tower_http=debug".into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
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
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
