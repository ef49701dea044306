use clap::Parser;
use tokio_util::sync::CancellationToken;
use tubeid::config::{CliArgs, Config};
use tubeid::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let config = Config::from_env()?.with_overrides(args);

    // Initialize tracing subscriber (handles both tracing and log crate)
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_target(true)
        .init();

    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("failed to listen for ctrl-c: {e}");
            return;
        }
        log::info!("shutting down");
        on_signal.cancel();
    });

    server::serve(&config, shutdown).await
}
