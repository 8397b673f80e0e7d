use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tinyhttpd::cli::Cli;
use tinyhttpd::config::Config;
use tinyhttpd::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = Arc::new(Config::load(cli.port)?);
    tracing::info!(root = %cfg.root.display(), cgi_dir = %cfg.cgi_dir, "Configuration loaded");

    tokio::select! {
        res = server::listener::run(cfg) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
