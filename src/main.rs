//! Portfolio site backend - serves city image collages and quotes
//!
//! A small web server that keeps a shuffled, cached list of Unsplash photos for
//! each city theme of the site and proxies a random-quote API.

use clap::Parser;
use tracing::{error, level_filters::LevelFilter};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use portfolio::cli::{Cli, ServerConfig};

/// Installs the global tracing subscriber, honouring `RUST_LOG`
fn setup_logging() {
    let env_log = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .compact()
        .with_file(false)
        .with_env_filter(env_log)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Failed to install log subscriber");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging();

    let config = match ServerConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };

    portfolio::server::serve(config).await?;

    Ok(())
}
