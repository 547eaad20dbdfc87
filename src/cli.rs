//! Command-line interface parsing for the portfolio server
//!
//! This module handles parsing of CLI arguments using clap. Every option can
//! also be supplied through an environment variable, which is how the hosting
//! platform passes the port and the Unsplash credential.

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use thiserror::Error;

use crate::cache::CacheStore;

/// Error types for turning CLI arguments into a server configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No cache file was given and no home directory exists to derive one
    #[error("Cannot determine a cache location; pass --cache-file or set IMAGE_CACHE_FILE")]
    NoCacheLocation,
}

/// Portfolio site backend - city image collages and quotes
#[derive(Parser, Debug)]
#[command(name = "portfolio")]
#[command(about = "Portfolio site backend serving city image collages and quotes")]
#[command(version)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// JSON file the image cache is mirrored to
    ///
    /// Defaults to `image_cache.json` in the user cache directory.
    #[arg(long, env = "IMAGE_CACHE_FILE", value_name = "PATH")]
    pub cache_file: Option<PathBuf>,

    /// Directory served under /static
    #[arg(long, env = "STATIC_DIR", value_name = "DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Unsplash API access key; without it only static images are offered
    #[arg(long, env = "UNSPLASH_ACCESS_KEY", hide_env_values = true)]
    pub unsplash_access_key: Option<String>,

    /// Fetch collage images from Unsplash instead of the bundled set
    #[arg(
        long,
        env = "USE_DYNAMIC_IMAGES",
        value_name = "BOOL",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub dynamic_images: bool,

    /// Refresh every city's images in the background at startup
    #[arg(long)]
    pub warm: bool,
}

/// Configuration derived from CLI arguments for server startup
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to bind
    pub bind_addr: SocketAddr,
    /// Backing file of the cache store
    pub cache_file: PathBuf,
    /// Directory served under /static
    pub static_dir: PathBuf,
    /// Unsplash credential, if configured
    pub unsplash_access_key: Option<String>,
    /// Whether dynamic image sourcing is switched on
    pub dynamic_images: bool,
    /// Whether to warm the image cache at startup
    pub warm: bool,
}

impl ServerConfig {
    /// Creates a ServerConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(ServerConfig)` with the cache file resolved
    /// * `Err(ConfigError)` if no cache location can be determined
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let cache_file = match &cli.cache_file {
            Some(path) => path.clone(),
            None => CacheStore::default_path().ok_or(ConfigError::NoCacheLocation)?,
        };

        let unsplash_access_key = cli
            .unsplash_access_key
            .as_ref()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        Ok(ServerConfig {
            bind_addr: SocketAddr::new(cli.host, cli.port),
            cache_file,
            static_dir: cli.static_dir.clone(),
            unsplash_access_key,
            dynamic_images: cli.dynamic_images,
            warm: cli.warm,
        })
    }
}
