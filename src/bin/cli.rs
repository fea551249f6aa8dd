//! dskv CLI
//!
//! Opens a store, runs one command against it and prints the reply.
//!
//! ```text
//! dskv-cli --path ./data MSET a 1 b 2
//! dskv-cli --path ./data MGET a b c
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use dskv::{Config, Context, Reply, SledEngine};
use tracing_subscriber::{fmt, EnvFilter};

/// dskv CLI
#[derive(Parser, Debug)]
#[command(name = "dskv-cli")]
#[command(about = "Run GET/MGET/SET/MSET/DEL against an embedded store")]
#[command(version)]
struct Args {
    /// JSON config file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Storage directory
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Block cache size in MB
    #[arg(long)]
    cache_mb: Option<u64>,

    /// Verify all stored data when opening
    #[arg(long)]
    paranoid_checks: bool,

    /// Fail if the store already exists
    #[arg(long)]
    error_if_exists: bool,

    /// Command and its arguments, e.g. `MGET a b`
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

impl Args {
    fn to_config(&self) -> dskv::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default(),
        };
        if let Some(path) = &self.path {
            config.path = path.clone();
        }
        if let Some(mb) = self.cache_mb {
            config.cache_size = mb * 1024 * 1024;
        }
        if self.paranoid_checks {
            config.paranoid_checks = true;
        }
        if self.error_if_exists {
            config.error_if_exists = true;
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,dskv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match args.to_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("dskv v{}", dskv::VERSION);

    // Failing to open the store is fatal
    let ctx: Context<SledEngine> = match Context::open(&config) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let reply = ctx.executor().dispatch(&args.command);
    println!("{}", reply);

    if let Err(e) = ctx.close() {
        tracing::error!("Failed to close store: {}", e);
        return ExitCode::FAILURE;
    }

    if matches!(reply, Reply::Error(_)) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
