//! vault - per-user file storage on S3-compatible backends
//!
//! Lists, uploads and removes files inside the caller's home folder and
//! issues presigned URLs for direct transfers.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use vault_cli::commands::{self, Cli};
use vault_cli::exit_code::ExitCode;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins; --debug raises the default level
    let default_level = if cli.debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = tokio::select! {
        code = commands::execute(cli) => code,
        _ = tokio::signal::ctrl_c() => {
            tracing::debug!("interrupted");
            ExitCode::Interrupted
        }
    };

    std::process::exit(exit_code.as_i32());
}
