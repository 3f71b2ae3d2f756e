//! CLI command definitions and execution
//!
//! Each file command resolves the active profile into a [`Session`] and
//! calls one [`vault_core::FileService`] operation. Failures are reported
//! through the formatter and mapped onto the exit code convention.

use clap::{Parser, Subcommand};
use vault_core::{ConfigManager, DEFAULT_PROFILE, Error};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod completions;
mod download_url;
mod ls;
mod mkdir;
mod profile;
mod put;
mod rm;
mod rmdir;
mod session;
mod upload_url;

pub use session::Session;

/// vault - per-user file storage on S3-compatible backends
///
/// Every path is relative to your home folder inside the bucket. The
/// identity comes from the `user_id` of the selected profile.
#[derive(Parser, Debug)]
#[command(name = "vault")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress spinners
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    /// Profile to use for connection and identity
    #[arg(long, global = true, env = "VAULT_PROFILE", default_value = DEFAULT_PROFILE)]
    pub profile: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage connection profiles
    #[command(subcommand)]
    Profile(profile::ProfileCommands),

    /// List files and folders
    Ls(ls::LsArgs),

    /// Issue a presigned URL for uploading a file
    UploadUrl(upload_url::UploadUrlArgs),

    /// Issue a presigned URL for downloading a file
    DownloadUrl(download_url::DownloadUrlArgs),

    /// Create a folder
    Mkdir(mkdir::MkdirArgs),

    /// Upload a local file
    Put(put::PutArgs),

    /// Remove files
    Rm(rm::RmArgs),

    /// Remove a folder and everything in it
    Rmdir(rmdir::RmdirArgs),

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let mut output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        no_progress: cli.no_progress,
        quiet: cli.quiet,
    };

    // An unreadable config is reported by the command that needs it
    if let Ok(config) = ConfigManager::new().and_then(|m| m.load()) {
        output_config = output_config.with_defaults(&config.defaults);
    }

    let profile = cli.profile.as_str();
    match cli.command {
        Commands::Profile(cmd) => profile::execute(cmd, output_config).await,
        Commands::Ls(args) => ls::execute(args, output_config, profile).await,
        Commands::UploadUrl(args) => upload_url::execute(args, output_config, profile).await,
        Commands::DownloadUrl(args) => download_url::execute(args, output_config, profile).await,
        Commands::Mkdir(args) => mkdir::execute(args, output_config, profile).await,
        Commands::Put(args) => put::execute(args, output_config, profile).await,
        Commands::Rm(args) => rm::execute(args, output_config, profile).await,
        Commands::Rmdir(args) => rmdir::execute(args, output_config, profile).await,
        Commands::Completions(args) => completions::execute(args),
    }
}

/// Print `err` with context and return the matching exit code
pub(crate) fn fail(formatter: &Formatter, context: &str, err: &Error) -> ExitCode {
    let code = ExitCode::from(err);
    if err.is_retryable() {
        formatter.error(&format!("{context}: {err} (retry later)"));
    } else {
        formatter.error(&format!("{context}: {err}"));
    }
    tracing::debug!(exit_code = code.as_i32(), error = ?err, "command failed");
    code
}
