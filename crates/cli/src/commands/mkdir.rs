//! mkdir command - Create a folder
//!
//! Writes the zero-byte marker that makes an empty folder visible. With
//! `--list` the parent folder is shown afterwards, including the new folder
//! even before the store's listing reports it.

use clap::Args;
use serde::Serialize;
use vault_core::{ListingCache, UserListing};

use super::ls::{cached_listing, print_listing};
use super::{Session, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Create a folder
#[derive(Args, Debug)]
pub struct MkdirArgs {
    /// Folder path relative to your home folder (e.g. "docs/2024")
    pub path: String,

    /// Show the parent folder after creating the folder
    #[arg(long)]
    pub list: bool,
}

#[derive(Debug, Serialize)]
struct MkdirOutput {
    status: &'static str,
    folder: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    listing: Option<UserListing>,
}

/// Execute the mkdir command
pub async fn execute(args: MkdirArgs, output_config: OutputConfig, profile: &str) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (base, name) = split_folder_path(&args.path);
    if name.is_empty() {
        formatter.error("Folder name cannot be empty");
        return ExitCode::UsageError;
    }

    let session = match Session::open(profile).await {
        Ok(s) => s,
        Err(e) => return fail(&formatter, "Failed to open session", &e),
    };

    let mut cache = ListingCache::new();
    if args.list {
        match session.cache_folder(base).await {
            Ok(c) => cache = c,
            Err(e) => return fail(&formatter, "Failed to list parent folder", &e),
        }
    }

    let folder = match session
        .service
        .create_folder(&session.user, base, name)
        .await
    {
        Ok(f) => f,
        Err(e) => {
            return fail(
                &formatter,
                &format!("Failed to create folder '{}'", args.path),
                &e,
            );
        }
    };

    cache.merge_folder(&folder);
    let listing = cached_listing(&cache);

    if formatter.is_json() {
        formatter.json(&MkdirOutput {
            status: "success",
            folder,
            listing,
        });
    } else {
        formatter.success(&format!("Created folder '{folder}'"));
        if let Some(listing) = listing {
            print_listing(&formatter, listing, false);
        }
    }
    ExitCode::Success
}

/// Split "a/b/c/" into base `Some("a/b")` and name "c"
///
/// A leading separator stays in the name so it is rejected downstream.
fn split_folder_path(path: &str) -> (Option<&str>, &str) {
    let path = path.strip_suffix('/').unwrap_or(path);
    match path.rsplit_once('/') {
        Some((base, name)) if !base.is_empty() => (Some(base), name),
        _ => (None, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_folder_path_top_level() {
        assert_eq!(split_folder_path("docs"), (None, "docs"));
        assert_eq!(split_folder_path("docs/"), (None, "docs"));
    }

    #[test]
    fn test_split_folder_path_nested() {
        assert_eq!(split_folder_path("docs/2024"), (Some("docs"), "2024"));
        assert_eq!(split_folder_path("a/b/c/"), (Some("a/b"), "c"));
    }

    #[test]
    fn test_split_folder_path_empty() {
        assert_eq!(split_folder_path(""), (None, ""));
        assert_eq!(split_folder_path("docs//"), (Some("docs"), ""));
        assert_eq!(split_folder_path("/docs"), (None, "/docs"));
    }

    #[test]
    fn test_mkdir_args_parse() {
        use crate::commands::{Cli, Commands};
        use clap::Parser;

        let cli = Cli::try_parse_from(["vault", "mkdir", "docs/2024", "--list"]).unwrap();
        match cli.command {
            Commands::Mkdir(args) => {
                assert_eq!(args.path, "docs/2024");
                assert!(args.list);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
