//! rm command - Remove files
//!
//! Removes one or more files from the caller's home folder. Folders are
//! removed with `rmdir`. With `--list` the folder of the first key is
//! listed before removal and shown afterwards without the removed files.

use clap::Args;
use serde::Serialize;
use vault_core::{Error, ListingCache, UserListing};

use super::ls::{cached_listing, parent_folder, print_listing};
use super::{Session, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Remove files
#[derive(Args, Debug)]
pub struct RmArgs {
    /// File key(s) relative to your home folder
    #[arg(required = true)]
    pub keys: Vec<String>,

    /// Show the folder of the first key after removal
    #[arg(long)]
    pub list: bool,
}

#[derive(Debug, Serialize)]
struct RmOutput {
    status: &'static str,
    deleted: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failed: Vec<String>,
    total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    listing: Option<UserListing>,
}

/// Execute the rm command
pub async fn execute(args: RmArgs, output_config: OutputConfig, profile: &str) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let session = match Session::open(profile).await {
        Ok(s) => s,
        Err(e) => return fail(&formatter, "Failed to open session", &e),
    };

    let mut cache = ListingCache::new();
    if args.list {
        let folder = args.keys.first().map(String::as_str).and_then(parent_folder);
        match session.cache_folder(folder).await {
            Ok(c) => cache = c,
            Err(e) => return fail(&formatter, "Failed to list folder", &e),
        }
    }

    let mut deleted = Vec::new();
    let mut failed = Vec::new();
    let mut last_error = ExitCode::Success;

    for key in &args.keys {
        match session.service.delete_file(&session.user, key).await {
            Ok(()) => {
                if !formatter.is_json() {
                    formatter.success(&format!("Removed '{key}'"));
                }
                cache.forget(key);
                deleted.push(key.clone());
            }
            Err(e) => {
                last_error = fail(&formatter, &format!("Failed to remove '{key}'"), &e);
                // An identity failure applies to every key
                if matches!(e, Error::Unauthorized(_)) {
                    return last_error;
                }
                failed.push(key.clone());
            }
        }
    }

    let code = outcome(deleted.len(), failed.len(), last_error);
    let listing = cached_listing(&cache);

    if formatter.is_json() {
        formatter.json(&RmOutput {
            status: if code == ExitCode::Success {
                "success"
            } else {
                "failed"
            },
            total: deleted.len() + failed.len(),
            deleted,
            failed,
            listing,
        });
    } else if let Some(listing) = listing {
        print_listing(&formatter, listing, false);
    }

    code
}

/// Exit code for a run that removed `deleted` keys and failed on `failed`
fn outcome(deleted: usize, failed: usize, last_error: ExitCode) -> ExitCode {
    match (deleted, failed) {
        (_, 0) => ExitCode::Success,
        (0, _) => last_error,
        _ => ExitCode::PartialFailure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_all_deleted() {
        assert_eq!(outcome(3, 0, ExitCode::Success), ExitCode::Success);
    }

    #[test]
    fn test_outcome_all_failed_keeps_error() {
        assert_eq!(outcome(0, 2, ExitCode::UsageError), ExitCode::UsageError);
        assert_eq!(
            outcome(0, 1, ExitCode::StoreUnavailable),
            ExitCode::StoreUnavailable
        );
    }

    #[test]
    fn test_outcome_mixed_is_partial() {
        assert_eq!(outcome(2, 1, ExitCode::NotFound), ExitCode::PartialFailure);
    }

    #[test]
    fn test_rm_output_omits_empty_failures() {
        let output = RmOutput {
            status: "success",
            deleted: vec!["a.txt".to_string()],
            failed: vec![],
            total: 1,
            listing: None,
        };
        let json = serde_json::to_value(&output).unwrap();
        assert!(json.get("failed").is_none());
        assert!(json.get("listing").is_none());
        assert_eq!(json["total"], 1);
    }

    #[test]
    fn test_rm_args_parse() {
        use crate::commands::{Cli, Commands};
        use clap::Parser;

        let cli =
            Cli::try_parse_from(["vault", "rm", "docs/a.txt", "docs/b.txt", "--list"]).unwrap();
        match cli.command {
            Commands::Rm(args) => {
                assert_eq!(args.keys, vec!["docs/a.txt", "docs/b.txt"]);
                assert!(args.list);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(Cli::try_parse_from(["vault", "rm", "--list"]).is_err());
    }
}
