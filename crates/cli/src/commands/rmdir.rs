//! rmdir command - Remove a folder and everything in it
//!
//! Deletion is not atomic. When the store refuses some keys the command
//! exits with the partial-failure code and lists them; running it again
//! retries only what is left.

use clap::Args;
use serde::Serialize;
use vault_core::{Error, FailedKey, FolderDeleteReport};

use super::{Session, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Remove a folder and everything in it
#[derive(Args, Debug)]
pub struct RmdirArgs {
    /// Folder relative to your home folder (e.g. "docs/2024")
    pub prefix: String,
}

#[derive(Debug, Serialize)]
struct RmdirOutput {
    status: &'static str,
    prefix: String,
    deleted: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failed: Vec<FailedKey>,
}

impl From<FolderDeleteReport> for RmdirOutput {
    fn from(report: FolderDeleteReport) -> Self {
        Self {
            status: "success",
            prefix: report.prefix,
            deleted: report.deleted.len(),
            failed: Vec::new(),
        }
    }
}

/// Execute the rmdir command
pub async fn execute(args: RmdirArgs, output_config: OutputConfig, profile: &str) -> ExitCode {
    let formatter = Formatter::new(output_config.clone());

    let session = match Session::open(profile).await {
        Ok(s) => s,
        Err(e) => return fail(&formatter, "Failed to open session", &e),
    };

    let spinner = ProgressBar::spinner(&output_config, &format!("Removing '{}'", args.prefix));
    let result = session
        .service
        .delete_folder(&session.user, &args.prefix)
        .await;
    spinner.finish_and_clear();

    match result {
        Ok(report) => {
            if formatter.is_json() {
                formatter.json(&RmdirOutput::from(report));
            } else if report.marker_only {
                formatter.success(&format!("Removed empty folder '{}'", report.prefix));
            } else {
                formatter.success(&format!(
                    "Removed folder '{}' ({} objects)",
                    report.prefix,
                    report.deleted.len()
                ));
            }
            ExitCode::Success
        }
        Err(Error::PartialDeleteFailure { deleted, failed }) => {
            report_partial(&formatter, &args.prefix, deleted, failed)
        }
        Err(e) => fail(
            &formatter,
            &format!("Failed to remove folder '{}'", args.prefix),
            &e,
        ),
    }
}

fn report_partial(
    formatter: &Formatter,
    prefix: &str,
    deleted: usize,
    failed: Vec<FailedKey>,
) -> ExitCode {
    if formatter.is_json() {
        formatter.json(&RmdirOutput {
            status: "partial",
            prefix: prefix.to_string(),
            deleted,
            failed,
        });
    } else {
        formatter.error(&format!(
            "Folder '{prefix}' was only partially removed: {deleted} deleted, {} failed",
            failed.len()
        ));
        for key in &failed {
            let code = key.code.as_deref().unwrap_or("Error");
            formatter.warning(&format!("{}: {code}: {}", key.key, key.message));
        }
        formatter.warning("Run the command again to retry the remaining objects");
    }
    ExitCode::PartialFailure
}
