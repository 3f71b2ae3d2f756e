//! put command - Upload a local file
//!
//! Uploads through the service rather than a presigned URL. With `--list`
//! the destination folder is listed before the upload and the new file is
//! merged into that listing, so it shows up even when the store's listing
//! lags behind the write.

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use vault_core::{ListingCache, UserListing, VirtualFile};

use super::ls::{cached_listing, parent_folder, print_listing};
use super::upload_url::guess_content_type;
use super::{Session, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Upload a local file
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Local file to upload
    pub file: PathBuf,

    /// Destination key or folder (ending with '/') relative to your home
    /// folder (default: the file name in your home folder)
    pub dest: Option<String>,

    /// Content type to store (default: guessed from the file extension)
    #[arg(long)]
    pub content_type: Option<String>,

    /// Show the destination folder after the upload
    #[arg(long)]
    pub list: bool,
}

#[derive(Debug, Serialize)]
struct PutOutput {
    status: &'static str,
    file: VirtualFile,
    #[serde(skip_serializing_if = "Option::is_none")]
    listing: Option<UserListing>,
}

/// Execute the put command
pub async fn execute(args: PutArgs, output_config: OutputConfig, profile: &str) -> ExitCode {
    let formatter = Formatter::new(output_config.clone());

    let key = match destination_key(&args.file, args.dest.as_deref()) {
        Ok(k) => k,
        Err(msg) => {
            formatter.error(&msg);
            return ExitCode::UsageError;
        }
    };

    let data = match tokio::fs::read(&args.file).await {
        Ok(d) => d,
        Err(e) => {
            formatter.error(&format!("Failed to read {}: {e}", args.file.display()));
            return if e.kind() == std::io::ErrorKind::NotFound {
                ExitCode::NotFound
            } else {
                ExitCode::GeneralError
            };
        }
    };

    let session = match Session::open(profile).await {
        Ok(s) => s,
        Err(e) => return fail(&formatter, "Failed to open session", &e),
    };

    let mut cache = ListingCache::new();
    if args.list {
        match session.cache_folder(parent_folder(&key)).await {
            Ok(c) => cache = c,
            Err(e) => return fail(&formatter, "Failed to list destination folder", &e),
        }
    }

    let content_type = args
        .content_type
        .clone()
        .or_else(|| args.file.to_str().and_then(guess_content_type));

    let spinner = ProgressBar::spinner(&output_config, &format!("Uploading '{key}'"));
    let result = session
        .service
        .upload_object(&session.user, &key, data, content_type.as_deref())
        .await;
    spinner.finish_and_clear();

    let file = match result {
        Ok(f) => f,
        Err(e) => return fail(&formatter, &format!("Failed to upload '{key}'"), &e),
    };

    cache.merge_uploaded(file.clone());
    let listing = cached_listing(&cache);

    if formatter.is_json() {
        formatter.json(&PutOutput {
            status: "success",
            file,
            listing,
        });
    } else {
        formatter.success(&format!(
            "Uploaded {} -> '{}' ({})",
            args.file.display(),
            file.key,
            file.size_human.as_deref().unwrap_or("0 B")
        ));
        if let Some(listing) = listing {
            print_listing(&formatter, listing, false);
        }
    }

    ExitCode::Success
}

/// Resolve the relative destination key for `file`
fn destination_key(file: &Path, dest: Option<&str>) -> Result<String, String> {
    let name = || {
        file.file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| format!("Cannot derive a file name from {}", file.display()))
    };

    match dest {
        None | Some("") => name(),
        Some(folder) if folder.ends_with('/') => Ok(format!("{folder}{}", name()?)),
        Some(key) => Ok(key.to_string()),
    }
}
