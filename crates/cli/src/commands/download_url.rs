//! download-url command - Issue a presigned download URL
//!
//! The URL is short-lived and asks the browser to save the file instead of
//! displaying it.

use clap::Args;

use super::upload_url::print_url;
use super::{Session, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Issue a presigned URL for downloading a file
#[derive(Args, Debug)]
pub struct DownloadUrlArgs {
    /// File key relative to your home folder
    pub key: String,
}

/// Execute the download-url command
pub async fn execute(
    args: DownloadUrlArgs,
    output_config: OutputConfig,
    profile: &str,
) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let session = match Session::open(profile).await {
        Ok(s) => s,
        Err(e) => return fail(&formatter, "Failed to open session", &e),
    };

    match session
        .service
        .request_download_url(&session.user, &args.key)
        .await
    {
        Ok(url) => {
            print_url(&formatter, &url);
            ExitCode::Success
        }
        Err(e) => fail(
            &formatter,
            &format!("Failed to issue download URL for '{}'", args.key),
            &e,
        ),
    }
}
