//! upload-url command - Issue a presigned upload URL
//!
//! The URL lets any HTTP client PUT the file directly to the store. The
//! content type is signed into the URL, so the upload must send the same
//! `Content-Type` header.

use clap::Args;
use vault_core::PresignedUrl;

use super::{Session, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Issue a presigned URL for uploading a file
#[derive(Args, Debug)]
pub struct UploadUrlArgs {
    /// File key relative to your home folder (e.g. "docs/report.pdf")
    pub key: String,

    /// Content type to sign (default: guessed from the key's extension)
    #[arg(long)]
    pub content_type: Option<String>,
}

/// Execute the upload-url command
pub async fn execute(args: UploadUrlArgs, output_config: OutputConfig, profile: &str) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let session = match Session::open(profile).await {
        Ok(s) => s,
        Err(e) => return fail(&formatter, "Failed to open session", &e),
    };

    let content_type = args
        .content_type
        .clone()
        .or_else(|| guess_content_type(&args.key));

    match session
        .service
        .request_upload_url(&session.user, &args.key, content_type.as_deref())
        .await
    {
        Ok(url) => {
            print_url(&formatter, &url);
            ExitCode::Success
        }
        Err(e) => fail(
            &formatter,
            &format!("Failed to issue upload URL for '{}'", args.key),
            &e,
        ),
    }
}

/// Guess a MIME type from the extension of a key or path
pub(crate) fn guess_content_type(path: &str) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
}

/// Print a presigned URL; in human mode only the URL goes to stdout
pub(crate) fn print_url(formatter: &Formatter, url: &PresignedUrl) {
    if formatter.is_json() {
        formatter.json(url);
    } else {
        formatter.println(&url.url);
        if !formatter.is_quiet() {
            eprintln!(
                "{}",
                formatter.dim(&format!(
                    "{} {} (expires in {}s)",
                    url.method, url.key, url.expires_in_secs
                ))
            );
        }
    }
}
