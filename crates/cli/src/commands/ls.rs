//! ls command - List files and folders
//!
//! Shows one level of the caller's home folder, folders first.

use clap::Args;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table, presets};
use serde::Serialize;
use vault_core::{Listing, ListingCache, UserListing};

use super::{Session, fail};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// List files and folders
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Folder to list, relative to your home folder (default: the home folder)
    pub prefix: Option<String>,

    /// Show totals after the listing
    #[arg(long)]
    pub summarize: bool,
}

/// Output structure for ls command (JSON format)
#[derive(Debug, Serialize)]
struct LsOutput {
    #[serde(flatten)]
    listing: UserListing,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<Summary>,
}

#[derive(Debug, Serialize)]
struct Summary {
    total_folders: usize,
    total_files: usize,
    total_size_bytes: i64,
    total_size_human: String,
}

impl Summary {
    fn of(listing: &Listing) -> Self {
        let total = listing.total_size();
        Self {
            total_folders: listing.folders.len(),
            total_files: listing.files.len(),
            total_size_bytes: total,
            total_size_human: humansize::format_size(total.max(0) as u64, humansize::BINARY),
        }
    }
}

/// Execute the ls command
pub async fn execute(args: LsArgs, output_config: OutputConfig, profile: &str) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let session = match Session::open(profile).await {
        Ok(s) => s,
        Err(e) => return fail(&formatter, "Failed to open session", &e),
    };

    let listing = match session
        .service
        .list_user_files(&session.user, args.prefix.as_deref())
        .await
    {
        Ok(l) => l,
        Err(e) => return fail(&formatter, "Failed to list files", &e),
    };

    print_listing(&formatter, listing, args.summarize);
    ExitCode::Success
}

/// Print a listing as JSON or as a table
pub(crate) fn print_listing(formatter: &Formatter, listing: UserListing, summarize: bool) {
    let summary = summarize.then(|| Summary::of(&listing.listing));

    if formatter.is_json() {
        formatter.json(&LsOutput { listing, summary });
        return;
    }

    if listing.listing.is_empty() {
        let location = if listing.prefix.is_empty() {
            "your home folder".to_string()
        } else {
            format!("'{}'", listing.prefix)
        };
        formatter.println(&format!("No files in {location}"));
    } else {
        formatter.println(&render_table(formatter, &listing));
    }

    if let Some(summary) = summary {
        formatter.println(&format!(
            "\nTotal: {} folders, {} files, {}",
            summary.total_folders, summary.total_files, summary.total_size_human
        ));
    }
}

fn render_table(formatter: &Formatter, listing: &UserListing) -> String {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["MODIFIED", "SIZE", "NAME"]);
    if !formatter.colors_enabled() {
        table.force_no_tty();
    }

    for folder in &listing.listing.folders {
        table.add_row(vec![
            Cell::new(""),
            Cell::new("DIR").set_alignment(CellAlignment::Right),
            Cell::new(display_name(&listing.prefix, &folder.key))
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
        ]);
    }

    for file in &listing.listing.files {
        let modified = file
            .last_modified
            .map(|t| t.strftime("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(modified).add_attribute(Attribute::Dim),
            Cell::new(file.size_human.as_deref().unwrap_or("-"))
                .set_alignment(CellAlignment::Right),
            Cell::new(display_name(&listing.prefix, &file.key)),
        ]);
    }

    table.to_string()
}

/// The cached listing in the shape `ls` prints
pub(crate) fn cached_listing(cache: &ListingCache) -> Option<UserListing> {
    cache.listing().map(|listing| UserListing {
        prefix: cache.prefix().to_string(),
        listing: listing.clone(),
    })
}

/// Folder containing `key`, `None` for the home folder
pub(crate) fn parent_folder(key: &str) -> Option<&str> {
    key.rfind('/').map(|i| &key[..=i])
}

/// Strip the listed prefix so rows show names, not full paths
fn display_name<'a>(prefix: &str, key: &'a str) -> &'a str {
    key.strip_prefix(prefix).filter(|s| !s.is_empty()).unwrap_or(key)
}
