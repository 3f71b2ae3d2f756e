//! Profile management commands
//!
//! A profile holds the endpoint, bucket and credentials of a store plus
//! the user identity the file commands act as.

use clap::Subcommand;
use serde::Serialize;
use vault_core::{Error, Profile, ProfileManager, UserId};

use super::fail;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Profile subcommands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Add or update a profile
    Set(SetArgs),

    /// List all configured profiles
    List(ListArgs),

    /// Remove a profile
    Remove(RemoveArgs),
}

/// Arguments for the `profile set` command
#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Profile name (e.g., "default", "work")
    pub name: String,

    /// S3 endpoint URL (e.g., "http://localhost:9000")
    pub endpoint: String,

    /// Bucket holding the user folders
    pub bucket: String,

    /// Access key ID
    pub access_key: String,

    /// Secret access key
    pub secret_key: String,

    /// User identity the file commands act as
    #[arg(long)]
    pub user: Option<String>,

    /// AWS region
    #[arg(long, default_value = "us-east-1")]
    pub region: String,

    /// Bucket lookup style: auto, path, or dns
    #[arg(long, default_value = "auto")]
    pub bucket_lookup: String,
}

/// Arguments for the `profile list` command
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show full details including bucket and identity
    #[arg(short, long)]
    pub long: bool,
}

/// Arguments for the `profile remove` command
#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Name of the profile to remove
    pub name: String,
}

#[derive(Serialize)]
struct ProfileListOutput {
    profiles: Vec<ProfileInfo>,
}

/// Profile information for output (without credentials)
#[derive(Serialize)]
struct ProfileInfo {
    name: String,
    endpoint: String,
    bucket: String,
    region: String,
    bucket_lookup: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
}

impl From<&Profile> for ProfileInfo {
    fn from(profile: &Profile) -> Self {
        Self {
            name: profile.name.clone(),
            endpoint: profile.endpoint.clone(),
            bucket: profile.bucket.clone(),
            region: profile.region.clone(),
            bucket_lookup: profile.bucket_lookup.clone(),
            user_id: profile.user_id.clone(),
        }
    }
}

#[derive(Serialize)]
struct ProfileOperationOutput {
    success: bool,
    profile: String,
    message: String,
}

/// Execute a profile subcommand
pub async fn execute(cmd: ProfileCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let manager = match ProfileManager::new() {
        Ok(m) => m,
        Err(e) => return fail(&formatter, "Failed to load configuration", &e),
    };

    run(cmd, &manager, &formatter)
}

fn run(cmd: ProfileCommands, manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    match cmd {
        ProfileCommands::Set(args) => execute_set(args, manager, formatter),
        ProfileCommands::List(args) => execute_list(args, manager, formatter),
        ProfileCommands::Remove(args) => execute_remove(args, manager, formatter),
    }
}

fn execute_set(args: SetArgs, manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    if let Some(user) = args.user.as_deref() {
        if let Err(e) = UserId::from_claim(Some(user)) {
            formatter.error(&format!("Invalid user identity '{user}': {e}"));
            return ExitCode::UsageError;
        }
    }

    let mut profile = Profile::new(
        &args.name,
        &args.endpoint,
        &args.bucket,
        &args.access_key,
        &args.secret_key,
    );
    profile.region = args.region;
    profile.bucket_lookup = args.bucket_lookup;
    profile.user_id = args.user;

    match manager.set(profile) {
        Ok(()) => {
            operation_done(
                formatter,
                &args.name,
                format!("Profile '{}' configured successfully", args.name),
            );
            ExitCode::Success
        }
        Err(e) => fail(formatter, "Failed to save profile", &e),
    }
}

fn execute_list(args: ListArgs, manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    let profiles = match manager.list() {
        Ok(p) => p,
        Err(e) => return fail(formatter, "Failed to load profiles", &e),
    };

    if formatter.is_json() {
        formatter.json(&ProfileListOutput {
            profiles: profiles.iter().map(ProfileInfo::from).collect(),
        });
    } else if profiles.is_empty() {
        formatter.println("No profiles configured.");
    } else {
        for profile in &profiles {
            if args.long {
                formatter.println(&format!(
                    "{:<12} {} bucket={} user={} (region: {}, lookup: {})",
                    profile.name,
                    profile.endpoint,
                    profile.bucket,
                    profile.user_id.as_deref().unwrap_or("-"),
                    profile.region,
                    profile.bucket_lookup
                ));
            } else {
                formatter.println(&format!("{:<12} {}", profile.name, profile.endpoint));
            }
        }
    }

    ExitCode::Success
}

fn execute_remove(args: RemoveArgs, manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    match manager.remove(&args.name) {
        Ok(()) => {
            operation_done(
                formatter,
                &args.name,
                format!("Profile '{}' removed successfully", args.name),
            );
            ExitCode::Success
        }
        Err(Error::ProfileNotFound(_)) => {
            formatter.error(&format!("Profile '{}' not found", args.name));
            ExitCode::NotFound
        }
        Err(e) => fail(formatter, "Failed to remove profile", &e),
    }
}

fn operation_done(formatter: &Formatter, name: &str, message: String) {
    if formatter.is_json() {
        formatter.json(&ProfileOperationOutput {
            success: true,
            profile: name.to_string(),
            message,
        });
    } else {
        formatter.success(&message);
    }
}
