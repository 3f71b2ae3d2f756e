//! Configuration management
//!
//! This module handles loading, saving, and migrating the vault configuration
//! file. The configuration file is stored in TOML format at
//! `$VAULT_CONFIG_DIR/config.toml`, falling back to `~/.config/vault/config.toml`.
//!
//! PROTECTED FILE: Changes to schema_version require migration support.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::delete::MAX_DELETE_BATCH;
use crate::error::{Error, Result};
use crate::profile::Profile;

/// Current configuration schema version
///
/// IMPORTANT: Bumping this version requires a migration in
/// [`ConfigManager::migrate`] and a matching test.
pub const SCHEMA_VERSION: u32 = 1;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "VAULT_CONFIG_DIR";

/// Default output format
const DEFAULT_OUTPUT: &str = "human";

/// Default color setting
const DEFAULT_COLOR: &str = "auto";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema version for migration support
    pub schema_version: u32,

    /// Default settings
    #[serde(default)]
    pub defaults: Defaults,

    /// File service settings
    #[serde(default)]
    pub service: ServiceConfig,

    /// Configured store profiles
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

/// Default settings for CLI behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Output format: "human" or "json"
    #[serde(default = "default_output")]
    pub output: String,

    /// Color mode: "auto", "always", or "never"
    #[serde(default = "default_color")]
    pub color: String,

    /// Show progress spinners
    #[serde(default = "default_true")]
    pub progress: bool,
}

/// Settings for the file service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Lifetime of presigned upload URLs in seconds
    #[serde(default = "default_upload_expiry")]
    pub upload_url_expiry_secs: u64,

    /// Lifetime of presigned download URLs in seconds
    #[serde(default = "default_download_expiry")]
    pub download_url_expiry_secs: u64,

    /// Keys per bulk delete request
    #[serde(default = "default_delete_batch")]
    pub delete_batch_size: usize,

    /// Content type used when the caller does not supply one
    #[serde(default = "default_content_type")]
    pub default_content_type: String,
}

fn default_output() -> String {
    DEFAULT_OUTPUT.to_string()
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn default_true() -> bool {
    true
}

fn default_upload_expiry() -> u64 {
    300
}

fn default_download_expiry() -> u64 {
    60
}

fn default_delete_batch() -> usize {
    MAX_DELETE_BATCH
}

fn default_content_type() -> String {
    "application/octet-stream".to_string()
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            progress: true,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            upload_url_expiry_secs: default_upload_expiry(),
            download_url_expiry_secs: default_download_expiry(),
            delete_batch_size: default_delete_batch(),
            default_content_type: default_content_type(),
        }
    }
}

impl ServiceConfig {
    pub fn upload_url_expiry(&self) -> Duration {
        Duration::from_secs(self.upload_url_expiry_secs)
    }

    pub fn download_url_expiry(&self) -> Duration {
        Duration::from_secs(self.download_url_expiry_secs)
    }

    /// Check values against store limits
    pub fn validate(&self) -> Result<()> {
        // SigV4 presigned URLs are valid for at most 7 days
        const MAX_EXPIRY: u64 = 7 * 24 * 3600;

        for (name, secs) in [
            ("upload_url_expiry_secs", self.upload_url_expiry_secs),
            ("download_url_expiry_secs", self.download_url_expiry_secs),
        ] {
            if secs == 0 || secs > MAX_EXPIRY {
                return Err(Error::Config(format!(
                    "{name} must be between 1 and {MAX_EXPIRY}"
                )));
            }
        }

        if self.delete_batch_size == 0 || self.delete_batch_size > MAX_DELETE_BATCH {
            return Err(Error::Config(format!(
                "delete_batch_size must be between 1 and {MAX_DELETE_BATCH}"
            )));
        }

        if self.default_content_type.is_empty() {
            return Err(Error::Config("default_content_type cannot be empty".into()));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            defaults: Defaults::default(),
            service: ServiceConfig::default(),
            profiles: Vec::new(),
        }
    }
}

/// Configuration manager handles loading and saving config
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the default config path
    pub fn new() -> Result<Self> {
        let config_dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .ok_or_else(|| Error::Config("Could not determine config directory".into()))?
                .join("vault"),
        };
        Ok(Self {
            config_path: config_dir.join("config.toml"),
        })
    }

    /// Create a ConfigManager with a custom path (useful for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load configuration from disk
    ///
    /// If the configuration file doesn't exist, returns a default configuration.
    /// If the schema version doesn't match, attempts migration.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        if config.schema_version < SCHEMA_VERSION {
            config = self.migrate(config)?;
        } else if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration file version {} is newer than supported version {}. Please upgrade vault.",
                config.schema_version, SCHEMA_VERSION
            )));
        }

        config.service.validate()?;
        Ok(config)
    }

    /// Save configuration to disk
    ///
    /// Creates parent directories if they don't exist.
    /// Sets file permissions to 600 (owner read/write only).
    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config)?;
        std::fs::write(&self.config_path, content)?;

        // Profiles hold credentials
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.config_path, permissions)?;
        }

        Ok(())
    }

    /// Migrate configuration from older schema version
    fn migrate(&self, config: Config) -> Result<Config> {
        let mut config = config;
        tracing::info!(
            from = config.schema_version,
            to = SCHEMA_VERSION,
            "migrating configuration"
        );
        config.schema_version = SCHEMA_VERSION;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let manager = ConfigManager::with_path(config_path);
        (manager, temp_dir)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.schema_version, SCHEMA_VERSION);
        assert_eq!(config.defaults.output, "human");
        assert_eq!(config.defaults.color, "auto");
        assert!(config.defaults.progress);
        assert!(config.profiles.is_empty());
        assert_eq!(config.service.upload_url_expiry(), Duration::from_secs(300));
        assert_eq!(config.service.download_url_expiry(), Duration::from_secs(60));
        assert_eq!(config.service.delete_batch_size, 1000);
        assert_eq!(config.service.default_content_type, "application/octet-stream");
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let (manager, _temp_dir) = temp_config_manager();
        let config = manager.load().unwrap();
        assert_eq!(config.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_save_and_load() {
        let (manager, _temp_dir) = temp_config_manager();

        let mut config = Config::default();
        config.service.download_url_expiry_secs = 120;
        config.profiles.push(Profile::new(
            "test",
            "http://localhost:9000",
            "files",
            "accesskey",
            "secretkey",
        ));

        manager.save(&config).unwrap();
        let loaded = manager.load().unwrap();

        assert_eq!(loaded.profiles.len(), 1);
        assert_eq!(loaded.profiles[0].name, "test");
        assert_eq!(loaded.profiles[0].bucket, "files");
        assert_eq!(loaded.service.download_url_expiry_secs, 120);
    }

    #[test]
    fn test_partial_service_section_uses_defaults() {
        let (manager, _temp_dir) = temp_config_manager();
        std::fs::write(
            manager.config_path(),
            "schema_version = 1\n[service]\ndelete_batch_size = 250\n",
        )
        .unwrap();

        let config = manager.load().unwrap();
        assert_eq!(config.service.delete_batch_size, 250);
        assert_eq!(config.service.upload_url_expiry_secs, 300);
    }

    #[test]
    fn test_invalid_service_config_is_rejected() {
        let (manager, _temp_dir) = temp_config_manager();
        std::fs::write(
            manager.config_path(),
            "schema_version = 1\n[service]\ndelete_batch_size = 5000\n",
        )
        .unwrap();

        let result = manager.load();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_schema_version_too_new() {
        let (manager, _temp_dir) = temp_config_manager();

        let content = format!(
            r#"
            schema_version = {}
            "#,
            SCHEMA_VERSION + 1
        );
        std::fs::write(manager.config_path(), content).unwrap();

        let result = manager.load();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("newer than supported"));
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_config_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let (manager, _temp_dir) = temp_config_manager();
        manager.save(&Config::default()).unwrap();
        let mode = std::fs::metadata(manager.config_path())
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
