//! Configuration for migration and removal runs.
//!
//! Loaded from a TOML file:
//!
//! ```toml
//! [source]
//! domain = "old-team"
//! token = "src-token"
//!
//! [destination]
//! domain = "new-team"
//! token = "dst-token"
//! groups = [5]
//! author_id = 7
//! ```
//!
//! An optional `[remove]` section names the tenant the `remove` subcommand
//! operates on; it defaults to the source tenant.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::client::{ClientConfig, DEFAULT_BASE_URL};
use crate::error::{MigrationError, Result};

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_page_size() -> u64 {
    20
}

/// Credentials for one tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantConfig {
    /// Tenant domain (the `{domain}` segment of every API path).
    pub domain: String,
    /// API token for this tenant.
    pub token: String,
    /// API endpoint; overridable for tests against a mock server.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl TenantConfig {
    /// Wire-level client config for this tenant.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.domain, &self.token).with_base_url(&self.base_url)
    }
}

/// Destination tenant plus the identifiers migrated memos are created under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Tenant domain.
    pub domain: String,
    /// API token for this tenant.
    pub token: String,
    /// API endpoint; overridable for tests against a mock server.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Group ids the migrated memos are shared with (scope is always
    /// `group`).
    pub groups: Vec<u64>,
    /// Author id migrated memos and comments are attributed to.
    pub author_id: u64,
}

impl DestinationConfig {
    /// Wire-level client config for this tenant.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.domain, &self.token).with_base_url(&self.base_url)
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Tenant memos are read from.
    pub source: TenantConfig,
    /// Tenant memos are written to.
    pub destination: DestinationConfig,
    /// Listing page size for the migration loop.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Tenant the `remove` subcommand operates on; defaults to `source`.
    #[serde(default)]
    pub remove: Option<TenantConfig>,
}

impl MigrationConfig {
    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// parsed configuration is invalid.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| MigrationError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories as
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot
    /// be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| MigrationError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/docport/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("docport").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("docport")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/docport-config/config.toml")
        }
    }

    /// Check the invariants the pipeline relies on.
    pub fn validate(&self) -> Result<()> {
        if self.source.domain.is_empty() || self.source.token.is_empty() {
            return Err(MigrationError::Config(
                "source domain and token must be set".to_owned(),
            ));
        }
        if self.destination.domain.is_empty() || self.destination.token.is_empty() {
            return Err(MigrationError::Config(
                "destination domain and token must be set".to_owned(),
            ));
        }
        if self.destination.groups.is_empty() {
            return Err(MigrationError::Config(
                "destination.groups must name at least one group id".to_owned(),
            ));
        }
        if self.page_size == 0 {
            return Err(MigrationError::Config(
                "page_size must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}
