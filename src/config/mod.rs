//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Startup configuration for the API surface
///
/// Built once and shared with every handler through the router state. Every
/// field has a default, so an empty YAML document is a valid configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Versioned prefix under which the REST surface is mounted (e.g. "/v1")
    pub base_path: String,

    /// When false, only the health routes are served
    pub api_enabled: bool,

    /// Identifier of the root tenant provisioned by `/_setup`
    pub root_app_id: String,

    /// Display name given to the root tenant
    pub root_app_name: String,

    /// Page size used when a request does not pass `limit`
    pub default_limit: usize,

    /// Upper bound applied to any requested page size
    pub max_limit: usize,

    /// Separator between field and value in `terms` tuples, and between
    /// the endpoints of a link id
    pub separator: String,

    /// Header carrying the resolved tenant id
    pub app_header: String,

    /// Header carrying the authenticated user id
    pub user_header: String,

    /// Bind address for the standalone server
    pub listen_addr: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_path: "/v1".to_string(),
            api_enabled: true,
            root_app_id: "root".to_string(),
            root_app_name: "Root".to_string(),
            default_limit: 30,
            max_limit: 256,
            separator: ":".to_string(),
            app_header: "x-app-id".to_string(),
            user_header: "x-user-id".to_string(),
            listen_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

impl ApiConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path))?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `TENANTRY_*` environment overrides on top of this configuration
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(listen) = env::var("TENANTRY_LISTEN") {
            self.listen_addr = listen;
        }
        if let Ok(base) = env::var("TENANTRY_BASE_PATH") {
            self.base_path = base;
        }
        if let Ok(limit) = env::var("TENANTRY_DEFAULT_LIMIT") {
            self.default_limit = limit
                .parse()
                .with_context(|| format!("TENANTRY_DEFAULT_LIMIT is not a number: {}", limit))?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject values the router cannot work with
    pub fn validate(&self) -> Result<()> {
        if !self.base_path.starts_with('/') {
            anyhow::bail!("base_path must start with '/': {}", self.base_path);
        }
        if self.separator.is_empty() {
            anyhow::bail!("separator must not be empty");
        }
        if self.default_limit == 0 || self.default_limit > self.max_limit {
            anyhow::bail!(
                "default_limit must be within 1..={} (got {})",
                self.max_limit,
                self.default_limit
            );
        }
        Ok(())
    }

    /// Base path without a trailing slash, suitable for `Router::nest`
    pub fn mount_path(&self) -> &str {
        let trimmed = self.base_path.trim_end_matches('/');
        if trimmed.is_empty() { "/" } else { trimmed }
    }
}
