//! Settings configuration module
//!
//! Loads the service identity and key cache settings from an optional file
//! and from `CONSUL_CONFIG_*` environment variables, e.g.:
//!
//! ```text
//! CONSUL_CONFIG_SERVICE_NAME=billing
//! CONSUL_CONFIG_API_VERSION=v1
//! CONSUL_CONFIG_WEB_HOST_URL=http://billing-1:8080
//! CONSUL_CONFIG_HANDLER_FACTORY_PATH=api
//! CONSUL_CONFIG_KEY_CACHE__ENABLED=true
//! CONSUL_CONFIG_KEY_CACHE__MAX_ENTRIES=1024
//! ```

use std::path::Path;

use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::cache::CandidateKeyCache;
use crate::context::{HostConfig, HostContext};
use crate::error::{ConfigError, Result};

/// Prefix of the environment variables read by [`SettingsConfig::from_env`].
pub const ENV_PREFIX: &str = "CONSUL_CONFIG";

/// Candidate key cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyCacheConfig {
    /// Memoize candidate key lists
    pub enabled: bool,

    /// Maximum number of cached (key, context) entries
    pub max_entries: u64,
}

impl Default for KeyCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 1024,
        }
    }
}

/// Settings configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Service name; without it lookups use the default key only
    pub service_name: Option<String>,

    /// API version (e.g. `v1`)
    pub api_version: Option<String>,

    /// Base URL the service listens on (e.g. `http://127.0.0.1:8080`)
    pub web_host_url: Option<String>,

    /// Path handlers are mounted under
    pub handler_factory_path: Option<String>,

    pub key_cache: KeyCacheConfig,
}

impl SettingsConfig {
    /// Load from an optional file (format chosen by extension) overlaid with
    /// environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`SettingsConfig::load`] without validation, for callers that
    /// apply their own overrides first.
    pub fn read(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        Ok(builder
            .add_source(Self::environment())
            .build()?
            .try_deserialize()?)
    }

    /// Load from environment variables only.
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Load from the given variables instead of the process environment.
    pub fn from_env_map<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: ::config::Map<String, String> = vars.into_iter().collect();

        let config: Self = Config::builder()
            .add_source(Self::environment().source(Some(vars)))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    // Values stay strings; numeric and boolean fields are converted on
    // deserialization so identities like `007` or `1.0` are kept verbatim.
    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
    }

    /// Validate the settings configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.service_name {
            if name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "service_name must not be empty when set".to_string(),
                ));
            }
        }

        if let Some(url) = self.web_host_url.as_deref().filter(|u| !u.is_empty()) {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::ValidationError(format!(
                    "web_host_url must start with http:// or https://, got {}",
                    url
                )));
            }
        }

        if self.key_cache.enabled && self.key_cache.max_entries == 0 {
            return Err(ConfigError::ValidationError(
                "key_cache.max_entries must be greater than zero when the cache is enabled"
                    .to_string(),
            ));
        }

        if self.service_name.is_none() && self.has_host_config() {
            tracing::warn!(
                "Host configuration is set without a service name; lookups will use default keys only"
            );
        }

        Ok(())
    }

    /// Identity for key lookups, `None` when no service name is configured.
    pub fn host_context(&self) -> Option<HostContext> {
        let service_name = self.service_name.clone()?;
        let context = HostContext::new(service_name);

        if !self.has_host_config() {
            return Some(context);
        }

        Some(context.with_config(HostConfig {
            api_version: self.api_version.clone(),
            web_host_url: self.web_host_url.clone(),
            handler_factory_path: self.handler_factory_path.clone(),
        }))
    }

    /// Key cache described by this configuration, if enabled.
    pub fn key_cache(&self) -> Option<CandidateKeyCache> {
        self.key_cache
            .enabled
            .then(|| CandidateKeyCache::new(self.key_cache.max_entries))
    }

    fn has_host_config(&self) -> bool {
        self.api_version.is_some()
            || self.web_host_url.is_some()
            || self.handler_factory_path.is_some()
    }
}
