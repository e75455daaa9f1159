//! Application settings backed by a hierarchical key-value store.
//!
//! Every read expands the logical key into its candidate keys, fetches those
//! keys from the store and returns the most specific value found, so an
//! instance-level override beats a version-level one, which beats the
//! service default, which beats the global default.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::CandidateKeyCache;
use crate::config::SettingsConfig;
use crate::context::HostContext;
use crate::error::{ConfigError, Result};
use crate::keys::{default_lookup_key, logical_key, possible_keys, PREFIX};
use crate::resolver::select_most_specific;
use crate::store::{KeyValue, KeyValueStore};

pub struct ConsulAppSettings<S> {
    store: Arc<S>,
    context: Option<HostContext>,
    key_cache: Option<CandidateKeyCache>,
}

impl<S: KeyValueStore> ConsulAppSettings<S> {
    pub fn new(store: Arc<S>, context: Option<HostContext>) -> Self {
        Self {
            store,
            context,
            key_cache: None,
        }
    }

    /// Build from loaded configuration, attaching a key cache when enabled.
    pub fn from_config(store: Arc<S>, config: &SettingsConfig) -> Self {
        Self {
            store,
            context: config.host_context(),
            key_cache: config.key_cache(),
        }
    }

    pub fn with_key_cache(mut self, cache: CandidateKeyCache) -> Self {
        self.key_cache = Some(cache);
        self
    }

    pub fn context(&self) -> Option<&HostContext> {
        self.context.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Candidate keys for `key`, most specific first.
    pub fn possible_keys(&self, key: &str) -> Arc<[String]> {
        match &self.key_cache {
            Some(cache) => cache.get(key, self.context.as_ref()),
            None => possible_keys(key, self.context.as_ref()).into(),
        }
    }

    /// Raw value of the most specific entry stored for `key`.
    ///
    /// No decoding is applied; use [`ConsulAppSettings::get`] to read back
    /// values written with [`ConsulAppSettings::set`].
    pub async fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lookup(key).await?.map(|kv| kv.value))
    }

    /// Most specific value for `key`, decoded from JSON.
    ///
    /// A stored value that is not valid JSON is decoded as a bare string, so
    /// `30` reads as a number and `fast` reads as the string `"fast"`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(entry) = self.lookup(key).await? else {
            return Ok(None);
        };

        decode(&entry).map(Some)
    }

    pub async fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T> {
        Ok(self.get(key).await?.unwrap_or(default))
    }

    pub async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.lookup(key).await?.is_some())
    }

    /// Store `value` under the default key for `key`.
    ///
    /// Strings are written raw unless they would parse as JSON themselves
    /// (`30`, `true`, `"x"`), in which case they are JSON-encoded so that
    /// [`ConsulAppSettings::get`] returns the same string. Everything else
    /// is JSON-encoded.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let stored_key = if key.starts_with(PREFIX) {
            key.to_string()
        } else {
            default_lookup_key(key)
        };

        let encoded = serde_json::to_value(value).map_err(|source| ConfigError::SerializeError {
            key: stored_key.clone(),
            source,
        })?;
        let raw = match encoded {
            serde_json::Value::String(s)
                if serde_json::from_str::<serde_json::Value>(&s).is_err() =>
            {
                s
            }
            other => other.to_string(),
        };

        tracing::debug!(key = %stored_key, "Writing setting");
        self.store.set(&stored_key, &raw).await
    }

    /// Logical names of every key stored under the namespace prefix.
    pub async fn get_all_keys(&self) -> Result<Vec<String>> {
        let entries = self.store.list(PREFIX).await?;
        Ok(entries
            .iter()
            .map(|kv| logical_key(&kv.key).to_string())
            .collect())
    }

    /// Every entry under the namespace prefix, keyed by logical name.
    pub async fn get_all(&self) -> Result<BTreeMap<String, String>> {
        let entries = self.store.list(PREFIX).await?;
        Ok(entries
            .into_iter()
            .map(|kv| (logical_key(&kv.key).to_string(), kv.value))
            .collect())
    }

    async fn lookup(&self, key: &str) -> Result<Option<KeyValue>> {
        let possible = self.possible_keys(key);

        // Least specific first, as the resolver expects.
        let ascending: Vec<String> = possible.iter().rev().cloned().collect();
        let found = self.store.get_many(&ascending).await?;

        let best = select_most_specific(&*possible, &found).cloned();
        match &best {
            Some(kv) => tracing::debug!(
                key,
                resolved = %kv.key,
                candidates = found.len(),
                "Resolved setting"
            ),
            None => tracing::debug!(key, "No value stored for setting"),
        }

        Ok(best)
    }
}

fn decode<T: DeserializeOwned>(entry: &KeyValue) -> Result<T> {
    match serde_json::from_str(&entry.value) {
        Ok(value) => Ok(value),
        Err(json_err) => serde_json::from_value(serde_json::Value::String(entry.value.clone()))
            .map_err(|_| {
                tracing::warn!(key = %entry.key, error = %json_err, "Stored value could not be parsed");
                ConfigError::ParseError {
                    key: entry.key.clone(),
                    source: json_err,
                }
            }),
    }
}
