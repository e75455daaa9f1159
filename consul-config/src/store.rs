//! Key-value store seam.
//!
//! The network client for Consul lives outside this crate. Anything that can
//! answer point lookups and prefix listings implements [`KeyValueStore`];
//! [`InMemoryStore`] covers tests and local development.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single entry returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value")]
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Trait for key-value stores backing application settings
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Store name, used in logs and errors
    fn name(&self) -> &str;

    /// Get a single entry, `None` when the key does not exist
    async fn get(&self, key: &str) -> Result<Option<KeyValue>>;

    /// Get several entries at once.
    ///
    /// Found entries are returned in the order of `keys`; missing keys are
    /// skipped.
    async fn get_many(&self, keys: &[String]) -> Result<Vec<KeyValue>> {
        let mut found = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(entry) = self.get(key).await? {
                found.push(entry);
            }
        }
        Ok(found)
    }

    /// Write an entry, replacing any existing value
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// List every entry whose key starts with `prefix`
    async fn list(&self, prefix: &str) -> Result<Vec<KeyValue>>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn get(&self, key: &str) -> Result<Option<KeyValue>> {
        Ok(self
            .entries
            .read()
            .get(key)
            .map(|value| KeyValue::new(key, value.clone())))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<KeyValue>> {
        Ok(self
            .entries
            .read()
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| KeyValue::new(key.clone(), value.clone()))
            .collect())
    }
}
