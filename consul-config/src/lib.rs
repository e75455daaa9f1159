//! Hierarchical settings resolution for Consul-backed services
//!
//! Settings live under the `ss/` namespace and may be overridden at several
//! levels. This crate provides:
//! - Candidate key construction from a logical key and the service identity
//! - Most-specific match selection over store results
//! - Memoization of candidate key lists
//! - A store-agnostic application settings facade
//! - Environment and file based configuration of the service identity
//!
//! # Specificity Levels
//!
//! - **Instance**: `ss/{key}/{service}/i/{host|path}`
//! - **Version**: `ss/{key}/{service}/{version}`
//! - **Service**: `ss/{key}/{service}`
//! - **Default**: `ss/{key}`
//!
//! # Example
//!
//! ```rust
//! use consul_config::{most_specific_match, possible_keys, HostContext, KeyValue};
//!
//! let context = HostContext::new("svc")
//!     .with_api_version("v1")
//!     .with_web_host_url("http://host:8080")
//!     .with_handler_factory_path("/api");
//!
//! let keys = possible_keys("timeout", Some(&context));
//! assert_eq!(keys[0], "ss/timeout/svc/i/host:8080|/api");
//!
//! // Store results, least specific first
//! let found = vec![
//!     KeyValue::new("ss/timeout", "10"),
//!     KeyValue::new("ss/timeout/svc", "20"),
//! ];
//! let best = most_specific_match(&found, "timeout", Some(&context));
//! assert_eq!(best.map(|kv| kv.value.as_str()), Some("20"));
//! ```

pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod keys;
pub mod resolver;
pub mod settings;
pub mod store;

pub use cache::CandidateKeyCache;
pub use crate::config::{KeyCacheConfig, SettingsConfig};
pub use context::{HostConfig, HostContext};
pub use error::{ConfigError, Result};
pub use keys::{default_lookup_key, possible_keys, PREFIX};
pub use resolver::{most_specific_match, select_most_specific};
pub use settings::ConsulAppSettings;
pub use store::{InMemoryStore, KeyValue, KeyValueStore};
