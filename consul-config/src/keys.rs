//! Candidate key construction.
//!
//! A logical key such as `timeout` may be stored at several levels of the
//! hierarchy. For service `svc`, version `v1` on `http://host:8080` with
//! handler path `/api` the candidates are, most specific first:
//!
//! ```text
//! ss/timeout/svc/i/host:8080|/api   instance
//! ss/timeout/svc/v1                 version
//! ss/timeout/svc                    service
//! ss/timeout                        default
//! ```

use crate::context::HostContext;

/// Namespace prefix applied to every key in the store.
pub const PREFIX: &str = "ss/";

/// Prefixed key with no service narrowing.
pub fn default_lookup_key(key: &str) -> String {
    format!("{PREFIX}{key}")
}

/// Every key under which `key` may be stored, ordered most to least specific.
pub fn possible_keys(key: &str, context: Option<&HostContext>) -> Vec<String> {
    let default_key = if key.starts_with(PREFIX) {
        key.to_string()
    } else {
        default_lookup_key(key)
    };

    let Some(context) = context else {
        return vec![default_key];
    };
    let Some(service_name) = context.service_name() else {
        return vec![default_key];
    };

    let service_key = format!("{default_key}/{service_name}");

    let Some(config) = &context.config else {
        return vec![service_key, default_key];
    };

    let version = config.api_version.as_deref().unwrap_or_default();
    let instance_id = config.instance_id();

    vec![
        format!("{service_key}/i/{instance_id}"),
        format!("{service_key}/{version}"),
        service_key,
        default_key,
    ]
}

/// Strips the namespace prefix from a stored key.
pub fn logical_key(stored_key: &str) -> &str {
    stored_key.strip_prefix(PREFIX).unwrap_or(stored_key)
}
