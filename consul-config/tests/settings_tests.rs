//! Settings resolution against an in-memory store
//!
//! Covers the full read path: candidate key expansion, store lookup in
//! least-specific-first order and most specific match selection.

use std::sync::Arc;

use consul_config::{
    CandidateKeyCache, ConfigError, ConsulAppSettings, HostContext, InMemoryStore, KeyValueStore,
    SettingsConfig,
};
use serde::Deserialize;

fn full_context() -> HostContext {
    HostContext::new("svc")
        .with_api_version("v1")
        .with_web_host_url("http://host:8080")
        .with_handler_factory_path("/api")
}

fn layered_store() -> InMemoryStore {
    InMemoryStore::with_entries([
        ("ss/timeout", "10"),
        ("ss/timeout/svc", "20"),
        ("ss/timeout/svc/v1", "30"),
        ("ss/timeout/svc/i/host:8080|/api", "40"),
        ("ss/retries", "3"),
        ("ss/retries/other", "9"),
        ("ss/mode/svc", "fast"),
    ])
}

// =============================================================================
// SPECIFICITY
// =============================================================================

#[tokio::test]
async fn test_instance_value_wins_over_all_others() {
    let settings = ConsulAppSettings::new(Arc::new(layered_store()), Some(full_context()));

    assert_eq!(settings.get::<u32>("timeout").await.unwrap(), Some(40));
}

#[tokio::test]
async fn test_each_level_falls_back_to_the_next() {
    let store = Arc::new(layered_store());
    let settings = ConsulAppSettings::new(store.clone(), Some(full_context()));

    let other_instance = HostContext::new("svc")
        .with_api_version("v1")
        .with_web_host_url("http://other:9090")
        .with_handler_factory_path("/api");
    let settings_v1 = ConsulAppSettings::new(store.clone(), Some(other_instance));
    assert_eq!(settings_v1.get::<u32>("timeout").await.unwrap(), Some(30));

    let settings_v2 = ConsulAppSettings::new(
        store.clone(),
        Some(HostContext::new("svc").with_api_version("v2")),
    );
    assert_eq!(settings_v2.get::<u32>("timeout").await.unwrap(), Some(20));

    let settings_no_context = ConsulAppSettings::new(store, None);
    assert_eq!(settings_no_context.get::<u32>("timeout").await.unwrap(), Some(10));

    // Value for another service is never picked up.
    assert_eq!(settings.get::<u32>("retries").await.unwrap(), Some(3));
}

#[tokio::test]
async fn test_missing_setting() {
    let settings = ConsulAppSettings::new(Arc::new(layered_store()), Some(full_context()));

    assert_eq!(settings.get_string("missing").await.unwrap(), None);
    assert!(!settings.exists("missing").await.unwrap());
    assert_eq!(settings.get_or("missing", 7u32).await.unwrap(), 7);
    assert!(settings.exists("timeout").await.unwrap());
}

#[tokio::test]
async fn test_prefixed_logical_key_resolves_the_same() {
    let settings = ConsulAppSettings::new(Arc::new(layered_store()), Some(full_context()));

    assert_eq!(
        settings.get_string("ss/timeout").await.unwrap(),
        settings.get_string("timeout").await.unwrap()
    );
}

// =============================================================================
// VALUE DECODING
// =============================================================================

#[derive(Debug, Deserialize, PartialEq)]
struct Limits {
    max: u32,
    burst: Option<u32>,
}

#[tokio::test]
async fn test_set_then_get_structured_value() {
    let settings = ConsulAppSettings::new(Arc::new(InMemoryStore::new()), None);

    settings
        .set("limits", &serde_json::json!({ "max": 5 }))
        .await
        .unwrap();

    let limits: Option<Limits> = settings.get("limits").await.unwrap();
    assert_eq!(limits, Some(Limits { max: 5, burst: None }));
    assert_eq!(
        settings.store().get("ss/limits").await.unwrap().map(|kv| kv.value),
        Some("{\"max\":5}".to_string())
    );
}

#[tokio::test]
async fn test_bare_string_values() {
    let settings = ConsulAppSettings::new(Arc::new(layered_store()), Some(full_context()));

    assert_eq!(settings.get::<String>("mode").await.unwrap().as_deref(), Some("fast"));
    assert_eq!(settings.get_string("mode").await.unwrap().as_deref(), Some("fast"));
}

#[tokio::test]
async fn test_strings_read_back_unchanged() {
    let settings = ConsulAppSettings::new(Arc::new(InMemoryStore::new()), None);

    for value in ["\"quoted\"", "30", "true", "null", "[1,2]", "plain", ""] {
        settings.set("greeting", value).await.unwrap();
        assert_eq!(
            settings.get::<String>("greeting").await.unwrap().as_deref(),
            Some(value),
            "stored as {:?}",
            settings.get_string("greeting").await.unwrap()
        );
    }
}

#[tokio::test]
async fn test_unparseable_value_is_an_error() {
    let settings = ConsulAppSettings::new(Arc::new(layered_store()), Some(full_context()));

    let err = settings.get::<u32>("mode").await.unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { ref key, .. } if key == "ss/mode/svc"));
}

// =============================================================================
// LISTING
// =============================================================================

#[tokio::test]
async fn test_get_all_strips_prefix() {
    let store = InMemoryStore::with_entries([
        ("ss/a", "1"),
        ("ss/b/svc", "2"),
        ("other/c", "3"),
    ]);
    let settings = ConsulAppSettings::new(Arc::new(store), None);

    assert_eq!(settings.get_all_keys().await.unwrap(), vec!["a", "b/svc"]);

    let all = settings.get_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all.get("b/svc").map(String::as_str), Some("2"));
}

// =============================================================================
// CONFIGURATION
// =============================================================================

#[tokio::test]
async fn test_from_config_with_cache() {
    let config = SettingsConfig::from_env_map([
        ("CONSUL_CONFIG_SERVICE_NAME".to_string(), "svc".to_string()),
        ("CONSUL_CONFIG_API_VERSION".to_string(), "v1".to_string()),
        ("CONSUL_CONFIG_KEY_CACHE__MAX_ENTRIES".to_string(), "8".to_string()),
    ])
    .unwrap();

    let settings = ConsulAppSettings::from_config(Arc::new(layered_store()), &config);

    let first = settings.possible_keys("timeout");
    let second = settings.possible_keys("timeout");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(&*first, ["ss/timeout/svc/i/", "ss/timeout/svc/v1", "ss/timeout/svc", "ss/timeout"]);

    assert_eq!(settings.get::<u32>("timeout").await.unwrap(), Some(30));
}

#[tokio::test]
async fn test_explicit_key_cache_gives_same_results() {
    let uncached = ConsulAppSettings::new(Arc::new(layered_store()), Some(full_context()));
    let cached = ConsulAppSettings::new(Arc::new(layered_store()), Some(full_context()))
        .with_key_cache(CandidateKeyCache::new(4));

    for key in ["timeout", "retries", "mode", "missing"] {
        assert_eq!(
            cached.get_string(key).await.unwrap(),
            uncached.get_string(key).await.unwrap()
        );
    }
}
