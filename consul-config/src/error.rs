use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration source error: {0}")]
    SourceError(#[from] ::config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Remote configuration store '{store}' failed: {message}")]
    RemoteStoreError { store: String, message: String },

    #[error("Value stored for '{key}' could not be parsed: {source}")]
    ParseError {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Value for '{key}' could not be serialized: {source}")]
    SerializeError {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl ConfigError {
    pub fn remote_store(store: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteStoreError {
            store: store.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
