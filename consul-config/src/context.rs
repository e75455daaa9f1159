use serde::{Deserialize, Serialize};

/// Identity of the running service, used to narrow key lookups.
///
/// Passed explicitly to the key builder instead of being read from
/// process-wide host state. A context without a service name carries no
/// identity and collapses lookups to the default key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostContext {
    pub service_name: Option<String>,
    pub config: Option<HostConfig>,
}

/// Host configuration of the running service.
///
/// When present, lookups gain the instance- and version-specific levels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostConfig {
    pub api_version: Option<String>,
    pub web_host_url: Option<String>,
    pub handler_factory_path: Option<String>,
}

impl HostContext {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: Some(service_name.into()),
            config: None,
        }
    }

    pub fn with_config(mut self, config: HostConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.config_mut().api_version = Some(api_version.into());
        self
    }

    pub fn with_web_host_url(mut self, web_host_url: impl Into<String>) -> Self {
        self.config_mut().web_host_url = Some(web_host_url.into());
        self
    }

    pub fn with_handler_factory_path(mut self, path: impl Into<String>) -> Self {
        self.config_mut().handler_factory_path = Some(path.into());
        self
    }

    /// Service name, if one is set and non-empty.
    pub fn service_name(&self) -> Option<&str> {
        self.service_name.as_deref().filter(|name| !name.is_empty())
    }

    fn config_mut(&mut self) -> &mut HostConfig {
        self.config.get_or_insert_with(HostConfig::default)
    }
}

impl HostConfig {
    /// Derived identifier of this instance: host URL plus handler path,
    /// with the scheme dropped and `/` replaced by `|`.
    pub fn instance_id(&self) -> String {
        let host = match self.web_host_url.as_deref() {
            Some(url) if !url.is_empty() => {
                let with_slash = if url.ends_with('/') {
                    url.to_string()
                } else {
                    format!("{url}/")
                };
                let without_scheme = with_slash
                    .strip_prefix("http://")
                    .or_else(|| with_slash.strip_prefix("https://"))
                    .unwrap_or(&with_slash);
                without_scheme.replace('/', "|")
            }
            _ => String::new(),
        };

        format!("{}{}", host, self.handler_factory_path.as_deref().unwrap_or_default())
    }
}
