//! Client configuration.
use std::collections::BTreeMap;
use std::time::Duration;

use schemars::JsonSchema;
use schemars::schema::RootSchema;
use serde::Deserialize;
use serde::Serialize;
use url::Url;

use crate::error::ConfigurationError;
use crate::query_part::DEFAULT_INDENT_WIDTH;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how a [`Client`](crate::Client) talks to its API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ClientConfiguration {
    /// The GraphQL endpoint requests are posted to.
    pub endpoint: Url,

    /// Extra headers sent with every request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Request timeout, as a human readable duration such as `10s`.
    /// Defaults to 30s.
    #[serde(with = "humantime_serde", default = "default_timeout")]
    #[schemars(with = "String")]
    pub timeout: Duration,

    /// Spaces per nesting level in rendered queries. Defaults to 4.
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_indent_width() -> usize {
    DEFAULT_INDENT_WIDTH
}

impl ClientConfiguration {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            headers: BTreeMap::new(),
            timeout: DEFAULT_TIMEOUT,
            indent_width: DEFAULT_INDENT_WIDTH,
        }
    }

    /// Parses a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigurationError> {
        let configuration: Self = serde_yaml::from_str(yaml)?;
        tracing::debug!(
            endpoint = %configuration.endpoint,
            headers = configuration.headers.len(),
            "loaded client configuration"
        );
        Ok(configuration)
    }

    /// The JSON schema of the YAML accepted by [`ClientConfiguration::from_yaml`].
    pub fn json_schema() -> RootSchema {
        schemars::schema_for!(ClientConfiguration)
    }
}
