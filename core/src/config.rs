//! Host and transport configuration.
//!
//! The JSON shape is the one callers already write:
//!
//! ```json
//! {
//!   "host": "http://example.com",
//!   "prefix": "api/v1",
//!   "pluralizeModels": true,
//!   "socket": false,
//!   "responseSchemas": {
//!     "http":   { "success": "data", "error": "data" },
//!     "socket": { "success": "body" }
//!   }
//! }
//! ```
//!
//! Configuration can also be loaded from `CRUD_ACTIONS_*` environment
//! variables, see [`ActionsConfig::from_env`].

use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{ConstructionError, Result};

/// Default success/error path for HTTP responses.
pub const DEFAULT_HTTP_PATH: &str = "data";

/// Where the API lives and how URLs are built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConfig {
    /// Scheme and authority, e.g. `http://example.com`
    #[serde(default)]
    pub host: String,
    /// Optional path prefix, e.g. `api/v1`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Use the plural model name in URLs (default `true`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pluralize_models: Option<bool>,
}

impl HostConfig {
    /// Host-only configuration
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            prefix: None,
            pluralize_models: None,
        }
    }

    /// Set the path prefix
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Choose plural (`true`) or singular URL segments
    #[must_use]
    pub const fn with_pluralize_models(mut self, pluralize: bool) -> Self {
        self.pluralize_models = Some(pluralize);
        self
    }

    /// Reject a blank host.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::MissingHost`] when `host` is blank.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(ConstructionError::MissingHost);
        }
        Ok(())
    }

    /// `host` followed by `/prefix` when a prefix is set
    #[must_use]
    pub fn base_url(&self) -> String {
        let host = self.host.trim_end_matches('/');
        match self.prefix.as_deref().map(|p| p.trim_matches('/')) {
            Some(prefix) if !prefix.is_empty() => format!("{host}/{prefix}"),
            _ => host.to_string(),
        }
    }

    /// Whether URL segments use the plural model name
    #[must_use]
    pub fn pluralize_urls(&self) -> bool {
        self.pluralize_models.unwrap_or(true)
    }
}

/// Success and error paths for one backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaPaths {
    /// Path to the success payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    /// Path to the error payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-backend response schemas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSchemas {
    /// HTTP paths; unset entries fall back to `data`
    #[serde(default)]
    pub http: SchemaPaths,
    /// Socket paths; unset entries use the raw payload
    #[serde(default)]
    pub socket: SchemaPaths,
}

impl ResponseSchemas {
    /// Effective HTTP success path
    #[must_use]
    pub fn http_success(&self) -> Option<&str> {
        Some(self.http.success.as_deref().unwrap_or(DEFAULT_HTTP_PATH))
    }

    /// Effective HTTP error path
    #[must_use]
    pub fn http_error(&self) -> Option<&str> {
        Some(self.http.error.as_deref().unwrap_or(DEFAULT_HTTP_PATH))
    }

    /// Effective socket success path
    #[must_use]
    pub fn socket_success(&self) -> Option<&str> {
        self.socket.success.as_deref()
    }

    /// Effective socket error path
    #[must_use]
    pub fn socket_error(&self) -> Option<&str> {
        self.socket.error.as_deref()
    }
}

/// Backend selection plus response schemas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportConfig {
    /// `true` selects the socket backend
    #[serde(default)]
    pub socket: bool,
    /// Extraction paths
    #[serde(default)]
    pub response_schemas: ResponseSchemas,
}

/// Full configuration: host plus transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionsConfig {
    /// Host settings
    #[serde(flatten)]
    pub host: HostConfig,
    /// Transport settings
    #[serde(flatten)]
    pub transport: TransportConfig,
}

impl ActionsConfig {
    /// Parse the JSON shape shown in the module docs.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::InvalidConfig`] for malformed JSON and
    /// [`ConstructionError::MissingHost`] when no host is given.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ConstructionError::InvalidConfig(e.to_string()))?;
        config.host.validate()?;
        Ok(config)
    }

    /// Load from environment variables:
    ///
    /// - `CRUD_ACTIONS_HOST` (required)
    /// - `CRUD_ACTIONS_PREFIX`
    /// - `CRUD_ACTIONS_PLURALIZE_MODELS` (`true`/`false`)
    /// - `CRUD_ACTIONS_SOCKET` (`true`/`false`)
    /// - `CRUD_ACTIONS_HTTP_SUCCESS`, `CRUD_ACTIONS_HTTP_ERROR`
    /// - `CRUD_ACTIONS_SOCKET_SUCCESS`, `CRUD_ACTIONS_SOCKET_ERROR`
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::MissingHost`] when the host is unset and
    /// [`ConstructionError::InvalidConfig`] for unparsable booleans.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from any key lookup (used by [`Self::from_env`]).
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| -> Result<Option<bool>> {
            lookup(key)
                .map(|raw| {
                    raw.trim().parse::<bool>().map_err(|_| {
                        ConstructionError::InvalidConfig(format!(
                            "{key} must be true or false, got {raw:?}"
                        ))
                    })
                })
                .transpose()
        };

        let config = Self {
            host: HostConfig {
                host: lookup("CRUD_ACTIONS_HOST").unwrap_or_default(),
                prefix: lookup("CRUD_ACTIONS_PREFIX"),
                pluralize_models: flag("CRUD_ACTIONS_PLURALIZE_MODELS")?,
            },
            transport: TransportConfig {
                socket: flag("CRUD_ACTIONS_SOCKET")?.unwrap_or(false),
                response_schemas: ResponseSchemas {
                    http: SchemaPaths {
                        success: lookup("CRUD_ACTIONS_HTTP_SUCCESS"),
                        error: lookup("CRUD_ACTIONS_HTTP_ERROR"),
                    },
                    socket: SchemaPaths {
                        success: lookup("CRUD_ACTIONS_SOCKET_SUCCESS"),
                        error: lookup("CRUD_ACTIONS_SOCKET_ERROR"),
                    },
                },
            },
        };
        config.host.validate()?;
        Ok(config)
    }
}
