//! Transport provider.
//!
//! One `get`/`post`/`put`/`delete` contract over two backends:
//!
//! - [`HttpBackend`]: request/response over `reqwest`
//! - [`SocketBackend`]: request/acknowledgement over a persistent
//!   [`SocketChannel`]
//!
//! The backend is picked once, when the [`Transport`] is built. Every raw
//! success and failure payload is run through the configured response schema
//! (a dot path) before it reaches the caller. Failures are never retried.

mod http;
mod socket;

pub use http::HttpBackend;
pub use socket::{
    ChannelSocket, SocketAck, SocketBackend, SocketChannel, SocketEnvelope, SocketError,
    SocketRequest, SocketServer, socket_channel,
};

use crud_actions_core::error::ConstructionError;
use crud_actions_core::schema;
use crud_actions_core::{FormData, ResponseSchemas, TransportConfig};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Request headers, name → value.
pub type Headers = BTreeMap<String, String>;

/// Request method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

/// Request body.
#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    /// JSON document
    Json(Value),
    /// Multipart form, sent unmodified
    Form(FormData),
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<FormData> for Body {
    fn from(form: FormData) -> Self {
        Self::Form(form)
    }
}

/// One outgoing request.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    /// Method
    pub method: Method,
    /// Absolute URL
    pub url: String,
    /// Headers resolved for this call
    pub headers: Option<Headers>,
    /// Body for `post`/`put`
    pub body: Option<Body>,
}

/// A failed request, after schema extraction.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("request failed (status {status:?}): {payload}")]
pub struct TransportError {
    /// HTTP status or socket acknowledgement code; `None` when the request
    /// never got an answer
    pub status: Option<u16>,
    /// Schema-extracted error payload
    pub payload: Value,
}

/// Raw failure reported by a backend, before extraction.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BackendFailure {
    pub(crate) status: Option<u16>,
    pub(crate) payload: Value,
}

impl BackendFailure {
    /// A failure with no response at all: `{message}`
    pub(crate) fn unanswered(message: impl Into<String>) -> Self {
        let mut payload = Map::new();
        payload.insert("message".to_string(), Value::String(message.into()));
        Self {
            status: None,
            payload: Value::Object(payload),
        }
    }
}

/// Which backend a transport uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// Request/response HTTP
    Http,
    /// Message/acknowledgement socket
    Socket,
}

#[derive(Clone)]
enum Backend {
    Http(HttpBackend),
    Socket(SocketBackend),
}

impl Backend {
    const fn kind(&self) -> BackendKind {
        match self {
            Self::Http(_) => BackendKind::Http,
            Self::Socket(_) => BackendKind::Socket,
        }
    }

    async fn send(&self, request: Request) -> Result<Value, BackendFailure> {
        match self {
            Self::Http(http) => http.send(request).await,
            Self::Socket(socket) => socket.send(request).await,
        }
    }
}

/// Transport provider shared by every action creator of a generator.
///
/// Cheap to clone and safe to use from many in-flight calls at once; it holds
/// no per-call state.
#[derive(Clone)]
pub struct Transport {
    backend: Backend,
    schemas: Arc<ResponseSchemas>,
}

impl Transport {
    /// HTTP transport with a fresh `reqwest` client
    #[must_use]
    pub fn http(schemas: ResponseSchemas) -> Self {
        Self::with_http_backend(HttpBackend::new(), schemas)
    }

    /// HTTP transport over an existing backend
    #[must_use]
    pub fn with_http_backend(backend: HttpBackend, schemas: ResponseSchemas) -> Self {
        Self {
            backend: Backend::Http(backend),
            schemas: Arc::new(schemas),
        }
    }

    /// Socket transport over `channel`
    #[must_use]
    pub fn socket(channel: Arc<dyn SocketChannel>, schemas: ResponseSchemas) -> Self {
        Self {
            backend: Backend::Socket(SocketBackend::new(channel)),
            schemas: Arc::new(schemas),
        }
    }

    /// Build from configuration: `socket: true` selects the socket backend.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::MissingSocketChannel`] when the socket
    /// backend is selected but `channel` is `None`.
    pub fn from_config(
        config: &TransportConfig,
        channel: Option<Arc<dyn SocketChannel>>,
    ) -> Result<Self, ConstructionError> {
        let schemas = config.response_schemas.clone();
        if config.socket {
            let channel = channel.ok_or(ConstructionError::MissingSocketChannel)?;
            Ok(Self::socket(channel, schemas))
        } else {
            Ok(Self::http(schemas))
        }
    }

    /// The active backend
    #[must_use]
    pub const fn kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// `GET url`
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] carrying the extracted error payload.
    pub async fn get(&self, headers: Option<Headers>, url: &str) -> Result<Value, TransportError> {
        self.request(Request {
            method: Method::Get,
            url: url.to_string(),
            headers,
            body: None,
        })
        .await
    }

    /// `POST url` with `data`
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] carrying the extracted error payload.
    pub async fn post(
        &self,
        headers: Option<Headers>,
        url: &str,
        data: impl Into<Body>,
    ) -> Result<Value, TransportError> {
        self.request(Request {
            method: Method::Post,
            url: url.to_string(),
            headers,
            body: Some(data.into()),
        })
        .await
    }

    /// `PUT url` with `data`
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] carrying the extracted error payload.
    pub async fn put(
        &self,
        headers: Option<Headers>,
        url: &str,
        data: impl Into<Body>,
    ) -> Result<Value, TransportError> {
        self.request(Request {
            method: Method::Put,
            url: url.to_string(),
            headers,
            body: Some(data.into()),
        })
        .await
    }

    /// `DELETE url`
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] carrying the extracted error payload.
    pub async fn delete(
        &self,
        headers: Option<Headers>,
        url: &str,
    ) -> Result<Value, TransportError> {
        self.request(Request {
            method: Method::Delete,
            url: url.to_string(),
            headers,
            body: None,
        })
        .await
    }

    /// Send `request` and extract the payload.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] carrying the extracted error payload.
    #[tracing::instrument(
        skip(self, request),
        name = "transport_request",
        fields(method = ?request.method, url = %request.url, backend = ?self.kind())
    )]
    pub async fn request(&self, request: Request) -> Result<Value, TransportError> {
        // Responses are not cached; every call goes to the backend.
        match self.backend.send(request).await {
            Ok(raw) => {
                tracing::trace!(path = ?self.success_path(), "Extracting success payload");
                Ok(schema::extract(raw, self.success_path()))
            }
            Err(BackendFailure { status, payload }) => {
                tracing::warn!(?status, "Transport request failed");
                Err(TransportError {
                    status,
                    payload: schema::extract(payload, self.error_path()),
                })
            }
        }
    }

    fn success_path(&self) -> Option<&str> {
        match self.kind() {
            BackendKind::Http => self.schemas.http_success(),
            BackendKind::Socket => self.schemas.socket_success(),
        }
    }

    fn error_path(&self) -> Option<&str> {
        match self.kind() {
            BackendKind::Http => self.schemas.http_error(),
            BackendKind::Socket => self.schemas.socket_error(),
        }
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("backend", &self.kind())
            .field("schemas", &self.schemas)
            .finish()
    }
}
