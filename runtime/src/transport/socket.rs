//! Message/acknowledgement backend over a persistent channel.
//!
//! Each request is one [`SocketRequest`] message (`{method, headers, url,
//! data?}`); the peer answers with a [`SocketAck`] whose `statusCode` follows
//! HTTP conventions. A 2xx acknowledgement is a success.
//!
//! [`socket_channel`] provides an in-process channel pair built on tokio
//! `mpsc` + `oneshot`; other channels (websocket bridges, IPC) plug in by
//! implementing [`SocketChannel`].

use super::{BackendFailure, Body, Headers, Method, Request};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Request message sent over the channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SocketRequest {
    /// Lower-case method (`get`, `post`, ...)
    pub method: Method,
    /// Headers, when any were resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
    /// Target URL
    pub url: String,
    /// Body for `post`/`put`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Acknowledgement returned by the peer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocketAck {
    /// HTTP-style status code
    pub status_code: u16,
    /// Response payload
    #[serde(default)]
    pub body: Value,
}

impl SocketAck {
    /// `200` with `body`
    #[must_use]
    pub const fn ok(body: Value) -> Self {
        Self {
            status_code: 200,
            body,
        }
    }

    /// Arbitrary status with `body`
    #[must_use]
    pub const fn with_status(status_code: u16, body: Value) -> Self {
        Self { status_code, body }
    }

    /// Whether the status is in the 2xx range
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Channel-level failures (no acknowledgement was received).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SocketError {
    /// The peer side of the channel is gone
    #[error("socket channel closed")]
    Closed,

    /// The peer dropped the request without acknowledging it
    #[error("socket request dropped without acknowledgement")]
    Unacknowledged,
}

/// A persistent, bidirectional request channel.
///
/// # Dyn Compatibility
///
/// Uses explicit `Pin<Box<dyn Future>>` returns so transports can hold an
/// `Arc<dyn SocketChannel>`.
pub trait SocketChannel: Send + Sync {
    /// Submit `request` and wait for its acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns [`SocketError`] when no acknowledgement arrives.
    fn request(
        &self,
        request: SocketRequest,
    ) -> Pin<Box<dyn Future<Output = Result<SocketAck, SocketError>> + Send + '_>>;
}

/// Socket backend wrapping a [`SocketChannel`].
#[derive(Clone)]
pub struct SocketBackend {
    channel: Arc<dyn SocketChannel>,
}

impl SocketBackend {
    /// Backend over `channel`
    #[must_use]
    pub fn new(channel: Arc<dyn SocketChannel>) -> Self {
        Self { channel }
    }

    pub(crate) async fn send(&self, request: Request) -> Result<Value, BackendFailure> {
        let data = match request.body {
            Some(Body::Json(data)) => Some(data),
            Some(Body::Form(_)) => {
                return Err(BackendFailure::unanswered(
                    "multipart form payloads cannot be sent over the socket transport",
                ));
            }
            None => None,
        };

        let message = SocketRequest {
            method: request.method,
            headers: request.headers,
            url: request.url,
            data,
        };

        let ack = self
            .channel
            .request(message)
            .await
            .map_err(|e| BackendFailure::unanswered(e.to_string()))?;

        if ack.is_success() {
            Ok(ack.body)
        } else {
            Err(BackendFailure {
                status: Some(ack.status_code),
                payload: ack.body,
            })
        }
    }
}

impl std::fmt::Debug for SocketBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketBackend").finish_non_exhaustive()
    }
}

/// A request received by the server side, with its reply slot.
#[derive(Debug)]
pub struct SocketEnvelope {
    /// The request as sent
    pub request: SocketRequest,
    reply: oneshot::Sender<SocketAck>,
}

impl SocketEnvelope {
    /// Acknowledge the request. A client that stopped waiting is ignored.
    pub fn respond(self, ack: SocketAck) {
        let _ = self.reply.send(ack);
    }
}

/// Client side of an in-process channel.
#[derive(Clone, Debug)]
pub struct ChannelSocket {
    sender: mpsc::Sender<SocketEnvelope>,
}

impl SocketChannel for ChannelSocket {
    fn request(
        &self,
        request: SocketRequest,
    ) -> Pin<Box<dyn Future<Output = Result<SocketAck, SocketError>> + Send + '_>> {
        Box::pin(async move {
            let (reply, ack) = oneshot::channel();
            self.sender
                .send(SocketEnvelope { request, reply })
                .await
                .map_err(|_| SocketError::Closed)?;
            ack.await.map_err(|_| SocketError::Unacknowledged)
        })
    }
}

/// Server side of an in-process channel.
#[derive(Debug)]
pub struct SocketServer {
    receiver: mpsc::Receiver<SocketEnvelope>,
}

impl SocketServer {
    /// Next request, or `None` once every client handle is dropped
    pub async fn next(&mut self) -> Option<SocketEnvelope> {
        self.receiver.recv().await
    }

    /// Answer every request with `handler` until the clients are gone.
    pub async fn serve<F>(mut self, handler: F)
    where
        F: Fn(&SocketRequest) -> SocketAck + Send,
    {
        while let Some(envelope) = self.next().await {
            tracing::debug!(
                method = ?envelope.request.method,
                url = %envelope.request.url,
                "Socket request received"
            );
            let ack = handler(&envelope.request);
            envelope.respond(ack);
        }
    }
}

/// Create a connected client/server pair holding up to `buffer` queued requests.
///
/// # Example
///
/// ```
/// use crud_actions_runtime::transport::{socket_channel, SocketAck};
/// use serde_json::json;
///
/// # async fn example() {
/// let (client, server) = socket_channel(8);
/// tokio::spawn(server.serve(|_request| SocketAck::ok(json!({"name": "general"}))));
/// # drop(client);
/// # }
/// ```
#[must_use]
pub fn socket_channel(buffer: usize) -> (ChannelSocket, SocketServer) {
    let (sender, receiver) = mpsc::channel(buffer);
    (ChannelSocket { sender }, SocketServer { receiver })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn test_ack_status_ranges() {
        assert!(SocketAck::ok(Value::Null).is_success());
        assert!(SocketAck::with_status(204, Value::Null).is_success());
        assert!(!SocketAck::with_status(199, Value::Null).is_success());
        assert!(!SocketAck::with_status(300, Value::Null).is_success());
        assert!(!SocketAck::with_status(500, Value::Null).is_success());
    }

    #[test]
    fn test_request_wire_shape() {
        let request = SocketRequest {
            method: Method::Post,
            headers: None,
            url: "testUrl".to_string(),
            data: Some(json!({"test": 123})),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"method": "post", "url": "testUrl", "data": {"test": 123}})
        );
    }

    #[tokio::test]
    async fn test_closed_server_is_reported() {
        let (client, server) = socket_channel(1);
        drop(server);
        let result = client
            .request(SocketRequest {
                method: Method::Get,
                headers: None,
                url: "testUrl".to_string(),
                data: None,
            })
            .await;
        assert_eq!(result, Err(SocketError::Closed));
    }
}
