//! # Crud Actions Testing
//!
//! Testing utilities and mocks for crud-actions.
//!
//! This crate provides:
//! - Deterministic environment collaborators (clock, id generators)
//! - A mock store that records every dispatched action
//! - A scripted socket channel that records requests and replays acks
//!
//! ## Example
//!
//! ```ignore
//! use crud_actions_testing::{RecordingDispatcher, test_environment};
//!
//! #[tokio::test]
//! async fn test_find_channel() {
//!     let store = RecordingDispatcher::new();
//!     let channels = PrimaryActions::new("channel", &host, transport, test_environment())?;
//!
//!     channels.find_one(667).run(store.clone()).await;
//!
//!     assert_eq!(store.types(), ["CHANNEL_FIND_START", "CHANNEL_FIND_SUCCESS"]);
//! }
//! ```

use chrono::{DateTime, Utc};
use crud_actions_core::environment::{Clock, IdGenerator};
use crud_actions_core::{Action, ActionEnvironment, Dispatch};

/// Mock implementations for testing.
pub mod mocks {
    use super::{Action, Clock, DateTime, Dispatch, IdGenerator, Utc};
    use crud_actions_runtime::transport::{SocketAck, SocketChannel, SocketError, SocketRequest};
    use serde_json::Value;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex, PoisonError};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, so `receivedAt` is predictable.
    ///
    /// # Example
    ///
    /// ```
    /// use crud_actions_testing::mocks::FixedClock;
    /// use crud_actions_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Hands out the same id every time.
    #[derive(Debug, Clone)]
    pub struct FixedIdGenerator {
        id: String,
    }

    impl FixedIdGenerator {
        /// Always return `id`
        #[must_use]
        pub fn new(id: impl Into<String>) -> Self {
            Self { id: id.into() }
        }
    }

    impl IdGenerator for FixedIdGenerator {
        fn next_id(&self) -> String {
            self.id.clone()
        }
    }

    /// Hands out `tmp-1`, `tmp-2`, ...
    #[derive(Debug, Default)]
    pub struct SequentialIdGenerator {
        next: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Start at `tmp-1`
        #[must_use]
        pub const fn new() -> Self {
            Self {
                next: AtomicU64::new(1),
            }
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> String {
            format!("tmp-{}", self.next.fetch_add(1, Ordering::Relaxed))
        }
    }

    /// Mock store: records every dispatched action in order.
    #[derive(Debug, Default)]
    pub struct RecordingDispatcher {
        actions: Mutex<Vec<Action>>,
    }

    impl RecordingDispatcher {
        /// A fresh recorder, ready to hand to `Thunk::run`
        #[must_use]
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        /// Everything dispatched so far
        #[must_use]
        pub fn actions(&self) -> Vec<Action> {
            self.actions
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Dispatched actions rendered as flat JSON
        #[must_use]
        pub fn action_values(&self) -> Vec<Value> {
            self.actions().iter().map(Action::to_value).collect()
        }

        /// Dispatched type tokens
        #[must_use]
        pub fn types(&self) -> Vec<String> {
            self.actions()
                .iter()
                .map(|action| action.action_type.to_string())
                .collect()
        }

        /// Forget everything recorded so far
        pub fn clear(&self) {
            self.actions
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
        }
    }

    impl Dispatch for RecordingDispatcher {
        fn dispatch(&self, action: Action) {
            self.actions
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(action);
        }
    }

    /// Socket channel that answers from a script and records requests.
    ///
    /// Queued replies are used in order; once the queue is empty every
    /// request gets the fallback (`200` with `null` unless changed).
    #[derive(Debug)]
    pub struct ScriptedSocket {
        replies: Mutex<VecDeque<Result<SocketAck, SocketError>>>,
        fallback: SocketAck,
        requests: Mutex<Vec<SocketRequest>>,
    }

    impl Default for ScriptedSocket {
        fn default() -> Self {
            Self {
                replies: Mutex::new(VecDeque::new()),
                fallback: SocketAck::ok(Value::Null),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl ScriptedSocket {
        /// A socket that acknowledges everything with `200 null`
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Answer every unscripted request with `ack`
        #[must_use]
        pub fn with_fallback(mut self, ack: SocketAck) -> Self {
            self.fallback = ack;
            self
        }

        /// Queue `ack` as the next reply
        #[must_use]
        pub fn reply(self, ack: SocketAck) -> Self {
            self.push(Ok(ack));
            self
        }

        /// Queue a channel failure as the next reply
        #[must_use]
        pub fn fail(self, error: SocketError) -> Self {
            self.push(Err(error));
            self
        }

        /// Requests received so far
        #[must_use]
        pub fn requests(&self) -> Vec<SocketRequest> {
            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        fn push(&self, reply: Result<SocketAck, SocketError>) {
            self.replies
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_back(reply);
        }
    }

    impl SocketChannel for ScriptedSocket {
        fn request(
            &self,
            request: SocketRequest,
        ) -> Pin<Box<dyn Future<Output = Result<SocketAck, SocketError>> + Send + '_>> {
            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(request);
            let reply = self
                .replies
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .unwrap_or_else(|| Ok(self.fallback.clone()));
            Box::pin(std::future::ready(reply))
        }
    }
}

/// Test helpers and utilities.
pub mod helpers {
    use super::{ActionEnvironment, Clock};
    use crate::mocks::{FixedIdGenerator, test_clock};
    use std::sync::Arc;

    /// The `tmpId` handed out by [`test_environment`]
    pub const TEST_TMP_ID: &str = "456";

    /// Production environment with [`test_clock`] and a fixed `tmpId` of
    /// [`TEST_TMP_ID`]
    #[must_use]
    pub fn test_environment() -> ActionEnvironment {
        ActionEnvironment::production()
            .with_clock(Arc::new(test_clock()))
            .with_ids(Arc::new(FixedIdGenerator::new(TEST_TMP_ID)))
    }

    /// `receivedAt` as rendered for actions stamped by [`test_clock`]
    #[must_use]
    pub fn test_received_at() -> i64 {
        test_clock().now().timestamp_millis()
    }

    /// Route `tracing` output to the test harness; safe to call repeatedly.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}

// Re-export commonly used items
pub use helpers::{TEST_TMP_ID, init_test_tracing, test_environment, test_received_at};
pub use mocks::{
    FixedClock, FixedIdGenerator, RecordingDispatcher, ScriptedSocket, SequentialIdGenerator,
    test_clock,
};

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crud_actions_core::ActionType;
    use crud_actions_runtime::transport::{
        Method, SocketAck, SocketChannel, SocketError, SocketRequest,
    };
    use serde_json::json;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
        assert_eq!(test_received_at(), 1_735_689_600_000);
    }

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIdGenerator::new();
        assert_eq!(ids.next_id(), "tmp-1");
        assert_eq!(ids.next_id(), "tmp-2");
    }

    #[test]
    fn test_recording_dispatcher() {
        let store = RecordingDispatcher::new();
        store.dispatch(Action::empty(ActionType::new("CHANNEL_FIND_START")));
        assert_eq!(store.types(), ["CHANNEL_FIND_START"]);
        assert_eq!(store.action_values(), [json!({"type": "CHANNEL_FIND_START"})]);

        store.clear();
        assert!(store.actions().is_empty());
    }

    #[tokio::test]
    async fn test_scripted_socket_replays_then_falls_back() {
        let socket = ScriptedSocket::new()
            .reply(SocketAck::with_status(404, json!({"message": "gone"})))
            .fail(SocketError::Closed);
        let request = SocketRequest {
            method: Method::Get,
            headers: None,
            url: "/channels/1".to_string(),
            data: None,
        };

        let first = socket.request(request.clone()).await.unwrap();
        assert_eq!(first.status_code, 404);
        assert_eq!(socket.request(request.clone()).await, Err(SocketError::Closed));
        assert_eq!(socket.request(request).await.unwrap(), SocketAck::ok(json!(null)));
        assert_eq!(socket.requests().len(), 3);
    }
}
