//! # Crud Actions Runtime
//!
//! Generators that turn a model name into ready-to-run CRUD action creators,
//! plus the transport they talk through and a minimal store to run them
//! against.
//!
//! ## Core Components
//!
//! - **Transport**: one `get`/`post`/`put`/`delete` contract over HTTP or a
//!   socket channel, with response-schema extraction
//! - **`PrimaryActions`**: `findChannel`, `findChannels`, `createChannel`,
//!   `updateChannel`, `destroyChannel`
//! - **`AssociationActions`**: `findChannelTags`, `addTagToChannel`,
//!   `removeTagFromChannel`
//! - **Thunk**: the deferred computation every action creator returns
//! - **Store**: a state container implementing `Dispatch`
//!
//! ## Example
//!
//! ```no_run
//! use crud_actions_core::{Action, ActionEnvironment, HostConfig, ResponseSchemas};
//! use crud_actions_runtime::{PrimaryActions, Reducer, Store, Transport};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! struct Log;
//! impl Reducer for Log {
//!     type State = Vec<Action>;
//!     fn reduce(&self, state: &mut Vec<Action>, action: &Action) {
//!         state.push(action.clone());
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let channels = PrimaryActions::new(
//!     "channel",
//!     &HostConfig::new("http://example.com"),
//!     Transport::http(ResponseSchemas::default()),
//!     ActionEnvironment::production(),
//! )?;
//!
//! let store = Arc::new(Store::new(Vec::new(), Log));
//! store.run(channels.create_one(json!({"name": "general"}))).await;
//!
//! // CHANNEL_CREATE_START, then CHANNEL_CREATE_SUCCESS or CHANNEL_CREATE_ERROR
//! assert_eq!(store.state(Vec::len), 2);
//! # Ok(())
//! # }
//! ```

pub mod association;
pub mod headers;
pub mod primary;
pub mod store;
pub mod thunk;
pub mod transport;

pub use association::AssociationActions;
pub use headers::{HeaderResolvers, bearer};
pub use primary::{DEFAULT_FIND_QUERY, PrimaryActions};
pub use store::{Reducer, Store};
pub use thunk::{Completion, Thunk};
pub use transport::{BackendKind, Headers, Method, Transport, TransportError};
