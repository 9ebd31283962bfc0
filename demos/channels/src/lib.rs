//! # Channels Demo
//!
//! A channel list kept in a [`Store`](crud_actions_runtime::Store) and driven by
//! generated action creators.
//!
//! This example showcases:
//! - Matching on generated action types in a reducer
//! - Optimistic inserts keyed by `tmpId`
//! - Rolling back when a create fails
//!
//! ## Example
//!
//! ```no_run
//! use channels_demo::{ChannelsReducer, ChannelsState};
//! use crud_actions_core::{ActionEnvironment, HostConfig, ResponseSchemas};
//! use crud_actions_runtime::{PrimaryActions, Store, Transport};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), crud_actions_core::ConstructionError> {
//! let channels = PrimaryActions::new(
//!     "channel",
//!     &HostConfig::new("http://example.com"),
//!     Transport::http(ResponseSchemas::default()),
//!     ActionEnvironment::production(),
//! )?;
//! let reducer = ChannelsReducer::new(channels.types().clone());
//! let store = Arc::new(Store::new(ChannelsState::default(), reducer));
//!
//! store.run(channels.find_many(None)).await;
//! let count = store.state(|s| s.channels.len());
//! # Ok(())
//! # }
//! ```

use crud_actions_core::entity::{ID, TMP_ID};
use crud_actions_core::{Action, ActionBody, PrimaryActionTypes};
use crud_actions_runtime::Reducer;
use serde_json::Value;

/// Channel list state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelsState {
    /// Known channels, optimistic ones included
    pub channels: Vec<Value>,
    /// A plural find is in flight
    pub loading: bool,
    /// Error payload of the last failed action
    pub last_error: Option<Value>,
}

impl ChannelsState {
    fn remove_matching(&mut self, entity: &Value, key: &str) {
        if let Some(needle) = entity.get(key) {
            self.channels.retain(|channel| channel.get(key) != Some(needle));
        }
    }
}

/// Folds channel actions into [`ChannelsState`].
#[derive(Debug, Clone)]
pub struct ChannelsReducer {
    types: PrimaryActionTypes,
}

impl ChannelsReducer {
    /// Reducer for the given generated types
    #[must_use]
    pub const fn new(types: PrimaryActionTypes) -> Self {
        Self { types }
    }
}

impl Reducer for ChannelsReducer {
    type State = ChannelsState;

    fn reduce(&self, state: &mut ChannelsState, action: &Action) {
        let kind = &action.action_type;
        let types = &self.types;

        match &action.body {
            ActionBody::Empty if *kind == types.plural_find.start => {
                state.loading = true;
            }
            ActionBody::Received { value, .. } if *kind == types.plural_find.success => {
                state.channels = value.as_array().cloned().unwrap_or_default();
                state.loading = false;
            }
            ActionBody::Entity { entity, .. } if *kind == types.single_create.start => {
                state.channels.push(entity.clone());
            }
            ActionBody::Entity { entity, .. } if *kind == types.single_destroy.success => {
                state.remove_matching(entity, ID);
            }
            ActionBody::Failed { data, error } if *kind == types.single_create.error => {
                // Pre-flight rejections carry no data and leave nothing to roll back
                state.remove_matching(data, TMP_ID);
                state.last_error = Some(error.clone());
            }
            ActionBody::Failed { error, .. } | ActionBody::FailedWithoutData { error } => {
                state.loading = false;
                state.last_error = Some(error.clone());
            }
            _ => {}
        }
    }
}
