//! Actions and the dispatch seam.
//!
//! An [`Action`] is a value: a type token plus a phase-dependent body. It
//! renders to the flat `{type, ...payload}` object a state container matches
//! on via [`Action::to_value`].

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::action_types::ActionType;

/// Type token of the neutral action emitted by idempotent no-ops.
pub const NO_ACTION: &str = "NO_ACTION";

/// Phase-dependent payload.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionBody {
    /// Nothing beyond the type (`*_FIND_START`, `NO_ACTION`)
    Empty,

    /// An entity under a model-named key: `{channel: {...}}`
    Entity {
        /// Payload key (`channel`, `channelTag`)
        key: String,
        /// The entity
        entity: Value,
    },

    /// Data received from the server, stamped with a capture time
    Received {
        /// Payload key (`channel`, `channels`, `channelTags`)
        key: String,
        /// Entity or collection
        value: Value,
        /// When the response was captured
        received_at: DateTime<Utc>,
    },

    /// A failure: the original request data plus the error payload.
    ///
    /// `data` is `Value::Null` when there was no request data.
    Failed {
        /// Id or entity the call was made with
        data: Value,
        /// Schema-extracted error payload or a pre-flight message object
        error: Value,
    },

    /// A failure with no request data to echo (`*S_FIND_ERROR`)
    FailedWithoutData {
        /// Schema-extracted error payload
        error: Value,
    },
}

/// A dispatched action.
#[derive(Clone, Debug, PartialEq)]
pub struct Action {
    /// Type token
    pub action_type: ActionType,
    /// Payload
    pub body: ActionBody,
}

impl Action {
    /// Action with no payload
    #[must_use]
    pub const fn empty(action_type: ActionType) -> Self {
        Self {
            action_type,
            body: ActionBody::Empty,
        }
    }

    /// Action carrying an entity under `key`
    #[must_use]
    pub fn entity(action_type: ActionType, key: impl Into<String>, entity: Value) -> Self {
        Self {
            action_type,
            body: ActionBody::Entity {
                key: key.into(),
                entity,
            },
        }
    }

    /// Action carrying server data and its capture time
    #[must_use]
    pub fn received(
        action_type: ActionType,
        key: impl Into<String>,
        value: Value,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            action_type,
            body: ActionBody::Received {
                key: key.into(),
                value,
                received_at,
            },
        }
    }

    /// Failure action echoing `data`
    #[must_use]
    pub const fn failed(action_type: ActionType, data: Value, error: Value) -> Self {
        Self {
            action_type,
            body: ActionBody::Failed { data, error },
        }
    }

    /// Failure action with only an error payload
    #[must_use]
    pub const fn failed_without_data(action_type: ActionType, error: Value) -> Self {
        Self {
            action_type,
            body: ActionBody::FailedWithoutData { error },
        }
    }

    /// Pre-flight validation failure: `{data: null, error: {message}}`
    #[must_use]
    pub fn rejected(action_type: ActionType, message: impl Into<String>) -> Self {
        let mut error = Map::new();
        error.insert("message".to_string(), Value::String(message.into()));
        Self::failed(action_type, Value::Null, Value::Object(error))
    }

    /// The neutral `NO_ACTION`
    #[must_use]
    pub fn no_action() -> Self {
        Self::empty(ActionType::new(NO_ACTION))
    }

    /// Whether this is `NO_ACTION`
    #[must_use]
    pub fn is_no_action(&self) -> bool {
        self.action_type.as_str() == NO_ACTION
    }

    /// The error payload, for failure actions
    #[must_use]
    pub const fn error(&self) -> Option<&Value> {
        match &self.body {
            ActionBody::Failed { error, .. } | ActionBody::FailedWithoutData { error } => {
                Some(error)
            }
            _ => None,
        }
    }

    /// Flat JSON rendering; `receivedAt` is epoch milliseconds.
    ///
    /// # Example
    ///
    /// ```
    /// use crud_actions_core::{Action, ActionType};
    /// use serde_json::json;
    ///
    /// let start = ActionType::new("CHANNEL_CREATE_START");
    /// let action = Action::entity(start, "channel", json!({"foo": "bar"}));
    /// assert_eq!(
    ///     action.to_value(),
    ///     json!({"type": "CHANNEL_CREATE_START", "channel": {"foo": "bar"}})
    /// );
    /// ```
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut fields = Map::new();
        fields.insert(
            "type".to_string(),
            Value::String(self.action_type.as_str().to_string()),
        );
        match &self.body {
            ActionBody::Empty => {}
            ActionBody::Entity { key, entity } => {
                fields.insert(key.clone(), entity.clone());
            }
            ActionBody::Received {
                key,
                value,
                received_at,
            } => {
                fields.insert(key.clone(), value.clone());
                fields.insert(
                    "receivedAt".to_string(),
                    Value::from(received_at.timestamp_millis()),
                );
            }
            ActionBody::Failed { data, error } => {
                fields.insert("data".to_string(), data.clone());
                fields.insert("error".to_string(), error.clone());
            }
            ActionBody::FailedWithoutData { error } => {
                fields.insert("error".to_string(), error.clone());
            }
        }
        Value::Object(fields)
    }
}

/// Receives actions; the state-container seam.
///
/// Implementations must be cheap and synchronous: action creators call
/// `dispatch` for `START` before suspending on the network.
pub trait Dispatch: Send + Sync {
    /// Deliver one action
    fn dispatch(&self, action: Action);
}
