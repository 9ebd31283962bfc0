//! # Crud Actions Core
//!
//! Core types for generating CRUD action creators.
//!
//! Given a model name such as `channel`, the generators in
//! `crud-actions-runtime` produce action creators (`findChannel`,
//! `findChannels`, `createChannel`, ...) whose every invocation emits a
//! three-phase lifecycle: `START`, then `SUCCESS` or `ERROR`. This crate holds
//! the pure parts:
//!
//! - **Names**: singular/plural, upper-case, and capitalized model forms
//! - **Action types**: the `<SUBJECT>_<OPERATION>_<PHASE>` tokens reducers match on
//! - **Actions**: the dispatched values and the [`Dispatch`] seam
//! - **Entities**: pending (`tmpId`) and confirmed (`id`) optimistic entities
//! - **Environment**: injected clock, id generator, and name collaborators
//! - **Config**: host and transport configuration, response schemas
//!
//! ## Example
//!
//! ```
//! use crud_actions_core::{ActionEnvironment, ModelNames, PrimaryActionTypes};
//!
//! let names = ModelNames::derive("channel", &ActionEnvironment::production()).unwrap();
//! let types = PrimaryActionTypes::generate(&names);
//!
//! assert_eq!(types.single_create.start.as_str(), "CHANNEL_CREATE_START");
//! assert_eq!(types.plural_find.success.as_str(), "CHANNELS_FIND_SUCCESS");
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};

pub mod action;
pub mod action_types;
pub mod config;
pub mod entity;
pub mod environment;
pub mod error;
pub mod names;
pub mod schema;

pub use action::{Action, ActionBody, Dispatch, NO_ACTION};
pub use action_types::{
    ActionType, AssociationActionTypes, Operation, Phase, PhaseTypes, PrimaryActionTypes,
};
pub use config::{ActionsConfig, HostConfig, ResponseSchemas, SchemaPaths, TransportConfig};
pub use entity::{
    ConfirmedEntity, CreatePayload, FormData, FormField, PendingEntity, RelatedEntity,
};
pub use environment::{ActionEnvironment, Clock, IdGenerator, ListAnnotator};
pub use error::ConstructionError;
pub use names::{AssociationNames, ModelNames};
