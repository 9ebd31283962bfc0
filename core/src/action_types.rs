//! Action-type generation.
//!
//! Tokens are `<SUBJECT>_<OPERATION>_<PHASE>` for a single model and
//! `<OPERATION>_<RELATED>_<TO|FROM>_<OWNER>_<PHASE>` (or
//! `FIND_<OWNER>_<RELATEDPLURAL>_<PHASE>`) for a model pair. Reducers match on
//! these strings, so the layout is part of the public contract.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::names::{AssociationNames, ModelNames};

/// Opaque action-type token, e.g. `CHANNEL_FIND_SUCCESS`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionType(String);

impl ActionType {
    /// Wrap a raw token
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for ActionType {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Lifecycle phase of an asynchronous operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Request issued
    Start,
    /// Server confirmed
    Success,
    /// Validation or transport failure
    Error,
}

impl Phase {
    /// All phases, in lifecycle order
    pub const ALL: [Self; 3] = [Self::Start, Self::Success, Self::Error];

    /// `START`, `SUCCESS` or `ERROR`
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
        }
    }
}

/// The three tokens of one operation, generated together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhaseTypes {
    /// `..._START`
    pub start: ActionType,
    /// `..._SUCCESS`
    pub success: ActionType,
    /// `..._ERROR`
    pub error: ActionType,
}

impl PhaseTypes {
    /// Build the three tokens sharing `prefix`.
    #[must_use]
    pub fn with_prefix(prefix: &str) -> Self {
        let token = |phase: Phase| ActionType::new(format!("{prefix}_{}", phase.keyword()));
        Self {
            start: token(Phase::Start),
            success: token(Phase::Success),
            error: token(Phase::Error),
        }
    }

    /// Token for `phase`
    #[must_use]
    pub const fn get(&self, phase: Phase) -> &ActionType {
        match phase {
            Phase::Start => &self.start,
            Phase::Success => &self.success,
            Phase::Error => &self.error,
        }
    }

    fn insert_into(&self, map: &mut BTreeMap<String, ActionType>, key_prefix: &str) {
        for phase in Phase::ALL {
            map.insert(
                format!("{key_prefix}_{}", phase.keyword()),
                self.get(phase).clone(),
            );
        }
    }
}

/// CRUD operation keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    /// `CREATE`
    Create,
    /// `FIND`
    Find,
    /// `UPDATE`
    Update,
    /// `DESTROY`
    Destroy,
}

impl Operation {
    /// All operations, in generation order
    pub const ALL: [Self; 4] = [Self::Create, Self::Find, Self::Update, Self::Destroy];

    /// Upper-case keyword
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Find => "FIND",
            Self::Update => "UPDATE",
            Self::Destroy => "DESTROY",
        }
    }
}

/// Every lifecycle token for one model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimaryActionTypes {
    /// `CHANNEL_CREATE_*`
    pub single_create: PhaseTypes,
    /// `CHANNELS_CREATE_*`
    pub plural_create: PhaseTypes,
    /// `CHANNEL_FIND_*`
    pub single_find: PhaseTypes,
    /// `CHANNELS_FIND_*`
    pub plural_find: PhaseTypes,
    /// `CHANNEL_UPDATE_*`
    pub single_update: PhaseTypes,
    /// `CHANNELS_UPDATE_*`
    pub plural_update: PhaseTypes,
    /// `CHANNEL_DESTROY_*`
    pub single_destroy: PhaseTypes,
    /// `CHANNELS_DESTROY_*`
    pub plural_destroy: PhaseTypes,
}

impl PrimaryActionTypes {
    /// Generate all tokens for `names`.
    ///
    /// # Example
    ///
    /// ```
    /// use crud_actions_core::{ActionEnvironment, ModelNames, PrimaryActionTypes};
    ///
    /// let names = ModelNames::derive("channel", &ActionEnvironment::production()).unwrap();
    /// let types = PrimaryActionTypes::generate(&names);
    /// assert_eq!(types.single_find.success.as_str(), "CHANNEL_FIND_SUCCESS");
    /// assert_eq!(types.plural_find.start.as_str(), "CHANNELS_FIND_START");
    /// ```
    #[must_use]
    pub fn generate(names: &ModelNames) -> Self {
        let single = |op: Operation| {
            PhaseTypes::with_prefix(&format!("{}_{}", names.single_upper(), op.keyword()))
        };
        let plural = |op: Operation| {
            PhaseTypes::with_prefix(&format!("{}_{}", names.plural_upper(), op.keyword()))
        };

        Self {
            single_create: single(Operation::Create),
            plural_create: plural(Operation::Create),
            single_find: single(Operation::Find),
            plural_find: plural(Operation::Find),
            single_update: single(Operation::Update),
            plural_update: plural(Operation::Update),
            single_destroy: single(Operation::Destroy),
            plural_destroy: plural(Operation::Destroy),
        }
    }

    /// Tokens for the single-model form of `op`
    #[must_use]
    pub const fn single(&self, op: Operation) -> &PhaseTypes {
        match op {
            Operation::Create => &self.single_create,
            Operation::Find => &self.single_find,
            Operation::Update => &self.single_update,
            Operation::Destroy => &self.single_destroy,
        }
    }

    /// Tokens for the collection form of `op`
    #[must_use]
    pub const fn plural(&self, op: Operation) -> &PhaseTypes {
        match op {
            Operation::Create => &self.plural_create,
            Operation::Find => &self.plural_find,
            Operation::Update => &self.plural_update,
            Operation::Destroy => &self.plural_destroy,
        }
    }

    /// Logical key → token, keyed `SINGLE_FIND_SUCCESS`, `PLURAL_CREATE_START`, ...
    #[must_use]
    pub fn as_map(&self) -> BTreeMap<String, ActionType> {
        let mut map = BTreeMap::new();
        for op in Operation::ALL {
            self.single(op)
                .insert_into(&mut map, &format!("SINGLE_{}", op.keyword()));
            self.plural(op)
                .insert_into(&mut map, &format!("PLURAL_{}", op.keyword()));
        }
        map
    }
}

/// Lifecycle tokens for an owner/related pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssociationActionTypes {
    /// `FIND_CHANNEL_TAGS_*`
    pub find: PhaseTypes,
    /// `ADD_TAG_TO_CHANNEL_*`
    pub add: PhaseTypes,
    /// `REMOVE_TAG_FROM_CHANNEL_*`
    pub remove: PhaseTypes,
}

impl AssociationActionTypes {
    /// Generate all tokens for `names`.
    ///
    /// # Example
    ///
    /// ```
    /// use crud_actions_core::{ActionEnvironment, AssociationActionTypes, AssociationNames};
    ///
    /// let env = ActionEnvironment::production();
    /// let names = AssociationNames::derive("channel", "tag", &env).unwrap();
    /// let types = AssociationActionTypes::generate(&names);
    /// assert_eq!(types.add.start.as_str(), "ADD_TAG_TO_CHANNEL_START");
    /// assert_eq!(types.find.success.as_str(), "FIND_CHANNEL_TAGS_SUCCESS");
    /// ```
    #[must_use]
    pub fn generate(names: &AssociationNames) -> Self {
        let owner = names.owner.single_upper();
        let related = names.related.single_upper();
        let related_plural = names.related.plural_upper();

        Self {
            find: PhaseTypes::with_prefix(&format!("FIND_{owner}_{related_plural}")),
            add: PhaseTypes::with_prefix(&format!("ADD_{related}_TO_{owner}")),
            remove: PhaseTypes::with_prefix(&format!("REMOVE_{related}_FROM_{owner}")),
        }
    }

    /// Token text → token, for every generated token.
    #[must_use]
    pub fn as_map(&self) -> BTreeMap<String, ActionType> {
        [&self.find, &self.add, &self.remove]
            .into_iter()
            .flat_map(|types| Phase::ALL.map(|phase| types.get(phase).clone()))
            .map(|token| (token.as_str().to_string(), token))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::environment::ActionEnvironment;
    use proptest::prelude::*;

    fn primary(name: &str) -> PrimaryActionTypes {
        let names = ModelNames::derive(name, &ActionEnvironment::production()).unwrap();
        PrimaryActionTypes::generate(&names)
    }

    #[test]
    fn test_primary_map_keys() {
        let map = primary("channel").as_map();
        assert_eq!(map.len(), 24);
        assert_eq!(map["SINGLE_FIND_SUCCESS"], "CHANNEL_FIND_SUCCESS");
        assert_eq!(map["PLURAL_FIND_ERROR"], "CHANNELS_FIND_ERROR");
        assert_eq!(map["SINGLE_CREATE_START"], "CHANNEL_CREATE_START");
        assert_eq!(map["PLURAL_DESTROY_START"], "CHANNELS_DESTROY_START");
    }

    #[test]
    fn test_association_map_is_keyed_by_token() {
        let env = ActionEnvironment::production();
        let names = AssociationNames::derive("channel", "tag", &env).unwrap();
        let map = AssociationActionTypes::generate(&names).as_map();
        assert_eq!(map.len(), 9);
        assert!(map.contains_key("REMOVE_TAG_FROM_CHANNEL_ERROR"));
        assert!(map.contains_key("FIND_CHANNEL_TAGS_START"));
    }

    proptest! {
        #[test]
        fn prop_phases_share_prefix(name in "[a-z][a-zA-Z0-9]{0,12}") {
            let types = primary(&name);
            for op in Operation::ALL {
                for phases in [types.single(op), types.plural(op)] {
                    let prefix = phases.start.as_str().strip_suffix("_START").unwrap();
                    prop_assert_eq!(phases.success.as_str(), format!("{prefix}_SUCCESS"));
                    prop_assert_eq!(phases.error.as_str(), format!("{prefix}_ERROR"));
                }
            }
        }

        #[test]
        fn prop_generation_is_deterministic(name in "[a-z][a-zA-Z0-9]{0,12}") {
            prop_assert_eq!(primary(&name), primary(&name));
        }

        #[test]
        fn prop_tokens_unique_per_model(name in "[a-z][a-zA-Z0-9]{0,12}") {
            // Uncountable nouns share single and plural forms, so only the
            // per-subject tokens are required to be distinct.
            let types = primary(&name);
            for op in Operation::ALL {
                let single = types.single(op);
                prop_assert_ne!(&single.start, &single.success);
                prop_assert_ne!(&single.success, &single.error);
                prop_assert_ne!(&single.start, &single.error);
            }
        }
    }
}
