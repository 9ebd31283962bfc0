//! Model-name derivation.
//!
//! A model name such as `channel` fans out into every spelling the generators
//! need: `CHANNEL` / `CHANNELS` for action types, `Channel` / `Channels` for
//! action names, and `channels` for URL segments.

use crate::environment::{ActionEnvironment, capitalize};
use crate::error::Result;

/// Every derived form of one model name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelNames {
    single: String,
    single_upper: String,
    single_cap: String,
    plural: String,
    plural_upper: String,
    plural_cap: String,
}

impl ModelNames {
    /// Validate `name` and derive its forms.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConstructionError::InvalidModelName`] when the
    /// environment's validator rejects `name`.
    ///
    /// # Example
    ///
    /// ```
    /// use crud_actions_core::{ActionEnvironment, ModelNames};
    ///
    /// let names = ModelNames::derive("channel", &ActionEnvironment::production()).unwrap();
    /// assert_eq!(names.plural_upper(), "CHANNELS");
    /// assert_eq!(names.find_one_action(), "findChannel");
    /// ```
    pub fn derive(name: &str, env: &ActionEnvironment) -> Result<Self> {
        env.validator.validate(name)?;

        let plural = env.pluralizer.pluralize(name);
        Ok(Self {
            single: name.to_string(),
            single_upper: name.to_uppercase(),
            single_cap: capitalize(name),
            plural_upper: plural.to_uppercase(),
            plural_cap: capitalize(&plural),
            plural,
        })
    }

    /// `channel`
    #[must_use]
    pub fn single(&self) -> &str {
        &self.single
    }

    /// `CHANNEL`
    #[must_use]
    pub fn single_upper(&self) -> &str {
        &self.single_upper
    }

    /// `Channel`
    #[must_use]
    pub fn single_cap(&self) -> &str {
        &self.single_cap
    }

    /// `channels`
    #[must_use]
    pub fn plural(&self) -> &str {
        &self.plural
    }

    /// `CHANNELS`
    #[must_use]
    pub fn plural_upper(&self) -> &str {
        &self.plural_upper
    }

    /// `Channels`
    #[must_use]
    pub fn plural_cap(&self) -> &str {
        &self.plural_cap
    }

    /// `findChannel`
    #[must_use]
    pub fn find_one_action(&self) -> String {
        format!("find{}", self.single_cap)
    }

    /// `findChannels`
    #[must_use]
    pub fn find_many_action(&self) -> String {
        format!("find{}", self.plural_cap)
    }

    /// `createChannel`
    #[must_use]
    pub fn create_action(&self) -> String {
        format!("create{}", self.single_cap)
    }

    /// `updateChannel`
    #[must_use]
    pub fn update_action(&self) -> String {
        format!("update{}", self.single_cap)
    }

    /// `destroyChannel`
    #[must_use]
    pub fn destroy_action(&self) -> String {
        format!("destroy{}", self.single_cap)
    }
}

/// Derived names for an owner/related model pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssociationNames {
    /// The owning model (`channel`)
    pub owner: ModelNames,
    /// The related model (`tag`)
    pub related: ModelNames,
}

impl AssociationNames {
    /// Validate and derive both names.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConstructionError::InvalidModelName`] if either name
    /// is rejected.
    pub fn derive(owner: &str, related: &str, env: &ActionEnvironment) -> Result<Self> {
        Ok(Self {
            owner: ModelNames::derive(owner, env)?,
            related: ModelNames::derive(related, env)?,
        })
    }

    /// Payload key for a single related entity: `channelTag`
    #[must_use]
    pub fn single_key(&self) -> String {
        format!("{}{}", self.owner.single(), self.related.single_cap())
    }

    /// Payload key for a related collection: `channelTags`
    #[must_use]
    pub fn plural_key(&self) -> String {
        format!("{}{}", self.owner.single(), self.related.plural_cap())
    }

    /// `findChannelTags`
    #[must_use]
    pub fn find_action(&self) -> String {
        format!("find{}{}", self.owner.single_cap(), self.related.plural_cap())
    }

    /// `addTagToChannel`
    #[must_use]
    pub fn add_action(&self) -> String {
        format!("add{}To{}", self.related.single_cap(), self.owner.single_cap())
    }

    /// `removeTagFromChannel`
    #[must_use]
    pub fn remove_action(&self) -> String {
        format!(
            "remove{}From{}",
            self.related.single_cap(),
            self.owner.single_cap()
        )
    }
}
