//! Environment module - Dependency injection traits
//!
//! Every collaborator the generators need (time, ids, name rules, list
//! annotation) is abstracted behind a trait and grouped in
//! [`ActionEnvironment`]. Production implementations live here; deterministic
//! doubles live in `crud-actions-testing`.

use chrono::{DateTime, Utc};
use inflector::Inflector;
use serde_json::Value;
use std::sync::Arc;

use crate::error::ConstructionError;

/// Clock trait - abstracts time operations for testability
///
/// # Examples
///
/// ```
/// use crud_actions_core::environment::{Clock, SystemClock};
///
/// let now = SystemClock.now();
/// assert!(now.timestamp() > 0);
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock backed by [`Utc::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Source of client-side temporary identifiers (`tmpId`).
pub trait IdGenerator: Send + Sync {
    /// Produce a fresh identifier
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Model-name validator.
pub trait NameValidator: Send + Sync {
    /// Accept or reject a model name.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::InvalidModelName`] when the name is unusable.
    fn validate(&self, name: &str) -> Result<(), ConstructionError>;
}

/// Accepts identifiers: an ASCII letter followed by ASCII letters or digits.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentifierValidator;

impl NameValidator for IdentifierValidator {
    fn validate(&self, name: &str) -> Result<(), ConstructionError> {
        let reject = |reason: &str| {
            Err(ConstructionError::InvalidModelName {
                name: name.to_string(),
                reason: reason.to_string(),
            })
        };

        let mut chars = name.chars();
        let Some(first) = chars.next() else {
            return reject("model name must not be empty");
        };
        if !first.is_ascii_alphabetic() {
            return reject("model name must start with an ASCII letter");
        }
        if !chars.all(|c| c.is_ascii_alphanumeric()) {
            return reject("model name may only contain ASCII letters and digits");
        }
        Ok(())
    }
}

/// Word pluralizer.
pub trait Pluralizer: Send + Sync {
    /// Plural form of `word`
    fn pluralize(&self, word: &str) -> String;
}

/// English noun pluralization backed by `Inflector`.
///
/// Camel-case names are pluralized on their last word, so `channelTag`
/// becomes `channelTags` and `teamPerson` becomes `teamPeople`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishPluralizer;

impl Pluralizer for EnglishPluralizer {
    fn pluralize(&self, word: &str) -> String {
        let split = word
            .char_indices()
            .filter(|(_, c)| c.is_ascii_uppercase())
            .map(|(i, _)| i)
            .next_back()
            .unwrap_or(0);
        let (head, tail) = word.split_at(split);

        // Inflector's rules only match lower-case words
        let plural = tail.to_ascii_lowercase().to_plural();
        if tail.chars().next().is_some_and(char::is_uppercase) {
            format!("{head}{}", capitalize(&plural))
        } else {
            format!("{head}{plural}")
        }
    }
}

/// Upper-case the first character, leave the rest untouched.
#[must_use]
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Tags collection items for client-side list reconciliation.
pub trait ListAnnotator: Send + Sync {
    /// Annotate `items`, drawing fresh ids from `ids` where needed
    fn annotate(&self, items: Value, ids: &dyn IdGenerator) -> Value;
}

/// Adds a `tmpId` to every object element that lacks one.
///
/// Non-array values and non-object elements pass through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct TmpIdAnnotator;

impl ListAnnotator for TmpIdAnnotator {
    fn annotate(&self, items: Value, ids: &dyn IdGenerator) -> Value {
        match items {
            Value::Array(elements) => Value::Array(
                elements
                    .into_iter()
                    .map(|element| match element {
                        Value::Object(mut fields) => {
                            if !fields.contains_key(crate::entity::TMP_ID) {
                                fields.insert(
                                    crate::entity::TMP_ID.to_string(),
                                    Value::String(ids.next_id()),
                                );
                            }
                            Value::Object(fields)
                        }
                        other => other,
                    })
                    .collect(),
            ),
            other => other,
        }
    }
}

/// Leaves collections as received.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAnnotation;

impl ListAnnotator for NoAnnotation {
    fn annotate(&self, items: Value, _ids: &dyn IdGenerator) -> Value {
        items
    }
}

/// All collaborators a generator needs, injected at construction.
#[derive(Clone)]
pub struct ActionEnvironment {
    /// Timestamps for `receivedAt`
    pub clock: Arc<dyn Clock>,
    /// Fresh `tmpId`s
    pub ids: Arc<dyn IdGenerator>,
    /// Model-name validation
    pub validator: Arc<dyn NameValidator>,
    /// Plural forms for type tokens and URL segments
    pub pluralizer: Arc<dyn Pluralizer>,
    /// Collection annotation on plural finds
    pub annotator: Arc<dyn ListAnnotator>,
}

impl ActionEnvironment {
    /// Production environment: system clock, UUIDs, identifier validation,
    /// English plurals, and `tmpId` annotation.
    #[must_use]
    pub fn production() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidGenerator),
            validator: Arc::new(IdentifierValidator),
            pluralizer: Arc::new(EnglishPluralizer),
            annotator: Arc::new(TmpIdAnnotator),
        }
    }

    /// Replace the clock
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the id generator
    #[must_use]
    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Replace the list annotator
    #[must_use]
    pub fn with_annotator(mut self, annotator: Arc<dyn ListAnnotator>) -> Self {
        self.annotator = annotator;
        self
    }
}

impl Default for ActionEnvironment {
    fn default() -> Self {
        Self::production()
    }
}

impl std::fmt::Debug for ActionEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionEnvironment").finish_non_exhaustive()
    }
}
