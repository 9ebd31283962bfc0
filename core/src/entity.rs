//! Optimistic entities.
//!
//! An entity the server has not confirmed yet is a [`PendingEntity`]: its
//! fields plus a client-generated `tmpId`. Once it carries a server `id` it is a
//! [`ConfirmedEntity`]. Both render to the flat JSON shape consumers see, and
//! both produce a wire payload that never contains `tmpId`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::environment::IdGenerator;

/// Field name of the client-side temporary identifier.
pub const TMP_ID: &str = "tmpId";

/// Field name of the server identifier.
pub const ID: &str = "id";

/// JavaScript-style falsiness used for identifier pre-flight checks:
/// `null`, `false`, `0`, and `""` are all "no id".
#[must_use]
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Render an identifier as a URL path segment.
#[must_use]
pub fn id_segment(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Entity awaiting server confirmation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingEntity {
    data: Map<String, Value>,
    tmp_id: String,
}

impl PendingEntity {
    /// Tag `data` with a fresh `tmpId`, replacing any it already carried.
    #[must_use]
    pub fn fresh(mut data: Map<String, Value>, ids: &dyn IdGenerator) -> Self {
        data.remove(TMP_ID);
        Self {
            data,
            tmp_id: ids.next_id(),
        }
    }

    /// Keep an existing string `tmpId`, otherwise tag with a fresh one.
    #[must_use]
    pub fn reuse_or_fresh(mut data: Map<String, Value>, ids: &dyn IdGenerator) -> Self {
        match data.remove(TMP_ID) {
            Some(Value::String(tmp_id)) => Self { data, tmp_id },
            _ => Self {
                data,
                tmp_id: ids.next_id(),
            },
        }
    }

    /// Body sent to the server: the fields, never the `tmpId`
    #[must_use]
    pub fn wire_payload(&self) -> Value {
        Value::Object(self.data.clone())
    }

    /// Flat JSON shape: fields plus `tmpId`
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut fields = self.data.clone();
        fields.insert(TMP_ID.to_string(), Value::String(self.tmp_id.clone()));
        Value::Object(fields)
    }
}

/// Entity carrying a server identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmedEntity {
    data: Map<String, Value>,
    id: Value,
    tmp_id: Option<String>,
}

impl ConfirmedEntity {
    /// Split `fields` into data, `id`, and an optional `tmpId`.
    ///
    /// Returns `None` when there is no truthy `id`.
    #[must_use]
    pub fn from_fields(mut fields: Map<String, Value>) -> Option<Self> {
        let id = fields.remove(ID).filter(|id| !is_falsy(id))?;
        let tmp_id = match fields.remove(TMP_ID) {
            Some(Value::String(tmp_id)) => Some(tmp_id),
            _ => None,
        };
        Some(Self {
            data: fields,
            id,
            tmp_id,
        })
    }

    /// The server identifier
    #[must_use]
    pub const fn id(&self) -> &Value {
        &self.id
    }

    /// Body sent to the server: fields plus `id`, never the `tmpId`
    #[must_use]
    pub fn wire_payload(&self) -> Value {
        let mut fields = self.data.clone();
        fields.insert(ID.to_string(), self.id.clone());
        Value::Object(fields)
    }

    /// Flat JSON shape: fields, `id`, and `tmpId` when known
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut fields = self.data.clone();
        fields.insert(ID.to_string(), self.id.clone());
        if let Some(tmp_id) = &self.tmp_id {
            fields.insert(TMP_ID.to_string(), Value::String(tmp_id.clone()));
        }
        Value::Object(fields)
    }
}

/// A related entity handed to an association action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelatedEntity {
    /// Not yet on the server: create-and-link
    Pending(PendingEntity),
    /// Already on the server: link-existing
    Confirmed(ConfirmedEntity),
}

impl RelatedEntity {
    /// Classify `fields` by the presence of a truthy `id`.
    ///
    /// Pending entities keep a `tmpId` they already carry and get a fresh one
    /// otherwise.
    #[must_use]
    pub fn classify(fields: Map<String, Value>, ids: &dyn IdGenerator) -> Self {
        let has_id = fields.get(ID).is_some_and(|id| !is_falsy(id));
        if has_id {
            if let Some(confirmed) = ConfirmedEntity::from_fields(fields.clone()) {
                return Self::Confirmed(confirmed);
            }
        }
        Self::Pending(PendingEntity::reuse_or_fresh(fields, ids))
    }

    /// Flat JSON shape
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Pending(entity) => entity.to_value(),
            Self::Confirmed(entity) => entity.to_value(),
        }
    }

    /// Body sent to the server
    #[must_use]
    pub fn wire_payload(&self) -> Value {
        match self {
            Self::Pending(entity) => entity.wire_payload(),
            Self::Confirmed(entity) => entity.wire_payload(),
        }
    }
}

/// Does `candidate` already appear in `links`?
///
/// Matching uses `tmpId` when `candidate` carries one, otherwise its `id`.
/// A candidate with neither never matches.
#[must_use]
pub fn is_already_linked(candidate: &Map<String, Value>, links: &[Value]) -> bool {
    let key = if candidate.contains_key(TMP_ID) { TMP_ID } else { ID };
    let Some(needle) = candidate.get(key).filter(|v| !is_falsy(v)) else {
        return false;
    };
    links.iter().any(|link| link.get(key) == Some(needle))
}

/// One field of a binary form payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormField {
    /// Plain text value
    Text(String),
    /// File upload
    File {
        /// File name sent to the server
        file_name: String,
        /// MIME type, if known
        mime: Option<String>,
        /// Raw bytes
        bytes: Vec<u8>,
    },
}

/// Multipart form payload.
///
/// Forms are opaque: they are never inspected for emptiness and are sent
/// unmodified.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormData {
    fields: Vec<(String, FormField)>,
}

impl FormData {
    /// Empty form
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Append a text field
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), FormField::Text(value.into())));
        self
    }

    /// Append a file field
    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.fields.push((
            name.into(),
            FormField::File {
                file_name: file_name.into(),
                mime,
                bytes,
            },
        ));
        self
    }

    /// Fields in insertion order
    #[must_use]
    pub fn fields(&self) -> &[(String, FormField)] {
        &self.fields
    }
}

/// Payload for a create call.
#[derive(Clone, Debug, PartialEq)]
pub enum CreatePayload {
    /// JSON entity; must be a non-empty object
    Entity(Value),
    /// Multipart form; always accepted
    Form(FormData),
}

impl From<Value> for CreatePayload {
    fn from(value: Value) -> Self {
        Self::Entity(value)
    }
}

impl From<Map<String, Value>> for CreatePayload {
    fn from(fields: Map<String, Value>) -> Self {
        Self::Entity(Value::Object(fields))
    }
}

impl From<FormData> for CreatePayload {
    fn from(form: FormData) -> Self {
        Self::Form(form)
    }
}

/// The fields of `value` when it is a non-empty object.
#[must_use]
pub fn non_empty_object(value: &Value) -> Option<&Map<String, Value>> {
    value.as_object().filter(|fields| !fields.is_empty())
}
