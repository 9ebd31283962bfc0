//! Action creators for an owner/related model pair.
//!
//! For owner `channel` and related `tag`:
//!
//! | method | action name | request under the base URL |
//! |---|---|---|
//! | [`find_related`] | `findChannelTags` | `GET channels/<ownerId>/tags` |
//! | [`add_related`] | `addTagToChannel` | `POST channels/<ownerId>/tags[/<tagId>]` |
//! | [`remove_related`] | `removeTagFromChannel` | `DELETE channels/<ownerId>/tags/<tagId>` |
//!
//! [`find_related`]: AssociationActions::find_related
//! [`add_related`]: AssociationActions::add_related
//! [`remove_related`]: AssociationActions::remove_related
//!
//! Payloads use the composite keys `channelTag` and `channelTags`.

use crate::headers::HeaderResolvers;
use crate::thunk::{Thunk, emit, settle};
use crate::transport::Transport;
use crud_actions_core::entity::{id_segment, is_already_linked, is_falsy, non_empty_object};
use crud_actions_core::error::ConstructionError;
use crud_actions_core::{
    Action, ActionEnvironment, AssociationActionTypes, AssociationNames, ConfirmedEntity,
    HostConfig, PhaseTypes, RelatedEntity,
};
use futures::FutureExt;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
struct Inner {
    names: AssociationNames,
    types: AssociationActionTypes,
    owners_url: String,
    transport: Transport,
    env: ActionEnvironment,
    headers: HeaderResolvers,
}

impl Inner {
    fn related_url(&self, owner_id: &Value) -> String {
        format!(
            "{}/{}/{}",
            self.owners_url,
            id_segment(owner_id),
            self.names.related.plural()
        )
    }
}

/// The generated association action creators for one model pair.
#[derive(Clone)]
pub struct AssociationActions {
    inner: Arc<Inner>,
}

impl AssociationActions {
    /// Build the action creators for `owner` ↔ `related`.
    ///
    /// # Errors
    ///
    /// - [`ConstructionError::MissingHost`] when `host` has no host
    /// - [`ConstructionError::InvalidModelName`] when either name is rejected
    pub fn new(
        owner: &str,
        related: &str,
        host: &HostConfig,
        transport: Transport,
        env: ActionEnvironment,
    ) -> Result<Self, ConstructionError> {
        host.validate()?;
        let names = AssociationNames::derive(owner, related, &env)?;
        let types = AssociationActionTypes::generate(&names);
        let owners_url = format!("{}/{}", host.base_url(), names.owner.plural());

        tracing::debug!(owner, related, %owners_url, "Built association action creators");

        Ok(Self {
            inner: Arc::new(Inner {
                names,
                types,
                owners_url,
                transport,
                env,
                headers: HeaderResolvers::default(),
            }),
        })
    }

    /// Attach per-action header resolvers (keyed `addTagToChannel`, ...)
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderResolvers) -> Self {
        Arc::make_mut(&mut self.inner).headers = headers;
        self
    }

    /// Derived names for both models
    #[must_use]
    pub fn names(&self) -> &AssociationNames {
        &self.inner.names
    }

    /// Action types reducers should match on
    #[must_use]
    pub fn types(&self) -> &AssociationActionTypes {
        &self.inner.types
    }

    /// `findChannelTags(ownerId)`.
    ///
    /// A falsy owner id dispatches a lone `FIND_CHANNEL_TAGS_ERROR`.
    /// Otherwise `START`, then `SUCCESS {channelTags, receivedAt}` or
    /// `ERROR {data: ownerId, error}`.
    pub fn find_related(&self, owner_id: impl Into<Value>) -> Thunk {
        let owner_id = owner_id.into();
        let inner = Arc::clone(&self.inner);

        Thunk::new(move |dispatch| {
            let action_name = inner.names.find_action();
            let PhaseTypes { start, success, error } = inner.types.find.clone();

            if is_falsy(&owner_id) {
                return settle(
                    dispatch.as_ref(),
                    Action::rejected(error, format!("no ownerId given for action {action_name}")),
                );
            }

            emit(dispatch.as_ref(), Action::empty(start));
            let url = inner.related_url(&owner_id);
            let headers = inner.headers.resolve(&action_name);

            async move {
                let action = match inner.transport.get(headers, &url).await {
                    Ok(related) => Action::received(
                        success,
                        inner.names.plural_key(),
                        inner.env.annotator.annotate(related, inner.env.ids.as_ref()),
                        inner.env.clock.now(),
                    ),
                    Err(e) => Action::failed(error, owner_id, e.payload),
                };
                emit(dispatch.as_ref(), action)
            }
            .boxed()
        })
    }

    /// `addTagToChannel(ownerId, tag, existingLinks)`.
    ///
    /// When `tag` already appears in `existing_links` (by `tmpId` if it has
    /// one, else by `id`) a single `NO_ACTION` is dispatched and nothing else
    /// happens. A tag with an `id` is linked with
    /// `POST .../tags/<id>`; one without is created and linked with
    /// `POST .../tags` under a `tmpId`.
    pub fn add_related(
        &self,
        owner_id: impl Into<Value>,
        related: Value,
        existing_links: &[Value],
    ) -> Thunk {
        let owner_id = owner_id.into();
        let already_linked = related
            .as_object()
            .is_some_and(|fields| is_already_linked(fields, existing_links));
        let inner = Arc::clone(&self.inner);

        Thunk::new(move |dispatch| {
            if already_linked {
                return settle(dispatch.as_ref(), Action::no_action());
            }

            let action_name = inner.names.add_action();
            let PhaseTypes { start, success, error } = inner.types.add.clone();

            if is_falsy(&owner_id) {
                return settle(
                    dispatch.as_ref(),
                    Action::rejected(error, format!("no ownerId given for action {action_name}")),
                );
            }
            let Some(fields) = non_empty_object(&related) else {
                return settle(
                    dispatch.as_ref(),
                    Action::rejected(error, format!("no model given for action {action_name}")),
                );
            };

            let entity = RelatedEntity::classify(fields.clone(), inner.env.ids.as_ref());
            let optimistic = entity.to_value();
            emit(
                dispatch.as_ref(),
                Action::entity(start, inner.names.single_key(), optimistic.clone()),
            );

            let url = match &entity {
                RelatedEntity::Pending(_) => inner.related_url(&owner_id),
                RelatedEntity::Confirmed(confirmed) => format!(
                    "{}/{}",
                    inner.related_url(&owner_id),
                    id_segment(confirmed.id())
                ),
            };
            let headers = inner.headers.resolve(&action_name);

            async move {
                let action = match inner
                    .transport
                    .post(headers, &url, entity.wire_payload())
                    .await
                {
                    Ok(_) => Action::entity(success, inner.names.single_key(), optimistic),
                    Err(e) => Action::failed(error, optimistic, e.payload),
                };
                emit(dispatch.as_ref(), action)
            }
            .boxed()
        })
    }

    /// `removeTagFromChannel(ownerId, tag)`.
    ///
    /// Needs a truthy owner id and a tag with a truthy `id`; otherwise a
    /// lone `REMOVE_TAG_FROM_CHANNEL_ERROR`. `START`, `SUCCESS` and `ERROR`
    /// carry the tag as given.
    pub fn remove_related(&self, owner_id: impl Into<Value>, related: Value) -> Thunk {
        let owner_id = owner_id.into();
        let inner = Arc::clone(&self.inner);

        Thunk::new(move |dispatch| {
            let action_name = inner.names.remove_action();
            let PhaseTypes { start, success, error } = inner.types.remove.clone();

            if is_falsy(&owner_id) {
                return settle(
                    dispatch.as_ref(),
                    Action::rejected(error, format!("no ownerId given for action {action_name}")),
                );
            }
            let Some(confirmed) = related
                .as_object()
                .and_then(|fields| ConfirmedEntity::from_fields(fields.clone()))
            else {
                return settle(
                    dispatch.as_ref(),
                    Action::rejected(error, format!("no id given for action {action_name}")),
                );
            };

            emit(
                dispatch.as_ref(),
                Action::entity(start, inner.names.single_key(), related.clone()),
            );
            let url = format!(
                "{}/{}",
                inner.related_url(&owner_id),
                id_segment(confirmed.id())
            );
            let headers = inner.headers.resolve(&action_name);

            async move {
                let action = match inner.transport.delete(headers, &url).await {
                    Ok(_) => Action::entity(success, inner.names.single_key(), related),
                    Err(e) => Action::failed(error, related, e.payload),
                };
                emit(dispatch.as_ref(), action)
            }
            .boxed()
        })
    }
}

impl std::fmt::Debug for AssociationActions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssociationActions")
            .field("owner", &self.inner.names.owner.single())
            .field("related", &self.inner.names.related.single())
            .field("transport", &self.inner.transport)
            .finish_non_exhaustive()
    }
}
