//! Action creators for a single model.
//!
//! For `channel`:
//!
//! | method | action name | request |
//! |---|---|---|
//! | [`PrimaryActions::find_one`] | `findChannel` | `GET <base>/channels/<id>` |
//! | [`PrimaryActions::find_many`] | `findChannels` | `GET <base>/channels?limit=10000` |
//! | [`PrimaryActions::create_one`] | `createChannel` | `POST <base>/channels` |
//! | [`PrimaryActions::update_one`] | `updateChannel` | `PUT <base>/channels/<id>` |
//! | [`PrimaryActions::destroy_one`] | `destroyChannel` | `DELETE <base>/channels/<id>` |
//!
//! The segment is the singular name when `pluralizeModels` is `false`.

use crate::headers::HeaderResolvers;
use crate::thunk::{Thunk, emit, settle};
use crate::transport::{Body, Transport};
use crud_actions_core::entity::{id_segment, is_falsy, non_empty_object};
use crud_actions_core::error::ConstructionError;
use crud_actions_core::{
    Action, ActionEnvironment, ConfirmedEntity, CreatePayload, HostConfig, ModelNames,
    PendingEntity, PhaseTypes, PrimaryActionTypes,
};
use futures::FutureExt;
use serde_json::Value;
use std::sync::Arc;

/// Default query for [`PrimaryActions::find_many`].
pub const DEFAULT_FIND_QUERY: &str = "limit=10000";

#[derive(Clone)]
struct Inner {
    names: ModelNames,
    types: PrimaryActionTypes,
    collection_url: String,
    transport: Transport,
    env: ActionEnvironment,
    headers: HeaderResolvers,
}

impl Inner {
    fn item_url(&self, id: &Value) -> String {
        format!("{}/{}", self.collection_url, id_segment(id))
    }
}

/// The generated action creators for one model.
///
/// Cheap to clone; holds no mutable state after construction.
///
/// # Example
///
/// ```no_run
/// use crud_actions_core::{ActionEnvironment, HostConfig, ResponseSchemas};
/// use crud_actions_runtime::{PrimaryActions, Transport};
/// use crud_actions_core::{Action, Dispatch};
/// use std::sync::Arc;
///
/// struct Log;
/// impl Dispatch for Log {
///     fn dispatch(&self, action: Action) {
///         println!("{}", action.to_value());
///     }
/// }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let channels = PrimaryActions::new(
///     "channel",
///     &HostConfig::new("http://example.com"),
///     Transport::http(ResponseSchemas::default()),
///     ActionEnvironment::production(),
/// )?;
///
/// let terminal = channels.find_one(667).run(Arc::new(Log)).await;
/// println!("finished with {}", terminal.action_type);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PrimaryActions {
    inner: Arc<Inner>,
}

impl PrimaryActions {
    /// Build the action creators for `model`.
    ///
    /// # Errors
    ///
    /// - [`ConstructionError::MissingHost`] when `host` has no host
    /// - [`ConstructionError::InvalidModelName`] when `model` is rejected
    pub fn new(
        model: &str,
        host: &HostConfig,
        transport: Transport,
        env: ActionEnvironment,
    ) -> Result<Self, ConstructionError> {
        host.validate()?;
        let names = ModelNames::derive(model, &env)?;
        let types = PrimaryActionTypes::generate(&names);

        let segment = if host.pluralize_urls() {
            names.plural()
        } else {
            names.single()
        };
        let collection_url = format!("{}/{segment}", host.base_url());

        tracing::debug!(
            model,
            %collection_url,
            backend = ?transport.kind(),
            "Built primary action creators"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                names,
                types,
                collection_url,
                transport,
                env,
                headers: HeaderResolvers::default(),
            }),
        })
    }

    /// Attach per-action header resolvers (keyed `findChannel`, ...)
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderResolvers) -> Self {
        Arc::make_mut(&mut self.inner).headers = headers;
        self
    }

    /// Derived model names
    #[must_use]
    pub fn names(&self) -> &ModelNames {
        &self.inner.names
    }

    /// Action types reducers should match on
    #[must_use]
    pub fn types(&self) -> &PrimaryActionTypes {
        &self.inner.types
    }

    /// `findChannel(id)`.
    ///
    /// A falsy id (`null`, `0`, `""`, `false`) dispatches a lone
    /// `CHANNEL_FIND_ERROR` and makes no request. Otherwise dispatches
    /// `CHANNEL_FIND_START`, then `CHANNEL_FIND_SUCCESS {channel, receivedAt}`
    /// or `CHANNEL_FIND_ERROR {data: id, error}`.
    pub fn find_one(&self, id: impl Into<Value>) -> Thunk {
        let id = id.into();
        let inner = Arc::clone(&self.inner);

        Thunk::new(move |dispatch| {
            let action_name = inner.names.find_one_action();
            let PhaseTypes { start, success, error } = inner.types.single_find.clone();

            if is_falsy(&id) {
                return settle(
                    dispatch.as_ref(),
                    Action::rejected(error, format!("no modelId given for action {action_name}")),
                );
            }

            emit(dispatch.as_ref(), Action::empty(start));
            let url = inner.item_url(&id);
            let headers = inner.headers.resolve(&action_name);

            async move {
                let action = match inner.transport.get(headers, &url).await {
                    Ok(entity) => Action::received(
                        success,
                        inner.names.single(),
                        entity,
                        inner.env.clock.now(),
                    ),
                    Err(e) => Action::failed(error, id, e.payload),
                };
                emit(dispatch.as_ref(), action)
            }
            .boxed()
        })
    }

    /// `findChannels(query)`; `None` uses [`DEFAULT_FIND_QUERY`].
    ///
    /// An empty query sends no `?`. Success carries the collection after the
    /// environment's list annotator ran over it.
    pub fn find_many(&self, query: Option<&str>) -> Thunk {
        let query = query.unwrap_or(DEFAULT_FIND_QUERY).to_string();
        let inner = Arc::clone(&self.inner);

        Thunk::new(move |dispatch| {
            let PhaseTypes { start, success, error } = inner.types.plural_find.clone();
            emit(dispatch.as_ref(), Action::empty(start));

            let url = if query.is_empty() {
                inner.collection_url.clone()
            } else {
                format!("{}?{query}", inner.collection_url)
            };
            let headers = inner.headers.resolve(&inner.names.find_many_action());

            async move {
                let action = match inner.transport.get(headers, &url).await {
                    Ok(models) => Action::received(
                        success,
                        inner.names.plural(),
                        inner.env.annotator.annotate(models, inner.env.ids.as_ref()),
                        inner.env.clock.now(),
                    ),
                    Err(e) => Action::failed_without_data(error, e.payload),
                };
                emit(dispatch.as_ref(), action)
            }
            .boxed()
        })
    }

    /// `createChannel(model)`.
    ///
    /// - Empty or non-object entity: lone `CHANNEL_CREATE_ERROR`, no request.
    /// - Form: posted unmodified, no `START`; success carries the server's
    ///   extracted response.
    /// - Entity: `CHANNEL_CREATE_START` with a fresh `tmpId`, the entity
    ///   without `tmpId` is posted, then `SUCCESS`/`ERROR` carry the
    ///   `tmpId`-bearing entity.
    pub fn create_one(&self, payload: impl Into<CreatePayload>) -> Thunk {
        let payload = payload.into();
        let inner = Arc::clone(&self.inner);

        Thunk::new(move |dispatch| {
            let action_name = inner.names.create_action();
            let PhaseTypes { start, success, error } = inner.types.single_create.clone();
            let headers = inner.headers.resolve(&action_name);

            match payload {
                CreatePayload::Form(form) => async move {
                    let action = match inner
                        .transport
                        .post(headers, &inner.collection_url, Body::Form(form))
                        .await
                    {
                        Ok(created) => Action::entity(success, inner.names.single(), created),
                        Err(e) => Action::failed(error, Value::Null, e.payload),
                    };
                    emit(dispatch.as_ref(), action)
                }
                .boxed(),

                CreatePayload::Entity(entity) => {
                    let Some(fields) = non_empty_object(&entity) else {
                        return settle(
                            dispatch.as_ref(),
                            Action::rejected(
                                error,
                                format!("no model given for action {action_name}"),
                            ),
                        );
                    };

                    let pending = PendingEntity::fresh(fields.clone(), inner.env.ids.as_ref());
                    let optimistic = pending.to_value();
                    emit(
                        dispatch.as_ref(),
                        Action::entity(start, inner.names.single(), optimistic.clone()),
                    );

                    async move {
                        let action = match inner
                            .transport
                            .post(headers, &inner.collection_url, pending.wire_payload())
                            .await
                        {
                            Ok(_) => Action::entity(success, inner.names.single(), optimistic),
                            Err(e) => Action::failed(error, optimistic, e.payload),
                        };
                        emit(dispatch.as_ref(), action)
                    }
                    .boxed()
                }
            }
        })
    }

    /// `updateChannel(entity)`.
    ///
    /// Requires a truthy `id`; otherwise a lone `CHANNEL_UPDATE_ERROR`.
    /// Puts the entity without `tmpId` to `<base>/channels/<id>`; `START`,
    /// `SUCCESS` and `ERROR` all carry the entity as given.
    pub fn update_one(&self, entity: Value) -> Thunk {
        let inner = Arc::clone(&self.inner);

        Thunk::new(move |dispatch| {
            let action_name = inner.names.update_action();
            let PhaseTypes { start, success, error } = inner.types.single_update.clone();

            let Some(confirmed) = confirmed_entity(&entity) else {
                return settle(
                    dispatch.as_ref(),
                    Action::rejected(error, format!("no modelId given for action {action_name}")),
                );
            };

            emit(
                dispatch.as_ref(),
                Action::entity(start, inner.names.single(), entity.clone()),
            );
            let url = inner.item_url(confirmed.id());
            let headers = inner.headers.resolve(&action_name);

            async move {
                let action = match inner
                    .transport
                    .put(headers, &url, confirmed.wire_payload())
                    .await
                {
                    Ok(_) => Action::entity(success, inner.names.single(), entity),
                    Err(e) => Action::failed(error, entity, e.payload),
                };
                emit(dispatch.as_ref(), action)
            }
            .boxed()
        })
    }

    /// `destroyChannel(entity)`.
    ///
    /// Requires a truthy `id`; otherwise a lone `CHANNEL_DESTROY_ERROR`.
    pub fn destroy_one(&self, entity: Value) -> Thunk {
        let inner = Arc::clone(&self.inner);

        Thunk::new(move |dispatch| {
            let action_name = inner.names.destroy_action();
            let PhaseTypes { start, success, error } = inner.types.single_destroy.clone();

            let Some(confirmed) = confirmed_entity(&entity) else {
                return settle(
                    dispatch.as_ref(),
                    Action::rejected(error, format!("no modelId given for action {action_name}")),
                );
            };

            emit(
                dispatch.as_ref(),
                Action::entity(start, inner.names.single(), entity.clone()),
            );
            let url = inner.item_url(confirmed.id());
            let headers = inner.headers.resolve(&action_name);

            async move {
                let action = match inner.transport.delete(headers, &url).await {
                    Ok(_) => Action::entity(success, inner.names.single(), entity),
                    Err(e) => Action::failed(error, entity, e.payload),
                };
                emit(dispatch.as_ref(), action)
            }
            .boxed()
        })
    }
}

fn confirmed_entity(entity: &Value) -> Option<ConfirmedEntity> {
    entity
        .as_object()
        .and_then(|fields| ConfirmedEntity::from_fields(fields.clone()))
}

impl std::fmt::Debug for PrimaryActions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimaryActions")
            .field("model", &self.inner.names.single())
            .field("collection_url", &self.inner.collection_url)
            .field("transport", &self.inner.transport)
            .finish_non_exhaustive()
    }
}
