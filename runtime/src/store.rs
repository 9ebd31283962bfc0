//! Minimal state container.
//!
//! The [`Store`] owns a state value and a caller-supplied [`Reducer`]. Every
//! dispatched action is reduced under a write lock and then broadcast to
//! observers. Reducer logic itself belongs to the application.

use crate::thunk::{Completion, Thunk};
use crud_actions_core::{Action, Dispatch};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;

/// Folds actions into state.
///
/// # Example
///
/// ```
/// use crud_actions_core::Action;
/// use crud_actions_runtime::Reducer;
///
/// struct CountStarts;
///
/// impl Reducer for CountStarts {
///     type State = usize;
///
///     fn reduce(&self, state: &mut usize, action: &Action) {
///         if action.action_type.as_str().ends_with("_START") {
///             *state += 1;
///         }
///     }
/// }
/// ```
pub trait Reducer: Send + Sync {
    /// The state this reducer operates on
    type State: Send + Sync;

    /// Apply `action` to `state`
    fn reduce(&self, state: &mut Self::State, action: &Action);
}

/// State container implementing [`Dispatch`].
pub struct Store<R: Reducer> {
    state: RwLock<R::State>,
    reducer: R,
    action_broadcast: broadcast::Sender<Action>,
}

impl<R: Reducer> Store<R> {
    /// Create a store with an action broadcast capacity of 16
    #[must_use]
    pub fn new(initial_state: R::State, reducer: R) -> Self {
        Self::with_broadcast_capacity(initial_state, reducer, 16)
    }

    /// Create a store with a custom action broadcast capacity.
    ///
    /// Slow observers that fall more than `capacity` actions behind see
    /// `RecvError::Lagged`.
    #[must_use]
    pub fn with_broadcast_capacity(initial_state: R::State, reducer: R, capacity: usize) -> Self {
        let (action_broadcast, _) = broadcast::channel(capacity.max(1));
        Self {
            state: RwLock::new(initial_state),
            reducer,
            action_broadcast,
        }
    }

    /// Read state through `f`
    pub fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&R::State) -> T,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Observe every action dispatched after this call
    #[must_use]
    pub fn subscribe_actions(&self) -> broadcast::Receiver<Action> {
        self.action_broadcast.subscribe()
    }
}

impl<R: Reducer + 'static> Store<R> {
    /// Run `thunk` against this store
    pub fn run(self: &Arc<Self>, thunk: Thunk) -> Completion {
        let dispatch: Arc<dyn Dispatch> = Arc::clone(self) as Arc<dyn Dispatch>;
        thunk.run(dispatch)
    }
}

impl<R: Reducer> Dispatch for Store<R> {
    fn dispatch(&self, action: Action) {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            self.reducer.reduce(&mut state, &action);
        }
        tracing::trace!(action_type = %action.action_type, "Reduced action");
        // No receivers is fine
        let _ = self.action_broadcast.send(action);
    }
}

impl<R: Reducer> std::fmt::Debug for Store<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("observers", &self.action_broadcast.receiver_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crud_actions_core::ActionType;

    struct Collect;

    impl Reducer for Collect {
        type State = Vec<String>;

        fn reduce(&self, state: &mut Vec<String>, action: &Action) {
            state.push(action.action_type.to_string());
        }
    }

    #[tokio::test]
    async fn test_dispatch_reduces_and_broadcasts() {
        let store = Store::new(Vec::new(), Collect);
        let mut observer = store.subscribe_actions();

        store.dispatch(Action::empty(ActionType::new("CHANNEL_FIND_START")));
        store.dispatch(Action::no_action());

        assert_eq!(
            store.state(Clone::clone),
            vec!["CHANNEL_FIND_START".to_string(), "NO_ACTION".to_string()]
        );
        assert_eq!(observer.recv().await.unwrap().action_type, "CHANNEL_FIND_START");
        assert!(observer.recv().await.unwrap().is_no_action());
    }
}
