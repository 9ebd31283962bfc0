//! Deferred action computations.
//!
//! Calling an action creator does nothing by itself; it returns a [`Thunk`].
//! Running the thunk against a [`Dispatch`] performs the synchronous part
//! immediately (pre-flight validation and the `START` action) and hands back a
//! future for the network part. The future always resolves to the terminal
//! action that was dispatched; failures are actions, never `Err`.

use crud_actions_core::{Action, Dispatch};
use futures::FutureExt;
use futures::future::{self, BoxFuture};
use std::sync::Arc;

/// Future resolving to the terminal action of one invocation.
pub type Completion = BoxFuture<'static, Action>;

type RunFn = Box<dyn FnOnce(Arc<dyn Dispatch>) -> Completion + Send>;

/// A dispatchable unit returned by every action creator.
#[must_use = "a thunk does nothing until it is run against a dispatcher"]
pub struct Thunk {
    run: RunFn,
}

impl Thunk {
    pub(crate) fn new<F>(run: F) -> Self
    where
        F: FnOnce(Arc<dyn Dispatch>) -> Completion + Send + 'static,
    {
        Self { run: Box::new(run) }
    }

    /// Run against `dispatch`.
    ///
    /// Every action dispatched before this returns (`START`, or a lone
    /// pre-flight `ERROR` / `NO_ACTION`) is already visible to `dispatch`.
    pub fn run(self, dispatch: Arc<dyn Dispatch>) -> Completion {
        (self.run)(dispatch)
    }
}

impl std::fmt::Debug for Thunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Thunk(<deferred>)")
    }
}

/// Dispatch `action` and hand it back.
pub(crate) fn emit(dispatch: &dyn Dispatch, action: Action) -> Action {
    tracing::debug!(action_type = %action.action_type, "Dispatching action");
    dispatch.dispatch(action.clone());
    action
}

/// Dispatch `action` as the only action of this invocation.
pub(crate) fn settle(dispatch: &dyn Dispatch, action: Action) -> Completion {
    future::ready(emit(dispatch, action)).boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crud_actions_core::ActionType;
    use std::sync::Mutex;
    use tokio_test::{assert_pending, assert_ready_eq, task};

    #[derive(Default)]
    struct Log(Mutex<Vec<Action>>);

    impl Dispatch for Log {
        fn dispatch(&self, action: Action) {
            if let Ok(mut actions) = self.0.lock() {
                actions.push(action);
            }
        }
    }

    #[test]
    fn test_settle_is_ready_immediately() {
        let log = Arc::new(Log::default());
        let rejected = Action::rejected(ActionType::new("CHANNEL_FIND_ERROR"), "no id");

        let mut completion = task::spawn(settle(log.as_ref(), rejected.clone()));

        assert_ready_eq!(completion.poll(), rejected);
        assert_eq!(log.0.lock().map(|a| a.len()).unwrap_or_default(), 1);
    }

    #[test]
    fn test_run_dispatches_before_future_completes() {
        let log = Arc::new(Log::default());
        let (release, released) = futures::channel::oneshot::channel::<()>();

        let thunk = Thunk::new(|dispatch| {
            emit(dispatch.as_ref(), Action::empty(ActionType::new("CHANNEL_FIND_START")));
            async move {
                let _ = released.await;
                emit(dispatch.as_ref(), Action::no_action())
            }
            .boxed()
        });

        let mut completion = task::spawn(thunk.run(log.clone()));
        assert_pending!(completion.poll());
        assert_eq!(log.0.lock().map(|a| a.len()).unwrap_or_default(), 1);

        let _ = release.send(());
        assert_ready_eq!(completion.poll(), Action::no_action());
        assert_eq!(log.0.lock().map(|a| a.len()).unwrap_or_default(), 2);
    }
}
