//! Per-action header resolution.
//!
//! Resolvers are keyed by action name (`findChannel`, `addTagToChannel`, ...)
//! and evaluated every time an action runs, so rotating credentials are
//! always read fresh.

use crate::transport::Headers;
use std::collections::HashMap;
use std::sync::Arc;

/// Zero-argument header source.
pub type HeaderResolver = Arc<dyn Fn() -> Option<Headers> + Send + Sync>;

/// Action name → header resolver.
///
/// # Example
///
/// ```
/// use crud_actions_runtime::headers::{bearer, HeaderResolvers};
///
/// let resolvers = HeaderResolvers::new()
///     .with("findChannel", || Some(bearer("token-from-session")));
///
/// let headers = resolvers.resolve("findChannel").unwrap();
/// assert_eq!(headers["Authorization"], "Bearer token-from-session");
/// assert!(resolvers.resolve("createChannel").is_none());
/// ```
#[derive(Clone, Default)]
pub struct HeaderResolvers {
    resolvers: HashMap<String, HeaderResolver>,
}

impl HeaderResolvers {
    /// No resolvers: every action runs without extra headers
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `resolver` for `action`
    #[must_use]
    pub fn with<F>(mut self, action: impl Into<String>, resolver: F) -> Self
    where
        F: Fn() -> Option<Headers> + Send + Sync + 'static,
    {
        self.resolvers.insert(action.into(), Arc::new(resolver));
        self
    }

    /// Headers for `action`, evaluated now
    #[must_use]
    pub fn resolve(&self, action: &str) -> Option<Headers> {
        self.resolvers.get(action).and_then(|resolver| resolver())
    }
}

impl std::fmt::Debug for HeaderResolvers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeaderResolvers")
            .field("actions", &self.resolvers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// `Authorization: Bearer <token>`
#[must_use]
pub fn bearer(token: impl AsRef<str>) -> Headers {
    let mut headers = Headers::new();
    headers.insert(
        "Authorization".to_string(),
        format!("Bearer {}", token.as_ref()),
    );
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_resolver_runs_on_every_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let resolvers = HeaderResolvers::new().with("findChannel", move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            Some(bearer(format!("token-{n}")))
        });

        assert_eq!(
            resolvers.resolve("findChannel").map(|h| h["Authorization"].clone()),
            Some("Bearer token-0".to_string())
        );
        assert_eq!(
            resolvers.resolve("findChannel").map(|h| h["Authorization"].clone()),
            Some("Bearer token-1".to_string())
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
