//! Registry of user-supplied command handlers.
//!
//! Registration happens entirely before the session starts serving; the
//! registry then moves behind an `Arc` and is never mutated again, so
//! concurrent lookups need no synchronization.

use std::collections::HashMap;
use tiller_common::CustomActionHandler;
use tracing::debug;

#[derive(Debug, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, CustomActionHandler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its (case-insensitive) command name.
    /// Last registration for a name wins.
    ///
    /// Note: a handler registered for a core command name replaces core
    /// behavior entirely; `override_core_behavior` is carried as metadata
    /// only. The dispatcher warns when it takes that branch.
    pub fn register(&mut self, handler: CustomActionHandler) {
        let name = handler.command_name.to_lowercase();
        if self.handlers.insert(name.clone(), handler).is_some() {
            debug!(target: "registry", command = %name, "replaced earlier handler registration");
        }
    }

    /// Exact, case-insensitive lookup.
    pub fn lookup(&self, name: &str) -> Option<&CustomActionHandler> {
        if self.handlers.is_empty() {
            return None;
        }
        self.handlers.get(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tiller_common::contract::{ActionHandler, HandlerInvocation};
    use tiller_common::ActionResult;

    struct Stub(&'static str);

    #[async_trait::async_trait]
    impl ActionHandler for Stub {
        async fn run(&self, _invocation: HandlerInvocation) -> ActionResult {
            ActionResult::ok(self.0)
        }
    }

    fn handler(name: &str, tag: &'static str) -> CustomActionHandler {
        CustomActionHandler::new(name, Arc::new(Stub(tag)))
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive_and_last_wins() {
        let mut registry = HandlerRegistry::new();
        registry.register(handler("Get-Custom-Note", "first"));
        registry.register(handler("get-custom-note", "second"));

        assert_eq!(registry.len(), 1);
        let found = registry.lookup("GET-CUSTOM-NOTE").expect("registered");
        let result = found
            .handler
            .run(HandlerInvocation {
                element: None,
                args: Vec::new(),
                driver: crate::test_support::noop_driver(),
            })
            .await;
        assert_eq!(result.message.as_deref(), Some("second"));
    }

    #[test]
    fn lookup_misses_unknown_names() {
        let registry = HandlerRegistry::new();
        assert!(registry.lookup("anything").is_none());
    }
}
