//! The command bridge core.
//!
//! Turns a raw element inventory into agent-consumable snapshots and action
//! descriptors, and executes textual commands against a live page through
//! the driver collaborator.
//!
//! - [`parser`]: the `<command> [#id] [args...]` grammar
//! - [`registry`]: user-supplied command handlers, frozen at startup
//! - [`dispatcher`]: custom-override-before-core resolution and execution
//! - [`assembler`]: snapshot + per-element action hints
//! - [`session`]: lifecycle state machine owning the collaborators
//! - [`Bridge`]: the three outward operations
//!
//! The core never throws outward: every failure crosses the boundary as a
//! `success = false` envelope with a classified error kind.

pub mod assembler;
pub mod dispatcher;
pub mod parser;
pub mod registry;
pub mod session;

pub use assembler::{derive_actions, SnapshotAssembler};
pub use dispatcher::Dispatcher;
pub use parser::{parse_command, ParsedCommand};
pub use registry::HandlerRegistry;
pub use session::{SessionContext, SessionManager, SessionState};

use std::sync::Arc;
use tiller_common::outcome::DriverErrorKind;
use tiller_common::{ActionDescriptor, BridgeResult, ScreenSnapshot};

/// The outward face of a session: "get screen data", "get screen actions",
/// and "send command", all synchronous request/response.
///
/// Requests arriving before the lifecycle manager reaches `Ready` (or
/// after shutdown) get a `NotInitialized` envelope.
pub struct Bridge {
    manager: Arc<SessionManager>,
}

impl Bridge {
    pub fn new(manager: Arc<SessionManager>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &Arc<SessionManager> {
        &self.manager
    }

    pub async fn screen_data(&self) -> BridgeResult<ScreenSnapshot> {
        match self.manager.context().await {
            Ok(ctx) => SnapshotAssembler::new(ctx).snapshot().await,
            Err(state) => not_ready(state),
        }
    }

    pub async fn screen_actions(&self) -> BridgeResult<Vec<ActionDescriptor>> {
        match self.manager.context().await {
            Ok(ctx) => SnapshotAssembler::new(ctx).available_actions().await,
            Err(state) => not_ready(state),
        }
    }

    pub async fn send_command(&self, command_line: &str) -> BridgeResult {
        match self.manager.context().await {
            Ok(ctx) => Dispatcher::new(ctx).dispatch(command_line).await.widen(),
            Err(state) => not_ready(state),
        }
    }
}

fn not_ready<T>(state: SessionState) -> BridgeResult<T> {
    BridgeResult::fail(
        DriverErrorKind::NotInitialized.into(),
        format!("Session components not initialized (session is {})", state.name()),
    )
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use std::sync::Arc;
    use tiller_common::{ActionResult, InteractiveElement, PageDriver};

    /// Driver that acknowledges everything; for tests that only need a
    /// handle to satisfy the contract.
    pub struct NoopDriver;

    #[async_trait]
    impl PageDriver for NoopDriver {
        async fn launch(&self) -> ActionResult {
            ActionResult::ok("launched")
        }
        async fn navigate(&self, url: &str) -> ActionResult {
            ActionResult::ok(format!("navigated to {url}"))
        }
        async fn close(&self) -> ActionResult {
            ActionResult::ok("closed")
        }
        async fn current_url(&self) -> ActionResult<String> {
            ActionResult::success("about:blank".to_string())
        }
        async fn click(&self, id: &str) -> ActionResult {
            ActionResult::ok(format!("clicked {id}"))
        }
        async fn type_text(&self, id: &str, _text: &str) -> ActionResult {
            ActionResult::ok(format!("typed into {id}"))
        }
        async fn select_option(&self, id: &str, _value: &str) -> ActionResult {
            ActionResult::ok(format!("selected in {id}"))
        }
        async fn check_element(&self, id: &str) -> ActionResult {
            ActionResult::ok(format!("checked {id}"))
        }
        async fn uncheck_element(&self, id: &str) -> ActionResult {
            ActionResult::ok(format!("unchecked {id}"))
        }
        async fn select_radio_button(&self, id: &str, _value: &str) -> ActionResult {
            ActionResult::ok(format!("chose {id}"))
        }
        async fn get_element_state(&self, id: &str) -> ActionResult<InteractiveElement> {
            ActionResult::fail(
                tiller_common::outcome::DriverErrorKind::ElementNotFound,
                format!("no element {id}"),
            )
        }
    }

    pub fn noop_driver() -> Arc<dyn PageDriver> {
        Arc::new(NoopDriver)
    }
}
