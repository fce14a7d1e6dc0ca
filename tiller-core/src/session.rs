//! Session lifecycle: the one place collaborators are created and
//! destroyed.
//!
//! The manager walks `Uninitialized → Launching → Navigating → Ready →
//! ShuttingDown → Closed` with a terminal `Failed` reachable from the two
//! startup states. Transitions are one-way; `Ready` is the only state in
//! which the dispatcher and assembler may be invoked.

use crate::registry::HandlerRegistry;
use std::sync::Arc;
use tiller_common::{BridgeError, DomExtractor, PageDriver};
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Launching,
    Navigating,
    Ready,
    ShuttingDown,
    Closed,
    Failed,
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Launching => "launching",
            Self::Navigating => "navigating",
            Self::Ready => "ready",
            Self::ShuttingDown => "shutting down",
            Self::Closed => "closed",
            Self::Failed => "failed",
        }
    }
}

/// Everything a request needs, owned by the manager for the session's
/// lifetime. The dispatcher and assembler hold shared references only.
pub struct SessionContext {
    pub session_id: Uuid,
    pub driver: Arc<dyn PageDriver>,
    pub extractor: Arc<dyn DomExtractor>,
    pub handlers: Arc<HandlerRegistry>,
    /// Single-flight guard: at most one in-flight call sequence against the
    /// driver/extractor pair per session.
    pub(crate) gate: Mutex<()>,
}

impl SessionContext {
    pub fn new(
        driver: Arc<dyn PageDriver>,
        extractor: Arc<dyn DomExtractor>,
        handlers: Arc<HandlerRegistry>,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            driver,
            extractor,
            handlers,
            gate: Mutex::new(()),
        }
    }
}

struct Inner {
    state: SessionState,
    context: Option<Arc<SessionContext>>,
}

/// Brings the driver + extractor pair up, hands out the context while
/// `Ready`, and tears everything down exactly once.
pub struct SessionManager {
    driver: Arc<dyn PageDriver>,
    extractor: Arc<dyn DomExtractor>,
    handlers: Arc<HandlerRegistry>,
    inner: RwLock<Inner>,
}

impl SessionManager {
    pub fn new(
        driver: Arc<dyn PageDriver>,
        extractor: Arc<dyn DomExtractor>,
        handlers: HandlerRegistry,
    ) -> Self {
        Self {
            driver,
            extractor,
            handlers: Arc::new(handlers),
            inner: RwLock::new(Inner {
                state: SessionState::Uninitialized,
                context: None,
            }),
        }
    }

    pub async fn state(&self) -> SessionState {
        self.inner.read().await.state
    }

    /// Launch the browser and navigate to the target URL.
    ///
    /// Any failure releases whatever was acquired (the driver is closed if
    /// it was created) before the session reports `Failed`; no resource
    /// leaks across a failed startup.
    pub async fn start(&self, target_url: &str) -> Result<(), BridgeError> {
        {
            let mut inner = self.inner.write().await;
            if inner.state != SessionState::Uninitialized {
                return Err(BridgeError::Startup(format!(
                    "session already started (state: {})",
                    inner.state.name()
                )));
            }
            inner.state = SessionState::Launching;
        }

        info!(target: "session", "launching browser");
        let launched = self.driver.launch().await;
        if !launched.success {
            let message = launched
                .message
                .unwrap_or_else(|| "browser launch failed".to_string());
            self.fail_startup(&message).await;
            return Err(BridgeError::Startup(message));
        }

        self.inner.write().await.state = SessionState::Navigating;
        info!(target: "session", %target_url, "navigating to target");
        let navigated = self.driver.navigate(target_url).await;
        if !navigated.success {
            let message = navigated
                .message
                .unwrap_or_else(|| format!("navigation to {target_url} failed"));
            self.fail_startup(&message).await;
            return Err(BridgeError::Startup(message));
        }

        let context = Arc::new(SessionContext::new(
            self.driver.clone(),
            self.extractor.clone(),
            self.handlers.clone(),
        ));

        let mut inner = self.inner.write().await;
        inner.context = Some(context);
        inner.state = SessionState::Ready;
        info!(target: "session", "session ready");
        Ok(())
    }

    /// The request context, available only while `Ready`.
    pub async fn context(&self) -> Result<Arc<SessionContext>, SessionState> {
        let inner = self.inner.read().await;
        match (&inner.context, inner.state) {
            (Some(context), SessionState::Ready) => Ok(context.clone()),
            (_, state) => Err(state),
        }
    }

    /// Release driver resources exactly once; repeated calls are no-ops.
    pub async fn shutdown(&self) {
        {
            let mut inner = self.inner.write().await;
            match inner.state {
                SessionState::ShuttingDown | SessionState::Closed => {
                    return;
                }
                SessionState::Failed => {
                    // Startup already released everything.
                    return;
                }
                SessionState::Uninitialized => {
                    inner.state = SessionState::Closed;
                    return;
                }
                _ => {
                    inner.state = SessionState::ShuttingDown;
                    inner.context = None;
                }
            }
        }

        info!(target: "session", "closing browser session");
        let closed = self.driver.close().await;
        if !closed.success {
            // Best effort: the session may already be gone underneath us.
            warn!(
                target: "session",
                message = closed.message.as_deref().unwrap_or("unknown"),
                "browser close reported an error"
            );
        }

        self.inner.write().await.state = SessionState::Closed;
        info!(target: "session", "session closed");
    }

    async fn fail_startup(&self, message: &str) {
        error!(target: "session", %message, "startup failed; releasing resources");
        let closed = self.driver.close().await;
        if !closed.success {
            warn!(
                target: "session",
                message = closed.message.as_deref().unwrap_or("unknown"),
                "driver close after failed startup reported an error"
            );
        }
        let mut inner = self.inner.write().await;
        inner.context = None;
        inner.state = SessionState::Failed;
    }
}
