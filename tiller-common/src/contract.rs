//! Collaborator seams and the user-extension types.
//!
//! The bridge core talks to a browser only through [`PageDriver`] and
//! [`DomExtractor`]; both return the uniform envelope rather than raising,
//! so no collaborator failure ever escapes a component boundary as a raw
//! error.

use crate::model::{CustomValue, InteractiveElement, StructuredData};
use crate::outcome::{ActionResult, ParserResult};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// Performs actual browser actions against the live page.
///
/// Every method returns an [`ActionResult`]; implementations map transport
/// failures into the driver error taxonomy at the call site. `close` must be
/// idempotent; the lifecycle manager may call it more than once.
#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn launch(&self) -> ActionResult;
    async fn navigate(&self, url: &str) -> ActionResult;
    async fn close(&self) -> ActionResult;
    async fn current_url(&self) -> ActionResult<String>;
    async fn click(&self, id: &str) -> ActionResult;
    async fn type_text(&self, id: &str, text: &str) -> ActionResult;
    async fn select_option(&self, id: &str, value: &str) -> ActionResult;
    async fn check_element(&self, id: &str) -> ActionResult;
    async fn uncheck_element(&self, id: &str) -> ActionResult;
    async fn select_radio_button(&self, id: &str, value: &str) -> ActionResult;
    async fn get_element_state(&self, id: &str) -> ActionResult<InteractiveElement>;
}

/// Reads the live page into typed element/container records.
#[async_trait]
pub trait DomExtractor: Send + Sync {
    async fn get_structured_data(&self) -> ParserResult<StructuredData>;
    async fn get_interactive_elements_with_state(&self)
        -> ParserResult<Vec<InteractiveElement>>;
}

/// Everything a custom handler gets to work with: the resolved target
/// element (when the command carried an id), the positional arguments, and
/// a driver handle for handlers that call through to core behavior.
pub struct HandlerInvocation {
    pub element: Option<InteractiveElement>,
    pub args: Vec<String>,
    pub driver: Arc<dyn PageDriver>,
}

/// A user-supplied command handler.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn run(&self, invocation: HandlerInvocation) -> ActionResult;
}

/// Closure adapter so simple handlers don't need a named type.
struct FnHandler<F>(F);

#[async_trait]
impl<F> ActionHandler for FnHandler<F>
where
    F: Fn(HandlerInvocation) -> BoxFuture<'static, ActionResult> + Send + Sync,
{
    async fn run(&self, invocation: HandlerInvocation) -> ActionResult {
        (self.0)(invocation).await
    }
}

/// Wrap an async closure as an [`ActionHandler`].
pub fn handler_fn<F>(f: F) -> Arc<dyn ActionHandler>
where
    F: Fn(HandlerInvocation) -> BoxFuture<'static, ActionResult> + Send + Sync + 'static,
{
    Arc::new(FnHandler(f))
}

/// A named command extension, registered once at startup.
///
/// `override_core_behavior` is carried as registration metadata; see the
/// dispatcher for how (and how literally) it is honored.
#[derive(Clone)]
pub struct CustomActionHandler {
    pub command_name: String,
    pub handler: Arc<dyn ActionHandler>,
    pub override_core_behavior: bool,
}

impl CustomActionHandler {
    pub fn new(command_name: impl Into<String>, handler: Arc<dyn ActionHandler>) -> Self {
        Self {
            command_name: command_name.into(),
            handler,
            override_core_behavior: false,
        }
    }

    pub fn overriding_core(mut self) -> Self {
        self.override_core_behavior = true;
        self
    }
}

impl fmt::Debug for CustomActionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomActionHandler")
            .field("command_name", &self.command_name)
            .field("override_core_behavior", &self.override_core_behavior)
            .finish_non_exhaustive()
    }
}

/// Reads one custom attribute off every interactive element.
///
/// The optional transform is a pure function from the raw attribute string
/// to a tagged value; without one the raw string passes through as
/// [`CustomValue::Text`].
#[derive(Clone)]
pub struct CustomAttributeReader {
    pub attribute_name: String,
    pub output_key: String,
    pub transform: Option<Arc<dyn Fn(&str) -> CustomValue + Send + Sync>>,
}

impl CustomAttributeReader {
    pub fn new(attribute_name: impl Into<String>, output_key: impl Into<String>) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            output_key: output_key.into(),
            transform: None,
        }
    }

    pub fn with_transform(
        mut self,
        transform: impl Fn(&str) -> CustomValue + Send + Sync + 'static,
    ) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Apply the transform (or the text passthrough) to a raw value.
    pub fn read(&self, raw: &str) -> CustomValue {
        match &self.transform {
            Some(transform) => transform(raw),
            None => CustomValue::Text(raw.to_string()),
        }
    }
}

impl fmt::Debug for CustomAttributeReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomAttributeReader")
            .field("attribute_name", &self.attribute_name)
            .field("output_key", &self.output_key)
            .field("has_transform", &self.transform.is_some())
            .finish()
    }
}
