//! The action dispatcher: resolves a command string against the handler
//! registry and the built-in action set, executes exactly one path, and
//! always returns the uniform envelope.
//!
//! Resolution order:
//! 1. a registered custom handler wins for its name, unconditionally;
//! 2. otherwise the name must be a built-in, or the command is rejected
//!    as unrecognized;
//! 3. built-ins require a target element id (except `navigate`) and
//!    delegate to the driver, whose envelope is returned unchanged.

use crate::parser::{parse_command, ParsedCommand};
use crate::session::SessionContext;
use std::sync::Arc;
use tiller_common::outcome::DriverErrorKind;
use tiller_common::{ActionResult, HandlerInvocation, InteractiveElement};
use tracing::{info, warn};

/// The built-in command vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoreCommand {
    Click,
    Type,
    Select,
    Check,
    Uncheck,
    Choose,
    Navigate,
}

impl CoreCommand {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "click" => Some(Self::Click),
            "type" => Some(Self::Type),
            "select" => Some(Self::Select),
            "check" => Some(Self::Check),
            "uncheck" => Some(Self::Uncheck),
            "choose" => Some(Self::Choose),
            "navigate" => Some(Self::Navigate),
            _ => None,
        }
    }

    /// Every built-in except `navigate` acts on one element.
    fn requires_target(&self) -> bool {
        !matches!(self, Self::Navigate)
    }
}

/// Per-session command dispatcher. Holds only a shared reference to the
/// session context; the lifecycle manager owns the collaborators.
pub struct Dispatcher {
    ctx: Arc<SessionContext>,
}

impl Dispatcher {
    pub fn new(ctx: Arc<SessionContext>) -> Self {
        Self { ctx }
    }

    /// Parse and execute one command line.
    pub async fn dispatch(&self, command_line: &str) -> ActionResult {
        let Some(parsed) = parse_command(command_line) else {
            return ActionResult::fail(
                DriverErrorKind::InvalidInput,
                "Invalid command string format",
            );
        };

        info!(
            target: "dispatch",
            command = %parsed.name,
            element = parsed.target.as_deref().unwrap_or("-"),
            args = parsed.args.len(),
            "dispatching command"
        );

        // One in-flight call sequence against the collaborators at a time.
        let _gate = self.ctx.gate.lock().await;

        if let Some(custom) = self.ctx.handlers.lookup(&parsed.name) {
            let custom = custom.clone();
            return self.run_custom(custom, parsed).await;
        }

        let Some(core) = CoreCommand::from_name(&parsed.name) else {
            return ActionResult::fail(
                DriverErrorKind::InvalidInput,
                format!(
                    "Command \"{}\" is not a recognized core command and no custom handler is registered for it",
                    parsed.name
                ),
            );
        };

        self.run_core(core, parsed).await
    }

    /// Execute a registered handler. The handler runs on its own task so a
    /// panic inside it never takes the dispatcher down; it surfaces as
    /// `ActionFailed` instead.
    async fn run_custom(
        &self,
        custom: tiller_common::CustomActionHandler,
        parsed: ParsedCommand,
    ) -> ActionResult {
        if !custom.override_core_behavior && CoreCommand::from_name(&parsed.name).is_some() {
            // Registration for a core name is terminal regardless of the
            // flag; see the registry docs for why this stays literal.
            warn!(
                target: "dispatch",
                command = %parsed.name,
                "custom handler registered for a core command without override_core_behavior; \
                 the handler still replaces core behavior"
            );
        }

        let element = match &parsed.target {
            None => None,
            Some(id) => match self.fetch_element_state(id).await {
                Ok(element) => Some(element),
                Err(failure) => return failure,
            },
        };

        let invocation = HandlerInvocation {
            element,
            args: parsed.args,
            driver: self.ctx.driver.clone(),
        };

        let handler = custom.handler.clone();
        let outcome = tokio::spawn(async move { handler.run(invocation).await }).await;
        match outcome {
            Ok(result) => result,
            Err(join_error) => {
                let reason = if join_error.is_panic() {
                    panic_text(join_error.into_panic())
                } else {
                    join_error.to_string()
                };
                ActionResult::fail(
                    DriverErrorKind::ActionFailed,
                    format!(
                        "Error executing custom handler for \"{}\": {reason}",
                        custom.command_name
                    ),
                )
            }
        }
    }

    /// Read the target element's current state before a custom handler
    /// runs. A failed read short-circuits the dispatch with the read's own
    /// error; the handler is never invoked.
    async fn fetch_element_state(&self, id: &str) -> Result<InteractiveElement, ActionResult> {
        let state = self.ctx.driver.get_element_state(id).await;
        match (state.success, state.data) {
            (true, Some(element)) => Ok(element),
            _ => Err(ActionResult {
                success: false,
                message: Some(format!(
                    "Failed to get element state for #{id}: {}",
                    state.message.as_deref().unwrap_or("no details")
                )),
                data: None,
                error_type: Some(state.error_type.unwrap_or(DriverErrorKind::ElementNotFound)),
            }),
        }
    }

    async fn run_core(&self, core: CoreCommand, parsed: ParsedCommand) -> ActionResult {
        if core.requires_target() && parsed.target.is_none() {
            return ActionResult::fail(
                DriverErrorKind::InvalidInput,
                format!("Core command \"{}\" requires an element id", parsed.name),
            );
        }

        let driver = &self.ctx.driver;
        match core {
            CoreCommand::Click => driver.click(parsed.target.as_deref().unwrap_or_default()).await,
            CoreCommand::Check => {
                driver
                    .check_element(parsed.target.as_deref().unwrap_or_default())
                    .await
            }
            CoreCommand::Uncheck => {
                driver
                    .uncheck_element(parsed.target.as_deref().unwrap_or_default())
                    .await
            }
            CoreCommand::Type => {
                let Some(text) = parsed.args.first() else {
                    return ActionResult::fail(
                        DriverErrorKind::InvalidInput,
                        "Core command \"type\" requires the text to type",
                    );
                };
                driver
                    .type_text(parsed.target.as_deref().unwrap_or_default(), text)
                    .await
            }
            CoreCommand::Select => {
                let Some(value) = parsed.args.first() else {
                    return ActionResult::fail(
                        DriverErrorKind::InvalidInput,
                        "Core command \"select\" requires an option value",
                    );
                };
                driver
                    .select_option(parsed.target.as_deref().unwrap_or_default(), value)
                    .await
            }
            CoreCommand::Choose => {
                let id = parsed.target.as_deref().unwrap_or_default();
                // With no explicit value the element id doubles as the
                // value: "choose #opt-red" selects that radio directly.
                let value = parsed.args.first().map(String::as_str).unwrap_or(id);
                driver.select_radio_button(id, value).await
            }
            CoreCommand::Navigate => {
                let Some(url) = parsed.args.first() else {
                    return ActionResult::fail(
                        DriverErrorKind::InvalidInput,
                        "Core command \"navigate\" requires a URL",
                    );
                };
                driver.navigate(url).await
            }
        }
    }
}

fn panic_text(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "handler panicked".to_string()
    }
}
