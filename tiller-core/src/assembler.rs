//! Screen snapshot assembly and action-descriptor derivation.
//!
//! Both reads source the extractor's current view of the live page. On
//! extractor failure the snapshot fields stay empty and the envelope's
//! `success` flag drops, preserving the extractor's error kind; the
//! assembler never invents placeholder elements.

use crate::session::SessionContext;
use std::sync::Arc;
use tiller_common::outcome::ExtractErrorKind;
use tiller_common::{
    ActionDescriptor, BridgeErrorKind, BridgeResult, ElementKind, InteractiveElement,
    ScreenSnapshot,
};
use tracing::debug;

/// Preserve the extractor's kind outward, defaulting to `Unknown` when the
/// failure was unclassifiable.
fn extract_kind(kind: Option<ExtractErrorKind>) -> BridgeErrorKind {
    kind.unwrap_or(ExtractErrorKind::Unknown).into()
}

/// Per-session snapshot assembler; shares the session's single-flight
/// guard with the dispatcher.
pub struct SnapshotAssembler {
    ctx: Arc<SessionContext>,
}

impl SnapshotAssembler {
    pub fn new(ctx: Arc<SessionContext>) -> Self {
        Self { ctx }
    }

    /// Full structured read: containers, regions, status areas, loading
    /// indicators, and interactive elements, plus the current URL.
    pub async fn snapshot(&self) -> BridgeResult<ScreenSnapshot> {
        let _gate = self.ctx.gate.lock().await;

        let structured = self.ctx.extractor.get_structured_data().await;
        let elements = self.ctx.extractor.get_interactive_elements_with_state().await;
        // Best effort; a snapshot without a URL is still a snapshot.
        let current_url = self.ctx.driver.current_url().await.data;

        let mut failure: Option<(BridgeErrorKind, String)> = None;
        if !structured.success {
            failure = Some((
                extract_kind(structured.error_type),
                format!(
                    "Failed to read structured data: {}",
                    structured.message.as_deref().unwrap_or("no details")
                ),
            ));
        } else if !elements.success {
            failure = Some((
                extract_kind(elements.error_type),
                format!(
                    "Failed to read interactive elements: {}",
                    elements.message.as_deref().unwrap_or("no details")
                ),
            ));
        }

        let snapshot = ScreenSnapshot::from_parts(
            current_url,
            structured.data.unwrap_or_default(),
            elements.data.unwrap_or_default(),
        );

        match failure {
            None => {
                debug!(
                    target: "assemble",
                    elements = snapshot.interactive_elements.len(),
                    containers = snapshot.containers.len(),
                    "snapshot assembled"
                );
                BridgeResult::success(snapshot)
            }
            Some((kind, message)) => BridgeResult::fail(kind, message).with_data(snapshot),
        }
    }

    /// Ordered action descriptors for every interactive element currently
    /// on the page.
    pub async fn available_actions(&self) -> BridgeResult<Vec<ActionDescriptor>> {
        let _gate = self.ctx.gate.lock().await;

        let elements = self.ctx.extractor.get_interactive_elements_with_state().await;
        if !elements.success {
            return BridgeResult::fail(
                extract_kind(elements.error_type),
                format!(
                    "Failed to get interactive elements: {}",
                    elements.message.as_deref().unwrap_or("no details")
                ),
            )
            .with_data(Vec::new());
        }

        let actions = derive_actions(&elements.data.unwrap_or_default());
        BridgeResult::success(actions)
    }
}

/// Derive the per-element action descriptors, kind-keyed and
/// order-preserving relative to the input list.
///
/// An element contributes one descriptor per matching rule, so a `select`
/// (also a generic clickable) emits both a click and a select hint.
pub fn derive_actions(elements: &[InteractiveElement]) -> Vec<ActionDescriptor> {
    let mut actions = Vec::new();

    for element in elements {
        if element.kind.is_generic_clickable() {
            actions.push(descriptor(element, format!("click #{}", element.id)));
        }

        if element.kind.accepts_text() {
            actions.push(descriptor(
                element,
                format!("type #{} \"<text_to_type>\"", element.id),
            ));
        }

        if element.kind == ElementKind::Select && !element.options.is_empty() {
            let mut action = descriptor(
                element,
                format!("select #{} \"<value_to_select>\"", element.id),
            );
            action.options = element.options.clone();
            actions.push(action);
        }

        if element.kind == ElementKind::Checkbox {
            let hint = if element.is_checked.unwrap_or(false) {
                format!("uncheck #{}", element.id)
            } else {
                format!("check #{}", element.id)
            };
            actions.push(descriptor(element, hint));
        }

        if element.kind == ElementKind::Radio {
            let mut hint = format!("choose #{}", element.id);
            if let Some(group) = &element.radio_group {
                hint.push_str(&format!(" in_group {group}"));
            }
            let mut action = descriptor(element, hint);
            action.radio_group = element.radio_group.clone();
            actions.push(action);
        }
    }

    actions
}

fn descriptor(element: &InteractiveElement, command_hint: String) -> ActionDescriptor {
    ActionDescriptor {
        id: element.id.clone(),
        label: element.label.clone(),
        kind: element.kind.clone(),
        purpose: element.purpose.clone(),
        command_hint,
        current_value: element.current_value.clone(),
        is_checked: element.is_checked,
        is_disabled: element.is_disabled,
        is_read_only: element.is_read_only,
        radio_group: None,
        options: Vec::new(),
    }
}
