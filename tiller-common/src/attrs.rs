//! The `data-agent-*` annotation vocabulary pages use to opt in.
//!
//! A page exposes itself to the bridge by tagging elements with these
//! attributes. Interactive elements carry a stable id in
//! [`INTERACTIVE_ELEMENT`]; everything else refines what the bridge reports
//! about them.

/// Marks an element as interactive; the value is its stable id.
pub const INTERACTIVE_ELEMENT: &str = "data-agent-interactive-element";
/// Marks a read-only display container; the value is its container id.
pub const DISPLAY_CONTAINER: &str = "data-agent-display-container";
/// Marks one display item inside a container.
pub const DISPLAY_ITEM_TEXT: &str = "data-agent-display-item-text";
/// Optional per-item id inside a display container.
pub const DISPLAY_ITEM_ID: &str = "data-agent-display-item-id";
/// Named field inside a display item.
pub const FIELD_NAME: &str = "data-agent-field";
/// Human label overriding the element's visible text.
pub const ELEMENT_LABEL: &str = "data-agent-element-label";
/// Author override for the element kind reported to agents.
pub const ELEMENT_TYPE: &str = "data-agent-element-type";
/// Free-text author intent for an element or container.
pub const PURPOSE: &str = "data-agent-purpose";
/// Radio-group membership (falls back to the `name` attribute).
pub const GROUP: &str = "data-agent-group";
/// Author override for the element's current value.
pub const VALUE: &str = "data-agent-value";
/// Marks a page region; the value is the region id.
pub const REGION: &str = "data-agent-region";
/// Author override for the disabled flag.
pub const DISABLED_STATE: &str = "data-agent-disabled";
/// Author override for the read-only flag.
pub const READONLY_STATE: &str = "data-agent-readonly";
/// Marks a loading indicator; the value names what it loads for.
pub const LOADING_INDICATOR_FOR: &str = "data-agent-loading-indicator-for";
/// Marks a container whose children are transient status messages.
pub const STATUS_MESSAGE_CONTAINER: &str = "data-agent-status-message-container";
/// Declares the route or URL a clickable element navigates to.
pub const NAVIGATES_TO: &str = "data-agent-navigates-to";
/// Declares which container an element controls.
pub const CONTROLS: &str = "data-agent-controls";
/// Declares which container an element updates on activation.
pub const UPDATES_CONTAINER: &str = "data-agent-updates-container";
