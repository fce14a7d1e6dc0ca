//! WebDriver-backed browser driver for the bridge.
//!
//! - [`bridge::WebDriverBridge`]: the [`tiller_common::PageDriver`]
//!   implementation, one WebDriver session per instance
//! - [`script`]: in-page JavaScript used to read element state
//!
//! Element location goes through the page's own annotations: every
//! interactive element is addressed by its `data-agent-interactive-element`
//! id, never by raw CSS authored elsewhere.

pub mod bridge;
pub mod script;

pub use bridge::WebDriverBridge;
