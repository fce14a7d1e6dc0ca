//! Common types and contracts shared across Tiller crates.
//!
//! This crate defines the element model, the result envelopes, the error
//! taxonomies, the collaborator traits, and the observability helpers used
//! throughout the Tiller workspace. It is intentionally lightweight so that
//! all crates can depend on it without introducing heavy transitive costs.
//!
//! # Overview
//!
//! - [`model`]: typed records read out of an annotated page
//! - [`outcome`]: the uniform `{success, message, data, error_type}` envelope
//! - [`contract`]: the [`contract::PageDriver`] and [`contract::DomExtractor`]
//!   collaborator seams plus custom handler/reader types
//! - [`attrs`]: the `data-agent-*` annotation vocabulary
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`BridgeError`] and [`Result`]: shared error handling for plumbing code

pub mod attrs;
pub mod contract;
pub mod model;
pub mod observability;
pub mod outcome;

pub use contract::{
    ActionHandler, CustomActionHandler, CustomAttributeReader, DomExtractor, HandlerInvocation,
    PageDriver,
};
pub use model::{
    ActionDescriptor, CustomValue, DisplayContainer, DisplayItem, ElementKind, InteractiveElement,
    LoadingIndicator, PageRegion, ScreenSnapshot, SelectOption, StatusMessageArea, StructuredData,
};
pub use outcome::{
    ActionResult, BridgeErrorKind, BridgeResult, DriverErrorKind, ExtractErrorKind, Outcome,
    ParserResult,
};

/// Error type for fallible plumbing that does not cross the envelope
/// boundary: configuration, startup, and shutdown paths.
#[derive(thiserror::Error, Debug)]
pub enum BridgeError {
    /// Configuration was incomplete or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The browser session could not be brought up.
    #[error("startup error: {0}")]
    Startup(String),

    /// A request was issued in a session state that cannot serve it.
    #[error("session is {0}, not ready")]
    NotReady(&'static str),

    /// A collaborator reported an unrecoverable error.
    #[error("collaborator error: {0}")]
    Collaborator(#[from] anyhow::Error),
}

/// Convenient alias for results that use [`BridgeError`].
pub type Result<T> = std::result::Result<T, BridgeError>;
