//! The uniform result envelope and the two closed error taxonomies.
//!
//! Every operation that crosses a component boundary returns an
//! [`Outcome`]: success flag, optional human-readable message, optional
//! payload, optional classified error kind. Nothing in the bridge ever
//! surfaces a raw error to the outward caller.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Error kinds a browser-driver operation can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriverErrorKind {
    PageNotAvailable,
    ElementNotFound,
    Timeout,
    NavigationFailed,
    ActionFailed,
    BrowserLaunchFailed,
    BrowserCloseFailed,
    InvalidInput,
    NotInitialized,
    OptionNotFound,
    AttributeNotFound,
    Unknown,
}

/// Error kinds a page-extraction operation can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractErrorKind {
    PageNotAvailable,
    ParsingFailed,
    ElementNotFound,
    InvalidSelector,
    Unknown,
}

/// Error kind attached to outward-facing envelopes.
///
/// The outward caller sees a single `errorType` string slot; internally the
/// driver and extraction vocabularies stay separate closed enums, so this is
/// their untagged union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BridgeErrorKind {
    Driver(DriverErrorKind),
    Extract(ExtractErrorKind),
}

impl From<DriverErrorKind> for BridgeErrorKind {
    fn from(kind: DriverErrorKind) -> Self {
        Self::Driver(kind)
    }
}

impl From<ExtractErrorKind> for BridgeErrorKind {
    fn from(kind: ExtractErrorKind) -> Self {
        Self::Extract(kind)
    }
}

impl fmt::Display for DriverErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl fmt::Display for ExtractErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl fmt::Display for BridgeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Driver(kind) => kind.fmt(f),
            Self::Extract(kind) => kind.fmt(f),
        }
    }
}

/// The uniform result envelope.
///
/// Invariants: `success == false` implies `message` is set, and
/// `error_type` is set whenever the failure is classifiable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome<T, K> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(rename = "errorType", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<K>,
}

/// Envelope for driver-side operations.
pub type ActionResult<T = Value> = Outcome<T, DriverErrorKind>;

/// Envelope for extraction outcomes.
pub type ParserResult<T> = Outcome<T, ExtractErrorKind>;

/// Envelope handed to the outward caller.
pub type BridgeResult<T = Value> = Outcome<T, BridgeErrorKind>;

impl<T, K> Outcome<T, K> {
    /// Successful outcome carrying only a message.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            error_type: None,
        }
    }

    /// Successful outcome carrying only a payload.
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            error_type: None,
        }
    }

    /// Failed outcome with a classified kind and a message.
    pub fn fail(kind: K, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            error_type: Some(kind),
        }
    }

    /// Attach a payload, keeping the rest of the envelope.
    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Re-type the error kind, e.g. into [`BridgeErrorKind`] at the facade.
    pub fn widen<K2: From<K>>(self) -> Outcome<T, K2> {
        Outcome {
            success: self.success,
            message: self.message,
            data: self.data,
            error_type: self.error_type.map(K2::from),
        }
    }

    /// Replace the payload type, dropping any payload present.
    pub fn erase_data<U>(self) -> Outcome<U, K> {
        Outcome {
            success: self.success,
            message: self.message,
            data: None,
            error_type: self.error_type,
        }
    }

    /// Map the payload, keeping flag, message, and kind.
    pub fn map_data<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U, K> {
        Outcome {
            success: self.success,
            message: self.message,
            data: self.data.map(f),
            error_type: self.error_type,
        }
    }
}
