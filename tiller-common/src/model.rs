//! Typed records read out of an annotated page.
//!
//! All records serialize camelCase because that is what the agent-facing
//! protocol layer speaks. The bridge relays the read-only records
//! (containers, regions, status areas, loading indicators) verbatim and
//! never mutates them; only [`InteractiveElement`] carries behavior.

use crate::attrs;
use crate::contract::CustomAttributeReader;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Input kinds that never accept typed text.
const NON_TEXT_INPUT_KINDS: [&str; 10] = [
    "input-file",
    "input-reset",
    "input-image",
    "input-color",
    "input-range",
    "input-date",
    "input-month",
    "input-week",
    "input-time",
    "input-datetime-local",
];

/// The element kind vocabulary.
///
/// Kinds use the wire names agents see (`button`, `a`, `select`,
/// `input-checkbox`, ...). Authors may override the inferred kind via
/// [`attrs::ELEMENT_TYPE`], including kinds outside the fixed vocabulary,
/// which pass through as [`ElementKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementKind {
    Button,
    Link,
    Textarea,
    Select,
    Checkbox,
    Radio,
    InputButton,
    InputSubmit,
    /// Any other `input-*` variant, stored under its full wire name.
    Input(String),
    /// Author-defined kind outside the fixed vocabulary.
    Other(String),
}

impl ElementKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "button" => Self::Button,
            "a" => Self::Link,
            "textarea" => Self::Textarea,
            "select" => Self::Select,
            "input-checkbox" => Self::Checkbox,
            "input-radio" => Self::Radio,
            "input-button" => Self::InputButton,
            "input-submit" => Self::InputSubmit,
            other if other.starts_with("input-") => Self::Input(other.to_string()),
            other => Self::Other(other.to_string()),
        }
    }

    /// Infer the kind from tag name and, for `<input>`, the `type` attribute.
    pub fn infer(tag: &str, input_type: Option<&str>) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "a" => Self::Link,
            "button" => Self::Button,
            "textarea" => Self::Textarea,
            "select" => Self::Select,
            "input" => {
                let variant = input_type.unwrap_or("text").to_ascii_lowercase();
                Self::from_name(&format!("input-{variant}"))
            }
            other => Self::Other(other.to_string()),
        }
    }

    /// Wire name of this kind.
    pub fn name(&self) -> &str {
        match self {
            Self::Button => "button",
            Self::Link => "a",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Checkbox => "input-checkbox",
            Self::Radio => "input-radio",
            Self::InputButton => "input-button",
            Self::InputSubmit => "input-submit",
            Self::Input(name) | Self::Other(name) => name,
        }
    }

    /// Whether `type` can insert text into this kind.
    pub fn accepts_text(&self) -> bool {
        match self {
            Self::Textarea => true,
            Self::Input(name) => !NON_TEXT_INPUT_KINDS.contains(&name.as_str()),
            _ => false,
        }
    }

    /// Whether the kind gets a default `click` affordance.
    ///
    /// Buttons, submits, and links always do; beyond those, everything that
    /// is not an `input-*` variant counts as clickable, which means selects
    /// and textareas pick up a click hint alongside their primary one.
    pub fn is_generic_clickable(&self) -> bool {
        match self {
            Self::Button | Self::InputButton | Self::InputSubmit | Self::Link => true,
            other => !other.name().starts_with("input-"),
        }
    }
}

impl From<String> for ElementKind {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<ElementKind> for String {
    fn from(kind: ElementKind) -> Self {
        kind.name().to_string()
    }
}

/// A tagged custom-data value produced by an attribute reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomValue {
    Text(String),
    Number(f64),
    Absent,
}

/// One `<option>` of a select element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
    #[serde(default)]
    pub selected: bool,
}

/// Full state of one interactive element at read time.
///
/// Invariants: `id` is unique within a snapshot; the kind gates which
/// optional fields are meaningful (`is_checked` and `radio_group` only for
/// checkables, `options` only for selects).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveElement {
    pub id: String,
    #[serde(rename = "elementType")]
    pub kind: ElementKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_checked: Option<bool>,
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(default)]
    pub is_read_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radio_group: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_data: BTreeMap<String, CustomValue>,
}

/// Element state as collected by an in-page script, before annotation
/// semantics are applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawElementState {
    pub id: String,
    pub tag: String,
    pub input_type: Option<String>,
    pub text: Option<String>,
    pub value: Option<String>,
    pub checked: Option<bool>,
    pub disabled: bool,
    pub read_only: bool,
    pub attributes: BTreeMap<String, String>,
    pub options: Vec<SelectOption>,
}

/// `data-agent-disabled=""`, `"true"`, and `"1"` all mean set.
fn flag_is_set(raw: &str) -> bool {
    matches!(raw, "" | "true" | "1")
}

impl InteractiveElement {
    /// Apply the annotation semantics to a raw script read.
    ///
    /// Author attributes override inferred values (kind, label, current
    /// value, flags); `readers` populate `custom_data` in registration
    /// order, skipping attributes the element does not carry.
    pub fn from_raw(raw: RawElementState, readers: &[CustomAttributeReader]) -> Self {
        let attr = |name: &str| raw.attributes.get(name).cloned();

        let kind = attr(attrs::ELEMENT_TYPE)
            .map(|name| ElementKind::from_name(&name))
            .unwrap_or_else(|| ElementKind::infer(&raw.tag, raw.input_type.as_deref()));

        let label = attr(attrs::ELEMENT_LABEL)
            .or_else(|| {
                raw.text
                    .as_deref()
                    .map(str::trim)
                    .filter(|text| !text.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| raw.id.clone());

        let is_checked = match kind {
            ElementKind::Checkbox | ElementKind::Radio => Some(raw.checked.unwrap_or(false)),
            _ => raw.checked,
        };

        let radio_group = (kind == ElementKind::Radio)
            .then(|| attr(attrs::GROUP).or_else(|| attr("name")))
            .flatten();

        let mut custom_data = BTreeMap::new();
        for reader in readers {
            if let Some(raw_value) = raw.attributes.get(&reader.attribute_name) {
                custom_data.insert(reader.output_key.clone(), reader.read(raw_value));
            }
        }

        Self {
            id: raw.id,
            label,
            purpose: attr(attrs::PURPOSE),
            current_value: attr(attrs::VALUE).or(raw.value),
            is_checked,
            is_disabled: attr(attrs::DISABLED_STATE)
                .map(|v| flag_is_set(&v))
                .unwrap_or(raw.disabled),
            is_read_only: attr(attrs::READONLY_STATE)
                .map(|v| flag_is_set(&v))
                .unwrap_or(raw.read_only),
            radio_group,
            options: raw.options,
            custom_data,
            kind,
        }
    }
}

/// Read-only display container with its items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayContainer {
    pub container_id: String,
    pub items: Vec<DisplayItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

/// One item inside a display container.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

/// A labeled page region.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRegion {
    pub region_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

/// A container whose children are transient status messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusMessageArea {
    pub container_id: String,
    pub messages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

/// A loading indicator and what it loads for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingIndicator {
    pub element_id: String,
    pub is_loading_for: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// The non-interactive half of a page read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructuredData {
    pub containers: Vec<DisplayContainer>,
    pub regions: Vec<PageRegion>,
    pub status_messages: Vec<StatusMessageArea>,
    pub loading_indicators: Vec<LoadingIndicator>,
}

/// Full structured read of current page state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScreenSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_url: Option<String>,
    pub containers: Vec<DisplayContainer>,
    pub regions: Vec<PageRegion>,
    pub status_messages: Vec<StatusMessageArea>,
    pub loading_indicators: Vec<LoadingIndicator>,
    pub interactive_elements: Vec<InteractiveElement>,
}

impl ScreenSnapshot {
    pub fn from_parts(
        current_url: Option<String>,
        structured: StructuredData,
        interactive_elements: Vec<InteractiveElement>,
    ) -> Self {
        Self {
            current_url,
            containers: structured.containers,
            regions: structured.regions,
            status_messages: structured.status_messages,
            loading_indicators: structured.loading_indicators,
            interactive_elements,
        }
    }
}

/// A suggested command for one element, with a ready-to-send hint string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDescriptor {
    pub id: String,
    pub label: String,
    #[serde(rename = "elementType")]
    pub kind: ElementKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    pub command_hint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_checked: Option<bool>,
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(default)]
    pub is_read_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radio_group: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}
