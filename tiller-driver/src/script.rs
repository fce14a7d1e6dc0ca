//! In-page JavaScript fragments shared by the driver and the extractor.
//!
//! Everything the bridge knows about an element funnels through
//! [`COLLECT_ELEMENT_FN`], so the driver's single-element reads and the
//! extractor's full-page sweep report identical raw shapes.

/// JS function source collecting one element's raw state.
///
/// The returned object matches `tiller_common::model::RawElementState`
/// (camelCase keys).
pub const COLLECT_ELEMENT_FN: &str = r#"
function collectElement(el) {
  const attributes = {};
  for (const attr of el.attributes) {
    attributes[attr.name] = attr.value;
  }
  const tag = el.tagName.toLowerCase();
  const state = {
    id: el.getAttribute('data-agent-interactive-element') || el.id || '',
    tag: tag,
    inputType: tag === 'input' ? (el.getAttribute('type') || 'text') : null,
    text: (el.innerText || '').trim() || null,
    value: typeof el.value === 'string' ? el.value : null,
    checked: typeof el.checked === 'boolean' ? el.checked : null,
    disabled: !!el.disabled,
    readOnly: !!el.readOnly,
    attributes: attributes,
    options: []
  };
  if (tag === 'select') {
    state.options = Array.from(el.options).map(function (opt) {
      return { value: opt.value, text: opt.text, selected: opt.selected };
    });
  }
  return state;
}
"#;

/// Script reading one element by its annotation id; `arguments[0]` is the
/// id, the result is the raw state object or `null` when absent.
pub fn element_state_script() -> String {
    format!(
        r#"{COLLECT_ELEMENT_FN}
const id = arguments[0];
const el = document.querySelector(
  '[data-agent-interactive-element="' + CSS.escape(id) + '"]'
);
return el ? collectElement(el) : null;"#
    )
}

/// CSS selector addressing an interactive element by its annotation id.
pub fn element_selector(id: &str) -> String {
    format!(
        "[data-agent-interactive-element=\"{}\"]",
        id.replace('\\', "\\\\").replace('"', "\\\"")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_quotes_the_id() {
        assert_eq!(
            element_selector("save-btn"),
            "[data-agent-interactive-element=\"save-btn\"]"
        );
    }

    #[test]
    fn selector_escapes_embedded_quotes() {
        assert_eq!(
            element_selector("a\"b"),
            "[data-agent-interactive-element=\"a\\\"b\"]"
        );
    }
}
