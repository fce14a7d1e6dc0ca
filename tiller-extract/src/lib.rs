//! Reads the live page's `data-agent-*` annotations into typed records.
//!
//! [`ScriptExtractor`] implements the extraction seam by executing one
//! sweep script in the page and decoding its JSON result. The sweep reuses
//! the driver's element collector, so single-element reads and full-page
//! reads always agree on shape.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tiller_common::model::RawElementState;
use tiller_common::outcome::ExtractErrorKind;
use tiller_common::{
    CustomAttributeReader, DisplayContainer, DomExtractor, InteractiveElement, LoadingIndicator,
    PageRegion, ParserResult, StatusMessageArea, StructuredData,
};
use tiller_driver::{script, WebDriverBridge};
use tracing::{debug, warn};

/// Script sweeping the whole page for annotated content.
fn sweep_script() -> String {
    format!(
        r#"{collect}
const out = {{
  containers: [],
  regions: [],
  statusMessages: [],
  loadingIndicators: [],
  elements: []
}};

for (const el of document.querySelectorAll('[data-agent-display-container]')) {{
  const items = [];
  for (const item of el.querySelectorAll('[data-agent-display-item-text]')) {{
    const fields = {{}};
    let hasFields = false;
    for (const fieldEl of item.querySelectorAll('[data-agent-field]')) {{
      fields[fieldEl.getAttribute('data-agent-field')] = (fieldEl.innerText || '').trim();
      hasFields = true;
    }}
    items.push({{
      itemId: item.getAttribute('data-agent-display-item-id'),
      text: (item.innerText || '').trim(),
      fields: hasFields ? fields : null
    }});
  }}
  const region = el.closest('[data-agent-region]');
  out.containers.push({{
    containerId: el.getAttribute('data-agent-display-container'),
    items: items,
    region: region ? region.getAttribute('data-agent-region') : null,
    purpose: el.getAttribute('data-agent-purpose')
  }});
}}

for (const el of document.querySelectorAll('[data-agent-region]')) {{
  out.regions.push({{
    regionId: el.getAttribute('data-agent-region'),
    label: el.getAttribute('data-agent-element-label') || el.getAttribute('aria-label'),
    purpose: el.getAttribute('data-agent-purpose')
  }});
}}

for (const el of document.querySelectorAll('[data-agent-status-message-container]')) {{
  const messages = [];
  for (const child of el.children) {{
    const text = (child.innerText || '').trim();
    if (text) messages.push(text);
  }}
  if (!messages.length) {{
    const own = (el.innerText || '').trim();
    if (own) messages.push(own);
  }}
  out.statusMessages.push({{
    containerId: el.getAttribute('data-agent-status-message-container'),
    messages: messages,
    purpose: el.getAttribute('data-agent-purpose')
  }});
}}

for (const el of document.querySelectorAll('[data-agent-loading-indicator-for]')) {{
  out.loadingIndicators.push({{
    elementId: el.getAttribute('data-agent-interactive-element') || el.id
      || el.getAttribute('data-agent-loading-indicator-for'),
    isLoadingFor: el.getAttribute('data-agent-loading-indicator-for'),
    text: (el.innerText || '').trim() || null
  }});
}}

for (const el of document.querySelectorAll('[data-agent-interactive-element]')) {{
  out.elements.push(collectElement(el));
}}

return out;"#,
        collect = script::COLLECT_ELEMENT_FN
    )
}

/// Raw shape the sweep script returns.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawSweep {
    containers: Vec<DisplayContainer>,
    regions: Vec<PageRegion>,
    status_messages: Vec<StatusMessageArea>,
    loading_indicators: Vec<LoadingIndicator>,
    elements: Vec<RawElementState>,
}

fn decode_sweep(value: Value) -> Result<RawSweep, String> {
    serde_json::from_value(value).map_err(|err| err.to_string())
}

/// Apply annotation semantics to the raw element list, dropping duplicate
/// ids (first occurrence wins, since ids must be unique per snapshot).
fn map_elements(
    raw: Vec<RawElementState>,
    readers: &[CustomAttributeReader],
) -> Vec<InteractiveElement> {
    let mut seen = HashSet::new();
    let mut elements = Vec::with_capacity(raw.len());
    for state in raw {
        let element = InteractiveElement::from_raw(state, readers);
        if element.id.is_empty() {
            warn!(target: "extract", "skipping interactive element with empty id");
            continue;
        }
        if !seen.insert(element.id.clone()) {
            warn!(target: "extract", id = %element.id, "duplicate interactive element id; keeping first");
            continue;
        }
        elements.push(element);
    }
    elements
}

/// Extraction collaborator backed by the driver's page handle.
pub struct ScriptExtractor {
    driver: Arc<WebDriverBridge>,
    readers: Vec<CustomAttributeReader>,
}

impl ScriptExtractor {
    pub fn new(driver: Arc<WebDriverBridge>, readers: Vec<CustomAttributeReader>) -> Self {
        Self { driver, readers }
    }

    async fn run_sweep(&self) -> ParserResult<RawSweep> {
        let Some(client) = self.driver.page().await else {
            return ParserResult::fail(
                ExtractErrorKind::PageNotAvailable,
                "No page is available to extract from",
            );
        };

        let value = match client.execute(&sweep_script(), Vec::new()).await {
            Ok(value) => value,
            Err(err) => {
                return ParserResult::fail(
                    ExtractErrorKind::ParsingFailed,
                    format!("Page sweep script failed: {err}"),
                )
            }
        };

        match decode_sweep(value) {
            Ok(sweep) => {
                debug!(
                    target: "extract",
                    containers = sweep.containers.len(),
                    elements = sweep.elements.len(),
                    "page sweep complete"
                );
                ParserResult::success(sweep)
            }
            Err(err) => ParserResult::fail(
                ExtractErrorKind::ParsingFailed,
                format!("Page sweep returned an unexpected shape: {err}"),
            ),
        }
    }
}

#[async_trait]
impl DomExtractor for ScriptExtractor {
    async fn get_structured_data(&self) -> ParserResult<StructuredData> {
        self.run_sweep().await.map_data(|sweep| StructuredData {
            containers: sweep.containers,
            regions: sweep.regions,
            status_messages: sweep.status_messages,
            loading_indicators: sweep.loading_indicators,
        })
    }

    async fn get_interactive_elements_with_state(
        &self,
    ) -> ParserResult<Vec<InteractiveElement>> {
        let readers = self.readers.clone();
        self.run_sweep()
            .await
            .map_data(|sweep| map_elements(sweep.elements, &readers))
    }
}
