//! Scripted collaborators shared by the core integration tests.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use tiller_common::outcome::{DriverErrorKind, ExtractErrorKind};
use tiller_common::{
    ActionResult, DomExtractor, ElementKind, InteractiveElement, PageDriver, ParserResult,
    StructuredData,
};

/// Driver that records every call and answers from a small script.
#[derive(Default)]
pub struct MockDriver {
    pub calls: Mutex<Vec<String>>,
    pub fail_launch: bool,
    pub fail_navigate: bool,
    pub fail_close: bool,
    /// Option values `select_option` accepts.
    pub known_option_values: Vec<String>,
    /// Elements `get_element_state` can resolve.
    pub element_states: HashMap<String, InteractiveElement>,
}

impl MockDriver {
    pub fn with_element(mut self, element: InteractiveElement) -> Self {
        self.element_states.insert(element.id.clone(), element);
        self
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn launch(&self) -> ActionResult {
        self.record("launch".into());
        if self.fail_launch {
            ActionResult::fail(
                DriverErrorKind::BrowserLaunchFailed,
                "no WebDriver service reachable",
            )
        } else {
            ActionResult::ok("launched")
        }
    }

    async fn navigate(&self, url: &str) -> ActionResult {
        self.record(format!("navigate {url}"));
        if self.fail_navigate {
            ActionResult::fail(
                DriverErrorKind::NavigationFailed,
                format!("could not reach {url}"),
            )
        } else {
            ActionResult::ok(format!("navigated to {url}"))
        }
    }

    async fn close(&self) -> ActionResult {
        self.record("close".into());
        if self.fail_close {
            ActionResult::fail(DriverErrorKind::BrowserCloseFailed, "session already gone")
        } else {
            ActionResult::ok("closed")
        }
    }

    async fn current_url(&self) -> ActionResult<String> {
        self.record("current_url".into());
        ActionResult::success("http://localhost:5173/".to_string())
    }

    async fn click(&self, id: &str) -> ActionResult {
        self.record(format!("click {id}"));
        ActionResult::ok(format!("Clicked element #{id}"))
    }

    async fn type_text(&self, id: &str, text: &str) -> ActionResult {
        self.record(format!("type {id} {text}"));
        ActionResult::ok(format!("Typed into element #{id}"))
    }

    async fn select_option(&self, id: &str, value: &str) -> ActionResult {
        self.record(format!("select {id} {value}"));
        if self.known_option_values.iter().any(|known| known == value) {
            ActionResult::ok(format!("Selected \"{value}\" in element #{id}"))
        } else {
            ActionResult::fail(
                DriverErrorKind::OptionNotFound,
                format!("Element #{id} has no option with value \"{value}\""),
            )
        }
    }

    async fn check_element(&self, id: &str) -> ActionResult {
        self.record(format!("check {id}"));
        ActionResult::ok(format!("Checked element #{id}"))
    }

    async fn uncheck_element(&self, id: &str) -> ActionResult {
        self.record(format!("uncheck {id}"));
        ActionResult::ok(format!("Unchecked element #{id}"))
    }

    async fn select_radio_button(&self, id: &str, value: &str) -> ActionResult {
        self.record(format!("choose {id} {value}"));
        ActionResult::ok(format!("Chose radio #{id}"))
    }

    async fn get_element_state(&self, id: &str) -> ActionResult<InteractiveElement> {
        self.record(format!("get_element_state {id}"));
        match self.element_states.get(id) {
            Some(element) => ActionResult::success(element.clone()),
            None => ActionResult::fail(
                DriverErrorKind::ElementNotFound,
                format!("No interactive element with id \"{id}\""),
            ),
        }
    }
}

/// Extractor answering with canned envelopes.
pub struct MockExtractor {
    pub structured: ParserResult<StructuredData>,
    pub elements: ParserResult<Vec<InteractiveElement>>,
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self {
            structured: ParserResult::success(StructuredData::default()),
            elements: ParserResult::success(Vec::new()),
        }
    }
}

impl MockExtractor {
    pub fn failing(kind: ExtractErrorKind, message: &str) -> Self {
        Self {
            structured: ParserResult::fail(kind, message),
            elements: ParserResult::fail(kind, message),
        }
    }
}

#[async_trait]
impl DomExtractor for MockExtractor {
    async fn get_structured_data(&self) -> ParserResult<StructuredData> {
        self.structured.clone()
    }

    async fn get_interactive_elements_with_state(
        &self,
    ) -> ParserResult<Vec<InteractiveElement>> {
        self.elements.clone()
    }
}

/// Bare element of the given kind, for scripting driver/extractor state.
pub fn element(id: &str, kind: ElementKind) -> InteractiveElement {
    InteractiveElement {
        id: id.into(),
        kind,
        label: id.into(),
        purpose: None,
        current_value: None,
        is_checked: None,
        is_disabled: false,
        is_read_only: false,
        radio_group: None,
        options: Vec::new(),
        custom_data: BTreeMap::new(),
    }
}
