//! Snapshot assembly through the outward facade.

mod common;

use common::{element, MockDriver, MockExtractor};
use std::sync::Arc;
use tiller_common::outcome::{BridgeErrorKind, ExtractErrorKind};
use tiller_common::{ElementKind, ParserResult, SelectOption, StructuredData};
use tiller_core::{Bridge, HandlerRegistry, SessionManager};

async fn ready_bridge(extractor: MockExtractor) -> Bridge {
    let manager = Arc::new(SessionManager::new(
        Arc::new(MockDriver::default()),
        Arc::new(extractor),
        HandlerRegistry::new(),
    ));
    manager.start("http://localhost:5173").await.expect("starts");
    Bridge::new(manager)
}

#[tokio::test]
async fn snapshot_combines_structured_data_elements_and_url() {
    let extractor = MockExtractor {
        structured: ParserResult::success(StructuredData::default()),
        elements: ParserResult::success(vec![element("save-btn", ElementKind::Button)]),
    };
    let bridge = ready_bridge(extractor).await;

    let result = bridge.screen_data().await;
    assert!(result.success);
    let snapshot = result.data.expect("snapshot payload");
    assert_eq!(snapshot.current_url.as_deref(), Some("http://localhost:5173/"));
    assert_eq!(snapshot.interactive_elements.len(), 1);
    assert_eq!(snapshot.interactive_elements[0].id, "save-btn");
}

#[tokio::test]
async fn extractor_failure_keeps_fields_empty_and_preserves_the_kind() {
    let bridge = ready_bridge(MockExtractor::failing(
        ExtractErrorKind::PageNotAvailable,
        "page went away",
    ))
    .await;

    let result = bridge.screen_data().await;
    assert!(!result.success);
    assert_eq!(
        result.error_type,
        Some(BridgeErrorKind::Extract(ExtractErrorKind::PageNotAvailable))
    );
    let snapshot = result.data.expect("snapshot stays well-formed");
    assert!(snapshot.containers.is_empty());
    assert!(snapshot.interactive_elements.is_empty());
}

#[tokio::test]
async fn partial_failure_still_reports_the_successful_half() {
    let extractor = MockExtractor {
        structured: ParserResult::fail(ExtractErrorKind::ParsingFailed, "bad markup"),
        elements: ParserResult::success(vec![element("search", ElementKind::Input("input-text".into()))]),
    };
    let bridge = ready_bridge(extractor).await;

    let result = bridge.screen_data().await;
    assert!(!result.success);
    assert_eq!(
        result.error_type,
        Some(BridgeErrorKind::Extract(ExtractErrorKind::ParsingFailed))
    );
    let snapshot = result.data.expect("payload");
    assert!(snapshot.containers.is_empty());
    assert_eq!(snapshot.interactive_elements.len(), 1);
}

#[tokio::test]
async fn screen_actions_derive_hints_from_current_state() {
    let mut checkbox = element("opt1", ElementKind::Checkbox);
    checkbox.is_checked = Some(true);
    let mut select = element("country", ElementKind::Select);
    select.options = vec![SelectOption {
        value: "fr".into(),
        text: "France".into(),
        selected: false,
    }];

    let extractor = MockExtractor {
        structured: ParserResult::success(StructuredData::default()),
        elements: ParserResult::success(vec![checkbox, select]),
    };
    let bridge = ready_bridge(extractor).await;

    let result = bridge.screen_actions().await;
    assert!(result.success);
    let hints: Vec<String> = result
        .data
        .unwrap()
        .into_iter()
        .map(|a| a.command_hint)
        .collect();
    assert_eq!(
        hints,
        vec![
            "uncheck #opt1",
            "click #country",
            "select #country \"<value_to_select>\"",
        ]
    );
}

#[tokio::test]
async fn screen_actions_failure_preserves_the_extractor_kind() {
    let bridge = ready_bridge(MockExtractor::failing(
        ExtractErrorKind::InvalidSelector,
        "selector rejected",
    ))
    .await;

    let result = bridge.screen_actions().await;
    assert!(!result.success);
    assert_eq!(
        result.error_type,
        Some(BridgeErrorKind::Extract(ExtractErrorKind::InvalidSelector))
    );
    assert!(result.data.expect("empty descriptor list").is_empty());
}
