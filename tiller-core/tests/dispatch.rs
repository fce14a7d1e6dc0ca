//! Dispatcher resolution behavior against scripted collaborators.

mod common;

use common::{element, MockDriver, MockExtractor};
use futures::FutureExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tiller_common::contract::handler_fn;
use tiller_common::outcome::DriverErrorKind;
use tiller_common::{ActionResult, CustomActionHandler, ElementKind};
use tiller_core::{Dispatcher, HandlerRegistry, SessionContext};

fn dispatcher_with(
    driver: Arc<MockDriver>,
    registry: HandlerRegistry,
) -> (Dispatcher, Arc<MockDriver>) {
    let ctx = Arc::new(SessionContext::new(
        driver.clone(),
        Arc::new(MockExtractor::default()),
        Arc::new(registry),
    ));
    (Dispatcher::new(ctx), driver)
}

#[tokio::test]
async fn unknown_command_is_rejected_without_driver_calls() {
    let (dispatcher, driver) = dispatcher_with(Arc::new(MockDriver::default()), HandlerRegistry::new());

    let result = dispatcher.dispatch("unknownverb").await;
    assert!(!result.success);
    assert_eq!(result.error_type, Some(DriverErrorKind::InvalidInput));
    assert!(result.message.unwrap().contains("unknownverb"));
    assert!(driver.calls().is_empty());
}

#[tokio::test]
async fn empty_input_is_invalid() {
    let (dispatcher, driver) = dispatcher_with(Arc::new(MockDriver::default()), HandlerRegistry::new());

    let result = dispatcher.dispatch("   ").await;
    assert_eq!(result.error_type, Some(DriverErrorKind::InvalidInput));
    assert!(driver.calls().is_empty());
}

#[tokio::test]
async fn core_click_delegates_to_the_driver() {
    let (dispatcher, driver) = dispatcher_with(Arc::new(MockDriver::default()), HandlerRegistry::new());

    let result = dispatcher.dispatch("CLICK #save-btn").await;
    assert!(result.success);
    assert_eq!(driver.calls(), vec!["click save-btn"]);
}

#[tokio::test]
async fn type_requires_an_element_id() {
    let (dispatcher, driver) = dispatcher_with(Arc::new(MockDriver::default()), HandlerRegistry::new());

    let result = dispatcher.dispatch("type \"hello\"").await;
    assert!(!result.success);
    assert_eq!(result.error_type, Some(DriverErrorKind::InvalidInput));
    // Parser reads `"hello"` as an argument, not a target, so no driver call.
    assert!(driver.calls().is_empty());
}

#[tokio::test]
async fn type_requires_a_text_argument() {
    let (dispatcher, driver) = dispatcher_with(Arc::new(MockDriver::default()), HandlerRegistry::new());

    let result = dispatcher.dispatch("type #search").await;
    assert_eq!(result.error_type, Some(DriverErrorKind::InvalidInput));
    assert!(driver.calls().is_empty());
}

#[tokio::test]
async fn type_passes_quoted_text_through() {
    let (dispatcher, driver) = dispatcher_with(Arc::new(MockDriver::default()), HandlerRegistry::new());

    let result = dispatcher.dispatch("type #search \"hello world\"").await;
    assert!(result.success);
    assert_eq!(driver.calls(), vec!["type search hello world"]);
}

#[tokio::test]
async fn select_surfaces_option_not_found_from_the_driver() {
    let driver = Arc::new(MockDriver {
        known_option_values: vec!["us".into(), "de".into()],
        ..Default::default()
    });
    let (dispatcher, driver) = dispatcher_with(driver, HandlerRegistry::new());

    let result = dispatcher.dispatch("select #country \"fr\"").await;
    assert!(!result.success);
    assert_eq!(result.error_type, Some(DriverErrorKind::OptionNotFound));
    assert_eq!(driver.calls(), vec!["select country fr"]);
}

#[tokio::test]
async fn choose_falls_back_to_the_element_id_as_value() {
    let (dispatcher, driver) = dispatcher_with(Arc::new(MockDriver::default()), HandlerRegistry::new());

    let result = dispatcher.dispatch("choose #opt-red").await;
    assert!(result.success);
    assert_eq!(driver.calls(), vec!["choose opt-red opt-red"]);

    let result = dispatcher.dispatch("choose #opt-red blue").await;
    assert!(result.success);
    assert_eq!(driver.calls()[1], "choose opt-red blue");
}

#[tokio::test]
async fn navigate_needs_no_element_id_but_needs_a_url() {
    let (dispatcher, driver) = dispatcher_with(Arc::new(MockDriver::default()), HandlerRegistry::new());

    let result = dispatcher.dispatch("navigate http://localhost:5173/admin").await;
    assert!(result.success);
    assert_eq!(driver.calls(), vec!["navigate http://localhost:5173/admin"]);

    let result = dispatcher.dispatch("navigate").await;
    assert_eq!(result.error_type, Some(DriverErrorKind::InvalidInput));
}

#[tokio::test]
async fn custom_handler_always_wins_for_its_name() {
    let mut registry = HandlerRegistry::new();
    registry.register(CustomActionHandler::new(
        "get-custom-note",
        handler_fn(|_invocation| {
            async { ActionResult::ok("note handler ran") }.boxed()
        }),
    ));

    let (dispatcher, driver) = dispatcher_with(Arc::new(MockDriver::default()), registry);

    let result = dispatcher.dispatch("GET-CUSTOM-NOTE").await;
    assert!(result.success);
    assert_eq!(result.message.as_deref(), Some("note handler ran"));
    assert!(driver.calls().is_empty());
}

#[tokio::test]
async fn custom_handler_replaces_a_core_command_even_without_override_flag() {
    let mut registry = HandlerRegistry::new();
    registry.register(CustomActionHandler::new(
        "click",
        handler_fn(|_invocation| async { ActionResult::ok("intercepted click") }.boxed()),
    ));

    let driver = MockDriver::default().with_element(element("save-btn", ElementKind::Button));
    let (dispatcher, driver) = dispatcher_with(Arc::new(driver), registry);

    let result = dispatcher.dispatch("click #save-btn").await;
    assert!(result.success);
    assert_eq!(result.message.as_deref(), Some("intercepted click"));
    // The handler got an element-state read; core click never ran.
    assert_eq!(driver.calls(), vec!["get_element_state save-btn"]);
}

#[tokio::test]
async fn custom_handler_receives_element_and_args() {
    let seen = Arc::new(AtomicBool::new(false));
    let seen_in_handler = seen.clone();

    let mut registry = HandlerRegistry::new();
    registry.register(CustomActionHandler::new(
        "annotate",
        handler_fn(move |invocation| {
            let seen = seen_in_handler.clone();
            async move {
                let element = invocation.element.expect("element prefetched");
                assert_eq!(element.id, "row-1");
                assert_eq!(invocation.args, vec!["first note", "urgent"]);
                seen.store(true, Ordering::SeqCst);
                ActionResult::ok("annotated")
            }
            .boxed()
        }),
    ));

    let driver = MockDriver::default().with_element(element("row-1", ElementKind::Button));
    let (dispatcher, _driver) = dispatcher_with(Arc::new(driver), registry);

    let result = dispatcher
        .dispatch("annotate #row-1 \"first note\" urgent")
        .await;
    assert!(result.success);
    assert!(seen.load(Ordering::SeqCst));
}

#[tokio::test]
async fn failed_element_prefetch_short_circuits_the_handler() {
    let invoked = Arc::new(AtomicBool::new(false));
    let invoked_in_handler = invoked.clone();

    let mut registry = HandlerRegistry::new();
    registry.register(CustomActionHandler::new(
        "inspect",
        handler_fn(move |_invocation| {
            invoked_in_handler.store(true, Ordering::SeqCst);
            async { ActionResult::ok("should not run") }.boxed()
        }),
    ));

    let (dispatcher, driver) = dispatcher_with(Arc::new(MockDriver::default()), registry);

    let result = dispatcher.dispatch("inspect #ghost").await;
    assert!(!result.success);
    assert_eq!(result.error_type, Some(DriverErrorKind::ElementNotFound));
    assert!(!invoked.load(Ordering::SeqCst));
    assert_eq!(driver.calls(), vec!["get_element_state ghost"]);
}

#[tokio::test]
async fn handler_panic_is_contained_as_action_failed() {
    let mut registry = HandlerRegistry::new();
    registry.register(CustomActionHandler::new(
        "explode",
        handler_fn(|_invocation| {
            async {
                panic!("handler blew up");
            }
            .boxed()
        }),
    ));

    let (dispatcher, driver) = dispatcher_with(Arc::new(MockDriver::default()), registry);

    let result = dispatcher.dispatch("explode").await;
    assert!(!result.success);
    assert_eq!(result.error_type, Some(DriverErrorKind::ActionFailed));
    assert!(result.message.unwrap().contains("handler blew up"));

    // The dispatcher survives and keeps serving.
    let result = dispatcher.dispatch("click #save-btn").await;
    assert!(result.success);
    assert_eq!(driver.calls(), vec!["click save-btn"]);
}
