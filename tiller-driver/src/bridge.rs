//! The fantoccini-backed [`PageDriver`] implementation.

use crate::script;
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use std::time::Duration;
use tiller_common::model::RawElementState;
use tiller_common::outcome::DriverErrorKind;
use tiller_common::{ActionResult, CustomAttributeReader, InteractiveElement, PageDriver};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;
use webdriver::capabilities::Capabilities;

/// How long element lookups wait for the page to settle.
const ELEMENT_WAIT: Duration = Duration::from_secs(5);

/// One WebDriver session driving the target page.
///
/// `launch` connects to a running WebDriver service (Chromedriver by
/// default) and `close` tears the session down; both are safe to call more
/// than once. All element access goes through annotation ids.
pub struct WebDriverBridge {
    webdriver_url: String,
    headless: bool,
    readers: Vec<CustomAttributeReader>,
    client: Mutex<Option<Client>>,
}

impl WebDriverBridge {
    pub fn new(
        webdriver_url: impl Into<String>,
        headless: bool,
        readers: Vec<CustomAttributeReader>,
    ) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            headless,
            readers,
            client: Mutex::new(None),
        }
    }

    /// Clone of the live session handle, if any. The extractor reads the
    /// page through this.
    pub async fn page(&self) -> Option<Client> {
        self.client.lock().await.clone()
    }

    /// Find an interactive element by its annotation id, waiting briefly
    /// for re-renders to settle.
    async fn find_element(&self, client: &Client, id: &str) -> Result<Element, ActionResult> {
        let selector = script::element_selector(id);
        client
            .wait()
            .at_most(ELEMENT_WAIT)
            .for_element(Locator::Css(&selector))
            .await
            .map_err(|err| {
                if matches!(err, CmdError::WaitTimeout) || err.is_no_such_element() {
                    ActionResult::fail(
                        DriverErrorKind::ElementNotFound,
                        format!("No interactive element with id \"{id}\""),
                    )
                } else {
                    action_failure("locating element", id, &err)
                }
            })
    }

    async fn require_client(&self) -> Result<Client, ActionResult> {
        self.page().await.ok_or_else(|| {
            ActionResult::fail(
                DriverErrorKind::NotInitialized,
                "Browser session has not been launched",
            )
        })
    }
}

/// Map a WebDriver failure during `doing` on `subject` into an envelope.
fn action_failure(doing: &str, subject: &str, err: &CmdError) -> ActionResult {
    let kind = if err.is_no_such_element() {
        DriverErrorKind::ElementNotFound
    } else if matches!(err, CmdError::WaitTimeout) {
        DriverErrorKind::Timeout
    } else {
        DriverErrorKind::ActionFailed
    };
    ActionResult::fail(kind, format!("Error {doing} \"{subject}\": {err}"))
}

#[async_trait]
impl PageDriver for WebDriverBridge {
    async fn launch(&self) -> ActionResult {
        let mut guard = self.client.lock().await;
        if guard.is_some() {
            return ActionResult::ok("Browser already launched");
        }

        let mut args = vec!["--no-first-run", "--no-default-browser-check"];
        if self.headless {
            args.push("--headless");
            args.push("--disable-gpu");
        }

        let mut caps = Capabilities::new();
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));

        info!(target: "driver", webdriver_url = %self.webdriver_url, headless = self.headless, "launching browser session");
        match ClientBuilder::native()
            .capabilities(caps)
            .connect(&self.webdriver_url)
            .await
        {
            Ok(client) => {
                *guard = Some(client);
                ActionResult::ok("Browser launched")
            }
            Err(err) => ActionResult::fail(
                DriverErrorKind::BrowserLaunchFailed,
                format!("Failed to connect to WebDriver at {}: {err}", self.webdriver_url),
            ),
        }
    }

    async fn navigate(&self, url: &str) -> ActionResult {
        if Url::parse(url).is_err() {
            return ActionResult::fail(
                DriverErrorKind::NavigationFailed,
                format!("Not a valid URL: \"{url}\""),
            );
        }
        let client = match self.require_client().await {
            Ok(client) => client,
            Err(failure) => return failure,
        };

        info!(target: "driver", %url, "navigating");
        match client.goto(url).await {
            Ok(()) => ActionResult::ok(format!("Navigated to {url}")),
            Err(err) => ActionResult::fail(
                DriverErrorKind::NavigationFailed,
                format!("Navigation to {url} failed: {err}"),
            ),
        }
    }

    async fn close(&self) -> ActionResult {
        let taken = self.client.lock().await.take();
        match taken {
            None => ActionResult::ok("Browser already closed"),
            Some(client) => match client.close().await {
                Ok(()) => {
                    info!(target: "driver", "browser session closed");
                    ActionResult::ok("Browser closed")
                }
                Err(err) => {
                    warn!(target: "driver", error = %err, "browser session close reported an error");
                    ActionResult::fail(
                        DriverErrorKind::BrowserCloseFailed,
                        format!("Failed to close browser session: {err}"),
                    )
                }
            },
        }
    }

    async fn current_url(&self) -> ActionResult<String> {
        let client = match self.require_client().await {
            Ok(client) => client,
            Err(failure) => return failure.erase_data(),
        };
        match client.current_url().await {
            Ok(url) => ActionResult::success(url.to_string()),
            Err(err) => ActionResult::fail(
                DriverErrorKind::PageNotAvailable,
                format!("Could not read current URL: {err}"),
            ),
        }
    }

    async fn click(&self, id: &str) -> ActionResult {
        let client = match self.require_client().await {
            Ok(client) => client,
            Err(failure) => return failure,
        };
        let element = match self.find_element(&client, id).await {
            Ok(element) => element,
            Err(failure) => return failure,
        };
        debug!(target: "driver", %id, "click");
        match element.click().await {
            Ok(()) => ActionResult::ok(format!("Clicked element #{id}")),
            Err(err) => action_failure("clicking element", id, &err),
        }
    }

    async fn type_text(&self, id: &str, text: &str) -> ActionResult {
        let client = match self.require_client().await {
            Ok(client) => client,
            Err(failure) => return failure,
        };
        let element = match self.find_element(&client, id).await {
            Ok(element) => element,
            Err(failure) => return failure,
        };
        debug!(target: "driver", %id, "type");
        if let Err(err) = element.clear().await {
            return action_failure("clearing element", id, &err);
        }
        match element.send_keys(text).await {
            Ok(()) => ActionResult::ok(format!("Typed into element #{id}")),
            Err(err) => action_failure("typing into element", id, &err),
        }
    }

    async fn select_option(&self, id: &str, value: &str) -> ActionResult {
        let client = match self.require_client().await {
            Ok(client) => client,
            Err(failure) => return failure,
        };
        let element = match self.find_element(&client, id).await {
            Ok(element) => element,
            Err(failure) => return failure,
        };

        let options = match element.find_all(Locator::Css("option")).await {
            Ok(options) => options,
            Err(err) => return action_failure("reading options of", id, &err),
        };

        let mut known = Vec::with_capacity(options.len());
        for option in options {
            match option.attr("value").await {
                Ok(Some(v)) if v == value => {
                    return match option.click().await {
                        Ok(()) => {
                            ActionResult::ok(format!("Selected \"{value}\" in element #{id}"))
                        }
                        Err(err) => action_failure("selecting option in", id, &err),
                    };
                }
                Ok(Some(v)) => known.push(v),
                Ok(None) => {}
                Err(err) => return action_failure("reading option value of", id, &err),
            }
        }

        ActionResult::fail(
            DriverErrorKind::OptionNotFound,
            format!(
                "Element #{id} has no option with value \"{value}\" (known: {})",
                known.join(", ")
            ),
        )
    }

    async fn check_element(&self, id: &str) -> ActionResult {
        let client = match self.require_client().await {
            Ok(client) => client,
            Err(failure) => return failure,
        };
        let element = match self.find_element(&client, id).await {
            Ok(element) => element,
            Err(failure) => return failure,
        };
        match element.prop("checked").await {
            Ok(Some(state)) if state == "true" => {
                ActionResult::ok(format!("Element #{id} is already checked"))
            }
            Ok(_) => match element.click().await {
                Ok(()) => ActionResult::ok(format!("Checked element #{id}")),
                Err(err) => action_failure("checking element", id, &err),
            },
            Err(err) => action_failure("reading checked state of", id, &err),
        }
    }

    async fn uncheck_element(&self, id: &str) -> ActionResult {
        let client = match self.require_client().await {
            Ok(client) => client,
            Err(failure) => return failure,
        };
        let element = match self.find_element(&client, id).await {
            Ok(element) => element,
            Err(failure) => return failure,
        };
        match element.prop("checked").await {
            Ok(Some(state)) if state == "true" => match element.click().await {
                Ok(()) => ActionResult::ok(format!("Unchecked element #{id}")),
                Err(err) => action_failure("unchecking element", id, &err),
            },
            Ok(_) => ActionResult::ok(format!("Element #{id} is already unchecked")),
            Err(err) => action_failure("reading checked state of", id, &err),
        }
    }

    async fn select_radio_button(&self, id: &str, value: &str) -> ActionResult {
        let client = match self.require_client().await {
            Ok(client) => client,
            Err(failure) => return failure,
        };
        let element = match self.find_element(&client, id).await {
            Ok(element) => element,
            Err(failure) => return failure,
        };

        // Choosing the element itself (the parser falls back to the id as
        // the value) is a plain click.
        let own_value = match element.attr("value").await {
            Ok(v) => v,
            Err(err) => return action_failure("reading value of", id, &err),
        };
        if value == id || own_value.as_deref() == Some(value) {
            return match element.click().await {
                Ok(()) => ActionResult::ok(format!("Chose radio #{id}")),
                Err(err) => action_failure("choosing radio", id, &err),
            };
        }

        // Otherwise resolve the value within the element's radio group.
        let group = match element.attr("data-agent-group").await {
            Ok(Some(group)) => Some(group),
            Ok(None) => match element.attr("name").await {
                Ok(group) => group,
                Err(err) => return action_failure("reading group of", id, &err),
            },
            Err(err) => return action_failure("reading group of", id, &err),
        };
        let Some(group) = group else {
            return ActionResult::fail(
                DriverErrorKind::OptionNotFound,
                format!("Radio #{id} has no group to resolve value \"{value}\" in"),
            );
        };

        let selector = format!(
            "input[type=\"radio\"][name=\"{}\"][value=\"{}\"]",
            group.replace('"', "\\\""),
            value.replace('"', "\\\"")
        );
        match client.find(Locator::Css(&selector)).await {
            Ok(radio) => match radio.click().await {
                Ok(()) => {
                    ActionResult::ok(format!("Chose radio \"{value}\" in group \"{group}\""))
                }
                Err(err) => action_failure("choosing radio in group", &group, &err),
            },
            Err(err) if err.is_no_such_element() => ActionResult::fail(
                DriverErrorKind::OptionNotFound,
                format!("No radio with value \"{value}\" in group \"{group}\""),
            ),
            Err(err) => action_failure("locating radio in group", &group, &err),
        }
    }

    async fn get_element_state(&self, id: &str) -> ActionResult<InteractiveElement> {
        let client = match self.require_client().await {
            Ok(client) => client,
            Err(failure) => return failure.erase_data(),
        };

        let raw = match client
            .execute(&script::element_state_script(), vec![json!(id)])
            .await
        {
            Ok(raw) => raw,
            Err(err) => return action_failure("reading state of", id, &err).erase_data(),
        };

        if raw.is_null() {
            return ActionResult::fail(
                DriverErrorKind::ElementNotFound,
                format!("No interactive element with id \"{id}\""),
            );
        }

        match serde_json::from_value::<RawElementState>(raw) {
            Ok(raw) => {
                ActionResult::success(InteractiveElement::from_raw(raw, &self.readers))
            }
            Err(err) => ActionResult::fail(
                DriverErrorKind::ActionFailed,
                format!("Could not decode state of element #{id}: {err}"),
            ),
        }
    }
}
