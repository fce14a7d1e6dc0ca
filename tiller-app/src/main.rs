use anyhow::{Context, Result};
use clap::Parser;
use futures::FutureExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tiller_common::contract::handler_fn;
use tiller_common::observability::{init_logging, LogConfig};
use tiller_common::outcome::DriverErrorKind;
use tiller_common::{ActionResult, CustomActionHandler};
use tiller_config::{default_config_path, BridgeConfig, BridgeConfigLoader};
use tiller_core::{Bridge, HandlerRegistry, SessionManager};
use tiller_driver::WebDriverBridge;
use tiller_extract::ScriptExtractor;
use tiller_runtime::{TillerHandle, TillerRuntime};
use tracing::info;

mod console;

/// Command bridge between remote agents and annotated web pages.
#[derive(Parser, Debug)]
#[command(name = "tiller", version)]
struct Cli {
    /// Path to a YAML configuration file (default: ~/.config/tiller/tiller.yaml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target URL the browser opens at startup.
    #[arg(long)]
    target_url: Option<String>,

    /// Run the browser headless (true/false).
    #[arg(long)]
    headless: Option<bool>,

    /// WebDriver endpoint to connect to.
    #[arg(long)]
    webdriver_url: Option<String>,

    /// Bind host advertised to the protocol layer.
    #[arg(long)]
    host: Option<String>,

    /// Bind port advertised to the protocol layer.
    #[arg(long)]
    port: Option<u16>,

    /// Mirror logs to stderr.
    #[arg(short, long)]
    verbose: bool,
}

/// CLI flags win over the config file, which wins over the environment.
fn load_config(cli: &Cli) -> Result<BridgeConfig> {
    let mut loader = BridgeConfigLoader::new();
    loader = match &cli.config {
        Some(path) => loader.with_file(path),
        None => loader.with_optional_file(default_config_path()),
    };

    let mut overrides = String::new();
    if let Some(url) = &cli.target_url {
        overrides.push_str(&format!("target_url: {url:?}\n"));
    }
    if let Some(headless) = cli.headless {
        overrides.push_str(&format!("headless: {headless}\n"));
    }
    if let Some(url) = &cli.webdriver_url {
        overrides.push_str(&format!("webdriver_url: {url:?}\n"));
    }
    if let Some(host) = &cli.host {
        overrides.push_str(&format!("host: {host:?}\n"));
    }
    if let Some(port) = cli.port {
        overrides.push_str(&format!("port: {port}\n"));
    }
    if !overrides.is_empty() {
        loader = loader.with_yaml_str(&overrides);
    }

    loader.load().context("loading bridge configuration")
}

/// Handlers shipped with the binary. `read` returns the target element's
/// full state, which core commands have no way to ask for.
fn builtin_handlers() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry.register(CustomActionHandler::new(
        "read",
        handler_fn(|invocation| {
            async move {
                let Some(element) = invocation.element else {
                    return ActionResult::fail(
                        DriverErrorKind::InvalidInput,
                        "Command \"read\" requires an element id (#<id>)",
                    );
                };
                match serde_json::to_value(&element) {
                    Ok(value) => {
                        ActionResult::ok(format!("State of element #{}", element.id))
                            .with_data(value)
                    }
                    Err(err) => ActionResult::fail(
                        DriverErrorKind::ActionFailed,
                        format!("Could not serialize element state: {err}"),
                    ),
                }
            }
            .boxed()
        }),
    ));
    registry
}

async fn run(config: BridgeConfig, handle: TillerHandle) -> Result<()> {
    let readers = config.attribute_readers();
    let driver = Arc::new(WebDriverBridge::new(
        &config.webdriver_url,
        config.headless,
        readers.clone(),
    ));
    let extractor = Arc::new(ScriptExtractor::new(driver.clone(), readers));
    let manager = Arc::new(SessionManager::new(
        driver,
        extractor,
        builtin_handlers(),
    ));

    manager
        .start(&config.target_url)
        .await
        .context("bringing up the browser session")?;

    info!(
        target: "app",
        server = %config.server.name,
        version = %config.server.version,
        host = %config.host,
        port = config.port,
        "bridge ready for the protocol layer"
    );

    let bridge = Bridge::new(manager.clone());
    let served = console::run(&bridge, &handle).await;

    manager.shutdown().await;
    served
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let log_path = init_logging(LogConfig {
        stderr: cli.verbose,
        ..LogConfig::default()
    })?;
    info!(target: "app", target_url = %config.target_url, log = %log_path.display(), "starting tiller");

    let runtime = TillerRuntime::build("tiller-worker", None)?;
    let handle = runtime.handle();
    let outcome = runtime.block_on(run(config, handle));
    runtime.shutdown(Duration::from_secs(2));
    outcome
}
