//! Loader for bridge configuration with YAML + environment overlays.
//!
//! Sources merge in the usual order (YAML file, then `TILLER_`-prefixed
//! environment variables), and every string value gets recursive,
//! depth-capped `${VAR}` expansion before the typed config materialises.
//! Declarative attribute-reader specs are lowered into runtime readers
//! here so the rest of the workspace never sees the config schema.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tiller_common::{CustomAttributeReader, CustomValue};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Top-level bridge configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// URL the browser navigates to at startup.
    pub target_url: String,
    #[serde(default = "default_headless")]
    pub headless: bool,
    /// WebDriver endpoint the driver connects to.
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    /// Bind address for the (external) protocol layer.
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub server: ServerMeta,
    #[serde(default)]
    pub attribute_readers: Vec<AttributeReaderSpec>,
}

/// Metadata the protocol layer advertises about this bridge.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerMeta {
    #[serde(default = "default_server_name")]
    pub name: String,
    #[serde(default = "default_server_version")]
    pub version: String,
    #[serde(default)]
    pub instructions: Option<String>,
}

impl Default for ServerMeta {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            version: default_server_version(),
            instructions: None,
        }
    }
}

/// Declarative form of a custom attribute reader.
#[derive(Debug, Clone, Deserialize)]
pub struct AttributeReaderSpec {
    /// Attribute to read off each interactive element.
    pub attribute: String,
    /// Key under which the value lands in `customData`; defaults to the
    /// attribute name with its `data-agent-` prefix stripped.
    #[serde(default)]
    pub output_key: Option<String>,
    #[serde(default)]
    pub transform: Option<TransformKind>,
}

/// Named transforms expressible in a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformKind {
    Number,
    Integer,
    Boolean,
    Trim,
    Lowercase,
}

fn default_headless() -> bool {
    true
}
fn default_webdriver_url() -> String {
    "http://localhost:9515".into()
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    7860
}
fn default_server_name() -> String {
    "tiller".into()
}
fn default_server_version() -> String {
    "0.1.0".into()
}

impl AttributeReaderSpec {
    /// Lower the spec into a runtime reader.
    pub fn into_reader(self) -> CustomAttributeReader {
        let output_key = self.output_key.unwrap_or_else(|| {
            self.attribute
                .strip_prefix("data-agent-")
                .unwrap_or(&self.attribute)
                .to_string()
        });
        let reader = CustomAttributeReader::new(self.attribute, output_key);
        match self.transform {
            None => reader,
            Some(TransformKind::Number) => reader.with_transform(|raw| {
                raw.trim()
                    .parse::<f64>()
                    .map(CustomValue::Number)
                    .unwrap_or(CustomValue::Absent)
            }),
            Some(TransformKind::Integer) => reader.with_transform(|raw| {
                raw.trim()
                    .parse::<i64>()
                    .map(|n| CustomValue::Number(n as f64))
                    .unwrap_or(CustomValue::Absent)
            }),
            Some(TransformKind::Boolean) => reader.with_transform(|raw| {
                match raw.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" | "yes" => CustomValue::Text("true".into()),
                    "false" | "0" | "no" => CustomValue::Text("false".into()),
                    _ => CustomValue::Absent,
                }
            }),
            Some(TransformKind::Trim) => {
                reader.with_transform(|raw| CustomValue::Text(raw.trim().to_string()))
            }
            Some(TransformKind::Lowercase) => {
                reader.with_transform(|raw| CustomValue::Text(raw.to_lowercase()))
            }
        }
    }
}

impl BridgeConfig {
    /// Lower every reader spec, preserving declaration order.
    pub fn attribute_readers(&self) -> Vec<CustomAttributeReader> {
        self.attribute_readers
            .iter()
            .cloned()
            .map(AttributeReaderSpec::into_reader)
            .collect()
    }
}

/// Default config file location: `~/.config/tiller/tiller.yaml`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tiller")
        .join("tiller.yaml")
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct BridgeConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for BridgeConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeConfigLoader {
    /// Start with the defaults: `TILLER_`-prefixed env overrides only.
    ///
    /// ```
    /// use tiller_config::BridgeConfigLoader;
    ///
    /// let config = BridgeConfigLoader::new()
    ///     .with_yaml_str("target_url: \"http://localhost:5173\"")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.target_url, "http://localhost:5173");
    /// assert!(config.headless);
    /// assert_eq!(config.port, 7860);
    /// ```
    pub fn new() -> Self {
        // try_parsing so TILLER_PORT=9000 and TILLER_HEADLESS=false come
        // through as numbers/bools, not strings.
        let builder = Config::builder().add_source(
            Environment::with_prefix("TILLER")
                .separator("__")
                .try_parsing(true),
        );
        Self { builder }
    }

    /// Attach a config file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a config file that may be missing (env-only deployments).
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet; handy in tests and CLI overrides.
    ///
    /// ```
    /// use tiller_config::{BridgeConfigLoader, TransformKind};
    ///
    /// let config = BridgeConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// target_url: "http://localhost:5173"
    /// attribute_readers:
    ///   - attribute: "data-agent-priority"
    ///     transform: number
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.attribute_readers.len(), 1);
    /// assert_eq!(config.attribute_readers[0].transform, Some(TransformKind::Number));
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge the sources, expand `${VAR}` placeholders, and deserialize.
    pub fn load(self) -> Result<BridgeConfig, ConfigError> {
        let cfg = self.builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: BridgeConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        if typed.target_url.trim().is_empty() {
            return Err(ConfigError::Message(
                "target_url must not be empty".to_string(),
            ));
        }

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("TARGET_HOST", Some("app.internal"), || {
            let mut v = json!("http://${TARGET_HOST}:5173");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("http://app.internal:5173"));
        });
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("APP_PORT", Some("5173")),
                ("APP_HOST", Some("localhost:${APP_PORT}")),
                ("APP_URL", Some("http://${APP_HOST}")),
            ],
            || {
                let mut v = json!("${APP_URL}/admin");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("http://localhost:5173/admin"));
            },
        );
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}");
            expand_env_in_value(&mut v);
            // Terminates at the depth cap with the cycle unresolved.
            assert!(v.as_str().unwrap().contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST_ANYWHERE}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST_ANYWHERE}"));
    }

    #[test]
    fn reader_spec_defaults_output_key_from_attribute() {
        let spec = AttributeReaderSpec {
            attribute: "data-agent-sort-key".into(),
            output_key: None,
            transform: None,
        };
        let reader = spec.into_reader();
        assert_eq!(reader.output_key, "sort-key");
        assert_eq!(reader.read(" x "), CustomValue::Text(" x ".into()));
    }

    #[test]
    fn named_transforms_produce_tagged_values() {
        let number = AttributeReaderSpec {
            attribute: "data-agent-count".into(),
            output_key: Some("count".into()),
            transform: Some(TransformKind::Number),
        }
        .into_reader();
        assert_eq!(number.read("3.5"), CustomValue::Number(3.5));
        assert_eq!(number.read("n/a"), CustomValue::Absent);

        let boolean = AttributeReaderSpec {
            attribute: "data-agent-urgent".into(),
            output_key: Some("urgent".into()),
            transform: Some(TransformKind::Boolean),
        }
        .into_reader();
        assert_eq!(boolean.read("YES"), CustomValue::Text("true".into()));
        assert_eq!(boolean.read("maybe"), CustomValue::Absent);
    }

    #[test]
    fn empty_target_url_is_rejected() {
        let err = BridgeConfigLoader::new()
            .with_yaml_str("target_url: \"  \"")
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("target_url"));
    }
}
