//! Declarative logger tree configuration.
//!
//! A [`Config`] stacks several layers of YAML-shaped data and resolves a
//! [`LoggingConfig`] from them. Values are resolved in this priority order:
//!
//! 1. Environment variables (`LOGTREE_LEVEL` sets the root level)
//! 2. Programmatically set values
//! 3. Values loaded from file
//! 4. Default values
//!
//! ## Example
//!
//! ```no_run
//! use logtree_core::config::Config;
//! use logtree_core::Registry;
//!
//! let config = Config::load("~/.config/myapp/logging.yml")?.with_env();
//! config.apply(Registry::global())?;
//! # Ok::<(), logtree_core::LogtreeError>(())
//! ```

use crate::format::Formatter;
use crate::registry::Registry;
use crate::sinks::{NullSink, SinkRef, StreamSink};
use crate::util::data::{deep_merge, load_yaml, load_yaml_file};
use crate::util::expand_path;
use crate::{term, time};
use chrono::Local;
use indexmap::IndexMap;
use logtree_types::config::{ConsoleStream, FormatConfig, LoggingConfig, SinkConfig};
use logtree_types::{LogtreeError, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable overriding the root logger's level.
pub const LEVEL_ENV: &str = "LOGTREE_LEVEL";

/// Configuration layer priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigLayer {
    /// Default values
    Default = 0,
    /// Values loaded from file
    Loaded = 1,
    /// Values set programmatically
    Set = 2,
    /// Values from environment variables
    Environment = 3,
}

impl ConfigLayer {
    const ASCENDING: [ConfigLayer; 4] = [
        ConfigLayer::Default,
        ConfigLayer::Loaded,
        ConfigLayer::Set,
        ConfigLayer::Environment,
    ];
}

/// Layered logging configuration.
#[derive(Clone, Debug)]
pub struct Config {
    layers: HashMap<ConfigLayer, Value>,
    file_path: Option<PathBuf>,
}

impl Config {
    /// Configuration holding only the defaults.
    pub fn new() -> Self {
        let mut layers = HashMap::new();
        if let Ok(defaults) = serde_json::to_value(LoggingConfig::default()) {
            layers.insert(ConfigLayer::Default, defaults);
        }
        Self {
            layers,
            file_path: None,
        }
    }

    /// Load from a YAML file; `~` is expanded.
    ///
    /// A missing file yields the defaults, so programs can ship without one.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = expand_path(path);
        let mut config = Self::new();

        if path.exists() {
            let value = load_yaml_file(&path).map_err(|e| {
                LogtreeError::Config(format!("Failed to load {}: {}", path.display(), e))
            })?;
            config.layers.insert(ConfigLayer::Loaded, value);
        }
        config.file_path = Some(path);
        Ok(config)
    }

    /// Load from a YAML string.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let value = load_yaml(content)
            .map_err(|e| LogtreeError::Config(format!("Failed to parse config: {}", e)))?;
        let mut config = Self::new();
        config.layers.insert(ConfigLayer::Loaded, value);
        Ok(config)
    }

    /// Add the environment layer from the process environment.
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Add the environment layer from an arbitrary lookup.
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(LEVEL_ENV) {
            Some(level) if !level.trim().is_empty() => {
                let layer = serde_json::json!({
                    "loggers": { "root": { "level": level.trim() } }
                });
                self.layers.insert(ConfigLayer::Environment, layer);
            }
            _ => {
                self.layers.remove(&ConfigLayer::Environment);
            }
        }
        self
    }

    /// Look up a value by key path, highest-priority layer first.
    ///
    /// Keys are given as segments since logger names contain dots.
    pub fn get<T: for<'de> serde::Deserialize<'de>>(&self, path: &[&str]) -> Option<T> {
        ConfigLayer::ASCENDING
            .iter()
            .rev()
            .filter_map(|layer| self.layers.get(layer))
            .filter_map(|data| value_at_path(data, path))
            .find_map(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Set a value programmatically.
    pub fn set(&mut self, path: &[&str], value: impl Serialize) -> Result<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| LogtreeError::Config(format!("Failed to serialize value: {}", e)))?;
        let layer = self
            .layers
            .entry(ConfigLayer::Set)
            .or_insert_with(|| Value::Object(Default::default()));
        set_value_at_path(layer, path, value)
    }

    /// Save the merged configuration back to the file it was loaded from.
    pub fn save(&self) -> Result<()> {
        let path = self
            .file_path
            .as_ref()
            .ok_or_else(|| LogtreeError::Config("Cannot save: no file path set".to_string()))?;

        let yaml = serde_yaml::to_string(&self.merged())?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, yaml)?;
        Ok(())
    }

    /// Path this configuration was loaded from.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// All layers merged, lowest priority first.
    pub fn merged(&self) -> Value {
        ConfigLayer::ASCENDING
            .iter()
            .filter_map(|layer| self.layers.get(layer))
            .fold(Value::Object(Default::default()), |merged, layer| {
                deep_merge(merged, layer.clone())
            })
    }

    /// Resolve the typed configuration.
    pub fn logging(&self) -> Result<LoggingConfig> {
        serde_json::from_value(self.merged())
            .map_err(|e| LogtreeError::Config(format!("Invalid logging config: {}", e)))
    }

    /// Resolve and apply to `registry`.
    pub fn apply(&self, registry: &Registry) -> Result<()> {
        apply(&self.logging()?, registry)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn value_at_path<'a>(data: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(data, |current, part| current.get(part))
}

fn set_value_at_path(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
    let Some((last, parents)) = path.split_last() else {
        logtree_types::bail!(Config, "Empty path");
    };

    let mut current = data;
    for part in parents {
        if !current.is_object() {
            *current = Value::Object(Default::default());
        }
        current = match current {
            Value::Object(map) => map
                .entry(part.to_string())
                .or_insert_with(|| Value::Object(Default::default())),
            _ => logtree_types::bug!("path segment {} is not an object", part),
        };
    }

    if !current.is_object() {
        *current = Value::Object(Default::default());
    }
    if let Value::Object(map) = current {
        map.insert(last.to_string(), value);
    }
    Ok(())
}

/// Wire `config` onto `registry`.
///
/// Every sink reference is checked before anything changes, so a bad
/// config leaves the tree untouched. Each sink is built once and shared by
/// every logger naming it. A configured logger's sink list is replaced,
/// not extended, so applying the same config twice is harmless.
pub fn apply(config: &LoggingConfig, registry: &Registry) -> Result<()> {
    for (logger, settings) in &config.loggers {
        if let Some(missing) = settings.sinks.iter().find(|s| !config.sinks.contains_key(*s)) {
            logtree_types::bail!(
                Config,
                "Logger '{}' references unknown sink '{}'",
                logger,
                missing
            );
        }
    }

    let mut built: IndexMap<&str, SinkRef> = IndexMap::new();
    for settings in config.loggers.values() {
        for name in &settings.sinks {
            if !built.contains_key(name.as_str()) {
                built.insert(name.as_str(), build_sink(name, &config.sinks[name])?);
            }
        }
    }

    for (name, settings) in &config.loggers {
        let logger = registry.get_logger(name);
        logger.set_level(settings.level);
        logger.set_propagate(settings.propagate);
        for sink in logger.sinks() {
            logger.remove_sink(&sink);
        }
        for sink in &settings.sinks {
            logger.add_sink(built[sink.as_str()].clone());
        }
    }

    registry.context().set_no_handler_warning(config.no_handler_warning);
    tracing::debug!(
        target: "logtree",
        loggers = config.loggers.len(),
        sinks = built.len(),
        "applied logging configuration"
    );
    Ok(())
}

fn formatter(format: &FormatConfig) -> Formatter {
    Formatter::new(format.format.as_str(), format.datefmt.as_str())
}

fn build_sink(name: &str, config: &SinkConfig) -> Result<SinkRef> {
    let sink: SinkRef = match config {
        SinkConfig::Console {
            level,
            stream,
            color,
            format,
        } => {
            let sink = match stream {
                ConsoleStream::Stdout => StreamSink::stdout(*level),
                ConsoleStream::Stderr => StreamSink::stderr(*level),
            };
            Arc::new(
                sink.with_formatter(formatter(format))
                    .with_color(term::should_color(*color, *stream)),
            )
        }
        SinkConfig::File {
            path,
            level,
            format,
        } => {
            let path = time::expand_log_path(path, Local::now());
            let sink = StreamSink::file(*level, &path).map_err(|e| {
                LogtreeError::Config(format!("Sink '{}' could not be opened: {}", name, e))
            })?;
            Arc::new(sink.with_formatter(formatter(format)))
        }
        SinkConfig::Null { level } => Arc::new(NullSink::new(*level)),
    };
    Ok(sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callsite::NoTrace;
    use crate::context::LoggerContext;
    use crate::sinks::same_sink;
    use logtree_types::Level;
    use tempfile::TempDir;

    fn registry() -> Registry {
        Registry::with_context(LoggerContext::new().with_trace_source(NoTrace))
    }

    #[test]
    fn test_config_layers() {
        let mut config = Config::from_yaml("loggers:\n  root:\n    level: INFO\n").unwrap();
        let level: Level = config.get(&["loggers", "root", "level"]).unwrap();
        assert_eq!(level, Level::Info);

        config.set(&["loggers", "root", "level"], "ERROR").unwrap();
        let level: Level = config.get(&["loggers", "root", "level"]).unwrap();
        assert_eq!(level, Level::Error);

        let config = config.with_env_from(|_| Some("debug".to_string()));
        let level: Level = config.get(&["loggers", "root", "level"]).unwrap();
        assert_eq!(level, Level::Debug);
    }

    #[test]
    fn test_dotted_logger_names_are_single_keys() {
        let mut config = Config::new();
        config.set(&["loggers", "app.db", "level"], "WARN").unwrap();

        let logging = config.logging().unwrap();
        assert_eq!(logging.loggers["app.db"].level, Level::Warn);
        assert!(!logging.loggers.contains_key("app"));
    }

    #[test]
    fn test_set_empty_path_rejected() {
        let err = Config::new().set(&[], "WARN").unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: Empty path");
    }

    #[test]
    fn test_blank_env_ignored() {
        let config = Config::new().with_env_from(|_| Some("  ".to_string()));
        assert!(config.logging().unwrap().loggers.is_empty());
    }

    #[test]
    fn test_defaults_only() {
        let logging = Config::new().logging().unwrap();
        assert_eq!(logging, LoggingConfig::default());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path().join("absent.yml")).unwrap();
        assert_eq!(config.logging().unwrap(), LoggingConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conf").join("logging.yml");

        let mut config = Config::load(&path).unwrap();
        config.set(&["no_handler_warning"], true).unwrap();
        config.save().unwrap();

        let reloaded = Config::load(&path).unwrap().logging().unwrap();
        assert!(reloaded.no_handler_warning);
    }

    #[test]
    fn test_apply_wires_file_sink() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("app.log");
        let yaml = format!(
            r#"
no_handler_warning: true
sinks:
  audit:
    type: file
    path: {}
    format: "%(levelName)s %(name)s %(message)s"
  quiet:
    type: null
loggers:
  root:
    level: WARN
    sinks: [quiet]
  app.db:
    level: DEBUG
    propagate: false
    sinks: [audit]
"#,
            log.display()
        );

        let reg = registry();
        Config::from_yaml(&yaml).unwrap().apply(&reg).unwrap();

        let db = reg.get_logger("app.db");
        assert_eq!(db.level(), Level::Debug);
        assert!(!db.propagate());
        assert_eq!(reg.root().level(), Level::Warn);
        assert!(reg.context().no_handler_warning());

        db.debug("opened %s", &["pool".into()]);
        let written = fs::read_to_string(&log).unwrap();
        assert_eq!(written, "DEBUG app.db opened pool\n");
    }

    #[test]
    fn test_shared_sink_built_once() {
        let yaml = r#"
sinks:
  drop:
    type: null
loggers:
  a:
    sinks: [drop]
  b:
    sinks: [drop]
"#;
        let reg = registry();
        Config::from_yaml(yaml).unwrap().apply(&reg).unwrap();

        let a = reg.get_logger("a").sinks();
        let b = reg.get_logger("b").sinks();
        assert!(same_sink(&a[0], &b[0]));
    }

    #[test]
    fn test_reapply_replaces_sinks() {
        let yaml = "sinks:\n  drop:\n    type: null\nloggers:\n  a:\n    sinks: [drop]\n";
        let reg = registry();
        let config = Config::from_yaml(yaml).unwrap();
        config.apply(&reg).unwrap();
        config.apply(&reg).unwrap();
        assert_eq!(reg.get_logger("a").sinks().len(), 1);
    }

    #[test]
    fn test_unknown_sink_rejected_without_changes() {
        let yaml = "loggers:\n  a:\n    level: ERROR\n    sinks: [nowhere]\n";
        let reg = registry();

        let err = Config::from_yaml(yaml).unwrap().apply(&reg).unwrap_err();
        assert!(matches!(err, LogtreeError::Config(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: Logger 'a' references unknown sink 'nowhere'"
        );
        assert!(!reg.contains("a"));
    }

    #[test]
    fn test_env_root_level_applied() {
        let reg = registry();
        Config::new()
            .with_env_from(|key| (key == LEVEL_ENV).then(|| "ERROR".to_string()))
            .apply(&reg)
            .unwrap();
        assert_eq!(reg.root().level(), Level::Error);
    }
}
