//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::feed::FeedClientConfig;
use crate::history::DisplayZone;
use crate::poller::{PollMode, PollerConfig};
use crate::views::{FormatPolicy, GaugeSpec, Language, TemperatureUnit};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub poller: PollerSettings,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Adafruit IO feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub feed_key: String,

    /// Only needed for private feeds
    #[serde(default)]
    pub api_key: Option<String>,

    /// `?limit=` for the chart and export paths
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://io.adafruit.com/api/v2".to_string()
}

fn default_history_limit() -> u32 {
    1000
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: String::new(),
            feed_key: String::new(),
            api_key: None,
            history_limit: default_history_limit(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Poller configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PollerSettings {
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

fn default_interval() -> u64 {
    5
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
        }
    }
}

/// Display configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub language: Language,

    #[serde(default)]
    pub unit: TemperatureUnit,

    /// `local`, `utc`, or an offset such as `+07:00`
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,

    #[serde(default = "default_gauge_min")]
    pub gauge_min: f64,

    #[serde(default = "default_gauge_max")]
    pub gauge_max: f64,

    #[serde(default = "default_gauge_segments")]
    pub gauge_segments: u32,
}

fn default_utc_offset() -> String {
    "local".to_string()
}

fn default_gauge_min() -> f64 {
    0.0
}

fn default_gauge_max() -> f64 {
    50.0
}

fn default_gauge_segments() -> u32 {
    5
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            unit: TemperatureUnit::default(),
            utc_offset: default_utc_offset(),
            gauge_min: default_gauge_min(),
            gauge_max: default_gauge_max(),
            gauge_segments: default_gauge_segments(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Default config file locations, in search order
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("tempbox").join("config.toml")),
            Some(PathBuf::from("/etc/tempbox/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Load from default locations or environment
    pub fn load_default() -> Result<LoadedConfig, ConfigError> {
        Self::search(&Self::default_paths(), |key| std::env::var(key).ok())
    }

    /// First of `paths` that exists and loads; defaults plus overrides otherwise.
    ///
    /// Files that exist but fail to load are kept in [`LoadedConfig::skipped`].
    pub fn search<F>(paths: &[PathBuf], lookup: F) -> Result<LoadedConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut skipped = Vec::new();

        for path in paths {
            if !path.exists() {
                continue;
            }
            let loaded = Self::load(path).and_then(|mut config| {
                config.apply_overrides(&lookup)?;
                Ok(config)
            });
            match loaded {
                Ok(config) => {
                    return Ok(LoadedConfig {
                        config,
                        source: Some(path.clone()),
                        skipped,
                    })
                }
                Err(e) => skipped.push((path.clone(), e)),
            }
        }

        // Fall back to environment-only config
        let mut config = Config::default();
        config.apply_overrides(&lookup)?;
        Ok(LoadedConfig {
            config,
            source: None,
            skipped,
        })
    }

    /// Explicit path if given, default locations otherwise
    pub fn resolve(path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
        match path {
            Some(path) => Ok(LoadedConfig {
                config: Self::load_with_env(path)?,
                source: Some(path.to_path_buf()),
                skipped: Vec::new(),
            }),
            None => Self::load_default(),
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup` (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Feed overrides
        if let Some(username) = lookup("TEMPBOX_AIO_USERNAME") {
            self.feed.username = username;
        }
        if let Some(feed_key) = lookup("TEMPBOX_AIO_FEED_KEY") {
            self.feed.feed_key = feed_key;
        }
        if let Some(api_key) = lookup("TEMPBOX_AIO_KEY") {
            self.feed.api_key = Some(api_key).filter(|k| !k.is_empty());
        }
        if let Some(base_url) = lookup("TEMPBOX_AIO_BASE_URL") {
            self.feed.base_url = base_url;
        }

        // Poller overrides
        if let Some(interval) = lookup("TEMPBOX_POLL_INTERVAL_SECS") {
            self.poller.interval_secs = parse_var("TEMPBOX_POLL_INTERVAL_SECS", &interval)?;
        }

        // API overrides
        if let Some(host) = lookup("TEMPBOX_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("TEMPBOX_API_PORT") {
            self.api.port = parse_var("TEMPBOX_API_PORT", &port)?;
        }

        // Display overrides
        if let Some(language) = lookup("TEMPBOX_LANGUAGE") {
            self.display.language = parse_var("TEMPBOX_LANGUAGE", &language)?;
        }
        if let Some(unit) = lookup("TEMPBOX_UNIT") {
            self.display.unit = parse_var("TEMPBOX_UNIT", &unit)?;
        }
        if let Some(offset) = lookup("TEMPBOX_UTC_OFFSET") {
            self.display.utc_offset = offset;
        }

        // Logging overrides
        if let Some(level) = lookup("TEMPBOX_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("TEMPBOX_LOG_FORMAT") {
            self.logging.format = format;
        }

        self.validate()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.zone()?;

        if self.poller.interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "poller.interval_secs",
                error: "must be at least 1".to_string(),
            });
        }
        if self.display.gauge_max <= self.display.gauge_min {
            return Err(ConfigError::Invalid {
                field: "display.gauge_max",
                error: format!(
                    "must be greater than gauge_min ({})",
                    self.display.gauge_min
                ),
            });
        }
        if self.display.gauge_segments == 0 {
            return Err(ConfigError::Invalid {
                field: "display.gauge_segments",
                error: "must be at least 1".to_string(),
            });
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::Invalid {
                field: "logging.format",
                error: format!("expected pretty or json, got {}", self.logging.format),
            });
        }

        Ok(())
    }

    /// Warn about settings that make every fetch fail
    pub fn warn_incomplete(&self) {
        if self.feed.username.is_empty() {
            tracing::warn!("feed.username is not set; requests will fail");
        }
        if self.feed.feed_key.is_empty() {
            tracing::warn!("feed.feed_key is not set; requests will fail");
        }
    }

    pub fn zone(&self) -> Result<DisplayZone, ConfigError> {
        self.display
            .utc_offset
            .parse()
            .map_err(|error| ConfigError::Invalid {
                field: "display.utc_offset",
                error,
            })
    }

    pub fn client_config(&self) -> FeedClientConfig {
        FeedClientConfig {
            base_url: self.feed.base_url.clone(),
            username: self.feed.username.clone(),
            feed_key: self.feed.feed_key.clone(),
            api_key: self.feed.api_key.clone(),
            request_timeout_ms: self.feed.request_timeout_secs.saturating_mul(1000),
        }
    }

    pub fn format_policy(&self) -> Result<FormatPolicy, ConfigError> {
        Ok(FormatPolicy::new(
            self.display.language,
            self.display.unit,
            self.zone()?,
        ))
    }

    pub fn gauge_spec(&self) -> GaugeSpec {
        GaugeSpec {
            min: self.display.gauge_min,
            max: self.display.gauge_max,
            segments: self.display.gauge_segments,
        }
    }

    /// Periodic polling for the gauge, limited to the history size
    pub fn periodic_poller(&self) -> PollerConfig {
        PollerConfig {
            mode: PollMode::Periodic(Duration::from_secs(self.poller.interval_secs)),
            limit: Some(self.feed.history_limit),
        }
    }

    /// A single fetch of the history, for chart and export
    pub fn one_shot_poller(&self) -> PollerConfig {
        PollerConfig {
            mode: PollMode::OneShot,
            limit: Some(self.feed.history_limit),
        }
    }

    /// Address the HTTP server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn parse_var<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        field: key,
        error: e.to_string(),
    })
}

/// Result of a config search
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    /// File the config came from; `None` for defaults plus environment
    pub source: Option<PathBuf>,
    /// Files that exist but could not be loaded
    pub skipped: Vec<(PathBuf, ConfigError)>,
}

impl LoadedConfig {
    /// Log where the config came from. Call after logging is initialized.
    pub fn report(&self) {
        for (path, e) in &self.skipped {
            tracing::warn!("Failed to load config from {:?}: {}", path, e);
        }
        match &self.source {
            Some(path) => tracing::info!("Loaded config from {:?}", path),
            None => tracing::info!("Using default config with environment overrides"),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid value for {field}: {error}")]
    Invalid { field: &'static str, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Tempbox Configuration
#
# Environment variables override these settings:
# - TEMPBOX_AIO_USERNAME
# - TEMPBOX_AIO_FEED_KEY
# - TEMPBOX_AIO_KEY
# - TEMPBOX_AIO_BASE_URL
# - TEMPBOX_POLL_INTERVAL_SECS
# - TEMPBOX_API_HOST
# - TEMPBOX_API_PORT
# - TEMPBOX_LANGUAGE
# - TEMPBOX_UNIT
# - TEMPBOX_UTC_OFFSET
# - TEMPBOX_LOG_LEVEL
# - TEMPBOX_LOG_FORMAT

[feed]
# Adafruit IO REST API
base_url = "https://io.adafruit.com/api/v2"

# Account and feed to read
username = ""
feed_key = ""

# AIO key, only needed for private feeds
# api_key = ""

# Readings fetched for the chart and CSV export
history_limit = 1000

# Request timeout in seconds
request_timeout_secs = 10

[poller]
# Seconds between gauge refreshes
interval_secs = 5

[display]
# Label language: en or th
language = "en"

# Display unit: celsius or fahrenheit (CSV always carries feed values)
unit = "celsius"

# Zone for chart labels, CSV timestamps and range bounds:
# local, utc, or an offset such as +07:00
utc_offset = "local"

# Gauge dial
gauge_min = 0.0
gauge_max = 50.0
gauge_segments = 5

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8080

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.feed.base_url, "https://io.adafruit.com/api/v2");
        assert_eq!(config.feed.history_limit, 1000);
        assert_eq!(config.poller.interval_secs, 5);
        assert_eq!(config.display.language, Language::En);
        assert_eq!(config.display.unit, TemperatureUnit::Celsius);
        assert_eq!(config.gauge_spec(), GaugeSpec::default());
        assert_eq!(config.zone().unwrap(), DisplayZone::Local);
    }

    #[test]
    fn test_generated_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.feed.history_limit, 1000);
        assert!(config.feed.api_key.is_none());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[feed]
username = "maker"
feed_key = "tank-temp"

[display]
language = "th"
utc_offset = "+07:00"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.feed.username, "maker");
        assert_eq!(config.feed.feed_key, "tank-temp");
        assert_eq!(config.display.language, Language::Th);
        assert_eq!(config.poller.interval_secs, 5);

        let client = config.client_config();
        assert_eq!(
            client.data_url(),
            "https://io.adafruit.com/api/v2/maker/feeds/tank-temp/data"
        );
        assert_eq!(client.request_timeout_ms, 10_000);
    }

    #[test]
    fn test_load_errors() {
        let missing = Config::load(Path::new("/nonexistent/tempbox.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[feed\nusername = ").unwrap();
        let bad = Config::load(file.path()).unwrap_err();
        assert!(matches!(bad, ConfigError::Parse { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[display]\nutc_offset = \"mars\"").unwrap();
        let bad = Config::load(file.path()).unwrap_err();
        assert!(matches!(
            bad,
            ConfigError::Invalid {
                field: "display.utc_offset",
                ..
            }
        ));
    }

    #[test]
    fn test_search_keeps_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.toml");
        let good = dir.path().join("good.toml");
        let missing = dir.path().join("missing.toml");
        std::fs::write(&broken, "[feed\nusername = ").unwrap();
        std::fs::write(&good, "[feed]\nusername = \"maker\"\n").unwrap();

        let loaded = Config::search(&[missing.clone(), broken.clone(), good.clone()], env(&[])).unwrap();
        assert_eq!(loaded.source.as_deref(), Some(good.as_path()));
        assert_eq!(loaded.config.feed.username, "maker");
        assert_eq!(loaded.skipped.len(), 1);
        assert_eq!(loaded.skipped[0].0, broken);
        assert!(matches!(loaded.skipped[0].1, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_search_falls_back_with_skipped_file() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("config.toml");
        std::fs::write(&broken, "[display]\nutc_offset = \"mars\"\n").unwrap();

        let loaded = Config::search(
            &[broken.clone()],
            env(&[("TEMPBOX_AIO_FEED_KEY", "tank")]),
        )
        .unwrap();
        assert!(loaded.source.is_none());
        assert_eq!(loaded.config.feed.feed_key, "tank");
        assert_eq!(loaded.skipped.len(), 1);
        assert!(matches!(loaded.skipped[0].1, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_resolve_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nport = 9100").unwrap();

        let loaded = Config::resolve(Some(file.path())).unwrap();
        assert_eq!(loaded.source.as_deref(), Some(file.path()));
        assert!(loaded.skipped.is_empty());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[
                ("TEMPBOX_AIO_USERNAME", "maker"),
                ("TEMPBOX_AIO_FEED_KEY", "tank"),
                ("TEMPBOX_AIO_KEY", "secret"),
                ("TEMPBOX_POLL_INTERVAL_SECS", "30"),
                ("TEMPBOX_API_PORT", "9000"),
                ("TEMPBOX_UNIT", "fahrenheit"),
                ("TEMPBOX_UTC_OFFSET", "utc"),
                ("TEMPBOX_LOG_FORMAT", "json"),
            ]))
            .unwrap();

        assert_eq!(config.feed.username, "maker");
        assert_eq!(config.feed.feed_key, "tank");
        assert_eq!(config.feed.api_key.as_deref(), Some("secret"));
        assert_eq!(config.poller.interval_secs, 30);
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.display.unit, TemperatureUnit::Fahrenheit);
        assert_eq!(config.zone().unwrap(), DisplayZone::utc());
        assert_eq!(config.logging.format, "json");
        assert_eq!(
            config.periodic_poller().mode,
            PollMode::Periodic(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_bad_env_values() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(env(&[("TEMPBOX_API_PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "TEMPBOX_API_PORT",
                ..
            }
        ));

        let mut config = Config::default();
        assert!(config
            .apply_overrides(env(&[("TEMPBOX_POLL_INTERVAL_SECS", "0")]))
            .is_err());

        let mut config = Config::default();
        assert!(config
            .apply_overrides(env(&[("TEMPBOX_LANGUAGE", "fr")]))
            .is_err());
    }
}
