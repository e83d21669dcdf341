use crate::dispatch::error::Error;
use crate::weak_error;
use log::LevelFilter;
use serde::Deserialize;
use std::fs::read_to_string;
use std::path::Path;
use std::str::FromStr;

/// Dispatcher configuration.
#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    /// Write a summary of every delivered notification into debug logs.
    pub trace_notifications: bool,
    /// Deliver a `DispatchFailure` notification for every failed subscriber.
    pub report_subscriber_failures: bool,
    /// Treat panic in subscriber as a subscriber failure instead of unwinding through engine
    /// boundary.
    pub catch_panics: bool,
    /// Default log level, `RUST_LOG` takes precedence.
    pub log_level: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            trace_notifications: false,
            report_subscriber_failures: true,
            catch_panics: true,
            log_level: "warn".to_string(),
        }
    }
}

impl DispatchConfig {
    const DEFAULT_PATH: &'static str = ".config/bs/dispatch.toml";

    /// Parse configuration from toml document.
    pub fn from_toml(data: &str) -> Result<Self, Error> {
        Ok(toml::de::from_str(data)?)
    }

    /// Read and parse configuration file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, Error> {
        let data = read_to_string(path)?;
        Self::from_toml(&data)
    }

    /// Load configuration from file. If path is [`None`] then `~/.config/bs/dispatch.toml`
    /// is used. Return default configuration on errors.
    pub fn from_file(path: Option<&str>) -> Self {
        let cfg = match path {
            None => {
                let Some(home) = home::home_dir() else {
                    return Self::default();
                };
                let path = home.join(Self::DEFAULT_PATH);
                if !path.exists() {
                    return Self::default();
                }
                weak_error!(Self::read(path), "load dispatch config:")
            }
            Some(path) => weak_error!(Self::read(path), "load dispatch config:"),
        };
        cfg.unwrap_or_default()
    }

    /// Return configured log level, `warn` if level can't be parsed.
    pub fn log_level(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Warn)
    }
}
