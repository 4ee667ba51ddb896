//! Runtime settings for the bootstrap binary
//!
//! Loaded from a TOML file with `PRAESIDIUM_*` environment overrides.
//! Every field has a default, so the binary runs with no file at all.

use anyhow::Context;
use config::{Config, Environment, File};
use custodia::EngineConfig;
use mensura::SizerConfig;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineSettings,
    pub monitor: MonitorSettings,
    /// Seconds granted to outstanding work at shutdown.
    pub shutdown_grace_secs: u64,
    /// Initial sizer configuration; hot-reloaded over the bus afterwards.
    pub sizing: SizerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub order_deadline_ms: u64,
    pub monitor_deadline_ms: u64,
    pub frequency_window_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    pub period_secs: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            order_deadline_ms: 100,
            monitor_deadline_ms: 2000,
            frequency_window_secs: 60,
        }
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self { period_secs: 60 }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            engine: EngineSettings::default(),
            monitor: MonitorSettings::default(),
            shutdown_grace_secs: 5,
            sizing: SizerConfig::default(),
        }
    }
}

impl Settings {
    pub fn new(path: &str) -> anyhow::Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("PRAESIDIUM").separator("__"))
            .build()
            .context("failed to load configuration")?;
        settings
            .try_deserialize()
            .context("configuration did not match the expected shape")
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            order_deadline: Duration::from_millis(self.engine.order_deadline_ms),
            monitor_deadline: Duration::from_millis(self.engine.monitor_deadline_ms),
            frequency_window: Duration::from_secs(self.engine.frequency_window_secs),
        }
    }

    pub fn monitor_period(&self) -> Duration {
        Duration::from_secs(self.monitor.period_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}
