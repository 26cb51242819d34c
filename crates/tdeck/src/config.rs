use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::theme::Theme;
use crate::transition::TransitionKind;

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "tdeck";

pub const DEFAULT_REFRESH_RATE: u32 = 60;
pub const DEFAULT_MESSAGE_TIMEOUT: f64 = 1.5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<String>,

    /// Ticks per second of the render loop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_rate: Option<u32>,

    /// Seconds a footer message stays up.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_timeout: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch: Option<bool>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `tdeck config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(err) => {
                tracing::debug!(error = %err, "using default config");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# tdeck configuration\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let defaults = self.defaults.get_or_insert_with(DefaultsConfig::default);
        match key {
            "defaults.theme" => {
                if Theme::from_name(value).is_none() {
                    anyhow::bail!(
                        "Invalid theme: {value}. Must be one of: {}.",
                        Theme::NAMES.join(", ")
                    );
                }
                defaults.theme = Some(value.to_string());
            }
            "defaults.transition" => {
                let kind: TransitionKind = value.parse()?;
                defaults.transition = Some(kind.name().to_string());
            }
            "defaults.refresh_rate" => {
                let rate: u32 = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid refresh_rate: {value}. Must be a whole number of Hz."))?;
                if !(1..=240).contains(&rate) {
                    anyhow::bail!("Invalid refresh_rate: {rate}. Must be between 1 and 240.");
                }
                defaults.refresh_rate = Some(rate);
            }
            "defaults.message_timeout" => {
                let secs: f64 = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid message_timeout: {value}. Must be seconds."))?;
                if !secs.is_finite() || secs <= 0.0 {
                    anyhow::bail!("Invalid message_timeout: {value}. Must be a positive number.");
                }
                defaults.message_timeout = Some(secs);
            }
            "defaults.watch" => {
                let watch = match value {
                    "true" | "yes" | "on" => true,
                    "false" | "no" | "off" => false,
                    _ => anyhow::bail!("Invalid watch: {value}. Must be 'true' or 'false'."),
                };
                defaults.watch = Some(watch);
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: defaults.theme, defaults.transition, defaults.refresh_rate, defaults.message_timeout, defaults.watch"
            ),
        }
        Ok(())
    }

    fn defaults(&self) -> DefaultsConfig {
        self.defaults.clone().unwrap_or_default()
    }

    pub fn theme(&self) -> Theme {
        self.defaults()
            .theme
            .as_deref()
            .and_then(Theme::from_name)
            .unwrap_or_default()
    }

    pub fn transition(&self) -> TransitionKind {
        self.defaults()
            .transition
            .as_deref()
            .and_then(TransitionKind::from_name)
            .unwrap_or_default()
    }

    pub fn refresh_rate(&self) -> u32 {
        self.defaults()
            .refresh_rate
            .filter(|r| *r > 0)
            .unwrap_or(DEFAULT_REFRESH_RATE)
    }

    pub fn message_timeout(&self) -> f64 {
        self.defaults()
            .message_timeout
            .filter(|t| t.is_finite() && *t > 0.0)
            .unwrap_or(DEFAULT_MESSAGE_TIMEOUT)
    }

    pub fn watch(&self) -> bool {
        self.defaults().watch.unwrap_or(true)
    }
}
