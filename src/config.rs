//! TOML configuration for the switch and its host screen.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};

use crate::stars::StarIcon;
use crate::switch::Timing;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub switch: SwitchConfig,
    #[serde(default)]
    pub host: HostConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SwitchConfig {
    #[serde(default = "default_width")]
    pub width: u16,
    #[serde(default = "default_height")]
    pub height: u16,
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    #[serde(default = "default_duration_ms")]
    pub color_duration_ms: u64,
    /// Ignore taps while a transition is running.
    #[serde(default)]
    pub guard_retap: bool,
    /// SVG used for the star sprites; the bundled icon when absent.
    pub star_icon: Option<PathBuf>,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        SwitchConfig {
            width: default_width(),
            height: default_height(),
            duration_ms: default_duration_ms(),
            color_duration_ms: default_duration_ms(),
            guard_retap: false,
            star_icon: None,
        }
    }
}

impl SwitchConfig {
    pub fn timing(&self) -> Timing {
        Timing {
            duration: Duration::from_millis(self.duration_ms),
            color_duration: Duration::from_millis(self.color_duration_ms),
            guard_retap: self.guard_retap,
        }
    }

    pub fn star_icon(&self) -> Result<StarIcon, String> {
        match &self.star_icon {
            Some(path) => StarIcon::load(path),
            None => Ok(StarIcon::bundled()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    #[serde(default = "default_flash_ms")]
    pub flash_ms: u64,
    #[serde(default = "default_margin")]
    pub margin: u16,
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        HostConfig {
            flash_ms: default_flash_ms(),
            margin: default_margin(),
            frame_ms: default_frame_ms(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path).map_err(|e| format!("read {}: {e}", path.display()))?;
        toml::from_str(&content).map_err(|e| format!("parse {}: {e}", path.display()))
    }

    /// Load config with fallback chain:
    /// 1. $DAYNIGHT_SWITCH_CONFIG env var
    /// 2. ./daynight-switch.toml
    /// 3. $XDG_CONFIG_HOME/daynight-switch/config.toml
    /// 4. Built-in defaults
    pub fn find_and_load() -> Self {
        let candidates: Vec<PathBuf> = vec![
            std::env::var("DAYNIGHT_SWITCH_CONFIG").ok().map(PathBuf::from),
            Some(PathBuf::from("daynight-switch.toml")),
            std::env::var("XDG_CONFIG_HOME")
                .ok()
                .map(|dir| PathBuf::from(dir).join("daynight-switch/config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        for path in &candidates {
            if path.exists() {
                match Self::load(path) {
                    Ok(config) => {
                        info!("Loaded config from {}", path.display());
                        return config;
                    }
                    Err(e) => warn!("Failed to load {}: {e}", path.display()),
                }
            }
        }

        info!("Using built-in default config");
        AppConfig::default()
    }
}

fn default_width() -> u16 { 300 }
fn default_height() -> u16 { 120 }
fn default_duration_ms() -> u64 { 500 }
fn default_flash_ms() -> u64 { 300 }
fn default_margin() -> u16 { 40 }
fn default_frame_ms() -> u64 { 16 }
