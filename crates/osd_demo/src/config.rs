//! Demo configuration (window, vsync, overlay). Loaded from config.ron at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use osd_renderer::DEFAULT_DENSITY_SCALE;

/// Persistent demo settings. Missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Window width in logical pixels.
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    /// Window height in logical pixels.
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default = "default_true")]
    pub vsync: bool,
    /// Whether the overlay starts visible. F3 flips it and saves.
    #[serde(default = "default_true")]
    pub show_overlay: bool,
    /// Screen pixels per font pixel.
    #[serde(default = "default_density_scale")]
    pub density_scale: f32,
}

fn default_window_width() -> u32 {
    1280
}
fn default_window_height() -> u32 {
    720
}
fn default_true() -> bool {
    true
}
fn default_density_scale() -> f32 {
    DEFAULT_DENSITY_SCALE
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            vsync: default_true(),
            show_overlay: default_true(),
            density_scale: default_density_scale(),
        }
    }
}

impl DemoConfig {
    /// Load `config.ron` from the working directory, or defaults if it is
    /// missing or invalid.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(data) => Self::parse(&data).unwrap_or_else(|e| {
                log::warn!("Invalid config at {:?}: {}, using defaults", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn parse(data: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(data)
    }

    /// Save to `config.ron`. Logs on error.
    pub fn save(&self) {
        self.save_to(&config_path());
    }

    pub fn save_to(&self, path: &Path) {
        match ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            Ok(s) => {
                if let Err(e) = std::fs::write(path, s) {
                    log::warn!("Could not write config to {:?}: {}", path, e);
                }
            }
            Err(e) => log::warn!("Could not serialize config: {}", e),
        }
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("config.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = DemoConfig::default();
        assert_eq!(c.window_width, 1280);
        assert_eq!(c.window_height, 720);
        assert!(c.vsync);
        assert!(c.show_overlay);
        assert!((c.density_scale - 1.8).abs() < 1e-6);
    }

    #[test]
    fn partial_ron_fills_in_defaults() {
        let c = DemoConfig::parse("(show_overlay: false, density_scale: 2.5)").unwrap();
        assert!(!c.show_overlay);
        assert!((c.density_scale - 2.5).abs() < 1e-6);
        assert_eq!(c.window_width, 1280);
        assert!(c.vsync);
    }

    #[test]
    fn invalid_ron_is_an_error() {
        assert!(DemoConfig::parse("(window_width: \"wide\")").is_err());
    }

    #[test]
    fn save_then_load_from_disk() {
        let path = std::env::temp_dir().join(format!("osd_demo_config_{}.ron", std::process::id()));
        let c = DemoConfig {
            show_overlay: false,
            ..DemoConfig::default()
        };
        c.save_to(&path);
        assert_eq!(DemoConfig::load_from(&path), c);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("osd_demo_config_does_not_exist.ron");
        assert_eq!(DemoConfig::load_from(&path), DemoConfig::default());
    }
}
