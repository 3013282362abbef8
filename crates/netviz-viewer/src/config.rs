//! Configuration loading and validation

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub topology: TopologyConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyConfig {
    /// Path to the topology document; the built-in sample applies
    /// when it is missing or malformed
    #[serde(default = "default_topology_path")]
    pub path: String,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            path: default_topology_path(),
        }
    }
}

fn default_topology_path() -> String {
    "topology.json".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Path to the asset manifest mapping device keys to model files
    #[serde(default = "default_manifest_path")]
    pub manifest: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest_path(),
        }
    }
}

fn default_manifest_path() -> String {
    "assets/models.json".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
        }
    }
}

fn default_title() -> String {
    "netviz - Network Topology".to_string()
}

/// Initial view toggles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default = "default_true")]
    pub show_labels: bool,
    #[serde(default = "default_true")]
    pub show_links: bool,
    #[serde(default = "default_true")]
    pub show_grid: bool,
    #[serde(default)]
    pub idle_animation: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            show_labels: true,
            show_links: true,
            show_grid: true,
            idle_animation: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Load configuration from file, falling back to defaults when the
/// file does not exist
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.topology.path, "topology.json");
        assert!(config.view.show_labels);
        assert!(!config.view.idle_animation);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [topology]
            path = "lab.json"

            [view]
            idle_animation = true
            "#,
        )
        .unwrap();
        assert_eq!(config.topology.path, "lab.json");
        assert!(config.view.idle_animation);
        assert!(config.view.show_links);
        assert_eq!(config.window.title, "netviz - Network Topology");
    }

    #[test]
    fn test_round_trip() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.topology.path, config.topology.path);
        assert_eq!(parsed.view.show_grid, config.view.show_grid);
    }
}
