//! Configuration module for vpcplan
//!
//! Handles loading and merging configuration from multiple sources:
//! - Default values
//! - System configuration (/etc/vpcplan/vpcplan.toml)
//! - User configuration (~/.vpcplan.toml, ~/.config/vpcplan/config.toml)
//! - Project configuration (./vpcplan.toml)
//! - Environment variables
//!
//! Command-line flags are applied on top by the binary.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::plan::VpcSettings;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// VPC layout settings
    pub vpc: VpcSettings,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Output settings
    pub output: OutputConfig,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level when neither RUST_LOG nor -v is given
    pub level: String,

    /// Emit logs as JSON lines
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

/// Output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Enable colored output
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Files are merged key by key, so a project file only needs the keys it changes.
    /// A file named through `config_path` or `VPCPLAN_CONFIG` must exist; the
    /// default search locations are skipped when missing.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut merged = serde_json::to_value(Config::default())?;
        let explicit = config_path.is_some() || std::env::var_os("VPCPLAN_CONFIG").is_some();

        for path in Self::get_config_paths(config_path) {
            if path.exists() {
                tracing::debug!("Loading configuration from {}", path.display());
                merge_values(&mut merged, Self::read_value(&path)?);
            } else if explicit {
                anyhow::bail!("Config file not found: {}", path.display());
            }
        }

        let mut config: Config =
            serde_json::from_value(merged).context("Invalid configuration")?;
        config.apply_env_overrides()?;

        Ok(config)
    }

    /// Get the list of configuration file paths to check, lowest priority first
    fn get_config_paths(explicit_path: Option<&PathBuf>) -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // Explicit path takes priority
        if let Some(path) = explicit_path {
            paths.push(path.clone());
            return paths;
        }

        if let Ok(env_config) = std::env::var("VPCPLAN_CONFIG") {
            paths.push(PathBuf::from(env_config));
            return paths;
        }

        // System-wide config
        paths.push(PathBuf::from("/etc/vpcplan/vpcplan.toml"));

        // User config
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".vpcplan.toml"));
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("vpcplan").join("config.toml"));
        }

        // Project config (current directory)
        paths.push(PathBuf::from("vpcplan.toml"));

        paths
    }

    /// Load configuration from one file, format chosen by extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        serde_json::from_value(Self::read_value(path)?)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Read one file into a generic value tree
    fn read_value(path: &Path) -> Result<serde_json::Value> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let value = match extension {
            "yml" | "yaml" => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?,
            "json" => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?,
            "toml" => toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?,
            _ => {
                // Try TOML first, then YAML
                toml::from_str(&content)
                    .or_else(|_| serde_yaml::from_str(&content))
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))?
            }
        };

        Ok(value)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        // VPCPLAN_CIDR_BLOCK
        if let Ok(cidr) = std::env::var("VPCPLAN_CIDR_BLOCK") {
            self.vpc.cidr_block = cidr;
        }

        // VPCPLAN_PUBLIC_CIDR_BLOCK / VPCPLAN_PRIVATE_CIDR_BLOCK
        if let Ok(cidr) = std::env::var("VPCPLAN_PUBLIC_CIDR_BLOCK") {
            self.vpc.public_cidr_block = cidr;
        }
        if let Ok(cidr) = std::env::var("VPCPLAN_PRIVATE_CIDR_BLOCK") {
            self.vpc.private_cidr_block = cidr;
        }

        // VPCPLAN_SUBNET_MASK
        if let Ok(mask) = std::env::var("VPCPLAN_SUBNET_MASK") {
            self.vpc.subnet_mask = mask
                .trim()
                .parse()
                .with_context(|| format!("Invalid VPCPLAN_SUBNET_MASK '{}'", mask))?;
        }

        // VPCPLAN_AVAILABILITY_ZONES
        if let Ok(zones) = std::env::var("VPCPLAN_AVAILABILITY_ZONES") {
            self.vpc.availability_zones = split_list(&zones);
        }

        // VPCPLAN_MAX_ZONES
        if let Ok(max) = std::env::var("VPCPLAN_MAX_ZONES") {
            self.vpc.max_zones = max
                .trim()
                .parse()
                .with_context(|| format!("Invalid VPCPLAN_MAX_ZONES '{}'", max))?;
        }

        // VPCPLAN_LAYOUT
        if let Ok(layout) = std::env::var("VPCPLAN_LAYOUT") {
            self.vpc.layout = layout.parse().map_err(anyhow::Error::msg)?;
        }

        // VPCPLAN_STRATEGY
        if let Ok(strategy) = std::env::var("VPCPLAN_STRATEGY") {
            self.vpc.strategy = strategy.parse().map_err(anyhow::Error::msg)?;
        }

        // VPCPLAN_LOG_LEVEL
        if let Ok(level) = std::env::var("VPCPLAN_LOG_LEVEL") {
            self.logging.level = level;
        }

        // NO_COLOR
        if std::env::var("NO_COLOR").is_ok() || std::env::var("VPCPLAN_NO_COLOR").is_ok() {
            self.output.color = false;
        }

        Ok(())
    }
}

/// Merge `overlay` into `base`: objects merge per key, anything else replaces.
fn merge_values(base: &mut serde_json::Value, overlay: serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Split a comma separated list, dropping empty entries
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::SubnetLayout;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.vpc.cidr_block, "10.0.0.0/16");
        assert_eq!(config.vpc.subnet_mask, 28);
        assert_eq!(config.logging.level, "warn");
        assert!(config.output.color);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a, b,,c "), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_merge_values() {
        let mut base = serde_json::json!({"vpc": {"name": "main", "subnet_mask": 28}});
        merge_values(
            &mut base,
            serde_json::json!({"vpc": {"subnet_mask": 26, "availability_zones": ["a"]}}),
        );
        assert_eq!(
            base,
            serde_json::json!({"vpc": {"name": "main", "subnet_mask": 26, "availability_zones": ["a"]}})
        );
    }

    #[test]
    #[serial]
    fn test_env_override() {
        std::env::set_var("VPCPLAN_AVAILABILITY_ZONES", "us-east-1a,us-east-1b");
        std::env::set_var("VPCPLAN_LAYOUT", "interleaved");
        let mut config = Config::default();
        config.apply_env_overrides().unwrap();
        assert_eq!(config.vpc.availability_zones, vec!["us-east-1a", "us-east-1b"]);
        assert_eq!(config.vpc.layout, SubnetLayout::Interleaved);
        std::env::remove_var("VPCPLAN_AVAILABILITY_ZONES");
        std::env::remove_var("VPCPLAN_LAYOUT");
    }

    #[test]
    #[serial]
    fn test_missing_explicit_file_is_an_error() {
        std::env::remove_var("VPCPLAN_CONFIG");
        let path = PathBuf::from("/nonexistent/vpcplan.toml");
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    #[serial]
    fn test_invalid_env_override() {
        std::env::set_var("VPCPLAN_SUBNET_MASK", "wide");
        let mut config = Config::default();
        assert!(config.apply_env_overrides().is_err());
        std::env::remove_var("VPCPLAN_SUBNET_MASK");
    }
}
