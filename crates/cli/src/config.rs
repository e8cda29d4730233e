//! System configuration (~/.config/reposcape/config.toml)

use anyhow::{Context, Result};
use reposcape_timeline::TimelineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, Level};

/// Everything `scape` reads from its config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Log level used when no -v flag is given (default: "warn")
    pub log_level: String,
    pub timeline: TimelineConfig,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            timeline: TimelineConfig::default(),
        }
    }
}

impl SystemConfig {
    pub fn level(&self) -> Result<Level> {
        Level::from_str(&self.log_level)
            .map_err(|_| anyhow::anyhow!("Invalid log_level: {}", self.log_level))
    }

    pub fn validate(&self) -> Result<()> {
        self.level()?;
        self.timeline
            .simulation
            .validate()
            .context("Invalid [timeline.simulation] section")?;

        let schedule = &self.timeline.schedule;
        if schedule.structural_frames == 0 || schedule.refinement_frames == 0 {
            anyhow::bail!("Frame budgets must be at least 1");
        }
        Ok(())
    }
}

/// Default config location
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("reposcape").join("config.toml"))
}

/// Explicit path if given, the default location otherwise
pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => config_file_path().context("Could not determine config file path"),
    }
}

/// Load the config, falling back to defaults when the file does not exist
pub fn load(path: &Path) -> Result<SystemConfig> {
    if !path.exists() {
        debug!("No config at {}, using defaults", path.display());
        return Ok(SystemConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config: SystemConfig = toml::from_str(&raw)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

pub fn save(path: &Path, config: &SystemConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let raw = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, raw).with_context(|| format!("Failed to write config: {}", path.display()))
}

/// Write the default config unless a file is already there
///
/// Returns true when a file was created.
pub fn init_if_missing(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save(path, &SystemConfig::default())?;
    Ok(true)
}

/// Default config rendered as TOML
pub fn example_config() -> Result<String> {
    toml::to_string_pretty(&SystemConfig::default()).context("Failed to serialize config")
}

/// Look up a dotted key such as `timeline.simulation.damping`
pub fn lookup(config: &SystemConfig, key: &str) -> Result<toml::Value> {
    let root = toml::Value::try_from(config).context("Failed to serialize config")?;
    let mut current = &root;
    for segment in key.split('.') {
        current = current
            .get(segment)
            .with_context(|| unknown_key(key))?;
    }
    Ok(current.clone())
}

/// Return a copy of `config` with `key` set to `raw`
///
/// `raw` is read as a TOML value (`0.5`, `true`, `"abort"`) and taken as a
/// plain string when it does not parse.
pub fn assign(config: &SystemConfig, key: &str, raw: &str) -> Result<SystemConfig> {
    let mut root = toml::Value::try_from(config).context("Failed to serialize config")?;

    let (parents, leaf) = match key.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, key),
    };

    let mut table = &mut root;
    if let Some(parents) = parents {
        for segment in parents.split('.') {
            table = table.get_mut(segment).with_context(|| unknown_key(key))?;
        }
    }
    let table = table.as_table_mut().with_context(|| unknown_key(key))?;

    let value = match (table.get(leaf), parse_value(raw)) {
        (Some(toml::Value::Float(_)), toml::Value::Integer(i)) => toml::Value::Float(i as f64),
        (_, value) => value,
    };
    table.insert(leaf.to_string(), value);

    let updated: SystemConfig = root
        .try_into()
        .with_context(|| format!("Invalid value for {}: {}", key, raw))?;
    // unknown keys are dropped by deserialization
    lookup(&updated, key)?;
    updated.validate().context("Invalid configuration value")?;
    Ok(updated)
}

fn parse_value(raw: &str) -> toml::Value {
    toml::from_str::<toml::Table>(&format!("value = {}", raw))
        .ok()
        .and_then(|mut table| table.remove("value"))
        .unwrap_or_else(|| toml::Value::String(raw.to_string()))
}

fn unknown_key(key: &str) -> String {
    format!(
        "Unknown config key: {}. Use 'scape config --list' to see available keys.",
        key
    )
}
