//! Configuration management command
//!
//! Provides CLI interface to view and edit the reposcape config file.

use crate::config;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;

/// List all configuration values
pub async fn run_list(path: &Path) -> Result<()> {
    let config = config::load(path)?;
    let rendered = toml::to_string_pretty(&config).context("Failed to serialize config")?;

    println!("{}", "Configuration".bold());
    let state = if path.exists() { "" } else { " (not created, showing defaults)" };
    println!("{}: {}{}\n", "Location".dimmed(), path.display().dimmed(), state.dimmed());

    for line in rendered.lines() {
        if line.starts_with('[') {
            println!("{}", line.yellow());
        } else if let Some((key, value)) = line.split_once(" = ") {
            println!("  {} = {}", key.cyan(), value);
        } else {
            println!("{}", line);
        }
    }

    println!("\n{}", "Valid Ranges:".bold());
    println!("  log_level: error, warn, info, debug, trace");
    println!("  timeline.on_invalid_step: skip, abort");
    println!("  timeline.simulation.damping: (0, 1]");
    println!("  timeline.simulation.min_radius <= max_radius, seed_shell_min <= seed_shell_max");
    println!("  timeline.schedule.*_frames: >= 1");

    Ok(())
}

/// Get a single configuration value
pub async fn run_get(path: &Path, key: &str) -> Result<()> {
    let config = config::load(path)?;
    match config::lookup(&config, key)? {
        toml::Value::String(s) => println!("{}", s),
        value => println!("{}", value),
    }
    Ok(())
}

/// Set a configuration value
pub async fn run_set(path: &Path, key: &str, value: &str) -> Result<()> {
    let current = config::load(path)?;
    let updated = config::assign(&current, key, value)?;
    config::save(path, &updated)?;

    println!("{} {} = {}", "✓".green(), key.cyan(), value);
    Ok(())
}

/// Create the config file with defaults
pub async fn run_init(path: &Path) -> Result<()> {
    if config::init_if_missing(path)? {
        println!("{} Created config file at: {}", "✓".green(), path.display());
    } else {
        println!("{}", path.display());
        println!("{}", "Config file already exists.".yellow());
    }
    Ok(())
}

/// Show the config file path
pub async fn run_path(path: &Path) -> Result<()> {
    println!("{}", path.display());
    if !path.exists() {
        println!("{}", "File does not exist. Use --init to create it.".yellow());
    }
    Ok(())
}

/// Show example configuration
pub async fn run_example() -> Result<()> {
    println!("{}", config::example_config()?);
    Ok(())
}

