//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use reposcape_core::TimelineStep;
use reposcape_timeline::StepPolicy;
use serde::Deserialize;
use std::path::Path;

/// Accepted layouts of a timeline file
#[derive(Deserialize)]
#[serde(untagged)]
enum TimelineFile {
    Steps(Vec<TimelineStep>),
    Wrapped { steps: Vec<TimelineStep> },
}

/// Read a timeline JSON file: either an array of steps or `{"steps": [...]}`
pub fn load_timeline(path: &Path) -> Result<Vec<TimelineStep>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read timeline: {}", path.display()))?;
    let file: TimelineFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse timeline: {}", path.display()))?;

    Ok(match file {
        TimelineFile::Steps(steps) => steps,
        TimelineFile::Wrapped { steps } => steps,
    })
}

/// Step policy chosen by --skip-invalid / --abort-invalid, if any
pub fn step_policy(skip: bool, abort: bool) -> Option<StepPolicy> {
    match (skip, abort) {
        (_, true) => Some(StepPolicy::Abort),
        (true, false) => Some(StepPolicy::Skip),
        (false, false) => None,
    }
}

/// First 8 characters of a step id (commit hashes are long)
pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

/// First line of `text`, cut to `max` characters
pub fn summary_line(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() <= max {
        line.to_string()
    } else {
        let mut cut: String = line.chars().take(max.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

/// Format file size in human-readable format
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
