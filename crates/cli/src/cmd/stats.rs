//! Per-step reconstruction table (no layout)

use crate::config::SystemConfig;
use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use reposcape_core::{Reconstructor, SnapshotAssembler};
use reposcape_timeline::StepPolicy;
use std::path::Path;

pub async fn run(
    config: &SystemConfig,
    input: &Path,
    strict: bool,
    policy: Option<StepPolicy>,
) -> Result<()> {
    let steps = util::load_timeline(input)?;
    let strict = strict || config.timeline.strict_orphans;
    let policy = policy.unwrap_or(config.timeline.on_invalid_step);

    let mut reconstructor = Reconstructor::new(SnapshotAssembler::new(strict));

    println!("{}", "Timeline Statistics".bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "{:<8}  {:>6} {:>5} {:>6} {:>6} {:>6} {:>6} {:>5}  {}",
        "STEP", "FILES", "DIRS", "ADDED", "MOVED", "SAME", "GHOST", "WARN", "MESSAGE"
    );

    let mut skipped = 0usize;
    let mut warnings = 0usize;
    let mut last_files = 0usize;

    for step in &steps {
        let reconstructed = match reconstructor.reconstruct(step) {
            Ok(reconstructed) => reconstructed,
            Err(e) if policy == StepPolicy::Skip => {
                skipped += 1;
                println!(
                    "{:<8}  {}",
                    util::short_id(&step.id).red(),
                    format!("skipped: {}", e).red()
                );
                continue;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Step {} rejected", step.id));
            }
        };

        let stats = reconstructed.stats;
        warnings += reconstructed.warnings.len();
        last_files = stats.files;

        println!(
            "{:<8}  {:>6} {:>5} {:>6} {:>6} {:>6} {:>6} {:>5}  {}",
            util::short_id(&step.id).yellow(),
            stats.files,
            stats.directories,
            stats.added.green(),
            stats.moved.cyan(),
            stats.unchanged.dimmed(),
            stats.deleted.red(),
            reconstructed.warnings.len(),
            util::summary_line(&step.message, 48)
        );
    }

    println!();
    println!(
        "Steps: {}  Skipped: {}  Warnings: {}  Files at end: {}",
        steps.len().to_string().cyan(),
        if skipped == 0 {
            skipped.to_string().green().to_string()
        } else {
            skipped.to_string().yellow().to_string()
        },
        warnings,
        last_files
    );

    Ok(())
}
