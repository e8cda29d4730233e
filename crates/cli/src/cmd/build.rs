//! Replay a timeline and write laid-out snapshots

use crate::config::SystemConfig;
use crate::util;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use reposcape_timeline::{ReplayEvent, StepPolicy, Timeline};
use std::path::PathBuf;

pub struct BuildArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub strict: bool,
    pub policy: Option<StepPolicy>,
    pub frames: Option<u32>,
    pub quiet: bool,
}

pub async fn run(config: &SystemConfig, args: BuildArgs) -> Result<()> {
    // 1. Load the timeline
    let steps = util::load_timeline(&args.input)?;
    let total = steps.len();

    // 2. Apply command-line overrides
    let mut timeline_config = config.timeline.clone();
    if args.strict {
        timeline_config.strict_orphans = true;
    }
    if let Some(policy) = args.policy {
        timeline_config.on_invalid_step = policy;
    }
    if let Some(frames) = args.frames {
        if frames == 0 {
            anyhow::bail!("--frames must be at least 1");
        }
        timeline_config.schedule.structural_frames = frames;
        timeline_config.schedule.refinement_frames = frames;
    }

    let mut timeline = Timeline::new(timeline_config).context("Invalid timeline configuration")?;
    let handle = timeline.handle();

    // 3. Ctrl-C stops the replay, keeping what was produced
    let interrupt = tokio::spawn({
        let handle = handle.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                handle.halt();
            }
        }
    });

    let progress = if args.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(total as u64).with_style(ProgressStyle::with_template(
            "{elapsed_precise} {wide_bar} {pos}/{len} {msg}",
        )?)
    };

    // 4. Replay off the async runtime
    let bar = progress.clone();
    let timeline_id = timeline.id();
    let replay = tokio::task::spawn_blocking(move || {
        timeline.replay_with(&steps, |event| match event {
            ReplayEvent::Frame { step, progress } => {
                if progress.frame % 30 == 0 {
                    bar.set_message(format!(
                        "step {} frame {}/{}",
                        step + 1,
                        progress.frame + 1,
                        progress.frames
                    ));
                }
            }
            ReplayEvent::StepDone { .. } | ReplayEvent::Skipped { .. } => bar.inc(1),
        })
    })
    .await
    .context("Layout task failed")?
    .context("Replay failed")?;

    interrupt.abort();
    progress.finish_and_clear();

    // 5. Write snapshots
    let json =
        serde_json::to_string_pretty(&replay.snapshots).context("Failed to serialize snapshots")?;
    match &args.output {
        Some(path) => std::fs::write(path, &json)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", json),
    }

    // 6. Summary (stderr keeps stdout clean for piping)
    let report = &replay.report;
    for skipped in &report.skipped {
        eprintln!(
            "{} step {} skipped: {}",
            "!".yellow(),
            util::short_id(&skipped.id).yellow(),
            skipped.reason
        );
    }
    if report.halted {
        eprintln!(
            "{} Interrupted: kept {} of {} snapshot(s)",
            "!".yellow(),
            replay.snapshots.len(),
            total
        );
    }
    eprintln!(
        "{} {} snapshot(s), {} tick(s), {} warning(s) {}",
        "✓".green(),
        replay.snapshots.len(),
        report.total_ticks(),
        report.warning_count(),
        format!("[timeline {}]", timeline_id).dimmed()
    );
    if let Some(path) = &args.output {
        let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        eprintln!(
            "  {} {}",
            path.display().to_string().cyan(),
            format!("({})", util::format_size(size)).dimmed()
        );
    }

    Ok(())
}
