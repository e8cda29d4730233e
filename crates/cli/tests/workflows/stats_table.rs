//! `scape stats` end to end

use crate::common::fixtures::{history_with_bad_step, rename_history};
use crate::common::TestTimeline;
use crate::scape;
use anyhow::Result;

#[test]
fn test_stats_lists_every_step() -> Result<()> {
    let t = TestTimeline::new()?;
    let input = t.write("timeline.json", &rename_history())?;
    let config = t.config_path();

    let result = scape!(t.path(), "--config", &config, "stats", &input).assert_success()?;

    assert!(result.contains_stdout("Timeline Statistics"));
    for id in ["c1", "c2", "c3"] {
        assert!(result.contains_stdout(id), "missing row for {}", id);
    }
    assert!(result.contains_stdout("rename a to b"));

    Ok(())
}

#[test]
fn test_stats_marks_skipped_step() -> Result<()> {
    let t = TestTimeline::new()?;
    let input = t.write("timeline.json", &history_with_bad_step())?;
    let config = t.config_path();

    let result = scape!(t.path(), "--config", &config, "stats", &input).assert_success()?;
    assert!(result.contains_stdout("skipped: record 0: parent traversal"));

    Ok(())
}
