//! `scape build` end to end

use crate::common::fixtures::{history_with_bad_step, history_with_statusless_step, rename_history};
use crate::common::TestTimeline;
use crate::scape;
use anyhow::Result;
use serde_json::Value;

#[test]
fn test_build_writes_positioned_snapshots() -> Result<()> {
    let t = TestTimeline::new()?;
    let input = t.write("timeline.json", &rename_history())?;
    let out = t.path().join("out.json").display().to_string();
    let config = t.config_path();

    let result = scape!(
        t.path(),
        "--config", &config, "build", &input, "-o", &out, "--frames", "20", "--quiet"
    )
    .assert_success()?;
    assert!(result.contains_stderr("3 snapshot(s)"));

    let snapshots: Value = serde_json::from_str(&std::fs::read_to_string(&out)?)?;
    let snapshots = snapshots.as_array().expect("array of snapshots");
    assert_eq!(snapshots.len(), 3);

    let last = &snapshots[2];
    assert_eq!(last["id"], "c3");
    let b = last["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["id"] == "src/b.ts")
        .expect("renamed file present");
    assert_eq!(b["fileStatus"], "moved");
    assert_eq!(b["previousPath"], "src/a.ts");
    assert_eq!(b["size"], 110);
    assert!(b["x"].is_f64() && b["y"].is_f64() && b["z"].is_f64());

    Ok(())
}

#[test]
fn test_build_to_stdout_is_pure_json() -> Result<()> {
    let t = TestTimeline::new()?;
    let input = t.write("timeline.json", &rename_history())?;
    let config = t.config_path();

    let result = scape!(
        t.path(),
        "--config", &config, "build", &input, "--frames", "5", "-q"
    )
    .assert_success()?;
    let json = result.json()?;
    assert_eq!(json.as_array().map(Vec::len), Some(3));

    Ok(())
}

#[test]
fn test_build_skips_invalid_step() -> Result<()> {
    let t = TestTimeline::new()?;
    let input = t.write("timeline.json", &history_with_bad_step())?;
    let config = t.config_path();

    let result = scape!(
        t.path(),
        "--config", &config, "build", &input, "--frames", "5", "-q", "--skip-invalid"
    )
    .assert_success()?;

    assert!(result.contains_stderr("skipped"));
    assert_eq!(result.json()?.as_array().map(Vec::len), Some(3));

    Ok(())
}

#[test]
fn test_build_skips_step_without_status() -> Result<()> {
    let t = TestTimeline::new()?;
    let input = t.write("timeline.json", &history_with_statusless_step())?;
    let config = t.config_path();

    let result = scape!(
        t.path(),
        "--config", &config, "build", &input, "--frames", "5", "-q", "--skip-invalid"
    )
    .assert_success()?;

    assert!(result.contains_stderr("nostatus"));
    assert!(result.contains_stderr("missing or unknown status"));

    let json = result.json()?;
    let snapshots = json.as_array().expect("array of snapshots");
    assert_eq!(snapshots.len(), 3);
    assert!(snapshots
        .iter()
        .all(|s| s["nodes"].as_array().unwrap().iter().all(|n| n["id"] != "src/c.ts")));

    Ok(())
}

#[test]
fn test_build_aborts_on_invalid_step() -> Result<()> {
    let t = TestTimeline::new()?;
    let input = t.write("timeline.json", &history_with_bad_step())?;
    let config = t.config_path();

    let result = scape!(
        t.path(),
        "--config", &config, "build", &input, "--frames", "5", "-q", "--abort-invalid"
    )
    .assert_failure()?;
    assert!(result.contains_stderr("step bad"));

    Ok(())
}

#[test]
fn test_build_missing_input_fails() -> Result<()> {
    let t = TestTimeline::new()?;
    let config = t.config_path();

    let result = scape!(t.path(), "--config", &config, "build", "nope.json").assert_failure()?;
    assert!(result.contains_stderr("Failed to read timeline"));

    Ok(())
}

#[test]
fn test_conflicting_policy_flags_rejected() -> Result<()> {
    let t = TestTimeline::new()?;
    let input = t.write("timeline.json", &rename_history())?;

    scape!(t.path(), "build", &input, "--skip-invalid", "--abort-invalid").assert_failure()?;

    Ok(())
}
