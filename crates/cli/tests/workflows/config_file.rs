//! `scape config` end to end

use crate::common::TestTimeline;
use crate::scape;
use anyhow::Result;
use std::path::Path;

#[test]
fn test_config_init_creates_file() -> Result<()> {
    let t = TestTimeline::new()?;
    let config = t.config_path();

    let result = scape!(t.path(), "--config", &config, "config", "--init").assert_success()?;
    assert!(result.contains_stdout("Created config file"));
    assert!(Path::new(&config).exists());

    let again = scape!(t.path(), "--config", &config, "config", "--init").assert_success()?;
    assert!(again.contains_stdout("already exists"));

    Ok(())
}

#[test]
fn test_config_set_then_get() -> Result<()> {
    let t = TestTimeline::new()?;
    let config = t.config_path();

    scape!(
        t.path(),
        "--config", &config, "config", "--set", "timeline.simulation.damping", "0.5"
    )
    .assert_success()?;

    let result = scape!(
        t.path(),
        "--config", &config, "config", "--get", "timeline.simulation.damping"
    )
    .assert_success()?;
    assert_eq!(result.stdout.trim(), "0.5");

    Ok(())
}

#[test]
fn test_config_rejects_out_of_range_value() -> Result<()> {
    let t = TestTimeline::new()?;
    let config = t.config_path();

    scape!(
        t.path(),
        "--config", &config, "config", "--set", "timeline.simulation.damping", "5"
    )
    .assert_failure()?;
    assert!(!Path::new(&config).exists());

    Ok(())
}

#[test]
fn test_config_list_shows_sections() -> Result<()> {
    let t = TestTimeline::new()?;
    let config = t.config_path();

    let result = scape!(t.path(), "--config", &config, "config", "--list").assert_success()?;
    assert!(result.contains_stdout("[timeline.simulation]"));
    assert!(result.contains_stdout("[timeline.schedule]"));

    Ok(())
}
