//! Workflow integration tests
//!
//! Tests that run complete commands and validate their output.

pub mod build_output;
pub mod config_file;
pub mod stats_table;
