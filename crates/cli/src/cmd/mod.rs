//! Command implementations

pub mod build;
pub mod config;
pub mod stats;
