//! Builders
//!
//! Fluent builder patterns for FTD configuration.

pub mod config;

pub use config::{ftd_config, FtdConfigBuilder};
