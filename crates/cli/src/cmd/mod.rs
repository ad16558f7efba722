//! CLI command implementations

pub mod install;
pub mod list;
pub mod run;
pub mod sample_config;
pub mod validate_config;
