//! form-vote CLI — load a vote file and submit the form once.

pub mod commands;
pub mod config;
pub mod output;

pub use config::{load_config, load_resolved, resolve_config_path, EnvOverrides, VoteConfig};
