//! Subcommand implementations for the `form-vote` binary.

pub mod preview;
pub mod submit;
pub mod validate;
