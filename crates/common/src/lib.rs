//! Shared building blocks used by every crate in the workspace:
//! logging setup, runtime directory checks and small response types.

pub mod types;
pub mod utils;
pub mod env;
