//! Schema module - Configuration, schedule and encoding types for evolution runs.

mod config;
mod encoding;
mod schedule;

pub use config::*;
pub use encoding::*;
pub use schedule::*;
