//! Schema module - Configuration types for evolution runs.

mod config;

pub use config::*;
