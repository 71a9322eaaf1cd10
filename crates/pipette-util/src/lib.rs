//! Shared utilities for pipette.
//!
//! This crate provides cross-cutting concerns used by all other pipette crates:
//! the error taxonomy, filesystem helpers, SHA-256 hashing, process spawning,
//! and terminal status output.

pub mod errors;
pub mod fs;
pub mod hash;
pub mod process;
pub mod progress;

pub use fs::dirs_path;
