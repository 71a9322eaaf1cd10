//! High-level operations wiring CLI commands to the resolver, the index
//! client and the package store.

pub mod context;
pub mod ops_check;
pub mod ops_env;
pub mod ops_freeze;
pub mod ops_install;
pub mod ops_show;
pub mod ops_uninstall;

pub use context::{Context, ContextOptions};
