//! Core types for the pipette package installer.
//!
//! This crate holds the parsing and evaluation logic the resolver is built
//! on: version comparison, requirement specifiers, environment markers and
//! package metadata, along with the traits through which the resolver talks
//! to a package index and a package store, and user configuration.
//!
//! This crate performs no network I/O.

pub mod condition;
pub mod config;
pub mod dependency;
pub mod environment;
pub mod marker;
pub mod metadata;
pub mod source;
pub mod version;
