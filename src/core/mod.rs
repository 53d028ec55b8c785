//! core
//!
//! Foundational types shared by every layer of the engine.
//!
//! # Modules
//!
//! - [`types`] - Strong types: CommandName, Version, ProgramInfo
//! - [`naming`] - Kebab-case conversion and near-miss suggestions
//! - [`config`] - Application options schema and loading
//! - [`console`] - Standard/error output sinks
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid names at build time
//! - Output sinks are explicit values, never process-global state

pub mod config;
pub mod console;
pub mod naming;
pub mod types;
