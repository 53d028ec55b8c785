//! Trellis - a command-line application engine
//!
//! Trellis builds a command tree from registered commands, parses process
//! arguments against it, binds values into typed parameters, runs a
//! composable filter pipeline around the matched command, and answers shell
//! completion queries.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture, leaves first:
//!
//! - [`core`] - Names, options, console sinks
//! - [`model`] - Command tree, parameter descriptors, builder
//! - [`parse`] - Tokenizer and parsed command line
//! - [`engine`] - Resolver, binder, filter pipeline, dispatcher
//! - [`help`] - Usage, index and version rendering
//! - [`completion`] - Shell scripts and dynamic candidates
//! - [`app`] - Public builder and run entry points
//!
//! # Exit code contract
//!
//! 1. A body returning `()` exits 0; an integer is passed through unmodified
//! 2. Help, usage and group index output exits 129; `--version` exits 0
//! 3. Unknown commands, syntax and binding errors exit 1
//! 4. A fault escaping the pipeline is reported on the error sink and exits 1

pub mod app;
pub mod completion;
pub mod core;
pub mod engine;
pub mod help;
pub mod model;
pub mod parse;

pub use app::{App, AppBuilder, AppError};
