//! engine
//!
//! Turns raw arguments into an invocation of a command body.
//!
//! # Lifecycle
//!
//! ```text
//! Resolve -> Tokenize -> Bind -> Compose filters -> Invoke
//! ```
//!
//! - [`resolver`] walks the command tree along leading command tokens
//! - [`crate::parse`] splits the remaining tokens against the command's options
//! - [`binder`] converts raw values and resolves services
//! - [`pipeline`] wraps the body in the filters in scope
//! - [`dispatch`] drives all of the above and maps outcomes to exit codes
//!
//! # Invariants
//!
//! - A command body never runs when binding reported an error
//! - Every filter in scope runs before the body, outermost first
//! - Faults inside the pipeline never escape the dispatcher; they become exit code 1

pub mod binder;
pub mod builtin;
pub mod context;
pub mod convert;
pub mod dispatch;
pub mod pipeline;
pub mod resolver;
pub mod services;

pub use binder::{bind, BindError, BoundArguments};
pub use builtin::BuiltInOptions;
pub use context::InvocationContext;
pub use dispatch::{Dispatcher, EXIT_FAILURE, EXIT_SUCCESS, EXIT_USAGE};
pub use pipeline::{CommandFilter, FilterDescriptor, FilterScope, Next, Pipeline};
pub use resolver::{Resolution, ResolveError, Resolver, ScopeStep};
pub use services::{ServiceCollection, ServiceError, ServiceKey, ServiceRef, ServiceResolver};
