//! engine::context
//!
//! The per-invocation context handed to filters and command bodies.
//!
//! A context is cheap to clone and immutable apart from its cancellation
//! token, which the dispatcher cancels on an external interrupt. Bodies are
//! expected to observe it and return cooperatively.

use std::any::Any;
use std::fmt::Display;
use std::sync::Arc;

use anyhow::anyhow;
use tokio_util::sync::CancellationToken;

use super::binder::BoundArguments;
use crate::core::console::Console;
use crate::core::types::ProgramInfo;
use crate::model::FromValue;

#[derive(Debug)]
struct ContextInner {
    program: ProgramInfo,
    command_path: Vec<String>,
    arguments: BoundArguments,
    console: Console,
    cancellation: CancellationToken,
}

/// Context of one command invocation.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    inner: Arc<ContextInner>,
}

impl InvocationContext {
    pub(crate) fn new(
        program: ProgramInfo,
        command_path: Vec<String>,
        arguments: BoundArguments,
        console: Console,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                program,
                command_path,
                arguments,
                console,
                cancellation,
            }),
        }
    }

    pub fn program(&self) -> &ProgramInfo {
        &self.inner.program
    }

    /// Names from the root to the running command.
    pub fn command_path(&self) -> &[String] {
        &self.inner.command_path
    }

    /// Name of the running command.
    pub fn command_name(&self) -> &str {
        self.inner
            .command_path
            .last()
            .map(String::as_str)
            .unwrap_or(&self.inner.program.name)
    }

    pub fn arguments(&self) -> &BoundArguments {
        &self.inner.arguments
    }

    /// Bound value of a parameter, `None` when absent or of another shape.
    pub fn get<T: FromValue>(&self, member: &str) -> Option<T> {
        self.inner.arguments.get(member)
    }

    /// Bound value of a parameter that the command requires.
    ///
    /// # Errors
    ///
    /// Fails when the parameter was not bound or has another shape.
    pub fn value<T: FromValue>(&self, member: &str) -> anyhow::Result<T> {
        self.get(member).ok_or_else(|| {
            anyhow!(
                "parameter '{}' is not bound as {}",
                member,
                std::any::type_name::<T>()
            )
        })
    }

    /// Resolved service parameter.
    ///
    /// # Errors
    ///
    /// Fails when `member` is not a service parameter of type `T`.
    pub fn service<T: Any + Send + Sync>(&self, member: &str) -> anyhow::Result<Arc<T>> {
        self.inner.arguments.service::<T>(member).ok_or_else(|| {
            anyhow!(
                "service parameter '{}' is not bound as {}",
                member,
                std::any::type_name::<T>()
            )
        })
    }

    pub fn console(&self) -> &Console {
        &self.inner.console
    }

    /// Write a line to the standard sink.
    pub fn out_line(&self, message: impl Display) {
        self.inner.console.out_line(message);
    }

    /// Write a line to the error sink.
    pub fn err_line(&self, message: impl Display) {
        self.inner.console.err_line(message);
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.inner.cancellation
    }

    pub fn is_cancellation_requested(&self) -> bool {
        self.inner.cancellation.is_cancelled()
    }

    /// Completes once cancellation is requested.
    pub async fn cancelled(&self) {
        self.inner.cancellation.cancelled().await;
    }
}
