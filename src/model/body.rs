//! model::body
//!
//! The executable body of a command.
//!
//! Every command, whatever its origin (a registered closure, an async
//! function, a forwarded target), is represented by one [`CommandBody`]:
//! a shareable function from an [`InvocationContext`] to a future that
//! yields the command's exit code or a fault.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::engine::context::InvocationContext;

/// Future returned by a command body.
pub type BodyFuture = BoxFuture<'static, anyhow::Result<i32>>;

/// Conversion of a body's return value into a process exit code.
///
/// `()` maps to `0`; integers are passed through unmodified.
pub trait IntoExitCode {
    fn into_exit_code(self) -> i32;
}

impl IntoExitCode for () {
    fn into_exit_code(self) -> i32 {
        0
    }
}

impl IntoExitCode for i32 {
    fn into_exit_code(self) -> i32 {
        self
    }
}

/// A command body.
#[derive(Clone)]
pub struct CommandBody(Arc<dyn Fn(InvocationContext) -> BodyFuture + Send + Sync>);

impl CommandBody {
    /// Body from an async function.
    ///
    /// # Example
    ///
    /// ```
    /// use trellis::model::CommandBody;
    ///
    /// let body = CommandBody::from_async(|ctx| async move {
    ///     while !ctx.is_cancellation_requested() {
    ///         tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    ///     }
    ///     Ok(127)
    /// });
    /// # let _ = body;
    /// ```
    pub fn from_async<F, Fut, R>(f: F) -> Self
    where
        F: Fn(InvocationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
        R: IntoExitCode,
    {
        Self(Arc::new(move |ctx: InvocationContext| -> BodyFuture {
            let fut = f(ctx);
            Box::pin(async move { fut.await.map(IntoExitCode::into_exit_code) })
        }))
    }

    /// Body from a synchronous function.
    pub fn from_fn<F, R>(f: F) -> Self
    where
        F: Fn(&InvocationContext) -> anyhow::Result<R> + Send + Sync + 'static,
        R: IntoExitCode,
    {
        let f = Arc::new(f);
        Self(Arc::new(move |ctx: InvocationContext| -> BodyFuture {
            let f = Arc::clone(&f);
            Box::pin(async move { (*f)(&ctx).map(IntoExitCode::into_exit_code) })
        }))
    }

    /// Start the body for one invocation.
    pub fn call(&self, ctx: InvocationContext) -> BodyFuture {
        (*self.0)(ctx)
    }
}

impl fmt::Debug for CommandBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CommandBody")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_maps_to_zero() {
        assert_eq!(().into_exit_code(), 0);
    }

    #[test]
    fn integers_pass_through() {
        assert_eq!(128.into_exit_code(), 128);
        assert_eq!((-3).into_exit_code(), -3);
        assert_eq!(i32::MAX.into_exit_code(), i32::MAX);
    }
}
