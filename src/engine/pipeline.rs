//! engine::pipeline
//!
//! Filter composition around a command body.
//!
//! # Nesting order
//!
//! Outermost to innermost:
//!
//! ```text
//! Application filters        (registration order, first = outermost)
//!   Group filters            (outer ancestor before inner descendant)
//!     Leaf declared filters
//!       Invocation filters   (registration order)
//!         [forward target's declared + invocation filters]
//!           body
//! ```
//!
//! Order depends only on scope and registration sequence. A filter
//! registered on a scope wraps only the commands registered after it.
//!
//! # Failure semantics
//!
//! An `Err` returned inside any layer propagates outward through the
//! layers already entered; it is only turned into an exit code by the
//! dispatcher.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::context::InvocationContext;
use super::resolver::ScopeStep;
use crate::model::{CommandBody, LeafAction, LeafNode};

/// Where a filter was registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterScope {
    Application,
    Group,
    Leaf,
    Invocation,
}

/// An interception layer around command execution.
///
/// A filter may run logic before and after calling `next`, or return
/// without calling it to short-circuit the command.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use trellis::engine::context::InvocationContext;
/// use trellis::engine::pipeline::{CommandFilter, Next};
///
/// struct Timing;
///
/// #[async_trait]
/// impl CommandFilter for Timing {
///     async fn on_invoke(&self, ctx: &InvocationContext, next: Next<'_>) -> anyhow::Result<i32> {
///         let started = std::time::Instant::now();
///         let code = next.run(ctx).await;
///         tracing::info!(elapsed = ?started.elapsed(), "command finished");
///         code
///     }
/// }
/// ```
#[async_trait]
pub trait CommandFilter: Send + Sync {
    async fn on_invoke(&self, ctx: &InvocationContext, next: Next<'_>) -> anyhow::Result<i32>;

    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A registered filter.
#[derive(Clone)]
pub struct FilterDescriptor {
    name: String,
    scope: FilterScope,
    handler: Arc<dyn CommandFilter>,
}

impl FilterDescriptor {
    pub fn new(scope: FilterScope, filter: impl CommandFilter + 'static) -> Self {
        Self {
            name: filter.name().to_string(),
            scope,
            handler: Arc::new(filter),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> FilterScope {
        self.scope
    }
}

impl fmt::Debug for FilterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterDescriptor")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .finish()
    }
}

/// The remainder of the chain below a filter.
pub struct Next<'a> {
    layers: &'a [FilterDescriptor],
    body: &'a CommandBody,
}

impl<'a> Next<'a> {
    /// Run the remaining layers and the body.
    pub async fn run(self, ctx: &InvocationContext) -> anyhow::Result<i32> {
        match self.layers.split_first() {
            Some((layer, rest)) => {
                tracing::debug!(filter = %layer.name, scope = ?layer.scope, "entering filter");
                let next = Next {
                    layers: rest,
                    body: self.body,
                };
                layer.handler.on_invoke(ctx, next).await
            }
            None => self.body.call(ctx.clone()).await,
        }
    }
}

/// A composed chain for one invocation.
#[derive(Debug)]
pub struct Pipeline {
    layers: Vec<FilterDescriptor>,
    body: CommandBody,
}

impl Pipeline {
    /// Compose the filters that apply to `leaf`, reached through `trail`.
    ///
    /// Returns `None` for leaves bound to a built-in action.
    pub fn compose(trail: &[ScopeStep<'_>], leaf: &LeafNode) -> Option<Self> {
        let (body, target_filters) = match leaf.action() {
            LeafAction::Invoke(invocable) => (invocable.body.clone(), None),
            LeafAction::Forward(forwarded) => (
                forwarded.invocable.body.clone(),
                Some(&forwarded.target_filters),
            ),
            LeafAction::BuiltIn(_) => return None,
        };

        let mut layers: Vec<FilterDescriptor> = trail
            .iter()
            .flat_map(|step| step.visible_filters().iter().cloned())
            .collect();
        layers.extend(leaf.filters().declared.iter().cloned());
        layers.extend(leaf.filters().invocation.iter().cloned());
        if let Some(target) = target_filters {
            layers.extend(target.declared.iter().cloned());
            layers.extend(target.invocation.iter().cloned());
        }

        tracing::debug!(
            leaf = %leaf.name(),
            layers = ?layers.iter().map(FilterDescriptor::name).collect::<Vec<_>>(),
            "pipeline composed"
        );
        Some(Self { layers, body })
    }

    pub fn layers(&self) -> &[FilterDescriptor] {
        &self.layers
    }

    /// Run the chain from the outermost layer.
    pub async fn invoke(&self, ctx: &InvocationContext) -> anyhow::Result<i32> {
        Next {
            layers: &self.layers,
            body: &self.body,
        }
        .run(ctx)
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::core::console::Console;
    use crate::core::types::ProgramInfo;
    use crate::engine::binder::BoundArguments;

    #[derive(Clone, Default)]
    struct Log(Arc<Mutex<Vec<String>>>);

    impl Log {
        fn push(&self, entry: String) {
            self.0.lock().unwrap().push(entry);
        }

        fn entries(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    struct Recorder {
        name: &'static str,
        log: Log,
        short_circuit: bool,
    }

    #[async_trait]
    impl CommandFilter for Recorder {
        async fn on_invoke(&self, ctx: &InvocationContext, next: Next<'_>) -> anyhow::Result<i32> {
            self.log.push(format!("Begin {}", self.name));
            if self.short_circuit {
                return Ok(42);
            }
            let result = next.run(ctx).await;
            self.log.push(format!("End {}", self.name));
            result
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    fn context() -> InvocationContext {
        let (console, _) = Console::buffered();
        InvocationContext::new(
            ProgramInfo::new("prog"),
            vec!["test".into()],
            BoundArguments::default(),
            console,
            CancellationToken::new(),
        )
    }

    fn layer(name: &'static str, log: &Log, short_circuit: bool) -> FilterDescriptor {
        FilterDescriptor::new(
            FilterScope::Application,
            Recorder {
                name,
                log: log.clone(),
                short_circuit,
            },
        )
    }

    fn pipeline(layers: Vec<FilterDescriptor>, log: &Log) -> Pipeline {
        let body_log = log.clone();
        Pipeline {
            layers,
            body: CommandBody::from_fn(move |_| {
                body_log.push("Body".into());
                Ok(7)
            }),
        }
    }

    #[tokio::test]
    async fn first_layer_is_outermost() {
        let log = Log::default();
        let chain = pipeline(vec![layer("A", &log, false), layer("B", &log, false)], &log);

        let code = chain.invoke(&context()).await.unwrap();

        assert_eq!(code, 7);
        assert_eq!(
            log.entries(),
            vec!["Begin A", "Begin B", "Body", "End B", "End A"]
        );
    }

    #[tokio::test]
    async fn short_circuit_skips_inner_layers() {
        let log = Log::default();
        let chain = pipeline(vec![layer("A", &log, false), layer("B", &log, true)], &log);

        let code = chain.invoke(&context()).await.unwrap();

        assert_eq!(code, 42);
        assert_eq!(log.entries(), vec!["Begin A", "Begin B", "End A"]);
    }

    #[tokio::test]
    async fn errors_unwind_through_entered_layers() {
        let log = Log::default();
        let chain = Pipeline {
            layers: vec![layer("A", &log, false)],
            body: CommandBody::from_fn(|_| -> anyhow::Result<()> { anyhow::bail!("boom") }),
        };

        let err = chain.invoke(&context()).await.unwrap_err();

        assert_eq!(err.to_string(), "boom");
        assert_eq!(log.entries(), vec!["Begin A", "End A"]);
    }
}
