//! engine::dispatch
//!
//! The dispatcher: the single entry point from raw arguments to exit code.
//!
//! # Lifecycle
//!
//! ```text
//! args -> [completion request?] -> Resolve -> Tokenize -> [--help/--version?]
//!      -> Bind -> Compose pipeline -> Run body -> exit code
//! ```
//!
//! # Exit codes
//!
//! | Outcome                                 | Code      |
//! |-----------------------------------------|-----------|
//! | body returns unit                       | 0         |
//! | body returns an integer                 | that value|
//! | help, usage, group index                | 129       |
//! | `--version`                             | 0         |
//! | unknown command, syntax, binding errors | 1         |
//! | fault escaping the pipeline             | 1         |

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use super::binder::bind;
use super::builtin::BuiltInOptions;
use super::context::InvocationContext;
use super::pipeline::Pipeline;
use super::resolver::{ResolvedGroup, ResolvedLeaf, Resolution, Resolver};
use super::services::ServiceResolver;
use crate::completion::{self, CompletionRequest};
use crate::core::config::schema::AppOptions;
use crate::core::console::Console;
use crate::help;
use crate::model::{BuiltInAction, CommandTree, LeafAction};
use crate::parse::{tokenize, OptionTable};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
/// Help, usage and index output.
pub const EXIT_USAGE: i32 = 129;

/// Runs one invocation against a built tree.
pub struct Dispatcher<'a> {
    pub tree: &'a CommandTree,
    pub options: &'a AppOptions,
    pub services: &'a dyn ServiceResolver,
    pub console: &'a Console,
    /// Cancel the invocation on Ctrl-C.
    pub handle_interrupts: bool,
}

impl Dispatcher<'_> {
    /// Dispatch `args` (program name excluded) and return the exit code.
    pub async fn dispatch(&self, args: &[String], cancellation: CancellationToken) -> i32 {
        let code = self.dispatch_inner(args, cancellation).await;
        self.console.flush();
        tracing::debug!(code, "dispatch finished");
        code
    }

    async fn dispatch_inner(&self, args: &[String], cancellation: CancellationToken) -> i32 {
        if self.options.enable_shell_completion {
            if let Some(request) = CompletionRequest::parse(args) {
                return match request {
                    Ok(request) => self.complete(request),
                    Err(e) => self.error(e),
                };
            }
        }

        let resolver = Resolver::new(self.tree, self.options);
        match resolver.resolve(args) {
            Err(e) => {
                self.console.err_text(&help::render_unknown_command(&e));
                EXIT_FAILURE
            }
            Ok(Resolution::Group(group)) => {
                let rest = &args[group.consumed..];
                self.group(&group, rest)
            }
            Ok(Resolution::Leaf(leaf)) => {
                let rest = &args[leaf.consumed..];
                self.leaf(&leaf, rest, cancellation).await
            }
        }
    }

    fn error(&self, message: impl std::fmt::Display) -> i32 {
        self.console.err_line(format!("Error: {}", message));
        EXIT_FAILURE
    }

    fn version(&self) -> i32 {
        self.console.out_line(help::render_version(self.tree.program()));
        EXIT_SUCCESS
    }

    fn group(&self, resolved: &ResolvedGroup<'_>, rest: &[String]) -> i32 {
        let builtins = BuiltInOptions::for_group(self.options, resolved.at_root());
        let mut table = OptionTable::new();
        builtins.extend(&mut table);

        let parsed = match tokenize(rest, &table) {
            Ok(parsed) => parsed,
            Err(e) => return self.error(e),
        };

        if !builtins.help_requested(&parsed) {
            if builtins.version_requested(&parsed) {
                return self.version();
            }
            if let Some(unknown) = parsed.unknown_options().first() {
                return self.error(format!("Unknown option '{}'.", unknown.name));
            }
        }

        self.console.out_text(&help::render_index(
            self.tree.program(),
            resolved.group,
            &resolved.path,
            &builtins,
        ));
        EXIT_USAGE
    }

    async fn leaf(
        &self,
        resolved: &ResolvedLeaf<'_>,
        rest: &[String],
        cancellation: CancellationToken,
    ) -> i32 {
        let program = self.tree.program();

        match resolved.leaf.action() {
            LeafAction::BuiltIn(BuiltInAction::ShowHelp) => {
                let group_path = if resolved.implicit {
                    &resolved.path[..]
                } else {
                    &resolved.path[..resolved.path.len().saturating_sub(1)]
                };
                let builtins = BuiltInOptions::for_group(self.options, group_path.is_empty());
                self.console.out_text(&help::render_index(
                    program,
                    resolved.parent,
                    group_path,
                    &builtins,
                ));
                return EXIT_USAGE;
            }
            LeafAction::BuiltIn(BuiltInAction::ShowVersion) => return self.version(),
            LeafAction::Invoke(_) | LeafAction::Forward(_) => {}
        }

        let Some(parameters) = resolved.leaf.parameters() else {
            return self.error(format!("'{}' has nothing to run.", resolved.leaf.name()));
        };

        let builtins = BuiltInOptions::for_leaf(self.options, parameters, resolved.at_root());
        let mut table = OptionTable::from_parameters(parameters);
        builtins.extend(&mut table);

        let parsed = match tokenize(rest, &table) {
            Ok(parsed) => parsed,
            Err(e) => return self.error(e),
        };

        if builtins.help_requested(&parsed) {
            self.console.out_text(&help::render_command(
                program,
                &resolved.path,
                resolved.leaf,
                parameters,
                &builtins,
            ));
            return EXIT_USAGE;
        }
        if builtins.version_requested(&parsed) {
            return self.version();
        }

        let bound = match bind(parameters, &parsed, self.services).await {
            Ok(bound) => bound,
            Err(errors) => {
                for e in &errors {
                    self.console.err_line(format!("Error: {}", e));
                }
                return EXIT_FAILURE;
            }
        };

        let Some(pipeline) = Pipeline::compose(&resolved.trail, resolved.leaf) else {
            return self.error(format!("'{}' has nothing to run.", resolved.leaf.name()));
        };

        let command_path = resolved.command_path();
        let ctx = InvocationContext::new(
            program.clone(),
            command_path.clone(),
            bound,
            self.console.clone(),
            cancellation,
        );

        match self.run(&pipeline, &ctx).await {
            Ok(Ok(code)) => code,
            Ok(Err(fault)) => {
                self.console
                    .err_text(&help::render_fault(program, &command_path, &fault));
                EXIT_FAILURE
            }
            Err(payload) => {
                let fault = anyhow::anyhow!("panic: {}", panic_message(payload.as_ref()));
                self.console
                    .err_text(&help::render_fault(program, &command_path, &fault));
                EXIT_FAILURE
            }
        }
    }

    async fn run(
        &self,
        pipeline: &Pipeline,
        ctx: &InvocationContext,
    ) -> Result<anyhow::Result<i32>, Box<dyn Any + Send>> {
        let body = AssertUnwindSafe(pipeline.invoke(ctx)).catch_unwind();
        if !self.handle_interrupts {
            return body.await;
        }

        tokio::pin!(body);
        tokio::select! {
            outcome = &mut body => outcome,
            () = interrupted() => {
                tracing::debug!("interrupt received, waiting for the command to return");
                ctx.cancellation_token().cancel();
                body.await
            }
        }
    }

    fn complete(&self, request: CompletionRequest) -> i32 {
        match request {
            CompletionRequest::Script { shell } => {
                self.console
                    .out_text(&completion::scripts::render(shell, &self.tree.program().name));
                EXIT_SUCCESS
            }
            CompletionRequest::Candidates {
                shell,
                parameter,
                words,
            } => {
                let resolver = Resolver::new(self.tree, self.options);
                match completion::collect(&resolver, self.options, shell, &parameter, &words) {
                    Ok(candidates) => {
                        self.console
                            .out_text(&completion::format_candidates(shell, &candidates));
                        EXIT_SUCCESS
                    }
                    Err(e) => self.error(e),
                }
            }
        }
    }
}

async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::debug!(error = %e, "interrupt handler unavailable");
        std::future::pending::<()>().await;
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
