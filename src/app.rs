//! app
//!
//! Public entry point: register commands on an [`AppBuilder`], build an
//! [`App`], run it against process arguments.
//!
//! # Example
//!
//! ```
//! use trellis::app::AppBuilder;
//! use trellis::core::console::Console;
//! use trellis::model::{CommandBody, Param, ValueType};
//!
//! let mut builder = AppBuilder::new("greeter");
//! builder.version("1.2.0");
//! builder
//!     .add_leaf(
//!         "hello",
//!         CommandBody::from_fn(|ctx| {
//!             let name: String = ctx.value("name")?;
//!             ctx.out_line(format!("Hello {}!", name));
//!             Ok(())
//!         }),
//!     )
//!     .param(Param::new("name", ValueType::String).default("Alice"));
//! let app = builder.build().unwrap();
//!
//! let (console, captured) = Console::buffered();
//! let code = app.run_with(&["hello".to_string()], &console);
//! assert_eq!(code, 0);
//! assert_eq!(captured.stdout(), "Hello Alice!\n");
//! ```

use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::core::config::schema::AppOptions;
use crate::core::config::ConfigError;
use crate::core::console::Console;
use crate::core::types::{ProgramInfo, TypeError, Version};
use crate::engine::dispatch::{Dispatcher, EXIT_FAILURE};
use crate::engine::pipeline::{CommandFilter, FilterScope};
use crate::engine::services::{ServiceCollection, ServiceResolver};
use crate::model::{
    BuildError, CommandBody, CommandSetBuilder, CommandTree, ForwardTarget, GroupDecl, LeafDecl,
};

/// Errors from building an application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid program version: {0}")]
    InvalidVersion(#[source] TypeError),

    #[error("invalid application options: {0}")]
    InvalidOptions(#[from] ConfigError),

    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Collects program identity, options, services and commands.
pub struct AppBuilder {
    name: String,
    version: Option<String>,
    description: String,
    options: AppOptions,
    services: ServiceCollection,
    resolver: Option<Arc<dyn ServiceResolver>>,
    commands: CommandSetBuilder,
}

impl AppBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            description: String::new(),
            options: AppOptions::default(),
            services: ServiceCollection::new(),
            resolver: None,
            commands: CommandSetBuilder::new(FilterScope::Application),
        }
    }

    /// Version shown by `--version`. Validated on [`AppBuilder::build`].
    pub fn version(&mut self, version: impl Into<String>) -> &mut Self {
        self.version = Some(version.into());
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = description.into();
        self
    }

    pub fn options(&mut self, options: AppOptions) -> &mut Self {
        self.options = options;
        self
    }

    pub fn options_mut(&mut self) -> &mut AppOptions {
        &mut self.options
    }

    /// The built-in service collection.
    pub fn services_mut(&mut self) -> &mut ServiceCollection {
        &mut self.services
    }

    /// Resolve services through `resolver` instead of the built-in collection.
    pub fn service_resolver(&mut self, resolver: impl ServiceResolver + 'static) -> &mut Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Register an application-scope filter. See [`CommandSetBuilder::use_filter`].
    pub fn use_filter(&mut self, filter: impl CommandFilter + 'static) -> &mut Self {
        self.commands.use_filter(filter);
        self
    }

    pub fn add_leaf(&mut self, name: impl Into<String>, body: CommandBody) -> &mut LeafDecl {
        self.commands.add_leaf(name, body)
    }

    pub fn add_forwarded_leaf(
        &mut self,
        name: impl Into<String>,
        target: ForwardTarget,
    ) -> &mut LeafDecl {
        self.commands.add_forwarded_leaf(name, target)
    }

    pub fn add_group(
        &mut self,
        name: impl Into<String>,
        configure: impl FnOnce(&mut CommandSetBuilder),
    ) -> &mut GroupDecl {
        self.commands.add_group(name, configure)
    }

    pub fn set_default_leaf(&mut self, name: impl Into<String>) -> &mut Self {
        self.commands.set_default_leaf(name);
        self
    }

    /// Validate everything and freeze the command tree.
    ///
    /// # Errors
    ///
    /// - `InvalidVersion` if the version is not `MAJOR.MINOR.PATCH`
    /// - `InvalidOptions` if the options fail validation
    /// - `Build` for any command tree error
    pub fn build(self) -> Result<App, AppError> {
        let version = match self.version {
            Some(version) => Version::new(version).map_err(AppError::InvalidVersion)?,
            None => Version::default(),
        };
        self.options.validate()?;

        let program = ProgramInfo {
            name: self.name,
            version,
            description: self.description,
        };
        let tree = self
            .commands
            .build_tree(program, self.options.command_name_case)?;

        let services: Arc<dyn ServiceResolver> = match self.resolver {
            Some(resolver) => resolver,
            None => Arc::new(self.services),
        };

        Ok(App {
            tree,
            options: self.options,
            services,
        })
    }
}

/// A built application.
pub struct App {
    tree: CommandTree,
    options: AppOptions,
    services: Arc<dyn ServiceResolver>,
}

impl App {
    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    pub fn options(&self) -> &AppOptions {
        &self.options
    }

    fn dispatcher<'a>(&'a self, console: &'a Console, handle_interrupts: bool) -> Dispatcher<'a> {
        Dispatcher {
            tree: &self.tree,
            options: &self.options,
            services: self.services.as_ref(),
            console,
            handle_interrupts,
        }
    }

    /// Run against the process arguments and standard streams, cancelling
    /// the command on Ctrl-C. Returns the exit code.
    pub fn run(&self) -> i32 {
        let args: Vec<String> = std::env::args_os()
            .skip(1)
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        let console = Console::stdio();

        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                console.err_line(format!("Error: failed to start async runtime: {}", e));
                return EXIT_FAILURE;
            }
        };

        runtime.block_on(
            self.dispatcher(&console, true)
                .dispatch(&args, CancellationToken::new()),
        )
    }

    /// Run `args` (program name excluded) against `console` on a private
    /// runtime. Must not be called from within an async context.
    pub fn run_with(&self, args: &[String], console: &Console) -> i32 {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                console.err_line(format!("Error: failed to start async runtime: {}", e));
                return EXIT_FAILURE;
            }
        };
        runtime.block_on(self.run_async(args, console))
    }

    /// Run on the caller's runtime.
    pub async fn run_async(&self, args: &[String], console: &Console) -> i32 {
        self.run_with_cancellation(args, console, CancellationToken::new())
            .await
    }

    /// Run on the caller's runtime; cancelling `token` requests the
    /// command to stop. Interrupt signals are left to the host.
    pub async fn run_with_cancellation(
        &self,
        args: &[String],
        console: &Console,
        token: CancellationToken,
    ) -> i32 {
        self.dispatcher(console, false).dispatch(args, token).await
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("program", self.tree.program())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
