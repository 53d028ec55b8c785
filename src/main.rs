//! trellis-demo
//!
//! A small command tree on top of the library, run against the real process
//! arguments. Logs go to stderr, filtered by `TRELLIS_LOG` (default `warn`).
//! `TRELLIS_DEMO_CONFIG` may point at a TOML file of application options.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing_subscriber::EnvFilter;

use trellis::completion::{Candidate, CandidatesMetadata};
use trellis::core::config::schema::AppOptions;
use trellis::engine::{CommandFilter, InvocationContext, Next};
use trellis::model::{CommandBody, ForwardTarget, Param, ValueType};
use trellis::parse::ParsedCommandLine;
use trellis::{App, AppBuilder};

/// Application-scope filter tracing every invocation.
struct Trace;

#[async_trait]
impl CommandFilter for Trace {
    async fn on_invoke(&self, ctx: &InvocationContext, next: Next<'_>) -> Result<i32> {
        let command = ctx.command_path().join(" ");
        tracing::info!(%command, "begin");
        let outcome = next.run(ctx).await;
        tracing::info!(%command, ok = outcome.is_ok(), "end");
        outcome
    }

    fn name(&self) -> &str {
        "trace"
    }
}

/// Prints a marker around the wrapped command.
struct Banner(&'static str);

#[async_trait]
impl CommandFilter for Banner {
    async fn on_invoke(&self, ctx: &InvocationContext, next: Next<'_>) -> Result<i32> {
        ctx.out_line(format!("[{}", self.0));
        let outcome = next.run(ctx).await;
        ctx.out_line(format!("{}]", self.0));
        outcome
    }

    fn name(&self) -> &str {
        self.0
    }
}

fn known_names(_: &CandidatesMetadata, _: &ParsedCommandLine) -> Vec<Candidate> {
    vec![
        Candidate::new("Karen", "a friend"),
        Candidate::new("Alice", "the default"),
    ]
}

fn options() -> Result<AppOptions> {
    match std::env::var_os("TRELLIS_DEMO_CONFIG") {
        Some(path) => AppOptions::load(Path::new(&path))
            .with_context(|| format!("loading options from {}", Path::new(&path).display())),
        None => Ok(AppOptions::default()),
    }
}

fn build() -> Result<App> {
    let mut app = AppBuilder::new("trellis-demo");
    app.version(env!("CARGO_PKG_VERSION"))
        .description("Demonstrates the trellis command engine.")
        .options(options()?)
        .use_filter(Trace);
    app.services_mut().add_instance(String::from("greetings.db"));

    app.add_leaf(
        "hello",
        CommandBody::from_fn(|ctx| {
            let name: String = ctx.value("name")?;
            let loud: bool = ctx.value("loud")?;
            let greeting = format!("Hello {}!", name);
            ctx.out_line(if loud { greeting.to_uppercase() } else { greeting });
            Ok(())
        }),
    )
    .description("Greets someone")
    .params([
        Param::new("name", ValueType::String)
            .short('n')
            .default("Alice")
            .description("Who to greet")
            .candidates_from(known_names),
        Param::flag("loud"),
    ]);

    app.add_leaf(
        "konnichiwa",
        CommandBody::from_fn(|ctx| {
            ctx.out_line("Konnichiwa!");
            Ok(())
        }),
    )
    .description("Greets in Japanese")
    .filter(Banner("konnichiwa"));

    app.add_leaf(
        "mood",
        CommandBody::from_fn(|ctx| {
            let mood: String = ctx.value("mood")?;
            ctx.out_line(format!("Feeling {}", mood));
            Ok(())
        }),
    )
    .param(Param::argument(
        "mood",
        ValueType::enumeration("Mood", ["Happy", "Hungry", "Sleepy"]),
    ));

    app.add_leaf(
        "exit-code",
        CommandBody::from_fn(|ctx| {
            ctx.out_line("ExitCode=128");
            Ok(128)
        }),
    )
    .description("Exits with code 128");

    app.add_leaf(
        "fail",
        CommandBody::from_fn(|_| -> Result<()> {
            Err(anyhow::anyhow!("disk unavailable")).context("could not save greeting")
        }),
    )
    .description("Fails with an error");

    app.add_leaf(
        "store",
        CommandBody::from_fn(|ctx| {
            let store = ctx.service::<String>("store")?;
            ctx.out_line(format!("Using {}", store));
            Ok(())
        }),
    )
    .param(Param::service::<String>("store"));

    app.add_leaf(
        "exec",
        CommandBody::from_fn(|ctx| {
            let program: String = ctx.value("run")?;
            let rest: Vec<String> = ctx.value("args")?;
            ctx.out_line(format!("{} {}", program, rest.join(" ")).trim_end());
            Ok(())
        }),
    )
    .description("Echoes a command line verbatim")
    .params([
        Param::option("run", ValueType::String).stop_parsing(),
        Param::argument("args", ValueType::array(ValueType::String)).default(Vec::<String>::new()),
    ]);

    app.add_leaf(
        "long-running",
        CommandBody::from_async(|ctx| async move {
            ctx.out_line("Begin");
            ctx.cancelled().await;
            tokio::time::sleep(Duration::from_millis(10)).await;
            ctx.out_line("Canceled");
            Ok(127)
        }),
    )
    .description("Waits until interrupted");

    app.add_forwarded_leaf("greet", ForwardTarget::command(["hello"]))
        .description("Alias of hello");
    app.add_forwarded_leaf("my-help", ForwardTarget::ShowHelp);

    app.add_group("nested", |nested| {
        nested
            .add_leaf(
                "hello",
                CommandBody::from_fn(|ctx| {
                    let arg0: String = ctx.value("arg0")?;
                    ctx.out_line(format!("Hello {}", arg0));
                    Ok(())
                }),
            )
            .param(Param::argument("arg0", ValueType::String));
        nested.add_leaf(
            "bye",
            CommandBody::from_fn(|ctx| {
                ctx.out_line("Bye!");
                Ok(())
            }),
        );
    })
    .description("Nested commands");

    Ok(app.build()?)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("TRELLIS_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let app = match build() {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    std::process::exit(app.run());
}
