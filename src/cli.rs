//! Process entry: builds the environment, resolves argv and executes.

use std::collections::HashMap;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use crate::client::ApiClient;
use crate::command::argv::{LOGLEVEL_OPTION, NO_INTERACTIVE_OPTION, UntypedArgs, parse_typed};
use crate::command::{CommandContext, ParsedOptions};
use crate::commands::IonicNamespace;
use crate::config::ConfigStore;
use crate::environment::{Environment, Project};
use crate::lifecycle::{ExecutionResult, Executor};
use crate::plugins::PluginLoader;
use crate::registry::{ArgvResolver, CommandTree, NodeRef, ResolvedCommand};
use crate::telemetry::{HttpTelemetry, NoopTelemetry, Telemetry};
use crate::{Error, Result, format_fault, logging};

const HELP_OPTION: &str = "help";

/// Runs one invocation of the CLI and returns its exit code.
///
/// `args` excludes the program name. `env` is the process environment.
pub async fn run(args: Vec<String>, env: HashMap<String, String>) -> u8 {
    let untyped = UntypedArgs::parse(&args);
    let level = untyped
        .value_of(LOGLEVEL_OPTION)
        .unwrap_or(logging::DEFAULT_LEVEL)
        .to_string();
    logging::init(&level);

    let environment = match build_environment(&untyped, &env, level).await {
        Ok(environment) => environment,
        Err(e) => return report(ExecutionResult::Fault(e)),
    };

    let tree = CommandTree::new(IonicNamespace);
    let plugins = PluginLoader::for_directories(&environment.cwd, environment.config.directory());

    let code = run_with(&environment, &tree, &plugins, &args).await;

    if let Err(e) = environment.config.save().await {
        tracing::warn!(error = %e, "failed to save config");
    }
    code
}

async fn build_environment(
    untyped: &UntypedArgs,
    env: &HashMap<String, String>,
    level: String,
) -> Result<Environment> {
    let config = Arc::new(ConfigStore::from_env(env));
    let client = ApiClient::new(config.api_url().await?)?;

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let project = Project::load(&cwd).await?;
    let interactive = std::io::stdin().is_terminal() && !untyped.has(NO_INTERACTIVE_OPTION);

    let telemetry: Arc<dyn Telemetry> = if config.telemetry_enabled().await.unwrap_or(false) {
        Arc::new(HttpTelemetry::new(client.clone()))
    } else {
        Arc::new(NoopTelemetry)
    };

    tracing::debug!(
        config = %config.path().display(),
        project = project.as_ref().map(|p| p.name()).unwrap_or("none"),
        interactive,
        "environment ready"
    );

    Ok(Environment::new(config, Arc::new(client))
        .project(project)
        .telemetry(telemetry)
        .interactive(interactive)
        .log_level(level)
        .cwd(cwd))
}

/// Resolves and executes `args` against an existing tree and environment.
pub async fn run_with(
    env: &Environment,
    tree: &CommandTree,
    plugins: &PluginLoader,
    args: &[String],
) -> u8 {
    let result = match prepare(tree, plugins, args).await {
        Ok(invocation) => {
            let cx = CommandContext {
                env,
                tree,
                plugins,
                path: &invocation.command.path,
            };
            Executor::new(&cx)
                .execute(
                    invocation.command.command.as_ref(),
                    invocation.inputs,
                    invocation.options,
                )
                .await
        }
        Err(e) => ExecutionResult::Fault(e),
    };
    report(result)
}

struct Invocation {
    command: ResolvedCommand,
    inputs: Vec<String>,
    options: ParsedOptions,
}

async fn prepare(tree: &CommandTree, plugins: &PluginLoader, args: &[String]) -> Result<Invocation> {
    let untyped = UntypedArgs::parse(args);
    let resolution = ArgvResolver::new(tree, plugins)
        .resolve(&untyped.positionals)
        .await?;

    if untyped.has(HELP_OPTION) {
        if let Some(help) = help_command(tree)? {
            let inputs = match &resolution.command {
                Some(resolved) => resolved.path.clone(),
                None => untyped.positionals.clone(),
            };
            return Ok(Invocation {
                command: help,
                inputs,
                options: ParsedOptions::new(),
            });
        }
    }

    let (command, consumed) = match resolution.command {
        Some(command) => (command, resolution.consumed),
        None => {
            let fallback = tree.default_command()?.ok_or(Error::MissingDefaultCommand)?;
            tracing::debug!(command = %fallback.qualified_name(), "falling back to default command");
            (fallback, 0)
        }
    };

    let config = command.command.metadata().parser_config();
    let typed = parse_typed(&config, args).map_err(|e| Error::Usage(e.render().to_string()))?;
    let inputs = typed.positionals.into_iter().skip(consumed).collect();

    Ok(Invocation {
        command,
        inputs,
        options: typed.options,
    })
}

fn help_command(tree: &CommandTree) -> Result<Option<ResolvedCommand>> {
    Ok(match tree.find(&[HELP_OPTION])? {
        Some(id) => match tree.node(id) {
            NodeRef::Command(resolved) => Some(resolved),
            NodeRef::Namespace { .. } => None,
        },
        None => None,
    })
}

fn report(result: ExecutionResult) -> u8 {
    if let Some(e) = result.fault() {
        tracing::error!(category = ?e.category(), error = %e, "command failed");
        eprintln!("{}", format_fault(e));
    }
    result.exit_code()
}
