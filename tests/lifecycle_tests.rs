//! Lifecycle Tests
//!
//! Phase ordering, hook signals, validation, telemetry side channel and the
//! typed option re-parse.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ionic_cli::client::ApiClient;
use ionic_cli::command::argv::parse_typed;
use ionic_cli::command::{
    Command, CommandContext, CommandMetadata, InputSpec, OptionSpec, OptionValue, ParsedOptions,
    PromptSpec, Validator,
};
use ionic_cli::config::ConfigStore;
use ionic_cli::environment::Environment;
use ionic_cli::lifecycle::{ExecutionResult, Executor, PROJECT_REQUIRED};
use ionic_cli::plugins::PluginLoader;
use ionic_cli::prompt::ScriptedPrompter;
use ionic_cli::registry::{ChildMap, CommandTree, Namespace};
use ionic_cli::telemetry::{Telemetry, TelemetryEvent};
use tempfile::{TempDir, tempdir};

#[derive(Default)]
struct CountingTelemetry {
    events: Mutex<Vec<TelemetryEvent>>,
    calls: AtomicUsize,
}

#[async_trait]
impl Telemetry for CountingTelemetry {
    async fn send_command(&self, event: TelemetryEvent) -> ionic_cli::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

struct FailingTelemetry;

#[async_trait]
impl Telemetry for FailingTelemetry {
    async fn send_command(&self, _event: TelemetryEvent) -> ionic_cli::Result<()> {
        Err(ionic_cli::Error::fatal("metrics endpoint down"))
    }
}

/// Command whose hooks return configurable signals and which counts its runs.
struct Scripted {
    metadata: CommandMetadata,
    pre_inputs: Option<u8>,
    pre_run: Option<u8>,
    run_result: fn() -> ionic_cli::Result<Option<u8>>,
    runs: Arc<AtomicUsize>,
    seen_inputs: Arc<Mutex<Vec<String>>>,
}

impl Scripted {
    fn new(metadata: CommandMetadata) -> Self {
        Self {
            metadata,
            pre_inputs: None,
            pre_run: None,
            run_result: || Ok(None),
            runs: Arc::new(AtomicUsize::new(0)),
            seen_inputs: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl Command for Scripted {
    fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    async fn pre_inputs_prompt(
        &self,
        _cx: &CommandContext<'_>,
        _inputs: &mut Vec<String>,
    ) -> ionic_cli::Result<Option<u8>> {
        Ok(self.pre_inputs)
    }

    async fn pre_run(
        &self,
        _cx: &CommandContext<'_>,
        _inputs: &[String],
        _options: &ParsedOptions,
    ) -> ionic_cli::Result<Option<u8>> {
        Ok(self.pre_run)
    }

    async fn run(
        &self,
        _cx: &CommandContext<'_>,
        inputs: &[String],
        _options: &ParsedOptions,
    ) -> ionic_cli::Result<Option<u8>> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        *self.seen_inputs.lock().unwrap() = inputs.to_vec();
        (self.run_result)()
    }
}

struct Root;

impl Namespace for Root {
    fn name(&self) -> &str {
        "ionic"
    }

    fn commands(&self) -> ChildMap {
        ChildMap::new()
    }
}

struct Harness {
    _dir: TempDir,
    env: Environment,
    tree: CommandTree,
    plugins: PluginLoader,
    telemetry: Arc<CountingTelemetry>,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(|dir| ConfigStore::new(dir))
    }

    fn dry() -> Self {
        Self::with_config(|dir| {
            let mut vars = HashMap::new();
            vars.insert("IONIC_DIRECTORY".to_string(), dir.display().to_string());
            vars.insert("IONIC_CLI_TELEMETRY".to_string(), "0".to_string());
            ConfigStore::from_env(&vars)
        })
    }

    fn with_config(config: impl FnOnce(&std::path::Path) -> ConfigStore) -> Self {
        let dir = tempdir().unwrap();
        let telemetry = Arc::new(CountingTelemetry::default());
        let env = Environment::new(
            Arc::new(config(dir.path())),
            Arc::new(ApiClient::new("http://127.0.0.1:9").unwrap()),
        )
        .telemetry(telemetry.clone());
        Self {
            _dir: dir,
            env,
            tree: CommandTree::new(Root),
            plugins: PluginLoader::new(),
            telemetry,
        }
    }

    async fn execute(&self, command: &dyn Command, inputs: &[&str]) -> ExecutionResult {
        self.execute_with(command, inputs, ParsedOptions::new()).await
    }

    async fn execute_with(
        &self,
        command: &dyn Command,
        inputs: &[&str],
        options: ParsedOptions,
    ) -> ExecutionResult {
        let path = vec![command.metadata().name.clone()];
        let cx = CommandContext {
            env: &self.env,
            tree: &self.tree,
            plugins: &self.plugins,
            path: &path,
        };
        let inputs = inputs.iter().map(|s| s.to_string()).collect();
        Executor::new(&cx).execute(command, inputs, options).await
    }

    fn telemetry_calls(&self) -> usize {
        self.telemetry.calls.load(Ordering::SeqCst)
    }
}

// =============================================================================
// Hook signals
// =============================================================================

mod signal_tests {
    use super::*;

    #[tokio::test]
    async fn test_pre_run_signal_skips_run_but_records_telemetry() {
        let harness = Harness::new();
        let mut command = Scripted::new(CommandMetadata::new("start", "Start"));
        command.pre_run = Some(3);

        let result = harness.execute(&command, &["myApp"]).await;
        assert_eq!(result.exit_code(), 3);
        assert_eq!(command.runs.load(Ordering::SeqCst), 0);
        assert_eq!(harness.telemetry_calls(), 1);
    }

    #[tokio::test]
    async fn test_zero_signal_is_success_without_run() {
        let harness = Harness::new();
        let mut command = Scripted::new(CommandMetadata::new("start", "Start"));
        command.pre_inputs = Some(0);

        let result = harness.execute(&command, &[]).await;
        assert!(result.is_success());
        assert_eq!(command.runs.load(Ordering::SeqCst), 0);
        assert_eq!(harness.telemetry_calls(), 1);
    }

    #[tokio::test]
    async fn test_pre_inputs_signal_exits_before_validation() {
        let harness = Harness::new();
        let mut command = Scripted::new(
            CommandMetadata::new("start", "Start")
                .input(InputSpec::new("name", "App name").required()),
        );
        command.pre_inputs = Some(2);

        // The missing required input is never validated.
        let result = harness.execute(&command, &[]).await;
        assert!(matches!(result, ExecutionResult::Exit(2)));
        assert_eq!(result.exit_code(), 2);
        assert_eq!(command.runs.load(Ordering::SeqCst), 0);
        assert_eq!(harness.telemetry_calls(), 1);
    }

    #[tokio::test]
    async fn test_run_outcomes() {
        let harness = Harness::new();

        let mut exit = Scripted::new(CommandMetadata::new("build", "Build"));
        exit.run_result = || Ok(Some(5));
        assert!(matches!(harness.execute(&exit, &[]).await, ExecutionResult::Exit(5)));

        let mut fault = Scripted::new(CommandMetadata::new("build", "Build"));
        fault.run_result = || Err(ionic_cli::Error::fatal("compile failed"));
        let result = harness.execute(&fault, &[]).await;
        assert_eq!(result.exit_code(), 1);
        assert_eq!(result.fault().unwrap().to_string(), "compile failed");

        // Telemetry completes for both, even when run faults.
        assert_eq!(harness.telemetry_calls(), 2);
    }
}

// =============================================================================
// Inputs and validation
// =============================================================================

mod input_tests {
    use super::*;

    fn login_metadata() -> CommandMetadata {
        CommandMetadata::new("login", "Login")
            .input(
                InputSpec::new("email", "Your email")
                    .required()
                    .validator(Validator::Email)
                    .prompt(PromptSpec::input("Email:")),
            )
            .input(
                InputSpec::new("password", "Your password")
                    .required()
                    .prompt(PromptSpec::password("Password:"))
                    .private(),
            )
    }

    #[tokio::test]
    async fn test_validation_failure_stops_before_run() {
        let harness = Harness::new();
        let command = Scripted::new(login_metadata());

        let result = harness.execute(&command, &["not-an-email", "hunter2"]).await;
        let fault = result.fault().unwrap();
        assert!(fault.to_string().contains("email is an invalid email address."));
        assert_eq!(result.exit_code(), 1);
        assert_eq!(command.runs.load(Ordering::SeqCst), 0);
        assert_eq!(harness.telemetry_calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_required_inputs_without_tty() {
        let harness = Harness::new();
        let command = Scripted::new(login_metadata());

        let result = harness.execute(&command, &[]).await;
        let message = result.fault().unwrap().to_string();
        assert!(message.contains("email must not be empty."));
        assert!(message.contains("password must not be empty."));
        assert_eq!(command.runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_prompts_fill_missing_inputs() {
        let mut harness = Harness::new();
        let prompter = Arc::new(ScriptedPrompter::new(["hunter2"]));
        harness.env.prompter = prompter.clone();
        harness.env.interactive = true;
        let command = Scripted::new(login_metadata());

        let result = harness.execute(&command, &["dev@ionic.io"]).await;
        assert!(result.is_success());
        assert_eq!(*command.seen_inputs.lock().unwrap(), vec!["dev@ionic.io", "hunter2"]);
        assert_eq!(prompter.asked().len(), 1);
        assert_eq!(prompter.asked()[0].name, "password");
    }

    #[tokio::test]
    async fn test_private_inputs_never_reach_telemetry() {
        let harness = Harness::new();
        let command = Scripted::new(login_metadata());

        let result = harness.execute(&command, &["dev@ionic.io", "hunter2"]).await;
        assert!(result.is_success());

        let events = harness.telemetry.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].command, "login");
        assert_eq!(events[0].args, vec!["dev@ionic.io"]);
    }

    #[tokio::test]
    async fn test_project_required() {
        let harness = Harness::new();
        let command = Scripted::new(CommandMetadata::new("upload", "Upload").requires_project());

        let result = harness.execute(&command, &[]).await;
        assert_eq!(result.fault().unwrap().to_string(), PROJECT_REQUIRED);
        assert_eq!(command.runs.load(Ordering::SeqCst), 0);
        assert_eq!(harness.telemetry_calls(), 0);
    }
}

// =============================================================================
// Telemetry side channel
// =============================================================================

mod telemetry_tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_mode_sends_nothing() {
        let harness = Harness::dry();
        let command = Scripted::new(CommandMetadata::new("version", "Version"));

        let result = harness.execute(&command, &[]).await;
        assert!(result.is_success());
        assert_eq!(command.runs.load(Ordering::SeqCst), 1);
        assert_eq!(harness.telemetry_calls(), 0);
    }

    #[tokio::test]
    async fn test_telemetry_failure_does_not_mask_run() {
        let mut harness = Harness::new();
        harness.env.telemetry = Arc::new(FailingTelemetry);
        let command = Scripted::new(CommandMetadata::new("version", "Version"));

        let result = harness.execute(&command, &[]).await;
        assert!(result.is_success());
        assert_eq!(command.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_private_options_are_dropped() {
        let harness = Harness::new();
        let command = Scripted::new(
            CommandMetadata::new("link", "Link")
                .option(OptionSpec::new("token", "API token").private())
                .option(OptionSpec::new("force", "Force").boolean()),
        );
        let mut options = ParsedOptions::new();
        options.insert("token", OptionValue::from("secret"));
        options.insert("force", OptionValue::Bool(true));

        harness.execute_with(&command, &["app-1"], options).await;
        let events = harness.telemetry.events.lock().unwrap();
        assert_eq!(events[0].args, vec!["app-1", "--force"]);
    }
}

// =============================================================================
// Typed option parsing
// =============================================================================

mod option_tests {
    use super::*;

    #[test]
    fn test_typed_reparse_round_trip() {
        let metadata = CommandMetadata::new("start", "Start")
            .option(OptionSpec::new("skip-deps", "Skip dependencies").boolean())
            .option(OptionSpec::new("type", "Project type").default_value("ionic-angular"))
            .option(OptionSpec::new("list", "List starters").boolean().alias("l"))
            .option(OptionSpec::new("app-name", "App name"));

        let argv: Vec<String> = ["start", "--skip-deps", "--type=ionic1"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let typed = parse_typed(&metadata.parser_config(), &argv).unwrap();

        assert_eq!(typed.positionals, vec!["start"]);
        assert_eq!(typed.options.get("skip-deps"), Some(&OptionValue::Bool(true)));
        assert_eq!(typed.options.get("type"), Some(&OptionValue::String("ionic1".into())));
        assert_eq!(typed.options.get("list"), Some(&OptionValue::Bool(false)));
        assert_eq!(typed.options.get("app-name"), Some(&OptionValue::Null));
    }
}
