//! Plugin Tests
//!
//! Plugin packages on disk: lookup, validation, error text and running
//! plugin commands through the shell.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ionic_cli::client::ApiClient;
use ionic_cli::config::ConfigStore;
use ionic_cli::environment::{Environment, Shell, ShellOptions};
use ionic_cli::plugins::{DirectorySource, PluginError, PluginLoader};
use ionic_cli::registry::{ChildMap, CommandTree, Namespace};
use tempfile::tempdir;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn write_plugin(node_modules: &Path, name: &str, manifest: &str) {
    let dir = node_modules.join(format!("@ionic/cli-plugin-{}", name));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("plugin.json"), manifest).unwrap();
}

const CORDOVA: &str = r#"{
    "name": "cordova",
    "version": "1.2.0",
    "description": "Cordova functionality",
    "root": {
        "type": "namespace",
        "commands": {
            "build": {
                "type": "command",
                "description": "Build (prepare + compile) an Ionic project for a given platform",
                "exec": "cordova",
                "args": ["build"],
                "inputs": [{"name": "platform", "description": "the platform to build"}],
                "options": [
                    {"name": "release", "type": "boolean"},
                    {"name": "target", "aliases": ["t"]}
                ]
            },
            "b": {"type": "alias", "target": "build"}
        }
    }
}"#;

// =============================================================================
// Loading
// =============================================================================

mod loader_tests {
    use super::*;

    #[tokio::test]
    async fn test_known_plugin_not_installed() {
        let loader = PluginLoader::new();
        let err = loader.load("cloud").await.err().unwrap();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("npm install @ionic/cli-plugin-cloud"));
    }

    #[tokio::test]
    async fn test_unknown_plugin_not_installed() {
        let loader = PluginLoader::new();
        let err = loader.load("serve-lab").await.err().unwrap();
        let msg = err.to_string();
        assert!(msg.contains("Unknown plugin"));
        assert!(msg.contains("@ionic/cli-plugin-serve-lab"));
        assert!(!msg.contains("npm install"));
    }

    #[tokio::test]
    async fn test_load_from_directory_is_cached() {
        let dir = tempdir().unwrap();
        write_plugin(dir.path(), "cordova", CORDOVA);
        let loader = PluginLoader::new().with_source(DirectorySource::new(dir.path()));

        let first = loader.load("cordova").await.unwrap();
        let second = loader.load("cordova").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.description(), "Cordova functionality");
        assert!(loader.is_installed("cordova").await.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_manifests_are_rejected() {
        let dir = tempdir().unwrap();
        write_plugin(
            dir.path(),
            "cloud",
            r#"{"name":"cloud","version":"1.0.0","root":{"type":"command","exec":"cloud"}}"#,
        );
        write_plugin(
            dir.path(),
            "cordova",
            r#"{"name":"cordova","version":"1.0.0","root":{"type":"namespace","commands":{
                "b":{"type":"alias","target":"build"}
            }}}"#,
        );
        write_plugin(dir.path(), "broken", "{ not json");
        let loader = PluginLoader::new().with_source(DirectorySource::new(dir.path()));

        for name in ["cloud", "cordova", "broken"] {
            let err = loader.load(name).await.err().unwrap();
            assert!(matches!(err, PluginError::Invalid { .. }), "{name}: {err}");
        }
    }

    fn deploy_plugin(options: &str) -> String {
        format!(
            r#"{{"name":"deploy","version":"1.0.0","root":{{"type":"namespace","commands":{{
                "push":{{"type":"command","exec":"deploy","options":{}}}
            }}}}}}"#,
            options
        )
    }

    #[tokio::test]
    async fn test_clashing_option_flags_are_rejected() {
        let cases = [
            r#"[{"name":"prod","type":"boolean","aliases":["p"]},{"name":"platform","aliases":["p"]}]"#,
            r#"[{"name":"release","type":"boolean"},{"name":"mode","aliases":["release"]}]"#,
            r#"[{"name":"target"},{"name":"target"}]"#,
            r#"[{"name":"level","aliases":["loglevel"]}]"#,
            r#"[{"name":"no-interactive","type":"boolean"}]"#,
            r#"[{"name":""}]"#,
        ];

        for options in cases {
            let dir = tempdir().unwrap();
            write_plugin(dir.path(), "deploy", &deploy_plugin(options));
            let loader = PluginLoader::new().with_source(DirectorySource::new(dir.path()));

            let err = loader.load("deploy").await.err().unwrap();
            assert!(matches!(err, PluginError::Invalid { .. }), "{options}: {err}");
        }
    }

    #[tokio::test]
    async fn test_distinct_option_flags_are_accepted() {
        let dir = tempdir().unwrap();
        let options = r#"[{"name":"prod","type":"boolean","aliases":["p"]},{"name":"platform","aliases":["P","plat"]}]"#;
        write_plugin(dir.path(), "deploy", &deploy_plugin(options));
        let loader = PluginLoader::new().with_source(DirectorySource::new(dir.path()));

        assert!(loader.load("deploy").await.is_ok());
    }

    #[tokio::test]
    async fn test_name_with_separator_is_rejected() {
        let loader = PluginLoader::new();
        let err = loader.load("cloud:ssh").await.err().unwrap();
        assert!(matches!(err, PluginError::InvalidName { .. }));
    }
}

// =============================================================================
// Running plugin commands
// =============================================================================

mod execution_tests {
    use super::*;

    #[derive(Clone, Default)]
    struct RecordingShell {
        calls: Arc<Mutex<Vec<(String, Vec<String>, ShellOptions)>>>,
        status: i32,
    }

    #[async_trait]
    impl Shell for RecordingShell {
        async fn run(
            &self,
            program: &str,
            args: &[String],
            options: &ShellOptions,
        ) -> ionic_cli::Result<i32> {
            self.calls
                .lock()
                .unwrap()
                .push((program.to_string(), args.to_vec(), options.clone()));
            Ok(self.status)
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

    fn environment(config_dir: &Path, shell: RecordingShell) -> Environment {
        Environment::new(
            Arc::new(ConfigStore::new(config_dir)),
            Arc::new(ApiClient::new("http://127.0.0.1:9").unwrap()),
        )
        .shell(shell)
    }

    #[tokio::test]
    async fn test_plugin_command_runs_through_shell() {
        let dir = tempdir().unwrap();
        write_plugin(&dir.path().join("node_modules"), "cordova", CORDOVA);
        let shell = RecordingShell::default();
        let env = environment(dir.path(), shell.clone());
        let tree = CommandTree::new(Root);
        let loader = PluginLoader::new().with_source(DirectorySource::new(dir.path().join("node_modules")));

        let code = ionic_cli::run_with(
            &env,
            &tree,
            &loader,
            &args(&["cordova:build", "ios", "--release", "-t", "device"]),
        )
        .await;
        assert_eq!(code, 0);

        let calls = shell.calls.lock().unwrap();
        let (program, argv, options) = &calls[0];
        assert_eq!(program, "cordova");
        assert_eq!(argv[..2], args(&["build", "ios"])[..]);
        assert!(argv.contains(&"--release".to_string()));
        assert!(argv.contains(&"--target=device".to_string()));
        assert!(options.envs.iter().any(|(k, _)| k == "IONIC_CLI_VERSION"));
    }

    #[tokio::test]
    async fn test_plugin_exit_status_becomes_exit_code() {
        let dir = tempdir().unwrap();
        write_plugin(&dir.path().join("node_modules"), "cordova", CORDOVA);
        let shell = RecordingShell {
            status: 2,
            ..Default::default()
        };
        let env = environment(dir.path(), shell.clone());
        let tree = CommandTree::new(Root);
        let loader = PluginLoader::new().with_source(DirectorySource::new(dir.path().join("node_modules")));

        let code = ionic_cli::run_with(&env, &tree, &loader, &args(&["cordova:b", "android"])).await;
        assert_eq!(code, 2);
        assert_eq!(shell.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_plugin_exits_one_without_running() {
        let dir = tempdir().unwrap();
        let shell = RecordingShell::default();
        let env = environment(dir.path(), shell.clone());
        let tree = CommandTree::new(Root);
        let loader = PluginLoader::new().with_source(DirectorySource::new(dir.path().join("node_modules")));

        let code = ionic_cli::run_with(&env, &tree, &loader, &args(&["cloud:ssh", "generate"])).await;
        assert_eq!(code, 1);
        assert!(shell.calls.lock().unwrap().is_empty());
    }
}
