//! Repository configuration read from `plugrun.toml`.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::command::CommandSpec;
use crate::error::{Error, Result};
use crate::retry::{BackoffRange, RetryPolicy};
use crate::workspace::Workspace;

pub const CONFIG_FILE: &str = "plugrun.toml";

/// Placeholder substituted with the workspace path in task arguments.
pub const WORKSPACE_PLACEHOLDER: &str = "{workspace}";

/// A command run once per workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Deadline for a single workspace.
    pub timeout: Duration,
}

impl TaskConfig {
    fn new(program: &str, args: &[&str], timeout_secs: u64) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Builds the command for `workspace`.
    ///
    /// Tasks whose arguments never mention the workspace run inside its directory.
    pub fn command_for(&self, workspace: &Workspace) -> CommandSpec {
        let path = workspace.path.display().to_string();
        let mentions_workspace = self.args.iter().any(|a| a.contains(WORKSPACE_PLACEHOLDER));
        let spec = CommandSpec::new(&self.program).args(
            self.args
                .iter()
                .map(|a| a.replace(WORKSPACE_PLACEHOLDER, &path)),
        );
        if mentions_workspace {
            spec
        } else {
            spec.current_dir(&workspace.path)
        }
    }

    fn merge(mut self, raw: Option<RawTask>) -> Self {
        if let Some(raw) = raw {
            if let Some(program) = raw.program {
                self.program = program;
            }
            if let Some(args) = raw.args {
                self.args = args;
            }
            if let Some(secs) = raw.timeout_secs {
                self.timeout = Duration::from_secs(secs);
            }
        }
        self
    }
}

/// Settings of the CUE module publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishConfig {
    pub module_prefix: String,
    pub retry: RetryPolicy,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            module_prefix: "github.com/perses/plugins".to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Full configuration, with every missing value defaulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub lint: TaskConfig,
    pub build: TaskConfig,
    pub golangci_lint: TaskConfig,
    pub publish: PublishConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lint: TaskConfig::new(
                "percli",
                &["plugin", "lint", "--plugin.path={workspace}"],
                180,
            ),
            build: TaskConfig::new(
                "percli",
                &[
                    "plugin",
                    "build",
                    "--plugin.path={workspace}",
                    "--skip.npm-install=true",
                ],
                600,
            ),
            golangci_lint: TaskConfig::new("golangci-lint", &["run"], 300),
            publish: PublishConfig::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTask {
    program: Option<String>,
    args: Option<Vec<String>>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRange {
    min_secs: u64,
    span_secs: u64,
}

impl From<RawRange> for BackoffRange {
    fn from(raw: RawRange) -> Self {
        BackoffRange::from_secs(raw.min_secs, raw.span_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPublish {
    module_prefix: Option<String>,
    max_attempts: Option<u32>,
    initial_backoff: Option<RawRange>,
    backoff_growth: Option<RawRange>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    lint: Option<RawTask>,
    build: Option<RawTask>,
    golangci_lint: Option<RawTask>,
    publish: Option<RawPublish>,
}

impl Config {
    /// Loads `plugrun.toml` from the repository root, falling back to defaults
    /// when the file does not exist.
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let path = root.as_ref().join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_file(&path)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parses configuration text; `context` names its origin in errors.
    pub fn parse(content: &str, context: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content).map_err(|error| Error::Toml {
            error,
            context: context.to_string(),
        })?;

        let defaults = Self::default();
        let mut publish = defaults.publish;
        if let Some(raw_publish) = raw.publish {
            if let Some(prefix) = raw_publish.module_prefix {
                publish.module_prefix = prefix;
            }
            if let Some(max_attempts) = raw_publish.max_attempts {
                publish.retry.max_attempts = max_attempts;
            }
            if let Some(range) = raw_publish.initial_backoff {
                publish.retry.initial_backoff = range.into();
            }
            if let Some(range) = raw_publish.backoff_growth {
                publish.retry.backoff_growth = range.into();
            }
        }
        publish
            .retry
            .validate()
            .map_err(|e| Error::Config(format!("{} [publish]: {}", context, e)))?;

        let config = Self {
            lint: defaults.lint.merge(raw.lint),
            build: defaults.build.merge(raw.build),
            golangci_lint: defaults.golangci_lint.merge(raw.golangci_lint),
            publish,
        };
        for (section, task) in [
            ("lint", &config.lint),
            ("build", &config.build),
            ("golangci_lint", &config.golangci_lint),
        ] {
            if task.program.trim().is_empty() {
                return Err(Error::Config(format!(
                    "{} [{}]: program cannot be empty",
                    context, section
                )));
            }
        }
        Ok(config)
    }
}
