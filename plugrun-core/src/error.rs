//! Error types and result aliases.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error in {context}: {error}")]
    Json {
        error: serde_json::Error,
        context: String,
    },

    #[error("TOML parse error in {context}: {error}")]
    Toml {
        error: toml::de::Error,
        context: String,
    },

    #[error("Operation failed for {item}: {message}")]
    Operation { item: String, message: String },

    #[error("Command `{command}` failed: {message}")]
    Command { command: String, message: String },

    #[error("{item} timed out after {deadline:?}")]
    Timeout { item: String, deadline: Duration },

    #[error("Max retry attempts reached ({attempts}): {last_error}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        last_error: Box<Error>,
    },

    #[error("Invalid retry policy: {0}")]
    InvalidRetryPolicy(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Unable to get the list of the workspaces from {path}: {message}")]
    Workspace { path: PathBuf, message: String },

    #[error("Unable to read manifest file for plugin {plugin}: {message}")]
    Manifest { plugin: String, message: String },

    #[error("Invalid tag: {tag}. Expected '<plugin>/v<version>' ({reason})")]
    InvalidTag { tag: String, reason: String },

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Returns `true` when the item hung rather than failed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    pub(crate) fn operation(item: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Operation {
            item: item.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
