//! Command implementations for the CLI.

mod bump;
mod fan_out;
mod list;
mod release;

use std::path::Path;

use anyhow::{Context, Result};
use plugrun_core::workspace::{self, Workspace};
use plugrun_core::Config;

pub use bump::cmd_bump_deps;
pub use fan_out::{cmd_fan_out, FanOutTask};
pub use list::cmd_list;
pub use release::{cmd_publish, cmd_upload};

pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Config::load(root).context("Failed to load plugrun.toml"),
    }
}

fn discover_workspaces(root: &Path) -> Result<Vec<Workspace>> {
    workspace::discover(root).context("unable to get the list of the workspaces")
}
