//! Rewriting of Perses dependency versions across workspaces.

use std::path::Path;

use regex::Regex;
use tracing::info;

use crate::error::{Error, Result};

/// npm package released by the main Perses repository.
pub const CORE_NPM_PACKAGE: &str = "core";
/// npm packages released by the shared repository.
pub const SHARED_NPM_PACKAGES: [&str; 4] = ["components", "dashboards", "plugin-system", "explore"];

pub const CORE_GO_MODULE: &str = "github.com/perses/perses";
pub const CORE_CUE_MODULE: &str = "github.com/perses/perses/cue";
pub const SHARED_CUE_MODULE: &str = "github.com/perses/shared/cue";

/// Pins every `@perses-dev/<name>` dependency in `text` to `^version`.
///
/// Only plain and pre-release (`alpha`, `beta`, `rc`) semver ranges are
/// rewritten; anything else is left untouched.
pub fn replace_npm_versions(text: &str, version: &str, names: &[&str]) -> Result<String> {
    let mut updated = text.to_string();
    for name in names {
        let pattern = format!(
            r#""@perses-dev/{}":\s*"(\^)?[0-9]+\.[0-9]+\.[0-9]+(-(alpha|beta|rc)\.[0-9]+)?""#,
            regex::escape(name)
        );
        let re = Regex::new(&pattern)
            .map_err(|e| Error::Config(format!("invalid package name '{}': {}", name, e)))?;
        let replacement = format!(r#""@perses-dev/{}": "^{}""#, name, version);
        updated = re
            .replace_all(&updated, regex::NoExpand(&replacement))
            .into_owned();
    }
    Ok(updated)
}

/// Rewrites the `package.json` located in `dir`.
pub fn bump_package_json(dir: impl AsRef<Path>, version: &str, names: &[&str]) -> Result<()> {
    let path = dir.as_ref().join("package.json");
    let content = std::fs::read_to_string(&path)?;
    let updated = replace_npm_versions(&content, version, names)?;
    if updated != content {
        std::fs::write(&path, updated)?;
    }
    info!(
        "successfully bumped npm dependencies for {} to version {}",
        dir.as_ref().display(),
        version
    );
    Ok(())
}

/// Whether the workspace's CUE module declares a dependency on `module`.
///
/// Workspaces without a `cue.mod/module.cue` have no CUE dependency at all.
pub fn cue_module_depends_on(workspace: impl AsRef<Path>, module: &str) -> Result<bool> {
    let path = workspace.as_ref().join("cue.mod").join("module.cue");
    match std::fs::read_to_string(&path) {
        Ok(content) => Ok(content.contains(module)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
