//! Discovery of the plugin workspaces declared in the root `package.json`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// One npm workspace, usually a single plugin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Workspace {
    /// Workspace entry as declared, relative to the repository root.
    pub name: String,
    /// Location on disk.
    pub path: PathBuf,
}

impl Workspace {
    pub fn new(root: &Path, name: impl Into<String>) -> Self {
        let name = name.into();
        let path = root.join(&name);
        Self { name, path }
    }

    /// Whether the plugin ships CUE/Go schemas.
    pub fn has_schemas(&self) -> bool {
        self.path.join("schemas").is_dir()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WorkspacesField {
    List(Vec<String>),
    Object { packages: Vec<String> },
}

#[derive(Deserialize)]
struct RootPackageJson {
    workspaces: Option<WorkspacesField>,
}

/// Returns the workspaces of the repository rooted at `root`, in declaration order.
///
/// Entries ending in `/*` expand to the subdirectories that contain a
/// `package.json`, sorted by name.
pub fn discover(root: impl AsRef<Path>) -> Result<Vec<Workspace>> {
    let root = root.as_ref();
    let package_json = root.join("package.json");
    let workspace_error = |message: String| Error::Workspace {
        path: package_json.clone(),
        message,
    };

    let content = std::fs::read_to_string(&package_json)
        .map_err(|e| workspace_error(e.to_string()))?;
    let parsed: RootPackageJson = serde_json::from_str(&content)
        .map_err(|e| workspace_error(format!("invalid package.json: {}", e)))?;

    let entries = match parsed.workspaces {
        Some(WorkspacesField::List(entries)) => entries,
        Some(WorkspacesField::Object { packages }) => packages,
        None => return Err(workspace_error("no 'workspaces' field".to_string())),
    };

    let mut workspaces = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry.strip_suffix("/*") {
            Some(parent) => workspaces.extend(expand(root, parent)),
            None => workspaces.push(Workspace::new(root, entry.trim_end_matches('/'))),
        }
    }
    Ok(workspaces)
}

fn expand(root: &Path, parent: &str) -> Vec<Workspace> {
    WalkDir::new(root.join(parent))
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir() && e.path().join("package.json").is_file())
        .filter_map(|e| {
            e.file_name()
                .to_str()
                .map(|dir| Workspace::new(root, format!("{}/{}", parent, dir)))
        })
        .collect()
}
