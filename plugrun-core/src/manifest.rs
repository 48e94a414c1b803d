//! Module federation manifest produced by a plugin build.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    #[serde(rename = "buildVersion", default)]
    pub version: String,
    #[serde(rename = "buildName", default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(rename = "buildInfo", default)]
    pub build_info: BuildInfo,
}

/// Content of `dist/mf-manifest.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "metaData", default)]
    pub metadata: Metadata,
}

impl Manifest {
    /// Name of the release archive for `version`, e.g. `BarChart-0.9.0.tar.gz`.
    pub fn archive_name(&self, version: &str) -> String {
        format!("{}-{}.tar.gz", self.name, version)
    }
}

/// Reads the manifest of the plugin located at `plugin_path`.
pub fn read(plugin_path: impl AsRef<Path>) -> Result<Manifest> {
    let plugin_path = plugin_path.as_ref();
    let manifest_error = |message: String| Error::Manifest {
        plugin: plugin_path.display().to_string(),
        message,
    };

    let manifest_path = plugin_path.join("dist").join("mf-manifest.json");
    let data = std::fs::read_to_string(&manifest_path)
        .map_err(|e| manifest_error(format!("{}: {}", manifest_path.display(), e)))?;
    serde_json::from_str(&data).map_err(|e| manifest_error(e.to_string()))
}
