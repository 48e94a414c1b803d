//! Release tags of the form `<plugin>/v<version>`.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A parsed release tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTag {
    raw: String,
    plugin: String,
    version: String,
}

impl ReleaseTag {
    /// Plugin directory the tag refers to.
    #[inline]
    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    /// Version without the `v` prefix.
    #[inline]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Version with the `v` prefix, as CUE modules expect it.
    pub fn module_version(&self) -> String {
        format!("v{}", self.version)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for ReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for ReleaseTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidTag {
            tag: s.to_string(),
            reason: reason.to_string(),
        };

        let (plugin, version) = s.split_once('/').ok_or_else(|| invalid("missing '/'"))?;
        if version.contains('/') {
            return Err(invalid("too many '/'"));
        }
        validate_plugin_name(plugin).map_err(|reason| invalid(&reason))?;

        let version = version.strip_prefix('v').unwrap_or(version);
        if version.is_empty() {
            return Err(invalid("empty version"));
        }
        if !version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+'))
        {
            return Err(invalid("version contains invalid characters"));
        }

        Ok(Self {
            raw: s.to_string(),
            plugin: plugin.to_string(),
            version: version.to_string(),
        })
    }
}

/// The plugin name becomes a directory, so it must stay inside the repository.
fn validate_plugin_name(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() {
        return Err("empty plugin name".to_string());
    }
    if name.contains("..") {
        return Err("plugin name contains path traversal".to_string());
    }
    if name.starts_with('.') || name.starts_with('-') {
        return Err("plugin name cannot start with '.' or '-'".to_string());
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err("plugin name contains invalid characters".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_v_prefix() {
        let tag: ReleaseTag = "timeserieschart/v0.9.0".parse().unwrap();
        assert_eq!(tag.plugin(), "timeserieschart");
        assert_eq!(tag.version(), "0.9.0");
        assert_eq!(tag.module_version(), "v0.9.0");
        assert_eq!(tag.to_string(), "timeserieschart/v0.9.0");
    }

    #[test]
    fn test_parse_without_prefix() {
        let tag: ReleaseTag = "table/1.2.0-beta.1".parse().unwrap();
        assert_eq!(tag.version(), "1.2.0-beta.1");
    }
}
