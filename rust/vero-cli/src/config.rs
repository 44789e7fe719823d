//! Project manifest (`vero.toml`): search the current directory and its
//! ancestors, parse with `toml` + `serde`, and fall back to defaults when
//! no manifest exists.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct VeroConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DataConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct PackageInfo {
    pub name: String,

    /// Directories scanned for `.vero` source files when no explicit file
    /// list is passed on the command line.
    #[serde(default = "default_source_roots")]
    pub source_roots: Vec<String>,
}

fn default_source_roots() -> Vec<String> {
    vec!["tests".to_string()]
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DataConfig {
    /// Default base URL for the data service the Data Query Engine talks to
    /// (spec §6.4), used when a `.vero` project doesn't set one per table.
    pub base_url: String,
}

impl VeroConfig {
    /// Searches the current directory and its parents for `vero.toml`,
    /// returning the default configuration if none is found.
    pub fn load() -> Self {
        Self::find_and_load().map(|(_path, cfg)| cfg).unwrap_or_default()
    }

    pub fn load_with_path() -> Option<(PathBuf, Self)> {
        Self::find_and_load()
    }

    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
        toml::from_str(&content).map_err(|e| format!("invalid toml in '{}': {}", path.display(), e))
    }

    fn find_and_load() -> Option<(PathBuf, Self)> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let candidate = dir.join("vero.toml");
            if candidate.exists() {
                let content = std::fs::read_to_string(&candidate).ok()?;
                let cfg: Self = toml::from_str(&content).ok()?;
                return Some((candidate, cfg));
            }
            if !dir.pop() {
                return None;
            }
        }
    }

    pub fn default_template() -> &'static str {
        r#"# Vero project manifest
[package]
name = "my-suite"
source-roots = ["tests"]

[data]
base-url = "https://example.com/api/tables"
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_manifest() {
        let cfg: VeroConfig = toml::from_str(
            r#"
            [package]
            name = "checkout-suite"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.package.unwrap().name, "checkout-suite");
    }

    #[test]
    fn default_source_roots_is_tests() {
        let cfg: VeroConfig = toml::from_str(
            r#"
            [package]
            name = "checkout-suite"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.package.unwrap().source_roots, vec!["tests".to_string()]);
    }

    #[test]
    fn missing_manifest_yields_defaults() {
        let cfg = VeroConfig::default();
        assert!(cfg.package.is_none());
    }
}
