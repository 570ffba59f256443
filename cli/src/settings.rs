use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use social_graph_core::GraphConfig;

/// Settings file looked up in the working directory when `--config` is not given.
pub const DEFAULT_SETTINGS_FILE: &str = "social-graph.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whitespace-delimited `username firstname lastname email` records.
    pub users_file: Option<PathBuf>,
    /// Whitespace-delimited `source destination weight` records.
    pub connections_file: Option<PathBuf>,
    pub dot_file: PathBuf,
    pub image_file: PathBuf,
    /// Graphviz layout program used to render `dot_file` into `image_file`.
    pub layout_command: String,
    pub graph: GraphConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            users_file: None,
            connections_file: None,
            dot_file: PathBuf::from("graph.dot"),
            image_file: PathBuf::from("graph.png"),
            layout_command: "dot".to_string(),
            graph: GraphConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings: explicit path > `social-graph.toml` in the working
    /// directory > built-in defaults.
    ///
    /// # Errors
    /// Fails if an explicit path is unreadable, or if any settings file is
    /// not valid TOML for this schema.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_SETTINGS_FILE);
                if fallback.exists() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing settings file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.dot_file, PathBuf::from("graph.dot"));
        assert_eq!(s.layout_command, "dot");
        assert_eq!(s.graph.default_weight(), 1);
        assert!(s.users_file.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let s = Settings::from_toml(
            r#"
users_file = "data/users.txt"

[graph]
default_weight = 4
"#,
        )
        .unwrap();
        assert_eq!(s.users_file, Some(PathBuf::from("data/users.txt")));
        assert_eq!(s.graph.default_weight(), 4);
        assert_eq!(s.image_file, PathBuf::from("graph.png"));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(Settings::from_toml("dot_file = 3").is_err());
    }
}
