use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML settings: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid YAML settings: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported settings file extension: {0}")]
    UnknownFormat(String),
}

/// Options controlling node filtering and renaming
///
/// `exclude` is a rule block, one rule per line:
/// * `proto:ss,ssr` drops nodes by scheme
/// * `keep:...` switches the block to a whitelist
/// * anything else is a case-insensitive name pattern
///
/// Both `prepend_sub_name` and `prependSubName` are accepted as keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    pub exclude: Option<String>,
    #[serde(alias = "prependSubName")]
    pub prepend_sub_name: bool,
}

impl ParseOptions {
    /// Loads options from a `.toml`, `.yaml`/`.yml` or `.json` file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        log::debug!("Loading parse options from {}", path.display());

        match extension.as_str() {
            "toml" => Self::from_toml_str(&content),
            "yaml" | "yml" => Self::from_yaml_str(&content),
            "json" => Self::from_json_str(&content),
            other => Err(SettingsError::UnknownFormat(other.to_string())),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, SettingsError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Non-blank exclude rules.
    pub fn exclude_rules(&self) -> Option<&str> {
        self.exclude
            .as_deref()
            .map(str::trim)
            .filter(|rules| !rules.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_toml_and_aliases() {
        let opts = ParseOptions::from_toml_str(
            "exclude = \"\"\"\nproto:ss\n过期\n\"\"\"\nprepend_sub_name = true\n",
        )
        .unwrap();
        assert!(opts.prepend_sub_name);
        assert_eq!(opts.exclude_rules(), Some("proto:ss\n过期"));

        let opts = ParseOptions::from_json_str(r#"{"prependSubName": true}"#).unwrap();
        assert!(opts.prepend_sub_name);
        assert_eq!(opts.exclude, None);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(ParseOptions::from_yaml_str("").unwrap(), ParseOptions::default());
        let opts = ParseOptions::from_yaml_str("exclude: '  '").unwrap();
        assert_eq!(opts.exclude_rules(), None);
    }

    #[test]
    fn test_load_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "prependSubName: true\nexclude: \"keep:HK\"").unwrap();
        let opts = ParseOptions::load(file.path()).unwrap();
        assert!(opts.prepend_sub_name);
        assert_eq!(opts.exclude.as_deref(), Some("keep:HK"));

        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        assert!(matches!(
            ParseOptions::load(file.path()),
            Err(SettingsError::UnknownFormat(ext)) if ext == "ini"
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            ParseOptions::load(Path::new("/nonexistent/sublinks.toml")),
            Err(SettingsError::Io { .. })
        ));
    }
}
