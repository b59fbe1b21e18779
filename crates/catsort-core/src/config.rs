use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::CatsortError;
use crate::matcher::MatchOptions;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub matching: MatchingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    pub products: PathBuf,
    pub categories: PathBuf,
    pub output: PathBuf,
    /// Optional CSV dump of the registered taxonomy terms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dump_terms: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub fuzzy: bool,
    pub fuzzy_threshold: f64,
}

impl AppConfig {
    /// Load config: explicit file, else user file (if exists), over built-in defaults.
    ///
    /// Keys missing from a file keep their default values.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CatsortError> {
        let config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(CatsortError::MissingInput {
                        kind: "config",
                        path: path.to_path_buf(),
                    });
                }
                Self::from_file(path)?
            }
            None => {
                let user_path = Self::config_path();
                if user_path.exists() {
                    Self::from_file(&user_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, CatsortError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CatsortError::Config(e.to_string()))?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Self::from_toml(&content)
    }

    /// Parse `content` layered over the built-in defaults.
    pub fn from_toml(content: &str) -> Result<Self, CatsortError> {
        let mut merged = default_table();
        let user: toml::Table =
            toml::from_str(content).map_err(|e| CatsortError::Config(e.to_string()))?;
        merge_tables(&mut merged, user);
        toml::Value::Table(merged)
            .try_into()
            .map_err(|e| CatsortError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), CatsortError> {
        let threshold = self.matching.fuzzy_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(CatsortError::Config(format!(
                "fuzzy_threshold must be between 0 and 1, got {threshold}"
            )));
        }
        Ok(())
    }

    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            fuzzy: self.matching.fuzzy,
            fuzzy_threshold: self.matching.fuzzy_threshold,
        }
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", "catsort")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("catsort.toml"))
    }
}

fn default_table() -> toml::Table {
    toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
}

/// Recursively overlay `overlay` onto `base`; scalar values replace, tables merge.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(inner) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, inner),
                _ => {
                    base.insert(key, toml::Value::Table(inner));
                }
            },
            other => {
                base.insert(key, other);
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        AppConfig::default().paths
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        AppConfig::default().matching
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::matcher::DEFAULT_FUZZY_THRESHOLD;

    #[test]
    fn test_default_config_parses() {
        let config = AppConfig::default();
        assert_eq!(config.paths.products, PathBuf::from("Research/wc-products.csv"));
        assert_eq!(config.paths.output, PathBuf::from("product-categories.csv"));
        assert!(config.paths.dump_terms.is_none());
        assert!(!config.matching.fuzzy);
        assert_eq!(config.matching.fuzzy_threshold, DEFAULT_FUZZY_THRESHOLD);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_roundtrip() {
        let config = AppConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized = AppConfig::from_toml(&serialized).unwrap();
        assert_eq!(deserialized, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_toml("[matching]\nfuzzy = true\n").unwrap();
        assert!(config.matching.fuzzy);
        assert_eq!(config.matching.fuzzy_threshold, DEFAULT_FUZZY_THRESHOLD);
        assert_eq!(config.paths, PathsConfig::default());
    }

    #[test]
    fn test_threshold_out_of_range() {
        let config = AppConfig::from_toml("[matching]\nfuzzy_threshold = 1.5\n").unwrap();
        assert!(matches!(config.validate(), Err(CatsortError::Config(_))));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            AppConfig::from_toml("[matching\n"),
            Err(CatsortError::Config(_))
        ));
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[paths]\noutput = \"out.csv\"\ndump_terms = \"terms.csv\"").unwrap();
        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.paths.output, PathBuf::from("out.csv"));
        assert_eq!(config.paths.dump_terms, Some(PathBuf::from("terms.csv")));
        assert_eq!(config.paths.products, PathBuf::from("Research/wc-products.csv"));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, CatsortError::MissingInput { kind: "config", .. }));
    }

    #[test]
    fn test_match_options() {
        let mut config = AppConfig::default();
        config.matching.fuzzy = true;
        config.matching.fuzzy_threshold = 0.9;
        assert_eq!(config.match_options(), MatchOptions::fuzzy(0.9));
    }
}
