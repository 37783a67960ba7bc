//! Layered configuration loader.
//!
//! Layers, lowest precedence first: built-in defaults, an optional YAML,
//! TOML or JSON file, then `VOUCH_*` environment variables.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ::config::{Config, File};
use thiserror::Error;
use tracing::debug;
use vouch_domain::DomainError;
use vouch_domain::config::HarnessConfig;

/// Names the config file when none is given on the command line.
pub const CONFIG_FILE_ENV: &str = "VOUCH_CONFIG";

/// Environment variable, config key and whether the value is an integer.
const ENV_OVERRIDES: &[(&str, &str, bool)] = &[
    ("VOUCH_BASE_URI", "baseUri", false),
    ("VOUCH_TIMEOUT_MS", "timeoutMs", true),
    ("VOUCH_DEFAULT_CONTENT_TYPE", "defaultContentType", false),
    ("VOUCH_PARALLELISM", "parallelism", true),
    ("VOUCH_BODY_POLICY", "bodyPolicy", false),
    ("VOUCH_REPORT_PATH", "reportPath", false),
];

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or the layers could not be merged.
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    /// An environment override could not be parsed.
    #[error("invalid value for {name}: '{value}'")]
    InvalidEnv {
        /// Variable name.
        name: String,
        /// Offending value.
        value: String,
    },

    /// The merged configuration failed validation.
    #[error(transparent)]
    Invalid(#[from] DomainError),
}

/// Builds a [`HarnessConfig`] from file and environment layers.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env: HashMap<String, String>,
}

impl ConfigLoader {
    /// Creates a loader with no file and no overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a loader reading the process environment.
    ///
    /// The config file is `file` if given, else the path in `VOUCH_CONFIG`.
    #[must_use]
    pub fn from_process_env(file: Option<PathBuf>) -> Self {
        let loader = Self::new().with_env(std::env::vars());
        let file = file.or_else(|| loader.env.get(CONFIG_FILE_ENV).map(PathBuf::from));
        match file {
            Some(path) => loader.with_file(path),
            None => loader,
        }
    }

    /// Reads settings from `path`; the format follows the extension.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Uses `vars` as the environment; only `VOUCH_*` entries are kept.
    #[must_use]
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env.extend(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .filter(|(k, _)| k.starts_with("VOUCH_")),
        );
        self
    }

    /// Config file in use, if any.
    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Merges every layer and validates the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is unreadable, an override is
    /// malformed, or the merged values are invalid.
    pub fn load(&self) -> Result<HarnessConfig, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = &self.file {
            debug!(path = %path.display(), "loading config file");
            builder = builder.add_source(File::from(path.as_path()));
        }

        for &(name, key, integer) in ENV_OVERRIDES {
            let Some(value) = self.env.get(name) else {
                continue;
            };
            debug!(variable = name, "applying environment override");
            builder = if integer {
                let parsed: i64 = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    name: name.to_string(),
                    value: value.clone(),
                })?;
                builder.set_override(key, parsed)?
            } else {
                builder.set_override(key, value.clone())?
            };
        }

        let config: HarnessConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;
    use vouch_domain::config::BodyPolicy;

    fn config_file(extension: &str, contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(extension)
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_layers() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, HarnessConfig::default());
    }

    #[test]
    fn test_yaml_file() {
        let file = config_file(
            ".yaml",
            "baseUri: http://books.internal:9000\ntimeoutMs: 1500\nbodyPolicy: always_evaluate\n",
        );

        let config = ConfigLoader::new().with_file(file.path()).load().unwrap();

        assert_eq!(config.base_uri, "http://books.internal:9000");
        assert_eq!(config.timeout_ms, 1500);
        assert_eq!(config.body_policy, BodyPolicy::AlwaysEvaluate);
        assert_eq!(config.default_content_type, "application/json");
    }

    #[test]
    fn test_json_file() {
        let file = config_file(".json", r#"{"parallelism": 4, "reportPath": "out/report.json"}"#);

        let config = ConfigLoader::new().with_file(file.path()).load().unwrap();

        assert_eq!(config.parallelism, 4);
        assert_eq!(config.report_path, Some(PathBuf::from("out/report.json")));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = config_file(".yaml", "baseUri: http://from-file:1\ntimeoutMs: 1500\n");

        let config = ConfigLoader::new()
            .with_file(file.path())
            .with_env([
                ("VOUCH_BASE_URI", "http://from-env:2"),
                ("VOUCH_PARALLELISM", "3"),
                ("HOME", "/root"),
            ])
            .load()
            .unwrap();

        assert_eq!(config.base_uri, "http://from-env:2");
        assert_eq!(config.timeout_ms, 1500);
        assert_eq!(config.parallelism, 3);
    }

    #[test]
    fn test_malformed_env_value() {
        let result = ConfigLoader::new()
            .with_env([("VOUCH_TIMEOUT_MS", "soon")])
            .load();
        assert!(matches!(result, Err(ConfigError::InvalidEnv { .. })));
    }

    #[test]
    fn test_validation_runs_after_merge() {
        let result = ConfigLoader::new()
            .with_env([("VOUCH_TIMEOUT_MS", "0")])
            .load();
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = ConfigLoader::new()
            .with_file("/nonexistent/vouch.yaml")
            .load();
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_config_file_from_env() {
        let loader = ConfigLoader::new().with_env([(CONFIG_FILE_ENV, "ci.yaml")]);
        assert!(loader.file().is_none());
        assert_eq!(
            loader.env.get(CONFIG_FILE_ENV).map(String::as_str),
            Some("ci.yaml")
        );
    }
}
