//! CLI configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sp_saml::{ResponseOptions, Settings};

/// CLI configuration, read from `~/.saml-sp/config.toml` by default.
///
/// ```toml
/// [settings]
/// idp_cert_fingerprint = "E3:9E:12:0C:89:64:A8:97:66:A9:DC:7E:62:75:E2:6B:DA:D9:1B:10"
/// sp_entity_id = "https://sp.example.com/metadata"
///
/// [options]
/// allowed_clock_drift = 1.5
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// IdP trust settings.
    pub settings: Settings,

    /// Default validation options.
    pub options: OptionsConfig,
}

/// Validation options as stored in the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsConfig {
    /// Tolerated clock skew in seconds.
    pub allowed_clock_drift: f64,
    /// Scalar attribute lookups return the first value only.
    pub single_value_compatibility: bool,
    /// Skip the time window check.
    pub skip_conditions: bool,
    /// Skip the audience check.
    pub skip_audience: bool,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            allowed_clock_drift: 0.0,
            single_value_compatibility: true,
            skip_conditions: false,
            skip_audience: false,
        }
    }
}

impl OptionsConfig {
    /// Builds library options from the stored values.
    pub fn to_response_options(&self) -> ResponseOptions {
        ResponseOptions {
            allowed_clock_drift: self.allowed_clock_drift,
            single_value_compatibility: self.single_value_compatibility,
            skip_conditions: self.skip_conditions,
            skip_audience: self.skip_audience,
            ..ResponseOptions::default()
        }
    }
}

impl CliConfig {
    /// Loads configuration.
    ///
    /// An explicit path must exist. Without one, the default path is used
    /// when present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> crate::CliResult<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::config_path() {
                Ok(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let content = std::fs::read_to_string(&path).map_err(|e| {
            crate::CliError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml_str(content: &str) -> crate::CliResult<Self> {
        toml::from_str(content)
            .map_err(|e| crate::CliError::Config(format!("failed to parse config: {e}")))
    }

    /// Gets the configuration file path.
    pub fn config_path() -> crate::CliResult<PathBuf> {
        let home = dirs_next::home_dir().ok_or_else(|| {
            crate::CliError::Config("could not determine home directory".to_string())
        })?;
        Ok(home.join(".saml-sp").join("config.toml"))
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
}
