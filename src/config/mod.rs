use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://localhost:3004";
pub const DEFAULT_ENDPOINT: &str = "/antigaspi";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Optional colour overrides, `#RRGGBB` or `#RGB`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ThemeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_dim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg_selected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    /// Base URL of the catalog API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    /// Path of the catalog endpoint, relative to the base
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// HTTP request timeout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub theme: ThemeConfig,
}

/// Command line values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_base: Option<String>,
    pub endpoint: Option<String>,
}

/// Configuration resolved once at startup and passed down explicitly
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub api_base: String,
    pub endpoint: String,
    pub timeout: Duration,
    pub theme: ThemeConfig,
}

impl ResolvedConfig {
    /// Full URL of the catalog endpoint
    pub fn catalog_url(&self) -> String {
        format!("{}{}", self.api_base, self.endpoint)
    }
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        AppConfig::default().resolve(Overrides::default())
    }
}

impl AppConfig {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("antigaspi").join("config.toml"))
    }

    /// Read and parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Load config from the given path (or the default location).
    /// A missing or broken file falls back to defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(p) => p,
            None => {
                tracing::warn!("Could not find config directory, using defaults");
                return AppConfig::default();
            }
        };

        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return AppConfig::default();
        }

        match Self::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{:#}", e);
                AppConfig::default()
            }
        }
    }

    /// Merge command line overrides, file values and defaults
    pub fn resolve(self, overrides: Overrides) -> ResolvedConfig {
        let api_base = overrides
            .api_base
            .or(self.api_base)
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let endpoint = overrides
            .endpoint
            .or(self.endpoint)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        ResolvedConfig {
            api_base: api_base.trim_end_matches('/').to_string(),
            endpoint: normalize_endpoint(&endpoint),
            timeout: Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS).max(1)),
            theme: self.theme,
        }
    }
}

fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim();
    if trimmed.is_empty() || trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
