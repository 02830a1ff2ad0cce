use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{LensError, Result};
use crate::rules::ExtractionRules;

/// Global merchant-lens configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the scoring service
    #[serde(default = "default_base_url")]
    pub firewall_base_url: String,

    /// Timeout for scoring requests
    #[serde(default = "default_score_timeout")]
    pub score_timeout_secs: u64,

    /// Timeout for the connectivity check
    #[serde(default = "default_status_timeout")]
    pub status_timeout_secs: u64,

    /// Timeout for investigation requests (these wait on an LLM)
    #[serde(default = "default_investigate_timeout")]
    pub investigate_timeout_secs: u64,

    /// Overrides for the extraction heuristics
    #[serde(default)]
    pub rules: ExtractionRules,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_score_timeout() -> u64 {
    5
}

fn default_status_timeout() -> u64 {
    2
}

fn default_investigate_timeout() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            firewall_base_url: default_base_url(),
            score_timeout_secs: default_score_timeout(),
            status_timeout_secs: default_status_timeout(),
            investigate_timeout_secs: default_investigate_timeout(),
            rules: ExtractionRules::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a file, falling back to defaults if it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            config.rules.validate().map_err(LensError::ConfigError)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| LensError::ConfigError(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Set the scoring service URL, checking that it parses
    pub fn set_base_url(&mut self, url: &str) -> Result<()> {
        let parsed = url::Url::parse(url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(LensError::ConfigError(format!(
                "Unsupported scheme '{}', use http or https",
                parsed.scheme()
            )));
        }
        self.firewall_base_url = url.trim_end_matches('/').to_string();
        Ok(())
    }

    /// Get the config file path
    ///
    /// Supports MERCHANT_LENS_CONFIG environment variable for test isolation
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("MERCHANT_LENS_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let dirs = ProjectDirs::from("", "", "merchant-lens")
            .ok_or_else(|| LensError::ConfigError("Could not determine config directory".into()))?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.firewall_base_url, "http://localhost:8000");
        assert_eq!(config.score_timeout_secs, 5);
        assert_eq!(config.status_timeout_secs, 2);
        assert_eq!(config.rules, ExtractionRules::default());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set_base_url("https://firewall.example.com/").unwrap();
        config.rules.copyright_max_chars = 40;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.firewall_base_url, "https://firewall.example.com");
        assert_eq!(loaded.rules.copyright_max_chars, 40);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "firewall_base_url = \"http://10.0.0.5:9000\"\n\n[rules]\ncompound_slds = [\"co\"]\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.firewall_base_url, "http://10.0.0.5:9000");
        assert_eq!(config.score_timeout_secs, 5);
        assert_eq!(config.rules.compound_slds, vec!["co".to_string()]);
        assert_eq!(config.rules.copyright_max_chars, 30);
    }

    #[test]
    fn test_invalid_rules_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[rules]\ncopyright_min_chars = 50\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(LensError::ConfigError(_))));
    }

    #[test]
    fn test_set_base_url_rejects_bad_scheme() {
        let mut config = Config::default();
        assert!(config.set_base_url("ftp://example.com").is_err());
        assert!(config.set_base_url("not a url").is_err());
        assert_eq!(config.firewall_base_url, "http://localhost:8000");
    }
}
