//! Studio configuration
//!
//! Settings come from `config.json` in the studio directory when present,
//! then command-line flags (which also read `TWEET_STUDIO_*` environment
//! variables) override individual fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StudioError};
use crate::options::GenerationOptions;

const CONFIG_FILE: &str = "config.json";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
  /// Base URL of the tweet backend (e.g., "http://localhost:8000")
  #[serde(default = "default_backend_url")]
  pub backend_url: String,
  /// Key sent in the `api-key` header when posting
  #[serde(default)]
  pub api_key: Option<String>,
  /// Account name the posts are published under
  #[serde(default = "default_username")]
  pub username: String,
  /// Request timeout in seconds; requests wait indefinitely when unset
  #[serde(default)]
  pub timeout_secs: Option<u64>,
  /// Options used when a command does not set them
  #[serde(default)]
  pub defaults: GenerationOptions,
}

fn default_backend_url() -> String {
  "http://localhost:8000".to_string()
}

fn default_username() -> String {
  "studio".to_string()
}

impl Default for Config {
  fn default() -> Self {
    Self {
      backend_url: default_backend_url(),
      api_key: None,
      username: default_username(),
      timeout_secs: None,
      defaults: GenerationOptions::default(),
    }
  }
}

impl Config {
  /// Load configuration from a file
  pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
  }

  /// Load `config.json` from the studio directory, or defaults when absent
  pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
    let path = dir.as_ref().join(CONFIG_FILE);
    if path.exists() {
      return Self::load_from_file(path);
    }

    Ok(Config::default())
  }

  /// Save configuration to a file
  pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
    let content = serde_json::to_string_pretty(self)?;
    std::fs::write(path, content)?;
    Ok(())
  }

  /// Backend URL without a trailing slash, so endpoints can be appended
  pub fn base_url(&self) -> &str {
    self.backend_url.trim_end_matches('/')
  }

  pub fn validate(&self) -> Result<()> {
    let parsed = url::Url::parse(&self.backend_url).map_err(|e| StudioError::Config {
      message: format!("backend_url '{}' is not a valid URL: {e}", self.backend_url),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
      return Err(StudioError::Config {
        message: format!("backend_url must use http or https, got '{}'", parsed.scheme()),
      });
    }

    if self.username.trim().is_empty() {
      return Err(StudioError::Config { message: "username must not be empty".to_string() });
    }

    Ok(())
  }
}
