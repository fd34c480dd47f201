//! Local cache of the generation history

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::history::History;

const HISTORY_FILE: &str = "chat_history.json";

/// Base directory for studio state: `$TWEET_STUDIO_DIR` or the platform data dir
pub fn studio_dir() -> PathBuf {
  if let Ok(dir) = std::env::var("TWEET_STUDIO_DIR") {
    return PathBuf::from(dir);
  }

  dirs::data_dir()
    .or_else(dirs::home_dir)
    .unwrap_or_else(std::env::temp_dir)
    .join("tweet-studio")
}

/// Persists the history array as a single JSON file
#[derive(Debug, Clone)]
pub struct HistoryStore {
  path: PathBuf,
}

impl HistoryStore {
  /// Store under the default studio directory
  pub fn new() -> Self {
    Self::in_dir(studio_dir())
  }

  pub fn in_dir(dir: impl AsRef<Path>) -> Self {
    Self { path: dir.as_ref().join(HISTORY_FILE) }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn exists(&self) -> bool {
    self.path.exists()
  }

  /// Load the cached history; a missing file is an empty history
  pub fn load(&self) -> Result<History> {
    if !self.path.exists() {
      return Ok(History::new());
    }

    let json = std::fs::read_to_string(&self.path)?;
    let history: History = serde_json::from_str(&json)?;
    Ok(history)
  }

  pub fn save(&self, history: &History) -> Result<()> {
    if let Some(parent) = self.path.parent() {
      std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(history)?;
    std::fs::write(&self.path, json)?;
    Ok(())
  }

  pub fn clear(&self) -> Result<()> {
    if self.path.exists() {
      std::fs::remove_file(&self.path)?;
    }
    Ok(())
  }
}

impl Default for HistoryStore {
  fn default() -> Self {
    Self::new()
  }
}
