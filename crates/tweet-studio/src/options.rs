//! Generation options sent alongside every prompt

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::prompt::ParsedPrompt;

/// Sampling temperature preset understood by the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Temperature {
  Precise,
  #[default]
  Balanced,
  Creative,
  Wild,
}

impl Temperature {
  pub fn as_str(&self) -> &'static str {
    match self {
      Temperature::Precise => "precise",
      Temperature::Balanced => "balanced",
      Temperature::Creative => "creative",
      Temperature::Wild => "wild",
    }
  }
}

impl std::fmt::Display for Temperature {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Toggles that shape a generation request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOptions {
  #[serde(default)]
  pub hashtag: bool,
  #[serde(default)]
  pub emoji: bool,
  /// Request an image for the generated text
  #[serde(default)]
  pub image: bool,
  #[serde(default)]
  pub temperature: Temperature,
}

impl GenerationOptions {
  /// Fold directives found in a typed prompt into the current options
  pub fn apply(&mut self, parsed: &ParsedPrompt) {
    if let Some(hashtag) = parsed.hashtag {
      self.hashtag = hashtag;
    }
    if let Some(emoji) = parsed.emoji {
      self.emoji = emoji;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_temperature_serializes_lowercase() {
    let json = serde_json::to_string(&Temperature::Creative).unwrap();
    assert_eq!(json, "\"creative\"");
    assert_eq!(Temperature::default(), Temperature::Balanced);
  }

  #[test]
  fn test_apply_only_touches_mentioned_toggles() {
    let mut options = GenerationOptions { hashtag: true, emoji: true, ..Default::default() };
    let parsed = ParsedPrompt { prompt: "rust".to_string(), hashtag: Some(false), emoji: None };

    options.apply(&parsed);

    assert!(!options.hashtag);
    assert!(options.emoji);
  }
}
