//! Prompt directive parsing
//!
//! Users tend to type instructions like "write a tweet about: ..." or
//! "include hashtags" straight into the topic. Those phrases toggle the
//! matching generation option and are stripped before the prompt is sent.

use once_cell::sync::Lazy;
use regex::Regex;

static LEAD_IN: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(?i)write a tweet about[:\-]*").expect("valid lead-in pattern"));
static NEGATIVE_DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?i)don['’]?t include (hashtags?|emojis?)").expect("valid negative pattern")
});
static POSITIVE_DIRECTIVE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"(?i)include (hashtags?|emojis?)").expect("valid positive pattern"));
static FILLER: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?i)don['’]?t include unnecessary statements").expect("valid filler pattern")
});

/// A typed prompt with its directives pulled out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPrompt {
  /// Prompt text to send to the backend
  pub prompt: String,
  /// `Some` when the prompt asked to turn hashtags on or off
  pub hashtag: Option<bool>,
  /// `Some` when the prompt asked to turn emojis on or off
  pub emoji: Option<bool>,
}

fn directive(lowered: &str, subject: &str) -> Option<bool> {
  let negated = ["don't", "dont", "don’t"]
    .iter()
    .any(|negation| lowered.contains(&format!("{negation} include {subject}")));
  if negated {
    Some(false)
  } else if lowered.contains(&format!("include {subject}")) {
    Some(true)
  } else {
    None
  }
}

/// Split a raw prompt into the topic and any option directives it carries
pub fn parse_prompt(input: &str) -> ParsedPrompt {
  let lowered = input.to_lowercase();
  let hashtag = directive(&lowered, "hashtag");
  let emoji = directive(&lowered, "emoji");

  let text = LEAD_IN.replace(input, "");
  let text = FILLER.replace_all(&text, "");
  let text = NEGATIVE_DIRECTIVE.replace_all(&text, "");
  let text = POSITIVE_DIRECTIVE.replace_all(&text, "");

  ParsedPrompt { prompt: text.trim().to_string(), hashtag, emoji }
}
