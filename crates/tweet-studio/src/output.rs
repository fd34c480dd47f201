//! Status lines for the person at the terminal
//!
//! Everything here goes to stderr with a colored bracketed prefix, leaving
//! stdout for the generated content itself.

use colored::*;

/// Write each line of a message to stderr
pub fn log(message: &str) {
  for line in message.lines() {
    eprintln!("{line}");
  }
}

fn format_prefix(color: Color, prefix: &str) -> String {
  format!("[{}]{:<width$}", prefix.color(color).bold(), "", width = 7 - prefix.len() - 2)
}

fn prefixed(color: Color, prefix: &str, message: &str) {
  let prefix = format_prefix(color, prefix);
  for line in message.lines() {
    log(&format!("{prefix} {line}"));
  }
}

pub fn info(message: &str) {
  prefixed(Color::Blue, "info", message);
}

pub fn warn(message: &str) {
  prefixed(Color::Yellow, "warn", message);
}

pub fn success(message: &str) {
  prefixed(Color::Green, "done", message);
}

/// Blocking failure notice, the terminal's stand-in for an alert dialog
pub fn alert(message: &str) {
  prefixed(Color::BrightRed, "error", &format!("Error: {message}"));
}

/// Title line framed by a rule
pub fn announce(title: &str) {
  let rule = "─".repeat(title.chars().count().max(40));
  log(&rule.dimmed().to_string());
  log(&title.bold().to_string());
  log(&rule.dimmed().to_string());
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_prefix_pads_to_fixed_width() {
    colored::control::set_override(false);
    assert_eq!(format_prefix(Color::Blue, "info"), "[info] ");
    assert_eq!(format_prefix(Color::Red, "error"), "[error]");
    colored::control::unset_override();
  }
}
