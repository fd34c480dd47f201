//! Terminal rendering of the generation history

use colored::*;

use crate::record::{GenerationRecord, ImageState};

const WRAP_WIDTH: usize = 76;
const INDENT: &str = "    ";

/// Wrap text to fit within a specified width, keeping paragraph breaks
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
  let mut lines = Vec::new();

  for paragraph in text.split('\n') {
    if paragraph.trim().is_empty() {
      lines.push(String::new());
      continue;
    }

    let mut current_line = String::new();
    for word in paragraph.split_whitespace() {
      if current_line.is_empty() {
        current_line = word.to_string();
      } else if current_line.chars().count() + 1 + word.chars().count() <= width {
        current_line.push(' ');
        current_line.push_str(word);
      } else {
        lines.push(std::mem::take(&mut current_line));
        current_line = word.to_string();
      }
    }

    if !current_line.is_empty() {
      lines.push(current_line);
    }
  }

  lines
}

fn image_line(image: &ImageState) -> Option<String> {
  match image {
    ImageState::Absent => None,
    ImageState::Pending => Some("Generating image...".italic().to_string()),
    ImageState::Url(url) => Some(format!("{} {}", "🖼".cyan(), url.underline())),
  }
}

fn status_line(record: &GenerationRecord) -> String {
  let mut parts = Vec::new();
  if record.posted {
    parts.push(format!("{}", "✅ Posted".green()));
  } else {
    parts.push(format!("{}", "📤 Not posted".dimmed()));
  }
  if record.editing {
    parts.push(format!("{}", "✏️ editing".yellow()));
  }
  parts.join("  ")
}

/// Render one record as the prompt/reply pair shown in the history view
pub fn render_record(index: usize, record: &GenerationRecord) -> String {
  let mut out = Vec::new();

  out.push(format!(
    "{} {} {} {}",
    format!("#{index}").bold(),
    record.time.dimmed(),
    "You:".blue().bold(),
    record.prompt
  ));

  out.push(format!("{INDENT}{}", "AI:".magenta().bold()));
  for line in wrap_text(&record.text, WRAP_WIDTH) {
    out.push(format!("{INDENT}{line}"));
  }

  if let Some(line) = image_line(&record.image) {
    out.push(format!("{INDENT}{line}"));
  }
  out.push(format!("{INDENT}{}", status_line(record)));

  out.join("\n")
}

/// Print the whole history to stdout
pub fn print_history(records: &[GenerationRecord]) {
  if records.is_empty() {
    println!("No generations yet. Try `tweet-studio generate <topic>`.");
    return;
  }

  for (index, record) in records.iter().enumerate() {
    println!("{}", render_record(index, record));
    println!();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_wrap_text_breaks_on_width() {
    let lines = wrap_text("one two three four", 9);
    assert_eq!(lines, vec!["one two", "three", "four"]);
  }

  #[test]
  fn test_wrap_text_keeps_blank_paragraphs() {
    let lines = wrap_text("first\n\nsecond", 80);
    assert_eq!(lines, vec!["first", "", "second"]);
  }

  #[test]
  fn test_render_pending_image_and_posted_badge() {
    let mut record = GenerationRecord::new("moon", "The moon is bright.", ImageState::Pending);
    record.posted = true;
    record.time = "21:04".to_string();

    let out = render_record(2, &record);
    assert!(out.contains("#2"));
    assert!(out.contains("21:04"));
    assert!(out.contains("moon"));
    assert!(out.contains("The moon is bright."));
    assert!(out.contains("Generating image..."));
    assert!(out.contains("Posted"));
    assert!(!out.contains("Not posted"));
  }

  #[test]
  fn test_render_image_url_and_editing() {
    let mut record =
      GenerationRecord::new("sun", "Warm.", ImageState::Url("https://cdn/sun.png".to_string()));
    record.editing = true;

    let out = render_record(0, &record);
    assert!(out.contains("https://cdn/sun.png"));
    assert!(out.contains("editing"));
    assert!(out.contains("Not posted"));
  }
}
