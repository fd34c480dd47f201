//! System clipboard access for the copy command
//!
//! On Linux the clipboard is owned by the process that set it, so the text
//! vanishes as soon as the CLI exits unless we keep serving it. There the
//! call blocks until another application takes the selection over.

use crate::error::{Result, StudioError};

fn unavailable(e: arboard::Error) -> StudioError {
  StudioError::Clipboard { message: e.to_string() }
}

#[cfg(target_os = "linux")]
pub fn copy_to_clipboard(text: &str) -> Result<()> {
  use arboard::SetExtLinux;

  let mut clipboard = arboard::Clipboard::new().map_err(unavailable)?;
  clipboard.set().wait().text(text.to_string()).map_err(unavailable)
}

#[cfg(not(target_os = "linux"))]
pub fn copy_to_clipboard(text: &str) -> Result<()> {
  let mut clipboard = arboard::Clipboard::new().map_err(unavailable)?;
  clipboard.set_text(text.to_string()).map_err(unavailable)
}

/// Whether copying holds the terminal until the selection is taken over
pub fn copy_blocks() -> bool {
  cfg!(target_os = "linux")
}
