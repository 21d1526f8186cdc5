//! System clipboard capability

use crate::{Error, Result};

/// Somewhere replies can be copied to
pub trait Clipboard {
    /// Replace the clipboard contents
    ///
    /// # Errors
    ///
    /// Returns `Error::Clipboard` if the clipboard is unavailable
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// Desktop clipboard via arboard
///
/// A fresh handle is opened per write so a missing display server only
/// fails the copy, not the session.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| Error::Clipboard(format!("failed to open clipboard: {e}")))?;
        clipboard
            .set_text(text)
            .map_err(|e| Error::Clipboard(format!("failed to set clipboard text: {e}")))
    }
}

/// Stand-in for hosts without a clipboard; every write fails
#[derive(Debug, Default)]
pub struct NoClipboard;

impl Clipboard for NoClipboard {
    fn write_text(&mut self, _text: &str) -> Result<()> {
        Err(Error::Clipboard("no clipboard available".to_string()))
    }
}
