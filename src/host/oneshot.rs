use anyhow::{Context, Result};
use std::io::Write;

use super::{Host, KeyEvent, PasteGesture, SessionId};

/// Host for the `paste` subcommand: yields a single paste gesture and writes
/// the injected text to `writer` (stdout) verbatim, without a trailing newline
pub struct OneShotHost<W> {
    writer: W,
    pending: Option<KeyEvent>,
}

impl<W: Write> OneShotHost<W> {
    pub fn new(writer: W) -> Self {
        OneShotHost {
            writer,
            pending: None,
        }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<W: Write> Host for OneShotHost<W> {
    fn subscribe(&mut self, gesture: &PasteGesture) -> Result<()> {
        self.pending = Some(gesture.event());
        Ok(())
    }

    fn next_event(&mut self) -> Result<Option<KeyEvent>> {
        Ok(self.pending.take())
    }

    fn active_session(&mut self) -> Option<SessionId> {
        Some(SessionId("stdout".to_string()))
    }

    fn inject(&mut self, _session: &SessionId, text: &str) -> Result<()> {
        self.writer
            .write_all(text.as_bytes())
            .and_then(|()| self.writer.flush())
            .context("Failed to write to stdout")
    }
}
