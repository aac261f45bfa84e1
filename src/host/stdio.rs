use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};

use super::{Host, KeyEvent, Modifier, PasteGesture, SessionId};

/// Messages the host sends, one JSON object per line
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum HostMessage {
    /// A key press; `session` (if present) is where it happened
    Keystroke {
        keycode: u16,
        #[serde(default)]
        modifiers: Vec<Modifier>,
        #[serde(default)]
        session: Option<SessionId>,
    },
    /// The active session changed (`null` when no terminal window is focused)
    Focus { session: Option<SessionId> },
}

/// Commands sent back to the host
#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum HostCommand<'a> {
    Subscribe {
        keycode: u16,
        modifiers: &'a [Modifier],
        suppress_default: bool,
    },
    Inject {
        session: &'a SessionId,
        text: &'a str,
    },
}

/// JSON-lines bridge to the terminal host: events on `reader`, commands on `writer`
pub struct StdioHost<R, W> {
    reader: R,
    writer: W,
    active: Option<SessionId>,
    line: String,
}

impl<R: BufRead, W: Write> StdioHost<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        StdioHost {
            reader,
            writer,
            active: None,
            line: String::new(),
        }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    fn send(&mut self, command: &HostCommand<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.writer, command)
            .context("Failed to encode host command")?;
        self.writer
            .write_all(b"\n")
            .and_then(|()| self.writer.flush())
            .context("Failed to write to host")?;
        Ok(())
    }
}

impl<R: BufRead, W: Write> Host for StdioHost<R, W> {
    fn subscribe(&mut self, gesture: &PasteGesture) -> Result<()> {
        self.send(&HostCommand::Subscribe {
            keycode: gesture.keycode,
            modifiers: &gesture.modifiers,
            suppress_default: true,
        })?;
        log::info!(
            "Subscribed to keycode {} with {:?}",
            gesture.keycode,
            gesture.modifiers
        );
        Ok(())
    }

    fn next_event(&mut self) -> Result<Option<KeyEvent>> {
        loop {
            self.line.clear();
            let read = self
                .reader
                .read_line(&mut self.line)
                .context("Failed to read from host")?;
            if read == 0 {
                log::info!("Host closed the event stream");
                return Ok(None);
            }

            let line = self.line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<HostMessage>(line) {
                Ok(HostMessage::Focus { session }) => {
                    log::debug!("Active session: {:?}", session);
                    self.active = session;
                }
                Ok(HostMessage::Keystroke {
                    keycode,
                    modifiers,
                    session,
                }) => {
                    if session.is_some() {
                        self.active = session;
                    }
                    return Ok(Some(KeyEvent { keycode, modifiers }));
                }
                Err(e) => log::warn!("Ignoring malformed host message {:?}: {}", line, e),
            }
        }
    }

    fn active_session(&mut self) -> Option<SessionId> {
        self.active.clone()
    }

    fn inject(&mut self, session: &SessionId, text: &str) -> Result<()> {
        self.send(&HostCommand::Inject { session, text })
    }
}
