//! Terminal host collaborator
//!
//! The host delivers key events, knows which session is active and accepts
//! text to inject into it. [`StdioHost`] speaks a JSON-lines bridge protocol
//! over stdin/stdout; [`OneShotHost`] performs a single paste to stdout.

pub mod oneshot;
pub mod stdio;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use oneshot::OneShotHost;
pub use stdio::StdioHost;

/// Key modifiers as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Command,
    Control,
    Option,
    Shift,
    Function,
}

/// One key press delivered by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub keycode: u16,
    pub modifiers: Vec<Modifier>,
}

/// Key combination treated as the paste gesture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteGesture {
    pub keycode: u16,
    pub modifiers: Vec<Modifier>,
}

impl PasteGesture {
    /// Virtual keycode of `V` on macOS
    pub const KEYCODE_V: u16 = 9;

    /// Does this key event match exactly (same key, same modifier set)?
    pub fn matches(&self, event: &KeyEvent) -> bool {
        if event.keycode != self.keycode {
            return false;
        }
        let mut expected = self.modifiers.clone();
        let mut actual = event.modifiers.clone();
        expected.sort();
        expected.dedup();
        actual.sort();
        actual.dedup();
        expected == actual
    }

    /// Synthesize an event matching this gesture
    pub fn event(&self) -> KeyEvent {
        KeyEvent {
            keycode: self.keycode,
            modifiers: self.modifiers.clone(),
        }
    }
}

impl Default for PasteGesture {
    /// Command+V
    fn default() -> Self {
        PasteGesture {
            keycode: Self::KEYCODE_V,
            modifiers: vec![Modifier::Command],
        }
    }
}

/// Identifier of a terminal session, opaque to this crate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trait for terminal host abstraction
pub trait Host {
    /// Register for the paste gesture in interception mode (host's own paste
    /// suppressed). Failure here is fatal to the process.
    fn subscribe(&mut self, gesture: &PasteGesture) -> Result<()>;

    /// Block until the next key event. `Ok(None)` when the host closed the stream.
    fn next_event(&mut self) -> Result<Option<KeyEvent>>;

    /// Session that should receive the paste, if any
    fn active_session(&mut self) -> Option<SessionId>;

    /// Inject text into a session as if pasted
    fn inject(&mut self, session: &SessionId, text: &str) -> Result<()>;
}
