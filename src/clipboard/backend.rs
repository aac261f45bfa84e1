use crate::models::ClipboardKind;

/// Trait for clipboard backend abstraction
/// Supports different clipboard systems (macOS pasteboard, Wayland)
/// Backend is read-only: it inspects the clipboard, extraction is handled by the pipeline
pub trait ClipboardBackend: Send + Sync {
    /// Probe what the clipboard holds. Never fails: probe errors map to
    /// `Empty` (or to `Text` when text can still be read).
    fn classify(&self) -> ClipboardKind;

    /// Raw clipboard text, `None` if empty or unreadable
    fn read_text(&self) -> Option<String>;

    /// Get the backend name (for logging/debugging)
    fn name(&self) -> &'static str;
}
