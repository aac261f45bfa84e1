pub mod clip;

pub use clip::{ClipboardImage, ClipboardKind, ExtractionResult, ImageFormat, PasteEvent};
