use std::path::{Path, PathBuf};

/// Image formats the classifier can detect on the clipboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// Lossless raster (`«class PNGf»`, `image/png`)
    Png,
    /// Screenshot format used by macOS (`«class TIFF»`, `image/tiff`)
    Tiff,
    /// Bitmap (`image/bmp`)
    Bmp,
}

impl ImageFormat {
    /// MIME type as advertised by Wayland clipboard owners
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Tiff => "image/tiff",
            ImageFormat::Bmp => "image/bmp",
        }
    }

    /// Parse a MIME type, ignoring parameters such as `;charset=`
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        let base = mime.split(';').next().unwrap_or("").trim();
        match base {
            "image/png" => Some(ImageFormat::Png),
            "image/tiff" => Some(ImageFormat::Tiff),
            "image/bmp" | "image/x-bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }

    /// Matching format for in-process decoding
    pub fn codec(&self) -> image::ImageFormat {
        match self {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Tiff => image::ImageFormat::Tiff,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
        }
    }
}

/// Opaque handle to image data currently held by the clipboard.
/// Only records what was advertised; the bytes are pulled by an extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipboardImage {
    pub format: ImageFormat,
}

impl ClipboardImage {
    pub fn new(format: ImageFormat) -> Self {
        ClipboardImage { format }
    }
}

/// What the clipboard holds at the moment of a paste
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardKind {
    /// Nothing usable, or the probe failed
    Empty,
    /// Plain text
    Text(String),
    /// Image data worth an extraction attempt
    Image(ClipboardImage),
}

impl ClipboardKind {
    /// Label for log lines
    pub fn label(&self) -> &'static str {
        match self {
            ClipboardKind::Empty => "empty",
            ClipboardKind::Text(_) => "text",
            ClipboardKind::Image(_) => "image",
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, ClipboardKind::Image(_))
    }
}

/// Outcome of one run of the extraction pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResult {
    /// Image written to this path
    Saved(PathBuf),
    /// Every strategy failed; reason is meant for the log
    Failed(String),
}

impl ExtractionResult {
    pub fn saved_path(&self) -> Option<&Path> {
        match self {
            ExtractionResult::Saved(path) => Some(path),
            ExtractionResult::Failed(_) => None,
        }
    }
}

/// A paste gesture was observed. Carries nothing: the clipboard is queried fresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PasteEvent;
