use std::fs;
use std::path::Path;

use super::error::ExtractError;
use crate::models::ImageFormat;

/// Write clipboard image bytes to `target` as PNG, converting in-process when needed
pub fn write_png(bytes: &[u8], format: ImageFormat, target: &Path) -> Result<(), ExtractError> {
    if format == ImageFormat::Png {
        fs::write(target, bytes)?;
        return Ok(());
    }

    let decoded = image::load_from_memory_with_format(bytes, format.codec())?;
    decoded.save_with_format(target, image::ImageFormat::Png)?;
    log::debug!(
        "Converted {:?} ({}x{}) to PNG at {:?}",
        format,
        decoded.width(),
        decoded.height(),
        target
    );
    Ok(())
}

/// Convert an image file on disk to PNG at `target`
pub fn convert_file(source: &Path, format: ImageFormat, target: &Path) -> Result<(), ExtractError> {
    let bytes = fs::read(source)?;
    write_png(&bytes, format, target)
}
