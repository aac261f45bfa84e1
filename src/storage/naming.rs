use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeZone};
use std::fmt::{Display, Write};
use std::path::{Path, PathBuf};

use super::config::DEFAULT_FILENAME_FORMAT;

/// Extension of every image written to the save directory
pub const IMAGE_EXTENSION: &str = "png";

/// Stem used when the template renders to nothing
const FALLBACK_STEM: &str = "image";

/// Render a strftime template for `now`.
/// Invalid templates fall back to the default format instead of panicking.
pub fn render_stem<Tz>(template: &str, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let items: Vec<Item<'_>> = StrftimeItems::new(template).collect();
    let rendered = if items.iter().any(|item| matches!(item, Item::Error)) {
        log::warn!(
            "Invalid filename format {:?}, using {:?}",
            template,
            DEFAULT_FILENAME_FORMAT
        );
        now.format(DEFAULT_FILENAME_FORMAT).to_string()
    } else {
        let mut out = String::new();
        match write!(out, "{}", now.format_with_items(items.iter())) {
            Ok(()) => out,
            Err(_) => now.format(DEFAULT_FILENAME_FORMAT).to_string(),
        }
    };

    if rendered.trim().is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        rendered
    }
}

/// Compute a path in `dir` for a new image that does not collide with an existing file.
///
/// Tries `<stem>.png`, then `<stem>_1.png`, `<stem>_2.png`, ...
pub fn unique_image_path<Tz>(dir: &Path, template: &str, now: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let stem = render_stem(template, now);
    let candidate = dir.join(format!("{}.{}", stem, IMAGE_EXTENSION));
    if !candidate.exists() {
        return candidate;
    }

    let mut counter: u32 = 1;
    loop {
        let candidate = dir.join(format!("{}_{}.{}", stem, counter, IMAGE_EXTENSION));
        if !candidate.exists() {
            log::debug!("Name collision on {:?}, using {:?}", stem, candidate);
            return candidate;
        }
        counter += 1;
    }
}
