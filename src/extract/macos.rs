use std::path::Path;
use std::sync::Arc;

use super::TOOL_TIMEOUT;
use super::convert;
use super::error::ExtractError;
use super::strategy::{ExtractionStrategy, has_output, run_tool};
use crate::models::{ClipboardImage, ImageFormat};
use crate::process::{Invocation, ToolRunner};

/// Dedicated exporter: `pngpaste <target>`
pub struct PngpasteStrategy {
    runner: Arc<dyn ToolRunner>,
}

impl PngpasteStrategy {
    pub fn new(runner: Arc<dyn ToolRunner>) -> Self {
        PngpasteStrategy { runner }
    }
}

impl ExtractionStrategy for PngpasteStrategy {
    fn name(&self) -> &'static str {
        "pngpaste"
    }

    fn extract(&self, _image: &ClipboardImage, target: &Path) -> Result<(), ExtractError> {
        run_tool(
            self.runner.as_ref(),
            &Invocation::new("pngpaste", TOOL_TIMEOUT).arg(target),
        )?;
        Ok(())
    }
}

/// Fallback: export the pasteboard TIFF with AppleScript, then convert with `sips`.
/// The TIFF lives in a temp file next to the target and is removed on every path.
/// Without `sips` the TIFF is converted in-process.
pub struct ScriptedTiffStrategy {
    runner: Arc<dyn ToolRunner>,
}

impl ScriptedTiffStrategy {
    pub fn new(runner: Arc<dyn ToolRunner>) -> Self {
        ScriptedTiffStrategy { runner }
    }

    fn export_tiff(&self, intermediate: &Path) -> Result<(), ExtractError> {
        let script = export_script(intermediate);
        run_tool(
            self.runner.as_ref(),
            &Invocation::new("osascript", TOOL_TIMEOUT).args(["-e", script.as_str()]),
        )?;

        if !has_output(intermediate) {
            return Err(ExtractError::NoOutput {
                tool: "osascript".to_string(),
                path: intermediate.to_path_buf(),
            });
        }
        Ok(())
    }

    fn convert(&self, intermediate: &Path, target: &Path) -> Result<(), ExtractError> {
        let sips = Invocation::new("sips", TOOL_TIMEOUT)
            .args(["-s", "format", "png"])
            .arg(intermediate)
            .arg("--out")
            .arg(target);

        match run_tool(self.runner.as_ref(), &sips) {
            Ok(_) => Ok(()),
            Err(e) if e.is_tool_missing() => {
                log::debug!("sips not installed, converting TIFF in-process");
                convert::convert_file(intermediate, ImageFormat::Tiff, target)
            }
            Err(e) => Err(e),
        }
    }
}

impl ExtractionStrategy for ScriptedTiffStrategy {
    fn name(&self) -> &'static str {
        "osascript+sips"
    }

    fn extract(&self, _image: &ClipboardImage, target: &Path) -> Result<(), ExtractError> {
        let dir = target.parent().unwrap_or_else(|| Path::new("."));
        let intermediate = tempfile::Builder::new()
            .prefix(".pastepath-")
            .suffix(".tiff")
            .tempfile_in(dir)?;

        self.export_tiff(intermediate.path())?;
        self.convert(intermediate.path(), target)
    }
}

/// AppleScript that writes the pasteboard's TIFF data to `path`.
/// Errors are re-raised so osascript exits non-zero.
fn export_script(path: &Path) -> String {
    format!(
        r#"set theFile to POSIX file "{}"
set theData to the clipboard as «class TIFF»
set fileRef to open for access theFile with write permission
try
    set eof fileRef to 0
    write theData to fileRef
    close access fileRef
on error errMsg number errNum
    close access fileRef
    error errMsg number errNum
end try"#,
        applescript_escape(&path.to_string_lossy())
    )
}

fn applescript_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}


#[cfg(test)]
mod tests {
    use super::testing::script_target;
    use super::*;

    #[test]
    fn test_export_script_targets_path() {
        let script = export_script(Path::new("/tmp/shots/.pastepath-x.tiff"));
        assert_eq!(script_target(&script), Path::new("/tmp/shots/.pastepath-x.tiff"));
        assert!(script.contains("«class TIFF»"));
    }

    #[test]
    fn test_applescript_escape() {
        assert_eq!(applescript_escape(r#"/a "b"\c"#), r#"/a \"b\"\\c"#);
    }
}
