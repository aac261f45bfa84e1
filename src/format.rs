use std::path::Path;

/// Render the text injected for a saved image.
///
/// Recognized placeholders:
/// - `{path}`: full path of the saved file
/// - `{filename}`: base file name
/// - `{dir}`: containing directory
///
/// Anything else in braces is copied through literally. Substitution is a
/// single pass, so braces inside the substituted values are never re-expanded.
pub fn format_output(template: &str, path: &Path) -> String {
    let full = path.to_string_lossy();
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    let dir = path
        .parent()
        .map(|d| d.to_string_lossy())
        .unwrap_or_default();

    let mut out = String::with_capacity(template.len() + full.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            // Unterminated brace: the remainder is literal
            out.push_str(&rest[open..]);
            return out;
        };

        match &after[..close] {
            "path" => out.push_str(&full),
            "filename" => out.push_str(&filename),
            "dir" => out.push_str(&dir),
            _ => {
                // Unknown name: emit the opening brace and rescan from the next char,
                // so "{{path}" still expands the inner placeholder
                out.push('{');
                rest = after;
                continue;
            }
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}
