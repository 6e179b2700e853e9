//! Script templates for common ExtendScript patterns.
//!
//! Anything interpolated from caller input goes through [`js_string`]
//! so quotes, backslashes, and newlines cannot break out of the string
//! literal they land in.

/// Quotes a Rust string as a JavaScript string literal.
#[must_use]
pub fn js_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Wraps a script with try/catch and a document-presence check.
///
/// The wrapped script returns the standard freeform envelope
/// `{success, result?, error?, line?}` as a JSON string.
#[must_use]
pub fn wrap_with_error_handling(script: &str, operation: &str) -> String {
    format!(
        r#"(function() {{
    try {{
        if (!app.documents.length) {{
            return JSON.stringify({{
                success: false,
                error: "NO_DOCUMENT: No document is open. Create or open a document first."
            }});
        }}
        var doc = app.activeDocument;
        var result = (function() {{
{script}
        }})();
        return JSON.stringify({{ success: true, result: result === undefined ? {operation} : result }});
    }} catch (e) {{
        return JSON.stringify({{
            success: false,
            error: e.message || String(e),
            line: e.line || null
        }});
    }}
}})();"#,
        operation = js_string(operation),
    )
}

/// Like [`wrap_with_error_handling`] but without requiring a document.
///
/// For operations that create their own document.
#[must_use]
pub fn wrap_no_document_check(script: &str, operation: &str) -> String {
    format!(
        r#"(function() {{
    try {{
        var result = (function() {{
{script}
        }})();
        return JSON.stringify({{ success: true, result: result === undefined ? {operation} : result }});
    }} catch (e) {{
        return JSON.stringify({{
            success: false,
            error: e.message || String(e),
            line: e.line || null
        }});
    }}
}})();"#,
        operation = js_string(operation),
    )
}

/// Fragment that fails fast when nothing is selected.
#[must_use]
pub fn selection_check() -> &'static str {
    r#"var sel = doc.selection;
if (!sel || sel.length === 0) {
    throw new Error("NO_SELECTION: select one or more objects first");
}"#
}

// === Document lifecycle templates ===

/// Creates a new document with the given size in points.
#[must_use]
pub fn create_document(width: f64, height: f64, color_space: &str, title: Option<&str>) -> String {
    let title_line = title
        .map(|t| format!("preset.title = {};", js_string(t)))
        .unwrap_or_default();
    let body = format!(
        r#"var preset = new DocumentPreset();
preset.width = {width};
preset.height = {height};
preset.colorMode = DocumentColorSpace.{color_space};
preset.units = RulerUnits.Points;
{title_line}
var doc = app.documents.addDocument(DocumentColorSpace.{color_space}, preset);
return {{ name: doc.name, width: doc.width, height: doc.height }};"#
    );
    wrap_no_document_check(&body, "create_document")
}

/// Summarizes the active document.
#[must_use]
pub fn document_info() -> String {
    wrap_with_error_handling(
        r#"return {
    name: doc.name,
    width: doc.width,
    height: doc.height,
    colorMode: doc.documentColorSpace == DocumentColorSpace.CMYK ? "CMYK" : "RGB",
    layerCount: doc.layers.length,
    selectionCount: doc.selection.length,
    saved: doc.saved
};"#,
        "document_info",
    )
}

/// Summarizes the host application; works with no document open.
#[must_use]
pub fn app_info() -> String {
    wrap_no_document_check(
        r#"return {
    name: app.name,
    version: app.version,
    documentsOpen: app.documents.length,
    activeDocumentName: app.documents.length > 0 ? app.activeDocument.name : null
};"#,
        "app_info",
    )
}

/// Exports the active document.
///
/// `format` must be one of `png`, `jpg`, `svg`.
#[must_use]
pub fn export_document(path: &str, format: &str, scale: f64) -> String {
    let (options_class, export_type) = match format {
        "jpg" => ("ExportOptionsJPEG", "ExportType.JPEG"),
        "svg" => ("ExportOptionsSVG", "ExportType.SVG"),
        _ => ("ExportOptionsPNG24", "ExportType.PNG24"),
    };
    let scale_lines = if format == "svg" {
        String::new()
    } else {
        format!(
            "opts.horizontalScale = {scale};\nopts.verticalScale = {scale};",
            scale = scale * 100.0
        )
    };
    let body = format!(
        r#"var file = new File({path});
var opts = new {options_class}();
{scale_lines}
doc.exportFile(file, {export_type}, opts);
return {{ exportedPath: {path}, format: {format_name} }};"#,
        path = js_string(path),
        format_name = js_string(format),
    );
    wrap_with_error_handling(&body, "export_document")
}

/// Runs a host menu command over the selection.
#[must_use]
pub fn menu_command(command: &str, min_selection: usize) -> String {
    let body = format!(
        r#"var sel = doc.selection;
if (!sel || sel.length < {min_selection}) {{
    throw new Error("select at least {min_selection} objects");
}}
app.executeMenuCommand({command});
return {{ command: {command}, count: sel.length }};"#,
        command = js_string(command),
    );
    wrap_with_error_handling(&body, command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_string_escapes_breakouts() {
        assert_eq!(js_string("plain"), "\"plain\"");
        assert_eq!(js_string("a\"b"), "\"a\\\"b\"");
        assert_eq!(js_string("back\\slash"), "\"back\\\\slash\"");
        assert_eq!(js_string("line\nbreak"), "\"line\\nbreak\"");
        // A classic injection attempt stays inside the literal.
        let hostile = "\"; app.quit(); //";
        let quoted = js_string(hostile);
        assert!(!quoted.contains("\"; app.quit"));
    }

    #[test]
    fn wrapped_scripts_check_for_documents() {
        let script = wrap_with_error_handling("return 1;", "demo");
        assert!(script.contains("app.documents.length"));
        assert!(script.contains("NO_DOCUMENT"));
        assert!(script.contains("JSON.stringify"));
    }

    #[test]
    fn create_document_skips_title_when_absent() {
        let with = create_document(600.0, 400.0, "RGB", Some("Poster"));
        assert!(with.contains("preset.title = \"Poster\""));
        let without = create_document(600.0, 400.0, "RGB", None);
        assert!(!without.contains("preset.title"));
    }

    #[test]
    fn export_templates_pick_the_right_options_class() {
        assert!(export_document("/tmp/x.png", "png", 1.0).contains("ExportOptionsPNG24"));
        assert!(export_document("/tmp/x.jpg", "jpg", 2.0).contains("ExportOptionsJPEG"));
        let svg = export_document("/tmp/x.svg", "svg", 1.0);
        assert!(svg.contains("ExportOptionsSVG"));
        assert!(!svg.contains("horizontalScale"));
    }

    #[test]
    fn export_path_is_quoted() {
        let script = export_document("/tmp/weird \"name\".png", "png", 1.0);
        assert!(script.contains("\\\"name\\\""));
    }

    #[test]
    fn menu_command_enforces_minimum_selection() {
        let script = menu_command("group", 2);
        assert!(script.contains("sel.length < 2"));
        assert!(script.contains("executeMenuCommand(\"group\")"));
    }
}
