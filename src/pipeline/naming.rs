//! Output filename planning: template substitution and collision handling.
//!
//! ## Why a fallback instead of an error?
//!
//! The template is user-supplied free text, and a broken template discovered
//! on file 37 of a 200-file batch must not kill the run. Any rendering
//! problem — unknown field, stray brace — falls back to the fixed pattern
//! `{prefix}{pdf_name}_page_{page_num}.png`, which is built by direct string
//! formatting and cannot itself fail. The fallback is reported as a warning
//! so the user learns their template is broken without losing the batch.

use crate::events::{EventSink, EventSinkExt};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Template placeholders: `{field_name}`.
static FIELD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([a-z_]+)\}").expect("static regex"));

/// Derive the output filename for one (document, page) pair.
///
/// Substitution fields: `{pdf_name}` (stem), `{pdf_suffix}` (extension with
/// dot), `{page_num}`, `{total_pages}`, `{dpi}`, `{prefix}`,
/// `{original_dir_name}` (immediate parent directory name) and
/// `{relative_parent_dir_name}` (the path segment of the document's
/// directory immediately below `original_root`; empty when the document
/// sits directly under the root).
///
/// The returned name always carries a `.png` suffix.
pub fn plan_filename(
    template: &str,
    document: &Path,
    page_num: u32,
    total_pages: u32,
    dpi: u32,
    prefix: &str,
    original_root: Option<&Path>,
    sink: &dyn EventSink,
) -> String {
    let stem = document
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = document
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let parent_name = document
        .parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let relative_parent = relative_parent_dir_name(document, original_root, &parent_name);

    let fallback = format!("{prefix}{stem}_page_{page_num}.png");
    if template.is_empty() {
        return fallback;
    }

    let fields: [(&str, String); 8] = [
        ("pdf_name", stem),
        ("pdf_suffix", suffix),
        ("page_num", page_num.to_string()),
        ("total_pages", total_pages.to_string()),
        ("dpi", dpi.to_string()),
        ("prefix", prefix.to_string()),
        ("original_dir_name", parent_name),
        ("relative_parent_dir_name", relative_parent),
    ];

    match render_template(template, &fields) {
        Ok(name) => ensure_png_suffix(name),
        Err(unknown) => {
            sink.warn(format!(
                "filename template '{template}' references unknown field '{{{unknown}}}'; using the default pattern"
            ));
            fallback
        }
    }
}

/// Substitute every `{field}` occurrence; an unrecognised field name fails
/// the whole template.
fn render_template(template: &str, fields: &[(&str, String)]) -> Result<String, String> {
    for caps in FIELD.captures_iter(template) {
        let name = &caps[1];
        if !fields.iter().any(|(known, _)| *known == name) {
            return Err(name.to_string());
        }
    }
    let rendered = FIELD.replace_all(template, |caps: &regex::Captures<'_>| {
        fields
            .iter()
            .find(|(known, _)| *known == &caps[1])
            .map(|(_, value)| value.clone())
            .unwrap_or_default()
    });
    Ok(rendered.into_owned())
}

/// The `{relative_parent_dir_name}` field: first path component between the
/// input root and the document. Falls back to the immediate parent name when
/// the document is not under the root at all.
fn relative_parent_dir_name(
    document: &Path,
    original_root: Option<&Path>,
    parent_name: &str,
) -> String {
    let Some(root) = original_root else {
        return String::new();
    };
    let Some(parent) = document.parent() else {
        return String::new();
    };
    if parent == root {
        return String::new();
    }
    match parent.strip_prefix(root) {
        Ok(relative) => relative
            .components()
            .next()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .unwrap_or_default(),
        Err(_) => parent_name.to_string(),
    }
}

fn ensure_png_suffix(mut name: String) -> String {
    if !name.to_ascii_lowercase().ends_with(".png") {
        name.push_str(".png");
    }
    name
}

/// Find a path that does not currently exist.
///
/// An unclaimed candidate is returned unchanged. Otherwise probes
/// `stem_copy_1`, `stem_copy_2`, … in the same directory until a free name
/// turns up. Advisory only: another process claiming the name between probe
/// and write is out of scope (single-process assumption).
pub fn resolve_collision(candidate: &Path) -> PathBuf {
    if !candidate.exists() {
        return candidate.to_path_buf();
    }

    let stem = candidate
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = candidate
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let parent = candidate.parent().unwrap_or(Path::new(""));

    let mut counter = 1u32;
    loop {
        let probe = parent.join(format!("{stem}_copy_{counter}{suffix}"));
        if !probe.exists() {
            return probe;
        }
        counter += 1;
    }
}
