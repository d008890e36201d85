//! Document discovery: turn an input location into the list of PDFs to
//! convert.
//!
//! Filters look at the base filename only, never the full path, so moving a
//! tree around does not change which files match. Results are sorted
//! lexicographically: directory enumeration order differs between
//! filesystems and the batch should process the same files in the same
//! order on every run.

use crate::events::{EventSink, EventSinkExt};
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collect the PDF documents under `input`, applying the filename filters.
///
/// A single-file input is returned as-is when it has a `.pdf` extension
/// (any case); anything else yields an empty list and a warning. For a
/// directory, enumeration is recursive only when `recursive` is set.
///
/// Filter order per candidate: include keywords, then exclude keywords,
/// then the regex. A regex that fails to compile is reported once and the
/// regex filter is skipped for the whole run.
pub fn discover_documents(
    input: &Path,
    recursive: bool,
    include_keywords: &[String],
    exclude_keywords: &[String],
    regex_filter: &str,
    sink: &dyn EventSink,
) -> Vec<PathBuf> {
    let regex = compile_filter(regex_filter, sink);

    if input.is_file() {
        if !has_pdf_extension(input) {
            sink.warn(format!(
                "input '{}' is a file but not a PDF; nothing to do",
                input.display()
            ));
            return Vec::new();
        }
        return filter_candidates(vec![input.to_path_buf()], include_keywords, exclude_keywords, regex.as_ref(), sink);
    }

    let depth = if recursive { usize::MAX } else { 1 };
    let mut candidates: Vec<PathBuf> = WalkDir::new(input)
        .max_depth(depth)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                sink.warn(format!("skipping unreadable directory entry: {err}"));
                None
            }
        })
        .filter(|e| e.file_type().is_file() && has_pdf_extension(e.path()))
        .map(|e| e.into_path())
        .collect();
    candidates.sort();

    filter_candidates(candidates, include_keywords, exclude_keywords, regex.as_ref(), sink)
}

fn compile_filter(pattern: &str, sink: &dyn EventSink) -> Option<Regex> {
    if pattern.is_empty() {
        return None;
    }
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(err) => {
            sink.warn(format!(
                "invalid filename regex '{pattern}': {err}; the regex filter is skipped for this run"
            ));
            None
        }
    }
}

fn filter_candidates(
    candidates: Vec<PathBuf>,
    include_keywords: &[String],
    exclude_keywords: &[String],
    regex: Option<&Regex>,
    sink: &dyn EventSink,
) -> Vec<PathBuf> {
    candidates
        .into_iter()
        .filter(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let keep = passes_filters(&name, include_keywords, exclude_keywords, regex);
            if !keep {
                sink.debug(format!("'{name}' rejected by filename filters"));
            }
            keep
        })
        .collect()
}

/// Include, then exclude, then regex — in that order. An exclusion keyword
/// beats a matching inclusion keyword.
fn passes_filters(
    name: &str,
    include_keywords: &[String],
    exclude_keywords: &[String],
    regex: Option<&Regex>,
) -> bool {
    let lower = name.to_lowercase();
    let mut includes = include_keywords.iter().filter(|k| !k.is_empty()).peekable();
    if includes.peek().is_some() && !includes.any(|k| lower.contains(&k.to_lowercase())) {
        return false;
    }
    if exclude_keywords
        .iter()
        .filter(|k| !k.is_empty())
        .any(|k| lower.contains(&k.to_lowercase()))
    {
        return false;
    }
    if let Some(regex) = regex {
        if !regex.is_match(name) {
            return false;
        }
    }
    true
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{MemorySink, Severity};

    fn touch(path: &Path) {
        std::fs::write(path, b"%PDF-1.4").unwrap();
    }

    #[test]
    fn single_pdf_file_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("doc.PDF");
        touch(&pdf);

        let sink = MemorySink::new();
        let found = discover_documents(&pdf, false, &[], &[], "", &sink);
        assert_eq!(found, vec![pdf]);
    }

    #[test]
    fn single_non_pdf_file_warns_and_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("notes.txt");
        touch(&txt);

        let sink = MemorySink::new();
        let found = discover_documents(&txt, false, &[], &[], "", &sink);
        assert!(found.is_empty());
        assert!(sink
            .events()
            .iter()
            .any(|e| e.severity == Severity::Warning && e.message.contains("not a PDF")));
    }

    #[test]
    fn non_recursive_walk_ignores_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("top.pdf"));
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        touch(&dir.path().join("sub").join("nested.pdf"));

        let sink = MemorySink::new();
        let found = discover_documents(dir.path(), false, &[], &[], "", &sink);
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("top.pdf"));
    }

    #[test]
    fn recursive_walk_finds_nested_documents_sorted() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.pdf"));
        std::fs::create_dir(dir.path().join("a_sub")).unwrap();
        touch(&dir.path().join("a_sub").join("a.pdf"));

        let sink = MemorySink::new();
        let found = discover_documents(dir.path(), true, &[], &[], "", &sink);
        assert_eq!(found.len(), 2);
        // Lexicographic: a_sub/a.pdf sorts before b.pdf.
        assert!(found[0].ends_with("a.pdf"));
        assert!(found[1].ends_with("b.pdf"));
    }

    #[test]
    fn extension_match_is_case_insensitive_and_exact() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("one.Pdf"));
        touch(&dir.path().join("two.pdfx"));

        let sink = MemorySink::new();
        let found = discover_documents(dir.path(), false, &[], &[], "", &sink);
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("one.Pdf"));
    }

    #[test]
    fn include_keywords_are_case_insensitive() {
        assert!(passes_filters("Annual_Report.pdf", &["report".into()], &[], None));
        assert!(!passes_filters("summary.pdf", &["report".into()], &[], None));
    }

    #[test]
    fn exclude_beats_include() {
        // Matches an include keyword *and* an exclude keyword: rejected.
        assert!(!passes_filters(
            "report_draft.pdf",
            &["report".into()],
            &["draft".into()],
            None
        ));
    }

    #[test]
    fn regex_uses_search_semantics() {
        let regex = Regex::new(r"\d{4}").unwrap();
        assert!(passes_filters("scan_2024_final.pdf", &[], &[], Some(&regex)));
        assert!(!passes_filters("scan_final.pdf", &[], &[], Some(&regex)));
    }

    #[test]
    fn empty_keywords_are_ignored() {
        assert!(passes_filters("anything.pdf", &["".into()], &[], None));
        assert!(passes_filters("anything.pdf", &[], &["".into()], None));
    }

    #[test]
    fn invalid_regex_warns_once_and_filter_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.pdf"));
        touch(&dir.path().join("b.pdf"));

        let sink = MemorySink::new();
        let found = discover_documents(dir.path(), false, &[], &[], "[unclosed", &sink);
        // Both files survive because the broken regex is dropped entirely.
        assert_eq!(found.len(), 2);
        let warnings: Vec<_> = sink
            .events()
            .into_iter()
            .filter(|e| e.severity == Severity::Warning)
            .collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("invalid filename regex"));
    }
}
