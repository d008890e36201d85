//! Configuration types for a batch conversion run.
//!
//! All run behaviour is controlled through [`ConversionRequest`], built via
//! its [`ConversionRequestBuilder`]. Keeping every knob in one struct makes
//! it trivial to share a request across threads, serialise it for logging,
//! and diff two runs to understand why their outputs differ.
//!
//! Requests round-trip to JSON with [`ConversionRequest::save_json`] /
//! [`ConversionRequest::load_json`]; the on-disk key names match the
//! configuration files the desktop frontend has always written, so saved
//! presets keep loading. A partial file is fine — missing keys take their
//! defaults.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A batch conversion request: which documents, which pages, where the
/// images go and what they are called. Immutable for the duration of a run.
///
/// # Example
/// ```rust
/// use pdf2png::ConversionRequest;
///
/// let request = ConversionRequest::builder()
///     .input_path("/data/reports")
///     .pages("1-3")
///     .dpi(150)
///     .recursive(true)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionRequest {
    /// A single PDF file or a directory to scan.
    pub input_path: PathBuf,

    /// Root directory for produced images. When unset (or empty), a sibling
    /// of the input named `<input>_pngs` is used — see
    /// [`ConversionRequest::effective_output_root`].
    pub output_dir: Option<PathBuf>,

    /// Page-selection expression: `first` (default), `all`, or
    /// comma-separated numbers and `start-end` ranges, e.g. `1,3-5`.
    pub pages: String,

    /// Rendering resolution in dots per inch. Default: 300.
    pub dpi: u32,

    /// Literal prefix for output filenames. Applied by the `{prefix}` field
    /// of the template and always by the fallback pattern.
    pub prefix: String,

    /// Replace an existing image at the planned path instead of picking a
    /// `_copy_N` name. Default: false.
    pub overwrite: bool,

    /// Descend into subdirectories when the input is a directory.
    pub recursive: bool,

    /// Keep only filenames containing at least one of these keywords
    /// (case-insensitive). Empty list keeps everything.
    pub include_keywords: Vec<String>,

    /// Drop filenames containing any of these keywords (case-insensitive).
    /// Applied after the include filter, so an excluded keyword wins.
    pub exclude_keywords: Vec<String>,

    /// Regular expression the base filename must match (search semantics).
    /// Empty string disables the filter; a pattern that fails to compile is
    /// reported once and skipped for the whole run.
    pub regex_filter: String,

    /// Mirror the input directory tree below the output root. Only has an
    /// effect for documents found in subdirectories, which requires
    /// `recursive`.
    pub preserve_structure: bool,

    /// Output filename template. Supported fields: `{pdf_name}`,
    /// `{pdf_suffix}`, `{page_num}`, `{total_pages}`, `{dpi}`, `{prefix}`,
    /// `{original_dir_name}`, `{relative_parent_dir_name}`. An empty or
    /// broken template falls back to `{prefix}{pdf_name}_page_{page_num}.png`.
    #[serde(rename = "output_filename_template")]
    pub filename_template: String,

    /// Convert each page to 8-bit grayscale before saving.
    pub grayscale: bool,

    /// Right-angle rotation applied after rendering; positive angles turn
    /// counter-clockwise and the canvas expands to fit.
    #[serde(rename = "rotate")]
    pub rotation: Rotation,

    /// Plan everything, write nothing. The produced-path list is still
    /// filled with the paths a real run would use. Collision probing looks
    /// at the real filesystem only — a dry run does not see its own planned
    /// files, so two planned pages can report a name a real run would have
    /// `_copy_1`-suffixed.
    pub dry_run: bool,

    /// What the frontend should do once the run finishes. The pipeline
    /// carries the tag but never acts on it.
    #[serde(rename = "post_export_action")]
    pub post_export: PostExportAction,
}

impl Default for ConversionRequest {
    fn default() -> Self {
        Self {
            input_path: PathBuf::new(),
            output_dir: None,
            pages: "first".to_string(),
            dpi: 300,
            prefix: String::new(),
            overwrite: false,
            recursive: false,
            include_keywords: Vec::new(),
            exclude_keywords: Vec::new(),
            regex_filter: String::new(),
            preserve_structure: false,
            filename_template: "{pdf_name}_page_{page_num}.png".to_string(),
            grayscale: false,
            rotation: Rotation::None,
            dry_run: false,
            post_export: PostExportAction::OpenFile,
        }
    }
}

impl ConversionRequest {
    /// Create a new builder.
    pub fn builder() -> ConversionRequestBuilder {
        ConversionRequestBuilder {
            request: Self::default(),
        }
    }

    /// The output root this request resolves to.
    ///
    /// An explicit, non-empty `output_dir` wins. Otherwise the root is
    /// derived next to the input: `reports/` becomes `reports_pngs/`,
    /// `manual.pdf` becomes `manual_pngs/`.
    pub fn effective_output_root(&self) -> PathBuf {
        if let Some(dir) = &self.output_dir {
            if !dir.as_os_str().is_empty() {
                return dir.clone();
            }
        }
        let parent = self.input_path.parent().unwrap_or(Path::new("."));
        let name = if self.input_path.is_dir() {
            self.input_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
        } else {
            self.input_path
                .file_stem()
                .map(|n| n.to_string_lossy().into_owned())
        };
        match name {
            Some(n) => parent.join(format!("{n}_pngs")),
            None => parent.join("pdf2png_output"),
        }
    }

    /// The directory that counts as the top of the input tree, used for
    /// structure mirroring and the `{relative_parent_dir_name}` template
    /// field. For a single-file input this is the file's parent.
    pub fn input_root(&self) -> PathBuf {
        if self.input_path.is_dir() {
            self.input_path.clone()
        } else {
            self.input_path
                .parent()
                .unwrap_or(Path::new("."))
                .to_path_buf()
        }
    }

    /// Load a request from a JSON file. Missing keys take their defaults,
    /// so presets written by older versions keep working.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConvertError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConvertError::ConfigLoadFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| ConvertError::ConfigLoadFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }

    /// Persist the request as pretty-printed JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConvertError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConvertError::Internal(format!("serialising request: {e}")))?;
        std::fs::write(path, json).map_err(|e| ConvertError::ConfigSaveFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Builder for [`ConversionRequest`].
#[derive(Debug)]
pub struct ConversionRequestBuilder {
    request: ConversionRequest,
}

impl ConversionRequestBuilder {
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.request.input_path = path.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.request.output_dir = Some(dir.into());
        self
    }

    pub fn pages(mut self, expression: impl Into<String>) -> Self {
        self.request.pages = expression.into();
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.request.dpi = dpi;
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.request.prefix = prefix.into();
        self
    }

    pub fn overwrite(mut self, v: bool) -> Self {
        self.request.overwrite = v;
        self
    }

    pub fn recursive(mut self, v: bool) -> Self {
        self.request.recursive = v;
        self
    }

    pub fn include_keywords(mut self, keywords: Vec<String>) -> Self {
        self.request.include_keywords = keywords;
        self
    }

    pub fn exclude_keywords(mut self, keywords: Vec<String>) -> Self {
        self.request.exclude_keywords = keywords;
        self
    }

    pub fn regex_filter(mut self, pattern: impl Into<String>) -> Self {
        self.request.regex_filter = pattern.into();
        self
    }

    pub fn preserve_structure(mut self, v: bool) -> Self {
        self.request.preserve_structure = v;
        self
    }

    pub fn filename_template(mut self, template: impl Into<String>) -> Self {
        self.request.filename_template = template.into();
        self
    }

    pub fn grayscale(mut self, v: bool) -> Self {
        self.request.grayscale = v;
        self
    }

    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.request.rotation = rotation;
        self
    }

    pub fn dry_run(mut self, v: bool) -> Self {
        self.request.dry_run = v;
        self
    }

    pub fn post_export(mut self, action: PostExportAction) -> Self {
        self.request.post_export = action;
        self
    }

    /// Build the request, validating constraints.
    pub fn build(self) -> Result<ConversionRequest, ConvertError> {
        let r = &self.request;
        if r.input_path.as_os_str().is_empty() {
            return Err(ConvertError::InvalidRequest(
                "input_path must be set".into(),
            ));
        }
        if r.dpi == 0 {
            return Err(ConvertError::InvalidRequest("DPI must be >= 1".into()));
        }
        Ok(self.request)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Right-angle page rotation. Positive degrees turn counter-clockwise,
/// matching how the desktop frontend has always labelled the angles;
/// `-90` normalises to [`Rotation::Ccw270`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Rotation {
    /// Leave pages as rendered (default).
    #[default]
    None,
    /// Quarter turn counter-clockwise.
    Ccw90,
    /// Half turn.
    Ccw180,
    /// Three-quarter turn counter-clockwise (a clockwise quarter turn).
    Ccw270,
}

impl Rotation {
    /// Parse a degree value. Any multiple of 90 is accepted, negative
    /// values included; anything else is rejected.
    pub fn from_degrees(degrees: i32) -> Result<Self, ConvertError> {
        match degrees.rem_euclid(360) {
            0 => Ok(Rotation::None),
            90 => Ok(Rotation::Ccw90),
            180 => Ok(Rotation::Ccw180),
            270 => Ok(Rotation::Ccw270),
            _ => Err(ConvertError::InvalidRequest(format!(
                "rotation must be a right angle (0, ±90, ±180, ±270), got {degrees}"
            ))),
        }
    }

    /// Normalised counter-clockwise degrees: 0, 90, 180 or 270.
    pub fn degrees(self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::Ccw90 => 90,
            Rotation::Ccw180 => 180,
            Rotation::Ccw270 => 270,
        }
    }

    pub fn is_none(self) -> bool {
        self == Rotation::None
    }
}

impl TryFrom<i32> for Rotation {
    type Error = ConvertError;

    fn try_from(degrees: i32) -> Result<Self, Self::Error> {
        Rotation::from_degrees(degrees)
    }
}

impl From<Rotation> for i32 {
    fn from(rotation: Rotation) -> i32 {
        rotation.degrees()
    }
}

/// What the frontend does once a run produced images. Interpreted entirely
/// by the caller — the pipeline only carries the tag through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostExportAction {
    /// Open the produced image (when the run made exactly one).
    #[default]
    OpenFile,
    /// Open the output root in the platform file manager.
    OpenFolder,
    /// Both of the above.
    Both,
    /// Do nothing.
    None,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_missing_input() {
        let result = ConversionRequest::builder().build();
        assert!(matches!(result, Err(ConvertError::InvalidRequest(_))));
    }

    #[test]
    fn builder_rejects_zero_dpi() {
        let result = ConversionRequest::builder()
            .input_path("doc.pdf")
            .dpi(0)
            .build();
        assert!(matches!(result, Err(ConvertError::InvalidRequest(_))));
    }

    #[test]
    fn defaults_match_the_long_standing_preset() {
        let r = ConversionRequest::default();
        assert_eq!(r.pages, "first");
        assert_eq!(r.dpi, 300);
        assert_eq!(r.filename_template, "{pdf_name}_page_{page_num}.png");
        assert!(!r.overwrite);
        assert_eq!(r.post_export, PostExportAction::OpenFile);
    }

    #[test]
    fn rotation_normalises_negative_angles() {
        assert_eq!(Rotation::from_degrees(-90).unwrap(), Rotation::Ccw270);
        assert_eq!(Rotation::from_degrees(-180).unwrap(), Rotation::Ccw180);
        assert_eq!(Rotation::from_degrees(-270).unwrap(), Rotation::Ccw90);
        assert_eq!(Rotation::from_degrees(360).unwrap(), Rotation::None);
    }

    #[test]
    fn rotation_rejects_odd_angles() {
        assert!(Rotation::from_degrees(45).is_err());
        assert!(Rotation::from_degrees(-30).is_err());
    }

    #[test]
    fn output_root_derives_from_file_input() {
        let r = ConversionRequest::builder()
            .input_path("/data/manual.pdf")
            .build()
            .unwrap();
        assert_eq!(
            r.effective_output_root(),
            PathBuf::from("/data/manual_pngs")
        );
    }

    #[test]
    fn explicit_output_dir_wins() {
        let r = ConversionRequest::builder()
            .input_path("/data/manual.pdf")
            .output_dir("/out")
            .build()
            .unwrap();
        assert_eq!(r.effective_output_root(), PathBuf::from("/out"));
    }

    #[test]
    fn empty_output_dir_counts_as_unset() {
        let r = ConversionRequest::builder()
            .input_path("/data/manual.pdf")
            .output_dir("")
            .build()
            .unwrap();
        assert_eq!(
            r.effective_output_root(),
            PathBuf::from("/data/manual_pngs")
        );
    }

    #[test]
    fn json_round_trip_preserves_every_field() {
        let r = ConversionRequest::builder()
            .input_path("/in")
            .output_dir("/out")
            .pages("2-4,1")
            .dpi(150)
            .prefix("scan_")
            .overwrite(true)
            .recursive(true)
            .include_keywords(vec!["report".into()])
            .exclude_keywords(vec!["draft".into()])
            .regex_filter(r"^\d{4}")
            .preserve_structure(true)
            .filename_template("{prefix}{pdf_name}_{dpi}.png")
            .grayscale(true)
            .rotation(Rotation::Ccw180)
            .dry_run(true)
            .post_export(PostExportAction::OpenFolder)
            .build()
            .unwrap();

        let json = serde_json::to_string(&r).unwrap();
        let back: ConversionRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.pages, r.pages);
        assert_eq!(back.rotation, Rotation::Ccw180);
        assert_eq!(back.post_export, PostExportAction::OpenFolder);
        assert_eq!(back.filename_template, r.filename_template);
    }

    #[test]
    fn partial_json_takes_defaults() {
        let r: ConversionRequest =
            serde_json::from_str(r#"{"input_path": "/in", "dpi": 96}"#).unwrap();
        assert_eq!(r.dpi, 96);
        assert_eq!(r.pages, "first");
        assert_eq!(r.rotation, Rotation::None);
    }

    #[test]
    fn legacy_json_keys_still_load() {
        let r: ConversionRequest = serde_json::from_str(
            r#"{
                "input_path": "/in",
                "output_filename_template": "{pdf_name}.png",
                "rotate": -90,
                "post_export_action": "open_folder"
            }"#,
        )
        .unwrap();
        assert_eq!(r.filename_template, "{pdf_name}.png");
        assert_eq!(r.rotation, Rotation::Ccw270);
        assert_eq!(r.post_export, PostExportAction::OpenFolder);
    }

    #[test]
    fn bad_rotation_in_json_is_an_error() {
        let result: Result<ConversionRequest, _> =
            serde_json::from_str(r#"{"input_path": "/in", "rotate": 45}"#);
        assert!(result.is_err());
    }
}
