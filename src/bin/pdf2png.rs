//! CLI binary for pdf2png.
//!
//! A thin shim over the library crate that maps CLI flags to a
//! `ConversionRequest`, wires Ctrl-C to the cancel token, and prints
//! the run summary. The caller-side policies live here too: which path
//! to report back, and the optional post-export open-file/open-folder
//! action.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2png::{
    run_batch, CancelToken, ConversionRequest, EventSink, LogEvent, MemorySink, PdfiumRasterizer,
    PostExportAction, Rotation, RunStatus, RunSummary, Severity,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── Terminal event sink using indicatif ──────────────────────────────────────

/// Prints the pipeline's event trail around a live spinner, so log lines
/// and the activity indicator do not fight over the terminal.
struct CliSink {
    bar: ProgressBar,
    /// Events below this severity are dropped.
    threshold: Severity,
}

impl CliSink {
    fn new(threshold: Severity) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar, threshold }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl EventSink for CliSink {
    fn emit(&self, event: LogEvent) {
        if event.severity < self.threshold {
            return;
        }
        let tag = match event.severity {
            Severity::Debug => dim("·"),
            Severity::Info => cyan("•"),
            Severity::Warning => yellow("⚠"),
            Severity::Error => red("✗"),
            Severity::Critical => red("✗✗"),
        };
        self.bar.println(format!("{tag} {}", event.message));
        if event.severity == Severity::Info {
            // Keep the spinner line showing the latest activity.
            let short: String = event.message.chars().take(60).collect();
            self.bar.set_message(short);
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # First page of one document, 300 DPI, next to the input
  pdf2png manual.pdf

  # Every page of every PDF under ./reports, mirrored tree, 150 DPI
  pdf2png ./reports -o ./out --pages all --dpi 150 -r --preserve-structure

  # Pages 1 and 3-5, grayscale, rotated a quarter turn counter-clockwise
  pdf2png scan.pdf --pages 1,3-5 --grayscale --rotate 90

  # Only yearly reports, skip drafts
  pdf2png ./archive -r --include report --exclude draft --regex '\d{4}'

  # Preview without writing anything
  pdf2png ./archive -r --pages all --dry-run

  # Reuse a saved preset, overriding its DPI
  pdf2png ./archive --config preset.json --dpi 96

FILENAME TEMPLATE FIELDS:
  {pdf_name}      document stem           {pdf_suffix}                 extension (".pdf")
  {page_num}      1-based page number     {total_pages}                document page count
  {dpi}           render resolution       {prefix}                     the --prefix value
  {original_dir_name}  parent dir name    {relative_parent_dir_name}   first dir below the input root

  A template that fails to render falls back to {prefix}{pdf_name}_page_{page_num}.png.

EXIT STATUS:
  0  run completed (including a stopped run and "no matching input")
  1  run aborted: output root not creatable, input path missing, or internal failure

PDFium: the pdfium shared library must be loadable at run time (system
library path or next to the executable)."#;

/// Batch-convert PDF documents to PNG images.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2png",
    version,
    about = "Batch-convert PDF documents to PNG images",
    long_about = "Batch-convert PDF documents to PNG images: select pages, filter files by \
keyword or regex, apply grayscale and right-angle rotation, and control output names with a \
template. Point it at a single PDF or a whole directory tree.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file or directory to convert.
    input: PathBuf,

    /// Output directory root. Default: '<input>_pngs' next to the input.
    #[arg(short, long, env = "PDF2PNG_OUTPUT")]
    output: Option<PathBuf>,

    /// Pages to convert: first, all, or e.g. 1,3-5.
    #[arg(long, env = "PDF2PNG_PAGES")]
    pages: Option<String>,

    /// Rendering resolution in DPI.
    #[arg(long, env = "PDF2PNG_DPI")]
    dpi: Option<u32>,

    /// Prefix for output filenames.
    #[arg(long, env = "PDF2PNG_PREFIX")]
    prefix: Option<String>,

    /// Output filename template (see the help footer for fields).
    #[arg(long, env = "PDF2PNG_TEMPLATE")]
    template: Option<String>,

    /// Recurse into subdirectories.
    #[arg(short, long)]
    recursive: bool,

    /// Mirror the input directory tree below the output root.
    #[arg(long)]
    preserve_structure: bool,

    /// Comma-separated keywords a filename must contain (any of them).
    #[arg(long, value_name = "KW,KW,…")]
    include: Option<String>,

    /// Comma-separated keywords that reject a filename (any of them).
    #[arg(long, value_name = "KW,KW,…")]
    exclude: Option<String>,

    /// Regular expression the filename must match.
    #[arg(long, value_name = "PATTERN")]
    regex: Option<String>,

    /// Convert pages to grayscale.
    #[arg(long)]
    grayscale: bool,

    /// Right-angle rotation in degrees (0, ±90, ±180, ±270); positive is
    /// counter-clockwise.
    #[arg(long, value_name = "DEGREES", allow_hyphen_values = true)]
    rotate: Option<i32>,

    /// Replace existing files instead of writing '_copy_N' names.
    #[arg(long)]
    overwrite: bool,

    /// Plan the run and print what would happen, but write nothing.
    #[arg(long)]
    dry_run: bool,

    /// Action after a successful run.
    #[arg(long, value_enum)]
    post_export: Option<PostExportArg>,

    /// Load a saved request preset (JSON); other flags override it.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the effective request to a preset file and exit.
    #[arg(long, value_name = "FILE")]
    save_config: Option<PathBuf>,

    /// Print the run summary and full event trail as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable the spinner (log lines only).
    #[arg(long, env = "PDF2PNG_NO_PROGRESS")]
    no_progress: bool,

    /// Show debug-level events and library logs.
    #[arg(short, long, env = "PDF2PNG_VERBOSE")]
    verbose: bool,

    /// Suppress everything except errors.
    #[arg(short, long, env = "PDF2PNG_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PostExportArg {
    OpenFile,
    OpenFolder,
    Both,
    None,
}

impl From<PostExportArg> for PostExportAction {
    fn from(v: PostExportArg) -> Self {
        match v {
            PostExportArg::OpenFile => PostExportAction::OpenFile,
            PostExportArg::OpenFolder => PostExportAction::OpenFolder,
            PostExportArg::Both => PostExportAction::Both,
            PostExportArg::None => PostExportAction::None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The event sink carries all user-facing feedback; tracing is for
    // library internals and stays quiet unless --verbose.
    let filter = if cli.verbose { "debug" } else { "error" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let request = build_request(&cli)?;

    if let Some(ref preset_path) = cli.save_config {
        request
            .save_json(preset_path)
            .context("Failed to save preset")?;
        if !cli.quiet {
            eprintln!("{} preset written to {}", green("✔"), preset_path.display());
        }
        return Ok(());
    }

    // ── Sinks ────────────────────────────────────────────────────────────
    let threshold = if cli.quiet {
        Severity::Error
    } else if cli.verbose {
        Severity::Debug
    } else {
        Severity::Info
    };
    let cli_sink = if cli.json || cli.no_progress {
        None
    } else {
        Some(Arc::new(CliSink::new(threshold)))
    };
    let memory_sink = Arc::new(MemorySink::new());
    let sink: Arc<dyn EventSink> = match &cli_sink {
        Some(cli_sink) => Arc::new(FanoutSink {
            first: cli_sink.clone(),
            second: memory_sink.clone(),
        }),
        None => memory_sink.clone(),
    };

    // ── Cancellation: Ctrl-C requests a cooperative stop ─────────────────
    let cancel = CancelToken::new();
    {
        let token = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\n{} stop requested — finishing the current page…", yellow("⚠"));
                token.cancel();
            }
        });
    }

    // ── Run ──────────────────────────────────────────────────────────────
    let summary = run_batch(
        &request,
        Arc::new(PdfiumRasterizer::new()),
        sink,
        &cancel,
    )
    .await;

    if let Some(cli_sink) = &cli_sink {
        cli_sink.finish();
    }

    // ── Report ───────────────────────────────────────────────────────────
    if cli.json {
        let report = serde_json::json!({
            "summary": summary,
            "events": memory_sink.events(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !cli.quiet {
        print_summary(&summary);
    }

    if summary.status == RunStatus::Completed && !summary.dry_run && summary.images_produced > 0 {
        post_export(request.post_export, &summary);
    }

    if summary.status == RunStatus::Error {
        anyhow::bail!("run aborted — see the log above");
    }
    Ok(())
}

/// Merge the preset file (if any), the library defaults and the CLI flags
/// into the effective request. CLI flags win.
fn build_request(cli: &Cli) -> Result<ConversionRequest> {
    let base = match &cli.config {
        Some(path) => ConversionRequest::load_json(path).context("Failed to load preset")?,
        None => ConversionRequest::default(),
    };

    let mut builder = ConversionRequest::builder()
        .input_path(cli.input.clone())
        .pages(cli.pages.clone().unwrap_or(base.pages))
        .dpi(cli.dpi.unwrap_or(base.dpi))
        .prefix(cli.prefix.clone().unwrap_or(base.prefix))
        .filename_template(cli.template.clone().unwrap_or(base.filename_template))
        .recursive(cli.recursive || base.recursive)
        .preserve_structure(cli.preserve_structure || base.preserve_structure)
        .include_keywords(match &cli.include {
            Some(list) => split_keywords(list),
            None => base.include_keywords,
        })
        .exclude_keywords(match &cli.exclude {
            Some(list) => split_keywords(list),
            None => base.exclude_keywords,
        })
        .regex_filter(cli.regex.clone().unwrap_or(base.regex_filter))
        .grayscale(cli.grayscale || base.grayscale)
        .rotation(match cli.rotate {
            Some(degrees) => Rotation::from_degrees(degrees).context("Invalid --rotate value")?,
            None => base.rotation,
        })
        .overwrite(cli.overwrite || base.overwrite)
        .dry_run(cli.dry_run || base.dry_run)
        .post_export(cli.post_export.map(Into::into).unwrap_or(base.post_export));

    if let Some(output) = cli.output.clone().or(base.output_dir) {
        builder = builder.output_dir(output);
    }

    builder.build().context("Invalid request")
}

fn split_keywords(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

fn print_summary(summary: &RunSummary) {
    let (mark, label) = match summary.status {
        RunStatus::Completed => (green("✔"), "completed".to_string()),
        RunStatus::Stopped => (yellow("⚠"), "stopped by request".to_string()),
        RunStatus::NoInput => (yellow("⚠"), "no matching PDF documents".to_string()),
        RunStatus::Error => (red("✘"), "aborted".to_string()),
    };
    let action = if summary.dry_run { "planned" } else { "produced" };
    eprintln!(
        "{mark} {} — {} document(s), {} image(s) {action}",
        bold(&label),
        summary.documents_with_output,
        summary.images_produced,
    );
    // The reporting policy: a lone image is worth naming, anything more
    // gets the root.
    if summary.images_produced == 1 {
        eprintln!("   {}", bold(&summary.produced_paths[0].display().to_string()));
    } else if summary.images_produced > 0 {
        eprintln!("   {}", bold(&summary.output_root.display().to_string()));
    }
}

/// Duplicate every event into two sinks: the terminal and the in-memory
/// trail (used by --json, and harmless otherwise).
struct FanoutSink {
    first: Arc<CliSink>,
    second: Arc<MemorySink>,
}

impl EventSink for FanoutSink {
    fn emit(&self, event: LogEvent) {
        self.first.emit(event.clone());
        self.second.emit(event);
    }
}

/// Execute the post-export action. Failures only warn — the conversion
/// already succeeded.
fn post_export(action: PostExportAction, summary: &RunSummary) {
    let open_file = matches!(action, PostExportAction::OpenFile | PostExportAction::Both);
    let open_folder = matches!(action, PostExportAction::OpenFolder | PostExportAction::Both);

    if open_file && summary.images_produced == 1 {
        open_path(&summary.produced_paths[0]);
    }
    if open_folder {
        open_path(&summary.output_root);
    }
}

fn open_path(path: &Path) {
    #[cfg(target_os = "macos")]
    let result = std::process::Command::new("open").arg(path).spawn();
    #[cfg(target_os = "windows")]
    let result = std::process::Command::new("cmd")
        .args(["/C", "start", ""])
        .arg(path)
        .spawn();
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let result = std::process::Command::new("xdg-open").arg(path).spawn();

    if let Err(e) = result {
        eprintln!("{} could not open '{}': {e}", yellow("⚠"), path.display());
    }
}
