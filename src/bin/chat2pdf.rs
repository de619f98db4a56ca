//! CLI binary for chat2pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExportConfig` and prints the result.

use anyhow::{Context, Result};
use chat2pdf::{
    export, export_with, ExportConfig, ExportProgressCallback, LayoutJsonRenderer, PageLayout,
    ProgressCallback, Stage,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
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
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner naming the current stage, plus one
/// log line per skipped image.
struct CliProgressCallback {
    bar: ProgressBar,
    images: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Exporting");
        bar.set_message("Writing title…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            images: AtomicUsize::new(0),
        })
    }

    /// `on_export_complete` never fires on failure; clear the spinner so the
    /// error prints on a clean line.
    fn clear_on_error<T, E>(&self, result: &Result<T, E>) {
        if result.is_err() && !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

impl ExportProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_message(format!("{stage}…"));
    }

    fn on_conversation_rendered(&self, index: usize, total: usize, messages: usize) {
        self.bar
            .set_message(format!("conversation {index}/{total} ({messages} messages)"));
    }

    fn on_image_embedded(&self, name: &str, index: usize, total: usize) {
        self.images.fetch_add(1, Ordering::SeqCst);
        self.bar.set_message(format!("image {index}/{total}  {}", dim(name)));
    }

    fn on_image_error(&self, name: &str, error: &str) {
        // Truncate very long error messages to keep output tidy.
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar
            .println(format!("  {} {}  {}", red("✗"), name, red(&msg)));
    }

    fn on_stage_complete(&self, stage: Stage) {
        let n = self.images.load(Ordering::SeqCst);
        if stage == Stage::Images && n > 0 {
            self.bar
                .println(format!("  {} {} images embedded", green("✓"), n));
        }
    }

    fn on_export_complete(&self, _pages: usize, _warnings: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Export ./chats (conversations.json, chat.html, images) to ChatGPT_Export.pdf
  chat2pdf

  # Another data directory and output file
  chat2pdf exports/march -o march.pdf

  # Speaker headers without timestamps
  chat2pdf --no-timestamps

  # Inspect the layout without a pdfium library
  chat2pdf --layout-json -o layout.json

  # Machine-readable summary
  chat2pdf --json > report.json

INPUT LAYOUT (all optional):
  <DATA_DIR>/conversations.json   list of conversations, or {"conversations": [...]}
  <DATA_DIR>/chat.html            HTML export, flattened to text
  <DATA_DIR>/*.jpg|*.png|*.jpeg   images, embedded in file-name order

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  CHAT2PDF_*              Fallback for any flag, e.g. CHAT2PDF_OUTPUT
  RUST_LOG                Override the log filter
"#;

/// Export chat conversations, an HTML chat export and images to one PDF.
#[derive(Parser, Debug)]
#[command(
    name = "chat2pdf",
    version,
    about = "Export chat conversations, HTML exports and images to a single PDF",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory holding conversations.json, chat.html and images.
    #[arg(env = "CHAT2PDF_DATA_DIR", default_value = "chats")]
    data_dir: PathBuf,

    /// Conversations file. Default: <DATA_DIR>/conversations.json.
    #[arg(long, env = "CHAT2PDF_CONVERSATIONS")]
    conversations: Option<PathBuf>,

    /// HTML export file. Default: <DATA_DIR>/chat.html.
    #[arg(long, env = "CHAT2PDF_HTML")]
    html: Option<PathBuf>,

    /// Image folder. Default: <DATA_DIR>.
    #[arg(long, env = "CHAT2PDF_IMAGES")]
    images: Option<PathBuf>,

    /// Output file. Default: ChatGPT_Export.pdf (ChatGPT_Export.json with --layout-json).
    #[arg(short, long, env = "CHAT2PDF_OUTPUT")]
    output: Option<PathBuf>,

    /// Document title on page 1.
    #[arg(long, env = "CHAT2PDF_TITLE", default_value = chat2pdf::config::DEFAULT_TITLE)]
    title: String,

    /// Speaker label for every non-user author.
    #[arg(long, env = "CHAT2PDF_ASSISTANT_LABEL", default_value = chat2pdf::config::DEFAULT_ASSISTANT_LABEL)]
    assistant_label: String,

    /// Write "Author:" speaker headers without timestamps.
    #[arg(long, env = "CHAT2PDF_NO_TIMESTAMPS")]
    no_timestamps: bool,

    /// Paper size.
    #[arg(long, env = "CHAT2PDF_PAGE_SIZE", value_enum, default_value = "a4")]
    page_size: PageSizeArg,

    /// Embedded image width in millimetres.
    #[arg(long, env = "CHAT2PDF_IMAGE_WIDTH", default_value_t = 180.0)]
    image_width: f32,

    /// Path to the pdfium shared library (file or directory).
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Write the laid-out pages as JSON instead of a PDF (no pdfium needed).
    #[arg(long, env = "CHAT2PDF_LAYOUT_JSON")]
    layout_json: bool,

    /// Print the export report as JSON on stdout.
    #[arg(long, env = "CHAT2PDF_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "CHAT2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CHAT2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "CHAT2PDF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PageSizeArg {
    A4,
    Letter,
}

impl From<PageSizeArg> for PageLayout {
    fn from(v: PageSizeArg) -> Self {
        match v {
            PageSizeArg::A4 => PageLayout::a4(),
            PageSizeArg::Letter => PageLayout::letter(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // INFO-level library logs are hidden while the spinner is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let spinner = show_progress.then(CliProgressCallback::new);
    let progress_cb: Option<ProgressCallback> = spinner
        .clone()
        .map(|cb| cb as Arc<dyn ExportProgressCallback>);
    let config = build_config(&cli, progress_cb)?;

    // ── Run export ───────────────────────────────────────────────────────
    let result = if cli.layout_json {
        export_with(&config, &LayoutJsonRenderer)
    } else {
        export(&config)
    };
    if let Some(cb) = &spinner {
        cb.clear_on_error(&result);
    }
    let report = result.context("Export failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet {
        eprintln!(
            "{} PDF successfully created: {}",
            if report.is_clean() { green("✔") } else { cyan("⚠") },
            bold(&report.output.display().to_string()),
        );
        eprintln!(
            "   {}",
            dim(&format!(
                "{} conversations, {} messages, {} images, {} pages  —  {}ms",
                report.conversations,
                report.messages,
                report.images_embedded,
                report.pages,
                report.duration_ms
            ))
        );
        for warning in &report.warnings {
            eprintln!("   {} {}", cyan("⚠"), warning);
        }
    }

    Ok(())
}

/// Map CLI args to `ExportConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExportConfig> {
    let output = cli.output.clone().unwrap_or_else(|| {
        let default = PathBuf::from(chat2pdf::config::DEFAULT_OUTPUT);
        if cli.layout_json {
            default.with_extension("json")
        } else {
            default
        }
    });

    let mut builder = ExportConfig::builder()
        .data_dir(&cli.data_dir)
        .output_path(output)
        .title(cli.title.clone())
        .assistant_label(cli.assistant_label.clone())
        .include_timestamps(!cli.no_timestamps)
        .layout(cli.page_size.into())
        .image_width(cli.image_width);

    if let Some(ref p) = cli.conversations {
        builder = builder.conversations_path(p);
    }
    if let Some(ref p) = cli.html {
        builder = builder.html_path(p);
    }
    if let Some(ref p) = cli.images {
        builder = builder.images_dir(p);
    }
    if let Some(ref p) = cli.pdfium_lib {
        builder = builder.pdfium_lib_path(p);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat2pdf::ExportError;

    #[test]
    fn spinner_cleared_when_export_fails() {
        let cb = CliProgressCallback::new();
        cb.clear_on_error(&Ok::<(), ()>(()));
        assert!(!cb.bar.is_finished());

        cb.clear_on_error(&Err::<(), _>(ExportError::Internal("boom".into())));
        assert!(cb.bar.is_finished());
    }
}
