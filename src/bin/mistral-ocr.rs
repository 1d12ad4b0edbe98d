//! CLI binary for mistral-ocr.
//!
//! A thin shim over the library crate that maps CLI flags to `OcrConfig`,
//! runs the batch, and prints or exports each result.

use anyhow::{Context, Result};
use clap::Parser;
use mistral_ocr::{
    collect_sources, export_run, process_batch, BatchProgressCallback, ExportFormat, FileType,
    OcrConfig, ProgressCallback, RunState, SourceResult, SourceType,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
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

/// Terminal progress callback: a percent bar plus one log line per source.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<usize, Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}%  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        let bar = ProgressBar::new(100);
        bar.set_style(style);
        bar.set_prefix("OCR");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn elapsed_secs(&self, position: usize) -> f64 {
        self.start_times
            .lock()
            .ok()
            .and_then(|mut m| m.remove(&position))
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total: usize) {
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Processing {total} source(s)…"))
        ));
    }

    fn on_source_start(&self, position: usize, _total: usize, label: &str) {
        if let Ok(mut m) = self.start_times.lock() {
            m.insert(position, Instant::now());
        }
        self.bar.set_message(format!("Processing {}…", shorten(label, 60)));
    }

    fn on_source_complete(&self, position: usize, total: usize, percent: u8, text_len: usize) {
        let secs = self.elapsed_secs(position);
        self.bar.println(format!(
            "  {} Source {:>3}/{:<3}  {:<8}  {}",
            green("✓"),
            position,
            total,
            dim(&format!("{text_len:>6} chars")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.set_position(u64::from(percent));
    }

    fn on_source_error(&self, position: usize, total: usize, percent: u8, error: &str) {
        let secs = self.elapsed_secs(position);
        self.errors.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} Source {:>3}/{:<3}  {}  {}",
            red("✗"),
            position,
            total,
            red(&shorten(error, 80)),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.set_position(u64::from(percent));
    }

    fn on_batch_complete(&self, total: usize, succeeded: usize) {
        self.bar.finish_and_clear();
        let failed = self.errors.load(Ordering::SeqCst);
        if failed == 0 {
            eprintln!("{} Processing complete! {}/{} sources", green("✅"), succeeded, total);
        } else {
            eprintln!(
                "{} {}/{} sources processed  ({} failed)",
                if failed == total { red("✘") } else { cyan("⚠") },
                bold(&succeeded.to_string()),
                total,
                red(&failed.to_string()),
            );
        }
    }
}

/// Truncate on a char boundary, appending an ellipsis.
fn shorten(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{head}\u{2026}")
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # OCR a remote PDF, print the text
  mistral-ocr --file-type pdf --source-type url https://arxiv.org/pdf/2201.04234

  # Several URLs from a file (one per line), export JSON
  mistral-ocr --file-type pdf --source-type url --urls-file urls.txt -f json -o out/

  # Local images, Markdown for all results but PDF for the second one
  mistral-ocr --file-type image --source-type upload scan1.png scan2.jpg \
      -f md --format-at 2=pdf -o out/

  # Keep images the service cut out of each page
  mistral-ocr --file-type pdf --source-type upload report.pdf -o out/ --save-images

OUTPUT FILES:
  OCR_Result_<n>.txt | .md | .json | .pdf   (n = 1-based source position)

ENVIRONMENT VARIABLES:
  MISTRAL_API_KEY            API key (required)
  MISTRAL_OCR_MODEL          Override model (default mistral-ocr-latest)
  MISTRAL_OCR_BASE_URL       Override API root (default https://api.mistral.ai)
  MISTRAL_OCR_PACING_MS      Pause after each call in ms (default 1000)
"#;

/// Extract text from PDFs and images with the Mistral OCR API.
#[derive(Parser, Debug)]
#[command(
    name = "mistral-ocr",
    version,
    about = "Extract text from PDFs and images with the Mistral OCR API",
    long_about = "Submit PDF or image sources (remote URLs or local files) to the Mistral OCR \
service, show the extracted text per source, and export results as TXT, Markdown, JSON or PDF.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// URLs (with --source-type url) or local file paths (with --source-type upload).
    inputs: Vec<String>,

    /// Read newline-separated URLs from this file ("-" for stdin).
    #[arg(long)]
    urls_file: Option<PathBuf>,

    /// Kind of content: pdf or image.
    #[arg(long, value_enum)]
    file_type: FileTypeArg,

    /// Where sources come from: url or upload.
    #[arg(long, value_enum)]
    source_type: SourceTypeArg,

    /// Mistral API key.
    #[arg(long, env = "MISTRAL_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// OCR model ID.
    #[arg(long, env = "MISTRAL_OCR_MODEL", default_value = mistral_ocr::DEFAULT_MODEL)]
    model: String,

    /// API root URL.
    #[arg(long, env = "MISTRAL_OCR_BASE_URL", default_value = "https://api.mistral.ai")]
    base_url: String,

    /// Pause after every OCR call, in milliseconds.
    #[arg(long, env = "MISTRAL_OCR_PACING_MS", default_value_t = 1000)]
    pacing_ms: u64,

    /// Per-call HTTP timeout in seconds.
    #[arg(long, env = "MISTRAL_OCR_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// Export format for every result: txt, md, json, pdf.
    #[arg(short, long, default_value = "txt")]
    format: ExportFormat,

    /// Per-result format override, e.g. 2=pdf. Repeatable.
    #[arg(long = "format-at", value_name = "POS=FMT")]
    format_at: Vec<String>,

    /// Write OCR_Result_<n>.<ext> files here instead of printing text.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also write images embedded in the OCR response (needs --output-dir).
    #[arg(long, requires = "output_dir")]
    save_images: bool,

    /// Print the run (results, previews, stats) as JSON.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FileTypeArg {
    Pdf,
    Image,
}

impl From<FileTypeArg> for FileType {
    fn from(v: FileTypeArg) -> Self {
        match v {
            FileTypeArg::Pdf => FileType::Pdf,
            FileTypeArg::Image => FileType::Image,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum SourceTypeArg {
    Url,
    Upload,
}

impl From<SourceTypeArg> for SourceType {
    fn from(v: SourceTypeArg) -> Self {
        match v {
            SourceTypeArg::Url => SourceType::Url,
            SourceTypeArg::Upload => SourceType::Upload,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
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
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;
    let overrides = parse_format_overrides(&cli.format_at)?;

    // ── Collect sources ──────────────────────────────────────────────────
    let mut inputs = cli.inputs.clone();
    if let Some(ref path) = cli.urls_file {
        inputs.push(read_urls_file(path)?);
    }
    let sources = collect_sources(config.source_type, config.file_type, &inputs)
        .context("Failed to read sources")?;

    // ── Run ──────────────────────────────────────────────────────────────
    let run = process_batch(&sources, &config)
        .await
        .context("Processing failed")?;

    // ── Display / export ─────────────────────────────────────────────────
    let format_for = |position: usize| overrides.get(&position).copied().unwrap_or(cli.format);

    if let Some(ref dir) = cli.output_dir {
        let written = export_run(&run, dir, format_for).context("Export failed")?;
        if cli.save_images {
            save_images(&run, dir)?;
        }
        if !cli.quiet && !cli.json {
            for path in &written {
                eprintln!("  {} {}", green("⬇"), path.display());
            }
        }
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&run).context("Failed to serialise run")?;
        println!("{json}");
    } else if cli.output_dir.is_none() {
        print_results(&run).context("Failed to write to stdout")?;
    }

    if !cli.quiet && !show_progress && !cli.json {
        eprintln!(
            "Processed {}/{} sources in {}ms",
            run.stats.succeeded, run.stats.total_sources, run.stats.total_duration_ms
        );
        if run.stats.failed > 0 {
            eprintln!("  {} sources failed", run.stats.failed);
        }
    }

    Ok(())
}

/// Map CLI args to `OcrConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<OcrConfig> {
    let mut builder = OcrConfig::builder()
        .file_type(cli.file_type.into())
        .source_type(cli.source_type.into())
        .model(&cli.model)
        .base_url(&cli.base_url)
        .pacing_delay_ms(cli.pacing_ms)
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse repeated `POS=FMT` overrides.
fn parse_format_overrides(specs: &[String]) -> Result<HashMap<usize, ExportFormat>> {
    let mut map = HashMap::new();
    for spec in specs {
        let (pos, fmt) = spec
            .split_once('=')
            .with_context(|| format!("Invalid --format-at '{spec}': expected POS=FMT"))?;
        let pos: usize = pos
            .trim()
            .parse()
            .with_context(|| format!("Invalid position in --format-at '{spec}'"))?;
        if pos < 1 {
            anyhow::bail!("Positions are 1-indexed, minimum is 1 (got {pos})");
        }
        let fmt: ExportFormat = fmt.parse().map_err(anyhow::Error::msg)?;
        map.insert(pos, fmt);
    }
    Ok(map)
}

fn read_urls_file(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read URLs from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read URLs from {}", path.display()))
    }
}

/// Print each result with its preview reference.
fn print_results(run: &RunState) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for result in run.results() {
        writeln!(out, "{}", bold(&format!("── Result {} ── {}", result.position, result.label)))?;
        writeln!(out, "{}", dim(&format!("preview: {}", preview_summary(result))))?;
        writeln!(out)?;
        out.write_all(result.text.as_bytes())?;
        if !result.text.ends_with('\n') {
            writeln!(out)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Data URIs are far too long to print; show the media type and size instead.
fn preview_summary(result: &SourceResult) -> String {
    let reference = &result.preview_reference;
    match reference.strip_prefix("data:") {
        Some(rest) => {
            let media = rest.split(';').next().unwrap_or("application/octet-stream");
            match &result.raw_image_bytes {
                Some(bytes) => format!("inline {media}, {} bytes", bytes.len()),
                None => format!("inline {media}, {} chars", reference.len()),
            }
        }
        None => reference.clone(),
    }
}

/// Write every embedded response image as `OCR_Result_<n>_<image id>`.
fn save_images(run: &RunState, dir: &Path) -> Result<()> {
    for result in run.results() {
        for image in &result.images {
            let Some(decoded) = image.decode() else {
                continue;
            };
            let bytes = decoded
                .with_context(|| format!("Image '{}' has invalid base64", image.id))?;
            let name = format!("OCR_Result_{}_{}", result.position, sanitize(&image.id));
            let path = dir.join(name);
            std::fs::write(&path, &bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
    }
    Ok(())
}

fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect()
}
