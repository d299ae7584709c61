//! CLI binary for edgequake-pdf2jpg.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf2jpg::{
    bind_pdfium, config::default_workers, convert_dir, BatchOutput, ConversionConfig,
    ConversionProgressCallback, NamingScheme, Pdf2JpgError, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::ffi::OsString;
use std::io;
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

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one line per finished file.
/// Files complete out of order, so start times are keyed by submission index.
struct CliProgressCallback {
    bar: ProgressBar,
    input_root: PathBuf,
    start_times: Mutex<HashMap<usize, Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner until `on_batch_start` tells us how many files there are.
    fn new_dynamic(input_root: &Path) -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Scanning");
        bar.set_message(input_root.display().to_string());
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            input_root: input_root.to_path_buf(),
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>4}/{len} files  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
    }

    fn elapsed_secs(&self, index: usize) -> f64 {
        self.start_times
            .lock()
            .ok()
            .and_then(|mut times| times.remove(&index))
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn display_name(&self, path: &Path) -> String {
        path.strip_prefix(&self.input_root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        self.activate_bar(total_files);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total_files} PDF files…"))
        ));
    }

    fn on_file_start(&self, index: usize, path: &Path) {
        if let Ok(mut times) = self.start_times.lock() {
            times.insert(index, Instant::now());
        }
        self.bar.set_message(self.display_name(path));
    }

    fn on_file_complete(&self, index: usize, path: &Path, images: usize) {
        let secs = self.elapsed_secs(index);
        self.bar.println(format!(
            "  {} {:<48}  {:<10}  {}",
            green("✓"),
            self.display_name(path),
            dim(&format!("{images:>3} images")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, index: usize, path: &Path, error: &str) {
        let secs = self.elapsed_secs(index);
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Keep the line on one terminal row.
        let msg: String = if error.chars().count() > 80 {
            let mut cut: String = error.chars().take(79).collect();
            cut.push('\u{2026}');
            cut
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} {:<48}  {}  {}",
            red("✗"),
            self.display_name(path),
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        let failed = self.errors.load(Ordering::SeqCst);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} files converted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} files converted  ({} failed)",
                if failed == total_files {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_files,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Mirror docs/ into out/, one JPG per page
  pdf2jpg docs --output_dir out

  # Everything into a single directory
  pdf2jpg docs -o out --flat

  # Sharper multi-page renders on 4 workers
  pdf2jpg docs -o out -q 3.0 -p 4

  # Keep the original file names (mirrored output only)
  pdf2jpg docs -o out --naming stem

  # Machine-readable summary
  pdf2jpg docs -o out --json > report.json

OUTPUT NAMES:
  <name>.jpg               single-page document
  <name>-page<N>.jpg       page N (1-based) of a multi-page document

  <name> is chosen by --naming:
    hash    (default) first 12 hex chars of the BLAKE3 hash of the file
    random  <stem>_NNNNNN with a random 6-digit suffix
    stem    the file stem unchanged; not allowed with --flat

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to an existing libpdfium
  RUST_LOG                Override the log filter (e.g. edgequake_pdf2jpg=debug)
"#;

/// Batch-convert PDF files to JPG images.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2jpg",
    version,
    about = "Batch-convert every PDF under a directory to JPG images",
    long_about = "Recursively finds every PDF under INPUT_DIR and renders each page to a JPG. \
Output either mirrors the input tree or is flattened into one directory. Files that fail are \
listed in the error log; the rest of the batch is still converted.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Root directory to scan for PDF files.
    input_dir: PathBuf,

    /// Output root. Defaults to writing next to each source file.
    #[arg(
        short,
        long = "output_dir",
        visible_alias = "output-dir",
        alias = "out",
        env = "PDF2JPG_OUTPUT_DIR"
    )]
    output_dir: Option<PathBuf>,

    /// Put every image directly in the output root.
    #[arg(short = 'f', long = "flat", env = "PDF2JPG_FLAT")]
    flat: bool,

    /// Rasterisation scale for multi-page documents, in (0, 10].
    #[arg(short, long, env = "PDF2JPG_QUALITY", default_value_t = 2.0)]
    quality: f32,

    /// Number of files converted in parallel. Defaults to all cores.
    #[arg(short, long, env = "PDF2JPG_PROCESSES")]
    processes: Option<usize>,

    /// Output base-name scheme: hash, random, stem.
    #[arg(long, env = "PDF2JPG_NAMING", value_enum, default_value = "hash")]
    naming: NamingArg,

    /// JPEG encoder quality (1–100).
    #[arg(long, env = "PDF2JPG_JPEG_QUALITY", default_value_t = 90,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// Where failed files are listed.
    #[arg(long, env = "PDF2JPG_ERROR_LOG", default_value = "errors.log")]
    error_log: PathBuf,

    /// Exit with status 0 even when some files failed.
    #[arg(long, env = "PDF2JPG_ALLOW_FAILURES")]
    allow_failures: bool,

    /// Print the batch result as JSON on stdout.
    #[arg(long, env = "PDF2JPG_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2JPG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2JPG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(long, env = "PDF2JPG_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum NamingArg {
    Hash,
    Random,
    Stem,
}

impl From<NamingArg> for NamingScheme {
    fn from(v: NamingArg) -> Self {
        match v {
            NamingArg::Hash => NamingScheme::ContentHash,
            NamingArg::Random => NamingScheme::RandomSuffix,
            NamingArg::Stem => NamingScheme::Stem,
        }
    }
}

/// Accept the single-dash `-out` spelling, which clap would otherwise read
/// as `-o ut`. Arguments after `--` are left alone.
fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut positional_only = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if positional_only {
                return arg;
            }
            if arg == "--" {
                positional_only = true;
                return arg;
            }
            match arg.to_str() {
                Some("-out") => OsString::from("--out"),
                Some(s) if s.starts_with("-out=") => OsString::from(format!("-{s}")),
                _ => arg,
            }
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    let start = Instant::now();

    // ── Logging setup ────────────────────────────────────────────────────
    // With the bar active, per-file lines replace INFO-level library logs.
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

    let progress = show_progress.then(|| CliProgressCallback::new_dynamic(&cli.input_dir));

    let result = run(&cli, progress.clone(), show_progress).await;

    // The elapsed time and completion marker are printed for every run,
    // including ones that found nothing to convert.
    if let Some(ref cb) = progress {
        cb.bar.finish_and_clear();
    }
    if !cli.quiet {
        eprintln!("elapsed time is {:.2} sec", start.elapsed().as_secs_f64());
        eprintln!("all tasks done");
    }

    result
}

async fn run(
    cli: &Cli,
    progress: Option<Arc<CliProgressCallback>>,
    show_progress: bool,
) -> Result<()> {
    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> =
        progress.map(|cb| cb as Arc<dyn ConversionProgressCallback>);

    let config = build_config(cli, progress_cb)?;

    // ── Bind the PDF engine ──────────────────────────────────────────────
    let rasterizer = tokio::task::spawn_blocking(bind_pdfium)
        .await
        .context("PDF engine setup panicked")?
        .context("Failed to load the PDF engine")?;

    // ── Run conversion ───────────────────────────────────────────────────
    let output = match convert_dir(&cli.input_dir, &config, Arc::new(rasterizer)).await {
        Ok(output) => output,
        Err(e @ Pdf2JpgError::NoInputFiles { .. }) => {
            return Err(anyhow::Error::new(e).context("Nothing to convert"));
        }
        Err(e) => return Err(anyhow::Error::new(e).context("Conversion failed")),
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    }

    if !cli.quiet {
        print_summary(cli, &output, show_progress);
    }

    if output.has_failures() && !cli.allow_failures {
        let failed = output.stats.failed_files;
        let total = output.stats.total_files;
        anyhow::bail!("{failed}/{total} files failed, {}", log_hint(&output));
    }

    Ok(())
}

/// Where to look for the failure details.
fn log_hint(output: &BatchOutput) -> String {
    match output.error_log {
        Some(ref path) => format!("see {}", path.display()),
        None => "error log not written, see the warnings above".to_string(),
    }
}

/// Stats line for runs without the progress bar (which prints its own).
fn print_summary(cli: &Cli, output: &BatchOutput, show_progress: bool) {
    if show_progress || cli.json {
        return;
    }
    let stats = &output.stats;
    eprintln!(
        "Converted {}/{} files ({} images) in {}ms",
        stats.converted_files, stats.total_files, stats.total_images, stats.total_duration_ms
    );
    if stats.failed_files > 0 {
        eprintln!("  {} files failed, {}", stats.failed_files, log_hint(output));
    }
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .flatten(cli.flat)
        .quality(cli.quality)
        .workers(cli.processes.unwrap_or_else(default_workers))
        .naming(cli.naming.into())
        .jpeg_quality(cli.jpeg_quality)
        .error_log(Some(cli.error_log.clone()));

    if let Some(ref dir) = cli.output_dir {
        builder = builder.output_dir(dir);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
