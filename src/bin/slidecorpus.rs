//! CLI binary for slidecorpus.
//!
//! A thin shim over the library crate that maps CLI flags to `CorpusConfig`,
//! resolves the document batch (local directory or Archive.org crawl), and
//! prints run statistics.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use slidecorpus::{
    ingest, local_documents, ArchiveSource, CorpusConfig, IngestProgressCallback,
    ProgressCallback,
};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
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

/// Terminal progress callback: renders a live progress bar and per-document
/// log lines using [indicatif]. Designed to work correctly when documents
/// complete out-of-order (concurrent extraction).
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Per-document wall-clock start times for elapsed reporting.
    start_times: Mutex<HashMap<usize, Instant>>,
    /// Count of documents that errored out.
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Create a callback whose progress-bar length is set dynamically by
    /// `on_extract_start` (called before any document is opened).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_extract_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Listing documents…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} docs  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Extracting");
        self.bar.reset_eta();
    }
}

impl IngestProgressCallback for CliProgressCallback {
    fn on_extract_start(&self, total_docs: usize) {
        self.activate_bar(total_docs);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Extracting {total_docs} documents…"))
        ));
    }

    fn on_document_start(&self, doc_num: usize, _total: usize) {
        self.start_times
            .lock()
            .unwrap()
            .insert(doc_num, Instant::now());
        self.bar.set_message(format!("document {doc_num}"));
    }

    fn on_document_complete(&self, doc_num: usize, total: usize, slides: usize) {
        let elapsed_ms = self
            .start_times
            .lock()
            .unwrap()
            .remove(&doc_num)
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        self.bar.println(format!(
            "  {} Doc {:>3}/{:<3}  {:<10}  {}",
            green("✓"),
            doc_num,
            total,
            dim(&format!("{slides:>4} slides")),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, doc_num: usize, total: usize, error: &str) {
        let elapsed_ms = self
            .start_times
            .lock()
            .unwrap()
            .remove(&doc_num)
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = if error.chars().count() > 80 {
            let cut: String = error.chars().take(79).collect();
            format!("{cut}\u{2026}")
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Doc {:>3}/{:<3}  {}  {}",
            red("✗"),
            doc_num,
            total,
            red(&msg),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_extract_complete(&self, total_docs: usize, success_count: usize) {
        let failed = total_docs.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} documents extracted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} documents extracted  ({} failed)",
                if failed == total_docs {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_docs,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Download 50 PDFs from the collection, build the corpus
  slidecorpus --count 50

  # Restrict the crawl to one source domain
  slidecorpus --count 100 --domain dtic.mil

  # Re-process already-downloaded PDFs, no network
  slidecorpus --skip-download

  # Process a local directory of decks
  slidecorpus --input-dir ~/decks --output-dir ~/decks/corpus

  # Reproducible run on 8 workers
  slidecorpus --skip-download --workers 8 --seed 42

  # Machine-readable run stats
  slidecorpus --skip-download --json > stats.json

OUTPUT FILES (written to --output-dir):
  vocabulary.json     per-slide-type term lists + _overall
  acronyms.json       frequency-sorted acronyms with expansions
  palettes.json       representative colour palettes per slide type
  sample_text.json    medium-length sample slides per type
  common_titles.json  most common normalized titles
  corpus_meta.json    slide-type distribution + batch stats
  slim_corpus.json    compact projection for direct frontend use

ENVIRONMENT VARIABLES:
  RUST_LOG            Override the tracing filter (e.g. slidecorpus=debug)

PDFIUM:
  A pdfium shared library (libpdfium.so / pdfium.dll) must be present next
  to the binary or on the system library path.
"#;

/// Build a slide-deck corpus from PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "slidecorpus",
    version,
    about = "Build a structured JSON corpus from slide-deck PDFs",
    long_about = "Download slide-deck PDFs from an Archive.org collection (or read a local \
directory), extract per-page text, layout, and colour features, and aggregate them into JSON \
corpus files for synthetic slide generation.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Process PDFs from this directory instead of crawling.
    #[arg(long, env = "SLIDECORPUS_INPUT_DIR")]
    input_dir: Option<PathBuf>,

    /// Directory the corpus JSON files are written to.
    #[arg(short, long, env = "SLIDECORPUS_OUTPUT_DIR", default_value = "corpus")]
    output_dir: PathBuf,

    /// Directory downloaded PDFs are stored in (and re-read with --skip-download).
    #[arg(long, env = "SLIDECORPUS_DOWNLOAD_DIR", default_value = "downloads")]
    download_dir: PathBuf,

    /// Number of PDFs to download.
    #[arg(short, long, env = "SLIDECORPUS_COUNT", default_value_t = 50)]
    count: usize,

    /// Restrict the crawl to items whose title matches this domain (e.g. dtic.mil).
    #[arg(long, env = "SLIDECORPUS_DOMAIN")]
    domain: Option<String>,

    /// Archive.org collection to crawl.
    #[arg(
        long,
        env = "SLIDECORPUS_COLLECTION",
        default_value = "MilitaryIndustrialPowerpointComplex"
    )]
    collection: String,

    /// Skip the crawl; process PDFs already in --download-dir.
    #[arg(long, env = "SLIDECORPUS_SKIP_DOWNLOAD")]
    skip_download: bool,

    /// Number of documents extracted concurrently.
    #[arg(short, long, env = "SLIDECORPUS_WORKERS", default_value_t = 4)]
    workers: usize,

    /// RNG seed for a fully reproducible run.
    #[arg(long, env = "SLIDECORPUS_SEED")]
    seed: Option<u64>,

    /// Pixels sampled per page raster for colour extraction.
    #[arg(long, env = "SLIDECORPUS_SAMPLE_SIZE", default_value_t = 1000)]
    sample_size: usize,

    /// Raster scale for colour sampling, in (0, 1].
    #[arg(long, env = "SLIDECORPUS_RENDER_SCALE", default_value_t = 0.5)]
    render_scale: f32,

    /// Delay between Archive.org API requests, in milliseconds.
    #[arg(long, env = "SLIDECORPUS_REQUEST_DELAY_MS", default_value_t = 1000)]
    request_delay_ms: u64,

    /// Per-file download timeout in seconds.
    #[arg(long, env = "SLIDECORPUS_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Print run statistics as JSON to stdout.
    #[arg(long, env = "SLIDECORPUS_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "SLIDECORPUS_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SLIDECORPUS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "SLIDECORPUS_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
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
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn IngestProgressCallback>)
    } else {
        None
    };

    let mut builder = CorpusConfig::builder()
        .workers(cli.workers)
        .render_scale(cli.render_scale)
        .color_sample_size(cli.sample_size)
        .request_delay_ms(cli.request_delay_ms)
        .download_timeout_secs(cli.download_timeout);
    if let Some(seed) = cli.seed {
        builder = builder.seed(seed);
    }
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Resolve the document batch ───────────────────────────────────────
    let documents = if let Some(ref input_dir) = cli.input_dir {
        local_documents(input_dir).context("Failed to list input directory")?
    } else if cli.skip_download {
        local_documents(&cli.download_dir).context("Failed to list download directory")?
    } else {
        let source = ArchiveSource::new(cli.download_dir.clone(), cli.collection.as_str(), &config)
            .context("Failed to initialise Archive.org source")?;
        let mut rng = match cli.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let downloaded = source
            .download_collection(cli.count, cli.domain.as_deref(), &mut rng)
            .await
            .context("Crawl failed")?;
        if !cli.quiet {
            eprintln!(
                "{} Downloaded {} PDFs to {}",
                green("✔"),
                bold(&downloaded.len().to_string()),
                cli.download_dir.display()
            );
        }
        downloaded
    };

    if documents.is_empty() {
        anyhow::bail!("No PDFs to process");
    }

    // ── Run the pipeline ─────────────────────────────────────────────────
    let stats = ingest(&documents, &cli.output_dir, &config)
        .await
        .context("Ingestion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&stats).context("Failed to serialise stats")?;
        println!("{json}");
    } else if !cli.quiet {
        let ok_docs = stats.total_documents - stats.failed_documents;
        eprintln!(
            "{}  {}/{} documents  {} slides  {}ms  →  {}",
            if stats.failed_documents == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            ok_docs,
            stats.total_documents,
            bold(&stats.total_slides.to_string()),
            stats.total_duration_ms,
            bold(&cli.output_dir.display().to_string()),
        );
        eprintln!(
            "   {} extract  /  {} analyze  /  {} write",
            dim(&format!("{}ms", stats.extract_duration_ms)),
            dim(&format!("{}ms", stats.analyze_duration_ms)),
            dim(&format!("{}ms", stats.write_duration_ms)),
        );
        for failure in &stats.failures {
            eprintln!("   {} {}", red("✗"), failure);
        }
    }

    Ok(())
}
