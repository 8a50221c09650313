//! CLI binary for pdf2html.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and reports results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2html::pipeline::input::default_output_path;
use pdf2html::{
    convert_to_file, inspect, ConversionConfig, ConversionProgressCallback, PageSelection,
    ProgressCallback, UnsizedTextPolicy,
};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
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

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Live page bar plus one log line per page and per skipped image.
struct CliProgressCallback {
    bar: ProgressBar,
    skipped: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner until `on_conversion_start` tells us the page count.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            skipped: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Laying out {total_pages} pages…"))
        ));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, elements: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{elements:>4} elements")),
        ));
        self.bar.inc(1);
    }

    fn on_image_skipped(&self, page_num: usize, detail: &str) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
        let msg: String = if detail.chars().count() > 80 {
            let head: String = detail.chars().take(79).collect();
            format!("{head}\u{2026}")
        } else {
            detail.to_string()
        };
        self.bar.println(format!(
            "  {} Page {:>3}  image skipped: {}",
            yellow("⚠"),
            page_num,
            dim(&msg)
        ));
    }

    fn on_conversion_complete(&self, total_pages: usize, elements: usize) {
        self.bar.finish_and_clear();
        let skipped = self.skipped.load(Ordering::SeqCst);
        if skipped == 0 {
            eprintln!(
                "{} {} pages → {} elements",
                green("✔"),
                bold(&total_pages.to_string()),
                bold(&elements.to_string())
            );
        } else {
            eprintln!(
                "{} {} pages → {} elements  ({} images skipped)",
                yellow("⚠"),
                bold(&total_pages.to_string()),
                bold(&elements.to_string()),
                yellow(&skipped.to_string())
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert; writes output.html next to the input
  pdf2html -i book.pdf

  # Explicit output file
  pdf2html -i book.pdf -o book.html

  # Larger default reading size
  pdf2html -i book.pdf -o book.html --base-size 18

  # Only chapter one, keep text whose size could not be detected
  pdf2html -i book.pdf --pages 3-27 --keep-unsized

  # Scanned document with no text layer
  pdf2html -i scan.pdf --fallback-baseline 12

  # Inspect PDF metadata only
  pdf2html -i book.pdf --inspect-only --json

ENVIRONMENT VARIABLES:
  RUST_LOG                Override the log filter (e.g. pdf2html=debug)
  PDFIUM_LIB_PATH         Path to an existing libpdfium, skips auto-download
  PDFIUM_AUTO_CACHE_DIR   Override the default pdfium cache directory

  PDFium (~30 MB) is downloaded automatically on first run and cached.
  To use an existing copy: PDFIUM_LIB_PATH=/path/to/libpdfium pdf2html ...
"#;

/// Convert a PDF into a single self-contained HTML reader.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2html",
    version,
    about = "Convert a PDF into a single self-contained HTML reader",
    long_about = "Convert a PDF into one self-contained HTML file. Paragraphs keep their \
relative font sizes, images are inlined as PNG, and the page carries a small reader with \
font size, reading mode (light, dark, sepia) and font family controls.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input PDF file.
    #[arg(short, long)]
    input: PathBuf,

    /// Output HTML file. Default: output.html next to the input.
    #[arg(short, long, env = "PDF2HTML_OUTPUT")]
    output: Option<PathBuf>,

    /// Reader size preselected for body text, in pixels (8–24).
    #[arg(long, env = "PDF2HTML_BASE_SIZE", default_value_t = pdf2html::config::DEFAULT_BASE_FONT_SIZE,
          value_parser = clap::value_parser!(u32).range(8..=24))]
    base_size: u32,

    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "PDF2HTML_PAGES", default_value = "all")]
    pages: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2HTML_PASSWORD")]
    password: Option<String>,

    /// Emit text without a detectable font size unscaled instead of dropping it.
    #[arg(long)]
    keep_unsized: bool,

    /// Baseline size in points when the document has no sized text.
    #[arg(long)]
    fallback_baseline: Option<f32>,

    /// Max vertical gap between lines of one text box, relative to line height.
    #[arg(long, default_value_t = 0.5)]
    line_margin: f32,

    /// Document title. Default: PDF title metadata, else the file name.
    #[arg(long)]
    title: Option<String>,

    /// Print PDF metadata only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Print stats (or metadata with --inspect-only) as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2HTML_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2HTML_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2HTML_QUIET")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs; per-node warnings still show.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if show_progress {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Ensure PDFium engine is available ───────────────────────────────
    ensure_pdfium(cli.quiet)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(&cli.input).context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", cli.input.display());
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {}", s);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));

    let stats = convert_to_file(&cli.input, &output_path, &config).context("Conversion failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).context("Failed to serialise stats")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  {} paragraphs, {} images  {}ms  →  {}",
            if stats.skipped_images == 0 && stats.unsized_text == 0 {
                green("✔")
            } else {
                yellow("⚠")
            },
            stats.paragraphs,
            stats.images,
            stats.duration_ms,
            bold(&output_path.display().to_string()),
        );
        if stats.unsized_text > 0 {
            eprintln!(
                "   {} text boxes without font size {}",
                yellow(&stats.unsized_text.to_string()),
                dim(if cli.keep_unsized {
                    "(kept unscaled)"
                } else {
                    "(dropped; use --keep-unsized)"
                }),
            );
        }
    }

    Ok(())
}

/// Download the pdfium library on first run, with a byte progress bar.
fn ensure_pdfium(quiet: bool) -> Result<()> {
    if pdfium_auto::is_pdfium_cached() {
        return Ok(());
    }

    if quiet {
        pdfium_auto::ensure_pdfium_library(None).context("Failed to download PDFium engine")?;
        return Ok(());
    }

    let dl_bar = ProgressBar::new(0);
    dl_bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS),
    );
    dl_bar.set_prefix("PDF engine");
    dl_bar.set_message("Connecting…");
    dl_bar.enable_steady_tick(Duration::from_millis(80));

    let bar = dl_bar.clone();
    pdfium_auto::ensure_pdfium_library(Some(&|downloaded, total| {
        if let Some(t) = total {
            if bar.length().unwrap_or(0) != t {
                bar.set_length(t);
            }
        }
        bar.set_position(downloaded);
    }))
    .context("Failed to download PDFium engine")?;

    dl_bar.finish_with_message("ready ✓");
    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .base_font_size(cli.base_size)
        .pages(parse_pages(&cli.pages)?)
        .line_margin(cli.line_margin)
        .unsized_text(if cli.keep_unsized {
            UnsizedTextPolicy::Unscaled
        } else {
            UnsizedTextPolicy::Drop
        });

    if let Some(ref password) = cli.password {
        builder = builder.password(password.clone());
    }
    if let Some(points) = cli.fallback_baseline {
        builder = builder.fallback_baseline(points);
    }
    if let Some(ref title) = cli.title {
        builder = builder.title(title.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--pages` string into `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    // Range: "3-15"
    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start
            .trim()
            .parse()
            .context("Invalid start page in range")?;
        let end: usize = end.trim().parse().context("Invalid end page in range")?;

        if start < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", start);
        }
        if start > end {
            anyhow::bail!(
                "Invalid page range '{}-{}': start must be <= end",
                start,
                end
            );
        }
        return Ok(PageSelection::Range(start, end));
    }

    // Set: "1,3,5,7"
    if s.contains(',') {
        let pages: Vec<usize> = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<usize>()
                    .with_context(|| format!("Invalid page number: '{}'", p.trim()))
            })
            .collect::<Result<Vec<_>>>()?;

        if let Some(&p) = pages.iter().find(|&&p| p < 1) {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", p);
        }
        return Ok(PageSelection::Set(pages));
    }

    // Single page: "5"
    let page: usize = s.parse().context("Invalid page number")?;
    if page < 1 {
        anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", page);
    }
    Ok(PageSelection::Single(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_page_selections() {
        assert!(matches!(parse_pages("all").unwrap(), PageSelection::All));
        assert!(matches!(parse_pages(" 7 ").unwrap(), PageSelection::Single(7)));
        assert!(matches!(parse_pages("3-15").unwrap(), PageSelection::Range(3, 15)));
        match parse_pages("1,3,5").unwrap() {
            PageSelection::Set(p) => assert_eq!(p, vec![1, 3, 5]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_page_selections() {
        assert!(parse_pages("0").is_err());
        assert!(parse_pages("5-2").is_err());
        assert!(parse_pages("1,x").is_err());
        assert!(parse_pages("0,2").is_err());
    }

    #[test]
    fn input_flag_is_required() {
        assert!(Cli::try_parse_from(["pdf2html"]).is_err());
        let cli = Cli::try_parse_from(["pdf2html", "-i", "doc.pdf"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("doc.pdf"));
        assert_eq!(cli.base_size, 13);
        assert!(cli.output.is_none());
    }

    #[test]
    fn base_size_is_range_checked() {
        assert!(Cli::try_parse_from(["pdf2html", "-i", "a.pdf", "--base-size", "30"]).is_err());
        let cli = Cli::try_parse_from(["pdf2html", "-i", "a.pdf", "--base-size", "16"]).unwrap();
        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.base_font_size, 16);
    }
}
