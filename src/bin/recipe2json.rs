//! CLI binary for recipe-pdf2json.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints the recipe JSON.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use recipe_pdf2json::{
    convert, convert_to_file, ConversionConfig, ConversionProgressCallback, ProgressCallback,
    ProviderKind,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callbacks ───────────────────────────────────────────────────

/// Spinner on stderr, with one log line per pipeline stage.
struct SpinnerProgress {
    bar: ProgressBar,
}

impl SpinnerProgress {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    /// Remove the spinner line, e.g. before an error is printed.
    fn clear(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

impl ConversionProgressCallback for SpinnerProgress {
    fn on_render_start(&self) {
        self.bar.set_prefix("Rendering");
        self.bar.println(format!("{} Converting PDF to images...", cyan("◆")));
    }

    fn on_pages_rendered(&self, page_count: usize) {
        self.bar
            .println(format!("  {} Extracted {} page(s)", green("✓"), page_count));
    }

    fn on_parse_start(&self, provider: &str, _page_count: usize) {
        self.bar.set_prefix("Parsing");
        self.bar.set_message(format!("waiting for {provider}…"));
        self.bar.println(format!(
            "{} Parsing recipe with {} vision model...",
            cyan("◆"),
            bold(provider)
        ));
    }

    fn on_conversion_complete(&self, provider: &str) {
        self.bar.finish_and_clear();
        eprintln!("{} Recipe parsed by {}", green("✔"), provider);
    }
}

/// Plain stage lines on stderr, for `--no-progress` or non-interactive runs.
struct PlainProgress;

impl ConversionProgressCallback for PlainProgress {
    fn on_render_start(&self) {
        eprintln!("Converting PDF to images...");
    }

    fn on_pages_rendered(&self, page_count: usize) {
        eprintln!("Extracted {} page(s)", page_count);
    }

    fn on_parse_start(&self, provider: &str, _page_count: usize) {
        eprintln!("Parsing recipe with {} vision model...", provider);
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Print recipe JSON to stdout (OpenAI)
  recipe2json recipe.pdf

  # Save to a file
  recipe2json recipe.pdf -o recipe.json

  # Use Claude
  recipe2json --anthropic recipe.pdf

  # Use a local Ollama server
  recipe2json --ollama --model llava recipe.pdf

PROVIDERS:
  Provider     Default model                 Credentials
  ─────────    ───────────────────────────   ──────────────────
  openai       gpt-4o                        OPENAI_API_KEY
  anthropic    claude-sonnet-4-5-20250929    ANTHROPIC_API_KEY
  ollama       llama3.2-vision               none (local server)

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  OPENAI_BASE_URL         OpenAI-compatible endpoint (default https://api.openai.com/v1)
  ANTHROPIC_API_KEY       Anthropic API key
  ANTHROPIC_BASE_URL      Anthropic endpoint (default https://api.anthropic.com)
  OLLAMA_URL              Ollama server (default http://localhost:11434)
  OLLAMA_MODEL            Ollama model when --model is not given
  RECIPE_PROVIDER         Default for --provider
  RECIPE_MODEL            Default for --model
  PDFIUM_LIB_PATH         Path to the pdfium shared library
  RUST_LOG                Log filter (overrides -v / -q)

  Variables may also be set in a .env file in the working directory.
"#;

/// Convert a PDF recipe to structured JSON using Vision LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "recipe2json",
    version,
    about = "Convert a PDF recipe to structured JSON using Vision LLMs",
    long_about = "Render every page of a PDF recipe to an image, send the pages to a vision \
model (OpenAI, Anthropic or a local Ollama server) in one request, and print the extracted \
recipe as JSON.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the PDF recipe.
    input: PathBuf,

    /// Write JSON to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Vision provider: openai, anthropic, ollama. Unknown names use openai.
    #[arg(long, env = "RECIPE_PROVIDER", default_value = "openai")]
    provider: String,

    /// Shorthand for --provider anthropic. Overrides --provider.
    #[arg(long, conflicts_with = "ollama")]
    anthropic: bool,

    /// Shorthand for --provider ollama. Overrides --provider.
    #[arg(long)]
    ollama: bool,

    /// Model ID (e.g. gpt-4o, claude-sonnet-4-5-20250929, llava).
    #[arg(long, env = "RECIPE_MODEL")]
    model: Option<String>,

    /// Rendering DPI (72–400).
    #[arg(long, default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// Max tokens the model may generate.
    #[arg(long, default_value_t = 2000)]
    max_tokens: u32,

    /// HTTP timeout in seconds (default: none for hosted APIs, 600 for ollama).
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Disable the progress spinner.
    #[arg(long)]
    no_progress: bool,
}

impl Cli {
    fn provider_kind(&self) -> ProviderKind {
        if self.anthropic {
            ProviderKind::Anthropic
        } else if self.ollama {
            ProviderKind::Ollama
        } else {
            ProviderKind::from_selector(&self.provider)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap so `env = ...` fallbacks see it.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner or the plain stage lines already report progress, so
    // library INFO logs are only shown with -v.
    let show_spinner = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let spinner = (show_spinner && !cli.verbose).then(SpinnerProgress::new);
    let progress_cb: Option<ProgressCallback> = if cli.quiet {
        None
    } else if let Some(ref s) = spinner {
        Some(s.clone() as Arc<dyn ConversionProgressCallback>)
    } else {
        Some(Arc::new(PlainProgress) as Arc<dyn ConversionProgressCallback>)
    };

    let result = match build_config(&cli, progress_cb) {
        Ok(config) => run(&cli, &config).await,
        Err(e) => Err(e),
    };
    if result.is_err() {
        if let Some(s) = spinner {
            s.clear();
        }
    }
    result
}

// ── Run conversion ───────────────────────────────────────────────────────────
async fn run(cli: &Cli, config: &ConversionConfig) -> Result<()> {
    if let Some(ref output_path) = cli.output {
        let recipe = convert_to_file(&cli.input, output_path, config)
            .await
            .context("Conversion failed")?;

        if !cli.quiet {
            eprintln!(
                "{}  {}  →  {}",
                green("✔"),
                recipe.title().unwrap_or("(untitled)"),
                bold(&output_path.display().to_string()),
            );
        }
    } else {
        let json = convert(&cli.input, config)
            .await
            .context("Conversion failed")?;

        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{json}").context("Failed to write to stdout")?;
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .dpi(cli.dpi)
        .provider_kind(cli.provider_kind())
        .max_tokens(cli.max_tokens);

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
