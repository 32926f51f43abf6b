//! # recipe-pdf2json
//!
//! Convert a PDF recipe into one structured JSON record using a Vision
//! Language Model (VLM).
//!
//! Recipe PDFs are mostly laid-out pages: photos, two-column ingredient
//! lists, sidebars. Text extraction scrambles them. Instead this crate
//! rasterises every page into a PNG and sends all of them to one vision model
//! in a single request, asking for a fixed JSON shape back.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    check the file exists and starts with %PDF
//!  ├─ 2. Render   rasterise pages via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Encode   PNG → base64
//!  ├─ 4. Provider one request to openai / anthropic / ollama
//!  ├─ 5. Extract  strip a ```json fence, parse to a JSON object
//!  └─ 6. Output   2-space indented JSON, key order preserved
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use recipe_pdf2json::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads OPENAI_API_KEY from the environment.
//!     let config = ConversionConfig::default();
//!     let json = convert("recipe.pdf", &config).await?;
//!     println!("{}", json);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `recipe2json` binary (clap + anyhow + indicatif + tracing-subscriber + dotenvy) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! recipe-pdf2json = { version = "0.1", default-features = false }
//! ```
//!
//! ## Providers
//!
//! | Provider | Default model | Credentials |
//! |----------|---------------|-------------|
//! | `openai` (default) | `gpt-4o` | `OPENAI_API_KEY` |
//! | `anthropic` | `claude-sonnet-4-5-20250929` | `ANTHROPIC_API_KEY` |
//! | `ollama` | `llama3.2-vision` | none; `OLLAMA_URL` defaults to `http://localhost:11434` |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod credentials;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod provider;
pub mod recipe;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_images, convert_sync, convert_to_file, extract_recipe};
pub use credentials::{CredentialSource, EnvCredentials, StaticCredentials};
pub use error::{ErrorKind, RecipeError};
pub use pipeline::encode::PageImage;
pub use pipeline::render::{PageRenderer, PdfiumRenderer, RenderOptions};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use provider::{
    AnthropicParser, OllamaParser, OpenAiParser, ProviderKind, ProviderOptions, RecipeParser,
};
pub use recipe::RecipeRecord;
