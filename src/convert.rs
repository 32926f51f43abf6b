//! Conversion entry points.
//!
//! Every entry point runs the same sequence: validate the input, resolve the
//! adapter, render all pages, send them in one request, parse the reply.
//! Each step awaits the previous one; there is exactly one provider call per
//! document.

use crate::config::ConversionConfig;
use crate::credentials::{CredentialSource, EnvCredentials};
use crate::error::RecipeError;
use crate::pipeline::encode::PageImage;
use crate::pipeline::{input, render};
use crate::pipeline::render::{PageRenderer, PdfiumRenderer};
use crate::provider::RecipeParser;
use crate::recipe::RecipeRecord;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Convert a PDF recipe to pretty-printed JSON.
///
/// This is the primary entry point for the library. The returned text uses
/// 2-space indentation, keeps non-ASCII characters literal, and preserves
/// the key order the model produced.
///
/// # Errors
/// * [`RecipeError::Configuration`] — the selected provider lacks its API key
///   (reported before any rendering)
/// * [`RecipeError::Rendering`] — file missing, not a PDF, or pdfium failed
/// * [`RecipeError::EmptyDocument`] — the PDF has no pages
/// * [`RecipeError::Connectivity`] / [`RecipeError::RemoteApi`] — the request failed
/// * [`RecipeError::Content`] — the reply was not a JSON object
pub async fn convert(
    pdf_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<String, RecipeError> {
    let recipe = extract_recipe(pdf_path, config).await?;
    to_json(&recipe)
}

/// Run the full pipeline and return the parsed record.
pub async fn extract_recipe(
    pdf_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<RecipeRecord, RecipeError> {
    let total_start = Instant::now();
    let pdf_path = pdf_path.as_ref();
    info!("Starting conversion: {}", pdf_path.display());

    // ── Step 1: Validate input ───────────────────────────────────────────
    let pdf_path = input::resolve_local(pdf_path)?;

    // ── Step 2: Resolve provider ─────────────────────────────────────────
    let parser = resolve_parser(config)?;

    // ── Step 3: Rasterise pages ──────────────────────────────────────────
    info!("Converting PDF to images...");
    if let Some(ref cb) = config.progress_callback {
        cb.on_render_start();
    }
    let render_start = Instant::now();
    let images = render::render_pages(resolve_renderer(config), &pdf_path, config.render_options())
        .await?;
    debug!("Rendering took {}ms", render_start.elapsed().as_millis());

    if images.is_empty() {
        return Err(RecipeError::EmptyDocument { path: pdf_path });
    }
    info!("Extracted {} page(s)", images.len());
    if let Some(ref cb) = config.progress_callback {
        cb.on_pages_rendered(images.len());
    }

    // ── Step 4: Parse ────────────────────────────────────────────────────
    let recipe = parse_with(parser.as_ref(), &images, config).await?;

    info!(
        "Conversion complete: {} page(s) via {}, {}ms total",
        images.len(),
        parser.name(),
        total_start.elapsed().as_millis()
    );
    Ok(recipe)
}

/// Parse already-rendered pages with the configured provider.
///
/// Skips input validation and rendering; useful when the caller produced
/// the page images some other way.
pub async fn convert_images(
    images: &[PageImage],
    config: &ConversionConfig,
) -> Result<RecipeRecord, RecipeError> {
    let parser = resolve_parser(config)?;
    parse_with(parser.as_ref(), images, config).await
}

/// Convert a PDF and write the JSON to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files. The
/// written text ends with a newline.
pub async fn convert_to_file(
    pdf_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<RecipeRecord, RecipeError> {
    let recipe = extract_recipe(pdf_path, config).await?;
    let mut json = to_json(&recipe)?;
    json.push('\n');

    let path = output_path.as_ref();
    let write_err = |e| RecipeError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, json).await.map_err(write_err)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        // Best-effort; report the rename error.
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }

    info!("Wrote {}", path.display());
    Ok(recipe)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally; must not be called from
/// inside an async context.
pub fn convert_sync(
    pdf_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<String, RecipeError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| RecipeError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(pdf_path, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Resolve the parser, from most-specific to least-specific.
///
/// 1. **Pre-built parser** (`config.provider`) used as-is.
/// 2. **Provider kind** (`config.provider_kind`) built from
///    `config.credentials`, or the process environment when none is set.
fn resolve_parser(config: &ConversionConfig) -> Result<Arc<dyn RecipeParser>, RecipeError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    let options = config.provider_options();
    match config.credentials {
        Some(ref creds) => config.provider_kind.build(creds.as_ref(), &options),
        None => config.provider_kind.build(&EnvCredentials as &dyn CredentialSource, &options),
    }
}

fn resolve_renderer(config: &ConversionConfig) -> Arc<dyn PageRenderer> {
    match config.renderer {
        Some(ref r) => Arc::clone(r),
        None => Arc::new(PdfiumRenderer::from_env()),
    }
}

async fn parse_with(
    parser: &dyn RecipeParser,
    images: &[PageImage],
    config: &ConversionConfig,
) -> Result<RecipeRecord, RecipeError> {
    info!("Parsing recipe with {} vision model...", parser.name());
    if let Some(ref cb) = config.progress_callback {
        cb.on_parse_start(parser.name(), images.len());
    }

    let llm_start = Instant::now();
    let recipe = parser.parse(images).await?;
    debug!("Provider call took {}ms", llm_start.elapsed().as_millis());

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(parser.name());
    }
    Ok(recipe)
}

fn to_json(recipe: &RecipeRecord) -> Result<String, RecipeError> {
    recipe
        .to_pretty_json()
        .map_err(|e| RecipeError::Internal(format!("Failed to serialise recipe: {e}")))
}
