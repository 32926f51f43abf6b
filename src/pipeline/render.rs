//! PDF rasterisation: render every page to a [`PageImage`] via pdfium.
//!
//! Rendering sits behind the [`PageRenderer`] trait so the orchestrator can be
//! driven by a stub in tests; [`PdfiumRenderer`] is the real implementation.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which uses thread-local
//! state internally and is not safe to call from async contexts.
//! [`render_pages`] moves the work onto tokio's blocking pool so the runtime
//! worker threads never stall on CPU-heavy rasterisation.

use crate::error::RecipeError;
use crate::pipeline::encode::PageImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// PDF points per inch; pdfium's unscaled render is 72 dpi.
const POINTS_PER_INCH: f32 = 72.0;

/// Resolution settings for one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub dpi: u32,
    /// Optional cap on either rendered dimension, in pixels. When a page
    /// would exceed it, pdfium shrinks the page and the recorded dpi drops
    /// to match.
    pub max_rendered_pixels: Option<u32>,
}

impl RenderOptions {
    /// Render at exactly `dpi`, with no pixel cap.
    pub fn at_dpi(dpi: u32) -> Self {
        Self {
            dpi,
            max_rendered_pixels: None,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::at_dpi(150)
    }
}

/// Turns a PDF file into one image per page, in page order.
pub trait PageRenderer: Send + Sync {
    fn render(&self, pdf_path: &Path, options: &RenderOptions)
        -> Result<Vec<PageImage>, RecipeError>;
}

/// Renders pages with pdfium.
///
/// The pdfium shared library is looked up, in order, at `library_path`
/// (or `PDFIUM_LIB_PATH` when built with [`PdfiumRenderer::from_env`]), in
/// the working directory, and finally among the system libraries.
#[derive(Debug, Clone, Default)]
pub struct PdfiumRenderer {
    library_path: Option<PathBuf>,
}

impl PdfiumRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Honour `PDFIUM_LIB_PATH` when set.
    pub fn from_env() -> Self {
        Self {
            library_path: std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from),
        }
    }

    pub fn with_library_path(path: impl Into<PathBuf>) -> Self {
        Self {
            library_path: Some(path.into()),
        }
    }

    fn bind(&self) -> Result<Pdfium, PdfiumError> {
        let bindings = match &self.library_path {
            Some(path) => Pdfium::bind_to_library(path)?,
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library())?,
        };
        Ok(Pdfium::new(bindings))
    }
}

impl PageRenderer for PdfiumRenderer {
    fn render(
        &self,
        pdf_path: &Path,
        options: &RenderOptions,
    ) -> Result<Vec<PageImage>, RecipeError> {
        let rendering = |detail: String| RecipeError::Rendering {
            path: pdf_path.to_path_buf(),
            detail,
        };

        let pdfium = self
            .bind()
            .map_err(|e| rendering(format!("failed to bind pdfium library: {e}")))?;

        let document = pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| rendering(format!("{e:?}")))?;

        let mut render_config =
            PdfRenderConfig::new().scale_page_by_factor(scale_factor(options.dpi));
        if let Some(cap) = options.max_rendered_pixels {
            let cap = pixel_limit(cap);
            render_config = render_config
                .set_maximum_width(cap)
                .set_maximum_height(cap);
        }

        let mut images = Vec::new();
        for (idx, page) in document.pages().iter().enumerate() {
            let page_num = idx + 1;
            let (width_pt, height_pt) = (page.width().value, page.height().value);
            let bitmap = page
                .render_with_config(&render_config)
                .map_err(|e| rendering(format!("page {page_num}: {e:?}")))?;

            let image = bitmap.as_image();
            let (_, full_height) =
                render_size(width_pt, height_pt, &RenderOptions::at_dpi(options.dpi));
            let dpi = match options.max_rendered_pixels {
                Some(_) if image.height() < full_height => {
                    let dpi = effective_dpi(image.height(), height_pt, options.dpi);
                    debug!("Page {} hit the pixel cap, rendered at ~{} dpi", page_num, dpi);
                    dpi
                }
                _ => options.dpi,
            };

            debug!(
                "Rendered page {} → {}x{} px",
                page_num,
                image.width(),
                image.height()
            );
            images.push(PageImage::new(page_num, dpi, image));
        }

        Ok(images)
    }
}

/// Rasterise every page of `pdf_path` on the blocking pool.
pub async fn render_pages(
    renderer: Arc<dyn PageRenderer>,
    pdf_path: &Path,
    options: RenderOptions,
) -> Result<Vec<PageImage>, RecipeError> {
    let path = pdf_path.to_path_buf();

    let images = tokio::task::spawn_blocking(move || renderer.render(&path, &options))
        .await
        .map_err(|e| RecipeError::Internal(format!("Render task panicked: {e}")))??;

    info!("Rendered {} page(s) at {} dpi", images.len(), options.dpi);
    Ok(images)
}

fn scale_factor(dpi: u32) -> f32 {
    dpi as f32 / POINTS_PER_INCH
}

/// pdfium takes its size limits as `i32`.
fn pixel_limit(px: u32) -> i32 {
    i32::try_from(px).unwrap_or(i32::MAX)
}

/// Bitmap size for a page of `width_pt` × `height_pt`, after any pixel cap.
/// The cap shrinks both sides by the same factor.
fn render_size(width_pt: f32, height_pt: f32, options: &RenderOptions) -> (u32, u32) {
    let scale = scale_factor(options.dpi);
    let (w, h) = (width_pt * scale, height_pt * scale);
    let shrink = match options.max_rendered_pixels {
        Some(cap) => (cap as f32 / w).min(cap as f32 / h).min(1.0),
        None => 1.0,
    };
    ((w * shrink).round() as u32, (h * shrink).round() as u32)
}

/// Resolution a page was actually rendered at, from its bitmap height.
fn effective_dpi(bitmap_height: u32, height_pt: f32, requested: u32) -> u32 {
    if height_pt <= 0.0 {
        return requested;
    }
    (bitmap_height as f32 * POINTS_PER_INCH / height_pt).round() as u32
}
