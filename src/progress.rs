//! Progress-callback trait for conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline moves from rendering to parsing.
//!
//! # Example
//!
//! ```rust
//! use recipe_pdf2json::{ConversionConfig, ConversionProgressCallback};
//! use std::sync::Arc;
//!
//! struct Stderr;
//!
//! impl ConversionProgressCallback for Stderr {
//!     fn on_pages_rendered(&self, page_count: usize) {
//!         eprintln!("Extracted {} page(s)", page_count);
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(Stderr) as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the conversion pipeline at each stage.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events fire in order on one task.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called before the PDF is rasterised.
    fn on_render_start(&self) {}

    /// Called once every page has been rendered.
    fn on_pages_rendered(&self, page_count: usize) {
        let _ = page_count;
    }

    /// Called just before the single provider request is sent.
    ///
    /// # Arguments
    /// * `provider`   — adapter name, e.g. `"openai"`
    /// * `page_count` — number of images in the request
    fn on_parse_start(&self, provider: &str, page_count: usize) {
        let _ = (provider, page_count);
    }

    /// Called after the reply has been parsed into a recipe.
    fn on_conversion_complete(&self, provider: &str) {
        let _ = provider;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
