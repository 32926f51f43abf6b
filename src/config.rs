//! Configuration types for PDF-to-recipe conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Setters clamp out-of-range values;
//! [`ConversionConfigBuilder::build`] rejects combinations that cannot work.

use crate::credentials::CredentialSource;
use crate::error::RecipeError;
use crate::pipeline::render::{PageRenderer, RenderOptions};
use crate::progress::ProgressCallback;
use crate::provider::{ProviderKind, ProviderOptions, RecipeParser};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for a PDF-to-recipe conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use recipe_pdf2json::{ConversionConfig, ProviderKind};
///
/// let config = ConversionConfig::builder()
///     .dpi(200)
///     .provider_name("anthropic")
///     .build()
///     .unwrap();
/// assert_eq!(config.provider_kind, ProviderKind::Anthropic);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Rendering DPI used when rasterising each PDF page. Range: 72–400. Default: 150.
    pub dpi: u32,

    /// Optional cap on either rendered dimension, in pixels. Default: None.
    ///
    /// Without a cap every page is rendered at exactly `dpi`. With one, a
    /// large-format page is shrunk to fit and its [`crate::PageImage::dpi`]
    /// records the lower resolution.
    pub max_rendered_pixels: Option<u32>,

    /// Which built-in adapter to use. Default: [`ProviderKind::OpenAi`].
    pub provider_kind: ProviderKind,

    /// Model identifier. If None, uses the adapter default.
    pub model: Option<String>,

    /// Maximum tokens the model may generate. Default: 2000.
    pub max_tokens: u32,

    /// Sampling temperature (OpenAI only). Default: 0.3.
    pub temperature: f32,

    /// HTTP timeout in seconds. If None, hosted APIs have no client timeout
    /// and Ollama waits ten minutes.
    pub request_timeout_secs: Option<u64>,

    /// Pre-constructed parser. Takes precedence over `provider_kind`.
    pub provider: Option<Arc<dyn RecipeParser>>,

    /// Page renderer. If None, a [`crate::PdfiumRenderer`] bound from the
    /// environment is used.
    pub renderer: Option<Arc<dyn PageRenderer>>,

    /// Where adapters look up API keys and endpoint overrides. If None, the
    /// process environment is read.
    pub credentials: Option<Arc<dyn CredentialSource>>,

    /// Receives pipeline events. If None, events only go to `tracing`.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: 150,
            max_rendered_pixels: None,
            provider_kind: ProviderKind::default(),
            model: None,
            max_tokens: 2000,
            temperature: 0.3,
            request_timeout_secs: None,
            provider: None,
            renderer: None,
            credentials: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("provider_kind", &self.provider_kind)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .field("renderer", &self.renderer.as_ref().map(|_| "<dyn PageRenderer>"))
            .field("credentials", &self.credentials.as_ref().map(|_| "<dyn CredentialSource>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Settings handed to whichever adapter gets built.
    pub fn provider_options(&self) -> ProviderOptions {
        ProviderOptions {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            dpi: self.dpi,
            max_rendered_pixels: self.max_rendered_pixels,
        }
    }
}

/// Builder for [`ConversionConfig`].
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl fmt::Debug for ConversionConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    /// Cap rendered pages at `px` on either side (clamped to 100 – `i32::MAX`).
    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = Some(px.clamp(100, i32::MAX as u32));
        self
    }

    pub fn provider_kind(mut self, kind: ProviderKind) -> Self {
        self.config.provider_kind = kind;
        self
    }

    /// Select the adapter by name. Unknown names fall back to openai.
    pub fn provider_name(mut self, name: impl AsRef<str>) -> Self {
        self.config.provider_kind = ProviderKind::from_selector(name.as_ref());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn provider(mut self, provider: Arc<dyn RecipeParser>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.config.renderer = Some(renderer);
        self
    }

    pub fn credentials(mut self, credentials: Arc<dyn CredentialSource>) -> Self {
        self.config.credentials = Some(credentials);
        self
    }

    pub fn progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.config.progress_callback = Some(callback);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, RecipeError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 400 {
            return Err(RecipeError::InvalidConfig(format!(
                "DPI must be 72–400, got {}",
                c.dpi
            )));
        }
        if c.max_tokens == 0 {
            return Err(RecipeError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(RecipeError::InvalidConfig(
                "request timeout must be ≥ 1 second".into(),
            ));
        }
        if matches!(&c.model, Some(m) if m.trim().is_empty()) {
            return Err(RecipeError::InvalidConfig("model must not be blank".into()));
        }
        Ok(self.config)
    }
}
