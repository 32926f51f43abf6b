//! Vision provider adapters.
//!
//! Every backend implements [`RecipeParser`]: page images in, one
//! [`RecipeRecord`] out. The variants differ only in how they build the
//! request and where the generated text sits in the response; the steps
//! around that are shared and live here:
//!
//! ```text
//! credentials ──▶ encode_all ──▶ build request ──▶ send_json ──▶ extract text ──▶ parse_recipe_text
//! (at build)      (codec)        (per variant)     (reqwest)     (per variant)    (fence strip + JSON)
//! ```
//!
//! Adapters resolve their credentials when they are built, so a missing API
//! key is reported before any page is rendered or any request is sent.

pub mod anthropic;
pub mod ollama;
pub mod openai;

use crate::credentials::CredentialSource;
use crate::error::RecipeError;
use crate::pipeline::encode::{encode_page, EncodedImage, PageImage};
use crate::recipe::RecipeRecord;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub use anthropic::AnthropicParser;
pub use ollama::OllamaParser;
pub use openai::OpenAiParser;

/// A vision backend that turns page images into one recipe.
#[async_trait]
pub trait RecipeParser: Send + Sync {
    /// Short provider name used in logs and error messages.
    fn name(&self) -> &str;

    /// Extract one recipe from all `images`, in a single request.
    ///
    /// An empty slice is rejected with [`RecipeError::NoPageImages`].
    async fn parse(&self, images: &[PageImage]) -> Result<RecipeRecord, RecipeError>;
}

/// Which built-in adapter to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProviderKind {
    /// OpenAI Chat Completions (default).
    #[default]
    OpenAi,
    /// Anthropic Messages API.
    Anthropic,
    /// A local Ollama server.
    Ollama,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [Self::OpenAi, Self::Anthropic, Self::Ollama];

    /// Map a selector string to a provider.
    ///
    /// Matching ignores case and surrounding whitespace. Unknown selectors
    /// fall back to [`ProviderKind::OpenAi`] rather than failing.
    pub fn from_selector(selector: &str) -> Self {
        match selector.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Self::Anthropic,
            "ollama" => Self::Ollama,
            "openai" | "" => Self::OpenAi,
            other => {
                warn!("Unknown provider '{}', falling back to openai", other);
                Self::OpenAi
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Ollama => "ollama",
        }
    }

    /// Construct the adapter, resolving its credentials from `credentials`.
    ///
    /// Fails with [`RecipeError::Configuration`] when a required key is
    /// absent; no network I/O happens here.
    pub fn build(
        &self,
        credentials: &dyn CredentialSource,
        options: &ProviderOptions,
    ) -> Result<Arc<dyn RecipeParser>, RecipeError> {
        let parser: Arc<dyn RecipeParser> = match self {
            Self::OpenAi => Arc::new(OpenAiParser::from_credentials(credentials, options)?),
            Self::Anthropic => Arc::new(AnthropicParser::from_credentials(credentials, options)?),
            Self::Ollama => Arc::new(OllamaParser::from_credentials(credentials, options)?),
        };
        Ok(parser)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ProviderKind {
    fn from(selector: &str) -> Self {
        Self::from_selector(selector)
    }
}

/// Generation and transport settings shared by all adapters.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderOptions {
    /// Overrides the adapter's default model when set.
    pub model: Option<String>,
    pub max_tokens: u32,
    /// Sent only by adapters with explicit temperature control (OpenAI).
    pub temperature: f32,
    /// HTTP timeout. `None` uses the adapter default: no client timeout for
    /// hosted APIs, ten minutes for Ollama.
    pub timeout: Option<Duration>,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: 2000,
            temperature: 0.3,
            timeout: None,
        }
    }
}

// ── Shared helpers ───────────────────────────────────────────────────────

/// Encode every page, rejecting an empty batch.
pub(crate) fn encode_all(
    provider: &str,
    images: &[PageImage],
) -> Result<Vec<EncodedImage>, RecipeError> {
    if images.is_empty() {
        return Err(RecipeError::NoPageImages {
            provider: provider.to_string(),
        });
    }

    images
        .iter()
        .map(|page| {
            encode_page(page).map_err(|e| RecipeError::Encoding {
                page: page.page_num,
                detail: e.to_string(),
            })
        })
        .collect()
}

/// Build a client, applying `timeout` when one is set.
pub(crate) fn http_client(timeout: Option<Duration>) -> Result<reqwest::Client, RecipeError> {
    let mut builder = reqwest::Client::builder();
    if let Some(t) = timeout {
        builder = builder.timeout(t);
    }
    builder
        .build()
        .map_err(|e| RecipeError::Internal(format!("Failed to create HTTP client: {e}")))
}

/// POST `body` as JSON and decode a 2xx JSON reply into `R`.
///
/// * transport failure → [`RecipeError::Connectivity`]
/// * non-2xx → [`RecipeError::RemoteApi`] with status and body
/// * 2xx with an undecodable envelope → [`RecipeError::Content`]
pub(crate) async fn send_json<B, R>(
    provider: &str,
    request: reqwest::RequestBuilder,
    url: &str,
    body: &B,
) -> Result<R, RecipeError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let connectivity = |e: reqwest::Error| RecipeError::Connectivity {
        provider: provider.to_string(),
        endpoint: url.to_string(),
        detail: describe_transport_error(&e),
    };

    debug!("POST {} ({})", url, provider);
    let response = request.json(body).send().await.map_err(connectivity)?;

    let status = response.status();
    let text = response.text().await.map_err(connectivity)?;

    if !status.is_success() {
        return Err(RecipeError::RemoteApi {
            provider: provider.to_string(),
            status: status.as_u16(),
            body: text,
        });
    }

    serde_json::from_str(&text).map_err(|e| RecipeError::Content {
        provider: provider.to_string(),
        detail: format!("unexpected response envelope: {e}"),
        raw: text,
    })
}

/// The generated text was missing from an otherwise successful reply.
pub(crate) fn missing_text(provider: &str, what: &str) -> RecipeError {
    RecipeError::Content {
        provider: provider.to_string(),
        detail: format!("response has no {what}"),
        raw: String::new(),
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out ({e})")
    } else if e.is_connect() {
        format!("connection failed ({e}). Make sure the server is running.")
    } else {
        e.to_string()
    }
}

/// Join a base URL and a path without doubling the slash.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
