//! Local Ollama adapter (`/api/generate`).
//!
//! Local inference on a vision model can take minutes per request, so this
//! adapter applies a ten-minute client timeout unless one is configured. It
//! also asks the server for `format: "json"`, which constrains decoding to
//! valid JSON on models that support it.

use super::{encode_all, endpoint, http_client, send_json, ProviderOptions, RecipeParser};
use crate::credentials::CredentialSource;
use crate::error::RecipeError;
use crate::pipeline::encode::{EncodedImage, PageImage};
use crate::pipeline::extract::parse_recipe_text;
use crate::prompts::RECIPE_EXTRACTION_PROMPT;
use crate::recipe::RecipeRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

pub const URL_VAR: &str = "OLLAMA_URL";
pub const MODEL_VAR: &str = "OLLAMA_MODEL";
pub const DEFAULT_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.2-vision";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

const NAME: &str = "ollama";

/// Sends all pages as raw base64 strings in the `images` array.
#[derive(Debug, Clone)]
pub struct OllamaParser {
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl OllamaParser {
    /// Nothing is required. `OLLAMA_URL` and `OLLAMA_MODEL` override the
    /// defaults; an explicit model in `options` beats `OLLAMA_MODEL`.
    pub fn from_credentials(
        credentials: &dyn CredentialSource,
        options: &ProviderOptions,
    ) -> Result<Self, RecipeError> {
        let model = options
            .model
            .clone()
            .or_else(|| credentials.get_non_empty(MODEL_VAR))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            client: http_client(Some(options.timeout.unwrap_or(DEFAULT_TIMEOUT)))?,
            base_url: credentials
                .get_non_empty(URL_VAR)
                .unwrap_or_else(|| DEFAULT_URL.to_string()),
            model,
            max_tokens: options.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_request<'a>(&'a self, images: &'a [EncodedImage]) -> GenerateRequest<'a> {
        GenerateRequest {
            model: &self.model,
            prompt: RECIPE_EXTRACTION_PROMPT,
            images: images.iter().map(EncodedImage::base64).collect(),
            stream: false,
            format: "json",
            options: GenerateOptions {
                num_predict: self.max_tokens,
            },
        }
    }
}

#[async_trait]
impl RecipeParser for OllamaParser {
    fn name(&self) -> &str {
        NAME
    }

    async fn parse(&self, images: &[PageImage]) -> Result<RecipeRecord, RecipeError> {
        let encoded = encode_all(self.name(), images)?;
        let request = self.build_request(&encoded);
        let url = endpoint(&self.base_url, "api/generate");

        info!("Parsing recipe with {} ({}), {} image(s)", NAME, self.model, encoded.len());
        let response: GenerateResponse =
            send_json(NAME, self.client.post(&url), &url, &request).await?;

        parse_recipe_text(NAME, &response.response)
    }
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'static str,
    images: Vec<&'a str>,
    stream: bool,
    format: &'static str,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    /// Absent on malformed replies; an empty string then fails JSON parsing.
    #[serde(default)]
    response: String,
}
