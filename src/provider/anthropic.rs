//! Anthropic Messages API adapter.

use super::{encode_all, endpoint, http_client, missing_text, send_json, ProviderOptions, RecipeParser};
use crate::credentials::CredentialSource;
use crate::error::RecipeError;
use crate::pipeline::encode::{EncodedImage, PageImage};
use crate::pipeline::extract::parse_recipe_text;
use crate::prompts::RECIPE_EXTRACTION_PROMPT;
use crate::recipe::RecipeRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
pub const BASE_URL_VAR: &str = "ANTHROPIC_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
pub const API_VERSION: &str = "2023-06-01";

const NAME: &str = "anthropic";

/// Sends all pages as base64 `image` blocks followed by the prompt.
#[derive(Debug, Clone)]
pub struct AnthropicParser {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicParser {
    /// Requires `ANTHROPIC_API_KEY`; `ANTHROPIC_BASE_URL` overrides the endpoint.
    pub fn from_credentials(
        credentials: &dyn CredentialSource,
        options: &ProviderOptions,
    ) -> Result<Self, RecipeError> {
        let api_key = credentials
            .get_non_empty(API_KEY_VAR)
            .ok_or_else(|| RecipeError::missing_credential(NAME, API_KEY_VAR))?;

        Ok(Self {
            client: http_client(options.timeout)?,
            api_key,
            base_url: credentials
                .get_non_empty(BASE_URL_VAR)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: options
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: options.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request<'a>(&'a self, images: &'a [EncodedImage]) -> MessagesRequest<'a> {
        let mut content: Vec<ContentBlock<'a>> = images
            .iter()
            .map(|img| ContentBlock::Image {
                source: ImageSource {
                    kind: "base64",
                    media_type: img.media_type(),
                    data: img.base64(),
                },
            })
            .collect();
        content.push(ContentBlock::Text {
            text: RECIPE_EXTRACTION_PROMPT,
        });

        MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content,
            }],
        }
    }
}

#[async_trait]
impl RecipeParser for AnthropicParser {
    fn name(&self) -> &str {
        NAME
    }

    async fn parse(&self, images: &[PageImage]) -> Result<RecipeRecord, RecipeError> {
        let encoded = encode_all(self.name(), images)?;
        let request = self.build_request(&encoded);
        let url = endpoint(&self.base_url, "v1/messages");

        info!("Parsing recipe with {} ({}), {} image(s)", NAME, self.model, encoded.len());
        let response: MessagesResponse = send_json(
            NAME,
            self.client
                .post(&url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", API_VERSION),
            &url,
            &request,
        )
        .await?;

        let text = response
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or_else(|| missing_text(NAME, "text in content[0]"))?;

        parse_recipe_text(NAME, &text)
    }
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Vec<ContentBlock<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock<'a> {
    Image { source: ImageSource<'a> },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
struct ImageSource<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: &'static str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
}

/// Only `text` blocks carry the field we read; other block types leave it
/// empty.
#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(default)]
    text: Option<String>,
}
