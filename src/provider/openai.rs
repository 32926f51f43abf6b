//! OpenAI Chat Completions adapter.

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

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

const NAME: &str = "openai";

/// Sends all pages in one chat completion as `image_url` parts.
#[derive(Debug, Clone)]
pub struct OpenAiParser {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiParser {
    /// Requires `OPENAI_API_KEY`; `OPENAI_BASE_URL` overrides the endpoint.
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
            temperature: options.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request<'a>(&'a self, images: &'a [EncodedImage]) -> ChatCompletionRequest<'a> {
        let mut content = Vec::with_capacity(images.len() + 1);
        content.push(ContentPart::Text {
            text: RECIPE_EXTRACTION_PROMPT,
        });
        content.extend(images.iter().map(|img| ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: img.data_uri(),
                detail: "high",
            },
        }));

        ChatCompletionRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content,
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl RecipeParser for OpenAiParser {
    fn name(&self) -> &str {
        NAME
    }

    async fn parse(&self, images: &[PageImage]) -> Result<RecipeRecord, RecipeError> {
        let encoded = encode_all(self.name(), images)?;
        let request = self.build_request(&encoded);
        let url = endpoint(&self.base_url, "chat/completions");

        info!("Parsing recipe with {} ({}), {} image(s)", NAME, self.model, encoded.len());
        let response: ChatCompletionResponse = send_json(
            NAME,
            self.client.post(&url).bearer_auth(&self.api_key),
            &url,
            &request,
        )
        .await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| missing_text(NAME, "choices[0].message.content"))?;

        parse_recipe_text(NAME, &text)
    }
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
    detail: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
