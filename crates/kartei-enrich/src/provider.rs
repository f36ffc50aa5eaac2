use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use kartei_core::card::{EnrichedContent, Term};
use kartei_core::config::ApiKey;
use kartei_core::errors::ProviderError;
use kartei_core::provider::Enricher;

use crate::parse;
use crate::prompt;

const API_URL: &str = "https://api.openai.com/v1/chat/completions";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_MODEL: &str = "gpt-4o";
const MAX_REPLY_TOKENS: u32 = 300;
const TEMPERATURE: f64 = 0.3;

/// Enrichment client backed by the OpenAI chat-completions API.
pub struct OpenAiEnricher {
    client: Client,
    api_key: ApiKey,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatReply {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAiEnricher {
    pub fn new(api_key: ApiKey) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL)
    }

    pub fn with_model(api_key: ApiKey, model: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("failed to build HTTP client"),
            api_key,
            model: model.into(),
        }
    }

    async fn complete(&self, user_prompt: &str) -> Result<String, ProviderError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt::SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            max_tokens: MAX_REPLY_TOKENS,
            temperature: TEMPERATURE,
        };

        let resp = self
            .client
            .post(API_URL)
            .bearer_auth(self.api_key.0.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| map_transport_error(e, REQUEST_TIMEOUT))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status, body));
        }

        let reply: ChatReply = resp
            .json()
            .await
            .map_err(|e| ProviderError::MalformedReply(e.to_string()))?;

        reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .ok_or_else(|| ProviderError::MalformedReply("reply carried no content".into()))
    }
}

pub(crate) fn map_transport_error(e: reqwest::Error, timeout: Duration) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(timeout)
    } else {
        ProviderError::NetworkError(e.to_string())
    }
}

#[async_trait]
impl Enricher for OpenAiEnricher {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self), fields(model = %self.model))]
    async fn enrich(&self, term: &Term) -> Result<Option<EnrichedContent>, ProviderError> {
        let reply = self.complete(&prompt::build_prompt(term.as_str())).await?;
        tracing::debug!(term = %term, reply_len = reply.len(), "enrichment reply received");
        Ok(parse::parse_reply(term.as_str(), &reply))
    }
}
