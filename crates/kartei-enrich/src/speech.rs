use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use kartei_core::config::ApiKey;
use kartei_core::errors::ProviderError;
use kartei_core::provider::SpeechSynthesizer;

use crate::provider::map_transport_error;

const API_URL: &str = "https://api.openai.com/v1/chat/completions";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const SPEECH_MODEL: &str = "gpt-4o-audio-preview";
const DEFAULT_VOICE: &str = "alloy";

/// Speech synthesis via the audio-capable chat endpoint. The reply carries
/// the MP3 payload base64-encoded; callers get decoded bytes.
pub struct OpenAiSpeech {
    client: Client,
    api_key: ApiKey,
    voice: String,
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    modalities: [&'a str; 2],
    audio: AudioOptions<'a>,
    messages: Vec<SpeechMessage>,
}

#[derive(Serialize)]
struct AudioOptions<'a> {
    voice: &'a str,
    format: &'a str,
}

#[derive(Serialize)]
struct SpeechMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct SpeechReply {
    choices: Vec<SpeechChoice>,
}

#[derive(Deserialize)]
struct SpeechChoice {
    message: SpeechChoiceMessage,
}

#[derive(Deserialize)]
struct SpeechChoiceMessage {
    audio: Option<AudioPayload>,
}

#[derive(Deserialize)]
struct AudioPayload {
    data: String,
}

impl OpenAiSpeech {
    pub fn new(api_key: ApiKey) -> Self {
        Self::with_voice(api_key, DEFAULT_VOICE)
    }

    pub fn with_voice(api_key: ApiKey, voice: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("failed to build HTTP client"),
            api_key,
            voice: voice.into(),
        }
    }

    fn instruction(text: &str) -> String {
        format!(
            "Speak the following German text exactly as written, clearly and at a \
             natural pace: \"{text}\""
        )
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeech {
    fn name(&self) -> &str {
        "openai-speech"
    }

    #[instrument(skip(self, text), fields(voice = %self.voice, chars = text.len()))]
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError> {
        let body = SpeechRequest {
            model: SPEECH_MODEL,
            modalities: ["text", "audio"],
            audio: AudioOptions {
                voice: &self.voice,
                format: "mp3",
            },
            messages: vec![SpeechMessage {
                role: "user",
                content: Self::instruction(text),
            }],
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

        let reply: SpeechReply = resp
            .json()
            .await
            .map_err(|e| ProviderError::MalformedReply(e.to_string()))?;

        let encoded = reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.audio)
            .map(|a| a.data)
            .ok_or_else(|| ProviderError::MalformedReply("reply carried no audio".into()))?;

        BASE64
            .decode(encoded.as_bytes())
            .map_err(|e| ProviderError::MalformedReply(format!("audio payload: {e}")))
    }
}
