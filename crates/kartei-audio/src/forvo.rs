use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::instrument;

use kartei_core::config::ApiKey;
use kartei_core::errors::ProviderError;
use kartei_core::provider::PronunciationSource;

const BASE_URL: &str = "https://apifree.forvo.com";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Recorded-pronunciation lookup against the Forvo dictionary API. The
/// standard-pronunciation action returns candidate recordings; the first
/// candidate's MP3 is fetched.
pub struct ForvoClient {
    client: Client,
    api_key: ApiKey,
}

#[derive(Deserialize)]
struct ForvoReply {
    #[serde(default)]
    items: Vec<ForvoItem>,
}

#[derive(Deserialize)]
struct ForvoItem {
    #[serde(default)]
    pathmp3: String,
}

impl ForvoClient {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            client: Client::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("failed to build HTTP client"),
            api_key,
        }
    }

    fn request_url(&self, word: &str, language: &str) -> String {
        format!(
            "{BASE_URL}/key/{}/format/json/action/standard-pronunciation/word/{}/language/{}",
            self.api_key.0.expose_secret(),
            urlencoding::encode(word),
            language,
        )
    }

    async fn fetch(&self, url: &str) -> Result<reqwest::Response, ProviderError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_transport_error)?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status, body));
        }
        Ok(resp)
    }
}

fn map_transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(REQUEST_TIMEOUT)
    } else {
        ProviderError::NetworkError(e.to_string())
    }
}

#[async_trait]
impl PronunciationSource for ForvoClient {
    fn name(&self) -> &str {
        "forvo"
    }

    #[instrument(skip(self))]
    async fn lookup(
        &self,
        word: &str,
        language: &str,
    ) -> Result<Option<Vec<u8>>, ProviderError> {
        let reply: ForvoReply = self
            .fetch(&self.request_url(word, language))
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::MalformedReply(e.to_string()))?;

        let Some(mp3_url) = reply
            .items
            .iter()
            .map(|item| item.pathmp3.as_str())
            .find(|url| !url.is_empty())
        else {
            tracing::debug!(word, "no recorded pronunciation");
            return Ok(None);
        };

        let bytes = self
            .fetch(mp3_url)
            .await?
            .bytes()
            .await
            .map_err(map_transport_error)?;
        Ok(Some(bytes.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn client() -> ForvoClient {
        ForvoClient::new(ApiKey(SecretString::from("fv-key")))
    }

    #[test]
    fn request_url_encodes_query() {
        let url = client().request_url("der Tisch", "de");
        assert!(url.contains("/word/der%20Tisch/"));
        assert!(url.contains("/language/de"));
        assert!(url.contains("/format/json/"));
    }

    #[test]
    fn reply_with_items_deserializes() {
        let reply: ForvoReply = serde_json::from_str(
            r#"{"attributes":{"total":1},"items":[{"id":1,"pathmp3":"https://example.org/t.mp3"}]}"#,
        )
        .unwrap();
        assert_eq!(reply.items.len(), 1);
        assert_eq!(reply.items[0].pathmp3, "https://example.org/t.mp3");
    }

    #[test]
    fn reply_without_items_deserializes_empty() {
        let reply: ForvoReply = serde_json::from_str(r#"{"attributes":{"total":0}}"#).unwrap();
        assert!(reply.items.is_empty());
    }

    #[test]
    fn blank_mp3_paths_are_skipped() {
        let reply: ForvoReply =
            serde_json::from_str(r#"{"items":[{"pathmp3":""},{"pathmp3":"https://x/y.mp3"}]}"#)
                .unwrap();
        let first = reply
            .items
            .iter()
            .map(|i| i.pathmp3.as_str())
            .find(|u| !u.is_empty());
        assert_eq!(first, Some("https://x/y.mp3"));
    }
}
