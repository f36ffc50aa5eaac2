use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::errors::ConfigError;

/// Required: key for the enrichment and speech-synthesis service.
pub const ENRICHMENT_KEY_VAR: &str = "OPENAI_API_KEY";
/// Optional: key for the pronunciation-lookup service. When absent, the
/// lookup steps are skipped and audio falls through to synthesis.
pub const PRONUNCIATION_KEY_VAR: &str = "FORVO_API_KEY";

/// Wraps an API key with secrecy protection (zeroized on drop, redacted in Debug).
#[derive(Clone)]
pub struct ApiKey(pub SecretString);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

/// Process-wide configuration, constructed once at startup and passed by
/// reference into the runner and resolver. No ambient global state.
#[derive(Clone, Debug)]
pub struct Config {
    pub openai_api_key: ApiKey,
    pub forvo_api_key: Option<ApiKey>,
    pub audio_dir: PathBuf,
    pub export_path: PathBuf,
    pub package_path: PathBuf,
    pub language: String,
    pub term_delay: Duration,
}

impl Config {
    pub fn new(openai_api_key: ApiKey, forvo_api_key: Option<ApiKey>) -> Self {
        Self {
            openai_api_key,
            forvo_api_key,
            audio_dir: PathBuf::from("audio"),
            export_path: PathBuf::from("output.txt"),
            package_path: PathBuf::from("anki-deck.apkg"),
            language: "de".to_string(),
            term_delay: Duration::from_secs(1),
        }
    }

    /// Read both secrets from the process environment. The enrichment key
    /// is required; the pronunciation key degrades gracefully.
    pub fn from_env() -> Result<Self, ConfigError> {
        let openai = read_var(ENRICHMENT_KEY_VAR)
            .ok_or(ConfigError::MissingSecret(ENRICHMENT_KEY_VAR))?;
        let forvo = read_var(PRONUNCIATION_KEY_VAR);
        Ok(Self::new(
            ApiKey(SecretString::from(openai)),
            forvo.map(|k| ApiKey(SecretString::from(k))),
        ))
    }

    pub fn has_pronunciation_key(&self) -> bool {
        self.forvo_api_key.is_some()
    }
}

fn read_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
