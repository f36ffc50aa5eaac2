use async_trait::async_trait;

use crate::card::{EnrichedContent, Term};
use crate::errors::ProviderError;

/// Text-generation boundary: classifies one term and produces translation,
/// gender/plural, context pair, and tip in a single call.
#[async_trait]
pub trait Enricher: Send + Sync {
    fn name(&self) -> &str;
    fn model(&self) -> &str;

    /// `Ok(None)` means the service marked the term unusable (sentinel
    /// translation); the term is dropped, never partially filled.
    async fn enrich(&self, term: &Term) -> Result<Option<EnrichedContent>, ProviderError>;
}

/// Speech-synthesis boundary: returns encoded audio bytes for a phrase.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn name(&self) -> &str;

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError>;
}

/// Recorded-pronunciation boundary: dictionary lookup of a native
/// recording by (word, language code).
#[async_trait]
pub trait PronunciationSource: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(None)` when the service has no recording for the query.
    async fn lookup(&self, word: &str, language: &str)
        -> Result<Option<Vec<u8>>, ProviderError>;
}
