use std::sync::Arc;

use kartei_core::card::{AudioResult, ClassificationKind};
use kartei_core::provider::{PronunciationSource, SpeechSynthesizer};
use kartei_core::text;

use crate::store::AudioStore;

/// Obtains pronunciation audio for a classified term through an ordered
/// fallback chain, stopping at the first success:
///
/// 1. Word with known gender: recorded lookup of "`gender` `word`".
/// 2. Word: recorded lookup of the bare word.
/// 3. Synthesis — for Word the post-fallback query text, for
///    Expression/Sentence the complete original line (steps 1–2 skipped).
///
/// A step failure falls through; exhaustion yields a failed result and the
/// term still gets an audio-less card. `lookup` is `None` when the
/// pronunciation key is not configured, which skips steps 1–2 entirely.
pub struct AudioResolver {
    store: AudioStore,
    lookup: Option<Arc<dyn PronunciationSource>>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    language: String,
}

impl AudioResolver {
    pub fn new(
        store: AudioStore,
        lookup: Option<Arc<dyn PronunciationSource>>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            store,
            lookup,
            synthesizer,
            language: language.into(),
        }
    }

    pub fn store(&self) -> &AudioStore {
        &self.store
    }

    pub async fn resolve(
        &self,
        kind: ClassificationKind,
        display_text: &str,
        gender: Option<&str>,
        raw_line: &str,
    ) -> AudioResult {
        match kind {
            ClassificationKind::Word => self.resolve_word(display_text, gender).await,
            ClassificationKind::Expression | ClassificationKind::Sentence => {
                self.synthesize(raw_line.trim()).await
            }
        }
    }

    async fn resolve_word(&self, word: &str, gender: Option<&str>) -> AudioResult {
        if let Some(gender) = gender {
            let query = format!("{gender} {word}");
            if let Some(result) = self.try_lookup(&query).await {
                return result;
            }
            tracing::debug!(query, "gendered lookup failed, trying bare word");
        }
        if let Some(result) = self.try_lookup(word).await {
            return result;
        }
        self.synthesize(word).await
    }

    async fn try_lookup(&self, query: &str) -> Option<AudioResult> {
        let source = self.lookup.as_ref()?;
        match source.lookup(query, &self.language).await {
            Ok(Some(bytes)) => match self.persist(query, &bytes) {
                Ok(result) => Some(result),
                Err(e) => {
                    tracing::warn!(query, error = %e, "failed to store looked-up audio");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(
                    query,
                    source = source.name(),
                    error_kind = e.error_kind(),
                    "pronunciation lookup failed"
                );
                None
            }
        }
    }

    async fn synthesize(&self, text: &str) -> AudioResult {
        match self.synthesizer.synthesize(text).await {
            Ok(bytes) => match self.persist(text, &bytes) {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(text, error = %e, "failed to store synthesized audio");
                    AudioResult::failed()
                }
            },
            Err(e) => {
                tracing::warn!(
                    text,
                    synthesizer = self.synthesizer.name(),
                    error_kind = e.error_kind(),
                    "speech synthesis failed"
                );
                AudioResult::failed()
            }
        }
    }

    fn persist(&self, source_text_used: &str, bytes: &[u8]) -> std::io::Result<AudioResult> {
        let file_name = text::audio_file_name(source_text_used);
        let path = self.store.write(&file_name, bytes)?;
        Ok(AudioResult::stored(source_text_used, path))
    }
}
