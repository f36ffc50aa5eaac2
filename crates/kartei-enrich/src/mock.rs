//! Pre-programmed service doubles for deterministic tests without API calls.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use kartei_core::card::{ClassificationKind, EnrichedContent, Term};
use kartei_core::errors::ProviderError;
use kartei_core::provider::{Enricher, SpeechSynthesizer};

/// Enricher that replays a fixed sequence of results, one per call.
pub struct MockEnricher {
    responses: Mutex<VecDeque<Result<Option<EnrichedContent>, ProviderError>>>,
    calls: AtomicUsize,
}

impl MockEnricher {
    pub fn new(responses: Vec<Result<Option<EnrichedContent>, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Convenience: minimal Word content for a translation/gender pair.
    pub fn word_content(
        translation: &str,
        gender: Option<&str>,
        plural: Option<&str>,
    ) -> EnrichedContent {
        EnrichedContent {
            kind: ClassificationKind::Word,
            translations: vec![translation.to_string()],
            gender: gender.map(str::to_string),
            plural: plural.map(str::to_string),
            context: None,
            tip: None,
        }
    }

    /// Convenience: minimal content of an arbitrary kind.
    pub fn content(kind: ClassificationKind, translation: &str) -> EnrichedContent {
        EnrichedContent {
            kind,
            translations: vec![translation.to_string()],
            gender: None,
            plural: None,
            context: None,
            tip: None,
        }
    }
}

#[async_trait]
impl Enricher for MockEnricher {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn enrich(&self, _term: &Term) -> Result<Option<EnrichedContent>, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed);
        self.responses.lock().pop_front().unwrap_or_else(|| {
            Err(ProviderError::InvalidRequest(format!(
                "MockEnricher: no response configured for call {call}"
            )))
        })
    }
}

/// Synthesizer with one fixed outcome; records every text it was asked for.
pub struct MockSynthesizer {
    response: Result<Vec<u8>, ProviderError>,
    calls: Mutex<Vec<String>>,
}

impl MockSynthesizer {
    pub fn ok(bytes: Vec<u8>) -> Self {
        Self {
            response: Ok(bytes),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            response: Err(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    fn name(&self) -> &str {
        "mock-speech"
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError> {
        self.calls.lock().push(text.to_string());
        self.response.clone()
    }
}
