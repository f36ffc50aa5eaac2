//! Pronunciation-source double for resolver and engine tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;

use kartei_core::errors::ProviderError;
use kartei_core::provider::PronunciationSource;

/// Lookup double: a fixed recording table plus a set of queries that fail
/// with a network error. Records every query it receives.
#[derive(Default)]
pub struct MockLookup {
    recordings: HashMap<String, Vec<u8>>,
    errors: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl MockLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recording(mut self, word: &str, bytes: Vec<u8>) -> Self {
        self.recordings.insert(word.to_string(), bytes);
        self
    }

    pub fn with_error(mut self, word: &str) -> Self {
        self.errors.insert(word.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl PronunciationSource for MockLookup {
    fn name(&self) -> &str {
        "mock-lookup"
    }

    async fn lookup(
        &self,
        word: &str,
        _language: &str,
    ) -> Result<Option<Vec<u8>>, ProviderError> {
        self.calls.lock().push(word.to_string());
        if self.errors.contains(word) {
            return Err(ProviderError::NetworkError("mock lookup failure".into()));
        }
        Ok(self.recordings.get(word).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recording_hit_and_miss() {
        let mock = MockLookup::new().with_recording("Tisch", vec![1]);
        assert_eq!(mock.lookup("Tisch", "de").await.unwrap(), Some(vec![1]));
        assert_eq!(mock.lookup("Stuhl", "de").await.unwrap(), None);
        assert_eq!(mock.calls(), vec!["Tisch".to_string(), "Stuhl".to_string()]);
    }

    #[tokio::test]
    async fn configured_error_is_returned() {
        let mock = MockLookup::new().with_error("der Tisch");
        assert!(mock.lookup("der Tisch", "de").await.is_err());
    }
}
