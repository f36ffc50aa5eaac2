use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use kartei_audio::{AudioResolver, AudioStore, ForvoClient};
use kartei_core::card::{Card, Term};
use kartei_core::config::Config;
use kartei_core::provider::PronunciationSource;
use kartei_enrich::{OpenAiEnricher, OpenAiSpeech};
use kartei_telemetry::MetricsRecorder;

use crate::error::EngineError;
use crate::pipeline::{self, PipelineServices};
use crate::progress::{BatchObserver, Progress};

/// Artifacts of a finished batch.
#[derive(Debug)]
pub struct BatchOutput {
    pub cards: Vec<Card>,
    pub export_path: PathBuf,
    pub package_path: Option<PathBuf>,
}

/// Drives a batch of terms through the pipeline, strictly sequentially in
/// input order. Individual failures drop the term; only artifact I/O is a
/// batch-level error.
pub struct BatchRunner {
    config: Arc<Config>,
    services: PipelineServices,
    metrics: Option<Arc<MetricsRecorder>>,
}

impl BatchRunner {
    /// Wire up the production collaborators from configuration. A missing
    /// pronunciation key leaves the lookup slot empty, which the resolver
    /// treats as "skip straight to synthesis".
    pub fn from_config(config: Arc<Config>) -> Self {
        let enricher = Arc::new(OpenAiEnricher::new(config.openai_api_key.clone()));
        let synthesizer = Arc::new(OpenAiSpeech::new(config.openai_api_key.clone()));
        let lookup = config
            .forvo_api_key
            .clone()
            .map(|key| Arc::new(ForvoClient::new(key)) as Arc<dyn PronunciationSource>);
        let resolver = Arc::new(AudioResolver::new(
            AudioStore::new(&config.audio_dir),
            lookup,
            synthesizer,
            config.language.clone(),
        ));
        Self::with_services(
            config,
            PipelineServices {
                enricher,
                resolver,
            },
        )
    }

    pub fn with_services(config: Arc<Config>, services: PipelineServices) -> Self {
        Self {
            config,
            services,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRecorder>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn services(&self) -> &PipelineServices {
        &self.services
    }

    fn count(&self, name: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.increment(name, 1);
        }
    }

    /// Process the terms into cards. The audio directory is reset first so
    /// no stale audio from a prior run is packaged. The observer fires
    /// before each term; cancellation is honored between terms and never
    /// abandons an in-flight call.
    pub async fn run(
        &self,
        terms: &[Term],
        observer: &dyn BatchObserver,
        cancel: &CancellationToken,
    ) -> Vec<Card> {
        self.services.resolver.store().cleanup();

        let total = terms.len();
        tracing::info!(total, "starting batch");

        let mut cards = Vec::new();
        for (index, term) in terms.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::info!(processed = index, total, "batch cancelled, stopping");
                break;
            }

            observer.on_progress(Progress {
                index,
                total,
                term: term.as_str().to_string(),
            });

            self.count("terms_processed");
            match pipeline::process_term(&self.services, index, term).await {
                Some(card) => {
                    self.count("cards_created");
                    cards.push(card);
                }
                None => self.count("terms_dropped"),
            }

            // Fixed inter-term delay to stay clear of service rate limits.
            tokio::time::sleep(self.config.term_delay).await;
        }

        tracing::info!(cards = cards.len(), total, "batch finished");
        cards
    }

    /// Run the batch and write the artifacts: the text export always, the
    /// deck package on request.
    pub async fn run_to_outputs(
        &self,
        terms: &[Term],
        observer: &dyn BatchObserver,
        cancel: &CancellationToken,
        build_package: bool,
    ) -> Result<BatchOutput, EngineError> {
        let cards = self.run(terms, observer, cancel).await;

        kartei_deck::write_export(&cards, &self.config.export_path)?;
        let package_path = if build_package {
            kartei_deck::build_package(&cards, &self.config.audio_dir, &self.config.package_path)?;
            Some(self.config.package_path.clone())
        } else {
            None
        };

        self.count("batches_completed");
        Ok(BatchOutput {
            cards,
            export_path: self.config.export_path.clone(),
            package_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use kartei_audio::mock::MockLookup;
    use kartei_core::card::ClassificationKind;
    use kartei_core::config::ApiKey;
    use kartei_core::errors::ProviderError;
    use kartei_core::provider::SpeechSynthesizer;
    use kartei_enrich::mock::{MockEnricher, MockSynthesizer};
    use secrecy::SecretString;

    struct CollectingObserver {
        seen: Mutex<Vec<Progress>>,
    }

    impl CollectingObserver {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl BatchObserver for CollectingObserver {
        fn on_progress(&self, progress: Progress) {
            self.seen.lock().unwrap().push(progress);
        }
    }

    struct CancelAfterFirst {
        cancel: CancellationToken,
    }

    impl BatchObserver for CancelAfterFirst {
        fn on_progress(&self, _progress: Progress) {
            self.cancel.cancel();
        }
    }

    fn test_config() -> Arc<Config> {
        let dir = std::env::temp_dir().join(format!("kartei-runner-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        let mut config = Config::new(ApiKey(SecretString::from("test-key")), None);
        config.audio_dir = dir.join("audio");
        config.export_path = dir.join("output.txt");
        config.package_path = dir.join("anki-deck.apkg");
        config.term_delay = std::time::Duration::ZERO;
        Arc::new(config)
    }

    fn runner_with(config: Arc<Config>, enricher: MockEnricher) -> BatchRunner {
        let resolver = Arc::new(AudioResolver::new(
            AudioStore::new(&config.audio_dir),
            Some(Arc::new(MockLookup::new()) as Arc<dyn PronunciationSource>),
            Arc::new(MockSynthesizer::ok(vec![7])) as Arc<dyn SpeechSynthesizer>,
            "de",
        ));
        BatchRunner::with_services(
            config,
            PipelineServices {
                enricher: Arc::new(enricher),
                resolver,
            },
        )
    }

    fn terms(texts: &[&str]) -> Vec<Term> {
        texts.iter().map(|t| Term::new(*t)).collect()
    }

    #[tokio::test]
    async fn cards_preserve_order_and_skip_failures() {
        let enricher = MockEnricher::new(vec![
            Ok(Some(MockEnricher::word_content("table", Some("der"), None))),
            Ok(None),
            Ok(Some(MockEnricher::content(
                ClassificationKind::Sentence,
                "I am going to the cinema.",
            ))),
        ]);
        let runner = runner_with(test_config(), enricher);
        let observer = CollectingObserver::new();

        let cards = runner
            .run(
                &terms(&["Tisch", "Xyzzy", "Ich gehe ins Kino."]),
                &observer,
                &CancellationToken::new(),
            )
            .await;

        let ids: Vec<usize> = cards.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![0, 2]);
        assert_eq!(cards[0].source_text, "Tisch");

        let seen = observer.seen.lock().unwrap();
        let indexes: Vec<usize> = seen.iter().map(|p| p.index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
        assert!(seen.iter().all(|p| p.total == 3));
    }

    #[tokio::test]
    async fn enrichment_errors_drop_terms_without_aborting() {
        let enricher = MockEnricher::new(vec![
            Err(ProviderError::NetworkError("down".into())),
            Ok(Some(MockEnricher::word_content("chair", Some("der"), None))),
        ]);
        let runner = runner_with(test_config(), enricher);

        let cards = runner
            .run(
                &terms(&["Tisch", "Stuhl"]),
                &crate::progress::NullObserver,
                &CancellationToken::new(),
            )
            .await;
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].id, 1);
        assert_eq!(cards[0].source_text, "Stuhl");
    }

    #[tokio::test]
    async fn cancellation_stops_scheduling_new_terms() {
        let enricher = MockEnricher::new(vec![
            Ok(Some(MockEnricher::word_content("table", None, None))),
            Ok(Some(MockEnricher::word_content("chair", None, None))),
        ]);
        let runner = runner_with(test_config(), enricher);
        let cancel = CancellationToken::new();
        let observer = CancelAfterFirst {
            cancel: cancel.clone(),
        };

        let cards = runner.run(&terms(&["Tisch", "Stuhl"]), &observer, &cancel).await;

        // The in-flight term completes; the next is never scheduled.
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].id, 0);
    }

    #[tokio::test]
    async fn audio_directory_reset_between_batches() {
        let config = test_config();

        let first = runner_with(
            Arc::clone(&config),
            MockEnricher::new(vec![Ok(Some(MockEnricher::word_content(
                "table",
                None,
                None,
            )))]),
        );
        first
            .run(
                &terms(&["Tisch"]),
                &crate::progress::NullObserver,
                &CancellationToken::new(),
            )
            .await;
        assert!(config.audio_dir.join("tisch_pronunciation.mp3").exists());

        let second = runner_with(
            Arc::clone(&config),
            MockEnricher::new(vec![Ok(Some(MockEnricher::word_content(
                "chair",
                None,
                None,
            )))]),
        );
        second
            .run(
                &terms(&["Stuhl"]),
                &crate::progress::NullObserver,
                &CancellationToken::new(),
            )
            .await;

        assert!(config.audio_dir.join("stuhl_pronunciation.mp3").exists());
        assert!(!config.audio_dir.join("tisch_pronunciation.mp3").exists());
    }

    #[tokio::test]
    async fn run_to_outputs_writes_export_and_package() {
        let config = test_config();
        let enricher = MockEnricher::new(vec![Ok(Some(MockEnricher::word_content(
            "table",
            Some("der"),
            None,
        )))]);
        let runner = runner_with(Arc::clone(&config), enricher);

        let output = runner
            .run_to_outputs(
                &terms(&["Tisch"]),
                &crate::progress::NullObserver,
                &CancellationToken::new(),
                true,
            )
            .await
            .unwrap();

        assert_eq!(output.cards.len(), 1);
        let export = std::fs::read_to_string(&output.export_path).unwrap();
        assert_eq!(export.lines().count(), 1);
        assert!(export.starts_with("[sound:tisch_pronunciation.mp3] (der) Tisch;table"));
        assert!(output.package_path.as_ref().unwrap().exists());
    }

    #[tokio::test]
    async fn metrics_count_outcomes() {
        let metrics = Arc::new(MetricsRecorder::new());
        let enricher = MockEnricher::new(vec![
            Ok(Some(MockEnricher::word_content("table", None, None))),
            Ok(None),
        ]);
        let runner =
            runner_with(test_config(), enricher).with_metrics(Arc::clone(&metrics));

        runner
            .run(
                &terms(&["Tisch", "Xyzzy"]),
                &crate::progress::NullObserver,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(metrics.get("terms_processed"), 2);
        assert_eq!(metrics.get("cards_created"), 1);
        assert_eq!(metrics.get("terms_dropped"), 1);
    }
}
