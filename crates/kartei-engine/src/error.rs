use kartei_deck::DeckError;

/// Terminal batch errors. Per-term failures never surface here; they are
/// logged and the term is dropped.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("deck error: {0}")]
    Deck(#[from] DeckError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
