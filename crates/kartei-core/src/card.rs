use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::text;

/// One unit of input text to be turned into a card. Trimmed at
/// construction; the raw line is never mutated afterwards.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Term(String);

impl Term {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Classification of a term, driving field requirements and audio strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationKind {
    Word,
    Expression,
    Sentence,
}

impl ClassificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Expression => "expression",
            Self::Sentence => "sentence",
        }
    }

    /// Parse the kind out of a service reply value.
    pub fn from_reply(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "word" => Some(Self::Word),
            "expression" => Some(Self::Expression),
            "sentence" => Some(Self::Sentence),
            _ => None,
        }
    }

    /// Heuristic fallback when the service omits the type: terminal
    /// punctuation marks a sentence, a single token is a word, anything
    /// else is an expression.
    pub fn infer(text: &str) -> Self {
        let text = text.trim();
        if text.ends_with(['.', '!', '?']) {
            return Self::Sentence;
        }
        if text.split_whitespace().count() <= 1 {
            Self::Word
        } else {
            Self::Expression
        }
    }
}

impl std::fmt::Display for ClassificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bilingual example sentence pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextPair {
    pub source: String,
    pub target: String,
}

/// Parsed, normalized output of classification + enrichment for one term.
/// `gender` and `plural` are only populated for Word kind; `context` only
/// when the service supplied a non-placeholder pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnrichedContent {
    pub kind: ClassificationKind,
    pub translations: Vec<String>,
    pub gender: Option<String>,
    pub plural: Option<String>,
    pub context: Option<ContextPair>,
    pub tip: Option<String>,
}

/// Outcome of audio resolution for one term. `source_text_used` is the
/// exact phrase that was successfully pronounced; it is the single source
/// of truth for the stored filename.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AudioResult {
    pub source_text_used: Option<String>,
    pub path: Option<PathBuf>,
}

impl AudioResult {
    pub fn stored(source_text_used: impl Into<String>, path: PathBuf) -> Self {
        Self {
            source_text_used: Some(source_text_used.into()),
            path: Some(path),
        }
    }

    pub fn failed() -> Self {
        Self::default()
    }

    pub fn succeeded(&self) -> bool {
        self.source_text_used.is_some()
    }
}

/// The finalized, renderable flashcard record. Immutable once assembled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: usize,
    pub source_text: String,
    pub translations: Vec<String>,
    pub context: Option<ContextPair>,
    pub gender: Option<String>,
    pub plural: Option<String>,
    pub tip: Option<String>,
    pub audio_file_name: Option<String>,
    pub kind: ClassificationKind,
}

impl Card {
    /// Pure assembly: no network or disk access. The audio filename is
    /// derived from whichever query string the resolver pronounced, so the
    /// card always references the file the resolver wrote.
    pub fn assemble(
        id: usize,
        source_text: impl Into<String>,
        content: EnrichedContent,
        audio: AudioResult,
    ) -> Self {
        let audio_file_name = audio
            .source_text_used
            .as_deref()
            .map(text::audio_file_name);
        Self {
            id,
            source_text: source_text.into(),
            translations: content.translations,
            context: content.context,
            gender: content.gender,
            plural: content.plural,
            tip: content.tip,
            audio_file_name,
            kind: content.kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_content() -> EnrichedContent {
        EnrichedContent {
            kind: ClassificationKind::Word,
            translations: vec!["table".into()],
            gender: Some("der".into()),
            plural: Some("Tische".into()),
            context: None,
            tip: None,
        }
    }

    #[test]
    fn term_trims_input() {
        let term = Term::new("  Tisch \n");
        assert_eq!(term.as_str(), "Tisch");
    }

    #[test]
    fn kind_from_reply_case_insensitive() {
        assert_eq!(
            ClassificationKind::from_reply(" Word "),
            Some(ClassificationKind::Word)
        );
        assert_eq!(
            ClassificationKind::from_reply("SENTENCE"),
            Some(ClassificationKind::Sentence)
        );
        assert_eq!(ClassificationKind::from_reply("noun"), None);
    }

    #[test]
    fn kind_inference_heuristic() {
        assert_eq!(ClassificationKind::infer("Tisch"), ClassificationKind::Word);
        assert_eq!(
            ClassificationKind::infer("sich freuen auf"),
            ClassificationKind::Expression
        );
        assert_eq!(
            ClassificationKind::infer("Ich gehe ins Kino."),
            ClassificationKind::Sentence
        );
        assert_eq!(
            ClassificationKind::infer("Wie geht's?"),
            ClassificationKind::Sentence
        );
    }

    #[test]
    fn kind_serde_lowercase() {
        let json = serde_json::to_string(&ClassificationKind::Expression).unwrap();
        assert_eq!(json, "\"expression\"");
    }

    #[test]
    fn assemble_derives_audio_file_name() {
        let audio = AudioResult::stored("Tisch", PathBuf::from("audio/tisch_pronunciation.mp3"));
        let card = Card::assemble(0, "Tisch", word_content(), audio);
        assert_eq!(
            card.audio_file_name.as_deref(),
            Some("tisch_pronunciation.mp3")
        );
    }

    #[test]
    fn assemble_without_audio() {
        let card = Card::assemble(3, "Tisch", word_content(), AudioResult::failed());
        assert!(card.audio_file_name.is_none());
        assert_eq!(card.id, 3);
    }

    #[test]
    fn assemble_keeps_gendered_query_in_file_name() {
        let audio = AudioResult::stored(
            "der Tisch",
            PathBuf::from("audio/der_tisch_pronunciation.mp3"),
        );
        let card = Card::assemble(0, "Tisch", word_content(), audio);
        assert_eq!(card.source_text, "Tisch");
        assert_eq!(
            card.audio_file_name.as_deref(),
            Some("der_tisch_pronunciation.mp3")
        );
    }

    #[test]
    fn card_serde_roundtrip() {
        let card = Card::assemble(1, "Tisch", word_content(), AudioResult::failed());
        let json = serde_json::to_string(&card).unwrap();
        let parsed: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(card, parsed);
    }
}
