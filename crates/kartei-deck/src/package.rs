use std::path::Path;

use genanki_rs::{Deck, Field, Model, Note, Package, Template};

use kartei_core::card::Card;

use crate::render::{render_card, CardFields};
use crate::DeckError;

// Fixed ids keep the note type stable across regenerated decks, so
// re-importing updates cards instead of duplicating them.
pub const MODEL_ID: i64 = 1634523456;
pub const DECK_ID: i64 = 2654323456;

const DECK_NAME: &str = "German Vocabulary";
const DECK_DESCRIPTION: &str = "Generated German vocabulary flashcards";
const MODEL_NAME: &str = "German Vocabulary Note";

const CARD_CSS: &str = ".card {
 font-family: arial;
 font-size: 20px;
 text-align: center;
 color: black;
 background-color: white;
}";

/// Note fields in model order: Question, Answer, Tip, IsWord. The reverse
/// template renders only when IsWord is non-empty.
pub(crate) fn note_fields(fields: &CardFields) -> [String; 4] {
    [
        fields.front.clone(),
        fields.back.clone(),
        fields.tip.clone(),
        if fields.is_word { "1".into() } else { String::new() },
    ]
}

fn build_model() -> Model {
    Model::new(
        MODEL_ID,
        MODEL_NAME,
        vec![
            Field::new("Question"),
            Field::new("Answer"),
            Field::new("Tip"),
            Field::new("IsWord"),
        ],
        vec![
            Template::new("German -> English")
                .qfmt("{{Question}}")
                .afmt(
                    "{{FrontSide}}<hr id=\"answer\">{{Answer}}<br><br>\
                     {{#Tip}}💡 <i>{{Tip}}</i>{{/Tip}}",
                ),
            Template::new("English -> German (Reversed)")
                .qfmt(
                    "{{#IsWord}}{{Answer}}<br><br><small style=\"color:gray\">\
                     (What is this in German?)</small>{{/IsWord}}",
                )
                .afmt(
                    "{{FrontSide}}<hr id=\"answer\">{{Question}}<br><br>\
                     {{#Tip}}💡 <i>{{Tip}}</i>{{/Tip}}",
                ),
        ],
    )
    .css(CARD_CSS)
}

/// Bundle the cards and their referenced audio files into one importable
/// archive. Audio references whose file is missing on disk are packaged
/// without media rather than failing the batch.
pub fn build_package(cards: &[Card], audio_dir: &Path, out_path: &Path) -> Result<(), DeckError> {
    let model = build_model();
    let mut deck = Deck::new(DECK_ID, DECK_NAME, DECK_DESCRIPTION);
    let mut media_files: Vec<String> = Vec::new();

    for card in cards {
        let fields = note_fields(&render_card(card));
        let note = Note::new(model.clone(), fields.iter().map(String::as_str).collect())
            .map_err(|e| DeckError::Package(e.to_string()))?;
        deck.add_note(note);

        if let Some(file_name) = &card.audio_file_name {
            let path = audio_dir.join(file_name);
            if path.exists() {
                media_files.push(path.to_string_lossy().into_owned());
            } else {
                tracing::warn!(file = file_name, "referenced audio file missing from disk");
            }
        }
    }

    let out = out_path
        .to_str()
        .ok_or_else(|| DeckError::Package("package path is not valid UTF-8".into()))?;

    let mut package = Package::new(
        vec![deck],
        media_files.iter().map(String::as_str).collect(),
    )
    .map_err(|e| DeckError::Package(e.to_string()))?;
    package
        .write_to_file(out)
        .map_err(|e| DeckError::Package(e.to_string()))?;

    tracing::info!(
        cards = cards.len(),
        media = media_files.len(),
        path = %out_path.display(),
        "deck package written"
    );
    Ok(())
}
