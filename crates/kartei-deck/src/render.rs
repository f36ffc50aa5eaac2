use kartei_core::card::{Card, ClassificationKind};

/// Field content shared by the text export and the deck package. The tip
/// stays separate so the package can template it conditionally; the export
/// appends it to the back field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardFields {
    pub front: String,
    pub back: String,
    pub tip: String,
    pub is_word: bool,
}

/// Three-branch rendering by kind. Word fronts carry the sound tag, gender
/// and plural decorations inline; Expression and Sentence fronts put the
/// sound tag on its own line. Context sentences render in emphasis markup
/// on both sides. Every decoration is omitted when absent.
pub fn render_card(card: &Card) -> CardFields {
    let translation = card.translations.join(", ");
    let mut front_parts: Vec<String> = Vec::new();
    let mut back_parts: Vec<String> = vec![translation];

    match card.kind {
        ClassificationKind::Word => {
            let mut head = String::new();
            if let Some(audio) = &card.audio_file_name {
                head.push_str(&format!("[sound:{audio}] "));
            }
            if let Some(gender) = &card.gender {
                head.push_str(&format!("({gender}) "));
            }
            head.push_str(&card.source_text);
            if let Some(plural) = &card.plural {
                head.push_str(&format!(" (pl: {plural})"));
            }
            front_parts.push(head);

            if let Some(context) = &card.context {
                front_parts.push(format!("<i>{}</i>", context.source));
                back_parts.push(format!("<i>{}</i>", context.target));
            }
        }
        ClassificationKind::Expression => {
            if let Some(audio) = &card.audio_file_name {
                front_parts.push(format!("[sound:{audio}]"));
            }
            front_parts.push(card.source_text.clone());

            if let Some(context) = &card.context {
                front_parts.push(format!("<i>{}</i>", context.source));
                back_parts.push(format!("<i>{}</i>", context.target));
            }
        }
        ClassificationKind::Sentence => {
            if let Some(audio) = &card.audio_file_name {
                front_parts.push(format!("[sound:{audio}]"));
            }
            front_parts.push(card.source_text.clone());
        }
    }

    CardFields {
        front: front_parts.join("<br>"),
        back: back_parts.join("<br>"),
        tip: card.tip.clone().unwrap_or_default(),
        is_word: card.kind == ClassificationKind::Word,
    }
}
