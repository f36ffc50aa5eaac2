use std::path::Path;

use kartei_core::card::Card;

use crate::render::{render_card, CardFields};
use crate::DeckError;

/// One export line: front and back joined by a literal semicolon, for
/// manual import with "semicolon" as the field separator. The tip has no
/// field of its own here, so it is appended to the back.
pub fn export_line(fields: &CardFields) -> String {
    let mut back = fields.back.clone();
    if !fields.tip.is_empty() {
        back.push_str(&format!("<br>💡 <i>{}</i>", fields.tip));
    }
    format!("{};{}", fields.front, back)
}

/// Write all cards to the plain-text export, one line per card, with a
/// trailing newline.
pub fn write_export(cards: &[Card], path: &Path) -> Result<(), DeckError> {
    let mut out = String::new();
    for card in cards {
        out.push_str(&export_line(&render_card(card)));
        out.push('\n');
    }
    std::fs::write(path, out)?;
    tracing::info!(count = cards.len(), path = %path.display(), "export written");
    Ok(())
}
