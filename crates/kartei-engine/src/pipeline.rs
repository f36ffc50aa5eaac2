use std::sync::Arc;

use kartei_audio::AudioResolver;
use kartei_core::card::{Card, ClassificationKind, EnrichedContent, Term};
use kartei_core::provider::Enricher;
use kartei_core::text;

/// The two collaborators every term flows through.
pub struct PipelineServices {
    pub enricher: Arc<dyn Enricher>,
    pub resolver: Arc<AudioResolver>,
}

/// Per-term lifecycle, recorded in logs only. A dropped term is never a
/// batch error.
#[derive(Clone, Copy, Debug)]
enum TermPhase {
    Classifying,
    ResolvingAudio,
    Assembled,
    Dropped,
}

/// Run one term through classification, audio resolution, and assembly.
/// `None` means the term was dropped (service failure or sentinel
/// translation); audio failure still produces a card.
pub async fn process_term(
    services: &PipelineServices,
    index: usize,
    term: &Term,
) -> Option<Card> {
    tracing::debug!(index, term = %term, phase = ?TermPhase::Classifying, "term state");
    let content = match services.enricher.enrich(term).await {
        Ok(Some(content)) => content,
        Ok(None) => {
            tracing::warn!(
                index,
                term = %term,
                phase = ?TermPhase::Dropped,
                "enrichment marked term unusable, skipping"
            );
            return None;
        }
        Err(e) => {
            tracing::warn!(
                index,
                term = %term,
                phase = ?TermPhase::Dropped,
                error_kind = e.error_kind(),
                error = %e,
                "enrichment failed, skipping term"
            );
            return None;
        }
    };

    let display_text = display_text(term, &content);

    tracing::debug!(index, term = %term, kind = %content.kind, phase = ?TermPhase::ResolvingAudio, "term state");
    let audio = services
        .resolver
        .resolve(
            content.kind,
            &display_text,
            content.gender.as_deref(),
            term.as_str(),
        )
        .await;
    if !audio.succeeded() {
        tracing::warn!(index, term = %term, "no audio resolved, producing audio-less card");
    }

    tracing::debug!(index, term = %term, phase = ?TermPhase::Assembled, "term state");
    Some(Card::assemble(index, display_text, content, audio))
}

/// Display form of a term. Words are capitalized, and an input that
/// already leads with its own article ("der Schreibtisch") has the
/// redundant article removed so the gender decoration is not doubled.
fn display_text(term: &Term, content: &EnrichedContent) -> String {
    if content.kind != ClassificationKind::Word {
        return term.as_str().to_string();
    }

    let mut display = text::capitalize(term.as_str());
    if let Some(gender) = &content.gender {
        let article_prefix = format!("{} ", gender.to_lowercase());
        if display.to_lowercase().starts_with(&article_prefix) {
            display = text::capitalize(display[article_prefix.len()..].trim());
        }
    }
    display
}
