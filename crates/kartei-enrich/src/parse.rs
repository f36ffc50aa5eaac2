//! Structured-reply parsing.
//!
//! The enrichment service answers with colon-delimited `Key: Value` lines.
//! That shape is fragile (casing, spacing, stray markdown), so every
//! normalization step lives here and nowhere else.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use kartei_core::card::{ClassificationKind, ContextPair, EnrichedContent};
use kartei_core::text::{is_sentinel, SENTINEL};

/// `**value**` or `[value]` wrapping left over from the model echoing the
/// requested format.
fn markup_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:\*\*(?P<b>.+)\*\*|\[(?P<s>.+)\])$").unwrap())
}

/// Lowercased, space→underscore key, with bullet/bold decoration removed.
fn normalize_key(key: &str) -> String {
    key.trim()
        .trim_start_matches(['-', '*', ' '])
        .trim_matches('*')
        .trim()
        .to_lowercase()
        .replace(' ', "_")
}

/// Trimmed value with wrapping markup and quotes stripped.
fn clean_value(value: &str) -> String {
    let mut value = value.trim();
    while let Some(caps) = markup_re().captures(value) {
        value = caps
            .name("b")
            .or_else(|| caps.name("s"))
            .map(|m| m.as_str().trim())
            .unwrap_or(value);
    }
    value.trim_matches('"').trim().to_string()
}

/// Collect `Key: Value` lines into a normalized map. Lines without a colon
/// are ignored; a repeated key keeps the last occurrence.
fn parse_fields(reply: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for line in reply.lines() {
        if let Some((key, value)) = line.split_once(':') {
            let key = normalize_key(key);
            if key.is_empty() {
                continue;
            }
            fields.insert(key, clean_value(value));
        }
    }
    fields
}

/// Parse a service reply into enriched content for `term`.
///
/// Missing keys default to the sentinel. A sentinel-bearing translation is
/// total failure for the term: `None`, never partial content. Sentinel
/// gender/plural/tip normalize to absent; the context pair is included only
/// when both halves are usable.
pub fn parse_reply(term: &str, reply: &str) -> Option<EnrichedContent> {
    let fields = parse_fields(reply);
    let field = |key: &str| fields.get(key).map(String::as_str).unwrap_or(SENTINEL);

    let translation = field("translation");
    if translation.contains(SENTINEL) {
        return None;
    }
    let translations: Vec<String> = translation
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    if translations.is_empty() {
        return None;
    }

    let kind = ClassificationKind::from_reply(field("type"))
        .unwrap_or_else(|| ClassificationKind::infer(term));

    let optional = |key: &str| {
        let value = field(key);
        if value.is_empty() || is_sentinel(value) {
            None
        } else {
            Some(value.to_string())
        }
    };

    let (gender, plural) = match kind {
        ClassificationKind::Word => (optional("gender"), optional("plural")),
        _ => (None, None),
    };

    let context = match kind {
        ClassificationKind::Word | ClassificationKind::Expression => {
            match (optional("german_context"), optional("english_context")) {
                (Some(source), Some(target)) => Some(ContextPair { source, target }),
                _ => None,
            }
        }
        ClassificationKind::Sentence => None,
    };

    Some(EnrichedContent {
        kind,
        translations,
        gender,
        plural,
        context,
        tip: optional("tip"),
    })
}
