/// Placeholder value the enrichment service uses for "field not available".
pub const SENTINEL: &str = "N/A";

/// True when a parsed field value is the sentinel (after trimming).
pub fn is_sentinel(value: &str) -> bool {
    value.trim() == SENTINEL
}

/// First letter uppercased, remainder lowercased. German nouns are
/// displayed this way regardless of how the input was typed.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    }
}

/// Spaces become underscores so the stem is safe as a filename.
pub fn sanitize_file_stem(text: &str) -> String {
    text.replace(' ', "_")
}

/// Deterministic audio filename for the exact phrase that was pronounced.
/// Pure function of its input: regenerating the same term overwrites the
/// same file.
pub fn audio_file_name(source_text_used: &str) -> String {
    format!(
        "{}_pronunciation.mp3",
        sanitize_file_stem(&source_text_used.to_lowercase())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_detection() {
        assert!(is_sentinel("N/A"));
        assert!(is_sentinel("  N/A  "));
        assert!(!is_sentinel("n/a hint"));
        assert!(!is_sentinel("table"));
    }

    #[test]
    fn capitalize_basic() {
        assert_eq!(capitalize("tisch"), "Tisch");
        assert_eq!(capitalize("TISCH"), "Tisch");
        assert_eq!(capitalize("t"), "T");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn capitalize_umlaut() {
        assert_eq!(capitalize("übung"), "Übung");
        assert_eq!(capitalize("ärger"), "Ärger");
    }

    #[test]
    fn file_stem_replaces_spaces() {
        assert_eq!(sanitize_file_stem("der Tisch"), "der_Tisch");
        assert_eq!(sanitize_file_stem("Tisch"), "Tisch");
    }

    #[test]
    fn audio_file_name_is_lowercased() {
        assert_eq!(audio_file_name("Tisch"), "tisch_pronunciation.mp3");
        assert_eq!(audio_file_name("der Tisch"), "der_tisch_pronunciation.mp3");
    }

    #[test]
    fn audio_file_name_full_sentence() {
        assert_eq!(
            audio_file_name("Ich gehe ins Kino."),
            "ich_gehe_ins_kino._pronunciation.mp3"
        );
    }

    #[test]
    fn audio_file_name_idempotent() {
        let a = audio_file_name("der Schreibtisch");
        let b = audio_file_name("der Schreibtisch");
        assert_eq!(a, b);
    }
}
