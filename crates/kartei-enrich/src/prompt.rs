/// System role for every enrichment request.
pub const SYSTEM_PROMPT: &str = "You are a German language expert. Provide concise, \
accurate information and answer in exactly the requested line format.";

/// One structured request covering classification, translation, gender,
/// plural, context pair, and tip. The reply shape is what `parse` expects.
pub fn build_prompt(term: &str) -> String {
    format!(
        "Analyze the German input: \"{term}\"\n\
         \n\
         Classify it as a single word, an expression, or a full sentence, then\n\
         answer using exactly these lines:\n\
         \n\
         Type: word | expression | sentence\n\
         Translation: the English translation (comma-separated if several)\n\
         Gender: der, die or das (words only)\n\
         Plural: the plural form (words only)\n\
         German Context: a simple German example sentence (words and expressions only)\n\
         English Context: the English translation of that example\n\
         Tip: a short memory aid or usage note\n\
         \n\
         Write N/A for any field that does not apply."
    )
}
