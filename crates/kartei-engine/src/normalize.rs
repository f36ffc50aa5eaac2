use std::io;
use std::path::Path;

use kartei_core::card::Term;

/// Trim raw lines and drop the empty ones, preserving order.
pub fn normalize_lines(input: &str) -> Vec<Term> {
    input
        .lines()
        .map(Term::new)
        .filter(|term| !term.is_empty())
        .collect()
}

/// Normalize an already-split word list the same way file lines are.
pub fn normalize_terms<S: AsRef<str>>(words: &[S]) -> Vec<Term> {
    words
        .iter()
        .map(|w| Term::new(w.as_ref()))
        .filter(|term| !term.is_empty())
        .collect()
}

/// Read the batch input file into candidate terms.
pub fn read_input_file(path: &Path) -> io::Result<Vec<Term>> {
    let content = std::fs::read_to_string(path)?;
    Ok(normalize_lines(&content))
}
