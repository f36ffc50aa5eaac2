mod export;
mod package;
mod render;

pub use export::{export_line, write_export};
pub use package::{build_package, DECK_ID, MODEL_ID};
pub use render::{render_card, CardFields};

/// Errors from writing the two batch artifacts. These are the batch's
/// terminal errors; partial files are not rolled back.
#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("package error: {0}")]
    Package(String),
}
