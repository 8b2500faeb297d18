//! Error types surfaced by the report renderer.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a report render.
///
/// Layout overflow is deliberately absent: a block whose content does not fit
/// at the normal font size is retried once at a reduced size and otherwise
/// emitted as-is. That outcome is reported through
/// [`FontFit`](crate::layout::FontFit), not as an error.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The configured font family could not be resolved or loaded.
    ///
    /// Fatal by design: the reports must support accented and other
    /// non-ASCII text, so rendering with a substitute glyph set is not
    /// acceptable.
    #[error("font assets unavailable: {0}")]
    FontAssets(#[source] genpdf::error::Error),

    /// The configured logo image does not exist.
    #[error("logo image not found at {path}")]
    MissingLogo { path: PathBuf },

    /// The logo or a chart image referenced by a session entry could not be
    /// decoded.
    #[error("failed to load image {path}")]
    ImageAsset {
        path: PathBuf,
        #[source]
        source: genpdf::error::Error,
    },

    /// The export directory could not be created or the output file could
    /// not be written.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The underlying PDF engine rejected the document.
    #[error(transparent)]
    Pdf(#[from] genpdf::error::Error),
}

/// Errors produced by a [`ChatEngine`](crate::engine::ChatEngine)
/// implementation. Never raised by the renderer itself.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The backing service rejected or failed the question.
    #[error("chat engine failed: {0}")]
    Backend(String),

    /// The scripted engine ran out of prepared answers.
    #[error("no answer scripted for question {index}")]
    Exhausted { index: usize },

    /// Relocating a generated chart file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
