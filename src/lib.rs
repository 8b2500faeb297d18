//! PDF report generation for chat-with-your-dataset analysis sessions.
//!
//! The crate takes the question/answer entries recorded by an external
//! LLM-backed dataframe engine and renders them into a paginated PDF report:
//! a first-page header (logo, date, dataset banner), a dataset overview
//! block, one section per entry (text, chart image or table answer) and a
//! per-page footer.  See [`renderer::ReportRenderer`] for the entry point.

pub mod document;
pub mod elements;
pub mod engine;
pub mod error;
pub mod fonts;
pub mod layout;
pub mod model;
pub mod renderer;
pub mod sidecar;

pub use error::{EngineError, ReportError};
pub use model::{
    Answer, Branding, DatasetSummary, Orientation, PageFormat, ReportConfig, SessionEntry,
    TableData, Unit,
};
pub use renderer::{EntryLayout, RenderedReport, ReportRenderer};
