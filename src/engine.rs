//! The chat-with-dataframe collaborator seam.
//!
//! The renderer never talks to an LLM itself; it consumes answers produced by
//! an implementation of [`ChatEngine`].  The crate ships a scripted
//! implementation for demos and tests, plus the helpers that give generated
//! chart files stable unique names.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::debug;
use uuid::Uuid;

use crate::error::EngineError;
use crate::model::Answer;

/// An engine that answers natural-language questions about a dataset.
///
/// Implementations wrap an external LLM-backed dataframe library; the answer
/// kind (text, chart image, table) is chosen by the implementation, never
/// inferred from the value's shape.
pub trait ChatEngine {
    /// Asks a question and returns the answer.
    fn ask(&mut self, question: &str) -> Result<Answer, EngineError>;
}

/// Replays a fixed sequence of answers, one per question.
///
/// Used by the demo CLI and by tests that need a session without network
/// access.
#[derive(Clone, Debug, Default)]
pub struct ScriptedEngine {
    answers: Vec<Answer>,
    next: usize,
}

impl ScriptedEngine {
    /// Creates an engine that replays `answers` in order.
    pub fn new(answers: impl Into<Vec<Answer>>) -> Self {
        Self {
            answers: answers.into(),
            next: 0,
        }
    }

    /// Returns how many answers have been consumed.
    pub fn asked(&self) -> usize {
        self.next
    }
}

impl ChatEngine for ScriptedEngine {
    fn ask(&mut self, _question: &str) -> Result<Answer, EngineError> {
        let index = self.next;
        let answer = self
            .answers
            .get(index)
            .cloned()
            .ok_or(EngineError::Exhausted { index })?;
        self.next += 1;
        Ok(answer)
    }
}

/// Builds a unique chart file name from a timestamp and a short UUID.
pub fn unique_chart_name(prefix: &str, extension: &str) -> String {
    let timestamp = Local::now().format("%Y%m%d-%H%M%S");
    let unique = Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}{}", prefix, timestamp, &unique[..8], extension)
}

/// Moves an engine's temporary chart file to a unique name under `dest_dir`
/// and returns the new path.
///
/// Chart-producing engines often overwrite a single temp file per question;
/// relocating it keeps every chart of the session addressable from its
/// entry.
pub fn relocate_chart(
    temp_chart: impl AsRef<Path>,
    dest_dir: impl AsRef<Path>,
) -> Result<PathBuf, EngineError> {
    let temp_chart = temp_chart.as_ref();
    let extension = temp_chart
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_else(|| ".png".to_owned());

    fs::create_dir_all(dest_dir.as_ref())?;
    let destination = dest_dir
        .as_ref()
        .join(unique_chart_name("chart", &extension));
    fs::rename(temp_chart, &destination)?;
    debug!(
        "relocated chart {} -> {}",
        temp_chart.display(),
        destination.display()
    );
    Ok(destination)
}
