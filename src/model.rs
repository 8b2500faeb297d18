//! Data structures describing the input of a report render.
//!
//! The types in this module form a serialization-friendly model of the
//! question/answer session assembled by the surrounding application.  They
//! intentionally avoid referencing the rendering crate directly so the values
//! can be produced by frontends, read from configuration files, or exchanged
//! over the network without pulling in heavy dependencies.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Page orientation of the generated report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Upright pages (the default for analysis reports).
    #[default]
    Portrait,
    /// Rotated pages, width and height swapped.
    Landscape,
}

/// Supported paper formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageFormat {
    /// ISO A4, 210 x 297 mm.
    #[default]
    A4,
    /// US Letter, 215.9 x 279.4 mm.
    Letter,
    /// US Legal, 215.9 x 355.6 mm.
    Legal,
}

impl PageFormat {
    /// Returns the portrait page size in millimetres as `(width, height)`.
    pub fn size_mm(self) -> (f64, f64) {
        match self {
            PageFormat::A4 => (210.0, 297.0),
            PageFormat::Letter => (215.9, 279.4),
            PageFormat::Legal => (215.9, 355.6),
        }
    }
}

/// Measurement unit for the scalar lengths stored in [`ReportConfig`].
///
/// The PDF engine works in millimetres; configured values in other units are
/// converted on the way in via [`Unit::to_mm`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Millimetres (native unit, no conversion).
    #[default]
    #[serde(rename = "mm")]
    Millimeters,
    /// Typographic points, 1/72 inch.
    #[serde(rename = "pt")]
    Points,
    /// Inches.
    #[serde(rename = "in")]
    Inches,
}

impl Unit {
    /// Converts `value` from this unit to millimetres.
    pub fn to_mm(self, value: f64) -> f64 {
        match self {
            Unit::Millimeters => value,
            Unit::Points => value * 25.4 / 72.0,
            Unit::Inches => value * 25.4,
        }
    }
}

/// Branding strings rendered into the per-page footer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branding {
    /// Centered "powered by" label on the first footer line.
    pub powered_by: String,
    /// Centered copyright notice on the second footer line.
    pub copyright: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            powered_by: "Powered by Kai Capitalisation".to_owned(),
            copyright: "\u{a9} 2024-2025 All rights reserved.".to_owned(),
        }
    }
}

/// Configuration for a single report render.
///
/// The export directory does not have to exist up front; it is created right
/// before the output file is written.  The logo and font assets, in contrast,
/// are hard requirements and missing ones abort the render.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Page orientation.
    pub orientation: Orientation,
    /// Unit in which the scalar lengths of this configuration are expressed.
    pub unit: Unit,
    /// Paper format.
    pub format: PageFormat,
    /// Directory receiving the generated PDF files.
    pub export_dir: PathBuf,
    /// Path to the logo image placed at the top of the first page.
    pub logo_path: PathBuf,
    /// Optional directory containing the report font family.  When absent
    /// the standard search order applies (see [`crate::fonts`]).
    pub fonts_dir: Option<PathBuf>,
    /// Rendered width of the logo, in [`Self::unit`].
    pub logo_width: f64,
    /// Rendered width of chart images, in [`Self::unit`].
    pub chart_width: f64,
    /// Footer branding strings.
    pub branding: Branding,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::default(),
            unit: Unit::default(),
            format: PageFormat::default(),
            export_dir: PathBuf::from("results"),
            logo_path: PathBuf::from("assets/logo/kai-logo.png"),
            fonts_dir: None,
            logo_width: 30.0,
            chart_width: 70.0,
            branding: Branding::default(),
        }
    }
}

impl ReportConfig {
    /// Returns the page size in millimetres with the orientation applied.
    pub fn page_size_mm(&self) -> (f64, f64) {
        let (w, h) = self.format.size_mm();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    /// Returns the logo width converted to millimetres.
    pub fn logo_width_mm(&self) -> f64 {
        self.unit.to_mm(self.logo_width)
    }

    /// Returns the chart width converted to millimetres.
    pub fn chart_width_mm(&self) -> f64 {
        self.unit.to_mm(self.chart_width)
    }

    /// Sets the export directory and returns the updated configuration.
    pub fn with_export_dir(mut self, export_dir: impl Into<PathBuf>) -> Self {
        self.export_dir = export_dir.into();
        self
    }

    /// Sets the logo path and returns the updated configuration.
    pub fn with_logo_path(mut self, logo_path: impl Into<PathBuf>) -> Self {
        self.logo_path = logo_path.into();
        self
    }

    /// Sets the fonts directory and returns the updated configuration.
    pub fn with_fonts_dir(mut self, fonts_dir: impl Into<Option<PathBuf>>) -> Self {
        self.fonts_dir = fonts_dir.into();
        self
    }

    /// Sets the orientation and returns the updated configuration.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }
}

/// Shape information about the analysed dataset.
///
/// Used only for the overview block on the first page; the renderer never
/// touches the dataset itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    rows: usize,
    columns: usize,
    column_names: Vec<String>,
}

impl DatasetSummary {
    /// Creates a summary from the dataset shape and ordered column names.
    pub fn new(rows: usize, columns: usize, column_names: impl Into<Vec<String>>) -> Self {
        Self {
            rows,
            columns,
            column_names: column_names.into(),
        }
    }

    /// Returns the number of data rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Returns the ordered column names.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }
}

/// Tabular answer data: ordered headers plus rows of cell text.
///
/// Rows are not required to be present; a table without data rows renders as
/// a lone header row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableData {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TableData {
    /// Creates a table from headers and rows.
    pub fn new(columns: impl Into<Vec<String>>, rows: impl Into<Vec<Vec<String>>>) -> Self {
        Self {
            columns: columns.into(),
            rows: rows.into(),
        }
    }

    /// Returns the column headers.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the data rows.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Returns `true` when the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Answer attached to a session entry.
///
/// The variant is chosen by the caller when the entry is recorded.  The
/// renderer never infers the kind from the answer's shape, so a plain-text
/// answer that happens to end in `.png` stays plain text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    /// Free-form text returned by the engine.
    Text(String),
    /// Path to a chart image generated by the engine.
    Chart(PathBuf),
    /// Derived tabular result.
    Table(TableData),
}

impl Answer {
    /// Convenience constructor for a text answer.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Convenience constructor for a chart answer.
    pub fn chart(path: impl Into<PathBuf>) -> Self {
        Self::Chart(path.into())
    }

    /// Convenience constructor for a tabular answer.
    pub fn table(table: TableData) -> Self {
        Self::Table(table)
    }
}

/// One question/answer pair of the analysis session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    question: String,
    answer: Answer,
}

impl SessionEntry {
    /// Creates an entry from a question and its answer.
    pub fn new(question: impl Into<String>, answer: Answer) -> Self {
        Self {
            question: question.into(),
            answer,
        }
    }

    /// Returns the question text.
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Returns the answer.
    pub fn answer(&self) -> &Answer {
        &self.answer
    }
}

/// Reads a [`ReportConfig`] from a JSON file.
pub fn load_config(path: impl AsRef<Path>) -> std::io::Result<ReportConfig> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(std::io::Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_swaps_page_axes() {
        let config = ReportConfig::default().with_orientation(Orientation::Landscape);
        assert_eq!(config.page_size_mm(), (297.0, 210.0));
    }

    #[test]
    fn unit_conversion_to_mm() {
        assert_eq!(Unit::Millimeters.to_mm(70.0), 70.0);
        assert!((Unit::Inches.to_mm(1.0) - 25.4).abs() < 1e-9);
        assert!((Unit::Points.to_mm(72.0) - 25.4).abs() < 1e-9);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = ReportConfig::default().with_orientation(Orientation::Landscape);
        let json = serde_json::to_string(&config).unwrap();
        let back: ReportConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn answer_text_is_never_reinterpreted() {
        let answer = Answer::text("saved to exports/chart.png");
        assert!(matches!(answer, Answer::Text(_)));
    }
}
