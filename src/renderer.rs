//! The report renderer: turns a question/answer session into a PDF file.
//!
//! A render is a single synchronous pass on the calling thread.  The renderer
//! holds no state between calls; invocations with distinct export paths are
//! independent and reentrant.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use genpdf::elements::{Break, Image, Paragraph};
use genpdf::style::{Color, Style};
use genpdf::{Alignment, Element, Scale};
use log::{debug, info};

use crate::document::DocumentBuilder;
use crate::elements::{image_from_path, AnswerTable, ChartImage, FitHandle, FittedText, SeparatorRule};
use crate::error::ReportError;
use crate::layout::{self, FontFit};
use crate::model::{Answer, DatasetSummary, ReportConfig, SessionEntry};

const BANNER_COLOR: Color = Color::Rgb(0, 0, 128);

/// Layout outcome of one rendered session entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntryLayout {
    /// Which layout attempt the question paragraph used.
    pub question: FontFit,
    /// Which layout attempt the answer block used.  Chart answers always
    /// report [`FontFit::Normal`]; they scale instead of changing type size.
    pub answer: FontFit,
}

/// Result of a successful report render.
#[derive(Debug)]
pub struct RenderedReport {
    /// Path of the written PDF file.
    pub path: PathBuf,
    /// Per-entry layout outcomes, in session order.
    pub layout: Vec<EntryLayout>,
}

/// Renders analysis sessions to PDF reports.
///
/// The renderer is stateless; it borrows its configuration per call and can
/// be shared freely.
pub struct ReportRenderer;

impl ReportRenderer {
    /// Renders the session to a PDF under the configured export directory
    /// and returns the output path together with the layout report.
    ///
    /// The output name is `analysis-<dataset>-<MM-DD-YYYY_HH-MM-SS>.pdf`,
    /// where `<dataset>` is the file-name component of `dataset_label`, so a
    /// path-like label does not introduce directories into the output path.
    /// The export directory is created when absent.
    pub fn render(
        config: &ReportConfig,
        dataset_label: &str,
        entries: &[SessionEntry],
        dataset: &DatasetSummary,
    ) -> Result<RenderedReport, ReportError> {
        let (bytes, layout) = Self::render_to_bytes(config, dataset_label, entries, dataset)?;

        fs::create_dir_all(&config.export_dir)?;
        let base_name = Path::new(dataset_label)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| dataset_label.to_owned());
        let timestamp = Local::now().format("%m-%d-%Y_%H-%M-%S");
        let file_name = format!("analysis-{}-{}.pdf", base_name, timestamp);
        let path = config.export_dir.join(file_name);
        fs::write(&path, &bytes)?;
        info!("wrote report to {}", path.display());

        Ok(RenderedReport { path, layout })
    }

    /// Renders the session to an in-memory PDF without touching the
    /// filesystem.  Used by tests and callers that stream the result.
    pub fn render_to_bytes(
        config: &ReportConfig,
        dataset_label: &str,
        entries: &[SessionEntry],
        dataset: &DatasetSummary,
    ) -> Result<(Vec<u8>, Vec<EntryLayout>), ReportError> {
        let mut document = DocumentBuilder::new(config)
            .with_report_footer()
            .build()
            .map_err(ReportError::FontAssets)?;

        Self::push_header(&mut document, config, dataset_label)?;
        Self::push_overview(&mut document, dataset);

        let mut fits: Vec<(FitHandle, FitHandle)> = Vec::with_capacity(entries.len());
        for entry in entries {
            fits.push(Self::push_entry(&mut document, config, entry)?);
        }

        let mut bytes = Vec::new();
        document.render(&mut bytes)?;
        debug!(
            "rendered {} entries into {} bytes",
            entries.len(),
            bytes.len()
        );

        // Fit handles are only meaningful after the render pass above.
        let layout = fits
            .into_iter()
            .map(|(question, answer)| EntryLayout {
                question: question.get(),
                answer: answer.get(),
            })
            .collect();

        Ok((bytes, layout))
    }

    fn push_header(
        document: &mut genpdf::Document,
        config: &ReportConfig,
        dataset_label: &str,
    ) -> Result<(), ReportError> {
        let logo = Self::load_logo(&config.logo_path, config.logo_width_mm())?;
        document.push(logo);

        let date_line = format!("Date: {}", Local::now().format("%d/%m/%Y"));
        let mut date = Paragraph::new(date_line);
        date.set_alignment(Alignment::Right);
        document.push(date);
        document.push(Break::new(1.0));

        let mut banner = Paragraph::new(format!(
            "Analysis report for dataset {}",
            dataset_label
        ));
        banner.set_alignment(Alignment::Center);
        document.push(
            banner
                .styled(Style::new().bold().with_color(BANNER_COLOR))
                .framed(),
        );
        document.push(Break::new(1.0));

        let mut title = Paragraph::new("Question/Answer session");
        title.set_alignment(Alignment::Center);
        document.push(title);
        document.push(Break::new(1.0));

        Ok(())
    }

    fn load_logo(path: &Path, width_mm: f64) -> Result<Image, ReportError> {
        if !path.is_file() {
            return Err(ReportError::MissingLogo {
                path: path.to_path_buf(),
            });
        }

        let (mut image, natural) = image_from_path(path).map_err(|source| {
            ReportError::ImageAsset {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let natural_width: printpdf::Mm = natural.width.into();
        if natural_width.0 > f64::EPSILON {
            let scale = width_mm / natural_width.0;
            image.set_scale(Scale::new(scale, scale));
        }
        image.set_alignment(Alignment::Center);
        Ok(image)
    }

    fn push_overview(document: &mut genpdf::Document, dataset: &DatasetSummary) {
        document.push(Paragraph::new(format!(
            "Dataset shape: {} rows, {} columns",
            dataset.rows(),
            dataset.columns()
        )));

        let lines =
            layout::wrap_column_names(dataset.column_names(), layout::COLUMN_LIST_BUDGET);
        document.push(Paragraph::new("Column names:").styled(Style::new().bold()));
        document.push(FittedText::from_lines(lines));
        document.push(Break::new(1.0));
    }

    fn push_entry(
        document: &mut genpdf::Document,
        config: &ReportConfig,
        entry: &SessionEntry,
    ) -> Result<(FitHandle, FitHandle), ReportError> {
        document.push(SeparatorRule::new());

        let question = FittedText::new(
            &format!("Question: {}", entry.question()),
            layout::PARAGRAPH_BUDGET,
        )
        .with_style(Style::new().bold());
        let question_fit = question.fit_handle();
        document.push(question);

        let answer_fit = match entry.answer() {
            Answer::Text(text) => {
                let paragraph =
                    FittedText::new(&format!("Answer: {}", text), layout::PARAGRAPH_BUDGET);
                let fit = paragraph.fit_handle();
                document.push(paragraph);
                fit
            }
            Answer::Chart(path) => {
                document.push(FittedText::new(
                    "Answer: see the chart below.",
                    layout::PARAGRAPH_BUDGET,
                ));
                let chart = ChartImage::from_path(path, config.chart_width_mm()).map_err(
                    |source| ReportError::ImageAsset {
                        path: path.clone(),
                        source,
                    },
                )?;
                document.push(chart);
                FitHandle::default()
            }
            Answer::Table(table) => {
                let element = AnswerTable::new(table);
                let fit = element.fit_handle();
                document.push(element);
                fit
            }
        };

        document.push(Break::new(1.0));
        Ok((question_fit, answer_fit))
    }
}
