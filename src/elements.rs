//! Custom element implementations built on top of `genpdf` primitives.
//!
//! This module provides the renderable building blocks of a report entry: the
//! separator rule drawn between entries, wrapped paragraphs with an explicit
//! font-size fallback, chart images that break to a fresh page instead of
//! overflowing, and the bordered answer table.

use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

use image::GenericImageView;

use genpdf::elements::Image;
use genpdf::error::{Context as _, Error};
use genpdf::style::{Color, Style, StyledString};
use genpdf::{render, Element, Mm, Position, RenderResult, Scale, Size};

use crate::layout::{self, FontFit};

const DEFAULT_IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;
const SEPARATOR_WIDTH_MM: f64 = 30.0;
const SEPARATOR_PADDING_MM: f64 = 5.0;
const CELL_PADDING_MM: f64 = 1.0;

fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

/// Shared handle through which an element reports which layout attempt it
/// ended up using.
pub type FitHandle = Rc<Cell<FontFit>>;

/// Loads an image from the given path using the [`image`] crate with
/// descriptive errors.
pub fn decode_image_from_path(path: impl AsRef<Path>) -> Result<image::DynamicImage, Error> {
    let path = path.as_ref();
    let reader = image::io::Reader::open(path)
        .with_context(|| format!("Failed to open image file {}", path.display()))?;
    reader
        .with_guessed_format()
        .context("Unable to determine image format")?
        .decode()
        .with_context(|| format!("Failed to decode image file {}", path.display()))
}

fn estimated_image_size(image: &image::DynamicImage, dpi: f64) -> Size {
    let (px_width, px_height) = image.dimensions();
    let width_mm = MM_PER_INCH * (px_width as f64) / dpi;
    let height_mm = MM_PER_INCH * (px_height as f64) / dpi;
    Size::new(mm_from_f64(width_mm), mm_from_f64(height_mm))
}

/// Converts the image at `path` into a `genpdf` image together with its
/// estimated natural size.
pub fn image_from_path(path: impl AsRef<Path>) -> Result<(Image, Size), Error> {
    let dynamic = decode_image_from_path(path)?;
    let size = estimated_image_size(&dynamic, DEFAULT_IMAGE_DPI);
    let image = Image::from_dynamic_image(dynamic)?;
    Ok((image, size))
}

/// Short centered horizontal rule with vertical padding, drawn between
/// session entries.
pub struct SeparatorRule {
    width: Mm,
    padding: Mm,
    color: Color,
}

impl SeparatorRule {
    /// Creates a rule with the default width, padding and color.
    pub fn new() -> Self {
        Self {
            width: mm_from_f64(SEPARATOR_WIDTH_MM),
            padding: mm_from_f64(SEPARATOR_PADDING_MM),
            color: Color::Rgb(0, 0, 255),
        }
    }

    /// Sets the stroke color and returns the updated rule.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

impl Default for SeparatorRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Element for SeparatorRule {
    fn render(
        &mut self,
        _context: &genpdf::Context,
        mut area: render::Area<'_>,
        _style: Style,
    ) -> Result<RenderResult, Error> {
        let height = self.padding + self.padding;
        let mut result = RenderResult::default();
        if height > area.size().height {
            result.has_more = true;
            return Ok(result);
        }

        let x_start = (area.size().width - self.width) / 2.0;
        area.draw_line(
            vec![
                Position::new(x_start, self.padding),
                Position::new(x_start + self.width, self.padding),
            ],
            Style::new().with_color(self.color),
        );

        result.size = Size::new(area.size().width, height);
        Ok(result)
    }
}

/// A pre-wrapped paragraph with an explicit two-step layout attempt.
///
/// The text is wrapped at a character budget when the element is built.  On
/// first render the widest line is measured against the writable width at the
/// normal font size; if it overflows, the whole block switches to the reduced
/// size and records that through its [`FitHandle`].  A line that still
/// overflows after the fallback is printed as-is; the block never truncates
/// content.
pub struct FittedText {
    lines: Vec<String>,
    text_style: Style,
    normal_size: u8,
    reduced_size: u8,
    fit: FitHandle,
    decided: bool,
    next_line: usize,
}

impl FittedText {
    /// Wraps `text` at `budget` characters per line.
    pub fn new(text: &str, budget: usize) -> Self {
        Self {
            lines: layout::wrap_words(text, budget),
            text_style: Style::new(),
            normal_size: layout::BODY_FONT_SIZE,
            reduced_size: layout::REDUCED_BODY_FONT_SIZE,
            fit: Rc::new(Cell::new(FontFit::Normal)),
            decided: false,
            next_line: 0,
        }
    }

    /// Creates the element from lines that are already wrapped.
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self {
            lines,
            text_style: Style::new(),
            normal_size: layout::BODY_FONT_SIZE,
            reduced_size: layout::REDUCED_BODY_FONT_SIZE,
            fit: Rc::new(Cell::new(FontFit::Normal)),
            decided: false,
            next_line: 0,
        }
    }

    /// Applies an additional base style (bold questions, colored captions)
    /// and returns the updated element.
    pub fn with_style(mut self, style: Style) -> Self {
        self.text_style = style;
        self
    }

    /// Overrides the normal/reduced font sizes and returns the updated
    /// element.
    pub fn with_sizes(mut self, normal: u8, reduced: u8) -> Self {
        self.normal_size = normal;
        self.reduced_size = reduced;
        self
    }

    /// Returns the handle that reports the layout attempt taken.
    pub fn fit_handle(&self) -> FitHandle {
        Rc::clone(&self.fit)
    }

    fn effective_style(&self, base: Style) -> Style {
        let size = match self.fit.get() {
            FontFit::Normal => self.normal_size,
            FontFit::Reduced => self.reduced_size,
        };
        base.and(self.text_style).with_font_size(size)
    }
}

impl Element for FittedText {
    fn render(
        &mut self,
        context: &genpdf::Context,
        mut area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        if !self.decided {
            let probe = style.and(self.text_style).with_font_size(self.normal_size);
            let widest = self
                .lines
                .iter()
                .map(|line| StyledString::new(line.clone(), probe).width(&context.font_cache))
                .fold(Mm::default(), |widest, width| {
                    if width > widest {
                        width
                    } else {
                        widest
                    }
                });
            if widest > area.size().width {
                self.fit.set(FontFit::Reduced);
            }
            self.decided = true;
        }

        let text_style = self.effective_style(style);
        let line_height = text_style.line_height(&context.font_cache);
        let mut result = RenderResult::default();

        for index in self.next_line..self.lines.len() {
            if line_height > area.size().height {
                self.next_line = index;
                result.has_more = true;
                return Ok(result);
            }

            let line = &self.lines[index];
            if let Some(mut section) =
                area.text_section(&context.font_cache, Position::new(0, 0), text_style)
            {
                section.print_str(line, text_style)?;
            } else {
                self.next_line = index;
                result.has_more = true;
                return Ok(result);
            }

            area.add_offset(Position::new(0, line_height));
            result.size = result
                .size
                .stack_vertical(Size::new(area.size().width, line_height));
        }

        self.next_line = self.lines.len();
        Ok(result)
    }
}

/// Chart image scaled to a fixed target width.
///
/// Before placing the image the element checks the remaining vertical space;
/// when the scaled height plus the bottom margin does not fit it requests a
/// page break exactly once, so the image lands at the top of a fresh page.
/// An image too tall even for an empty page is drawn anyway.
pub struct ChartImage {
    image: Image,
    scaled_height: Mm,
    margin: Mm,
    break_requested: bool,
}

impl ChartImage {
    /// Loads the image at `path` and scales it to `target_width_mm` while
    /// preserving the aspect ratio.
    pub fn from_path(path: impl AsRef<Path>, target_width_mm: f64) -> Result<Self, Error> {
        let (mut image, natural) = image_from_path(path)?;
        let natural_width = mm_to_f64(natural.width);
        let scale = if natural_width > f64::EPSILON {
            target_width_mm / natural_width
        } else {
            1.0
        };
        image.set_scale(Scale::new(scale, scale));

        Ok(Self {
            image,
            scaled_height: mm_from_f64(mm_to_f64(natural.height) * scale),
            margin: mm_from_f64(layout::CHART_BOTTOM_MARGIN_MM),
            break_requested: false,
        })
    }

    /// Returns the height the image occupies after scaling.
    pub fn scaled_height(&self) -> Mm {
        self.scaled_height
    }
}

impl Element for ChartImage {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        if !self.break_requested && self.scaled_height + self.margin > area.size().height {
            self.break_requested = true;
            let mut result = RenderResult::default();
            result.has_more = true;
            return Ok(result);
        }

        let mut result = self.image.render(context, area, style)?;
        // The break was either taken or impossible; never ask again.
        result.has_more = false;
        result.size = result.size.stack_vertical(Size::new(0, self.margin));
        Ok(result)
    }
}

/// Bordered table for tabular answers.
///
/// The header row is bold and rendered exactly once, even when data rows
/// continue on a following page.  Every column is `writable width / (columns
/// + 1)` wide; cell text is hard-wrapped to the column using the estimated
/// width of a single character.  When even a single character does not fit
/// the column at the normal size, the table falls back to the reduced size
/// and records that through its [`FitHandle`].
pub struct AnswerTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    normal_size: u8,
    reduced_size: u8,
    fit: FitHandle,
    decided: bool,
    header_rendered: bool,
    next_row: usize,
    break_requested: bool,
}

impl AnswerTable {
    /// Creates a table element from the answer data.
    pub fn new(table: &crate::model::TableData) -> Self {
        Self {
            columns: table.columns().to_vec(),
            rows: table.rows().to_vec(),
            normal_size: layout::TABLE_FONT_SIZE,
            reduced_size: layout::REDUCED_TABLE_FONT_SIZE,
            fit: Rc::new(Cell::new(FontFit::Normal)),
            decided: false,
            header_rendered: false,
            next_row: 0,
            break_requested: false,
        }
    }

    /// Returns the handle that reports the layout attempt taken.
    pub fn fit_handle(&self) -> FitHandle {
        Rc::clone(&self.fit)
    }

    fn cell_style(&self, base: Style) -> Style {
        let size = match self.fit.get() {
            FontFit::Normal => self.normal_size,
            FontFit::Reduced => self.reduced_size,
        };
        base.with_font_size(size)
    }

    fn draw_cell_border(area: &mut render::Area<'_>, x: Mm, width: Mm, height: Mm) {
        let top = Mm::default();
        area.draw_line(
            vec![
                Position::new(x, top),
                Position::new(x + width, top),
                Position::new(x + width, height),
                Position::new(x, height),
                Position::new(x, top),
            ],
            Style::new(),
        );
    }
}

impl Element for AnswerTable {
    fn render(
        &mut self,
        context: &genpdf::Context,
        mut area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let column_count = self.columns.len().max(1);
        let column_width = area.size().width / (column_count as f64 + 1.0);
        let padding = mm_from_f64(CELL_PADDING_MM);

        if !self.decided {
            let probe = style.with_font_size(self.normal_size);
            let char_width = StyledString::new("0".to_owned(), probe).width(&context.font_cache);
            if char_width + padding + padding > column_width {
                self.fit.set(FontFit::Reduced);
            }
            self.decided = true;
        }

        let cell_style = self.cell_style(style);
        let header_style = cell_style.bold();
        let char_width =
            StyledString::new("0".to_owned(), cell_style).width(&context.font_cache);
        let usable = mm_to_f64(column_width) - 2.0 * CELL_PADDING_MM;
        let chars_per_cell = if mm_to_f64(char_width) > f64::EPSILON {
            ((usable / mm_to_f64(char_width)).floor() as usize).max(1)
        } else {
            1
        };
        let line_height = cell_style.line_height(&context.font_cache);
        let mut result = RenderResult::default();

        if !self.header_rendered {
            let row_height = line_height + padding + padding;
            if row_height > area.size().height {
                result.has_more = true;
                return Ok(result);
            }

            for (index, name) in self.columns.iter().enumerate() {
                let x = mm_from_f64(mm_to_f64(column_width) * index as f64);
                Self::draw_cell_border(&mut area, x, column_width, row_height);

                let text_width =
                    StyledString::new(name.clone(), header_style).width(&context.font_cache);
                let centered = if text_width < column_width {
                    x + (column_width - text_width) / 2.0
                } else {
                    x + padding
                };
                if let Some(mut section) = area.text_section(
                    &context.font_cache,
                    Position::new(centered, padding),
                    header_style,
                ) {
                    section.print_str(name, header_style)?;
                }
            }

            area.add_offset(Position::new(0, row_height));
            result.size = result
                .size
                .stack_vertical(Size::new(area.size().width, row_height));
            self.header_rendered = true;
        }

        let empty = String::new();
        for row_index in self.next_row..self.rows.len() {
            let row = &self.rows[row_index];
            let wrapped: Vec<Vec<String>> = (0..column_count)
                .map(|col| layout::wrap_chars(row.get(col).unwrap_or(&empty), chars_per_cell))
                .collect();
            let line_count = wrapped.iter().map(Vec::len).max().unwrap_or(1);
            let row_height = mm_from_f64(
                mm_to_f64(line_height) * line_count as f64 + 2.0 * CELL_PADDING_MM,
            );

            if row_height > area.size().height {
                if !self.break_requested || self.next_row != row_index {
                    // Move the whole row to the next page rather than
                    // splitting cells mid-row.
                    self.break_requested = true;
                    self.next_row = row_index;
                    result.has_more = true;
                    return Ok(result);
                }
                // A fresh page is still too small; draw the row anyway.
            }

            for (col, cell_lines) in wrapped.iter().enumerate() {
                let x = mm_from_f64(mm_to_f64(column_width) * col as f64);
                Self::draw_cell_border(&mut area, x, column_width, row_height);

                for (line_index, line) in cell_lines.iter().enumerate() {
                    let y = mm_from_f64(
                        CELL_PADDING_MM + mm_to_f64(line_height) * line_index as f64,
                    );
                    if let Some(mut section) = area.text_section(
                        &context.font_cache,
                        Position::new(x + padding, y),
                        cell_style,
                    ) {
                        section.print_str(line, cell_style)?;
                    }
                }
            }

            area.add_offset(Position::new(0, row_height));
            result.size = result
                .size
                .stack_vertical(Size::new(area.size().width, row_height));
            self.break_requested = false;
        }

        self.next_row = self.rows.len();
        Ok(result)
    }
}
