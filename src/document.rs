//! Document scaffolding for report renders.
//!
//! Builds `genpdf::Document` instances configured from a [`ReportConfig`]:
//! paper size with the orientation applied, page margins, the default font
//! size, and a page decorator that reserves a fixed-height footer area on
//! every page.  The first-page header is ordinary document content and is
//! deliberately not part of the decorator, so it never repeats on
//! continuation pages.

use genpdf::error::{Error, ErrorKind};
use genpdf::style::{self, Color, Style};
use genpdf::{self, Alignment, Element, Margins, Mm, PageDecorator, Position, Size};

use crate::fonts;
use crate::layout;
use crate::model::{Branding, ReportConfig};

const PAGE_MARGIN_MM: f64 = 10.0;
const FOOTER_HEIGHT_MM: f64 = 15.0;

fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

/// Builder for report documents pre-configured from a [`ReportConfig`].
pub struct DocumentBuilder<'a> {
    config: &'a ReportConfig,
    footer: Option<FooterSpec>,
}

type FooterFactory = dyn Fn(usize) -> Box<dyn Element>;

impl<'a> DocumentBuilder<'a> {
    /// Creates a builder for the given configuration.
    pub fn new(config: &'a ReportConfig) -> Self {
        Self {
            config,
            footer: None,
        }
    }

    /// Installs the standard report footer: centered powered-by label and
    /// copyright line in small grey type, then the page number in black.
    pub fn with_report_footer(mut self) -> Self {
        let branding = self.config.branding.clone();

        self.footer = Some(FooterSpec::new(
            mm_from_f64(FOOTER_HEIGHT_MM),
            move |page| {
                let mut lines = genpdf::elements::LinearLayout::vertical();
                for (text, line_style) in footer_lines(&branding, page) {
                    let mut paragraph = genpdf::elements::Paragraph::new(text);
                    paragraph.set_alignment(Alignment::Center);
                    lines.push(paragraph.styled(line_style));
                }
                lines
            },
        ));
        self
    }

    /// Configures a custom footer callback with a fixed reserved height.
    pub fn with_footer<F, E>(mut self, height: impl Into<Mm>, footer: F) -> Self
    where
        F: Fn(usize) -> E + 'static,
        E: Element + 'static,
    {
        self.footer = Some(FooterSpec::new(height, footer));
        self
    }

    /// Builds a fully configured `genpdf::Document`.
    ///
    /// Font resolution failure is fatal; see [`crate::fonts`].
    pub fn build(self) -> Result<genpdf::Document, Error> {
        let font_family = fonts::report_font_family(self.config.fonts_dir.as_deref())?;
        let mut document = genpdf::Document::new(font_family);

        let (width, height) = self.config.page_size_mm();
        document.set_paper_size(Size::new(mm_from_f64(width), mm_from_f64(height)));
        document.set_font_size(layout::BODY_FONT_SIZE);

        let margin = mm_from_f64(PAGE_MARGIN_MM);
        let margins = Margins::trbl(margin, margin, margin, margin);
        let decorator = ReportPageDecorator::new(margins, self.footer);
        document.set_page_decorator(decorator);

        Ok(document)
    }
}

fn footer_lines(branding: &Branding, page: usize) -> Vec<(String, Style)> {
    let grey = Style::new()
        .with_font_size(layout::FOOTER_FONT_SIZE)
        .with_color(Color::Greyscale(128));
    let black = Style::new().with_font_size(layout::FOOTER_FONT_SIZE);

    vec![
        (branding.powered_by.clone(), grey),
        (branding.copyright.clone(), grey),
        (format!("Page {}", page), black),
    ]
}

/// Definition of a footer rendered through the page decorator.
pub struct FooterSpec {
    height: Mm,
    factory: Box<FooterFactory>,
}

impl FooterSpec {
    /// Creates a new footer specification.
    pub fn new<F, E>(height: impl Into<Mm>, factory: F) -> Self
    where
        F: Fn(usize) -> E + 'static,
        E: Element + 'static,
    {
        Self {
            height: height.into(),
            factory: Box::new(move |page| Box::new(factory(page)) as Box<dyn Element>),
        }
    }
}

struct ReportPageDecorator {
    page: usize,
    margins: Margins,
    footer: Option<FooterSpec>,
}

impl ReportPageDecorator {
    fn new(margins: Margins, footer: Option<FooterSpec>) -> Self {
        Self {
            page: 0,
            margins,
            footer,
        }
    }
}

impl PageDecorator for ReportPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        style: style::Style,
    ) -> Result<genpdf::render::Area<'a>, Error> {
        self.page += 1;
        area.add_margins(self.margins);

        if let Some(footer) = &self.footer {
            let available = area.size().height;
            if footer.height > available {
                return Err(Error::new(
                    "Footer height exceeds available space",
                    ErrorKind::InvalidData,
                ));
            }

            let mut footer_area = area.clone();
            footer_area.add_offset(Position::new(0, available - footer.height));
            let mut element = (footer.factory)(self.page);
            let result = element.render(context, footer_area, style)?;
            if result.has_more {
                return Err(Error::new(
                    "Footer element does not fit into the reserved space",
                    ErrorKind::PageSizeExceeded,
                ));
            }

            area.set_height(available - footer.height);
        }

        Ok(area)
    }
}
