use std::io::Cursor;
use std::path::PathBuf;

use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Rgb};
use sha2::{Digest, Sha256};
use tempfile::TempDir;

use kai_report::fonts;
use kai_report::layout::FontFit;
use kai_report::{
    Answer, DatasetSummary, ReportConfig, ReportRenderer, SessionEntry, TableData,
};

struct Fixture {
    // Keeps the generated assets alive for the duration of a test.
    _dir: TempDir,
    config: ReportConfig,
}

fn fixture() -> Option<Fixture> {
    if !fonts::report_fonts_available() {
        eprintln!(
            "Skipping test: report fonts missing. Set KAI_REPORT_FONTS_DIR or copy assets/fonts next to the binary."
        );
        return None;
    }

    let dir = tempfile::tempdir().expect("create temp dir");
    let logo_path = dir.path().join("logo.png");
    std::fs::write(&logo_path, solid_png(180, 90)).expect("write logo");

    let config = ReportConfig::default()
        .with_export_dir(dir.path().join("results"))
        .with_logo_path(logo_path);

    Some(Fixture { _dir: dir, config })
}

fn solid_png(width: u32, height: u32) -> Vec<u8> {
    let buffer = ImageBuffer::from_fn(width, height, |_, _| Rgb([90u8, 120, 200]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(buffer)
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .expect("encode png");
    bytes
}

fn write_chart(fixture: &Fixture, name: &str, width: u32, height: u32) -> PathBuf {
    let path = fixture._dir.path().join(name);
    std::fs::write(&path, solid_png(width, height)).expect("write chart");
    path
}

fn sample_dataset() -> DatasetSummary {
    DatasetSummary::new(
        10,
        3,
        vec!["id".to_owned(), "name".to_owned(), "value".to_owned()],
    )
}

/// Counts `/Type /Page` dictionary entries, excluding the `/Type /Pages`
/// tree node.
fn page_count(bytes: &[u8]) -> usize {
    let mut count = 0;
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index..].starts_with(b"/Type") {
            let mut next = index + b"/Type".len();
            while next < bytes.len() && bytes[next].is_ascii_whitespace() {
                next += 1;
            }
            if bytes[next..].starts_with(b"/Page") && bytes.get(next + b"/Page".len()) != Some(&b's')
            {
                count += 1;
            }
            index = next;
        } else {
            index += 1;
        }
    }
    count
}

fn scrub_pdf(bytes: &[u8]) -> Vec<u8> {
    fn scrub_segment(data: &mut [u8], tag: &[u8], terminator: u8) {
        let mut index = 0;
        while index + tag.len() < data.len() {
            if data[index..].starts_with(tag) {
                let mut cursor = index + tag.len();
                while cursor < data.len() {
                    let byte = data[cursor];
                    if byte == terminator {
                        break;
                    }
                    if terminator == b')' {
                        data[cursor] = b'0';
                    } else if !matches!(byte, b'<' | b'>' | b' ' | b'\n' | b'\r' | b'\t') {
                        data[cursor] = b'0';
                    }
                    cursor += 1;
                }
                index = cursor;
            } else {
                index += 1;
            }
        }
    }

    fn scrub_xml(data: &mut [u8], start: &[u8], end: &[u8]) {
        let mut offset = 0;
        while offset + start.len() < data.len() {
            if let Some(start_pos) = data[offset..]
                .windows(start.len())
                .position(|window| window == start)
            {
                let start_index = offset + start_pos + start.len();
                if let Some(end_pos) = data[start_index..]
                    .windows(end.len())
                    .position(|window| window == end)
                {
                    for byte in &mut data[start_index..start_index + end_pos] {
                        if !matches!(*byte, b'<' | b'>' | b'/' | b' ' | b'\n' | b'\r' | b'\t') {
                            *byte = b'0';
                        }
                    }
                    offset = start_index + end_pos + end.len();
                } else {
                    break;
                }
            } else {
                break;
            }
        }
    }

    let mut normalized = bytes.to_vec();
    scrub_segment(&mut normalized, b"/CreationDate(", b')');
    scrub_segment(&mut normalized, b"/ModDate(", b')');
    scrub_segment(&mut normalized, b"/ID[", b']');
    scrub_segment(&mut normalized, b"/Producer(", b')');
    scrub_xml(&mut normalized, b"<xmp:CreateDate>", b"</xmp:CreateDate>");
    scrub_xml(&mut normalized, b"<xmp:ModifyDate>", b"</xmp:ModifyDate>");
    scrub_xml(
        &mut normalized,
        b"<xmp:MetadataDate>",
        b"</xmp:MetadataDate>",
    );
    scrub_xml(
        &mut normalized,
        b"<xmpMM:DocumentID>",
        b"</xmpMM:DocumentID>",
    );
    scrub_xml(
        &mut normalized,
        b"<xmpMM:InstanceID>",
        b"</xmpMM:InstanceID>",
    );
    scrub_xml(&mut normalized, b"<xmpMM:VersionID>", b"</xmpMM:VersionID>");
    normalized
}

fn normalized_hash(bytes: &[u8]) -> [u8; 32] {
    let normalized = scrub_pdf(bytes);
    let digest = Sha256::digest(&normalized);
    digest.into()
}

#[test]
fn single_text_entry_renders_one_page() {
    let Some(fixture) = fixture() else { return };

    let entries = vec![SessionEntry::new(
        "What is the capital1?",
        Answer::text("BLA BLA BLA"),
    )];

    let (bytes, layout) = ReportRenderer::render_to_bytes(
        &fixture.config,
        "capitals.csv",
        &entries,
        &sample_dataset(),
    )
    .expect("render session");

    assert!(!bytes.is_empty());
    assert_eq!(page_count(&bytes), 1);
    assert_eq!(layout.len(), 1);
    assert_eq!(layout[0].question, FontFit::Normal);
    assert_eq!(layout[0].answer, FontFit::Normal);
}

#[test]
fn rendering_is_deterministic() {
    let Some(fixture) = fixture() else { return };

    let entries = vec![
        SessionEntry::new("Summarise the dataset.", Answer::text("Ten rows, three columns.")),
        SessionEntry::new(
            "List the first values.",
            Answer::table(TableData::new(
                vec!["id".to_owned(), "value".to_owned()],
                vec![vec!["1".to_owned(), "alpha".to_owned()]],
            )),
        ),
    ];

    let render = || {
        ReportRenderer::render_to_bytes(
            &fixture.config,
            "demo.csv",
            &entries,
            &sample_dataset(),
        )
        .expect("render session")
        .0
    };

    let bytes_a = render();
    let bytes_b = render();

    assert_eq!(bytes_a.len(), bytes_b.len(), "PDF sizes should match");
    assert_eq!(
        normalized_hash(&bytes_a),
        normalized_hash(&bytes_b),
        "PDF renders must be deterministic after metadata normalization"
    );
}

#[test]
fn zero_row_table_renders_header_only_page() {
    let Some(fixture) = fixture() else { return };

    let entries = vec![SessionEntry::new(
        "Which rows match an impossible filter?",
        Answer::table(TableData::new(
            vec!["id".to_owned(), "name".to_owned(), "value".to_owned()],
            Vec::<Vec<String>>::new(),
        )),
    )];

    let (bytes, layout) = ReportRenderer::render_to_bytes(
        &fixture.config,
        "demo.csv",
        &entries,
        &sample_dataset(),
    )
    .expect("render session");

    assert_eq!(page_count(&bytes), 1);
    assert_eq!(layout[0].answer, FontFit::Normal);
}

#[test]
fn tall_chart_forces_a_page_break() {
    let Some(fixture) = fixture() else { return };

    // 70mm target width, 1:3 aspect: the scaled 210mm chart fits an empty
    // page but not the space left under the first-page header, so it must
    // start on page 2.
    let chart = write_chart(&fixture, "tall.png", 150, 450);
    let entries = vec![SessionEntry::new(
        "Plot the value distribution.",
        Answer::chart(chart),
    )];

    let (bytes, _) = ReportRenderer::render_to_bytes(
        &fixture.config,
        "demo.csv",
        &entries,
        &sample_dataset(),
    )
    .expect("render session");

    assert_eq!(page_count(&bytes), 2);
}

#[test]
fn wide_chart_after_long_session_still_renders() {
    let Some(fixture) = fixture() else { return };

    let chart = write_chart(&fixture, "wide.png", 640, 160);
    let filler = "word ".repeat(600);
    let entries = vec![
        SessionEntry::new("Explain every column in detail.", Answer::text(filler)),
        SessionEntry::new("Now plot the totals.", Answer::chart(chart)),
    ];

    let (bytes, layout) = ReportRenderer::render_to_bytes(
        &fixture.config,
        "demo.csv",
        &entries,
        &sample_dataset(),
    )
    .expect("render session");

    assert!(page_count(&bytes) >= 2);
    assert_eq!(layout.len(), 2);
}

#[test]
fn unbreakable_answer_falls_back_to_reduced_font() {
    let Some(fixture) = fixture() else { return };

    let entries = vec![SessionEntry::new(
        "What is the longest token?",
        Answer::text("x".repeat(200)),
    )];

    let (_, layout) = ReportRenderer::render_to_bytes(
        &fixture.config,
        "demo.csv",
        &entries,
        &sample_dataset(),
    )
    .expect("render session");

    assert_eq!(layout[0].answer, FontFit::Reduced);
    assert_eq!(layout[0].question, FontFit::Normal);
}

#[test]
fn render_writes_file_with_timestamped_name() {
    let Some(fixture) = fixture() else { return };

    let entries = vec![SessionEntry::new(
        "What is the capital1?",
        Answer::text("BLA BLA BLA"),
    )];

    let report = ReportRenderer::render(
        &fixture.config,
        "titanic.csv",
        &entries,
        &sample_dataset(),
    )
    .expect("render session");

    assert!(report.path.is_file());
    assert_eq!(report.path.parent(), Some(fixture.config.export_dir.as_path()));

    let name = report.path.file_name().unwrap().to_string_lossy().into_owned();
    let pattern = regex::Regex::new(
        r"^analysis-titanic\.csv-\d{2}-\d{2}-\d{4}_\d{2}-\d{2}-\d{2}\.pdf$",
    )
    .unwrap();
    assert!(pattern.is_match(&name), "unexpected file name {name}");
}

#[test]
fn path_like_dataset_label_names_the_file_without_directories() {
    let Some(fixture) = fixture() else { return };

    let entries = vec![SessionEntry::new(
        "What is the capital1?",
        Answer::text("BLA BLA BLA"),
    )];

    let report = ReportRenderer::render(
        &fixture.config,
        "datasets/titanic.csv",
        &entries,
        &sample_dataset(),
    )
    .expect("render session");

    assert!(report.path.is_file());
    assert_eq!(report.path.parent(), Some(fixture.config.export_dir.as_path()));
    assert!(report
        .path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("analysis-titanic.csv-"));
}
