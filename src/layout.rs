//! Pure text-wrapping and measurement helpers used by the report elements.
//!
//! Everything in this module is deterministic and free of PDF state so the
//! wrapping behaviour can be unit tested without rendering a document.

/// Character budget for one line of the comma-joined column-name list.
pub const COLUMN_LIST_BUDGET: usize = 76;

/// Character budget for wrapped question and answer paragraphs.
pub const PARAGRAPH_BUDGET: usize = 80;

/// Body text size in points.
pub const BODY_FONT_SIZE: u8 = 12;

/// Body text size used when the normal size overflows the writable width.
pub const REDUCED_BODY_FONT_SIZE: u8 = 9;

/// Table cell text size in points.
pub const TABLE_FONT_SIZE: u8 = 7;

/// Table cell text size used when the normal size overflows the column.
pub const REDUCED_TABLE_FONT_SIZE: u8 = 5;

/// Footer text size in points.
pub const FOOTER_FONT_SIZE: u8 = 8;

/// Vertical margin reserved below a chart image, in millimetres.
pub const CHART_BOTTOM_MARGIN_MM: f64 = 5.0;

/// Which of the two layout attempts a block ended up using.
///
/// Blocks first measure their content at the normal font size.  If the
/// content overflows the writable width they retry once at the reduced size
/// and record that here.  Content that still overflows after the retry is
/// emitted anyway; there is no truncation step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FontFit {
    /// The content fit at the normal font size.
    #[default]
    Normal,
    /// The block fell back to the reduced font size.
    Reduced,
}

/// Wraps a column-name list into comma-joined lines at a character budget.
///
/// Lines are built greedily: names are appended with a `", "` separator while
/// the running line stays under `budget`, then the line is flushed.  No line
/// carries a trailing separator.  A single name longer than the budget is
/// emitted on its own line, unbroken.
pub fn wrap_column_names<S: AsRef<str>>(names: &[S], budget: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for name in names {
        let name = name.as_ref();
        if !line.is_empty() && line.chars().count() + 2 + name.chars().count() > budget {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push_str(", ");
        }
        line.push_str(name);
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Greedy word wrap at a character budget.
///
/// A single word longer than the budget is emitted on its own line without
/// being broken; downstream layout handles the overflow via the font-size
/// fallback.
pub fn wrap_words(text: &str, budget: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_chars = 0usize;

    for word in text.split_whitespace() {
        let word_chars = word.chars().count();
        if line_chars > 0 && line_chars + 1 + word_chars > budget {
            lines.push(std::mem::take(&mut line));
            line_chars = 0;
        }
        if line_chars > 0 {
            line.push(' ');
            line_chars += 1;
        }
        line.push_str(word);
        line_chars += word_chars;
    }

    if !line.is_empty() {
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Hard character wrap for table cells.
///
/// Splits on Unicode scalar boundaries every `max_chars` characters.  Always
/// returns at least one (possibly empty) line so every cell occupies a row.
pub fn wrap_chars(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut count = 0usize;

    for ch in text.chars() {
        if count == max_chars {
            lines.push(std::mem::take(&mut line));
            count = 0;
        }
        line.push(ch);
        count += 1;
    }

    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

/// Aspect-preserving height in millimetres for an image scaled to a fixed
/// target width.
pub fn scaled_image_height_mm(px_width: u32, px_height: u32, target_width_mm: f64) -> f64 {
    if px_width == 0 {
        return 0.0;
    }
    target_width_mm * (px_height as f64) / (px_width as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_column_list_yields_one_line_without_separator() {
        let lines = wrap_column_names(&["a", "b", "c"], COLUMN_LIST_BUDGET);
        assert_eq!(lines, vec!["a, b, c"]);
    }

    #[test]
    fn column_lines_stay_within_budget_bound() {
        let names: Vec<String> = (0..40).map(|i| format!("column_{i}")).collect();
        let longest = names.iter().map(|n| n.chars().count()).max().unwrap();
        let lines = wrap_column_names(&names, COLUMN_LIST_BUDGET);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.chars().count() <= COLUMN_LIST_BUDGET + longest + 2, "{line}");
            assert!(!line.ends_with(", "));
        }
    }

    #[test]
    fn oversized_single_column_name_gets_its_own_line() {
        let huge = "x".repeat(COLUMN_LIST_BUDGET + 20);
        let lines = wrap_column_names(&["id", huge.as_str(), "name"], COLUMN_LIST_BUDGET);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], huge);
    }

    #[test]
    fn wrapping_all_column_names_preserves_order_and_content() {
        let names: Vec<String> = (0..25).map(|i| format!("c{i}")).collect();
        let lines = wrap_column_names(&names, 20);
        let rejoined = lines.join(", ");
        assert_eq!(rejoined, names.join(", "));
    }

    #[test]
    fn word_wrap_respects_budget() {
        let text = "the quick brown fox jumps over the lazy dog again and again";
        for line in wrap_words(text, 20) {
            assert!(line.chars().count() <= 20, "{line}");
        }
    }

    #[test]
    fn word_wrap_keeps_overlong_word_unbroken() {
        let word = "w".repeat(50);
        let lines = wrap_words(&format!("short {word} tail"), 20);
        assert!(lines.contains(&word));
    }

    #[test]
    fn word_wrap_of_empty_text_is_single_empty_line() {
        assert_eq!(wrap_words("", PARAGRAPH_BUDGET), vec![String::new()]);
    }

    #[test]
    fn char_wrap_splits_on_scalar_boundaries() {
        let lines = wrap_chars("caf\u{e9}s caf\u{e9}s", 4);
        assert_eq!(lines, vec!["caf\u{e9}", "s ca", "f\u{e9}s"]);
    }

    #[test]
    fn char_wrap_never_panics_on_zero_width() {
        assert_eq!(wrap_chars("ab", 0), vec!["a", "b"]);
    }

    #[test]
    fn image_height_preserves_aspect_ratio() {
        let height = scaled_image_height_mm(200, 100, 70.0);
        assert!((height - 35.0).abs() < 1e-9);
        // Degenerate zero-width images scale to nothing instead of dividing
        // by zero.
        assert_eq!(scaled_image_height_mm(0, 100, 70.0), 0.0);
    }
}
