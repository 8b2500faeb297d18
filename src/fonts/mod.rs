//! Font asset resolution for the report renderer.
//!
//! The reports must render accented and other non-ASCII text, so the
//! renderer insists on the configured Unicode family: when the font files
//! cannot be found or loaded the render aborts instead of substituting a
//! built-in glyph set.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::Error;
use genpdf::fonts::{self, FontData, FontFamily};

/// Name of the report font family.
pub const FONT_FAMILY_NAME: &str = "DejaVuSans";

/// Environment variable overriding the font search path.
pub const FONTS_DIR_ENV: &str = "KAI_REPORT_FONTS_DIR";

const FONT_FILES: &[&str] = &[
    "DejaVuSans-Regular.ttf",
    "DejaVuSans-Bold.ttf",
    "DejaVuSans-Italic.ttf",
    "DejaVuSans-BoldItalic.ttf",
];

fn font_directory_candidates(configured: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(dir) = configured {
        candidates.push(dir.to_path_buf());
    }

    if let Ok(path) = env::var(FONTS_DIR_ENV) {
        if !path.trim().is_empty() {
            let candidate = PathBuf::from(path);
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            let candidate = bin_dir.join("assets/fonts");
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }

    let manifest_candidate = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts");
    if !candidates.contains(&manifest_candidate) {
        candidates.push(manifest_candidate);
    }

    candidates
}

fn missing_font_files(path: &Path) -> Vec<PathBuf> {
    FONT_FILES
        .iter()
        .map(|name| path.join(name))
        .filter(|candidate| !candidate.is_file())
        .collect()
}

fn resolve_font_directory(configured: Option<&Path>) -> Result<PathBuf, Error> {
    let mut attempts = Vec::new();

    for candidate in font_directory_candidates(configured) {
        let exists = candidate.is_dir();
        let missing = missing_font_files(&candidate);

        if exists && missing.is_empty() {
            return Ok(candidate);
        }

        let reason = if !exists {
            format!("directory missing at {}", candidate.display())
        } else {
            let missing_list = missing
                .iter()
                .map(|path| path.file_name().unwrap_or_default().to_string_lossy())
                .collect::<Vec<_>>()
                .join(", ");
            format!("missing files [{}]", missing_list)
        };

        attempts.push(format!("{} ({})", candidate.display(), reason));
    }

    let summary = if attempts.is_empty() {
        "no search paths were available".to_owned()
    } else {
        attempts.join(", ")
    };

    Err(Error::new(
        format!(
            "Unable to locate report font directory. Checked: {}. See assets/fonts/README.md or set {}.",
            summary, FONTS_DIR_ENV
        ),
        io::Error::new(io::ErrorKind::NotFound, "report font directory not found"),
    ))
}

/// Loads the report font family, searching the configured directory first,
/// then `KAI_REPORT_FONTS_DIR`, then `assets/fonts` next to the binary and
/// under the crate manifest.
pub fn report_font_family(configured: Option<&Path>) -> Result<FontFamily<FontData>, Error> {
    let directory = resolve_font_directory(configured)?;

    fonts::from_files(&directory, FONT_FAMILY_NAME, None).map_err(|err| {
        Error::new(
            format!(
                "Failed to load font family '{}' from {}: {}",
                FONT_FAMILY_NAME,
                directory.display(),
                err
            ),
            io::Error::new(io::ErrorKind::Other, err.to_string()),
        )
    })
}

/// Indicates whether the report font files are present in any search path.
///
/// Integration tests use this to skip rendering when the assets have not
/// been installed.
pub fn report_fonts_available() -> bool {
    resolve_font_directory(None).is_ok()
}
