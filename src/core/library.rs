//! core/library.rs
//! Path rules: what counts as an MP3, where output goes, up-front validation.

use std::path::{Path, PathBuf};

use super::error::{Error, Result};

/// Suffix inserted before the extension when no output path is given.
pub const OUTPUT_SUFFIX: &str = "_with_chapters";

pub fn is_mp3(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("mp3"))
        .unwrap_or(false)
}

/// Explicit output if given, else `<stem>_with_chapters.<ext>` next to the input.
pub fn resolve_output_path(input: &Path, output: Option<&Path>) -> PathBuf {
    if let Some(out) = output {
        return out.to_path_buf();
    }

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match input.extension() {
        Some(ext) => format!("{stem}{OUTPUT_SUFFIX}.{}", ext.to_string_lossy()),
        None => format!("{stem}{OUTPUT_SUFFIX}"),
    };
    input.with_file_name(file_name)
}

/// Check the command-line paths before any work is done.
///
/// - marker file and input must exist and be regular files
/// - input must be `.mp3`
/// - output, when given, must be `.mp3` too
pub fn validate_paths(markers: &Path, input: &Path, output: Option<&Path>) -> Result<()> {
    if !markers.is_file() {
        return Err(Error::Validation(format!(
            "CSV file '{}' not found",
            markers.display()
        )));
    }

    if !input.is_file() {
        return Err(Error::Validation(format!(
            "Input MP3 file '{}' not found",
            input.display()
        )));
    }

    if !is_mp3(input) {
        return Err(Error::Validation(format!(
            "Input file '{}' is not an MP3 file",
            input.display()
        )));
    }

    if let Some(out) = output {
        if !is_mp3(out) {
            return Err(Error::Validation(format!(
                "Output file '{}' does not have MP3 extension",
                out.display()
            )));
        }
    }

    Ok(())
}
