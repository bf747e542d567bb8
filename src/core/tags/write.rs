//! core/tags/write.rs
//! Write chapters to disk: in place, or to a new file via temp copy + rename.
//!
//! Semantics:
//! - Same input and output path => confirm, then modify the file directly
//! - Different output path => create parent dirs, confirm if it already
//!   exists, copy input to `<output>.tmp`, tag the copy, rename over output
//! - Any failure after the temp file exists removes it again

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use id3::{ErrorKind, Tag, Version};
use tempfile::TempPath;
use tracing::{debug, info};

use super::chapters::apply_chapters;
use crate::core::confirm::{Confirm, require};
use crate::core::error::{Error, Result};
use crate::core::library::resolve_output_path;
use crate::core::types::{Marker, WriteOutcome};

/// Add `markers` as chapters to `input`, writing to `output` (or the derived
/// `_with_chapters` sibling when `None`).
pub fn write_chapters(
    input: &Path,
    markers: &[Marker],
    output: Option<&Path>,
    confirm: &mut dyn Confirm,
) -> Result<WriteOutcome> {
    let output = resolve_output_path(input, output);

    let element_ids = if same_file(input, &output) {
        write_in_place(input, markers, confirm)?
    } else {
        write_to_new_file(input, markers, &output, confirm)?
    };

    info!(output = %output.display(), chapters = element_ids.len(), "chapters written");
    Ok(WriteOutcome {
        output,
        element_ids,
    })
}

fn write_in_place(path: &Path, markers: &[Marker], confirm: &mut dyn Confirm) -> Result<Vec<String>> {
    require(
        confirm,
        &format!("This will modify the original file '{}'. Continue?", path.display()),
    )?;

    tag_file(path, markers)
}

fn write_to_new_file(
    input: &Path,
    markers: &[Marker],
    output: &Path,
    confirm: &mut dyn Confirm,
) -> Result<Vec<String>> {
    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .map_err(|e| Error::io("Failed to create output directory", dir, e))?;
    }

    if output.exists() {
        require(
            confirm,
            &format!("File '{}' already exists. Overwrite?", output.display()),
        )?;
    }

    // Removed on drop unless persisted.
    let temp_path = temp_sibling(output);
    let temp = TempPath::try_from_path(&temp_path)
        .map_err(|e| Error::io("Failed to prepare temp file", temp_path, e))?;
    debug!(temp = %temp.display(), "copying input to temp file");
    fs::copy(input, &temp).map_err(|e| Error::io("Failed to copy input to", temp.to_path_buf(), e))?;

    let element_ids = tag_file(&temp, markers)?;

    temp.persist(output)
        .map_err(|e| Error::io("Failed to create final file", output, e.error))?;

    Ok(element_ids)
}

/// Open the tag (or start an empty one), replace chapters, save as ID3v2.4.
fn tag_file(path: &Path, markers: &[Marker]) -> Result<Vec<String>> {
    let mut tag = match Tag::read_from_path(path) {
        Ok(tag) => tag,
        Err(e) if matches!(e.kind, ErrorKind::NoTag) => {
            debug!(path = %path.display(), "no existing tag, starting fresh");
            Tag::new()
        }
        Err(e) => return Err(Error::tag(path, e)),
    };

    let element_ids = apply_chapters(&mut tag, markers)?;

    tag.write_to_path(path, Version::Id3v24)
        .map_err(|e| Error::tag(path, e))?;

    Ok(element_ids)
}

fn temp_sibling(output: &Path) -> PathBuf {
    let mut name = OsString::from(output.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::confirm::AssumeYes;

    #[test]
    fn temp_file_sits_next_to_output() {
        assert_eq!(
            temp_sibling(Path::new("out/ep1.mp3")),
            PathBuf::from("out/ep1.mp3.tmp")
        );
    }

    #[test]
    fn temp_copy_is_cleaned_up_when_tagging_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp3");
        let output = dir.path().join("out.mp3");
        std::fs::write(&input, b"audio").unwrap();
        let too_late = [Marker::new(0, "Late", std::time::Duration::from_secs(u64::from(u32::MAX)))];

        let err = write_to_new_file(&input, &too_late, &output, &mut AssumeYes).unwrap_err();

        assert!(matches!(err, Error::Format(_)), "{err:?}");
        assert!(!temp_sibling(&output).exists());
        assert!(!output.exists());
    }

    #[test]
    fn temp_copy_is_renamed_over_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp3");
        let output = dir.path().join("out.mp3");
        std::fs::write(&input, b"audio").unwrap();
        let markers = [Marker::new(0, "Intro", std::time::Duration::ZERO)];

        let ids = write_to_new_file(&input, &markers, &output, &mut AssumeYes).unwrap();

        assert_eq!(ids, vec!["chp0"]);
        assert!(output.exists());
        assert!(!temp_sibling(&output).exists());
    }

    #[test]
    fn same_file_sees_through_relative_segments() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.mp3");
        std::fs::write(&a, b"x").unwrap();

        assert!(same_file(&a, &dir.path().join(".").join("a.mp3")));
        assert!(!same_file(&a, &dir.path().join("b.mp3")));
    }
}
