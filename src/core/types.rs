//! Core data types shared between the pipeline stages and the CLI report.
//!
//! Rule of thumb:
//! - These structs are plain bags of data
//! - No console code
//! - No filesystem code
//! - No byte-level tag code
//!
//! A conversion run lives only as long as one process: markers come in from
//! the marker table, chapter frames go out into the tag, and the read-side
//! `Chapter` list is rebuilt from the file for the verification report.

use std::path::PathBuf;
use std::time::Duration;

/// One named time-point from the marker table.
///
/// Order is the table's row order. Markers are never re-sorted on write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// Slot in the table's data rows, counting rows that were skipped.
    /// Chapter element ids are numbered from this, so they keep gaps.
    pub position: usize,
    pub name: String,
    pub start: Duration,
}

impl Marker {
    pub fn new(position: usize, name: impl Into<String>, start: Duration) -> Self {
        Self {
            position,
            name: name.into(),
            start,
        }
    }
}

/// A chapter as read back from a tag: title plus start time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// Empty when the chapter frame carries no TIT2 sub-frame.
    pub title: String,
    pub start: Duration,
}

/// Result of a successful write.
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    /// The file that now carries the chapters.
    pub output: PathBuf,

    /// Element ids of the chapter frames written, in marker order.
    pub element_ids: Vec<String>,
}
