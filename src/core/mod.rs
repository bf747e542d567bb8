//! core/mod.rs
//!
//! The brain of the tool:
//! - Read the marker export into ordered `Marker`s
//! - Write them to an MP3 as ID3v2 CHAP frames plus one CTOC frame
//! - Read chapters/TOC back for verification
//!
//! The pipeline stays explicit and modular:
//!   (A) validate paths -> (B) read markers -> (C) write chapters -> (D) read back
//!
//! Console output is the CLI's job; nothing in here prints.

pub mod confirm;
pub mod error;
pub mod library;
pub mod markers;
pub mod probe;
pub mod tags;
pub mod timecode;
pub mod types;

use std::time::Duration;

use types::Marker;

/// Markers that start at or after the end of the audio.
///
/// Players tend to drop such chapters, so the CLI warns about them.
pub fn markers_past_end(markers: &[Marker], audio_len: Duration) -> Vec<&Marker> {
    markers.iter().filter(|m| m.start >= audio_len).collect()
}
