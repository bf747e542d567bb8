//! marker2chap
//!
//! Turns an audio editor's marker export (a tab-delimited table of named
//! time-points) into ID3v2 chapter navigation: one CHAP frame per marker and
//! a CTOC frame listing them, written into an MP3's tag.
//!
//! The binary in `main.rs` is a thin CLI around [`core`].

pub mod core;
