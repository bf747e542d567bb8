//! core/tags/mod.rs
//!
//! ID3v2 chapter/TOC utilities.
//! Public API:
//! - [`write_chapters`] replaces a file's chapters with ones built from markers.
//! - [`read_chapters`] reads chapters back, sorted by start time.
//! - [`read_toc`] decodes the first CTOC frame with our own codec.
//! - [`TocFrame`] is the CTOC body codec itself.

mod chapters;
mod raw;
mod read;
mod toc;
mod util;
mod write;

pub use chapters::{
    CHAPTER_FRAME_ID, IGNORED, TOC_ELEMENT_ID, TOC_TITLE, apply_chapters, chapter_frame,
    element_id, toc_frame,
};
pub use raw::read_frame_bodies;
pub use read::{read_chapters, read_toc};
pub use toc::{MAX_CHILDREN, TITLE_FRAME_ID, TOC_FRAME_ID, TocFrame};
pub use write::write_chapters;
