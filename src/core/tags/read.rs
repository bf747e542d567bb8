//! core/tags/read.rs
//! Read chapters and the table of contents back out of a file.
//!
//! - Chapters come from the `id3` crate's decoded CHAP frames
//! - The TOC comes from the raw CTOC body, decoded by our own codec
//! - A file with no tag at all simply has no chapters

use std::path::Path;
use std::time::Duration;

use id3::frame::Content;
use id3::{ErrorKind, Tag};

use super::chapters::CHAPTER_FRAME_ID;
use super::raw::read_frame_bodies;
use super::toc::{TOC_FRAME_ID, TocFrame};
use crate::core::error::{Error, Result};
use crate::core::types::Chapter;

/// All chapters in the file, sorted by start time.
///
/// On-disk order doesn't matter; equal start times keep their tag order.
pub fn read_chapters(path: &Path) -> Result<Vec<Chapter>> {
    let tag = match Tag::read_from_path(path) {
        Ok(tag) => tag,
        Err(e) if matches!(e.kind, ErrorKind::NoTag) => return Ok(Vec::new()),
        Err(e) => return Err(Error::tag(path, e)),
    };

    let mut chapters = chapters_from_tag(&tag);
    chapters.sort_by_key(|c| c.start);
    Ok(chapters)
}

fn chapters_from_tag(tag: &Tag) -> Vec<Chapter> {
    tag.frames()
        .filter(|f| f.id() == CHAPTER_FRAME_ID)
        .filter_map(|f| match f.content() {
            Content::Chapter(c) => Some(c),
            _ => None,
        })
        .map(|c| Chapter {
            title: c
                .frames
                .iter()
                .find(|sub| sub.id() == "TIT2")
                .and_then(|sub| sub.content().text())
                .unwrap_or_default()
                .to_string(),
            start: Duration::from_millis(u64::from(c.start_time)),
        })
        .collect()
}

/// The first CTOC frame in the file. Later CTOC frames are ignored.
///
/// `Error::NoTableOfContents` when there is none, `Error::Parse` when the
/// body is malformed.
pub fn read_toc(path: &Path) -> Result<TocFrame> {
    let body = read_frame_bodies(path, TOC_FRAME_ID)?
        .into_iter()
        .next()
        .ok_or(Error::NoTableOfContents)?;
    TocFrame::from_bytes(&body)
}

#[cfg(test)]
mod tests {
    use id3::frame::Chapter as ChapterFrame;
    use id3::frame::Frame;
    use id3::{TagLike, Version};
    use pretty_assertions::assert_eq;

    use super::*;

    fn chap(id: &str, start: u32, title: Option<&str>) -> ChapterFrame {
        ChapterFrame {
            element_id: id.to_string(),
            start_time: start,
            end_time: start + 1,
            start_offset: u32::MAX,
            end_offset: u32::MAX,
            frames: title.map(|t| Frame::text("TIT2", t)).into_iter().collect(),
        }
    }

    #[test]
    fn chapters_come_back_sorted_with_empty_titles_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.mp3");
        std::fs::write(&path, b"audio").unwrap();

        let mut tag = Tag::new();
        tag.add_frame(chap("late", 5_000, Some("Late")));
        tag.add_frame(chap("early", 1_000, None));
        tag.add_frame(chap("mid", 2_500, Some("Mid")));
        tag.write_to_path(&path, Version::Id3v24).unwrap();

        let chapters = read_chapters(&path).unwrap();
        assert_eq!(
            chapters,
            vec![
                Chapter { title: String::new(), start: Duration::from_millis(1_000) },
                Chapter { title: "Mid".to_string(), start: Duration::from_millis(2_500) },
                Chapter { title: "Late".to_string(), start: Duration::from_millis(5_000) },
            ]
        );
    }

    /// A v2.3 tag holding the given frames, followed by some audio bytes.
    fn v23_file(frames: &[(&[u8; 4], Vec<u8>)]) -> Vec<u8> {
        let mut body = Vec::new();
        for (id, data) in frames {
            body.extend_from_slice(*id);
            body.extend_from_slice(&(data.len() as u32).to_be_bytes());
            body.extend_from_slice(&[0, 0]);
            body.extend_from_slice(data);
        }
        let n = body.len() as u32;
        let mut file = b"ID3\x03\x00\x00".to_vec();
        file.extend_from_slice(&[
            (n >> 21) as u8 & 0x7F,
            (n >> 14) as u8 & 0x7F,
            (n >> 7) as u8 & 0x7F,
            n as u8 & 0x7F,
        ]);
        file.extend_from_slice(&body);
        file.extend_from_slice(b"audio");
        file
    }

    #[test]
    fn first_of_several_tocs_is_returned() {
        let first = TocFrame {
            element_id: "toc".to_string(),
            top_level: true,
            ordered: true,
            child_ids: vec!["chp0".to_string(), "chp2".to_string()],
            title: Some("Main".to_string()),
        };
        let second = TocFrame {
            element_id: "sub".to_string(),
            top_level: false,
            ordered: false,
            child_ids: vec!["chp9".to_string()],
            title: None,
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two.mp3");
        let file = v23_file(&[
            (b"TIT2", b"\x03Episode".to_vec()),
            (b"CTOC", first.to_bytes().unwrap()),
            (b"CTOC", second.to_bytes().unwrap()),
        ]);
        std::fs::write(&path, file).unwrap();

        assert_eq!(read_toc(&path).unwrap(), first);
    }

    #[test]
    fn untagged_file_has_no_chapters_and_no_toc() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.mp3");
        std::fs::write(&path, b"audio").unwrap();

        assert!(read_chapters(&path).unwrap().is_empty());
        assert!(matches!(read_toc(&path), Err(Error::NoTableOfContents)));
    }
}
