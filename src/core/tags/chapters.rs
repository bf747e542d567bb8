//! core/tags/chapters.rs
//! Turn markers into CHAP frames plus one CTOC frame on an `id3::Tag`.
//!
//! - Old CHAP/CTOC frames are always removed first, so re-runs don't pile up
//! - Element ids are `chp<i>` where `i` is the marker's table position,
//!   counted *before* blank names were dropped (ids can have gaps)
//! - The CTOC lists the written chapters in marker order

use std::collections::HashSet;

use id3::frame::{Chapter as ChapterFrame, Content, Frame, Unknown};
use id3::{Tag, TagLike, Version};
use tracing::debug;

use super::toc::{MAX_CHILDREN, TOC_FRAME_ID, TocFrame};
use crate::core::error::{Error, Result};
use crate::core::types::Marker;

pub const CHAPTER_FRAME_ID: &str = "CHAP";

pub const TOC_ELEMENT_ID: &str = "toc";
pub const TOC_TITLE: &str = "Table of Contents";

/// "Not used" value for CHAP end time and byte offsets.
pub const IGNORED: u32 = u32::MAX;

pub fn element_id(index: usize) -> String {
    format!("chp{index}")
}

/// One CHAP frame: start time in ms, everything else ignored, title as TIT2.
pub fn chapter_frame(element_id: String, marker: &Marker) -> Result<ChapterFrame> {
    let start_time = u32::try_from(marker.start.as_millis()).map_err(|_| {
        Error::Format(format!(
            "Start time of '{}' does not fit in a chapter frame",
            marker.name
        ))
    })?;

    Ok(ChapterFrame {
        element_id,
        start_time,
        end_time: IGNORED,
        start_offset: IGNORED,
        end_offset: IGNORED,
        frames: vec![Frame::text("TIT2", marker.name.clone())],
    })
}

/// The top-level, ordered table of contents over `child_ids`.
pub fn toc_frame(child_ids: Vec<String>) -> TocFrame {
    TocFrame {
        element_id: TOC_ELEMENT_ID.to_string(),
        top_level: true,
        ordered: true,
        child_ids,
        title: Some(TOC_TITLE.to_string()),
    }
}

/// Wrap our own CTOC body as an opaque frame so the tag writes it verbatim.
pub(crate) fn toc_to_id3(toc: &TocFrame) -> Result<Frame> {
    let data = toc.to_bytes()?;
    Ok(Frame::with_content(
        TOC_FRAME_ID,
        Content::Unknown(Unknown {
            data,
            version: Version::Id3v24,
        }),
    ))
}

/// Replace all chapter/TOC frames in `tag` with ones built from `markers`.
///
/// Returns the element ids written. Everything that can fail is checked
/// before the tag is touched. With no usable markers the tag simply ends up
/// without chapters.
pub fn apply_chapters(tag: &mut Tag, markers: &[Marker]) -> Result<Vec<String>> {
    let kept: Vec<&Marker> = markers
        .iter()
        .filter(|m| !m.name.trim().is_empty())
        .collect();

    if kept.len() > MAX_CHILDREN {
        return Err(Error::TooManyChildren(kept.len()));
    }

    let mut seen = HashSet::with_capacity(kept.len());
    let mut chapters = Vec::with_capacity(kept.len());
    let mut child_ids = Vec::with_capacity(kept.len());
    for marker in kept {
        if !seen.insert(marker.position) {
            return Err(Error::Format(format!(
                "Two markers share position {} ('{}')",
                marker.position, marker.name
            )));
        }
        let id = element_id(marker.position);
        chapters.push(chapter_frame(id.clone(), marker)?);
        child_ids.push(id);
    }

    let toc = if child_ids.is_empty() {
        None
    } else {
        Some(toc_to_id3(&toc_frame(child_ids.clone()))?)
    };

    let removed = tag.remove(CHAPTER_FRAME_ID).len() + tag.remove(TOC_FRAME_ID).len();
    debug!(removed, "cleared existing chapter frames");

    for chapter in chapters {
        tag.add_frame(chapter);
    }

    if let Some(toc) = toc {
        tag.add_frame(toc);
    }
    debug!(chapters = child_ids.len(), "chapter frames added");

    Ok(child_ids)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;

    fn markers(names: &[&str]) -> Vec<Marker> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| Marker::new(i, *n, Duration::from_secs(i as u64 * 60)))
            .collect()
    }

    fn ids_of(tag: &Tag, id: &str) -> Vec<String> {
        tag.frames()
            .filter(|f| f.id() == id)
            .filter_map(|f| match f.content() {
                Content::Chapter(c) => Some(c.element_id.clone()),
                Content::Unknown(u) => TocFrame::from_bytes(&u.data).ok().map(|t| t.element_id),
                Content::TableOfContents(t) => Some(t.element_id.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn blank_names_leave_gaps_in_ids() {
        let mut tag = Tag::new();
        let ids = apply_chapters(&mut tag, &markers(&["Intro", "Main", "  ", "Outro"])).unwrap();

        assert_eq!(ids, vec!["chp0", "chp1", "chp3"]);
        assert_eq!(ids_of(&tag, CHAPTER_FRAME_ID), ids);
        assert_eq!(ids_of(&tag, TOC_FRAME_ID), vec!["toc"]);
    }

    #[test]
    fn chapter_frame_fields() {
        let marker = Marker::new(7, "Main", Duration::from_millis(90_500));
        let chap = chapter_frame("chp7".to_string(), &marker).unwrap();

        assert_eq!(chap.element_id, "chp7");
        assert_eq!(chap.start_time, 90_500);
        assert_eq!(chap.end_time, IGNORED);
        assert_eq!(chap.start_offset, IGNORED);
        assert_eq!(chap.end_offset, IGNORED);
        assert_eq!(chap.frames.len(), 1);
        assert_eq!(chap.frames[0].id(), "TIT2");
        assert_eq!(chap.frames[0].content().text(), Some("Main"));
    }

    #[test]
    fn toc_body_is_our_encoding() {
        let mut tag = Tag::new();
        apply_chapters(&mut tag, &markers(&["a", "b"])).unwrap();

        let body = tag
            .frames()
            .find(|f| f.id() == TOC_FRAME_ID)
            .and_then(|f| match f.content() {
                Content::Unknown(u) => Some(u.data.clone()),
                _ => None,
            })
            .unwrap();
        let toc = TocFrame::from_bytes(&body).unwrap();

        assert_eq!(toc, toc_frame(vec!["chp0".to_string(), "chp1".to_string()]));
    }

    #[test]
    fn reapplying_replaces_instead_of_duplicating() {
        let mut tag = Tag::new();
        tag.set_title("Episode 1");
        apply_chapters(&mut tag, &markers(&["a", "b", "c"])).unwrap();
        apply_chapters(&mut tag, &markers(&["x", "y"])).unwrap();

        assert_eq!(ids_of(&tag, CHAPTER_FRAME_ID), vec!["chp0", "chp1"]);
        assert_eq!(ids_of(&tag, TOC_FRAME_ID).len(), 1);
        assert_eq!(tag.title(), Some("Episode 1"));
    }

    #[test]
    fn no_usable_markers_clears_chapters() {
        let mut tag = Tag::new();
        apply_chapters(&mut tag, &markers(&["a"])).unwrap();
        let ids = apply_chapters(&mut tag, &markers(&["", " "])).unwrap();

        assert!(ids.is_empty());
        assert_eq!(tag.frames().count(), 0);
    }

    #[test]
    fn duplicate_positions_are_rejected() {
        let mut tag = Tag::new();
        let twice = vec![
            Marker::new(4, "a", Duration::ZERO),
            Marker::new(4, "b", Duration::from_secs(1)),
        ];
        let err = apply_chapters(&mut tag, &twice).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
        assert_eq!(tag.frames().count(), 0);
    }

    #[test]
    fn too_many_markers_leave_tag_untouched() {
        let mut tag = Tag::new();
        apply_chapters(&mut tag, &markers(&["keep"])).unwrap();

        let names: Vec<String> = (0..300).map(|i| format!("m{i}")).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let err = apply_chapters(&mut tag, &markers(&names)).unwrap_err();

        assert!(matches!(err, Error::TooManyChildren(300)));
        assert_eq!(ids_of(&tag, CHAPTER_FRAME_ID), vec!["chp0"]);
    }
}
