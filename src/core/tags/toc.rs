//! core/tags/toc.rs
//! Table-of-contents (CTOC) frame body codec.
//!
//! Body layout, byte-exact:
//!
//! ```text
//! element id bytes, 0x00
//! flags          1 byte   bit0 = top level, bit1 = ordered
//! entry count    1 byte   number of child ids (so at most 255)
//! child ids      each: id bytes, 0x00
//! [title]        "TIT2" | size (u32 BE) | 0x00 0x00 | encoding (3 = UTF-8) | text
//! ```
//!
//! The `id3` crate owns the outer frame header; this module only deals with
//! the body, which is handed to the tag as an opaque frame.

use std::io::{self, Write};

use super::util::{be_u32, decode_text, find_bytes, split_cstr, synchsafe_u32};
use crate::core::error::{Error, Result};

/// Frame id of the table-of-contents frame.
pub const TOC_FRAME_ID: &str = "CTOC";

/// Frame id of the title sub-frame.
pub const TITLE_FRAME_ID: &[u8; 4] = b"TIT2";

/// Largest child list a single count byte can describe.
pub const MAX_CHILDREN: usize = u8::MAX as usize;

const FLAG_TOP_LEVEL: u8 = 0b01;
const FLAG_ORDERED: u8 = 0b10;

const ENCODING_UTF8: u8 = 3;

/// Sub-frame header: 4-byte id, 4-byte size, 2-byte flags.
const SUBFRAME_HEADER_LEN: usize = 10;

/// Fallback scan reads at most this many bytes for encodings it can't delimit.
const FALLBACK_TITLE_CAP: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocFrame {
    pub element_id: String,
    pub top_level: bool,
    pub ordered: bool,
    pub child_ids: Vec<String>,
    /// `None` means no TIT2 sub-frame.
    pub title: Option<String>,
}

impl TocFrame {
    pub fn flags(&self) -> u8 {
        let mut flags = 0;
        if self.top_level {
            flags |= FLAG_TOP_LEVEL;
        }
        if self.ordered {
            flags |= FLAG_ORDERED;
        }
        flags
    }

    /// Size of the serialized body in bytes.
    pub fn encoded_len(&self) -> usize {
        let mut size = self.element_id.len() + 1;
        size += 1; // flags
        size += 1; // entry count
        size += self.child_ids.iter().map(|id| id.len() + 1).sum::<usize>();
        if let Some(title) = &self.title {
            size += SUBFRAME_HEADER_LEN + title_payload_len(title);
        }
        size
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.check()?;
        let mut out = Vec::with_capacity(self.encoded_len());
        self.write_to(&mut out).map_err(|e| {
            Error::Format(format!("Failed to encode CTOC frame '{}': {e}", self.element_id))
        })?;
        Ok(out)
    }

    /// Write the body to `w`; returns the number of bytes written.
    ///
    /// Fails before writing anything when the child list does not fit the
    /// count byte or an id contains a NUL.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<usize> {
        let count = self
            .check()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

        w.write_all(self.element_id.as_bytes())?;
        w.write_all(&[0, self.flags(), count])?;
        for id in &self.child_ids {
            w.write_all(id.as_bytes())?;
            w.write_all(&[0])?;
        }

        if let Some(title) = &self.title {
            let size = title_payload_len(title) as u32;
            w.write_all(TITLE_FRAME_ID)?;
            w.write_all(&size.to_be_bytes())?;
            w.write_all(&[0, 0])?;
            w.write_all(&[ENCODING_UTF8])?;
            w.write_all(title.as_bytes())?;
        }

        Ok(self.encoded_len())
    }

    /// Entry count byte, or why this frame can't be encoded.
    fn check(&self) -> Result<u8> {
        let count = u8::try_from(self.child_ids.len())
            .map_err(|_| Error::TooManyChildren(self.child_ids.len()))?;

        let ids = std::iter::once(&self.element_id).chain(&self.child_ids);
        for id in ids {
            if id.as_bytes().contains(&0) {
                return Err(Error::Format(format!(
                    "element id {id:?} contains a NUL byte"
                )));
            }
        }

        Ok(count)
    }

    /// Parse a CTOC body.
    ///
    /// Hard failures are limited to a header that can't be read at all.
    /// A child list that runs out early is kept as far as it goes, and a
    /// missing title is `None`.
    pub fn from_bytes(data: &[u8]) -> Result<TocFrame> {
        if data.len() < 3 {
            return Err(Error::Parse(format!(
                "need at least 3 bytes, got {}",
                data.len()
            )));
        }

        let (element_id, rest) = split_cstr(data)
            .ok_or_else(|| Error::Parse("element id is not NUL-terminated".to_string()))?;

        let [flags, count, rest @ ..] = rest else {
            return Err(Error::Parse(
                "truncated before flags and entry count".to_string(),
            ));
        };

        let count = *count as usize;
        let mut child_ids = Vec::with_capacity(count);
        let mut rest = rest;
        while child_ids.len() < count {
            let Some((child, after)) = split_cstr(rest) else {
                break;
            };
            child_ids.push(String::from_utf8_lossy(child).into_owned());
            rest = after;
        }

        Ok(TocFrame {
            element_id: String::from_utf8_lossy(element_id).into_owned(),
            top_level: flags & FLAG_TOP_LEVEL != 0,
            ordered: flags & FLAG_ORDERED != 0,
            child_ids,
            title: read_title(rest),
        })
    }
}

fn title_payload_len(title: &str) -> usize {
    1 + title.len()
}

enum SubFrames {
    Title(String),
    NoTitle,
    Unreadable,
}

/// Title from whatever follows the child ids: a proper sub-frame walk first,
/// then a raw scan for "TIT2" when the walk can't make sense of the bytes.
fn read_title(data: &[u8]) -> Option<String> {
    match walk_subframes(data) {
        SubFrames::Title(title) => Some(title),
        SubFrames::NoTitle => None,
        SubFrames::Unreadable => scan_for_title(data),
    }
}

fn walk_subframes(mut data: &[u8]) -> SubFrames {
    while !data.is_empty() {
        // Zero padding ends the list.
        if data.iter().all(|&b| b == 0) {
            break;
        }
        if data.len() < SUBFRAME_HEADER_LEN {
            return SubFrames::Unreadable;
        }

        let id = &data[..4];
        if !id.iter().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()) {
            return SubFrames::Unreadable;
        }

        let available = data.len() - SUBFRAME_HEADER_LEN;
        let size = [be_u32(&data[4..8]), synchsafe_u32(&data[4..8])]
            .into_iter()
            .flatten()
            .map(|s| s as usize)
            .find(|&s| s <= available);
        let Some(size) = size else {
            return SubFrames::Unreadable;
        };

        let body = &data[SUBFRAME_HEADER_LEN..SUBFRAME_HEADER_LEN + size];
        if id == TITLE_FRAME_ID {
            return SubFrames::Title(match body {
                [encoding, text @ ..] => decode_text(*encoding, text),
                [] => String::new(),
            });
        }
        data = &data[SUBFRAME_HEADER_LEN + size..];
    }
    SubFrames::NoTitle
}

/// Find the literal "TIT2", jump over a 10-byte sub-frame header, then read
/// an encoding byte and text up to a NUL. Encodings other than Latin-1 and
/// UTF-8 are capped at 50 bytes.
fn scan_for_title(data: &[u8]) -> Option<String> {
    let at = find_bytes(data, TITLE_FRAME_ID)?;
    let text_pos = at + SUBFRAME_HEADER_LEN;
    let &encoding = data.get(text_pos)?;

    let body = &data[text_pos + 1..];
    let body = match encoding {
        0 | ENCODING_UTF8 => body,
        _ => &body[..body.len().min(FALLBACK_TITLE_CAP)],
    };
    let end = body.iter().position(|&b| b == 0).unwrap_or(body.len());
    let text = &body[..end];

    Some(match encoding {
        0 => text.iter().map(|&b| b as char).collect(),
        _ => String::from_utf8_lossy(text).into_owned(),
    })
}
