//! core/tags/raw.rs
//! Pull raw frame bodies straight out of a file's ID3v2 tag.
//!
//! The `id3` crate decodes CTOC into its own structure. To run our own CTOC
//! decoder we need the body bytes exactly as stored, so this walks the tag
//! header and frame table itself.
//!
//! Supported:
//! - v2.3 and v2.4 frame headers (v2.2 has no CTOC)
//! - extended header (skipped)
//! - tag-level unsynchronisation (v2.3) and per-frame unsync (v2.4)
//! - v2.4 data-length indicator
//!
//! Compressed or encrypted frames are skipped.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use tracing::debug;

use super::util::{be_u32, resync, synchsafe_u32};
use crate::core::error::{Error, Result};

const HEADER_LEN: usize = 10;
const FRAME_HEADER_LEN: usize = 10;

const TAG_FLAG_UNSYNC: u8 = 0x80;
const TAG_FLAG_EXTENDED: u8 = 0x40;

// v2.4 frame format flags (second flag byte)
const V24_GROUPING: u8 = 0x40;
const V24_COMPRESSED: u8 = 0x08;
const V24_ENCRYPTED: u8 = 0x04;
const V24_UNSYNC: u8 = 0x02;
const V24_DATA_LENGTH: u8 = 0x01;

// v2.3 frame format flags (second flag byte)
const V23_COMPRESSED: u8 = 0x80;
const V23_ENCRYPTED: u8 = 0x40;
const V23_GROUPING: u8 = 0x20;

/// Bodies of every frame with id `id`, in tag order. A file without an
/// ID3v2 tag yields an empty list.
pub fn read_frame_bodies(path: &Path, id: &str) -> Result<Vec<Vec<u8>>> {
    let mut file = File::open(path).map_err(|e| Error::io("Cannot open", path, e))?;

    let mut header = [0u8; HEADER_LEN];
    match file.read_exact(&mut header) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(Vec::new()),
        Err(e) => return Err(Error::io("Failed to read tag header from", path, e)),
    }
    if &header[..3] != b"ID3" {
        return Ok(Vec::new());
    }

    let size = synchsafe_u32(&header[6..10])
        .ok_or_else(|| Error::Parse("ID3v2 tag size is not synchsafe".to_string()))?;
    let mut body = vec![0u8; size as usize];
    file.read_exact(&mut body)
        .map_err(|e| Error::io("Failed to read tag from", path, e))?;

    frame_bodies(header[3], header[5], &body, id)
}

/// Walk a tag body (everything after the 10-byte header).
pub(crate) fn frame_bodies(major: u8, flags: u8, body: &[u8], id: &str) -> Result<Vec<Vec<u8>>> {
    if !(3..=4).contains(&major) {
        debug!(major, "ID3v2 version without CTOC support");
        return Ok(Vec::new());
    }
    let v24 = major == 4;
    let tag_unsync = flags & TAG_FLAG_UNSYNC != 0;

    let owned;
    let mut data = body;
    if tag_unsync && !v24 {
        owned = resync(body);
        data = &owned;
    }

    let mut pos = 0;
    if flags & TAG_FLAG_EXTENDED != 0 {
        pos = extended_header_len(data, v24)?;
    }

    let mut out = Vec::new();
    while pos + FRAME_HEADER_LEN <= data.len() {
        let header = &data[pos..pos + FRAME_HEADER_LEN];
        if header[0] == 0 {
            break; // padding
        }

        let size = if v24 {
            synchsafe_u32(&header[4..8]).or_else(|| be_u32(&header[4..8]))
        } else {
            be_u32(&header[4..8])
        }
        .unwrap_or(0) as usize;

        let start = pos + FRAME_HEADER_LEN;
        let Some(frame) = data.get(start..start + size) else {
            debug!(at = pos, size, "frame runs past end of tag");
            break;
        };
        pos = start + size;

        if &header[..4] != id.as_bytes() {
            continue;
        }

        let format = header[9];
        let frame = if v24 {
            v24_body(frame, format, tag_unsync)
        } else {
            v23_body(frame, format)
        };
        match frame {
            Some(frame) => out.push(frame),
            None => debug!(id, format, "skipping compressed or encrypted frame"),
        }
    }

    Ok(out)
}

fn extended_header_len(data: &[u8], v24: bool) -> Result<usize> {
    let len = if v24 {
        // v2.4 counts the size field itself.
        synchsafe_u32(data).map(|n| n as usize)
    } else {
        be_u32(data).map(|n| n as usize + 4)
    };
    match len {
        Some(len) if len <= data.len() => Ok(len),
        _ => Err(Error::Parse("extended header is truncated".to_string())),
    }
}

fn v24_body(frame: &[u8], format: u8, tag_unsync: bool) -> Option<Vec<u8>> {
    if format & (V24_COMPRESSED | V24_ENCRYPTED) != 0 {
        return None;
    }
    let mut frame = frame;
    if format & V24_GROUPING != 0 {
        frame = frame.get(1..)?;
    }
    if format & V24_DATA_LENGTH != 0 {
        frame = frame.get(4..)?;
    }
    if tag_unsync || format & V24_UNSYNC != 0 {
        Some(resync(frame))
    } else {
        Some(frame.to_vec())
    }
}

fn v23_body(frame: &[u8], format: u8) -> Option<Vec<u8>> {
    if format & (V23_COMPRESSED | V23_ENCRYPTED) != 0 {
        return None;
    }
    if format & V23_GROUPING != 0 {
        return frame.get(1..).map(<[u8]>::to_vec);
    }
    Some(frame.to_vec())
}
