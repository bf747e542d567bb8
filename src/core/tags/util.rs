//! core/tags/util.rs
//! Small byte helpers shared by the frame codecs.

/// Big-endian u32 from exactly four bytes.
pub(crate) fn be_u32(bytes: &[u8]) -> Option<u32> {
    let b: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
    Some(u32::from_be_bytes(b))
}

/// Synchsafe integer (7 significant bits per byte), as used by ID3v2.4 sizes.
pub(crate) fn synchsafe_u32(bytes: &[u8]) -> Option<u32> {
    let b = bytes.get(..4)?;
    if b.iter().any(|&x| x & 0x80 != 0) {
        return None;
    }
    Some(b.iter().fold(0u32, |acc, &x| (acc << 7) | x as u32))
}

/// Split `data` at the first NUL: `(before, after)`. `None` if there is no NUL.
pub(crate) fn split_cstr(data: &[u8]) -> Option<(&[u8], &[u8])> {
    let end = data.iter().position(|&b| b == 0)?;
    Some((&data[..end], &data[end + 1..]))
}

/// Position of the first occurrence of `needle` in `haystack`.
pub(crate) fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Reverse ID3 unsynchronisation: every `FF 00` becomes `FF`.
pub(crate) fn resync(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut prev_ff = false;
    for &b in data {
        if prev_ff && b == 0 {
            prev_ff = false;
            continue;
        }
        out.push(b);
        prev_ff = b == 0xFF;
    }
    out
}

/// Decode an ID3 text payload body (encoding byte already removed).
///
/// Trailing NULs are dropped. Unknown encodings are read as UTF-8, lossily.
pub(crate) fn decode_text(encoding: u8, data: &[u8]) -> String {
    match encoding {
        0 => data.iter().map(|&b| b as char).collect::<String>(),
        1 => decode_utf16(data, None),
        2 => decode_utf16(data, Some(false)),
        _ => String::from_utf8_lossy(data).into_owned(),
    }
    .trim_end_matches('\0')
    .to_string()
}

/// `little`: `None` means "look for a BOM, default big-endian".
fn decode_utf16(data: &[u8], little: Option<bool>) -> String {
    let (data, little) = match (little, data) {
        (None, [0xFF, 0xFE, rest @ ..]) => (rest, true),
        (None, [0xFE, 0xFF, rest @ ..]) => (rest, false),
        (None, _) => (data, false),
        (Some(l), _) => (data, l),
    };

    let units = data.chunks_exact(2).map(|c| {
        if little {
            u16::from_le_bytes([c[0], c[1]])
        } else {
            u16::from_be_bytes([c[0], c[1]])
        }
    });
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}
