use super::CodecError;

/// Wire limit for an encoded name, length octets included.
const MAX_NAME_WIRE_LEN: usize = 255;
const MAX_LABEL_LEN: usize = 63;
const MAX_POINTER_HOPS: usize = 32;

/// Reads a possibly compressed name starting at `start`.
///
/// Returns the lowercased dotted name without trailing dot (root is `""`) and
/// the offset just past the name in the original record stream. Pointers must
/// target an earlier offset, which rules out forward loops; the hop cap
/// bounds the rest.
pub fn read_name(buf: &[u8], start: usize) -> Result<(String, usize), CodecError> {
    let mut name = String::new();
    let mut pos = start;
    let mut end: Option<usize> = None;
    let mut wire_len = 1usize;
    let mut hops = 0usize;

    loop {
        let len_byte = *buf.get(pos).ok_or(CodecError::Truncated(pos))?;

        match len_byte & 0xC0 {
            0x00 => {
                let label_len = len_byte as usize;
                if label_len == 0 {
                    return Ok((name, end.unwrap_or(pos + 1)));
                }
                if label_len > MAX_LABEL_LEN {
                    return Err(CodecError::LabelTooLong(label_len));
                }
                wire_len += label_len + 1;
                if wire_len > MAX_NAME_WIRE_LEN {
                    return Err(CodecError::NameTooLong);
                }
                let label = buf
                    .get(pos + 1..pos + 1 + label_len)
                    .ok_or(CodecError::Truncated(pos + 1))?;
                if !name.is_empty() {
                    name.push('.');
                }
                for &b in label {
                    if !b.is_ascii_graphic() || b == b'.' {
                        return Err(CodecError::InvalidLabel);
                    }
                    name.push(b.to_ascii_lowercase() as char);
                }
                pos += 1 + label_len;
            }
            0xC0 => {
                let low = *buf.get(pos + 1).ok_or(CodecError::Truncated(pos + 1))?;
                let target = (((len_byte & 0x3F) as usize) << 8) | low as usize;
                if target >= pos {
                    return Err(CodecError::BadPointer(pos));
                }
                hops += 1;
                if hops > MAX_POINTER_HOPS {
                    return Err(CodecError::PointerLoop);
                }
                end.get_or_insert(pos + 2);
                pos = target;
            }
            other => return Err(CodecError::ReservedLabelType(other)),
        }
    }
}

/// Skips a name without decoding it. Returns the offset just past it.
pub fn skip_name(buf: &[u8], start: usize) -> Result<usize, CodecError> {
    let mut pos = start;
    loop {
        let len_byte = *buf.get(pos).ok_or(CodecError::Truncated(pos))?;
        match len_byte & 0xC0 {
            0x00 if len_byte == 0 => return Ok(pos + 1),
            0x00 => {
                pos += 1 + len_byte as usize;
                if pos > buf.len() {
                    return Err(CodecError::Truncated(buf.len()));
                }
            }
            0xC0 => {
                if pos + 2 > buf.len() {
                    return Err(CodecError::Truncated(pos + 1));
                }
                return Ok(pos + 2);
            }
            other => return Err(CodecError::ReservedLabelType(other)),
        }
    }
}
