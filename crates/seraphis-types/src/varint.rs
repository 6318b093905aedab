//! LEB128 varint codec.

/// Encode a u64 value as varint.
pub fn encode_varint(value: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(10);
    write_varint(&mut buf, value);
    buf
}

/// Append a varint to `buf`.
pub fn write_varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            break;
        }
        buf.push(byte | 0x80);
    }
}

/// Decode a varint from `data` at `offset`.
/// Returns (value, bytes_read), or None on truncation, overflow, or a
/// non-canonical trailing zero byte.
pub fn decode_varint(data: &[u8], offset: usize) -> Option<(u64, usize)> {
    let mut value: u64 = 0;
    let mut shift: u32 = 0;
    let mut i = 0;
    loop {
        let byte = *data.get(offset + i)?;
        i += 1;
        let low = (byte & 0x7F) as u64;
        if shift == 63 && low > 1 {
            return None;
        }
        value |= low << shift;
        if byte & 0x80 == 0 {
            if byte == 0 && i > 1 {
                return None;
            }
            break;
        }
        shift += 7;
        if shift > 63 {
            return None;
        }
    }
    Some((value, i))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_roundtrip() {
        for val in [0u64, 1, 127, 128, 255, 256, 16383, 16384, u32::MAX as u64, u64::MAX] {
            let encoded = encode_varint(val);
            let (decoded, bytes_read) = decode_varint(&encoded, 0).unwrap();
            assert_eq!(decoded, val, "varint roundtrip failed for {val}");
            assert_eq!(bytes_read, encoded.len());
        }
    }

    #[test]
    fn test_varint_truncated() {
        let encoded = encode_varint(300);
        assert!(decode_varint(&encoded[..1], 0).is_none());
        assert!(decode_varint(&[], 0).is_none());
    }

    #[test]
    fn test_varint_rejects_overflow_and_padding() {
        let mut too_long = vec![0xFF; 10];
        too_long.push(0x01);
        assert!(decode_varint(&too_long, 0).is_none());
        assert!(decode_varint(&[0x80, 0x00], 0).is_none(), "padded zero must be rejected");
    }
}
