//! Modified UTF-8 as used by descriptor strings
//!
//! Characters are UTF-16 code units. `U+0001..=U+007F` take one byte,
//! `U+0000` and `U+0080..=U+07FF` take two, everything else three.
//! Supplementary characters appear as two three-byte surrogates.

/// Decode a modified UTF-8 byte run.
///
/// On failure returns the offset, relative to `bytes`, of the offending byte.
pub fn decode(bytes: &[u8]) -> Result<String, usize> {
    let ascii_len = bytes.iter().take_while(|b| **b < 0x80).count();
    if ascii_len == bytes.len() {
        return Ok(bytes.iter().map(|b| char::from(*b)).collect());
    }

    let mut units: Vec<u16> = bytes[..ascii_len].iter().map(|b| u16::from(*b)).collect();
    let mut i = ascii_len;
    while i < bytes.len() {
        let lead = bytes[i];
        match lead >> 4 {
            0..=7 => {
                units.push(u16::from(lead));
                i += 1;
            }
            12 | 13 => {
                let second = continuation(bytes, i + 1)?;
                units.push((u16::from(lead & 0x1F) << 6) | second);
                i += 2;
            }
            14 => {
                let second = continuation(bytes, i + 1)?;
                let third = continuation(bytes, i + 2)?;
                units.push((u16::from(lead & 0x0F) << 12) | (second << 6) | third);
                i += 3;
            }
            _ => return Err(i),
        }
    }

    String::from_utf16(&units).map_err(|_| ascii_len)
}

fn continuation(bytes: &[u8], at: usize) -> Result<u16, usize> {
    match bytes.get(at) {
        Some(b) if b & 0xC0 == 0x80 => Ok(u16::from(b & 0x3F)),
        _ => Err(at),
    }
}

/// Encode a string as modified UTF-8
pub fn encode(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for unit in s.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_fast_path() {
        assert_eq!(decode(b"implMethodName").unwrap(), "implMethodName");
        assert_eq!(decode(b"").unwrap(), "");
    }

    #[test]
    fn test_two_and_three_byte_sequences() {
        // "é" is 2 bytes, "€" is 3 bytes, after an ASCII prefix
        assert_eq!(decode(&[b'a', 0xC3, 0xA9, 0xE2, 0x82, 0xAC]).unwrap(), "aé€");
    }

    #[test]
    fn test_encoded_nul_is_two_bytes() {
        assert_eq!(encode("a\0b"), vec![b'a', 0xC0, 0x80, b'b']);
        assert_eq!(decode(&[b'a', 0xC0, 0x80, b'b']).unwrap(), "a\0b");
    }

    #[test]
    fn test_supplementary_characters_use_surrogates() {
        let encoded = encode("😀");
        assert_eq!(encoded.len(), 6);
        assert_eq!(decode(&encoded).unwrap(), "😀");
    }

    #[test]
    fn test_rejects_bad_continuation() {
        assert_eq!(decode(&[b'x', 0xC3, 0x41]), Err(2));
    }

    #[test]
    fn test_rejects_sequence_crossing_the_end() {
        assert_eq!(decode(&[0xE2, 0x82]), Err(2));
    }

    #[test]
    fn test_rejects_stray_continuation_lead() {
        assert_eq!(decode(&[b'o', b'k', 0x80]), Err(2));
        assert_eq!(decode(&[0xF0, 0x9F, 0x98, 0x80]), Err(0));
    }

    #[test]
    fn test_rejects_unpaired_surrogate() {
        // a lone high surrogate U+D83D
        assert!(decode(&[0xED, 0xA0, 0xBD]).is_err());
    }
}
