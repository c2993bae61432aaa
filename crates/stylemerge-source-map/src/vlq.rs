//! Base64 VLQ encoding used by the `mappings` field

use crate::error::SourceMapError;

const BASE64_CHARS: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const VLQ_BASE_SHIFT: u32 = 5;
const VLQ_BASE: i64 = 1 << VLQ_BASE_SHIFT;
const VLQ_BASE_MASK: i64 = VLQ_BASE - 1;
const VLQ_CONTINUATION_BIT: i64 = VLQ_BASE;

fn base64_value(ch: char) -> Option<i64> {
    let value = match ch {
        'A'..='Z' => ch as u32 - 'A' as u32,
        'a'..='z' => ch as u32 - 'a' as u32 + 26,
        '0'..='9' => ch as u32 - '0' as u32 + 52,
        '+' => 62,
        '/' => 63,
        _ => return None,
    };
    Some(i64::from(value))
}

/// Append the VLQ encoding of `value` to `out`
///
/// # Example
///
/// ```
/// use stylemerge_source_map::vlq;
///
/// let mut out = String::new();
/// vlq::encode(16, &mut out);
/// assert_eq!(out, "gB");
/// ```
pub fn encode(value: i64, out: &mut String) {
    // The sign lives in the least significant bit
    let mut vlq = if value < 0 {
        ((-value) << 1) | 1
    } else {
        value << 1
    };

    loop {
        let mut digit = vlq & VLQ_BASE_MASK;
        vlq >>= VLQ_BASE_SHIFT;
        if vlq > 0 {
            digit |= VLQ_CONTINUATION_BIT;
        }
        out.push(BASE64_CHARS[digit as usize] as char);
        if vlq == 0 {
            break;
        }
    }
}

/// Decode every VLQ value in a single segment (the text between commas)
pub fn decode(segment: &str) -> Result<Vec<i64>, SourceMapError> {
    let mut values = Vec::new();
    let mut accumulator: i64 = 0;
    let mut shift: u32 = 0;
    let mut in_value = false;

    for ch in segment.chars() {
        let digit = base64_value(ch).ok_or(SourceMapError::InvalidBase64(ch))?;
        in_value = true;
        let part = digit & VLQ_BASE_MASK;
        if part > (i64::MAX >> shift) {
            return Err(SourceMapError::VlqOverflow);
        }
        accumulator = accumulator
            .checked_add(part << shift)
            .ok_or(SourceMapError::VlqOverflow)?;

        if digit & VLQ_CONTINUATION_BIT != 0 {
            shift += VLQ_BASE_SHIFT;
            if shift > 60 {
                return Err(SourceMapError::TruncatedVlq);
            }
        } else {
            let negative = accumulator & 1 == 1;
            let magnitude = accumulator >> 1;
            values.push(if negative { -magnitude } else { magnitude });
            accumulator = 0;
            shift = 0;
            in_value = false;
        }
    }

    if in_value {
        return Err(SourceMapError::TruncatedVlq);
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_encodings() {
        let cases = [(0, "A"), (1, "C"), (-1, "D"), (15, "e"), (16, "gB"), (-17, "jB")];
        for (value, expected) in cases {
            let mut out = String::new();
            encode(value, &mut out);
            assert_eq!(out, expected, "encoding {value}");
        }
    }

    #[test]
    fn test_decode_segment() {
        assert_eq!(decode("AAgBC").unwrap(), vec![0, 0, 16, 1]);
        assert_eq!(decode("").unwrap(), Vec::<i64>::new());
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert!(matches!(
            decode("A*"),
            Err(SourceMapError::InvalidBase64('*'))
        ));
        // 'g' has the continuation bit set but nothing follows
        assert!(matches!(decode("g"), Err(SourceMapError::TruncatedVlq)));
        // Twelve empty continuation digits, then 31 shifted past bit 63
        assert!(matches!(
            decode("ggggggggggggf"),
            Err(SourceMapError::VlqOverflow)
        ));
    }

    #[test]
    fn test_large_values() {
        let mut out = String::new();
        for value in [1_000_000, -123_456, 4095] {
            out.clear();
            encode(value, &mut out);
            assert_eq!(decode(&out).unwrap(), vec![value]);
        }
    }
}
