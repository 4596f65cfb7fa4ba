//! Text column and name decoding.
//!
//! JET4 stores text as UCS-2LE. A value starting with `FF FE` is compressed:
//! characters are single bytes (high byte zero) until a `0x00` byte toggles
//! to raw two-byte units, and the next `0x00` toggles back. JET3 stores
//! single-byte text in the Windows-1252 code page.

use encoding_rs::WINDOWS_1252;

use crate::storage::JetFormat;

/// Marker prefix of compressed JET4 text.
const COMPRESSED_MARKER: [u8; 2] = [0xff, 0xfe];

/// Decodes a stored text value or name into a `String`.
///
/// Invalid UCS-2 sequences are replaced rather than rejected.
pub fn decode_text(format: &JetFormat, raw: &[u8]) -> String {
    if format.is_jet3() {
        return WINDOWS_1252.decode_without_bom_handling(raw).0.into_owned();
    }
    match raw.strip_prefix(&COMPRESSED_MARKER) {
        Some(compressed) => String::from_utf16_lossy(&expand_compressed(compressed)),
        None => decode_ucs2(raw),
    }
}

fn decode_ucs2(raw: &[u8]) -> String {
    let units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

fn expand_compressed(raw: &[u8]) -> Vec<u16> {
    let mut units = Vec::with_capacity(raw.len());
    let mut compressed = true;
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == 0 {
            compressed = !compressed;
            i += 1;
        } else if compressed {
            units.push(u16::from(raw[i]));
            i += 1;
        } else if i + 1 < raw.len() {
            units.push(u16::from_le_bytes([raw[i], raw[i + 1]]));
            i += 2;
        } else {
            break;
        }
    }
    units
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::JetVersion;

    fn jet4() -> JetFormat {
        JetFormat::new(JetVersion::Jet4)
    }

    #[test]
    fn test_ucs2() {
        let raw: Vec<u8> = "Sites".encode_utf16().flat_map(u16::to_le_bytes).collect();
        assert_eq!(decode_text(&jet4(), &raw), "Sites");
        assert_eq!(decode_text(&jet4(), &[]), "");
    }

    #[test]
    fn test_compressed() {
        let mut raw = vec![0xff, 0xfe];
        raw.extend_from_slice(b"Depth");
        assert_eq!(decode_text(&jet4(), &raw), "Depth");
    }

    #[test]
    fn test_compressed_toggle() {
        // "ab" compressed, then "é€" as raw units, then "c" compressed again
        let mut raw = vec![0xff, 0xfe, b'a', b'b', 0x00];
        raw.extend_from_slice(&0x00e9u16.to_le_bytes());
        raw.extend_from_slice(&0x20acu16.to_le_bytes());
        raw.extend_from_slice(&[0x00, b'c']);
        assert_eq!(decode_text(&jet4(), &raw), "ab\u{e9}\u{20ac}c");
    }

    #[test]
    fn test_jet3_windows_1252() {
        let format = JetFormat::new(JetVersion::Jet3);
        assert_eq!(decode_text(&format, b"Caf\xe9"), "Caf\u{e9}");
        // 0x80..=0x9f hold punctuation and the euro sign, not C1 controls
        assert_eq!(
            decode_text(&format, &[b'O', 0x92, b'N', b' ', 0x80, b'5', 0x96]),
            "O\u{2019}N \u{20ac}5\u{2013}"
        );
    }
}
