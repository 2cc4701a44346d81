//! Conversions between SPIR-V words and the byte/text forms they are stored in.
//!
//! Files hold raw little-endian words. Terminals get lowercase hex, 16 words per line.

use std::fmt::Write as _;

pub const WORDS_PER_LINE: usize = 16;

/// Interprets `bytes` as little-endian words. Fails when the length is not a multiple of 4.
pub fn words_from_le_bytes(bytes: &[u8]) -> Result<Vec<u32>, String> {
    if bytes.len() % 4 != 0 {
        return Err(format!(
            "byte length {} is not a multiple of 4",
            bytes.len()
        ));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

pub fn words_to_le_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|word| word.to_le_bytes()).collect()
}

/// Renders words as space-separated 8-digit lowercase hex, 16 per line, each line
/// newline-terminated.
pub fn render_hex(words: &[u32]) -> String {
    let mut out = String::with_capacity(words.len() * 9);
    for line in words.chunks(WORDS_PER_LINE) {
        for (i, word) in line.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{word:08x}");
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn little_endian_words() {
        let bytes = [0x03, 0x02, 0x23, 0x07, 0x00, 0x03, 0x01, 0x00];
        let words = words_from_le_bytes(&bytes).unwrap();
        assert_eq!(words, [0x0723_0203, 0x0001_0300]);
        assert_eq!(words_to_le_bytes(&words), bytes);
    }

    #[test]
    fn unaligned_length_is_rejected() {
        assert!(words_from_le_bytes(&[1, 2, 3]).is_err());
        assert_eq!(words_from_le_bytes(&[]).unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn hex_wraps_every_16_words() {
        let words: Vec<u32> = (0..18).collect();
        let text = render_hex(&words);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].split(' ').count(), 16);
        assert!(lines[0].starts_with("00000000 00000001 "));
        assert_eq!(lines[1], "00000010 00000011");
        assert!(text.ends_with('\n'));
        assert_eq!(render_hex(&[0x0723_0203]), "07230203\n");
        assert_eq!(render_hex(&[]), "");
    }
}
