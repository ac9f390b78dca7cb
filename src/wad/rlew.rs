//! Word run-length ("RLEW") decompression.
//!
//! Words equal to the flag introduce a run: `flag count value` expands to
//! `count` copies of `value`.  Every other word is copied unchanged.

use byteorder::{ByteOrder, LittleEndian as LE};

use super::CodecError;

/// Flag word used when the archive does not provide one.
pub const DEFAULT_FLAG: u16 = 0xFEFE;

pub fn decode(source: &[u8]) -> Result<Vec<u8>, CodecError> {
    decode_with_flag(source, DEFAULT_FLAG)
}

pub fn decode_with_length_prefix(source: &[u8]) -> Result<(usize, Vec<u8>), CodecError> {
    decode_with_length_prefix_and_flag(source, DEFAULT_FLAG)
}

/// Read the LE size word, then decode the rest with `flag`.
pub fn decode_with_length_prefix_and_flag(
    source: &[u8],
    flag: u16,
) -> Result<(usize, Vec<u8>), CodecError> {
    if source.len() < 2 {
        return Err(CodecError::Truncated { offset: 0 });
    }
    let expected = LE::read_u16(&source[..2]) as usize;
    let data = decode_with_flag(&source[2..], flag)?;
    Ok((expected, data))
}

pub fn decode_with_flag(source: &[u8], flag: u16) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::with_capacity(source.len() * 2);
    let mut pos = 0;

    while pos < source.len() {
        if pos + 2 > source.len() {
            return Err(CodecError::Truncated { offset: pos });
        }
        let word = &source[pos..pos + 2];

        if LE::read_u16(word) == flag {
            if pos + 6 > source.len() {
                return Err(CodecError::Truncated { offset: pos });
            }
            let count = LE::read_u16(&source[pos + 2..pos + 4]) as usize;
            let value = &source[pos + 4..pos + 6];
            out.reserve(count * 2);
            for _ in 0..count {
                out.extend_from_slice(value);
            }
            pos += 6;
        } else {
            out.extend_from_slice(word);
            pos += 2;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_expands_to_count_words() {
        let compressed = [0xFE, 0xFE, 0x03, 0x00, 0x34, 0x12];
        assert_eq!(
            decode(&compressed).unwrap(),
            [0x34, 0x12, 0x34, 0x12, 0x34, 0x12]
        );
    }

    #[test]
    fn plain_words_pass_through() {
        let compressed = [0x01, 0x00, 0xFE, 0xFF, 0xFF, 0xFE];
        assert_eq!(decode(&compressed).unwrap(), compressed);
    }

    #[test]
    fn custom_flag_from_archive_magic() {
        let compressed = [
            0x07, 0x00, // literal
            0xCD, 0xAB, 0x02, 0x00, 0x5A, 0x00, // run of 2 × 0x005A
            0xFE, 0xFE, // default flag is a literal here
        ];
        let data = decode_with_flag(&compressed, 0xABCD).unwrap();
        assert_eq!(data, [0x07, 0x00, 0x5A, 0x00, 0x5A, 0x00, 0xFE, 0xFE]);
    }

    #[test]
    fn zero_length_run_emits_nothing() {
        let compressed = [0xFE, 0xFE, 0x00, 0x00, 0x99, 0x99, 0x01, 0x00];
        assert_eq!(decode(&compressed).unwrap(), [0x01, 0x00]);
    }

    #[test]
    fn length_prefix_matches_output() {
        let compressed = [0x08, 0x00, 0xCD, 0xAB, 0x04, 0x00, 0x01, 0x00];
        let (size, data) = decode_with_length_prefix_and_flag(&compressed, 0xABCD).unwrap();
        assert_eq!(size, data.len());
        assert_eq!(data, [0x01, 0x00, 0x01, 0x00, 0x01, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn truncated_input_is_rejected() {
        assert!(matches!(
            decode(&[0x01, 0x00, 0x02]),
            Err(CodecError::Truncated { offset: 2 })
        ));
        assert!(matches!(
            decode(&[0xFE, 0xFE, 0x02, 0x00, 0x01]),
            Err(CodecError::Truncated { offset: 0 })
        ));
        assert!(matches!(
            decode_with_length_prefix(&[]),
            Err(CodecError::Truncated { offset: 0 })
        ));
    }
}
