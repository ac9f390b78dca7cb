//! Pointer-based ("Carmack") decompression.
//!
//! The stream is a sequence of 16-bit little-endian words.  A word whose
//! high byte is `0xA7` (near pointer) or `0xA8` (far pointer) and whose low
//! byte is non-zero is a back-reference; with a zero low byte it is an
//! escaped literal whose real low byte follows.
//!
//! ```text
//!  near:  count A7 dist         replay `count` words from out.len() - 2*dist
//!  far:   count A8 lo hi        replay `count` words from 2*(hi<<8 | lo)
//!  esc:   00 A7|A8 low          emit  low, A7|A8
//! ```

use byteorder::{ByteOrder, LittleEndian as LE};

use super::CodecError;

const NEAR_POINTER: u8 = 0xA7;
const FAR_POINTER: u8 = 0xA8;

/// Decode a stream whose first word is the expected decompressed size.
///
/// The size is returned as-is; it is not checked against the output.
pub fn decode_with_length_prefix(source: &[u8]) -> Result<(usize, Vec<u8>), CodecError> {
    if source.len() < 2 {
        return Err(CodecError::Truncated { offset: 0 });
    }
    let expected = LE::read_u16(&source[..2]) as usize;
    let data = decode(&source[2..])?;
    Ok((expected, data))
}

/// Decode a raw Carmack stream (no size prefix).
pub fn decode(source: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::with_capacity(source.len() * 2);
    let mut pos = 0;

    while pos + 1 < source.len() {
        let count = source[pos];
        let marker = source[pos + 1];

        match (count, marker) {
            (0, NEAR_POINTER | FAR_POINTER) => {
                // escaped literal: the low byte is stored after the marker
                let low = *source
                    .get(pos + 2)
                    .ok_or(CodecError::Truncated { offset: pos })?;
                out.push(low);
                out.push(marker);
                pos += 3;
            }
            (_, NEAR_POINTER) => {
                let words = *source
                    .get(pos + 2)
                    .ok_or(CodecError::Truncated { offset: pos })?;
                let dist = words as usize * 2;
                let from = out.len().checked_sub(dist).ok_or(CodecError::PointerOutOfRange {
                    offset: pos,
                    pointer: dist,
                    produced: out.len(),
                })?;
                replay(&mut out, from, count, pos)?;
                pos += 3;
            }
            (_, FAR_POINTER) => {
                if pos + 3 >= source.len() {
                    return Err(CodecError::Truncated { offset: pos });
                }
                // absolute word offset into what has been produced so far
                let from = LE::read_u16(&source[pos + 2..pos + 4]) as usize * 2;
                replay(&mut out, from, count, pos)?;
                pos += 4;
            }
            _ => {
                out.push(count);
                out.push(marker);
                pos += 2;
            }
        }
    }

    Ok(out)
}

/// Copy `count` words starting at byte `from`, reading from the growing
/// output so that a source range may overlap what is being written.
fn replay(out: &mut Vec<u8>, from: usize, count: u8, offset: usize) -> Result<(), CodecError> {
    if from >= out.len() {
        return Err(CodecError::PointerOutOfRange {
            offset,
            pointer: from,
            produced: out.len(),
        });
    }
    for i in 0..count as usize * 2 {
        let byte = out[from + i];
        out.push(byte);
    }
    Ok(())
}
