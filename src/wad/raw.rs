//! # GAMEMAPS archive
//!
//! * `MAPHEAD` holds the RLEW flag word and up to 100 level offsets.
//! * `GAMEMAPS` holds, per level, a 38-byte header followed by the
//!   compressed planes it points at.
//! * The whole data blob is kept in RAM; planes are decoded on demand.

use bincode::{Decode, config, decode_from_slice};
use byteorder::{LittleEndian as LE, ReadBytesExt};
use std::{fs, io, path::Path};
use thiserror::Error;

/// Maximum number of level offsets stored in `MAPHEAD`.
pub const MAX_LEVELS: usize = 100;

/// On-disk size of one level header.
pub const LEVEL_HEADER_SIZE: usize = 38;

/// Errors from the two decompression codecs.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CodecError {
    #[error("compressed stream truncated at byte {offset}")]
    Truncated { offset: usize },

    #[error("back-reference at byte {offset} points to {pointer}, only {produced} bytes decoded")]
    PointerOutOfRange {
        offset: usize,
        pointer: usize,
        produced: usize,
    },
}

/// Malformed archive / decoding errors.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("MAPHEAD too short: {0} bytes")]
    TruncatedHeader(usize),

    #[error("level index {0} out of range")]
    LevelIndex(usize),

    #[error("level {level} header at {offset} past end of data ({data_len})")]
    LevelHeaderOutOfBounds {
        level: usize,
        offset: u32,
        data_len: usize,
    },

    #[error("level {level} header: {source}")]
    BadLevelHeader {
        level: usize,
        source: bincode::error::DecodeError,
    },

    #[error("level {level} plane {plane} slice {start}..{end} past end of data ({data_len})")]
    PlaneOutOfBounds {
        level: usize,
        plane: usize,
        start: usize,
        end: usize,
        data_len: usize,
    },

    #[error(
        "level {level} plane {plane}: cannot detect compression \
         (expected {expected}, found {first:#06x}/{second:#06x})"
    )]
    UnknownCompression {
        level: usize,
        plane: usize,
        expected: usize,
        first: u16,
        second: u16,
    },

    #[error("level {level} plane {plane}: {source}")]
    Codec {
        level: usize,
        plane: usize,
        source: CodecError,
    },

    #[error("level {level} plane {plane} decoded to {actual} tiles, expected {expected}")]
    PlaneSizeMismatch {
        level: usize,
        plane: usize,
        expected: usize,
        actual: usize,
    },
}

/*=======================================================================*/
/*                               MAPHEAD                                 */
/*=======================================================================*/

/// Parsed `MAPHEAD`.
#[derive(Clone, Debug)]
pub struct MapHead {
    /// RLEW flag word for every plane of the archive.
    pub magic: u16,
    offsets: Vec<i32>,
}

impl MapHead {
    pub fn parse(bytes: &[u8]) -> Result<Self, ArchiveError> {
        if bytes.len() < 2 {
            return Err(ArchiveError::TruncatedHeader(bytes.len()));
        }
        let mut cur = bytes;
        let magic = cur.read_u16::<LE>()?;

        // a partial trailing offset is an error, a short table is not
        if cur.len() < MAX_LEVELS * 4 && cur.len() % 4 != 0 {
            return Err(ArchiveError::TruncatedHeader(bytes.len()));
        }
        let count = (cur.len() / 4).min(MAX_LEVELS);
        let mut offsets = Vec::with_capacity(count);
        for _ in 0..count {
            offsets.push(cur.read_i32::<LE>()?);
        }

        Ok(Self { magic, offsets })
    }

    /// Number of leading strictly positive offsets.
    pub fn level_count(&self) -> usize {
        self.offsets.iter().take_while(|&&o| o > 0).count()
    }

    /// Offset of level `idx` in `GAMEMAPS`, `None` past `level_count()`.
    pub fn level_offset(&self, idx: usize) -> Option<u32> {
        if idx >= self.level_count() {
            return None;
        }
        Some(self.offsets[idx] as u32)
    }
}

/*=======================================================================*/
/*                             Level header                              */
/*=======================================================================*/

#[repr(C)]
#[derive(Clone, Copy, Decode, Debug)]
pub struct RawLevelHeader {
    pub plane_offsets: [i32; 3],
    pub plane_lengths: [u16; 3],
    pub width: u16,
    pub height: u16,
    pub name: [u8; 16],
}

/// Level header with the name decoded.
#[derive(Clone, Debug)]
pub struct LevelHeader {
    pub name: String,
    pub width: u16,
    pub height: u16,
    pub plane_offsets: [i32; 3],
    pub plane_lengths: [u16; 3],
}

impl LevelHeader {
    /// Whether plane `plane` is stored (`offset > 0`).
    pub fn has_plane(&self, plane: usize) -> bool {
        self.plane_offsets.get(plane).is_some_and(|&o| o > 0)
    }

    /// Byte size of one decoded plane.
    pub fn plane_byte_size(&self) -> usize {
        self.width as usize * self.height as usize * 2
    }
}

impl From<RawLevelHeader> for LevelHeader {
    fn from(raw: RawLevelHeader) -> Self {
        Self {
            name: nul_terminated(&raw.name).into(),
            width: raw.width,
            height: raw.height,
            plane_offsets: raw.plane_offsets,
            plane_lengths: raw.plane_lengths,
        }
    }
}

/// Printable view of a NUL-terminated byte string.
pub fn nul_terminated(raw: &[u8]) -> &str {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    std::str::from_utf8(&raw[..end]).unwrap_or("?")
}

/*=======================================================================*/
/*                               Archive                                 */
/*=======================================================================*/

/// `MAPHEAD` + `GAMEMAPS` in memory.
#[derive(Debug)]
pub struct GameMaps {
    head: MapHead,
    bytes: Vec<u8>,
}

impl GameMaps {
    pub fn from_bytes(head: &[u8], data: Vec<u8>) -> Result<Self, ArchiveError> {
        Ok(Self {
            head: MapHead::parse(head)?,
            bytes: data,
        })
    }

    pub fn from_files<P: AsRef<Path>, Q: AsRef<Path>>(
        head_path: P,
        data_path: Q,
    ) -> Result<Self, ArchiveError> {
        let head = fs::read(head_path)?;
        let data = fs::read(data_path)?;
        Self::from_bytes(&head, data)
    }

    pub fn head(&self) -> &MapHead {
        &self.head
    }

    /// RLEW flag shared by every plane.
    pub fn magic(&self) -> u16 {
        self.head.magic
    }

    pub fn level_count(&self) -> usize {
        self.head.level_count()
    }

    /// Raw `GAMEMAPS` bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decode the 38-byte header of level `idx`.
    pub fn level_header(&self, idx: usize) -> Result<LevelHeader, ArchiveError> {
        let offset = self
            .head
            .level_offset(idx)
            .ok_or(ArchiveError::LevelIndex(idx))?;
        let start = offset as usize;
        if start + LEVEL_HEADER_SIZE > self.bytes.len() {
            return Err(ArchiveError::LevelHeaderOutOfBounds {
                level: idx,
                offset,
                data_len: self.bytes.len(),
            });
        }

        let cfg = config::standard()
            .with_fixed_int_encoding()
            .with_little_endian();
        let (raw, _) = decode_from_slice::<RawLevelHeader, _>(&self.bytes[start..], cfg)
            .map_err(|e| ArchiveError::BadLevelHeader {
                level: idx,
                source: e,
            })?;
        Ok(raw.into())
    }

    /// Compressed bytes of `plane` of level `level`, or `None` when the
    /// header marks it absent.
    pub fn plane_bytes(
        &self,
        level: usize,
        header: &LevelHeader,
        plane: usize,
    ) -> Result<Option<&[u8]>, ArchiveError> {
        if !header.has_plane(plane) {
            return Ok(None);
        }
        let start = header.plane_offsets[plane] as usize;
        let end = start + header.plane_lengths[plane] as usize;
        if end > self.bytes.len() {
            return Err(ArchiveError::PlaneOutOfBounds {
                level,
                plane,
                start,
                end,
                data_len: self.bytes.len(),
            });
        }
        Ok(Some(&self.bytes[start..end]))
    }
}

// ==========================================================================
// Unit tests
// ==========================================================================
