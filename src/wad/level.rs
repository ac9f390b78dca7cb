use crate::wad::{
    carmack, rlew,
    raw::{ArchiveError, GameMaps, LevelHeader},
};
use byteorder::{ByteOrder, LittleEndian as LE};

/// Number of planes a level header can describe.
pub const PLANE_COUNT: usize = 3;

/// Plane holding walls and doors.
pub const WALL_PLANE: usize = 0;

/// Plane holding start markers, objects and actors.
pub const SPECIAL_PLANE: usize = 1;

/*=======================================================================*/
/*                        Decoded level planes                           */
/*=======================================================================*/

/// One decoded level.  Immutable after load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelMap {
    pub name: String,
    pub width: usize,
    pub height: usize,
    /// Decoded planes hold exactly `width * height` codes.
    pub planes: [Option<Vec<u16>>; PLANE_COUNT],
}

impl LevelMap {
    /// Tile code at `(x, y)` in archive order (row 0 first).
    ///
    /// `None` when out of bounds, the plane is absent or shorter than
    /// `width * height`.
    pub fn value(&self, plane: usize, x: i32, y: i32) -> Option<u16> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        self.plane(plane)?
            .get(y as usize * self.width + x as usize)
            .copied()
    }

    pub fn plane(&self, plane: usize) -> Option<&[u16]> {
        self.planes.get(plane)?.as_deref()
    }

    pub fn has_plane(&self, plane: usize) -> bool {
        self.plane(plane).is_some()
    }
}

/*=======================================================================*/
/*                      Compression auto-detection                       */
/*=======================================================================*/

/// How a plane is stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompressionMethod {
    /// Length-prefixed RLEW.
    Rlew,
    /// Length-prefixed Carmack wrapping a length-prefixed RLEW stream.
    CarmackRlew,
}

/// Compare the first two LE words with the expected decoded byte size.
///
/// Returns `None` when neither matches.
pub fn detect_compression(compressed: &[u8], expected: usize) -> Option<CompressionMethod> {
    if compressed.len() < 4 {
        return None;
    }
    let first = LE::read_u16(&compressed[0..2]) as usize;
    let second = LE::read_u16(&compressed[2..4]) as usize;
    if first == expected {
        Some(CompressionMethod::Rlew)
    } else if second == expected {
        Some(CompressionMethod::CarmackRlew)
    } else {
        None
    }
}

/// Decode one compressed plane into tile codes.
pub fn decode_plane(
    compressed: &[u8],
    expected: usize,
    flag: u16,
    level: usize,
    plane: usize,
) -> Result<Vec<u16>, ArchiveError> {
    let codec = |source| ArchiveError::Codec {
        level,
        plane,
        source,
    };

    let method = detect_compression(compressed, expected).ok_or_else(|| {
        let word = |at: usize| {
            compressed
                .get(at..at + 2)
                .map(LE::read_u16)
                .unwrap_or_default()
        };
        ArchiveError::UnknownCompression {
            level,
            plane,
            expected,
            first: word(0),
            second: word(2),
        }
    })?;
    log::debug!("level {level} plane {plane}: {method:?}");

    let bytes = match method {
        CompressionMethod::Rlew => {
            rlew::decode_with_length_prefix_and_flag(compressed, flag)
                .map_err(codec)?
                .1
        }
        CompressionMethod::CarmackRlew => {
            let (rlew_len, mut rlew_stream) =
                carmack::decode_with_length_prefix(compressed).map_err(codec)?;
            if rlew_stream.len() != rlew_len {
                log::warn!(
                    "level {level} plane {plane}: Carmack stream decoded to {} bytes, \
                     header says {rlew_len}",
                    rlew_stream.len()
                );
                rlew_stream.truncate(rlew_len);
            }
            rlew::decode_with_length_prefix_and_flag(&rlew_stream, flag)
                .map_err(codec)?
                .1
        }
    };

    if bytes.len() != expected {
        return Err(ArchiveError::PlaneSizeMismatch {
            level,
            plane,
            expected: expected / 2,
            actual: bytes.len() / 2,
        });
    }

    Ok(bytes.chunks_exact(2).map(LE::read_u16).collect())
}

/*=======================================================================*/
/*                     Convenience helpers on `GameMaps`                 */
/*=======================================================================*/
impl GameMaps {
    /// Decode every present plane of level `idx`.
    pub fn load_level(&self, idx: usize) -> Result<LevelMap, ArchiveError> {
        let header: LevelHeader = self.level_header(idx)?;
        log::info!(
            "reading level {idx}: {} ({}x{})",
            header.name,
            header.width,
            header.height
        );

        let expected = header.plane_byte_size();
        let mut planes: [Option<Vec<u16>>; PLANE_COUNT] = [None, None, None];
        for (plane, slot) in planes.iter_mut().enumerate() {
            if let Some(compressed) = self.plane_bytes(idx, &header, plane)? {
                *slot = Some(decode_plane(compressed, expected, self.magic(), idx, plane)?);
            }
        }

        Ok(LevelMap {
            name: header.name,
            width: header.width as usize,
            height: header.height as usize,
            planes,
        })
    }

    /// Decode all `level_count()` levels in order.
    pub fn load_levels(&self) -> Result<Vec<LevelMap>, ArchiveError> {
        (0..self.level_count()).map(|i| self.load_level(i)).collect()
    }
}

/// Decode every level from the raw `MAPHEAD` and `GAMEMAPS` bytes.
pub fn load_levels(head: &[u8], data: &[u8]) -> Result<Vec<LevelMap>, ArchiveError> {
    GameMaps::from_bytes(head, data.to_vec())?.load_levels()
}

/*=======================================================================*/
/*                                Tests                                  */
/*=======================================================================*/
