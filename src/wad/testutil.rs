//! Hand-built archives for unit tests (real game data is not
//! redistributable).

use super::raw::MAX_LEVELS;

#[derive(Clone, Copy, Debug)]
pub enum Compression {
    Rlew,
    CarmackRlew,
}

struct PendingLevel {
    name: String,
    width: u16,
    height: u16,
    planes: [Option<Vec<u16>>; 3],
    compression: Compression,
}

/// Builds a `MAPHEAD` / `GAMEMAPS` pair.
pub struct ArchiveBuilder {
    magic: u16,
    levels: Vec<PendingLevel>,
}

impl ArchiveBuilder {
    pub fn new(magic: u16) -> Self {
        Self {
            magic,
            levels: Vec::new(),
        }
    }

    pub fn level(
        mut self,
        name: &str,
        width: u16,
        height: u16,
        planes: [Option<&[u16]>; 3],
        compression: Compression,
    ) -> Self {
        self.levels.push(PendingLevel {
            name: name.into(),
            width,
            height,
            planes: planes.map(|p| p.map(<[u16]>::to_vec)),
            compression,
        });
        self
    }

    /// `(maphead, gamemaps)`.
    pub fn build(self) -> (Vec<u8>, Vec<u8>) {
        let mut data = b"TED5v1.0".to_vec();
        let mut offsets = Vec::new();

        for level in &self.levels {
            let mut plane_offsets = [0i32; 3];
            let mut plane_lengths = [0u16; 3];
            for (i, plane) in level.planes.iter().enumerate() {
                let Some(words) = plane else { continue };
                let encoded = encode_plane(words, self.magic, level.compression);
                plane_offsets[i] = data.len() as i32;
                plane_lengths[i] = encoded.len() as u16;
                data.extend(encoded);
            }

            offsets.push(data.len() as i32);
            for o in plane_offsets {
                data.extend(o.to_le_bytes());
            }
            for l in plane_lengths {
                data.extend(l.to_le_bytes());
            }
            data.extend(level.width.to_le_bytes());
            data.extend(level.height.to_le_bytes());
            let mut name = [0u8; 16];
            let n = level.name.len().min(15);
            name[..n].copy_from_slice(&level.name.as_bytes()[..n]);
            data.extend(name);
        }

        let mut head = self.magic.to_le_bytes().to_vec();
        for i in 0..MAX_LEVELS {
            head.extend(offsets.get(i).copied().unwrap_or(0).to_le_bytes());
        }
        (head, data)
    }
}

pub fn encode_plane(words: &[u16], flag: u16, compression: Compression) -> Vec<u8> {
    let rlew = rlew_encode(words, flag);
    match compression {
        Compression::Rlew => rlew,
        Compression::CarmackRlew => carmack_literal_encode(&rlew),
    }
}

/// Length-prefixed RLEW stream; runs of three or more and every word equal
/// to the flag are encoded as runs.
pub fn rlew_encode(words: &[u16], flag: u16) -> Vec<u8> {
    let mut out = ((words.len() * 2) as u16).to_le_bytes().to_vec();
    let mut i = 0;
    while i < words.len() {
        let w = words[i];
        let mut run = 1;
        while i + run < words.len() && words[i + run] == w {
            run += 1;
        }
        if run >= 3 || w == flag {
            out.extend(flag.to_le_bytes());
            out.extend((run as u16).to_le_bytes());
            out.extend(w.to_le_bytes());
        } else {
            for _ in 0..run {
                out.extend(w.to_le_bytes());
            }
        }
        i += run;
    }
    out
}

/// Length-prefixed Carmack stream made only of literals, escaping words
/// whose high byte collides with a pointer marker.
pub fn carmack_literal_encode(bytes: &[u8]) -> Vec<u8> {
    let mut out = (bytes.len() as u16).to_le_bytes().to_vec();
    for word in bytes.chunks_exact(2) {
        let (lo, hi) = (word[0], word[1]);
        if hi == 0xA7 || hi == 0xA8 {
            out.extend([0x00, hi, lo]);
        } else {
            out.extend([lo, hi]);
        }
    }
    out
}
