pub mod carmack;
pub mod level;
pub mod loader;
pub mod raw;
pub mod rlew;
pub mod tiles;

#[cfg(test)]
pub(crate) mod testutil;

pub use level::{CompressionMethod, LevelMap, SPECIAL_PLANE, WALL_PLANE, load_levels};
pub use loader::ArchiveMap;
pub use raw::{ArchiveError, CodecError, GameMaps, LevelHeader, MapHead};
pub use tiles::standard_catalog;
