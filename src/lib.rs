//! Grid raycaster over legacy GAMEMAPS level archives.
//!
//! * [`wad`] decodes the `MAPHEAD` / `GAMEMAPS` pair into tile planes.
//! * [`world`] holds geometry, textures, the structure catalog and the
//!   [`world::Map`] contract.
//! * [`engine`] casts rays against any `Map`.
//! * [`renderer`] paints the cast columns into a frame-buffer.

pub mod engine;
pub mod renderer;
pub mod wad;
pub mod world;
