mod camera;
pub mod geometry;
pub mod map;
pub mod structure;
pub mod texture;

pub use camera::Camera;
pub use geometry::{Line, Vector, heading_vector, line_intersection, perp_cw};
pub use map::{Cell, GridMap, Map, MapError};
pub use structure::{Catalog, CatalogError, Structure, StructureFlags, StructureId};
pub use texture::{NO_TEXTURE, Rgba, Texture, TextureBank, TextureError, TextureId};
