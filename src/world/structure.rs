//! Structure catalog: what a tile code *is* once resolved.
//!
//! A [`Catalog`] is built once (see `wad::tiles::standard_catalog`) and
//! then shared read-only.  Maps store [`StructureId`]s and hand out
//! `&Structure` borrowed from the catalog, so two lookups of the same cell
//! yield the very same reference.

use std::collections::HashMap;

use bitflags::bitflags;
use thiserror::Error;

use crate::world::texture::{Texture, TextureBank, TextureError, TextureId};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StructureFlags: u8 {
        /// Fills the whole cell; rays stop here.
        const WALL       = 0x01;
        /// The camera cannot walk through it.
        const OBSTACLE   = 0x02;
        /// Something that can be picked up.
        const ITEM       = 0x04;
        const DECORATION = 0x08;
    }
}

/// Index into [`Catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StructureId(pub u16);

impl StructureId {
    /// Empty cell.
    pub const NONE: StructureId = StructureId(0);
    /// Unrecognised wall-plane code; drawn as a wall with a marker texture.
    pub const UNKNOWN: StructureId = StructureId(1);
    /// Unrecognised special-plane code; no flags.
    pub const UNKNOWN_SPECIAL: StructureId = StructureId(2);
}

#[derive(Clone, Debug, PartialEq)]
pub struct Structure {
    pub name: String,
    /// Face used for X-side hits (and Y-side when `texture2` is absent).
    pub texture: Option<TextureId>,
    /// Face used for Y-side hits.
    pub texture2: Option<TextureId>,
    /// Already blended into both faces; kept for reference.
    pub overlay: Option<TextureId>,
    pub flags: StructureFlags,
}

impl Structure {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            texture: None,
            texture2: None,
            overlay: None,
            flags: StructureFlags::empty(),
        }
    }

    pub fn with_texture(mut self, id: TextureId) -> Self {
        self.texture = Some(id);
        self
    }

    pub fn with_second_texture(mut self, id: TextureId) -> Self {
        self.texture2 = Some(id);
        self
    }

    pub fn with_overlay(mut self, id: TextureId) -> Self {
        self.overlay = Some(id);
        self
    }

    pub fn with_flags(mut self, flags: StructureFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[inline]
    pub fn is_wall(&self) -> bool {
        self.flags.contains(StructureFlags::WALL)
    }

    #[inline]
    pub fn is_obstacle(&self) -> bool {
        self.flags.contains(StructureFlags::OBSTACLE)
    }

    #[inline]
    pub fn is_item(&self) -> bool {
        self.flags.contains(StructureFlags::ITEM)
    }

    #[inline]
    pub fn is_decoration(&self) -> bool {
        self.flags.contains(StructureFlags::DECORATION)
    }

    /// Texture for a face; `secondary` selects `texture2` when present.
    pub fn face(&self, secondary: bool) -> Option<TextureId> {
        if secondary {
            self.texture2.or(self.texture)
        } else {
            self.texture
        }
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Texture(#[from] TextureError),

    #[error("structure `{0}` already present in catalog")]
    Duplicate(String),

    #[error("structure id {0} out of range")]
    BadId(u16),
}

/// Name of the marker texture used by the reserved unknown structures.
pub const UNKNOWN_TEXTURE: &str = "UNKNOWN";

/// Immutable-after-build set of structures plus the textures they use.
pub struct Catalog {
    textures: TextureBank,
    structures: Vec<Structure>,
    by_name: HashMap<String, StructureId>,
}

impl Catalog {
    /// Take ownership of `textures` and register the three reserved
    /// structures.  A magenta/black marker texture is added to the bank
    /// for the unknown ones unless one named [`UNKNOWN_TEXTURE`] exists.
    pub fn new(mut textures: TextureBank) -> Result<Self, CatalogError> {
        let marker = match textures.id(UNKNOWN_TEXTURE) {
            Some(id) => id,
            None => textures.insert(UNKNOWN_TEXTURE, marker_texture())?,
        };

        let mut catalog = Self {
            textures,
            structures: Vec::new(),
            by_name: HashMap::new(),
        };
        catalog.add(Structure::new("none"))?;
        catalog.add(
            Structure::new("unknown")
                .with_texture(marker)
                .with_flags(StructureFlags::WALL | StructureFlags::OBSTACLE),
        )?;
        catalog.add(Structure::new("unknown special").with_texture(marker))?;
        Ok(catalog)
    }

    /// Catalog over the bare checkerboard bank.
    pub fn with_checker() -> Result<Self, CatalogError> {
        Self::new(TextureBank::default_with_checker())
    }

    /// Register `structure`; every texture it names must be in the bank.
    pub fn add(&mut self, structure: Structure) -> Result<StructureId, CatalogError> {
        if self.by_name.contains_key(&structure.name) {
            return Err(CatalogError::Duplicate(structure.name));
        }
        for id in [structure.texture, structure.texture2, structure.overlay]
            .into_iter()
            .flatten()
        {
            self.textures.texture(id)?;
        }

        let id = StructureId(self.structures.len() as u16);
        self.by_name.insert(structure.name.clone(), id);
        self.structures.push(structure);
        Ok(id)
    }

    /// Entry count, the three reserved ids included; never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.structures.len()
    }

    /// Nothing registered beyond `NONE`, `UNKNOWN` and `UNKNOWN_SPECIAL`.
    pub fn has_only_reserved(&self) -> bool {
        self.structures.len() <= StructureId::UNKNOWN_SPECIAL.0 as usize + 1
    }

    pub fn id(&self, name: &str) -> Option<StructureId> {
        self.by_name.get(name).copied()
    }

    /// Unknown names resolve to `fallback`.
    pub fn id_or(&self, name: &str, fallback: StructureId) -> StructureId {
        self.id(name).unwrap_or(fallback)
    }

    pub fn structure(&self, id: StructureId) -> Result<&Structure, CatalogError> {
        self.structures
            .get(id.0 as usize)
            .ok_or(CatalogError::BadId(id.0))
    }

    /// Infallible lookup; out-of-range ids resolve to [`StructureId::NONE`].
    #[inline]
    pub fn get(&self, id: StructureId) -> &Structure {
        self.structures
            .get(id.0 as usize)
            .unwrap_or(&self.structures[StructureId::NONE.0 as usize])
    }

    pub fn textures(&self) -> &TextureBank {
        &self.textures
    }

    /// Texture drawn for a face of `structure`; `None` for faceless ones.
    pub fn face_texture(&self, structure: &Structure, secondary: bool) -> Option<&Texture> {
        structure
            .face(secondary)
            .map(|id| self.textures.texture_or_missing(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (StructureId, &Structure)> {
        self.structures
            .iter()
            .enumerate()
            .map(|(i, s)| (StructureId(i as u16), s))
    }
}

fn marker_texture() -> Texture {
    Texture::checker(UNKNOWN_TEXTURE, 64, 8, [0xFF, 0x00, 0xFF, 0xFF], [0, 0, 0, 0xFF])
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
