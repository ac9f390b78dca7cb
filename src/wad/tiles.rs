//! Tile-code tables of the legacy game and the catalog that backs them.
//!
//! * Plane 0 codes are walls and doors; `0x6A ..= 0x8F` mark floor areas.
//! * Plane 1 codes are start spots, decorations, pick-ups and actors.
//! * Any code not listed resolves to [`Tile::Unknown`].
//!
//! Textures are looked up by their lump name (`WAL00000.png`, …) in an
//! optional directory; a missing file falls back to a checkerboard in the
//! tile's swatch colour.

use std::{
    f64::consts::{FRAC_PI_2, PI},
    path::Path,
};

use crate::world::{
    Catalog, CatalogError, Rgba, Structure, StructureFlags, StructureId, Texture, TextureBank,
    TextureId,
};

/// What a plane code stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    Empty,
    Named(&'static str),
    Unknown,
}

impl Tile {
    /// Catalog id, `unknown` for unrecognised codes.
    pub fn resolve(self, catalog: &Catalog, unknown: StructureId) -> StructureId {
        match self {
            Tile::Empty => StructureId::NONE,
            Tile::Named(name) => catalog.id_or(name, unknown),
            Tile::Unknown => unknown,
        }
    }
}

/*=======================================================================*/
/*                              Wall plane                               */
/*=======================================================================*/

struct WallDef {
    name: &'static str,
    faces: [&'static str; 2],
    /// Art gets the cover overlay blended in.
    covered: bool,
    /// Stops rays but can be walked through.
    door: bool,
    swatch: Rgba,
}

const fn wall(name: &'static str, a: &'static str, b: &'static str, swatch: Rgba) -> WallDef {
    WallDef {
        name,
        faces: [a, b],
        covered: false,
        door: false,
        swatch,
    }
}

const fn covered(def: WallDef) -> WallDef {
    WallDef {
        covered: true,
        ..def
    }
}

const fn door(def: WallDef) -> WallDef {
    WallDef { door: true, ..def }
}

const GREY: Rgba = [0x70, 0x70, 0x70, 0xFF];
const BLUE: Rgba = [0x20, 0x30, 0x90, 0xFF];
const WOOD: Rgba = [0x80, 0x50, 0x28, 0xFF];
const STEEL: Rgba = [0x40, 0x80, 0x80, 0xFF];
const RED: Rgba = [0x90, 0x10, 0x10, 0xFF];

const WALLS: &[WallDef] = &[
    wall("grey stone wall 1", "WAL00000", "WAL00001", GREY),
    wall("grey stone wall 2", "WAL00002", "WAL00003", GREY),
    covered(wall("banner on stone wall", "WAL00004", "WAL00005", RED)),
    covered(wall("portrait on stone wall", "WAL00006", "WAL00007", GREY)),
    wall("empty cell", "WAL00008", "WAL00009", GREY),
    covered(wall("eagle stone arch", "WAL00010", "WAL00011", GREY)),
    wall("skeleton cell", "WAL00012", "WAL00013", GREY),
    wall("blue stone wall 1", "WAL00014", "WAL00015", BLUE),
    wall("blue stone wall 2", "WAL00016", "WAL00017", BLUE),
    covered(wall("eagle frame on wood wall", "WAL00018", "WAL00019", WOOD)),
    covered(wall("portrait on wood wall", "WAL00020", "WAL00021", WOOD)),
    wall("wood wall", "WAL00022", "WAL00023", WOOD),
    wall("exit door", "WAL00040", "WAL00043", STEEL),
    door(wall("door", "WAL00098", "WAL00099", STEEL)),
    door(wall("elevator door", "WAL00102", "WAL00103", STEEL)),
];

/// Plane-0 code → tile.
pub fn wall_tile(code: u16) -> Tile {
    use Tile::*;
    match code {
        0x00 => Empty,
        0x01 => Named("grey stone wall 1"),
        0x02 => Named("grey stone wall 2"),
        0x03 => Named("banner on stone wall"),
        0x04 => Named("portrait on stone wall"),
        0x05 => Named("empty cell"),
        0x06 => Named("eagle stone arch"),
        0x07 => Named("skeleton cell"),
        0x08 => Named("blue stone wall 1"),
        0x09 => Named("blue stone wall 2"),
        0x0A => Named("eagle frame on wood wall"),
        0x0B => Named("portrait on wood wall"),
        0x0C => Named("wood wall"),
        0x15 => Named("exit door"),
        0x5A | 0x5B => Named("door"),
        0x64 => Named("elevator door"),
        // floor areas
        0x6A..=0x8F => Empty,
        _ => Unknown,
    }
}

/*=======================================================================*/
/*                             Special plane                             */
/*=======================================================================*/

struct SpecialDef {
    name: &'static str,
    sprite: Option<&'static str>,
    flags: StructureFlags,
    swatch: Rgba,
}

const NO_FLAGS: StructureFlags = StructureFlags::empty();
const DECOR: StructureFlags = StructureFlags::DECORATION;
const PROP: StructureFlags = StructureFlags::DECORATION.union(StructureFlags::OBSTACLE);
const ITEM: StructureFlags = StructureFlags::ITEM;

const fn special(
    name: &'static str,
    sprite: &'static str,
    flags: StructureFlags,
    swatch: Rgba,
) -> SpecialDef {
    SpecialDef {
        name,
        sprite: Some(sprite),
        flags,
        swatch,
    }
}

const fn marker(name: &'static str) -> SpecialDef {
    SpecialDef {
        name,
        sprite: None,
        flags: NO_FLAGS,
        swatch: [0; 4],
    }
}

const GOLD: Rgba = [0xD0, 0xB0, 0x20, 0xFF];
const GREEN: Rgba = [0x20, 0x80, 0x30, 0xFF];
const BROWN: Rgba = [0x70, 0x48, 0x20, 0xFF];
const BONE: Rgba = [0xD8, 0xD0, 0xB8, 0xFF];

const SPECIALS: &[SpecialDef] = &[
    marker("start facing north"),
    marker("start facing east"),
    marker("start facing south"),
    marker("start facing west"),
    marker("secret door"),
    special("blue puddle", "SPR00002", DECOR, BLUE),
    special("green barrel", "SPR00003", PROP, GREEN),
    special("wood table", "SPR00004", PROP, WOOD),
    special("green floor lamp", "SPR00005", PROP, GREEN),
    special("crystal chandelier", "SPR00006", DECOR, GOLD),
    special("bowl of food", "SPR00008", ITEM, BONE),
    special("plant in gold pot", "SPR00010", PROP, GREEN),
    special("skeleton", "SPR00011", DECOR, BONE),
    special("plant in blue pot", "SPR00013", PROP, GREEN),
    special("blue pot", "SPR00014", PROP, BLUE),
    special("round table", "SPR00015", PROP, WOOD),
    special("green ceiling lamp", "SPR00016", DECOR, GREEN),
    special("suit of armour", "SPR00018", PROP, GREY),
    special("heap of bones", "SPR00021", DECOR, BONE),
    special("brown bowl", "SPR00025", DECOR, BROWN),
    special("chicken dinner", "SPR00026", ITEM, BROWN),
    special("med-kit", "SPR00027", ITEM, BONE),
    special("ammo clip", "SPR00028", ITEM, GREY),
    special("automatic rifle", "SPR00029", ITEM, GREY),
    special("gold cross", "SPR00031", ITEM, GOLD),
    special("gold cup", "SPR00032", ITEM, GOLD),
    special("treasure chest", "SPR00033", ITEM, GOLD),
    special("extra life", "SPR00035", ITEM, BLUE),
    special("brown barrel", "SPR00037", DECOR, BROWN),
    special("well with water", "SPR00038", PROP, BLUE),
    special("empty well", "SPR00039", PROP, GREY),
    special("flag on pole", "SPR00041", PROP, RED),
    special("guard", "SPR00050", NO_FLAGS, BROWN),
    special("dead guard", "SPR00095", NO_FLAGS, BROWN),
    special("dog", "SPR00107", NO_FLAGS, BROWN),
];

/// Plane-1 code → tile.
pub fn special_tile(code: u16) -> Tile {
    use Tile::*;
    match code {
        0x00 => Empty,
        0x13 => Named("start facing north"),
        0x14 => Named("start facing east"),
        0x15 => Named("start facing south"),
        0x16 => Named("start facing west"),
        0x17 => Named("blue puddle"),
        0x18 => Named("green barrel"),
        0x19 => Named("wood table"),
        0x1A => Named("green floor lamp"),
        0x1B => Named("crystal chandelier"),
        0x1D => Named("bowl of food"),
        0x1F => Named("plant in gold pot"),
        0x20 => Named("skeleton"),
        0x22 => Named("plant in blue pot"),
        0x23 => Named("blue pot"),
        0x24 => Named("round table"),
        0x25 => Named("green ceiling lamp"),
        0x27 => Named("suit of armour"),
        0x2A => Named("heap of bones"),
        0x2E => Named("brown bowl"),
        0x2F => Named("chicken dinner"),
        0x30 => Named("med-kit"),
        0x31 => Named("ammo clip"),
        0x32 => Named("automatic rifle"),
        0x34 => Named("gold cross"),
        0x35 => Named("gold cup"),
        0x36 => Named("treasure chest"),
        0x38 => Named("extra life"),
        0x3A => Named("brown barrel"),
        0x3B => Named("well with water"),
        0x3C => Named("empty well"),
        0x3E => Named("flag on pole"),
        0x62 => Named("secret door"),
        0x7C => Named("dead guard"),
        // standing / patrolling guards, all skills
        0x5A | 0x5B | 0x6C..=0x73 | 0x90..=0x97 | 0xB4..=0xBB => Named("guard"),
        // standing / patrolling dogs, all skills
        0x86..=0x8D | 0xAA..=0xB1 | 0xCE..=0xD5 => Named("dog"),
        _ => Unknown,
    }
}

/// Heading of a start-spot code: N/E/S/W → π/2, 0, 3π/2, π.
pub fn start_heading(code: u16) -> Option<f64> {
    match code {
        0x13 => Some(FRAC_PI_2),
        0x14 => Some(0.0),
        0x15 => Some(3.0 * FRAC_PI_2),
        0x16 => Some(PI),
        _ => None,
    }
}

/*=======================================================================*/
/*                           Catalog assembly                            */
/*=======================================================================*/

/// Lump name of the overlay blended over `covered` wall art.
pub const COVER_TEXTURE: &str = "COVER";

/// Size of generated fallback textures (legacy walls are 64×64).
const FALLBACK_SIZE: usize = 64;

struct TextureLoader<'a> {
    bank: TextureBank,
    dir: Option<&'a Path>,
}

impl TextureLoader<'_> {
    /// `dir/<lump>.png`, or `fallback()` when there is no usable file.
    fn load(
        &mut self,
        lump: &str,
        fallback: impl FnOnce() -> Texture,
    ) -> Result<TextureId, CatalogError> {
        if let Some(id) = self.bank.id(lump) {
            return Ok(id);
        }
        let tex = match self.dir {
            Some(dir) => {
                let path = dir.join(format!("{lump}.png"));
                Texture::from_png(&path).unwrap_or_else(|e| {
                    log::warn!("{}: {e}; using fallback", path.display());
                    fallback()
                })
            }
            None => fallback(),
        };
        Ok(self.bank.insert(lump, tex)?)
    }

    fn face(&mut self, lump: &str, swatch: Rgba) -> Result<TextureId, CatalogError> {
        self.load(lump, || {
            Texture::checker(lump, FALLBACK_SIZE, 16, swatch, shade(swatch, 0.8))
        })
    }

    /// `lump` with the cover blended in, stored as `<lump>+COVER`.
    fn covered_face(
        &mut self,
        lump: &str,
        swatch: Rgba,
        cover: TextureId,
    ) -> Result<TextureId, CatalogError> {
        let base = self.face(lump, swatch)?;
        let name = format!("{lump}+{COVER_TEXTURE}");
        if let Some(id) = self.bank.id(&name) {
            return Ok(id);
        }
        let blended = self
            .bank
            .texture(base)?
            .blend_over(self.bank.texture(cover)?);
        Ok(self.bank.insert(name, blended)?)
    }
}

fn shade(c: Rgba, k: f64) -> Rgba {
    [
        (c[0] as f64 * k) as u8,
        (c[1] as f64 * k) as u8,
        (c[2] as f64 * k) as u8,
        c[3],
    ]
}

/// Translucent dark hatch.
fn default_cover() -> Texture {
    Texture::checker(
        COVER_TEXTURE,
        FALLBACK_SIZE,
        4,
        [0x30, 0x30, 0x30, 0xE0],
        [0x10, 0x10, 0x10, 0xB0],
    )
}

/// Catalog holding every structure the tile tables name.
///
/// With `texture_dir`, faces are read from `<dir>/<LUMP>.png` and the
/// cover overlay from `<dir>/COVER.png`; anything missing is logged and
/// replaced by a generated texture.
pub fn standard_catalog(texture_dir: Option<&Path>) -> Result<Catalog, CatalogError> {
    let mut loader = TextureLoader {
        bank: TextureBank::default_with_checker(),
        dir: texture_dir,
    };
    let cover = loader.load(COVER_TEXTURE, default_cover)?;

    let mut walls = Vec::with_capacity(WALLS.len());
    for def in WALLS {
        let [a, b] = def.faces;
        let (t1, t2) = if def.covered {
            (
                loader.covered_face(a, def.swatch, cover)?,
                loader.covered_face(b, shade(def.swatch, 0.7), cover)?,
            )
        } else {
            (
                loader.face(a, def.swatch)?,
                loader.face(b, shade(def.swatch, 0.7))?,
            )
        };

        let mut s = Structure::new(def.name)
            .with_texture(t1)
            .with_second_texture(t2)
            .with_flags(StructureFlags::WALL);
        if !def.door {
            s = s.with_flags(StructureFlags::OBSTACLE);
        }
        if def.covered {
            s = s.with_overlay(cover);
        }
        walls.push(s);
    }

    let mut specials = Vec::with_capacity(SPECIALS.len());
    for def in SPECIALS {
        let mut s = Structure::new(def.name).with_flags(def.flags);
        if let Some(sprite) = def.sprite {
            s = s.with_texture(loader.face(sprite, def.swatch)?);
        }
        specials.push(s);
    }

    let mut catalog = Catalog::new(loader.bank)?;
    for s in walls.into_iter().chain(specials) {
        catalog.add(s)?;
    }
    log::debug!(
        "standard catalog: {} structures, {} textures",
        catalog.len(),
        catalog.textures().len()
    );
    Ok(catalog)
}

/*=======================================================================*/
/*                                Tests                                  */
/*=======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_resolves() {
        let cat = standard_catalog(None).unwrap();
        for code in 0..=u16::MAX {
            for tile in [wall_tile(code), special_tile(code)] {
                if let Tile::Named(name) = tile {
                    assert!(cat.id(name).is_some(), "{code:#06x} names missing `{name}`");
                }
            }
        }
    }

    #[test]
    fn wall_codes() {
        let cat = standard_catalog(None).unwrap();
        let get = |code| cat.get(wall_tile(code).resolve(&cat, StructureId::UNKNOWN));

        let stone = get(0x01);
        assert!(stone.is_wall() && stone.is_obstacle());
        assert_ne!(stone.texture, stone.texture2);

        let door = get(0x5A);
        assert!(door.is_wall() && !door.is_obstacle());
        assert!(std::ptr::eq(door, get(0x5B)));
        assert!(!get(0x64).is_obstacle());
        assert!(get(0x15).is_obstacle());

        for code in [0x00, 0x6A, 0x7F, 0x8F] {
            assert!(std::ptr::eq(get(code), cat.get(StructureId::NONE)));
        }
        for code in [0x0D, 0x69, 0x90, 0xFFFF] {
            assert_eq!(wall_tile(code), Tile::Unknown);
            assert!(get(code).is_wall());
        }
    }

    #[test]
    fn special_codes() {
        let cat = standard_catalog(None).unwrap();
        let get = |code| cat.get(special_tile(code).resolve(&cat, StructureId::UNKNOWN_SPECIAL));

        assert!(get(0x18).is_obstacle() && get(0x18).is_decoration());
        assert!(get(0x17).is_decoration() && !get(0x17).is_obstacle());
        assert!(get(0x30).is_item());
        assert!(get(0x5A).flags.is_empty());
        assert_eq!(get(0x5A).name, "guard");
        assert_eq!(get(0xD5).name, "dog");
        assert!(get(0x13).flags.is_empty());
        assert_eq!(get(0x99).name, "unknown special");
        assert!(!get(0x99).is_wall());
    }

    #[test]
    fn start_headings() {
        assert_eq!(start_heading(0x13), Some(FRAC_PI_2));
        assert_eq!(start_heading(0x14), Some(0.0));
        assert_eq!(start_heading(0x15), Some(3.0 * FRAC_PI_2));
        assert_eq!(start_heading(0x16), Some(PI));
        assert_eq!(start_heading(0x17), None);
    }

    #[test]
    fn covered_faces_are_blended() {
        let cat = standard_catalog(None).unwrap();
        let banner = cat.get(cat.id("banner on stone wall").unwrap());
        let bank = cat.textures();

        assert_eq!(banner.overlay, bank.id(COVER_TEXTURE));
        let face = bank.texture(banner.texture.unwrap()).unwrap();
        let raw = bank.texture(bank.id("WAL00004").unwrap()).unwrap();
        assert_eq!(bank.id("WAL00004+COVER"), banner.texture);
        assert_ne!(face.pixels(), raw.pixels());
    }

    #[test]
    fn textures_come_from_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut img = image::RgbaImage::new(4, 4);
        for p in img.pixels_mut() {
            *p = image::Rgba([1, 2, 3, 255]);
        }
        img.save(dir.path().join("WAL00000.png")).unwrap();

        let cat = standard_catalog(Some(dir.path())).unwrap();
        let stone = cat.get(cat.id("grey stone wall 1").unwrap());
        let face = cat.face_texture(stone, false).unwrap();
        assert_eq!((face.w, face.h), (4, 4));
        assert_eq!(face.dominant_colour(), [1, 2, 3, 255]);

        // no file for the second face: generated fallback
        let other = cat.face_texture(stone, true).unwrap();
        assert_eq!((other.w, other.h), (FALLBACK_SIZE, FALLBACK_SIZE));
    }
}
