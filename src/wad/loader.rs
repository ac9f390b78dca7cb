// ──────────────────────────────────────────────────────────────────────────
// wad/loader.rs
//
//  *   LevelMap   (wad::level)           ──╮
//  *   tile tables (wad::tiles)            │   --->  ArchiveMap: world::Map
//  *   Catalog     (shared, read-only)     │
//                                          ╯
// ──────────────────────────────────────────────────────────────────────────

use crate::{
    wad::{
        level::{LevelMap, SPECIAL_PLANE, WALL_PLANE},
        tiles::{Tile, special_tile, start_heading, wall_tile},
    },
    world::{Catalog, Map, Structure, StructureId, map::IdGrid},
};

/// A decoded level seen through the [`Map`] trait.
///
/// Archive rows run north to south while map `y` grows north, so cell
/// `(x, y)` reads archive row `height - 1 - y`.  All codes are resolved
/// once here; lookups afterwards are plain index math.
pub struct ArchiveMap<'a> {
    catalog: &'a Catalog,
    name: String,
    structures: IdGrid,
    specials: IdGrid,
    start: (f64, f64, f64),
}

impl<'a> ArchiveMap<'a> {
    pub fn new(level: &LevelMap, catalog: &'a Catalog) -> Self {
        let structures = resolve_plane(level, WALL_PLANE, catalog, wall_tile, StructureId::UNKNOWN);
        let specials = resolve_plane(
            level,
            SPECIAL_PLANE,
            catalog,
            special_tile,
            StructureId::UNKNOWN_SPECIAL,
        );

        let start = find_start(level).unwrap_or_else(|| {
            log::warn!("{}: no start marker, using map centre", level.name);
            (level.width as f64 / 2.0, level.height as f64 / 2.0, 0.0)
        });

        Self {
            catalog,
            name: level.name.clone(),
            structures,
            specials,
            start,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }
}

fn resolve_plane(
    level: &LevelMap,
    plane: usize,
    catalog: &Catalog,
    table: fn(u16) -> Tile,
    unknown: StructureId,
) -> IdGrid {
    let (w, h) = (level.width, level.height);
    let mut grid = IdGrid::filled(w, h, StructureId::NONE);
    if !level.has_plane(plane) {
        log::debug!("{}: plane {plane} absent", level.name);
        return grid;
    }

    let mut unknown_codes = 0usize;
    for y in 0..h {
        for x in 0..w {
            let Some(code) = level.value(plane, x as i32, (h - 1 - y) as i32) else {
                continue;
            };
            let tile = table(code);
            if tile == Tile::Unknown {
                unknown_codes += 1;
            }
            grid.ids[y * w + x] = tile.resolve(catalog, unknown);
        }
    }
    if unknown_codes > 0 {
        log::debug!("{}: {unknown_codes} unknown codes in plane {plane}", level.name);
    }
    grid
}

/// First start marker in archive order, as `(x, y, heading)` in map space.
fn find_start(level: &LevelMap) -> Option<(f64, f64, f64)> {
    let specials = level.plane(SPECIAL_PLANE)?;
    specials.iter().enumerate().find_map(|(i, &code)| {
        let dir = start_heading(code)?;
        let (ax, ay) = (i % level.width, i / level.width);
        let y = level.height - 1 - ay;
        Some((ax as f64 + 0.5, y as f64 + 0.5, dir))
    })
}

impl Map for ArchiveMap<'_> {
    fn start_x(&self) -> f64 {
        self.start.0
    }
    fn start_y(&self) -> f64 {
        self.start.1
    }
    fn start_dir(&self) -> f64 {
        self.start.2
    }
    fn width(&self) -> i32 {
        self.structures.width as i32
    }
    fn height(&self) -> i32 {
        self.structures.height as i32
    }

    fn structure_at(&self, x: i32, y: i32) -> &Structure {
        self.catalog.get(self.structures.get(x, y))
    }

    fn special_at(&self, x: i32, y: i32) -> &Structure {
        self.catalog.get(self.specials.get(x, y))
    }
}

/*=======================================================================*/
/*                                Tests                                  */
/*=======================================================================*/
