//! The grid contract the ray caster works against.
//!
//! Coordinates are integer cell indices, `x` growing east and `y` growing
//! north.  Cell `(x, y)` covers `[x, x+1) × [y, y+1)` in map units.

use thiserror::Error;

use crate::world::structure::{Catalog, Structure, StructureId};

/// A cell together with what occupies it.  Produced on demand.
#[derive(Clone, Copy, Debug)]
pub struct Cell<'a> {
    pub x: i32,
    pub y: i32,
    pub structure: &'a Structure,
}

/// Read-only level grid.
///
/// Implementors only resolve structures; `wall_at` / `obstacle_at` derive
/// from their flags.  Out-of-range cells must resolve to an empty
/// structure, never panic.
///
/// Rays terminate on the first `wall_at` cell, so a playable map needs a
/// closed ring of walls around every reachable cell.
pub trait Map {
    fn start_x(&self) -> f64;
    fn start_y(&self) -> f64;
    /// Heading in radians, 0 = east, counter-clockwise.
    fn start_dir(&self) -> f64;
    fn width(&self) -> i32;
    fn height(&self) -> i32;

    fn structure_at(&self, x: i32, y: i32) -> &Structure;
    fn special_at(&self, x: i32, y: i32) -> &Structure;

    #[inline]
    fn wall_at(&self, x: i32, y: i32) -> bool {
        self.structure_at(x, y).is_wall()
    }

    #[inline]
    fn obstacle_at(&self, x: i32, y: i32) -> bool {
        self.structure_at(x, y).is_obstacle() || self.special_at(x, y).is_obstacle()
    }

    #[inline]
    fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width() && y < self.height()
    }

    fn cell(&self, x: i32, y: i32) -> Cell<'_> {
        Cell {
            x,
            y,
            structure: self.structure_at(x, y),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MapError {
    #[error("{len} cells do not form rows of width {width}")]
    Shape { width: usize, len: usize },
}

/// Id grid shared by both map implementations: engine order, row `y`
/// starts at `y * width`.
#[derive(Clone, Debug)]
pub(crate) struct IdGrid {
    pub width: usize,
    pub height: usize,
    pub ids: Vec<StructureId>,
}

impl IdGrid {
    pub fn filled(width: usize, height: usize, id: StructureId) -> Self {
        Self {
            width,
            height,
            ids: vec![id; width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> StructureId {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return StructureId::NONE;
        }
        self.ids[y as usize * self.width + x as usize]
    }
}

/// In-memory grid of tile codes, resolved through a caller-given function.
///
/// Mostly for tests and demos:
///
/// ```text
///   codes = [1, 1, 1,        y
///            1, 0, 1,        ^  row 2:  1 1 1
///            1, 1, 1]        |  row 1:  1 0 1
///                            |  row 0:  1 1 1
///                            +--------> x
/// ```
pub struct GridMap<'a> {
    catalog: &'a Catalog,
    structures: IdGrid,
    specials: IdGrid,
    start: (f64, f64, f64),
}

impl<'a> GridMap<'a> {
    /// `codes` holds `width`-long rows, row 0 being `y = 0`.
    pub fn new(
        catalog: &'a Catalog,
        width: usize,
        codes: &[u16],
        resolve: impl Fn(u16) -> StructureId,
    ) -> Result<Self, MapError> {
        if width == 0 || codes.len() % width != 0 {
            return Err(MapError::Shape {
                width,
                len: codes.len(),
            });
        }
        let height = codes.len() / width;
        let structures = IdGrid {
            width,
            height,
            ids: codes.iter().map(|&c| resolve(c)).collect(),
        };
        Ok(Self {
            catalog,
            specials: IdGrid::filled(width, height, StructureId::NONE),
            structures,
            start: (width as f64 / 2.0, height as f64 / 2.0, 0.0),
        })
    }

    pub fn with_start(mut self, x: f64, y: f64, dir: f64) -> Self {
        self.start = (x, y, dir);
        self
    }

    /// Same layout as the structure codes.
    pub fn with_specials(
        mut self,
        codes: &[u16],
        resolve: impl Fn(u16) -> StructureId,
    ) -> Result<Self, MapError> {
        if codes.len() != self.structures.ids.len() {
            return Err(MapError::Shape {
                width: self.structures.width,
                len: codes.len(),
            });
        }
        self.specials.ids = codes.iter().map(|&c| resolve(c)).collect();
        Ok(self)
    }
}

impl Map for GridMap<'_> {
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

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
