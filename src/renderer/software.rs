//! ---------------------------------------------------------------------------
//! Software (CPU) column painter
//!
//! * Fills a `Vec<u32>` frame-buffer in **0xAARRGGBB** format.
//! * Every column is independent: backdrop first, then one wall slice whose
//!   height is `h / perpendicular_distance`, centred on the horizon.
//! * Slices taller than the screen are cropped to their middle part.
//! ---------------------------------------------------------------------------

use crate::{
    engine::{IntersectionInfo, Side},
    renderer::{Lighting, Pixel, Renderer, pack},
    world::{Catalog, NO_TEXTURE, Rgba},
};

const CEILING: Rgba = [0x3B, 0x3B, 0x3B, 0xFF];
const FLOOR: Rgba = [0x6B, 0x6B, 0x6B, 0xFF];
const CROSSHAIR: Pixel = 0xFF_FF0000;
const CROSSHAIR_ARM: usize = 4;

/// How wall slices are filled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PaintMode {
    #[default]
    Textured,
    /// One colour per structure face.
    Flat,
}

impl PaintMode {
    pub fn toggled(self) -> Self {
        match self {
            PaintMode::Textured => PaintMode::Flat,
            PaintMode::Flat => PaintMode::Textured,
        }
    }
}

/*───────────────────────────────────────────────────────────────────────*/
/*                              Backend                                 */
/*───────────────────────────────────────────────────────────────────────*/

#[derive(Default)]
pub struct Software {
    scratch: Vec<Pixel>,
    /// One wall slice before shading.
    column: Vec<Rgba>,
    width: usize,
    height: usize,

    pub mode: PaintMode,
    pub lighting: Lighting,
    pub crosshair: bool,
}

impl Software {
    pub fn new(mode: PaintMode, lighting: Lighting) -> Self {
        Self {
            mode,
            lighting,
            ..Self::default()
        }
    }

    /// Ceiling above the horizon, floor below, lit as a plane at the
    /// distance that row would see.
    fn backdrop_row(&self, y: usize) -> Pixel {
        let half = self.height as f64 / 2.0;
        let base = if (y as f64) < half { CEILING } else { FLOOR };
        let distance = 1.0 / ((half - y as f64).abs() * 2.0 / self.height as f64);
        // y component of normalize((distance, 1)); 0 on the horizon
        let cos = 1.0 / (distance * distance + 1.0).sqrt();
        pack(self.lighting.shade(base, cos, distance))
    }

    fn draw_column(&mut self, x: usize, info: &IntersectionInfo<'_>, catalog: &Catalog) {
        if !info.hit {
            return;
        }
        let h = self.height;
        let perp = info.perpendicular_distance;
        let theoretical = if perp > 0.0 {
            (h as f64 / perp) as usize
        } else {
            usize::MAX
        };
        let actual = theoretical.min(h);
        if actual == 0 {
            return;
        }
        let top = (h - actual) / 2;

        let tex = catalog
            .face_texture(info.cell.structure, info.side == Side::Y)
            .unwrap_or_else(|| catalog.textures().texture_or_missing(NO_TEXTURE));

        self.column.clear();
        match self.mode {
            PaintMode::Textured => {
                let y_length = actual as f64 / theoretical as f64;
                let y_offset = (1.0 - y_length) / 2.0;
                self.column.resize(actual, [0; 4]);
                tex.sample_column(info.wall_offset, y_offset, y_length, &mut self.column);
            }
            PaintMode::Flat => self.column.resize(actual, tex.dominant_colour()),
        }

        let (cos, distance) = (info.cos_angle, info.distance());
        for (i, &px) in self.column.iter().enumerate() {
            self.scratch[(top + i) * self.width + x] = pack(self.lighting.shade(px, cos, distance));
        }
    }

    fn draw_crosshair(&mut self) {
        let (w, h) = (self.width, self.height);
        if w == 0 || h == 0 {
            return;
        }
        let (cx, cy) = (w / 2, h / 2);
        for y in cy.saturating_sub(CROSSHAIR_ARM)..(cy + CROSSHAIR_ARM + 1).min(h) {
            self.scratch[y * w + cx] = CROSSHAIR;
        }
        for x in cx.saturating_sub(CROSSHAIR_ARM)..(cx + CROSSHAIR_ARM + 1).min(w) {
            self.scratch[cy * w + x] = CROSSHAIR;
        }
    }
}

/*──────────────────────── Renderer trait impl ────────────────────────*/
impl Renderer for Software {
    fn begin_frame(&mut self, w: usize, h: usize) {
        // (re)allocate if resolution changed
        if w != self.width || h != self.height {
            self.width = w;
            self.height = h;
            self.scratch.resize(w * h, 0);
        }

        for y in 0..h {
            let c = self.backdrop_row(y);
            self.scratch[y * w..(y + 1) * w].fill(c);
        }
    }

    fn draw_columns(&mut self, columns: &[IntersectionInfo<'_>], catalog: &Catalog) {
        debug_assert!(columns.len() <= self.width);
        for (x, info) in columns.iter().take(self.width).enumerate() {
            self.draw_column(x, info, catalog);
        }
    }

    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Pixel], usize, usize),
    {
        if self.crosshair {
            self.draw_crosshair();
        }
        submit(&self.scratch, self.width, self.height);
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
