//! Rendering abstraction layer.
//!
//! *The rest of the engine never touches a pixel buffer directly.*
//! It produces one [`IntersectionInfo`] per screen column (left to right)
//! and hands them to a type that implements [`Renderer`].
//!
//! * [`Lighting`] is plain data owned by the caller; back-ends only read it.
//! * A helper blanket‐impl [`RendererExt`] adds `draw_frame` so call-sites
//!   stay short.

use crate::{
    engine::IntersectionInfo,
    world::{Catalog, Rgba},
};

/// Pixel format of the software frame-buffer (0xAARRGGBB).
pub type Pixel = u32;

#[inline]
pub fn pack(c: Rgba) -> Pixel {
    (c[3] as u32) << 24 | (c[0] as u32) << 16 | (c[1] as u32) << 8 | c[2] as u32
}

/*──────────────────────────── Lighting ────────────────────────────*/

/// Scene-wide light level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Ambient {
    Off,
    #[default]
    Full,
    Low,
}

impl Ambient {
    pub fn rgb(self) -> [f64; 3] {
        match self {
            Ambient::Off => [0.0; 3],
            Ambient::Full => [1.0; 3],
            Ambient::Low => [0.2, 0.2, 0.3],
        }
    }

    /// Off → Full → Low → Off.
    pub fn next(self) -> Self {
        match self {
            Ambient::Off => Ambient::Full,
            Ambient::Full => Ambient::Low,
            Ambient::Low => Ambient::Off,
        }
    }
}

/// Light colour carried by the observer.
pub const TORCH_RGB: [f64; 3] = [1.0, 1.0, 0.9];

/// Torch strength is `min(1, TORCH_REACH / d²)`.
pub const TORCH_REACH: f64 = 15.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Lighting {
    pub ambient: Ambient,
    pub torch: bool,
}

impl Lighting {
    /// `px·ambient + px·torch·cos·attenuation`, per channel, alpha kept.
    pub fn shade(&self, px: Rgba, cos_angle: f64, distance: f64) -> Rgba {
        let ambient = self.ambient.rgb();
        let torch = if self.torch { TORCH_RGB } else { [0.0; 3] };
        let falloff = (TORCH_REACH / (distance * distance)).clamp(0.0, 1.0);
        let k = cos_angle * falloff;

        let mut out = px;
        for c in 0..3 {
            let v = px[c] as f64 * (ambient[c] + torch[c] * k);
            out[c] = v.clamp(0.0, 255.0) as u8;
        }
        out
    }
}

/*──────────────────────────── Renderer ────────────────────────────*/

/// A renderer that owns an internal scratch buffer for the whole frame.
///
/// `end_frame` hands the finished buffer to a user-supplied closure.
/// Software callers typically forward it to their window-manager.
pub trait Renderer {
    /// (Re)allocate internal scratch for the requested resolution and clear it.
    fn begin_frame(&mut self, width: usize, height: usize);

    /// Paint one wall slice per entry of `columns`, column 0 leftmost.
    fn draw_columns(&mut self, columns: &[IntersectionInfo<'_>], catalog: &Catalog);

    /// Finish the frame and **loan** the finished buffer to `submit`.
    ///
    /// * `submit(&[Pixel], w, h)` is run exactly once per frame.
    /// * Software caller passes `|fb, w, h| window.update_with_buffer(fb, w, h)`.
    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Pixel], usize, usize);
}

/// Convenience blanket-impl with a one-liner `draw_frame` adaptor.
pub trait RendererExt: Renderer {
    fn draw_frame<F>(
        &mut self,
        width: usize,
        height: usize,
        columns: &[IntersectionInfo<'_>],
        catalog: &Catalog,
        submit: F,
    ) where
        F: FnOnce(&[Pixel], usize, usize),
    {
        self.begin_frame(width, height);
        self.draw_columns(columns, catalog);
        self.end_frame(submit);
    }
}
impl<T: Renderer + ?Sized> RendererExt for T {}

pub mod software;
pub use software::{PaintMode, Software};
