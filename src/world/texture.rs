// Format-agnostic repository of wall / sprite textures.
// The renderer and the catalog interact through `TextureId` only.

use std::{collections::HashMap, path::Path};

/// Runtime handle for a texture in this bank.
///
/// *Guaranteed* to remain stable for the lifetime of the bank.
pub type TextureId = u16;

/// `TextureId` whose pixels are the checkerboard fallback.
/// Always = 0 because `TextureBank::new()` inserts it first.
pub const NO_TEXTURE: TextureId = 0;

/// One RGBA pixel.
pub type Rgba = [u8; 4];

/// CPU-side RGBA pixels in row-major order plus the mean colour.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub name: String,
    pub w: usize,
    pub h: usize,
    pixels: Vec<Rgba>,
    dominant: Rgba,
}

/// Convenience checkerboard 8×8 (dark/light grey).
impl Default for Texture {
    fn default() -> Self {
        const LIGHT: Rgba = [0xA0, 0xA0, 0xA0, 0xFF];
        const DARK: Rgba = [0x50, 0x50, 0x50, 0xFF];
        Texture::checker("CHECKER", 8, 1, LIGHT, DARK)
    }
}

/// Things that can go wrong when building textures or using the bank.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    /// Attempted to insert a second texture with an existing name.
    #[error("texture name `{0}` already present in bank")]
    Duplicate(String),

    /// Requested ID is outside `0 .. bank.len()`.
    #[error("texture id {0} out of range")]
    BadId(TextureId),

    #[error("texture `{name}`: {len} pixels do not fill {w}x{h}")]
    Size {
        name: String,
        w: usize,
        h: usize,
        len: usize,
    },

    #[error("texture `{name}`: {source}")]
    Image {
        name: String,
        source: image::ImageError,
    },
}

impl Texture {
    pub fn new<S: Into<String>>(
        name: S,
        w: usize,
        h: usize,
        pixels: Vec<Rgba>,
    ) -> Result<Self, TextureError> {
        let name = name.into();
        if w == 0 || h == 0 || pixels.len() != w * h {
            return Err(TextureError::Size {
                name,
                w,
                h,
                len: pixels.len(),
            });
        }
        let dominant = mean_colour(&pixels);
        Ok(Self {
            name,
            w,
            h,
            pixels,
            dominant,
        })
    }

    /// Decode a PNG (or any format `image` understands) into RGBA.
    pub fn from_png<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let rgba = image::open(path)
            .map_err(|source| TextureError::Image {
                name: name.clone(),
                source,
            })?
            .to_rgba8();
        let (w, h) = (rgba.width() as usize, rgba.height() as usize);
        let pixels = rgba.pixels().map(|p| p.0).collect();
        Self::new(name, w, h, pixels)
    }

    /// `size`×`size` board of `cell`-pixel squares.
    pub fn checker<S: Into<String>>(
        name: S,
        size: usize,
        cell: usize,
        light: Rgba,
        dark: Rgba,
    ) -> Self {
        let size = size.max(1);
        let cell = cell.max(1);
        let mut pixels = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                pixels.push(if (x / cell + y / cell) % 2 == 0 { light } else { dark });
            }
        }
        let dominant = mean_colour(&pixels);
        Self {
            name: name.into(),
            w: size,
            h: size,
            pixels,
            dominant,
        }
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Rgba {
        self.pixels[y * self.w + x]
    }

    /// Per-channel mean of every pixel, fixed at construction.
    #[inline]
    pub fn dominant_colour(&self) -> Rgba {
        self.dominant
    }

    /// Nearest-neighbour vertical strip.
    ///
    /// * Source column: `floor(w · x_offset)`, clamped to the texture.
    /// * Destination row `i` of `n = out.len()` reads source row
    ///   `floor(h · (y_length · i / n + y_offset))`, clamped to `0 .. h`.
    ///
    /// `y_offset = 0, y_length = 1` stretches the whole column over `out`;
    /// smaller windows crop, e.g. the middle of a wall taller than the
    /// screen.
    pub fn sample_column(&self, x_offset: f64, y_offset: f64, y_length: f64, out: &mut [Rgba]) {
        let src_x = ((self.w as f64 * x_offset) as usize).min(self.w - 1);
        let n = out.len() as f64;
        let last_row = self.h as i64 - 1;

        for (i, px) in out.iter_mut().enumerate() {
            let progress = i as f64 / n;
            let src_y = (self.h as f64 * (y_length * progress + y_offset)).floor() as i64;
            let src_y = src_y.clamp(0, last_row) as usize;
            *px = self.pixels[src_y * self.w + src_x];
        }
    }

    /// Composite `overlay` on top of `self` with normal alpha blending.
    ///
    /// The overlay is stretched to this texture's size.  The result keeps
    /// this texture's name.
    pub fn blend_over(&self, overlay: &Texture) -> Texture {
        let mut pixels = Vec::with_capacity(self.pixels.len());
        for y in 0..self.h {
            let oy = y * overlay.h / self.h;
            for x in 0..self.w {
                let ox = x * overlay.w / self.w;
                pixels.push(blend(self.pixel(x, y), overlay.pixel(ox, oy)));
            }
        }
        let dominant = mean_colour(&pixels);
        Texture {
            name: self.name.clone(),
            w: self.w,
            h: self.h,
            pixels,
            dominant,
        }
    }
}

fn mean_colour(pixels: &[Rgba]) -> Rgba {
    if pixels.is_empty() {
        return [0; 4];
    }
    let mut sum = [0u64; 4];
    for p in pixels {
        for c in 0..4 {
            sum[c] += p[c] as u64;
        }
    }
    let n = pixels.len() as u64;
    sum.map(|s| (s / n) as u8)
}

/// `src over dst`, 8-bit straight alpha.
fn blend(dst: Rgba, src: Rgba) -> Rgba {
    let sa = src[3] as u32;
    let inv = 255 - sa;
    let mut out = [0u8; 4];
    for c in 0..3 {
        out[c] = ((src[c] as u32 * sa + dst[c] as u32 * inv + 127) / 255) as u8;
    }
    out[3] = (sa + (dst[3] as u32 * inv + 127) / 255).min(255) as u8;
    out
}

/// A format-agnostic cache of textures.
///
/// * Does **not** know about archives or PNG – that’s the loader’s job.
/// * Stores exactly one copy of every name.
/// * ID **0** is always the “missing” checkerboard.
///
/// Filled once at start-up, then shared read-only (it is `Sync`).
pub struct TextureBank {
    by_name: HashMap<String, TextureId>,
    data: Vec<Texture>,
}

impl TextureBank {
    // ---------------------------------------------------------------------
    // Constructors
    // ---------------------------------------------------------------------

    /// Create an empty bank with a mandatory *missing* texture used as
    /// fallback.  The texture is inserted under the fixed name `"MISSING"`
    /// and obtains the handle **0**.
    pub fn new(missing_tex: Texture) -> Self {
        let mut by_name = HashMap::new();
        by_name.insert("MISSING".into(), NO_TEXTURE);
        Self {
            by_name,
            data: vec![missing_tex],
        }
    }

    pub fn default_with_checker() -> Self {
        Self::new(Texture::default())
    }

    // ---------------------------------------------------------------------
    // Query helpers
    // ---------------------------------------------------------------------

    /// Number of textures stored (including the “missing” one).
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.len() == 1
    } // only checker

    /// Obtain the id for a *loaded* texture by name.
    pub fn id(&self, name: &str) -> Option<TextureId> {
        self.by_name.get(name).copied()
    }

    /// Fallback-safe query: unknown names resolve to the checkerboard id.
    pub fn id_or_missing(&self, name: &str) -> TextureId {
        self.id(name).unwrap_or(NO_TEXTURE)
    }

    /// Borrow a texture by id, with bounds-checking.
    pub fn texture(&self, id: TextureId) -> Result<&Texture, TextureError> {
        self.data.get(id as usize).ok_or(TextureError::BadId(id))
    }

    /// Like [`texture`](Self::texture) but falls back to the checkerboard.
    #[inline]
    pub fn texture_or_missing(&self, id: TextureId) -> &Texture {
        self.data.get(id as usize).unwrap_or(&self.data[0])
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    /// Insert a texture under `name`.
    ///
    /// * Returns the newly assigned `TextureId`.
    /// * Fails if the name already exists (`Duplicate`).
    pub fn insert<S: Into<String>>(
        &mut self,
        name: S,
        tex: Texture,
    ) -> Result<TextureId, TextureError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(TextureError::Duplicate(name));
        }
        let id = self.data.len() as TextureId;
        self.data.push(tex);
        self.by_name.insert(name, id);
        Ok(id)
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = [255, 0, 0, 255];
    const BLUE: Rgba = [0, 0, 255, 255];

    fn solid(color: Rgba) -> Texture {
        Texture::new("Dummy", 2, 2, vec![color; 4]).unwrap()
    }

    /// 2 columns × 4 rows; pixel value encodes (column, row).
    fn gradient() -> Texture {
        let mut px = Vec::new();
        for y in 0..4u8 {
            for x in 0..2u8 {
                px.push([x, y, 0, 255]);
            }
        }
        Texture::new("GRAD", 2, 4, px).unwrap()
    }

    #[test]
    fn insert_and_lookup() {
        let mut bank = TextureBank::default_with_checker();
        let red = bank.insert("RED", solid(RED)).unwrap();
        let blue = bank.insert("BLUE", solid(BLUE)).unwrap();

        assert_ne!(red, NO_TEXTURE);
        assert_ne!(blue, red);
        assert_eq!(bank.id("RED"), Some(red));
        assert_eq!(bank.id("BLUE"), Some(blue));
        assert_eq!(bank.id("NOPE"), None);
        assert_eq!(bank.id_or_missing("NOPE"), NO_TEXTURE);

        assert_eq!(bank.texture(red).unwrap().pixel(0, 0), RED);
        assert_eq!(bank.texture(blue).unwrap().pixel(1, 1), BLUE);
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut bank = TextureBank::default_with_checker();
        bank.insert("WOOD", solid(RED)).unwrap();
        let err = bank.insert("WOOD", solid(BLUE)).unwrap_err();
        assert!(matches!(err, TextureError::Duplicate(ref n) if n == "WOOD"));
        // texture count still 2 (checker + first WOOD)
        assert_eq!(bank.len(), 2);
    }

    #[test]
    fn bad_id_guard() {
        let bank = TextureBank::default_with_checker();
        let bad = TextureId::MAX;
        assert!(matches!(bank.texture(bad), Err(TextureError::BadId(id)) if id == bad));
        assert_eq!(bank.texture_or_missing(bad).name, "CHECKER");
    }

    #[test]
    fn size_mismatch_rejected() {
        let err = Texture::new("BAD", 3, 3, vec![RED; 8]).unwrap_err();
        assert!(matches!(err, TextureError::Size { len: 8, .. }));
        assert!(Texture::new("EMPTY", 0, 0, vec![]).is_err());
    }

    #[test]
    fn dominant_colour_is_channel_mean() {
        let t = Texture::new("MIX", 2, 1, vec![[200, 0, 10, 255], [100, 50, 30, 255]]).unwrap();
        assert_eq!(t.dominant_colour(), [150, 25, 20, 255]);
        assert_eq!(solid(RED).dominant_colour(), RED);
    }

    #[test]
    fn full_column_stretches() {
        let t = gradient();
        let mut out = [[0u8; 4]; 8];
        t.sample_column(0.75, 0.0, 1.0, &mut out);
        let rows: Vec<u8> = out.iter().map(|p| p[1]).collect();
        assert_eq!(rows, [0, 0, 1, 1, 2, 2, 3, 3]);
        assert!(out.iter().all(|p| p[0] == 1));
    }

    #[test]
    fn cropped_window_reads_middle() {
        let t = gradient();
        let mut out = [[0u8; 4]; 4];
        t.sample_column(0.0, 0.25, 0.5, &mut out);
        let rows: Vec<u8> = out.iter().map(|p| p[1]).collect();
        assert_eq!(rows, [1, 1, 2, 2]);
    }

    #[test]
    fn out_of_range_offsets_clamp() {
        let t = gradient();
        let mut out = [[0u8; 4]; 2];
        t.sample_column(1.0, 0.9, 1.0, &mut out);
        assert_eq!(out, [[1, 3, 0, 255], [1, 3, 0, 255]]);

        t.sample_column(0.0, -0.5, 0.1, &mut out);
        assert_eq!(out, [[0, 0, 0, 255], [0, 0, 0, 255]]);
    }

    #[test]
    fn blend_respects_alpha() {
        let base = solid([0, 0, 200, 255]);
        let clear = Texture::new("CLEAR", 1, 1, vec![[255, 255, 255, 0]]).unwrap();
        assert_eq!(base.blend_over(&clear).pixels(), base.pixels());

        let opaque = Texture::new("OPAQUE", 1, 1, vec![RED]).unwrap();
        let out = base.blend_over(&opaque);
        assert!(out.pixels().iter().all(|&p| p == RED));
        assert_eq!(out.name, "Dummy");

        let half = Texture::new("HALF", 1, 1, vec![[255, 0, 0, 128]]).unwrap();
        let p = base.blend_over(&half).pixel(0, 0);
        assert_eq!(p[3], 255);
        assert!((126..=130).contains(&p[0]));
        assert!((97..=101).contains(&p[2]));
    }

    #[test]
    fn png_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("WAL00000.png");
        let mut img = image::RgbaImage::new(2, 2);
        img.put_pixel(1, 0, image::Rgba(RED));
        img.save(&path).unwrap();

        let t = Texture::from_png(&path).unwrap();
        assert_eq!(t.name, "WAL00000");
        assert_eq!((t.w, t.h), (2, 2));
        assert_eq!(t.pixel(1, 0), RED);
        assert_eq!(t.pixel(0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn missing_png_is_image_error() {
        let err = Texture::from_png("/nonexistent/WAL00042.png").unwrap_err();
        assert!(matches!(err, TextureError::Image { ref name, .. } if name == "WAL00042"));
    }
}
