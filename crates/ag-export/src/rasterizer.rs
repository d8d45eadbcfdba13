use std::collections::HashMap;

use ab_glyph::{Font, FontArc, PxScale, point};
use ag_core::color::Rgb;
use ag_core::frame::{RenderedCell, RenderedGrid};
use font8x8::{BASIC_FONTS, BLOCK_FONTS, BOX_FONTS, GREEK_FONTS, LATIN_FONTS, UnicodeFonts};
use image::RgbaImage;
use rayon::prelude::*;

/// Glyph color for cells without a foreground annotation.
pub const DEFAULT_FG: Rgb = (192, 192, 192);
/// Backdrop for cells without a background annotation.
pub const DEFAULT_BG: Rgb = (0, 0, 0);

/// Drawn in place of characters the bitmap font does not cover.
const FALLBACK_CHAR: char = '?';

#[derive(Clone)]
enum GlyphSource {
    /// font8x8, each source row doubled so cells keep a 1:2 terminal aspect.
    Bitmap { scale: u32 },
    Outline { font: FontArc, scale: PxScale },
}

/// Convertit une RenderedGrid en pixels RGBA.
///
/// Keeps an alpha atlas per character; call [`Rasterizer::prepare`] with the
/// characters of a sequence before rendering it.
///
/// # Example
/// ```
/// use ag_core::frame::RenderedGrid;
/// use ag_export::rasterizer::Rasterizer;
/// let r = Rasterizer::builtin(1);
/// assert_eq!(r.cell_size(), (8, 16));
/// let img = r.render(&RenderedGrid::new(3, 2));
/// assert_eq!(img.dimensions(), (24, 32));
/// ```
#[derive(Clone)]
pub struct Rasterizer {
    source: GlyphSource,
    char_width: u32,
    char_height: u32,
    /// Maps a char to its alpha buffer (size = char_width * char_height).
    glyph_cache: HashMap<char, Vec<u8>>,
    empty_glyph: Vec<u8>,
}

impl Rasterizer {
    /// Builtin 8×8 bitmap font, every pixel scaled by `scale` (row height doubled).
    #[must_use]
    pub fn builtin(scale: u32) -> Self {
        let scale = scale.max(1);
        let mut rasterizer = Self::with_cell(GlyphSource::Bitmap { scale }, 8 * scale, 16 * scale);
        rasterizer.prepare((32u8..=126).map(char::from));
        rasterizer
    }

    /// Outline font (TTF/OTF) rendered at `scale_px` pixels per em.
    ///
    /// # Errors
    /// Retourne une erreur si la police fournie est invalide.
    pub fn from_font(font_data: Vec<u8>, scale_px: f32) -> anyhow::Result<Self> {
        let font = FontArc::try_from_vec(font_data)?;
        let scale = PxScale::from(scale_px);

        let v_advance = font.ascent_unscaled() - font.descent_unscaled() + font.line_gap_unscaled();
        let height = (v_advance * scale.y / font.height_unscaled()).ceil() as u32;

        let m_glyph = font.glyph_id('M');
        let h_advance = font.h_advance_unscaled(m_glyph);
        let width = (h_advance * scale.x / font.height_unscaled()).ceil() as u32;

        let mut rasterizer =
            Self::with_cell(GlyphSource::Outline { font, scale }, width.max(1), height.max(1));
        rasterizer.prepare((32u8..=126).map(char::from));
        Ok(rasterizer)
    }

    fn with_cell(source: GlyphSource, char_width: u32, char_height: u32) -> Self {
        Self {
            source,
            char_width,
            char_height,
            glyph_cache: HashMap::new(),
            empty_glyph: vec![0u8; (char_width * char_height) as usize],
        }
    }

    /// Pixel size of one character cell.
    #[must_use]
    pub fn cell_size(&self) -> (u32, u32) {
        (self.char_width, self.char_height)
    }

    /// Pixel size of the image rendered from a `grid_w`×`grid_h` grid.
    #[must_use]
    pub fn target_dimensions(&self, grid_w: u32, grid_h: u32) -> (u32, u32) {
        (grid_w * self.char_width, grid_h * self.char_height)
    }

    /// Rasterize and cache every character not seen yet.
    pub fn prepare(&mut self, chars: impl IntoIterator<Item = char>) {
        for ch in chars {
            if self.glyph_cache.contains_key(&ch) {
                continue;
            }
            let glyph = self.rasterize(ch);
            self.glyph_cache.insert(ch, glyph);
        }
    }

    fn rasterize(&self, ch: char) -> Vec<u8> {
        let mut buffer = vec![0u8; (self.char_width * self.char_height) as usize];
        match &self.source {
            GlyphSource::Bitmap { scale } => {
                let rows = bitmap_rows(ch);
                for (py, line) in buffer.chunks_exact_mut(self.char_width as usize).enumerate() {
                    let bits = rows[py / (2 * *scale as usize)];
                    for (px, alpha) in line.iter_mut().enumerate() {
                        if bits & (1 << (px / *scale as usize)) != 0 {
                            *alpha = 255;
                        }
                    }
                }
            }
            GlyphSource::Outline { font, scale } => {
                // glyph_id 0 = .notdef: leave blank rather than drawing a box.
                let gid = font.glyph_id(ch);
                if gid.0 == 0 {
                    return buffer;
                }
                let ascent_px = font.ascent_unscaled() * scale.y / font.height_unscaled();
                let glyph = gid.with_scale_and_position(*scale, point(0.0, ascent_px));
                if let Some(outline) = font.outline_glyph(glyph) {
                    let bounds = outline.px_bounds();
                    #[allow(clippy::cast_possible_wrap)]
                    outline.draw(|x, y, v| {
                        let px = (x as i32 + bounds.min.x as i32).max(0) as u32;
                        let py = (y as i32 + bounds.min.y as i32).max(0) as u32;
                        if px < self.char_width && py < self.char_height {
                            let idx = (py * self.char_width + px) as usize;
                            buffer[idx] = buffer[idx].max((v * 255.0).round() as u8);
                        }
                    });
                }
            }
        }
        buffer
    }

    /// Rendu de la grille. Uncached characters draw as blank cells.
    #[must_use]
    pub fn render(&self, grid: &RenderedGrid) -> RgbaImage {
        let (w, h) = self.target_dimensions(grid.width, grid.height);
        let mut data = vec![0u8; w as usize * h as usize * 4];
        let stride = w as usize * 4;
        let band_size = stride * self.char_height as usize;

        if band_size > 0 {
            data.par_chunks_exact_mut(band_size)
                .zip(grid.rows().collect::<Vec<_>>())
                .for_each(|(band, row)| self.render_band(band, row, stride));
        }

        RgbaImage::from_raw(w, h, data).unwrap_or_else(|| RgbaImage::new(w, h))
    }

    fn render_band(&self, band: &mut [u8], row: &[RenderedCell], stride: usize) {
        let cw = self.char_width as usize;
        for (gx, cell) in row.iter().enumerate() {
            let alpha_map = self.glyph_cache.get(&cell.ch).unwrap_or(&self.empty_glyph);
            let fg = cell.color.fg.unwrap_or(DEFAULT_FG);
            let bg = cell.color.bg.unwrap_or(DEFAULT_BG);
            let x0 = gx * cw;

            for (cy, alpha_row) in alpha_map.chunks_exact(cw).enumerate() {
                let line = &mut band[cy * stride..(cy + 1) * stride];
                for (cx, &alpha) in alpha_row.iter().enumerate() {
                    let a = f32::from(alpha) / 255.0;
                    let mix = |f: u8, b: u8| (f32::from(f) * a + f32::from(b) * (1.0 - a)).round() as u8;
                    let idx = (x0 + cx) * 4;
                    line[idx] = mix(fg.0, bg.0);
                    line[idx + 1] = mix(fg.1, bg.1);
                    line[idx + 2] = mix(fg.2, bg.2);
                    line[idx + 3] = 255;
                }
            }
        }
    }
}

/// 8 rows of the bitmap glyph, bit 0 = leftmost pixel.
fn bitmap_rows(ch: char) -> [u8; 8] {
    if ch == ' ' {
        return [0; 8];
    }
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BLOCK_FONTS.get(ch))
        .or_else(|| BOX_FONTS.get(ch))
        .or_else(|| GREEK_FONTS.get(ch))
        .or_else(|| {
            log::debug!("Caractère {ch:?} absent de la police intégrée");
            BASIC_FONTS.get(FALLBACK_CHAR)
        })
        .unwrap_or([0; 8])
}
