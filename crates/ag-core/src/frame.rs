use std::time::Duration;

use crate::color::Rgb;
use crate::error::RenderError;

/// Immutable RGBA8 raster, row-major, 4 bytes per pixel.
///
/// One still image or one animation frame.
///
/// # Example
/// ```
/// use ag_core::frame::Image;
/// let img = Image::filled(4, 2, [255, 0, 0, 255]).unwrap();
/// assert_eq!(img.pixel(3, 1), (255, 0, 0, 255));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Image {
    /// Wrap a raw RGBA buffer.
    ///
    /// # Errors
    /// Returns [`RenderError::InvalidImage`] if a dimension is zero or the
    /// buffer length is not `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidImage(format!(
                "dimensions nulles {width}×{height}"
            )));
        }
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(RenderError::InvalidImage(format!(
                "buffer de {} octets, attendu {expected} pour {width}×{height}",
                data.len()
            )));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Image where every pixel is `rgba`.
    ///
    /// # Errors
    /// Returns [`RenderError::InvalidImage`] if a dimension is zero.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, RenderError> {
        let count = width as usize * height as usize;
        let data = rgba.iter().copied().cycle().take(count * 4).collect();
        Self::from_rgba(width, height, data)
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes.
    #[inline]
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Pixel (x, y) → (r, g, b, a).
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8, u8) {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        (
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        )
    }

    /// One row of raw RGBA bytes.
    #[inline]
    #[must_use]
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * 4;
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }
}

/// Ordered (frame, duration) pairs decoded from an animated source.
///
/// Order is significant and preserved end-to-end.
#[derive(Clone, Debug, Default)]
pub struct AnimationSource {
    pub frames: Vec<(Image, Duration)>,
}

impl AnimationSource {
    /// Single-frame source wrapping a still image.
    #[must_use]
    pub fn still(image: Image) -> Self {
        Self {
            frames: vec![(image, Duration::ZERO)],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// `true` when the source has more than one frame.
    #[must_use]
    pub fn is_animated(&self) -> bool {
        self.frames.len() > 1
    }
}

/// Summary of one rectangular pixel block.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cell {
    /// Alpha-weighted perceptual luminance in [0.0, 1.0].
    pub luminance: f32,
    /// Alpha-weighted mean color; `None` when the block has no weight.
    pub color: Option<Rgb>,
    /// Background cells render blank with no color.
    pub background: bool,
}

/// Grid of [`Cell`]s, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct CellGrid {
    pub cells: Vec<Cell>,
    pub width: u32,
    pub height: u32,
}

impl CellGrid {
    #[inline]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> &Cell {
        &self.cells[y as usize * self.width as usize + x as usize]
    }
}

/// Color annotation of a rendered character.
///
/// # Example
/// ```
/// use ag_core::frame::CellColor;
/// assert!(CellColor::default().is_none());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellColor {
    /// Glyph color.
    pub fg: Option<Rgb>,
    /// Backdrop color.
    pub bg: Option<Rgb>,
}

impl CellColor {
    pub const NONE: Self = Self { fg: None, bg: None };

    #[must_use]
    pub fn is_none(&self) -> bool {
        self.fg.is_none() && self.bg.is_none()
    }
}

/// Single cell of the rendered grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderedCell {
    /// Caractère à afficher.
    pub ch: char,
    pub color: CellColor,
}

impl Default for RenderedCell {
    fn default() -> Self {
        Self {
            ch: ' ',
            color: CellColor::NONE,
        }
    }
}

/// Renderer output: one [`RenderedCell`] per sampled cell.
///
/// # Example
/// ```
/// use ag_core::frame::{RenderedGrid, RenderedCell, CellColor};
/// let mut grid = RenderedGrid::new(3, 2);
/// grid.set(2, 1, RenderedCell { ch: '@', color: CellColor::NONE });
/// assert_eq!(grid.to_plain_string(), "   \n  @");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RenderedGrid {
    pub cells: Vec<RenderedCell>,
    pub width: u32,
    pub height: u32,
}

impl RenderedGrid {
    /// Blank grid of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            cells: vec![RenderedCell::default(); width as usize * height as usize],
            width,
            height,
        }
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, cell: RenderedCell) {
        self.cells[y as usize * self.width as usize + x as usize] = cell;
    }

    #[inline]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> &RenderedCell {
        &self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Rows of cells, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[RenderedCell]> {
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// Glyphs only, rows joined by `\n`, no trailing newline.
    #[must_use]
    pub fn to_plain_string(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.height as usize);
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.extend(row.iter().map(|c| c.ch));
        }
        out
    }
}

/// Rendered animation: grids paired with their display durations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderedSequence {
    pub frames: Vec<(RenderedGrid, Duration)>,
}

impl RenderedSequence {
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Sum of all frame durations.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.frames.iter().map(|(_, d)| *d).sum()
    }
}
