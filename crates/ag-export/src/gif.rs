use std::path::Path;
use std::time::Duration;

use ag_core::frame::{RenderedGrid, RenderedSequence};
use ag_core::traits::Encoder;
use anyhow::{Context, Result};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use rayon::prelude::*;

use crate::rasterizer::Rasterizer;

/// GIF canvases are addressed with 16-bit coordinates.
const MAX_GIF_SIDE: u32 = u16::MAX as u32;

/// Quantizer speed passed to the GIF encoder (1 = best, 30 = fastest).
const QUANTIZER_SPEED: i32 = 10;

/// Animated GIF export: grids rasterized then encoded, looping forever.
///
/// # Example
/// ```
/// use ag_core::frame::RenderedGrid;
/// use ag_core::traits::Encoder;
/// use ag_export::gif::GifExport;
/// let bytes = GifExport::builtin().encode_grid(&RenderedGrid::new(2, 1)).unwrap();
/// assert!(bytes.starts_with(b"GIF89a"));
/// ```
#[derive(Clone)]
pub struct GifExport {
    rasterizer: Rasterizer,
}

impl GifExport {
    /// Builtin bitmap font, 8×16 pixels per cell.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            rasterizer: Rasterizer::builtin(1),
        }
    }

    /// Load a TTF/OTF font from disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid font.
    pub fn with_font(path: &Path, scale_px: f32) -> Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("Impossible de lire la police {}", path.display()))?;
        let rasterizer = Rasterizer::from_font(data, scale_px)
            .with_context(|| format!("Police invalide : {}", path.display()))?;
        log::info!("Police chargée : {}", path.display());
        Ok(Self { rasterizer })
    }

    fn encode_frames(&self, frames: &[(RenderedGrid, Duration)]) -> Result<Vec<u8>> {
        let Some((first, _)) = frames.first() else {
            anyhow::bail!("Aucune frame à encoder");
        };
        let (w, h) = self.rasterizer.target_dimensions(first.width, first.height);
        if w > MAX_GIF_SIDE || h > MAX_GIF_SIDE {
            anyhow::bail!("Image {w}×{h} trop grande pour le format GIF (max {MAX_GIF_SIDE})");
        }

        let mut rasterizer = self.rasterizer.clone();
        rasterizer.prepare(frames.iter().flat_map(|(grid, _)| grid.cells.iter().map(|c| c.ch)));
        let images: Vec<RgbaImage> = frames
            .par_iter()
            .map(|(grid, _)| rasterizer.render(grid))
            .collect();
        log::debug!("GIF : {} frames {w}×{h}", images.len());

        let mut out = Vec::new();
        {
            let mut encoder = GifEncoder::new_with_speed(&mut out, QUANTIZER_SPEED);
            encoder
                .set_repeat(Repeat::Infinite)
                .context("Boucle GIF")?;
            encoder
                .encode_frames(images.into_iter().zip(frames).map(|(img, (_, duration))| {
                    Frame::from_parts(img, 0, 0, Delay::from_saturating_duration(*duration))
                }))
                .context("Encodage GIF")?;
        }
        Ok(out)
    }
}

impl Encoder for GifExport {
    fn encode_grid(&self, grid: &RenderedGrid) -> Result<Vec<u8>> {
        self.encode_frames(&[(grid.clone(), Duration::ZERO)])
    }

    fn encode_sequence(&self, seq: &RenderedSequence) -> Result<Vec<u8>> {
        self.encode_frames(&seq.frames)
    }

    fn extension(&self) -> &'static str {
        "gif"
    }
}
