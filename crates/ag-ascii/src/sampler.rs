use ag_core::color::luma;
use ag_core::config::{MAX_GRID_SIDE, RenderConfig};
use ag_core::error::RenderError;
use ag_core::frame::{Cell, CellGrid, Image};
use rayon::prelude::*;

use crate::mask::BackgroundMask;

/// Cell grid size for an image of `image_w`×`image_h` pixels.
///
/// Width is `config.width`. Height is `config.height` if set, otherwise
/// `round(width * image_h / image_w / aspect_correction)`, at least 1.
///
/// # Errors
/// [`RenderError::InvalidImage`] for a zero image dimension,
/// [`RenderError::InvalidDimension`] for a zero width/height, a
/// non-positive aspect correction, or a side above [`MAX_GRID_SIDE`].
///
/// # Example
/// ```
/// use ag_ascii::sampler::grid_dimensions;
/// use ag_core::config::RenderConfig;
/// let config = RenderConfig { width: 80, ..Default::default() };
/// assert_eq!(grid_dimensions(640, 480, &config).unwrap(), (80, 30));
/// ```
pub fn grid_dimensions(
    image_w: u32,
    image_h: u32,
    config: &RenderConfig,
) -> Result<(u32, u32), RenderError> {
    if image_w == 0 || image_h == 0 {
        return Err(RenderError::InvalidImage(format!(
            "dimensions nulles {image_w}×{image_h}"
        )));
    }
    if config.width == 0 {
        return Err(RenderError::InvalidDimension(
            "la largeur doit être > 0".into(),
        ));
    }
    let aspect = config.aspect_correction;
    if !(aspect.is_finite() && aspect > 0.0) {
        return Err(RenderError::InvalidDimension(format!(
            "correction d'aspect invalide : {aspect}"
        )));
    }

    let height = match config.height {
        Some(0) => {
            return Err(RenderError::InvalidDimension(
                "la hauteur doit être > 0".into(),
            ));
        }
        Some(h) => f64::from(h),
        None => {
            let h = f64::from(config.width) * f64::from(image_h)
                / f64::from(image_w)
                / f64::from(aspect);
            h.round().max(1.0)
        }
    };
    if config.width > MAX_GRID_SIDE || height > f64::from(MAX_GRID_SIDE) {
        return Err(RenderError::InvalidDimension(format!(
            "grille {}×{height} au-delà de {MAX_GRID_SIDE} cellules par côté",
            config.width
        )));
    }
    Ok((config.width, height as u32))
}

/// Pixel range `[start, end)` covered by block `i` of `target` along an axis
/// of `dim` pixels.
///
/// Bounds are `floor(i * dim / target)`. When the grid is finer than the
/// image the range would be empty; it is widened to the single pixel at
/// `start`.
#[inline]
fn block_range(i: u32, dim: u32, target: u32) -> (u32, u32) {
    let start = (u64::from(i) * u64::from(dim) / u64::from(target)) as u32;
    let end = (u64::from(i + 1) * u64::from(dim) / u64::from(target)) as u32;
    (start, end.max(start + 1).min(dim))
}

/// Reduce an image to a `cols`×`rows` grid of cells.
///
/// Each cell averages its pixel block with alpha weighting; pixels flagged
/// by `mask` weigh zero. A block with no weight, or whose masked pixels
/// exceed half of the block, is marked background.
///
/// # Errors
/// [`RenderError::InvalidDimension`] if `cols` or `rows` is zero.
///
/// # Example
/// ```
/// use ag_ascii::sampler::sample;
/// use ag_core::frame::Image;
/// let img = Image::filled(4, 4, [255, 255, 255, 255]).unwrap();
/// let grid = sample(&img, 2, 1, None).unwrap();
/// assert_eq!(grid.cells.len(), 2);
/// assert!(grid.get(1, 0).luminance > 0.99);
/// ```
pub fn sample(
    image: &Image,
    cols: u32,
    rows: u32,
    mask: Option<&BackgroundMask>,
) -> Result<CellGrid, RenderError> {
    if cols == 0 || rows == 0 {
        return Err(RenderError::InvalidDimension(format!(
            "grille {cols}×{rows}"
        )));
    }
    let mask = mask.filter(|m| m.matches(image));

    let mut cells = vec![Cell::default(); cols as usize * rows as usize];
    cells
        .par_chunks_mut(cols as usize)
        .enumerate()
        .for_each(|(cy, row)| {
            let (y0, y1) = block_range(cy as u32, image.height(), rows);
            for (cx, cell) in row.iter_mut().enumerate() {
                let (x0, x1) = block_range(cx as u32, image.width(), cols);
                *cell = sample_block(image, mask, x0..x1, y0..y1);
            }
        });

    Ok(CellGrid {
        cells,
        width: cols,
        height: rows,
    })
}

fn sample_block(
    image: &Image,
    mask: Option<&BackgroundMask>,
    xs: std::ops::Range<u32>,
    ys: std::ops::Range<u32>,
) -> Cell {
    let mut weight = 0.0f32;
    let mut lum = 0.0f32;
    let mut rgb = [0.0f32; 3];
    let mut masked = 0u32;

    for y in ys.clone() {
        for x in xs.clone() {
            if mask.is_some_and(|m| m.is_background(x, y)) {
                masked += 1;
                continue;
            }
            let (r, g, b, a) = image.pixel(x, y);
            if a == 0 {
                continue;
            }
            let w = f32::from(a) / 255.0;
            weight += w;
            lum += luma((r, g, b)) * w;
            rgb[0] += f32::from(r) * w;
            rgb[1] += f32::from(g) * w;
            rgb[2] += f32::from(b) * w;
        }
    }

    let total = ys.len() as u32 * xs.len() as u32;
    if weight <= 0.0 {
        return Cell {
            luminance: 0.0,
            color: None,
            background: true,
        };
    }

    let channel = |sum: f32| (sum / weight).round().clamp(0.0, 255.0) as u8;
    Cell {
        luminance: (lum / weight).clamp(0.0, 1.0),
        color: Some((channel(rgb[0]), channel(rgb[1]), channel(rgb[2]))),
        background: masked * 2 > total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(width: u32) -> RenderConfig {
        RenderConfig {
            width,
            ..Default::default()
        }
    }

    #[test]
    fn height_follows_aspect_ratio() {
        assert_eq!(grid_dimensions(100, 100, &config(10)).unwrap(), (10, 5));
        let square = RenderConfig {
            aspect_correction: 1.0,
            ..config(10)
        };
        assert_eq!(grid_dimensions(100, 50, &square).unwrap(), (10, 5));
    }

    #[test]
    fn height_never_collapses_to_zero() {
        assert_eq!(grid_dimensions(1000, 1, &config(10)).unwrap(), (10, 1));
    }

    #[test]
    fn height_override_wins() {
        let cfg = RenderConfig {
            height: Some(7),
            ..config(3)
        };
        assert_eq!(grid_dimensions(100, 100, &cfg).unwrap(), (3, 7));
    }

    #[test]
    fn zero_width_is_invalid_dimension() {
        assert!(matches!(
            grid_dimensions(10, 10, &config(0)),
            Err(RenderError::InvalidDimension(_))
        ));
    }

    #[test]
    fn oversized_grid_is_invalid_dimension() {
        assert!(matches!(
            grid_dimensions(1, 4, &config(u32::MAX)),
            Err(RenderError::InvalidDimension(_))
        ));
        let squashed = RenderConfig {
            aspect_correction: 1e-30,
            ..config(4)
        };
        assert!(matches!(
            grid_dimensions(4, 4, &squashed),
            Err(RenderError::InvalidDimension(_))
        ));
        let tall = RenderConfig {
            height: Some(MAX_GRID_SIDE + 1),
            ..config(4)
        };
        assert!(grid_dimensions(4, 4, &tall).is_err());
        assert_eq!(
            grid_dimensions(1, 1, &config(MAX_GRID_SIDE)).unwrap(),
            (MAX_GRID_SIDE, 250)
        );
    }

    #[test]
    fn zero_image_is_invalid_image() {
        assert!(matches!(
            grid_dimensions(0, 10, &config(4)),
            Err(RenderError::InvalidImage(_))
        ));
    }

    #[test]
    fn blocks_tile_the_axis_without_gaps() {
        for (dim, target) in [(10, 3), (7, 7), (100, 33), (5, 1)] {
            let mut next = 0;
            for i in 0..target {
                let (s, e) = block_range(i, dim, target);
                assert_eq!(s, next, "gap at block {i} ({dim}/{target})");
                assert!(e > s);
                next = e;
            }
            assert_eq!(next, dim);
        }
    }

    #[test]
    fn upsampling_reuses_nearest_pixel() {
        let (s, e) = block_range(1, 2, 4);
        assert_eq!((s, e), (0, 1));
    }

    #[test]
    fn grid_width_matches_request() {
        let img = Image::filled(13, 9, [10, 20, 30, 255]).unwrap();
        for w in [1, 5, 13, 40] {
            let (cols, rows) = grid_dimensions(13, 9, &config(w)).unwrap();
            let grid = sample(&img, cols, rows, None).unwrap();
            assert_eq!(grid.width, w);
            assert_eq!(grid.cells.len(), (cols * rows) as usize);
        }
    }

    #[test]
    fn white_block_has_full_luminance() {
        let img = Image::filled(2, 2, [255, 255, 255, 255]).unwrap();
        let grid = sample(&img, 1, 1, None).unwrap();
        let cell = grid.get(0, 0);
        assert!((cell.luminance - 1.0).abs() < 1e-5);
        assert_eq!(cell.color, Some((255, 255, 255)));
        assert!(!cell.background);
    }

    #[test]
    fn transparent_block_is_background() {
        let img = Image::filled(2, 2, [255, 255, 255, 0]).unwrap();
        let grid = sample(&img, 1, 1, None).unwrap();
        let cell = grid.get(0, 0);
        assert_eq!(cell.luminance, 0.0);
        assert_eq!(cell.color, None);
        assert!(cell.background);
    }

    #[test]
    fn transparent_pixels_do_not_darken_average() {
        // Left column opaque red, right column transparent black.
        let data = vec![
            255, 0, 0, 255, 0, 0, 0, 0, //
            255, 0, 0, 255, 0, 0, 0, 0,
        ];
        let img = Image::from_rgba(2, 2, data).unwrap();
        let grid = sample(&img, 1, 1, None).unwrap();
        assert_eq!(grid.get(0, 0).color, Some((255, 0, 0)));
        assert!((grid.get(0, 0).luminance - 0.299).abs() < 1e-3);
    }

    #[test]
    fn partially_masked_blocks_follow_majority_rule() {
        // 4×6: green border (masked), red 2×4 interior.
        let mut data = Vec::new();
        for y in 0..6 {
            for x in 0..4 {
                let interior = (1..3).contains(&x) && (1..5).contains(&y);
                let px: [u8; 4] = if interior {
                    [255, 0, 0, 255]
                } else {
                    [0, 255, 0, 255]
                };
                data.extend_from_slice(&px);
            }
        }
        let img = Image::from_rgba(4, 6, data).unwrap();
        let mask = BackgroundMask::compute(&img, 10.0).unwrap();
        assert_eq!(mask.count(), 16);

        let grid = sample(&img, 1, 3, Some(&mask)).unwrap();

        // Rows 2-3: 4 of 8 pixels masked, exactly half.
        let half = grid.get(0, 1);
        assert!(!half.background);
        assert_eq!(half.color, Some((255, 0, 0)));
        assert!((half.luminance - 0.299).abs() < 1e-3);

        // Rows 0-1 and 4-5: 6 of 8 masked; masked green never leaks in.
        for cy in [0, 2] {
            let cell = grid.get(0, cy);
            assert!(cell.background, "row {cy}");
            assert_eq!(cell.color, Some((255, 0, 0)));
        }
    }

    #[test]
    fn zero_grid_is_rejected() {
        let img = Image::filled(2, 2, [0, 0, 0, 255]).unwrap();
        assert!(sample(&img, 0, 1, None).is_err());
    }
}
