use ag_core::color::{Rgb, rgb_distance};
use ag_core::frame::Image;
use rayon::prelude::*;

/// Minimum image side for seed sampling. Smaller images are never masked.
pub const MIN_MASK_SIDE: u32 = 2;

/// Border samples taken per image edge, corners included.
const SEEDS_PER_EDGE: u32 = 16;

/// Per-pixel background classification.
///
/// Computed once from a reference image and then only read, so a single mask
/// can be shared by every frame worker of an animation.
///
/// # Example
/// ```
/// use ag_ascii::mask::BackgroundMask;
/// use ag_core::frame::Image;
/// let img = Image::filled(4, 4, [0, 0, 255, 255]).unwrap();
/// let mask = BackgroundMask::compute(&img, 10.0).unwrap();
/// assert!(mask.is_background(2, 2));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackgroundMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl BackgroundMask {
    /// Classify the pixels of `image` against colors sampled on its border.
    ///
    /// A pixel is background when its RGB distance to the nearest seed is
    /// strictly below `tolerance`. Returns `None` (no masking) for images
    /// smaller than 2×2 or whose border is fully transparent.
    #[must_use]
    pub fn compute(image: &Image, tolerance: f32) -> Option<Self> {
        if image.width() < MIN_MASK_SIDE || image.height() < MIN_MASK_SIDE {
            log::warn!(
                "Image {}×{} trop petite pour le masque de fond, masquage ignoré",
                image.width(),
                image.height()
            );
            return None;
        }

        let seeds = border_seeds(image);
        if seeds.is_empty() {
            log::warn!("Bordure entièrement transparente, masquage ignoré");
            return None;
        }
        log::debug!("Masque de fond : {} couleurs de référence", seeds.len());

        let width = image.width() as usize;
        let mut bits = vec![false; width * image.height() as usize];
        bits.par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (px, bit) in image.row(y as u32).chunks_exact(4).zip(row.iter_mut()) {
                    let rgb = (px[0], px[1], px[2]);
                    *bit = seeds.iter().any(|&s| rgb_distance(rgb, s) < tolerance);
                }
            });

        Some(Self {
            width: image.width(),
            height: image.height(),
            bits,
        })
    }

    #[inline(always)]
    #[must_use]
    pub fn is_background(&self, x: u32, y: u32) -> bool {
        self.bits[y as usize * self.width as usize + x as usize]
    }

    /// `true` if this mask was computed for an image of the same size.
    #[must_use]
    pub fn matches(&self, image: &Image) -> bool {
        self.width == image.width() && self.height == image.height()
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels classified as background.
    #[must_use]
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}

/// Evenly spaced positions along an axis of `len` pixels, both ends included.
fn edge_positions(len: u32) -> impl Iterator<Item = u32> {
    let n = len.min(SEEDS_PER_EDGE);
    (0..n).map(move |i| {
        if n == 1 {
            0
        } else {
            (u64::from(i) * u64::from(len - 1) / u64::from(n - 1)) as u32
        }
    })
}

/// Distinct opaque colors sampled along the four edges.
fn border_seeds(image: &Image) -> Vec<Rgb> {
    let (w, h) = (image.width(), image.height());
    let mut seeds: Vec<Rgb> = Vec::new();
    let mut push = |x: u32, y: u32| {
        let (r, g, b, a) = image.pixel(x, y);
        if a > 0 {
            seeds.push((r, g, b));
        }
    };
    for x in edge_positions(w) {
        push(x, 0);
        push(x, h - 1);
    }
    for y in edge_positions(h) {
        push(0, y);
        push(w - 1, y);
    }
    seeds.sort_unstable();
    seeds.dedup();
    seeds
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `size`×`size` image of `bg` with a centered `fg` square of side `size/2`.
    fn framed(size: u32, bg: [u8; 4], fg: [u8; 4]) -> Image {
        let lo = size / 4;
        let hi = lo + size / 2;
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let inside = (lo..hi).contains(&x) && (lo..hi).contains(&y);
                data.extend_from_slice(if inside { &fg } else { &bg });
            }
        }
        Image::from_rgba(size, size, data).unwrap()
    }

    #[test]
    fn border_color_is_masked_subject_is_kept() {
        let img = framed(8, [0, 255, 0, 255], [200, 0, 0, 255]);
        let mask = BackgroundMask::compute(&img, 30.0).unwrap();
        assert!(mask.is_background(0, 0));
        assert!(mask.is_background(7, 3));
        assert!(!mask.is_background(3, 3));
        assert_eq!(mask.count(), 64 - 16);
    }

    #[test]
    fn near_colors_fall_within_tolerance() {
        let img = framed(8, [100, 100, 100, 255], [110, 100, 100, 255]);
        let loose = BackgroundMask::compute(&img, 20.0).unwrap();
        assert_eq!(loose.count(), 64);
        let strict = BackgroundMask::compute(&img, 10.0).unwrap();
        assert_eq!(strict.count(), 64 - 16);
    }

    #[test]
    fn zero_tolerance_masks_nothing() {
        let img = Image::filled(4, 4, [9, 9, 9, 255]).unwrap();
        let mask = BackgroundMask::compute(&img, 0.0).unwrap();
        assert_eq!(mask.count(), 0);
    }

    #[test]
    fn tiny_images_skip_masking() {
        let img = Image::filled(1, 5, [0, 0, 0, 255]).unwrap();
        assert!(BackgroundMask::compute(&img, 50.0).is_none());
    }

    #[test]
    fn transparent_border_skips_masking() {
        let img = framed(8, [0, 0, 0, 0], [255, 255, 255, 255]);
        assert!(BackgroundMask::compute(&img, 50.0).is_none());
    }

    #[test]
    fn edge_positions_include_corners() {
        let pos: Vec<u32> = edge_positions(100).collect();
        assert_eq!(pos.len(), SEEDS_PER_EDGE as usize);
        assert_eq!(pos.first(), Some(&0));
        assert_eq!(pos.last(), Some(&99));
        let short: Vec<u32> = edge_positions(3).collect();
        assert_eq!(short, vec![0, 1, 2]);
    }

    #[test]
    fn mask_matches_only_same_size() {
        let img = Image::filled(4, 4, [0, 0, 0, 255]).unwrap();
        let mask = BackgroundMask::compute(&img, 1.0).unwrap();
        assert!(mask.matches(&img));
        assert!(!mask.matches(&Image::filled(4, 5, [0; 4]).unwrap()));
    }
}
