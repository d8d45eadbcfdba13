use ag_core::frame::Image;
use fast_image_resize::images::Image as FirImage;
use fast_image_resize::{PixelType, ResizeOptions, Resizer as FirResizer};

use crate::error::SourceError;

/// Resizer réutilisable wrappant fast_image_resize.
///
/// Keeps the inner resizer and a scratch buffer across calls, so shrinking
/// every frame of an animation allocates only the outputs.
///
/// # Example
/// ```
/// use ag_source::resize::Resizer;
/// use ag_core::frame::Image;
/// let mut r = Resizer::new();
/// let src = Image::filled(100, 100, [0, 0, 0, 255]).unwrap();
/// let dst = r.resize(&src, 50, 25).unwrap();
/// assert_eq!((dst.width(), dst.height()), (50, 25));
/// ```
pub struct Resizer {
    inner: FirResizer,
    options: ResizeOptions,
    /// fast_image_resize wants a mutable source slice.
    src_buf: Vec<u8>,
}

impl Resizer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: FirResizer::new(),
            options: ResizeOptions::new(),
            src_buf: Vec::new(),
        }
    }

    /// Resize `src` to `width`×`height`.
    ///
    /// # Errors
    /// Returns [`SourceError::Resize`] for a zero target dimension or a
    /// failed resize.
    pub fn resize(&mut self, src: &Image, width: u32, height: u32) -> Result<Image, SourceError> {
        if src.width() == width && src.height() == height {
            return Ok(src.clone());
        }

        self.src_buf.clear();
        self.src_buf.extend_from_slice(src.as_raw());
        let src_image = FirImage::from_slice_u8(
            src.width(),
            src.height(),
            &mut self.src_buf,
            PixelType::U8x4,
        )
        .map_err(|e| SourceError::Resize(format!("source invalide : {e}")))?;

        let mut dst = vec![0u8; width as usize * height as usize * 4];
        let mut dst_image = FirImage::from_slice_u8(width, height, &mut dst, PixelType::U8x4)
            .map_err(|e| SourceError::Resize(format!("destination invalide : {e}")))?;

        self.inner
            .resize(&src_image, &mut dst_image, Some(&self.options))
            .map_err(|e| SourceError::Resize(e.to_string()))?;

        Image::from_rgba(width, height, dst).map_err(|e| SourceError::Resize(e.to_string()))
    }

    /// Shrink `src` so that neither side exceeds `max_side`, keeping the
    /// aspect ratio. Images already within bounds are returned unchanged.
    ///
    /// # Errors
    /// Same as [`Resizer::resize`].
    pub fn fit_within(&mut self, src: &Image, max_side: u32) -> Result<Image, SourceError> {
        match fitted_size(src.width(), src.height(), max_side) {
            Some((w, h)) => self.resize(src, w, h),
            None => Ok(src.clone()),
        }
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Target size when `w`×`h` exceeds `max_side` on either axis; `None` if it fits.
///
/// # Example
/// ```
/// use ag_source::resize::fitted_size;
/// assert_eq!(fitted_size(4000, 2000, 1000), Some((1000, 500)));
/// assert_eq!(fitted_size(800, 600, 1000), None);
/// ```
#[must_use]
pub fn fitted_size(w: u32, h: u32, max_side: u32) -> Option<(u32, u32)> {
    let max_side = max_side.max(1);
    if w <= max_side && h <= max_side {
        return None;
    }
    let scale = f64::from(max_side) / f64::from(w.max(h));
    let fw = ((f64::from(w) * scale).round() as u32).clamp(1, max_side);
    let fh = ((f64::from(h) * scale).round() as u32).clamp(1, max_side);
    Some((fw, fh))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_size_is_a_copy() {
        let src = Image::filled(3, 3, [1, 2, 3, 4]).unwrap();
        let out = Resizer::new().resize(&src, 3, 3).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn uniform_color_survives_downscale() {
        let src = Image::filled(64, 32, [200, 100, 50, 255]).unwrap();
        let out = Resizer::new().fit_within(&src, 16).unwrap();
        assert_eq!((out.width(), out.height()), (16, 8));
        let (r, g, b, a) = out.pixel(7, 3);
        for (got, want) in [(r, 200), (g, 100), (b, 50), (a, 255)] {
            assert!(got.abs_diff(want) <= 1, "{got} vs {want}");
        }
    }

    #[test]
    fn fitted_size_keeps_tall_aspect() {
        assert_eq!(fitted_size(100, 400, 200), Some((50, 200)));
        assert_eq!(fitted_size(10_000, 1, 100), Some((100, 1)));
    }

    #[test]
    fn zero_target_is_rejected() {
        let src = Image::filled(4, 4, [0; 4]).unwrap();
        assert!(matches!(
            Resizer::new().resize(&src, 0, 2),
            Err(SourceError::Resize(_))
        ));
    }
}
