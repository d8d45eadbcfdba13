use ag_core::charset::CharacterRamp;
use ag_core::frame::Cell;

/// Glyph emitted for background cells, whatever the ramp.
pub const BLANK: char = ' ';

/// Ramp index for a luminance: `floor(luminance * (len - 1) + 0.5)`.
///
/// Luminance is clamped to [0.0, 1.0] first; NaN counts as 0.
///
/// # Example
/// ```
/// use ag_ascii::glyph::ramp_index;
/// assert_eq!(ramp_index(0.0, 5), 0);
/// assert_eq!(ramp_index(0.5, 5), 2);
/// assert_eq!(ramp_index(1.0, 5), 4);
/// assert_eq!(ramp_index(7.0, 5), 4);
/// ```
#[inline(always)]
#[must_use]
pub fn ramp_index(luminance: f32, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    let lum = if luminance.is_nan() {
        0.0
    } else {
        luminance.clamp(0.0, 1.0)
    };
    let idx = (lum * (len - 1) as f32 + 0.5).floor() as usize;
    idx.min(len - 1)
}

/// Character of `ramp` selected by `luminance`.
///
/// # Example
/// ```
/// use ag_ascii::glyph::map_luminance;
/// use ag_core::charset::CharacterRamp;
/// let ramp = CharacterRamp::new(" .:#@").unwrap();
/// assert_eq!(map_luminance(0.0, &ramp), ' ');
/// assert_eq!(map_luminance(1.0, &ramp), '@');
/// ```
#[inline]
#[must_use]
pub fn map_luminance(luminance: f32, ramp: &CharacterRamp) -> char {
    ramp.as_slice()[ramp_index(luminance, ramp.len())]
}

/// Glyph for a sampled cell: [`BLANK`] for background, ramp lookup otherwise.
#[inline]
#[must_use]
pub fn map_cell(cell: &Cell, ramp: &CharacterRamp) -> char {
    if cell.background {
        BLANK
    } else {
        map_luminance(cell.luminance, ramp)
    }
}
