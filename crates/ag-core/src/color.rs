use serde::{Deserialize, Serialize};

/// RGB triple, 8 bits per channel.
pub type Rgb = (u8, u8, u8);

/// Perceptual luminance (BT.601 weights), normalized to [0.0, 1.0].
///
/// # Example
/// ```
/// use ag_core::color::luma;
/// assert!((luma((255, 255, 255)) - 1.0).abs() < 1e-6);
/// assert_eq!(luma((0, 0, 0)), 0.0);
/// ```
#[inline(always)]
#[must_use]
pub fn luma((r, g, b): Rgb) -> f32 {
    (0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b)) / 255.0
}

/// Euclidean distance in RGB space, channels on the 0–255 scale.
///
/// # Example
/// ```
/// use ag_core::color::rgb_distance;
/// assert_eq!(rgb_distance((0, 0, 0), (3, 4, 0)), 5.0);
/// ```
#[inline(always)]
#[must_use]
pub fn rgb_distance(a: Rgb, b: Rgb) -> f32 {
    let dr = f32::from(a.0) - f32::from(b.0);
    let dg = f32::from(a.1) - f32::from(b.1);
    let db = f32::from(a.2) - f32::from(b.2);
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Scale every channel by `factor` (clamped to [0, 1]).
///
/// # Example
/// ```
/// use ag_core::color::dim;
/// assert_eq!(dim((200, 100, 0), 0.5), (100, 50, 0));
/// ```
#[must_use]
pub fn dim((r, g, b): Rgb, factor: f32) -> Rgb {
    let f = factor.clamp(0.0, 1.0);
    let scale = |c: u8| (f32::from(c) * f).round() as u8;
    (scale(r), scale(g), scale(b))
}

/// Black or white, whichever reads better on top of `backdrop`.
///
/// # Example
/// ```
/// use ag_core::color::contrasting;
/// assert_eq!(contrasting((255, 255, 0)), (0, 0, 0));
/// assert_eq!(contrasting((0, 0, 128)), (255, 255, 255));
/// ```
#[must_use]
pub fn contrasting(backdrop: Rgb) -> Rgb {
    if luma(backdrop) >= 0.5 {
        (0, 0, 0)
    } else {
        (255, 255, 255)
    }
}

/// Convertit RGB [0,255] → HSV. H ∈ [0.0, 1.0), S ∈ [0.0, 1.0], V ∈ [0.0, 1.0].
///
/// # Example
/// ```
/// use ag_core::color::rgb_to_hsv;
/// let (h, s, v) = rgb_to_hsv(255, 0, 0);
/// assert!((h - 0.0).abs() < 0.01);
/// assert!((s - 1.0).abs() < 0.01);
/// assert!((v - 1.0).abs() < 0.01);
/// ```
#[must_use]
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let r = f32::from(r) / 255.0;
    let g = f32::from(g) / 255.0;
    let b = f32::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let v = max;
    let s = if max == 0.0 { 0.0 } else { delta / max };
    let h = if delta == 0.0 {
        0.0
    } else if (max - r).abs() < f32::EPSILON {
        (((g - b) / delta) % 6.0) / 6.0
    } else if (max - g).abs() < f32::EPSILON {
        ((b - r) / delta + 2.0) / 6.0
    } else {
        ((r - g) / delta + 4.0) / 6.0
    };
    let h = if h < 0.0 { h + 1.0 } else { h };

    (h, s, v)
}

/// The eight basic terminal colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum AnsiColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl AnsiColor {
    /// Offset of this color inside the SGR 30–37 / 40–47 ranges.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Black => 0,
            Self::Red => 1,
            Self::Green => 2,
            Self::Yellow => 3,
            Self::Blue => 4,
            Self::Magenta => 5,
            Self::Cyan => 6,
            Self::White => 7,
        }
    }

    /// Closest basic color by hue bucket.
    ///
    /// Low-saturation colors collapse to white or black: dark greys become
    /// white and light greys black, so the glyph stays visible on a terminal
    /// with the opposite default background.
    ///
    /// # Example
    /// ```
    /// use ag_core::color::AnsiColor;
    /// assert_eq!(AnsiColor::nearest((255, 0, 0)), AnsiColor::Red);
    /// assert_eq!(AnsiColor::nearest((0, 200, 0)), AnsiColor::Green);
    /// assert_eq!(AnsiColor::nearest((20, 20, 20)), AnsiColor::White);
    /// ```
    #[must_use]
    pub fn nearest((r, g, b): Rgb) -> Self {
        let (h, s, v) = rgb_to_hsv(r, g, b);
        if s < 0.2 {
            return if v < 0.5 { Self::White } else { Self::Black };
        }
        match h * 360.0 {
            d if d < 30.0 => Self::Red,
            d if d < 90.0 => Self::Yellow,
            d if d < 150.0 => Self::Green,
            d if d < 210.0 => Self::Cyan,
            d if d < 270.0 => Self::Blue,
            d if d < 330.0 => Self::Magenta,
            _ => Self::Red,
        }
    }
}
