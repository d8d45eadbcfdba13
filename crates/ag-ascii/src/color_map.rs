use ag_core::color::{contrasting, dim};
use ag_core::config::ColorMode;
use ag_core::frame::{Cell, CellColor};

/// Resolve the color annotation of a cell for the given mode.
///
/// Background cells and cells without a representative color never carry
/// color. `dim_factor` scales the backdrop in [`ColorMode::Both`].
///
/// # Example
/// ```
/// use ag_ascii::color_map::resolve_color;
/// use ag_core::config::ColorMode;
/// use ag_core::frame::Cell;
/// let cell = Cell { luminance: 0.3, color: Some((255, 0, 0)), background: false };
/// let color = resolve_color(&cell, ColorMode::Both, 0.5);
/// assert_eq!(color.fg, Some((255, 0, 0)));
/// assert_eq!(color.bg, Some((128, 0, 0)));
/// ```
#[must_use]
pub fn resolve_color(cell: &Cell, mode: ColorMode, dim_factor: f32) -> CellColor {
    let Some(rgb) = cell.color.filter(|_| !cell.background) else {
        return CellColor::NONE;
    };
    match mode {
        ColorMode::None => CellColor::NONE,
        ColorMode::Foreground => CellColor {
            fg: Some(rgb),
            bg: None,
        },
        ColorMode::Background => CellColor {
            fg: Some(contrasting(rgb)),
            bg: Some(rgb),
        },
        ColorMode::Both => CellColor {
            fg: Some(rgb),
            bg: Some(dim(rgb, dim_factor)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODES: [ColorMode; 4] = [
        ColorMode::None,
        ColorMode::Foreground,
        ColorMode::Background,
        ColorMode::Both,
    ];

    fn cell(rgb: (u8, u8, u8)) -> Cell {
        Cell {
            luminance: 0.5,
            color: Some(rgb),
            background: false,
        }
    }

    #[test]
    fn none_mode_has_no_color() {
        assert!(resolve_color(&cell((1, 2, 3)), ColorMode::None, 0.4).is_none());
    }

    #[test]
    fn foreground_mode_colors_glyph_only() {
        let c = resolve_color(&cell((1, 2, 3)), ColorMode::Foreground, 0.4);
        assert_eq!(c.fg, Some((1, 2, 3)));
        assert_eq!(c.bg, None);
    }

    #[test]
    fn background_mode_uses_contrasting_glyph() {
        let light = resolve_color(&cell((250, 250, 200)), ColorMode::Background, 0.4);
        assert_eq!(light.bg, Some((250, 250, 200)));
        assert_eq!(light.fg, Some((0, 0, 0)));
        let dark = resolve_color(&cell((10, 0, 40)), ColorMode::Background, 0.4);
        assert_eq!(dark.fg, Some((255, 255, 255)));
    }

    #[test]
    fn both_mode_dims_backdrop() {
        let c = resolve_color(&cell((255, 0, 0)), ColorMode::Both, 0.4);
        assert_eq!(c.fg, Some((255, 0, 0)));
        assert_eq!(c.bg, Some((102, 0, 0)));
    }

    #[test]
    fn background_cells_never_carry_color() {
        let bg = Cell {
            background: true,
            ..cell((255, 0, 0))
        };
        for mode in MODES {
            assert!(resolve_color(&bg, mode, 0.4).is_none(), "{mode}");
        }
    }

    #[test]
    fn colorless_cells_never_carry_color() {
        let transparent = Cell {
            luminance: 0.0,
            color: None,
            background: false,
        };
        for mode in MODES {
            assert!(resolve_color(&transparent, mode, 0.4).is_none(), "{mode}");
        }
    }
}
