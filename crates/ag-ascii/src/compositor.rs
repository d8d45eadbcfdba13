use ag_core::charset::CharacterRamp;
use ag_core::config::RenderConfig;
use ag_core::error::RenderError;
use ag_core::frame::{CellGrid, Image, RenderedCell, RenderedGrid};

use crate::color_map::resolve_color;
use crate::glyph::map_cell;
use crate::mask::BackgroundMask;
use crate::sampler::{grid_dimensions, sample};

/// Compositor assemble masque, échantillonnage, glyphes et couleurs en une grille.
///
/// Holds a validated configuration and its prepared ramp, so rendering many
/// frames with one compositor validates only once.
///
/// # Example
/// ```
/// use ag_ascii::compositor::Compositor;
/// use ag_core::config::RenderConfig;
/// use ag_core::frame::Image;
///
/// let config = RenderConfig { width: 4, charset: " #".into(), ..Default::default() };
/// let compositor = Compositor::new(&config).unwrap();
/// let grid = compositor.render(&Image::filled(8, 8, [255; 4]).unwrap()).unwrap();
/// assert_eq!(grid.to_plain_string(), "####\n####");
/// ```
#[derive(Debug)]
pub struct Compositor<'a> {
    config: &'a RenderConfig,
    ramp: CharacterRamp,
}

impl<'a> Compositor<'a> {
    /// Validate `config` and prepare the ramp.
    ///
    /// # Errors
    /// [`RenderError::EmptyRamp`] or [`RenderError::InvalidDimension`] from
    /// [`RenderConfig::validate`].
    pub fn new(config: &'a RenderConfig) -> Result<Self, RenderError> {
        config.validate()?;
        let ramp = config.ramp()?;
        Ok(Self { config, ramp })
    }

    /// Render one image, computing a background mask from it when
    /// `remove_background` is set.
    ///
    /// # Errors
    /// Propagates sampler errors ([`RenderError::InvalidImage`],
    /// [`RenderError::InvalidDimension`]).
    pub fn render(&self, image: &Image) -> Result<RenderedGrid, RenderError> {
        let mask = if self.config.remove_background {
            BackgroundMask::compute(image, self.config.bg_tolerance)
        } else {
            None
        };
        self.render_with_mask(image, mask.as_ref())
    }

    /// Render one image with a precomputed mask.
    ///
    /// A mask of a different size than `image` is ignored.
    ///
    /// # Errors
    /// Propagates sampler errors.
    pub fn render_with_mask(
        &self,
        image: &Image,
        mask: Option<&BackgroundMask>,
    ) -> Result<RenderedGrid, RenderError> {
        let (cols, rows) = grid_dimensions(image.width(), image.height(), self.config)?;
        if let Some(m) = mask
            && !m.matches(image)
        {
            let (mw, mh) = m.dimensions();
            log::warn!(
                "Masque {mw}×{mh} incompatible avec l'image {}×{}, rendu sans masque",
                image.width(),
                image.height()
            );
        }
        log::debug!(
            "Rendu {}×{} → grille {cols}×{rows}",
            image.width(),
            image.height()
        );
        let cells = sample(image, cols, rows, mask)?;
        Ok(self.compose(&cells))
    }

    /// Map every sampled cell to its glyph and color.
    #[must_use]
    pub fn compose(&self, cells: &CellGrid) -> RenderedGrid {
        let rendered = cells
            .cells
            .iter()
            .map(|cell| RenderedCell {
                ch: map_cell(cell, &self.ramp),
                color: resolve_color(cell, self.config.color_mode, self.config.dim_factor),
            })
            .collect();
        RenderedGrid {
            cells: rendered,
            width: cells.width,
            height: cells.height,
        }
    }
}

/// Render a single image with `config`.
///
/// # Errors
/// Configuration errors first, then sampler errors.
///
/// # Example
/// ```
/// use ag_ascii::compositor::render_image;
/// use ag_core::config::RenderConfig;
/// use ag_core::frame::Image;
///
/// let config = RenderConfig { width: 1, charset: " #".into(), ..Default::default() };
/// let grid = render_image(&Image::filled(2, 2, [255; 4]).unwrap(), &config).unwrap();
/// assert_eq!(grid.get(0, 0).ch, '#');
/// ```
pub fn render_image(image: &Image, config: &RenderConfig) -> Result<RenderedGrid, RenderError> {
    Compositor::new(config)?.render(image)
}

#[cfg(test)]
mod tests {
    use ag_core::config::ColorMode;
    use ag_core::frame::CellColor;

    use super::*;

    fn config(width: u32, charset: &str) -> RenderConfig {
        RenderConfig {
            width,
            charset: charset.into(),
            ..Default::default()
        }
    }

    /// 8×8 green frame around a red 4×4 square.
    fn subject_on_green() -> Image {
        let mut data = Vec::with_capacity(8 * 8 * 4);
        for y in 0..8 {
            for x in 0..8 {
                let inside = (2..6).contains(&x) && (2..6).contains(&y);
                data.extend_from_slice(if inside {
                    &[255, 0, 0, 255]
                } else {
                    &[0, 255, 0, 255]
                });
            }
        }
        Image::from_rgba(8, 8, data).unwrap()
    }

    #[test]
    fn white_pixel_block_maps_to_last_glyph() {
        let img = Image::filled(2, 2, [255, 255, 255, 255]).unwrap();
        let grid = render_image(&img, &config(1, " #")).unwrap();
        assert_eq!((grid.width, grid.height), (1, 1));
        assert_eq!(grid.get(0, 0).ch, '#');
        assert!(grid.get(0, 0).color.is_none());
    }

    #[test]
    fn transparent_image_renders_blank() {
        let img = Image::filled(2, 2, [0, 0, 0, 0]).unwrap();
        let grid = render_image(&img, &config(1, "@#")).unwrap();
        assert_eq!(grid.get(0, 0).ch, ' ');
    }

    #[test]
    fn invert_flips_the_ramp() {
        let img = Image::filled(2, 2, [255, 255, 255, 255]).unwrap();
        let cfg = RenderConfig {
            invert: true,
            ..config(1, " #")
        };
        assert_eq!(render_image(&img, &cfg).unwrap().get(0, 0).ch, ' ');
    }

    #[test]
    fn both_mode_on_red() {
        let img = Image::filled(4, 4, [255, 0, 0, 255]).unwrap();
        let cfg = RenderConfig {
            color_mode: ColorMode::Both,
            ..config(2, " .:-=+*#%@")
        };
        let grid = render_image(&img, &cfg).unwrap();
        let plain = render_image(
            &img,
            &RenderConfig {
                color_mode: ColorMode::None,
                ..cfg.clone()
            },
        )
        .unwrap();
        let cell = grid.get(0, 0);
        assert_eq!(cell.color.fg, Some((255, 0, 0)));
        assert_eq!(cell.color.bg, Some((102, 0, 0)));
        assert_eq!(cell.ch, plain.get(0, 0).ch);
    }

    #[test]
    fn rendering_is_deterministic() {
        let img = subject_on_green();
        let cfg = RenderConfig {
            remove_background: true,
            color_mode: ColorMode::Foreground,
            ..config(4, " .:#@")
        };
        assert_eq!(
            render_image(&img, &cfg).unwrap(),
            render_image(&img, &cfg).unwrap()
        );
    }

    #[test]
    fn removed_background_is_blank_in_every_mode() {
        let img = subject_on_green();
        for mode in [
            ColorMode::None,
            ColorMode::Foreground,
            ColorMode::Background,
            ColorMode::Both,
        ] {
            let cfg = RenderConfig {
                remove_background: true,
                color_mode: mode,
                aspect_correction: 1.0,
                ..config(4, "@@")
            };
            let grid = render_image(&img, &cfg).unwrap();
            // 4×4 grid over 8×8 pixels: each cell is a 2×2 block.
            assert_eq!(grid.get(0, 0).ch, ' ', "{mode}");
            assert_eq!(grid.get(0, 0).color, CellColor::NONE, "{mode}");
            assert_eq!(grid.get(1, 1).ch, '@', "{mode}");
            assert_eq!(grid.to_plain_string(), "    \n @@ \n @@ \n    ");
        }
    }

    #[test]
    fn mismatched_mask_is_ignored() {
        let cfg = config(2, "@@");
        let compositor = Compositor::new(&cfg).unwrap();
        let other = Image::filled(4, 4, [0, 255, 0, 255]).unwrap();
        let mask = BackgroundMask::compute(&other, 30.0).unwrap();
        let img = Image::filled(8, 8, [0, 255, 0, 255]).unwrap();
        let grid = compositor.render_with_mask(&img, Some(&mask)).unwrap();
        assert!(grid.cells.iter().all(|c| c.ch == '@'));
    }

    #[test]
    fn invalid_config_is_rejected_before_sampling() {
        assert_eq!(
            Compositor::new(&config(10, "")).unwrap_err(),
            RenderError::EmptyRamp
        );
        assert!(matches!(
            Compositor::new(&config(0, "ab")),
            Err(RenderError::InvalidDimension(_))
        ));
    }

    #[test]
    fn height_override_is_honored() {
        let img = Image::filled(10, 10, [128, 128, 128, 255]).unwrap();
        let cfg = RenderConfig {
            height: Some(3),
            ..config(6, "ab")
        };
        let grid = render_image(&img, &cfg).unwrap();
        assert_eq!((grid.width, grid.height), (6, 3));
    }
}
