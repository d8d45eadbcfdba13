use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::charset::{CHARSET_DEFAULT, CharacterRamp};
use crate::error::RenderError;

/// Largest possible RGB distance (black ↔ white).
pub const MAX_RGB_DISTANCE: f32 = 441.673;

/// Plus grand côté de grille accepté, en cellules (largeur comme hauteur).
pub const MAX_GRID_SIDE: u32 = 500;

/// Configuration complète du rendu.
///
/// Immutable for the duration of a render call and shared by reference
/// between frame workers. Sérialisable en TOML; chaque champ a une valeur
/// par défaut saine.
///
/// # Example
/// ```
/// use ag_core::config::RenderConfig;
/// let config = RenderConfig::default();
/// assert_eq!(config.width, 100);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct RenderConfig {
    // === Grille ===
    /// Output width in character cells.
    pub width: u32,
    /// Explicit output height; derived from the aspect ratio when `None`.
    pub height: Option<u32>,
    /// Hauteur d'un caractère / largeur (typiquement 2.0 pour les polices terminal).
    pub aspect_correction: f32,

    // === Rampe ===
    /// Charset, luminance 0 → premier caractère.
    pub charset: String,
    /// Reverse the ramp before lookup.
    pub invert: bool,

    // === Fond ===
    /// Enable border-seeded background removal.
    pub remove_background: bool,
    /// RGB distance under which a pixel matches a background seed.
    pub bg_tolerance: f32,
    /// Animation frame the background mask is computed from.
    pub mask_seed_frame: usize,

    // === Couleur ===
    pub color_mode: ColorMode,
    /// Backdrop brightness relative to the glyph in [`ColorMode::Both`].
    pub dim_factor: f32,
    /// How encoders express colors on a terminal.
    pub palette: Palette,

    // === Animation ===
    /// Replace every frame duration with `1 / target_fps` seconds.
    pub target_fps: Option<f32>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: None,
            aspect_correction: 2.0,
            charset: CHARSET_DEFAULT.to_string(),
            invert: false,
            remove_background: false,
            bg_tolerance: 48.0,
            mask_seed_frame: 0,
            color_mode: ColorMode::None,
            dim_factor: 0.4,
            palette: Palette::TrueColor,
            target_fps: None,
        }
    }
}

/// Where the cell color is applied.
///
/// # Example
/// ```
/// use ag_core::config::ColorMode;
/// let mode: ColorMode = "both".parse().unwrap();
/// assert_eq!(mode, ColorMode::Both);
/// assert!("sepia".parse::<ColorMode>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// No color annotation.
    #[default]
    None,
    /// Color on the glyph.
    Foreground,
    /// Color on the cell backdrop, glyph in a contrasting color.
    Background,
    /// Glyph colored, backdrop dimmed.
    Both,
}

impl FromStr for ColorMode {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "foreground" | "fg" => Ok(Self::Foreground),
            "background" | "bg" => Ok(Self::Background),
            "both" => Ok(Self::Both),
            _ => Err(RenderError::UnsupportedColorMode(s.to_string())),
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Foreground => "foreground",
            Self::Background => "background",
            Self::Both => "both",
        })
    }
}

/// Terminal color depth used by styled encoders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    /// 24-bit SGR sequences.
    #[default]
    TrueColor,
    /// The eight basic colors, chosen by hue bucket.
    Ansi16,
}

impl FromStr for Palette {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "truecolor" | "24bit" => Ok(Self::TrueColor),
            "ansi16" | "ansi" | "16" => Ok(Self::Ansi16),
            other => anyhow::bail!("Palette inconnue : {other} (truecolor | ansi16)"),
        }
    }
}

impl RenderConfig {
    /// Clamp tunable numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        self.bg_tolerance = if self.bg_tolerance.is_finite() {
            self.bg_tolerance.clamp(0.0, MAX_RGB_DISTANCE)
        } else {
            0.0
        };
        self.dim_factor = if self.dim_factor.is_finite() {
            self.dim_factor.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    /// Check the values a render call cannot recover from.
    ///
    /// # Errors
    /// [`RenderError::EmptyRamp`] for an empty charset,
    /// [`RenderError::InvalidDimension`] for a zero width/height or one
    /// above [`MAX_GRID_SIDE`], a non-positive aspect correction or frame rate.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.charset.is_empty() {
            return Err(RenderError::EmptyRamp);
        }
        if self.width == 0 {
            return Err(RenderError::InvalidDimension(
                "la largeur doit être > 0".into(),
            ));
        }
        if self.height == Some(0) {
            return Err(RenderError::InvalidDimension(
                "la hauteur doit être > 0".into(),
            ));
        }
        if self.width > MAX_GRID_SIDE || self.height.is_some_and(|h| h > MAX_GRID_SIDE) {
            return Err(RenderError::InvalidDimension(format!(
                "grille limitée à {MAX_GRID_SIDE} cellules par côté"
            )));
        }
        if !(self.aspect_correction.is_finite() && self.aspect_correction > 0.0) {
            return Err(RenderError::InvalidDimension(format!(
                "correction d'aspect invalide : {}",
                self.aspect_correction
            )));
        }
        if let Some(fps) = self.target_fps
            && !(fps.is_finite() && fps > 0.0)
        {
            return Err(RenderError::InvalidDimension(format!(
                "fps invalide : {fps}"
            )));
        }
        Ok(())
    }

    /// Build the lookup ramp, reversed when `invert` is set.
    ///
    /// # Errors
    /// Returns [`RenderError::EmptyRamp`] if the charset is empty.
    ///
    /// # Example
    /// ```
    /// use ag_core::config::RenderConfig;
    /// let config = RenderConfig { charset: "ab".into(), invert: true, ..Default::default() };
    /// assert_eq!(config.ramp().unwrap().as_slice(), &['b', 'a']);
    /// ```
    pub fn ramp(&self) -> Result<CharacterRamp, RenderError> {
        let ramp = CharacterRamp::new(&self.charset)?;
        Ok(if self.invert { ramp.reversed() } else { ramp })
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    render: Option<RenderSection>,
}

/// Render section of the TOML config, all fields optional for partial override.
#[derive(Deserialize)]
struct RenderSection {
    width: Option<u32>,
    height: Option<u32>,
    aspect_correction: Option<f32>,
    charset: Option<String>,
    invert: Option<bool>,
    remove_background: Option<bool>,
    bg_tolerance: Option<f32>,
    mask_seed_frame: Option<usize>,
    color_mode: Option<String>,
    dim_factor: Option<f32>,
    palette: Option<String>,
    target_fps: Option<f32>,
}

/// Parse TOML text and merge it over the defaults.
///
/// # Errors
/// Returns an error if the TOML is malformed or names an unknown color
/// mode or palette.
///
/// # Example
/// ```
/// use ag_core::config::{parse_config, ColorMode};
/// let config = parse_config("[render]\nwidth = 40\ncolor_mode = \"both\"\n").unwrap();
/// assert_eq!(config.width, 40);
/// assert_eq!(config.color_mode, ColorMode::Both);
/// assert_eq!(config.aspect_correction, 2.0);
/// ```
pub fn parse_config(content: &str) -> Result<RenderConfig> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;

    let mut config = RenderConfig::default();
    let Some(r) = file.render else {
        return Ok(config);
    };

    if let Some(v) = r.width {
        config.width = v;
    }
    if r.height.is_some() {
        config.height = r.height;
    }
    if let Some(v) = r.aspect_correction {
        config.aspect_correction = v;
    }
    if let Some(v) = r.charset {
        config.charset = v;
    }
    if let Some(v) = r.invert {
        config.invert = v;
    }
    if let Some(v) = r.remove_background {
        config.remove_background = v;
    }
    if let Some(v) = r.bg_tolerance {
        config.bg_tolerance = v;
    }
    if let Some(v) = r.mask_seed_frame {
        config.mask_seed_frame = v;
    }
    if let Some(v) = r.color_mode {
        config.color_mode = v.parse()?;
    }
    if let Some(v) = r.dim_factor {
        config.dim_factor = v;
    }
    if let Some(v) = r.palette {
        config.palette = v.parse()?;
    }
    if r.target_fps.is_some() {
        config.target_fps = r.target_fps;
    }

    config.clamp_all();
    Ok(config)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use ag_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("asciigen.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<RenderConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    let config =
        parse_config(&content).with_context(|| format!("Config invalide : {}", path.display()))?;
    log::info!("Configuration chargée depuis {}", path.display());
    Ok(config)
}
