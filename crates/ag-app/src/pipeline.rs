use std::io::Write;
use std::path::{Path, PathBuf};

use ag_ascii::compositor::render_image;
use ag_ascii::sequencer::render_sequence;
use ag_core::charset::{PRESETS, preset};
use ag_core::config::{ColorMode, RenderConfig, load_config};
use ag_core::frame::{AnimationSource, RenderedGrid, RenderedSequence};
use ag_core::traits::Encoder;
use ag_export::format::OutputFormat;
use ag_export::text::{AnsiText, PlainText};
use ag_source::image::{LoadOptions, load_animation};
use anyhow::{Context, Result};

use crate::cli::Cli;
use crate::metadata::{Metadata, write_metadata};
use crate::play;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG: &str = "asciigen.toml";

/// Résultat d'un rendu : image fixe ou animation.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Still(RenderedGrid),
    Animated(RenderedSequence),
}

impl Rendered {
    #[must_use]
    pub fn frame_count(&self) -> usize {
        match self {
            Self::Still(_) => 1,
            Self::Animated(seq) => seq.len(),
        }
    }

    /// Encode with `encoder`, dispatching on still vs animated.
    ///
    /// # Errors
    /// Propagates encoder errors.
    pub fn encode(&self, encoder: &dyn Encoder) -> Result<Vec<u8>> {
        match self {
            Self::Still(grid) => encoder.encode_grid(grid),
            Self::Animated(seq) => encoder.encode_sequence(seq),
        }
    }
}

/// Resolve the base config: `--config` file, else `asciigen.toml`, else defaults.
///
/// # Errors
/// Returns an error if an existing config file is invalid.
pub fn resolve_config(cli: &Cli) -> Result<RenderConfig> {
    match cli.config.as_deref() {
        Some(path) if path.exists() => load_config(path),
        Some(path) => {
            log::warn!(
                "Config introuvable : {}. Utilisation des défauts.",
                path.display()
            );
            Ok(RenderConfig::default())
        }
        None => {
            let path = Path::new(DEFAULT_CONFIG);
            if path.exists() {
                load_config(path)
            } else {
                log::debug!("Pas de {DEFAULT_CONFIG}, configuration par défaut");
                Ok(RenderConfig::default())
            }
        }
    }
}

/// Apply CLI flags over a file/default config.
///
/// # Errors
/// Returns an error for an unknown preset, color mode or palette.
pub fn apply_overrides(cli: &Cli, config: &mut RenderConfig) -> Result<()> {
    if let Some(w) = cli.width {
        config.width = w;
    }
    if cli.height.is_some() {
        config.height = cli.height;
    }
    if let Some(a) = cli.aspect {
        config.aspect_correction = a;
    }
    if let Some(ref chars) = cli.chars {
        config.charset.clone_from(chars);
    }
    if let Some(ref name) = cli.preset {
        let Some(chars) = preset(name) else {
            let names: Vec<_> = PRESETS.iter().map(|(n, _)| *n).collect();
            anyhow::bail!("Preset inconnu : {name}. Disponibles : {}", names.join(", "));
        };
        config.charset = chars.to_string();
    }
    if cli.invert {
        config.invert = true;
    }
    if cli.remove_bg {
        config.remove_background = true;
    }
    if let Some(t) = cli.tolerance {
        config.bg_tolerance = t;
    }
    if let Some(i) = cli.mask_frame {
        config.mask_seed_frame = i;
    }
    if let Some(ref mode) = cli.color {
        config.color_mode = mode.parse()?;
    }
    if let Some(d) = cli.dim {
        config.dim_factor = d;
    }
    if let Some(ref palette) = cli.palette {
        config.palette = palette.parse()?;
    }
    if cli.fps.is_some() {
        config.target_fps = cli.fps;
    }
    config.clamp_all();
    Ok(())
}

/// Output format: `--format`, else the output extension, else txt.
///
/// # Errors
/// Returns an error if `--format` names an unknown format.
pub fn resolve_format(cli: &Cli) -> Result<OutputFormat> {
    if let Some(ref f) = cli.format {
        return f.parse();
    }
    Ok(cli
        .output
        .as_deref()
        .and_then(OutputFormat::from_path)
        .unwrap_or_default())
}

/// Render a decoded source: still images through the compositor, animations
/// through the sequencer.
///
/// # Errors
/// Propagates [`ag_core::error::RenderError`].
pub fn render_source(source: &AnimationSource, config: &RenderConfig) -> Result<Rendered> {
    match source.frames.first() {
        Some((image, _)) if !source.is_animated() => {
            Ok(Rendered::Still(render_image(image, config)?))
        }
        _ => Ok(Rendered::Animated(render_sequence(source, config)?)),
    }
}

/// Terminal encoder: ANSI when colored, plain text otherwise.
fn console_encoder(config: &RenderConfig) -> Box<dyn Encoder> {
    if config.color_mode == ColorMode::None {
        Box::new(PlainText)
    } else {
        Box::new(AnsiText::new(config.palette))
    }
}

/// Write `bytes` to `path`, creating parent directories.
///
/// # Errors
/// Returns an error if a directory or the file cannot be written.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer {}", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("Impossible d'écrire {}", path.display()))
}

/// Pipeline complet : config → décodage → rendu → sortie.
///
/// Returns the written output path, if any.
///
/// # Errors
/// Any configuration, decoding, rendering, encoding or I/O failure.
pub fn run(cli: &Cli) -> Result<Option<PathBuf>> {
    let mut config = resolve_config(cli)?;
    apply_overrides(cli, &mut config)?;

    let options = LoadOptions {
        max_dimension: cli.max_size,
    };
    let source = load_animation(&cli.input, &options)
        .with_context(|| format!("Impossible de charger {}", cli.input.display()))?;
    log::info!(
        "Source chargée : {} ({} frame(s))",
        cli.input.display(),
        source.len()
    );

    let rendered = render_source(&source, &config)
        .with_context(|| format!("Échec du rendu de {}", cli.input.display()))?;
    log::info!("Rendu terminé : {} frame(s)", rendered.frame_count());

    let Some(output) = cli.output.as_deref() else {
        print_or_play(cli, &config, &rendered)?;
        return Ok(None);
    };

    let format = resolve_format(cli)?;
    let encoder = format.encoder(config.palette, cli.font.as_deref())?;
    let bytes = rendered.encode(encoder.as_ref())?;
    write_output(output, &bytes)?;
    log::info!("Sortie écrite : {} ({format})", output.display());

    if cli.metadata {
        let meta = Metadata::new(&cli.input, &format.to_string(), rendered.frame_count(), &config);
        write_metadata(output, &meta)?;
    }
    Ok(Some(output.to_path_buf()))
}

fn print_or_play(cli: &Cli, config: &RenderConfig, rendered: &Rendered) -> Result<()> {
    if cli.play
        && let Rendered::Animated(seq) = rendered
    {
        let frames: Vec<(String, std::time::Duration)> = if config.color_mode == ColorMode::None {
            seq.frames
                .iter()
                .map(|(g, d)| (g.to_plain_string(), *d))
                .collect()
        } else {
            let ansi = AnsiText::new(config.palette);
            seq.frames
                .iter()
                .map(|(g, d)| (ansi.render_frame(g), *d))
                .collect()
        };
        return play::play(&frames);
    }

    let bytes = rendered.encode(console_encoder(config).as_ref())?;
    let mut out = std::io::stdout().lock();
    out.write_all(&bytes)?;
    out.flush()?;
    Ok(())
}
