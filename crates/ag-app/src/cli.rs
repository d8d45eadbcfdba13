use std::path::PathBuf;

use clap::Parser;

/// asciigen : convertit des images et animations en art ASCII.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Image source (PNG, APNG, GIF, JPEG, BMP). Le format est détecté par contenu.
    pub input: PathBuf,

    /// Fichier de sortie. Sans sortie, le rendu est affiché sur stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Format de sortie : txt, ansi, html, md, gif. Défaut : extension de --output.
    #[arg(short, long)]
    pub format: Option<String>,

    /// Largeur en caractères.
    #[arg(short, long)]
    pub width: Option<u32>,

    /// Hauteur en caractères (sinon déduite du ratio d'aspect).
    #[arg(long)]
    pub height: Option<u32>,

    /// Hauteur d'une cellule / largeur (2.0 pour une police terminal).
    #[arg(long)]
    pub aspect: Option<f32>,

    /// Caractères de la rampe, du plus sombre au plus clair.
    #[arg(long, conflicts_with = "preset")]
    pub chars: Option<String>,

    /// Rampe nommée : binary, matrix, blocks, simple, detailed, dots, cards, compact, standard.
    #[arg(long)]
    pub preset: Option<String>,

    /// Inverser la rampe.
    #[arg(long, default_value_t = false)]
    pub invert: bool,

    /// Supprimer le fond détecté sur la bordure.
    #[arg(long, default_value_t = false)]
    pub remove_bg: bool,

    /// Distance RGB sous laquelle un pixel est considéré comme fond.
    #[arg(long)]
    pub tolerance: Option<f32>,

    /// Frame d'animation servant au calcul du masque de fond.
    #[arg(long)]
    pub mask_frame: Option<usize>,

    /// Mode couleur : none, foreground, background, both.
    #[arg(long)]
    pub color: Option<String>,

    /// Luminosité du fond en mode both (0.0 – 1.0).
    #[arg(long)]
    pub dim: Option<f32>,

    /// Palette terminal : truecolor, ansi16.
    #[arg(long)]
    pub palette: Option<String>,

    /// Remplace la durée de chaque frame par 1/fps.
    #[arg(long)]
    pub fps: Option<f32>,

    /// Réduit l'image source si un côté dépasse cette taille (pixels).
    #[arg(long)]
    pub max_size: Option<u32>,

    /// Fichier de configuration TOML. Défaut : asciigen.toml s'il existe.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Police TTF/OTF pour l'export GIF (police bitmap intégrée sinon).
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Écrire un fichier <sortie>.meta.json à côté de la sortie.
    #[arg(long, default_value_t = false)]
    pub metadata: bool,

    /// Jouer l'animation dans le terminal (q ou Échap pour quitter).
    #[arg(long, default_value_t = false)]
    pub play: bool,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}
