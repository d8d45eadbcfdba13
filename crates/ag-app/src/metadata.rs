use std::path::{Path, PathBuf};

use ag_core::config::RenderConfig;
use anyhow::{Context, Result};
use serde::Serialize;

/// Contenu du fichier `.meta.json` écrit à côté d'une sortie.
#[derive(Debug, Serialize)]
pub struct Metadata<'a> {
    pub source_image: String,
    /// RFC 3339, heure locale.
    pub timestamp: String,
    pub format: String,
    pub frames: usize,
    pub settings: &'a RenderConfig,
    pub version: &'static str,
}

impl<'a> Metadata<'a> {
    #[must_use]
    pub fn new(source: &Path, format: &str, frames: usize, settings: &'a RenderConfig) -> Self {
        Self {
            source_image: source.display().to_string(),
            timestamp: chrono::Local::now().to_rfc3339(),
            format: format.to_string(),
            frames,
            settings,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Sidecar path: the output extension replaced by `meta.json`.
///
/// # Example
/// `art/cat.html` → `art/cat.meta.json`
#[must_use]
pub fn metadata_path(output: &Path) -> PathBuf {
    output.with_extension("meta.json")
}

/// Write `meta` as pretty JSON next to `output`, returning the sidecar path.
///
/// # Errors
/// Returns an error if serialization or the write fails.
pub fn write_metadata(output: &Path, meta: &Metadata<'_>) -> Result<PathBuf> {
    let path = metadata_path(output);
    let json = serde_json::to_string_pretty(meta).context("Sérialisation des métadonnées")?;
    std::fs::write(&path, json)
        .with_context(|| format!("Impossible d'écrire {}", path.display()))?;
    log::info!("Métadonnées écrites : {}", path.display());
    Ok(path)
}
