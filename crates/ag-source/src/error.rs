use thiserror::Error;

/// Erreurs de décodage des sources.
///
/// Distinct from `RenderError`: a source that fails to decode never reaches
/// the renderer.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Content does not match any decodable format.
    #[error("Format non supporté : {0}")]
    UnsupportedFormat(String),

    /// Recognized format, corrupt or unreadable content.
    #[error("Échec du décodage : {0}")]
    DecodeFailure(String),

    /// Downscaling a decoded frame failed.
    #[error("Échec du redimensionnement : {0}")]
    Resize(String),

    #[error("Erreur d'E/S : {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for SourceError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Unsupported(e) => Self::UnsupportedFormat(e.to_string()),
            image::ImageError::IoError(e) => Self::Io(e),
            other => Self::DecodeFailure(other.to_string()),
        }
    }
}
