use thiserror::Error;

/// Errors raised by a render call.
///
/// Every variant is terminal for the call that produced it: no partial grid
/// or sequence is ever returned alongside an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// Zero-sized or malformed image; also an animation without frames.
    #[error("Image invalide : {0}")]
    InvalidImage(String),

    /// Grid size, aspect correction, frame rate or seed index out of range.
    #[error("Dimension invalide : {0}")]
    InvalidDimension(String),

    /// The character ramp has no characters.
    #[error("Rampe de caractères vide")]
    EmptyRamp,

    /// Color mode string outside `none | foreground | background | both`.
    #[error("Mode couleur non supporté : {0}")]
    UnsupportedColorMode(String),

    /// Failure while rendering one frame of an animation.
    #[error("Frame {index} : {source}")]
    Frame {
        /// Index of the offending frame in source order.
        index: usize,
        /// Underlying error.
        #[source]
        source: Box<RenderError>,
    },
}

impl RenderError {
    /// Wrap `self` with the index of the animation frame that produced it.
    ///
    /// # Example
    /// ```
    /// use ag_core::error::RenderError;
    /// let err = RenderError::EmptyRamp.at_frame(3);
    /// assert!(matches!(err, RenderError::Frame { index: 3, .. }));
    /// ```
    #[must_use]
    pub fn at_frame(self, index: usize) -> Self {
        Self::Frame {
            index,
            source: Box::new(self),
        }
    }
}
