use crate::frame::{RenderedGrid, RenderedSequence};

/// Sérialise des grilles rendues vers un format de sortie.
///
/// Implémenté par : `PlainText`, `AnsiText`, `Markdown`, `Html`, `GifExport`.
///
/// # Example
/// ```
/// use ag_core::traits::Encoder;
/// use ag_core::frame::{RenderedGrid, RenderedSequence};
///
/// struct CountingEncoder;
/// impl Encoder for CountingEncoder {
///     fn encode_grid(&self, grid: &RenderedGrid) -> anyhow::Result<Vec<u8>> {
///         Ok(grid.cells.len().to_string().into_bytes())
///     }
///     fn encode_sequence(&self, seq: &RenderedSequence) -> anyhow::Result<Vec<u8>> {
///         Ok(seq.len().to_string().into_bytes())
///     }
///     fn extension(&self) -> &'static str { "cnt" }
/// }
///
/// let bytes = CountingEncoder.encode_grid(&RenderedGrid::new(2, 3)).unwrap();
/// assert_eq!(bytes, b"6");
/// ```
pub trait Encoder: Send + Sync {
    /// Encode a single still rendering.
    ///
    /// # Errors
    /// Returns an error if the target format cannot represent the grid.
    fn encode_grid(&self, grid: &RenderedGrid) -> anyhow::Result<Vec<u8>>;

    /// Encode an animation, keeping frame order and timing when the format
    /// can carry it.
    ///
    /// # Errors
    /// Returns an error if the target format cannot represent the sequence.
    fn encode_sequence(&self, seq: &RenderedSequence) -> anyhow::Result<Vec<u8>>;

    /// Conventional file extension, without the dot.
    fn extension(&self) -> &'static str;
}
