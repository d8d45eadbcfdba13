/// Configuration, types, and shared structures for asciigen.
///
/// This crate contains the data model of the rendering pipeline (images,
/// cells, rendered grids and sequences), its error taxonomy, and the
/// configuration consumed by every render call.

pub mod charset;
pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod traits;

pub use charset::CharacterRamp;
pub use config::{ColorMode, Palette, RenderConfig};
pub use error::RenderError;
pub use frame::{
    AnimationSource, Cell, CellColor, CellGrid, Image, RenderedCell, RenderedGrid,
    RenderedSequence,
};
