/// Rendering core of asciigen.
///
/// Converts RGBA images and animations into character grids: background
/// masking, block sampling, glyph lookup and color resolution.
pub mod color_map;
pub mod compositor;
pub mod glyph;
pub mod mask;
pub mod sampler;
pub mod sequencer;

pub use compositor::{Compositor, render_image};
pub use mask::BackgroundMask;
pub use sequencer::render_sequence;
