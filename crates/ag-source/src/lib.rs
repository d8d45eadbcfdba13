/// Image decoding for asciigen.
///
/// Turns files into `Image` / `AnimationSource` values for the renderer.
/// Format detection is content-based; oversized inputs can be downscaled
/// at load time.
pub mod error;
pub mod image;
pub mod resize;

pub use error::SourceError;
pub use image::{LoadOptions, load_animation, load_image};
