/// Output encoders for asciigen.
///
/// Plain text, ANSI-styled text, HTML, Markdown and animated GIF, all behind
/// the `Encoder` trait of ag-core.
pub mod format;
pub mod gif;
pub mod html;
pub mod rasterizer;
pub mod text;

pub use format::OutputFormat;
