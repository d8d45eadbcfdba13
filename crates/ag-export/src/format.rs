use std::fmt;
use std::path::Path;
use std::str::FromStr;

use ag_core::config::Palette;
use ag_core::traits::Encoder;
use anyhow::Result;

use crate::gif::GifExport;
use crate::html::Html;
use crate::text::{AnsiText, Markdown, PlainText};

/// Pixels per em for outline fonts in GIF export.
pub const DEFAULT_FONT_PX: f32 = 16.0;

/// Formats de sortie supportés.
///
/// # Example
/// ```
/// use ag_export::format::OutputFormat;
/// use std::path::Path;
/// assert_eq!("html".parse::<OutputFormat>().unwrap(), OutputFormat::Html);
/// assert_eq!(OutputFormat::from_path(Path::new("out.GIF")), Some(OutputFormat::Gif));
/// assert_eq!(OutputFormat::from_path(Path::new("out")), None);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Txt,
    Ansi,
    Html,
    Md,
    Gif,
}

impl OutputFormat {
    pub const ALL: [Self; 5] = [Self::Txt, Self::Ansi, Self::Html, Self::Md, Self::Gif];

    /// Format implied by a file extension, case-insensitive.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" | "text" => Some(Self::Txt),
            "ans" | "ansi" => Some(Self::Ansi),
            "html" | "htm" => Some(Self::Html),
            "md" | "markdown" => Some(Self::Md),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Build the encoder for this format.
    ///
    /// `palette` applies to ANSI output, `font` to GIF output (builtin
    /// bitmap font when `None`).
    ///
    /// # Errors
    /// Returns an error if the font cannot be loaded.
    pub fn encoder(self, palette: Palette, font: Option<&Path>) -> Result<Box<dyn Encoder>> {
        let encoder: Box<dyn Encoder> = match self {
            Self::Txt => Box::new(PlainText),
            Self::Ansi => Box::new(AnsiText::new(palette)),
            Self::Html => Box::new(Html),
            Self::Md => Box::new(Markdown),
            Self::Gif => match font {
                Some(path) => Box::new(GifExport::with_font(path, DEFAULT_FONT_PX)?),
                None => Box::new(GifExport::builtin()),
            },
        };
        Ok(encoder)
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(Self::Txt),
            "ansi" | "ans" => Ok(Self::Ansi),
            "html" | "htm" => Ok(Self::Html),
            "md" | "markdown" => Ok(Self::Md),
            "gif" => Ok(Self::Gif),
            other => anyhow::bail!("Format inconnu : {other} (txt | ansi | html | md | gif)"),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Txt => "txt",
            Self::Ansi => "ansi",
            Self::Html => "html",
            Self::Md => "md",
            Self::Gif => "gif",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parses_back() {
        for format in OutputFormat::ALL {
            assert_eq!(format.to_string().parse::<OutputFormat>().unwrap(), format);
        }
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!("bmp".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::from_path(Path::new("a.bmp")), None);
    }

    #[test]
    fn encoders_report_their_extension() {
        let exts: Vec<_> = OutputFormat::ALL
            .iter()
            .map(|f| f.encoder(Palette::TrueColor, None).unwrap().extension())
            .collect();
        assert_eq!(exts, ["txt", "ans", "html", "md", "gif"]);
    }

    #[test]
    fn ansi_extension_round_trips_through_from_path() {
        let enc = OutputFormat::Ansi.encoder(Palette::Ansi16, None).unwrap();
        let path = format!("out.{}", enc.extension());
        assert_eq!(
            OutputFormat::from_path(Path::new(&path)),
            Some(OutputFormat::Ansi)
        );
    }
}
