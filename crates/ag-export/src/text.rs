use std::fmt::Write as _;

use ag_core::color::{AnsiColor, Rgb};
use ag_core::config::Palette;
use ag_core::frame::{CellColor, RenderedGrid, RenderedSequence};
use ag_core::traits::Encoder;

/// Séparateur de frames pour le texte brut : saut de page sur sa propre ligne.
pub const FORM_FEED_LINE: &str = "\x0c\n";

/// SGR reset.
pub const RESET: &str = "\x1b[0m";

/// Cursor home: each frame of an ANSI sequence overwrites the previous one.
pub const CURSOR_HOME: &str = "\x1b[H";

/// Glyphs only, one line per row.
///
/// # Example
/// ```
/// use ag_core::frame::RenderedGrid;
/// use ag_core::traits::Encoder;
/// use ag_export::text::PlainText;
/// let bytes = PlainText.encode_grid(&RenderedGrid::new(2, 2)).unwrap();
/// assert_eq!(bytes, b"  \n  \n");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainText;

impl Encoder for PlainText {
    fn encode_grid(&self, grid: &RenderedGrid) -> anyhow::Result<Vec<u8>> {
        let mut out = grid.to_plain_string();
        out.push('\n');
        Ok(out.into_bytes())
    }

    fn encode_sequence(&self, seq: &RenderedSequence) -> anyhow::Result<Vec<u8>> {
        let mut out = String::new();
        for (i, (grid, _)) in seq.frames.iter().enumerate() {
            if i > 0 {
                out.push_str(FORM_FEED_LINE);
            }
            out.push_str(&grid.to_plain_string());
            out.push('\n');
        }
        Ok(out.into_bytes())
    }

    fn extension(&self) -> &'static str {
        "txt"
    }
}

/// Fenced code block per frame; colors are dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct Markdown;

impl Markdown {
    fn push_block(out: &mut String, grid: &RenderedGrid) {
        out.push_str("```text\n");
        out.push_str(&grid.to_plain_string());
        out.push_str("\n```\n");
    }
}

impl Encoder for Markdown {
    fn encode_grid(&self, grid: &RenderedGrid) -> anyhow::Result<Vec<u8>> {
        let mut out = String::new();
        Self::push_block(&mut out, grid);
        Ok(out.into_bytes())
    }

    fn encode_sequence(&self, seq: &RenderedSequence) -> anyhow::Result<Vec<u8>> {
        let mut out = String::new();
        for (i, (grid, duration)) in seq.frames.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let _ = writeln!(out, "Frame {} ({} ms)\n", i + 1, duration.as_millis());
            Self::push_block(&mut out, grid);
        }
        Ok(out.into_bytes())
    }

    fn extension(&self) -> &'static str {
        "md"
    }
}

/// Glyphs wrapped in SGR color sequences.
///
/// Consecutive cells with the same color share one sequence; each row ends
/// with [`RESET`].
///
/// # Example
/// ```
/// use ag_core::config::Palette;
/// use ag_core::frame::{CellColor, RenderedCell, RenderedGrid};
/// use ag_core::traits::Encoder;
/// use ag_export::text::AnsiText;
///
/// let mut grid = RenderedGrid::new(1, 1);
/// grid.set(0, 0, RenderedCell { ch: '#', color: CellColor { fg: Some((255, 0, 0)), bg: None } });
/// let out = AnsiText::new(Palette::TrueColor).encode_grid(&grid).unwrap();
/// assert_eq!(out, b"\x1b[0;38;2;255;0;0m#\x1b[0m\n");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct AnsiText {
    palette: Palette,
}

impl AnsiText {
    #[must_use]
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    fn push_sgr(&self, out: &mut String, color: CellColor) {
        out.push_str("\x1b[0");
        if let Some(fg) = color.fg {
            self.push_channel(out, 38, 30, fg);
        }
        if let Some(bg) = color.bg {
            self.push_channel(out, 48, 40, bg);
        }
        out.push('m');
    }

    fn push_channel(&self, out: &mut String, extended: u8, basic: u8, (r, g, b): Rgb) {
        let _ = match self.palette {
            Palette::TrueColor => write!(out, ";{extended};2;{r};{g};{b}"),
            Palette::Ansi16 => write!(out, ";{}", basic + AnsiColor::nearest((r, g, b)).code()),
        };
    }

    /// Une frame, lignes séparées par `\n`, sans saut final.
    #[must_use]
    pub fn render_frame(&self, grid: &RenderedGrid) -> String {
        let mut out = String::with_capacity(grid.cells.len() * 4);
        for (y, row) in grid.rows().enumerate() {
            if y > 0 {
                out.push('\n');
            }
            let mut current = CellColor::NONE;
            for cell in row {
                if cell.color != current {
                    if cell.color.is_none() {
                        out.push_str(RESET);
                    } else {
                        self.push_sgr(&mut out, cell.color);
                    }
                    current = cell.color;
                }
                out.push(cell.ch);
            }
            out.push_str(RESET);
        }
        out
    }
}

impl Encoder for AnsiText {
    fn encode_grid(&self, grid: &RenderedGrid) -> anyhow::Result<Vec<u8>> {
        let mut out = self.render_frame(grid);
        out.push('\n');
        Ok(out.into_bytes())
    }

    fn encode_sequence(&self, seq: &RenderedSequence) -> anyhow::Result<Vec<u8>> {
        let mut out = String::new();
        for (i, (grid, _)) in seq.frames.iter().enumerate() {
            if i > 0 {
                out.push_str(CURSOR_HOME);
            }
            out.push_str(&self.render_frame(grid));
            out.push('\n');
        }
        Ok(out.into_bytes())
    }

    fn extension(&self) -> &'static str {
        "ans"
    }
}
