use std::fmt::Write as _;
use std::time::Duration;

use ag_core::color::Rgb;
use ag_core::frame::{CellColor, RenderedGrid, RenderedSequence};
use ag_core::traits::Encoder;

const HEAD: &str = "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
<title>asciigen</title>\n<style>\n\
body { background: #000; color: #c0c0c0; }\n\
pre.frame { font-family: monospace; line-height: 1; margin: 0; }\n\
pre.frame[hidden] { display: none; }\n\
</style>\n</head>\n<body>\n";

/// Cycles frames using their `data-duration-ms`. Emitted only for sequences.
const PLAYER: &str = "<script>\n\
(function () {\n\
  var frames = document.querySelectorAll('pre.frame');\n\
  var i = 0;\n\
  function next() {\n\
    frames[i].hidden = true;\n\
    i = (i + 1) % frames.length;\n\
    frames[i].hidden = false;\n\
    setTimeout(next, Math.max(20, +frames[i].dataset.durationMs));\n\
  }\n\
  if (frames.length > 1) setTimeout(next, Math.max(20, +frames[0].dataset.durationMs));\n\
})();\n\
</script>\n";

const TAIL: &str = "</body>\n</html>\n";

/// Document HTML autonome, un `<pre>` par frame.
///
/// Runs of identically colored cells share one `<span>`.
///
/// # Example
/// ```
/// use ag_core::frame::RenderedGrid;
/// use ag_core::traits::Encoder;
/// use ag_export::html::Html;
/// let html = String::from_utf8(Html.encode_grid(&RenderedGrid::new(1, 1)).unwrap()).unwrap();
/// assert!(html.contains("<pre class=\"frame\"> </pre>"));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Html;

impl Html {
    fn push_frame(out: &mut String, grid: &RenderedGrid, timing: Option<(usize, Duration)>) {
        out.push_str("<pre class=\"frame\"");
        if let Some((index, duration)) = timing {
            let _ = write!(
                out,
                " data-index=\"{index}\" data-duration-ms=\"{}\"",
                duration.as_millis()
            );
            if index > 0 {
                out.push_str(" hidden");
            }
        }
        out.push('>');

        for (y, row) in grid.rows().enumerate() {
            if y > 0 {
                out.push('\n');
            }
            let mut open = false;
            let mut current = CellColor::NONE;
            for cell in row {
                if cell.color != current {
                    if open {
                        out.push_str("</span>");
                        open = false;
                    }
                    if !cell.color.is_none() {
                        push_span_open(out, cell.color);
                        open = true;
                    }
                    current = cell.color;
                }
                push_escaped(out, cell.ch);
            }
            if open {
                out.push_str("</span>");
            }
        }
        out.push_str("</pre>\n");
    }
}

fn hex((r, g, b): Rgb) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

fn push_span_open(out: &mut String, color: CellColor) {
    let mut style = Vec::with_capacity(2);
    if let Some(fg) = color.fg {
        style.push(format!("color:{}", hex(fg)));
    }
    if let Some(bg) = color.bg {
        style.push(format!("background-color:{}", hex(bg)));
    }
    let _ = write!(out, "<span style=\"{}\">", style.join(";"));
}

fn push_escaped(out: &mut String, ch: char) {
    match ch {
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '&' => out.push_str("&amp;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        c => out.push(c),
    }
}

impl Encoder for Html {
    fn encode_grid(&self, grid: &RenderedGrid) -> anyhow::Result<Vec<u8>> {
        let mut out = String::from(HEAD);
        Self::push_frame(&mut out, grid, None);
        out.push_str(TAIL);
        Ok(out.into_bytes())
    }

    fn encode_sequence(&self, seq: &RenderedSequence) -> anyhow::Result<Vec<u8>> {
        let mut out = String::from(HEAD);
        for (index, (grid, duration)) in seq.frames.iter().enumerate() {
            Self::push_frame(&mut out, grid, Some((index, *duration)));
        }
        if seq.len() > 1 {
            out.push_str(PLAYER);
        }
        out.push_str(TAIL);
        Ok(out.into_bytes())
    }

    fn extension(&self) -> &'static str {
        "html"
    }
}

#[cfg(test)]
mod tests {
    use ag_core::frame::RenderedCell;

    use super::*;

    fn cell(ch: char, fg: Option<Rgb>, bg: Option<Rgb>) -> RenderedCell {
        RenderedCell {
            ch,
            color: CellColor { fg, bg },
        }
    }

    fn encode(grid: &RenderedGrid) -> String {
        String::from_utf8(Html.encode_grid(grid).unwrap()).unwrap()
    }

    #[test]
    fn glyphs_are_escaped() {
        let mut grid = RenderedGrid::new(3, 1);
        grid.set(0, 0, cell('<', None, None));
        grid.set(1, 0, cell('&', None, None));
        grid.set(2, 0, cell('>', None, None));
        assert!(encode(&grid).contains("<pre class=\"frame\">&lt;&amp;&gt;</pre>"));
    }

    #[test]
    fn colored_runs_share_a_span() {
        let mut grid = RenderedGrid::new(3, 1);
        grid.set(0, 0, cell('a', Some((255, 0, 0)), Some((102, 0, 0))));
        grid.set(1, 0, cell('b', Some((255, 0, 0)), Some((102, 0, 0))));
        grid.set(2, 0, cell('c', None, None));
        let html = encode(&grid);
        assert!(html.contains(
            "<span style=\"color:#ff0000;background-color:#660000\">ab</span>c"
        ));
        assert_eq!(html.matches("<span").count(), 1);
    }

    #[test]
    fn spans_close_at_row_end() {
        let mut grid = RenderedGrid::new(1, 2);
        grid.set(0, 0, cell('x', Some((0, 0, 255)), None));
        grid.set(0, 1, cell('y', Some((0, 0, 255)), None));
        let html = encode(&grid);
        assert_eq!(html.matches("</span>").count(), 2);
        assert!(html.contains("x</span>\n<span"));
    }

    #[test]
    fn sequence_carries_durations_and_player() {
        let grid = RenderedGrid::new(1, 1);
        let seq = RenderedSequence {
            frames: vec![
                (grid.clone(), Duration::from_millis(80)),
                (grid, Duration::from_millis(120)),
            ],
        };
        let html = String::from_utf8(Html.encode_sequence(&seq).unwrap()).unwrap();
        assert!(html.contains("data-index=\"0\" data-duration-ms=\"80\">"));
        assert!(html.contains("data-index=\"1\" data-duration-ms=\"120\" hidden>"));
        assert!(html.contains("<script>"));
        assert!(html.ends_with(TAIL));
    }
}
