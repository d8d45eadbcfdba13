use std::io::{Write, stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{cursor, execute, queue, terminal};

/// Shortest delay between frames; zero-delay animations still get drawn.
pub const MIN_FRAME_DELAY: Duration = Duration::from_millis(20);

/// Delay actually waited for a frame of duration `d`.
#[must_use]
pub fn frame_delay(d: Duration) -> Duration {
    d.max(MIN_FRAME_DELAY)
}

/// `q`, Échap ou Ctrl+C arrêtent la lecture.
#[must_use]
pub fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Raw mode disables newline translation: every `\n` needs its `\r`.
#[must_use]
pub fn to_raw_lines(frame: &str) -> String {
    frame.replace('\n', "\r\n")
}

/// Joue des frames pré-rendues en boucle jusqu'à une touche de sortie.
///
/// Frames are full terminal-ready strings (plain or ANSI-styled). The
/// terminal is restored even when drawing fails.
///
/// # Errors
/// Returns an error if the terminal cannot be configured or written.
pub fn play(frames: &[(String, Duration)]) -> Result<()> {
    if frames.is_empty() {
        return Ok(());
    }
    terminal::enable_raw_mode()?;
    execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

    let result = run_loop(frames);

    // Restaurer le terminal (TOUJOURS, même en cas d'erreur)
    execute!(stdout(), cursor::Show, terminal::LeaveAlternateScreen).ok();
    terminal::disable_raw_mode().ok();
    result
}

fn run_loop(frames: &[(String, Duration)]) -> Result<()> {
    let frames: Vec<(String, Duration)> = frames
        .iter()
        .map(|(text, d)| (to_raw_lines(text), frame_delay(*d)))
        .collect();
    let mut out = stdout();
    let mut shown = 0usize;

    for (text, delay) in frames.iter().cycle() {
        let started = Instant::now();
        queue!(
            out,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::All)
        )?;
        out.write_all(text.as_bytes())?;
        out.flush()?;
        shown += 1;

        while let Some(remaining) = delay.checked_sub(started.elapsed()) {
            if !event::poll(remaining)? {
                break;
            }
            if let Event::Key(key) = event::read()?
                && is_quit_key(&key)
            {
                log::info!("Lecture interrompue après {shown} frames");
                return Ok(());
            }
        }
    }
    Ok(())
}
