use anyhow::{Context, Result};
use asteroids_core::render::{Cell, Color as Palette, TextFrame};
use crossterm::style::{Color, Colors, Print, ResetColor, SetColors};
use crossterm::terminal::{
    self, BeginSynchronizedUpdate, DisableLineWrap, EnableLineWrap, EndSynchronizedUpdate,
    EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{cursor, execute, queue};
use std::io::{self, Stdout, Write};

const FALLBACK_SIZE: (usize, usize) = (80, 25);

/// Owns the terminal while a session runs: raw mode, alternate screen and a
/// hidden cursor, all undone on drop.
pub struct TerminalGuard {
    out: Stdout,
}

impl TerminalGuard {
    pub fn enter() -> Result<Self> {
        terminal::enable_raw_mode().context("failed enabling raw mode")?;
        let mut out = io::stdout();
        if let Err(err) = execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(terminal::ClearType::All)
        ) {
            let _ = terminal::disable_raw_mode();
            return Err(err).context("failed preparing terminal");
        }
        Ok(Self { out })
    }

    pub fn size(&self) -> (usize, usize) {
        terminal::size()
            .map(|(cols, rows)| (cols as usize, rows as usize))
            .unwrap_or(FALLBACK_SIZE)
    }

    pub fn draw(&mut self, frame: &TextFrame) -> Result<()> {
        let (cols, rows) = self.size();
        queue_frame(&mut self.out, frame, cols, rows).context("failed queueing frame")?;
        self.out.flush().context("failed flushing frame")
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(
            self.out,
            ResetColor,
            EnableLineWrap,
            cursor::Show,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

pub fn term_color(color: Palette) -> Color {
    match color {
        Palette::Black => Color::Black,
        Palette::Blue => Color::DarkBlue,
        Palette::Green => Color::DarkGreen,
        Palette::Cyan => Color::DarkCyan,
        Palette::Red => Color::DarkRed,
        Palette::Magenta => Color::DarkMagenta,
        Palette::Brown => Color::DarkYellow,
        Palette::LightGray => Color::Grey,
        Palette::DarkGray => Color::DarkGrey,
        Palette::LightBlue => Color::Blue,
        Palette::LightGreen => Color::Green,
        Palette::LightCyan => Color::Cyan,
        Palette::LightRed => Color::Red,
        Palette::LightMagenta => Color::Magenta,
        Palette::Yellow => Color::Yellow,
        Palette::White => Color::White,
    }
}

/// Queues `frame` at the top-left of a `cols x rows` screen, cutting off
/// whatever does not fit. Nothing is flushed.
pub fn queue_frame<W: Write>(
    out: &mut W,
    frame: &TextFrame,
    cols: usize,
    rows: usize,
) -> io::Result<()> {
    queue!(out, BeginSynchronizedUpdate)?;
    let mut current = None;
    for y in 0..frame.rows().min(rows).min(u16::MAX as usize) {
        queue!(out, cursor::MoveTo(0, y as u16))?;
        queue_row(out, frame.row(y), cols, &mut current)?;
    }
    queue!(out, ResetColor, EndSynchronizedUpdate)
}

/// Writes `frame` as plain lines, for output outside the game screen.
pub fn print_frame<W: Write>(out: &mut W, frame: &TextFrame) -> io::Result<()> {
    for y in 0..frame.rows() {
        let mut current = None;
        queue_row(out, frame.row(y), frame.cols(), &mut current)?;
        queue!(out, ResetColor, Print('\n'))?;
    }
    out.flush()
}

fn queue_row<W: Write>(
    out: &mut W,
    cells: &[Cell],
    width: usize,
    current: &mut Option<(Palette, Palette)>,
) -> io::Result<()> {
    for cell in cells.iter().take(width) {
        if *current != Some((cell.fg, cell.bg)) {
            queue!(
                out,
                SetColors(Colors::new(term_color(cell.fg), term_color(cell.bg)))
            )?;
            *current = Some((cell.fg, cell.bg));
        }
        queue!(out, Print(cell.ch))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drops escape sequences, keeping the printed glyphs and newlines.
    fn visible_text(bytes: &[u8]) -> String {
        let text = String::from_utf8(bytes.to_vec()).expect("utf-8 output");
        let mut visible = String::new();
        let mut chars = text.chars();
        while let Some(ch) = chars.next() {
            if ch == '\x1b' {
                // CSI sequences end at their first letter.
                for next in chars.by_ref() {
                    if next.is_ascii_alphabetic() {
                        break;
                    }
                }
            } else {
                visible.push(ch);
            }
        }
        visible
    }

    fn sample_frame() -> TextFrame {
        let mut frame = TextFrame::new(4, 3);
        frame.put_str(0, 0, "abcd", Palette::White);
        frame.put_str(0, 1, "e", Palette::Red);
        frame.put_str(0, 2, "fgh", Palette::Yellow);
        frame
    }

    #[test]
    fn printed_frame_keeps_same_colour_runs_together() {
        let mut out = Vec::new();
        print_frame(&mut out, &sample_frame()).unwrap();

        let text = String::from_utf8(out.clone()).unwrap();
        assert!(text.contains("abcd"));
        assert_eq!(visible_text(&out), "abcd\ne   \nfgh \n");
        assert!(text.ends_with("\x1b[0m\n"));
    }

    #[test]
    fn queued_frame_is_clipped_to_the_screen() {
        let mut out = Vec::new();
        queue_frame(&mut out, &sample_frame(), 2, 2).unwrap();

        assert_eq!(visible_text(&out), "abe ");
    }

    #[test]
    fn palette_maps_dim_and_bright_pairs() {
        assert_eq!(term_color(Palette::LightGray), Color::Grey);
        assert_eq!(term_color(Palette::DarkGray), Color::DarkGrey);
        assert_eq!(term_color(Palette::Brown), Color::DarkYellow);
        assert_eq!(term_color(Palette::Yellow), Color::Yellow);
    }
}
