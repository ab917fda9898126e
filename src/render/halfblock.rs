use crate::render::{Frame, Renderer, draw_overlay, write_hud};
use std::io::Write;

/// Truecolor renderer packing two vertical pixels into each cell via the
/// upper-half-block glyph: foreground paints the top pixel, background the
/// bottom one. Color escapes are only emitted when the run changes.
pub struct HalfBlockRenderer {
    last_fg: Option<[u8; 3]>,
    last_bg: Option<[u8; 3]>,
}

const HALF_BLOCK: char = '\u{2580}';

impl HalfBlockRenderer {
    pub fn new() -> Self {
        Self {
            last_fg: None,
            last_bg: None,
        }
    }
}

impl Default for HalfBlockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for HalfBlockRenderer {
    fn name(&self) -> &'static str {
        "halfblock"
    }

    fn cell_pixels(&self) -> (usize, usize) {
        (1, 2)
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let cols = frame.term_cols as usize;
        let visual_rows = frame.visual_rows as usize;
        let w = frame.pixel_width;
        let h = frame.pixel_height;

        if cols == 0 || visual_rows == 0 || w != cols || h != visual_rows * 2 {
            return Ok(());
        }
        if frame.pixels_rgba.len() < w * h * 4 {
            return Ok(());
        }

        if frame.sync_updates {
            out.write_all(b"\x1b[?2026h")?;
        }
        // Home, reset attributes, and disable autowrap while painting
        // full-width rows; a wrap at the last column would shift every
        // following row by one.
        out.write_all(b"\x1b[H\x1b[0m\x1b[?7l")?;
        self.last_fg = None;
        self.last_bg = None;

        for row in 0..visual_rows {
            let top = row * 2;
            let bot = top + 1;
            for x in 0..cols {
                let ti = (top * w + x) * 4;
                let bi = (bot * w + x) * 4;
                let fg = [
                    frame.pixels_rgba[ti],
                    frame.pixels_rgba[ti + 1],
                    frame.pixels_rgba[ti + 2],
                ];
                let bg = [
                    frame.pixels_rgba[bi],
                    frame.pixels_rgba[bi + 1],
                    frame.pixels_rgba[bi + 2],
                ];
                if self.last_fg != Some(fg) {
                    write!(out, "\x1b[38;2;{};{};{}m", fg[0], fg[1], fg[2])?;
                    self.last_fg = Some(fg);
                }
                if self.last_bg != Some(bg) {
                    write!(out, "\x1b[48;2;{};{};{}m", bg[0], bg[1], bg[2])?;
                    self.last_bg = Some(bg);
                }
                write!(out, "{HALF_BLOCK}")?;
            }
            out.write_all(b"\r\n")?;
        }

        write_hud(out, frame)?;
        if let Some(text) = frame.overlay {
            draw_overlay(out, frame.term_cols, frame.term_rows, text)?;
        }

        out.write_all(b"\x1b[?7h")?;
        if frame.sync_updates {
            out.write_all(b"\x1b[?2026l")?;
        }
        out.flush()?;
        Ok(())
    }
}
