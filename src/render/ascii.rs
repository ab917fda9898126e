use crate::render::{Frame, Renderer, draw_overlay, write_hud};
use std::io::Write;

/// Portable fallback: one pixel per cell, brightness mapped onto a glyph
/// ramp, truecolor foreground only. Works in terminals without half-block
/// glyph support.
pub struct AsciiRenderer {
    last_fg: Option<[u8; 3]>,
}

const RAMP: &[u8] = b" .:-=+*#%@";

impl AsciiRenderer {
    pub fn new() -> Self {
        Self { last_fg: None }
    }
}

impl Default for AsciiRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for AsciiRenderer {
    fn name(&self) -> &'static str {
        "ascii"
    }

    fn cell_pixels(&self) -> (usize, usize) {
        (1, 1)
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let cols = frame.term_cols as usize;
        let visual_rows = frame.visual_rows as usize;
        let w = frame.pixel_width;
        let h = frame.pixel_height;

        if cols == 0 || visual_rows == 0 || w != cols || h != visual_rows {
            return Ok(());
        }
        if frame.pixels_rgba.len() < w * h * 4 {
            return Ok(());
        }

        if frame.sync_updates {
            out.write_all(b"\x1b[?2026h")?;
        }
        out.write_all(b"\x1b[H\x1b[0m\x1b[?7l")?;
        self.last_fg = None;

        for row in 0..visual_rows {
            for x in 0..cols {
                let i = (row * w + x) * 4;
                let fg = [
                    frame.pixels_rgba[i],
                    frame.pixels_rgba[i + 1],
                    frame.pixels_rgba[i + 2],
                ];
                // Rec. 601 luma picks the ramp glyph.
                let luma =
                    0.299 * fg[0] as f32 + 0.587 * fg[1] as f32 + 0.114 * fg[2] as f32;
                let idx = ((luma / 255.0) * (RAMP.len() - 1) as f32).round() as usize;
                if self.last_fg != Some(fg) {
                    write!(out, "\x1b[38;2;{};{};{}m", fg[0], fg[1], fg[2])?;
                    self.last_fg = Some(fg);
                }
                out.write_all(&[RAMP[idx.min(RAMP.len() - 1)]])?;
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
