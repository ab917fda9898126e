mod ascii;
mod halfblock;

pub use ascii::AsciiRenderer;
pub use halfblock::HalfBlockRenderer;

use std::io::Write;

/// One finished frame handed to a terminal renderer: the composited pixel
/// buffer plus the text chrome around it.
pub struct Frame<'a> {
    pub term_cols: u16,
    pub term_rows: u16,
    /// Terminal rows available to the visual (term_rows minus HUD rows).
    pub visual_rows: u16,
    pub pixel_width: usize,
    pub pixel_height: usize,
    pub pixels_rgba: &'a [u8],
    pub hud: &'a str,
    pub hud_rows: u16,
    pub overlay: Option<&'a str>,
    /// Wrap output in synchronized-update escapes (DEC 2026) to avoid tearing.
    pub sync_updates: bool,
}

pub trait Renderer {
    fn name(&self) -> &'static str;
    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()>;

    /// Framebuffer pixels per terminal cell, (horizontal, vertical).
    fn cell_pixels(&self) -> (usize, usize);
}

pub(crate) fn write_hud(out: &mut dyn Write, frame: &Frame<'_>) -> anyhow::Result<()> {
    let cols = frame.term_cols as usize;
    let mut hud_lines = frame.hud.lines();
    for i in 0..(frame.hud_rows as usize) {
        write!(
            out,
            "\x1b[{};1H\x1b[0m\x1b[2K",
            frame.visual_rows as usize + i + 1
        )?;
        if let Some(line) = hud_lines.next() {
            write!(out, "{}", truncate_chars(line, cols))?;
        }
    }
    Ok(())
}

/// Cut a line to at most `max` characters. HUD and overlay text can carry
/// arbitrary UTF-8 (device names, file paths), so a byte slice is not safe.
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Centered bordered popup over the visual, used for the help screen.
pub(crate) fn draw_overlay(
    out: &mut dyn Write,
    term_cols: u16,
    term_rows: u16,
    text: &str,
) -> anyhow::Result<()> {
    let cols = term_cols as usize;
    let rows = term_rows as usize;
    if cols < 8 || rows < 4 || text.trim().is_empty() {
        return Ok(());
    }

    let inner_w = cols.saturating_sub(6).max(1);
    let mut lines: Vec<&str> = Vec::new();
    for raw in text.lines() {
        // Hard-truncate long lines; help text is authored short.
        lines.push(truncate_chars(raw, inner_w));
    }

    let body_w = lines.iter().map(|l| l.chars().count()).max().unwrap_or(1);
    let body_w = body_w.clamp(1, inner_w);
    let box_w = (body_w + 4).min(cols.saturating_sub(2));
    let body_h = lines.len().min(rows.saturating_sub(3).max(1));
    let box_h = body_h + 2;

    let start_col = (cols.saturating_sub(box_w)) / 2 + 1;
    let start_row = (rows.saturating_sub(box_h)) / 2 + 1;
    let horiz = "-".repeat(box_w.saturating_sub(2));
    let blank = " ".repeat(box_w.saturating_sub(4));

    out.write_all(b"\x1b[0m\x1b[38;2;230;236;250m\x1b[48;2;8;10;18m")?;
    write!(out, "\x1b[{start_row};{start_col}H+{horiz}+")?;
    for (i, line) in lines.iter().take(body_h).enumerate() {
        let row = start_row + 1 + i;
        write!(out, "\x1b[{row};{start_col}H| {blank} |")?;
        write!(out, "\x1b[{};{}H{}", row, start_col + 2, line)?;
    }
    write!(out, "\x1b[{};{}H+{}+", start_row + box_h - 1, start_col, horiz)?;
    out.write_all(b"\x1b[0m")?;
    Ok(())
}
