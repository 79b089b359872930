//! Terminal tinting for request IDs.

use owo_colors::{AnsiColors, DynColors, OwoColorize, Style};

/// Palette used to tint request IDs in log output.
///
/// Twelve distinct ANSI colors, legible on both light and dark backgrounds;
/// red variants are excluded so an ID never reads as an error.
const PALETTE: [AnsiColors; 12] = [
    AnsiColors::Green,
    AnsiColors::Yellow,
    AnsiColors::Blue,
    AnsiColors::Magenta,
    AnsiColors::Cyan,
    AnsiColors::White,
    AnsiColors::BrightGreen,
    AnsiColors::BrightYellow,
    AnsiColors::BrightBlue,
    AnsiColors::BrightMagenta,
    AnsiColors::BrightCyan,
    AnsiColors::BrightWhite,
];

/// Picks a stable palette color for an ID.
///
/// FNV-1a over the ID bytes, so the same ID gets the same color on every
/// log line and across runs.
fn palette_color(id: &str) -> AnsiColors {
    let hash = id
        .bytes()
        .fold(0x811c_9dc5_u32, |acc, b| (acc ^ u32::from(b)).wrapping_mul(0x0100_0193));
    PALETTE[(hash % PALETTE.len() as u32) as usize]
}

/// Renders `[id]` with its palette color for log lines.
pub fn tinted_id(id: &str) -> String {
    let style = Style::new().color(DynColors::Ansi(palette_color(id)));
    format!("[{id}]").style(style).to_string()
}
