//! Theme system for human-mode output.

use console::Style;

use crate::style::Rgb;

/// Visual theme for booth CLI human-mode output.
///
/// Centralizes colors and styles for consistent rendering.
#[derive(Debug, Clone)]
pub struct BoothTheme {
    // Status styles
    pub accent: Style,
    pub success: Style,
    pub error: Style,
    pub warning: Style,
    pub muted: Style,

    // Component styles
    pub header: Style,
    pub label: Style,
    pub value: Style,
    pub index: Style,
    pub feature: Style,
}

impl Default for BoothTheme {
    fn default() -> Self {
        // vintage palette: rose accent, sepia labels
        let rose = 174;
        let sepia = 137;
        Self {
            accent: Style::new().color256(rose),
            success: Style::new().green().bold(),
            error: Style::new().red().bold(),
            warning: Style::new().yellow().bold(),
            muted: Style::new().dim(),
            header: Style::new().bold().color256(rose),
            label: Style::new().color256(sepia),
            value: Style::new().bold(),
            index: Style::new().bold().yellow(),
            feature: Style::new().bold().magenta(),
        }
    }
}

impl BoothTheme {
    /// Style that paints in (approximately) `color` on a 256-color terminal.
    pub fn swatch(color: Rgb) -> Style {
        Style::new().color256(xterm_index(color))
    }
}

/// Nearest entry of the xterm 6x6x6 color cube.
pub fn xterm_index(color: Rgb) -> u8 {
    let level = |c: u8| ((u16::from(c) * 5 + 127) / 255) as u8;
    let [r, g, b] = color.channels();
    16 + 36 * level(r) + 6 * level(g) + level(b)
}
