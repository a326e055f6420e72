//! Read-only style registry.
//!
//! Enumerated colors, fonts, and sizes offered by the collage editor. These
//! tables are immutable for the life of the process; the contrast fallback
//! depends on the order of [`TEXT_COLORS`].

use serde::Serialize;

use super::Rgb;

/// A named color choice.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Swatch {
    pub hex: &'static str,
    pub label: &'static str,
}

impl Swatch {
    /// Parsed color value.
    ///
    /// Registry entries are compile-time literals covered by tests.
    pub fn rgb(&self) -> Rgb {
        self.hex.parse().unwrap_or(Rgb::BLACK)
    }
}

/// Collage background choices, first entry is the default.
pub static BACKGROUND_COLORS: &[Swatch] = &[
    Swatch { hex: "#ffffff", label: "White" },
    Swatch { hex: "#000000", label: "Black" },
    Swatch { hex: "#fce7f3", label: "Pink" },
    Swatch { hex: "#ede9fe", label: "Purple" },
    Swatch { hex: "#e0f2fe", label: "Blue" },
    Swatch { hex: "#ecfccb", label: "Green" },
    Swatch { hex: "#fef3c7", label: "Yellow" },
    Swatch { hex: "#f8f1e4", label: "Vintage" },
];

/// Caption text colors in fallback order.
pub static TEXT_COLORS: &[Swatch] = &[
    Swatch { hex: "#b56b75", label: "Rose" },
    Swatch { hex: "#000000", label: "Black" },
    Swatch { hex: "#ffffff", label: "White" },
    Swatch { hex: "#5c4033", label: "Sepia" },
    Swatch { hex: "#c9a227", label: "Gold" },
    Swatch { hex: "#1e3a5f", label: "Navy" },
];

/// Default caption color.
pub const DEFAULT_TEXT_COLOR: &str = "#b56b75";

/// Caption shown in the collage footer.
pub const BRAND_CAPTION: &str = "Vintage Booth";

/// Text shown in place of a collage with no photos.
pub const EMPTY_COLLAGE_TEXT: &str = "No photos selected.";

/// Label for a background hex value, if it is in the registry.
pub fn background_label(hex: &str) -> Option<&'static str> {
    BACKGROUND_COLORS
        .iter()
        .find(|swatch| swatch.hex.eq_ignore_ascii_case(hex))
        .map(|swatch| swatch.label)
}
