//! Text/background contrast validation.
//!
//! Distance is the sum of per-channel absolute differences; a text color is
//! readable against a background when the distance reaches
//! [`MIN_CONTRAST_DISTANCE`]. Fallback walks the fixed text-color registry in
//! order, so the result is deterministic and bounded.

use serde::Serialize;
use tracing::{debug, warn};

use super::Rgb;
use super::registry::TEXT_COLORS;

/// Minimum channel-sum distance between text and background.
pub const MIN_CONTRAST_DISTANCE: u32 = 50;

/// Sum of absolute per-channel differences.
pub fn distance(a: Rgb, b: Rgb) -> u32 {
    u32::from(a.r.abs_diff(b.r)) + u32::from(a.g.abs_diff(b.g)) + u32::from(a.b.abs_diff(b.b))
}

/// Returns true if `text` is far enough from `background`.
pub fn is_readable(text: Rgb, background: Rgb) -> bool {
    distance(text, background) >= MIN_CONTRAST_DISTANCE
}

/// Result of validating a text color against a background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ContrastCheck {
    /// The candidate satisfies the threshold and is kept.
    Accepted { color: Rgb },
    /// The candidate was rejected and replaced.
    Substituted { rejected: Rgb, replacement: Rgb },
}

impl ContrastCheck {
    /// The color that ends up in use.
    pub const fn color(&self) -> Rgb {
        match *self {
            Self::Accepted { color } => color,
            Self::Substituted { replacement, .. } => replacement,
        }
    }

    pub const fn was_substituted(&self) -> bool {
        matches!(self, Self::Substituted { .. })
    }
}

/// First enumerated text color readable against `background`.
///
/// If none qualifies, the enumerated color with the greatest distance wins.
pub fn fallback_text_color(background: Rgb) -> Rgb {
    let colors = TEXT_COLORS.iter().map(|swatch| swatch.rgb());

    if let Some(color) = colors.clone().find(|c| is_readable(*c, background)) {
        return color;
    }

    warn!(%background, "No enumerated text color meets the contrast threshold");
    colors
        .max_by_key(|c| distance(*c, background))
        .unwrap_or(Rgb::BLACK)
}

/// Validate `candidate` against `background`, substituting on failure.
pub fn ensure_readable(candidate: Rgb, background: Rgb) -> ContrastCheck {
    if is_readable(candidate, background) {
        return ContrastCheck::Accepted { color: candidate };
    }

    let replacement = fallback_text_color(background);
    debug!(
        %candidate,
        %background,
        %replacement,
        distance = distance(candidate, background),
        "Text color rejected for low contrast"
    );
    ContrastCheck::Substituted {
        rejected: candidate,
        replacement,
    }
}
