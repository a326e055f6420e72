//! Collage style configuration.
//!
//! Every style axis is a closed enum. Identifiers coming from the outside
//! (CLI flags, session storage, config files) are parsed at the boundary; an
//! unknown identifier is an [`BoothError::InvalidStyle`] rather than a silent
//! fall-through. Callers that prefer to recover use `parse_or_default`.

pub mod contrast;
pub mod registry;

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{BoothError, Result};
use contrast::ContrastCheck;

// === Colors ===

/// An opaque sRGB color, written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as an array, in the order the `image` crate expects.
    pub const fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl FromStr for Rgb {
    type Err = BoothError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || BoothError::InvalidColor {
            value: s.to_string(),
        };
        let digits = s.trim().strip_prefix('#').unwrap_or_else(|| s.trim());
        if digits.len() != 6 {
            return Err(invalid());
        }
        let bytes = hex::decode(digits).map_err(|_| invalid())?;
        Ok(Self::new(bytes[0], bytes[1], bytes[2]))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = BoothError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

// === Style axes ===

/// Shared behavior of the enumerated style axes.
pub trait StyleAxis: Copy + Default + 'static {
    /// Axis name used in error messages.
    const AXIS: &'static str;
    /// Every value, in registry order.
    const ALL: &'static [Self];

    /// Stable identifier.
    fn id(self) -> &'static str;

    /// Human-readable label.
    fn label(self) -> &'static str;

    /// Parse an identifier, falling back to the documented default.
    fn parse_or_default(value: &str) -> Self {
        parse_axis(value).unwrap_or_else(|e| {
            warn!(error = %e, default = Self::default().id(), "Substituting default style");
            Self::default()
        })
    }
}

fn parse_axis<T: StyleAxis>(value: &str) -> Result<T> {
    let needle = value.trim();
    T::ALL
        .iter()
        .copied()
        .find(|candidate| candidate.id().eq_ignore_ascii_case(needle))
        .ok_or_else(|| BoothError::InvalidStyle {
            axis: T::AXIS,
            value: value.to_string(),
        })
}

/// Presentation filter applied uniformly to every displayed/exported photo.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Filter {
    #[default]
    None,
    Grayscale,
    Sepia,
    Vintage,
    Contrast,
    SoftFocus,
}

impl Filter {
    /// CSS class the original page applies to `<img>` elements.
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Grayscale => "filter-grayscale",
            Self::Sepia => "filter-sepia",
            Self::Vintage => "filter-vintage",
            Self::Contrast => "filter-contrast",
            Self::SoftFocus => "filter-blur",
        }
    }

    /// Parse the CSS class stored in the session handoff.
    pub fn from_css_class(class: &str) -> Result<Self> {
        let class = class.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.css_class() == class)
            .ok_or_else(|| BoothError::InvalidStyle {
                axis: Self::AXIS,
                value: class.to_string(),
            })
    }
}

impl StyleAxis for Filter {
    const AXIS: &'static str = "filter";
    const ALL: &'static [Self] = &[
        Self::None,
        Self::Grayscale,
        Self::Sepia,
        Self::Vintage,
        Self::Contrast,
        Self::SoftFocus,
    ];

    fn id(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Grayscale => "grayscale",
            Self::Sepia => "sepia",
            Self::Vintage => "vintage",
            Self::Contrast => "contrast",
            Self::SoftFocus => "soft-focus",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Grayscale => "Grayscale",
            Self::Sepia => "Sepia",
            Self::Vintage => "Vintage",
            Self::Contrast => "Contrast",
            Self::SoftFocus => "Soft Focus",
        }
    }
}

/// Collage arrangement algorithm.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    #[default]
    Vertical,
    Polaroid,
    Masonry,
    Horizontal,
    Grid,
}

impl StyleAxis for Layout {
    const AXIS: &'static str = "layout";
    const ALL: &'static [Self] = &[
        Self::Vertical,
        Self::Polaroid,
        Self::Masonry,
        Self::Horizontal,
        Self::Grid,
    ];

    fn id(self) -> &'static str {
        match self {
            Self::Vertical => "vertical",
            Self::Polaroid => "polaroid",
            Self::Masonry => "masonry",
            Self::Horizontal => "horizontal",
            Self::Grid => "grid",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Vertical => "Vertical",
            Self::Polaroid => "Polaroid",
            Self::Masonry => "Masonry",
            Self::Horizontal => "Horizontal",
            Self::Grid => "Grid",
        }
    }
}

/// Displayed proportions of each image cell.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize,
)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "original")]
    #[value(name = "original")]
    Original,
    #[serde(rename = "square")]
    #[value(name = "square")]
    Square,
    #[serde(rename = "4:3")]
    #[value(name = "4:3")]
    FourThree,
    #[serde(rename = "16:9")]
    #[value(name = "16:9")]
    SixteenNine,
}

impl AspectRatio {
    /// Width over height, or `None` to keep each photo's own proportions.
    pub const fn ratio(self) -> Option<f32> {
        match self {
            Self::Original => None,
            Self::Square => Some(1.0),
            Self::FourThree => Some(4.0 / 3.0),
            Self::SixteenNine => Some(16.0 / 9.0),
        }
    }

    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Original => "aspect-auto",
            Self::Square => "aspect-square",
            Self::FourThree => "aspect-[4/3]",
            Self::SixteenNine => "aspect-video",
        }
    }
}

impl StyleAxis for AspectRatio {
    const AXIS: &'static str = "aspect ratio";
    const ALL: &'static [Self] = &[
        Self::Original,
        Self::Square,
        Self::FourThree,
        Self::SixteenNine,
    ];

    fn id(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Square => "square",
            Self::FourThree => "4:3",
            Self::SixteenNine => "16:9",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Original => "Original",
            Self::Square => "Square",
            Self::FourThree => "4:3",
            Self::SixteenNine => "16:9",
        }
    }
}

/// Flex-weight policy for the horizontal layout.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum BalanceMode {
    Equal,
    #[default]
    Dynamic,
}

impl StyleAxis for BalanceMode {
    const AXIS: &'static str = "balance mode";
    const ALL: &'static [Self] = &[Self::Equal, Self::Dynamic];

    fn id(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Dynamic => "dynamic",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Equal => "Equal",
            Self::Dynamic => "Dynamic",
        }
    }
}

/// Caption font family.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Font {
    #[default]
    Serif,
    Sans,
    Mono,
    Script,
}

impl Font {
    pub const fn css_family(self) -> &'static str {
        match self {
            Self::Serif => "Georgia, serif",
            Self::Sans => "Helvetica, Arial, sans-serif",
            Self::Mono => "\"Courier New\", monospace",
            Self::Script => "\"Brush Script MT\", cursive",
        }
    }
}

impl StyleAxis for Font {
    const AXIS: &'static str = "font";
    const ALL: &'static [Self] = &[Self::Serif, Self::Sans, Self::Mono, Self::Script];

    fn id(self) -> &'static str {
        match self {
            Self::Serif => "serif",
            Self::Sans => "sans",
            Self::Mono => "mono",
            Self::Script => "script",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Serif => "Serif",
            Self::Sans => "Sans",
            Self::Mono => "Typewriter",
            Self::Script => "Script",
        }
    }
}

/// Caption text size.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum TextSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl TextSize {
    /// Caption height in pixels.
    pub const fn px(self) -> u32 {
        match self {
            Self::Small => 14,
            Self::Medium => 18,
            Self::Large => 24,
        }
    }
}

impl StyleAxis for TextSize {
    const AXIS: &'static str = "text size";
    const ALL: &'static [Self] = &[Self::Small, Self::Medium, Self::Large];

    fn id(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Small => "Small",
            Self::Medium => "Medium",
            Self::Large => "Large",
        }
    }
}

macro_rules! impl_from_str_for_axis {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromStr for $ty {
                type Err = BoothError;

                fn from_str(s: &str) -> Result<Self> {
                    parse_axis(s)
                }
            }
        )*
    };
}

impl_from_str_for_axis!(Filter, Layout, AspectRatio, BalanceMode, Font, TextSize);

// === Style state ===

pub const POLAROID_ROTATION_MAX: u8 = 10;
pub const MASONRY_GAP_MIN: u8 = 1;
pub const MASONRY_GAP_MAX: u8 = 4;

/// Mutable configuration driving capture and collage rendering.
///
/// `background` and `text_color` are only reachable through setters so the
/// contrast invariant holds after every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleState {
    pub filter: Filter,
    pub layout: Layout,
    pub aspect_ratio: AspectRatio,
    pub font: Font,
    pub text_size: TextSize,
    pub balance: BalanceMode,
    pub show_date: bool,
    background: Rgb,
    text_color: Rgb,
    polaroid_rotation: u8,
    masonry_gap: u8,
}

impl Default for StyleState {
    fn default() -> Self {
        Self {
            filter: Filter::default(),
            layout: Layout::default(),
            aspect_ratio: AspectRatio::default(),
            font: Font::default(),
            text_size: TextSize::default(),
            balance: BalanceMode::default(),
            show_date: false,
            background: registry::BACKGROUND_COLORS[0].rgb(),
            text_color: registry::TEXT_COLORS[0].rgb(),
            polaroid_rotation: 3,
            masonry_gap: 2,
        }
    }
}

impl StyleState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn background(&self) -> Rgb {
        self.background
    }

    pub const fn text_color(&self) -> Rgb {
        self.text_color
    }

    /// Polaroid tilt magnitude in degrees (0-10).
    pub const fn polaroid_rotation(&self) -> u8 {
        self.polaroid_rotation
    }

    /// Masonry gap in units (1-4); one unit is four pixels.
    pub const fn masonry_gap(&self) -> u8 {
        self.masonry_gap
    }

    /// Change the background and re-validate the caption color against it.
    pub fn set_background(&mut self, background: Rgb) -> ContrastCheck {
        self.background = background;
        let check = contrast::ensure_readable(self.text_color, background);
        if check.was_substituted() {
            debug!(%background, replacement = %check.color(), "Caption color replaced after background change");
        }
        self.text_color = check.color();
        check
    }

    /// Request a caption color; unreadable candidates are replaced.
    pub fn set_text_color(&mut self, candidate: Rgb) -> ContrastCheck {
        let check = contrast::ensure_readable(candidate, self.background);
        self.text_color = check.color();
        check
    }

    /// Set the polaroid tilt, clamped to 0-10 degrees.
    pub fn set_polaroid_rotation(&mut self, degrees: u8) {
        self.polaroid_rotation = degrees.min(POLAROID_ROTATION_MAX);
    }

    /// Set the masonry gap, clamped to 1-4 units.
    pub fn set_masonry_gap(&mut self, units: u8) {
        self.masonry_gap = units.clamp(MASONRY_GAP_MIN, MASONRY_GAP_MAX);
    }

    /// Apply a layout identifier, rejecting unknown values and keeping the current layout.
    pub fn apply_layout_id(&mut self, id: &str) -> Result<()> {
        self.layout = id.parse()?;
        Ok(())
    }

    /// Apply a filter identifier, rejecting unknown values and keeping the current filter.
    pub fn apply_filter_id(&mut self, id: &str) -> Result<()> {
        self.filter = id.parse()?;
        Ok(())
    }

    /// Apply an aspect-ratio identifier, rejecting unknown values.
    pub fn apply_aspect_ratio_id(&mut self, id: &str) -> Result<()> {
        self.aspect_ratio = id.parse()?;
        Ok(())
    }
}
