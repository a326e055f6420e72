//! Output mode abstraction for robot and human output.

use std::path::PathBuf;

use console::Term;
use serde::Serialize;

use crate::capture::{CaptureEffect, Facing};
use crate::cli::Cli;
use crate::error::BoothError;
use crate::export::Notice;
use crate::layout::Arrangement;
use crate::style::contrast::{ContrastCheck, MIN_CONTRAST_DISTANCE, distance};
use crate::style::registry::{BACKGROUND_COLORS, Swatch, TEXT_COLORS, background_label};
use crate::style::{AspectRatio, BalanceMode, Filter, Font, Layout, Rgb, StyleAxis, TextSize};

pub mod human;
pub mod robot;

pub use human::HumanOutput;
pub use robot::RobotOutput;

// === Report Types ===

/// Outcome of a capture session.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureReport {
    pub photos: usize,
    pub requested: usize,
    /// Countdowns that ended without a camera frame.
    pub missed: usize,
    pub filter: Filter,
    pub effect: CaptureEffect,
    pub facing: Facing,
    pub session_dir: PathBuf,
    /// Individually saved shots, when requested.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shots: Vec<PathBuf>,
    /// Route of the screen shown next.
    pub next_view: &'static str,
}

/// Arrangement of the current session.
#[derive(Debug, Clone, Serialize)]
pub struct ArrangeReport {
    pub photos: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
    pub rows: usize,
    pub arrangement: Arrangement,
}

impl ArrangeReport {
    pub fn new(arrangement: Arrangement, placeholder: Option<&'static str>) -> Self {
        Self {
            photos: arrangement.len(),
            placeholder,
            rows: arrangement.row_count(),
            arrangement,
        }
    }
}

/// Contrast verdict for one text/background pair.
#[derive(Debug, Clone, Serialize)]
pub struct ContrastReport {
    pub text: Rgb,
    pub background: Rgb,
    /// Registry name of the background, when it is one of the offered swatches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_label: Option<&'static str>,
    pub distance: u32,
    pub threshold: u32,
    pub readable: bool,
    pub check: ContrastCheck,
}

impl ContrastReport {
    pub fn new(text: Rgb, background: Rgb) -> Self {
        let check = crate::style::contrast::ensure_readable(text, background);
        Self {
            text,
            background,
            background_label: background_label(&background.to_string()),
            distance: distance(text, background),
            threshold: MIN_CONTRAST_DISTANCE,
            readable: !check.was_substituted(),
            check,
        }
    }
}

/// One selectable value on a style axis.
#[derive(Debug, Clone, Serialize)]
pub struct AxisOption {
    pub id: &'static str,
    pub label: &'static str,
}

/// All values of one style axis.
#[derive(Debug, Clone, Serialize)]
pub struct AxisCatalog {
    pub axis: &'static str,
    pub default: &'static str,
    pub options: Vec<AxisOption>,
}

impl AxisCatalog {
    fn of<T: StyleAxis>() -> Self {
        Self {
            axis: T::AXIS,
            default: T::default().id(),
            options: T::ALL
                .iter()
                .map(|v| AxisOption {
                    id: v.id(),
                    label: v.label(),
                })
                .collect(),
        }
    }
}

/// Every style option the collage editor offers.
#[derive(Debug, Clone, Serialize)]
pub struct StyleCatalog {
    pub axes: Vec<AxisCatalog>,
    pub backgrounds: &'static [Swatch],
    pub text_colors: &'static [Swatch],
}

impl StyleCatalog {
    pub fn build() -> Self {
        Self {
            axes: vec![
                AxisCatalog::of::<Layout>(),
                AxisCatalog::of::<Filter>(),
                AxisCatalog::of::<AspectRatio>(),
                AxisCatalog::of::<BalanceMode>(),
                AxisCatalog::of::<Font>(),
                AxisCatalog::of::<TextSize>(),
            ],
            backgrounds: BACKGROUND_COLORS,
            text_colors: TEXT_COLORS,
        }
    }
}

/// Build metadata reported by `booth version`.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub version: &'static str,
    pub git_sha: &'static str,
    pub git_dirty: bool,
    pub build_date: &'static str,
    pub rustc_version: &'static str,
    pub target: &'static str,
}

/// JSON formatting options for robot mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotFormat {
    /// Pretty-printed JSON (default for --robot).
    Json,
    /// Single-line JSON (--format=json-compact).
    JsonCompact,
}

/// Determines how command output is rendered.
#[derive(Debug)]
pub enum OutputMode {
    /// JSON output for agents and scripting.
    Robot(RobotFormat),
    /// Styled terminal output for people.
    Human(Term),
}

impl OutputMode {
    /// Create OutputMode from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.use_json() {
            let format = if cli.use_compact_json() {
                RobotFormat::JsonCompact
            } else {
                RobotFormat::Json
            };
            Self::Robot(format)
        } else {
            if cli.no_color {
                console::set_colors_enabled(false);
                console::set_colors_enabled_stderr(false);
            }
            Self::Human(Term::stdout())
        }
    }

    pub const fn is_robot(&self) -> bool {
        matches!(self, Self::Robot(_))
    }

    /// Convert into the appropriate Output implementation.
    pub fn into_output(self) -> Box<dyn Output> {
        match self {
            Self::Robot(format) => Box::new(RobotOutput::new(format)),
            Self::Human(term) => Box::new(HumanOutput::new(term)),
        }
    }
}

/// Trait for all output operations.
///
/// Commands call these methods without knowing the output mode.
pub trait Output {
    fn success(&self, message: &str);
    fn error(&self, error: &BoothError);
    fn warning(&self, message: &str);

    fn capture_report(&self, report: &CaptureReport);
    fn arrangement(&self, report: &ArrangeReport);
    fn notice(&self, notice: &Notice);
    fn contrast(&self, report: &ContrastReport);
    fn styles(&self, catalog: &StyleCatalog);

    fn version_info(&self, info: &VersionInfo);
}
