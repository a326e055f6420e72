//! CLI argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::capture::{CaptureEffect, Facing};
use crate::collage::StyleEvent;
use crate::export::FilenameScheme;
use crate::style::{AspectRatio, BalanceMode, Filter, Font, Layout, Rgb, TextSize};

/// Vintage Booth - photo booth sessions and collage export.
///
/// Robot Mode: Use --robot or --format=json for machine-parseable output.
#[derive(Parser, Debug)]
#[command(name = "booth", version, about, long_about = None)]
#[command(propagate_version = true)]
#[allow(clippy::struct_excessive_bools)] // CLI flags naturally use multiple bools
pub struct Cli {
    /// Output format (text for humans, json for agents/scripts)
    #[arg(
        long,
        short = 'f',
        default_value = "text",
        global = true,
        env = "BOOTH_FORMAT"
    )]
    pub format: OutputFormat,

    /// Robot mode: equivalent to --format=json
    #[arg(long, global = true)]
    pub robot: bool,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Session directory shared by capture and export
    #[arg(long, global = true, env = "BOOTH_SESSION_DIR")]
    pub session_dir: Option<PathBuf>,

    /// Configuration file (defaults to $BOOTH_CONFIG, then the user config dir)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format selection.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with optional color
    #[default]
    Text,
    /// JSON output for scripts and agents
    Json,
    /// Compact JSON (single line)
    JsonCompact,
}

impl Cli {
    /// Returns true if output should be JSON (robot mode or explicit --format=json).
    pub const fn use_json(&self) -> bool {
        self.robot || matches!(self.format, OutputFormat::Json | OutputFormat::JsonCompact)
    }

    /// Returns true if output should be compact JSON.
    pub const fn use_compact_json(&self) -> bool {
        matches!(self.format, OutputFormat::JsonCompact)
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    // === Session ===
    /// Run a capture session from a directory of frames
    Capture(CaptureArgs),

    // === Collage ===
    /// Show how the session photos would be arranged
    Arrange(ArrangeArgs),

    /// Render the session collage to a JPEG
    Export(ExportArgs),

    // === Style ===
    /// Check a caption color against a background
    Contrast(ContrastArgs),

    /// List style options and color swatches
    Styles,

    // === Utilities ===
    /// Show version and build information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// === Argument Structs ===

#[derive(Parser, Debug)]
pub struct CaptureArgs {
    /// Directory of JPEG/PNG frames standing in for the camera
    #[arg(long, value_name = "DIR")]
    pub from: PathBuf,

    /// Photos to take (3-6)
    #[arg(long, short = 'n')]
    pub count: Option<usize>,

    /// Countdown seconds before each photo
    #[arg(long, short = 't')]
    pub timer: Option<u32>,

    /// Filter recorded with the session
    #[arg(long)]
    pub filter: Option<Filter>,

    /// Capture effect
    #[arg(long)]
    pub effect: Option<CaptureEffect>,

    /// Camera facing; `user` mirrors frames like a selfie camera
    #[arg(long)]
    pub facing: Option<Facing>,

    /// Also save each shot as photo-booth-N.jpg in this directory
    #[arg(long, value_name = "DIR")]
    pub save_shots: Option<PathBuf>,

    /// Milliseconds per countdown tick
    #[arg(long, default_value_t = 1000)]
    pub tick_ms: u64,
}

/// Style overrides shared by `arrange` and `export`.
#[derive(Parser, Debug, Default)]
pub struct StyleArgs {
    #[arg(long)]
    pub layout: Option<Layout>,

    #[arg(long)]
    pub filter: Option<Filter>,

    #[arg(long)]
    pub aspect_ratio: Option<AspectRatio>,

    /// Background color (#rrggbb)
    #[arg(long)]
    pub background: Option<Rgb>,

    /// Caption color (#rrggbb); replaced if unreadable
    #[arg(long)]
    pub text_color: Option<Rgb>,

    #[arg(long)]
    pub font: Option<Font>,

    #[arg(long)]
    pub text_size: Option<TextSize>,

    /// Horizontal strip balance
    #[arg(long)]
    pub balance: Option<BalanceMode>,

    /// Polaroid tilt in degrees (0-10)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub polaroid_rotation: Option<u8>,

    /// Masonry gap units (1-4)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
    pub masonry_gap: Option<u8>,

    /// Print the date under the caption
    #[arg(long)]
    pub show_date: bool,
}

impl StyleArgs {
    /// Overrides as style events, background before caption color.
    pub fn events(&self) -> Vec<StyleEvent> {
        let mut events = Vec::new();
        events.extend(self.layout.map(StyleEvent::Layout));
        events.extend(self.filter.map(StyleEvent::Filter));
        events.extend(self.aspect_ratio.map(StyleEvent::AspectRatio));
        events.extend(self.background.map(StyleEvent::Background));
        events.extend(self.text_color.map(StyleEvent::TextColor));
        events.extend(self.font.map(StyleEvent::Font));
        events.extend(self.text_size.map(StyleEvent::TextSize));
        events.extend(self.balance.map(StyleEvent::Balance));
        events.extend(self.polaroid_rotation.map(StyleEvent::PolaroidRotation));
        events.extend(self.masonry_gap.map(StyleEvent::MasonryGap));
        if self.show_date {
            events.push(StyleEvent::ShowDate(true));
        }
        events
    }
}

#[derive(Parser, Debug)]
pub struct ArrangeArgs {
    #[command(flatten)]
    pub style: StyleArgs,

    /// Arrange this many placeholder photos instead of the session
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub style: StyleArgs,

    /// Output directory (defaults to config, then the download directory)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// JPEG quality (0.8-1.0)
    #[arg(long)]
    pub quality: Option<f32>,

    /// Canvas width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Filename scheme
    #[arg(long)]
    pub filename: Option<FilenameScheme>,

    /// Write a reduced-quality JPEG to stdout instead of saving a file
    #[arg(long, conflicts_with_all = ["output", "quality", "filename"])]
    pub copy: bool,
}

#[derive(Parser, Debug)]
pub struct ContrastArgs {
    /// Candidate caption color (#rrggbb)
    pub text: Rgb,

    /// Background color (#rrggbb)
    #[arg(long, short = 'b', default_value = "#ffffff")]
    pub background: Rgb,
}

#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
