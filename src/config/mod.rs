//! Booth configuration.
//!
//! Loaded from TOML. Lookup order: an explicit path (`--config`), then the
//! `BOOTH_CONFIG` environment variable, then `<config-dir>/booth/config.toml`.
//! An explicit or environment path that does not exist is an error; a
//! missing default file just means built-in defaults.

mod path;

pub use path::resolve_path;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, instrument};

use crate::capture::CaptureSettings;
use crate::error::{BoothError, Result};
use crate::export::{DEFAULT_PRODUCT_NAME, ExportSettings};
use crate::session::FileStore;
use crate::style::registry::{BACKGROUND_COLORS, TEXT_COLORS};
use crate::style::{
    AspectRatio, BalanceMode, Filter, Font, Layout, MASONRY_GAP_MAX, MASONRY_GAP_MIN,
    POLAROID_ROTATION_MAX, Rgb, StyleAxis, StyleState, TextSize,
};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "BOOTH_CONFIG";

/// Initial collage style.
///
/// Unknown axis identifiers fall back to the axis default with a warning
/// instead of failing the whole file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleDefaults {
    #[serde(deserialize_with = "axis_or_default")]
    pub layout: Layout,
    #[serde(deserialize_with = "axis_or_default")]
    pub filter: Filter,
    #[serde(deserialize_with = "axis_or_default")]
    pub aspect_ratio: AspectRatio,
    pub background: Rgb,
    pub text_color: Rgb,
    #[serde(deserialize_with = "axis_or_default")]
    pub font: Font,
    #[serde(deserialize_with = "axis_or_default")]
    pub text_size: TextSize,
    #[serde(deserialize_with = "axis_or_default")]
    pub balance: BalanceMode,
    pub show_date: bool,
    pub polaroid_rotation: u8,
    pub masonry_gap: u8,
}

impl Default for StyleDefaults {
    fn default() -> Self {
        let style = StyleState::default();
        Self {
            layout: style.layout,
            filter: style.filter,
            aspect_ratio: style.aspect_ratio,
            background: BACKGROUND_COLORS[0].rgb(),
            text_color: TEXT_COLORS[0].rgb(),
            font: style.font,
            text_size: style.text_size,
            balance: style.balance,
            show_date: style.show_date,
            polaroid_rotation: style.polaroid_rotation(),
            masonry_gap: style.masonry_gap(),
        }
    }
}

fn axis_or_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: StyleAxis,
{
    let id = String::deserialize(deserializer)?;
    Ok(T::parse_or_default(&id))
}

impl StyleDefaults {
    pub fn validate(&self) -> Result<()> {
        if self.polaroid_rotation > POLAROID_ROTATION_MAX {
            return Err(BoothError::ConfigInvalid(format!(
                "style.polaroid_rotation {} exceeds {POLAROID_ROTATION_MAX}",
                self.polaroid_rotation
            )));
        }
        if !(MASONRY_GAP_MIN..=MASONRY_GAP_MAX).contains(&self.masonry_gap) {
            return Err(BoothError::ConfigInvalid(format!(
                "style.masonry_gap {} must be between {MASONRY_GAP_MIN} and {MASONRY_GAP_MAX}",
                self.masonry_gap
            )));
        }
        Ok(())
    }

    /// Build the starting style. An unreadable text color is replaced.
    pub fn to_style(&self) -> StyleState {
        let mut style = StyleState::default();
        style.layout = self.layout;
        style.filter = self.filter;
        style.aspect_ratio = self.aspect_ratio;
        style.font = self.font;
        style.text_size = self.text_size;
        style.balance = self.balance;
        style.show_date = self.show_date;
        style.set_polaroid_rotation(self.polaroid_rotation);
        style.set_masonry_gap(self.masonry_gap);
        style.set_background(self.background);
        style.set_text_color(self.text_color);
        style
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoothConfig {
    /// Prefix of exported filenames.
    pub product_name: String,
    /// Where capture and collage commands share session data.
    pub session_dir: Option<PathBuf>,
    pub export: ExportSettings,
    pub style: StyleDefaults,
    pub capture: CaptureSettings,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            product_name: DEFAULT_PRODUCT_NAME.to_string(),
            session_dir: None,
            export: ExportSettings::default(),
            style: StyleDefaults::default(),
            capture: CaptureSettings::default(),
        }
    }
}

impl BoothConfig {
    /// `<config-dir>/booth/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("booth").join("config.toml"))
    }

    /// Parse and validate TOML content. Relative paths are left untouched.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| BoothError::ConfigParse(format!("TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a specific file, resolving its paths relative to its directory.
    #[instrument]
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BoothError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        if let Some(dir) = &config.session_dir {
            config.session_dir = Some(resolve_path(dir, base)?);
        }
        if let Some(dir) = &config.export.output_dir {
            config.export.output_dir = Some(resolve_path(dir, base)?);
        }
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Find and load the active configuration.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
            debug!(env = CONFIG_ENV, "Using configuration from environment");
            return Self::load_file(Path::new(&path));
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_file(&path),
            _ => {
                debug!("No configuration file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let name = self.product_name.trim();
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(BoothError::ConfigInvalid(format!(
                "product_name '{}' must be a non-empty filename fragment",
                self.product_name
            )));
        }
        self.export.validate()?;
        self.style.validate()?;
        self.capture
            .validate()
            .map_err(|e| BoothError::ConfigInvalid(format!("capture: {e}")))
    }

    /// Session directory, defaulting to the platform data directory.
    pub fn session_dir(&self) -> Result<PathBuf> {
        match &self.session_dir {
            Some(dir) => Ok(dir.clone()),
            None => FileStore::default_dir(),
        }
    }

    /// Directory exported collages are written to.
    pub fn output_dir(&self) -> PathBuf {
        self.export
            .output_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
