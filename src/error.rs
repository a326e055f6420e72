//! Error types for photo booth operations.

use thiserror::Error;

/// Primary error type for photo booth operations.
#[derive(Error, Debug)]
pub enum BoothError {
    // Style errors
    #[error("Unknown {axis} identifier: '{value}'")]
    InvalidStyle { axis: &'static str, value: String },

    #[error("Invalid color '{value}': expected #rrggbb")]
    InvalidColor { value: String },

    // Session errors
    #[error("Session data is corrupt: {0}")]
    SessionCorrupt(String),

    #[error("Invalid photo data: {0}")]
    InvalidPhoto(String),

    // Export errors
    #[error("No photos to export")]
    NoPhotos,

    #[error("An export of this collage is already in progress")]
    ExportInProgress,

    #[error("Failed to rasterize the collage: {0}")]
    RasterizationFailed(String),

    #[error("Invalid export quality {value}: must be between 0.8 and 1.0")]
    InvalidQuality { value: f32 },

    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // Capture errors
    #[error("Refusing to write JPEG data to a terminal")]
    StdoutIsTerminal,

    #[error("Invalid photo count {value}: must be 3-6")]
    InvalidPhotoCount { value: usize },

    #[error("Photo index {index} out of range ({count} photos)")]
    PhotoIndexOutOfRange { index: usize, count: usize },

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl BoothError {
    /// Returns true if the error is recoverable by the user.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidStyle { .. }
                | Self::InvalidColor { .. }
                | Self::NoPhotos
                | Self::ExportInProgress
                | Self::RasterizationFailed(_)
                | Self::InvalidQuality { .. }
                | Self::StdoutIsTerminal
                | Self::InvalidPhotoCount { .. }
                | Self::PhotoIndexOutOfRange { .. }
                | Self::ConfigNotFound { .. }
        )
    }

    /// Returns true if retrying the same action may succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ExportInProgress
                | Self::RasterizationFailed(_)
                | Self::WriteFailed { .. }
                | Self::Io(_)
        )
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidStyle { .. } => Some("Run: booth styles"),
            Self::InvalidColor { .. } => Some("Use a hex color such as #f8f1e4"),
            Self::NoPhotos => Some("Run: booth capture --from <DIR>"),
            Self::ExportInProgress => Some("Wait for the current export to finish"),
            Self::RasterizationFailed(_) => Some("Please try again"),
            Self::InvalidQuality { .. } => Some("Use a quality between 0.8 and 1.0"),
            Self::WriteFailed { .. } => Some("Check free space and permissions, or pass --output"),
            Self::StdoutIsTerminal => Some("Redirect stdout: booth export --copy > collage.jpg"),
            Self::InvalidPhotoCount { .. } => Some("Choose between 3 and 6 photos"),
            Self::ConfigNotFound { .. } => Some("Remove --config to use built-in defaults"),
            _ => None,
        }
    }
}

/// Convenience type alias for Results using BoothError.
pub type Result<T> = std::result::Result<T, BoothError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E: std::error::Error> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| BoothError::Other(format!("{}: {e}", f().into())))
    }
}
