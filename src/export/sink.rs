//! Download delivery.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{BoothError, Result};

/// Receives finished collage bytes under a suggested filename.
pub trait DownloadSink {
    /// Deliver `bytes`, returning where they ended up.
    fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf>;
}

/// Writes downloads into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let write_failed = |path: &Path, source| BoothError::WriteFailed {
            path: path.display().to_string(),
            source,
        };
        std::fs::create_dir_all(&self.dir).map_err(|e| write_failed(&self.dir, e))?;
        let path = self.dir.join(filename);
        std::fs::write(&path, bytes).map_err(|e| write_failed(&path, e))?;
        info!(path = %path.display(), bytes = bytes.len(), "Collage saved");
        Ok(path)
    }
}
