//! Camera capability.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{BoothError, Result, ResultExt};

/// Which way the camera points.
///
/// The user-facing camera shows a mirror image, and stills taken from it are
/// mirrored the same way so they match the preview.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Facing {
    #[default]
    User,
    Environment,
}

impl Facing {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::User => Self::Environment,
            Self::Environment => Self::User,
        }
    }

    pub const fn is_mirrored(self) -> bool {
        matches!(self, Self::User)
    }
}

/// One still frame returned by a camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub mime: String,
    pub data: Vec<u8>,
}

/// A live video source that can produce a still on demand.
///
/// `None` means the camera had no frame ready; the capture is skipped.
pub trait Camera {
    fn screenshot(&mut self) -> Option<Frame>;

    fn facing(&self) -> Facing;

    fn set_facing(&mut self, facing: Facing);
}

/// Camera that replays image files from a directory in file-name order.
#[derive(Debug)]
pub struct DirectoryCamera {
    frames: Vec<PathBuf>,
    next: usize,
    facing: Facing,
}

impl DirectoryCamera {
    /// Collect the supported image files in `dir`.
    ///
    /// Files are taken as-is, as if shot by the rear camera; switch to
    /// [`Facing::User`] to mirror them.
    pub fn open(dir: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read capture directory {}", dir.display()))?;

        let mut frames: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && mime_for(path).is_some())
            .collect();
        frames.sort();

        if frames.is_empty() {
            return Err(BoothError::Other(format!(
                "No JPEG or PNG images found in {}",
                dir.display()
            )));
        }
        debug!(dir = %dir.display(), frames = frames.len(), "Opened directory camera");
        Ok(Self {
            frames,
            next: 0,
            facing: Facing::Environment,
        })
    }

    /// Frames not yet captured.
    pub fn remaining(&self) -> usize {
        self.frames.len().saturating_sub(self.next)
    }
}

impl Camera for DirectoryCamera {
    fn screenshot(&mut self) -> Option<Frame> {
        let path = self.frames.get(self.next)?;
        self.next += 1;
        let mime = mime_for(path)?;
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read frame");
                return None;
            }
        };
        let data = if self.facing.is_mirrored() {
            mirror_frame(&data, mime).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Keeping frame unmirrored");
                data
            })
        } else {
            data
        };
        Some(Frame {
            mime: mime.to_string(),
            data,
        })
    }

    fn facing(&self) -> Facing {
        self.facing
    }

    fn set_facing(&mut self, facing: Facing) {
        debug!(?facing, "Camera facing changed");
        self.facing = facing;
    }
}

/// Flip an encoded frame horizontally, keeping its format.
fn mirror_frame(data: &[u8], mime: &str) -> Result<Vec<u8>> {
    let format = if mime == "image/png" {
        ImageFormat::Png
    } else {
        ImageFormat::Jpeg
    };
    let flipped = image::load_from_memory_with_format(data, format)
        .with_context(|| "Failed to decode frame")?
        .fliph();
    let mut out = Cursor::new(Vec::new());
    flipped
        .write_to(&mut out, format)
        .with_context(|| "Failed to encode mirrored frame")?;
    Ok(out.into_inner())
}

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}
