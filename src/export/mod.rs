//! Collage export: wait for images, rasterize, deliver one JPEG.
//!
//! [`ExportOrchestrator::export_collage`] is the only operation in the crate
//! with genuine failure modes. [`ExportOrchestrator::handle_download`] turns
//! every outcome into a [`Notice`] so callers never see a raw error.

pub mod node;
pub mod raster;
pub mod sink;
pub mod text;

pub use node::{Chrome, ImageElement, LoadState, NodeId, RenderNode};
pub use raster::{ImageRasterizer, RasterOptions, Rasterizer};
pub use sink::{DirectorySink, DownloadSink};

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Local, NaiveDate, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use crate::error::{BoothError, Result};

/// Default product name used in export filenames.
pub const DEFAULT_PRODUCT_NAME: &str = "vintage-photobooth";

/// Accepted JPEG quality range.
pub const QUALITY_MIN: f32 = 0.8;
pub const QUALITY_MAX: f32 = 1.0;

/// Quality of a copied collage; copies trade fidelity for size.
pub const COPY_QUALITY: f32 = QUALITY_MIN;

/// Hex digits of the content hash kept in content-addressed filenames.
const HASH_PREFIX_LEN: usize = 12;

/// How exported files are named.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilenameScheme {
    /// `<product>-<YYYY-MM-DD>.jpg`
    #[default]
    Dated,
    /// `<product>-<sha256 prefix>.jpg`
    ContentHash,
}

/// The `[export]` configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub quality: f32,
    pub width: u32,
    pub filename: FilenameScheme,
    /// Download directory; `None` means the platform download directory.
    pub output_dir: Option<PathBuf>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            quality: 0.95,
            width: 600,
            filename: FilenameScheme::Dated,
            output_dir: None,
        }
    }
}

impl ExportSettings {
    pub fn validate(&self) -> Result<()> {
        validate_quality(self.quality)?;
        if !(raster::MIN_CANVAS_WIDTH..=raster::MAX_CANVAS_EDGE).contains(&self.width) {
            return Err(BoothError::ConfigInvalid(format!(
                "export width {} must be between {} and {}",
                self.width,
                raster::MIN_CANVAS_WIDTH,
                raster::MAX_CANVAS_EDGE
            )));
        }
        Ok(())
    }

    pub const fn raster_options(&self) -> RasterOptions {
        RasterOptions {
            quality: self.quality,
            width: self.width,
        }
    }
}

pub fn validate_quality(quality: f32) -> Result<()> {
    if (QUALITY_MIN..=QUALITY_MAX).contains(&quality) {
        Ok(())
    } else {
        Err(BoothError::InvalidQuality { value: quality })
    }
}

/// Filename for an export made on `date`.
pub fn export_filename(product: &str, scheme: FilenameScheme, date: NaiveDate, bytes: &[u8]) -> String {
    match scheme {
        FilenameScheme::Dated => format!("{product}-{}.jpg", date.format("%Y-%m-%d")),
        FilenameScheme::ContentHash => {
            let digest = hex::encode(Sha256::digest(bytes));
            format!("{product}-{}.jpg", &digest[..HASH_PREFIX_LEN])
        }
    }
}

/// A completed export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRecord {
    pub filename: String,
    pub location: PathBuf,
    pub bytes: usize,
    pub sha256: String,
    pub created_at: DateTime<Local>,
}

/// A collage rendered for the clipboard rather than saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopiedCollage {
    pub mime: &'static str,
    #[serde(skip)]
    pub data: Vec<u8>,
    pub sha256: String,
}

/// User-visible outcome of a download request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Notice {
    Saved { filename: String, location: PathBuf },
    /// Nothing to export; the request was ignored.
    NoPhotos,
    /// An export of this collage is still running.
    Busy,
    Failed { message: String, retryable: bool },
}

impl Notice {
    pub const fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

/// Drives export of render nodes through a rasterizer into a download sink.
#[derive(Debug)]
pub struct ExportOrchestrator<R, S> {
    rasterizer: R,
    sink: S,
    product_name: String,
    settings: ExportSettings,
    last_export: Mutex<Option<ExportRecord>>,
}

impl<R: Rasterizer, S: DownloadSink> ExportOrchestrator<R, S> {
    pub fn new(
        rasterizer: R,
        sink: S,
        product_name: impl Into<String>,
        settings: ExportSettings,
    ) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            rasterizer,
            sink,
            product_name: product_name.into(),
            settings,
            last_export: Mutex::new(None),
        })
    }

    pub const fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    pub const fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Most recent successful export.
    pub fn last_export(&self) -> Option<ExportRecord> {
        self.last_export
            .lock()
            .map_or_else(|poisoned| poisoned.into_inner().clone(), |guard| guard.clone())
    }

    /// Render `node` once its images settle, holding the node's export guard.
    async fn render_exclusive(&self, node: &RenderNode, options: &RasterOptions) -> Result<Vec<u8>> {
        if node.is_empty() {
            debug!("Export requested with no photos");
            return Err(BoothError::NoPhotos);
        }
        let Some(_guard) = node.try_begin_export() else {
            debug!("Export already in progress");
            return Err(BoothError::ExportInProgress);
        };

        node.wait_for_images().await;
        debug!(elements = node.elements().len(), "All images settled");

        self.rasterizer
            .render(node, options)
            .await
            .map_err(|e| match e {
                BoothError::RasterizationFailed(_) => e,
                other => BoothError::RasterizationFailed(other.to_string()),
            })
    }

    /// Rasterize `node` and deliver it as a JPEG download.
    #[instrument(skip_all, fields(node = ?node.id()))]
    pub async fn export_collage(&self, node: &RenderNode) -> Result<ExportRecord> {
        let bytes = self
            .render_exclusive(node, &self.settings.raster_options())
            .await?;

        let now = Local::now();
        // Dated names use the UTC calendar day.
        let filename = export_filename(
            &self.product_name,
            self.settings.filename,
            Utc::now().date_naive(),
            &bytes,
        );
        let location = self.sink.deliver(&filename, &bytes)?;

        let record = ExportRecord {
            filename,
            location,
            bytes: bytes.len(),
            sha256: hex::encode(Sha256::digest(&bytes)),
            created_at: now,
        };
        info!(filename = %record.filename, bytes = record.bytes, "Export complete");
        match self.last_export.lock() {
            Ok(mut last) => *last = Some(record.clone()),
            Err(poisoned) => *poisoned.into_inner() = Some(record.clone()),
        }
        Ok(record)
    }

    /// Render `node` at [`COPY_QUALITY`] for the clipboard.
    ///
    /// Nothing is delivered to the sink and `last_export` is left alone.
    #[instrument(skip_all, fields(node = ?node.id()))]
    pub async fn copy_collage(&self, node: &RenderNode) -> Result<CopiedCollage> {
        let options = RasterOptions {
            quality: COPY_QUALITY,
            ..self.settings.raster_options()
        };
        let data = self.render_exclusive(node, &options).await?;
        info!(bytes = data.len(), "Collage copied");
        Ok(CopiedCollage {
            mime: "image/jpeg",
            sha256: hex::encode(Sha256::digest(&data)),
            data,
        })
    }

    /// Export `node` and report the outcome as a notice.
    pub async fn handle_download(&self, node: &RenderNode) -> Notice {
        match self.export_collage(node).await {
            Ok(record) => Notice::Saved {
                filename: record.filename,
                location: record.location,
            },
            Err(BoothError::NoPhotos) => Notice::NoPhotos,
            Err(BoothError::ExportInProgress) => Notice::Busy,
            Err(e) => {
                warn!(error = %e, "Export failed");
                Notice::Failed {
                    retryable: e.is_retryable(),
                    message: match e {
                        BoothError::RasterizationFailed(_) => {
                            "Failed to download collage. Please try again.".to_string()
                        }
                        other => other.to_string(),
                    },
                }
            }
        }
    }
}
