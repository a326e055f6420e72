//! In-memory stand-ins for the export capabilities.
//!
//! `FakeRasterizer` counts calls and can be told to fail or to block until
//! released; `MemorySink` keeps deliveries in a vector instead of on disk.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::Notify;

use booth::error::{BoothError, Result};
use booth::export::{DownloadSink, RasterOptions, Rasterizer, RenderNode};

/// Bytes every successful fake render produces.
pub const FAKE_JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0xFF, 0xD9];

#[derive(Debug, Default)]
pub struct FakeRasterizer {
    calls: AtomicUsize,
    fail: AtomicBool,
    gate: Option<Arc<Notify>>,
    last_options: Mutex<Option<RasterOptions>>,
    settled_on_entry: Mutex<Vec<bool>>,
}

impl FakeRasterizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rasterizer that fails every render.
    #[must_use]
    pub fn failing() -> Self {
        let fake = Self::default();
        fake.set_failing(true);
        fake
    }

    /// Rasterizer whose renders wait for a notification on `gate`.
    #[must_use]
    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn last_options(&self) -> Option<RasterOptions> {
        *self.last_options.lock().unwrap()
    }

    /// For every render so far, whether all images had settled when it began.
    #[must_use]
    pub fn settled_on_entry(&self) -> Vec<bool> {
        self.settled_on_entry.lock().unwrap().clone()
    }
}

impl Rasterizer for FakeRasterizer {
    async fn render(&self, node: &RenderNode, options: &RasterOptions) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock().unwrap() = Some(*options);
        self.settled_on_entry.lock().unwrap().push(node.all_settled());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(BoothError::RasterizationFailed(
                "canvas is tainted".to_string(),
            ));
        }
        Ok(FAKE_JPEG.to_vec())
    }
}

/// Sink recording `(filename, bytes)` pairs.
#[derive(Debug, Default)]
pub struct MemorySink {
    deliveries: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn deliveries(&self) -> Vec<(String, Vec<u8>)> {
        self.deliveries.lock().unwrap().clone()
    }

    #[must_use]
    pub fn filenames(&self) -> Vec<String> {
        self.deliveries()
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }
}

impl DownloadSink for MemorySink {
    fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        self.deliveries
            .lock()
            .unwrap()
            .push((filename.to_string(), bytes.to_vec()));
        Ok(PathBuf::from("memory").join(filename))
    }
}

/// Sink whose disk is always full.
#[derive(Debug, Default)]
pub struct FullDiskSink;

impl DownloadSink for FullDiskSink {
    fn deliver(&self, filename: &str, _bytes: &[u8]) -> Result<PathBuf> {
        Err(BoothError::WriteFailed {
            path: format!("/media/card/{filename}"),
            source: std::io::Error::other("No space left on device"),
        })
    }
}
