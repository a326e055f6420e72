//! Render tree handed to the rasterizer.
//!
//! A [`RenderNode`] is the flattened visual tree of one collage: the
//! arrangement, the chrome (background, caption), and one [`ImageElement`]
//! per placed snapshot. Image elements start out pending and settle to
//! loaded or failed; the exporter must not rasterize until every element has
//! settled.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use image::DynamicImage;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::layout::Arrangement;
use crate::session::Snapshot;
use crate::style::registry::BRAND_CAPTION;
use crate::style::{AspectRatio, Filter, Font, Rgb, StyleState, TextSize};

/// Load progress of one image element.
#[derive(Debug, Clone)]
pub enum LoadState {
    Pending,
    Loaded(Arc<DynamicImage>),
    Failed(String),
}

impl LoadState {
    /// Loaded or failed; either way the element will not change again.
    pub const fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// One `<img>` of the collage.
#[derive(Debug)]
pub struct ImageElement {
    snapshot: usize,
    mime: String,
    data: Arc<[u8]>,
    state: watch::Sender<LoadState>,
}

impl ImageElement {
    fn new(snapshot: usize, source: &Snapshot) -> Self {
        let (state, _) = watch::channel(LoadState::Pending);
        Self {
            snapshot,
            mime: source.mime().to_string(),
            data: source.shared_data(),
            state,
        }
    }

    /// Index of the snapshot this element shows.
    pub const fn snapshot(&self) -> usize {
        self.snapshot
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_settled(&self) -> bool {
        self.state.borrow().is_settled()
    }

    /// Decoded image, if loading succeeded.
    pub fn image(&self) -> Option<Arc<DynamicImage>> {
        match &*self.state.borrow() {
            LoadState::Loaded(img) => Some(Arc::clone(img)),
            _ => None,
        }
    }

    /// Settle the element. Later calls overwrite earlier ones.
    pub fn complete(&self, state: LoadState) {
        trace!(snapshot = self.snapshot, settled = state.is_settled(), "Image element updated");
        self.state.send_replace(state);
    }

    /// Decode the encoded bytes and settle with the result.
    pub fn decode(&self) {
        let state = match image::load_from_memory(&self.data) {
            Ok(img) => LoadState::Loaded(Arc::new(img)),
            Err(e) => {
                warn!(snapshot = self.snapshot, error = %e, "Image failed to load");
                LoadState::Failed(e.to_string())
            }
        };
        self.complete(state);
    }

    /// Resolve once the element has loaded or failed.
    pub async fn settled(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(LoadState::is_settled).await;
    }
}

/// Caption area under the photos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chrome {
    pub background: Rgb,
    pub text_color: Rgb,
    pub font: Font,
    pub text_size: TextSize,
    pub caption: String,
    pub date: Option<NaiveDate>,
}

impl Chrome {
    pub fn from_style(style: &StyleState, today: NaiveDate) -> Self {
        Self {
            background: style.background(),
            text_color: style.text_color(),
            font: style.font,
            text_size: style.text_size,
            caption: BRAND_CAPTION.to_string(),
            date: style.show_date.then_some(today),
        }
    }
}

/// Identity of a render node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(Uuid);

/// Visual tree of one collage.
#[derive(Debug)]
pub struct RenderNode {
    id: NodeId,
    arrangement: Arrangement,
    filter: Filter,
    aspect_ratio: AspectRatio,
    chrome: Chrome,
    elements: Vec<ImageElement>,
    exporting: AtomicBool,
}

impl RenderNode {
    /// Mount a node for `arrangement`; every element starts pending.
    pub fn mount(
        snapshots: &[Snapshot],
        arrangement: Arrangement,
        style: &StyleState,
        today: NaiveDate,
    ) -> Self {
        let elements = arrangement
            .cells
            .iter()
            .filter_map(|cell| {
                snapshots
                    .get(cell.snapshot)
                    .map(|snap| ImageElement::new(cell.snapshot, snap))
            })
            .collect::<Vec<_>>();

        debug!(elements = elements.len(), layout = ?arrangement.layout, "Mounted render node");
        Self {
            id: NodeId(Uuid::new_v4()),
            arrangement,
            filter: style.filter,
            aspect_ratio: style.aspect_ratio,
            chrome: Chrome::from_style(style, today),
            elements,
            exporting: AtomicBool::new(false),
        }
    }

    pub const fn id(&self) -> NodeId {
        self.id
    }

    pub const fn arrangement(&self) -> &Arrangement {
        &self.arrangement
    }

    pub const fn filter(&self) -> Filter {
        self.filter
    }

    pub const fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub const fn chrome(&self) -> &Chrome {
        &self.chrome
    }

    pub fn elements(&self) -> &[ImageElement] {
        &self.elements
    }

    /// Element showing snapshot `index`.
    pub fn element_for(&self, snapshot: usize) -> Option<&ImageElement> {
        self.elements.iter().find(|e| e.snapshot == snapshot)
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Decode every element in place.
    pub fn decode_all(&self) {
        for element in &self.elements {
            element.decode();
        }
    }

    pub fn all_settled(&self) -> bool {
        self.elements.iter().all(ImageElement::is_settled)
    }

    /// Resolve once every element has loaded or failed.
    pub async fn wait_for_images(&self) {
        for element in &self.elements {
            element.settled().await;
        }
    }

    /// Mark the node as exporting; `None` if an export is already running.
    pub(crate) fn try_begin_export(&self) -> Option<ExportGuard<'_>> {
        self.exporting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ExportGuard { node: self })
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.load(Ordering::Acquire)
    }
}

/// Clears the node's exporting flag when the export ends, however it ends.
pub(crate) struct ExportGuard<'a> {
    node: &'a RenderNode,
}

impl Drop for ExportGuard<'_> {
    fn drop(&mut self) {
        self.node.exporting.store(false, Ordering::Release);
    }
}
