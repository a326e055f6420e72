//! Collage screen state: snapshots, style, and the memoized arrangement.

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::export::RenderNode;
use crate::layout::{Arrangement, ArrangementKey, compute_arrangement};
use crate::session::{SessionStore, Snapshot, read_handoff};
use crate::style::contrast::ContrastCheck;
use crate::style::registry::EMPTY_COLLAGE_TEXT;
use crate::style::{AspectRatio, BalanceMode, Filter, Font, Layout, Rgb, StyleState, TextSize};

/// A single user edit to the collage style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleEvent {
    Layout(Layout),
    Filter(Filter),
    AspectRatio(AspectRatio),
    Background(Rgb),
    TextColor(Rgb),
    Font(Font),
    TextSize(TextSize),
    PolaroidRotation(u8),
    MasonryGap(u8),
    Balance(BalanceMode),
    ShowDate(bool),
}

/// The collage screen.
///
/// Snapshots are read once on load and never change afterwards. Style edits go
/// through [`CollageView::apply`]; the arrangement is recomputed only when
/// an input that affects it changed.
#[derive(Debug)]
pub struct CollageView {
    snapshots: Vec<Snapshot>,
    style: StyleState,
    memo: Option<(ArrangementKey, Arrangement)>,
    recomputations: usize,
}

impl CollageView {
    pub fn new(snapshots: Vec<Snapshot>, style: StyleState) -> Self {
        Self {
            snapshots,
            style,
            memo: None,
            recomputations: 0,
        }
    }

    /// Load the handoff from `store`. A stored filter overrides the style's;
    /// without one the style's filter stands.
    pub fn load(store: &dyn SessionStore, mut style: StyleState) -> Self {
        let handoff = read_handoff(store);
        style.filter = handoff.filter_or(style.filter);
        info!(photos = handoff.photos.len(), "Collage loaded");
        Self::new(handoff.photos, style)
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub const fn style(&self) -> &StyleState {
        &self.style
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Text shown instead of the collage when there is nothing to arrange.
    pub fn placeholder(&self) -> Option<&'static str> {
        self.is_empty().then_some(EMPTY_COLLAGE_TEXT)
    }

    /// How many times the arrangement has actually been computed.
    pub const fn recomputations(&self) -> usize {
        self.recomputations
    }

    /// Apply a style edit. Color edits report their contrast outcome.
    pub fn apply(&mut self, event: StyleEvent) -> Option<ContrastCheck> {
        debug!(?event, "Style changed");
        let style = &mut self.style;
        match event {
            StyleEvent::Layout(layout) => style.layout = layout,
            StyleEvent::Filter(filter) => style.filter = filter,
            StyleEvent::AspectRatio(ratio) => style.aspect_ratio = ratio,
            StyleEvent::Background(color) => return Some(style.set_background(color)),
            StyleEvent::TextColor(color) => return Some(style.set_text_color(color)),
            StyleEvent::Font(font) => style.font = font,
            StyleEvent::TextSize(size) => style.text_size = size,
            StyleEvent::PolaroidRotation(degrees) => style.set_polaroid_rotation(degrees),
            StyleEvent::MasonryGap(units) => style.set_masonry_gap(units),
            StyleEvent::Balance(mode) => style.balance = mode,
            StyleEvent::ShowDate(show) => style.show_date = show,
        }
        None
    }

    /// Current arrangement, recomputed only when its inputs changed.
    pub fn arrangement(&mut self) -> &Arrangement {
        let key = ArrangementKey::new(&self.snapshots, &self.style);
        let entry = match self.memo.take() {
            Some(entry) if entry.0 == key => entry,
            _ => {
                self.recomputations += 1;
                let arrangement = compute_arrangement(&self.snapshots, &self.style);
                (key, arrangement)
            }
        };
        &self.memo.insert(entry).1
    }

    /// Mount the visual tree for export, dated today.
    pub fn render_node(&mut self) -> RenderNode {
        self.render_node_on(Local::now().date_naive())
    }

    /// Mount the visual tree for export with an explicit caption date.
    pub fn render_node_on(&mut self, today: NaiveDate) -> RenderNode {
        let arrangement = self.arrangement().clone();
        RenderNode::mount(&self.snapshots, arrangement, &self.style, today)
    }
}
