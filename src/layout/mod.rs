//! Layout engine: turns snapshots plus style into a concrete arrangement.
//!
//! [`compute_arrangement`] is pure. The same snapshots and style always yield
//! the same [`Arrangement`], so callers may memoize on [`ArrangementKey`].
//! Every layout places every snapshot exactly once, in snapshot order. An
//! empty snapshot list yields an empty arrangement; rendering the "no photos"
//! placeholder is the caller's job.

mod flex;
mod masonry;
mod polaroid;
mod vertical;

pub use flex::{dynamic_weight, grid_rows};
pub use masonry::{FEATURE_SPAN, masonry_columns};
pub use polaroid::{Stagger, polaroid_rotation};

use serde::Serialize;
use tracing::trace;

use crate::session::{Snapshot, SnapshotId};
use crate::style::{AspectRatio, BalanceMode, Filter, Layout, StyleAxis, StyleState};

/// Pixels per masonry gap unit.
pub const GAP_UNIT_PX: u32 = 4;

/// Gap between vertical, grid and horizontal cells, in pixels.
pub const FLOW_GAP_PX: u32 = 8;

/// Where a cell sits, in the vocabulary of its layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    /// Full-width row in a vertical stack.
    Stack { row: usize },
    /// Item in a wrapped flow of tilted prints.
    Flow { z_index: u32, stagger: Stagger },
    /// CSS-grid style cell with explicit position and spans.
    Grid {
        row: u32,
        column: u32,
        row_span: u32,
        column_span: u32,
    },
    /// Flex item in a row; wider cells have larger weights.
    Flex { row: usize, weight: f32 },
}

/// Placement descriptor of one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    /// Index into the snapshot list.
    pub snapshot: usize,
    pub placement: Placement,
    /// Tilt in degrees; non-zero only for polaroid.
    pub rotation_deg: i32,
    /// Visually emphasized (feature) cell.
    pub emphasized: bool,
    pub filter_class: &'static str,
    pub aspect_class: &'static str,
}

impl Cell {
    fn new(snapshot: usize, placement: Placement, style: &StyleState) -> Self {
        Self {
            snapshot,
            placement,
            rotation_deg: 0,
            emphasized: false,
            filter_class: style.filter.css_class(),
            aspect_class: style.aspect_ratio.css_class(),
        }
    }

    /// Row span, 1 for layouts without explicit spans.
    pub const fn row_span(&self) -> u32 {
        match self.placement {
            Placement::Grid { row_span, .. } => row_span,
            _ => 1,
        }
    }

    /// Column span, 1 for layouts without explicit spans.
    pub const fn column_span(&self) -> u32 {
        match self.placement {
            Placement::Grid { column_span, .. } => column_span,
            _ => 1,
        }
    }
}

/// Complete ordered placement of all snapshots for one layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Arrangement {
    pub layout: Layout,
    /// Grid columns (masonry), cells per row (polaroid), or 1.
    pub columns: u32,
    /// Gap between cells in pixels.
    pub gap: u32,
    pub cells: Vec<Cell>,
}

impl Arrangement {
    fn empty(layout: Layout) -> Self {
        Self {
            layout,
            columns: 1,
            gap: 0,
            cells: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Number of rows occupied, accounting for spans.
    pub fn row_count(&self) -> usize {
        if self.layout == Layout::Polaroid {
            return self.cells.len().div_ceil(self.columns.max(1) as usize);
        }
        self.cells
            .iter()
            .map(|cell| match cell.placement {
                Placement::Stack { row } | Placement::Flex { row, .. } => row + 1,
                Placement::Grid { row, row_span, .. } => (row + row_span) as usize,
                Placement::Flow { .. } => 0,
            })
            .max()
            .unwrap_or(0)
    }

    /// Cells grouped by flex row, for the horizontal and grid layouts.
    pub fn flex_rows(&self) -> Vec<Vec<&Cell>> {
        let mut rows: Vec<Vec<&Cell>> = Vec::new();
        for cell in &self.cells {
            if let Placement::Flex { row, .. } = cell.placement {
                if rows.len() <= row {
                    rows.resize_with(row + 1, Vec::new);
                }
                rows[row].push(cell);
            }
        }
        rows
    }
}

/// Inputs that fully determine an arrangement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrangementKey {
    pub snapshots: Vec<SnapshotId>,
    pub layout: Layout,
    pub filter: Filter,
    pub aspect_ratio: AspectRatio,
    pub masonry_gap: u8,
    pub polaroid_rotation: u8,
    pub balance: BalanceMode,
}

impl ArrangementKey {
    pub fn new(snapshots: &[Snapshot], style: &StyleState) -> Self {
        Self {
            snapshots: snapshots.iter().map(Snapshot::id).collect(),
            layout: style.layout,
            filter: style.filter,
            aspect_ratio: style.aspect_ratio,
            masonry_gap: style.masonry_gap(),
            polaroid_rotation: style.polaroid_rotation(),
            balance: style.balance,
        }
    }
}

/// Compute the arrangement for `snapshots` under `style`.
pub fn compute_arrangement(snapshots: &[Snapshot], style: &StyleState) -> Arrangement {
    arrange(snapshots.len(), style)
}

/// Compute an arrangement from a snapshot count alone.
///
/// Layout rules depend only on how many snapshots there are, never on their
/// content.
pub fn arrange(count: usize, style: &StyleState) -> Arrangement {
    if count == 0 {
        return Arrangement::empty(style.layout);
    }

    let arrangement = match style.layout {
        Layout::Vertical => vertical::arrange(count, style),
        Layout::Polaroid => polaroid::arrange(count, style),
        Layout::Masonry => masonry::arrange(count, style),
        Layout::Horizontal => flex::arrange_horizontal(count, style),
        Layout::Grid => flex::arrange_grid(count, style),
    };

    trace!(
        layout = style.layout.id(),
        count,
        columns = arrangement.columns,
        "Computed arrangement"
    );
    debug_assert_eq!(arrangement.cells.len(), count);
    arrangement
}
