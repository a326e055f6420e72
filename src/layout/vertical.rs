//! Vertical photo strip.

use super::{Arrangement, Cell, FLOW_GAP_PX, Placement};
use crate::style::{Layout, StyleState};

/// Strips of at least this many photos emphasize the first one.
pub const EMPHASIS_MIN_COUNT: usize = 3;

pub(super) fn arrange(count: usize, style: &StyleState) -> Arrangement {
    let cells = (0..count)
        .map(|i| {
            let mut cell = Cell::new(i, Placement::Stack { row: i }, style);
            cell.emphasized = i == 0 && count >= EMPHASIS_MIN_COUNT;
            cell
        })
        .collect();

    Arrangement {
        layout: Layout::Vertical,
        columns: 1,
        gap: FLOW_GAP_PX,
        cells,
    }
}
