//! Scattered polaroid prints.
//!
//! Tilt cycles left / none / right every three prints. The z-index counts
//! down from the snapshot count, so the first print sits on top.

use serde::Serialize;

use super::{Arrangement, Cell, FLOW_GAP_PX, Placement};
use crate::style::{Layout, StyleState};

/// Prints per row of the wrapped flow.
pub const PRINTS_PER_ROW: u32 = 2;

/// Horizontal nudge applied to a print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stagger {
    Left,
    Right,
}

impl Stagger {
    const fn for_index(index: usize) -> Self {
        if index % 2 == 0 { Self::Left } else { Self::Right }
    }

    /// Signed offset in pixels for a given nudge magnitude.
    pub const fn offset(self, magnitude: i32) -> i32 {
        match self {
            Self::Left => -magnitude,
            Self::Right => magnitude,
        }
    }
}

/// Tilt of the print at `index`: `((index mod 3) - 1) * degrees`.
pub const fn polaroid_rotation(index: usize, degrees: u8) -> i32 {
    ((index % 3) as i32 - 1) * degrees as i32
}

pub(super) fn arrange(count: usize, style: &StyleState) -> Arrangement {
    let degrees = style.polaroid_rotation();
    let cells = (0..count)
        .map(|i| {
            let placement = Placement::Flow {
                z_index: (count - i) as u32,
                stagger: Stagger::for_index(i),
            };
            let mut cell = Cell::new(i, placement, style);
            cell.rotation_deg = polaroid_rotation(i, degrees);
            cell
        })
        .collect();

    Arrangement {
        layout: Layout::Polaroid,
        columns: PRINTS_PER_ROW,
        gap: FLOW_GAP_PX * 2,
        cells,
    }
}
