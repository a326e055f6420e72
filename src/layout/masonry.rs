//! Masonry grid with a feature cell.
//!
//! Positions are resolved the way CSS grid auto-placement does it: each cell
//! in order takes the first free row-major slot where its span fits.

use tracing::trace;

use super::{Arrangement, Cell, GAP_UNIT_PX, Placement};
use crate::style::{Layout, StyleState};

/// Rows and columns spanned by the feature cell.
pub const FEATURE_SPAN: u32 = 2;

/// Column count for a snapshot count: 1 up to 2, 2 up to 4, else 3.
pub const fn masonry_columns(count: usize) -> u32 {
    match count {
        0..=2 => 1,
        3..=4 => 2,
        _ => 3,
    }
}

/// (row span, column span) of the cell at `index`.
fn spans(index: usize, count: usize, columns: u32) -> (u32, u32) {
    if index == 0 && count > 3 {
        (FEATURE_SPAN, FEATURE_SPAN.min(columns))
    } else if index % 5 == 3 {
        (2, 1)
    } else {
        (1, 1)
    }
}

/// Occupancy grid that grows downward as cells are placed.
struct Occupancy {
    columns: u32,
    rows: Vec<Vec<bool>>,
}

impl Occupancy {
    fn new(columns: u32) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    fn fits(&self, row: u32, column: u32, row_span: u32, column_span: u32) -> bool {
        if column + column_span > self.columns {
            return false;
        }
        (row..row + row_span).all(|r| {
            (column..column + column_span).all(|c| {
                self.rows
                    .get(r as usize)
                    .is_none_or(|cells| !cells[c as usize])
            })
        })
    }

    fn claim(&mut self, row: u32, column: u32, row_span: u32, column_span: u32) {
        let needed = (row + row_span) as usize;
        if self.rows.len() < needed {
            self.rows.resize_with(needed, || vec![false; self.columns as usize]);
        }
        for r in row..row + row_span {
            for c in column..column + column_span {
                self.rows[r as usize][c as usize] = true;
            }
        }
    }

    /// Place a span at the first row-major slot that is free, never before
    /// the previous cell's slot.
    fn place(&mut self, cursor: &mut (u32, u32), row_span: u32, column_span: u32) -> (u32, u32) {
        let (mut row, mut column) = *cursor;
        loop {
            if self.fits(row, column, row_span, column_span) {
                self.claim(row, column, row_span, column_span);
                *cursor = (row, column);
                return (row, column);
            }
            column += 1;
            if column >= self.columns {
                column = 0;
                row += 1;
            }
        }
    }
}

pub(super) fn arrange(count: usize, style: &StyleState) -> Arrangement {
    let columns = masonry_columns(count);
    let mut occupancy = Occupancy::new(columns);
    let mut cursor = (0, 0);

    let cells = (0..count)
        .map(|i| {
            let (row_span, column_span) = spans(i, count, columns);
            let (row, column) = occupancy.place(&mut cursor, row_span, column_span);
            trace!(index = i, row, column, row_span, column_span, "Placed masonry cell");
            let mut cell = Cell::new(
                i,
                Placement::Grid {
                    row,
                    column,
                    row_span,
                    column_span,
                },
                style,
            );
            cell.emphasized = i == 0 && count > 3;
            cell
        })
        .collect();

    Arrangement {
        layout: Layout::Masonry,
        columns,
        gap: u32::from(style.masonry_gap()) * GAP_UNIT_PX,
        cells,
    }
}
