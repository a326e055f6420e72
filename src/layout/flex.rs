//! Flex-row layouts: a single horizontal strip, and a grid of rows.

use super::{Arrangement, Cell, FLOW_GAP_PX, Placement};
use crate::style::{BalanceMode, Layout, StyleState};

/// Dynamic horizontal weight of the cell at `index` in a strip of `count`.
pub fn dynamic_weight(index: usize, count: usize) -> f32 {
    const TWO: [f32; 2] = [3.0, 2.0];
    const THREE: [f32; 3] = [2.0, 1.0, 2.0];
    const FOUR: [f32; 4] = [2.0, 1.0, 1.0, 2.0];
    const FIVE: [f32; 5] = [2.0, 1.0, 1.5, 1.0, 2.0];

    match count {
        0 | 1 => 1.0,
        2 => TWO[index],
        3 => THREE[index],
        4 => FOUR[index],
        5 => FIVE[index],
        _ => match index % 3 {
            0 => 2.0,
            1 => 1.0,
            _ => 1.5,
        },
    }
}

pub(super) fn arrange_horizontal(count: usize, style: &StyleState) -> Arrangement {
    let cells = (0..count)
        .map(|i| {
            let weight = match style.balance {
                BalanceMode::Equal => 1.0,
                BalanceMode::Dynamic => dynamic_weight(i, count),
            };
            Cell::new(i, Placement::Flex { row: 0, weight }, style)
        })
        .collect();

    Arrangement {
        layout: Layout::Horizontal,
        columns: count as u32,
        gap: FLOW_GAP_PX,
        cells,
    }
}

/// Row groupings of snapshot indices for the grid layout.
///
/// Counts 1-6 use fixed groupings; larger counts alternate rows of three and
/// two, starting with three, with a partial final row.
pub fn grid_rows(count: usize) -> Vec<Vec<usize>> {
    let fixed: &[&[usize]] = match count {
        0 => &[],
        1 => &[&[0]],
        2 => &[&[0, 1]],
        3 => &[&[0], &[1, 2]],
        4 => &[&[0, 1], &[2, 3]],
        5 => &[&[0, 1], &[2, 3, 4]],
        6 => &[&[0, 1, 2], &[3, 4, 5]],
        _ => return alternating_rows(count),
    };
    fixed.iter().map(|row| row.to_vec()).collect()
}

fn alternating_rows(count: usize) -> Vec<Vec<usize>> {
    let mut rows = Vec::new();
    let mut next = 0;
    let mut wide = true;
    while next < count {
        let len = if wide { 3 } else { 2 };
        let end = (next + len).min(count);
        rows.push((next..end).collect());
        next = end;
        wide = !wide;
    }
    rows
}

pub(super) fn arrange_grid(count: usize, style: &StyleState) -> Arrangement {
    let rows = grid_rows(count);
    let columns = rows.iter().map(Vec::len).max().unwrap_or(1) as u32;

    let cells = rows
        .iter()
        .enumerate()
        .flat_map(|(row, members)| {
            let featured = members.len() < 3;
            members.iter().enumerate().map(move |(pos, &snapshot)| {
                let is_feature = featured && pos == 0;
                let weight = if is_feature { 2.0 } else { 1.0 };
                let mut cell = Cell::new(snapshot, Placement::Flex { row, weight }, style);
                cell.emphasized = is_feature;
                cell
            })
        })
        .collect();

    Arrangement {
        layout: Layout::Grid,
        columns,
        gap: FLOW_GAP_PX,
        cells,
    }
}
