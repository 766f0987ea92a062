//! Directional neighbour search over laid-out regions.
//!
//! A candidate must lie entirely on the requested side of the current pane.
//! Candidates are ranked by `primary + 0.5 * perpendicular`, where `primary`
//! is the edge gap along the travel axis and `perpendicular` the distance
//! between centres across it. Scores are kept in integer quarter-cells so
//! equal scores compare exactly; ties go to the smallest id, which for panes
//! is the earliest created.

use ratatui::prelude::Rect;

use super::{NavDirection, RegionMap, doubled_center};

/// Best pane strictly in `direction` from `current`, or `None` at the edge.
pub fn find_neighbor<Id: Copy + Eq + Ord>(
    regions: &RegionMap<Id>,
    current: Id,
    direction: NavDirection,
) -> Option<Id> {
    let from = regions.get(current)?;
    best_by_score(regions, current, |rect| {
        let primary = edge_gap(from, rect, direction)?;
        Some(4 * primary + perpendicular_offset(from, rect, direction))
    })
}

/// Wraparound target: the pane farthest towards the opposite side whose span
/// across the travel axis overlaps `current`.
pub fn find_wrapped<Id: Copy + Eq + Ord>(
    regions: &RegionMap<Id>,
    current: Id,
    direction: NavDirection,
) -> Option<Id> {
    let from = regions.get(current)?;
    let bounds = regions.bounds()?;
    best_by_score(regions, current, |rect| {
        if !spans_overlap(from, rect, direction) {
            return None;
        }
        let primary = match direction {
            NavDirection::Right => rect.x as i64 - bounds.x as i64,
            NavDirection::Down => rect.y as i64 - bounds.y as i64,
            NavDirection::Left => bounds.right() as i64 - rect.right() as i64,
            NavDirection::Up => bounds.bottom() as i64 - rect.bottom() as i64,
        };
        Some(4 * primary + perpendicular_offset(from, rect, direction))
    })
}

fn best_by_score<Id, F>(regions: &RegionMap<Id>, current: Id, mut score: F) -> Option<Id>
where
    Id: Copy + Eq + Ord,
    F: FnMut(Rect) -> Option<i64>,
{
    let mut best: Option<(i64, Id)> = None;
    // RegionMap iterates in id order, so a strict `<` keeps the smallest id
    // on ties.
    for (id, rect) in regions.iter() {
        if id == current || rect.is_empty() {
            continue;
        }
        let Some(value) = score(rect) else {
            continue;
        };
        if best.is_none_or(|(best_score, _)| value < best_score) {
            best = Some((value, id));
        }
    }
    best.map(|(_, id)| id)
}

/// Gap between the facing edges, or `None` when `to` is not strictly on the
/// `direction` side of `from`.
fn edge_gap(from: Rect, to: Rect, direction: NavDirection) -> Option<i64> {
    let gap = match direction {
        NavDirection::Right => to.x as i64 - from.right() as i64,
        NavDirection::Left => from.x as i64 - to.right() as i64,
        NavDirection::Down => to.y as i64 - from.bottom() as i64,
        NavDirection::Up => from.y as i64 - to.bottom() as i64,
    };
    (gap >= 0).then_some(gap)
}

/// Perpendicular centre distance in doubled cells, which is the
/// `0.5 * distance` term expressed in quarter-cells.
fn perpendicular_offset(from: Rect, to: Rect, direction: NavDirection) -> i64 {
    let (fx, fy) = doubled_center(from);
    let (tx, ty) = doubled_center(to);
    match direction {
        NavDirection::Left | NavDirection::Right => (fy - ty).abs(),
        NavDirection::Up | NavDirection::Down => (fx - tx).abs(),
    }
}

fn spans_overlap(a: Rect, b: Rect, direction: NavDirection) -> bool {
    match direction {
        NavDirection::Left | NavDirection::Right => a.y < b.bottom() && b.y < a.bottom(),
        NavDirection::Up | NavDirection::Down => a.x < b.right() && b.x < a.right(),
    }
}
