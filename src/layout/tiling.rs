use std::collections::BTreeMap;

use ratatui::prelude::{Direction, Rect};

use super::{LayoutMode, NavDirection, PaneWeights, RegionMap};
use crate::constants::{DEFAULT_MASTER_RATIO, MASTER_RATIO_MAX, MASTER_RATIO_MIN, MIN_PANE_SIZE};

/// Slack added before flooring a split edge so weights that round-trip
/// through `f32` do not lose a cell.
const EDGE_EPSILON: f64 = 1e-3;

/// What a split's weights are written back to after a manual resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitRole {
    /// Children are panes; weights map to each pane's own axis weight.
    Panes,
    /// Children are grid rows; weights map to every pane in the row.
    Rows,
    /// Master on one side, the stack on the other; weights map to the ratio.
    Master,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutNode<Id: Copy + Eq + Ord> {
    Leaf(Id),
    Split {
        direction: Direction,
        role: SplitRole,
        children: Vec<LayoutNode<Id>>,
        weights: Vec<f32>,
    },
}

impl<Id: Copy + Eq + Ord> LayoutNode<Id> {
    pub fn leaf(id: Id) -> Self {
        Self::Leaf(id)
    }

    pub fn split(
        direction: Direction,
        role: SplitRole,
        children: Vec<LayoutNode<Id>>,
        weights: Vec<f32>,
    ) -> Self {
        Self::Split {
            direction,
            role,
            children,
            weights,
        }
    }

    pub fn unwrap_leaf(&self) -> Option<Id> {
        match self {
            LayoutNode::Leaf(id) => Some(*id),
            _ => None,
        }
    }

    pub fn leaves(&self) -> Vec<Id> {
        fn walk<Id: Copy + Eq + Ord>(node: &LayoutNode<Id>, out: &mut Vec<Id>) {
            match node {
                LayoutNode::Leaf(id) => out.push(*id),
                LayoutNode::Split { children, .. } => {
                    for child in children {
                        walk(child, out);
                    }
                }
            }
        }
        let mut out = Vec::new();
        walk(self, &mut out);
        out
    }

    /// Rectangles for every leaf. No child of a split gets fewer than
    /// `min_size` cells along the split axis unless the area is too small to
    /// hold them all, in which case the cells are shared evenly.
    pub fn layout(&self, area: Rect, min_size: u16) -> Vec<(Id, Rect)> {
        let mut regions = Vec::new();
        self.layout_recursive(area, min_size, &mut regions);
        regions
    }

    /// Child indices leading from this node to the leaf holding `id`.
    pub fn path_to(&self, id: Id) -> Option<Vec<usize>> {
        match self {
            LayoutNode::Leaf(leaf) => (*leaf == id).then(Vec::new),
            LayoutNode::Split { children, .. } => {
                children.iter().enumerate().find_map(|(idx, child)| {
                    child.path_to(id).map(|mut rest| {
                        rest.insert(0, idx);
                        rest
                    })
                })
            }
        }
    }

    pub fn node_at_path(&self, path: &[usize]) -> Option<&LayoutNode<Id>> {
        let mut current = self;
        for &idx in path {
            let LayoutNode::Split { children, .. } = current else {
                return None;
            };
            current = children.get(idx)?;
        }
        Some(current)
    }

    /// Move the boundary after child `index` of the split at `path` by
    /// `delta` cells, keeping both neighbours at least `min_size` wide.
    ///
    /// The split's weights are replaced by the resulting cell sizes.
    pub fn apply_drag(
        &mut self,
        area: Rect,
        path: &[usize],
        index: usize,
        delta: i16,
        min_size: u16,
    ) -> bool {
        let Some(split_area) = split_area_for_path(self, area, path, min_size) else {
            return false;
        };
        let Some(LayoutNode::Split {
            direction,
            children,
            weights,
            ..
        }) = split_at_path_mut(self, path)
        else {
            return false;
        };
        if children.len() < 2 || index + 1 >= children.len() {
            return false;
        }
        let total = axis_len(*direction, split_area);
        let mut sizes = split_sizes(total, weights, children.len(), min_size)
            .into_iter()
            .map(i32::from)
            .collect::<Vec<_>>();
        let pair = sizes[index] + sizes[index + 1];
        if pair == 0 {
            return false;
        }
        let min = i32::from(min_size).min(pair / 2);
        let first = (sizes[index] + i32::from(delta)).clamp(min, pair - min);
        sizes[index] = first;
        sizes[index + 1] = pair - first;
        *weights = sizes.iter().map(|v| (*v).max(1) as f32).collect();
        true
    }

    fn layout_recursive(&self, area: Rect, min_size: u16, regions: &mut Vec<(Id, Rect)>) {
        match self {
            LayoutNode::Leaf(id) => regions.push((*id, area)),
            LayoutNode::Split {
                direction,
                children,
                weights,
                ..
            } => {
                let rects =
                    split_rects_weighted(*direction, area, weights, children.len(), min_size);
                for (child, rect) in children.iter().zip(rects) {
                    child.layout_recursive(rect, min_size, regions);
                }
            }
        }
    }
}

/// Pure geometry for the tiled canvas.
///
/// The engine holds no pane objects, only the per-pane weights left behind by
/// manual resizes and the master ratio. Every call to [`relayout`] derives a
/// fresh split tree from the ordered pane list, so the result only depends on
/// the inputs and the stored weights.
///
/// [`relayout`]: TilingLayoutEngine::relayout
#[derive(Debug, Clone)]
pub struct TilingLayoutEngine<Id: Copy + Eq + Ord> {
    weights: BTreeMap<Id, PaneWeights>,
    master_ratio: f32,
    min_pane_size: u16,
}

impl<Id: Copy + Eq + Ord> Default for TilingLayoutEngine<Id> {
    fn default() -> Self {
        Self::new(DEFAULT_MASTER_RATIO, MIN_PANE_SIZE)
    }
}

impl<Id: Copy + Eq + Ord> TilingLayoutEngine<Id> {
    pub fn new(master_ratio: f32, min_pane_size: u16) -> Self {
        Self {
            weights: BTreeMap::new(),
            master_ratio: clamp_ratio(master_ratio),
            min_pane_size,
        }
    }

    pub fn master_ratio(&self) -> f32 {
        self.master_ratio
    }

    pub fn set_master_ratio(&mut self, ratio: f32) {
        self.master_ratio = clamp_ratio(ratio);
    }

    pub fn min_pane_size(&self) -> u16 {
        self.min_pane_size
    }

    pub fn weights_of(&self, id: Id) -> PaneWeights {
        self.weights.get(&id).copied().unwrap_or_default()
    }

    pub fn set_weights(&mut self, id: Id, weights: PaneWeights) {
        if weights.is_default() {
            self.weights.remove(&id);
        } else {
            self.weights.insert(id, weights);
        }
    }

    /// Drop everything remembered about a pane that is going away.
    pub fn forget(&mut self, id: Id) {
        self.weights.remove(&id);
    }

    pub fn reset(&mut self) {
        self.weights.clear();
    }

    /// The concrete mode used for `count` panes on `canvas`.
    ///
    /// `Auto` picks fullscreen for one pane and, for two panes, whichever of
    /// side-by-side or stacked yields slots closer to square. That works out
    /// to side-by-side exactly when the canvas is at least as wide as it is
    /// tall. Three panes get master/stack and four or more a grid.
    pub fn resolve_mode(mode: LayoutMode, count: usize, canvas: Rect) -> LayoutMode {
        match mode {
            LayoutMode::Auto => match count {
                0..=2 if canvas.width >= canvas.height => LayoutMode::Wide,
                0..=2 => LayoutMode::Tall,
                3 => LayoutMode::MasterStack,
                _ => LayoutMode::Grid,
            },
            other => other,
        }
    }

    pub fn plan(&self, panes: &[Id], mode: LayoutMode, canvas: Rect) -> Option<LayoutNode<Id>> {
        match panes {
            [] => None,
            [only] => Some(LayoutNode::leaf(*only)),
            _ => Some(match Self::resolve_mode(mode, panes.len(), canvas) {
                LayoutMode::Grid => self.grid(panes),
                LayoutMode::MasterStack => self.master_stack(panes, canvas),
                LayoutMode::Tall => self.line(panes, Direction::Vertical),
                LayoutMode::Wide | LayoutMode::Auto => self.line(panes, Direction::Horizontal),
            }),
        }
    }

    /// Assign every pane a rectangle. The rectangles tile `canvas` exactly.
    pub fn relayout(&self, panes: &[Id], mode: LayoutMode, canvas: Rect) -> RegionMap<Id> {
        let mut regions = RegionMap::default();
        if let Some(root) = self.plan(panes, mode, canvas) {
            for (id, rect) in root.layout(canvas, self.min_pane_size) {
                regions.set(id, rect);
            }
        }
        regions
    }

    /// Drag the boundary on `edge` of `pane` by `delta` cells (positive grows
    /// the pane). Returns false when that edge touches the canvas border.
    pub fn resize(
        &mut self,
        panes: &[Id],
        mode: LayoutMode,
        canvas: Rect,
        pane: Id,
        edge: NavDirection,
        delta: i16,
    ) -> bool {
        let Some(mut root) = self.plan(panes, mode, canvas) else {
            return false;
        };
        let Some(path) = root.path_to(pane) else {
            return false;
        };
        let axis = edge.axis();
        for depth in (0..path.len()).rev() {
            let parent = &path[..depth];
            let child = path[depth];
            let Some(LayoutNode::Split {
                direction,
                children,
                ..
            }) = root.node_at_path(parent)
            else {
                continue;
            };
            if *direction != axis {
                continue;
            }
            let (boundary, signed) = if edge.is_forward() {
                if child + 1 >= children.len() {
                    continue;
                }
                (child, delta)
            } else {
                if child == 0 {
                    continue;
                }
                (child - 1, delta.saturating_neg())
            };
            if !root.apply_drag(canvas, parent, boundary, signed, self.min_pane_size) {
                return false;
            }
            self.write_back(&root, parent);
            return true;
        }
        false
    }

    pub fn find_neighbor(
        &self,
        regions: &RegionMap<Id>,
        current: Id,
        direction: NavDirection,
    ) -> Option<Id> {
        super::find_neighbor(regions, current, direction)
    }

    fn write_back(&mut self, root: &LayoutNode<Id>, path: &[usize]) {
        let Some(LayoutNode::Split {
            direction,
            role,
            children,
            weights,
        }) = root.node_at_path(path)
        else {
            return;
        };
        let sum: f32 = weights.iter().sum();
        if sum <= 0.0 || weights.is_empty() {
            return;
        }
        match role {
            SplitRole::Master => self.master_ratio = clamp_ratio(weights[0] / sum),
            SplitRole::Panes | SplitRole::Rows => {
                // Normalize to a mean of 1.0 so newly opened panes (weight
                // 1.0) get an average share.
                let count = weights.len() as f32;
                for (child, weight) in children.iter().zip(weights) {
                    let normalized = weight * count / sum;
                    for id in child.leaves() {
                        self.weights
                            .entry(id)
                            .or_default()
                            .set_along(*direction, normalized);
                    }
                }
            }
        }
    }

    fn line(&self, panes: &[Id], direction: Direction) -> LayoutNode<Id> {
        LayoutNode::split(
            direction,
            SplitRole::Panes,
            panes.iter().copied().map(LayoutNode::leaf).collect(),
            panes
                .iter()
                .map(|id| self.weights_of(*id).along(direction))
                .collect(),
        )
    }

    /// Rows of `ceil(sqrt(n))` columns. A short last row stretches its panes
    /// across the full width instead of leaving empty cells, so three panes
    /// are two on top and one full-width pane below.
    fn grid(&self, panes: &[Id]) -> LayoutNode<Id> {
        let cols = ceil_sqrt(panes.len());
        let mut rows: Vec<LayoutNode<Id>> = Vec::new();
        let mut row_weights = Vec::new();
        for chunk in panes.chunks(cols) {
            let row = match chunk {
                [only] => LayoutNode::leaf(*only),
                _ => self.line(chunk, Direction::Horizontal),
            };
            let mean = chunk
                .iter()
                .map(|id| self.weights_of(*id).vertical)
                .sum::<f32>()
                / chunk.len() as f32;
            rows.push(row);
            row_weights.push(mean);
        }
        if rows.len() == 1 {
            return rows.remove(0);
        }
        LayoutNode::split(Direction::Vertical, SplitRole::Rows, rows, row_weights)
    }

    fn master_stack(&self, panes: &[Id], canvas: Rect) -> LayoutNode<Id> {
        let (outer, inner) = if canvas.width >= canvas.height {
            (Direction::Horizontal, Direction::Vertical)
        } else {
            (Direction::Vertical, Direction::Horizontal)
        };
        let master = LayoutNode::leaf(panes[0]);
        let stack = match &panes[1..] {
            [only] => LayoutNode::leaf(*only),
            rest => self.line(rest, inner),
        };
        LayoutNode::split(
            outer,
            SplitRole::Master,
            vec![master, stack],
            vec![self.master_ratio, 1.0 - self.master_ratio],
        )
    }
}

fn clamp_ratio(ratio: f32) -> f32 {
    if ratio.is_finite() {
        ratio.clamp(MASTER_RATIO_MIN, MASTER_RATIO_MAX)
    } else {
        DEFAULT_MASTER_RATIO
    }
}

fn ceil_sqrt(n: usize) -> usize {
    let mut root = 1;
    while root * root < n {
        root += 1;
    }
    root
}

fn axis_len(direction: Direction, area: Rect) -> u16 {
    match direction {
        Direction::Horizontal => area.width,
        Direction::Vertical => area.height,
    }
}

/// Cell sizes for `count` children sharing `total` cells by weight.
///
/// Edges are placed at the floor of the cumulative share and the last edge
/// is pinned to `total`, so the sizes always sum to `total`. When the shares
/// would leave a child under `min(min_size, total / count)` cells, every
/// child gets that floor first and only the rest is shared by weight.
fn split_sizes(total: u16, weights: &[f32], count: usize, min_size: u16) -> Vec<u16> {
    if count == 0 {
        return Vec::new();
    }
    let sizes = weighted_sizes(total, weights, count);
    let Ok(children) = u16::try_from(count) else {
        return sizes;
    };
    let floor = min_size.max(1).min(total / children);
    if sizes.iter().all(|size| *size >= floor) {
        return sizes;
    }
    weighted_sizes(total - floor * children, weights, count)
        .into_iter()
        .map(|size| size + floor)
        .collect()
}

fn weighted_sizes(total: u16, weights: &[f32], count: usize) -> Vec<u16> {
    let usable = weights.len() == count
        && weights.iter().all(|w| w.is_finite() && *w >= 0.0)
        && weights.iter().any(|w| *w > 0.0);
    let weights: Vec<f64> = if usable {
        weights.iter().map(|w| f64::from(*w)).collect()
    } else {
        vec![1.0; count]
    };
    let sum: f64 = weights.iter().sum();
    let mut sizes = Vec::with_capacity(count);
    let mut cumulative = 0.0;
    let mut prev_edge: u16 = 0;
    for (idx, weight) in weights.iter().enumerate() {
        cumulative += weight;
        let edge = if idx + 1 == count {
            total
        } else {
            let raw = (cumulative / sum) * f64::from(total) + EDGE_EPSILON;
            (raw.floor().min(f64::from(total))) as u16
        };
        let edge = edge.max(prev_edge);
        sizes.push(edge - prev_edge);
        prev_edge = edge;
    }
    sizes
}

fn split_rects_weighted(
    direction: Direction,
    area: Rect,
    weights: &[f32],
    child_count: usize,
    min_size: u16,
) -> Vec<Rect> {
    let sizes = split_sizes(axis_len(direction, area), weights, child_count, min_size);
    build_rects_from_sizes(direction, area, &sizes)
}

fn build_rects_from_sizes(direction: Direction, area: Rect, sizes: &[u16]) -> Vec<Rect> {
    let mut rects = Vec::with_capacity(sizes.len());
    let mut cursor_x = area.x;
    let mut cursor_y = area.y;
    for size in sizes {
        let rect = match direction {
            Direction::Horizontal => {
                let rect = Rect {
                    x: cursor_x,
                    y: area.y,
                    width: *size,
                    height: area.height,
                };
                cursor_x = cursor_x.saturating_add(*size);
                rect
            }
            Direction::Vertical => {
                let rect = Rect {
                    x: area.x,
                    y: cursor_y,
                    width: area.width,
                    height: *size,
                };
                cursor_y = cursor_y.saturating_add(*size);
                rect
            }
        };
        rects.push(rect);
    }
    rects
}

fn split_area_for_path<Id: Copy + Eq + Ord>(
    node: &LayoutNode<Id>,
    area: Rect,
    path: &[usize],
    min_size: u16,
) -> Option<Rect> {
    let mut area = area;
    let mut current = node;
    for &idx in path {
        let LayoutNode::Split {
            direction,
            children,
            weights,
            ..
        } = current
        else {
            return None;
        };
        let rects = split_rects_weighted(*direction, area, weights, children.len(), min_size);
        area = *rects.get(idx)?;
        current = children.get(idx)?;
    }
    Some(area)
}

fn split_at_path_mut<'a, Id: Copy + Eq + Ord>(
    node: &'a mut LayoutNode<Id>,
    path: &[usize],
) -> Option<&'a mut LayoutNode<Id>> {
    let mut current = node;
    for &idx in path {
        let LayoutNode::Split { children, .. } = current else {
            return None;
        };
        current = children.get_mut(idx)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{rect_area, rects_overlap};
    use ratatui::prelude::{Direction, Rect};

    fn assert_tiles(regions: &RegionMap<usize>, canvas: Rect, label: &str) {
        let rects: Vec<Rect> = regions.iter().map(|(_, r)| r).collect();
        let total: u64 = rects.iter().map(|r| rect_area(*r)).sum();
        assert_eq!(total, rect_area(canvas), "{label}: area mismatch");
        for (i, a) in rects.iter().enumerate() {
            assert_eq!(a.intersection(canvas), *a, "{label}: {a:?} leaves canvas");
            for b in rects.iter().skip(i + 1) {
                assert!(!rects_overlap(*a, *b), "{label}: {a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn build_rects_from_sizes_horizontal() {
        let area = Rect {
            x: 0,
            y: 0,
            width: 10,
            height: 3,
        };
        let rects = build_rects_from_sizes(Direction::Horizontal, area, &[3, 7]);
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[0].width, 3);
        assert_eq!(rects[1].width, 7);
        assert_eq!(rects[1].x, 3);
    }

    #[test]
    fn split_sizes_floor_and_remainder() {
        // floor((1/2)*11) = 5, last child takes the rest
        assert_eq!(split_sizes(11, &[1.0, 1.0], 2, 4), vec![5, 6]);
        assert_eq!(split_sizes(10, &[1.0, 1.0, 1.0], 3, 4), vec![3, 3, 4]);
        // mismatched or degenerate weights fall back to equal shares
        assert_eq!(split_sizes(9, &[0.0, 0.0, 0.0], 3, 4), vec![3, 3, 3]);
        assert_eq!(split_sizes(9, &[1.0], 3, 4), vec![3, 3, 3]);
        assert_eq!(split_sizes(2, &[1.0, 1.0, 1.0, 1.0], 4, 4).iter().sum::<u16>(), 2);
    }

    #[test]
    fn split_sizes_keep_the_minimum_on_small_totals() {
        // shares of 7, 0 and 5 would hide the middle child
        assert_eq!(split_sizes(12, &[62.0, 4.0, 34.0], 3, 4), vec![4, 4, 4]);
        // 20 - 3 * 4 = 8 left over, shared 62:4:34
        assert_eq!(split_sizes(20, &[62.0, 4.0, 34.0], 3, 4), vec![8, 5, 7]);
        // too small for the minimum: the floor drops to one cell each
        assert_eq!(split_sizes(5, &[98.0, 1.0, 1.0], 3, 4), vec![2, 1, 2]);
    }

    #[test]
    fn every_mode_tiles_the_canvas() {
        let engine = TilingLayoutEngine::<usize>::default();
        let canvases = [
            Rect::new(0, 0, 120, 40),
            Rect::new(3, 2, 37, 91),
            Rect::new(0, 0, 7, 5),
            Rect::new(10, 10, 1, 1),
        ];
        for canvas in canvases {
            for mode in LayoutMode::ALL {
                for n in 1..=9usize {
                    let panes: Vec<usize> = (0..n).collect();
                    let regions = engine.relayout(&panes, mode, canvas);
                    assert_eq!(regions.len(), n);
                    assert_tiles(&regions, canvas, &format!("{mode} n={n} {canvas:?}"));
                }
            }
        }
    }

    #[test]
    fn single_pane_is_fullscreen() {
        let engine = TilingLayoutEngine::<usize>::default();
        let canvas = Rect::new(0, 0, 80, 24);
        for mode in LayoutMode::ALL {
            let regions = engine.relayout(&[7], mode, canvas);
            assert_eq!(regions.get(7), Some(canvas));
        }
    }

    #[test]
    fn grid_of_three_spans_last_row() {
        let engine = TilingLayoutEngine::<usize>::default();
        let canvas = Rect::new(0, 0, 100, 40);
        let regions = engine.relayout(&[1, 2, 3], LayoutMode::Grid, canvas);
        assert_eq!(regions.get(1), Some(Rect::new(0, 0, 50, 20)));
        assert_eq!(regions.get(2), Some(Rect::new(50, 0, 50, 20)));
        assert_eq!(regions.get(3), Some(Rect::new(0, 20, 100, 20)));
    }

    #[test]
    fn master_stack_gives_master_its_ratio() {
        let engine = TilingLayoutEngine::<usize>::new(0.6, MIN_PANE_SIZE);
        let canvas = Rect::new(0, 0, 100, 30);
        let regions = engine.relayout(&[1, 2, 3], LayoutMode::MasterStack, canvas);
        assert_eq!(regions.get(1), Some(Rect::new(0, 0, 60, 30)));
        assert_eq!(regions.get(2), Some(Rect::new(60, 0, 40, 15)));
        assert_eq!(regions.get(3), Some(Rect::new(60, 15, 40, 15)));

        // portrait canvas puts the master on top
        let tall = Rect::new(0, 0, 30, 100);
        let regions = engine.relayout(&[1, 2, 3], LayoutMode::MasterStack, tall);
        assert_eq!(regions.get(1), Some(Rect::new(0, 0, 30, 60)));
        assert_eq!(regions.get(2).map(|r| r.y), Some(60));
    }

    #[test]
    fn auto_mode_resolution() {
        let landscape = Rect::new(0, 0, 120, 40);
        let portrait = Rect::new(0, 0, 40, 120);
        type E = TilingLayoutEngine<usize>;
        assert_eq!(E::resolve_mode(LayoutMode::Auto, 2, landscape), LayoutMode::Wide);
        assert_eq!(E::resolve_mode(LayoutMode::Auto, 2, portrait), LayoutMode::Tall);
        assert_eq!(E::resolve_mode(LayoutMode::Auto, 3, landscape), LayoutMode::MasterStack);
        assert_eq!(E::resolve_mode(LayoutMode::Auto, 6, portrait), LayoutMode::Grid);
        assert_eq!(E::resolve_mode(LayoutMode::Tall, 6, landscape), LayoutMode::Tall);
    }

    #[test]
    fn path_to_and_leaves() {
        let engine = TilingLayoutEngine::<usize>::default();
        let root = engine
            .plan(&[1, 2, 3], LayoutMode::Grid, Rect::new(0, 0, 10, 10))
            .expect("plan");
        assert_eq!(root.leaves(), vec![1, 2, 3]);
        assert_eq!(root.path_to(2), Some(vec![0, 1]));
        assert_eq!(root.path_to(3), Some(vec![1]));
        assert_eq!(root.path_to(9), None);
        assert_eq!(root.node_at_path(&[1]).and_then(|n| n.unwrap_leaf()), Some(3));
    }

    #[test]
    fn resize_moves_shared_boundary_and_clamps() {
        let mut engine = TilingLayoutEngine::<usize>::new(0.6, 4);
        let canvas = Rect::new(0, 0, 40, 10);
        let panes = [1, 2];
        assert!(engine.resize(&panes, LayoutMode::Wide, canvas, 1, NavDirection::Right, 6));
        let regions = engine.relayout(&panes, LayoutMode::Wide, canvas);
        assert_eq!(regions.get(1).map(|r| r.width), Some(26));
        assert_eq!(regions.get(2).map(|r| r.width), Some(14));

        // dragging the left edge of pane 2 outward grows it back
        assert!(engine.resize(&panes, LayoutMode::Wide, canvas, 2, NavDirection::Left, 4));
        let regions = engine.relayout(&panes, LayoutMode::Wide, canvas);
        assert_eq!(regions.get(2).map(|r| r.width), Some(18));

        // clamped to the minimum size
        assert!(engine.resize(&panes, LayoutMode::Wide, canvas, 1, NavDirection::Right, 500));
        let regions = engine.relayout(&panes, LayoutMode::Wide, canvas);
        assert_eq!(regions.get(2).map(|r| r.width), Some(4));
        assert_tiles(&regions, canvas, "clamped");
    }

    #[test]
    fn resize_on_outer_edge_is_rejected() {
        let mut engine = TilingLayoutEngine::<usize>::default();
        let canvas = Rect::new(0, 0, 40, 10);
        assert!(!engine.resize(&[1, 2], LayoutMode::Wide, canvas, 1, NavDirection::Left, 3));
        assert!(!engine.resize(&[1, 2], LayoutMode::Wide, canvas, 2, NavDirection::Right, 3));
        assert!(!engine.resize(&[1, 2], LayoutMode::Wide, canvas, 1, NavDirection::Up, 3));
        assert!(!engine.resize(&[1], LayoutMode::Wide, canvas, 1, NavDirection::Right, 3));
    }

    #[test]
    fn resize_weights_stay_proportional_after_canvas_change() {
        let mut engine = TilingLayoutEngine::<usize>::default();
        let small = Rect::new(0, 0, 40, 10);
        assert!(engine.resize(&[1, 2], LayoutMode::Wide, small, 1, NavDirection::Right, 10));
        // 30 / 10 split becomes 60 / 20 on a canvas twice as wide
        let big = Rect::new(0, 0, 80, 10);
        let regions = engine.relayout(&[1, 2], LayoutMode::Wide, big);
        assert_eq!(regions.get(1).map(|r| r.width), Some(60));
        assert_eq!(regions.get(2).map(|r| r.width), Some(20));
        // a new pane joins with an average share
        let regions = engine.relayout(&[1, 2, 3], LayoutMode::Wide, Rect::new(0, 0, 90, 10));
        assert_eq!(regions.get(3).map(|r| r.width), Some(30));
    }

    #[test]
    fn resize_master_boundary_updates_ratio() {
        let mut engine = TilingLayoutEngine::<usize>::new(0.5, 4);
        let canvas = Rect::new(0, 0, 100, 30);
        let panes = [1, 2, 3];
        assert!(engine.resize(&panes, LayoutMode::MasterStack, canvas, 2, NavDirection::Left, 20));
        assert!((engine.master_ratio() - 0.3).abs() < 1e-4);
        // vertical edge inside the stack touches only the stack split
        assert!(engine.resize(&panes, LayoutMode::MasterStack, canvas, 2, NavDirection::Down, 5));
        let regions = engine.relayout(&panes, LayoutMode::MasterStack, canvas);
        assert_eq!(regions.get(2).map(|r| r.height), Some(20));
        assert_eq!(regions.get(1).map(|r| r.width), Some(30));
    }

    #[test]
    fn resize_grid_rows_updates_whole_row() {
        let mut engine = TilingLayoutEngine::<usize>::default();
        let canvas = Rect::new(0, 0, 40, 40);
        let panes = [1, 2, 3, 4];
        assert!(engine.resize(&panes, LayoutMode::Grid, canvas, 3, NavDirection::Up, 10));
        let regions = engine.relayout(&panes, LayoutMode::Grid, canvas);
        assert_eq!(regions.get(1).map(|r| r.height), Some(10));
        assert_eq!(regions.get(2).map(|r| r.height), Some(10));
        assert_eq!(regions.get(4).map(|r| r.height), Some(30));
    }

    #[test]
    fn single_cell_resizes_are_not_lost() {
        let mut engine = TilingLayoutEngine::<usize>::default();
        let canvas = Rect::new(0, 0, 20, 20);
        let panes = [1, 2];
        let height = |engine: &TilingLayoutEngine<usize>| {
            engine
                .relayout(&panes, LayoutMode::Tall, canvas)
                .get(1)
                .map(|r| r.height)
                .unwrap_or(0)
        };
        let mut current = height(&engine);
        for _ in 0..5 {
            assert!(engine.resize(&panes, LayoutMode::Tall, canvas, 1, NavDirection::Down, 1));
            let next = height(&engine);
            assert_eq!(next, current + 1, "resize got stuck at {current}");
            current = next;
        }
    }

    #[test]
    fn forget_and_set_weights() {
        let mut engine = TilingLayoutEngine::<usize>::default();
        engine.set_weights(
            1,
            PaneWeights {
                horizontal: 3.0,
                vertical: 1.0,
            },
        );
        assert_eq!(engine.weights_of(1).horizontal, 3.0);
        engine.forget(1);
        assert!(engine.weights_of(1).is_default());
        engine.set_master_ratio(2.0);
        assert_eq!(engine.master_ratio(), MASTER_RATIO_MAX);
    }
}
