pub mod navigation;
pub mod tiling;

pub use navigation::*;
pub use tiling::*;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use ratatui::prelude::{Direction, Rect};
use serde::{Deserialize, Serialize};

/// How the engine partitions the canvas among the open panes.
///
/// Written in kebab-case. Reading goes through [`FromStr`], so `"Grid"` and
/// `"master_stack"` are accepted too.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum LayoutMode {
    Grid,
    MasterStack,
    Wide,
    Tall,
    #[default]
    Auto,
}

impl LayoutMode {
    pub const ALL: [LayoutMode; 5] = [
        LayoutMode::Auto,
        LayoutMode::Grid,
        LayoutMode::MasterStack,
        LayoutMode::Wide,
        LayoutMode::Tall,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LayoutMode::Grid => "grid",
            LayoutMode::MasterStack => "master-stack",
            LayoutMode::Wide => "wide",
            LayoutMode::Tall => "tall",
            LayoutMode::Auto => "auto",
        }
    }

    /// Next mode in the cycle used by the layout toggle shortcut.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grid" => Ok(LayoutMode::Grid),
            "master-stack" | "masterstack" | "master_stack" => Ok(LayoutMode::MasterStack),
            "wide" => Ok(LayoutMode::Wide),
            "tall" => Ok(LayoutMode::Tall),
            "auto" => Ok(LayoutMode::Auto),
            other => Err(format!("unknown layout mode `{other}`")),
        }
    }
}

impl TryFrom<String> for LayoutMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Compass direction used for focus navigation, pane moves and edge resizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NavDirection {
    Left,
    Right,
    Up,
    Down,
}

impl NavDirection {
    pub const ALL: [NavDirection; 4] = [
        NavDirection::Left,
        NavDirection::Right,
        NavDirection::Up,
        NavDirection::Down,
    ];

    /// Split axis this direction travels along.
    pub fn axis(self) -> Direction {
        match self {
            NavDirection::Left | NavDirection::Right => Direction::Horizontal,
            NavDirection::Up | NavDirection::Down => Direction::Vertical,
        }
    }

    /// True for directions that point towards increasing coordinates.
    pub fn is_forward(self) -> bool {
        matches!(self, NavDirection::Right | NavDirection::Down)
    }

    pub fn opposite(self) -> Self {
        match self {
            NavDirection::Left => NavDirection::Right,
            NavDirection::Right => NavDirection::Left,
            NavDirection::Up => NavDirection::Down,
            NavDirection::Down => NavDirection::Up,
        }
    }
}

impl fmt::Display for NavDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NavDirection::Left => "left",
            NavDirection::Right => "right",
            NavDirection::Up => "up",
            NavDirection::Down => "down",
        };
        f.write_str(s)
    }
}

/// Relative size weights of a pane, one per split axis.
///
/// Weights are unitless; a pane with weight 2.0 gets twice the share of a
/// sibling with 1.0 along that axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaneWeights {
    pub horizontal: f32,
    pub vertical: f32,
}

impl Default for PaneWeights {
    fn default() -> Self {
        Self {
            horizontal: 1.0,
            vertical: 1.0,
        }
    }
}

impl PaneWeights {
    pub fn along(&self, axis: Direction) -> f32 {
        match axis {
            Direction::Horizontal => self.horizontal,
            Direction::Vertical => self.vertical,
        }
    }

    pub fn set_along(&mut self, axis: Direction, value: f32) {
        match axis {
            Direction::Horizontal => self.horizontal = value,
            Direction::Vertical => self.vertical = value,
        }
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionMap<T: Copy + Eq + Ord> {
    regions: BTreeMap<T, Rect>,
}

impl<T: Copy + Eq + Ord> Default for RegionMap<T> {
    fn default() -> Self {
        Self {
            regions: BTreeMap::new(),
        }
    }
}

impl<T: Copy + Eq + Ord> RegionMap<T> {
    pub fn set(&mut self, id: T, rect: Rect) {
        self.regions.insert(id, rect);
    }

    pub fn get(&self, id: T) -> Option<Rect> {
        self.regions.get(&id).copied()
    }

    pub fn remove(&mut self, id: T) -> Option<Rect> {
        self.regions.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (T, Rect)> + '_ {
        self.regions.iter().map(|(id, rect)| (*id, *rect))
    }

    pub fn hit_test(&self, column: u16, row: u16) -> Option<T> {
        self.regions
            .iter()
            .find(|(_, rect)| rect_contains(**rect, column, row))
            .map(|(id, _)| *id)
    }

    /// Smallest rectangle enclosing every region.
    pub fn bounds(&self) -> Option<Rect> {
        self.regions
            .values()
            .copied()
            .reduce(|acc, rect| acc.union(rect))
    }
}

pub fn rect_contains(rect: Rect, column: u16, row: u16) -> bool {
    if rect.width == 0 || rect.height == 0 {
        return false;
    }
    let max_x = rect.x.saturating_add(rect.width);
    let max_y = rect.y.saturating_add(rect.height);
    column >= rect.x && column < max_x && row >= rect.y && row < max_y
}

pub fn rect_area(rect: Rect) -> u64 {
    rect.width as u64 * rect.height as u64
}

/// True when the two rectangles share at least one cell.
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let a_right = a.x as u32 + a.width as u32;
    let a_bottom = a.y as u32 + a.height as u32;
    let b_right = b.x as u32 + b.width as u32;
    let b_bottom = b.y as u32 + b.height as u32;
    (a.x as u32) < b_right
        && (b.x as u32) < a_right
        && (a.y as u32) < b_bottom
        && (b.y as u32) < a_bottom
}

/// Center of `rect` in doubled coordinates so odd sizes stay exact.
pub fn doubled_center(rect: Rect) -> (i64, i64) {
    (
        2 * rect.x as i64 + rect.width as i64,
        2 * rect.y as i64 + rect.height as i64,
    )
}
