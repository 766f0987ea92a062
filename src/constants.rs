//! Shared crate-wide constants.

/// Smallest width or height (in cells) a manual resize may leave on either
/// side of a boundary.
///
/// When the two slots sharing a boundary are together smaller than twice this
/// value, the clamp falls back to half of their combined size.
pub const MIN_PANE_SIZE: u16 = 4;

/// Share of the major axis given to the first pane in the master/stack
/// layout.
pub const DEFAULT_MASTER_RATIO: f32 = 0.6;

/// Bounds applied to the master ratio after a manual resize or config load.
pub const MASTER_RATIO_MIN: f32 = 0.05;
pub const MASTER_RATIO_MAX: f32 = 0.95;

/// How long the boundary highlight stays on a pane after a navigation or
/// move hits the edge of the layout.
pub const BOUNDARY_FLASH_MS: u64 = 200;

/// Number of addressable workspace slots (numbered from 1).
pub const WORKSPACE_SLOTS: usize = 9;

/// Poll interval of the demo event loop; every elapsed interval without input
/// is an idle tick.
pub const IDLE_POLL_MS: u64 = 16;
