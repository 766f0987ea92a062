//! Headless tiling pane manager: layout, directional focus with history,
//! and numbered workspaces that survive restarts.

pub mod actions;
pub mod config;
pub mod constants;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod feedback;
pub mod focus;
pub mod keybindings;
pub mod layout;
pub mod pane;
pub mod session;
pub mod timers;
pub mod tracing_sub;
pub mod ui;
pub mod window;
pub mod workspace;
