//! Zoom-adaptive multi-resolution background grid.
//!
//! [`grid::MultiGrid`] keeps a small stack of nested square grids legible at
//! any scale and renders them either through an immediate-mode
//! [`draw::DrawContext`] or as recursive tile patterns attached to a
//! [`scene::SceneGraph`]. The `view` module hosts both on a terminal.

pub mod braille;
pub mod config;
pub mod draw;
pub mod error;
pub mod grid;
pub mod scene;
pub mod units;
pub mod view;

pub use error::{GridError, Result};
