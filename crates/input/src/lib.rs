//! Desktop input mapped to camera control actions.
//!
//! # Invariants
//! - The scene consumes actions, never raw window events.
//! - Key release zeroes exactly the axis its press drove.

pub mod action;
pub mod bindings;

pub use action::Action;
pub use bindings::{InputConfig, Key, KeyBindings, MouseDrag};

pub fn crate_info() -> &'static str {
    "voxelview-input v0.1.0"
}
