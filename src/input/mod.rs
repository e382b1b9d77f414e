//! Terminal input module (session-facing).
//!
//! This module is intentionally independent of any UI framework. It maps
//! `crossterm` key and mouse events into UI actions and board gestures;
//! screen layout (which terminal cell is which board cell) stays in the
//! view layer.

pub mod handler;

pub use handler::{
    map_key, should_quit, step_cursor, Gesture, PointerTracker, UiAction, UiScreen,
    POINTS_PER_COLUMN, POINTS_PER_ROW,
};
