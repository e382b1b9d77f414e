//! Terminal "game renderer" module.
//!
//! This is a small, game-oriented rendering layer for terminal gameplay.
//! It intentionally avoids ratatui widgets/layout and instead renders into a
//! simple framebuffer that can be flushed to a terminal backend.
//!
//! Goals:
//! - Keep `core` deterministic and testable
//! - Provide a rendering pipeline that feels closer to a game renderer
//! - Allow precise control over aspect ratio (e.g. 2 chars wide per cell)

pub mod frame_gate;
pub mod game_view;
pub mod screen;

pub use frame_gate::FrameGate;
pub use game_view::{GameScreenModel, GameView, Viewport};
pub use screen::{FrameBuffer, Glyph, GlyphStyle, Rgb, TerminalScreen};
