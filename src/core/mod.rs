//! Core module - pure game rules with no external I/O
//!
//! Board scanning, gravity, gesture handling, and the session driver all
//! live here. Everything runs on injectable time and an injectable RNG,
//! so the whole module is deterministic under test.

pub mod board;
pub mod moves;
pub mod rng;
pub mod session;
pub mod snapshot;

// Re-export commonly used types
pub use board::{Board, BoardEvents, MatchHit};
pub use moves::{GesturePhase, MoveController, SwapOutcome};
pub use rng::SimpleRng;
pub use session::{GameReport, GameSession};
pub use snapshot::{GameSnapshot, TagMap};
