//! Chain Crush: a terminal match-3 whose scores mint tokens on a
//! microchain ledger.
//!
//! Layout:
//! - `core`: board rules, gestures, and the session driver; pure and
//!   deterministic (injectable time + RNG)
//! - `chain`: score ledger collaborators (node client, offline fallback)
//! - `player`: local accounts, stats, and their on-disk store
//! - `tournament`: timed competition windows
//! - `input`: terminal events to UI actions and board gestures
//! - `term`: framebuffer renderer, game/menu views, redraw gating
//!
//! The binary in `main.rs` wires these together; `core` stays I/O-free
//! so the rules are unit-tested in place.

pub mod chain;
pub mod core;
pub mod input;
pub mod player;
pub mod term;
pub mod tournament;
pub mod types;
