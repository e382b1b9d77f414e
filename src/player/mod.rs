//! Player module - local accounts, stats, and their on-disk store

pub mod auth;
pub mod profile;
pub mod store;

// Re-export commonly used types
pub use auth::{digest, is_admin, login, player_id, AuthError, SavedSession};
pub use profile::{choose_display_rows, PlayerStats, Profile, ProfileBook};
pub use store::{Store, StoreError};
