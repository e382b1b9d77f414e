//! Core types shared across the application
//! This module contains pure data types with no external dependencies

/// Board dimensions (square grid, flat-indexed row-major)
pub const BOARD_WIDTH: usize = 8;
pub const CELL_COUNT: usize = BOARD_WIDTH * BOARD_WIDTH;

/// Game timing constants (in milliseconds)
pub const TICK_MS: u64 = 100;
pub const LOW_POWER_TICK_MS: u64 = 250;
pub const GAME_DURATION_MS: u64 = 60_000;

/// Points awarded per cleared run
pub const POINTS_PER_THREE: u32 = 3;
pub const POINTS_PER_FOUR: u32 = 4;

/// Score units per minted token (floor division, remainder discarded)
pub const TOKEN_CONVERSION_RATE: u32 = 10;

/// Rows shown on any leaderboard, local or chain
pub const LEADERBOARD_LIMIT: usize = 10;

/// Lifetime of a transient cell animation tag
pub const TAG_TTL_MS: u64 = 300;

/// Minimum swipe displacement (display points) before a gesture
/// without a drop cell is interpreted as a directional swipe
pub const SWIPE_MIN_POINTS: i32 = 20;

/// Candy kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Candy {
    Blue,
    Green,
    Orange,
    Purple,
    Red,
    Yellow,
}

impl Candy {
    /// All kinds, in draw order
    pub const ALL: [Candy; 6] = [
        Candy::Blue,
        Candy::Green,
        Candy::Orange,
        Candy::Purple,
        Candy::Red,
        Candy::Yellow,
    ];

    /// Parse candy kind from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "blue" => Some(Candy::Blue),
            "green" => Some(Candy::Green),
            "orange" => Some(Candy::Orange),
            "purple" => Some(Candy::Purple),
            "red" => Some(Candy::Red),
            "yellow" => Some(Candy::Yellow),
            _ => None,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Candy::Blue => "blue",
            Candy::Green => "green",
            Candy::Orange => "orange",
            Candy::Purple => "purple",
            Candy::Red => "red",
            Candy::Yellow => "yellow",
        }
    }
}

/// Cell on the board (None = empty, Some = filled with candy kind).
/// Empty only occurs mid-resolution, between a clear and the refill.
pub type Cell = Option<Candy>;

/// Axis of a detected run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchAxis {
    Row,
    Column,
}

/// Transient per-cell animation tag for the rendering layer.
/// Cosmetic only; auto-expires after `TAG_TTL_MS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellTag {
    Matching,
    Falling,
    Spawning,
    DropTarget,
}

impl CellTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellTag::Matching => "matching",
            CellTag::Falling => "falling",
            CellTag::Spawning => "spawning",
            CellTag::DropTarget => "drop-target",
        }
    }
}

/// Session lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    NotStarted,
    Active,
    Over,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::NotStarted => "notStarted",
            GamePhase::Active => "active",
            GamePhase::Over => "over",
        }
    }
}
