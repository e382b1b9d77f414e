//! Protocol module - JSON frames for the ledger node
//!
//! Line-delimited JSON over TCP. Every frame carries: type, seq (sequence
//! number), ts (timestamp in ms). Replies reuse the seq of the request
//! they answer, which is how waiters pair them up.

use serde::{Deserialize, Serialize};

use crate::types::TOKEN_CONVERSION_RATE;

pub const PROTOCOL_VERSION: &str = "1.0";

// ============== Client -> Node Requests ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HelloType {
    #[serde(rename = "hello")]
    Hello,
}

impl Default for HelloType {
    fn default() -> Self {
        Self::Hello
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmitScoreType {
    #[serde(rename = "submit_score")]
    SubmitScore,
}

impl Default for SubmitScoreType {
    fn default() -> Self {
        Self::SubmitScore
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStartType {
    #[serde(rename = "game_start")]
    GameStart,
}

impl Default for GameStartType {
    fn default() -> Self {
        Self::GameStart
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEndType {
    #[serde(rename = "game_end")]
    GameEnd,
}

impl Default for GameEndType {
    fn default() -> Self {
        Self::GameEnd
    }
}

/// Shared tag for the leaderboard request and its reply; the direction of
/// travel disambiguates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeaderboardType {
    #[serde(rename = "leaderboard")]
    Leaderboard,
}

impl Default for LeaderboardType {
    fn default() -> Self {
        Self::Leaderboard
    }
}

/// First frame on a fresh connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloFrame {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: HelloType,
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
    #[serde(rename = "protocol_version")]
    pub protocol_version: String,
    #[serde(rename = "player_id")]
    pub player_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

/// Score-to-token conversion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitScoreFrame {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: SubmitScoreType,
    pub seq: u64,
    pub ts: u64,
    #[serde(rename = "player_id")]
    pub player_id: String,
    pub score: u32,
    #[serde(rename = "time_secs")]
    pub time_secs: u32,
    pub moves: u32,
    /// Tokens the score converts to, precomputed so node and client agree
    pub tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStartFrame {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: GameStartType,
    pub seq: u64,
    pub ts: u64,
    #[serde(rename = "player_id")]
    pub player_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEndFrame {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: GameEndType,
    pub seq: u64,
    pub ts: u64,
    #[serde(rename = "player_id")]
    pub player_id: String,
    pub score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardRequest {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: LeaderboardType,
    pub seq: u64,
    pub ts: u64,
    pub limit: usize,
}

// ============== Node -> Client Replies ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

/// Reply to hello: the node has claimed (or located) the player's chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeFrame {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    #[serde(rename = "protocol_version")]
    pub protocol_version: String,
    #[serde(rename = "chain_id")]
    pub chain_id: String,
    pub balance: u64,
}

/// Acknowledgment of submit_score / game_start / game_end
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckFrame {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
    /// Balance after a transfer, when the node reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "rejected")]
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardFrame {
    #[serde(rename = "type")]
    pub msg_type: LeaderboardType,
    pub seq: u64,
    pub ts: u64,
    pub rows: Vec<LeaderRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderRow {
    pub player: String,
    pub score: u32,
    #[serde(default)]
    pub tokens: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorFrame {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "bad_request")]
    BadRequest,
    #[serde(rename = "unsupported")]
    Unsupported,
    #[serde(rename = "chain_unavailable")]
    ChainUnavailable,
    #[serde(rename = "internal")]
    Internal,
}

// ============== Utility Functions ==============

/// Create a hello frame
pub fn create_hello(seq: u64, client_name: &str, player_id: &str) -> HelloFrame {
    HelloFrame {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: PROTOCOL_VERSION.to_string(),
        player_id: player_id.to_string(),
    }
}

/// Create a submit_score frame. Token conversion is floor division at the
/// fixed rate.
pub fn create_submit_score(
    seq: u64,
    player_id: &str,
    score: u32,
    time_secs: u32,
    moves: u32,
) -> SubmitScoreFrame {
    SubmitScoreFrame {
        msg_type: SubmitScoreType::SubmitScore,
        seq,
        ts: current_timestamp_ms(),
        player_id: player_id.to_string(),
        score,
        time_secs,
        moves,
        tokens: score / TOKEN_CONVERSION_RATE,
    }
}

/// Create a game_start frame
pub fn create_game_start(seq: u64, player_id: &str) -> GameStartFrame {
    GameStartFrame {
        msg_type: GameStartType::GameStart,
        seq,
        ts: current_timestamp_ms(),
        player_id: player_id.to_string(),
    }
}

/// Create a game_end frame
pub fn create_game_end(seq: u64, player_id: &str, score: u32) -> GameEndFrame {
    GameEndFrame {
        msg_type: GameEndType::GameEnd,
        seq,
        ts: current_timestamp_ms(),
        player_id: player_id.to_string(),
        score,
    }
}

/// Create a leaderboard request
pub fn create_leaderboard_request(seq: u64, limit: usize) -> LeaderboardRequest {
    LeaderboardRequest {
        msg_type: LeaderboardType::Leaderboard,
        seq,
        ts: current_timestamp_ms(),
        limit,
    }
}

/// Get current timestamp in milliseconds
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
