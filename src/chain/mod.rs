//! Chain module - score-to-token ledger collaborators
//!
//! The game-over flow talks to a `ScoreLedger`, injected so tests can use
//! a recording fake. `NodeLedger` speaks the line protocol to a real node;
//! `OfflineLedger` acknowledges everything locally and is the fallback
//! whenever no node is reachable.

pub mod client;
pub mod protocol;

use thiserror::Error;

use crate::types::TOKEN_CONVERSION_RATE;

pub use client::{NodeConfig, NodeLedger};
pub use protocol::LeaderRow;

/// Where the node connection currently stands. The connect sequence walks
/// Connecting, Handshaking, ClaimingChain, Ready in order; Error and
/// Offline are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Offline,
    Connecting,
    Handshaking,
    ClaimingChain,
    Ready,
    Error(String),
}

impl ConnectionStatus {
    /// Short uppercase label for the status line
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Offline => "OFFLINE",
            ConnectionStatus::Connecting => "CONNECTING",
            ConnectionStatus::Handshaking => "HANDSHAKE",
            ConnectionStatus::ClaimingChain => "CLAIMING",
            ConnectionStatus::Ready => "READY",
            ConnectionStatus::Error(_) => "ERROR",
        }
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("node i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("node rejected {what}: {message}")]
    Rejected { what: &'static str, message: String },
    #[error("protocol: {0}")]
    Protocol(String),
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),
    #[error("connection closed")]
    Closed,
}

/// What a submission came to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitReceipt {
    /// Tokens minted for this submission
    pub tokens: u32,
    /// Balance after the submission, when the ledger reports one
    pub balance: Option<u64>,
    /// True when the result never left this process
    pub local: bool,
}

/// Score-to-token conversion at the fixed rate (floor division)
pub fn tokens_for_score(score: u32) -> u32 {
    score / TOKEN_CONVERSION_RATE
}

/// The collaborator the game-over flow submits results to
pub trait ScoreLedger {
    fn status(&self) -> ConnectionStatus;

    /// A round started; failures here never interrupt play
    fn game_started(&mut self);

    /// A round ended with the given score; failures never interrupt play
    fn game_ended(&mut self, score: u32);

    /// Convert a final score into tokens. A score under the conversion
    /// rate is acknowledged locally without a transfer.
    fn submit_score(
        &mut self,
        score: u32,
        time_secs: u32,
        moves: u32,
    ) -> Result<SubmitReceipt, LedgerError>;

    /// Chain-wide standings, best first
    fn leaderboard(&mut self) -> Result<Vec<LeaderRow>, LedgerError>;
}

/// Always-available fallback: acknowledges submissions against a mock
/// balance and serves an empty chain leaderboard.
#[derive(Debug, Default)]
pub struct OfflineLedger {
    balance: u64,
}

impl OfflineLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }
}

impl ScoreLedger for OfflineLedger {
    fn status(&self) -> ConnectionStatus {
        ConnectionStatus::Offline
    }

    fn game_started(&mut self) {}

    fn game_ended(&mut self, _score: u32) {}

    fn submit_score(
        &mut self,
        score: u32,
        _time_secs: u32,
        _moves: u32,
    ) -> Result<SubmitReceipt, LedgerError> {
        let tokens = tokens_for_score(score);
        self.balance += tokens as u64;
        Ok(SubmitReceipt {
            tokens,
            balance: Some(self.balance),
            local: true,
        })
    }

    fn leaderboard(&mut self) -> Result<Vec<LeaderRow>, LedgerError> {
        Ok(Vec::new())
    }
}
