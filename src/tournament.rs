//! Tournament module - scheduling, entries, and lifecycle sweeps
//!
//! Tournaments live in epoch milliseconds. Status never moves on its own;
//! callers run `sweep(now_ms)` whenever the clock matters, which keeps
//! every transition deterministic under test. Windows of non-completed
//! tournaments may not overlap, so at most one is Active at a time.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Results stay visible this long after a tournament completes
pub const RESULTS_GRACE_MS: u64 = 60_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TournamentError {
    #[error("tournament name is required")]
    NameRequired,
    #[error("start time must be in the future")]
    StartInPast,
    #[error("end time must be after start")]
    EndBeforeStart,
    #[error("overlaps an existing tournament window")]
    Overlaps,
    #[error("only admins can {0}")]
    AdminOnly(&'static str),
    #[error("tournament is not active")]
    NotActive,
    #[error("unknown tournament")]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentStatus {
    #[serde(rename = "scheduled")]
    Scheduled,
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "completed")]
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentEntry {
    pub username: String,
    pub score: u32,
    pub moves: u32,
    #[serde(rename = "submitted_at_ms")]
    pub submitted_at_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: u64,
    pub name: String,
    #[serde(rename = "start_ms")]
    pub start_ms: u64,
    #[serde(rename = "end_ms")]
    pub end_ms: u64,
    #[serde(rename = "created_by")]
    pub created_by: String,
    pub status: TournamentStatus,
    pub participants: Vec<String>,
    pub entries: Vec<TournamentEntry>,
}

impl Tournament {
    /// Inclusive window intersection against another [start, end]
    fn window_overlaps(&self, start_ms: u64, end_ms: u64) -> bool {
        start_ms <= self.end_ms && self.start_ms <= end_ms
    }

    /// Whether the standings should still be shown
    pub fn results_visible(&self, now_ms: u64) -> bool {
        match self.status {
            TournamentStatus::Scheduled => false,
            TournamentStatus::Active => true,
            TournamentStatus::Completed => now_ms < self.end_ms + RESULTS_GRACE_MS,
        }
    }
}

/// Every known tournament, persisted wholesale
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TournamentBook {
    pub tournaments: Vec<Tournament>,
}

impl TournamentBook {
    /// Schedule a tournament. Admin only; the window must start strictly
    /// in the future, end strictly after it starts, and stay clear of
    /// every non-completed window. Returns the new id.
    pub fn create(
        &mut self,
        admin: bool,
        created_by: &str,
        name: &str,
        start_ms: u64,
        end_ms: u64,
        now_ms: u64,
    ) -> Result<u64, TournamentError> {
        if !admin {
            return Err(TournamentError::AdminOnly("create tournaments"));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(TournamentError::NameRequired);
        }
        if start_ms <= now_ms {
            return Err(TournamentError::StartInPast);
        }
        if end_ms <= start_ms {
            return Err(TournamentError::EndBeforeStart);
        }
        if self
            .tournaments
            .iter()
            .any(|t| t.status != TournamentStatus::Completed && t.window_overlaps(start_ms, end_ms))
        {
            return Err(TournamentError::Overlaps);
        }

        let id = self.tournaments.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        self.tournaments.push(Tournament {
            id,
            name: name.to_string(),
            start_ms,
            end_ms,
            created_by: created_by.to_string(),
            status: TournamentStatus::Scheduled,
            participants: Vec::new(),
            entries: Vec::new(),
        });
        Ok(id)
    }

    /// Advance statuses against the clock: Scheduled becomes Active at
    /// start, Active becomes Completed at end (both may fire in one
    /// sweep). Returns whether anything changed.
    pub fn sweep(&mut self, now_ms: u64) -> bool {
        let mut changed = false;
        for t in &mut self.tournaments {
            if t.status == TournamentStatus::Scheduled && now_ms >= t.start_ms {
                t.status = TournamentStatus::Active;
                changed = true;
            }
            if t.status == TournamentStatus::Active && now_ms >= t.end_ms {
                t.status = TournamentStatus::Completed;
                changed = true;
            }
        }
        changed
    }

    pub fn get(&self, id: u64) -> Option<&Tournament> {
        self.tournaments.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut Tournament> {
        self.tournaments.iter_mut().find(|t| t.id == id)
    }

    /// The running tournament, if any (windows cannot overlap, so there
    /// is at most one)
    pub fn active(&self) -> Option<&Tournament> {
        self.tournaments
            .iter()
            .find(|t| t.status == TournamentStatus::Active)
    }

    pub fn active_id(&self) -> Option<u64> {
        self.active().map(|t| t.id)
    }

    /// Enter the participant list. Only while Active; joining twice is a
    /// no-op.
    pub fn join(&mut self, id: u64, username: &str) -> Result<(), TournamentError> {
        let tournament = self.get_mut(id).ok_or(TournamentError::Unknown)?;
        if tournament.status != TournamentStatus::Active {
            return Err(TournamentError::NotActive);
        }
        let username = username.trim();
        if !tournament.participants.iter().any(|p| p == username) {
            tournament.participants.push(username.to_string());
        }
        Ok(())
    }

    /// Record a finished game against the tournament. One entry per
    /// player; an existing entry is replaced only by a strictly higher
    /// score. Submitting also enters the participant list.
    pub fn submit_score(
        &mut self,
        id: u64,
        username: &str,
        score: u32,
        moves: u32,
        now_ms: u64,
    ) -> Result<(), TournamentError> {
        let tournament = self.get_mut(id).ok_or(TournamentError::Unknown)?;
        if tournament.status != TournamentStatus::Active {
            return Err(TournamentError::NotActive);
        }
        let username = username.trim();

        if !tournament.participants.iter().any(|p| p == username) {
            tournament.participants.push(username.to_string());
        }

        match tournament.entries.iter_mut().find(|e| e.username == username) {
            Some(entry) => {
                if score > entry.score {
                    entry.score = score;
                    entry.moves = moves;
                    entry.submitted_at_ms = now_ms;
                }
            }
            None => tournament.entries.push(TournamentEntry {
                username: username.to_string(),
                score,
                moves,
                submitted_at_ms: now_ms,
            }),
        }
        tournament.entries.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(())
    }

    /// Remove a tournament outright. Admin only.
    pub fn delete(&mut self, admin: bool, id: u64) -> Result<(), TournamentError> {
        if !admin {
            return Err(TournamentError::AdminOnly("delete tournaments"));
        }
        let before = self.tournaments.len();
        self.tournaments.retain(|t| t.id != id);
        if self.tournaments.len() == before {
            return Err(TournamentError::Unknown);
        }
        Ok(())
    }
}
