//! Profiles module - per-player stats and the local leaderboard
//!
//! Averages are rolling means updated per finished game, the way the
//! stats screen reports them. The local leaderboard ranks best scores;
//! display preference is chain rows first, then local, then built-in
//! placeholders so the screen is never blank.

use serde::{Deserialize, Serialize};

use crate::chain::{tokens_for_score, LeaderRow};
use crate::types::LEADERBOARD_LIMIT;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    #[serde(rename = "games_played")]
    pub games_played: u32,
    #[serde(rename = "total_score")]
    pub total_score: u64,
    #[serde(rename = "best_score")]
    pub best_score: u32,
    #[serde(rename = "average_moves")]
    pub average_moves: f64,
    #[serde(rename = "average_time")]
    pub average_time: f64,
    #[serde(rename = "last_score")]
    pub last_score: u32,
    #[serde(rename = "last_moves")]
    pub last_moves: u32,
    #[serde(rename = "last_time")]
    pub last_time: u32,
    #[serde(rename = "last_played_ms")]
    pub last_played_ms: u64,
}

impl PlayerStats {
    /// Fold one finished game into the stats
    pub fn record_game(&mut self, score: u32, moves: u32, time_secs: u32, now_ms: u64) {
        self.games_played += 1;
        self.total_score += score as u64;
        self.best_score = self.best_score.max(score);

        let n = self.games_played as f64;
        self.average_moves = (self.average_moves * (n - 1.0) + moves as f64) / n;
        self.average_time = (self.average_time * (n - 1.0) + time_secs as f64) / n;

        self.last_score = score;
        self.last_moves = moves;
        self.last_time = time_secs;
        self.last_played_ms = now_ms;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    #[serde(rename = "password_digest")]
    pub password_digest: String,
    #[serde(rename = "created_at_ms")]
    pub created_at_ms: u64,
    pub stats: PlayerStats,
}

impl Profile {
    pub fn new(username: &str, password_digest: &str, now_ms: u64) -> Self {
        Self {
            username: username.trim().to_string(),
            password_digest: password_digest.to_string(),
            created_at_ms: now_ms,
            stats: PlayerStats::default(),
        }
    }
}

/// Every known profile, persisted wholesale
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileBook {
    pub profiles: Vec<Profile>,
}

impl ProfileBook {
    pub fn find(&self, username: &str) -> Option<&Profile> {
        let username = username.trim();
        self.profiles.iter().find(|p| p.username == username)
    }

    pub fn find_mut(&mut self, username: &str) -> Option<&mut Profile> {
        let username = username.trim();
        self.profiles.iter_mut().find(|p| p.username == username)
    }

    pub fn insert(&mut self, profile: Profile) {
        self.profiles.push(profile);
    }

    /// Fold a finished game into the named profile. Returns false when
    /// the username is unknown.
    pub fn record_game(
        &mut self,
        username: &str,
        score: u32,
        moves: u32,
        time_secs: u32,
        now_ms: u64,
    ) -> bool {
        match self.find_mut(username) {
            Some(profile) => {
                profile.stats.record_game(score, moves, time_secs, now_ms);
                true
            }
            None => false,
        }
    }

    /// Best scores across local profiles, descending, top ten, zeros
    /// excluded
    pub fn local_leaderboard(&self) -> Vec<LeaderRow> {
        let mut rows: Vec<LeaderRow> = self
            .profiles
            .iter()
            .filter(|p| p.stats.best_score > 0)
            .map(|p| LeaderRow {
                player: p.username.clone(),
                score: p.stats.best_score,
                tokens: tokens_for_score(p.stats.best_score) as u64,
            })
            .collect();
        rows.sort_by(|a, b| b.score.cmp(&a.score));
        rows.truncate(LEADERBOARD_LIMIT);
        rows
    }
}

/// Demo rows shown before anyone has scored
pub fn placeholder_rows() -> Vec<LeaderRow> {
    [("sugar_rush", 480), ("candy_baron", 350), ("first_crush", 210)]
        .iter()
        .map(|&(player, score)| LeaderRow {
            player: player.to_string(),
            score,
            tokens: tokens_for_score(score) as u64,
        })
        .collect()
}

/// Display preference: chain rows when the node served any, else local
/// bests, else placeholders
pub fn choose_display_rows(chain: Vec<LeaderRow>, local: Vec<LeaderRow>) -> Vec<LeaderRow> {
    if !chain.is_empty() {
        chain
    } else if !local.is_empty() {
        local
    } else {
        placeholder_rows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_with_best(username: &str, best: u32) -> Profile {
        let mut profile = Profile::new(username, "d", 0);
        profile.stats.best_score = best;
        profile
    }

    #[test]
    fn test_record_game_updates_counters_and_bests() {
        let mut stats = PlayerStats::default();

        stats.record_game(120, 10, 60, 1_000);
        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.total_score, 120);
        assert_eq!(stats.best_score, 120);
        assert_eq!(stats.last_score, 120);
        assert_eq!(stats.last_played_ms, 1_000);

        // A worse game moves the averages but not the best.
        stats.record_game(60, 4, 30, 2_000);
        assert_eq!(stats.games_played, 2);
        assert_eq!(stats.total_score, 180);
        assert_eq!(stats.best_score, 120);
        assert_eq!(stats.last_score, 60);
    }

    #[test]
    fn test_rolling_averages() {
        let mut stats = PlayerStats::default();
        stats.record_game(0, 10, 60, 0);
        stats.record_game(0, 20, 30, 0);

        assert!((stats.average_moves - 15.0).abs() < f64::EPSILON);
        assert!((stats.average_time - 45.0).abs() < f64::EPSILON);

        stats.record_game(0, 30, 30, 0);
        assert!((stats.average_moves - 20.0).abs() < 1e-9);
        assert!((stats.average_time - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_book_record_game_requires_known_username() {
        let mut book = ProfileBook::default();
        assert!(!book.record_game("ghost", 10, 1, 60, 0));

        book.insert(Profile::new("ada", "d", 0));
        assert!(book.record_game("ada", 10, 1, 60, 0));
        assert_eq!(book.find("ada").map(|p| p.stats.games_played), Some(1));
    }

    #[test]
    fn test_local_leaderboard_sorts_and_filters() {
        let mut book = ProfileBook::default();
        book.insert(profile_with_best("low", 10));
        book.insert(profile_with_best("zero", 0));
        book.insert(profile_with_best("high", 300));
        book.insert(profile_with_best("mid", 40));

        let rows = book.local_leaderboard();
        let names: Vec<&str> = rows.iter().map(|r| r.player.as_str()).collect();
        assert_eq!(names, ["high", "mid", "low"], "zeros excluded, best first");
        assert_eq!(rows[0].tokens, 30);
    }

    #[test]
    fn test_local_leaderboard_truncates_to_limit() {
        let mut book = ProfileBook::default();
        for i in 0..15u32 {
            book.insert(profile_with_best(&format!("p{}", i), 10 + i));
        }
        assert_eq!(book.local_leaderboard().len(), LEADERBOARD_LIMIT);
    }

    #[test]
    fn test_display_preference_order() {
        let chain = vec![LeaderRow {
            player: "chain".to_string(),
            score: 5,
            tokens: 0,
        }];
        let local = vec![LeaderRow {
            player: "local".to_string(),
            score: 9,
            tokens: 0,
        }];

        assert_eq!(
            choose_display_rows(chain.clone(), local.clone())[0].player,
            "chain"
        );
        assert_eq!(choose_display_rows(Vec::new(), local)[0].player, "local");

        let fallback = choose_display_rows(Vec::new(), Vec::new());
        assert_eq!(fallback.len(), placeholder_rows().len());
        assert!(fallback.iter().all(|row| row.score > 0));
    }
}
