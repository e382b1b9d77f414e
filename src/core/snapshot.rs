//! Render snapshot and transient cell tags
//!
//! The session copies its state into a plain `GameSnapshot` once per frame
//! (no allocation, renderer-agnostic). Animation tags live beside the grid
//! in a `TagMap`: a tag is written once, survives `TAG_TTL_MS`, then the
//! slot frees itself. Tags are cosmetic and never feed back into rules.

use crate::types::{Cell, CellTag, GamePhase, CELL_COUNT, TAG_TTL_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TagSlot {
    tag: CellTag,
    expires_at: u64,
}

/// Per-cell transient tags keyed by session time (milliseconds)
#[derive(Debug, Clone)]
pub struct TagMap {
    slots: [Option<TagSlot>; CELL_COUNT],
}

impl TagMap {
    pub fn new() -> Self {
        Self {
            slots: [None; CELL_COUNT],
        }
    }

    /// Write-once: an unexpired tag keeps its slot; expired or empty slots
    /// accept the new tag and hold it for `TAG_TTL_MS`.
    pub fn stamp(&mut self, index: usize, tag: CellTag, now_ms: u64) {
        if index >= CELL_COUNT {
            return;
        }
        let occupied = matches!(self.slots[index], Some(slot) if now_ms < slot.expires_at);
        if !occupied {
            self.slots[index] = Some(TagSlot {
                tag,
                expires_at: now_ms.saturating_add(TAG_TTL_MS),
            });
        }
    }

    /// The tag at `index` if it has not expired yet
    pub fn get(&self, index: usize, now_ms: u64) -> Option<CellTag> {
        match self.slots.get(index)? {
            Some(slot) if now_ms < slot.expires_at => Some(slot.tag),
            _ => None,
        }
    }

    /// True while any slot holds an unexpired tag
    pub fn any_active(&self, now_ms: u64) -> bool {
        self.slots
            .iter()
            .flatten()
            .any(|slot| now_ms < slot.expires_at)
    }

    /// Copy the active tags into a flat array (expired slots become None)
    pub fn fill_into(&self, now_ms: u64, out: &mut [Option<CellTag>; CELL_COUNT]) {
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.get(i, now_ms);
        }
    }

    pub fn clear(&mut self) {
        self.slots = [None; CELL_COUNT];
    }
}

impl Default for TagMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Flat copy of everything the rendering layer needs for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSnapshot {
    pub cells: [Cell; CELL_COUNT],
    pub tags: [Option<CellTag>; CELL_COUNT],
    pub phase: GamePhase,
    pub score: u32,
    pub moves: u32,
    pub tokens: u32,
    pub time_left_ms: u64,
    pub seed: u32,
    /// Points of the most recent cleared run, for the score popup
    pub last_points: Option<u32>,
    /// True while cells are settling or tags are live (forces redraws)
    pub animating: bool,
}

impl GameSnapshot {
    pub fn in_play(&self) -> bool {
        self.phase == GamePhase::Active
    }

    /// FNV-1a over the rule-relevant fields. Tag changes do not move the
    /// fingerprint; `animating` keeps frames flowing while they matter.
    pub fn fingerprint(&self) -> u64 {
        const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0100_0000_01b3;

        let mut hash = OFFSET;
        let mut mix = |byte: u8| {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(PRIME);
        };

        for cell in &self.cells {
            mix(cell_code(*cell));
        }
        for part in [
            self.score,
            self.moves,
            self.tokens,
            self.time_left_ms as u32,
            (self.time_left_ms >> 32) as u32,
        ] {
            for byte in part.to_le_bytes() {
                mix(byte);
            }
        }
        mix(self.phase as u8);
        hash
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            cells: [None; CELL_COUNT],
            tags: [None; CELL_COUNT],
            phase: GamePhase::NotStarted,
            score: 0,
            moves: 0,
            tokens: 0,
            time_left_ms: 0,
            seed: 0,
            last_points: None,
            animating: false,
        }
    }
}

/// Stable one-byte encoding of a cell (0 = empty)
fn cell_code(cell: Cell) -> u8 {
    match cell {
        None => 0,
        Some(candy) => {
            1 + crate::types::Candy::ALL
                .iter()
                .position(|&k| k == candy)
                .unwrap_or(0) as u8
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Candy;

    #[test]
    fn test_tag_is_write_once_until_expiry() {
        let mut tags = TagMap::new();
        tags.stamp(3, CellTag::Matching, 1000);
        // A later stamp on a live slot is discarded.
        tags.stamp(3, CellTag::Falling, 1100);
        assert_eq!(tags.get(3, 1100), Some(CellTag::Matching));

        // After expiry the slot frees and accepts a new tag.
        assert_eq!(tags.get(3, 1000 + TAG_TTL_MS), None);
        tags.stamp(3, CellTag::Falling, 1000 + TAG_TTL_MS);
        assert_eq!(tags.get(3, 1000 + TAG_TTL_MS), Some(CellTag::Falling));
    }

    #[test]
    fn test_tag_expires_after_ttl() {
        let mut tags = TagMap::new();
        tags.stamp(0, CellTag::Spawning, 500);
        assert_eq!(tags.get(0, 500 + TAG_TTL_MS - 1), Some(CellTag::Spawning));
        assert_eq!(tags.get(0, 500 + TAG_TTL_MS), None);
        assert!(!tags.any_active(500 + TAG_TTL_MS));
    }

    #[test]
    fn test_tag_out_of_range_is_ignored() {
        let mut tags = TagMap::new();
        tags.stamp(CELL_COUNT, CellTag::Matching, 0);
        assert!(!tags.any_active(0));
    }

    #[test]
    fn test_fill_into_copies_only_live_tags() {
        let mut tags = TagMap::new();
        tags.stamp(1, CellTag::Matching, 0);
        tags.stamp(2, CellTag::Falling, 200);

        let mut out = [None; CELL_COUNT];
        tags.fill_into(TAG_TTL_MS, &mut out);
        assert_eq!(out[1], None, "first tag expired");
        assert_eq!(out[2], Some(CellTag::Falling));
    }

    #[test]
    fn test_snapshot_default_is_cleared() {
        let snapshot = GameSnapshot::default();
        assert_eq!(snapshot.phase, GamePhase::NotStarted);
        assert!(snapshot.cells.iter().all(|c| c.is_none()));
        assert!(!snapshot.in_play());
    }

    #[test]
    fn test_fingerprint_tracks_cells_and_counters() {
        let mut a = GameSnapshot::default();
        let base = a.fingerprint();
        assert_eq!(base, a.fingerprint(), "fingerprint must be stable");

        a.cells[0] = Some(Candy::Red);
        let with_cell = a.fingerprint();
        assert_ne!(base, with_cell);

        a.score += 3;
        assert_ne!(with_cell, a.fingerprint());
    }

    #[test]
    fn test_fingerprint_ignores_tags() {
        let mut a = GameSnapshot::default();
        let base = a.fingerprint();
        a.tags[5] = Some(CellTag::Matching);
        assert_eq!(base, a.fingerprint());
    }
}
