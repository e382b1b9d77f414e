//! Board module - match-3 grid engine
//!
//! The board is an 8x8 grid where each cell holds a candy kind or is empty.
//! Uses a flat array (index = row * 8 + col) for cache locality and
//! zero-allocation scans. Matches are cleared one per scan per category;
//! gravity moves candies down one row per call and refills the top row,
//! so multi-row gaps settle over several ticks rather than in one shot.

use arrayvec::ArrayVec;

use crate::core::rng::SimpleRng;
use crate::types::{
    Candy, Cell, MatchAxis, BOARD_WIDTH, CELL_COUNT, POINTS_PER_FOUR, POINTS_PER_THREE,
};

/// One detected-and-cleared run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchHit {
    /// Lowest index of the run
    pub anchor: usize,
    pub axis: MatchAxis,
    pub len: usize,
    pub points: u32,
}

/// What the board changed since the last drain, for the rendering layer's
/// transient tags and score popups. Cosmetic only: recording stops silently
/// when a buffer fills, it never panics or affects grid state.
#[derive(Debug, Clone, Default)]
pub struct BoardEvents {
    pub hits: ArrayVec<MatchHit, 8>,
    /// Cells set to empty by scans
    pub cleared: ArrayVec<usize, 32>,
    /// Cells a candy fell into
    pub landed: ArrayVec<usize, 56>,
    /// Top-row cells refilled with a fresh candy
    pub spawned: ArrayVec<usize, 8>,
}

impl BoardEvents {
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
            && self.cleared.is_empty()
            && self.landed.is_empty()
            && self.spawned.is_empty()
    }
}

/// The game board - 8x8 candy grid with score accrual
#[derive(Debug, Clone)]
pub struct Board {
    /// Flat array of cells, row-major order (row * WIDTH + col)
    cells: [Cell; CELL_COUNT],
    /// Points from cleared runs; reset only by `reset()`
    score: u32,
    events: BoardEvents,
}

impl Board {
    /// Create a new empty board (all cells empty, score zero)
    pub fn new() -> Self {
        Self {
            cells: [None; CELL_COUNT],
            score: 0,
            events: BoardEvents::default(),
        }
    }

    /// Fill every cell with a uniformly random candy kind.
    ///
    /// Replaces the grid wholesale; counters are untouched. The deal makes
    /// no attempt to avoid ready-made runs - the first ticks clear them.
    pub fn generate(&mut self, rng: &mut SimpleRng) {
        for cell in &mut self.cells {
            *cell = Some(rng.next_candy());
        }
    }

    /// Zero the score and deal a fresh grid
    pub fn reset(&mut self, rng: &mut SimpleRng) {
        self.score = 0;
        self.events = BoardEvents::default();
        self.generate(rng);
    }

    pub fn width(&self) -> usize {
        BOARD_WIDTH
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Get cell at flat index. Returns None if out of bounds.
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// Set cell at flat index. Returns false if out of bounds.
    pub fn set(&mut self, index: usize, cell: Cell) -> bool {
        match self.cells.get_mut(index) {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    /// Swap two cells' values. Returns false if either index is out of bounds.
    pub fn swap(&mut self, a: usize, b: usize) -> bool {
        if a >= CELL_COUNT || b >= CELL_COUNT {
            return false;
        }
        self.cells.swap(a, b);
        true
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// True once no cell is empty (settling finished for now)
    pub fn is_fully_populated(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_some())
    }

    /// Clear the first column-of-four found in ascending index order.
    /// Returns whether a run was cleared.
    pub fn scan_column_fours(&mut self) -> bool {
        self.scan_columns(4, POINTS_PER_FOUR)
    }

    /// Clear the first row-of-four found in ascending index order
    pub fn scan_row_fours(&mut self) -> bool {
        self.scan_rows(4, POINTS_PER_FOUR)
    }

    /// Clear the first column-of-three found in ascending index order
    pub fn scan_column_threes(&mut self) -> bool {
        self.scan_columns(3, POINTS_PER_THREE)
    }

    /// Clear the first row-of-three found in ascending index order
    pub fn scan_row_threes(&mut self) -> bool {
        self.scan_rows(3, POINTS_PER_THREE)
    }

    /// Run all four scans, every one of them, in the fixed order
    /// column-four, row-four, column-three, row-three. Each scan clears at
    /// most one run and keeps its side effects regardless of the others.
    /// Returns whether any scan cleared something.
    pub fn run_scans(&mut self) -> bool {
        let col4 = self.scan_column_fours();
        let row4 = self.scan_row_fours();
        let col3 = self.scan_column_threes();
        let row3 = self.scan_row_threes();
        col4 || row4 || col3 || row3
    }

    /// One settling step: the four scans then gravity.
    /// Returns whether the grid changed at all.
    pub fn step(&mut self, rng: &mut SimpleRng) -> bool {
        let matched = self.run_scans();
        let moved = self.apply_gravity(rng);
        matched || moved
    }

    /// Single ascending gravity pass over indices 0..56 (the bottom row is
    /// never a source). Per index: a top-row empty cell is refilled with a
    /// random candy first, then the cell's candy moves down when the cell
    /// below is empty. A candy above consecutive gaps slides through all of
    /// them in one pass; a gap at the top of a column drains one row per
    /// call. Returns whether any cell changed.
    pub fn apply_gravity(&mut self, rng: &mut SimpleRng) -> bool {
        let mut changed = false;
        for i in 0..CELL_COUNT - BOARD_WIDTH {
            if i < BOARD_WIDTH && self.cells[i].is_none() {
                self.cells[i] = Some(rng.next_candy());
                let _ = self.events.spawned.try_push(i);
                changed = true;
            }
            let below = i + BOARD_WIDTH;
            if self.cells[below].is_none() {
                if let Some(candy) = self.cells[i].take() {
                    self.cells[below] = Some(candy);
                    let _ = self.events.landed.try_push(below);
                    changed = true;
                }
            }
        }
        changed
    }

    /// Drain the pending render events
    pub fn take_events(&mut self) -> BoardEvents {
        std::mem::take(&mut self.events)
    }

    fn scan_columns(&mut self, len: usize, points: u32) -> bool {
        // A vertical window of `len` fits only when the anchor row is at
        // most WIDTH - len, i.e. anchors 0..40 for fours, 0..48 for threes.
        let anchor_end = (BOARD_WIDTH - len + 1) * BOARD_WIDTH;
        for i in 0..anchor_end {
            let kind = match self.cells[i] {
                Some(kind) => kind,
                None => continue,
            };
            if (1..len).all(|step| self.cells[i + step * BOARD_WIDTH] == Some(kind)) {
                for step in 0..len {
                    self.clear_cell(i + step * BOARD_WIDTH);
                }
                self.record_hit(i, MatchAxis::Column, len, points);
                return true;
            }
        }
        false
    }

    fn scan_rows(&mut self, len: usize, points: u32) -> bool {
        for i in 0..CELL_COUNT {
            // Skip anchors whose window would wrap into the next row
            // (columns 5..7 for fours, 6..7 for threes), on every row
            // including the last.
            if i % BOARD_WIDTH + len > BOARD_WIDTH {
                continue;
            }
            let kind = match self.cells[i] {
                Some(kind) => kind,
                None => continue,
            };
            if (1..len).all(|step| self.cells[i + step] == Some(kind)) {
                for step in 0..len {
                    self.clear_cell(i + step);
                }
                self.record_hit(i, MatchAxis::Row, len, points);
                return true;
            }
        }
        false
    }

    fn clear_cell(&mut self, index: usize) {
        self.cells[index] = None;
        let _ = self.events.cleared.try_push(index);
    }

    fn record_hit(&mut self, anchor: usize, axis: MatchAxis, len: usize, points: u32) {
        self.score += points;
        let _ = self.events.hits.try_push(MatchHit {
            anchor,
            axis,
            len,
            points,
        });
    }

    /// Get a mutable reference to the internal cells array (for testing)
    #[cfg(test)]
    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Create from a flat array for testing
    #[cfg(test)]
    pub fn from_flat(cells: [Cell; CELL_COUNT]) -> Self {
        Self {
            cells,
            score: 0,
            events: BoardEvents::default(),
        }
    }

    /// A board with no run anywhere: 2x2 tiles of four distinct kinds
    #[cfg(test)]
    pub fn without_matches() -> Self {
        let mut cells = [None; CELL_COUNT];
        for (i, cell) in cells.iter_mut().enumerate() {
            let row = i / BOARD_WIDTH;
            let col = i % BOARD_WIDTH;
            *cell = Some(Candy::ALL[(row % 2) * 2 + (col % 2)]);
        }
        Self {
            cells,
            score: 0,
            events: BoardEvents::default(),
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
