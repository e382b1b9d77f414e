//! Move controller - gesture interpretation and swap validation
//!
//! Translates pointer/touch gestures into one swap attempt against the
//! board. The swap is applied optimistically, then kept only when the
//! target is 4-adjacent and the post-swap grid contains a run; otherwise
//! the two touched cells are restored from the values captured at grab
//! time. Scans always execute against the post-swap grid, so their clears
//! and points stand even when the swap itself is reverted.
//!
//! One gesture is tracked at a time; a new gesture start replaces a
//! pending one. The moves counter increments only on a committed swap.

use crate::core::board::Board;
use crate::types::{Cell, BOARD_WIDTH, CELL_COUNT, SWIPE_MIN_POINTS};

/// Value record carried by a gesture: which cell was grabbed and what it
/// held at grab time. Rollback writes these captured values back, even if
/// a scan cleared the cell in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellGrab {
    pub index: usize,
    pub cell: Cell,
}

/// Gesture state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Dragging,
}

/// How a gesture resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// Adjacent and the post-swap grid had a run: the swap stands
    Committed,
    /// The two swapped cells were restored; any scan side effects stand
    RolledBack,
    /// No attempt was made (missing reference, sub-threshold swipe,
    /// or a synthetic target outside the grid)
    Ignored,
}

/// Gesture-to-swap translator owning the moves counter
#[derive(Debug, Clone)]
pub struct MoveController {
    source: Option<CellGrab>,
    swipe_dx: i32,
    swipe_dy: i32,
    moves: u32,
    last_attempt: Option<(usize, usize)>,
    last_outcome: Option<SwapOutcome>,
}

impl MoveController {
    pub fn new() -> Self {
        Self {
            source: None,
            swipe_dx: 0,
            swipe_dy: 0,
            moves: 0,
            last_attempt: None,
            last_outcome: None,
        }
    }

    pub fn phase(&self) -> GesturePhase {
        if self.source.is_some() {
            GesturePhase::Dragging
        } else {
            GesturePhase::Idle
        }
    }

    /// Index of the grabbed cell while a gesture is pending
    pub fn grab(&self) -> Option<usize> {
        self.source.map(|grab| grab.index)
    }

    /// Committed swaps so far
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Begin a gesture on a cell. A start while another gesture is pending
    /// replaces it and discards any accumulated swipe displacement. Starts
    /// outside the grid are ignored.
    pub fn gesture_start(&mut self, board: &Board, index: usize) {
        let cell = match board.get(index) {
            Some(cell) => cell,
            None => return,
        };
        self.source = Some(CellGrab { index, cell });
        self.swipe_dx = 0;
        self.swipe_dy = 0;
    }

    /// Accumulate pointer displacement (display points) for swipe
    /// interpretation. Only meaningful while a gesture is pending.
    pub fn gesture_move(&mut self, dx: i32, dy: i32) {
        if self.source.is_some() {
            self.swipe_dx += dx;
            self.swipe_dy += dy;
        }
    }

    /// Finish the gesture. With a drop cell the swap targets it directly;
    /// without one the accumulated swipe picks a neighbor. Either way the
    /// pending state is discarded before returning.
    pub fn gesture_end(&mut self, board: &mut Board, drop: Option<usize>) -> SwapOutcome {
        let source = self.source.take();
        let (dx, dy) = (self.swipe_dx, self.swipe_dy);
        self.swipe_dx = 0;
        self.swipe_dy = 0;

        let source = match source {
            Some(grab) => grab,
            None => return self.resolve(SwapOutcome::Ignored),
        };

        let target_index = match drop {
            Some(index) if index < CELL_COUNT => index,
            Some(_) => return self.resolve(SwapOutcome::Ignored),
            None => match swipe_target(source.index, dx, dy) {
                Some(index) => index,
                None => return self.resolve(SwapOutcome::Ignored),
            },
        };

        let target = CellGrab {
            index: target_index,
            cell: match board.get(target_index) {
                Some(cell) => cell,
                None => return self.resolve(SwapOutcome::Ignored),
            },
        };

        let outcome = self.attempt_swap(board, source, target);
        self.last_attempt = Some((source.index, target.index));
        self.resolve(outcome)
    }

    /// Discard any pending gesture without touching the moves counter
    pub fn cancel_gesture(&mut self) {
        self.source = None;
        self.swipe_dx = 0;
        self.swipe_dy = 0;
    }

    /// Zero the moves counter and discard all gesture state
    pub fn reset(&mut self) {
        self.cancel_gesture();
        self.moves = 0;
        self.last_attempt = None;
        self.last_outcome = None;
    }

    /// The (source, target) of the most recent attempt, drained
    pub fn take_last_attempt(&mut self) -> Option<(usize, usize)> {
        self.last_attempt.take()
    }

    /// The outcome of the most recent gesture end, drained
    pub fn take_last_outcome(&mut self) -> Option<SwapOutcome> {
        self.last_outcome.take()
    }

    fn resolve(&mut self, outcome: SwapOutcome) -> SwapOutcome {
        self.last_outcome = Some(outcome);
        outcome
    }

    fn attempt_swap(&mut self, board: &mut Board, source: CellGrab, target: CellGrab) -> SwapOutcome {
        // Optimistic swap, then the full scan pass runs no matter what;
        // only the commit decision depends on adjacency.
        board.swap(source.index, target.index);
        let adjacent = is_adjacent(source.index, target.index);
        let matched = board.run_scans();

        if adjacent && matched {
            self.moves += 1;
            SwapOutcome::Committed
        } else {
            board.set(source.index, source.cell);
            board.set(target.index, target.cell);
            SwapOutcome::RolledBack
        }
    }
}

impl Default for MoveController {
    fn default() -> Self {
        Self::new()
    }
}

/// 4-directional adjacency by plain index arithmetic. Row edges wrap:
/// column 0 counts the previous row's column 7 as its left neighbor.
fn is_adjacent(source: usize, target: usize) -> bool {
    let s = source as isize;
    let t = target as isize;
    let w = BOARD_WIDTH as isize;
    t == s - 1 || t == s - w || t == s + 1 || t == s + w
}

/// Convert an accumulated swipe into an adjacent target: dominant axis
/// (horizontal on a tie) once its displacement reaches the threshold.
/// Targets outside the flat index range are discarded.
fn swipe_target(source: usize, dx: i32, dy: i32) -> Option<usize> {
    if dx.abs() < SWIPE_MIN_POINTS && dy.abs() < SWIPE_MIN_POINTS {
        return None;
    }
    let offset: isize = if dx.abs() >= dy.abs() {
        if dx > 0 {
            1
        } else {
            -1
        }
    } else if dy > 0 {
        BOARD_WIDTH as isize
    } else {
        -(BOARD_WIDTH as isize)
    };
    let target = source as isize + offset;
    if (0..CELL_COUNT as isize).contains(&target) {
        Some(target as usize)
    } else {
        None
    }
}
