//! Session driver - runs a timed round on an injectable clock
//!
//! Ties the board, move controller, and RNG together. `tick(elapsed_ms)`
//! advances the countdown and fires one settling step per cadence interval
//! (stretched in low-power mode). Animation tags are stamped from the
//! board's drained events as steps and swaps happen.
//!
//! The session clock keeps advancing after the round ends so that live
//! tags still expire; the countdown and the board cadence run only while
//! the round is active.

use crate::core::moves::{MoveController, SwapOutcome};
use crate::core::rng::SimpleRng;
use crate::core::snapshot::{GameSnapshot, TagMap};
use crate::core::Board;
use crate::types::{
    CellTag, GamePhase, GAME_DURATION_MS, LOW_POWER_TICK_MS, TICK_MS, TOKEN_CONVERSION_RATE,
};

/// Final numbers of a finished round, consumed once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameReport {
    pub score: u32,
    pub moves: u32,
    pub tokens: u32,
    pub duration_ms: u64,
}

/// Complete state of one play session
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    controller: MoveController,
    rng: SimpleRng,
    tags: TagMap,
    phase: GamePhase,
    /// Monotonic session time in milliseconds (never reset)
    clock_ms: u64,
    time_left_ms: u64,
    step_timer_ms: u64,
    base_tick_ms: u64,
    low_power: bool,
    /// Points of the most recent cleared run, for the score popup
    last_points: Option<u32>,
    report: Option<GameReport>,
}

impl GameSession {
    /// Create an idle session with the given RNG seed
    pub fn new(seed: u32) -> Self {
        Self {
            board: Board::new(),
            controller: MoveController::new(),
            rng: SimpleRng::new(seed),
            tags: TagMap::new(),
            phase: GamePhase::NotStarted,
            clock_ms: 0,
            time_left_ms: GAME_DURATION_MS,
            step_timer_ms: 0,
            base_tick_ms: TICK_MS,
            low_power: false,
            last_points: None,
            report: None,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.board.score()
    }

    pub fn moves(&self) -> u32 {
        self.controller.moves()
    }

    /// Earned tokens at the fixed conversion rate (floor division)
    pub fn tokens(&self) -> u32 {
        self.board.score() / TOKEN_CONVERSION_RATE
    }

    pub fn time_left_ms(&self) -> u64 {
        self.time_left_ms
    }

    /// Current state of the RNG, exported for replays
    pub fn seed(&self) -> u32 {
        self.rng.seed()
    }

    pub fn low_power(&self) -> bool {
        self.low_power
    }

    /// Stretch or restore the settle cadence. Takes effect on the next tick.
    pub fn set_low_power(&mut self, low_power: bool) {
        self.low_power = low_power;
    }

    /// Override the base settle cadence (zero is clamped to 1ms)
    pub fn set_step_interval_ms(&mut self, ms: u64) {
        self.base_tick_ms = ms.max(1);
    }

    /// Effective cadence: low-power mode stretches the base, never
    /// shortens it.
    pub fn step_interval_ms(&self) -> u64 {
        if self.low_power {
            self.base_tick_ms.max(LOW_POWER_TICK_MS)
        } else {
            self.base_tick_ms
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Index of the grabbed cell while a drag is pending
    pub fn grab(&self) -> Option<usize> {
        self.controller.grab()
    }

    #[cfg(test)]
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Deal a fresh board and arm the countdown. No-op while a round is
    /// already running.
    pub fn start(&mut self) {
        if self.phase == GamePhase::Active {
            return;
        }
        self.board.reset(&mut self.rng);
        self.controller.reset();
        self.tags.clear();
        self.time_left_ms = GAME_DURATION_MS;
        self.step_timer_ms = 0;
        self.last_points = None;
        self.report = None;
        self.phase = GamePhase::Active;
    }

    /// End the round now, keeping whatever was scored so far
    pub fn stop(&mut self) {
        if self.phase == GamePhase::Active {
            self.finish();
        }
    }

    /// Back to the idle state with an empty board. The RNG keeps its
    /// state across rounds so replays reseed naturally.
    pub fn reset(&mut self) {
        self.board = Board::new();
        self.controller.reset();
        self.tags.clear();
        self.phase = GamePhase::NotStarted;
        self.time_left_ms = GAME_DURATION_MS;
        self.step_timer_ms = 0;
        self.last_points = None;
        self.report = None;
    }

    /// Advance the session by `elapsed_ms`. Returns whether the board
    /// changed (the countdown alone does not count).
    pub fn tick(&mut self, elapsed_ms: u64) -> bool {
        self.clock_ms += elapsed_ms;
        if self.phase != GamePhase::Active {
            return false;
        }

        self.time_left_ms = self.time_left_ms.saturating_sub(elapsed_ms);
        if self.time_left_ms == 0 {
            self.finish();
            return true;
        }

        self.step_timer_ms += elapsed_ms;
        if self.step_timer_ms >= self.step_interval_ms() {
            self.step_timer_ms = 0;
            let stepped = self.board.step(&mut self.rng);
            self.drain_board_events();
            return stepped;
        }

        false
    }

    /// Begin a gesture on a cell. Ignored outside an active round.
    pub fn gesture_start(&mut self, index: usize) {
        if self.phase != GamePhase::Active {
            return;
        }
        self.controller.gesture_start(&self.board, index);
    }

    /// Accumulate pointer displacement for swipe interpretation
    pub fn gesture_move(&mut self, dx: i32, dy: i32) {
        if self.phase != GamePhase::Active {
            return;
        }
        self.controller.gesture_move(dx, dy);
    }

    /// Finish a gesture, with an explicit drop cell or by swipe. Scan side
    /// effects from the attempt are drained into tags before returning.
    pub fn gesture_end(&mut self, drop: Option<usize>) -> SwapOutcome {
        if self.phase != GamePhase::Active {
            return SwapOutcome::Ignored;
        }
        let outcome = self.controller.gesture_end(&mut self.board, drop);
        self.drain_board_events();
        if let Some((_, target)) = self.controller.take_last_attempt() {
            if outcome == SwapOutcome::Committed {
                self.tags.stamp(target, CellTag::DropTarget, self.clock_ms);
            }
        }
        outcome
    }

    /// Discard a pending gesture without attempting a swap
    pub fn cancel_gesture(&mut self) {
        self.controller.cancel_gesture();
    }

    /// The report of the finished round, at most once
    pub fn take_report(&mut self) -> Option<GameReport> {
        self.report.take()
    }

    /// Copy the current state into a render snapshot without allocating
    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.cells.copy_from_slice(self.board.cells());
        self.tags.fill_into(self.clock_ms, &mut out.tags);
        out.phase = self.phase;
        out.score = self.board.score();
        out.moves = self.controller.moves();
        out.tokens = self.tokens();
        out.time_left_ms = self.time_left_ms;
        out.seed = self.rng.seed();
        out.last_points = self.last_points;
        out.animating = self.tags.any_active(self.clock_ms)
            || (self.phase == GamePhase::Active && !self.board.is_fully_populated());
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut out = GameSnapshot::default();
        self.snapshot_into(&mut out);
        out
    }

    fn finish(&mut self) {
        self.controller.cancel_gesture();
        self.report = Some(GameReport {
            score: self.board.score(),
            moves: self.controller.moves(),
            tokens: self.tokens(),
            duration_ms: GAME_DURATION_MS - self.time_left_ms,
        });
        self.phase = GamePhase::Over;
    }

    /// Move the board's pending events into animation tags
    fn drain_board_events(&mut self) {
        let events = self.board.take_events();
        if events.is_empty() {
            return;
        }
        let gained: u32 = events.hits.iter().map(|hit| hit.points).sum();
        if gained > 0 {
            self.last_points = Some(gained);
        }
        for &index in &events.cleared {
            self.tags.stamp(index, CellTag::Matching, self.clock_ms);
        }
        for &index in &events.landed {
            self.tags.stamp(index, CellTag::Falling, self.clock_ms);
        }
        for &index in &events.spawned {
            self.tags.stamp(index, CellTag::Spawning, self.clock_ms);
        }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Candy, CELL_COUNT, POINTS_PER_THREE, TAG_TTL_MS};

    #[test]
    fn test_new_session_is_idle() {
        let mut session = GameSession::new(12345);

        assert_eq!(session.phase(), GamePhase::NotStarted);
        assert_eq!(session.score(), 0);
        assert_eq!(session.moves(), 0);
        assert_eq!(session.tokens(), 0);
        assert_eq!(session.time_left_ms(), GAME_DURATION_MS);
        assert!(session.board().cells().iter().all(|c| c.is_none()));
        assert!(session.take_report().is_none());
    }

    #[test]
    fn test_start_deals_a_full_board() {
        let mut session = GameSession::new(12345);
        session.start();

        assert_eq!(session.phase(), GamePhase::Active);
        assert!(session.board().is_fully_populated());
        assert_eq!(session.time_left_ms(), GAME_DURATION_MS);

        let snapshot = session.snapshot();
        assert!(
            snapshot.tags.iter().all(|tag| tag.is_none()),
            "dealing must not leave stale tags"
        );
    }

    #[test]
    fn test_start_is_a_no_op_while_active() {
        let mut session = GameSession::new(12345);
        session.start();
        session.tick(5_000);
        let time_before = session.time_left_ms();

        session.start();
        assert_eq!(session.time_left_ms(), time_before);
    }

    #[test]
    fn test_tick_before_start_does_nothing() {
        let mut session = GameSession::new(12345);

        assert!(!session.tick(1_000));
        assert_eq!(session.phase(), GamePhase::NotStarted);
        assert_eq!(session.time_left_ms(), GAME_DURATION_MS);
        assert!(session.board().cells().iter().all(|c| c.is_none()));
    }

    #[test]
    fn test_step_fires_on_cadence() {
        let mut session = GameSession::new(9);
        session.start();
        *session.board_mut() = Board::without_matches();
        session.board_mut().cells_mut()[0] = None;

        assert!(!session.tick(TICK_MS - 1), "one short of the cadence");
        assert!(session.tick(1), "cadence reached, spawn expected");

        let snapshot = session.snapshot();
        assert!(snapshot.cells[0].is_some());
        assert_eq!(snapshot.tags[0], Some(CellTag::Spawning));
    }

    #[test]
    fn test_low_power_stretches_cadence() {
        let mut session = GameSession::new(9);
        session.set_low_power(true);
        session.start();
        *session.board_mut() = Board::without_matches();
        session.board_mut().cells_mut()[0] = None;

        assert!(!session.tick(TICK_MS), "normal cadence must not fire");
        assert!(session.tick(LOW_POWER_TICK_MS - TICK_MS));
    }

    #[test]
    fn test_custom_cadence_overrides_the_base() {
        let mut session = GameSession::new(9);
        session.set_step_interval_ms(40);
        assert_eq!(session.step_interval_ms(), 40);

        session.start();
        *session.board_mut() = Board::without_matches();
        session.board_mut().cells_mut()[0] = None;
        assert!(!session.tick(39));
        assert!(session.tick(1));

        // Low power stretches a short base but never shortens a long one.
        session.set_low_power(true);
        assert_eq!(session.step_interval_ms(), LOW_POWER_TICK_MS);
        session.set_step_interval_ms(LOW_POWER_TICK_MS + 50);
        assert_eq!(session.step_interval_ms(), LOW_POWER_TICK_MS + 50);
    }

    #[test]
    fn test_stable_board_tick_reports_no_change() {
        let mut session = GameSession::new(9);
        session.start();
        *session.board_mut() = Board::without_matches();

        assert!(!session.tick(TICK_MS));
    }

    #[test]
    fn test_countdown_finishes_the_round() {
        let mut session = GameSession::new(12345);
        session.start();

        for _ in 0..6 {
            session.tick(10_000);
        }

        assert_eq!(session.phase(), GamePhase::Over);
        let report = session.take_report().unwrap();
        assert_eq!(report.duration_ms, GAME_DURATION_MS);
        assert_eq!(report.score, session.score());
        assert_eq!(report.tokens, report.score / TOKEN_CONVERSION_RATE);
        assert!(session.take_report().is_none(), "report is consumed once");
    }

    #[test]
    fn test_stop_ends_early_with_partial_duration() {
        let mut session = GameSession::new(12345);
        session.start();
        session.tick(5_000);

        session.stop();
        assert_eq!(session.phase(), GamePhase::Over);
        let report = session.take_report().unwrap();
        assert_eq!(report.duration_ms, 5_000);
    }

    #[test]
    fn test_ticks_after_the_round_change_nothing() {
        let mut session = GameSession::new(12345);
        session.start();
        session.stop();

        let cells_before: Vec<_> = session.board().cells().to_vec();
        assert!(!session.tick(10_000));
        assert_eq!(session.board().cells(), cells_before.as_slice());
        assert_eq!(session.phase(), GamePhase::Over);
    }

    #[test]
    fn test_gestures_ignored_when_not_active() {
        let mut session = GameSession::new(12345);

        session.gesture_start(0);
        assert_eq!(session.gesture_end(Some(1)), SwapOutcome::Ignored);
        assert_eq!(session.moves(), 0);

        session.start();
        session.stop();
        session.gesture_start(0);
        assert_eq!(session.gesture_end(Some(1)), SwapOutcome::Ignored);
        assert_eq!(session.moves(), 0);
    }

    #[test]
    fn test_committed_swap_scores_and_stamps_tags() {
        let mut session = GameSession::new(12345);
        session.start();
        let mut board = Board::without_matches();
        {
            let cells = board.cells_mut();
            // Reds at (0,0) and (1,0); a third red at (2,1) one swap away.
            cells[0] = Some(Candy::Red);
            cells[8] = Some(Candy::Red);
            cells[17] = Some(Candy::Red);
        }
        *session.board_mut() = board;

        session.gesture_start(17);
        assert_eq!(session.gesture_end(Some(16)), SwapOutcome::Committed);

        assert_eq!(session.moves(), 1);
        assert_eq!(session.score(), POINTS_PER_THREE);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.tags[0], Some(CellTag::Matching));
        assert_eq!(snapshot.tags[8], Some(CellTag::Matching));
        assert_eq!(snapshot.tags[16], Some(CellTag::Matching));
        assert_eq!(snapshot.last_points, Some(POINTS_PER_THREE));
        assert!(snapshot.animating, "cleared cells leave the board settling");
    }

    #[test]
    fn test_tags_expire_after_the_round() {
        let mut session = GameSession::new(9);
        session.start();
        *session.board_mut() = Board::without_matches();
        session.board_mut().cells_mut()[0] = None;
        session.tick(TICK_MS);
        assert_eq!(session.snapshot().tags[0], Some(CellTag::Spawning));

        session.stop();
        session.tick(TAG_TTL_MS);
        assert!(session.snapshot().tags.iter().all(|tag| tag.is_none()));
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut session = GameSession::new(12345);
        session.start();
        session.tick(10_000);
        session.stop();

        session.reset();
        assert_eq!(session.phase(), GamePhase::NotStarted);
        assert_eq!(session.score(), 0);
        assert_eq!(session.moves(), 0);
        assert_eq!(session.time_left_ms(), GAME_DURATION_MS);
        assert!(session.board().cells().iter().all(|c| c.is_none()));
        assert!(session.take_report().is_none());
    }

    #[test]
    fn test_rounds_reseed_from_rng_state() {
        let mut session = GameSession::new(12345);
        session.start();
        let first_deal: Vec<_> = session.board().cells().to_vec();
        session.stop();

        session.reset();
        session.start();
        assert_ne!(
            session.board().cells(),
            first_deal.as_slice(),
            "second deal must continue the RNG sequence"
        );
    }

    #[test]
    fn test_snapshot_mirrors_session_counters() {
        let mut session = GameSession::new(777);
        session.start();
        session.tick(1_000);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, GamePhase::Active);
        assert_eq!(snapshot.score, session.score());
        assert_eq!(snapshot.moves, session.moves());
        assert_eq!(snapshot.tokens, session.tokens());
        assert_eq!(snapshot.time_left_ms, session.time_left_ms());
        assert_eq!(snapshot.seed, session.seed());
        assert_eq!(snapshot.cells.len(), CELL_COUNT);
    }

    #[test]
    fn test_grab_is_visible_while_dragging() {
        let mut session = GameSession::new(12345);
        session.start();

        assert_eq!(session.grab(), None);
        session.gesture_start(10);
        assert_eq!(session.grab(), Some(10));
        session.cancel_gesture();
        assert_eq!(session.grab(), None);
    }
}
