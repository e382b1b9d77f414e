//! Input handler - terminal events to UI actions and board gestures
//!
//! Two front ends feed the same gesture protocol: the keyboard moves a
//! board cursor and grabs/drops cells, the mouse maps press/drag/release
//! directly onto gesture start/move/end. Mouse travel is converted to
//! swipe points so a drag that releases off the board still resolves as
//! a directional swipe.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::types::{BOARD_WIDTH, SWIPE_MIN_POINTS};

/// Which screen owns the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiScreen {
    Game,
    Leaderboard,
    Tournaments,
}

/// One decoded key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    NewGame,
    Reset,
    ShowLeaderboard,
    ShowTournaments,
    Back,
    /// Enter the active tournament (tournaments screen only)
    Join,
    CursorUp,
    CursorDown,
    CursorLeft,
    CursorRight,
    /// Grab the cell under the cursor, or drop onto it
    Grab,
    /// Discard a pending grab
    Cancel,
}

/// Map keyboard input to a UI action for the given screen.
pub fn map_key(key: KeyEvent, screen: UiScreen) -> Option<UiAction> {
    match screen {
        UiScreen::Game => match key.code {
            // Cursor movement: arrows, vim keys, wasd.
            KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') | KeyCode::Char('w')
            | KeyCode::Char('W') => Some(UiAction::CursorUp),
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') | KeyCode::Char('s')
            | KeyCode::Char('S') => Some(UiAction::CursorDown),
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('a')
            | KeyCode::Char('A') => Some(UiAction::CursorLeft),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L') | KeyCode::Char('d')
            | KeyCode::Char('D') => Some(UiAction::CursorRight),

            KeyCode::Char(' ') | KeyCode::Enter => Some(UiAction::Grab),
            KeyCode::Esc => Some(UiAction::Cancel),

            KeyCode::Char('n') | KeyCode::Char('N') => Some(UiAction::NewGame),
            KeyCode::Char('r') | KeyCode::Char('R') => Some(UiAction::Reset),
            KeyCode::Char('b') | KeyCode::Char('B') => Some(UiAction::ShowLeaderboard),
            KeyCode::Char('t') | KeyCode::Char('T') => Some(UiAction::ShowTournaments),

            _ => None,
        },
        UiScreen::Leaderboard => match key.code {
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') | KeyCode::Char('B') => {
                Some(UiAction::Back)
            }
            KeyCode::Char('t') | KeyCode::Char('T') => Some(UiAction::ShowTournaments),
            KeyCode::Char('n') | KeyCode::Char('N') => Some(UiAction::NewGame),
            _ => None,
        },
        UiScreen::Tournaments => match key.code {
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('t') | KeyCode::Char('T') => {
                Some(UiAction::Back)
            }
            KeyCode::Char('b') | KeyCode::Char('B') => Some(UiAction::ShowLeaderboard),
            KeyCode::Char('j') | KeyCode::Char('J') => Some(UiAction::Join),
            KeyCode::Char('n') | KeyCode::Char('N') => Some(UiAction::NewGame),
            _ => None,
        },
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Move the keyboard cursor one cell, clamped at the board edges. The
/// UI cursor never wraps; only the swap adjacency rule does.
pub fn step_cursor(index: usize, action: UiAction) -> usize {
    let row = index / BOARD_WIDTH;
    let col = index % BOARD_WIDTH;
    let (row, col) = match action {
        UiAction::CursorUp => (row.saturating_sub(1), col),
        UiAction::CursorDown => ((row + 1).min(BOARD_WIDTH - 1), col),
        UiAction::CursorLeft => (row, col.saturating_sub(1)),
        UiAction::CursorRight => (row, (col + 1).min(BOARD_WIDTH - 1)),
        _ => (row, col),
    };
    row * BOARD_WIDTH + col
}

/// Swipe points credited per terminal column / row of mouse travel.
/// A board cell is two columns wide and one row tall, so one cell of
/// travel meets the swipe threshold on either axis.
pub const POINTS_PER_COLUMN: i32 = SWIPE_MIN_POINTS / 2;
pub const POINTS_PER_ROW: i32 = SWIPE_MIN_POINTS;

/// One synthesized board gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Start(usize),
    Move { dx: i32, dy: i32 },
    End(Option<usize>),
}

/// Turns mouse press/drag/release into gestures. Hit-testing from
/// screen position to board cell is the caller's job (the view owns the
/// layout); the tracker owns press state and travel accounting.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    /// Live press that began on a board cell
    dragging: bool,
    last_col: u16,
    last_row: u16,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Button press. Only presses landing on a board cell begin a
    /// gesture; presses elsewhere are swallowed.
    pub fn press(&mut self, cell: Option<usize>, col: u16, row: u16) -> Option<Gesture> {
        self.last_col = col;
        self.last_row = row;
        match cell {
            Some(index) => {
                self.dragging = true;
                Some(Gesture::Start(index))
            }
            None => {
                self.dragging = false;
                None
            }
        }
    }

    /// Pointer travel while pressed, converted to swipe points
    pub fn drag(&mut self, col: u16, row: u16) -> Option<Gesture> {
        if !self.dragging {
            return None;
        }
        let dx = (col as i32 - self.last_col as i32) * POINTS_PER_COLUMN;
        let dy = (row as i32 - self.last_row as i32) * POINTS_PER_ROW;
        self.last_col = col;
        self.last_row = row;
        if dx == 0 && dy == 0 {
            None
        } else {
            Some(Gesture::Move { dx, dy })
        }
    }

    /// Button release: the drop cell decides the swap when the pointer
    /// is over one, otherwise the accumulated swipe does.
    pub fn release(&mut self, cell: Option<usize>) -> Option<Gesture> {
        if !self.dragging {
            return None;
        }
        self.dragging = false;
        Some(Gesture::End(cell))
    }

    /// Forget any live press (screen change, reset)
    pub fn cancel(&mut self) {
        self.dragging = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn test_game_screen_cursor_keys() {
        for (code, action) in [
            (KeyCode::Up, UiAction::CursorUp),
            (KeyCode::Char('k'), UiAction::CursorUp),
            (KeyCode::Char('w'), UiAction::CursorUp),
            (KeyCode::Down, UiAction::CursorDown),
            (KeyCode::Char('J'), UiAction::CursorDown),
            (KeyCode::Left, UiAction::CursorLeft),
            (KeyCode::Char('a'), UiAction::CursorLeft),
            (KeyCode::Right, UiAction::CursorRight),
            (KeyCode::Char('L'), UiAction::CursorRight),
        ] {
            assert_eq!(
                map_key(KeyEvent::from(code), UiScreen::Game),
                Some(action),
                "key {:?}",
                code
            );
        }
    }

    #[test]
    fn test_game_screen_session_keys() {
        assert_eq!(
            map_key(KeyEvent::from(KeyCode::Char(' ')), UiScreen::Game),
            Some(UiAction::Grab)
        );
        assert_eq!(
            map_key(KeyEvent::from(KeyCode::Enter), UiScreen::Game),
            Some(UiAction::Grab)
        );
        assert_eq!(
            map_key(KeyEvent::from(KeyCode::Esc), UiScreen::Game),
            Some(UiAction::Cancel)
        );
        assert_eq!(
            map_key(KeyEvent::from(KeyCode::Char('n')), UiScreen::Game),
            Some(UiAction::NewGame)
        );
        assert_eq!(
            map_key(KeyEvent::from(KeyCode::Char('b')), UiScreen::Game),
            Some(UiAction::ShowLeaderboard)
        );
        assert_eq!(
            map_key(KeyEvent::from(KeyCode::Char('t')), UiScreen::Game),
            Some(UiAction::ShowTournaments)
        );
    }

    #[test]
    fn test_menu_screens_toggle_back() {
        assert_eq!(
            map_key(KeyEvent::from(KeyCode::Char('b')), UiScreen::Leaderboard),
            Some(UiAction::Back)
        );
        assert_eq!(
            map_key(KeyEvent::from(KeyCode::Char('t')), UiScreen::Leaderboard),
            Some(UiAction::ShowTournaments)
        );
        assert_eq!(
            map_key(KeyEvent::from(KeyCode::Char('t')), UiScreen::Tournaments),
            Some(UiAction::Back)
        );
        assert_eq!(
            map_key(KeyEvent::from(KeyCode::Esc), UiScreen::Tournaments),
            Some(UiAction::Back)
        );
    }

    #[test]
    fn test_join_only_on_tournaments_screen() {
        assert_eq!(
            map_key(KeyEvent::from(KeyCode::Char('j')), UiScreen::Tournaments),
            Some(UiAction::Join)
        );
        // On the game screen the same key moves the cursor.
        assert_eq!(
            map_key(KeyEvent::from(KeyCode::Char('j')), UiScreen::Game),
            Some(UiAction::CursorDown)
        );
    }

    #[test]
    fn test_quit_keys() {
        assert!(should_quit(KeyEvent::from(KeyCode::Char('q'))));
        assert!(should_quit(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!should_quit(KeyEvent::from(KeyCode::Char('x'))));
    }

    #[test]
    fn test_cursor_steps_and_clamps() {
        assert_eq!(step_cursor(0, UiAction::CursorRight), 1);
        assert_eq!(step_cursor(9, UiAction::CursorDown), 17);
        assert_eq!(step_cursor(9, UiAction::CursorUp), 1);
        assert_eq!(step_cursor(9, UiAction::CursorLeft), 8);

        // Edges clamp instead of wrapping.
        assert_eq!(step_cursor(0, UiAction::CursorLeft), 0);
        assert_eq!(step_cursor(0, UiAction::CursorUp), 0);
        assert_eq!(step_cursor(7, UiAction::CursorRight), 7);
        assert_eq!(step_cursor(63, UiAction::CursorDown), 63);

        // Non-cursor actions leave the cursor alone.
        assert_eq!(step_cursor(12, UiAction::Grab), 12);
    }

    #[test]
    fn test_press_on_board_starts_a_gesture() {
        let mut tracker = PointerTracker::new();
        assert_eq!(tracker.press(Some(12), 10, 5), Some(Gesture::Start(12)));
        assert!(tracker.is_dragging());
    }

    #[test]
    fn test_press_off_board_is_swallowed() {
        let mut tracker = PointerTracker::new();
        assert_eq!(tracker.press(None, 0, 0), None);
        assert!(!tracker.is_dragging());
        assert_eq!(tracker.drag(5, 5), None);
        assert_eq!(tracker.release(Some(3)), None);
    }

    #[test]
    fn test_drag_converts_cells_to_points() {
        let mut tracker = PointerTracker::new();
        tracker.press(Some(12), 10, 5);

        // Two columns right and one row down: one cell each way.
        assert_eq!(
            tracker.drag(12, 6),
            Some(Gesture::Move {
                dx: 2 * POINTS_PER_COLUMN,
                dy: POINTS_PER_ROW
            })
        );
        // Deltas accumulate from the last position, not the press.
        assert_eq!(
            tracker.drag(11, 6),
            Some(Gesture::Move {
                dx: -POINTS_PER_COLUMN,
                dy: 0
            })
        );
        // No travel, no gesture.
        assert_eq!(tracker.drag(11, 6), None);
    }

    #[test]
    fn test_one_cell_of_travel_meets_the_swipe_threshold() {
        assert_eq!(2 * POINTS_PER_COLUMN, SWIPE_MIN_POINTS);
        assert_eq!(POINTS_PER_ROW, SWIPE_MIN_POINTS);
    }

    #[test]
    fn test_release_ends_with_drop_cell_or_none() {
        let mut tracker = PointerTracker::new();
        tracker.press(Some(12), 10, 5);
        assert_eq!(tracker.release(Some(13)), Some(Gesture::End(Some(13))));
        assert!(!tracker.is_dragging());

        tracker.press(Some(12), 10, 5);
        tracker.drag(14, 5);
        assert_eq!(tracker.release(None), Some(Gesture::End(None)));
    }

    #[test]
    fn test_cancel_forgets_the_press() {
        let mut tracker = PointerTracker::new();
        tracker.press(Some(12), 10, 5);
        tracker.cancel();
        assert_eq!(tracker.release(Some(13)), None);
    }
}
