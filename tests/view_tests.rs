//! View tests - frame gating and framebuffer rendering of every screen

use chain_crush::chain::{ConnectionStatus, LeaderRow};
use chain_crush::core::{GameSession, GameSnapshot};
use chain_crush::term::{FrameBuffer, FrameGate, GameScreenModel, GameView, Viewport};
use chain_crush::tournament::{Tournament, TournamentEntry, TournamentStatus};
use chain_crush::types::GamePhase;

fn fb_text(fb: &FrameBuffer) -> String {
    let mut out = String::new();
    for y in 0..fb.height() {
        for glyph in fb.row(y) {
            out.push(glyph.ch);
        }
        out.push('\n');
    }
    out
}

fn model<'a>(
    snapshot: &'a GameSnapshot,
    connection: &'a ConnectionStatus,
) -> GameScreenModel<'a> {
    GameScreenModel {
        snapshot,
        cursor: 0,
        grab: None,
        player: "ada",
        connection,
        balance: None,
        tournament: None,
    }
}

#[test]
fn test_first_frame_always_draws() {
    let mut gate = FrameGate::new(250);
    assert!(gate.should_draw(0, 1, false));
}

#[test]
fn test_static_frames_throttle_to_the_idle_interval() {
    let mut gate = FrameGate::new(250);
    assert!(gate.should_draw(0, 1, false));
    assert!(!gate.should_draw(10, 1, false));
    assert!(!gate.should_draw(249, 1, false));
    assert!(gate.should_draw(250, 1, false));
    assert!(!gate.should_draw(260, 1, false));
}

#[test]
fn test_fingerprint_change_draws_immediately() {
    let mut gate = FrameGate::new(250);
    assert!(gate.should_draw(0, 1, false));
    assert!(gate.should_draw(10, 2, false));
    assert!(!gate.should_draw(20, 2, false));
    // The draw at 10 restarted the idle clock.
    assert!(!gate.should_draw(259, 2, false));
    assert!(gate.should_draw(260, 2, false));
}

#[test]
fn test_animating_frames_always_draw() {
    let mut gate = FrameGate::new(250);
    assert!(gate.should_draw(0, 1, false));
    assert!(gate.should_draw(1, 1, true));
    assert!(gate.should_draw(2, 1, true));
    // Settling back to static, the frame at 3 has nothing new to show.
    assert!(!gate.should_draw(3, 1, false));
}

#[test]
fn test_board_frame_corners_on_the_exact_viewport() {
    let session = GameSession::new(1);
    let snapshot = session.snapshot();
    let connection = ConnectionStatus::Offline;

    let view = GameView::default();
    let mut fb = FrameBuffer::new(1, 1);
    // 8 cells x 2 columns + border on each side.
    let viewport = Viewport::new(18, 10);
    view.render_game(&mut fb, viewport, &model(&snapshot, &connection));

    assert_eq!(fb.get(0, 0).unwrap().ch, '┌');
    assert_eq!(fb.get(17, 0).unwrap().ch, '┐');
    assert_eq!(fb.get(0, 9).unwrap().ch, '└');
    assert_eq!(fb.get(17, 9).unwrap().ch, '┘');
    assert_eq!(fb.get(1, 0).unwrap().ch, '─');
    assert_eq!(fb.get(0, 1).unwrap().ch, '│');
}

#[test]
fn test_cells_paint_two_columns_wide() {
    let mut session = GameSession::new(7);
    session.start();
    let snapshot = session.snapshot();
    let connection = ConnectionStatus::Offline;

    let view = GameView::default();
    let mut fb = FrameBuffer::new(1, 1);
    view.render_game(
        &mut fb,
        Viewport::new(18, 10),
        &model(&snapshot, &connection),
    );

    // Every glyph of the top board row is a filled candy block.
    for x in 1..17 {
        assert_eq!(fb.get(x, 1).unwrap().ch, '█', "column {}", x);
    }
    // Both glyphs of one cell share a color; neighbors may differ.
    let left = fb.get(1, 1).unwrap().style.fg;
    let right = fb.get(2, 1).unwrap().style.fg;
    assert_eq!(left, right);
}

#[test]
fn test_side_panel_reports_identity_and_stats() {
    let mut session = GameSession::new(7);
    session.start();
    let snapshot = session.snapshot();
    let connection = ConnectionStatus::Ready;

    let view = GameView::default();
    let mut fb = FrameBuffer::new(1, 1);
    let screen_model = GameScreenModel {
        snapshot: &snapshot,
        cursor: 0,
        grab: None,
        player: "ada",
        connection: &connection,
        balance: Some(12),
        tournament: Some("weekly"),
    };
    view.render_game(&mut fb, Viewport::new(80, 24), &screen_model);

    let text = fb_text(&fb);
    assert!(text.contains("PLAYER"));
    assert!(text.contains("ada"));
    assert!(text.contains("SCORE"));
    assert!(text.contains("TOKENS"));
    assert!(text.contains("(bank 12)"));
    assert!(text.contains("MOVES"));
    assert!(text.contains("TIME"));
    assert!(text.contains("60.0s"));
    assert!(text.contains("CHAIN"));
    assert!(text.contains("READY"));
    assert!(text.contains("TOURNEY"));
    assert!(text.contains("weekly"));
    assert!(text.contains("q quit"));
}

#[test]
fn test_idle_overlay_invites_a_game() {
    let session = GameSession::new(1);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, GamePhase::NotStarted);
    let connection = ConnectionStatus::Offline;

    let view = GameView::default();
    let mut fb = FrameBuffer::new(1, 1);
    view.render_game(
        &mut fb,
        Viewport::new(80, 24),
        &model(&snapshot, &connection),
    );

    let text = fb_text(&fb);
    assert!(text.contains("CHAIN CRUSH"));
    assert!(text.contains("press N to play"));
}

#[test]
fn test_game_over_overlay_reports_the_round() {
    let mut session = GameSession::new(3);
    session.start();
    session.tick(1_000);
    session.stop();
    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, GamePhase::Over);
    let connection = ConnectionStatus::Offline;

    let view = GameView::default();
    let mut fb = FrameBuffer::new(1, 1);
    view.render_game(
        &mut fb,
        Viewport::new(80, 24),
        &model(&snapshot, &connection),
    );

    let text = fb_text(&fb);
    assert!(text.contains("GAME OVER"));
    assert!(text.contains(&format!("score {}", snapshot.score)));
    assert!(text.contains("press N to play again"));
}

#[test]
fn test_leaderboard_screen_lists_rows_in_rank_order() {
    let rows = vec![
        LeaderRow {
            player: "ada".to_string(),
            score: 310,
            tokens: 31,
        },
        LeaderRow {
            player: "bob".to_string(),
            score: 120,
            tokens: 12,
        },
    ];

    let view = GameView::default();
    let mut fb = FrameBuffer::new(1, 1);
    view.render_leaderboard(&mut fb, Viewport::new(80, 24), &rows, "CHAIN");

    let text = fb_text(&fb);
    assert!(text.contains("LEADERBOARD"));
    assert!(text.contains("CHAIN"));
    assert!(text.contains("#  PLAYER"));
    assert!(text.contains("ada"));
    assert!(text.contains("310"));
    assert!(text.contains("bob"));
    let ada_at = text.find("ada").unwrap();
    let bob_at = text.find("bob").unwrap();
    assert!(ada_at < bob_at, "rank order is top-down");
}

#[test]
fn test_tournaments_screen_shows_standings_and_hints() {
    let tournament = Tournament {
        id: 1,
        name: "weekly".to_string(),
        start_ms: 0,
        end_ms: 45_000,
        created_by: "admin".to_string(),
        status: TournamentStatus::Active,
        participants: vec!["ada".to_string()],
        entries: vec![TournamentEntry {
            username: "ada".to_string(),
            score: 90,
            moves: 9,
            submitted_at_ms: 10,
        }],
    };

    let view = GameView::default();
    let mut fb = FrameBuffer::new(1, 1);
    view.render_tournaments(&mut fb, Viewport::new(80, 24), &[tournament], "ada", 0);

    let text = fb_text(&fb);
    assert!(text.contains("TOURNAMENTS"));
    assert!(text.contains("* weekly"), "joined marker precedes the name");
    assert!(text.contains("ACTIVE"));
    assert!(text.contains("1 players, 1 entries, 45s left"));
    assert!(text.contains("1. ada"));
    assert!(text.contains("j join active"));
}

#[test]
fn test_empty_tournaments_screen_says_so() {
    let view = GameView::default();
    let mut fb = FrameBuffer::new(1, 1);
    view.render_tournaments(&mut fb, Viewport::new(80, 24), &[], "ada", 0);
    assert!(fb_text(&fb).contains("nothing scheduled"));
}

#[test]
fn test_tiny_viewports_render_without_panicking() {
    let mut session = GameSession::new(2);
    session.start();
    let snapshot = session.snapshot();
    let connection = ConnectionStatus::Offline;

    let view = GameView::default();
    let mut fb = FrameBuffer::new(1, 1);
    let viewport = Viewport::new(10, 5);

    view.render_game(&mut fb, viewport, &model(&snapshot, &connection));
    assert_eq!((fb.width(), fb.height()), (10, 5));

    view.render_leaderboard(&mut fb, viewport, &[], "LOCAL");
    view.render_tournaments(&mut fb, viewport, &[], "ada", 0);
    assert_eq!((fb.width(), fb.height()), (10, 5));
}

#[test]
fn test_hit_test_round_trips_on_the_exact_viewport() {
    let view = GameView::default();
    let viewport = Viewport::new(18, 10);

    assert_eq!(view.hit_test(viewport, 1, 1), Some(0));
    assert_eq!(view.hit_test(viewport, 2, 1), Some(0));
    assert_eq!(view.hit_test(viewport, 16, 8), Some(63));
    // Border glyphs and the far edge miss.
    assert_eq!(view.hit_test(viewport, 0, 0), None);
    assert_eq!(view.hit_test(viewport, 17, 1), None);
    assert_eq!(view.hit_test(viewport, 1, 9), None);
}
