//! GameView: maps game snapshots and menu data into a framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::chain::{ConnectionStatus, LeaderRow};
use crate::core::GameSnapshot;
use crate::term::screen::{FrameBuffer, Glyph, GlyphStyle, Rgb};
use crate::tournament::{Tournament, TournamentStatus};
use crate::types::{Candy, CellTag, GamePhase, BOARD_WIDTH};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Everything the game screen shows besides the snapshot itself.
pub struct GameScreenModel<'a> {
    pub snapshot: &'a GameSnapshot,
    /// Keyboard cursor cell
    pub cursor: usize,
    /// Cell held by a live grab, if any
    pub grab: Option<usize>,
    pub player: &'a str,
    pub connection: &'a ConnectionStatus,
    /// Token balance reported by the ledger, when known
    pub balance: Option<u64>,
    /// Name of the tournament the player is competing in
    pub tournament: Option<&'a str>,
}

/// A lightweight terminal renderer for the candy board and menus.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self {
            cell_w: 2,
            cell_h: 1,
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
        }
    }

    fn frame_size(&self) -> (u16, u16) {
        let board_px_w = (BOARD_WIDTH as u16) * self.cell_w;
        let board_px_h = (BOARD_WIDTH as u16) * self.cell_h;
        (board_px_w + 2, board_px_h + 2)
    }

    /// Top-left of the board frame, centered in the viewport.
    fn board_origin(&self, viewport: Viewport) -> (u16, u16) {
        let (frame_w, frame_h) = self.frame_size();
        let x = viewport.width.saturating_sub(frame_w) / 2;
        let y = viewport.height.saturating_sub(frame_h) / 2;
        (x, y)
    }

    /// Screen position to board cell, for mouse gestures. Uses the same
    /// origin math as the drawing side, so the two can never disagree.
    pub fn hit_test(&self, viewport: Viewport, col: u16, row: u16) -> Option<usize> {
        let (start_x, start_y) = self.board_origin(viewport);
        let inner_x = col.checked_sub(start_x + 1)?;
        let inner_y = row.checked_sub(start_y + 1)?;
        let cell_x = (inner_x / self.cell_w) as usize;
        let cell_y = (inner_y / self.cell_h) as usize;
        if cell_x >= BOARD_WIDTH || cell_y >= BOARD_WIDTH {
            return None;
        }
        Some(cell_y * BOARD_WIDTH + cell_x)
    }

    /// Render the game screen into `fb`, resizing it to the viewport.
    pub fn render_game(&self, fb: &mut FrameBuffer, viewport: Viewport, model: &GameScreenModel) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(Glyph::default());

        let (frame_w, frame_h) = self.frame_size();
        let (start_x, start_y) = self.board_origin(viewport);

        let bg = GlyphStyle {
            fg: Rgb::new(80, 80, 90),
            bg: Rgb::new(26, 26, 34),
            bold: false,
            dim: false,
        };

        fb.fill_rect(start_x + 1, start_y + 1, frame_w - 2, frame_h - 2, ' ', bg);
        draw_border(fb, start_x, start_y, frame_w, frame_h, border_style());

        let snapshot = model.snapshot;
        for index in 0..snapshot.cells.len() {
            let x = (index % BOARD_WIDTH) as u16;
            let y = (index / BOARD_WIDTH) as u16;

            let (mut style, ch) = match snapshot.cells[index] {
                Some(candy) => {
                    let style = GlyphStyle {
                        fg: candy_color(candy),
                        bg: Rgb::new(26, 26, 34),
                        bold: false,
                        dim: false,
                    };
                    (style, '█')
                }
                None => (
                    GlyphStyle {
                        fg: Rgb::new(90, 90, 100),
                        bg: Rgb::new(26, 26, 34),
                        bold: false,
                        dim: true,
                    },
                    '·',
                ),
            };

            // Transient tags restyle the cell; rules never see them.
            match snapshot.tags[index] {
                Some(CellTag::Matching) => {
                    style.bold = true;
                    style.bg = Rgb::new(70, 70, 40);
                }
                Some(CellTag::Falling) => style.dim = true,
                Some(CellTag::Spawning) => style.bold = true,
                Some(CellTag::DropTarget) => style = style.inverted(),
                None => {}
            }

            if model.grab == Some(index) {
                style.bg = Rgb::new(120, 100, 30);
                style.bold = true;
            } else if model.cursor == index && snapshot.in_play() {
                style.bg = Rgb::new(60, 60, 80);
            }

            self.fill_cell_rect(fb, start_x, start_y, x, y, ch, style);
        }

        self.draw_side_panel(fb, viewport, start_x, start_y, frame_w, model);

        match snapshot.phase {
            GamePhase::NotStarted => {
                draw_overlay_lines(
                    fb,
                    start_x,
                    start_y,
                    frame_w,
                    frame_h,
                    &["CHAIN CRUSH", "press N to play"],
                );
            }
            GamePhase::Over => {
                let summary = format!(
                    "score {}  tokens {}  moves {}",
                    snapshot.score, snapshot.tokens, snapshot.moves
                );
                draw_overlay_lines(
                    fb,
                    start_x,
                    start_y,
                    frame_w,
                    frame_h,
                    &["GAME OVER", &summary, "press N to play again"],
                );
            }
            GamePhase::Active => {}
        }
    }

    /// Render the leaderboard screen. `source` labels where the rows came
    /// from ("CHAIN" or "LOCAL").
    pub fn render_leaderboard(
        &self,
        fb: &mut FrameBuffer,
        viewport: Viewport,
        rows: &[LeaderRow],
        source: &str,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(Glyph::default());

        let width = 34u16;
        let x = viewport.width.saturating_sub(width) / 2;
        let mut y = viewport.height.saturating_sub((rows.len() as u16) + 6) / 2;

        fb.put_str(x, y, "LEADERBOARD", title_style());
        fb.put_str(
            x + width.saturating_sub(source.chars().count() as u16),
            y,
            source,
            dim_style(),
        );
        y = y.saturating_add(2);

        fb.put_str(x, y, "  #  PLAYER        SCORE  TOKENS", label_style());
        y = y.saturating_add(1);

        for (rank, row) in rows.iter().enumerate() {
            let line = format!(
                "{:>3}  {:<12}  {:>5}  {:>6}",
                rank + 1,
                clip(&row.player, 12),
                row.score,
                row.tokens
            );
            let style = if rank == 0 { title_style() } else { value_style() };
            fb.put_str(x, y, &line, style);
            y = y.saturating_add(1);
            if y >= viewport.height {
                break;
            }
        }

        y = y.saturating_add(1);
        fb.put_str(x, y, "b back   t tournaments   q quit", dim_style());
    }

    /// Render the tournaments screen for `username`.
    pub fn render_tournaments(
        &self,
        fb: &mut FrameBuffer,
        viewport: Viewport,
        tournaments: &[Tournament],
        username: &str,
        now_ms: u64,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(Glyph::default());

        let width = 44u16;
        let x = viewport.width.saturating_sub(width) / 2;
        let mut y = 2u16;

        fb.put_str(x, y, "TOURNAMENTS", title_style());
        y = y.saturating_add(2);

        if tournaments.is_empty() {
            fb.put_str(x, y, "nothing scheduled", dim_style());
            y = y.saturating_add(1);
        }

        for tournament in tournaments {
            if y + 2 >= viewport.height {
                break;
            }

            let status = match tournament.status {
                TournamentStatus::Scheduled => "SCHEDULED",
                TournamentStatus::Active => "ACTIVE",
                TournamentStatus::Completed => "COMPLETED",
            };
            let joined = tournament.participants.iter().any(|p| p == username);
            let marker = if joined { '*' } else { ' ' };

            let head = format!("{} {:<20} {}", marker, clip(&tournament.name, 20), status);
            let style = match tournament.status {
                TournamentStatus::Active => title_style(),
                _ => value_style(),
            };
            fb.put_str(x, y, &head, style);
            y = y.saturating_add(1);

            let detail = format!(
                "   {} players, {} entries, {} left",
                tournament.participants.len(),
                tournament.entries.len(),
                format_countdown(tournament.end_ms, now_ms)
            );
            fb.put_str(x, y, &detail, dim_style());
            y = y.saturating_add(1);

            if tournament.results_visible(now_ms) {
                for (rank, entry) in tournament.entries.iter().take(3).enumerate() {
                    if y >= viewport.height {
                        break;
                    }
                    let line = format!(
                        "   {}. {:<12} {:>5}",
                        rank + 1,
                        clip(&entry.username, 12),
                        entry.score
                    );
                    fb.put_str(x, y, &line, value_style());
                    y = y.saturating_add(1);
                }
            }
            y = y.saturating_add(1);
        }

        if y < viewport.height {
            fb.put_str(x, y, "j join active   t back   q quit", dim_style());
        }
    }

    fn fill_cell_rect(
        &self,
        fb: &mut FrameBuffer,
        start_x: u16,
        start_y: u16,
        cell_x: u16,
        cell_y: u16,
        ch: char,
        style: GlyphStyle,
    ) {
        let px = start_x + 1 + cell_x * self.cell_w;
        let py = start_y + 1 + cell_y * self.cell_h;
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        viewport: Viewport,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
        model: &GameScreenModel,
    ) {
        let panel_x = start_x.saturating_add(frame_w).saturating_add(2);
        if panel_x >= viewport.width {
            return;
        }
        let panel_w = viewport.width - panel_x;
        if panel_w < 14 {
            return;
        }

        // One label/value row per stat; values start in a fixed column so
        // the whole panel fits beside the board on an 80x24 terminal.
        let value_x = panel_x + 8;
        let value_w = (panel_w - 8) as usize;
        let snapshot = model.snapshot;
        let label = label_style();
        let value = value_style();

        let mut y = start_y;
        fb.put_str(panel_x, y, "PLAYER", label);
        fb.put_str(value_x, y, &clip(model.player, value_w), value);
        y = y.saturating_add(1);

        fb.put_str(panel_x, y, "SCORE", label);
        fb.put_str(value_x, y, &format!("{}", snapshot.score), value);
        // Points popup for the most recent clear, while it still animates.
        if let (Some(points), true) = (snapshot.last_points, snapshot.animating) {
            let px = value_x + count_digits(snapshot.score);
            fb.put_str(px, y, &format!(" +{}", points), title_style());
        }
        y = y.saturating_add(1);

        fb.put_str(panel_x, y, "TOKENS", label);
        let tokens = match model.balance {
            Some(balance) => format!("{} (bank {})", snapshot.tokens, balance),
            None => format!("{}", snapshot.tokens),
        };
        fb.put_str(value_x, y, &tokens, value);
        y = y.saturating_add(1);

        fb.put_str(panel_x, y, "MOVES", label);
        fb.put_str(value_x, y, &format!("{}", snapshot.moves), value);
        y = y.saturating_add(1);

        fb.put_str(panel_x, y, "TIME", label);
        let secs = snapshot.time_left_ms / 1000;
        let tenths = (snapshot.time_left_ms % 1000) / 100;
        fb.put_str(value_x, y, &format!("{}.{}s", secs, tenths), value);
        y = y.saturating_add(1);

        fb.put_str(panel_x, y, "CHAIN", label);
        fb.put_str(value_x, y, model.connection.label(), value);
        y = y.saturating_add(1);

        if let Some(name) = model.tournament {
            fb.put_str(panel_x, y, "TOURNEY", label);
            fb.put_str(value_x, y, &clip(name, value_w), value);
            y = y.saturating_add(1);
        }

        y = y.saturating_add(1);
        if y + 2 < viewport.height {
            fb.put_str(panel_x, y, "arrows move, space grab", dim_style());
            y = y.saturating_add(1);
            fb.put_str(panel_x, y, "n new  b board  t tourney", dim_style());
            y = y.saturating_add(1);
            fb.put_str(panel_x, y, "q quit", dim_style());
        }
    }
}

fn draw_border(fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: GlyphStyle) {
    if w < 2 || h < 2 {
        return;
    }

    fb.put_char(x, y, '┌', style);
    fb.put_char(x + w - 1, y, '┐', style);
    fb.put_char(x, y + h - 1, '└', style);
    fb.put_char(x + w - 1, y + h - 1, '┘', style);

    for dx in 1..w - 1 {
        fb.put_char(x + dx, y, '─', style);
        fb.put_char(x + dx, y + h - 1, '─', style);
    }
    for dy in 1..h - 1 {
        fb.put_char(x, y + dy, '│', style);
        fb.put_char(x + w - 1, y + dy, '│', style);
    }
}

fn draw_overlay_lines(
    fb: &mut FrameBuffer,
    start_x: u16,
    start_y: u16,
    frame_w: u16,
    frame_h: u16,
    lines: &[&str],
) {
    let style = GlyphStyle {
        fg: Rgb::new(255, 255, 255),
        bg: Rgb::new(10, 10, 14),
        bold: true,
        dim: false,
    };
    let first_y = start_y
        .saturating_add(frame_h / 2)
        .saturating_sub(lines.len() as u16 / 2);
    for (i, line) in lines.iter().enumerate() {
        let text_w = line.chars().count() as u16;
        let x = start_x.saturating_add(frame_w.saturating_sub(text_w) / 2);
        fb.put_str(x, first_y.saturating_add(i as u16), line, style);
    }
}

fn candy_color(candy: Candy) -> Rgb {
    match candy {
        Candy::Blue => Rgb::new(80, 140, 230),
        Candy::Green => Rgb::new(100, 220, 120),
        Candy::Orange => Rgb::new(255, 165, 0),
        Candy::Purple => Rgb::new(200, 120, 220),
        Candy::Red => Rgb::new(220, 80, 80),
        Candy::Yellow => Rgb::new(240, 220, 80),
    }
}

fn title_style() -> GlyphStyle {
    GlyphStyle {
        fg: Rgb::new(255, 255, 255),
        bg: Rgb::new(10, 10, 14),
        bold: true,
        dim: false,
    }
}

fn label_style() -> GlyphStyle {
    GlyphStyle {
        fg: Rgb::new(220, 220, 220),
        bg: Rgb::new(10, 10, 14),
        bold: true,
        dim: false,
    }
}

fn value_style() -> GlyphStyle {
    GlyphStyle {
        fg: Rgb::new(200, 200, 200),
        bg: Rgb::new(10, 10, 14),
        bold: false,
        dim: false,
    }
}

fn dim_style() -> GlyphStyle {
    GlyphStyle {
        dim: true,
        ..value_style()
    }
}

fn border_style() -> GlyphStyle {
    GlyphStyle {
        fg: Rgb::new(200, 200, 200),
        bg: Rgb::new(10, 10, 14),
        bold: false,
        dim: false,
    }
}

fn clip(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn count_digits(mut n: u32) -> u16 {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

fn format_countdown(end_ms: u64, now_ms: u64) -> String {
    if now_ms >= end_ms {
        return "0s".to_string();
    }
    let secs = (end_ms - now_ms) / 1000;
    if secs >= 3600 {
        format!("{}h{:02}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m{:02}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}
