//! Chain Crush runner (default binary).
//!
//! Signs the player in, opens the ledger connection (or its offline
//! fallback), then drives the game loop: crossterm input on one side, the
//! framebuffer renderer on the other, with the session clock fed from
//! real elapsed time.

use std::io::{self, Write as _};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Result};
use clap::Parser;
use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};

use chain_crush::chain::{LeaderRow, NodeConfig, NodeLedger, OfflineLedger, ScoreLedger};
use chain_crush::core::{GameSession, GameSnapshot};
use chain_crush::input::{self, Gesture, PointerTracker, UiAction, UiScreen};
use chain_crush::player::{self, choose_display_rows, Profile, ProfileBook, SavedSession, Store};
use chain_crush::term::{
    FrameBuffer, FrameGate, GameScreenModel, GameView, TerminalScreen, Viewport,
};
use chain_crush::types::{GamePhase, TICK_MS};

const LOGIN_ATTEMPTS: u32 = 3;

/// Redraw at least this often while nothing on screen changes
const IDLE_REDRAW_MS: u64 = 1_000;

/// Terminal match-3 whose scores mint tokens on a microchain ledger.
#[derive(Debug, Parser)]
#[command(name = "chain-crush", version, about)]
struct Args {
    /// Skip the node connection and play against the offline ledger.
    #[arg(long)]
    offline: bool,

    /// Ledger node to connect to (default 127.0.0.1:9710).
    #[arg(long, value_name = "HOST:PORT")]
    node: Option<NodeConfig>,

    /// Deal boards from this RNG seed instead of the clock.
    #[arg(long)]
    seed: Option<u32>,

    /// Board settle cadence in milliseconds.
    #[arg(long, default_value_t = TICK_MS)]
    tick_ms: u64,

    /// Stretch the settle cadence to reduce wakeups on battery.
    #[arg(long)]
    low_power: bool,

    /// Sign in as this player (prompts for the password).
    #[arg(long, value_name = "NAME")]
    player: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let store = Store::open_default();
    let mut profiles = store.load_profiles();
    let profile = establish_player(&store, &mut profiles, args.player.as_deref())?;

    // Connect before entering raw mode so connection errors stay readable.
    let (ledger, balance) = open_ledger(&args, &profile.username);

    let mut term = TerminalScreen::new();
    term.enter()?;

    let result = run(&mut term, &args, &store, profiles, profile, ledger, balance);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

#[allow(clippy::too_many_arguments)]
fn run(
    term: &mut TerminalScreen,
    args: &Args,
    store: &Store,
    mut profiles: ProfileBook,
    profile: Profile,
    mut ledger: Box<dyn ScoreLedger>,
    mut balance: Option<u64>,
) -> Result<()> {
    let seed = args.seed.unwrap_or_else(|| now_ms() as u32);
    let mut session = GameSession::new(seed);
    session.set_step_interval_ms(args.tick_ms);
    session.set_low_power(args.low_power);

    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut snapshot = GameSnapshot::default();
    let mut gate = FrameGate::new(IDLE_REDRAW_MS);
    let mut tracker = PointerTracker::new();

    let mut screen = UiScreen::Game;
    let mut cursor = 0usize;
    let mut board_rows = Vec::new();
    let mut board_source = "LOCAL";

    let mut tournaments = store.load_tournaments();
    if tournaments.sweep(now_ms()) {
        let _ = store.save_tournaments(&tournaments);
    }

    let started_at = Instant::now();
    let mut last_tick = Instant::now();

    loop {
        let wall_ms = now_ms();
        if tournaments.sweep(wall_ms) {
            let _ = store.save_tournaments(&tournaments);
        }

        // A finished round flows to the profile, the tournament, and the
        // ledger; none of these may interrupt play.
        if let Some(report) = session.take_report() {
            ledger.game_ended(report.score);
            let time_secs = (report.duration_ms / 1000) as u32;
            if profiles.record_game(
                &profile.username,
                report.score,
                report.moves,
                time_secs,
                wall_ms,
            ) {
                let _ = store.save_profiles(&profiles);
            }
            if let Some(id) = tournaments.active_id() {
                let entered = tournaments
                    .submit_score(id, &profile.username, report.score, report.moves, wall_ms)
                    .is_ok();
                if entered {
                    let _ = store.save_tournaments(&tournaments);
                }
            }
            if report.score > 0 {
                if let Ok(receipt) =
                    ledger.submit_score(report.score, time_secs, report.moves)
                {
                    balance = receipt.balance.or(balance);
                }
            }
        }

        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let viewport = Viewport::new(w, h);
        match screen {
            UiScreen::Game => {
                session.snapshot_into(&mut snapshot);
                let elapsed_wall = started_at.elapsed().as_millis() as u64;
                if gate.should_draw(elapsed_wall, snapshot.fingerprint(), snapshot.animating) {
                    let status = ledger.status();
                    let tourney = tournaments.active().map(|t| t.name.clone());
                    let model = GameScreenModel {
                        snapshot: &snapshot,
                        cursor,
                        grab: session.grab(),
                        player: &profile.username,
                        connection: &status,
                        balance,
                        tournament: tourney.as_deref(),
                    };
                    view.render_game(&mut fb, viewport, &model);
                    term.draw_swap(&mut fb)?;
                }
            }
            UiScreen::Leaderboard => {
                // Menu frames are cheap; the diff writer drops unchanged runs.
                view.render_leaderboard(&mut fb, viewport, &board_rows, board_source);
                term.draw_swap(&mut fb)?;
            }
            UiScreen::Tournaments => {
                view.render_tournaments(
                    &mut fb,
                    viewport,
                    &tournaments.tournaments,
                    &profile.username,
                    wall_ms,
                );
                term.draw_swap(&mut fb)?;
            }
        }

        // Input with timeout until the next settle step.
        let step = Duration::from_millis(session.step_interval_ms());
        let timeout = step
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if input::should_quit(key) {
                        return Ok(());
                    }
                    if let Some(action) = input::map_key(key, screen) {
                        match action {
                            UiAction::CursorUp
                            | UiAction::CursorDown
                            | UiAction::CursorLeft
                            | UiAction::CursorRight => {
                                cursor = input::step_cursor(cursor, action);
                            }
                            UiAction::Grab => match session.grab() {
                                None => session.gesture_start(cursor),
                                Some(_) => {
                                    session.gesture_end(Some(cursor));
                                }
                            },
                            UiAction::Cancel => {
                                session.cancel_gesture();
                                tracker.cancel();
                            }
                            UiAction::NewGame => {
                                screen = UiScreen::Game;
                                if session.phase() != GamePhase::Active {
                                    session.start();
                                    ledger.game_started();
                                }
                            }
                            UiAction::Reset => {
                                session.reset();
                                tracker.cancel();
                            }
                            UiAction::ShowLeaderboard => {
                                (board_rows, board_source) =
                                    fetch_leaderboard(ledger.as_mut(), &profiles);
                                screen = UiScreen::Leaderboard;
                            }
                            UiAction::ShowTournaments => {
                                screen = UiScreen::Tournaments;
                            }
                            UiAction::Back => {
                                screen = UiScreen::Game;
                            }
                            UiAction::Join => {
                                if let Some(id) = tournaments.active_id() {
                                    if tournaments.join(id, &profile.username).is_ok() {
                                        let _ = store.save_tournaments(&tournaments);
                                    }
                                }
                            }
                        }
                    }
                }
                Event::Mouse(mouse) if screen == UiScreen::Game => match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        let cell = view.hit_test(viewport, mouse.column, mouse.row);
                        if let Some(Gesture::Start(index)) =
                            tracker.press(cell, mouse.column, mouse.row)
                        {
                            session.gesture_start(index);
                            cursor = index;
                        }
                    }
                    MouseEventKind::Drag(MouseButton::Left) => {
                        if let Some(Gesture::Move { dx, dy }) =
                            tracker.drag(mouse.column, mouse.row)
                        {
                            session.gesture_move(dx, dy);
                        }
                    }
                    MouseEventKind::Up(MouseButton::Left) => {
                        let cell = view.hit_test(viewport, mouse.column, mouse.row);
                        if let Some(Gesture::End(drop)) = tracker.release(cell) {
                            session.gesture_end(drop);
                        }
                    }
                    _ => {}
                },
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }

        // Tick with real elapsed time; the session owns the cadence.
        let elapsed_ms = last_tick.elapsed().as_millis() as u64;
        if elapsed_ms > 0 {
            last_tick = Instant::now();
            session.tick(elapsed_ms);
        }
    }
}

/// Restore a valid saved session, or walk the sign-in prompts. Successful
/// sign-ins persist both the profile book and a fresh session.
fn establish_player(
    store: &Store,
    profiles: &mut ProfileBook,
    requested: Option<&str>,
) -> Result<Profile> {
    let now = now_ms();

    if requested.is_none() {
        if let Some(saved) = store.load_session() {
            if saved.is_valid(now) {
                if let Some(profile) = profiles.find(&saved.username) {
                    return Ok(profile.clone());
                }
            }
            // Expired or orphaned; sign in from scratch.
            let _ = store.clear_session();
        }
    }

    let profile = prompt_login(profiles, requested)?;
    store.save_profiles(profiles)?;
    store.save_session(&SavedSession::new(&profile.username, now))?;
    Ok(profile)
}

fn prompt_login(profiles: &mut ProfileBook, requested: Option<&str>) -> Result<Profile> {
    println!("chain crush - sign in (new names register automatically)");

    for _ in 0..LOGIN_ATTEMPTS {
        let username = match requested {
            Some(name) => name.to_string(),
            None => prompt_line("username: ")?,
        };

        print!("password: ");
        io::stdout().flush()?;
        let password = read_password()?;
        println!();

        match player::login(profiles, &username, &password, now_ms()) {
            Ok(profile) => return Ok(profile),
            Err(err) => eprintln!("sign-in failed: {}", err),
        }
    }
    bail!("giving up after {} sign-in attempts", LOGIN_ATTEMPTS)
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Read a password without echoing it (stars stand in for the characters).
fn read_password() -> Result<String> {
    crossterm::terminal::enable_raw_mode()?;
    let result = read_password_raw();
    crossterm::terminal::disable_raw_mode()?;
    result
}

fn read_password_raw() -> Result<String> {
    let mut password = String::new();
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Enter => return Ok(password),
                KeyCode::Backspace => {
                    if password.pop().is_some() {
                        print!("\u{8} \u{8}");
                        io::stdout().flush()?;
                    }
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    bail!("sign-in interrupted")
                }
                KeyCode::Char(c) => {
                    password.push(c);
                    print!("*");
                    io::stdout().flush()?;
                }
                _ => {}
            }
        }
    }
}

/// The node connection when one can be made, the offline ledger otherwise.
/// Also reports the starting token balance when the node announced one.
fn open_ledger(args: &Args, username: &str) -> (Box<dyn ScoreLedger>, Option<u64>) {
    if args.offline {
        return (Box::new(OfflineLedger::new()), None);
    }

    let config = args.node.clone().unwrap_or_default();
    match NodeLedger::connect(config, &player::player_id(username)) {
        Ok(node) => {
            let balance = Some(node.balance());
            (Box::new(node), balance)
        }
        Err(err) => {
            eprintln!("chain-crush: node unreachable ({}), playing offline", err);
            (Box::new(OfflineLedger::new()), None)
        }
    }
}

/// Chain standings when the node serves any, local bests otherwise.
fn fetch_leaderboard(
    ledger: &mut dyn ScoreLedger,
    profiles: &ProfileBook,
) -> (Vec<LeaderRow>, &'static str) {
    let chain = ledger.leaderboard().unwrap_or_default();
    let from_chain = !chain.is_empty();
    let rows = choose_display_rows(chain, profiles.local_leaderboard());
    (rows, if from_chain { "CHAIN" } else { "LOCAL" })
}

/// Milliseconds since the Unix epoch.
fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
