mod display;

use std::collections::HashMap;
use std::f32::consts::PI;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::thread_rng;
use tracing::info;

use tank_boy::compute::{init_state, step};
use tank_boy::entities::{GameState, GameStatus, InputSnapshot};
use tank_boy::terrain::Terrain;
use tank_boy::tuning::Tuning;

const FRAME: Duration = Duration::from_millis(16); // ≈60 FPS, one simulation step per frame

/// Width of one generated terrain column in world pixels.
const HILL_COLUMN: f32 = 16.0;

/// Radians the barrel turns per frame while an aim key is held.
const AIM_STEP: f32 = 0.03;

// ── Simultaneous-input constants ──────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 8 frames (≈128 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 8;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

// ── Start-up ──────────────────────────────────────────────────────────────────

/// Logs go to a file; stdout belongs to the game.
fn init_tracing() -> anyhow::Result<PathBuf> {
    let path = std::env::temp_dir().join("tank_boy.log");
    let file = File::create(&path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(Mutex::new(file))
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));

    Ok(path)
}

fn load_tuning() -> Tuning {
    match std::env::var_os("TANK_BOY_TUNING") {
        Some(path) => Tuning::load(&PathBuf::from(path)),
        None => Tuning::default(),
    }
}

/// The level named on the command line, or generated hills when none is given.
fn load_terrain(tuning: &Tuning) -> anyhow::Result<Terrain> {
    let (width, height) = (tuning.world.width, tuning.world.height);
    match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => Terrain::load(&path, width, height)
            .with_context(|| format!("failed to load level {}", path.display())),
        None => Ok(Terrain::rolling_hills(width, height, HILL_COLUMN)),
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Returns `true` → quit program,  `false` → start a new game.
///
/// Input model: instead of acting on each key event individually, we maintain
/// a `key_frame` map that records the frame number of the last press/repeat
/// event for every key.  Each frame we check which keys are still "fresh"
/// (within `HOLD_WINDOW` frames) and build one `InputSnapshot` from all of
/// them.  This allows Space + A/D + W to be held at the same time.
///
/// Works on two classes of terminal:
/// * **Keyboard-enhancement capable** (Ghostty, kitty, etc.): proper
///   `Press` / `Repeat` / `Release` events → keys are removed on release.
/// * **Classic terminals**: only `Press` events (OS key-repeat shows as
///   repeated `Press`).  Keys expire naturally after `HOLD_WINDOW` frames of
///   silence, which is shorter than the OS repeat interval, so the key stays
///   live while it is actively generating repeats.
fn game_loop<W: Write>(
    out: &mut W,
    state: &mut GameState,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<bool> {
    let mut rng = thread_rng();

    // Maps each held key → the frame it was last seen (press or repeat).
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;
        let mut toggle = false;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(Event::Key(KeyEvent { code, kind, modifiers, .. })) = rx.try_recv() {
            match kind {
                // Press: record key + handle one-shot actions
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            return Ok(true);
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(true);
                        }
                        KeyCode::Char('r') | KeyCode::Char('R') => {
                            if state.status == GameStatus::GameOver {
                                return Ok(false);
                            }
                            toggle = true;
                        }
                        _ => {}
                    }
                }
                // Repeat: refresh timestamp so key stays "held"
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                // Release: remove key immediately (keyboard-enhancement path)
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        // ── Build this frame's input from held keys ───────────────────────────
        let aim_up = is_held(&key_frame, &KeyCode::Up, frame);
        let aim_down = is_held(&key_frame, &KeyCode::Down, frame);
        let aim_angle = match (aim_up, aim_down) {
            (true, false) => Some((state.tank.aim_angle() - AIM_STEP).clamp(-PI, 0.0)),
            (false, true) => Some((state.tank.aim_angle() + AIM_STEP).clamp(-PI, 0.0)),
            _ => None,
        };

        let input = InputSnapshot {
            move_left: any_held(
                &key_frame,
                &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')],
                frame,
            ),
            move_right: any_held(
                &key_frame,
                &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')],
                frame,
            ),
            jump: any_held(&key_frame, &[KeyCode::Char('w'), KeyCode::Char('W')], frame),
            fire_held: is_held(&key_frame, &KeyCode::Char(' '), frame),
            toggle_weapon: toggle,
            aim_angle,
        };

        step(state, &input, &mut rng);

        let (cols, rows) = terminal::size()?;
        display::render(out, state, cols, rows)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let log_path = init_tracing()?;
    let tuning = load_tuning();
    let terrain = load_terrain(&tuning)?;
    info!(
        blocks = terrain.blocks().len(),
        log = %log_path.display(),
        "tank boy starting"
    );

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode().context("failed to enable raw mode")?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Ghostty / kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&mut out, &rx, terrain, tuning);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result.context("game loop failed")
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    terrain: Terrain,
    tuning: Tuning,
) -> std::io::Result<()> {
    let mut rng = thread_rng();

    loop {
        let mut state = init_state(terrain.clone(), tuning, &mut rng);
        let quit = game_loop(out, &mut state, rx)?;
        info!(score = state.score, round = state.round, "game finished");
        if quit {
            break;
        }
    }
    Ok(())
}
