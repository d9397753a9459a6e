/// The per-frame simulation step.
///
/// `tick` takes an immutable reference to the current `GameState` and returns
/// the next one.  Side effects are limited to the injected RNG, so a seeded
/// RNG replays a game exactly.
use rand::Rng;
use tracing::info;

use crate::collision::resolve_collisions;
use crate::enemies::{
    alive_flying, alive_ground, spawn_flying, spawn_ground_wave, update_flying_enemies,
    update_ground_enemies,
};
use crate::entities::{
    FlyingEnemy, FrameEvents, GameState, GameStatus, GroundEnemy, HudSnapshot, InputSnapshot,
};
use crate::projectiles::ProjectilePool;
use crate::tank::Tank;
use crate::terrain::Terrain;
use crate::tuning::Tuning;

/// Where the tank is dropped at the start of a game.
const TANK_START_X: f32 = 200.0;

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build a fresh game on `terrain`: tank on the ground at the left of the
/// level, empty pools, and the first wave already spawned.
pub fn init_state(terrain: Terrain, tuning: Tuning, rng: &mut impl Rng) -> GameState {
    let max_x = (terrain.width() - tuning.tank.width).max(0.0);
    let x = TANK_START_X.min(max_x);
    let y = terrain.ground_level_span(x, tuning.tank.width) - tuning.tank.height;

    let mut state = GameState {
        tank: Tank::new(x, y, &tuning),
        ground_enemies: vec![GroundEnemy::default(); tuning.enemies.ground_capacity],
        flying_enemies: vec![FlyingEnemy::default(); tuning.enemies.flying_capacity],
        projectiles: ProjectilePool::from_tuning(tuning.projectiles),
        terrain,
        tuning,
        score: 0,
        round: 0,
        status: GameStatus::Playing,
        frame: 0,
        events: FrameEvents::default(),
    };
    start_next_round(&mut state, rng);
    state
}

/// Advance the round counter and spawn its wave: `round + 2` ground enemies
/// and `1 + round / 2` flying ones.
pub fn start_next_round(state: &mut GameState, rng: &mut impl Rng) {
    state.round += 1;
    let round = state.round;
    let (tank_x, _) = state.tank.position();

    let ground = spawn_ground_wave(
        &mut state.ground_enemies,
        round,
        tank_x,
        &state.terrain,
        &state.tuning,
        rng,
    );
    let mut flying = 0;
    for _ in 0..1 + round / 2 {
        if spawn_flying(
            &mut state.flying_enemies,
            round,
            tank_x,
            &state.terrain,
            &state.tuning,
            rng,
        ) {
            flying += 1;
        }
    }

    state.events.round_started = Some(round);
    info!(round, ground, flying, "round started");
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the simulation by one frame.  A finished game is returned as is,
/// apart from clearing last frame's events.
pub fn tick(state: &GameState, input: &InputSnapshot, rng: &mut impl Rng) -> GameState {
    let mut next = state.clone();
    step(&mut next, input, rng);
    next
}

/// In-place form of `tick`.
pub fn step(state: &mut GameState, input: &InputSnapshot, rng: &mut impl Rng) {
    state.events = FrameEvents::default();
    if state.status == GameStatus::GameOver {
        return;
    }
    state.frame += 1;

    // ── 1. Tank ──────────────────────────────────────────────────────────────
    state.events.shots_fired = state.tank.update(
        input,
        &state.terrain,
        &mut state.projectiles,
        &state.tuning,
    );

    // ── 2. Enemies ───────────────────────────────────────────────────────────
    let ground_shots = update_ground_enemies(
        &mut state.ground_enemies,
        &state.tank,
        &state.terrain,
        &mut state.projectiles,
        &state.tuning,
        rng,
    );
    let flying_shots = update_flying_enemies(
        &mut state.flying_enemies,
        &state.tank,
        &state.terrain,
        &mut state.projectiles,
        &state.tuning,
    );
    state.events.enemy_shots_fired = ground_shots + flying_shots;

    // ── 3. Projectiles ───────────────────────────────────────────────────────
    state.projectiles.update(&state.terrain);

    // ── 4. Collisions ────────────────────────────────────────────────────────
    resolve_collisions(state);

    // ── 5. Round / status ────────────────────────────────────────────────────
    if state.tank.hp() <= 0 {
        state.status = GameStatus::GameOver;
        return;
    }
    let has_slots = !state.ground_enemies.is_empty() || !state.flying_enemies.is_empty();
    if has_slots
        && alive_ground(&state.ground_enemies) == 0
        && alive_flying(&state.flying_enemies) == 0
    {
        start_next_round(state, rng);
    }
}

// ── Read-only views ──────────────────────────────────────────────────────────

pub fn hud(state: &GameState) -> HudSnapshot {
    let weapon = state.tank.weapon();
    HudSnapshot {
        hp: state.tank.hp(),
        max_hp: state.tank.max_hp(),
        score: state.score,
        round: state.round,
        ground_alive: alive_ground(&state.ground_enemies),
        flying_alive: alive_flying(&state.flying_enemies),
        weapon: weapon.kind(),
        charge_ratio: weapon.charge_ratio(state.tuning.weapons.cannon_power_cap),
        reload_ratio: weapon.reload_ratio(state.tuning.weapons.mg_reload_time),
    }
}
