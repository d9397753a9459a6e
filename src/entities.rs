/// All game entity types.  Pure data, no logic.
use crate::projectiles::ProjectilePool;
use crate::tank::Tank;
use crate::terrain::Terrain;
use crate::tuning::Tuning;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WeaponKind {
    #[default]
    MachineGun,
    /// Charged shell that falls under gravity and bursts on impact.
    Cannon,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyKind {
    Ground,
    Flying,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    GameOver,
}

// ── Input ─────────────────────────────────────────────────────────────────────

/// One frame of player intent, captured by the front-end.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub fire_held: bool,
    /// True only on the frame the toggle key went down.
    pub toggle_weapon: bool,
    /// Absolute aim in radians, if the front-end changed it this frame.
    pub aim_angle: Option<f32>,
}

// ── Per-frame notifications ───────────────────────────────────────────────────

/// Things that happened during the last frame, for audio and HUD flashes.
/// Cleared at the start of every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameEvents {
    pub shots_fired: u32,
    pub enemy_shots_fired: u32,
    pub enemies_destroyed: u32,
    pub tank_hit: bool,
    pub round_started: Option<u32>,
}

// ── HUD ───────────────────────────────────────────────────────────────────────

/// Read-only figures for the status line, taken after a frame resolves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HudSnapshot {
    pub hp: i32,
    pub max_hp: i32,
    pub score: u32,
    pub round: u32,
    pub ground_alive: usize,
    pub flying_alive: usize,
    pub weapon: WeaponKind,
    /// Cannon charge in `0.0..=1.0`.
    pub charge_ratio: f32,
    /// Machine-gun reload progress in `0.0..=1.0`.
    pub reload_ratio: f32,
}

// ── Projectiles ───────────────────────────────────────────────────────────────

/// A pooled bullet slot.  Fields of a dead slot carry no meaning.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub alive: bool,
    pub kind: WeaponKind,
    pub from_enemy: bool,
    pub width: f32,
    pub height: f32,
    /// Facing angle in radians, for sprite orientation.
    pub angle: f32,
}

// ── Enemies ───────────────────────────────────────────────────────────────────

/// Ground enemy: chases the tank, hops on a timer, shoots when in range.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GroundEnemy {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub on_ground: bool,
    pub weapon: WeaponKind,
    pub aim_angle: f32,
    pub alive: bool,
    /// Seconds until the next shot is allowed.
    pub fire_cooldown: f32,
    pub hp: i32,
    pub max_hp: i32,
    /// Chase speed in pixels per frame.
    pub speed: f32,
    /// Seconds until the next scheduled hop.
    pub jump_timer: f32,
    pub last_x: f32,
    pub stuck_time: f32,
    pub width: f32,
    pub height: f32,
}

/// Flying enemy: constant horizontal drift, sinusoidal bob, burst fire.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlyingEnemy {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    /// Height the bob oscillates around.
    pub base_y: f32,
    /// Bob phase in radians.
    pub phase: f32,
    pub alive: bool,
    pub in_burst: bool,
    pub burst_shots_left: u32,
    /// Seconds until the next shot of the current burst.
    pub shot_timer: f32,
    /// Seconds until the next burst starts.
    pub rest_timer: f32,
    pub hp: i32,
    pub max_hp: i32,
    pub width: f32,
    pub height: f32,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The simulation context.  Owns every entity array, the projectile pool and
/// the terrain; update passes borrow it for a single frame.
#[derive(Clone, Debug)]
pub struct GameState {
    pub terrain: Terrain,
    pub tank: Tank,
    pub ground_enemies: Vec<GroundEnemy>,
    pub flying_enemies: Vec<FlyingEnemy>,
    pub projectiles: ProjectilePool,
    pub tuning: Tuning,
    pub score: u32,
    pub round: u32,
    pub status: GameStatus,
    pub frame: u64,
    pub events: FrameEvents,
}
