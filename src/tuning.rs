/// Gameplay tuning.
///
/// Every value has a hardcoded default; a TOML document only overrides what it
/// names.  Velocities are pixels per frame, accelerations pixels per frame²,
/// timers are seconds.
use std::f32::consts::FRAC_PI_4;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

// ── Default constants ────────────────────────────────────────────────────────

pub const WORLD_WIDTH: f32 = 12_800.0;
pub const WORLD_HEIGHT: f32 = 2_160.0;
pub const FRAME_DT: f32 = 1.0 / 60.0;

pub const MAX_PROJECTILES: usize = 100;
pub const MAX_GROUND_ENEMIES: usize = 20;
pub const MAX_FLYING_ENEMIES: usize = 10;

pub const DMG_MG: i32 = 5;
pub const DMG_CANNON: i32 = 25;
pub const DMG_ENEMY_CONTACT: i32 = 10;

pub const KNOCKBACK_TANK_VX: f32 = 6.0;
pub const KNOCKBACK_TANK_VY: f32 = 4.0;
pub const KNOCKBACK_ENEMY_VX: f32 = 4.5;
pub const KNOCKBACK_ENEMY_VY: f32 = 3.5;
pub const CONTACT_SEPARATION: f32 = 2.0;

pub const CANNON_SPLASH_RADIUS: f32 = 90.0;
pub const CANNON_SPLASH_KB: f32 = 6.0;

pub const INVINCIBLE_TIME: f32 = 1.0;

// ── Sections ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    /// Horizontal extent of the playfield in pixels.
    pub width: f32,
    /// Vertical extent of the playfield in pixels (y grows downward).
    pub height: f32,
    /// Seconds advanced by one simulation frame.
    pub frame_dt: f32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            width: WORLD_WIDTH,
            height: WORLD_HEIGHT,
            frame_dt: FRAME_DT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TankTuning {
    pub width: f32,
    pub height: f32,
    /// Added to horizontal velocity per frame while a direction is held.
    pub accel: f32,
    pub max_speed: f32,
    /// Horizontal velocity multiplier applied every frame.
    pub friction: f32,
    pub gravity: f32,
    /// Magnitude of the upward velocity set by a jump.
    pub jump_speed: f32,
    pub max_hp: i32,
    /// Invincibility window started by every damage event.
    pub invincible_time: f32,
}

impl Default for TankTuning {
    fn default() -> Self {
        Self {
            width: 32.0,
            height: 20.0,
            accel: 0.4,
            max_speed: 3.0,
            friction: 0.85,
            gravity: 0.5,
            jump_speed: 8.0,
            max_hp: 100,
            invincible_time: INVINCIBLE_TIME,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct WeaponTuning {
    pub mg_speed: f32,
    /// Seconds between machine-gun shots while the trigger is held.
    pub mg_cooldown: f32,
    /// Continuous fire time after which the machine gun must reload.
    pub mg_fire_duration: f32,
    pub mg_reload_time: f32,
    /// Power gained per frame while the cannon charges.
    pub cannon_charge_rate: f32,
    pub cannon_power_cap: f32,
    /// Muzzle speed per unit of charge power.
    pub cannon_speed_factor: f32,
    /// Initial aim in radians; negative points upward.
    pub initial_aim_angle: f32,
}

impl Default for WeaponTuning {
    fn default() -> Self {
        Self {
            mg_speed: 8.4,
            mg_cooldown: 0.1,
            mg_fire_duration: 3.0,
            mg_reload_time: 2.0,
            cannon_charge_rate: 0.2,
            cannon_power_cap: 15.0,
            cannon_speed_factor: 0.7,
            initial_aim_angle: -FRAC_PI_4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub capacity: usize,
    /// Downward acceleration per frame applied to cannon shells only.
    pub cannon_gravity: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub enemy_width: f32,
    pub enemy_height: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            capacity: MAX_PROJECTILES,
            cannon_gravity: 0.3,
            player_width: 4.0,
            player_height: 4.0,
            enemy_width: 6.0,
            enemy_height: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub ground_capacity: usize,
    pub flying_capacity: usize,

    pub ground_width: f32,
    pub ground_height: f32,
    pub ground_base_hp: i32,
    pub ground_hp_per_round: i32,
    pub ground_base_speed: f32,
    pub ground_speed_per_round: f32,
    pub ground_gravity: f32,
    pub ground_jump_speed: f32,
    pub jump_interval_min: f32,
    pub jump_interval_max: f32,
    /// Horizontal progress below which a ground enemy counts as stuck.
    pub stuck_threshold: f32,
    pub stuck_jump_time: f32,
    pub stuck_boost: f32,
    /// Horizontal velocity multiplier while a knockback impulse bleeds off.
    pub knockback_decay: f32,
    pub mg_fire_cooldown: f32,
    pub cannon_fire_cooldown: f32,
    pub mg_bullet_speed: f32,
    pub cannon_bullet_speed: f32,
    pub shooting_range: f32,

    pub flying_width: f32,
    pub flying_height: f32,
    pub flying_base_hp: i32,
    pub flying_hp_per_round: i32,
    pub flying_base_speed: f32,
    pub flying_speed_per_round: f32,
    /// Vertical amplitude of the sinusoidal bob in pixels.
    pub bob_amplitude: f32,
    /// Phase advance in radians per second.
    pub bob_rate: f32,
    pub burst_count: u32,
    pub burst_interval: f32,
    pub burst_rest: f32,
    pub flying_bullet_speed: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            ground_capacity: MAX_GROUND_ENEMIES,
            flying_capacity: MAX_FLYING_ENEMIES,

            ground_width: 32.0,
            ground_height: 20.0,
            ground_base_hp: 20,
            ground_hp_per_round: 5,
            ground_base_speed: 1.0,
            ground_speed_per_round: 0.25,
            ground_gravity: 0.5,
            ground_jump_speed: 8.5,
            jump_interval_min: 1.8,
            jump_interval_max: 2.2,
            stuck_threshold: 1.0,
            stuck_jump_time: 2.0,
            stuck_boost: 1.5,
            knockback_decay: 0.85,
            mg_fire_cooldown: 1.5,
            cannon_fire_cooldown: 3.0,
            mg_bullet_speed: 6.0,
            cannon_bullet_speed: 9.0,
            shooting_range: 800.0,

            flying_width: 28.0,
            flying_height: 16.0,
            flying_base_hp: 12,
            flying_hp_per_round: 3,
            flying_base_speed: 1.0,
            flying_speed_per_round: 0.2,
            bob_amplitude: 30.0,
            bob_rate: 2.0,
            burst_count: 10,
            burst_interval: 0.05,
            burst_rest: 2.0,
            flying_bullet_speed: 8.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    pub mg_damage: i32,
    /// Splash damage at the centre of a cannon blast; falls off linearly.
    pub cannon_damage: i32,
    pub contact_damage: i32,
    pub splash_radius: f32,
    pub splash_knockback: f32,
    pub knockback_tank_vx: f32,
    pub knockback_tank_vy: f32,
    pub knockback_enemy_vx: f32,
    pub knockback_enemy_vy: f32,
    /// Distance each body is pushed along x when a contact is resolved.
    pub separation: f32,
    pub score_ground: u32,
    pub score_flying: u32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            mg_damage: DMG_MG,
            cannon_damage: DMG_CANNON,
            contact_damage: DMG_ENEMY_CONTACT,
            splash_radius: CANNON_SPLASH_RADIUS,
            splash_knockback: CANNON_SPLASH_KB,
            knockback_tank_vx: KNOCKBACK_TANK_VX,
            knockback_tank_vy: KNOCKBACK_TANK_VY,
            knockback_enemy_vx: KNOCKBACK_ENEMY_VX,
            knockback_enemy_vy: KNOCKBACK_ENEMY_VY,
            separation: CONTACT_SEPARATION,
            score_ground: 100,
            score_flying: 150,
        }
    }
}

// ── Root ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub world: WorldTuning,
    pub tank: TankTuning,
    pub weapons: WeaponTuning,
    pub projectiles: ProjectileTuning,
    pub enemies: EnemyTuning,
    pub combat: CombatTuning,
}

impl Tuning {
    /// Parse a TOML document.  A malformed document yields the defaults.
    pub fn from_toml_str(text: &str) -> Self {
        match toml::from_str::<Tuning>(text) {
            Ok(tuning) => tuning.sanitized(),
            Err(e) => {
                warn!(error = %e, "malformed tuning document, using defaults");
                Self::default()
            }
        }
    }

    /// Load tuning from disk.  A missing or unreadable file yields the defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "tuning file unavailable, using defaults");
                Self::default()
            }
        }
    }

    /// Replace every non-finite or negative value with its default.
    pub fn sanitized(self) -> Self {
        let d = Tuning::default();
        let w = self.world;
        let t = self.tank;
        let wp = self.weapons;
        let p = self.projectiles;
        let e = self.enemies;
        let c = self.combat;

        Tuning {
            world: WorldTuning {
                width: positive(w.width, d.world.width),
                height: positive(w.height, d.world.height),
                frame_dt: positive(w.frame_dt, d.world.frame_dt),
            },
            tank: TankTuning {
                width: positive(t.width, d.tank.width),
                height: positive(t.height, d.tank.height),
                accel: magnitude(t.accel, d.tank.accel),
                max_speed: magnitude(t.max_speed, d.tank.max_speed),
                friction: magnitude(t.friction, d.tank.friction),
                gravity: magnitude(t.gravity, d.tank.gravity),
                jump_speed: magnitude(t.jump_speed, d.tank.jump_speed),
                max_hp: if t.max_hp > 0 { t.max_hp } else { d.tank.max_hp },
                invincible_time: magnitude(t.invincible_time, d.tank.invincible_time),
            },
            weapons: WeaponTuning {
                mg_speed: magnitude(wp.mg_speed, d.weapons.mg_speed),
                mg_cooldown: magnitude(wp.mg_cooldown, d.weapons.mg_cooldown),
                mg_fire_duration: magnitude(wp.mg_fire_duration, d.weapons.mg_fire_duration),
                mg_reload_time: magnitude(wp.mg_reload_time, d.weapons.mg_reload_time),
                cannon_charge_rate: magnitude(wp.cannon_charge_rate, d.weapons.cannon_charge_rate),
                cannon_power_cap: magnitude(wp.cannon_power_cap, d.weapons.cannon_power_cap),
                cannon_speed_factor: magnitude(
                    wp.cannon_speed_factor,
                    d.weapons.cannon_speed_factor,
                ),
                initial_aim_angle: if wp.initial_aim_angle.is_finite() {
                    wp.initial_aim_angle
                } else {
                    d.weapons.initial_aim_angle
                },
            },
            projectiles: ProjectileTuning {
                capacity: slots(p.capacity, d.projectiles.capacity),
                cannon_gravity: magnitude(p.cannon_gravity, d.projectiles.cannon_gravity),
                player_width: magnitude(p.player_width, d.projectiles.player_width),
                player_height: magnitude(p.player_height, d.projectiles.player_height),
                enemy_width: magnitude(p.enemy_width, d.projectiles.enemy_width),
                enemy_height: magnitude(p.enemy_height, d.projectiles.enemy_height),
            },
            enemies: EnemyTuning {
                ground_capacity: slots(e.ground_capacity, d.enemies.ground_capacity),
                flying_capacity: slots(e.flying_capacity, d.enemies.flying_capacity),
                ground_width: positive(e.ground_width, d.enemies.ground_width),
                ground_height: positive(e.ground_height, d.enemies.ground_height),
                ground_base_hp: count(e.ground_base_hp, d.enemies.ground_base_hp),
                ground_hp_per_round: count(e.ground_hp_per_round, d.enemies.ground_hp_per_round),
                ground_base_speed: magnitude(e.ground_base_speed, d.enemies.ground_base_speed),
                ground_speed_per_round: magnitude(
                    e.ground_speed_per_round,
                    d.enemies.ground_speed_per_round,
                ),
                ground_gravity: magnitude(e.ground_gravity, d.enemies.ground_gravity),
                ground_jump_speed: magnitude(e.ground_jump_speed, d.enemies.ground_jump_speed),
                jump_interval_min: magnitude(e.jump_interval_min, d.enemies.jump_interval_min),
                jump_interval_max: magnitude(e.jump_interval_max, d.enemies.jump_interval_max),
                stuck_threshold: magnitude(e.stuck_threshold, d.enemies.stuck_threshold),
                stuck_jump_time: magnitude(e.stuck_jump_time, d.enemies.stuck_jump_time),
                stuck_boost: magnitude(e.stuck_boost, d.enemies.stuck_boost),
                knockback_decay: magnitude(e.knockback_decay, d.enemies.knockback_decay),
                mg_fire_cooldown: magnitude(e.mg_fire_cooldown, d.enemies.mg_fire_cooldown),
                cannon_fire_cooldown: magnitude(
                    e.cannon_fire_cooldown,
                    d.enemies.cannon_fire_cooldown,
                ),
                mg_bullet_speed: magnitude(e.mg_bullet_speed, d.enemies.mg_bullet_speed),
                cannon_bullet_speed: magnitude(
                    e.cannon_bullet_speed,
                    d.enemies.cannon_bullet_speed,
                ),
                shooting_range: magnitude(e.shooting_range, d.enemies.shooting_range),
                flying_width: positive(e.flying_width, d.enemies.flying_width),
                flying_height: positive(e.flying_height, d.enemies.flying_height),
                flying_base_hp: count(e.flying_base_hp, d.enemies.flying_base_hp),
                flying_hp_per_round: count(e.flying_hp_per_round, d.enemies.flying_hp_per_round),
                flying_base_speed: magnitude(e.flying_base_speed, d.enemies.flying_base_speed),
                flying_speed_per_round: magnitude(
                    e.flying_speed_per_round,
                    d.enemies.flying_speed_per_round,
                ),
                bob_amplitude: magnitude(e.bob_amplitude, d.enemies.bob_amplitude),
                bob_rate: magnitude(e.bob_rate, d.enemies.bob_rate),
                burst_count: e.burst_count,
                burst_interval: positive(e.burst_interval, d.enemies.burst_interval),
                burst_rest: magnitude(e.burst_rest, d.enemies.burst_rest),
                flying_bullet_speed: magnitude(
                    e.flying_bullet_speed,
                    d.enemies.flying_bullet_speed,
                ),
            },
            combat: CombatTuning {
                mg_damage: count(c.mg_damage, d.combat.mg_damage),
                cannon_damage: count(c.cannon_damage, d.combat.cannon_damage),
                contact_damage: count(c.contact_damage, d.combat.contact_damage),
                splash_radius: positive(c.splash_radius, d.combat.splash_radius),
                splash_knockback: magnitude(c.splash_knockback, d.combat.splash_knockback),
                knockback_tank_vx: magnitude(c.knockback_tank_vx, d.combat.knockback_tank_vx),
                knockback_tank_vy: magnitude(c.knockback_tank_vy, d.combat.knockback_tank_vy),
                knockback_enemy_vx: magnitude(c.knockback_enemy_vx, d.combat.knockback_enemy_vx),
                knockback_enemy_vy: magnitude(c.knockback_enemy_vy, d.combat.knockback_enemy_vy),
                separation: magnitude(c.separation, d.combat.separation),
                score_ground: c.score_ground,
                score_flying: c.score_flying,
            },
        }
    }
}

fn magnitude(value: f32, default: f32) -> f32 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        default
    }
}

/// Like `magnitude`, but zero is also rejected (sizes, divisors).
fn positive(value: f32, default: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        default
    }
}

/// Slot arrays must hold at least one entry.
fn slots(value: usize, default: usize) -> usize {
    if value > 0 {
        value
    } else {
        default
    }
}

fn count(value: i32, default: i32) -> i32 {
    if value >= 0 {
        value
    } else {
        default
    }
}
