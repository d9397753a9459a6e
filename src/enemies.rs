/// Enemy spawning and per-frame behaviour.
///
/// Behaviour updates move, aim and fire.  They never touch hit points or the
/// alive flag; that is left to the collision pass.
use rand::Rng;
use tracing::debug;

use crate::entities::{FlyingEnemy, GroundEnemy, WeaponKind};
use crate::projectiles::ProjectilePool;
use crate::tank::Tank;
use crate::terrain::Terrain;
use crate::tuning::{EnemyTuning, Tuning};

/// Probability that a freshly spawned ground enemy carries a cannon.
const GROUND_CANNON_CHANCE: f64 = 0.25;

/// Ground enemies appear this far (plus jitter) to either side of the tank.
const GROUND_SPAWN_DISTANCE: f32 = 400.0;
const GROUND_SPAWN_JITTER: f32 = 100.0;

const FLYING_SPAWN_SPREAD: f32 = 600.0;
const FLYING_MIN_ALTITUDE: f32 = 250.0;
const FLYING_MAX_ALTITUDE: f32 = 350.0;
const FLYING_CEILING: f32 = 50.0;

// ── Helpers ──────────────────────────────────────────────────────────────────

pub fn ground_center(e: &GroundEnemy) -> (f32, f32) {
    (e.x + e.width * 0.5, e.y + e.height * 0.5)
}

pub fn flying_center(e: &FlyingEnemy) -> (f32, f32) {
    (e.x + e.width * 0.5, e.y + e.height * 0.5)
}

pub fn alive_ground(enemies: &[GroundEnemy]) -> usize {
    enemies.iter().filter(|e| e.alive).count()
}

pub fn alive_flying(enemies: &[FlyingEnemy]) -> usize {
    enemies.iter().filter(|e| e.alive).count()
}

fn jump_interval(t: &EnemyTuning, rng: &mut impl Rng) -> f32 {
    let lo = t.jump_interval_min.min(t.jump_interval_max);
    let hi = t.jump_interval_min.max(t.jump_interval_max);
    rng.gen_range(lo..=hi)
}

/// Saturates instead of overflowing on extreme tuning.
fn scaled_hp(base: i32, per_round: i32, round: u32) -> i32 {
    let round = i32::try_from(round).unwrap_or(i32::MAX);
    base.saturating_add(per_round.saturating_mul(round))
}

fn fire_cooldown_for(kind: WeaponKind, t: &EnemyTuning) -> f32 {
    match kind {
        WeaponKind::MachineGun => t.mg_fire_cooldown,
        WeaponKind::Cannon => t.cannon_fire_cooldown,
    }
}

fn bullet_speed_for(kind: WeaponKind, t: &EnemyTuning) -> f32 {
    match kind {
        WeaponKind::MachineGun => t.mg_bullet_speed,
        WeaponKind::Cannon => t.cannon_bullet_speed,
    }
}

// ── Spawning ─────────────────────────────────────────────────────────────────

/// Revive `round + 2` dead ground slots around the tank, standing on the
/// terrain.  Returns how many were actually spawned.
pub fn spawn_ground_wave(
    enemies: &mut [GroundEnemy],
    round: u32,
    tank_x: f32,
    terrain: &Terrain,
    tuning: &Tuning,
    rng: &mut impl Rng,
) -> usize {
    let t = &tuning.enemies;
    let wanted = round as usize + 2;
    let max_x = (terrain.width() - t.ground_width).max(0.0);
    let hp = scaled_hp(t.ground_base_hp, t.ground_hp_per_round, round);
    let speed = t.ground_base_speed + t.ground_speed_per_round * round as f32;
    let mut spawned = 0;

    for e in enemies.iter_mut().filter(|e| !e.alive).take(wanted) {
        let offset = GROUND_SPAWN_DISTANCE + rng.gen_range(0.0..GROUND_SPAWN_JITTER);
        let side = if rng.gen_bool(0.5) { -1.0 } else { 1.0 };
        let x = (tank_x + side * offset).clamp(0.0, max_x);
        let y = terrain.ground_level_span(x, t.ground_width) - t.ground_height;
        let weapon = if rng.gen_bool(GROUND_CANNON_CHANCE) {
            WeaponKind::Cannon
        } else {
            WeaponKind::MachineGun
        };

        *e = GroundEnemy {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            on_ground: true,
            weapon,
            aim_angle: 0.0,
            alive: true,
            fire_cooldown: fire_cooldown_for(weapon, t),
            hp,
            max_hp: hp,
            speed,
            jump_timer: jump_interval(t, rng),
            last_x: x,
            stuck_time: 0.0,
            width: t.ground_width,
            height: t.ground_height,
        };
        spawned += 1;
    }

    if spawned < wanted {
        debug!(wanted, spawned, "ground enemy slots exhausted");
    }
    spawned
}

/// Revive the first dead flying slot somewhere above the tank.  Returns false
/// when every slot is in use.
pub fn spawn_flying(
    enemies: &mut [FlyingEnemy],
    round: u32,
    tank_x: f32,
    terrain: &Terrain,
    tuning: &Tuning,
    rng: &mut impl Rng,
) -> bool {
    let t = &tuning.enemies;
    let Some(e) = enemies.iter_mut().find(|e| !e.alive) else {
        debug!("flying enemy slots exhausted");
        return false;
    };

    let max_x = (terrain.width() - t.flying_width).max(0.0);
    let x = (tank_x + rng.gen_range(-FLYING_SPAWN_SPREAD..FLYING_SPAWN_SPREAD)).clamp(0.0, max_x);
    let altitude = rng.gen_range(FLYING_MIN_ALTITUDE..FLYING_MAX_ALTITUDE);
    let base_y = (terrain.ground_level_span(x, t.flying_width) - altitude).max(FLYING_CEILING);
    let speed = t.flying_base_speed + t.flying_speed_per_round * round as f32;
    let vx = if rng.gen_bool(0.5) { speed } else { -speed };
    let hp = scaled_hp(t.flying_base_hp, t.flying_hp_per_round, round);

    *e = FlyingEnemy {
        x,
        y: base_y,
        vx,
        base_y,
        phase: 0.0,
        alive: true,
        in_burst: false,
        burst_shots_left: 0,
        shot_timer: 0.0,
        rest_timer: 0.5 + rng.gen_range(0.0..0.5),
        hp,
        max_hp: hp,
        width: t.flying_width,
        height: t.flying_height,
    };
    true
}

// ── Ground behaviour ─────────────────────────────────────────────────────────

/// Move, jump, aim and fire every live ground enemy.  Returns shots fired.
pub fn update_ground_enemies(
    enemies: &mut [GroundEnemy],
    tank: &Tank,
    terrain: &Terrain,
    pool: &mut ProjectilePool,
    tuning: &Tuning,
    rng: &mut impl Rng,
) -> u32 {
    let mut shots = 0;
    for e in enemies.iter_mut().filter(|e| e.alive) {
        step_ground_enemy(e, tank, terrain, tuning, rng);
        if ground_enemy_fire(e, tank, pool, tuning) {
            shots += 1;
        }
    }
    shots
}

fn step_ground_enemy(
    e: &mut GroundEnemy,
    tank: &Tank,
    terrain: &Terrain,
    tuning: &Tuning,
    rng: &mut impl Rng,
) {
    let t = &tuning.enemies;
    let dt = tuning.world.frame_dt;

    let (tank_cx, _) = tank.center();
    let dir = if tank_cx > e.x + e.width * 0.5 { 1.0 } else { -1.0 };

    // Knockback bleeds off before the chase speed takes over again.
    if e.vx.abs() > e.speed {
        e.vx *= t.knockback_decay;
    } else {
        e.vx = dir * e.speed;
    }

    e.vy += t.ground_gravity;

    if e.on_ground && e.vy >= 0.0 {
        if e.jump_timer <= 0.0 {
            e.vy = -t.ground_jump_speed;
            e.on_ground = false;
            e.jump_timer = jump_interval(t, rng);
        } else {
            e.jump_timer -= dt;
        }
    }

    let new_x = e.x + e.vx;
    if terrain.collides_rect(new_x, e.y, e.width, e.height) {
        e.vx = 0.0;
    } else {
        e.x = new_x;
    }

    let new_y = e.y + e.vy;
    if terrain.collides_rect(e.x, new_y, e.width, e.height) {
        if e.vy > 0.0 {
            e.vy = 0.0;
            e.on_ground = true;
            e.y = terrain.ground_level_span(e.x, e.width) - e.height;
        } else {
            e.vy = 0.0;
        }
    } else {
        e.y = new_y;
        e.on_ground = terrain.collides_rect(e.x, e.y + e.height, e.width, 1.0);
    }

    let max_x = (terrain.width() - e.width).max(0.0);
    if e.x < 0.0 {
        e.x = 0.0;
        e.vx = e.vx.abs();
    }
    if e.x > max_x {
        e.x = max_x;
        e.vx = -e.vx.abs();
    }
    if e.y < 0.0 {
        e.y = 0.0;
        e.vy = 0.0;
    }
    if e.y > terrain.height() - e.height {
        e.y = terrain.height() - e.height;
        e.vy = 0.0;
        e.on_ground = true;
    }

    if (e.x - e.last_x).abs() <= t.stuck_threshold {
        e.stuck_time += dt;
    } else {
        e.stuck_time = 0.0;
        e.last_x = e.x;
    }

    if e.stuck_time >= t.stuck_jump_time && e.on_ground {
        e.vy = -t.ground_jump_speed;
        e.vx += dir * t.stuck_boost;
        e.on_ground = false;
        e.stuck_time = 0.0;
    }
}

fn ground_enemy_fire(
    e: &mut GroundEnemy,
    tank: &Tank,
    pool: &mut ProjectilePool,
    tuning: &Tuning,
) -> bool {
    let t = &tuning.enemies;
    let (ex, ey) = ground_center(e);
    let (tx, ty) = tank.center();
    let (dx, dy) = (tx - ex, ty - ey);

    e.aim_angle = dy.atan2(dx);
    e.fire_cooldown = (e.fire_cooldown - tuning.world.frame_dt).max(0.0);

    if e.fire_cooldown > 0.0 || dx.hypot(dy) > t.shooting_range {
        return false;
    }

    let speed = bullet_speed_for(e.weapon, t);
    let velocity = (e.aim_angle.cos() * speed, e.aim_angle.sin() * speed);
    e.fire_cooldown = fire_cooldown_for(e.weapon, t);
    pool.spawn((ex, ey), velocity, e.weapon, true)
}

// ── Flying behaviour ─────────────────────────────────────────────────────────

/// Drift, bob and burst-fire every live flying enemy.  Returns shots fired.
pub fn update_flying_enemies(
    enemies: &mut [FlyingEnemy],
    tank: &Tank,
    terrain: &Terrain,
    pool: &mut ProjectilePool,
    tuning: &Tuning,
) -> u32 {
    let t = &tuning.enemies;
    let dt = tuning.world.frame_dt;
    let (tx, ty) = tank.center();
    let mut shots = 0;

    for fe in enemies.iter_mut().filter(|e| e.alive) {
        fe.phase += dt * t.bob_rate;
        fe.y = fe.base_y + fe.phase.sin() * t.bob_amplitude;

        fe.x += fe.vx;
        let max_x = (terrain.width() - fe.width).max(0.0);
        if fe.x < 0.0 {
            fe.x = 0.0;
            fe.vx = fe.vx.abs();
        }
        if fe.x > max_x {
            fe.x = max_x;
            fe.vx = -fe.vx.abs();
        }
        fe.y = fe.y.clamp(0.0, (terrain.height() - fe.height).max(0.0));

        if !fe.in_burst {
            fe.rest_timer -= dt;
            if fe.rest_timer <= 0.0 {
                fe.in_burst = true;
                fe.burst_shots_left = t.burst_count;
                fe.shot_timer = 0.0;
            }
            continue;
        }

        fe.shot_timer -= dt;
        while fe.shot_timer <= 0.0 && fe.burst_shots_left > 0 {
            let (ex, ey) = flying_center(fe);
            let (dx, dy) = (tx - ex, ty - ey);
            if dx.hypot(dy) <= t.shooting_range {
                let angle = dy.atan2(dx);
                let velocity = (
                    angle.cos() * t.flying_bullet_speed,
                    angle.sin() * t.flying_bullet_speed,
                );
                if pool.spawn((ex, ey), velocity, WeaponKind::MachineGun, true) {
                    shots += 1;
                }
            }
            fe.burst_shots_left -= 1;
            fe.shot_timer += t.burst_interval;
        }

        if fe.burst_shots_left == 0 {
            fe.in_burst = false;
            fe.rest_timer = t.burst_rest;
        }
    }

    shots
}
