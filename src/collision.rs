/// Collision detection and the damage / knockback paths it feeds.
///
/// Runs once per frame after every body has moved.  Any index that is out of
/// range, or that points at a dead enemy or projectile, is silently ignored.
use tracing::{debug, info};

use crate::enemies::{flying_center, ground_center};
use crate::entities::{EnemyKind, GameState, GameStatus, WeaponKind};

// ── Geometry ─────────────────────────────────────────────────────────────────

/// Edges inclusive.
pub fn point_in_rect(px: f32, py: f32, rx: f32, ry: f32, rw: f32, rh: f32) -> bool {
    px >= rx && px <= rx + rw && py >= ry && py <= ry + rh
}

/// Touching edges count as overlap.
#[allow(clippy::too_many_arguments)]
pub fn rect_overlap(
    x1: f32,
    y1: f32,
    w1: f32,
    h1: f32,
    x2: f32,
    y2: f32,
    w2: f32,
    h2: f32,
) -> bool {
    !(x1 > x2 + w2 || x1 + w1 < x2 || y1 > y2 + h2 || y1 + h1 < y2)
}

// ── Damage ───────────────────────────────────────────────────────────────────

/// The only path that lowers tank hp.  Does nothing while the tank is
/// invincible; otherwise subtracts `damage` (clamped at zero) and restarts
/// the invincibility window.  Returns true if damage was applied.
pub fn apply_damage_to_tank(state: &mut GameState, damage: i32) -> bool {
    if state.tank.invincibility() > 0.0 {
        return false;
    }

    let hp = state.tank.hp().saturating_sub(damage).max(0);
    state.tank.set_hp(hp);
    state.tank.set_invincibility(state.tuning.tank.invincible_time);
    state.events.tank_hit = true;
    debug!(damage, hp, "tank hit");

    if state.tank.hp() == 0 && state.status == GameStatus::Playing {
        state.status = GameStatus::GameOver;
        info!(score = state.score, round = state.round, "tank destroyed");
    }
    true
}

/// Returns true if the hit killed the enemy.
pub fn apply_damage_to_enemy(state: &mut GameState, index: usize, damage: i32) -> bool {
    let Some(e) = state.ground_enemies.get_mut(index) else {
        return false;
    };
    if !e.alive {
        return false;
    }

    e.hp -= damage;
    if e.hp > 0 {
        return false;
    }
    e.alive = false;
    record_kill(state, EnemyKind::Ground);
    true
}

/// Returns true if the hit killed the enemy.
pub fn apply_damage_to_flying_enemy(state: &mut GameState, index: usize, damage: i32) -> bool {
    let Some(fe) = state.flying_enemies.get_mut(index) else {
        return false;
    };
    if !fe.alive {
        return false;
    }

    fe.hp -= damage;
    if fe.hp > 0 {
        return false;
    }
    fe.alive = false;
    record_kill(state, EnemyKind::Flying);
    true
}

fn record_kill(state: &mut GameState, kind: EnemyKind) {
    let base = match kind {
        EnemyKind::Ground => state.tuning.combat.score_ground,
        EnemyKind::Flying => state.tuning.combat.score_flying,
    };
    let points = base.saturating_mul(state.round.max(1));
    state.score = state.score.saturating_add(points);
    state.events.enemies_destroyed += 1;
    info!(?kind, points, score = state.score, "enemy destroyed");
}

// ── Knockback ────────────────────────────────────────────────────────────────

pub fn apply_knockback_to_tank(state: &mut GameState, vx: f32, vy: f32) {
    state.tank.set_velocity(vx, vy);
}

pub fn apply_knockback_to_enemy(state: &mut GameState, index: usize, vx: f32, vy: f32) {
    if let Some(e) = state.ground_enemies.get_mut(index) {
        if e.alive {
            e.vx = vx;
            e.vy = vy;
        }
    }
}

// ── Responses ────────────────────────────────────────────────────────────────

/// Contact between the tank and ground enemy `index`: contact damage (gated
/// by invincibility), then opposite knockback and a small push apart.
pub fn handle_tank_enemy_collision(state: &mut GameState, index: usize) {
    match state.ground_enemies.get(index) {
        Some(e) if e.alive => {}
        _ => return,
    }

    let c = state.tuning.combat;
    apply_damage_to_tank(state, c.contact_damage);

    let (tank_cx, _) = state.tank.center();
    let (enemy_cx, _) = ground_center(&state.ground_enemies[index]);
    let dir = if tank_cx < enemy_cx { -1.0 } else { 1.0 };

    apply_knockback_to_tank(state, dir * c.knockback_tank_vx, -c.knockback_tank_vy);
    apply_knockback_to_enemy(state, index, -dir * c.knockback_enemy_vx, -c.knockback_enemy_vy);

    let (tx, ty) = state.tank.position();
    state.tank.set_position(tx + dir * c.separation, ty);
    state.ground_enemies[index].x -= dir * c.separation;
}

/// Direct machine-gun hit: the bullet dies and the target takes point damage.
pub fn handle_bullet_enemy_collision(
    state: &mut GameState,
    bullet: usize,
    enemy: usize,
    kind: EnemyKind,
) {
    if !state.projectiles.kill(bullet) {
        return;
    }

    let damage = state.tuning.combat.mg_damage;
    match kind {
        EnemyKind::Ground => apply_damage_to_enemy(state, enemy, damage),
        EnemyKind::Flying => apply_damage_to_flying_enemy(state, enemy, damage),
    };
}

/// Radial blast centred on `(ex, ey)`.  Damage falls off linearly to zero at
/// the splash radius; ground survivors are shoved away from the centre.
/// Flying enemies only take damage.
pub fn apply_cannon_explosion(state: &mut GameState, ex: f32, ey: f32) {
    let c = state.tuning.combat;
    let radius = c.splash_radius;

    for i in 0..state.ground_enemies.len() {
        if !state.ground_enemies[i].alive {
            continue;
        }
        let (cx, cy) = ground_center(&state.ground_enemies[i]);
        let (dx, dy) = (cx - ex, cy - ey);
        let dist = dx.hypot(dy);
        let damage = (c.cannon_damage as f32 * (1.0 - dist / radius)) as i32;
        if damage <= 0 {
            continue;
        }

        if apply_damage_to_enemy(state, i, damage) {
            continue;
        }
        let dist = dist.max(1.0);
        if dist < radius {
            let e = &mut state.ground_enemies[i];
            e.vx += dx / dist * c.splash_knockback;
            e.vy -= (dy / dist).abs() * c.knockback_enemy_vy;
        }
    }

    for i in 0..state.flying_enemies.len() {
        if !state.flying_enemies[i].alive {
            continue;
        }
        let (cx, cy) = flying_center(&state.flying_enemies[i]);
        let dist = (cx - ex).hypot(cy - ey);
        let damage = (c.cannon_damage as f32 * (1.0 - dist / radius)) as i32;
        if damage > 0 {
            apply_damage_to_flying_enemy(state, i, damage);
        }
    }
}

// ── Passes ───────────────────────────────────────────────────────────────────

/// Player bullets against enemies.  Ground enemies are tested before flying
/// ones and a bullet hits at most one target.
pub fn bullets_hit_enemies(state: &mut GameState) {
    for b in 0..state.projectiles.capacity() {
        let Some(&p) = state.projectiles.get(b) else {
            continue;
        };
        if !p.alive || p.from_enemy {
            continue;
        }

        let target = state
            .ground_enemies
            .iter()
            .position(|e| e.alive && point_in_rect(p.x, p.y, e.x, e.y, e.width, e.height))
            .map(|i| (i, EnemyKind::Ground))
            .or_else(|| {
                state
                    .flying_enemies
                    .iter()
                    .position(|e| e.alive && point_in_rect(p.x, p.y, e.x, e.y, e.width, e.height))
                    .map(|i| (i, EnemyKind::Flying))
            });

        let Some((index, kind)) = target else {
            continue;
        };

        match p.kind {
            WeaponKind::Cannon => {
                state.projectiles.kill(b);
                apply_cannon_explosion(state, p.x, p.y);
            }
            WeaponKind::MachineGun => handle_bullet_enemy_collision(state, b, index, kind),
        }
    }
}

/// Enemy bullets against the tank.  A bullet that lands during invincibility
/// still dies.
pub fn bullets_hit_tank(state: &mut GameState) {
    if state.tank.hp() <= 0 {
        return;
    }

    for b in 0..state.projectiles.capacity() {
        let Some(&p) = state.projectiles.get(b) else {
            continue;
        };
        if !p.alive || !p.from_enemy {
            continue;
        }

        let (tx, ty) = state.tank.position();
        let (tw, th) = state.tank.size();
        if point_in_rect(p.x, p.y, tx, ty, tw, th) {
            state.projectiles.kill(b);
            let damage = state.tuning.combat.mg_damage;
            apply_damage_to_tank(state, damage);
        }
    }
}

pub fn tank_touch_ground_enemy(state: &mut GameState) {
    if state.tank.hp() <= 0 {
        return;
    }

    for i in 0..state.ground_enemies.len() {
        let e = state.ground_enemies[i];
        if !e.alive {
            continue;
        }
        let (tx, ty) = state.tank.position();
        let (tw, th) = state.tank.size();
        if rect_overlap(tx, ty, tw, th, e.x, e.y, e.width, e.height) {
            handle_tank_enemy_collision(state, i);
        }
    }
}

/// Full end-of-frame resolution.
pub fn resolve_collisions(state: &mut GameState) {
    bullets_hit_enemies(state);
    bullets_hit_tank(state);
    tank_touch_ground_enemy(state);
}
