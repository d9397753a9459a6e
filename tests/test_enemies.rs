use tank_boy::enemies::*;
use tank_boy::entities::*;
use tank_boy::projectiles::*;
use tank_boy::tank::*;
use tank_boy::terrain::*;
use tank_boy::tuning::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn make_terrain() -> Terrain {
    Terrain::new(
        vec![Block {
            x: 0.0,
            y: 500.0,
            width: 2000.0,
            height: 100.0,
            surface: Surface::Ground,
        }],
        2000.0,
        600.0,
    )
}

fn ground_enemy(x: f32, y: f32) -> GroundEnemy {
    GroundEnemy {
        x,
        y,
        on_ground: true,
        alive: true,
        weapon: WeaponKind::MachineGun,
        fire_cooldown: 10.0,
        hp: 20,
        max_hp: 20,
        speed: 1.25,
        jump_timer: 100.0,
        last_x: x,
        width: 32.0,
        height: 20.0,
        ..GroundEnemy::default()
    }
}

fn flying_enemy(x: f32, base_y: f32) -> FlyingEnemy {
    FlyingEnemy {
        x,
        y: base_y,
        base_y,
        alive: true,
        rest_timer: 100.0,
        hp: 12,
        max_hp: 12,
        width: 28.0,
        height: 16.0,
        ..FlyingEnemy::default()
    }
}

// ── Spawning ──────────────────────────────────────────────────────────────────

#[test]
fn ground_wave_size_and_stats_follow_round() {
    let tuning = Tuning::default();
    let terrain = make_terrain();
    let mut enemies = vec![GroundEnemy::default(); 20];

    let spawned = spawn_ground_wave(&mut enemies, 1, 100.0, &terrain, &tuning, &mut seeded_rng());
    assert_eq!(spawned, 3);
    assert_eq!(alive_ground(&enemies), 3);

    for e in enemies.iter().filter(|e| e.alive) {
        assert_eq!(e.hp, 25);
        assert_eq!(e.max_hp, 25);
        assert!((e.speed - 1.25).abs() < 1e-6);
        assert_eq!(e.y + e.height, 500.0);
        assert!(e.on_ground);
        assert!(e.x >= 0.0 && e.x <= 2000.0 - e.width);
        assert!((e.x - 100.0).abs() >= 300.0 || e.x == 0.0);
        assert!(e.jump_timer >= 1.8 && e.jump_timer <= 2.2);
    }

    let mut enemies = vec![GroundEnemy::default(); 20];
    let spawned = spawn_ground_wave(&mut enemies, 4, 1000.0, &terrain, &tuning, &mut seeded_rng());
    assert_eq!(spawned, 6);
    assert!(enemies.iter().filter(|e| e.alive).all(|e| e.hp == 40));
}

#[test]
fn ground_wave_respects_capacity_and_live_slots() {
    let tuning = Tuning::default();
    let terrain = make_terrain();
    let mut enemies = vec![GroundEnemy::default(); 3];
    enemies[0] = ground_enemy(900.0, 480.0);
    enemies[0].hp = 999;

    let spawned = spawn_ground_wave(&mut enemies, 5, 100.0, &terrain, &tuning, &mut seeded_rng());
    assert_eq!(spawned, 2);
    assert_eq!(enemies[0].hp, 999);
    assert_eq!(enemies[0].x, 900.0);
    assert_eq!(alive_ground(&enemies), 3);
}

#[test]
fn flying_spawn_fills_one_slot() {
    let tuning = Tuning::default();
    let terrain = make_terrain();
    let mut enemies = vec![FlyingEnemy::default(); 2];
    let mut rng = seeded_rng();

    assert!(spawn_flying(&mut enemies, 2, 500.0, &terrain, &tuning, &mut rng));
    assert_eq!(alive_flying(&enemies), 1);

    let fe = &enemies[0];
    assert_eq!(fe.hp, 18);
    assert!((fe.vx.abs() - 1.4).abs() < 1e-5);
    assert!(fe.base_y >= 50.0 && fe.base_y < 500.0);
    assert!(!fe.in_burst);
    assert!(fe.rest_timer >= 0.5 && fe.rest_timer <= 1.0);

    assert!(spawn_flying(&mut enemies, 2, 500.0, &terrain, &tuning, &mut rng));
    assert!(!spawn_flying(&mut enemies, 2, 500.0, &terrain, &tuning, &mut rng));
    assert_eq!(alive_flying(&enemies), 2);
}

// ── Ground behaviour ──────────────────────────────────────────────────────────

#[test]
fn ground_enemy_chases_tank() {
    let tuning = Tuning::default();
    let terrain = make_terrain();
    let tank = Tank::new(100.0, 480.0, &tuning);
    let mut pool = ProjectilePool::new(10);
    let mut enemies = vec![ground_enemy(1500.0, 480.0), ground_enemy(20.0, 480.0)];

    update_ground_enemies(&mut enemies, &tank, &terrain, &mut pool, &tuning, &mut seeded_rng());

    assert_eq!(enemies[0].vx, -1.25);
    assert!((enemies[0].x - 1498.75).abs() < 1e-3);
    assert_eq!(enemies[1].vx, 1.25);
    assert!(enemies[0].on_ground);
    assert_eq!(enemies[0].y, 480.0);
}

#[test]
fn knockback_decays_back_to_chase_speed() {
    let tuning = Tuning::default();
    let terrain = make_terrain();
    let tank = Tank::new(100.0, 480.0, &tuning);
    let mut pool = ProjectilePool::new(10);
    let mut enemies = vec![ground_enemy(1500.0, 480.0)];
    enemies[0].vx = 4.5;
    let mut rng = seeded_rng();

    update_ground_enemies(&mut enemies, &tank, &terrain, &mut pool, &tuning, &mut rng);
    assert!((enemies[0].vx - 4.5 * 0.85).abs() < 1e-4);

    for _ in 0..30 {
        update_ground_enemies(&mut enemies, &tank, &terrain, &mut pool, &tuning, &mut rng);
    }
    assert_eq!(enemies[0].vx, -1.25);
}

#[test]
fn ground_enemy_falls_and_lands() {
    let tuning = Tuning::default();
    let terrain = make_terrain();
    let tank = Tank::new(100.0, 480.0, &tuning);
    let mut pool = ProjectilePool::new(10);
    let mut enemies = vec![ground_enemy(1500.0, 300.0)];
    enemies[0].on_ground = false;
    let mut rng = seeded_rng();

    update_ground_enemies(&mut enemies, &tank, &terrain, &mut pool, &tuning, &mut rng);
    assert!(!enemies[0].on_ground);
    assert!(enemies[0].vy > 0.0);

    for _ in 0..60 {
        update_ground_enemies(&mut enemies, &tank, &terrain, &mut pool, &tuning, &mut rng);
    }
    assert!(enemies[0].on_ground);
    assert_eq!(enemies[0].y, 480.0);
    assert_eq!(enemies[0].vy, 0.0);
}

#[test]
fn ground_enemy_jumps_when_timer_expires() {
    let tuning = Tuning::default();
    let terrain = make_terrain();
    let tank = Tank::new(100.0, 480.0, &tuning);
    let mut pool = ProjectilePool::new(10);
    let mut enemies = vec![ground_enemy(1500.0, 480.0)];
    enemies[0].jump_timer = 0.0;

    update_ground_enemies(&mut enemies, &tank, &terrain, &mut pool, &tuning, &mut seeded_rng());

    let e = &enemies[0];
    assert_eq!(e.vy, -8.5);
    assert!(!e.on_ground);
    assert!(e.y < 480.0);
    assert!(e.jump_timer >= 1.8 && e.jump_timer <= 2.2);
}

#[test]
fn stuck_enemy_jumps_with_boost() {
    let tuning = Tuning::default();
    // A wall the enemy cannot walk through.
    let terrain = Terrain::new(
        vec![
            Block {
                x: 0.0,
                y: 500.0,
                width: 2000.0,
                height: 100.0,
                surface: Surface::Ground,
            },
            Block {
                x: 1000.0,
                y: 0.0,
                width: 20.0,
                height: 500.0,
                surface: Surface::Ground,
            },
        ],
        2000.0,
        600.0,
    );
    let tank = Tank::new(100.0, 480.0, &tuning);
    let mut pool = ProjectilePool::new(10);
    let mut enemies = vec![ground_enemy(1020.0, 480.0)];
    let mut rng = seeded_rng();

    let mut jumped = false;
    for _ in 0..150 {
        update_ground_enemies(&mut enemies, &tank, &terrain, &mut pool, &tuning, &mut rng);
        if enemies[0].vy < 0.0 {
            jumped = true;
            break;
        }
    }
    assert!(jumped, "stuck enemy never jumped");
    assert!(enemies[0].vx < -1.25);
    assert_eq!(enemies[0].stuck_time, 0.0);
}

#[test]
fn ground_enemy_fires_in_range() {
    let tuning = Tuning::default();
    let terrain = make_terrain();
    let tank = Tank::new(100.0, 480.0, &tuning);
    let mut pool = ProjectilePool::new(10);
    let mut enemies = vec![ground_enemy(400.0, 480.0)];
    enemies[0].fire_cooldown = 0.0;

    let shots =
        update_ground_enemies(&mut enemies, &tank, &terrain, &mut pool, &tuning, &mut seeded_rng());

    assert_eq!(shots, 1);
    let bullet = pool.alive().next().expect("enemy bullet");
    assert!(bullet.from_enemy);
    assert_eq!(bullet.kind, WeaponKind::MachineGun);
    assert!(bullet.vx < 0.0);
    assert_eq!(enemies[0].fire_cooldown, 1.5);
    assert!(enemies[0].aim_angle.cos() < 0.0);
}

#[test]
fn ground_enemy_holds_fire_out_of_range_or_cooling_down() {
    let tuning = Tuning::default();
    let terrain = make_terrain();
    let tank = Tank::new(100.0, 480.0, &tuning);
    let mut pool = ProjectilePool::new(10);
    let mut enemies = vec![ground_enemy(1500.0, 480.0), ground_enemy(400.0, 480.0)];
    enemies[0].fire_cooldown = 0.0;
    enemies[1].fire_cooldown = 1.0;

    let shots =
        update_ground_enemies(&mut enemies, &tank, &terrain, &mut pool, &tuning, &mut seeded_rng());
    assert_eq!(shots, 0);
    assert_eq!(pool.alive_count(), 0);
}

#[test]
fn cannon_enemy_uses_cannon_cooldown() {
    let tuning = Tuning::default();
    let terrain = make_terrain();
    let tank = Tank::new(100.0, 480.0, &tuning);
    let mut pool = ProjectilePool::new(10);
    let mut enemies = vec![ground_enemy(400.0, 480.0)];
    enemies[0].weapon = WeaponKind::Cannon;
    enemies[0].fire_cooldown = 0.0;

    update_ground_enemies(&mut enemies, &tank, &terrain, &mut pool, &tuning, &mut seeded_rng());
    assert_eq!(enemies[0].fire_cooldown, 3.0);
    assert_eq!(pool.alive().next().expect("shell").kind, WeaponKind::Cannon);
}

#[test]
fn behaviour_never_changes_hp_or_alive() {
    let tuning = Tuning::default();
    let terrain = make_terrain();
    let tank = Tank::new(100.0, 480.0, &tuning);
    let mut pool = ProjectilePool::new(10);
    let mut ground = vec![ground_enemy(110.0, 480.0), GroundEnemy::default()];
    let mut flying = vec![flying_enemy(100.0, 300.0), FlyingEnemy::default()];
    let mut rng = seeded_rng();

    for _ in 0..120 {
        update_ground_enemies(&mut ground, &tank, &terrain, &mut pool, &tuning, &mut rng);
        update_flying_enemies(&mut flying, &tank, &terrain, &mut pool, &tuning);
    }
    assert_eq!(ground[0].hp, 20);
    assert!(ground[0].alive);
    assert_eq!(flying[0].hp, 12);
    assert!(flying[0].alive);
    assert_eq!(ground[1], GroundEnemy::default());
    assert_eq!(flying[1], FlyingEnemy::default());
}

// ── Flying behaviour ──────────────────────────────────────────────────────────

#[test]
fn flying_enemy_bobs_around_baseline() {
    let tuning = Tuning::default();
    let terrain = make_terrain();
    let tank = Tank::new(100.0, 480.0, &tuning);
    let mut pool = ProjectilePool::new(10);
    let mut enemies = vec![flying_enemy(1000.0, 200.0)];

    for _ in 0..45 {
        update_flying_enemies(&mut enemies, &tank, &terrain, &mut pool, &tuning);
    }
    let fe = &enemies[0];
    // 45 frames at 2 rad/s.
    assert!((fe.phase - 1.5).abs() < 1e-3);
    assert!((fe.y - (200.0 + 1.5f32.sin() * 30.0)).abs() < 1e-2);
    assert_eq!(fe.base_y, 200.0);
}

#[test]
fn flying_enemy_reverses_at_world_edge() {
    let tuning = Tuning::default();
    let terrain = make_terrain();
    let tank = Tank::new(100.0, 480.0, &tuning);
    let mut pool = ProjectilePool::new(10);
    let mut enemies = vec![flying_enemy(1971.0, 200.0), flying_enemy(0.5, 200.0)];
    enemies[0].vx = 2.0;
    enemies[1].vx = -2.0;

    update_flying_enemies(&mut enemies, &tank, &terrain, &mut pool, &tuning);

    assert_eq!(enemies[0].x, 1972.0);
    assert_eq!(enemies[0].vx, -2.0);
    assert_eq!(enemies[1].x, 0.0);
    assert_eq!(enemies[1].vx, 2.0);
}

#[test]
fn flying_enemy_fires_bursts_then_rests() {
    let tuning = Tuning::default();
    let terrain = make_terrain();
    let tank = Tank::new(100.0, 480.0, &tuning);
    let mut pool = ProjectilePool::new(100);
    let mut enemies = vec![flying_enemy(300.0, 200.0)];
    enemies[0].rest_timer = 0.0;

    // The rest timer expiring only arms the burst.
    let first = update_flying_enemies(&mut enemies, &tank, &terrain, &mut pool, &tuning);
    assert_eq!(first, 0);
    assert!(enemies[0].in_burst);
    assert_eq!(enemies[0].burst_shots_left, 10);

    let mut shots = 0;
    for _ in 0..60 {
        shots += update_flying_enemies(&mut enemies, &tank, &terrain, &mut pool, &tuning);
    }
    assert_eq!(shots, 10);
    assert!(!enemies[0].in_burst);
    assert!(enemies[0].rest_timer > 1.0);
    assert!(pool.alive().all(|p| p.from_enemy && p.kind == WeaponKind::MachineGun));
}

#[test]
fn flying_enemy_out_of_range_spends_burst_silently() {
    let tuning = Tuning::default();
    let terrain = make_terrain();
    let tank = Tank::new(100.0, 480.0, &tuning);
    let mut pool = ProjectilePool::new(100);
    let mut enemies = vec![flying_enemy(1800.0, 200.0)];
    enemies[0].rest_timer = 0.0;

    let mut shots = 0;
    for _ in 0..60 {
        shots += update_flying_enemies(&mut enemies, &tank, &terrain, &mut pool, &tuning);
    }
    assert_eq!(shots, 0);
    assert_eq!(pool.alive_count(), 0);
    assert!(!enemies[0].in_burst);
}

#[test]
fn extreme_hp_scaling_saturates() {
    let mut tuning = Tuning::default();
    tuning.enemies.ground_hp_per_round = 2_000_000_000;
    tuning.enemies.flying_hp_per_round = 2_000_000_000;
    let terrain = make_terrain();
    let mut rng = seeded_rng();

    let mut ground = vec![GroundEnemy::default(); 10];
    assert_eq!(spawn_ground_wave(&mut ground, 3, 100.0, &terrain, &tuning, &mut rng), 5);
    assert!(ground.iter().filter(|e| e.alive).all(|e| e.hp == i32::MAX));

    let mut flying = vec![FlyingEnemy::default(); 1];
    assert!(spawn_flying(&mut flying, 3, 100.0, &terrain, &tuning, &mut rng));
    assert_eq!(flying[0].hp, i32::MAX);
}
