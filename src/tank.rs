/// The player tank: movement physics plus the two-weapon state machine.
///
/// Combat state (hp, invincibility, velocity, position) is private and only
/// reachable through the accessors below, which enforce the tank's invariants.
use tracing::debug;

use crate::entities::{InputSnapshot, WeaponKind};
use crate::projectiles::ProjectilePool;
use crate::terrain::Terrain;
use crate::tuning::Tuning;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MachineGunState {
    pub firing: bool,
    /// Seconds of uninterrupted fire; reaching the limit forces a reload.
    pub fire_time: f32,
    pub shot_cooldown: f32,
    pub reloading: bool,
    pub reload_time: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CannonState {
    pub charging: bool,
    pub power: f32,
}

/// Active weapon together with the state only that weapon needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Weapon {
    MachineGun(MachineGunState),
    Cannon(CannonState),
}

impl Default for Weapon {
    fn default() -> Self {
        Weapon::MachineGun(MachineGunState::default())
    }
}

impl Weapon {
    pub fn kind(&self) -> WeaponKind {
        match self {
            Weapon::MachineGun(_) => WeaponKind::MachineGun,
            Weapon::Cannon(_) => WeaponKind::Cannon,
        }
    }

    /// The other weapon, freshly readied.  Outgoing state is discarded.
    pub fn toggled(&self) -> Weapon {
        match self {
            Weapon::MachineGun(_) => Weapon::Cannon(CannonState::default()),
            Weapon::Cannon(_) => Weapon::MachineGun(MachineGunState::default()),
        }
    }

    /// Charge fill in `0.0..=1.0`; zero unless the cannon is charging.
    pub fn charge_ratio(&self, power_cap: f32) -> f32 {
        match self {
            Weapon::Cannon(c) if c.charging && power_cap > 0.0 => {
                (c.power / power_cap).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    /// Reload progress in `0.0..=1.0`; zero unless the machine gun is reloading.
    pub fn reload_ratio(&self, reload_time: f32) -> f32 {
        match self {
            Weapon::MachineGun(m) if m.reloading && reload_time > 0.0 => {
                ((reload_time - m.reload_time) / reload_time).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tank {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    on_ground: bool,
    width: f32,
    height: f32,
    weapon: Weapon,
    aim_angle: f32,
    hp: i32,
    max_hp: i32,
    invincible: f32,
}

impl Tank {
    /// A grounded tank at full health with the machine gun ready.
    pub fn new(x: f32, y: f32, tuning: &Tuning) -> Tank {
        Tank {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            on_ground: true,
            width: tuning.tank.width,
            height: tuning.tank.height,
            weapon: Weapon::default(),
            aim_angle: tuning.weapons.initial_aim_angle,
            hp: tuning.tank.max_hp,
            max_hp: tuning.tank.max_hp,
            invincible: 0.0,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn velocity(&self) -> (f32, f32) {
        (self.vx, self.vy)
    }

    pub fn set_velocity(&mut self, vx: f32, vy: f32) {
        self.vx = vx;
        self.vy = vy;
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    /// Clamped to `0..=max_hp`.
    pub fn set_hp(&mut self, hp: i32) {
        self.hp = hp.clamp(0, self.max_hp);
    }

    pub fn invincibility(&self) -> f32 {
        self.invincible
    }

    /// Negative values are stored as zero.
    pub fn set_invincibility(&mut self, seconds: f32) {
        self.invincible = seconds.max(0.0);
    }

    pub fn is_on_ground(&self) -> bool {
        self.on_ground
    }

    pub fn weapon(&self) -> &Weapon {
        &self.weapon
    }

    pub fn aim_angle(&self) -> f32 {
        self.aim_angle
    }

    pub fn set_aim_angle(&mut self, angle: f32) {
        if angle.is_finite() {
            self.aim_angle = angle;
        }
    }

    pub fn toggle_weapon(&mut self) {
        self.weapon = self.weapon.toggled();
    }

    pub fn muzzle(&self) -> (f32, f32) {
        self.center()
    }

    // ── Per-frame update ──────────────────────────────────────────────────────

    /// Apply one frame of input and physics.  Returns the number of shots
    /// that made it into the pool.
    pub fn update(
        &mut self,
        input: &InputSnapshot,
        terrain: &Terrain,
        pool: &mut ProjectilePool,
        tuning: &Tuning,
    ) -> u32 {
        let dt = tuning.world.frame_dt;
        self.invincible = (self.invincible - dt).max(0.0);

        if let Some(angle) = input.aim_angle {
            self.set_aim_angle(angle);
        }

        self.move_horizontal(input, terrain, tuning);
        self.move_vertical(input, terrain, tuning);

        if input.toggle_weapon {
            self.toggle_weapon();
            debug!(weapon = ?self.weapon.kind(), "weapon toggled");
        }

        match self.weapon {
            Weapon::Cannon(cannon) => {
                let (cannon, shots) = self.step_cannon(cannon, input.fire_held, pool, tuning);
                self.weapon = Weapon::Cannon(cannon);
                shots
            }
            Weapon::MachineGun(mg) => {
                let (mg, shots) = self.step_machine_gun(mg, input.fire_held, pool, tuning);
                self.weapon = Weapon::MachineGun(mg);
                shots
            }
        }
    }

    fn move_horizontal(&mut self, input: &InputSnapshot, terrain: &Terrain, tuning: &Tuning) {
        let t = &tuning.tank;

        if input.move_left {
            self.vx -= t.accel;
        }
        if input.move_right {
            self.vx += t.accel;
        }
        self.vx *= t.friction;
        self.vx = self.vx.clamp(-t.max_speed, t.max_speed);
        self.x += self.vx;

        let max_x = (terrain.width() - self.width).max(0.0);
        if self.x < 0.0 || self.x > max_x {
            self.x = self.x.clamp(0.0, max_x);
            self.vx = 0.0;
        }
    }

    fn move_vertical(&mut self, input: &InputSnapshot, terrain: &Terrain, tuning: &Tuning) {
        let t = &tuning.tank;

        self.vy += t.gravity;
        if input.jump && self.on_ground {
            self.vy = -t.jump_speed;
            self.on_ground = false;
        }
        self.y += self.vy;

        let ground = terrain.ground_level_span(self.x, self.width);
        if self.y + self.height > ground {
            self.y = ground - self.height;
            self.vy = 0.0;
            self.on_ground = true;
        } else {
            self.on_ground = false;
        }

        if self.y < 0.0 {
            self.y = 0.0;
            self.vy = self.vy.max(0.0);
        }
    }

    fn step_cannon(
        &self,
        mut cannon: CannonState,
        fire_held: bool,
        pool: &mut ProjectilePool,
        tuning: &Tuning,
    ) -> (CannonState, u32) {
        let w = &tuning.weapons;

        if fire_held {
            cannon.charging = true;
            cannon.power = (cannon.power + w.cannon_charge_rate).min(w.cannon_power_cap);
            return (cannon, 0);
        }

        if !cannon.charging {
            return (cannon, 0);
        }

        let speed = cannon.power * w.cannon_speed_factor;
        let velocity = (self.aim_angle.cos() * speed, self.aim_angle.sin() * speed);
        let fired = pool.spawn(self.muzzle(), velocity, WeaponKind::Cannon, false);

        (CannonState::default(), u32::from(fired))
    }

    fn step_machine_gun(
        &self,
        mut mg: MachineGunState,
        fire_held: bool,
        pool: &mut ProjectilePool,
        tuning: &Tuning,
    ) -> (MachineGunState, u32) {
        let w = &tuning.weapons;
        let dt = tuning.world.frame_dt;
        let mut shots = 0;

        mg.shot_cooldown = (mg.shot_cooldown - dt).max(0.0);

        if mg.reloading {
            mg.reload_time -= dt;
            if mg.reload_time <= 0.0 {
                mg = MachineGunState::default();
                debug!("machine gun reloaded");
            }
        } else if fire_held {
            mg.firing = true;
            mg.fire_time += dt;

            if mg.shot_cooldown <= 0.0 {
                let velocity = (
                    self.aim_angle.cos() * w.mg_speed,
                    self.aim_angle.sin() * w.mg_speed,
                );
                if pool.spawn(self.muzzle(), velocity, WeaponKind::MachineGun, false) {
                    shots += 1;
                }
                mg.shot_cooldown = w.mg_cooldown;
            }

            if mg.fire_time >= w.mg_fire_duration {
                mg.firing = false;
                mg.reloading = true;
                mg.reload_time = w.mg_reload_time;
                debug!("machine gun overheated, reloading");
            }
        } else {
            mg.firing = false;
            mg.fire_time = 0.0;
        }

        (mg, shots)
    }
}
