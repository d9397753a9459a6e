/// Fixed-capacity bullet pool.
///
/// Slots are never allocated or freed during play: `spawn` revives the first
/// dead slot and every kill just clears the alive flag.
use tracing::debug;

use crate::entities::{Projectile, WeaponKind};
use crate::terrain::Terrain;
use crate::tuning::ProjectileTuning;

#[derive(Clone, Debug)]
pub struct ProjectilePool {
    slots: Vec<Projectile>,
    tuning: ProjectileTuning,
}

impl ProjectilePool {
    /// A pool of `capacity` dead slots using default projectile tuning.
    pub fn new(capacity: usize) -> ProjectilePool {
        ProjectilePool::from_tuning(ProjectileTuning {
            capacity,
            ..ProjectileTuning::default()
        })
    }

    pub fn from_tuning(tuning: ProjectileTuning) -> ProjectilePool {
        ProjectilePool {
            slots: vec![Projectile::default(); tuning.capacity],
            tuning,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Projectile] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<&Projectile> {
        self.slots.get(index)
    }

    pub fn alive(&self) -> impl Iterator<Item = &Projectile> + '_ {
        self.slots.iter().filter(|p| p.alive)
    }

    pub fn alive_count(&self) -> usize {
        self.alive().count()
    }

    /// Activate the first dead slot.  Returns false, leaving every slot
    /// untouched, when the pool is full.
    pub fn spawn(
        &mut self,
        origin: (f32, f32),
        velocity: (f32, f32),
        kind: WeaponKind,
        from_enemy: bool,
    ) -> bool {
        let Some(slot) = self.slots.iter_mut().find(|p| !p.alive) else {
            debug!(?kind, from_enemy, "projectile pool exhausted, shot dropped");
            return false;
        };

        let (width, height) = if from_enemy {
            (self.tuning.enemy_width, self.tuning.enemy_height)
        } else {
            (self.tuning.player_width, self.tuning.player_height)
        };

        *slot = Projectile {
            x: origin.0,
            y: origin.1,
            vx: velocity.0,
            vy: velocity.1,
            alive: true,
            kind,
            from_enemy,
            width,
            height,
            angle: velocity.1.atan2(velocity.0),
        };
        true
    }

    /// Deactivate a slot.  Out-of-range or already dead slots are ignored.
    /// Returns true if a live projectile was killed.
    pub fn kill(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(p) if p.alive => {
                p.alive = false;
                true
            }
            _ => false,
        }
    }

    /// Advance every live projectile by one frame.
    pub fn update(&mut self, terrain: &Terrain) {
        let gravity = self.tuning.cannon_gravity;

        for p in self.slots.iter_mut() {
            if !p.alive {
                continue;
            }

            if p.kind == WeaponKind::Cannon {
                p.vy += gravity;
                p.angle = p.vy.atan2(p.vx);
            }

            p.x += p.vx;
            p.y += p.vy;

            if terrain.collides_point(p.x, p.y) {
                p.alive = false;
                continue;
            }

            if p.x < 0.0 || p.x > terrain.width() || p.y < 0.0 || p.y > terrain.height() {
                p.alive = false;
            }
        }
    }
}
