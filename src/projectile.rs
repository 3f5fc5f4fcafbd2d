//! Bullet lifecycle: capped spawn, bounds despawn, live-only queries
//!
//! Each owner class (player, enemies) has an independent cap on concurrent
//! bullets; a spawn at the cap is rejected silently, not queued. Bullets die
//! when they fall below the floor threshold or leave the arena radius, and a
//! dead bullet is pruned in the same update pass — the collision resolver
//! never sees one.

use glam::Vec3;

use crate::events::{EventSink, GameEvent};
use crate::physics::{BodyKey, Material, PhysicsWorld, RigidBody};

/// Who fired a projectile; routes caps and collision rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Player,
    Enemy,
}

const BULLET_RADIUS: f32 = 0.15;

/// One live bullet
#[derive(Debug, Clone, Copy)]
pub struct Projectile {
    pub body: BodyKey,
    pub owner: Owner,
    pub damage: i32,
    pub alive: bool,
}

/// Owns every projectile in flight
pub struct ProjectileManager {
    projectiles: Vec<Projectile>,
    max_player: usize,
    max_enemy: usize,
    floor_y: f32,
    max_range: f32,
}

impl ProjectileManager {
    pub fn new(max_player: usize, max_enemy: usize, floor_y: f32, max_range: f32) -> Self {
        Self {
            projectiles: Vec::new(),
            max_player,
            max_enemy,
            floor_y,
            max_range,
        }
    }

    fn cap(&self, owner: Owner) -> usize {
        match owner {
            Owner::Player => self.max_player,
            Owner::Enemy => self.max_enemy,
        }
    }

    /// Live bullets for one owner
    pub fn live_count(&self, owner: Owner) -> usize {
        self.projectiles
            .iter()
            .filter(|p| p.alive && p.owner == owner)
            .count()
    }

    /// Fire a bullet. Returns `false` with no side effect when the owner is
    /// at its cap. `direction` is normalized defensively; a near-zero vector
    /// falls back to +Z.
    pub fn spawn(
        &mut self,
        world: &mut PhysicsWorld,
        events: &mut dyn EventSink,
        origin: Vec3,
        direction: Vec3,
        owner: Owner,
        speed: f32,
        damage: i32,
    ) -> bool {
        let live = self.live_count(owner);
        if live >= self.cap(owner) {
            log::trace!("bullet spawn rejected at cap ({live}) for {owner:?}");
            return false;
        }

        let direction = if direction.length_squared() < 1e-6 {
            Vec3::Z
        } else {
            direction.normalize()
        };

        let mut body = RigidBody::new(origin, BULLET_RADIUS, 1.0, Material::Bullet)
            .without_ground_collision();
        body.velocity = direction * speed;
        let key = world.add_body(body);

        self.projectiles.push(Projectile {
            body: key,
            owner,
            damage,
            alive: true,
        });
        log::debug!("bullet spawned by {owner:?} at {origin}");

        if owner == Owner::Player {
            events.emit(GameEvent::BulletsChanged {
                count: self.live_count(Owner::Player),
                max: self.max_player,
            });
        }
        true
    }

    /// Mark the projectile owning `body` dead and release its physics body.
    /// Player-owned despawns report the new live count, so the HUD tracks
    /// hits as well as expiries. Idempotent: a second call for the same
    /// bullet changes nothing and emits nothing.
    pub fn despawn(&mut self, world: &mut PhysicsWorld, events: &mut dyn EventSink, body: BodyKey) {
        if let Some(p) = self
            .projectiles
            .iter_mut()
            .find(|p| p.body == body && p.alive)
        {
            p.alive = false;
            let owner = p.owner;
            world.remove_body(body);
            if owner == Owner::Player {
                events.emit(GameEvent::BulletsChanged {
                    count: self.live_count(Owner::Player),
                    max: self.max_player,
                });
            }
        }
    }

    /// Expire out-of-bounds bullets and prune everything dead this tick
    pub fn update(&mut self, world: &mut PhysicsWorld, events: &mut dyn EventSink) {
        let before = self.live_count(Owner::Player);

        for p in self.projectiles.iter_mut() {
            if !p.alive {
                continue;
            }
            let expired = match world.position(p.body) {
                Some(pos) => {
                    pos.y < self.floor_y
                        || Vec3::new(pos.x, 0.0, pos.z).length() > self.max_range
                }
                // Body already destroyed elsewhere
                None => true,
            };
            if expired {
                p.alive = false;
                world.remove_body(p.body);
            }
        }

        // No dead entries survive a tick boundary
        self.projectiles.retain(|p| p.alive);

        let after = self.live_count(Owner::Player);
        if after != before {
            events.emit(GameEvent::BulletsChanged {
                count: after,
                max: self.max_player,
            });
        }
    }

    /// Live projectiles for one owner (collision resolution reads only)
    pub fn active(&self, owner: Owner) -> impl Iterator<Item = &Projectile> {
        self.projectiles
            .iter()
            .filter(move |p| p.alive && p.owner == owner)
    }

    /// Release every remaining body (teardown)
    pub fn release_bodies(&mut self, world: &mut PhysicsWorld) {
        for p in self.projectiles.drain(..) {
            world.remove_body(p.body);
        }
    }
}
