//! Enemy population: capped spawning, seek AI, cooldown-gated shooting
//!
//! Spawning runs on a timer that fires at most once per elapsed interval —
//! if the loop stalls across several intervals, the backlog is dropped, not
//! burst-spawned. Each enemy pursues the player only inside a hysteresis
//! band (too close: stop; too far: give up), and shoots on an independent
//! jittered cooldown so volleys never synchronize.

use glam::Vec3;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::config::{BulletTuning, EnemyTuning};
use crate::consts::GROUND_Y;
use crate::events::{EventSink, GameEvent, SoundKey};
use crate::normalize_angle;
use crate::physics::{BodyKey, Material, PhysicsWorld, RigidBody};
use crate::projectile::{Owner, ProjectileManager};

const ENEMY_RADIUS: f32 = 0.6;
/// Muzzle height offset so shots clear the enemy's own body
const MUZZLE_HEIGHT: f32 = 0.4;

/// Result of applying damage to an enemy body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// No live enemy owns that body
    Miss,
    Damaged,
    /// Health crossed zero on this hit; reported exactly once per enemy
    Killed,
}

/// One hostile entity
#[derive(Debug, Clone, Copy)]
pub struct Enemy {
    pub body: BodyKey,
    pub health: i32,
    pub alive: bool,
    pub facing: f32,
    /// Seconds until this enemy may shoot again
    pub cooldown: f32,
}

/// Owns the enemy population
pub struct EnemyManager {
    enemies: Vec<Enemy>,
    tuning: EnemyTuning,
    spawn_center: Vec3,
    spawn_timer: f32,
    rng: Pcg32,
}

impl EnemyManager {
    pub fn new(tuning: EnemyTuning, spawn_center: Vec3, seed: u64) -> Self {
        Self {
            enemies: Vec::new(),
            tuning,
            spawn_center,
            spawn_timer: 0.0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn alive_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.alive).count()
    }

    /// Live enemies, for the collision resolver
    pub fn alive_enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| e.alive)
    }

    fn spawn_one(&mut self, world: &mut PhysicsWorld, events: &mut dyn EventSink) {
        let half = self.tuning.spawn_half_extent;
        let x = self.spawn_center.x + self.rng.random_range(-half..half);
        let z = self.spawn_center.z + self.rng.random_range(-half..half);
        let y = GROUND_Y + ENEMY_RADIUS + self.rng.random_range(0.2..1.0);

        let body = world.add_body(
            RigidBody::new(Vec3::new(x, y, z), ENEMY_RADIUS, 1.0, Material::Enemy)
                .with_fixed_rotation(),
        );
        self.enemies.push(Enemy {
            body,
            health: self.tuning.health,
            alive: true,
            facing: 0.0,
            cooldown: self.rng.random_range(self.tuning.cooldown_min..self.tuning.cooldown_max),
        });
        log::debug!("enemy spawned at ({x:.1}, {z:.1})");
        events.emit(GameEvent::EnemyCountChanged {
            count: self.alive_count(),
        });
    }

    /// Spawn immediately, bypassing the interval timer (debug/tests). Still
    /// rejects silently at the population cap.
    pub fn force_spawn(
        &mut self,
        world: &mut PhysicsWorld,
        events: &mut dyn EventSink,
    ) -> Option<BodyKey> {
        if self.alive_count() >= self.tuning.max_enemies {
            return None;
        }
        self.spawn_one(world, events);
        self.enemies.last().map(|e| e.body)
    }

    /// Advance the spawn timer, drive per-enemy AI and shooting, and prune
    /// everything that died since the last pass.
    pub fn update(
        &mut self,
        world: &mut PhysicsWorld,
        dt: f32,
        player_pos: Option<Vec3>,
        projectiles: &mut ProjectileManager,
        bullet: BulletTuning,
        events: &mut dyn EventSink,
    ) {
        // One spawn per elapsed interval; a cap-limited interval is forfeited
        self.spawn_timer += dt;
        if self.spawn_timer >= self.tuning.spawn_interval_sec {
            self.spawn_timer = 0.0;
            if self.alive_count() < self.tuning.max_enemies {
                self.spawn_one(world, events);
            }
        }

        if let Some(target) = player_pos {
            self.update_ai(world, dt, target, projectiles, bullet, events);
        }

        self.prune_dead(world, events);
    }

    fn update_ai(
        &mut self,
        world: &mut PhysicsWorld,
        dt: f32,
        target: Vec3,
        projectiles: &mut ProjectileManager,
        bullet: BulletTuning,
        events: &mut dyn EventSink,
    ) {
        for enemy in self.enemies.iter_mut().filter(|e| e.alive) {
            let Some(pos) = world.position(enemy.body) else {
                continue;
            };
            let dx = target.x - pos.x;
            let dz = target.z - pos.z;
            let distance = (dx * dx + dz * dz).sqrt();

            enemy.facing = normalize_angle(dx.atan2(dz));

            let Some(body) = world.body_mut(enemy.body) else {
                continue;
            };
            body.yaw = enemy.facing;

            // Pursue only inside the hysteresis band
            let mut velocity = body.velocity;
            if distance > self.tuning.near_distance && distance < self.tuning.far_distance {
                let inv = 1.0 / distance.max(1e-4);
                velocity.x = dx * inv * self.tuning.speed;
                velocity.z = dz * inv * self.tuning.speed;
            } else {
                velocity.x = 0.0;
                velocity.z = 0.0;
            }
            body.set_velocity(velocity);

            // Cooldown-gated shooting, aimed at the player's current position.
            // An expired timer holds until the player is in range; only a
            // shot attempt resets it.
            enemy.cooldown -= dt;
            if enemy.cooldown <= 0.0 && distance < self.tuning.fire_range {
                let muzzle = pos + Vec3::Y * MUZZLE_HEIGHT;
                let aim = target - muzzle;
                if projectiles.spawn(
                    world,
                    events,
                    muzzle,
                    aim,
                    Owner::Enemy,
                    bullet.speed,
                    bullet.damage,
                ) {
                    events.emit(GameEvent::Sound(SoundKey::EnemyShoot));
                }
                // Reset with jitter even if the shot was capacity-rejected
                enemy.cooldown = self
                    .rng
                    .random_range(self.tuning.cooldown_min..self.tuning.cooldown_max);
            }
        }
    }

    /// Apply damage to the enemy owning `body`. `Killed` fires exactly once,
    /// on the transition of health to ≤ 0; dead enemies are skipped.
    pub fn check_hit(&mut self, body: BodyKey, damage: i32) -> HitOutcome {
        let Some(enemy) = self
            .enemies
            .iter_mut()
            .find(|e| e.body == body && e.alive)
        else {
            return HitOutcome::Miss;
        };

        enemy.health -= damage;
        if enemy.health <= 0 {
            enemy.alive = false;
            log::debug!("enemy down");
            HitOutcome::Killed
        } else {
            HitOutcome::Damaged
        }
    }

    /// Destroy and drop every dead enemy; bodies are removed exactly once
    fn prune_dead(&mut self, world: &mut PhysicsWorld, events: &mut dyn EventSink) {
        let before = self.enemies.len();
        for enemy in self.enemies.iter().filter(|e| !e.alive) {
            world.remove_body(enemy.body);
        }
        self.enemies.retain(|e| e.alive);
        if self.enemies.len() != before {
            events.emit(GameEvent::EnemyCountChanged {
                count: self.alive_count(),
            });
        }
    }

    /// Release every remaining body (teardown)
    pub fn release_bodies(&mut self, world: &mut PhysicsWorld) {
        for enemy in self.enemies.drain(..) {
            world.remove_body(enemy.body);
        }
    }
}
