//! Cube Arena - a 3D arcade game core
//!
//! A movable avatar (cube or car) roams a physics-simulated arena, collects
//! coins, and trades fire with spawning enemies. This crate is the gameplay
//! core only: the per-tick orchestration of input, rigid-body stepping,
//! projectile lifecycle, enemy AI, and hit resolution. Rendering, HUD, and
//! audio are external collaborators fed through transform reads and
//! fire-and-forget events.
//!
//! Core modules:
//! - `physics`: fixed-timestep rigid-body world with contact materials
//! - `input`: logical action snapshot decoupled from device key codes
//! - `player`: cube/vehicle avatars, movement, camera parameters
//! - `projectile`: capped bullet pool with bounds-based despawn
//! - `enemy`: capped enemy population, seek AI, cooldown-gated shooting
//! - `coin`: pooled pickups with proximity collection
//! - `game`: the tick orchestrator and collision resolver

pub mod assets;
pub mod coin;
pub mod config;
pub mod enemy;
pub mod events;
pub mod game;
pub mod input;
pub mod physics;
pub mod player;
pub mod projectile;
pub mod session;

pub use config::GameConfig;
pub use events::{EventLog, EventSink, GameEvent, NullSink, SoundKey};
pub use game::Game;

use glam::Vec3;

/// Game tuning constants (compiled defaults; see [`config::GameConfig`] for
/// the data-driven overrides)
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const FIXED_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 5;
    /// Clamp on wall-clock frame delta (first frame has no prior timestamp)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Gravity acceleration along Y (units/s²)
    pub const GRAVITY_Y: f32 = -20.0;
    /// Ground plane height
    pub const GROUND_Y: f32 = 0.0;
    /// Height tolerance for the derived "grounded" condition
    pub const GROUND_EPSILON: f32 = 0.05;
    /// Vertical speed below which a body counts as resting
    pub const GROUND_STOP_THRESHOLD: f32 = 0.5;

    /// Player bullet tuning
    pub const PLAYER_BULLET_SPEED: f32 = 40.0;
    pub const PLAYER_BULLET_DAMAGE: i32 = 25;
    pub const MAX_PLAYER_BULLETS: usize = 10;

    /// Enemy bullet tuning
    pub const ENEMY_BULLET_SPEED: f32 = 30.0;
    pub const ENEMY_BULLET_DAMAGE: i32 = 10;
    pub const MAX_ENEMY_BULLETS: usize = 30;

    /// Bullets despawn below this height or past this radial distance
    pub const BULLET_FLOOR_Y: f32 = -2.0;
    pub const BULLET_MAX_RANGE: f32 = 120.0;

    /// Enemy population and AI tuning
    pub const MAX_ENEMIES: usize = 5;
    pub const ENEMY_SPAWN_INTERVAL_SEC: f32 = 6.0;
    pub const ENEMY_HEALTH: i32 = 40;
    pub const ENEMY_SPEED: f32 = 4.0;
    /// Seek hysteresis band: pursue only while near < distance < far
    pub const ENEMY_NEAR_DISTANCE: f32 = 3.0;
    pub const ENEMY_FAR_DISTANCE: f32 = 40.0;
    pub const ENEMY_FIRE_RANGE: f32 = 30.0;
    /// Shoot cooldown reset band (randomized to desynchronize volleys)
    pub const ENEMY_COOLDOWN_MIN: f32 = 1.5;
    pub const ENEMY_COOLDOWN_MAX: f32 = 3.5;

    /// Coin pool
    pub const COIN_COUNT: usize = 20;
    pub const COIN_PICKUP_RADIUS: f32 = 2.2;

    /// Scoring
    pub const SCORE_PER_COIN: u32 = 100;
    pub const SCORE_PER_KILL: u32 = 100;
    /// Player health ceiling
    pub const PLAYER_MAX_HEALTH: i32 = 100;

    /// Hit-test radii for the loop-level collision resolver
    pub const ENEMY_HIT_RADIUS: f32 = 1.2;
    pub const PLAYER_HIT_RADIUS: f32 = 1.0;
}

/// Normalize angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Horizontal forward vector for a yaw angle (y-up, yaw 0 faces +Z)
#[inline]
pub fn forward_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}
