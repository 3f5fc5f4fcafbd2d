//! Data-driven game tuning
//!
//! Every gameplay constant the managers read lives in [`GameConfig`], so a
//! host can rebalance the game from a JSON file without recompiling. Defaults
//! mirror the compiled constants in [`crate::consts`].

use serde::{Deserialize, Serialize};

use crate::consts;

/// Per-owner projectile tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BulletTuning {
    pub speed: f32,
    pub damage: i32,
    pub max_live: usize,
}

/// Enemy population and AI tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnemyTuning {
    pub max_enemies: usize,
    pub spawn_interval_sec: f32,
    pub health: i32,
    pub speed: f32,
    /// Pursue only while near < distance < far
    pub near_distance: f32,
    pub far_distance: f32,
    pub fire_range: f32,
    pub cooldown_min: f32,
    pub cooldown_max: f32,
    /// Half-extent of the rectangular spawn region around its center
    pub spawn_half_extent: f32,
}

/// Full game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub gravity_y: f32,
    pub player_bullet: BulletTuning,
    pub enemy_bullet: BulletTuning,
    pub bullet_floor_y: f32,
    pub bullet_max_range: f32,
    pub enemy: EnemyTuning,
    pub coin_count: usize,
    pub coin_pickup_radius: f32,
    /// Half-extent of the square region coins scatter over
    pub coin_field_half_extent: f32,
    pub score_per_coin: u32,
    pub score_per_kill: u32,
    pub player_max_health: i32,
    pub enemy_hit_radius: f32,
    pub player_hit_radius: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            gravity_y: consts::GRAVITY_Y,
            player_bullet: BulletTuning {
                speed: consts::PLAYER_BULLET_SPEED,
                damage: consts::PLAYER_BULLET_DAMAGE,
                max_live: consts::MAX_PLAYER_BULLETS,
            },
            enemy_bullet: BulletTuning {
                speed: consts::ENEMY_BULLET_SPEED,
                damage: consts::ENEMY_BULLET_DAMAGE,
                max_live: consts::MAX_ENEMY_BULLETS,
            },
            bullet_floor_y: consts::BULLET_FLOOR_Y,
            bullet_max_range: consts::BULLET_MAX_RANGE,
            enemy: EnemyTuning {
                max_enemies: consts::MAX_ENEMIES,
                spawn_interval_sec: consts::ENEMY_SPAWN_INTERVAL_SEC,
                health: consts::ENEMY_HEALTH,
                speed: consts::ENEMY_SPEED,
                near_distance: consts::ENEMY_NEAR_DISTANCE,
                far_distance: consts::ENEMY_FAR_DISTANCE,
                fire_range: consts::ENEMY_FIRE_RANGE,
                cooldown_min: consts::ENEMY_COOLDOWN_MIN,
                cooldown_max: consts::ENEMY_COOLDOWN_MAX,
                spawn_half_extent: 30.0,
            },
            coin_count: consts::COIN_COUNT,
            coin_pickup_radius: consts::COIN_PICKUP_RADIUS,
            coin_field_half_extent: 25.0,
            score_per_coin: consts::SCORE_PER_COIN,
            score_per_kill: consts::SCORE_PER_KILL,
            player_max_health: consts::PLAYER_MAX_HEALTH,
            enemy_hit_radius: consts::ENEMY_HIT_RADIUS,
            player_hit_radius: consts::PLAYER_HIT_RADIUS,
        }
    }
}

impl GameConfig {
    /// Parse a configuration from JSON; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
