//! Aggregate session state for presentation
//!
//! Score is monotonic; health is clamped to [0, max]. What happens after
//! health reaches zero is a host decision: the session only latches
//! `player_down` and keeps counting.

use serde::{Deserialize, Serialize};

use crate::consts::PLAYER_MAX_HEALTH;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSessionState {
    pub score: u32,
    pub health: i32,
    pub max_health: i32,
    pub coins_collected: usize,
    pub kills: u32,
    /// Latched once health first reaches zero; never cleared mid-session
    pub player_down: bool,
}

impl Default for GameSessionState {
    fn default() -> Self {
        Self::new(PLAYER_MAX_HEALTH)
    }
}

impl GameSessionState {
    pub fn new(max_health: i32) -> Self {
        Self {
            score: 0,
            health: max_health,
            max_health,
            coins_collected: 0,
            kills: 0,
            player_down: false,
        }
    }

    /// Add points; score never decreases
    pub fn add_score(&mut self, points: u32) -> u32 {
        self.score = self.score.saturating_add(points);
        self.score
    }

    /// Apply incoming damage, clamping at zero. Returns the new health.
    pub fn apply_damage(&mut self, damage: i32) -> i32 {
        self.health = (self.health - damage.max(0)).clamp(0, self.max_health);
        if self.health == 0 {
            self.player_down = true;
        }
        self.health
    }

    /// Zero the per-run counters (level restart); health refills
    pub fn reset(&mut self) {
        self.score = 0;
        self.health = self.max_health;
        self.coins_collected = 0;
        self.kills = 0;
        self.player_down = false;
    }
}
