//! Game events published to the presentation layer
//!
//! The core never touches a HUD, DOM, or audio device. It publishes named
//! events into an injected [`EventSink`]; emission is fire-and-forget with no
//! acknowledgement. Tests use [`EventLog`] to assert on what was emitted.

/// Sound cues the core can request. The audio backend owns buffers and
/// playback; the core only names the cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundKey {
    /// Player fired a bullet
    Shoot,
    /// Enemy fired a bullet
    EnemyShoot,
    /// Projectile struck something
    Hit,
    /// Enemy destroyed
    EnemyDown,
    /// Coin collected
    CoinPickup,
    /// Player jumped
    Jump,
}

/// Events emitted once per observable change, consumed asynchronously by the
/// display layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    ScoreChanged { score: u32 },
    /// Player health after damage, clamped to [0, 100]
    HealthChanged { health: i32 },
    /// Player-owned bullet count changed (fire or despawn)
    BulletsChanged { count: usize, max: usize },
    EnemyCountChanged { count: usize },
    CoinCollected { collected: usize, total: usize, score: u32 },
    /// Fire-and-forget audio cue
    Sound(SoundKey),
}

/// Injected observer for game events. Implementations must not call back
/// into the core.
pub trait EventSink {
    fn emit(&mut self, event: GameEvent);
}

/// Sink that discards everything (headless runs, benchmarks)
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: GameEvent) {}
}

/// Sink that records events in order, for tests and debugging
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<GameEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded events matching the predicate
    pub fn count_where(&self, pred: impl Fn(&GameEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    /// Last emitted score, if any score event was recorded
    pub fn last_score(&self) -> Option<u32> {
        self.events.iter().rev().find_map(|e| match e {
            GameEvent::ScoreChanged { score } => Some(*score),
            _ => None,
        })
    }

    /// Last emitted health, if any health event was recorded
    pub fn last_health(&self) -> Option<i32> {
        self.events.iter().rev().find_map(|e| match e {
            GameEvent::HealthChanged { health } => Some(*health),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_log_records_in_order() {
        let mut log = EventLog::new();
        log.emit(GameEvent::ScoreChanged { score: 100 });
        log.emit(GameEvent::Sound(SoundKey::CoinPickup));
        log.emit(GameEvent::ScoreChanged { score: 200 });

        assert_eq!(log.events.len(), 3);
        assert_eq!(log.last_score(), Some(200));
        assert_eq!(
            log.count_where(|e| matches!(e, GameEvent::ScoreChanged { .. })),
            2
        );
    }

    #[test]
    fn null_sink_accepts_anything() {
        let mut sink = NullSink;
        sink.emit(GameEvent::HealthChanged { health: 0 });
    }
}
