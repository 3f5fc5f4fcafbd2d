//! Collectible coins: fixed pool, proximity pickup, full-set reset
//!
//! Coins are scattered once over the field and checked each tick against
//! every tracked player position. A coin serves exactly one collection
//! event: the collected flag is monotonic, and only `reset` reinitializes
//! the whole set.

use glam::Vec3;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::events::{EventSink, GameEvent, SoundKey};
use crate::physics::{BodyKey, Material, PhysicsWorld, RigidBody};
use crate::session::GameSessionState;

const COIN_RADIUS: f32 = 0.3;
const COIN_HEIGHT: f32 = 0.5;

/// One pickup
#[derive(Debug, Clone, Copy)]
pub struct Coin {
    pub body: BodyKey,
    pub position: Vec3,
    /// Monotonic: set once, never cleared individually
    pub collected: bool,
}

/// Owns the coin pool
pub struct CoinManager {
    coins: Vec<Coin>,
    count: usize,
    pickup_radius: f32,
    field_half_extent: f32,
    rng: Pcg32,
}

impl CoinManager {
    /// Create the manager and scatter the initial pool
    pub fn new(
        world: &mut PhysicsWorld,
        count: usize,
        pickup_radius: f32,
        field_half_extent: f32,
        seed: u64,
    ) -> Self {
        let mut mgr = Self {
            coins: Vec::with_capacity(count),
            count,
            pickup_radius,
            field_half_extent,
            rng: Pcg32::seed_from_u64(seed),
        };
        mgr.spawn_all(world);
        mgr
    }

    fn spawn_all(&mut self, world: &mut PhysicsWorld) {
        let half = self.field_half_extent;
        for _ in 0..self.count {
            let position = Vec3::new(
                self.rng.random_range(-half..half),
                COIN_HEIGHT,
                self.rng.random_range(-half..half),
            );
            // Static marker body; the renderer hangs its proxy off this key
            let body = world.add_body(RigidBody::new(position, COIN_RADIUS, 0.0, Material::Default));
            self.coins.push(Coin {
                body,
                position,
                collected: false,
            });
        }
    }

    pub fn total(&self) -> usize {
        self.coins.len()
    }

    pub fn collected_count(&self) -> usize {
        self.coins.iter().filter(|c| c.collected).count()
    }

    pub fn remaining(&self) -> usize {
        self.coins.iter().filter(|c| !c.collected).count()
    }

    /// Uncollected coins, for renderer proxies
    pub fn uncollected(&self) -> impl Iterator<Item = &Coin> {
        self.coins.iter().filter(|c| !c.collected)
    }

    /// Proximity pass: the first player within the pickup radius collects a
    /// coin; the coin leaves the world immediately and scores once.
    pub fn update(
        &mut self,
        world: &mut PhysicsWorld,
        player_positions: &[Vec3],
        score_per_coin: u32,
        session: &mut GameSessionState,
        events: &mut dyn EventSink,
    ) {
        let total = self.coins.len();
        for coin in self.coins.iter_mut().filter(|c| !c.collected) {
            let reached = player_positions
                .iter()
                .any(|p| p.distance(coin.position) < self.pickup_radius);
            if !reached {
                continue;
            }

            coin.collected = true;
            world.remove_body(coin.body);
            session.coins_collected += 1;
            let score = session.add_score(score_per_coin);

            events.emit(GameEvent::CoinCollected {
                collected: session.coins_collected,
                total,
                score,
            });
            events.emit(GameEvent::ScoreChanged { score });
            events.emit(GameEvent::Sound(SoundKey::CoinPickup));
        }
    }

    /// Session restart: drop the whole set, respawn a fresh full pool, and
    /// zero the session counters.
    pub fn reset(&mut self, world: &mut PhysicsWorld, session: &mut GameSessionState) {
        self.release_bodies(world);
        self.spawn_all(world);
        session.reset();
        log::debug!("coin pool reset: {} coins", self.coins.len());
    }

    /// Release every remaining coin body (teardown)
    pub fn release_bodies(&mut self, world: &mut PhysicsWorld) {
        for coin in self.coins.drain(..) {
            // Already-collected coins removed their body; remove is a no-op then
            world.remove_body(coin.body);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts;
    use crate::events::EventLog;

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(Vec3::new(0.0, consts::GRAVITY_Y, 0.0))
    }

    fn fixtures() -> (PhysicsWorld, CoinManager, GameSessionState, EventLog) {
        let mut w = world();
        let m = CoinManager::new(&mut w, 5, consts::COIN_PICKUP_RADIUS, 10.0, 3);
        (w, m, GameSessionState::default(), EventLog::new())
    }

    #[test]
    fn pool_spawns_with_bodies() {
        let (w, m, _, _) = fixtures();
        assert_eq!(m.total(), 5);
        assert_eq!(m.remaining(), 5);
        assert_eq!(w.body_count(), 5);
    }

    #[test]
    fn player_within_radius_collects_once() {
        let (mut w, mut m, mut session, mut log) = fixtures();
        let target = m.uncollected().next().unwrap().position;
        // Random scatter may put several coins inside one pickup radius
        let reachable = m
            .uncollected()
            .filter(|c| c.position.distance(target) < consts::COIN_PICKUP_RADIUS)
            .count();

        m.update(&mut w, &[target], 100, &mut session, &mut log);
        assert_eq!(m.collected_count(), reachable);
        assert_eq!(session.score, 100 * reachable as u32);
        assert_eq!(session.coins_collected, reachable);

        // The same position never collects the same coins again
        m.update(&mut w, &[target], 100, &mut session, &mut log);
        assert_eq!(m.collected_count(), reachable);
        assert_eq!(session.score, 100 * reachable as u32);

        assert!(log
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::CoinCollected { total: 5, .. })));
        assert!(log
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::Sound(SoundKey::CoinPickup))));
    }

    #[test]
    fn far_player_collects_nothing() {
        let (mut w, mut m, mut session, mut log) = fixtures();
        m.update(
            &mut w,
            &[Vec3::new(500.0, 0.0, 500.0)],
            100,
            &mut session,
            &mut log,
        );
        assert_eq!(m.collected_count(), 0);
        assert_eq!(session.score, 0);
    }

    #[test]
    fn any_tracked_player_can_collect() {
        let (mut w, mut m, mut session, mut log) = fixtures();
        let target = m.uncollected().next().unwrap().position;
        let positions = [Vec3::new(500.0, 0.0, 500.0), target];
        m.update(&mut w, &positions, 100, &mut session, &mut log);
        assert!(m.collected_count() >= 1);
    }

    #[test]
    fn reset_restores_full_pool_and_zeroes_session() {
        let (mut w, mut m, mut session, mut log) = fixtures();

        // Collect everything
        let positions: Vec<Vec3> = m.uncollected().map(|c| c.position).collect();
        m.update(&mut w, &positions, 100, &mut session, &mut log);
        assert_eq!(m.remaining(), 0);
        assert_eq!(session.score, 500);
        assert_eq!(w.body_count(), 0);

        m.reset(&mut w, &mut session);
        assert_eq!(m.remaining(), 5);
        assert_eq!(m.collected_count(), 0);
        assert_eq!(session.score, 0);
        assert_eq!(session.coins_collected, 0);
        assert_eq!(w.body_count(), 5);
    }

    #[test]
    fn reset_from_partial_state_behaves_the_same() {
        let (mut w, mut m, mut session, mut log) = fixtures();
        let target = m.uncollected().next().unwrap().position;
        m.update(&mut w, &[target], 100, &mut session, &mut log);

        m.reset(&mut w, &mut session);
        assert_eq!(m.remaining(), 5);
        assert_eq!(session.score, 0);
        assert_eq!(w.body_count(), 5);
    }
}
