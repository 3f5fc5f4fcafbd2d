//! The tick orchestrator: composition root of one game session
//!
//! One `tick` call sequences the whole frame: input decode and edge
//! detection, player movement intents, the fixed-step physics advance,
//! projectile bounds, hit resolution, enemy AI and spawning, coin pickup,
//! and event emission. Everything runs on the caller's thread in strict
//! order; the only asynchronous boundary is asset streaming, polled through
//! [`crate::assets::AssetSlot`].
//!
//! Hit resolution here is deliberately distance-threshold overlap, not full
//! contact manifolds — game-object hit detection is cheaper and sufficient.

use glam::Vec3;

use crate::coin::CoinManager;
use crate::config::GameConfig;
use crate::consts::{FIXED_DT, MAX_FRAME_DT};
use crate::enemy::{EnemyManager, HitOutcome};
use crate::events::{EventSink, GameEvent, SoundKey};
use crate::input::{Action, InputBindings, InputSnapshot};
use crate::physics::{BodyKey, ContactParams, Material, PhysicsWorld};
use crate::player::{CameraParams, MoveInput, PlayerManager};
use crate::projectile::{Owner, ProjectileManager};
use crate::session::GameSessionState;

/// Height above the body origin bullets leave from
const MUZZLE_HEIGHT: f32 = 0.5;
/// Forward offset so bullets spawn clear of the avatar
const MUZZLE_FORWARD: f32 = 0.8;

/// A running game session
pub struct Game {
    pub config: GameConfig,
    pub world: PhysicsWorld,
    pub players: PlayerManager,
    pub projectiles: ProjectileManager,
    pub enemies: EnemyManager,
    pub coins: CoinManager,
    pub session: GameSessionState,
    pub bindings: InputBindings,
    /// Index of the cube avatar registered at construction
    pub cube_index: usize,
    /// Index of the vehicle avatar; unselectable until its model streams in
    pub vehicle_index: usize,
    // Previous-tick action levels for edge detection
    prev_jump: bool,
    prev_shoot: bool,
    prev_toggle_camera: bool,
    prev_switch_player: bool,
}

impl Game {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let mut world = PhysicsWorld::new(Vec3::new(0.0, config.gravity_y, 0.0));
        world.materials.set(
            Material::Player,
            Material::Ground,
            ContactParams {
                friction: 2.0,
                restitution: 0.0,
            },
        );
        world.materials.set(
            Material::Enemy,
            Material::Ground,
            ContactParams {
                friction: 3.0,
                restitution: 0.0,
            },
        );

        let mut players = PlayerManager::new();
        let cube_index = players.spawn_cube(&mut world, Vec3::new(0.0, 0.5, 0.0));
        let vehicle_index = players.spawn_vehicle(&mut world, Vec3::new(6.0, 1.0, 0.0));

        let projectiles = ProjectileManager::new(
            config.player_bullet.max_live,
            config.enemy_bullet.max_live,
            config.bullet_floor_y,
            config.bullet_max_range,
        );
        let enemies = EnemyManager::new(config.enemy, Vec3::ZERO, seed);
        let coins = CoinManager::new(
            &mut world,
            config.coin_count,
            config.coin_pickup_radius,
            config.coin_field_half_extent,
            seed.wrapping_add(1),
        );
        let session = GameSessionState::new(config.player_max_health);

        Self {
            config,
            world,
            players,
            projectiles,
            enemies,
            coins,
            session,
            bindings: InputBindings::default(),
            cube_index,
            vehicle_index,
            prev_jump: false,
            prev_shoot: false,
            prev_toggle_camera: false,
            prev_switch_player: false,
        }
    }

    /// Advance one frame. `wall_dt` is the host's frame delta; it is clamped
    /// defensively, so the first frame (no prior timestamp) can pass any
    /// stale value without producing a giant step.
    pub fn tick(&mut self, wall_dt: f32, input: &InputSnapshot, events: &mut dyn EventSink) {
        let dt = wall_dt.clamp(0.0, MAX_FRAME_DT);

        // Input decode: levels now, edges vs previous tick
        let level = |a| input.is_action_active(&self.bindings, a);
        let jump = level(Action::Jump);
        let shoot = level(Action::Shoot);
        let toggle_camera = level(Action::ToggleCamera);
        let switch_player = level(Action::SwitchPlayer);
        let movement = MoveInput {
            forward: level(Action::MoveForward),
            backward: level(Action::MoveBackward),
            turn_left: level(Action::TurnLeft),
            turn_right: level(Action::TurnRight),
        };

        if switch_player && !self.prev_switch_player {
            self.players.switch_active();
        }
        if toggle_camera && !self.prev_toggle_camera {
            self.players.toggle_camera();
        }
        if jump && !self.prev_jump
            && let Some(player) = self.players.active_mut()
            && player.try_jump(&mut self.world)
        {
            events.emit(GameEvent::Sound(SoundKey::Jump));
        }
        if shoot && !self.prev_shoot {
            self.fire_player_bullet(events);
        }

        self.prev_jump = jump;
        self.prev_shoot = shoot;
        self.prev_toggle_camera = toggle_camera;
        self.prev_switch_player = switch_player;

        // Movement intents, then the fixed-step physics advance
        if let Some(player) = self.players.active_mut() {
            player.apply_movement(&mut self.world, dt, movement);
        }
        self.world.step(wall_dt, FIXED_DT);

        // Post-step reads: projectile bounds, then hit resolution
        self.projectiles.update(&mut self.world, events);
        self.resolve_hits(events);

        // Manager updates (the enemy pass prunes anything killed above)
        let player_pos = self
            .players
            .active()
            .and_then(|p| self.world.position(p.body));
        self.enemies.update(
            &mut self.world,
            dt,
            player_pos,
            &mut self.projectiles,
            self.config.enemy_bullet,
            events,
        );

        let positions = self.players.positions(&self.world);
        self.coins.update(
            &mut self.world,
            &positions,
            self.config.score_per_coin,
            &mut self.session,
            events,
        );
    }

    fn fire_player_bullet(&mut self, events: &mut dyn EventSink) {
        let Some(player) = self.players.active() else {
            return;
        };
        let Some(pos) = self.world.position(player.body) else {
            return;
        };
        let forward = crate::forward_from_yaw(player.facing);
        let origin = pos + Vec3::Y * MUZZLE_HEIGHT + forward * MUZZLE_FORWARD;

        if self.projectiles.spawn(
            &mut self.world,
            events,
            origin,
            forward,
            Owner::Player,
            self.config.player_bullet.speed,
            self.config.player_bullet.damage,
        ) {
            events.emit(GameEvent::Sound(SoundKey::Shoot));
        }
    }

    /// Loop-level collision resolution: distance-threshold overlap between
    /// live projectiles and their valid targets. One projectile damages at
    /// most one enemy per tick and despawns on its first hit.
    fn resolve_hits(&mut self, events: &mut dyn EventSink) {
        // Player bullets vs live enemies
        let bullets: Vec<(BodyKey, i32, Option<Vec3>)> = self
            .projectiles
            .active(Owner::Player)
            .map(|p| (p.body, p.damage, self.world.position(p.body)))
            .collect();

        for (bullet_body, damage, bullet_pos) in bullets {
            let Some(bullet_pos) = bullet_pos else { continue };
            let target = self.enemies.alive_enemies().find_map(|enemy| {
                let pos = self.world.position(enemy.body)?;
                (pos.distance(bullet_pos) < self.config.enemy_hit_radius).then_some(enemy.body)
            });
            let Some(enemy_body) = target else { continue };

            self.projectiles.despawn(&mut self.world, events, bullet_body);
            match self.enemies.check_hit(enemy_body, damage) {
                HitOutcome::Killed => {
                    self.session.kills += 1;
                    let score = self.session.add_score(self.config.score_per_kill);
                    events.emit(GameEvent::ScoreChanged { score });
                    events.emit(GameEvent::Sound(SoundKey::EnemyDown));
                }
                HitOutcome::Damaged => events.emit(GameEvent::Sound(SoundKey::Hit)),
                HitOutcome::Miss => {}
            }
        }

        // Enemy bullets vs the active player
        let Some(player_pos) = self
            .players
            .active()
            .and_then(|p| self.world.position(p.body))
        else {
            return;
        };
        let enemy_bullets: Vec<(BodyKey, i32, Option<Vec3>)> = self
            .projectiles
            .active(Owner::Enemy)
            .map(|p| (p.body, p.damage, self.world.position(p.body)))
            .collect();

        for (bullet_body, damage, bullet_pos) in enemy_bullets {
            let Some(bullet_pos) = bullet_pos else { continue };
            if bullet_pos.distance(player_pos) >= self.config.player_hit_radius {
                continue;
            }
            self.projectiles.despawn(&mut self.world, events, bullet_body);
            let health = self.session.apply_damage(damage);
            events.emit(GameEvent::HealthChanged { health });
            events.emit(GameEvent::Sound(SoundKey::Hit));
        }
    }

    /// Camera placement for the active player, if it still has a body
    pub fn camera(&self) -> Option<CameraParams> {
        self.players.active()?.camera_params(&self.world)
    }

    /// Restart the session in place: fresh coin pool, zeroed counters
    pub fn reset_session(&mut self) {
        self.coins.reset(&mut self.world, &mut self.session);
    }

    /// Stop-the-world teardown: release every physics body and collection.
    /// The host simply stops calling `tick` afterwards. Idempotent.
    pub fn teardown(&mut self) {
        self.players.release_bodies(&mut self.world);
        self.projectiles.release_bodies(&mut self.world);
        self.enemies.release_bodies(&mut self.world);
        self.coins.release_bodies(&mut self.world);
        self.world.clear();
        log::info!("session torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;
    use crate::input::InputSnapshot;

    fn game() -> Game {
        // No coins: random scatter could land a coin on a player and
        // perturb the score assertions below
        let cfg = GameConfig {
            coin_count: 0,
            ..GameConfig::default()
        };
        Game::new(cfg, 42)
    }

    fn game_with_coins() -> Game {
        Game::new(GameConfig::default(), 42)
    }

    fn empty() -> InputSnapshot {
        InputSnapshot::new()
    }

    fn settle(game: &mut Game, ticks: usize) {
        let mut sink = crate::events::NullSink;
        let input = empty();
        for _ in 0..ticks {
            game.tick(FIXED_DT, &input, &mut sink);
        }
    }

    /// Place a live enemy at an exact position, ignoring the spawn timer
    fn plant_enemy(game: &mut Game, pos: Vec3) -> BodyKey {
        let mut sink = crate::events::NullSink;
        let body = game
            .enemies
            .force_spawn(&mut game.world, &mut sink)
            .expect("below enemy cap");
        let enemy = game.world.body_mut(body).unwrap();
        enemy.position = pos;
        enemy.set_velocity(Vec3::ZERO);
        body
    }

    #[test]
    fn scenario_three_hits_on_a_forty_hp_enemy() {
        let mut g = game();
        let mut log = EventLog::new();
        // Far from the player so enemy AI and return fire stay out of the way
        let enemy_pos = Vec3::new(60.0, 0.6, 60.0);
        let enemy = plant_enemy(&mut g, enemy_pos);

        for hit in 1..=3 {
            // Drop a player bullet directly on the enemy and resolve one tick
            g.projectiles.spawn(
                &mut g.world,
                &mut log,
                enemy_pos,
                Vec3::Z,
                Owner::Player,
                0.0,
                25,
            );
            g.tick(FIXED_DT, &empty(), &mut log);

            match hit {
                1 => {
                    let e = g.enemies.alive_enemies().next().expect("still alive");
                    assert_eq!(e.health, 15);
                    // The hit-consumed bullet drops the HUD count back to zero
                    assert!(log
                        .events
                        .iter()
                        .any(|e| matches!(e, GameEvent::BulletsChanged { count: 0, .. })));
                }
                2 => {
                    // Kill transition: enemy gone, exactly one kill-score event
                    assert_eq!(g.enemies.alive_count(), 0);
                    assert!(g.world.body(enemy).is_none());
                    assert_eq!(g.session.kills, 1);
                    assert_eq!(
                        log.count_where(|e| matches!(e, GameEvent::Sound(SoundKey::EnemyDown))),
                        1
                    );
                }
                3 => {
                    // Third bullet finds no target and nothing double-counts
                    assert_eq!(g.session.kills, 1);
                    assert_eq!(g.session.score, 100);
                }
                _ => unreachable!(),
            }
        }
    }

    #[test]
    fn scenario_player_health_clamps_at_zero() {
        let mut g = game();
        let mut log = EventLog::new();
        let player_pos = g.world.position(g.players.active().unwrap().body).unwrap();

        for (damage, expected) in [(10, 90), (10, 80), (90, 0)] {
            g.projectiles.spawn(
                &mut g.world,
                &mut log,
                player_pos,
                Vec3::Z,
                Owner::Enemy,
                0.0,
                damage,
            );
            g.tick(FIXED_DT, &empty(), &mut log);
            assert_eq!(g.session.health, expected);
            assert_eq!(log.last_health(), Some(expected));
        }
        assert!(g.session.player_down);
    }

    #[test]
    fn scenario_held_jump_fires_once_per_press() {
        let mut g = game();
        let mut log = EventLog::new();
        settle(&mut g, 5);

        let mut held = InputSnapshot::new();
        held.press("Space");

        // Hold jump for half a second: exactly one upward application
        for _ in 0..30 {
            g.tick(FIXED_DT, &held, &mut log);
        }
        assert_eq!(
            log.count_where(|e| matches!(e, GameEvent::Sound(SoundKey::Jump))),
            1
        );

        // Release mid-air, land, press again: a second jump
        for _ in 0..150 {
            g.tick(FIXED_DT, &empty(), &mut log);
        }
        for _ in 0..10 {
            g.tick(FIXED_DT, &held, &mut log);
        }
        assert_eq!(
            log.count_where(|e| matches!(e, GameEvent::Sound(SoundKey::Jump))),
            2
        );
    }

    #[test]
    fn shoot_edge_spawns_one_bullet_per_press() {
        let mut g = game();
        let mut log = EventLog::new();
        settle(&mut g, 5);

        let mut held = InputSnapshot::new();
        held.press("KeyF");
        for _ in 0..20 {
            g.tick(FIXED_DT, &held, &mut log);
        }
        assert_eq!(
            log.count_where(|e| matches!(e, GameEvent::Sound(SoundKey::Shoot))),
            1
        );
    }

    #[test]
    fn camera_toggle_and_player_switch_are_edge_triggered() {
        let mut g = game();
        let mut log = EventLog::new();
        let initial_mode = g.players.active().unwrap().camera;

        let mut held = InputSnapshot::new();
        held.press("KeyC");
        held.press("KeyP");
        for _ in 0..10 {
            g.tick(FIXED_DT, &held, &mut log);
        }
        // One toggle despite ten held ticks
        assert_eq!(g.players.active().unwrap().camera, initial_mode.toggled());
        // Vehicle never loaded: switch stayed on the cube
        assert_eq!(g.players.active_index(), g.cube_index);

        // Load the vehicle, release, press again: switch goes through
        g.players
            .get_mut(g.vehicle_index)
            .unwrap()
            .visual
            .fulfill(1);
        g.tick(FIXED_DT, &empty(), &mut log);
        g.tick(FIXED_DT, &held, &mut log);
        assert_eq!(g.players.active_index(), g.vehicle_index);
    }

    #[test]
    fn movement_drives_the_active_player_forward() {
        let mut g = game();
        let mut log = EventLog::new();
        settle(&mut g, 5);
        let start = g.world.position(g.players.active().unwrap().body).unwrap();

        let mut held = InputSnapshot::new();
        held.press("KeyW");
        for _ in 0..60 {
            g.tick(FIXED_DT, &held, &mut log);
        }
        let end = g.world.position(g.players.active().unwrap().body).unwrap();
        assert!(end.z > start.z + 1.0, "player should have advanced along +Z");
    }

    #[test]
    fn first_tick_with_huge_delta_is_clamped() {
        let mut g = game();
        let mut log = EventLog::new();
        let start = g.world.position(g.players.active().unwrap().body).unwrap();

        // A bogus first-frame delta must not teleport anything
        g.tick(1000.0, &empty(), &mut log);
        let end = g.world.position(g.players.active().unwrap().body).unwrap();
        assert!(start.distance(end) < 1.0);
    }

    #[test]
    fn session_reset_restores_coins_and_score() {
        let mut g = game_with_coins();
        let mut log = EventLog::new();
        g.session.add_score(300);
        g.session.coins_collected = 2;
        g.tick(FIXED_DT, &empty(), &mut log);

        g.reset_session();
        assert_eq!(g.session.score, 0);
        assert_eq!(g.session.coins_collected, 0);
        assert_eq!(g.coins.remaining(), g.config.coin_count);
    }

    #[test]
    fn teardown_releases_everything_and_is_idempotent() {
        let mut g = game();
        let mut log = EventLog::new();
        plant_enemy(&mut g, Vec3::new(10.0, 0.6, 0.0));
        g.projectiles.spawn(
            &mut g.world,
            &mut log,
            Vec3::Y,
            Vec3::Z,
            Owner::Player,
            40.0,
            25,
        );

        g.teardown();
        assert_eq!(g.world.body_count(), 0);
        g.teardown();
        assert_eq!(g.world.body_count(), 0);
    }

    #[test]
    fn camera_query_never_mutates_state() {
        let g = game();
        let a = g.camera().unwrap();
        let b = g.camera().unwrap();
        assert_eq!(a, b);
    }
}
