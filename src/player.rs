//! Player avatars and the active-player selector
//!
//! Two avatar kinds exist and both are known at design time, so this is a
//! closed variant set rather than a trait hierarchy: the cube (jumps, tight
//! turns) and the vehicle (faster, wider turns, streamed model). Movement is
//! an arcade velocity blend — horizontal velocity eases toward the desired
//! velocity instead of snapping, which also softens collision response.
//!
//! "Grounded" is derived from the body every tick, never stored. Camera
//! parameters are a pure function of body transform, facing, and mode, so
//! they can be queried at any tick without mutating anything.

use glam::Vec3;

use crate::assets::AssetSlot;
use crate::forward_from_yaw;
use crate::normalize_angle;
use crate::physics::{BodyKey, Material, PhysicsWorld, RigidBody};

/// Camera mode of one player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    First,
    Third,
}

impl CameraMode {
    pub fn toggled(self) -> Self {
        match self {
            CameraMode::First => CameraMode::Third,
            CameraMode::Third => CameraMode::First,
        }
    }
}

/// Camera placement for the renderer, derived per tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraParams {
    pub position: Vec3,
    pub look_target: Vec3,
}

/// Closed set of avatar kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerKind {
    Cube,
    Vehicle,
}

/// Movement tuning per avatar kind
#[derive(Debug, Clone, Copy)]
pub struct MoveTuning {
    /// Turn rate (radians/s)
    pub turn_speed: f32,
    /// Top horizontal speed (units/s)
    pub max_speed: f32,
    /// Per-tick blend toward desired velocity, in (0, 1]
    pub lerp_factor: f32,
    /// Vertical speed set on jump (0 = cannot jump)
    pub jump_speed: f32,
    /// Eye height above body origin for first-person camera
    pub eye_height: f32,
    /// Body bounding radius
    pub radius: f32,
}

impl PlayerKind {
    pub fn tuning(self) -> MoveTuning {
        match self {
            PlayerKind::Cube => MoveTuning {
                turn_speed: 3.0,
                max_speed: 8.0,
                lerp_factor: 0.25,
                jump_speed: 9.0,
                eye_height: 0.8,
                radius: 0.5,
            },
            PlayerKind::Vehicle => MoveTuning {
                turn_speed: 1.8,
                max_speed: 16.0,
                lerp_factor: 0.12,
                jump_speed: 0.0,
                eye_height: 1.2,
                radius: 1.0,
            },
        }
    }
}

/// Held-direction inputs for one tick, already decoded from the snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveInput {
    pub forward: bool,
    pub backward: bool,
    pub turn_left: bool,
    pub turn_right: bool,
}

/// One controllable avatar
pub struct PlayerEntity {
    pub kind: PlayerKind,
    pub body: BodyKey,
    /// Heading in radians, wraps at 2π
    pub facing: f32,
    pub camera: CameraMode,
    /// Streamed visual handle; unloaded players cannot become active
    pub visual: AssetSlot<u32>,
}

impl PlayerEntity {
    /// Steer and drive the avatar for this tick. Turning integrates the
    /// facing angle; horizontal velocity eases toward the desired velocity.
    pub fn apply_movement(&mut self, world: &mut PhysicsWorld, dt: f32, input: MoveInput) {
        let tuning = self.kind.tuning();

        if input.turn_left {
            self.facing = normalize_angle(self.facing + tuning.turn_speed * dt);
        }
        if input.turn_right {
            self.facing = normalize_angle(self.facing - tuning.turn_speed * dt);
        }

        let axis = match (input.forward, input.backward) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        };

        let Some(body) = world.body_mut(self.body) else {
            return;
        };
        body.yaw = self.facing;

        let desired = forward_from_yaw(self.facing) * (tuning.max_speed * axis);
        let mut velocity = body.velocity;
        velocity.x += (desired.x - velocity.x) * tuning.lerp_factor;
        velocity.z += (desired.z - velocity.z) * tuning.lerp_factor;
        body.set_velocity(velocity);
    }

    /// Apply a jump impulse if this avatar can jump and is grounded right
    /// now. Edge gating (one jump per distinct press) is the caller's job.
    pub fn try_jump(&mut self, world: &mut PhysicsWorld) -> bool {
        let tuning = self.kind.tuning();
        if tuning.jump_speed <= 0.0 {
            return false;
        }
        let Some(body) = world.body_mut(self.body) else {
            return false;
        };
        if !body.grounded() {
            return false;
        }
        let mut velocity = body.velocity;
        velocity.y = tuning.jump_speed;
        body.set_velocity(velocity);
        true
    }

    /// Pure camera derivation: body position + facing + mode in, placement
    /// out. `None` only if the body has been destroyed.
    pub fn camera_params(&self, world: &PhysicsWorld) -> Option<CameraParams> {
        let position = world.position(self.body)?;
        let tuning = self.kind.tuning();
        let forward = forward_from_yaw(self.facing);

        Some(match self.camera {
            CameraMode::First => {
                let eye = position + Vec3::Y * tuning.eye_height + forward * 0.3;
                CameraParams {
                    position: eye,
                    look_target: eye + forward * 10.0,
                }
            }
            CameraMode::Third => CameraParams {
                position: position - forward * 8.0 + Vec3::Y * 4.0,
                look_target: position + Vec3::Y * 1.0,
            },
        })
    }
}

/// Owns the registered players and the single active selector
pub struct PlayerManager {
    players: Vec<PlayerEntity>,
    active: usize,
}

impl Default for PlayerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerManager {
    pub fn new() -> Self {
        Self {
            players: Vec::new(),
            active: 0,
        }
    }

    /// Register a cube avatar; its visual needs no streaming
    pub fn spawn_cube(&mut self, world: &mut PhysicsWorld, position: Vec3) -> usize {
        let tuning = PlayerKind::Cube.tuning();
        let body = world.add_body(
            RigidBody::new(position, tuning.radius, 1.0, Material::Player).with_fixed_rotation(),
        );
        self.players.push(PlayerEntity {
            kind: PlayerKind::Cube,
            body,
            facing: 0.0,
            camera: CameraMode::Third,
            visual: AssetSlot::ready(0),
        });
        self.players.len() - 1
    }

    /// Register a vehicle avatar; it stays unselectable until its streamed
    /// model completes
    pub fn spawn_vehicle(&mut self, world: &mut PhysicsWorld, position: Vec3) -> usize {
        let tuning = PlayerKind::Vehicle.tuning();
        let body = world.add_body(
            RigidBody::new(position, tuning.radius, 1.0, Material::Player).with_fixed_rotation(),
        );
        self.players.push(PlayerEntity {
            kind: PlayerKind::Vehicle,
            body,
            facing: 0.0,
            camera: CameraMode::Third,
            visual: AssetSlot::pending(),
        });
        self.players.len() - 1
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PlayerEntity> {
        self.players.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut PlayerEntity> {
        self.players.get_mut(index)
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> Option<&PlayerEntity> {
        self.players.get(self.active)
    }

    pub fn active_mut(&mut self) -> Option<&mut PlayerEntity> {
        self.players.get_mut(self.active)
    }

    /// Positions of every player with a live body (coin proximity checks)
    pub fn positions(&self, world: &PhysicsWorld) -> Vec<Vec3> {
        self.players
            .iter()
            .filter_map(|p| world.position(p.body))
            .collect()
    }

    /// Cycle to the next fully-loaded player. Players whose assets are still
    /// streaming (or failed) are skipped; if no other player is ready this is
    /// a no-op. Returns the active index.
    pub fn switch_active(&mut self) -> usize {
        let count = self.players.len();
        if count > 1 {
            for offset in 1..count {
                let candidate = (self.active + offset) % count;
                if self.players[candidate].visual.is_loaded() {
                    self.active = candidate;
                    log::debug!("active player -> {candidate}");
                    break;
                }
            }
        }
        self.active
    }

    /// Flip the active player's camera mode
    pub fn toggle_camera(&mut self) {
        if let Some(player) = self.players.get_mut(self.active) {
            player.camera = player.camera.toggled();
        }
    }

    /// Remove every player body (teardown)
    pub fn release_bodies(&mut self, world: &mut PhysicsWorld) {
        for player in self.players.drain(..) {
            world.remove_body(player.body);
        }
        self.active = 0;
    }
}
