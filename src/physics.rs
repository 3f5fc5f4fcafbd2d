//! Fixed-timestep rigid-body world
//!
//! Deterministic integration with a substep accumulator: the solver is never
//! handed a delta larger than the fixed timestep, and the wall-clock delta is
//! clamped so a slow first frame cannot explode the simulation. Bodies live
//! in a slotmap; handles are generational, so reads after destruction return
//! `None` and double-removal is a safe no-op.

use glam::{Quat, Vec3};
use slotmap::SlotMap;

use crate::consts::{
    FIXED_DT, GROUND_EPSILON, GROUND_STOP_THRESHOLD, GROUND_Y, MAX_FRAME_DT, MAX_SUBSTEPS,
};
use crate::normalize_angle;

slotmap::new_key_type! {
    /// Generational handle to a rigid body
    pub struct BodyKey;
}

/// Material tag used to look up contact response per pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Material {
    Default,
    Ground,
    Player,
    Enemy,
    Bullet,
}

/// Friction/restitution for a material pair
#[derive(Debug, Clone, Copy)]
pub struct ContactParams {
    /// Horizontal damping rate while in contact (1/s)
    pub friction: f32,
    /// Fraction of vertical speed kept on bounce
    pub restitution: f32,
}

impl Default for ContactParams {
    fn default() -> Self {
        // Unspecified pairs: no bounce, moderate friction
        Self {
            friction: 4.0,
            restitution: 0.0,
        }
    }
}

/// Contact material table keyed by unordered material pairs
#[derive(Debug, Default)]
pub struct ContactMaterials {
    pairs: Vec<((Material, Material), ContactParams)>,
}

impl ContactMaterials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register contact response for a material pair (order-insensitive)
    pub fn set(&mut self, a: Material, b: Material, params: ContactParams) {
        let key = if a <= b { (a, b) } else { (b, a) };
        if let Some(entry) = self.pairs.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = params;
        } else {
            self.pairs.push((key, params));
        }
    }

    /// Look up a pair, falling back to the default response
    pub fn lookup(&self, a: Material, b: Material) -> ContactParams {
        let key = if a <= b { (a, b) } else { (b, a) };
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, p)| *p)
            .unwrap_or_default()
    }
}

/// Substeps of near-zero speed before a body may sleep
const SLEEP_STEPS: u32 = 30;
/// Speed below which a body is a sleep candidate
const SLEEP_SPEED: f32 = 0.05;

/// A simulated rigid object. Yaw-only orientation: every entity in the game
/// (cube, car, enemies, bullets) rotates about Y exclusively.
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub position: Vec3,
    /// Heading in radians, wraps at 2π
    pub yaw: f32,
    pub velocity: Vec3,
    pub yaw_rate: f32,
    /// 0.0 = static/kinematic (not integrated)
    pub mass: f32,
    /// Bounding radius for ground contact
    pub radius: f32,
    pub material: Material,
    /// Suppress yaw integration (upright avatars steered directly)
    pub fixed_rotation: bool,
    /// Bodies that ignore the ground plane (bullets despawn below it instead)
    pub collide_ground: bool,
    pub allow_sleep: bool,
    sleeping: bool,
    sleep_timer: u32,
}

impl RigidBody {
    pub fn new(position: Vec3, radius: f32, mass: f32, material: Material) -> Self {
        Self {
            position,
            yaw: 0.0,
            velocity: Vec3::ZERO,
            yaw_rate: 0.0,
            mass,
            radius,
            material,
            fixed_rotation: false,
            collide_ground: true,
            allow_sleep: false,
            sleeping: false,
            sleep_timer: 0,
        }
    }

    pub fn with_fixed_rotation(mut self) -> Self {
        self.fixed_rotation = true;
        self
    }

    pub fn with_sleep_allowed(mut self) -> Self {
        self.allow_sleep = true;
        self
    }

    pub fn without_ground_collision(mut self) -> Self {
        self.collide_ground = false;
        self
    }

    /// Orientation as a quaternion for renderer proxies
    pub fn orientation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// Derived per tick, never stored: resting on/near the ground plane with
    /// negligible vertical velocity
    pub fn grounded(&self) -> bool {
        self.position.y <= GROUND_Y + self.radius + GROUND_EPSILON
            && self.velocity.y.abs() < GROUND_STOP_THRESHOLD
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Wake the body; any external velocity write goes through this
    pub fn wake(&mut self) {
        self.sleeping = false;
        self.sleep_timer = 0;
    }

    /// Set linear velocity and wake
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
        self.wake();
    }
}

/// The physics world: exclusive owner of all rigid bodies
pub struct PhysicsWorld {
    bodies: SlotMap<BodyKey, RigidBody>,
    pub gravity: Vec3,
    pub materials: ContactMaterials,
    accumulator: f32,
}

impl PhysicsWorld {
    pub fn new(gravity: Vec3) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            gravity,
            materials: ContactMaterials::new(),
            accumulator: 0.0,
        }
    }

    pub fn add_body(&mut self, body: RigidBody) -> BodyKey {
        self.bodies.insert(body)
    }

    /// Remove a body. Removing a key that is already gone is a no-op so
    /// multiple cleanup paths can race within one tick.
    pub fn remove_body(&mut self, key: BodyKey) {
        self.bodies.remove(key);
    }

    pub fn body(&self, key: BodyKey) -> Option<&RigidBody> {
        self.bodies.get(key)
    }

    pub fn body_mut(&mut self, key: BodyKey) -> Option<&mut RigidBody> {
        self.bodies.get_mut(key)
    }

    /// Convenience transform read; `None` after destruction
    pub fn position(&self, key: BodyKey) -> Option<Vec3> {
        self.bodies.get(key).map(|b| b.position)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Remove every body (session teardown)
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.accumulator = 0.0;
    }

    /// Advance the simulation by `wall_dt` worth of fixed-size substeps.
    ///
    /// Returns the number of substeps executed. Leftover time stays in the
    /// accumulator for the next frame; at most [`MAX_SUBSTEPS`] run per call.
    pub fn step(&mut self, wall_dt: f32, fixed_dt: f32) -> u32 {
        let fixed_dt = if fixed_dt > 0.0 { fixed_dt } else { FIXED_DT };
        self.accumulator += wall_dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= fixed_dt && substeps < MAX_SUBSTEPS {
            self.substep(fixed_dt);
            self.accumulator -= fixed_dt;
            substeps += 1;
        }
        // Drop backlog we refused to simulate rather than catching up later
        if substeps == MAX_SUBSTEPS {
            self.accumulator = 0.0;
        }
        substeps
    }

    fn substep(&mut self, dt: f32) {
        let gravity = self.gravity;
        for (_, body) in self.bodies.iter_mut() {
            if body.mass <= 0.0 || body.sleeping {
                continue;
            }

            body.velocity += gravity * dt;
            body.position += body.velocity * dt;
            if !body.fixed_rotation {
                body.yaw = normalize_angle(body.yaw + body.yaw_rate * dt);
            }

            // Ground plane contact
            let floor = GROUND_Y + body.radius;
            if body.collide_ground && body.position.y < floor {
                let contact = self.materials.lookup(body.material, Material::Ground);
                body.position.y = floor;
                if body.velocity.y < 0.0 {
                    body.velocity.y = -body.velocity.y * contact.restitution;
                    if body.velocity.y.abs() < GROUND_STOP_THRESHOLD {
                        body.velocity.y = 0.0;
                    }
                }
                // Friction damps horizontal motion while in contact
                let damp = (1.0 - contact.friction * dt).max(0.0);
                body.velocity.x *= damp;
                body.velocity.z *= damp;
            }

            // Sleep bookkeeping
            if body.allow_sleep {
                if body.velocity.length_squared() < SLEEP_SPEED * SLEEP_SPEED {
                    body.sleep_timer += 1;
                    if body.sleep_timer >= SLEEP_STEPS {
                        body.sleeping = true;
                        body.velocity = Vec3::ZERO;
                    }
                } else {
                    body.sleep_timer = 0;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(Vec3::new(0.0, crate::consts::GRAVITY_Y, 0.0))
    }

    #[test]
    fn falling_body_lands_on_ground_plane() {
        let mut w = world();
        let key = w.add_body(RigidBody::new(
            Vec3::new(0.0, 5.0, 0.0),
            0.5,
            1.0,
            Material::Player,
        ));

        for _ in 0..300 {
            w.step(FIXED_DT, FIXED_DT);
        }

        let body = w.body(key).unwrap();
        assert!((body.position.y - (GROUND_Y + body.radius)).abs() < 1e-3);
        assert!(body.grounded());
    }

    #[test]
    fn static_body_never_moves() {
        let mut w = world();
        let key = w.add_body(RigidBody::new(
            Vec3::new(1.0, 3.0, -2.0),
            1.0,
            0.0,
            Material::Default,
        ));
        for _ in 0..120 {
            w.step(FIXED_DT, FIXED_DT);
        }
        assert_eq!(w.position(key).unwrap(), Vec3::new(1.0, 3.0, -2.0));
    }

    #[test]
    fn remove_body_twice_is_noop() {
        let mut w = world();
        let key = w.add_body(RigidBody::new(Vec3::ZERO, 0.5, 1.0, Material::Enemy));
        assert_eq!(w.body_count(), 1);
        w.remove_body(key);
        w.remove_body(key);
        assert_eq!(w.body_count(), 0);
        assert!(w.body(key).is_none());
        assert!(w.position(key).is_none());
    }

    #[test]
    fn substeps_are_bounded() {
        let mut w = world();
        w.add_body(RigidBody::new(Vec3::new(0.0, 10.0, 0.0), 0.5, 1.0, Material::Player));
        // Huge wall delta must not run unbounded substeps
        let steps = w.step(10.0, FIXED_DT);
        assert!(steps <= MAX_SUBSTEPS);
        // Backlog is discarded, not banked
        assert_eq!(w.step(0.0, FIXED_DT), 0);
    }

    #[test]
    fn restitution_bounces_vertical_velocity() {
        let mut w = world();
        w.materials.set(
            Material::Player,
            Material::Ground,
            ContactParams {
                friction: 0.0,
                restitution: 0.8,
            },
        );
        let key = w.add_body(RigidBody::new(
            Vec3::new(0.0, 3.0, 0.0),
            0.5,
            1.0,
            Material::Player,
        ));

        let mut bounced = false;
        for _ in 0..240 {
            w.step(FIXED_DT, FIXED_DT);
            if w.body(key).unwrap().velocity.y > 1.0 {
                bounced = true;
                break;
            }
        }
        assert!(bounced, "body with restitution should rebound upward");
    }

    #[test]
    fn sleeping_body_stops_integrating_and_wakes_on_velocity() {
        let mut w = world();
        let key = w.add_body(
            RigidBody::new(Vec3::new(0.0, 0.5, 0.0), 0.5, 1.0, Material::Enemy)
                .with_sleep_allowed(),
        );

        for _ in 0..120 {
            w.step(FIXED_DT, FIXED_DT);
        }
        assert!(w.body(key).unwrap().is_sleeping());

        w.body_mut(key).unwrap().set_velocity(Vec3::new(2.0, 0.0, 0.0));
        assert!(!w.body(key).unwrap().is_sleeping());
        w.step(FIXED_DT, FIXED_DT);
        assert!(w.body(key).unwrap().position.x > 0.0);
    }

    #[test]
    fn contact_table_is_order_insensitive() {
        let mut mats = ContactMaterials::new();
        mats.set(
            Material::Bullet,
            Material::Ground,
            ContactParams {
                friction: 1.0,
                restitution: 0.5,
            },
        );
        let a = mats.lookup(Material::Bullet, Material::Ground);
        let b = mats.lookup(Material::Ground, Material::Bullet);
        assert!((a.restitution - 0.5).abs() < f32::EPSILON);
        assert!((b.restitution - 0.5).abs() < f32::EPSILON);
        // Unregistered pair falls back to default
        let d = mats.lookup(Material::Player, Material::Enemy);
        assert!((d.restitution - 0.0).abs() < f32::EPSILON);
    }

    proptest! {
        /// Integration over bounded inputs must never produce NaN or move a
        /// body below the ground plane.
        #[test]
        fn step_never_degenerates(
            x in -50.0f32..50.0,
            y in 0.0f32..50.0,
            z in -50.0f32..50.0,
            vx in -40.0f32..40.0,
            vy in -40.0f32..40.0,
            vz in -40.0f32..40.0,
            frames in 1usize..240,
        ) {
            let mut w = world();
            let mut body = RigidBody::new(Vec3::new(x, y, z), 0.5, 1.0, Material::Player);
            body.set_velocity(Vec3::new(vx, vy, vz));
            let key = w.add_body(body);

            for _ in 0..frames {
                w.step(FIXED_DT, FIXED_DT);
            }

            let b = w.body(key).unwrap();
            prop_assert!(b.position.is_finite());
            prop_assert!(b.velocity.is_finite());
            prop_assert!(b.position.y >= GROUND_Y + b.radius - 1e-3);
        }
    }
}
