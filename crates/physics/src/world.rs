use crate::config::WorldConfig;
use glam::{Quat, Vec3};
use rapier3d::prelude as rapier;

/// Handle to a rigid body owned by a [`PhysicsWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub rapier::RigidBodyHandle);

/// Collision shape of a spawned body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyShape {
    Cuboid { half_extents: Vec3 },
    Ball { radius: f32 },
}

/// Everything needed to create a dynamic body with one collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub shape: BodyShape,
    pub mass: f32,
    pub position: Vec3,
}

/// Position and orientation of a body, copied verbatim from the solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPose {
    pub position: Vec3,
    pub rotation: Quat,
}

/// The rigid-body world.
///
/// Wraps the rapier pipeline and its sets. Frame deltas are fed into an
/// accumulator and consumed in whole fixed steps, at most
/// `max_substeps` per call to [`PhysicsWorld::advance`].
pub struct PhysicsWorld {
    config: WorldConfig,
    pipeline: rapier::PhysicsPipeline,
    gravity: rapier::Vector<f32>,
    integration_params: rapier::IntegrationParameters,
    islands: rapier::IslandManager,
    broad_phase: rapier::DefaultBroadPhase,
    narrow_phase: rapier::NarrowPhase,
    impulse_joints: rapier::ImpulseJointSet,
    multibody_joints: rapier::MultibodyJointSet,
    ccd_solver: rapier::CCDSolver,
    bodies: rapier::RigidBodySet,
    colliders: rapier::ColliderSet,
    floor: Option<BodyHandle>,
    accumulator: f32,
    steps_taken: u64,
}

impl PhysicsWorld {
    /// Build a world from a validated configuration, inserting the floor if configured.
    pub fn new(config: WorldConfig) -> Self {
        let gravity = rapier::Vector::new(config.gravity.x, config.gravity.y, config.gravity.z);
        let mut integration_params = rapier::IntegrationParameters::default();
        integration_params.dt = config.step.fixed_step;

        let mut world = Self {
            config,
            pipeline: rapier::PhysicsPipeline::new(),
            gravity,
            integration_params,
            islands: rapier::IslandManager::new(),
            broad_phase: rapier::DefaultBroadPhase::new(),
            narrow_phase: rapier::NarrowPhase::new(),
            impulse_joints: rapier::ImpulseJointSet::new(),
            multibody_joints: rapier::MultibodyJointSet::new(),
            ccd_solver: rapier::CCDSolver::new(),
            bodies: rapier::RigidBodySet::new(),
            colliders: rapier::ColliderSet::new(),
            floor: None,
            accumulator: 0.0,
            steps_taken: 0,
        };

        if let Some(floor) = world.config.floor {
            let body = rapier::RigidBodyBuilder::fixed()
                .translation(rapier::Vector::new(0.0, -floor.thickness, 0.0))
                .build();
            let handle = world.bodies.insert(body);
            let collider =
                rapier::ColliderBuilder::cuboid(floor.half_extent, floor.thickness, floor.half_extent)
                    .friction(world.config.contact.friction)
                    .restitution(world.config.contact.restitution)
                    .build();
            world
                .colliders
                .insert_with_parent(collider, handle, &mut world.bodies);
            world.floor = Some(BodyHandle(handle));
            tracing::debug!(
                half_extent = floor.half_extent,
                thickness = floor.thickness,
                "floor inserted"
            );
        }

        world
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Handle of the static floor, if the world has one.
    pub fn floor(&self) -> Option<BodyHandle> {
        self.floor
    }

    /// Total fixed steps taken since creation.
    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    /// Number of bodies, floor included.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains(handle.0)
    }

    /// Insert a dynamic body with a single collider carrying the world's contact material.
    ///
    /// Mass properties are computed immediately so impulses applied before the
    /// first step already see the correct mass.
    pub fn add_dynamic(&mut self, desc: BodyDesc) -> BodyHandle {
        let p = desc.position;
        let body = rapier::RigidBodyBuilder::dynamic()
            .translation(rapier::Vector::new(p.x, p.y, p.z))
            .build();
        let handle = self.bodies.insert(body);

        let builder = match desc.shape {
            BodyShape::Cuboid { half_extents: h } => rapier::ColliderBuilder::cuboid(h.x, h.y, h.z),
            BodyShape::Ball { radius } => rapier::ColliderBuilder::ball(radius),
        };
        let collider = builder
            .mass(desc.mass)
            .friction(self.config.contact.friction)
            .restitution(self.config.contact.restitution)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);

        if let Some(body) = self.bodies.get_mut(handle) {
            body.recompute_mass_properties_from_colliders(&self.colliders);
        }

        BodyHandle(handle)
    }

    /// Remove a body and its colliders. Returns false if it was already gone.
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        self.bodies
            .remove(
                handle.0,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    /// Current pose of a body.
    pub fn pose(&self, handle: BodyHandle) -> Option<BodyPose> {
        self.bodies.get(handle.0).map(|b| {
            let t = b.translation();
            let r = b.rotation();
            BodyPose {
                position: Vec3::new(t.x, t.y, t.z),
                rotation: Quat::from_xyzw(r.i, r.j, r.k, r.w),
            }
        })
    }

    pub fn mass(&self, handle: BodyHandle) -> Option<f32> {
        self.bodies.get(handle.0).map(|b| b.mass())
    }

    pub fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.bodies.get(handle.0).map(|b| {
            let v = b.linvel();
            Vec3::new(v.x, v.y, v.z)
        })
    }

    /// Apply an impulse at the body's centre of mass (no induced torque).
    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) -> bool {
        match self.bodies.get_mut(handle.0) {
            Some(b) => {
                b.apply_impulse(rapier::Vector::new(impulse.x, impulse.y, impulse.z), true);
                true
            }
            None => false,
        }
    }

    /// Teleport a body, keeping its orientation and velocity.
    pub fn set_translation(&mut self, handle: BodyHandle, position: Vec3) -> bool {
        match self.bodies.get_mut(handle.0) {
            Some(b) => {
                b.set_translation(rapier::Vector::new(position.x, position.y, position.z), true);
                true
            }
            None => false,
        }
    }

    /// Feed a frame delta into the accumulator and run whole fixed steps.
    ///
    /// Returns the number of steps taken. Non-positive or non-finite deltas
    /// count as zero. When the substep cap is hit the remaining backlog is
    /// dropped rather than carried into the next frame.
    pub fn advance(&mut self, delta: f32) -> u32 {
        let delta = if delta.is_finite() && delta > 0.0 {
            delta
        } else {
            0.0
        };
        let fixed = self.config.step.fixed_step;
        let max = self.config.step.max_substeps;

        self.accumulator += delta;
        let mut substeps = 0;
        while self.accumulator >= fixed && substeps < max {
            self.step_once();
            self.accumulator -= fixed;
            substeps += 1;
        }
        if self.accumulator >= fixed {
            tracing::trace!(
                backlog = self.accumulator,
                "substep cap reached, dropping backlog"
            );
            self.accumulator %= fixed;
        }
        substeps
    }

    /// Time carried over to the next call to [`PhysicsWorld::advance`].
    pub fn pending_time(&self) -> f32 {
        self.accumulator
    }

    fn step_once(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
        self.steps_taken += 1;
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ball_at(y: f32) -> BodyDesc {
        BodyDesc {
            shape: BodyShape::Ball { radius: 0.5 },
            mass: 1.0,
            position: Vec3::new(0.0, y, 0.0),
        }
    }

    #[test]
    fn default_world_has_floor() {
        let world = PhysicsWorld::default();
        assert!(world.floor().is_some());
        assert_eq!(world.body_count(), 1);
        assert_eq!(world.collider_count(), 1);
    }

    #[test]
    fn floorless_world_is_empty() {
        let world = PhysicsWorld::new(WorldConfig::floorless());
        assert!(world.floor().is_none());
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn add_and_remove_body() {
        let mut world = PhysicsWorld::new(WorldConfig::floorless());
        let h = world.add_dynamic(ball_at(3.0));
        assert!(world.contains(h));
        assert_eq!(world.collider_count(), 1);
        assert_eq!(world.pose(h).unwrap().position, Vec3::new(0.0, 3.0, 0.0));

        assert!(world.remove_body(h));
        assert!(!world.contains(h));
        assert_eq!(world.collider_count(), 0);
        assert!(!world.remove_body(h));
    }

    #[test]
    fn mass_is_set_from_collider() {
        let mut world = PhysicsWorld::new(WorldConfig::floorless());
        let h = world.add_dynamic(BodyDesc {
            shape: BodyShape::Cuboid {
                half_extents: Vec3::splat(0.5),
            },
            mass: 2.0,
            position: Vec3::ZERO,
        });
        assert_relative_eq!(world.mass(h).unwrap(), 2.0, epsilon = 1e-5);
    }

    #[test]
    fn impulse_sets_velocity_immediately() {
        let mut world = PhysicsWorld::new(WorldConfig::floorless());
        let h = world.add_dynamic(BodyDesc {
            mass: 2.0,
            ..ball_at(0.0)
        });
        assert!(world.apply_impulse(h, Vec3::new(4.0, 0.0, 0.0)));
        let v = world.linear_velocity(h).unwrap();
        assert_relative_eq!(v.x, 2.0, epsilon = 1e-4);
        assert_relative_eq!(v.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn gravity_pulls_body_down() {
        let mut world = PhysicsWorld::new(WorldConfig::floorless());
        let h = world.add_dynamic(ball_at(10.0));
        for _ in 0..60 {
            world.advance(1.0 / 60.0);
        }
        let y = world.pose(h).unwrap().position.y;
        assert!(y < 10.0 - 4.0, "expected roughly 4.9m of fall, got y={y}");
    }

    #[test]
    fn floor_stops_body() {
        let mut world = PhysicsWorld::default();
        let h = world.add_dynamic(ball_at(3.0));
        for _ in 0..300 {
            world.advance(1.0 / 60.0);
        }
        let y = world.pose(h).unwrap().position.y;
        assert!(y > 0.0 && y < 1.0, "ball should rest on the floor, got y={y}");
    }

    #[test]
    fn advance_one_fixed_step_per_nominal_frame() {
        let mut world = PhysicsWorld::new(WorldConfig::floorless());
        assert_eq!(world.advance(1.0 / 60.0), 1);
        assert_eq!(world.steps_taken(), 1);
    }

    #[test]
    fn advance_accumulates_short_frames() {
        let mut world = PhysicsWorld::new(WorldConfig::floorless());
        assert_eq!(world.advance(0.01), 0);
        assert_eq!(world.advance(0.01), 1);
        assert!(world.pending_time() > 0.0);
    }

    #[test]
    fn advance_caps_substeps_and_drops_backlog() {
        let mut world = PhysicsWorld::new(WorldConfig::floorless());
        assert_eq!(world.advance(1.0), 3);
        assert!(world.pending_time() < world.config().step.fixed_step);
        assert_eq!(world.advance(0.0), 0);
    }

    #[test]
    fn advance_ignores_negative_and_nan() {
        let mut world = PhysicsWorld::new(WorldConfig::floorless());
        assert_eq!(world.advance(-1.0), 0);
        assert_eq!(world.advance(f32::NAN), 0);
        assert_eq!(world.pending_time(), 0.0);
    }

    #[test]
    fn set_translation_moves_body() {
        let mut world = PhysicsWorld::new(WorldConfig::floorless());
        let h = world.add_dynamic(ball_at(0.0));
        assert!(world.set_translation(h, Vec3::new(1.0, -60.0, 2.0)));
        assert_eq!(world.pose(h).unwrap().position, Vec3::new(1.0, -60.0, 2.0));
    }
}
