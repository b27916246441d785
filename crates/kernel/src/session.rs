use crate::error::SessionError;
use crate::registry::{Entity, EntityRegistry, Liveness};
use crate::spawn::{self, SpawnContext};
use physbox_common::{CameraMotion, Color, CubeParams, EntityId};
use physbox_input::{Command, CommandQueue};
use physbox_physics::{PhysicsWorld, WorldConfig};
use physbox_render::{Mesh, MeshId, MeshShape, RenderScene};
use rand::SeedableRng;
use rand::rngs::StdRng;

const FLOOR_COLOR: Color = Color::GREY;

/// Everything needed to start a session.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub world: WorldConfig,
    /// Seed for randomized cube placement.
    pub seed: u64,
}

/// What one call to [`Session::frame`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// 1-based index of this frame.
    pub frame: u64,
    /// Delta actually fed to the world after sanitizing.
    pub delta: f32,
    /// Fixed physics steps taken.
    pub substeps: u32,
    /// Commands applied before stepping.
    pub commands: usize,
    /// Commands rejected (e.g. out-of-range cube size).
    pub rejected: usize,
    /// Entities whose mesh was synced and that remain live.
    pub synced: usize,
    /// Entities evicted this frame, in visit order.
    pub evicted: Vec<EntityId>,
}

/// The sandbox session.
///
/// Owns the physics world, the render scene, the entity registry, the spawn
/// parameters and the command queue. Hosts push commands and call
/// [`Session::frame`] once per display refresh, then render [`Session::scene`].
pub struct Session {
    config: SessionConfig,
    physics: PhysicsWorld,
    scene: RenderScene,
    registry: EntityRegistry,
    commands: CommandQueue,
    cube_params: CubeParams,
    camera_motion: CameraMotion,
    rng: StdRng,
    floor_mesh: Option<MeshId>,
    frame: u64,
}

impl Session {
    /// Validate the configuration, build the world and scene, and place the target.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        config.world.validate()?;

        let physics = PhysicsWorld::new(config.world.clone());
        let mut scene = RenderScene::new();
        let floor_mesh = config.world.floor.map(|floor| {
            scene.add_mesh(
                Mesh::new(
                    MeshShape::Cuboid {
                        half_extents: glam::Vec3::new(
                            floor.half_extent,
                            floor.thickness,
                            floor.half_extent,
                        ),
                    },
                    FLOOR_COLOR,
                )
                .at(glam::Vec3::new(0.0, -floor.thickness, 0.0))
                .with_shadows(false, true),
            )
        });
        scene.camera_mut().look_at(spawn::TARGET_POSITION);

        let mut session = Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            physics,
            scene,
            registry: EntityRegistry::new(),
            commands: CommandQueue::new(),
            cube_params: CubeParams::default(),
            camera_motion: CameraMotion::default(),
            floor_mesh,
            frame: 0,
        };
        session.spawn_target();

        tracing::info!(
            seed = session.config.seed,
            floor = session.floor_mesh.is_some(),
            "session started"
        );
        Ok(session)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    /// Direct world access for hosts and tests that need to poke bodies.
    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    pub fn scene(&self) -> &RenderScene {
        &self.scene
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn floor_mesh(&self) -> Option<MeshId> {
        self.floor_mesh
    }

    /// Frames processed so far.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn cube_params(&self) -> &CubeParams {
        &self.cube_params
    }

    /// Panel-editable parameters. Only read when a cube is spawned.
    pub fn cube_params_mut(&mut self) -> &mut CubeParams {
        &mut self.cube_params
    }

    pub fn camera_motion(&self) -> CameraMotion {
        self.camera_motion
    }

    /// Queue a command for the next frame.
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// The inbound queue, for hosts that feed input handlers directly.
    pub fn queue_mut(&mut self) -> &mut CommandQueue {
        &mut self.commands
    }

    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }

    pub fn spawn_target(&mut self) -> EntityId {
        spawn::spawn_target(self.spawn_context()).id
    }

    pub fn spawn_projectile(&mut self) -> EntityId {
        spawn::spawn_projectile(self.spawn_context()).id
    }

    pub fn spawn_cube(&mut self, params: &CubeParams) -> Result<EntityId, SessionError> {
        let ctx = SpawnContext {
            physics: &mut self.physics,
            scene: &mut self.scene,
            registry: &mut self.registry,
        };
        spawn::spawn_cube(ctx, params, &mut self.rng).map(|e| e.id)
    }

    /// Release every entity and put the target back.
    pub fn reset(&mut self) {
        let removed = self.registry.drain();
        for entity in &removed {
            self.release(entity);
        }
        self.spawn_target();
        tracing::info!(removed = removed.len(), "session reset");
    }

    /// Clamp a host-measured delta: non-finite or non-positive becomes zero,
    /// anything above `max` becomes `max`.
    pub fn sanitize_delta(dt: f32, max: f32) -> f32 {
        if dt.is_finite() && dt > 0.0 {
            dt.min(max)
        } else {
            0.0
        }
    }

    /// Run one frame.
    ///
    /// Applies queued commands, advances the world, copies every body pose
    /// onto its mesh, evicts entities below the loss threshold, and moves the
    /// camera. The caller renders [`Session::scene`] afterwards.
    pub fn frame(&mut self, dt: f32) -> Result<FrameReport, SessionError> {
        self.frame += 1;
        let mut report = FrameReport {
            frame: self.frame,
            ..FrameReport::default()
        };

        for command in self.commands.drain() {
            report.commands += 1;
            if let Err(e) = self.apply(command) {
                tracing::warn!("command rejected: {e}");
                report.rejected += 1;
            }
        }

        let delta = Self::sanitize_delta(dt, self.config.world.step.max_frame_delta);
        report.delta = delta;
        report.substeps = self.physics.advance(delta);

        let threshold = self.config.world.loss_threshold;
        let physics = &mut self.physics;
        let scene = &mut self.scene;
        let mut synced = 0;
        let evicted = self.registry.try_retain_live(|entity| {
            let pose = physics
                .pose(entity.body)
                .ok_or(SessionError::DanglingEntity(entity.id))?;
            if !scene.set_pose(entity.mesh, pose.position, pose.rotation) {
                return Err(SessionError::DanglingEntity(entity.id));
            }
            if pose.position.y < threshold {
                physics.remove_body(entity.body);
                scene.remove_mesh(entity.mesh);
                return Ok(Liveness::Evict);
            }
            synced += 1;
            Ok(Liveness::Keep)
        })?;
        report.synced = synced;

        for entity in &evicted {
            tracing::debug!(id = %entity.id.short(), kind = ?entity.kind, "entity evicted");
        }
        report.evicted = evicted.iter().map(|e| e.id).collect();

        self.scene
            .camera_mut()
            .update(delta, &self.camera_motion);

        tracing::trace!(
            frame = report.frame,
            substeps = report.substeps,
            live = self.registry.len(),
            evicted = report.evicted.len(),
            "frame"
        );
        Ok(report)
    }

    fn apply(&mut self, command: Command) -> Result<(), SessionError> {
        match command {
            Command::SpawnProjectile => {
                self.spawn_projectile();
            }
            Command::SpawnCube(params) => {
                let id = self.spawn_cube(&params)?;
                tracing::info!(id = %id.short(), size = params.size, "cube added");
            }
            Command::SpawnTarget => {
                self.spawn_target();
            }
            Command::SetViewport { width, height } => {
                self.scene.set_viewport(width, height);
            }
            Command::SetCameraMotion(motion) => {
                self.camera_motion = motion;
            }
            Command::RotateCamera { dx, dy } => {
                self.scene.camera_mut().rotate(dx, dy);
            }
            Command::Reset => self.reset(),
        }
        Ok(())
    }

    fn release(&mut self, entity: &Entity) {
        self.physics.remove_body(entity.body);
        self.scene.remove_mesh(entity.mesh);
    }

    fn spawn_context(&mut self) -> SpawnContext<'_> {
        SpawnContext {
            physics: &mut self.physics,
            scene: &mut self.scene,
            registry: &mut self.registry,
        }
    }
}
