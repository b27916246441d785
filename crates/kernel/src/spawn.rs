//! Spawners: each creates a body, a matching mesh, and registers the pair.

use crate::error::SessionError;
use crate::registry::{Entity, EntityKind, EntityRegistry};
use glam::Vec3;
use physbox_common::{Color, CubeParams, EntityId};
use physbox_physics::{BodyDesc, BodyShape, PhysicsWorld};
use physbox_render::{Mesh, MeshShape, RenderScene};
use rand::Rng;

pub const TARGET_MASS: f32 = 4.0;
pub const TARGET_HALF_EXTENT: f32 = 1.0;
pub const TARGET_POSITION: Vec3 = Vec3::new(0.0, 5.0, -10.0);
pub const TARGET_COLOR: Color = Color::ORANGE;

pub const PROJECTILE_MASS: f32 = 1.0;
pub const PROJECTILE_RADIUS: f32 = 0.2;
/// Distance in front of the camera where projectiles appear.
pub const PROJECTILE_STANDOFF: f32 = 1.5;
pub const PROJECTILE_IMPULSE: f32 = 25.0;
pub const PROJECTILE_COLOR: Color = Color::rgb(0.9, 0.9, 0.95);

pub const CUBE_MASS: f32 = 2.0;
pub const CUBE_DEFAULT_POSITION: Vec3 = Vec3::new(0.0, 2.0, 0.0);
/// Randomized cubes land within +-this on X and Z.
pub const CUBE_SCATTER_HALF_WIDTH: f32 = 10.0;
pub const CUBE_SCATTER_MIN_Y: f32 = 2.0;
pub const CUBE_SCATTER_MAX_Y: f32 = 7.0;

/// The three owners every spawner mutates together.
pub struct SpawnContext<'a> {
    pub physics: &'a mut PhysicsWorld,
    pub scene: &'a mut RenderScene,
    pub registry: &'a mut EntityRegistry,
}

/// Where a projectile starts and the impulse it receives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    pub position: Vec3,
    pub impulse: Vec3,
}

/// Launch for a camera at `eye` looking along the unit vector `forward`.
pub fn projectile_launch(eye: Vec3, forward: Vec3) -> Launch {
    Launch {
        position: eye + forward * PROJECTILE_STANDOFF,
        impulse: forward * PROJECTILE_IMPULSE,
    }
}

/// Drop point for a user cube. Size does not affect placement.
pub fn cube_position(params: &CubeParams, rng: &mut impl Rng) -> Vec3 {
    if !params.randomize_position {
        return CUBE_DEFAULT_POSITION;
    }
    Vec3::new(
        rng.gen_range(-CUBE_SCATTER_HALF_WIDTH..=CUBE_SCATTER_HALF_WIDTH),
        rng.gen_range(CUBE_SCATTER_MIN_Y..=CUBE_SCATTER_MAX_Y),
        rng.gen_range(-CUBE_SCATTER_HALF_WIDTH..=CUBE_SCATTER_HALF_WIDTH),
    )
}

pub fn spawn_target(ctx: SpawnContext<'_>) -> Entity {
    let half_extents = Vec3::splat(TARGET_HALF_EXTENT);
    spawn_pair(
        ctx,
        EntityKind::Target,
        Mesh::new(MeshShape::Cuboid { half_extents }, TARGET_COLOR),
        BodyDesc {
            shape: BodyShape::Cuboid { half_extents },
            mass: TARGET_MASS,
            position: TARGET_POSITION,
        },
    )
}

/// Throw a ball from the scene camera along its view direction.
pub fn spawn_projectile(ctx: SpawnContext<'_>) -> Entity {
    let camera = ctx.scene.camera();
    let launch = projectile_launch(camera.position, camera.forward());
    let physics_after = |physics: &mut PhysicsWorld, entity: &Entity| {
        physics.apply_impulse(entity.body, launch.impulse);
    };
    let entity = spawn_pair_with(
        ctx,
        EntityKind::Projectile,
        Mesh::new(
            MeshShape::Sphere {
                radius: PROJECTILE_RADIUS,
            },
            PROJECTILE_COLOR,
        ),
        BodyDesc {
            shape: BodyShape::Ball {
                radius: PROJECTILE_RADIUS,
            },
            mass: PROJECTILE_MASS,
            position: launch.position,
        },
        physics_after,
    );
    tracing::debug!(
        id = %entity.id.short(),
        position = ?launch.position,
        impulse = ?launch.impulse,
        "projectile launched"
    );
    entity
}

/// Drop a cube. Rejects sizes outside [`CubeParams::MIN_SIZE`, `CubeParams::MAX_SIZE`]
/// before touching any owner.
pub fn spawn_cube(
    ctx: SpawnContext<'_>,
    params: &CubeParams,
    rng: &mut impl Rng,
) -> Result<Entity, SessionError> {
    if !params.size_in_range() {
        return Err(SessionError::InvalidCubeSize(params.size));
    }
    let half_extents = Vec3::splat(params.size / 2.0);
    let position = cube_position(params, rng);
    Ok(spawn_pair(
        ctx,
        EntityKind::Cube,
        Mesh::new(MeshShape::Cuboid { half_extents }, params.color),
        BodyDesc {
            shape: BodyShape::Cuboid { half_extents },
            mass: CUBE_MASS,
            position,
        },
    ))
}

fn spawn_pair(ctx: SpawnContext<'_>, kind: EntityKind, mesh: Mesh, desc: BodyDesc) -> Entity {
    spawn_pair_with(ctx, kind, mesh, desc, |_, _| {})
}

/// Create the body, mirror its pose onto the mesh, register the pair, then
/// let `after` touch the new body (e.g. to apply a launch impulse).
fn spawn_pair_with(
    ctx: SpawnContext<'_>,
    kind: EntityKind,
    mut mesh: Mesh,
    desc: BodyDesc,
    after: impl FnOnce(&mut PhysicsWorld, &Entity),
) -> Entity {
    let body = ctx.physics.add_dynamic(desc);
    if let Some(pose) = ctx.physics.pose(body) {
        mesh.transform.position = pose.position;
        mesh.transform.rotation = pose.rotation;
    }
    let mesh = ctx.scene.add_mesh(mesh);
    let entity = Entity {
        id: EntityId::new(),
        kind,
        mesh,
        body,
    };
    ctx.registry.register(entity);
    after(ctx.physics, &entity);
    tracing::debug!(id = %entity.id.short(), ?kind, position = ?desc.position, "entity spawned");
    entity
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use physbox_physics::WorldConfig;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    struct Owners {
        physics: PhysicsWorld,
        scene: RenderScene,
        registry: EntityRegistry,
    }

    impl Owners {
        fn new() -> Self {
            Self {
                physics: PhysicsWorld::new(WorldConfig::floorless()),
                scene: RenderScene::new(),
                registry: EntityRegistry::new(),
            }
        }

        fn ctx(&mut self) -> SpawnContext<'_> {
            SpawnContext {
                physics: &mut self.physics,
                scene: &mut self.scene,
                registry: &mut self.registry,
            }
        }
    }

    #[test]
    fn projectile_launch_offsets_and_scales_forward() {
        let eye = Vec3::new(3.0, 4.0, -2.0);
        let forward = Vec3::new(1.0, 2.0, -2.0).normalize();
        let launch = projectile_launch(eye, forward);
        assert_eq!(launch.position, eye + forward * 1.5);
        assert_eq!(launch.impulse, forward * 25.0);
    }

    #[test]
    fn projectile_launch_for_many_directions() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let eye = Vec3::new(
                rng.gen_range(-50.0..50.0),
                rng.gen_range(-50.0..50.0),
                rng.gen_range(-50.0..50.0),
            );
            let forward = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            )
            .try_normalize()
            .unwrap_or(Vec3::X);
            let launch = projectile_launch(eye, forward);
            assert_eq!(launch.position, eye + forward * PROJECTILE_STANDOFF);
            assert_eq!(launch.impulse, forward * PROJECTILE_IMPULSE);
            assert_relative_eq!(launch.impulse.length(), 25.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn spawn_projectile_uses_scene_camera() {
        let mut owners = Owners::new();
        let eye = owners.scene.camera().position;
        let forward = owners.scene.camera().forward();

        let entity = spawn_projectile(owners.ctx());

        assert_eq!(entity.kind, EntityKind::Projectile);
        let pose = owners.physics.pose(entity.body).unwrap();
        assert_eq!(pose.position, eye + forward * PROJECTILE_STANDOFF);
        let v = owners.physics.linear_velocity(entity.body).unwrap();
        let expected = forward * PROJECTILE_IMPULSE / PROJECTILE_MASS;
        assert_relative_eq!(v.x, expected.x, epsilon = 1e-3);
        assert_relative_eq!(v.y, expected.y, epsilon = 1e-3);
        assert_relative_eq!(v.z, expected.z, epsilon = 1e-3);
        let mesh = owners.scene.mesh(entity.mesh).unwrap();
        assert_eq!(mesh.shape, MeshShape::Sphere { radius: 0.2 });
        assert!(mesh.cast_shadow);
    }

    #[test]
    fn spawn_target_is_dynamic_box() {
        let mut owners = Owners::new();
        let entity = spawn_target(owners.ctx());
        assert_eq!(entity.kind, EntityKind::Target);
        assert_relative_eq!(owners.physics.mass(entity.body).unwrap(), 4.0, epsilon = 1e-4);
        assert_eq!(
            owners.physics.pose(entity.body).unwrap().position,
            TARGET_POSITION
        );
        assert_eq!(
            owners.scene.mesh(entity.mesh).unwrap().transform.position,
            TARGET_POSITION
        );
    }

    #[test]
    fn spawners_touch_all_three_owners() {
        let mut owners = Owners::new();
        let mut rng = StdRng::seed_from_u64(1);
        spawn_target(owners.ctx());
        spawn_projectile(owners.ctx());
        spawn_cube(owners.ctx(), &CubeParams::default(), &mut rng).unwrap();
        assert_eq!(owners.registry.len(), 3);
        assert_eq!(owners.scene.mesh_count(), 3);
        assert_eq!(owners.physics.body_count(), 3);
    }

    #[test]
    fn cube_uses_params() {
        let mut owners = Owners::new();
        let mut rng = StdRng::seed_from_u64(1);
        let params = CubeParams {
            size: 2.0,
            color: Color::rgb(0.0, 1.0, 0.0),
            randomize_position: false,
        };
        let entity = spawn_cube(owners.ctx(), &params, &mut rng).unwrap();
        let mesh = owners.scene.mesh(entity.mesh).unwrap();
        assert_eq!(
            mesh.shape,
            MeshShape::Cuboid {
                half_extents: Vec3::splat(1.0)
            }
        );
        assert_eq!(mesh.color, params.color);
        assert_relative_eq!(owners.physics.mass(entity.body).unwrap(), 2.0, epsilon = 1e-4);
    }

    #[test]
    fn cube_rejects_bad_size_without_side_effects() {
        let mut owners = Owners::new();
        let mut rng = StdRng::seed_from_u64(1);
        let params = CubeParams {
            size: 10.0,
            ..CubeParams::default()
        };
        let err = spawn_cube(owners.ctx(), &params, &mut rng).unwrap_err();
        assert_eq!(err, SessionError::InvalidCubeSize(10.0));
        assert!(owners.registry.is_empty());
        assert_eq!(owners.scene.mesh_count(), 0);
        assert_eq!(owners.physics.body_count(), 0);
    }

    #[test]
    fn randomized_cube_positions_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let params = CubeParams {
            randomize_position: true,
            ..CubeParams::default()
        };
        for _ in 0..1000 {
            let p = cube_position(&params, &mut rng);
            assert!((-10.0..=10.0).contains(&p.x), "x out of bounds: {p:?}");
            assert!((-10.0..=10.0).contains(&p.z), "z out of bounds: {p:?}");
            assert!((2.0..=7.0).contains(&p.y), "y out of bounds: {p:?}");
        }
    }

    #[test]
    fn fixed_cube_position_ignores_size() {
        let mut rng = StdRng::seed_from_u64(42);
        for size in [0.1, 0.5, 1.0, 2.5, 3.0] {
            let params = CubeParams {
                size,
                ..CubeParams::default()
            };
            assert_eq!(cube_position(&params, &mut rng), Vec3::new(0.0, 2.0, 0.0));
        }
    }
}
