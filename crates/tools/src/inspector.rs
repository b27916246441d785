use glam::{Quat, Vec3};
use physbox_common::EntityId;
use physbox_kernel::{EntityKind, Session};
use std::fmt;

/// Read-only queries against a [`Session`].
pub struct SessionInspector;

impl SessionInspector {
    pub fn summary(session: &Session) -> SessionSummary {
        let registry = session.registry();
        SessionSummary {
            frame: session.frame_count(),
            seed: session.config().seed,
            entities: registry.len(),
            targets: registry.count_kind(EntityKind::Target),
            projectiles: registry.count_kind(EntityKind::Projectile),
            cubes: registry.count_kind(EntityKind::Cube),
            bodies: session.physics().body_count(),
            meshes: session.scene().mesh_count(),
            steps: session.physics().steps_taken(),
            camera: session.scene().camera().position,
        }
    }

    /// Body pose and velocity of one entity, or `None` if it is not live.
    pub fn inspect_entity(session: &Session, id: EntityId) -> Option<EntityInfo> {
        let entity = session.registry().get(id)?;
        let pose = session.physics().pose(entity.body)?;
        Some(EntityInfo {
            id,
            kind: entity.kind,
            position: pose.position,
            rotation: pose.rotation,
            velocity: session.physics().linear_velocity(entity.body)?,
        })
    }

    /// Live entities, oldest first.
    pub fn list_entities(session: &Session) -> Vec<(EntityId, EntityKind)> {
        session.registry().iter().map(|e| (e.id, e.kind)).collect()
    }
}

/// Snapshot of session counters.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub frame: u64,
    pub seed: u64,
    pub entities: usize,
    pub targets: usize,
    pub projectiles: usize,
    pub cubes: usize,
    /// Includes the fixed floor body when present.
    pub bodies: usize,
    /// Includes the floor mesh when present.
    pub meshes: usize,
    pub steps: u64,
    pub camera: Vec3,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Session: frame={} seed={} entities={} (targets={} projectiles={} cubes={}) bodies={} meshes={} steps={}",
            self.frame,
            self.seed,
            self.entities,
            self.targets,
            self.projectiles,
            self.cubes,
            self.bodies,
            self.meshes,
            self.steps,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityInfo {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
}

impl fmt::Display for EntityInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} [{}] pos=({:.2}, {:.2}, {:.2}) vel=({:.2}, {:.2}, {:.2})",
            self.kind,
            self.id.short(),
            self.position.x,
            self.position.y,
            self.position.z,
            self.velocity.x,
            self.velocity.y,
            self.velocity.z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use physbox_common::CubeParams;
    use physbox_input::Command;
    use physbox_kernel::SessionConfig;
    use physbox_physics::WorldConfig;

    fn session() -> Session {
        Session::new(SessionConfig::default()).unwrap()
    }

    #[test]
    fn summary_new_session() {
        let s = session();
        let summary = SessionInspector::summary(&s);
        assert_eq!(summary.frame, 0);
        assert_eq!(summary.entities, 1);
        assert_eq!(summary.targets, 1);
        assert_eq!(summary.bodies, 2);
        assert_eq!(summary.meshes, 2);
    }

    #[test]
    fn summary_counts_kinds() {
        let mut s = session();
        s.push(Command::SpawnProjectile);
        s.push(Command::SpawnCube(CubeParams::default()));
        s.push(Command::SpawnCube(CubeParams::default()));
        s.frame(1.0 / 60.0).unwrap();

        let summary = SessionInspector::summary(&s);
        assert_eq!(summary.frame, 1);
        assert_eq!(summary.projectiles, 1);
        assert_eq!(summary.cubes, 2);
        assert_eq!(summary.entities, 4);
        assert_eq!(summary.steps, 1);
        assert!(summary.to_string().contains("cubes=2"));
    }

    #[test]
    fn summary_floorless_has_no_floor_body() {
        let s = Session::new(SessionConfig {
            world: WorldConfig::floorless(),
            seed: 3,
        })
        .unwrap();
        let summary = SessionInspector::summary(&s);
        assert_eq!(summary.bodies, 1);
        assert_eq!(summary.meshes, 1);
        assert_eq!(summary.seed, 3);
    }

    #[test]
    fn inspect_entity_found_and_missing() {
        let mut s = session();
        let id = s.spawn_cube(&CubeParams::default()).unwrap();
        let info = SessionInspector::inspect_entity(&s, id).unwrap();
        assert_eq!(info.kind, EntityKind::Cube);
        assert_eq!(info.position, Vec3::new(0.0, 2.0, 0.0));
        assert!(info.to_string().starts_with("Cube ["));

        assert!(SessionInspector::inspect_entity(&s, EntityId::new()).is_none());
    }

    #[test]
    fn list_entities_in_creation_order() {
        let mut s = session();
        let cube = s.spawn_cube(&CubeParams::default()).unwrap();
        let list = SessionInspector::list_entities(&s);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].1, EntityKind::Target);
        assert_eq!(list[1], (cube, EntityKind::Cube));
    }
}
