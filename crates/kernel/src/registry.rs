use physbox_common::EntityId;
use physbox_physics::BodyHandle;
use physbox_render::MeshId;
use std::convert::Infallible;

/// What a spawner created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Target,
    Projectile,
    Cube,
}

/// A visual mesh paired with the physics body that drives it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub mesh: MeshId,
    pub body: BodyHandle,
}

/// Visitor verdict for [`EntityRegistry::retain_live`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Keep,
    Evict,
}

/// Ordered collection of live entities, in creation order.
///
/// The registry only owns the pairing. Whoever evicts an entry must release
/// its body and mesh in the same operation.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: Vec<Entity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Live entities in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Count of live entities of one kind.
    pub fn count_kind(&self, kind: EntityKind) -> usize {
        self.entities.iter().filter(|e| e.kind == kind).count()
    }

    /// Visit every live entity, newest first.
    pub fn for_each_live(&self, mut visit: impl FnMut(&Entity)) {
        for entity in self.entities.iter().rev() {
            visit(entity);
        }
    }

    /// Visit every live entity, newest first, dropping those the visitor evicts.
    ///
    /// Traversal runs from the highest index down, so removing entry `i` only
    /// shifts entries that were already visited. Each entry is visited exactly
    /// once. Evicted entries are returned in visit order.
    pub fn retain_live(&mut self, mut visit: impl FnMut(&Entity) -> Liveness) -> Vec<Entity> {
        match self.try_retain_live(|e| Ok::<_, Infallible>(visit(e))) {
            Ok(evicted) => evicted,
            Err(never) => match never {},
        }
    }

    /// Fallible form of [`EntityRegistry::retain_live`]. Stops at the first
    /// error; entries evicted before it stay removed.
    pub fn try_retain_live<E>(
        &mut self,
        mut visit: impl FnMut(&Entity) -> Result<Liveness, E>,
    ) -> Result<Vec<Entity>, E> {
        let mut evicted = Vec::new();
        for i in (0..self.entities.len()).rev() {
            if visit(&self.entities[i])? == Liveness::Evict {
                evicted.push(self.entities.remove(i));
            }
        }
        Ok(evicted)
    }

    /// Detach an entity. Removing one that is already gone returns `None`.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(index))
    }

    /// Detach everything, oldest first.
    pub fn drain(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.entities)
    }
}
