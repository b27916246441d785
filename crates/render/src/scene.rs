use crate::camera::FlyCamera;
use glam::{Quat, Vec3};
use physbox_common::{Color, Transform};
use std::collections::BTreeMap;

/// Handle to a mesh owned by a [`RenderScene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u64);

/// Geometry of a mesh, in local space centred at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeshShape {
    Cuboid { half_extents: Vec3 },
    Sphere { radius: f32 },
}

/// A visual mesh: geometry, flat colour, transform and shadow flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub shape: MeshShape,
    pub color: Color,
    pub transform: Transform,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Mesh {
    pub fn new(shape: MeshShape, color: Color) -> Self {
        Self {
            shape,
            color,
            transform: Transform::default(),
            cast_shadow: true,
            receive_shadow: true,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn with_shadows(mut self, cast: bool, receive: bool) -> Self {
        self.cast_shadow = cast;
        self.receive_shadow = receive;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Ambient,
    /// Light travelling along `-direction`; `direction` points towards the light.
    Directional { direction: Vec3 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub color: Color,
    pub intensity: f32,
}

impl Light {
    /// Colour times intensity.
    pub fn radiance(&self) -> Vec3 {
        Vec3::from(self.color.to_array()) * self.intensity
    }
}

/// Lighting reduced to what a single-pass shader needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shading {
    pub ambient: Vec3,
    /// Unit-ish vector towards the directional light.
    pub direction: Vec3,
    pub diffuse: Vec3,
}

/// Output surface size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// The render scene: meshes, lights, the camera, and the viewport.
///
/// Meshes are stored in a BTreeMap so every renderer walks them in the same
/// order. The scene never talks to the physics world; transforms are written
/// into it from outside.
#[derive(Debug, Clone)]
pub struct RenderScene {
    meshes: BTreeMap<MeshId, Mesh>,
    next_mesh: u64,
    lights: Vec<Light>,
    camera: FlyCamera,
    viewport: Viewport,
    pub background: Color,
}

impl Default for RenderScene {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderScene {
    /// Empty scene with an ambient and a directional light.
    pub fn new() -> Self {
        let viewport = Viewport::default();
        let mut camera = FlyCamera::default();
        camera.set_aspect(viewport.width, viewport.height);
        Self {
            meshes: BTreeMap::new(),
            next_mesh: 0,
            lights: vec![
                Light {
                    kind: LightKind::Ambient,
                    color: Color::WHITE,
                    intensity: 0.3,
                },
                Light {
                    kind: LightKind::Directional {
                        direction: Vec3::new(0.3, 1.0, 0.5).normalize(),
                    },
                    color: Color::WHITE,
                    intensity: 0.7,
                },
            ],
            camera,
            viewport,
            background: Color::rgb(0.1, 0.1, 0.15),
        }
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        let id = MeshId(self.next_mesh);
        self.next_mesh += 1;
        self.meshes.insert(id, mesh);
        id
    }

    /// Remove a mesh. Returns `None` if it was already gone.
    pub fn remove_mesh(&mut self, id: MeshId) -> Option<Mesh> {
        self.meshes.remove(&id)
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(&id)
    }

    pub fn contains(&self, id: MeshId) -> bool {
        self.meshes.contains_key(&id)
    }

    /// Overwrite a mesh's position and rotation, leaving its scale alone.
    pub fn set_pose(&mut self, id: MeshId, position: Vec3, rotation: Quat) -> bool {
        match self.meshes.get_mut(&id) {
            Some(mesh) => {
                mesh.transform.position = position;
                mesh.transform.rotation = rotation;
                true
            }
            None => false,
        }
    }

    pub fn meshes(&self) -> impl Iterator<Item = (MeshId, &Mesh)> {
        self.meshes.iter().map(|(id, m)| (*id, m))
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn camera(&self) -> &FlyCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut FlyCamera {
        &mut self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Resize the output; only the viewport and the camera aspect change.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Viewport {
            width: width.max(1),
            height: height.max(1),
        };
        self.camera.set_aspect(width, height);
        tracing::debug!(width, height, "viewport resized");
    }

    /// Summed ambient light and the first directional light, each scaled by
    /// its colour.
    pub fn shading(&self) -> Shading {
        let ambient: Vec3 = self
            .lights
            .iter()
            .filter(|l| l.kind == LightKind::Ambient)
            .map(Light::radiance)
            .sum();
        let (direction, diffuse) = self
            .lights
            .iter()
            .find_map(|l| match l.kind {
                LightKind::Directional { direction } => Some((direction, l.radiance())),
                LightKind::Ambient => None,
            })
            .unwrap_or((Vec3::Y, Vec3::ZERO));
        Shading {
            ambient,
            direction,
            diffuse,
        }
    }
}
