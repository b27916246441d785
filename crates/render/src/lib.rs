//! Render Scene: renderer-agnostic meshes, lights, camera and viewport.
//!
//! # Invariants
//! - Renderers read the scene; they never mutate it.
//! - The scene holds no physics state; poses are written into it by the frame loop.

mod camera;
mod renderer;
mod scene;

pub use camera::FlyCamera;
pub use renderer::{DebugTextRenderer, Renderer};
pub use scene::{Light, LightKind, Mesh, MeshId, MeshShape, RenderScene, Shading, Viewport};
