use crate::scene::{MeshShape, RenderScene};
use std::fmt::Write;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene and produces output. It never mutates the
/// scene and never sees the physics world.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the current scene.
    fn render(&self, scene: &RenderScene) -> Self::Output;
}

/// Text renderer for headless runs, logs and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &RenderScene) -> String {
        let cam = scene.camera();
        let vp = scene.viewport();
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Scene (meshes={}, viewport={}x{}) ===",
            scene.mesh_count(),
            vp.width,
            vp.height
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) aspect={:.2}",
            cam.position.x, cam.position.y, cam.position.z, cam.aspect
        );

        for (id, mesh) in scene.meshes() {
            let p = mesh.transform.position;
            let shape = match mesh.shape {
                MeshShape::Cuboid { half_extents: h } => {
                    format!("box {:.2}x{:.2}x{:.2}", h.x * 2.0, h.y * 2.0, h.z * 2.0)
                }
                MeshShape::Sphere { radius } => format!("sphere r={radius:.2}"),
            };
            let _ = writeln!(
                out,
                "  [{:>4}] {shape} pos=({:.2}, {:.2}, {:.2})",
                id.0, p.x, p.y, p.z
            );
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Mesh;
    use glam::Vec3;
    use physbox_common::Color;

    #[test]
    fn debug_renderer_empty_scene() {
        let scene = RenderScene::new();
        let output = DebugTextRenderer::new().render(&scene);
        assert!(output.contains("meshes=0"));
        assert!(output.contains("viewport=1280x720"));
    }

    #[test]
    fn debug_renderer_with_meshes() {
        let mut scene = RenderScene::new();
        scene.add_mesh(Mesh::new(MeshShape::Sphere { radius: 0.2 }, Color::WHITE));
        scene.add_mesh(
            Mesh::new(
                MeshShape::Cuboid {
                    half_extents: Vec3::splat(1.0),
                },
                Color::ORANGE,
            )
            .at(Vec3::new(1.0, 2.0, 3.0)),
        );

        let output = DebugTextRenderer::new().render(&scene);
        assert!(output.contains("meshes=2"));
        assert!(output.contains("sphere r=0.20"));
        assert!(output.contains("box 2.00x2.00x2.00 pos=(1.00, 2.00, 3.00)"));
    }
}
