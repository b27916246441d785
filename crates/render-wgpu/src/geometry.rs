//! CPU-side geometry: unit primitives and per-mesh instance data.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use physbox_render::{Mesh, MeshShape};
use std::f32::consts::PI;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct InstanceData {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Which unit primitive an instance is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Primitive {
    Cube,
    Sphere,
}

/// Unit cube centred on the origin, edge length 1.
pub(crate) fn unit_cube() -> (Vec<Vertex>, Vec<u16>) {
    let faces: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    ];
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in faces {
        let base = vertices.len() as u16;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let p = (normal + u * su + v * sv) * 0.5;
            vertices.push(Vertex {
                position: p.to_array(),
                normal: normal.to_array(),
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    (vertices, indices)
}

/// UV sphere of radius 1.
pub(crate) fn unit_sphere(rings: u16, segments: u16) -> (Vec<Vertex>, Vec<u16>) {
    let mut vertices = Vec::new();
    for r in 0..=rings {
        let theta = r as f32 / rings as f32 * PI;
        for s in 0..=segments {
            let phi = s as f32 / segments as f32 * 2.0 * PI;
            let n = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
            vertices.push(Vertex {
                position: n.to_array(),
                normal: n.to_array(),
            });
        }
    }
    let stride = segments + 1;
    let mut indices = Vec::new();
    for r in 0..rings {
        for s in 0..segments {
            let a = r * stride + s;
            let b = a + stride;
            indices.extend_from_slice(&[a, a + 1, b, b, a + 1, b + 1]);
        }
    }
    (vertices, indices)
}

/// Grid of lines on the XZ plane at height `y`, covering
/// `[-half_extent, half_extent]` on both axes. Interior lines sit on multiples
/// of `spacing`; the outer border always runs along the edge.
pub(crate) fn grid_lines(half_extent: f32, spacing: f32, y: f32) -> Vec<LineVertex> {
    let color = [0.4, 0.4, 0.4, 1.0];
    let e = half_extent.max(0.0);
    let n = (e / spacing).floor() as i32;
    let mut offsets: Vec<f32> = (-n..=n).map(|i| i as f32 * spacing).collect();
    if n as f32 * spacing < e {
        offsets.insert(0, -e);
        offsets.push(e);
    }
    let mut verts = Vec::with_capacity(offsets.len() * 4);
    for offset in offsets {
        for (a, b) in [
            ([-e, y, offset], [e, y, offset]),
            ([offset, y, -e], [offset, y, e]),
        ] {
            verts.push(LineVertex { position: a, color });
            verts.push(LineVertex { position: b, color });
        }
    }
    verts
}

/// Model matrix and colour for a scene mesh, scaled from its shape.
pub(crate) fn instance_for(mesh: &Mesh) -> (Primitive, InstanceData) {
    let (primitive, scale) = match mesh.shape {
        MeshShape::Cuboid { half_extents } => (Primitive::Cube, half_extents * 2.0),
        MeshShape::Sphere { radius } => (Primitive::Sphere, Vec3::splat(radius)),
    };
    let t = &mesh.transform;
    let model = Mat4::from_scale_rotation_translation(scale * t.scale, t.rotation, t.position);
    let [r, g, b] = mesh.color.to_array();
    (
        primitive,
        InstanceData {
            model: model.to_cols_array_2d(),
            color: [r, g, b, 1.0],
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use physbox_common::Color;

    #[test]
    fn unit_cube_has_flat_faces() {
        let (v, i) = unit_cube();
        assert_eq!(v.len(), 24);
        assert_eq!(i.len(), 36);
        for vert in &v {
            for c in vert.position {
                assert!((c.abs() - 0.5).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn cube_winding_faces_outward() {
        let (v, i) = unit_cube();
        for tri in i.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|k| Vec3::from(v[k as usize].position));
            let n = (b - a).cross(c - a);
            assert!(n.dot(Vec3::from(v[tri[0] as usize].normal)) > 0.0);
        }
    }

    #[test]
    fn sphere_vertices_on_unit_radius() {
        let (v, i) = unit_sphere(8, 12);
        assert_eq!(v.len(), 9 * 13);
        assert_eq!(i.len(), 8 * 12 * 6);
        assert!(i.iter().all(|&k| (k as usize) < v.len()));
        for vert in &v {
            assert!((Vec3::from(vert.position).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn grid_line_count() {
        let g = grid_lines(2.0, 1.0, 0.0);
        assert_eq!(g.len(), 5 * 4);
    }

    #[test]
    fn grid_matches_floor_extent() {
        for half_extent in [25.0, 10.0, 12.5, 0.4] {
            let g = grid_lines(half_extent, 1.0, 0.002);
            let max = g
                .iter()
                .flat_map(|v| [v.position[0].abs(), v.position[2].abs()])
                .fold(0.0_f32, f32::max);
            assert_eq!(max, half_extent, "grid edge for floor {half_extent}");
            assert!(g.iter().all(|v| v.position[1] == 0.002));
        }
        // 12.5 adds border lines at +-12.5 to the 25 unit lines
        assert_eq!(grid_lines(12.5, 1.0, 0.0).len(), 27 * 4);
    }

    #[test]
    fn instance_scales_by_shape() {
        let mesh = Mesh::new(
            MeshShape::Cuboid {
                half_extents: Vec3::new(1.0, 2.0, 3.0),
            },
            Color::RED,
        )
        .at(Vec3::new(4.0, 5.0, 6.0));
        let (p, inst) = instance_for(&mesh);
        assert_eq!(p, Primitive::Cube);
        let m = Mat4::from_cols_array_2d(&inst.model);
        let (scale, rot, pos) = m.to_scale_rotation_translation();
        assert!((scale - Vec3::new(2.0, 4.0, 6.0)).length() < 1e-5);
        assert!(rot.angle_between(Quat::IDENTITY) < 1e-5);
        assert_eq!(pos, Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(inst.color, [1.0, 0.0, 0.0, 1.0]);

        let ball = Mesh::new(MeshShape::Sphere { radius: 0.2 }, Color::WHITE);
        let (p, inst) = instance_for(&ball);
        assert_eq!(p, Primitive::Sphere);
        assert!((inst.model[0][0] - 0.2).abs() < 1e-6);
    }
}
