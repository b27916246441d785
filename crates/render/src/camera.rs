use glam::{Mat4, Vec3};
use physbox_common::CameraMotion;

/// Fly camera with position, yaw, pitch, and projection parameters.
/// Camera motion never touches the physics world.
#[derive(Debug, Clone, PartialEq)]
pub struct FlyCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub speed: f32,
    pub boost: f32,
    pub sensitivity: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 5.0, 15.0),
            yaw: -90.0_f32.to_radians(),
            pitch: -15.0_f32.to_radians(),
            fov: 60.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
            speed: 10.0,
            boost: 3.0,
            sensitivity: 0.003,
        }
    }
}

impl FlyCamera {
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    /// Move by held input over `dt` seconds. Vertical motion is along world Y.
    pub fn update(&mut self, dt: f32, motion: &CameraMotion) {
        if motion.is_idle() || dt <= 0.0 {
            return;
        }
        let mult = if motion.boost { self.boost } else { 1.0 };
        let step = self.speed * mult * dt;
        let delta = self.forward() * motion.forward.clamp(-1.0, 1.0)
            + self.right() * motion.right.clamp(-1.0, 1.0)
            + Vec3::Y * motion.up.clamp(-1.0, 1.0);
        self.position += delta * step;
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch -= dy * self.sensitivity;
        self.pitch = self
            .pitch
            .clamp(-89.0_f32.to_radians(), 89.0_f32.to_radians());
    }

    /// Point the camera at `target`.
    pub fn look_at(&mut self, target: Vec3) {
        let dir = (target - self.position).normalize_or_zero();
        if dir == Vec3::ZERO {
            return;
        }
        self.pitch = dir.y.clamp(-1.0, 1.0).asin();
        self.yaw = dir.z.atan2(dir.x);
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera() {
        let cam = FlyCamera::default();
        assert!(cam.position.y > 0.0);
        let vp = cam.view_projection();
        // Should produce a valid matrix (no NaN)
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn forward_is_unit_length() {
        let cam = FlyCamera::default();
        assert!((cam.forward().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn update_moves_forward() {
        let mut cam = FlyCamera::default();
        let start = cam.position;
        let motion = CameraMotion {
            forward: 1.0,
            ..CameraMotion::default()
        };
        cam.update(1.0, &motion);
        let moved = cam.position - start;
        assert!((moved.length() - cam.speed).abs() < 1e-3);
        assert!(moved.dot(cam.forward()) > 0.0);
    }

    #[test]
    fn update_idle_or_zero_dt_is_noop() {
        let mut cam = FlyCamera::default();
        let start = cam.position;
        cam.update(1.0, &CameraMotion::default());
        cam.update(
            0.0,
            &CameraMotion {
                up: 1.0,
                ..CameraMotion::default()
            },
        );
        assert_eq!(cam.position, start);
    }

    #[test]
    fn boost_multiplies_speed() {
        let mut cam = FlyCamera::default();
        let start = cam.position;
        cam.update(
            1.0,
            &CameraMotion {
                up: 1.0,
                boost: true,
                ..CameraMotion::default()
            },
        );
        assert!((cam.position.y - start.y - cam.speed * cam.boost).abs() < 1e-3);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = FlyCamera::default();
        cam.rotate(0.0, -1.0e6);
        assert!(cam.pitch <= 89.0_f32.to_radians());
    }

    #[test]
    fn look_at_faces_target() {
        let mut cam = FlyCamera::default();
        let target = Vec3::new(0.0, 5.0, -10.0);
        cam.look_at(target);
        let expected = (target - cam.position).normalize();
        assert!(cam.forward().dot(expected) > 0.999);
    }

    #[test]
    fn set_aspect_guards_zero_height() {
        let mut cam = FlyCamera::default();
        cam.set_aspect(800, 0);
        assert_eq!(cam.aspect, 800.0);
    }
}
