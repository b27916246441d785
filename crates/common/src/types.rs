use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an entity in the sandbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, for log lines and labels.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Linear RGB colour with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const ORANGE: Color = Color::rgb(1.0, 0.55, 0.1);
    pub const GREY: Color = Color::rgb(0.55, 0.55, 0.55);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(
            channel(0)? as f32 / 255.0,
            channel(2)? as f32 / 255.0,
            channel(4)? as f32 / 255.0,
        ))
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn from_array(c: [f32; 3]) -> Self {
        Self::rgb(c[0], c[1], c[2])
    }
}

/// User-editable parameters for the cube spawner. Read at spawn time only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubeParams {
    /// Edge length.
    pub size: f32,
    pub color: Color,
    /// Scatter the cube over the play area instead of dropping it at the default spot.
    pub randomize_position: bool,
}

impl CubeParams {
    pub const MIN_SIZE: f32 = 0.1;
    pub const MAX_SIZE: f32 = 3.0;

    pub fn size_in_range(&self) -> bool {
        (Self::MIN_SIZE..=Self::MAX_SIZE).contains(&self.size)
    }
}

impl Default for CubeParams {
    fn default() -> Self {
        Self {
            size: 1.0,
            color: Color::RED,
            randomize_position: false,
        }
    }
}

/// Held movement input for the fly camera. Each axis is in `[-1, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraMotion {
    /// Forward (+) / backward (-).
    pub forward: f32,
    /// Right (+) / left (-).
    pub right: f32,
    /// Up (+) / down (-).
    pub up: f32,
    pub boost: bool,
}

impl CameraMotion {
    pub fn is_idle(&self) -> bool {
        self.forward == 0.0 && self.right == 0.0 && self.up == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_uniqueness() {
        let a = EntityId::new();
        let b = EntityId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn entity_id_short_is_eight_chars() {
        assert_eq!(EntityId::new().short().len(), 8);
    }

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
    }

    #[test]
    fn color_from_hex() {
        assert_eq!(Color::from_hex("#ff0000"), Some(Color::RED));
        assert_eq!(Color::from_hex("ffffff"), Some(Color::WHITE));
        assert!(Color::from_hex("#fff").is_none());
        assert!(Color::from_hex("zzzzzz").is_none());
    }

    #[test]
    fn cube_params_size_range() {
        assert!(CubeParams::default().size_in_range());
        let tiny = CubeParams {
            size: 0.01,
            ..CubeParams::default()
        };
        assert!(!tiny.size_in_range());
        let nan = CubeParams {
            size: f32::NAN,
            ..CubeParams::default()
        };
        assert!(!nan.size_in_range());
    }

    #[test]
    fn camera_motion_default_is_idle() {
        assert!(CameraMotion::default().is_idle());
        let m = CameraMotion {
            forward: 1.0,
            ..CameraMotion::default()
        };
        assert!(!m.is_idle());
    }
}
