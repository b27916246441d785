use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Errors from validating a [`WorldConfig`].
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("gravity must be finite, got {0:?}")]
    NonFiniteGravity(Vec3),
    #[error("friction must be finite and non-negative, got {0}")]
    InvalidFriction(f32),
    #[error("restitution must lie in [0, 1], got {0}")]
    InvalidRestitution(f32),
    #[error("fixed step must be positive, got {0}")]
    InvalidFixedStep(f32),
    #[error("max substeps must be at least 1")]
    ZeroSubsteps,
    #[error("max frame delta must be positive, got {0}")]
    InvalidMaxFrameDelta(f32),
    #[error("floor dimensions must be positive, got half_extent={half_extent} thickness={thickness}")]
    InvalidFloor { half_extent: f32, thickness: f32 },
    #[error("loss threshold {0} must lie below the floor")]
    LossThresholdAboveFloor(f32),
}

/// Surface response shared by every collider in the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactMaterial {
    pub friction: f32,
    pub restitution: f32,
}

impl Default for ContactMaterial {
    fn default() -> Self {
        Self {
            friction: 0.4,
            restitution: 0.3,
        }
    }
}

/// Static floor slab. Its top face sits at y = 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloorConfig {
    /// Half of the side length on X and Z.
    pub half_extent: f32,
    /// Half of the slab height.
    pub thickness: f32,
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            half_extent: 25.0,
            thickness: 0.5,
        }
    }
}

/// Fixed-step integration settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepConfig {
    /// Nominal step size in seconds.
    pub fixed_step: f32,
    /// Upper bound on internal steps per frame.
    pub max_substeps: u32,
    /// Frame deltas above this are clamped before they reach the world.
    pub max_frame_delta: f32,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            fixed_step: 1.0 / 60.0,
            max_substeps: 3,
            max_frame_delta: 0.1,
        }
    }
}

/// World configuration. Immutable after the world is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub gravity: Vec3,
    pub contact: ContactMaterial,
    pub floor: Option<FloorConfig>,
    pub step: StepConfig,
    /// Bodies whose y drops below this have left the playable volume.
    pub loss_threshold: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.82, 0.0),
            contact: ContactMaterial::default(),
            floor: Some(FloorConfig::default()),
            step: StepConfig::default(),
            loss_threshold: -50.0,
        }
    }
}

impl WorldConfig {
    /// Same as the default but without a floor, so everything falls.
    pub fn floorless() -> Self {
        Self {
            floor: None,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.gravity.is_finite() {
            return Err(ConfigError::NonFiniteGravity(self.gravity));
        }
        let ContactMaterial {
            friction,
            restitution,
        } = self.contact;
        if !friction.is_finite() || friction < 0.0 {
            return Err(ConfigError::InvalidFriction(friction));
        }
        if !(0.0..=1.0).contains(&restitution) {
            return Err(ConfigError::InvalidRestitution(restitution));
        }
        if !(self.step.fixed_step > 0.0 && self.step.fixed_step.is_finite()) {
            return Err(ConfigError::InvalidFixedStep(self.step.fixed_step));
        }
        if self.step.max_substeps == 0 {
            return Err(ConfigError::ZeroSubsteps);
        }
        if !(self.step.max_frame_delta > 0.0 && self.step.max_frame_delta.is_finite()) {
            return Err(ConfigError::InvalidMaxFrameDelta(self.step.max_frame_delta));
        }
        if let Some(floor) = self.floor {
            if !(floor.half_extent > 0.0 && floor.thickness > 0.0) {
                return Err(ConfigError::InvalidFloor {
                    half_extent: floor.half_extent,
                    thickness: floor.thickness,
                });
            }
        }
        // Floor top is at y = 0; without a floor the same bound keeps spawns alive.
        if self.loss_threshold.is_nan() || self.loss_threshold >= 0.0 {
            return Err(ConfigError::LossThresholdAboveFloor(self.loss_threshold));
        }
        Ok(())
    }
}
