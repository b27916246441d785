use physbox_common::{CubeParams, EntityId};
use physbox_physics::ConfigError;

/// Errors surfaced by the session.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SessionError {
    #[error("invalid world configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("cube size {0} outside [{min}, {max}]", min = CubeParams::MIN_SIZE, max = CubeParams::MAX_SIZE)]
    InvalidCubeSize(f32),
    #[error("entity {0:?} lost its body or mesh")]
    DanglingEntity(EntityId),
}
