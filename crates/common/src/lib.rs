//! Shared types used by every physbox crate.

pub mod types;

pub use types::{CameraMotion, Color, CubeParams, EntityId, Transform};
