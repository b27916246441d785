//! Physics World: rigid-body simulation state backed by rapier3d.
//!
//! # Invariants
//! - Configuration is immutable once the world is built.
//! - The world advances only in whole fixed steps; frame deltas feed an accumulator.
//! - Bodies are dynamic unless they are the floor.

pub mod config;
pub mod world;

pub use config::{ConfigError, ContactMaterial, FloorConfig, StepConfig, WorldConfig};
pub use world::{BodyDesc, BodyHandle, BodyPose, BodyShape, PhysicsWorld};
