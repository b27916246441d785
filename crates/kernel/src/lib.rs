//! Sandbox kernel: the session that pairs physics bodies with visual meshes.
//!
//! # Invariants
//! - Every registered entity owns exactly one body and one mesh.
//! - After a frame, each live mesh pose is a bit-for-bit copy of its body pose.
//! - Eviction releases the body, the mesh and the registry entry in the same pass.
//! - Commands are applied once per frame, before the physics step.

pub mod error;
pub mod registry;
pub mod session;
pub mod spawn;

pub use error::SessionError;
pub use registry::{Entity, EntityKind, EntityRegistry, Liveness};
pub use session::{FrameReport, Session, SessionConfig};
pub use spawn::{Launch, SpawnContext};
