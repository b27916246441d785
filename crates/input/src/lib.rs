//! Input: host events become [`Command`]s on a queue the frame loop drains.
//!
//! # Invariants
//! - The session consumes commands, never raw device events.
//! - Commands are applied in the order they were pushed.

pub mod command;
pub mod keys;

pub use command::{Command, CommandQueue};
pub use keys::{InputState, Key};
