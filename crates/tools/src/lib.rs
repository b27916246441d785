//! Developer tooling: read-only views of a running session.
//!
//! Used by the desktop panel and by `physbox-cli simulate`.

mod inspector;

pub use inspector::{EntityInfo, SessionInspector, SessionSummary};
