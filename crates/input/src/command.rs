use physbox_common::{CameraMotion, CubeParams};
use std::collections::VecDeque;

/// A request from the host to the session.
///
/// Keyboard, resize and panel events are all turned into commands so the
/// frame loop sees them at one well-defined point per frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Throw a ball from the camera along its view direction.
    SpawnProjectile,
    /// Drop a cube using the given parameters.
    SpawnCube(CubeParams),
    /// Place another target box.
    SpawnTarget,
    /// Output surface changed size.
    SetViewport { width: u32, height: u32 },
    /// Replace the held camera movement input.
    SetCameraMotion(CameraMotion),
    /// Mouse-look delta in pixels.
    RotateCamera { dx: f32, dy: f32 },
    /// Clear every entity and respawn the target.
    Reset,
}

/// FIFO queue of pending commands.
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: VecDeque<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        tracing::trace!(?command, "command queued");
        self.pending.push_back(command);
    }

    /// Take every pending command, oldest first.
    pub fn drain(&mut self) -> Vec<Command> {
        self.pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_preserves_order() {
        let mut q = CommandQueue::new();
        q.push(Command::SpawnProjectile);
        q.push(Command::SetViewport {
            width: 10,
            height: 20,
        });
        q.push(Command::SpawnCube(CubeParams::default()));

        let drained = q.drain();
        assert_eq!(
            drained,
            vec![
                Command::SpawnProjectile,
                Command::SetViewport {
                    width: 10,
                    height: 20
                },
                Command::SpawnCube(CubeParams::default()),
            ]
        );
        assert!(q.is_empty());
    }

    #[test]
    fn drain_empty_queue() {
        let mut q = CommandQueue::new();
        assert!(q.drain().is_empty());
        assert_eq!(q.len(), 0);
    }
}
