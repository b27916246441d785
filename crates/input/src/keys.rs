use crate::command::{Command, CommandQueue};
use physbox_common::CameraMotion;
use std::collections::HashSet;

/// Logical keys the sandbox reacts to. Hosts map their own key codes onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
    Boost,
    Fire,
    Reset,
}

impl Key {
    fn moves_camera(self) -> bool {
        matches!(
            self,
            Key::Forward | Key::Backward | Key::Left | Key::Right | Key::Up | Key::Down | Key::Boost
        )
    }
}

/// Held-key tracking.
///
/// Fire and reset trigger on the press edge only, so OS key repeat does not
/// turn a held key into a stream of projectiles. Movement keys publish the
/// resulting [`CameraMotion`] whenever it changes.
#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn handle_key(&mut self, key: Key, pressed: bool, queue: &mut CommandQueue) {
        let changed = if pressed {
            self.held.insert(key)
        } else {
            self.held.remove(&key)
        };
        if !changed {
            return;
        }

        if pressed {
            match key {
                Key::Fire => queue.push(Command::SpawnProjectile),
                Key::Reset => queue.push(Command::Reset),
                _ => {}
            }
        }
        if key.moves_camera() {
            queue.push(Command::SetCameraMotion(self.motion()));
        }
    }

    /// Drop every held key, e.g. when the window loses focus.
    pub fn release_all(&mut self, queue: &mut CommandQueue) {
        let had_motion = self.held.iter().any(|k| k.moves_camera());
        self.held.clear();
        if had_motion {
            queue.push(Command::SetCameraMotion(CameraMotion::default()));
        }
    }

    pub fn motion(&self) -> CameraMotion {
        let axis = |pos: Key, neg: Key| {
            (self.is_held(pos) as i32 - self.is_held(neg) as i32) as f32
        };
        CameraMotion {
            forward: axis(Key::Forward, Key::Backward),
            right: axis(Key::Right, Key::Left),
            up: axis(Key::Up, Key::Down),
            boost: self.is_held(Key::Boost),
        }
    }
}
