//! Input dispatch
//!
//! Raw key/scroll events come in from the platform layer; the dispatcher
//! owns the held-key state, turns control keys into discrete
//! [`InputIntent`]s for the world to apply, and forwards the held game
//! keys to the transport on every transition.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::net::protocol::ClientMessage;
use crate::util::vec2::Vec2;

/// Logical keys understood by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Fire,
    ToggleDebug,
    Shake,
    SwitchCamera,
}

impl Key {
    /// Keyboard layout: maps a platform key code to a logical key
    pub fn from_code(code: &str) -> Option<Key> {
        match code {
            "ArrowUp" | "KeyW" => Some(Key::Up),
            "ArrowDown" | "KeyS" => Some(Key::Down),
            "ArrowLeft" | "KeyA" => Some(Key::Left),
            "ArrowRight" | "KeyD" => Some(Key::Right),
            "Space" => Some(Key::Fire),
            "Backquote" | "F3" => Some(Key::ToggleDebug),
            "KeyK" => Some(Key::Shake),
            "KeyC" => Some(Key::SwitchCamera),
            _ => None,
        }
    }

    /// Unit direction in screen orientation (y grows downward)
    pub fn direction(self) -> Option<Vec2> {
        match self {
            Key::Up => Some(Vec2::UP),
            Key::Down => Some(Vec2::DOWN),
            Key::Left => Some(Vec2::LEFT),
            Key::Right => Some(Vec2::RIGHT),
            _ => None,
        }
    }

    /// Keys forwarded to the transport as player input
    pub fn is_game_input(self) -> bool {
        matches!(self, Key::Up | Key::Down | Key::Left | Key::Right | Key::Fire)
    }
}

/// Raw event from the platform layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    /// Scroll-wheel delta, positive zooms in
    Scroll(f32),
}

/// Discrete action for the world to apply on its next tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputIntent {
    ToggleDebug,
    Shake,
    SwitchCamera,
    Zoom(f32),
}

/// Directional keys currently held
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Directions {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Directions {
    /// Sum of held unit directions (opposites cancel)
    pub fn vector(&self) -> Vec2 {
        let mut v = Vec2::ZERO;
        if self.up {
            v += Vec2::UP;
        }
        if self.down {
            v += Vec2::DOWN;
        }
        if self.left {
            v += Vec2::LEFT;
        }
        if self.right {
            v += Vec2::RIGHT;
        }
        v
    }

    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

/// Owns key state and the outbound intent queue
pub struct InputDispatcher {
    /// Held game keys in press order
    held: SmallVec<[Key; 8]>,
    sender: Sender<ClientMessage>,
    receiver: Receiver<ClientMessage>,
    dropped: u64,
}

impl InputDispatcher {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            held: SmallVec::new(),
            sender,
            receiver,
            dropped: 0,
        }
    }

    /// Receiver for the transport collaborator
    pub fn outbound(&self) -> Receiver<ClientMessage> {
        self.receiver.clone()
    }

    /// Apply one raw event; control keys yield an intent on press
    pub fn handle(&mut self, event: InputEvent) -> Option<InputIntent> {
        match event {
            InputEvent::KeyDown(key) if key.is_game_input() => {
                if !self.held.contains(&key) {
                    self.held.push(key);
                    self.send_held();
                }
                None
            }
            InputEvent::KeyUp(key) if key.is_game_input() => {
                if let Some(index) = self.held.iter().position(|k| *k == key) {
                    self.held.remove(index);
                    self.send_held();
                }
                None
            }
            InputEvent::KeyDown(Key::ToggleDebug) => Some(InputIntent::ToggleDebug),
            InputEvent::KeyDown(Key::Shake) => Some(InputIntent::Shake),
            InputEvent::KeyDown(Key::SwitchCamera) => Some(InputIntent::SwitchCamera),
            InputEvent::KeyDown(_) | InputEvent::KeyUp(_) => None,
            InputEvent::Scroll(delta) if delta != 0.0 => Some(InputIntent::Zoom(delta)),
            InputEvent::Scroll(_) => None,
        }
    }

    pub fn held(&self) -> &[Key] {
        &self.held
    }

    pub fn directions(&self) -> Directions {
        let mut dirs = Directions::default();
        for key in &self.held {
            match key {
                Key::Up => dirs.up = true,
                Key::Down => dirs.down = true,
                Key::Left => dirs.left = true,
                Key::Right => dirs.right = true,
                _ => {}
            }
        }
        dirs
    }

    /// Stale intent messages evicted to make room for newer held state
    pub fn dropped_count(&self) -> u64 {
        self.dropped
    }

    fn send_held(&mut self) {
        let mut message = ClientMessage::InputIntent {
            held: self.held.to_vec(),
        };
        loop {
            match self.sender.try_send(message) {
                Ok(()) => {
                    debug!("Held keys now {:?}", self.held);
                    return;
                }
                Err(TrySendError::Full(returned)) => {
                    // Each message is the full held set, so the oldest is
                    // the one to lose
                    if self.receiver.try_recv().is_ok() {
                        self.dropped += 1;
                        if self.dropped == 1 {
                            warn!("Input intent queue full, keeping only the newest updates");
                        }
                    }
                    message = returned;
                }
                // Receiver is owned by self, so this cannot disconnect
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }
}

impl Default for InputDispatcher {
    fn default() -> Self {
        Self::new(crate::game::constants::net::INTENT_QUEUE_SIZE)
    }
}
