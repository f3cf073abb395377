//! Snapshot and input-intent messages exchanged with the transport
//!
//! Snapshots arrive as JSON; vectors may be encoded as `{"x":..,"y":..}`
//! objects or `[x, y]` pairs and are normalized to [`Vec2`] here. The core
//! assumes well-formed vectors: a malformed one is a [`DecodeError`] at
//! this boundary and never reaches the simulation.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::input::Key;
use crate::util::vec2::Vec2;

/// Identity of a tracked player (and of its bullet group)
pub type PlayerKey = String;

/// Authoritative kinematic state of one agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    #[serde(deserialize_with = "wire_vec2::deserialize")]
    pub position: Vec2,
    #[serde(default, deserialize_with = "wire_vec2::deserialize")]
    pub velocity: Vec2,
    #[serde(default, deserialize_with = "wire_vec2::deserialize")]
    pub acceleration: Vec2,
    /// Heading in radians
    #[serde(default)]
    pub orientation: f32,
}

/// Authoritative state of one projectile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulletState {
    #[serde(deserialize_with = "wire_vec2::deserialize")]
    pub position: Vec2,
    #[serde(default, deserialize_with = "wire_vec2::deserialize")]
    pub velocity: Vec2,
}

/// One authoritative update of every tracked entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    #[serde(default)]
    pub tick: u64,
    #[serde(default)]
    pub players: HashMap<PlayerKey, AgentState>,
    /// Bullet groups keyed by owner; each group replaces the previous one
    #[serde(default)]
    pub bullets: HashMap<PlayerKey, Vec<BulletState>>,
}

impl WorldSnapshot {
    pub fn bullet_count(&self) -> usize {
        self.bullets.values().map(Vec::len).sum()
    }
}

/// Messages from client to transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClientMessage {
    /// Keys currently held, re-sent on every press/release transition
    InputIntent { held: Vec<Key> },
}

mod wire_vec2 {
    use serde::{Deserialize, Deserializer};

    use crate::util::vec2::Vec2;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum WireVec2 {
        Object { x: f32, y: f32 },
        Pair([f32; 2]),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec2, D::Error> {
        Ok(match WireVec2::deserialize(deserializer)? {
            WireVec2::Object { x, y } => Vec2::new(x, y),
            WireVec2::Pair([x, y]) => Vec2::new(x, y),
        })
    }
}

/// Decode a JSON snapshot
pub fn decode_snapshot(json: &str) -> Result<WorldSnapshot, DecodeError> {
    serde_json::from_str(json).map_err(|e| DecodeError(e.to_string()))
}

/// Encode a snapshot as JSON (vectors as objects)
pub fn encode_snapshot(snapshot: &WorldSnapshot) -> Result<String, EncodeError> {
    serde_json::to_string(snapshot).map_err(|e| EncodeError(e.to_string()))
}

/// Encode a client message using bincode
/// Uses legacy config for fixed-size integers
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, EncodeError> {
    bincode::serde::encode_to_vec(message, bincode::config::legacy())
        .map_err(|e| EncodeError(e.to_string()))
}

/// Decode a client message using bincode
pub fn decode<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, DecodeError> {
    bincode::serde::decode_from_slice(data, bincode::config::legacy())
        .map(|(msg, _)| msg)
        .map_err(|e| DecodeError(e.to_string()))
}

#[derive(Debug, thiserror::Error)]
#[error("Encode error: {0}")]
pub struct EncodeError(String);

#[derive(Debug, thiserror::Error)]
#[error("Decode error: {0}")]
pub struct DecodeError(String);
