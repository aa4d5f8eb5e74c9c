// Line-delimited JSON records exchanged between clients and the relay.
// Every record carries a `type` discriminator; the server forwards the
// gameplay messages (`state`, `attack`, `respawn`) without interpreting them.

use serde::{Deserialize, Serialize};

/// Roster entry shared in `welcome` and `lobby_state` payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: String,
    pub name: String,
    pub ch: String,
    #[serde(default)]
    pub ready: bool,
}

/// Lobby lifecycle for a room. There is no way back to `Lobby`; a room
/// that empties is destroyed and a rejoin creates a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Lobby,
    Countdown,
    Playing,
}

/// Every message on the wire, tagged by `type`.
///
/// Relayed gameplay messages carry an optional `id`; the server stamps the
/// sender's session id into it before forwarding so receivers can route the
/// update to the right remote entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// Client -> server: enter a room (created on first join).
    Join { room: String, name: String, ch: String },
    /// Server -> joiner: assigned session id plus the existing roster.
    Welcome {
        id: String,
        room: String,
        players: Vec<PlayerInfo>,
    },
    /// Server -> room: a new member arrived.
    PlayerJoined { id: String, name: String, ch: String },
    /// Server -> room: a member left or disconnected.
    PlayerLeft { id: String },
    /// Client -> server: toggle the ready flag.
    Ready { ready: bool },
    /// Server -> room: full lobby snapshot, rebroadcast on every change.
    LobbyState {
        players: Vec<PlayerInfo>,
        game_state: GamePhase,
        countdown: f32,
    },
    /// Server -> room: the countdown expired, the match begins.
    GameStart,
    /// Relayed: position/health of the sender's own entity.
    State {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        x: f32,
        y: f32,
        hp: i32,
    },
    /// Relayed: the sender fired a basic attack.
    Attack {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        x: f32,
        y: f32,
        dir: i32,
    },
    /// Relayed: the sender respawned at the given position.
    Respawn {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        x: f32,
        y: f32,
    },
    /// Client -> server: leave the current room.
    Leave,
    /// Forward compatibility: unknown `type` tags decode here and are ignored.
    #[serde(other)]
    Unknown,
}

impl Message {
    /// Session id attached to a relayed gameplay message, if any.
    pub fn sender_id(&self) -> Option<&str> {
        match self {
            Message::State { id, .. }
            | Message::Attack { id, .. }
            | Message::Respawn { id, .. } => id.as_deref(),
            _ => None,
        }
    }

    /// Stamps `session_id` into a relayed message that lacks one.
    pub fn with_sender_id(mut self, session_id: &str) -> Self {
        match &mut self {
            Message::State { id, .. }
            | Message::Attack { id, .. }
            | Message::Respawn { id, .. } => {
                if id.is_none() {
                    *id = Some(session_id.to_string());
                }
            }
            _ => {}
        }
        self
    }
}
