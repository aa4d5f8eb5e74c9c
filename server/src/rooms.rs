// Room registry: the one shared structure on the server. All membership,
// ready-flag, and lobby-phase mutations go through this service object
// while holding its single lock; connection handlers keep no state beyond
// their own session identity.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use protocol::{encode_line, GamePhase, Message, PlayerInfo};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

pub type SessionId = String;

/// How long the lobby counts down before the match starts.
const COUNTDOWN_SECS: f32 = 5.0;
/// Minimum members before a room can start.
const MIN_PLAYERS: usize = 2;

/// One connected session inside a room. `tx` feeds the connection's writer
/// task, so broadcasts never write to sockets while the registry lock is
/// held.
struct Member {
    name: String,
    ch: String,
    ready: bool,
    tx: UnboundedSender<String>,
}

struct Room {
    members: HashMap<SessionId, Member>,
    phase: GamePhase,
    countdown: f32,
}

impl Room {
    fn new() -> Self {
        Self {
            members: HashMap::new(),
            phase: GamePhase::Lobby,
            countdown: 0.0,
        }
    }

    fn roster(&self) -> Vec<PlayerInfo> {
        let mut players: Vec<PlayerInfo> = self
            .members
            .iter()
            .map(|(id, m)| PlayerInfo {
                id: id.clone(),
                name: m.name.clone(),
                ch: m.ch.clone(),
                ready: m.ready,
            })
            .collect();
        // Stable order so every client renders the same roster.
        players.sort_by(|a, b| a.id.cmp(&b.id));
        players
    }

    fn lobby_state(&self) -> Message {
        Message::LobbyState {
            players: self.roster(),
            game_state: self.phase,
            countdown: self.countdown,
        }
    }
}

type Delivery = (UnboundedSender<String>, String);

fn deliver(sends: Vec<Delivery>) {
    for (tx, line) in sends {
        // A dropped receiver means the connection is unwinding; its own
        // leave path cleans up the membership.
        let _ = tx.send(line);
    }
}

pub struct RoomRegistry {
    rooms: Mutex<HashMap<String, Room>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a session in a room (creating the room if absent) and
    /// returns the fresh session id. The joiner receives `welcome`, the
    /// rest of the room `player_joined`, everyone the new `lobby_state`.
    pub fn join(
        &self,
        room_id: &str,
        name: &str,
        ch: &str,
        tx: UnboundedSender<String>,
    ) -> SessionId {
        let session_id = fresh_session_id();
        let mut sends: Vec<Delivery> = Vec::new();
        {
            let mut rooms = self.rooms.lock().unwrap_or_else(|e| e.into_inner());
            let room = rooms.entry(room_id.to_string()).or_insert_with(Room::new);

            let existing = room.roster();
            sends.push((
                tx.clone(),
                encode_line(&Message::Welcome {
                    id: session_id.clone(),
                    room: room_id.to_string(),
                    players: existing,
                }),
            ));

            let joined = encode_line(&Message::PlayerJoined {
                id: session_id.clone(),
                name: name.to_string(),
                ch: ch.to_string(),
            });
            for member in room.members.values() {
                sends.push((member.tx.clone(), joined.clone()));
            }

            room.members.insert(
                session_id.clone(),
                Member {
                    name: name.to_string(),
                    ch: ch.to_string(),
                    ready: false,
                    tx,
                },
            );

            let lobby = encode_line(&room.lobby_state());
            for member in room.members.values() {
                sends.push((member.tx.clone(), lobby.clone()));
            }
        }
        deliver(sends);
        info!(room = room_id, session_id, name, "session joined");
        session_id
    }

    /// Updates a ready flag, rebroadcasts the lobby, and starts the
    /// countdown once every member of a full-enough room is ready.
    pub fn set_ready(self: &Arc<Self>, room_id: &str, session_id: &str, ready: bool) {
        let mut sends: Vec<Delivery> = Vec::new();
        let mut start_countdown = false;
        {
            let mut rooms = self.rooms.lock().unwrap_or_else(|e| e.into_inner());
            let Some(room) = rooms.get_mut(room_id) else {
                return;
            };
            let Some(member) = room.members.get_mut(session_id) else {
                return;
            };
            member.ready = ready;

            if room.phase == GamePhase::Lobby
                && room.members.len() >= MIN_PLAYERS
                && room.members.values().all(|m| m.ready)
            {
                room.phase = GamePhase::Countdown;
                room.countdown = COUNTDOWN_SECS;
                start_countdown = true;
            }

            let lobby = encode_line(&room.lobby_state());
            for member in room.members.values() {
                sends.push((member.tx.clone(), lobby.clone()));
            }
        }
        deliver(sends);
        if start_countdown {
            info!(room = room_id, "all ready, starting countdown");
            Arc::clone(self).spawn_countdown(room_id.to_string());
        }
    }

    /// Forwards a gameplay message to every other member of the room,
    /// stamping the sender's session id if the payload lacks one. The
    /// payload itself is not interpreted.
    pub fn relay(&self, room_id: &str, session_id: &str, msg: Message) {
        let line = encode_line(&msg.with_sender_id(session_id));
        let mut sends: Vec<Delivery> = Vec::new();
        {
            let rooms = self.rooms.lock().unwrap_or_else(|e| e.into_inner());
            let Some(room) = rooms.get(room_id) else {
                return;
            };
            for (id, member) in &room.members {
                if id != session_id {
                    sends.push((member.tx.clone(), line.clone()));
                }
            }
        }
        deliver(sends);
    }

    /// Removes a session; the room is destroyed once its last member is
    /// gone. Used for both explicit `leave` and connection loss.
    pub fn leave(&self, room_id: &str, session_id: &str) {
        let mut sends: Vec<Delivery> = Vec::new();
        {
            let mut rooms = self.rooms.lock().unwrap_or_else(|e| e.into_inner());
            let Some(room) = rooms.get_mut(room_id) else {
                return;
            };
            if room.members.remove(session_id).is_none() {
                return;
            }
            if room.members.is_empty() {
                rooms.remove(room_id);
                debug!(room = room_id, "room destroyed");
            } else {
                let left = encode_line(&Message::PlayerLeft {
                    id: session_id.to_string(),
                });
                for member in room.members.values() {
                    sends.push((member.tx.clone(), left.clone()));
                }
            }
        }
        deliver(sends);
        info!(room = room_id, session_id, "session left");
    }

    /// One-second-resolution countdown. Aborts silently if the room's
    /// phase moves away from `Countdown` (e.g. the room emptied); emits
    /// `game_start` exactly once on expiry.
    fn spawn_countdown(self: Arc<Self>, room_id: String) {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                let mut sends: Vec<Delivery> = Vec::new();
                let finished = {
                    let mut rooms = self.rooms.lock().unwrap_or_else(|e| e.into_inner());
                    let Some(room) = rooms.get_mut(&room_id) else {
                        return;
                    };
                    if room.phase != GamePhase::Countdown {
                        return;
                    }
                    room.countdown -= 1.0;
                    if room.countdown <= 0.0 {
                        room.countdown = 0.0;
                        room.phase = GamePhase::Playing;
                        let start = encode_line(&Message::GameStart);
                        for member in room.members.values() {
                            sends.push((member.tx.clone(), start.clone()));
                        }
                        true
                    } else {
                        let lobby = encode_line(&room.lobby_state());
                        for member in room.members.values() {
                            sends.push((member.tx.clone(), lobby.clone()));
                        }
                        false
                    }
                };
                deliver(sends);
                if finished {
                    info!(room = %room_id, "countdown finished, game started");
                    return;
                }
            }
        });
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Short opaque session id, unique per process lifetime for all practical
/// purposes.
fn fresh_session_id() -> SessionId {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::decode_line;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    fn drain(rx: &mut UnboundedReceiver<String>) -> Vec<Message> {
        let mut out = Vec::new();
        while let Ok(line) = rx.try_recv() {
            out.push(decode_line(&line).unwrap());
        }
        out
    }

    #[tokio::test]
    async fn join_sends_welcome_with_existing_roster() {
        let registry = Arc::new(RoomRegistry::new());
        let (tx_a, mut rx_a) = unbounded_channel();
        let (tx_b, mut rx_b) = unbounded_channel();

        let a = registry.join("arena", "A", "😎", tx_a);
        let b = registry.join("arena", "B", "🤖", tx_b);

        let a_msgs = drain(&mut rx_a);
        match &a_msgs[0] {
            Message::Welcome { id, room, players } => {
                assert_eq!(id, &a);
                assert_eq!(room, "arena");
                assert!(players.is_empty());
            }
            other => panic!("expected welcome, got {other:?}"),
        }
        assert!(a_msgs
            .iter()
            .any(|m| matches!(m, Message::PlayerJoined { id, .. } if id == &b)));

        let b_msgs = drain(&mut rx_b);
        match &b_msgs[0] {
            Message::Welcome { players, .. } => {
                assert_eq!(players.len(), 1);
                assert_eq!(players[0].id, a);
                assert_eq!(players[0].name, "A");
            }
            other => panic!("expected welcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn relay_reaches_room_peers_only_with_sender_stamped() {
        let registry = Arc::new(RoomRegistry::new());
        let (tx_a, _rx_a) = unbounded_channel();
        let (tx_b, mut rx_b) = unbounded_channel();
        let (tx_c, mut rx_c) = unbounded_channel();

        let a = registry.join("arena", "A", "😎", tx_a);
        let _b = registry.join("arena", "B", "🤖", tx_b);
        let _c = registry.join("other", "C", "👻", tx_c);
        drain(&mut rx_b);
        drain(&mut rx_c);

        registry.relay(
            "arena",
            &a,
            Message::State {
                id: None,
                x: 1.0,
                y: 2.0,
                hp: 95,
            },
        );

        let b_msgs = drain(&mut rx_b);
        assert!(b_msgs
            .iter()
            .any(|m| matches!(m, Message::State { id: Some(id), hp: 95, .. } if id == &a)));
        assert!(drain(&mut rx_c).is_empty(), "relay leaked across rooms");
    }

    #[tokio::test(start_paused = true)]
    async fn two_ready_players_reach_playing_after_five_seconds() {
        let registry = Arc::new(RoomRegistry::new());
        let (tx_a, mut rx_a) = unbounded_channel();
        let (tx_b, mut rx_b) = unbounded_channel();

        let a = registry.join("arena", "A", "😎", tx_a);
        let b = registry.join("arena", "B", "🤖", tx_b);
        registry.set_ready("arena", &a, true);
        drain(&mut rx_a);
        registry.set_ready("arena", &b, true);

        let msgs = drain(&mut rx_a);
        assert!(
            msgs.iter().any(|m| matches!(
                m,
                Message::LobbyState { game_state: GamePhase::Countdown, countdown, .. }
                    if *countdown == 5.0
            )),
            "countdown should begin at 5 seconds"
        );

        // Virtual time: the 1s countdown sleeps auto-advance.
        tokio::time::sleep(Duration::from_secs(6)).await;

        let starts = drain(&mut rx_a)
            .into_iter()
            .chain(drain(&mut rx_b))
            .filter(|m| matches!(m, Message::GameStart))
            .count();
        assert_eq!(starts, 2, "each member sees game_start exactly once");
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_aborts_when_room_empties() {
        let registry = Arc::new(RoomRegistry::new());
        let (tx_a, mut rx_a) = unbounded_channel();
        let (tx_b, _rx_b) = unbounded_channel();

        let a = registry.join("arena", "A", "😎", tx_a);
        let b = registry.join("arena", "B", "🤖", tx_b);
        registry.set_ready("arena", &a, true);
        registry.set_ready("arena", &b, true);

        registry.leave("arena", &a);
        registry.leave("arena", &b);
        drain(&mut rx_a);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(drain(&mut rx_a)
            .iter()
            .all(|m| !matches!(m, Message::GameStart)));

        // The room was destroyed; a rejoin starts over in the lobby phase.
        let (tx_c, mut rx_c) = unbounded_channel();
        registry.join("arena", "C", "👾", tx_c);
        let msgs = drain(&mut rx_c);
        assert!(msgs.iter().any(|m| matches!(
            m,
            Message::LobbyState { game_state: GamePhase::Lobby, .. }
        )));
    }

    #[tokio::test]
    async fn ready_below_min_players_does_not_start() {
        let registry = Arc::new(RoomRegistry::new());
        let (tx_a, mut rx_a) = unbounded_channel();
        let a = registry.join("arena", "A", "😎", tx_a);
        registry.set_ready("arena", &a, true);
        let msgs = drain(&mut rx_a);
        assert!(msgs.iter().all(|m| !matches!(
            m,
            Message::LobbyState { game_state: GamePhase::Countdown, .. }
        )));
    }
}
