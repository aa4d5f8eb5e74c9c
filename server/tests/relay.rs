// End-to-end relay behavior over real sockets: rooms, lobby state machine,
// relay scoping, and disconnect handling. Every test uses its own room so
// the shared server instance keeps tests independent.

mod support;

use std::time::Duration;

use protocol::{GamePhase, Message};
use support::TestClient;

#[test]
fn join_receives_welcome_then_roster_updates() {
    let mut a = TestClient::connect();
    let a_id = a.join("it-join", "A");
    assert_eq!(a_id.len(), 8);

    let mut b = TestClient::connect();
    let b_id = b.join("it-join", "B");
    assert_ne!(a_id, b_id);

    // A learns about B both ways: the join event and the lobby snapshot.
    let joined = a.recv_until(|m| matches!(m, Message::PlayerJoined { .. }));
    assert!(matches!(joined, Message::PlayerJoined { id, .. } if id == b_id));
    let lobby = a.recv_until(|m| matches!(m, Message::LobbyState { .. }));
    match lobby {
        Message::LobbyState {
            players,
            game_state,
            ..
        } => {
            assert_eq!(players.len(), 2);
            assert_eq!(game_state, GamePhase::Lobby);
        }
        _ => unreachable!(),
    }
}

#[test]
fn state_is_relayed_to_room_peers_and_nowhere_else() {
    let mut a = TestClient::connect();
    let mut b = TestClient::connect();
    let mut outsider = TestClient::connect();
    let a_id = a.join("it-relay", "A");
    b.join("it-relay", "B");
    outsider.join("it-relay-other", "C");

    a.send(&Message::State {
        id: None,
        x: 12.5,
        y: 17.5,
        hp: 90,
    });

    let state = b.recv_until(|m| matches!(m, Message::State { .. }));
    match state {
        Message::State { id, x, hp, .. } => {
            assert_eq!(id.as_deref(), Some(a_id.as_str()));
            assert_eq!(x, 12.5);
            assert_eq!(hp, 90);
        }
        _ => unreachable!(),
    }

    assert!(
        outsider.silent_for(Duration::from_millis(300)),
        "state leaked into another room"
    );
}

#[test]
fn attack_and_respawn_are_relayed_verbatim() {
    let mut a = TestClient::connect();
    let mut b = TestClient::connect();
    let a_id = a.join("it-combat", "A");
    b.join("it-combat", "B");

    a.send(&Message::Attack {
        id: None,
        x: 10.0,
        y: 17.0,
        dir: -1,
    });
    let attack = b.recv_until(|m| matches!(m, Message::Attack { .. }));
    assert!(matches!(
        attack,
        Message::Attack { id: Some(id), dir: -1, .. } if id == a_id
    ));

    a.send(&Message::Respawn {
        id: None,
        x: 40.0,
        y: 17.0,
    });
    let respawn = b.recv_until(|m| matches!(m, Message::Respawn { .. }));
    assert!(matches!(
        respawn,
        Message::Respawn { id: Some(id), x, .. } if id == a_id && x == 40.0
    ));
}

#[test]
fn two_ready_members_count_down_to_a_single_game_start() {
    let mut a = TestClient::connect();
    let mut b = TestClient::connect();
    a.join("it-lobby", "A");
    b.join("it-lobby", "B");

    a.send(&Message::Ready { ready: true });
    let lobby = a.recv_until(|m| {
        matches!(m, Message::LobbyState { players, .. } if players.iter().any(|p| p.ready))
    });
    assert!(matches!(lobby, Message::LobbyState { game_state: GamePhase::Lobby, .. }));

    b.send(&Message::Ready { ready: true });
    let countdown = a.recv_until(|m| {
        matches!(m, Message::LobbyState { game_state: GamePhase::Countdown, .. })
    });
    assert!(matches!(
        countdown,
        Message::LobbyState { countdown, .. } if countdown == 5.0
    ));

    // The countdown runs at one-second resolution for five seconds.
    a.recv_until(|m| matches!(m, Message::GameStart));
    b.recv_until(|m| matches!(m, Message::GameStart));

    // Exactly once: nothing further arrives after game_start.
    assert!(a.silent_for(Duration::from_millis(500)));
}

#[test]
fn disconnect_is_an_implicit_leave() {
    let mut a = TestClient::connect();
    let mut b = TestClient::connect();
    let a_id = a.join("it-drop", "A");
    b.join("it-drop", "B");
    drop(a);

    let left = b.recv_until(|m| matches!(m, Message::PlayerLeft { .. }));
    assert!(matches!(left, Message::PlayerLeft { id } if id == a_id));
}

#[test]
fn malformed_and_unknown_records_are_ignored() {
    let mut a = TestClient::connect();
    let mut b = TestClient::connect();
    let a_id = a.join("it-garbage", "A");
    b.join("it-garbage", "B");

    // Raw garbage, then an unknown type, then a valid relay: the
    // connection must survive the first two.
    a.send_raw(b"{this is not json\n");
    a.send_raw(b"{\"type\":\"dance\"}\n");

    a.send(&Message::State {
        id: None,
        x: 1.0,
        y: 2.0,
        hp: 100,
    });
    let state = b.recv_until(|m| matches!(m, Message::State { .. }));
    assert!(matches!(state, Message::State { id: Some(id), .. } if id == a_id));
}
