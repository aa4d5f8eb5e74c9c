// Two full sessions against a real relay: roster propagation, shadow
// state merging, and attack relay, driven through the public tick loop.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use client::{NetSession, SessionConfig};
use engine::entity::Control;
use engine::input::InputState;
use engine::stage::Stage;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

static SERVER_PORT: OnceLock<u16> = OnceLock::new();

fn ensure_server() -> u16 {
    *SERVER_PORT.get_or_init(|| {
        let published = Arc::new(OnceLock::<u16>::new());
        let published_thread = Arc::clone(&published);
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let port = listener.local_addr().expect("get local addr").port();
                let _ = published_thread.set(port);
                server::run(listener).await.expect("server failed");
            });
        });
        loop {
            if let Some(port) = published.get() {
                break *port;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    })
}

fn connect(room: &str, name: &str) -> NetSession {
    let port = ensure_server();
    let config = SessionConfig::new("127.0.0.1", &port.to_string(), room, name, "ninja");
    NetSession::connect(&config, Stage::new(80.0, 24.0)).expect("connect session")
}

const DT: f32 = 1.0 / 30.0;

/// Ticks both sessions with the given inputs until `done` holds, failing
/// after a generous real-time budget.
fn tick_until(
    a: &mut NetSession,
    b: &mut NetSession,
    input_a: InputState,
    done: impl Fn(&NetSession, &NetSession) -> bool,
) {
    let mut rng_a = ChaCha8Rng::seed_from_u64(1);
    let mut rng_b = ChaCha8Rng::seed_from_u64(2);
    for _ in 0..300 {
        a.tick(input_a, DT, &mut rng_a);
        b.tick(InputState::default(), DT, &mut rng_b);
        if done(a, b) {
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    panic!("condition never reached");
}

#[test]
fn peers_see_each_other_as_shadows_at_agreed_positions() {
    let mut a = connect("e2e-roster", "A");
    let mut b = connect("e2e-roster", "B");

    tick_until(&mut a, &mut b, InputState::default(), |a, b| {
        a.sim.entities.len() == 2 && b.sim.entities.len() == 2
    });
    assert!(a.session_id().is_some());
    assert_ne!(a.session_id(), b.session_id());

    // B is idle, so once a state publish lands A's shadow of B sits
    // exactly where B's own entity does.
    let b_local_id = b.local_id();
    tick_until(&mut a, &mut b, InputState::default(), |a, b| {
        let b_local = b.sim.entity(b_local_id).expect("local entity");
        a.sim
            .entities
            .iter()
            .any(|e| e.control == Control::Remote && (e.x - b_local.x).abs() < 0.01)
    });
}

#[test]
fn remote_attack_appears_as_a_shadow_owned_projectile() {
    let mut a = connect("e2e-attack", "A");
    let mut b = connect("e2e-attack", "B");
    tick_until(&mut a, &mut b, InputState::default(), |a, b| {
        a.sim.entities.len() == 2 && b.sim.entities.len() == 2
    });

    let attack = InputState {
        attack: true,
        ..InputState::default()
    };
    tick_until(&mut a, &mut b, attack, |_, b| {
        b.sim.projectiles.iter().any(|p| {
            b.sim
                .entity(p.owner)
                .is_some_and(|e| e.control == Control::Remote)
        })
    });
}

#[test]
fn leaving_peer_disappears_from_the_roster() {
    let mut a = connect("e2e-leave", "A");
    let mut b = connect("e2e-leave", "B");
    tick_until(&mut a, &mut b, InputState::default(), |a, b| {
        a.sim.entities.len() == 2 && b.sim.entities.len() == 2
    });

    b.leave();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    for _ in 0..300 {
        a.tick(InputState::default(), DT, &mut rng);
        if a.sim.entities.len() == 1 {
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    panic!("shadow for the departed peer was never removed");
}
