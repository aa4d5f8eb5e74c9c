// Ties the simulation, the connection, and the reconciler into one
// networked session. The caller owns the tick loop and rendering; each
// `tick` drains inbound traffic, steps the world, and publishes outbound.

use std::io;
use std::time::Duration;

use engine::character;
use engine::entity::{Entity, EntityId};
use engine::input::InputState;
use engine::sim::{Simulation, StepOptions};
use engine::stage::Stage;
use rand::Rng;
use tracing::info;

use crate::config::SessionConfig;
use crate::net::NetClient;
use crate::reconciler::Reconciler;

/// Hit inclusion for networked play: each client resolves only the hits
/// that cross the local/remote boundary in the direction it initiated, so
/// no hit is resolved twice across the room.
pub fn locality_filter(owner: &Entity, target: &Entity) -> bool {
    owner.is_remote() != target.is_remote()
}

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct NetSession {
    pub sim: Simulation,
    pub net: NetClient,
    reconciler: Reconciler,
    local: EntityId,
}

impl NetSession {
    /// Connects to the relay, spawns the local player, and sends `join`.
    /// The roster and final spawn positions arrive with `welcome`.
    pub fn connect(config: &SessionConfig, stage: Stage) -> io::Result<Self> {
        let mut net = NetClient::connect(&config.host, config.port, CONNECT_TIMEOUT)?;
        let mut sim = Simulation::new(stage);
        let stats = character::stats_for(&config.ch);
        let glyph = character::get(&config.ch)
            .map(|c| c.glyph)
            .unwrap_or(config.ch.as_str());
        let local = sim.spawn_player(
            stage.max_x / 2.0,
            stage.ground_row - 1.0,
            glyph,
            &config.name,
            stats,
        );
        net.join(&config.room, &config.name, glyph);
        info!(room = %config.room, name = %config.name, "joining room");
        Ok(Self {
            sim,
            net,
            reconciler: Reconciler::new(local),
            local,
        })
    }

    pub fn local_id(&self) -> EntityId {
        self.local
    }

    pub fn session_id(&self) -> Option<&str> {
        self.reconciler.session_id()
    }

    pub fn mark_ready(&mut self, ready: bool) {
        self.net.ready(ready);
    }

    /// One fixed-timestep tick: merge the inbox, step the world with the
    /// locality hit filter, publish what the step produced.
    pub fn tick<R: Rng>(&mut self, input: InputState, dt: f32, rng: &mut R) {
        for msg in self.net.drain() {
            self.reconciler.apply(&mut self.sim, msg);
        }

        let opts = StepOptions::networked(&locality_filter);
        let events = self.sim.step(dt, &[(self.local, input)], &opts, rng);

        for msg in self.reconciler.outbound(&self.sim, &events, dt) {
            self.net.send(&msg);
        }
    }

    /// Leaves the room; the connection closes when the session drops.
    pub fn leave(&mut self) {
        self.net.leave();
    }
}
