// Merges relay traffic into the local simulation. Remote players exist
// locally as shadow entities: the reconciler creates and removes them as
// the roster changes, overwrites their state from `state` messages, and
// synthesizes their projectiles from `attack` messages. In the other
// direction it decides what the local player publishes each tick.

use std::collections::HashMap;

use engine::entity::EntityId;
use engine::projectile::Projectile;
use engine::sim::{Simulation, StepEvents};
use protocol::Message;
use tracing::debug;

/// Seconds of accrued time between `state` publishes.
const STATE_INTERVAL: f32 = 0.1;

pub struct Reconciler {
    local: EntityId,
    session_id: Option<String>,
    /// Remote session id -> shadow entity.
    shadows: HashMap<String, EntityId>,
    publish_timer: f32,
}

impl Reconciler {
    pub fn new(local: EntityId) -> Self {
        Self {
            local,
            session_id: None,
            shadows: HashMap::new(),
            publish_timer: 0.0,
        }
    }

    /// Session id the relay assigned us, once `welcome` has arrived.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn shadow_count(&self) -> usize {
        self.shadows.len()
    }

    /// Applies one inbound message to the simulation. Unknown and
    /// lobby-screen messages are ignored here.
    pub fn apply(&mut self, sim: &mut Simulation, msg: Message) {
        match msg {
            Message::Welcome { id, players, .. } => {
                self.session_id = Some(id);
                for p in &players {
                    self.spawn_shadow(sim, &p.id, &p.name, &p.ch);
                }
                // Everyone, the local player included, moves to their
                // deterministic slot so all clients agree on the layout.
                self.layout_all(sim);
            }
            Message::PlayerJoined { id, name, ch } => {
                self.spawn_shadow(sim, &id, &name, &ch);
                self.place_at_slot(sim, &id);
            }
            Message::PlayerLeft { id } => {
                if let Some(entity) = self.shadows.remove(&id) {
                    sim.remove_entity(entity);
                    debug!(session = %id, "shadow removed");
                }
            }
            Message::State {
                id: Some(id),
                x,
                y,
                hp,
            } => {
                if let Some(e) = self.shadow_mut(sim, &id) {
                    e.x = x;
                    e.y = y;
                    e.hp = hp as f32;
                    e.is_alive = hp > 0;
                }
            }
            Message::Attack {
                id: Some(id),
                x,
                y,
                dir,
            } => {
                let t = sim.player_tuning;
                let pt = sim.projectile_tuning;
                if let Some(&owner) = self.shadows.get(&id) {
                    sim.projectiles.push(Projectile::new(
                        x + dir as f32 * 1.1,
                        y - 0.5,
                        t.attack_speed * dir as f32,
                        0.0,
                        "🔸",
                        owner,
                        t.attack_damage,
                        false,
                        &pt,
                    ));
                }
            }
            Message::Respawn { id: Some(id), x, y } => {
                let invuln = sim.player_tuning.respawn_invulnerability;
                if let Some(e) = self.shadow_mut(sim, &id) {
                    e.respawn(x, y, invuln);
                }
            }
            // Lobby traffic is handled by the menu layer; relayed messages
            // without a stamped sender cannot be routed.
            _ => {}
        }
    }

    /// Messages the local player owes the relay after one step: attacks
    /// and respawns immediately, position on a fixed cadence.
    pub fn outbound(&mut self, sim: &Simulation, events: &StepEvents, dt: f32) -> Vec<Message> {
        let mut out = Vec::new();
        for a in events.attacks.iter().filter(|a| a.entity == self.local) {
            out.push(Message::Attack {
                id: None,
                x: a.x,
                y: a.y,
                dir: a.dir,
            });
        }
        for r in events.respawns.iter().filter(|r| r.entity == self.local) {
            out.push(Message::Respawn {
                id: None,
                x: r.x,
                y: r.y,
            });
        }

        self.publish_timer += dt;
        if self.publish_timer >= STATE_INTERVAL {
            self.publish_timer = 0.0;
            if let Some(e) = sim.entity(self.local) {
                out.push(Message::State {
                    id: None,
                    x: e.x,
                    y: e.y,
                    hp: e.hp.round() as i32,
                });
            }
        }
        out
    }

    fn spawn_shadow(&mut self, sim: &mut Simulation, id: &str, name: &str, ch: &str) {
        if self.shadows.contains_key(id) {
            return;
        }
        let (x, y) = (sim.stage.max_x / 2.0, sim.stage.ground_row - 1.0);
        let entity = sim.spawn_shadow(x, y, ch, name);
        self.shadows.insert(id.to_string(), entity);
        debug!(session = %id, name, "shadow spawned");
    }

    fn shadow_mut<'a>(
        &self,
        sim: &'a mut Simulation,
        id: &str,
    ) -> Option<&'a mut engine::Entity> {
        self.shadows.get(id).and_then(|&e| sim.entity_mut(e))
    }

    /// Roster as (session id, entity) pairs sorted by session id, the same
    /// order every peer computes.
    fn roster(&self) -> Vec<(String, EntityId)> {
        let mut roster: Vec<(String, EntityId)> = self
            .shadows
            .iter()
            .map(|(id, &e)| (id.clone(), e))
            .collect();
        if let Some(own) = &self.session_id {
            roster.push((own.clone(), self.local));
        }
        roster.sort_by(|a, b| a.0.cmp(&b.0));
        roster
    }

    fn layout_all(&self, sim: &mut Simulation) {
        let roster = self.roster();
        let count = roster.len();
        for (i, (_, entity)) in roster.into_iter().enumerate() {
            let (x, y) = sim.stage.spawn_slot(i, count);
            if let Some(e) = sim.entity_mut(entity) {
                e.x = x;
                e.y = y;
                e.vx = 0.0;
                e.vy = 0.0;
            }
        }
    }

    /// Places one newcomer at its slot in the extended roster; everyone
    /// already in the arena keeps their live position.
    fn place_at_slot(&self, sim: &mut Simulation, id: &str) {
        let roster = self.roster();
        let count = roster.len();
        let Some(index) = roster.iter().position(|(sid, _)| sid == id) else {
            return;
        };
        let (x, y) = sim.stage.spawn_slot(index, count);
        if let Some(e) = self.shadow_mut(sim, id) {
            e.x = x;
            e.y = y;
        }
    }
}
