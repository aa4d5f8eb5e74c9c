use rand::Rng;
use tracing::debug;

use crate::ai::{AiController, AI_GLYPHS, AI_NAMES};
use crate::character::CharacterStats;
use crate::entity::{Control, Entity, EntityId};
use crate::input::InputState;
use crate::particle::{explosion_burst, Particle};
use crate::powerup::{PowerUp, PowerUpKind};
use crate::projectile::Projectile;
use crate::stage::Stage;
use crate::tuning::{PlayerTuning, ProjectileTuning};

/// HUD announcement with a time to live in seconds.
#[derive(Debug, Clone)]
pub struct Notice {
    pub ttl: f32,
    pub text: String,
    pub color: u8,
}

impl Notice {
    pub fn new(ttl: f32, text: String, color: u8) -> Self {
        Self { ttl, text, color }
    }
}

/// Combo callout anchored to a world position.
#[derive(Debug, Clone)]
pub struct ComboNotice {
    pub ttl: f32,
    pub text: String,
    pub x: f32,
    pub y: f32,
}

/// Whether the step runs the full local game or cooperates with a relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimMode {
    /// Single machine: AI decisions run and power-ups spawn.
    Local,
    /// Relayed multiplayer: AI and power-up spawning are suppressed,
    /// remote shadows are merged in from the network before the step.
    Networked,
}

/// Per-step configuration.
pub struct StepOptions<'a> {
    pub mode: SimMode,
    /// Inclusion predicate for projectile hits: `(owner, target)` pairs
    /// returning false are skipped. Networked sessions use this so each
    /// side only resolves the hits it initiated.
    pub hit_filter: Option<&'a dyn Fn(&Entity, &Entity) -> bool>,
}

impl StepOptions<'_> {
    pub fn local() -> Self {
        StepOptions {
            mode: SimMode::Local,
            hit_filter: None,
        }
    }
}

impl<'a> StepOptions<'a> {
    pub fn networked(filter: &'a dyn Fn(&Entity, &Entity) -> bool) -> StepOptions<'a> {
        StepOptions {
            mode: SimMode::Networked,
            hit_filter: Some(filter),
        }
    }
}

/// Observable outcomes of one step that the network layer publishes.
#[derive(Debug, Default)]
pub struct StepEvents {
    pub attacks: Vec<AttackEvent>,
    pub respawns: Vec<RespawnEvent>,
}

#[derive(Debug, Clone, Copy)]
pub struct AttackEvent {
    pub entity: EntityId,
    pub x: f32,
    pub y: f32,
    pub dir: i32,
}

#[derive(Debug, Clone, Copy)]
pub struct RespawnEvent {
    pub entity: EntityId,
    pub x: f32,
    pub y: f32,
}

/// Seconds of accrued time between power-up drops.
const POWER_UP_SPAWN_INTERVAL: f32 = 8.0;
/// Most pickups present at once.
const MAX_POWER_UPS: usize = 3;

/// The whole mutable world: one entity arena keyed by stable id, plus the
/// transient collections that reference entities by id only.
pub struct Simulation {
    pub stage: Stage,
    pub entities: Vec<Entity>,
    pub projectiles: Vec<Projectile>,
    pub particles: Vec<Particle>,
    pub power_ups: Vec<PowerUp>,
    pub notices: Vec<Notice>,
    pub combo_notices: Vec<ComboNotice>,
    pub ai: AiController,
    pub player_tuning: PlayerTuning,
    pub projectile_tuning: ProjectileTuning,
    power_up_timer: f32,
    next_id: u64,
}

impl Simulation {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            entities: Vec::new(),
            projectiles: Vec::new(),
            particles: Vec::new(),
            power_ups: Vec::new(),
            notices: Vec::new(),
            combo_notices: Vec::new(),
            ai: AiController::default(),
            player_tuning: PlayerTuning::default(),
            projectile_tuning: ProjectileTuning::default(),
            power_up_timer: 0.0,
            next_id: 1,
        }
    }

    fn alloc_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn spawn_player(
        &mut self,
        x: f32,
        y: f32,
        ch: &str,
        name: &str,
        stats: CharacterStats,
    ) -> EntityId {
        let id = self.alloc_id();
        self.entities
            .push(Entity::with_stats(id, x, y, ch, name, Control::Human, stats));
        id
    }

    /// Spawns `count` AI combatants at random positions.
    pub fn spawn_ai<R: Rng>(&mut self, rng: &mut R, count: usize) -> Vec<EntityId> {
        (0..count)
            .map(|_| {
                let (x, y) = self.stage.random_spawn(rng);
                let ch = AI_GLYPHS[rng.gen_range(0..AI_GLYPHS.len())];
                let name = AI_NAMES[rng.gen_range(0..AI_NAMES.len())];
                let id = self.alloc_id();
                self.entities.push(Entity::new(id, x, y, ch, name, Control::Ai));
                id
            })
            .collect()
    }

    /// Spawns a shadow for a remote player; its physics are skipped and its
    /// state is merged in from inbound relay messages.
    pub fn spawn_shadow(&mut self, x: f32, y: f32, ch: &str, name: &str) -> EntityId {
        let id = self.alloc_id();
        self.entities
            .push(Entity::new(id, x, y, ch, name, Control::Remote));
        id
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|e| e.id == id)
    }

    /// Removes an entity and every projectile it still owns.
    pub fn remove_entity(&mut self, id: EntityId) {
        self.entities.retain(|e| e.id != id);
        self.projectiles.retain(|p| p.owner != id);
    }

    pub fn push_notice(&mut self, ttl: f32, text: impl Into<String>, color: u8) {
        self.notices.push(Notice::new(ttl, text.into(), color));
    }

    /// Advances the world by `dt`. Order matters: input, AI, physics,
    /// entity collision, projectile collision, lifecycle, power-ups,
    /// message decay. Respawn countdowns run inside the physics pass.
    pub fn step<R: Rng>(
        &mut self,
        dt: f32,
        inputs: &[(EntityId, InputState)],
        opts: &StepOptions<'_>,
        rng: &mut R,
    ) -> StepEvents {
        let mut events = StepEvents::default();

        for (id, input) in inputs {
            if let Some(idx) = self.index_of(*id) {
                self.apply_input(idx, *input, &mut events);
            }
        }

        if opts.mode == SimMode::Local {
            let ai = std::mem::take(&mut self.ai);
            for idx in 0..self.entities.len() {
                ai.update_one(
                    idx,
                    &mut self.entities,
                    &mut self.projectiles,
                    &mut self.notices,
                    &self.projectile_tuning,
                    rng,
                );
            }
            self.ai = ai;
        }

        self.update_entities(dt, rng, &mut events);
        self.resolve_entity_collisions();
        self.resolve_projectile_hits(opts, rng);

        let stage = self.stage;
        let tuning = self.projectile_tuning;
        self.projectiles
            .retain_mut(|p| !p.update_physics(dt, &stage, &tuning));
        self.particles.retain_mut(|p| !p.update(dt));

        if opts.mode == SimMode::Local {
            self.spawn_power_ups(dt, rng);
        }
        self.collect_power_ups(dt, rng);

        for n in &mut self.notices {
            n.ttl -= dt;
        }
        self.notices.retain(|n| n.ttl > 0.0);
        for c in &mut self.combo_notices {
            c.ttl -= dt;
        }
        self.combo_notices.retain(|c| c.ttl > 0.0);

        events
    }

    fn apply_input(&mut self, idx: usize, input: InputState, events: &mut StepEvents) {
        let t = self.player_tuning;
        let pt = self.projectile_tuning;
        let e = &mut self.entities[idx];
        if !e.is_alive || e.control != Control::Human {
            return;
        }

        let speed = t.run_speed * e.speed_multiplier();
        if input.left {
            e.vx = -speed;
            e.facing_dir = -1;
        } else if input.right {
            e.vx = speed;
            e.facing_dir = 1;
        } else {
            e.vx = 0.0;
        }

        if input.jump && e.on_ground {
            e.vy = t.jump_impulse;
            e.on_ground = false;
        }

        if input.attack && e.cooldown <= 0.0 {
            let dir = e.facing_dir;
            let damage = t.attack_damage * e.damage_multiplier();
            let shot = Projectile::new(
                e.x + dir as f32 * 1.1,
                e.y - 0.5,
                t.attack_speed * dir as f32,
                0.0,
                "🔸",
                e.id,
                damage,
                false,
                &pt,
            );
            e.cooldown = t.attack_cooldown;
            e.combo_count += 1;
            e.combo_timer = t.combo_window;
            events.attacks.push(AttackEvent {
                entity: e.id,
                x: e.x,
                y: e.y,
                dir,
            });
            let callout = (e.combo_count >= t.combo_callout)
                .then(|| (format!("COMBO x{}!", e.combo_count), e.x, e.y - 2.0));
            self.projectiles.push(shot);
            if let Some((text, x, y)) = callout {
                self.combo_notices.push(ComboNotice {
                    ttl: 1.0,
                    text,
                    x,
                    y,
                });
            }
            return self.apply_special(idx, input);
        }

        if input.special {
            self.apply_special(idx, input);
        }
    }

    /// Fan of five shots across -30°..+30° in 15° steps.
    fn apply_special(&mut self, idx: usize, input: InputState) {
        if !input.special {
            return;
        }
        let t = self.player_tuning;
        let pt = self.projectile_tuning;
        let e = &mut self.entities[idx];
        if e.special_cooldown > 0.0 {
            return;
        }
        let damage = t.special_damage * e.damage_multiplier();
        let (x, y, id) = (e.x, e.y - 0.5, e.id);
        e.special_cooldown = t.special_cooldown;
        e.special_effect_timer = 0.5;
        for step in 0..5 {
            let angle = (-30.0 + 15.0 * step as f32).to_radians();
            self.projectiles.push(Projectile::new(
                x,
                y,
                t.attack_speed * angle.cos(),
                t.attack_speed * angle.sin(),
                "⚡",
                id,
                damage,
                true,
                &pt,
            ));
        }
    }

    /// Physics for live entities, respawn countdowns for dead ones.
    /// Remote shadows skip both; only their invulnerability window ticks
    /// locally, since their owner's client drives everything else.
    fn update_entities<R: Rng>(&mut self, dt: f32, rng: &mut R, events: &mut StepEvents) {
        let stage = self.stage;
        let invuln = self.player_tuning.respawn_invulnerability;
        for e in &mut self.entities {
            if e.is_remote() {
                // Shadows skip physics, but their invulnerability window
                // runs on local time; a frozen timer would filter the
                // shadow out of hit resolution forever.
                if e.invulnerable {
                    e.invulnerable_timer -= dt;
                    if e.invulnerable_timer <= 0.0 {
                        e.invulnerable = false;
                    }
                }
                continue;
            }
            if !e.is_alive {
                e.respawn_timer -= dt;
                if e.respawn_timer <= 0.0 {
                    let (x, y) = stage.random_spawn(rng);
                    e.respawn(x, y, invuln);
                    events.respawns.push(RespawnEvent {
                        entity: e.id,
                        x,
                        y,
                    });
                }
                continue;
            }
            e.update_physics(dt, &stage);
        }
    }

    /// Soft pairwise separation: overlapping living entities are pushed
    /// apart 50/50 along the separating axis and their horizontal
    /// velocities meet in the middle. Deliberately not elastic.
    fn resolve_entity_collisions(&mut self) {
        for i in 0..self.entities.len() {
            for j in (i + 1)..self.entities.len() {
                let (head, tail) = self.entities.split_at_mut(j);
                let a = &mut head[i];
                let b = &mut tail[0];
                if !a.is_alive || !b.is_alive {
                    continue;
                }
                let dx = b.x - a.x;
                let dy = b.y - a.y;
                let d = (dx * dx + dy * dy).sqrt();
                // Lower bound guards the degenerate zero-length normal.
                if d < 1.0 && d > 0.001 {
                    let overlap = 1.0 - d;
                    let nx = dx / d;
                    let ny = dy / d;
                    a.x -= nx * overlap * 0.5;
                    a.y -= ny * overlap * 0.5;
                    b.x += nx * overlap * 0.5;
                    b.y += ny * overlap * 0.5;

                    let mid = a.vx * 0.5 + b.vx * 0.5;
                    a.vx = mid;
                    b.vx = mid;
                }
            }
        }
    }

    fn resolve_projectile_hits<R: Rng>(&mut self, opts: &StepOptions<'_>, rng: &mut R) {
        let pt = self.projectile_tuning;
        let combo_window = self.player_tuning.combo_window;
        let respawn_delay = self.player_tuning.respawn_delay;

        let mut pi = 0;
        while pi < self.projectiles.len() {
            let (owner_id, px, py, mut damage) = {
                let p = &self.projectiles[pi];
                (p.owner, p.x, p.y, p.damage)
            };
            let owner_idx = self.index_of(owner_id);

            let mut hit = None;
            for ti in 0..self.entities.len() {
                let target = &self.entities[ti];
                if !target.is_alive || target.invulnerable || target.id == owner_id {
                    continue;
                }
                if let (Some(filter), Some(oi)) = (opts.hit_filter, owner_idx) {
                    if !filter(&self.entities[oi], target) {
                        continue;
                    }
                }
                if (target.x - px).abs() < 1.0 && (target.y - py).abs() < 1.0 {
                    hit = Some(ti);
                    break;
                }
            }

            let Some(ti) = hit else {
                pi += 1;
                continue;
            };

            let owner_x = owner_idx.map(|oi| self.entities[oi].x);
            let owner_name = owner_idx.map(|oi| self.entities[oi].name.clone());

            let (target_pos, lethal) = {
                let target = &mut self.entities[ti];
                if target.has_shield() {
                    damage = (damage / 2.0).floor().max(pt.shield_floor);
                    self.notices.push(Notice::new(
                        1.0,
                        format!("{}'s shield absorbed damage!", target.name),
                        4,
                    ));
                }
                let target = &mut self.entities[ti];
                target.hp -= damage;

                // Knockback away from the shooter; exact overlap falls back
                // to a random direction instead of a zero-length normal.
                let mut nx = owner_x.map(|ox| target.x - ox).unwrap_or(0.0);
                if nx == 0.0 {
                    nx = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                }
                target.vx += pt.knockback * nx.signum();
                target.vy += pt.knockback_lift;

                ((target.x, target.y), target.hp <= 0.0)
            };

            if let Some(oi) = owner_idx {
                let owner = &mut self.entities[oi];
                if owner.combo_timer > 0.0 {
                    owner.combo_count += 1;
                } else {
                    owner.combo_count = 1;
                }
                owner.combo_timer = combo_window;
            }

            let shooter = owner_name.as_deref().unwrap_or("?");
            let victim = self.entities[ti].name.clone();
            self.notices.push(Notice::new(
                1.6,
                format!("{} hit {} for {:.0}!", shooter, victim, damage),
                0,
            ));
            self.particles
                .extend(explosion_burst(rng, target_pos.0, target_pos.1, 3));
            debug!(shooter, victim = %victim, damage, "projectile hit");

            if lethal {
                let target = &mut self.entities[ti];
                if target.is_infinite_mode() {
                    target.hp = 1.0;
                    self.notices.push(Notice::new(
                        2.0,
                        format!("{} is IMMORTAL!", self.entities[ti].name),
                        6,
                    ));
                } else {
                    target.is_alive = false;
                    target.respawn_timer = respawn_delay;
                    target.deaths += 1;
                    let name = target.name.clone();
                    if let Some(oi) = owner_idx {
                        self.entities[oi].kills += 1;
                    }
                    self.notices.push(Notice::new(
                        2.0,
                        format!("{} was defeated! (Respawn in 3s)", name),
                        1,
                    ));
                }
            }

            // First hit consumes the projectile.
            self.projectiles.remove(pi);
        }
    }

    fn spawn_power_ups<R: Rng>(&mut self, dt: f32, rng: &mut R) {
        self.power_up_timer += dt;
        if self.power_up_timer > POWER_UP_SPAWN_INTERVAL && self.power_ups.len() < MAX_POWER_UPS {
            let kind = PowerUpKind::random(rng);
            let (x, y) = self.stage.random_pickup_spot(rng);
            self.power_ups.push(PowerUp::new(x, y, kind));
            self.power_up_timer = 0.0;
        }
    }

    fn collect_power_ups<R: Rng>(&mut self, dt: f32, rng: &mut R) {
        for pu in &mut self.power_ups {
            pu.update(dt);
            if pu.collected {
                continue;
            }
            // First living entity in range wins the pickup.
            let winner = self
                .entities
                .iter_mut()
                .find(|e| e.is_alive && (e.x - pu.x).abs() < 1.0 && (e.y - pu.y).abs() < 1.0);
            if let Some(e) = winner {
                let text = pu.collect(e);
                self.notices.push(Notice::new(1.5, text, pu.kind.color()));
                self.particles.extend(explosion_burst(rng, pu.x, pu.y, 5));
            }
        }
        self.power_ups.retain(|p| !p.collected);
    }
}
