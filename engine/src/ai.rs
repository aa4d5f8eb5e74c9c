use rand::Rng;

use crate::entity::{Control, Entity};
use crate::projectile::Projectile;
use crate::sim::Notice;
use crate::tuning::{AiTuning, ProjectileTuning};

const TAUNTS: &[&str] = &[
    "Take this!",
    "Booyah!",
    "Taste defeat!",
    "Feel my power!",
    "You're finished!",
];

pub const AI_NAMES: &[&str] = &["Shadow", "Thunder", "Void", "Phoenix", "Frost", "Chaos"];

pub const AI_GLYPHS: &[&str] = &[
    "😀", "😈", "👾", "🤖", "🐲", "🦊", "🐼", "🐵", "👻", "🤡", "👹", "👺", "💀", "👽", "🃏",
];

/// Per-tick decision process for AI combatants.
///
/// Every action is an independent Bernoulli trial each tick rather than a
/// timer, so AI pacing is jittery on purpose. The randomness source is
/// injected so tests can run the controller deterministically.
#[derive(Debug, Default)]
pub struct AiController {
    pub tuning: AiTuning,
}

impl AiController {
    /// Runs one tick of decisions for the entity at `idx`, if it is an
    /// AI-controlled, living entity.
    pub fn update_one<R: Rng>(
        &self,
        idx: usize,
        entities: &mut [Entity],
        projectiles: &mut Vec<Projectile>,
        notices: &mut Vec<Notice>,
        projectile_tuning: &ProjectileTuning,
        rng: &mut R,
    ) {
        {
            let e = &entities[idx];
            if e.control != Control::Ai || !e.is_alive {
                return;
            }
        }

        // Candidate targets, nearest first. Collected up front so the
        // mutable borrow of the actor below stays simple.
        let (ex, ey) = (entities[idx].x, entities[idx].y);
        let mut targets: Vec<(f32, f32, f32)> = entities
            .iter()
            .enumerate()
            .filter(|(i, o)| *i != idx && o.is_alive)
            .map(|(_, o)| {
                let d = ((o.x - ex).powi(2) + (o.y - ey).powi(2)).sqrt();
                (o.x, o.y, d)
            })
            .collect();
        if targets.is_empty() {
            return;
        }
        targets.sort_by(|a, b| a.2.total_cmp(&b.2));

        let t = &self.tuning;
        let dx = targets[0].0 - ex;
        let e = &mut entities[idx];

        // Close the horizontal gap, stop when near enough.
        if dx.abs() > t.stop_distance {
            e.vx = t.run_speed * dx.signum() * e.speed_multiplier();
        } else {
            e.vx = 0.0;
        }

        if rng.gen_bool(t.jump_probability) && e.on_ground {
            e.vy = -18.0 - rng.gen::<f32>() * 6.0;
            e.on_ground = false;
        }

        if e.cooldown <= 0.0 && rng.gen_bool(t.attack_probability) {
            let dir: f32 = if dx > 0.0 { 1.0 } else { -1.0 };
            let damage = t.attack_damage * e.damage_multiplier();
            projectiles.push(Projectile::new(
                e.x + dir * 1.1,
                e.y - 0.5,
                t.attack_speed * dir,
                0.0,
                "⚡",
                e.id,
                damage,
                false,
                projectile_tuning,
            ));
            e.cooldown = t.attack_cooldown;

            if rng.gen_bool(t.taunt_probability) {
                let taunt = TAUNTS[rng.gen_range(0..TAUNTS.len())];
                notices.push(Notice::new(1.5, format!("{}: {}", e.name, taunt), 0));
            }
        }

        if e.special_cooldown <= 0.0 && rng.gen_bool(t.special_probability) {
            for &(tx, ty, d) in targets.iter().take(t.special_targets) {
                if d <= 0.0 {
                    continue;
                }
                let vx = (tx - e.x) / d * t.special_speed;
                let vy = (ty - e.y) / d * t.special_speed;
                projectiles.push(Projectile::new(
                    e.x,
                    e.y - 0.5,
                    vx,
                    vy,
                    "🔥",
                    e.id,
                    t.special_damage,
                    true,
                    projectile_tuning,
                ));
            }
            e.special_cooldown = t.special_cooldown;
        }
    }
}
