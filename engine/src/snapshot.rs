//! Borrow-free view of one tick, handed to whatever draws the game.
//! The engine knows nothing about terminals; a renderer consumes this and
//! an input device produces `InputState`.

use crate::entity::EntityId;
use crate::powerup::PowerUpKind;
use crate::sim::Simulation;

#[derive(Debug, Clone)]
pub struct EntityView {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub ch: String,
    pub name: String,
    pub hp: f32,
    pub max_hp: f32,
    pub is_alive: bool,
    pub invulnerable: bool,
    pub shielded: bool,
    pub infinite: bool,
    pub facing_dir: i32,
    pub animation_frame: f32,
    pub combo_count: u32,
    pub kills: u32,
    pub deaths: u32,
    pub respawn_timer: f32,
    pub trail: Vec<(f32, f32)>,
}

#[derive(Debug, Clone)]
pub struct ProjectileView {
    pub x: f32,
    pub y: f32,
    pub ch: String,
    pub special: bool,
    pub trail: Vec<(f32, f32)>,
}

#[derive(Debug, Clone)]
pub struct ParticleView {
    pub x: f32,
    pub y: f32,
    pub ch: String,
    /// Remaining fraction of the particle's life, for fading.
    pub intensity: f32,
}

#[derive(Debug, Clone)]
pub struct PowerUpView {
    pub x: f32,
    pub y: f32,
    pub kind: PowerUpKind,
    pub ch: &'static str,
}

#[derive(Debug, Clone)]
pub struct NoticeView {
    pub ttl: f32,
    pub text: String,
    pub color: u8,
}

#[derive(Debug, Clone)]
pub struct ComboNoticeView {
    pub ttl: f32,
    pub text: String,
    pub x: f32,
    pub y: f32,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Default)]
pub struct FrameSnapshot {
    pub entities: Vec<EntityView>,
    pub projectiles: Vec<ProjectileView>,
    pub particles: Vec<ParticleView>,
    pub power_ups: Vec<PowerUpView>,
    pub notices: Vec<NoticeView>,
    pub combo_notices: Vec<ComboNoticeView>,
}

impl FrameSnapshot {
    pub fn capture(sim: &Simulation) -> Self {
        Self {
            entities: sim
                .entities
                .iter()
                .map(|e| EntityView {
                    id: e.id,
                    x: e.x,
                    y: e.y,
                    ch: e.ch.clone(),
                    name: e.name.clone(),
                    hp: e.hp,
                    max_hp: e.max_hp,
                    is_alive: e.is_alive,
                    invulnerable: e.invulnerable,
                    shielded: e.has_shield(),
                    infinite: e.is_infinite_mode(),
                    facing_dir: e.facing_dir,
                    animation_frame: e.animation_frame,
                    combo_count: e.combo_count,
                    kills: e.kills,
                    deaths: e.deaths,
                    respawn_timer: e.respawn_timer,
                    trail: e.trail.clone(),
                })
                .collect(),
            projectiles: sim
                .projectiles
                .iter()
                .map(|p| ProjectileView {
                    x: p.x,
                    y: p.y,
                    ch: p.ch.clone(),
                    special: p.special,
                    trail: p.trail.clone(),
                })
                .collect(),
            particles: sim
                .particles
                .iter()
                .map(|p| ParticleView {
                    x: p.x,
                    y: p.y,
                    ch: p.ch.clone(),
                    intensity: (p.life / p.max_life).clamp(0.0, 1.0),
                })
                .collect(),
            power_ups: sim
                .power_ups
                .iter()
                .map(|p| PowerUpView {
                    x: p.x,
                    y: p.y,
                    kind: p.kind,
                    ch: p.kind.glyph(),
                })
                .collect(),
            notices: sim
                .notices
                .iter()
                .map(|n| NoticeView {
                    ttl: n.ttl,
                    text: n.text.clone(),
                    color: n.color,
                })
                .collect(),
            combo_notices: sim
                .combo_notices
                .iter()
                .map(|c| ComboNoticeView {
                    ttl: c.ttl,
                    text: c.text.clone(),
                    x: c.x,
                    y: c.y,
                })
                .collect(),
        }
    }
}
