use crate::entity::{EntityId, TRAIL_LEN};
use crate::stage::Stage;
use crate::tuning::{ProjectileTuning, GRAVITY};

/// A damage-carrying shot. Owns nothing: `owner` is a handle into the
/// entity table, so the shooter despawning cannot dangle the projectile.
#[derive(Debug, Clone)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub ch: String,
    pub owner: EntityId,
    pub life: f32,
    pub damage: f32,
    pub special: bool,
    pub trail: Vec<(f32, f32)>,
}

impl Projectile {
    pub fn new(
        x: f32,
        y: f32,
        vx: f32,
        vy: f32,
        ch: &str,
        owner: EntityId,
        damage: f32,
        special: bool,
        tuning: &ProjectileTuning,
    ) -> Self {
        Self {
            x,
            y,
            vx,
            vy,
            ch: ch.to_string(),
            owner,
            life: tuning.life_time,
            damage,
            special,
            trail: Vec::new(),
        }
    }

    /// Advances one tick. Returns true once the projectile has expired or
    /// left the playfield and should be culled.
    pub fn update_physics(&mut self, dt: f32, stage: &Stage, tuning: &ProjectileTuning) -> bool {
        self.life -= dt;
        self.vy += GRAVITY * dt * tuning.gravity_factor;
        self.x += self.vx * dt;
        self.y += self.vy * dt;

        self.trail.push((self.x, self.y));
        if self.trail.len() > TRAIL_LEN {
            self.trail.remove(0);
        }

        self.life <= 0.0 || self.x < 0.0 || self.x > stage.max_x - 1.0 || self.y > stage.max_y
    }
}
