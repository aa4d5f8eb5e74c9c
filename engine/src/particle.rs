use std::f32::consts::TAU;

use rand::Rng;

use crate::tuning::GRAVITY;

const SPARKLES: &[&str] = &["✨", "💫", "⭐", "🌟"];

/// Purely cosmetic debris; no gameplay effect.
#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub ch: String,
    pub life: f32,
    pub max_life: f32,
}

impl Particle {
    pub fn new(x: f32, y: f32, vx: f32, vy: f32, ch: &str, life: f32) -> Self {
        Self {
            x,
            y,
            vx,
            vy,
            ch: ch.to_string(),
            life,
            max_life: life,
        }
    }

    /// Advances one tick; returns true when the particle is spent.
    pub fn update(&mut self, dt: f32) -> bool {
        self.life -= dt;
        self.x += self.vx * dt;
        self.y += self.vy * dt;
        self.vy += GRAVITY * dt * 0.5;
        self.life <= 0.0
    }
}

/// Radial burst of sparkles used for hits and pickups.
pub fn explosion_burst<R: Rng>(rng: &mut R, x: f32, y: f32, count: usize) -> Vec<Particle> {
    (0..count)
        .map(|_| {
            let angle = rng.gen_range(0.0..TAU);
            let speed = rng.gen_range(5.0..15.0f32);
            let ch = SPARKLES[rng.gen_range(0..SPARKLES.len())];
            let life = rng.gen_range(0.5..1.5);
            Particle::new(x, y, angle.cos() * speed, angle.sin() * speed, ch, life)
        })
        .collect()
}
