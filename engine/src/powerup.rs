use rand::Rng;

use crate::entity::Entity;

/// World pickup kinds. `Health` applies instantly; the rest run a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpKind {
    Health,
    Speed,
    Damage,
    Shield,
    Infinite,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 5] = [
        PowerUpKind::Health,
        PowerUpKind::Speed,
        PowerUpKind::Damage,
        PowerUpKind::Shield,
        PowerUpKind::Infinite,
    ];

    pub fn glyph(self) -> &'static str {
        match self {
            PowerUpKind::Health => "❤️",
            PowerUpKind::Speed => "⚡",
            PowerUpKind::Damage => "💥",
            PowerUpKind::Shield => "🛡️",
            PowerUpKind::Infinite => "♾️",
        }
    }

    /// HUD color code for pickup messages (terminal palette index).
    pub fn color(self) -> u8 {
        match self {
            PowerUpKind::Health => 2,
            PowerUpKind::Speed => 3,
            PowerUpKind::Damage => 5,
            PowerUpKind::Shield => 4,
            PowerUpKind::Infinite => 6,
        }
    }

    fn label(self) -> &'static str {
        match self {
            PowerUpKind::Health => "HEALTH",
            PowerUpKind::Speed => "SPEED",
            PowerUpKind::Damage => "DAMAGE",
            PowerUpKind::Shield => "SHIELD",
            PowerUpKind::Infinite => "INFINITE MODE",
        }
    }

    /// Effect duration in seconds; `None` for the instant heal.
    fn duration(self) -> Option<f32> {
        match self {
            PowerUpKind::Health => None,
            PowerUpKind::Speed => Some(10.0),
            PowerUpKind::Damage => Some(8.0),
            PowerUpKind::Shield => Some(5.0),
            PowerUpKind::Infinite => Some(15.0),
        }
    }

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Amount the health pickup restores.
const HEAL_AMOUNT: f32 = 50.0;

#[derive(Debug, Clone)]
pub struct PowerUp {
    pub x: f32,
    pub y: f32,
    pub kind: PowerUpKind,
    pub collected: bool,
    bob_phase: f32,
}

impl PowerUp {
    pub fn new(x: f32, y: f32, kind: PowerUpKind) -> Self {
        Self {
            x,
            y,
            kind,
            collected: false,
            bob_phase: 0.0,
        }
    }

    /// Vertical bobbing so pickups read as interactive.
    pub fn update(&mut self, dt: f32) {
        self.bob_phase += 3.0 * dt;
        self.y += 0.1 * self.bob_phase.sin();
    }

    /// Applies the effect to the collecting entity and returns the HUD
    /// announcement. Each pickup is consumed by exactly one entity.
    pub fn collect(&mut self, entity: &mut Entity) -> String {
        self.collected = true;
        match self.kind.duration() {
            None => entity.hp = (entity.hp + HEAL_AMOUNT).min(entity.max_hp),
            Some(duration) => {
                if let Some(timer) = entity.power_ups.timer_mut(self.kind) {
                    *timer = duration;
                }
            }
        }
        format!("{} got {}!", entity.name, self.kind.label())
    }
}
