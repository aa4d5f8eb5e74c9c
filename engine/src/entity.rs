use crate::character::CharacterStats;
use crate::powerup::PowerUpKind;
use crate::stage::Stage;
use crate::tuning::GRAVITY;

/// Stable handle into the entity table. Projectiles and the network
/// reconciler hold ids, never references, so removals cannot dangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

/// Who drives an entity each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Driven by the local input state.
    Human,
    /// Driven by the probabilistic AI controller.
    Ai,
    /// Shadow of a remote player: physics and AI are skipped, position and
    /// health are overwritten by inbound relay messages.
    Remote,
}

/// Remaining duration of each power-up effect, in seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct PowerUpTimers {
    pub speed: f32,
    pub damage: f32,
    pub shield: f32,
    pub infinite: f32,
}

impl PowerUpTimers {
    /// Mutable timer for a timed effect; `Health` is instant and has none.
    pub fn timer_mut(&mut self, kind: PowerUpKind) -> Option<&mut f32> {
        match kind {
            PowerUpKind::Health => None,
            PowerUpKind::Speed => Some(&mut self.speed),
            PowerUpKind::Damage => Some(&mut self.damage),
            PowerUpKind::Shield => Some(&mut self.shield),
            PowerUpKind::Infinite => Some(&mut self.infinite),
        }
    }

    fn tick(&mut self, dt: f32) {
        for t in [
            &mut self.speed,
            &mut self.damage,
            &mut self.shield,
            &mut self.infinite,
        ] {
            *t = (*t - dt).max(0.0);
        }
    }
}

/// A combatant: player, AI, or remote shadow.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub ch: String,
    pub name: String,
    pub control: Control,

    pub max_hp: f32,
    pub hp: f32,
    pub is_alive: bool,
    pub on_ground: bool,

    pub cooldown: f32,
    pub special_cooldown: f32,
    pub special_effect_timer: f32,
    pub combo_count: u32,
    pub combo_timer: f32,
    pub kills: u32,
    pub deaths: u32,
    pub respawn_timer: f32,
    pub invulnerable: bool,
    pub invulnerable_timer: f32,
    pub power_ups: PowerUpTimers,

    /// Horizontal facing, +1 right or -1 left.
    pub facing_dir: i32,
    pub animation_frame: f32,
    /// Recent positions, newest last, capped at `TRAIL_LEN`.
    pub trail: Vec<(f32, f32)>,
    /// Character stat multipliers applied on top of power-ups.
    pub stats: CharacterStats,
}

pub const TRAIL_LEN: usize = 5;

impl Entity {
    pub fn new(id: EntityId, x: f32, y: f32, ch: &str, name: &str, control: Control) -> Self {
        Self::with_stats(id, x, y, ch, name, control, CharacterStats::default())
    }

    pub fn with_stats(
        id: EntityId,
        x: f32,
        y: f32,
        ch: &str,
        name: &str,
        control: Control,
        stats: CharacterStats,
    ) -> Self {
        Self {
            id,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            ch: ch.to_string(),
            name: name.to_string(),
            control,
            max_hp: stats.hp,
            hp: stats.hp,
            is_alive: true,
            on_ground: false,
            cooldown: 0.0,
            special_cooldown: 0.0,
            special_effect_timer: 0.0,
            combo_count: 0,
            combo_timer: 0.0,
            kills: 0,
            deaths: 0,
            respawn_timer: 0.0,
            invulnerable: false,
            invulnerable_timer: 0.0,
            power_ups: PowerUpTimers::default(),
            facing_dir: 1,
            animation_frame: 0.0,
            trail: Vec::new(),
            stats,
        }
    }

    pub fn is_remote(&self) -> bool {
        self.control == Control::Remote
    }

    /// Flat boost while the speed power-up is active, times character speed.
    pub fn speed_multiplier(&self) -> f32 {
        let boost = if self.power_ups.speed > 0.0 { 0.5 } else { 0.0 };
        self.stats.speed * (1.0 + boost)
    }

    /// Flat boost while the damage power-up is active, times character damage.
    pub fn damage_multiplier(&self) -> f32 {
        let boost = if self.power_ups.damage > 0.0 { 0.8 } else { 0.0 };
        self.stats.damage * (1.0 + boost)
    }

    pub fn has_shield(&self) -> bool {
        self.power_ups.shield > 0.0
    }

    /// Infinite mode prevents death: lethal damage clamps health to 1.
    pub fn is_infinite_mode(&self) -> bool {
        self.power_ups.infinite > 0.0
    }

    /// Brings a dead entity back at the given position with full health,
    /// a fresh invulnerability window, and cleared combo state.
    pub fn respawn(&mut self, x: f32, y: f32, invulnerability: f32) {
        self.x = x;
        self.y = y;
        self.vx = 0.0;
        self.vy = 0.0;
        self.hp = self.max_hp;
        self.is_alive = true;
        self.invulnerable = true;
        self.invulnerable_timer = invulnerability;
        self.combo_count = 0;
        self.trail.clear();
    }

    /// One tick of timers, gravity, integration, and stage collision.
    /// Not called for remote shadows; their position comes off the wire.
    pub fn update_physics(&mut self, dt: f32, stage: &Stage) {
        self.cooldown = (self.cooldown - dt).max(0.0);
        self.special_cooldown = (self.special_cooldown - dt).max(0.0);
        self.special_effect_timer = (self.special_effect_timer - dt).max(0.0);

        self.combo_timer = (self.combo_timer - dt).max(0.0);
        if self.combo_timer <= 0.0 {
            self.combo_count = 0;
        }

        if self.invulnerable {
            self.invulnerable_timer -= dt;
            if self.invulnerable_timer <= 0.0 {
                self.invulnerable = false;
            }
        }

        self.power_ups.tick(dt);
        self.animation_frame += dt * 10.0;

        self.vy += GRAVITY * dt;
        self.x += self.vx * dt;
        self.y += self.vy * dt;

        self.trail.push((self.x, self.y));
        if self.trail.len() > TRAIL_LEN {
            self.trail.remove(0);
        }

        // Land on the floor only while falling; keep upward velocity so
        // jumps started this tick are not cancelled.
        if self.y >= stage.standing_y() {
            if self.vy > 0.0 {
                self.vy = 0.0;
            }
            self.y = stage.standing_y();
            self.on_ground = true;
        }

        // Walls: clamp and apply a damped bounce.
        if self.x < 1.0 {
            self.x = 1.0;
            self.vx *= -0.2;
        }
        if self.x > stage.max_x - 2.0 {
            self.x = stage.max_x - 2.0;
            self.vx *= -0.2;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::DT;

    fn stage() -> Stage {
        Stage::new(80.0, 24.0)
    }

    fn grounded(id: u64) -> Entity {
        let stage = stage();
        let mut e = Entity::new(EntityId(id), 10.0, stage.standing_y(), "🤖", "Bot", Control::Ai);
        e.on_ground = true;
        e
    }

    #[test]
    fn gravity_pulls_airborne_entity_down() {
        let mut e = Entity::new(EntityId(1), 10.0, 5.0, "🤖", "Bot", Control::Ai);
        let y0 = e.y;
        e.update_physics(DT, &stage());
        assert!(e.y > y0);
        assert!(e.vy > 0.0);
    }

    #[test]
    fn lands_on_ground_and_stops_falling() {
        let stage = stage();
        let mut e = Entity::new(EntityId(1), 10.0, stage.standing_y() - 0.01, "🤖", "B", Control::Ai);
        e.vy = 10.0;
        e.update_physics(DT, &stage);
        assert_eq!(e.y, stage.standing_y());
        assert_eq!(e.vy, 0.0);
        assert!(e.on_ground);
    }

    #[test]
    fn wall_clamp_applies_damped_bounce() {
        let mut e = grounded(1);
        e.x = 0.2;
        e.vx = -10.0;
        e.update_physics(DT, &stage());
        assert_eq!(e.x, 1.0);
        assert!((e.vx - 2.0).abs() < 1e-4);
    }

    #[test]
    fn combo_resets_when_window_lapses() {
        let mut e = grounded(1);
        e.combo_count = 2;
        e.combo_timer = 0.02;
        e.update_physics(DT, &stage());
        assert_eq!(e.combo_count, 0);
    }

    #[test]
    fn speed_multiplier_is_flat_while_active() {
        let mut e = grounded(1);
        assert_eq!(e.speed_multiplier(), 1.0);
        e.power_ups.speed = 10.0;
        assert_eq!(e.speed_multiplier(), 1.5);
        e.power_ups.speed = 0.3;
        assert_eq!(e.speed_multiplier(), 1.5);
    }

    #[test]
    fn invulnerability_expires() {
        let mut e = grounded(1);
        e.invulnerable = true;
        e.invulnerable_timer = DT / 2.0;
        e.update_physics(DT, &stage());
        assert!(!e.invulnerable);
    }

    #[test]
    fn respawn_restores_health_and_clears_combo() {
        let mut e = grounded(1);
        e.hp = 0.0;
        e.is_alive = false;
        e.combo_count = 4;
        e.respawn(20.0, 17.0, 2.0);
        assert!(e.is_alive);
        assert_eq!(e.hp, e.max_hp);
        assert!(e.invulnerable);
        assert_eq!(e.invulnerable_timer, 2.0);
        assert_eq!(e.combo_count, 0);
    }

    #[test]
    fn trail_is_bounded() {
        let mut e = grounded(1);
        for _ in 0..20 {
            e.update_physics(DT, &stage());
        }
        assert!(e.trail.len() <= TRAIL_LEN);
    }
}
