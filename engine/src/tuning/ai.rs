/// Gameplay tuning for AI combatants.
///
/// The trigger probabilities are independent Bernoulli trials evaluated
/// once per tick, not cooldown timers. At 30 ticks per second they give
/// expected intervals between actions; keep them per-tick or the pacing
/// of AI fights changes.

#[derive(Debug, Clone, Copy)]
pub struct AiTuning {
    /// Per-tick chance of firing a basic attack while off cooldown.
    pub attack_probability: f64,

    /// Per-tick chance of jumping while on the ground.
    pub jump_probability: f64,

    /// Per-tick chance of firing the special while off cooldown.
    pub special_probability: f64,

    /// Chance a successful basic attack is accompanied by a taunt.
    pub taunt_probability: f64,

    /// Horizontal approach speed, before the speed multiplier.
    pub run_speed: f32,

    /// Horizontal distance under which the AI stops closing in.
    pub stop_distance: f32,

    /// Launch speed of a basic attack projectile.
    pub attack_speed: f32,

    /// Base damage of a basic attack, before the damage multiplier.
    pub attack_damage: f32,

    /// Seconds between basic attacks.
    pub attack_cooldown: f32,

    /// Launch speed of each special projectile.
    pub special_speed: f32,

    /// Damage of each special projectile (no multiplier applied).
    pub special_damage: f32,

    /// Seconds between special attacks.
    pub special_cooldown: f32,

    /// How many nearest targets the special fires at.
    pub special_targets: usize,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            attack_probability: 0.02,
            jump_probability: 0.015,
            special_probability: 0.01,
            taunt_probability: 0.2,
            run_speed: 7.0,
            stop_distance: 2.0,
            attack_speed: 18.0,
            attack_damage: 20.0,
            attack_cooldown: 1.2,
            special_speed: 12.0,
            special_damage: 25.0,
            special_cooldown: 5.0,
            special_targets: 2,
        }
    }
}
