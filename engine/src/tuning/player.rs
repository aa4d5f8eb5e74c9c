/// Gameplay tuning for player-controlled entities.

#[derive(Debug, Clone, Copy)]
pub struct PlayerTuning {
    /// Horizontal run speed in cells per second, before the speed multiplier.
    pub run_speed: f32,

    /// Vertical impulse applied on jump (negative is up).
    pub jump_impulse: f32,

    /// Launch speed of a basic attack projectile.
    pub attack_speed: f32,

    /// Base damage of a basic attack, before the damage multiplier.
    pub attack_damage: f32,

    /// Seconds between basic attacks.
    pub attack_cooldown: f32,

    /// Base damage of each special projectile.
    pub special_damage: f32,

    /// Seconds between special attacks.
    pub special_cooldown: f32,

    /// Sliding window in which consecutive hits keep the combo alive.
    pub combo_window: f32,

    /// Combo count at which a combo callout appears.
    pub combo_callout: u32,

    /// Seconds a defeated entity waits before respawning.
    pub respawn_delay: f32,

    /// Seconds of invulnerability granted on respawn.
    pub respawn_invulnerability: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            run_speed: 20.0,
            jump_impulse: -20.0,
            attack_speed: 25.0,
            attack_damage: 20.0,
            attack_cooldown: 0.6,
            special_damage: 30.0,
            special_cooldown: 3.0,
            combo_window: 1.0,
            combo_callout: 3,
            respawn_delay: 3.0,
            respawn_invulnerability: 2.0,
        }
    }
}
