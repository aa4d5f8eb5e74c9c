/// Gameplay tuning for projectiles.

#[derive(Debug, Clone, Copy)]
pub struct ProjectileTuning {
    /// Lifetime in seconds before the projectile is despawned.
    pub life_time: f32,

    /// Fraction of gravity applied to projectiles (they drop slightly).
    pub gravity_factor: f32,

    /// Horizontal knockback impulse applied to a hit entity.
    pub knockback: f32,

    /// Upward impulse applied to a hit entity (negative is up).
    pub knockback_lift: f32,

    /// Minimum damage that leaks through an active shield.
    pub shield_floor: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            life_time: 3.0,
            gravity_factor: 0.1,
            knockback: 8.0,
            knockback_lift: -6.0,
            shield_floor: 5.0,
        }
    }
}
