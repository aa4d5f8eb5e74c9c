// Gameplay tuning, separate from runtime configuration (tick buffers,
// network cadence). Values here change how the game feels.

pub mod ai;
pub mod player;
pub mod projectile;

pub use ai::AiTuning;
pub use player::PlayerTuning;
pub use projectile::ProjectileTuning;

/// Simulation ticks per second.
pub const TICK_RATE: u32 = 30;

/// Duration of one tick in seconds.
pub const DT: f32 = 1.0 / TICK_RATE as f32;

/// Downward acceleration applied to entities, in cells per second squared.
/// The y axis increases downward.
pub const GRAVITY: f32 = 30.0;
