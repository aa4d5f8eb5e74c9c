// Fixed-timestep combat simulation: entities, projectiles, power-ups,
// probabilistic AI, and the per-tick step. Rendering and input devices
// live outside; they consume `FrameSnapshot` and produce `InputState`.

pub mod ai;
pub mod character;
pub mod entity;
pub mod input;
pub mod particle;
pub mod powerup;
pub mod projectile;
pub mod sim;
pub mod snapshot;
pub mod stage;
pub mod tuning;

pub use ai::AiController;
pub use entity::{Control, Entity, EntityId};
pub use input::InputState;
pub use particle::Particle;
pub use powerup::{PowerUp, PowerUpKind};
pub use projectile::Projectile;
pub use sim::{SimMode, Simulation, StepEvents, StepOptions};
pub use snapshot::FrameSnapshot;
pub use stage::Stage;
