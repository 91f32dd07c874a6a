// Entity behavior core for a 2D side-scrolling action game
//
// This crate owns the combat and patrol state machines that drive the
// player character and the enemy family: attack timing, damage
// application, health depletion, death, and enemy perception/patrol
// logic. Everything engine-flavored (rendering, animation clips, camera,
// input devices, physics shapes, audio, replication) stays on the other
// side of the collaborator traits in `engine`.
//
// The host constructs a `World`, spawns entities into it, forwards input
// edges and overlap notifications, and drives `World::update` once per
// frame. Timers fire first within a step, then the state machines read
// the resulting state.

// Module declarations
pub mod combat;
pub mod config;
pub mod enemy;
pub mod engine;
pub mod entity;
pub mod health;
pub mod player;
pub mod timer;
pub mod world;

// Re-export the types a host needs for convenience
pub use combat::{DamageEvent, DamageKind, DamageSource, ProjectileKind};
pub use config::ConfigError;
pub use enemy::{EnemyBehavior, EnemyMode, EnemyPolicy};
pub use engine::{Host, Lifecycle, Movement, Presentation, SpatialQuery, VisualState};
pub use entity::{EntityId, EntityRef, EntityTag, Facing, VolumeKind};
pub use health::{DamageResult, Health};
pub use player::{ActionState, PlayerCombat, PlayerConfig};
pub use timer::{FiredTimer, TimerEvent, TimerHandle, TimerScheduler, TimerSlot};
pub use world::World;
