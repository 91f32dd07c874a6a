//! Collaborator interfaces the behavior core drives on the host engine.
//!
//! The core never renders, plays audio, maps input devices, or integrates
//! physics. It reads and writes through these traits, and the host (or a
//! test fake) supplies the implementations. Splitting them keeps each
//! concern small; [`Host`] bundles them back up for the call sites that
//! need all of them.

use crate::combat::ProjectileKind;
use crate::entity::{EntityId, EntityRef, Facing, VolumeKind};

/// Visual state tags consumed by the host's renderer/animation layer.
///
/// The core decides *which* tag an entity shows; picking the matching
/// flipbook or sprite sheet is the host's problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualState {
    Idle,
    Walk,
    Jump,
    Melee,
    Ranged,
    Hurt,
    Dead,
    AggroIdle,
    AggroWalk,
}

/// Movement capability: the character-movement side of the host engine.
pub trait Movement {
    /// Applies horizontal directional input (-1.0..=1.0) for this frame.
    fn apply_directional_input(&mut self, entity: EntityId, axis: f32);

    /// Whether the entity is currently falling or jumping.
    fn is_airborne(&self, entity: EntityId) -> bool;

    /// Current horizontal travel velocity, signed.
    fn velocity_x(&self, entity: EntityId) -> f32;

    /// Current world position, used to anchor projectile spawns.
    fn position(&self, entity: EntityId) -> (f32, f32);

    /// Stops directional input from moving the entity (melee swings, death).
    fn lock_movement(&mut self, entity: EntityId);

    /// Re-enables directional movement.
    fn unlock_movement(&mut self, entity: EntityId);

    /// Points the entity (and everything attached to it) left or right.
    fn set_facing(&mut self, entity: EntityId, facing: Facing);

    /// Enables or disables world collision. Disabled on death so corpses
    /// stop blocking and triggering.
    fn set_collision_enabled(&mut self, entity: EntityId, enabled: bool);
}

/// Presentation capability: one visual state tag per entity.
pub trait Presentation {
    fn set_visual_state(&mut self, entity: EntityId, tag: VisualState);
}

/// Spatial query capability: which entities overlap a named volume.
///
/// Overlap *begin/end* notifications are edge-triggered and arrive through
/// the world's `*_overlap_*` methods; this trait is the polling side, used
/// at hit-check time.
pub trait SpatialQuery {
    /// Entities currently overlapping the named volume owned by `owner`.
    /// Order is whatever the engine's overlap scan produces.
    fn overlapping_entities(&self, owner: EntityId, volume: VolumeKind) -> Vec<EntityRef>;
}

/// Entity lifecycle capability: spawning and removing host-side actors.
pub trait Lifecycle {
    /// Spawns a projectile entity travelling in `facing` direction.
    fn spawn_projectile(&mut self, kind: ProjectileKind, position: (f32, f32), facing: Facing);

    /// Removes a despawned entity from the host's scene.
    fn destroy_entity(&mut self, entity: EntityId);
}

/// Umbrella over everything the core needs from its host.
pub trait Host: Movement + Presentation + SpatialQuery + Lifecycle {}

impl<T: Movement + Presentation + SpatialQuery + Lifecycle> Host for T {}
