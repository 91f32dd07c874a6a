//! Damage taxonomy and target arbitration.
//!
//! This module provides the vocabulary for damage events (kind, source) and
//! the target-selection half of damage resolution: given the entities
//! overlapping an attack volume, pick at most one eligible target. Applying
//! the damage to that target's health tracker is the world's job, since the
//! world owns the trackers.

use crate::entity::{EntityId, EntityRef};

/// Kinds of damage dealt in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageKind {
    /// A melee swing (player sword, guard contact attack).
    Melee,
    /// A projectile hit, applied by the host when a projectile connects.
    Projectile,
}

/// Source of damage for tracking and game logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageSource {
    /// Damage dealt by the player.
    Player,
    /// Damage dealt by an enemy entity.
    Enemy,
    /// Environmental damage (spikes, falls, etc.)
    Environment,
}

/// A complete damage event with kind and source information.
#[derive(Debug, Clone)]
pub struct DamageEvent {
    /// Hit points to remove from the target.
    pub amount: i32,
    /// What kind of attack caused this.
    pub kind: DamageKind,
    /// Who caused it.
    pub source: DamageSource,
}

impl DamageEvent {
    /// Creates a melee damage event.
    pub fn melee(amount: i32, source: DamageSource) -> Self {
        DamageEvent {
            amount,
            kind: DamageKind::Melee,
            source,
        }
    }

    /// Creates a projectile damage event.
    pub fn projectile(amount: i32, source: DamageSource) -> Self {
        DamageEvent {
            amount,
            kind: DamageKind::Projectile,
            source,
        }
    }
}

/// Kinds of projectile the player (or an enemy) can ask the host to spawn.
///
/// The projectile itself is a host-side entity: a constant-velocity actor
/// that reports back through damage application when it connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileKind {
    Bullet,
}

/// Picks at most one target from an overlap scan.
///
/// Filters the scan to entities matching `eligible`, always excluding the
/// attacker itself, and returns the first match. There is no secondary
/// ordering: ties fall to whatever the spatial query reported first.
///
/// Returns `None` when nothing eligible overlaps, which is a normal outcome, not an
/// error. Note this function has no idempotence of its own; calling it twice
/// against the same overlap set picks the same target twice. The per-swing
/// used-flag in the attacker's state machine is what keeps one attack window
/// from landing two hits.
pub fn select_target<F>(
    overlaps: &[EntityRef],
    attacker: EntityId,
    mut eligible: F,
) -> Option<EntityId>
where
    F: FnMut(&EntityRef) -> bool,
{
    overlaps
        .iter()
        .find(|target| target.id != attacker && eligible(target))
        .map(|target| target.id)
}
