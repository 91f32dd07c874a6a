//! Entity identity and tagged references shared across the behavior core.
//!
//! Everything that exists in the simulation is addressed by an [`EntityId`].
//! Spatial queries hand back [`EntityRef`]s that already carry an
//! [`EntityTag`], so behavior code filters attack targets with a tag check
//! instead of runtime type tests.

/// Unique identity for a simulated entity.
///
/// Ids are handed out by the `World` and never reused within a session,
/// which is what makes stale-timer liveness checks reliable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

/// Category tag carried by entity references returned from spatial queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityTag {
    /// The player character.
    Player,
    /// Enemy entities (officers, guards, etc.)
    Enemy,
    /// Projectiles (bullets); these have no health tracker
    Projectile,
}

/// A tagged reference to an entity, as reported by the spatial query
/// collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityRef {
    pub id: EntityId,
    pub tag: EntityTag,
}

impl EntityRef {
    pub fn new(id: EntityId, tag: EntityTag) -> Self {
        EntityRef { id, tag }
    }

    pub fn is_player(&self) -> bool {
        self.tag == EntityTag::Player
    }

    pub fn is_enemy(&self) -> bool {
        self.tag == EntityTag::Enemy
    }
}

/// Horizontal facing for a side-scrolling entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// Facing that matches a signed walk direction (+1 right, -1 left).
    pub fn from_direction(direction: f32) -> Self {
        if direction < 0.0 {
            Facing::Left
        } else {
            Facing::Right
        }
    }

    /// Unit offset along the facing, used to place projectiles and attack
    /// boxes in front of an entity.
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

impl Default for Facing {
    fn default() -> Self {
        Facing::Right
    }
}

/// Named detection volumes attached to entities.
///
/// The spatial query collaborator resolves `(owner, volume)` to the set of
/// entities currently overlapping that volume. What shape each volume has is
/// the host engine's business; the core only names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeKind {
    /// The player's melee strike box, in front of the character.
    MeleeStrike,
    /// A guard enemy's contact-attack box.
    Attack,
    /// Outer sight box an enemy watches with while standing still.
    IdleSight,
    /// Inner sight box an enemy watches with while walking.
    WalkSight,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_from_direction() {
        assert_eq!(Facing::from_direction(1.0), Facing::Right);
        assert_eq!(Facing::from_direction(-1.0), Facing::Left);
        // Zero keeps the default right-handedness
        assert_eq!(Facing::from_direction(0.0), Facing::Right);
    }

    #[test]
    fn test_facing_sign_roundtrip() {
        assert_eq!(Facing::from_direction(Facing::Left.sign()), Facing::Left);
        assert_eq!(Facing::from_direction(Facing::Right.sign()), Facing::Right);
    }

    #[test]
    fn test_entity_ref_tags() {
        let player = EntityRef::new(EntityId(0), EntityTag::Player);
        let enemy = EntityRef::new(EntityId(1), EntityTag::Enemy);

        assert!(player.is_player());
        assert!(!player.is_enemy());
        assert!(enemy.is_enemy());
        assert!(!enemy.is_player());
    }
}
