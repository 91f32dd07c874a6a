//! Hit point tracking for damageable entities.
//!
//! Every damageable entity (the player and each enemy) owns one [`Health`]
//! tracker. Health only ever goes down in this core: damage clamps at zero
//! and there is no healing path, so `current == 0` is sticky and death is
//! final.
//!
//! # Rust Learning Notes
//!
//! This module demonstrates:
//! - **Encapsulated invariants**: `current` stays in `[0, max]` because the
//!   fields are private and the only mutation is `apply_damage`
//! - **Rich return values**: `DamageResult` tells the caller what actually
//!   happened instead of forcing it to diff before/after values

/// Represents an entity's hit points.
///
/// Created with `current == max` at entity spawn. Invariant:
/// `0 <= current <= max`.
///
/// # Example
///
/// ```rust
/// use sidescroller_core::Health;
///
/// let mut health = Health::new(300);
/// health.apply_damage(100);
/// assert_eq!(health.current(), 200);
/// assert!(health.is_alive());
/// ```
#[derive(Debug, Clone)]
pub struct Health {
    current: i32,
    max: i32,
}

impl Health {
    /// Creates a new Health instance at full hit points.
    pub fn new(max: i32) -> Self {
        let max = max.max(0);
        Health { current: max, max }
    }

    /// Returns the current hit points.
    pub fn current(&self) -> i32 {
        self.current
    }

    /// Returns the maximum hit points.
    pub fn max(&self) -> i32 {
        self.max
    }

    /// Returns health as a fraction (0.0 to 1.0), for health bar display.
    pub fn percentage(&self) -> f32 {
        if self.max <= 0 {
            0.0
        } else {
            self.current as f32 / self.max as f32
        }
    }

    /// Checks if the entity is alive (health > 0).
    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Checks if the entity is dead. `is_dead <=> current == 0`.
    pub fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Applies damage to health, clamping at zero.
    ///
    /// Negative amounts are treated as zero; there is no hidden healing
    /// path through this method.
    ///
    /// Returns a [`DamageResult`] with the damage actually dealt, whether
    /// the tracker is now empty, and how much overkill occurred.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sidescroller_core::Health;
    ///
    /// let mut health = Health::new(300);
    /// let result = health.apply_damage(450);
    /// assert_eq!(result.damage_dealt, 300);
    /// assert!(result.is_fatal);
    /// assert_eq!(result.overkill, 150);
    /// ```
    pub fn apply_damage(&mut self, amount: i32) -> DamageResult {
        let amount = amount.max(0);
        let old_health = self.current;
        self.current = (self.current - amount).max(0);

        DamageResult {
            damage_dealt: old_health - self.current,
            is_fatal: self.current == 0,
            overkill: if self.current == 0 {
                amount - old_health
            } else {
                0
            },
        }
    }
}

/// Result of a damage application.
///
/// Provides detailed information about damage dealt, useful for:
/// - Visual feedback (damage numbers)
/// - Game logic (death handling)
#[derive(Debug, Clone)]
pub struct DamageResult {
    /// Damage actually dealt (less than requested if the target had less
    /// health remaining).
    pub damage_dealt: i32,
    /// Whether the tracker sits at zero after this application.
    pub is_fatal: bool,
    /// Excess damage beyond what was needed to reach zero.
    pub overkill: i32,
}

impl DamageResult {
    /// Creates a result representing no damage dealt.
    pub fn no_damage() -> Self {
        DamageResult {
            damage_dealt: 0,
            is_fatal: false,
            overkill: 0,
        }
    }
}
