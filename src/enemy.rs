//! Enemy behavior: patrol, perception, aggro, contact attacks, death.
//!
//! One policy-parameterized state machine covers the whole enemy family.
//! An [`EnemyPolicy`] selects between the behavioral variants (the plain
//! back-and-forth patroller, the sight-reactive patroller, and the
//! melee-on-contact guard) instead of near-duplicate types per enemy.
//!
//! Movement is timer-driven: a patroller walks timed legs and rests after a
//! counted number of them; a guard alternates direction on a fixed interval
//! with a short settle pause after each flip. Perception counts concurrent
//! sight-volume overlaps so that leaving one of two nested sight boxes never
//! clears an aggro the other box still justifies.

use crate::config::ConfigError;
use crate::engine::{Host, VisualState};
use crate::entity::{EntityId, Facing};
use crate::health::Health;
use crate::timer::{TimerEvent, TimerScheduler, TimerSlot};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How long a dead enemy lingers before despawning, leaving the host time
/// to play the death cue.
pub const DESPAWN_DELAY: f32 = 0.6;

/// Behavior policy for one enemy variant.
///
/// The three shipped variants are [`EnemyPolicy::patroller`],
/// [`EnemyPolicy::sight_patroller`], and [`EnemyPolicy::melee_guard`]; any
/// other combination of fields is also a valid policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyPolicy {
    /// Seconds per patrol leg (or per direction interval for a guard).
    pub walk_duration: f32,
    /// Seconds spent resting between patrol runs.
    pub idling_duration: f32,
    /// Legs walked before an idle pause.
    pub patrols_before_idle: u32,
    /// Whether sight-volume overlap drives an aggro response.
    pub has_sight_perception: bool,
    /// Whether the attack volume drives a contact swing loop.
    pub has_contact_attack: bool,
    /// Seconds one contact swing locks the guard.
    pub swing_duration: f32,
    /// Seconds a guard settles after flipping direction.
    pub settle_duration: f32,
    /// Damage one connecting contact swing applies.
    pub contact_damage: i32,
    /// Hit points at spawn.
    pub max_health: i32,
}

impl EnemyPolicy {
    /// Plain back-and-forth patroller: timed legs, a turn at the end of
    /// each, and a rest every `patrols_before_idle` legs.
    pub fn patroller() -> Self {
        EnemyPolicy {
            walk_duration: 2.0,
            idling_duration: 1.5,
            patrols_before_idle: 2,
            has_sight_perception: false,
            has_contact_attack: false,
            swing_duration: 0.8,
            settle_duration: 0.5,
            contact_damage: 100,
            max_health: 300,
        }
    }

    /// Patroller that aggros when the player crosses its sight boxes.
    pub fn sight_patroller() -> Self {
        EnemyPolicy {
            has_sight_perception: true,
            ..Self::patroller()
        }
    }

    /// Contact-attacking guard: alternates direction on a fixed interval
    /// and swings whenever the player stands inside its attack box.
    pub fn melee_guard() -> Self {
        EnemyPolicy {
            walk_duration: 2.2,
            has_contact_attack: true,
            ..Self::patroller()
        }
    }

    /// Loads a policy from a JSON file. Missing fields keep their defaults.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        crate::config::load_from_file(path)
    }
}

impl Default for EnemyPolicy {
    fn default() -> Self {
        Self::patroller()
    }
}

/// Behavior modes for the enemy family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyMode {
    /// Walking a timed patrol leg.
    Patrolling,
    /// Resting between patrol runs.
    Idling,
    /// Player spotted; movement timer paused.
    Aggroed,
    /// Terminal. No movement, perception, or damage dealing.
    Dead,
}

/// Policy-parameterized behavior state machine for one enemy.
///
/// Mode transitions are driven by timers and overlap notifications routed
/// in by the world; the per-frame [`update`](EnemyBehavior::update) only
/// feeds movement input and the visual tag for whatever mode is current.
pub struct EnemyBehavior {
    pub id: EntityId,
    pub facing: Facing,
    pub health: Health,
    policy: EnemyPolicy,
    mode: EnemyMode,
    /// Mode to restore when the last sight overlap ends.
    mode_before_aggro: EnemyMode,
    walk_direction: f32,
    patrol_count: u32,
    sight_overlaps: u32,
    /// Contact-attack sub-state; independent of the patrol timers.
    attacking: bool,
}

impl EnemyBehavior {
    pub fn new(id: EntityId, policy: EnemyPolicy) -> Self {
        EnemyBehavior {
            id,
            facing: Facing::Right,
            health: Health::new(policy.max_health),
            mode: EnemyMode::Patrolling,
            mode_before_aggro: EnemyMode::Patrolling,
            walk_direction: 1.0,
            patrol_count: 0,
            sight_overlaps: 0,
            attacking: false,
            policy,
        }
    }

    pub fn mode(&self) -> EnemyMode {
        self.mode
    }

    pub fn policy(&self) -> &EnemyPolicy {
        &self.policy
    }

    pub fn walk_direction(&self) -> f32 {
        self.walk_direction
    }

    pub fn sight_overlaps(&self) -> u32 {
        self.sight_overlaps
    }

    pub fn is_attacking(&self) -> bool {
        self.attacking
    }

    pub fn is_dead(&self) -> bool {
        self.mode == EnemyMode::Dead
    }

    /// Arms the first movement timer. Called once at spawn.
    pub fn start(&mut self, scheduler: &mut TimerScheduler) {
        let event = if self.policy.has_contact_attack {
            TimerEvent::GuardFlip
        } else {
            TimerEvent::EndPatrolLeg
        };
        scheduler.arm(self.id, TimerSlot::Patrol, event, self.policy.walk_duration);
    }

    /// End of a patrol leg: turn around, and every `patrols_before_idle`
    /// legs rest instead of walking straight into the next one. Out and
    /// back with the default count of 2, so the rest happens at home with
    /// the starting direction restored.
    pub fn end_of_leg(&mut self, scheduler: &mut TimerScheduler) {
        if self.mode != EnemyMode::Patrolling {
            return;
        }

        self.patrol_count += 1;
        self.walk_direction = -self.walk_direction;

        if self.patrol_count == self.policy.patrols_before_idle {
            self.patrol_count = 0;
            self.mode = EnemyMode::Idling;
            scheduler.arm(
                self.id,
                TimerSlot::Patrol,
                TimerEvent::ResumePatrol,
                self.policy.idling_duration,
            );
            debug!("enemy {:?} idling", self.id);
        } else {
            scheduler.arm(
                self.id,
                TimerSlot::Patrol,
                TimerEvent::EndPatrolLeg,
                self.policy.walk_duration,
            );
            debug!("enemy {:?} turned, direction {}", self.id, self.walk_direction);
        }
    }

    /// Idle rest over: turn around and walk the next leg.
    pub fn resume_patrol(&mut self, scheduler: &mut TimerScheduler) {
        if self.mode != EnemyMode::Idling {
            return;
        }

        self.walk_direction = -self.walk_direction;
        self.mode = EnemyMode::Patrolling;
        scheduler.arm(
            self.id,
            TimerSlot::Patrol,
            TimerEvent::EndPatrolLeg,
            self.policy.walk_duration,
        );
        debug!("enemy {:?} resumed patrol", self.id);
    }

    /// Guard direction interval elapsed.
    ///
    /// While the player stands in the attack box the flip is skipped for a
    /// full interval; otherwise the guard turns around and settles briefly
    /// before the next interval starts timing.
    pub fn guard_flip(&mut self, scheduler: &mut TimerScheduler, player_in_range: bool) {
        if self.mode == EnemyMode::Dead {
            return;
        }

        if player_in_range {
            scheduler.arm(
                self.id,
                TimerSlot::Patrol,
                TimerEvent::GuardFlip,
                self.policy.walk_duration,
            );
            return;
        }

        self.walk_direction = -self.walk_direction;
        scheduler.arm(
            self.id,
            TimerSlot::Patrol,
            TimerEvent::GuardSettle,
            self.policy.settle_duration,
        );
        debug!("enemy {:?} flipped, direction {}", self.id, self.walk_direction);
    }

    /// Guard settle pause ended; the next direction interval starts.
    pub fn guard_settled(&mut self, scheduler: &mut TimerScheduler) {
        if self.mode == EnemyMode::Dead {
            return;
        }
        scheduler.arm(
            self.id,
            TimerSlot::Patrol,
            TimerEvent::GuardFlip,
            self.policy.walk_duration,
        );
    }

    /// Attack-volume overlap with the player began: start the contact swing
    /// loop. Movement locks for the duration of the swing.
    pub fn start_contact_swing<H: Host>(&mut self, host: &mut H, scheduler: &mut TimerScheduler) {
        if !self.policy.has_contact_attack || self.attacking || self.mode == EnemyMode::Dead {
            return;
        }

        debug!("enemy {:?} contact swing", self.id);
        self.attacking = true;
        host.lock_movement(self.id);
        host.set_visual_state(self.id, VisualState::Melee);
        scheduler.arm(
            self.id,
            TimerSlot::Swing,
            TimerEvent::GuardSwingEnd,
            self.policy.swing_duration,
        );
    }

    /// Contact swing finished. Re-triggers itself while the player is still
    /// in range; otherwise the guard unlocks and walks on.
    pub fn end_contact_swing<H: Host>(
        &mut self,
        host: &mut H,
        scheduler: &mut TimerScheduler,
        player_in_range: bool,
    ) {
        if !self.attacking || self.mode == EnemyMode::Dead {
            return;
        }

        if player_in_range {
            scheduler.arm(
                self.id,
                TimerSlot::Swing,
                TimerEvent::GuardSwingEnd,
                self.policy.swing_duration,
            );
        } else {
            self.attacking = false;
            host.unlock_movement(self.id);
        }
    }

    /// A sight volume began overlapping the player.
    ///
    /// Both nested sight boxes feed this one counter, so standing in both
    /// and leaving one keeps the aggro. The first concurrent overlap pauses
    /// the movement timer with its remaining time frozen for an exact
    /// resume.
    pub fn sight_overlap_begin(&mut self, scheduler: &mut TimerScheduler) {
        if !self.policy.has_sight_perception || self.mode == EnemyMode::Dead {
            return;
        }

        self.sight_overlaps += 1;
        if self.sight_overlaps == 1
            && matches!(self.mode, EnemyMode::Patrolling | EnemyMode::Idling)
        {
            self.mode_before_aggro = self.mode;
            self.mode = EnemyMode::Aggroed;
            scheduler.pause_slot(self.id, TimerSlot::Patrol);
            debug!("enemy {:?} aggroed", self.id);
        }
    }

    /// A sight volume stopped overlapping the player.
    ///
    /// Clearing the last concurrent overlap drops the aggro, restores the
    /// pre-aggro mode, and unpauses the movement timer so the interrupted
    /// leg (or rest) completes its original total duration.
    pub fn sight_overlap_end(&mut self, scheduler: &mut TimerScheduler) {
        if !self.policy.has_sight_perception || self.mode == EnemyMode::Dead {
            return;
        }

        self.sight_overlaps = self.sight_overlaps.saturating_sub(1);
        if self.sight_overlaps == 0 && self.mode == EnemyMode::Aggroed {
            self.mode = self.mode_before_aggro;
            scheduler.resume_slot(self.id, TimerSlot::Patrol);
            debug!("enemy {:?} aggro cleared", self.id);
        }
    }

    /// Death entry. Terminal: timers cancelled, collision off, and a
    /// despawn timer armed so the corpse leaves after the death cue.
    pub fn enter_dead<H: Host>(
        &mut self,
        host: &mut H,
        scheduler: &mut TimerScheduler,
        despawn_delay: f32,
    ) {
        if self.mode == EnemyMode::Dead {
            return;
        }

        debug!("enemy {:?} died", self.id);
        self.mode = EnemyMode::Dead;
        self.attacking = false;
        scheduler.cancel_all(self.id);
        host.set_collision_enabled(self.id, false);
        host.set_visual_state(self.id, VisualState::Dead);
        scheduler.arm(
            self.id,
            TimerSlot::Despawn,
            TimerEvent::Despawn,
            despawn_delay,
        );
    }

    /// Per-frame update: movement input and the visual tag for the current
    /// mode. A swinging guard stands still regardless of mode; a settling
    /// guard keeps walking; the settle only delays the next flip.
    pub fn update<H: Host>(&mut self, host: &mut H) {
        if self.mode == EnemyMode::Dead {
            return;
        }

        if self.attacking {
            host.set_visual_state(self.id, VisualState::Melee);
            return;
        }

        match self.mode {
            EnemyMode::Patrolling => {
                host.apply_directional_input(self.id, self.walk_direction);
                self.update_facing(host);
                host.set_visual_state(self.id, VisualState::Walk);
            }
            EnemyMode::Idling => {
                host.set_visual_state(self.id, VisualState::Idle);
            }
            EnemyMode::Aggroed => {
                host.set_visual_state(self.id, VisualState::AggroIdle);
            }
            EnemyMode::Dead => {}
        }
    }

    fn update_facing<H: Host>(&mut self, host: &mut H) {
        let facing = Facing::from_direction(self.walk_direction);
        if facing != self.facing {
            self.facing = facing;
            host.set_facing(self.id, facing);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::FiredTimer;

    const ID: EntityId = EntityId(1);

    /// Drives one fired timer back into the enemy, the way the world does.
    fn route(enemy: &mut EnemyBehavior, scheduler: &mut TimerScheduler, fired: &FiredTimer) {
        assert_eq!(fired.entity, ID);
        match fired.event {
            TimerEvent::EndPatrolLeg => enemy.end_of_leg(scheduler),
            TimerEvent::ResumePatrol => enemy.resume_patrol(scheduler),
            other => panic!("unexpected timer event {:?}", other),
        }
    }

    fn step(enemy: &mut EnemyBehavior, scheduler: &mut TimerScheduler, delta: f32) {
        for fired in scheduler.advance(delta) {
            route(enemy, scheduler, &fired);
        }
    }

    #[test]
    fn test_policy_presets() {
        let patroller = EnemyPolicy::patroller();
        assert_eq!(patroller.patrols_before_idle, 2);
        assert!(!patroller.has_sight_perception);
        assert!(!patroller.has_contact_attack);

        assert!(EnemyPolicy::sight_patroller().has_sight_perception);

        let guard = EnemyPolicy::melee_guard();
        assert!(guard.has_contact_attack);
        assert_eq!(guard.walk_duration, 2.2);
    }

    #[test]
    fn test_patrol_two_legs_then_idle_net_direction_unchanged() {
        let mut scheduler = TimerScheduler::new();
        let mut enemy = EnemyBehavior::new(ID, EnemyPolicy::patroller());
        enemy.start(&mut scheduler);

        assert_eq!(enemy.mode(), EnemyMode::Patrolling);
        assert_eq!(enemy.walk_direction(), 1.0);

        // First leg ends: one flip, still patrolling
        step(&mut enemy, &mut scheduler, 2.0);
        assert_eq!(enemy.mode(), EnemyMode::Patrolling);
        assert_eq!(enemy.walk_direction(), -1.0);

        // Second leg ends: second flip (net unchanged) and a rest
        step(&mut enemy, &mut scheduler, 2.0);
        assert_eq!(enemy.mode(), EnemyMode::Idling);
        assert_eq!(enemy.walk_direction(), 1.0);
    }

    #[test]
    fn test_resume_after_idle_turns_and_walks() {
        let mut scheduler = TimerScheduler::new();
        let mut enemy = EnemyBehavior::new(ID, EnemyPolicy::patroller());
        enemy.start(&mut scheduler);

        step(&mut enemy, &mut scheduler, 2.0);
        step(&mut enemy, &mut scheduler, 2.0);
        assert_eq!(enemy.mode(), EnemyMode::Idling);

        step(&mut enemy, &mut scheduler, 1.5);
        assert_eq!(enemy.mode(), EnemyMode::Patrolling);
        assert_eq!(enemy.walk_direction(), -1.0);
        // A fresh leg timer is armed
        assert_eq!(
            scheduler.remaining_slot(ID, TimerSlot::Patrol),
            Some(2.0)
        );
    }

    #[test]
    fn test_nested_sight_volumes_share_one_counter() {
        let mut scheduler = TimerScheduler::new();
        let mut enemy = EnemyBehavior::new(ID, EnemyPolicy::sight_patroller());
        enemy.start(&mut scheduler);

        // Walk half a leg, then the player enters the outer box
        assert!(scheduler.advance(0.5).is_empty());
        enemy.sight_overlap_begin(&mut scheduler);
        assert_eq!(enemy.mode(), EnemyMode::Aggroed);
        assert_eq!(enemy.sight_overlaps(), 1);

        // Inner box too: 1 -> 2
        enemy.sight_overlap_begin(&mut scheduler);
        assert_eq!(enemy.sight_overlaps(), 2);

        // Leaving the outer box must not clear the aggro: 2 -> 1
        enemy.sight_overlap_end(&mut scheduler);
        assert_eq!(enemy.mode(), EnemyMode::Aggroed);
        assert_eq!(enemy.sight_overlaps(), 1);

        // The paused leg timer accumulated nothing while aggroed
        scheduler.advance(30.0);
        assert_eq!(
            scheduler.remaining_slot(ID, TimerSlot::Patrol),
            Some(1.5)
        );

        // Leaving the inner box clears it: 1 -> 0, patrol resumes
        enemy.sight_overlap_end(&mut scheduler);
        assert_eq!(enemy.mode(), EnemyMode::Patrolling);
        assert_eq!(
            scheduler.remaining_slot(ID, TimerSlot::Patrol),
            Some(1.5)
        );

        // The interrupted leg completes its original total duration
        assert!(scheduler.advance(1.0).is_empty());
        let fired = scheduler.advance(0.5);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].event, TimerEvent::EndPatrolLeg);
    }

    #[test]
    fn test_aggro_during_idle_restores_idle() {
        let mut scheduler = TimerScheduler::new();
        let mut enemy = EnemyBehavior::new(ID, EnemyPolicy::sight_patroller());
        enemy.start(&mut scheduler);

        step(&mut enemy, &mut scheduler, 2.0);
        step(&mut enemy, &mut scheduler, 2.0);
        assert_eq!(enemy.mode(), EnemyMode::Idling);

        enemy.sight_overlap_begin(&mut scheduler);
        assert_eq!(enemy.mode(), EnemyMode::Aggroed);

        enemy.sight_overlap_end(&mut scheduler);
        assert_eq!(enemy.mode(), EnemyMode::Idling);

        // The rest still ends and patrol resumes
        step(&mut enemy, &mut scheduler, 1.5);
        assert_eq!(enemy.mode(), EnemyMode::Patrolling);
    }

    #[test]
    fn test_sight_events_ignored_without_perception() {
        let mut scheduler = TimerScheduler::new();
        let mut enemy = EnemyBehavior::new(ID, EnemyPolicy::patroller());
        enemy.start(&mut scheduler);

        enemy.sight_overlap_begin(&mut scheduler);
        assert_eq!(enemy.mode(), EnemyMode::Patrolling);
        assert_eq!(enemy.sight_overlaps(), 0);
    }

    #[test]
    fn test_overlap_end_floors_at_zero() {
        let mut scheduler = TimerScheduler::new();
        let mut enemy = EnemyBehavior::new(ID, EnemyPolicy::sight_patroller());
        enemy.start(&mut scheduler);

        enemy.sight_overlap_end(&mut scheduler);
        assert_eq!(enemy.sight_overlaps(), 0);
        assert_eq!(enemy.mode(), EnemyMode::Patrolling);
    }

    #[test]
    fn test_guard_flip_skipped_while_player_in_range() {
        let mut scheduler = TimerScheduler::new();
        let mut enemy = EnemyBehavior::new(ID, EnemyPolicy::melee_guard());
        enemy.start(&mut scheduler);

        let fired = scheduler.advance(2.2);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].event, TimerEvent::GuardFlip);

        // Player in range: no flip, the interval just restarts
        enemy.guard_flip(&mut scheduler, true);
        assert_eq!(enemy.walk_direction(), 1.0);
        assert_eq!(
            scheduler.remaining_slot(ID, TimerSlot::Patrol),
            Some(2.2)
        );

        // Player gone: flip, then settle before the next interval
        let fired = scheduler.advance(2.2);
        enemy.guard_flip(&mut scheduler, false);
        assert_eq!(fired[0].event, TimerEvent::GuardFlip);
        assert_eq!(enemy.walk_direction(), -1.0);

        let fired = scheduler.advance(0.5);
        assert_eq!(fired[0].event, TimerEvent::GuardSettle);
        enemy.guard_settled(&mut scheduler);
        assert_eq!(
            scheduler.remaining_slot(ID, TimerSlot::Patrol),
            Some(2.2)
        );
    }
}
