//! One-shot timer scheduling for time-driven behavior.
//!
//! The state machines in this crate are not pure event responders: swings
//! end on a timer, patrol legs reverse on a timer, corpses despawn on a
//! timer. All of that runs through the [`TimerScheduler`], which the world
//! advances once per simulation step, strictly before entity updates.
//!
//! Timers are plain data, not threads. Each armed timer carries a
//! [`TimerEvent`] value rather than a callback; the world routes fired
//! events to the owning entity *if it still exists*, so a timer that
//! outlives its entity is a guaranteed no-op instead of a dangling call.
//!
//! # Rust Learning Notes
//!
//! This module demonstrates:
//! - **Handle-based APIs**: callers hold an opaque `TimerHandle`; a fired or
//!   cancelled handle simply stops answering queries
//! - **Data-driven callbacks**: deferring an enum value instead of a closure
//!   sidesteps borrow-checker fights and makes stale fires inert

use crate::entity::EntityId;
use log::trace;

/// Opaque handle to an armed timer.
///
/// Handles are single-use: once the timer fires or is cancelled the handle
/// is invalid and `remaining` returns `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// Logical timer slots.
///
/// An entity keeps at most one live timer per slot; arming a slot again
/// cancels the slot's previous handle outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerSlot {
    /// A melee swing in progress (player or guard).
    Swing,
    /// The mid-swing hit window check.
    HitCheck,
    /// Patrol movement: end-of-leg, resume, flip, settle.
    Patrol,
    /// Post-hurt recovery.
    HurtRecover,
    /// Post-death removal from the simulation.
    Despawn,
}

/// What should happen when a timer fires.
///
/// The world dispatches these to the owning entity's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// The player's melee swing finished.
    EndSwing,
    /// The player's melee hit window check is due.
    MeleeHitCheck,
    /// The player's hurt flinch is over.
    HurtRecovered,
    /// A patrolling enemy reached the end of a leg.
    EndPatrolLeg,
    /// An idling enemy resumes its patrol.
    ResumePatrol,
    /// A guard enemy's direction interval elapsed.
    GuardFlip,
    /// A guard enemy's settle pause after a flip ended.
    GuardSettle,
    /// A guard enemy's contact swing finished.
    GuardSwingEnd,
    /// A dead entity leaves the simulation.
    Despawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Scheduled,
    Paused,
}

/// A fired timer, handed back from [`TimerScheduler::advance`] for dispatch.
#[derive(Debug, Clone, Copy)]
pub struct FiredTimer {
    pub entity: EntityId,
    pub event: TimerEvent,
}

struct Timer {
    handle: TimerHandle,
    entity: EntityId,
    slot: TimerSlot,
    event: TimerEvent,
    remaining: f32,
    state: TimerState,
}

/// One-shot delayed-event facility shared by every state machine.
///
/// A timer fires at the first `advance` at or after its delay has elapsed
/// while it was not paused. Pausing preserves the exact remaining time, so
/// a resumed timer completes the same total scheduled duration as if it had
/// never been interrupted.
pub struct TimerScheduler {
    timers: Vec<Timer>,
    next_handle: u64,
}

impl TimerScheduler {
    pub fn new() -> Self {
        TimerScheduler {
            timers: Vec::new(),
            next_handle: 0,
        }
    }

    /// Arms a one-shot timer for `entity` on the given slot.
    ///
    /// If the slot already holds a live timer it is cancelled, not merely
    /// superseded; its handle stops answering queries immediately.
    pub fn arm(
        &mut self,
        entity: EntityId,
        slot: TimerSlot,
        event: TimerEvent,
        delay: f32,
    ) -> TimerHandle {
        self.timers
            .retain(|timer| !(timer.entity == entity && timer.slot == slot));

        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;

        trace!("arm {:?}/{:?} -> {:?} in {}s", entity, slot, event, delay);

        self.timers.push(Timer {
            handle,
            entity,
            slot,
            event,
            remaining: delay,
            state: TimerState::Scheduled,
        });
        handle
    }

    /// Cancels a timer. The callback event is discarded with no side effect;
    /// cancelling an already-dead handle does nothing.
    pub fn cancel(&mut self, handle: TimerHandle) {
        self.timers.retain(|timer| timer.handle != handle);
    }

    /// Cancels the live timer on one of an entity's slots, if any.
    pub fn cancel_slot(&mut self, entity: EntityId, slot: TimerSlot) {
        self.timers
            .retain(|timer| !(timer.entity == entity && timer.slot == slot));
    }

    /// Cancels every timer owned by an entity. Called on death and
    /// destruction so nothing can fire for a gone entity.
    pub fn cancel_all(&mut self, entity: EntityId) {
        self.timers.retain(|timer| timer.entity != entity);
    }

    /// Pauses a scheduled timer, freezing its remaining time.
    pub fn pause(&mut self, handle: TimerHandle) {
        if let Some(timer) = self.timers.iter_mut().find(|t| t.handle == handle) {
            timer.state = TimerState::Paused;
        }
    }

    /// Resumes a paused timer with its remaining time intact, not the full
    /// original delay.
    pub fn resume(&mut self, handle: TimerHandle) {
        if let Some(timer) = self.timers.iter_mut().find(|t| t.handle == handle) {
            timer.state = TimerState::Scheduled;
        }
    }

    /// Pauses whatever live timer an entity holds on the given slot.
    pub fn pause_slot(&mut self, entity: EntityId, slot: TimerSlot) {
        if let Some(timer) = self
            .timers
            .iter_mut()
            .find(|t| t.entity == entity && t.slot == slot)
        {
            timer.state = TimerState::Paused;
        }
    }

    /// Resumes a paused slot timer, preserving its remaining time.
    pub fn resume_slot(&mut self, entity: EntityId, slot: TimerSlot) {
        if let Some(timer) = self
            .timers
            .iter_mut()
            .find(|t| t.entity == entity && t.slot == slot)
        {
            timer.state = TimerState::Scheduled;
        }
    }

    /// Seconds until the timer fires, or `None` if the handle is no longer
    /// live (fired, cancelled, or never existed).
    pub fn remaining(&self, handle: TimerHandle) -> Option<f32> {
        self.timers
            .iter()
            .find(|t| t.handle == handle)
            .map(|t| t.remaining)
    }

    /// Seconds left on an entity's slot timer, if one is live.
    pub fn remaining_slot(&self, entity: EntityId, slot: TimerSlot) -> Option<f32> {
        self.timers
            .iter()
            .find(|t| t.entity == entity && t.slot == slot)
            .map(|t| t.remaining)
    }

    /// True if the entity holds any live timer. Mostly useful in tests.
    pub fn has_timers(&self, entity: EntityId) -> bool {
        self.timers.iter().any(|t| t.entity == entity)
    }

    /// Advances simulation time and returns every timer that came due.
    ///
    /// Paused timers do not accumulate elapsed time. Fired timers are
    /// invalidated before being returned, so re-arming the slot from a
    /// dispatch handler is safe. When one coarse step makes several timers
    /// due at once they are returned most-overdue first, which keeps
    /// delivery in deadline order.
    pub fn advance(&mut self, delta: f32) -> Vec<FiredTimer> {
        for timer in self.timers.iter_mut() {
            if timer.state == TimerState::Scheduled {
                timer.remaining -= delta;
            }
        }

        let mut due = Vec::new();
        let mut kept = Vec::with_capacity(self.timers.len());
        for timer in self.timers.drain(..) {
            if timer.state == TimerState::Scheduled && timer.remaining <= 0.0 {
                due.push(timer);
            } else {
                kept.push(timer);
            }
        }
        self.timers = kept;

        due.sort_by(|a, b| {
            a.remaining
                .partial_cmp(&b.remaining)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        due.into_iter()
            .map(|timer| {
                trace!("fire {:?} -> {:?}", timer.entity, timer.event);
                FiredTimer {
                    entity: timer.entity,
                    event: timer.event,
                }
            })
            .collect()
    }
}

impl Default for TimerScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const E1: EntityId = EntityId(1);
    const E2: EntityId = EntityId(2);

    #[test]
    fn test_fires_once_at_or_after_delay() {
        let mut scheduler = TimerScheduler::new();
        scheduler.arm(E1, TimerSlot::Patrol, TimerEvent::EndPatrolLeg, 1.0);

        assert!(scheduler.advance(0.5).is_empty());

        let fired = scheduler.advance(0.5);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].entity, E1);
        assert_eq!(fired[0].event, TimerEvent::EndPatrolLeg);

        // One-shot: nothing left to fire
        assert!(scheduler.advance(10.0).is_empty());
    }

    #[test]
    fn test_remaining_counts_down() {
        let mut scheduler = TimerScheduler::new();
        let handle = scheduler.arm(E1, TimerSlot::Swing, TimerEvent::EndSwing, 2.0);

        scheduler.advance(0.5);
        assert_eq!(scheduler.remaining(handle), Some(1.5));
    }

    #[test]
    fn test_fired_handle_is_invalidated() {
        let mut scheduler = TimerScheduler::new();
        let handle = scheduler.arm(E1, TimerSlot::Swing, TimerEvent::EndSwing, 0.2);

        scheduler.advance(0.5);
        assert_eq!(scheduler.remaining(handle), None);
    }

    #[test]
    fn test_cancel_discards_without_firing() {
        let mut scheduler = TimerScheduler::new();
        let handle = scheduler.arm(E1, TimerSlot::Swing, TimerEvent::EndSwing, 0.2);

        scheduler.cancel(handle);
        assert_eq!(scheduler.remaining(handle), None);
        assert!(scheduler.advance(1.0).is_empty());
    }

    #[test]
    fn test_arming_a_slot_cancels_the_previous_handle() {
        let mut scheduler = TimerScheduler::new();
        let first = scheduler.arm(E1, TimerSlot::Patrol, TimerEvent::EndPatrolLeg, 5.0);
        let second = scheduler.arm(E1, TimerSlot::Patrol, TimerEvent::ResumePatrol, 1.0);

        // The first handle was cancelled, not superseded
        assert_eq!(scheduler.remaining(first), None);
        assert_eq!(scheduler.remaining(second), Some(1.0));

        let fired = scheduler.advance(1.0);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].event, TimerEvent::ResumePatrol);
    }

    #[test]
    fn test_same_slot_different_entities_coexist() {
        let mut scheduler = TimerScheduler::new();
        scheduler.arm(E1, TimerSlot::Patrol, TimerEvent::EndPatrolLeg, 1.0);
        scheduler.arm(E2, TimerSlot::Patrol, TimerEvent::EndPatrolLeg, 1.0);

        assert_eq!(scheduler.advance(1.0).len(), 2);
    }

    #[test]
    fn test_pause_preserves_remaining_time_exactly() {
        let mut scheduler = TimerScheduler::new();
        let handle = scheduler.arm(E1, TimerSlot::Patrol, TimerEvent::EndPatrolLeg, 2.0);

        scheduler.advance(0.5);
        scheduler.pause(handle);
        assert_eq!(scheduler.remaining(handle), Some(1.5));

        // An arbitrarily long pause accumulates nothing
        scheduler.advance(100.0);
        assert_eq!(scheduler.remaining(handle), Some(1.5));

        scheduler.resume(handle);
        assert!(scheduler.advance(1.0).is_empty());

        // Total unpaused elapsed time equals the original delay
        let fired = scheduler.advance(0.5);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].event, TimerEvent::EndPatrolLeg);
    }

    #[test]
    fn test_cancel_all_for_entity() {
        let mut scheduler = TimerScheduler::new();
        scheduler.arm(E1, TimerSlot::Swing, TimerEvent::EndSwing, 1.0);
        scheduler.arm(E1, TimerSlot::HitCheck, TimerEvent::MeleeHitCheck, 0.5);
        scheduler.arm(E2, TimerSlot::Patrol, TimerEvent::EndPatrolLeg, 1.0);

        scheduler.cancel_all(E1);
        assert!(!scheduler.has_timers(E1));
        assert!(scheduler.has_timers(E2));

        let fired = scheduler.advance(1.0);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].entity, E2);
    }

    #[test]
    fn test_coarse_step_fires_in_deadline_order() {
        let mut scheduler = TimerScheduler::new();
        // Armed swing-first, but the hit check is due earlier
        scheduler.arm(E1, TimerSlot::Swing, TimerEvent::EndSwing, 0.6);
        scheduler.arm(E1, TimerSlot::HitCheck, TimerEvent::MeleeHitCheck, 0.3);

        let fired = scheduler.advance(1.0);
        assert_eq!(fired.len(), 2);
        assert_eq!(fired[0].event, TimerEvent::MeleeHitCheck);
        assert_eq!(fired[1].event, TimerEvent::EndSwing);
    }
}
