//! The simulation world: entity roster, timer dispatch, damage resolution.
//!
//! `World` owns the player, the enemy roster, and the timer scheduler, and
//! drives one behavior step per frame. The order inside a step is fixed:
//!
//! 1. the scheduler fires due timers and the world routes them,
//! 2. the once-per-tick death check runs on the post-timer state,
//! 3. the state machines update and read the resulting state.
//!
//! Fired timers are routed by entity id with a liveness check; a timer
//! whose entity has despawned dispatches to nobody and is a guaranteed
//! no-op. Damage Resolution lives here too, because the world is the only
//! place that can reach every health tracker.

use crate::combat::{self, DamageEvent, DamageKind, DamageSource};
use crate::enemy::{DESPAWN_DELAY, EnemyBehavior, EnemyPolicy};
use crate::engine::Host;
use crate::entity::{EntityId, EntityRef, VolumeKind};
use crate::health::DamageResult;
use crate::player::{PlayerCombat, PlayerConfig};
use crate::timer::{FiredTimer, TimerEvent, TimerScheduler};
use log::{debug, trace};

/// The simulation world. The host constructs one, spawns entities into it,
/// forwards input edges and overlap notifications, and calls
/// [`update`](World::update) once per frame.
pub struct World {
    pub scheduler: TimerScheduler,
    pub player: PlayerCombat,
    enemies: Vec<EnemyBehavior>,
    next_id: u64,
}

impl World {
    pub fn new(player_config: PlayerConfig) -> Self {
        World {
            scheduler: TimerScheduler::new(),
            player: PlayerCombat::new(EntityId(0), player_config),
            enemies: Vec::new(),
            next_id: 1,
        }
    }

    /// Spawns an enemy with the given behavior policy and arms its first
    /// movement timer.
    pub fn spawn_enemy(&mut self, policy: EnemyPolicy) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;

        let mut enemy = EnemyBehavior::new(id, policy);
        enemy.start(&mut self.scheduler);
        self.enemies.push(enemy);
        debug!("spawned enemy {:?}", id);
        id
    }

    pub fn enemy(&self, id: EntityId) -> Option<&EnemyBehavior> {
        self.enemies.iter().find(|enemy| enemy.id == id)
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    /// Input edge: melee attack pressed.
    pub fn player_melee_input<H: Host>(&mut self, host: &mut H) {
        self.player.on_melee_input(host, &mut self.scheduler);
    }

    /// Input edge: ranged attack pressed.
    pub fn player_ranged_input<H: Host>(&mut self, host: &mut H) {
        self.player.on_ranged_input(host);
    }

    /// Directional input axis for this frame.
    pub fn player_move_input<H: Host>(&mut self, host: &mut H, axis: f32) {
        self.player.on_move_input(host, axis);
    }

    /// Edge-triggered: `other` began overlapping one of `enemy`'s sight
    /// volumes. Only the player registers on enemy perception.
    pub fn sight_overlap_begin(&mut self, enemy: EntityId, volume: VolumeKind, other: EntityRef) {
        if !other.is_player() {
            return;
        }
        trace!("sight begin {:?} on {:?}/{:?}", other.id, enemy, volume);
        let scheduler = &mut self.scheduler;
        if let Some(enemy) = self.enemies.iter_mut().find(|e| e.id == enemy) {
            enemy.sight_overlap_begin(scheduler);
        }
    }

    /// Edge-triggered: `other` stopped overlapping one of `enemy`'s sight
    /// volumes.
    pub fn sight_overlap_end(&mut self, enemy: EntityId, volume: VolumeKind, other: EntityRef) {
        if !other.is_player() {
            return;
        }
        trace!("sight end {:?} on {:?}/{:?}", other.id, enemy, volume);
        let scheduler = &mut self.scheduler;
        if let Some(enemy) = self.enemies.iter_mut().find(|e| e.id == enemy) {
            enemy.sight_overlap_end(scheduler);
        }
    }

    /// Edge-triggered: `other` entered `enemy`'s attack volume. Starts the
    /// contact swing loop on guards.
    pub fn attack_overlap_begin<H: Host>(
        &mut self,
        host: &mut H,
        enemy: EntityId,
        other: EntityRef,
    ) {
        if !other.is_player() {
            return;
        }
        let scheduler = &mut self.scheduler;
        if let Some(enemy) = self.enemies.iter_mut().find(|e| e.id == enemy) {
            enemy.start_contact_swing(host, scheduler);
        }
    }

    /// One simulation step.
    pub fn update<H: Host>(&mut self, host: &mut H, delta: f32) {
        // Timers fire first; the state machines below read the result.
        let fired = self.scheduler.advance(delta);
        for timer in fired {
            self.dispatch(host, timer);
        }

        // Death check, once per tick, outside of apply_damage.
        self.check_deaths(host);

        self.player.update(host);
        for enemy in self.enemies.iter_mut() {
            enemy.update(host);
        }
    }

    /// Damage Resolution: scans the attack volume, picks at most one
    /// eligible live target, and applies the damage to its health tracker.
    ///
    /// Returns the damaged entity, or `None` if nothing eligible overlapped,
    /// a normal outcome with no side effect, not an error. Idempotence
    /// per attack window is the caller's job; by the time this runs the
    /// attacker's hit-window used-flag has already been consumed.
    pub fn resolve_attack<H: Host>(
        &mut self,
        host: &mut H,
        attacker: EntityId,
        volume: VolumeKind,
        amount: i32,
        kind: DamageKind,
    ) -> Option<EntityId> {
        let overlaps = host.overlapping_entities(attacker, volume);
        let attacker_is_player = attacker == self.player.id;

        let target = {
            let enemies = &self.enemies;
            let player = &self.player;
            combat::select_target(&overlaps, attacker, |candidate| {
                if attacker_is_player {
                    // Dead enemies no longer participate in damage
                    candidate.is_enemy()
                        && enemies.iter().any(|e| e.id == candidate.id && !e.is_dead())
                } else {
                    candidate.is_player() && !player.is_dead()
                }
            })
        }?;

        let source = if attacker_is_player {
            DamageSource::Player
        } else {
            DamageSource::Enemy
        };
        let event = DamageEvent {
            amount,
            kind,
            source,
        };
        debug!("{:?} hits {:?} for {}", attacker, target, amount);
        self.apply_damage(host, target, &event);
        Some(target)
    }

    /// Applies a damage event to an entity's health tracker.
    ///
    /// Also the entry point for host-side attackers (projectile impacts).
    /// The death transition does *not* happen here; health reaching zero is
    /// observed by the per-tick death check, so no machine changes state in
    /// the middle of a dispatch.
    pub fn apply_damage<H: Host>(
        &mut self,
        host: &mut H,
        target: EntityId,
        event: &DamageEvent,
    ) -> DamageResult {
        if target == self.player.id {
            let result = self.player.health.apply_damage(event.amount);
            debug!(
                "player took {} {:?} damage, {} left",
                result.damage_dealt,
                event.kind,
                self.player.health.current()
            );
            if !result.is_fatal && result.damage_dealt > 0 {
                self.player.on_damaged(host, &mut self.scheduler);
            }
            result
        } else if let Some(enemy) = self.enemies.iter_mut().find(|e| e.id == target) {
            let result = enemy.health.apply_damage(event.amount);
            debug!(
                "enemy {:?} took {} damage, {} left",
                target,
                result.damage_dealt,
                enemy.health.current()
            );
            result
        } else {
            DamageResult::no_damage()
        }
    }

    /// Removes an entity from the simulation. Its timers are cancelled
    /// first, so nothing armed for it can ever fire.
    pub fn destroy_entity<H: Host>(&mut self, host: &mut H, id: EntityId) {
        self.scheduler.cancel_all(id);
        let before = self.enemies.len();
        self.enemies.retain(|enemy| enemy.id != id);
        if self.enemies.len() != before {
            debug!("despawned enemy {:?}", id);
            host.destroy_entity(id);
        }
    }

    /// Routes one fired timer to its owning entity. A timer for an entity
    /// that no longer exists matches nobody here, so the stale fire is a
    /// no-op by construction.
    fn dispatch<H: Host>(&mut self, host: &mut H, timer: FiredTimer) {
        match timer.event {
            TimerEvent::EndSwing => {
                if timer.entity == self.player.id {
                    self.player.end_swing(host);
                }
            }
            TimerEvent::MeleeHitCheck => {
                if timer.entity == self.player.id && self.player.take_hit_window() {
                    let damage = self.player.config().melee_damage;
                    self.resolve_attack(
                        host,
                        timer.entity,
                        VolumeKind::MeleeStrike,
                        damage,
                        DamageKind::Melee,
                    );
                }
            }
            TimerEvent::HurtRecovered => {
                if timer.entity == self.player.id {
                    self.player.hurt_recovered();
                }
            }
            TimerEvent::EndPatrolLeg => {
                let scheduler = &mut self.scheduler;
                if let Some(enemy) = self.enemies.iter_mut().find(|e| e.id == timer.entity) {
                    enemy.end_of_leg(scheduler);
                }
            }
            TimerEvent::ResumePatrol => {
                let scheduler = &mut self.scheduler;
                if let Some(enemy) = self.enemies.iter_mut().find(|e| e.id == timer.entity) {
                    enemy.resume_patrol(scheduler);
                }
            }
            TimerEvent::GuardFlip => {
                let player_in_range = self.player_in_attack_range(host, timer.entity);
                let scheduler = &mut self.scheduler;
                if let Some(enemy) = self.enemies.iter_mut().find(|e| e.id == timer.entity) {
                    enemy.guard_flip(scheduler, player_in_range);
                }
            }
            TimerEvent::GuardSettle => {
                let scheduler = &mut self.scheduler;
                if let Some(enemy) = self.enemies.iter_mut().find(|e| e.id == timer.entity) {
                    enemy.guard_settled(scheduler);
                }
            }
            TimerEvent::GuardSwingEnd => {
                // The swing connects at the end of the wind-up: at most one
                // application per swing, then re-trigger while in range.
                let swing = self
                    .enemies
                    .iter()
                    .find(|e| e.id == timer.entity)
                    .filter(|e| e.is_attacking() && !e.is_dead())
                    .map(|e| e.policy().contact_damage);
                if let Some(contact_damage) = swing {
                    self.resolve_attack(
                        host,
                        timer.entity,
                        VolumeKind::Attack,
                        contact_damage,
                        DamageKind::Melee,
                    );
                    let still_in_range = self.player_in_attack_range(host, timer.entity);
                    let scheduler = &mut self.scheduler;
                    if let Some(enemy) = self.enemies.iter_mut().find(|e| e.id == timer.entity) {
                        enemy.end_contact_swing(host, scheduler, still_in_range);
                    }
                }
            }
            TimerEvent::Despawn => {
                self.destroy_entity(host, timer.entity);
            }
        }
    }

    /// True when the player currently overlaps the enemy's attack volume.
    fn player_in_attack_range<H: Host>(&self, host: &H, enemy: EntityId) -> bool {
        host.overlapping_entities(enemy, VolumeKind::Attack)
            .iter()
            .any(|entity| entity.is_player())
    }

    /// Once-per-tick death check. Health hitting zero is observed here, not
    /// inside apply_damage, so a machine never changes state re-entrantly
    /// mid-dispatch.
    fn check_deaths<H: Host>(&mut self, host: &mut H) {
        if self.player.health.is_dead() && !self.player.is_dead() {
            self.player.enter_dead(host, &mut self.scheduler);
        }

        let scheduler = &mut self.scheduler;
        for enemy in self.enemies.iter_mut() {
            if enemy.health.is_dead() && !enemy.is_dead() {
                enemy.enter_dead(host, scheduler, DESPAWN_DELAY);
            }
        }
    }
}
