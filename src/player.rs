use crate::combat::ProjectileKind;
use crate::config::ConfigError;
use crate::engine::{Host, VisualState};
use crate::entity::{EntityId, Facing};
use crate::health::Health;
use crate::timer::{TimerEvent, TimerScheduler, TimerSlot};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable combat timings and amounts for the player character.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// How long one melee swing locks the character, in seconds.
    pub swing_duration: f32,
    /// Delay from swing start to the hit-window damage check, in seconds.
    pub hit_check_delay: f32,
    /// Damage applied by one connecting melee swing.
    pub melee_damage: i32,
    /// How long the hurt flinch lasts, in seconds.
    pub hurt_duration: f32,
    /// Maximum hit points.
    pub max_health: i32,
    /// How far in front of the character projectiles spawn, in world units.
    pub projectile_offset: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            swing_duration: 0.6,
            hit_check_delay: 0.3,
            melee_damage: 300,
            hurt_duration: 0.35,
            max_health: 1000,
            projectile_offset: 40.0,
        }
    }
}

impl PlayerConfig {
    /// Loads player tuning from a JSON file. Missing fields keep their
    /// defaults.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        crate::config::load_from_file(path)
    }
}

/// Player action states.
///
/// `MeleeAttacking` carries the hit window: `hit_window_open` is whether the
/// mid-swing damage check is still pending, and `hit_used` latches once the
/// swing has dealt its damage so one swing can never land twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    Idle,
    Moving,
    Airborne,
    MeleeAttacking {
        hit_window_open: bool,
        hit_used: bool,
    },
    RangedAttacking,
    Hurt,
    Dead,
}

/// The player character's combat state machine.
///
/// Timer-driven states (melee swing, hurt flinch) are entered here and left
/// when the world routes the matching [`TimerEvent`] back in. Everything
/// else (idle, moving, airborne) is re-derived from the movement
/// collaborator every update.
pub struct PlayerCombat {
    pub id: EntityId,
    pub facing: Facing,
    pub health: Health,
    state: ActionState,
    config: PlayerConfig,
}

impl PlayerCombat {
    pub fn new(id: EntityId, config: PlayerConfig) -> Self {
        PlayerCombat {
            id,
            facing: Facing::default(),
            health: Health::new(config.max_health),
            state: ActionState::Idle,
            config,
        }
    }

    pub fn state(&self) -> ActionState {
        self.state
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn is_dead(&self) -> bool {
        self.state == ActionState::Dead
    }

    pub fn is_attacking(&self) -> bool {
        matches!(self.state, ActionState::MeleeAttacking { .. })
    }

    /// Forwards directional input to the movement collaborator.
    ///
    /// Always forwarded; whether it moves anything is the movement
    /// component's decision (a locked character absorbs the input).
    pub fn on_move_input<H: Host>(&mut self, host: &mut H, axis: f32) {
        host.apply_directional_input(self.id, axis);
    }

    /// Melee input edge. Ignored while already attacking, airborne, hurt, or
    /// dead; an invalid request is a guard outcome, not an error.
    ///
    /// On entry: movement locks, the hit window opens, and two timers arm:
    /// the swing duration and the mid-swing hit check.
    pub fn on_melee_input<H: Host>(&mut self, host: &mut H, scheduler: &mut TimerScheduler) {
        match self.state {
            ActionState::MeleeAttacking { .. } | ActionState::Hurt | ActionState::Dead => return,
            _ => {}
        }
        if host.is_airborne(self.id) {
            return;
        }

        debug!("player {:?} swing start", self.id);
        self.state = ActionState::MeleeAttacking {
            hit_window_open: true,
            hit_used: false,
        };
        host.lock_movement(self.id);
        host.set_visual_state(self.id, VisualState::Melee);
        scheduler.arm(
            self.id,
            TimerSlot::Swing,
            TimerEvent::EndSwing,
            self.config.swing_duration,
        );
        scheduler.arm(
            self.id,
            TimerSlot::HitCheck,
            TimerEvent::MeleeHitCheck,
            self.config.hit_check_delay,
        );
    }

    /// Ranged input edge: spawns one projectile in front of the character
    /// and returns to the prior state within the same call. Never locks
    /// movement, allowed from any live state.
    pub fn on_ranged_input<H: Host>(&mut self, host: &mut H) {
        if self.state == ActionState::Dead {
            return;
        }

        let prior = std::mem::replace(&mut self.state, ActionState::RangedAttacking);
        let (x, y) = host.position(self.id);
        let spawn = (x + self.facing.sign() * self.config.projectile_offset, y);
        host.spawn_projectile(ProjectileKind::Bullet, spawn, self.facing);
        host.set_visual_state(self.id, VisualState::Ranged);
        self.state = prior;
    }

    /// Consumes the melee hit window.
    ///
    /// Returns `true` exactly once per swing, when the window is open and
    /// unused, telling the caller to resolve damage now. The used-flag is
    /// what keeps a swing from registering two hits even if the check runs
    /// again.
    pub fn take_hit_window(&mut self) -> bool {
        if let ActionState::MeleeAttacking {
            hit_window_open,
            hit_used,
        } = &mut self.state
        {
            if *hit_window_open && !*hit_used {
                *hit_window_open = false;
                *hit_used = true;
                return true;
            }
        }
        false
    }

    /// Swing timer fired: unlock movement and fall back to idle; the next
    /// update re-derives idle/moving from current velocity.
    pub fn end_swing<H: Host>(&mut self, host: &mut H) {
        if !self.is_attacking() {
            return;
        }
        debug!("player {:?} swing end", self.id);
        host.unlock_movement(self.id);
        self.state = ActionState::Idle;
    }

    /// Non-fatal damage response: a brief hurt flinch.
    ///
    /// Entering hurt interrupts a melee swing in progress: the swing and
    /// hit-check timers are cancelled and movement unlocks, so the flinch
    /// can't leave the character stuck locked.
    pub fn on_damaged<H: Host>(&mut self, host: &mut H, scheduler: &mut TimerScheduler) {
        match self.state {
            ActionState::Dead | ActionState::Hurt => return,
            ActionState::MeleeAttacking { .. } => {
                scheduler.cancel_slot(self.id, TimerSlot::Swing);
                scheduler.cancel_slot(self.id, TimerSlot::HitCheck);
                host.unlock_movement(self.id);
            }
            _ => {}
        }

        debug!("player {:?} hurt", self.id);
        self.state = ActionState::Hurt;
        host.set_visual_state(self.id, VisualState::Hurt);
        scheduler.arm(
            self.id,
            TimerSlot::HurtRecover,
            TimerEvent::HurtRecovered,
            self.config.hurt_duration,
        );
    }

    /// Hurt-recovery timer fired: back to idle; the next update re-derives
    /// the real state.
    pub fn hurt_recovered(&mut self) {
        if self.state == ActionState::Hurt {
            self.state = ActionState::Idle;
        }
    }

    /// Death entry. Terminal: movement locks, every armed timer is
    /// cancelled, world collision turns off. No transition leaves `Dead`.
    pub fn enter_dead<H: Host>(&mut self, host: &mut H, scheduler: &mut TimerScheduler) {
        if self.state == ActionState::Dead {
            return;
        }
        debug!("player {:?} died", self.id);
        self.state = ActionState::Dead;
        scheduler.cancel_all(self.id);
        host.lock_movement(self.id);
        host.set_collision_enabled(self.id, false);
        host.set_visual_state(self.id, VisualState::Dead);
    }

    /// Per-frame update.
    ///
    /// Timer-driven states hold until their transition fires. Otherwise the
    /// state is re-derived from the movement collaborator: falling wins over
    /// walking, walking over idling, the same priority the animations use.
    /// Facing follows the sign of horizontal travel velocity.
    pub fn update<H: Host>(&mut self, host: &mut H) {
        match self.state {
            ActionState::Dead => return,
            ActionState::MeleeAttacking { .. } => {
                host.set_visual_state(self.id, VisualState::Melee);
                return;
            }
            ActionState::Hurt => {
                host.set_visual_state(self.id, VisualState::Hurt);
                return;
            }
            _ => {}
        }

        let velocity_x = host.velocity_x(self.id);
        if velocity_x < 0.0 {
            self.set_facing(host, Facing::Left);
        } else if velocity_x > 0.0 {
            self.set_facing(host, Facing::Right);
        }

        self.state = if host.is_airborne(self.id) {
            host.set_visual_state(self.id, VisualState::Jump);
            ActionState::Airborne
        } else if velocity_x != 0.0 {
            host.set_visual_state(self.id, VisualState::Walk);
            ActionState::Moving
        } else {
            host.set_visual_state(self.id, VisualState::Idle);
            ActionState::Idle
        };
    }

    fn set_facing<H: Host>(&mut self, host: &mut H, facing: Facing) {
        if self.facing != facing {
            self.facing = facing;
            host.set_facing(self.id, facing);
        }
    }
}
