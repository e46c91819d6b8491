#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Entity model for the player, enemy variants and projectiles.
//!
//! Every enemy runs the same fixed update order each tick: sense, think,
//! move, act and finally animate. The [`Enemy`] trait provides a no-op
//! default for each phase so variants only override the phases they use.
//! Thinking never observes post-move state and acting never touches
//! velocity, which [`update_enemy`] guarantees by construction.

mod animation;
mod chaser;
mod player;
mod projectile;
mod roller;
mod turret;

use std::fmt;

use delve_core::{Direction, EnemyKind, Rect};
use delve_system_collision::Arena;
use glam::Vec2;
use rand::RngCore;

pub use animation::{Animation, DirectionalAnimation};
pub use chaser::Chaser;
pub use player::Player;
pub use projectile::{Projectile, ProjectileOwner};
pub use roller::{Roller, RollerPhase};
pub use turret::Turret;

/// Position and health shared by every enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vitals {
    /// Collision rectangle.
    pub rect: Rect,
    /// Remaining health.
    pub hp: u32,
    /// Health at full strength.
    pub max_hp: u32,
}

impl Vitals {
    /// Creates full-health vitals for a body of `size` centred on `center`.
    #[must_use]
    pub fn new(center: Vec2, size: Vec2, max_hp: u32) -> Self {
        Self {
            rect: Rect::from_center(center, size),
            hp: max_hp,
            max_hp,
        }
    }

    /// Removes health, saturating at zero, and returns what remains.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        self.hp = self.hp.saturating_sub(amount);
        self.hp
    }

    /// Whether any health remains.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }
}

/// What an enemy can perceive during its update.
#[derive(Clone, Copy, Debug)]
pub struct Senses<'a> {
    /// Player collision rectangle at the start of the tick.
    pub player: Rect,
    /// Rectangles of the other live enemies in the same room.
    pub neighbours: &'a [Rect],
    /// Collision map including closed-door blockers.
    pub arena: Arena<'a>,
}

/// Optional outcome of an enemy's act phase.
#[derive(Clone, Debug, PartialEq)]
pub enum ActorEvent {
    /// Damage aimed at the player.
    HitPlayer {
        /// Damage dealt.
        damage: u32,
    },
    /// A projectile entering the world.
    SpawnProjectile(Projectile),
}

/// Capability set shared by every enemy variant.
pub trait Enemy: fmt::Debug {
    /// Behaviour family.
    fn kind(&self) -> EnemyKind;

    /// Position and health.
    fn vitals(&self) -> &Vitals;

    /// Mutable position and health, used by damage and soft separation.
    fn vitals_mut(&mut self) -> &mut Vitals;

    /// Direction used to pick sprites.
    fn facing(&self) -> Direction;

    /// Current logical animation frame.
    fn frame(&self) -> usize;

    /// Whether soft separation may move this enemy.
    fn pushable(&self) -> bool {
        true
    }

    /// Whether the enemy is mid-attack.
    fn attacking(&self) -> bool {
        false
    }

    /// Ticks cooldowns and reads the surroundings.
    fn sense(&mut self, _dt: f32, _senses: &Senses<'_>) {}

    /// Chooses a velocity or state for this tick.
    fn think(&mut self, _dt: f32, _senses: &Senses<'_>, _rng: &mut dyn RngCore) {}

    /// Applies the chosen velocity through collision.
    fn move_body(&mut self, _dt: f32, _senses: &Senses<'_>, _rng: &mut dyn RngCore) {}

    /// Emits at most one event after moving.
    fn act(&mut self, _senses: &Senses<'_>) -> Option<ActorEvent> {
        None
    }

    /// Advances animation clocks.
    fn animate(&mut self, _dt: f32) {}
}

/// Runs one tick of the fixed enemy update order.
pub fn update_enemy(
    enemy: &mut dyn Enemy,
    dt: f32,
    senses: &Senses<'_>,
    rng: &mut dyn RngCore,
) -> Option<ActorEvent> {
    if !enemy.vitals().is_alive() {
        return None;
    }
    enemy.sense(dt, senses);
    enemy.think(dt, senses, rng);
    enemy.move_body(dt, senses, rng);
    let event = enemy.act(senses);
    enemy.animate(dt);
    event
}

/// Creates an enemy of `kind` centred on `center`.
///
/// Only turrets use `facing`; mobile enemies derive theirs from movement.
#[must_use]
pub fn spawn_enemy(
    kind: EnemyKind,
    center: Vec2,
    facing: Direction,
    rng: &mut dyn RngCore,
) -> Box<dyn Enemy> {
    match kind {
        EnemyKind::Chaser => Box::new(Chaser::new(center, rng)),
        EnemyKind::Roller => Box::new(Roller::new(center, rng)),
        EnemyKind::Turret => Box::new(Turret::new(center, facing)),
    }
}

/// Unit vector from `from` toward `to`, or zero when they coincide.
fn heading(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}
