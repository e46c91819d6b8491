use std::f32::consts::TAU;

use delve_core::{Direction, EnemyKind};
use delve_system_collision::move_bounce;
use glam::Vec2;
use rand::{Rng, RngCore};

use crate::{heading, ActorEvent, Animation, Enemy, Senses, Vitals};

const SIZE: f32 = 22.0;
const MAX_HP: u32 = 10;
const SPEED: f32 = 240.0;

const REST_TIME: f32 = 3.0;
const WINDUP_TIME: f32 = 0.30;
const ROLL_TIME: f32 = 15.0;
const AIM_JITTER: f32 = 0.35;
const BOUNCE_JITTER: f32 = 0.25;

const CONTACT_DAMAGE: u32 = 1;
const CONTACT_COOLDOWN: f32 = 0.35;

/// Phase of the roller's rest, wind-up and roll cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RollerPhase {
    /// Sitting still.
    Rest,
    /// Curling up before a roll.
    Windup,
    /// Rolling at constant speed and bouncing off obstacles.
    Roll,
}

/// Enemy that periodically rolls toward the player and ricochets off walls.
#[derive(Clone, Debug, PartialEq)]
pub struct Roller {
    vitals: Vitals,
    phase: RollerPhase,
    phase_timer: f32,
    heading: Vec2,
    velocity: Vec2,
    contact_cooldown: f32,
    facing: Direction,
    idle: Animation,
    windup: Animation,
    roll: Animation,
}

impl Roller {
    /// Creates a resting roller with a short randomised first rest.
    #[must_use]
    pub fn new(center: Vec2, rng: &mut dyn RngCore) -> Self {
        Self {
            vitals: Vitals::new(center, Vec2::splat(SIZE), MAX_HP),
            phase: RollerPhase::Rest,
            phase_timer: rng.gen_range(0.2..0.6),
            heading: random_heading(rng),
            velocity: Vec2::ZERO,
            contact_cooldown: 0.0,
            facing: Direction::South,
            idle: Animation::new(8, 6.0),
            windup: Animation::new(4, 12.0),
            roll: Animation::new(4, 14.0),
        }
    }

    /// Current phase of the cycle.
    #[must_use]
    pub const fn phase(&self) -> RollerPhase {
        self.phase
    }

    /// Velocity chosen for this tick.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn enter(&mut self, phase: RollerPhase, duration: f32) {
        self.phase = phase;
        self.phase_timer = duration;
        self.clip_mut().reset();
    }

    fn clip(&self) -> &Animation {
        match self.phase {
            RollerPhase::Rest => &self.idle,
            RollerPhase::Windup => &self.windup,
            RollerPhase::Roll => &self.roll,
        }
    }

    fn clip_mut(&mut self) -> &mut Animation {
        match self.phase {
            RollerPhase::Rest => &mut self.idle,
            RollerPhase::Windup => &mut self.windup,
            RollerPhase::Roll => &mut self.roll,
        }
    }
}

impl Enemy for Roller {
    fn kind(&self) -> EnemyKind {
        EnemyKind::Roller
    }

    fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }

    fn facing(&self) -> Direction {
        self.facing
    }

    fn frame(&self) -> usize {
        self.clip().frame()
    }

    fn attacking(&self) -> bool {
        self.phase == RollerPhase::Roll
    }

    fn sense(&mut self, dt: f32, _senses: &Senses<'_>) {
        self.contact_cooldown = (self.contact_cooldown - dt).max(0.0);
    }

    fn think(&mut self, dt: f32, senses: &Senses<'_>, rng: &mut dyn RngCore) {
        self.phase_timer -= dt;
        let expired = self.phase_timer <= 0.0;

        match self.phase {
            RollerPhase::Rest => {
                self.velocity = Vec2::ZERO;
                if expired {
                    self.enter(RollerPhase::Windup, WINDUP_TIME);
                }
            }
            RollerPhase::Windup => {
                self.velocity = Vec2::ZERO;
                if expired {
                    let toward = heading(self.vitals.rect.center(), senses.player.center());
                    self.heading = if toward == Vec2::ZERO {
                        random_heading(rng)
                    } else {
                        jitter(toward, AIM_JITTER, rng)
                    };
                    self.velocity = self.heading * SPEED;
                    self.enter(RollerPhase::Roll, ROLL_TIME);
                }
            }
            RollerPhase::Roll => {
                self.velocity = self.heading * SPEED;
                if expired {
                    self.enter(RollerPhase::Rest, REST_TIME);
                }
            }
        }
    }

    fn move_body(&mut self, dt: f32, senses: &Senses<'_>, rng: &mut dyn RngCore) {
        if self.velocity == Vec2::ZERO {
            return;
        }
        let bounce = move_bounce(&senses.arena, self.vitals.rect, self.velocity, dt);
        self.vitals.rect = bounce.rect;
        if bounce.bounced {
            self.heading = jitter(bounce.velocity.normalize_or_zero(), BOUNCE_JITTER, rng);
            self.velocity = self.heading * SPEED;
        }
        if let Some(facing) = Direction::from_vector(self.velocity) {
            self.facing = facing;
        }
    }

    fn act(&mut self, senses: &Senses<'_>) -> Option<ActorEvent> {
        if self.phase != RollerPhase::Roll
            || self.contact_cooldown > 0.0
            || !self.vitals.rect.intersects(&senses.player)
        {
            return None;
        }
        self.contact_cooldown = CONTACT_COOLDOWN;
        Some(ActorEvent::HitPlayer {
            damage: CONTACT_DAMAGE,
        })
    }

    fn animate(&mut self, dt: f32) {
        self.clip_mut().update(dt);
    }
}

fn random_heading(rng: &mut dyn RngCore) -> Vec2 {
    Vec2::from_angle(rng.gen_range(0.0..TAU))
}

fn jitter(direction: Vec2, spread: f32, rng: &mut dyn RngCore) -> Vec2 {
    Vec2::from_angle(rng.gen_range(-spread..=spread)).rotate(direction)
}
