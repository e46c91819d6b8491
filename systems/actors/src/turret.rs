use delve_core::{Direction, EnemyKind};
use glam::Vec2;
use rand::RngCore;

use crate::{ActorEvent, Enemy, Projectile, ProjectileOwner, Senses, Vitals};

const SIZE: f32 = 24.0;
const MAX_HP: u32 = 6;

const SEQUENCE_FRAMES: usize = 8;
const SEQUENCE_FPS: f32 = 8.0;
const SHOT_FRAME: usize = 2;
const SPIT_COOLDOWN: f32 = 1.25;

const SEED_SIZE: f32 = 8.0;
const SEED_SPEED: f32 = 230.0;
const SEED_TTL: f32 = 2.0;
const SEED_DAMAGE: u32 = 1;

const CONTACT_DAMAGE: u32 = 1;
const CONTACT_COOLDOWN: f32 = 0.40;

/// Stationary plant that spits seeds along a fixed facing.
#[derive(Clone, Debug, PartialEq)]
pub struct Turret {
    vitals: Vitals,
    facing: Direction,
    spit_cooldown: f32,
    contact_cooldown: f32,
    sequence: Option<f32>,
    fired_this_sequence: bool,
    pending_shot: bool,
    frame: usize,
}

impl Turret {
    /// Creates a turret facing `facing`, ready to start its first sequence.
    #[must_use]
    pub fn new(center: Vec2, facing: Direction) -> Self {
        Self {
            vitals: Vitals::new(center, Vec2::splat(SIZE), MAX_HP),
            facing,
            spit_cooldown: 0.0,
            contact_cooldown: 0.0,
            sequence: None,
            fired_this_sequence: false,
            pending_shot: false,
            frame: 0,
        }
    }

    fn seed(&self) -> Projectile {
        Projectile::new(
            self.vitals.rect.center(),
            Vec2::splat(SEED_SIZE),
            self.facing.unit() * SEED_SPEED,
            SEED_TTL,
            SEED_DAMAGE,
            ProjectileOwner::Enemy(EnemyKind::Turret),
        )
    }
}

impl Enemy for Turret {
    fn kind(&self) -> EnemyKind {
        EnemyKind::Turret
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
        self.frame
    }

    fn pushable(&self) -> bool {
        false
    }

    fn attacking(&self) -> bool {
        self.sequence.is_some()
    }

    fn sense(&mut self, dt: f32, _senses: &Senses<'_>) {
        self.spit_cooldown = (self.spit_cooldown - dt).max(0.0);
        self.contact_cooldown = (self.contact_cooldown - dt).max(0.0);
    }

    fn think(&mut self, dt: f32, _senses: &Senses<'_>, _rng: &mut dyn RngCore) {
        let Some(elapsed) = self.sequence else {
            if self.spit_cooldown <= 0.0 {
                self.sequence = Some(0.0);
                self.fired_this_sequence = false;
            }
            return;
        };

        let elapsed = elapsed + dt;
        let frame = ((elapsed * SEQUENCE_FPS) as usize).min(SEQUENCE_FRAMES - 1);
        if !self.fired_this_sequence && frame >= SHOT_FRAME {
            self.fired_this_sequence = true;
            self.pending_shot = true;
        }
        if frame == SEQUENCE_FRAMES - 1 {
            self.sequence = None;
            self.spit_cooldown = SPIT_COOLDOWN;
        } else {
            self.sequence = Some(elapsed);
        }
    }

    fn act(&mut self, senses: &Senses<'_>) -> Option<ActorEvent> {
        if self.contact_cooldown <= 0.0 && self.vitals.rect.intersects(&senses.player) {
            self.contact_cooldown = CONTACT_COOLDOWN;
            return Some(ActorEvent::HitPlayer {
                damage: CONTACT_DAMAGE,
            });
        }
        if self.pending_shot {
            self.pending_shot = false;
            return Some(ActorEvent::SpawnProjectile(self.seed()));
        }
        None
    }

    fn animate(&mut self, _dt: f32) {
        self.frame = self
            .sequence
            .map_or(0, |elapsed| ((elapsed * SEQUENCE_FPS) as usize).min(SEQUENCE_FRAMES - 1));
    }
}
