use std::f32::consts::FRAC_PI_4;

use delve_core::{Direction, EnemyKind, Rect};
use delve_system_collision::move_axis_separated;
use glam::Vec2;
use rand::{Rng, RngCore};

use crate::{heading, ActorEvent, Animation, DirectionalAnimation, Enemy, Senses, Vitals};

const SIZE: f32 = 24.0;
const MAX_HP: u32 = 8;
const SPEED: f32 = 110.0;

const ATTACK_RANGE: f32 = 30.0;
const ATTACK_REACH: f32 = 3.0;
const ATTACK_BREAK: f32 = 6.0;
const ATTACK_COOLDOWN: f32 = 0.80;
const SWING_TIME: f32 = 0.35;
const DAMAGE: u32 = 1;

const STANDOFF_FLEX: f32 = 4.0;
const CONTACT_SLACK: f32 = 0.5;
const HOLD_NUDGE: f32 = 0.5;
const SWING_NUDGE: f32 = 0.35;
const STRAFE: f32 = 0.4;

const PROBE_AHEAD: f32 = 16.0;
const PROBE_PAD: f32 = 2.0;
const BLOCKED_TRIGGER: f32 = 0.12;
const BLOCKED_RELEASE: f32 = 0.05;
const DETOUR_HOLD: f32 = 0.40;
const DETOUR_ARRIVAL: f32 = 6.0;
const DETOUR_PROBE: f32 = 16.0;
const OVERLAP_PENALTY: f32 = 1000.0;

const WALK_FRAMES: usize = 6;
const WALK_FPS: f32 = 10.0;
const SWING_FRAMES: usize = 6;
const SWING_FPS: f32 = 12.0;

/// Melee enemy that holds a standoff ring around the player and swings when close.
#[derive(Clone, Debug, PartialEq)]
pub struct Chaser {
    vitals: Vitals,
    velocity: Vec2,
    facing: Direction,
    attack_facing: Direction,
    attack_cooldown: f32,
    attack_timer: f32,
    orbit_sign: f32,
    blocked_timer: f32,
    detour: Option<Vec2>,
    detour_timer: f32,
    walk: DirectionalAnimation,
    swing: DirectionalAnimation,
}

impl Chaser {
    /// Creates a chaser; the strafe direction is drawn from `rng`.
    #[must_use]
    pub fn new(center: Vec2, rng: &mut dyn RngCore) -> Self {
        let orbit_sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        Self {
            vitals: Vitals::new(center, Vec2::splat(SIZE), MAX_HP),
            velocity: Vec2::ZERO,
            facing: Direction::South,
            attack_facing: Direction::South,
            attack_cooldown: 0.0,
            attack_timer: 0.0,
            orbit_sign,
            blocked_timer: 0.0,
            detour: None,
            detour_timer: 0.0,
            walk: DirectionalAnimation::uniform(
                Animation::new(WALK_FRAMES, WALK_FPS),
                Direction::South,
            ),
            swing: DirectionalAnimation::uniform(
                Animation::new(SWING_FRAMES, SWING_FPS),
                Direction::South,
            ),
        }
    }

    /// Velocity chosen by the last think phase.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Active detour waypoint, if any.
    #[must_use]
    pub const fn detour(&self) -> Option<Vec2> {
        self.detour
    }

    fn steer_toward_player(&mut self, dt: f32, senses: &Senses<'_>) -> Vec2 {
        let rect = self.vitals.rect;
        let center = rect.center();
        let player_center = senses.player.center();
        let distance = center.distance(player_center);
        let toward = heading(center, player_center);
        let mut steer = Vec2::ZERO;

        if self.attack_timer > 0.0 {
            if rect.edge_gap(&senses.player) > CONTACT_SLACK {
                steer += toward * SWING_NUDGE;
            }
            return steer;
        }

        let probe = rect.inflated(PROBE_PAD).translated(toward * PROBE_AHEAD);
        if senses.neighbours.iter().any(|other| probe.intersects(other)) {
            self.blocked_timer += dt;
        } else {
            self.blocked_timer = (self.blocked_timer - dt * 0.5).max(0.0);
        }

        match self.detour.filter(|_| self.detour_timer > 0.0) {
            Some(target) => {
                steer += heading(center, target);
                if center.distance(target) <= DETOUR_ARRIVAL
                    || self.blocked_timer <= BLOCKED_RELEASE
                {
                    self.detour = None;
                    self.detour_timer = 0.0;
                }
            }
            None => {
                if distance > ATTACK_RANGE + STANDOFF_FLEX {
                    steer += toward;
                } else if distance < ATTACK_RANGE - STANDOFF_FLEX {
                    steer -= toward;
                } else {
                    steer += toward.perp() * self.orbit_sign * STRAFE;
                    if rect.edge_gap(&senses.player) > CONTACT_SLACK {
                        steer += toward * HOLD_NUDGE;
                    }
                }

                if self.detour.is_none() && self.blocked_timer > BLOCKED_TRIGGER {
                    self.detour = Some(self.pick_detour(player_center, toward, senses.neighbours));
                    self.detour_timer = DETOUR_HOLD;
                }
            }
        }

        steer + self.separation(distance, senses.neighbours)
    }

    /// Scores the two waypoints 45 degrees either side of the approach line.
    fn pick_detour(&self, player_center: Vec2, toward: Vec2, neighbours: &[Rect]) -> Vec2 {
        let radius = (ATTACK_RANGE + 6.0).max(24.0);
        let center = self.vitals.rect.center();
        let score = |candidate: Vec2| {
            let probe = Rect::from_center(candidate, Vec2::splat(DETOUR_PROBE));
            let overlaps = neighbours.iter().filter(|other| probe.intersects(other)).count();
            overlaps as f32 * OVERLAP_PENALTY + candidate.distance_squared(center)
        };

        let left = player_center + Vec2::from_angle(FRAC_PI_4).rotate(toward) * radius;
        let right = player_center + Vec2::from_angle(-FRAC_PI_4).rotate(toward) * radius;
        if score(right) < score(left) {
            right
        } else {
            left
        }
    }

    fn separation(&self, distance_to_player: f32, neighbours: &[Rect]) -> Vec2 {
        let engaged = distance_to_player <= ATTACK_RANGE + 6.0;
        let (radius, push) = if engaged { (30.0, 0.7) } else { (28.0, 0.6) };
        let center = self.vitals.rect.center();

        neighbours
            .iter()
            .map(|other| center - other.center())
            .filter(|offset| {
                let squared = offset.length_squared();
                squared > 0.0 && squared < radius * radius
            })
            .map(|offset| offset / (offset.length() + 1e-6) * push)
            .sum()
    }
}

impl Enemy for Chaser {
    fn kind(&self) -> EnemyKind {
        EnemyKind::Chaser
    }

    fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }

    fn facing(&self) -> Direction {
        if self.attacking() {
            self.attack_facing
        } else {
            self.facing
        }
    }

    fn frame(&self) -> usize {
        if self.attacking() {
            self.swing.frame()
        } else {
            self.walk.frame()
        }
    }

    fn attacking(&self) -> bool {
        self.attack_timer > 0.0
    }

    fn sense(&mut self, dt: f32, senses: &Senses<'_>) {
        self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);
        if self.attack_timer > 0.0 && self.vitals.rect.edge_gap(&senses.player) > ATTACK_BREAK {
            self.attack_timer = 0.0;
        }
        self.attack_timer = (self.attack_timer - dt).max(0.0);
        self.detour_timer = (self.detour_timer - dt).max(0.0);
        if self.detour_timer == 0.0 {
            self.detour = None;
        }
    }

    fn think(&mut self, dt: f32, senses: &Senses<'_>, _rng: &mut dyn RngCore) {
        self.velocity = self.steer_toward_player(dt, senses).normalize_or_zero() * SPEED;
    }

    fn move_body(&mut self, dt: f32, senses: &Senses<'_>, _rng: &mut dyn RngCore) {
        let motion = move_axis_separated(&senses.arena, self.vitals.rect, self.velocity * dt);
        self.vitals.rect = motion.rect;
        if let Some(facing) = Direction::from_vector(self.velocity) {
            self.facing = facing;
        }
    }

    fn act(&mut self, senses: &Senses<'_>) -> Option<ActorEvent> {
        if self.attack_cooldown > 0.0 || self.vitals.rect.edge_gap(&senses.player) > ATTACK_REACH {
            return None;
        }
        self.attack_cooldown = ATTACK_COOLDOWN;
        self.attack_timer = SWING_TIME;
        self.attack_facing = self.facing;
        self.swing.set_direction(self.attack_facing);
        self.swing.reset();
        Some(ActorEvent::HitPlayer { damage: DAMAGE })
    }

    fn animate(&mut self, dt: f32) {
        if self.attacking() {
            self.swing.set_direction(self.attack_facing);
            self.swing.update(dt, true);
        } else {
            self.walk.set_direction(self.facing);
            self.walk.update(dt, self.velocity != Vec2::ZERO);
        }
    }
}
