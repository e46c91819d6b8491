use delve_core::{Direction, FrameInput, PlayerSnapshot, Rect};
use delve_system_collision::{move_axis_separated, CollisionMap};
use glam::Vec2;

use crate::{Animation, DirectionalAnimation, Projectile, ProjectileOwner};

const SIZE: f32 = 28.0;
const SPEED: f32 = 160.0;
const MAX_HP: u32 = 6;
const INVULNERABILITY: f32 = 0.60;
const FIRE_COOLDOWN: f32 = 0.15;
const SHOT_SPEED: f32 = 300.0;
const SHOT_SIZE: f32 = 6.0;
const SHOT_TTL: f32 = 1.2;
const SHOT_DAMAGE: u32 = 1;
const WALK_FRAMES: usize = 9;
const WALK_FPS: f32 = 10.0;
const IDLE_FRAMES: usize = 4;
const IDLE_FPS: f32 = 4.0;

/// Player-controlled hero.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    rect: Rect,
    hp: u32,
    max_hp: u32,
    fire_timer: f32,
    invulnerable: f32,
    facing: Direction,
    moving: bool,
    walk: DirectionalAnimation,
    idle: DirectionalAnimation,
}

impl Player {
    /// Creates the player centred on the spawn point.
    #[must_use]
    pub fn spawn(center: Vec2) -> Self {
        Self {
            rect: Rect::from_center(center, Vec2::splat(SIZE)),
            hp: MAX_HP,
            max_hp: MAX_HP,
            fire_timer: 0.0,
            invulnerable: 0.0,
            facing: Direction::South,
            moving: false,
            walk: DirectionalAnimation::uniform(
                Animation::new(WALK_FRAMES, WALK_FPS),
                Direction::South,
            ),
            idle: DirectionalAnimation::uniform(
                Animation::new(IDLE_FRAMES, IDLE_FPS),
                Direction::South,
            ),
        }
    }

    /// Moves, animates and optionally fires for one frame.
    pub fn update<M: CollisionMap + ?Sized>(
        &mut self,
        dt: f32,
        input: &FrameInput,
        map: &M,
    ) -> Option<Projectile> {
        self.invulnerable = (self.invulnerable - dt).max(0.0);
        self.fire_timer = (self.fire_timer - dt).max(0.0);
        if !self.is_alive() {
            return None;
        }

        let intent = input.movement.clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
        let direction = intent.normalize_or_zero();
        self.rect = move_axis_separated(map, self.rect, direction * SPEED * dt).rect;

        if let Some(facing) = Direction::from_vector(intent) {
            self.facing = facing;
        }
        self.moving = direction != Vec2::ZERO;
        self.animate(dt);

        let fire = input.fire?;
        if self.fire_timer > 0.0 {
            return None;
        }
        self.fire_timer = FIRE_COOLDOWN;
        Some(Projectile::new(
            self.rect.center(),
            Vec2::splat(SHOT_SIZE),
            fire.velocity(SHOT_SPEED),
            SHOT_TTL,
            SHOT_DAMAGE,
            ProjectileOwner::Player,
        ))
    }

    fn animate(&mut self, dt: f32) {
        self.walk.set_direction(self.facing);
        self.idle.set_direction(self.facing);
        if self.moving {
            self.walk.update(dt, true);
            self.idle.reset();
        } else {
            self.idle.update(dt, true);
            self.walk.reset();
        }
    }

    /// Applies damage unless invulnerable; returns the damage that landed.
    pub fn take_damage(&mut self, amount: u32) -> Option<u32> {
        if self.invulnerable > 0.0 || self.hp == 0 || amount == 0 {
            return None;
        }
        let landed = amount.min(self.hp);
        self.hp -= landed;
        self.invulnerable = INVULNERABILITY;
        Some(landed)
    }

    /// Collision rectangle.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        self.rect
    }

    /// Relocates the player after soft separation.
    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    /// Remaining health.
    #[must_use]
    pub const fn hp(&self) -> u32 {
        self.hp
    }

    /// Whether the player has health left.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Read-only snapshot for presentation.
    #[must_use]
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            rect: self.rect,
            hp: self.hp,
            max_hp: self.max_hp,
            facing: self.facing,
            moving: self.moving,
            frame: if self.moving {
                self.walk.frame()
            } else {
                self.idle.frame()
            },
            invulnerable: self.invulnerable > 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_core::{FireDirection, Tile, TileGrid};
    use delve_system_collision::Arena;

    fn open_floor() -> TileGrid {
        TileGrid::filled(20, 20, Tile::Floor)
    }

    #[test]
    fn invulnerability_swallows_follow_up_hits() {
        let mut player = Player::spawn(Vec2::new(100.0, 100.0));

        assert_eq!(player.take_damage(1), Some(1));
        assert_eq!(player.take_damage(1), None);
        assert_eq!(player.hp(), 5);

        let grid = open_floor();
        let _ = player.update(0.61, &FrameInput::idle(), &Arena::new(&grid, &[]));
        assert_eq!(player.take_damage(9), Some(5));
        assert!(!player.is_alive());
    }

    #[test]
    fn fire_respects_cooldown() {
        let grid = open_floor();
        let arena = Arena::new(&grid, &[]);
        let mut player = Player::spawn(Vec2::new(100.0, 100.0));
        let input = FrameInput {
            movement: Vec2::ZERO,
            fire: FireDirection::new(1, 1),
        };

        let shot = player.update(0.016, &input, &arena).expect("first shot fires");
        assert!((shot.velocity().length() - SHOT_SPEED).abs() < 1e-3);
        assert!(player.update(0.1, &input, &arena).is_none());
        assert!(player.update(0.06, &input, &arena).is_some());
    }

    #[test]
    fn movement_updates_facing() {
        let grid = open_floor();
        let arena = Arena::new(&grid, &[]);
        let mut player = Player::spawn(Vec2::new(100.0, 100.0));

        let _ = player.update(0.5, &FrameInput::moving(Vec2::new(-1.0, 0.0)), &arena);

        assert_eq!(player.snapshot().facing, Direction::West);
        assert!((player.rect().center().x - 20.0).abs() < 1e-3);
    }
}
