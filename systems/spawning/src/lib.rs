#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded spawning system that fills freshly locked rooms with enemies.
//!
//! Each `RoomLocked` event yields one batch of `SpawnEnemy` commands. Batch
//! size grows with the room's floor area. Placements keep clear of the player
//! and of each other, retrying a bounded number of times per enemy; turrets
//! are placed against a wall and face into the room.

use delve_core::{
    Command, Direction, EnemyKind, Event, ProgressionView, Rect, RoomProgress, TILE_SIZE,
};
use glam::Vec2;
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Square footprint reserved for every placement.
pub const SPAWN_FOOTPRINT: f32 = TILE_SIZE;

/// Floor tiles that earn one enemy beyond the minimum batch.
const TILES_PER_EXTRA_ENEMY: f32 = 120.0;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    seed: Option<u64>,
    min_batch: usize,
    max_batch: usize,
    placement_attempts: usize,
    player_clearance: f32,
}

impl Config {
    /// Creates a configuration; `max_batch` is raised to `min_batch` when smaller.
    #[must_use]
    pub fn new(
        seed: Option<u64>,
        min_batch: usize,
        max_batch: usize,
        placement_attempts: usize,
        player_clearance: f32,
    ) -> Self {
        Self {
            seed,
            min_batch,
            max_batch: max_batch.max(min_batch),
            placement_attempts: placement_attempts.max(1),
            player_clearance: player_clearance.max(0.0),
        }
    }

    /// Seed of the placement stream; `None` draws one from entropy.
    #[must_use]
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Fewest enemies spawned into a locked room.
    #[must_use]
    pub const fn min_batch(&self) -> usize {
        self.min_batch
    }

    /// Most enemies spawned into a locked room.
    #[must_use]
    pub const fn max_batch(&self) -> usize {
        self.max_batch
    }

    /// Tries per enemy before its placement is abandoned.
    #[must_use]
    pub const fn placement_attempts(&self) -> usize {
        self.placement_attempts
    }

    /// Minimum distance in pixels between a spawn point and the player's centre.
    #[must_use]
    pub const fn player_clearance(&self) -> f32 {
        self.player_clearance
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None, 3, 6, 20, 96.0)
    }
}

/// Pure system that turns room locks into enemy spawn commands.
#[derive(Debug)]
pub struct Spawning {
    config: Config,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let rng = match config.seed() {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self { config, rng }
    }

    /// Consumes world events and emits a spawn batch for every room that just locked.
    pub fn handle(&mut self, events: &[Event], view: &ProgressionView, out: &mut Vec<Command>) {
        for event in events {
            let Event::RoomLocked { room } = event else {
                continue;
            };
            let Some(progress) = view.room(*room) else {
                debug!("locked room {} is missing from the view", room.get());
                continue;
            };
            self.spawn_batch(progress, view.player_center(), out);
        }
    }

    fn spawn_batch(&mut self, room: &RoomProgress, player: Vec2, out: &mut Vec<Command>) {
        let count = batch_size(&self.config, &room.interior);
        let mut taken: Vec<Rect> = Vec::with_capacity(count);

        for _ in 0..count {
            let kind = self.pick_kind();
            match self.place(kind, &room.interior, player, &taken) {
                Some((origin, facing)) => {
                    taken.push(footprint(origin));
                    out.push(Command::SpawnEnemy {
                        room: room.id,
                        kind,
                        origin,
                        facing,
                    });
                }
                None => debug!(
                    "no free spot for a {} in room {} after {} attempts",
                    kind.name(),
                    room.id.get(),
                    self.config.placement_attempts
                ),
            }
        }
        debug!(
            "room {} spawned {} of {count} enemies",
            room.id.get(),
            taken.len()
        );
    }

    fn pick_kind(&mut self) -> EnemyKind {
        match self.rng.gen_range(0..4) {
            0 | 1 => EnemyKind::Chaser,
            2 => EnemyKind::Roller,
            _ => EnemyKind::Turret,
        }
    }

    fn place(
        &mut self,
        kind: EnemyKind,
        interior: &Rect,
        player: Vec2,
        taken: &[Rect],
    ) -> Option<(Vec2, Direction)> {
        for _ in 0..self.config.placement_attempts {
            let (origin, facing) = match kind {
                EnemyKind::Turret => self.wall_spot(interior),
                EnemyKind::Chaser | EnemyKind::Roller => {
                    let origin = self.open_spot(interior);
                    let facing =
                        Direction::from_vector(player - origin).unwrap_or(Direction::South);
                    (origin, facing)
                }
            };
            if is_free(origin, player, taken, self.config.player_clearance) {
                return Some((origin, facing));
            }
        }
        None
    }

    fn open_spot(&mut self, interior: &Rect) -> Vec2 {
        let half = SPAWN_FOOTPRINT / 2.0;
        Vec2::new(
            span(&mut self.rng, interior.left() + half, interior.right() - half),
            span(&mut self.rng, interior.top() + half, interior.bottom() - half),
        )
    }

    /// Spot flush against a random wall, facing away from it.
    fn wall_spot(&mut self, interior: &Rect) -> (Vec2, Direction) {
        let half = SPAWN_FOOTPRINT / 2.0;
        let wall = Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())];
        let origin = match wall {
            Direction::North | Direction::South => {
                let x = span(&mut self.rng, interior.left() + half, interior.right() - half);
                let y = if wall == Direction::North {
                    interior.top() + half
                } else {
                    interior.bottom() - half
                };
                Vec2::new(x, y)
            }
            Direction::East | Direction::West => {
                let y = span(&mut self.rng, interior.top() + half, interior.bottom() - half);
                let x = if wall == Direction::West {
                    interior.left() + half
                } else {
                    interior.right() - half
                };
                Vec2::new(x, y)
            }
        };
        (origin, wall.opposite())
    }
}

/// Number of enemies a room with the given interior receives.
#[must_use]
pub fn batch_size(config: &Config, interior: &Rect) -> usize {
    let tiles = (interior.width() * interior.height()) / (TILE_SIZE * TILE_SIZE);
    let extra = (tiles.max(0.0) / TILES_PER_EXTRA_ENEMY) as usize;
    (config.min_batch + extra).min(config.max_batch)
}

fn footprint(origin: Vec2) -> Rect {
    Rect::from_center(origin, Vec2::splat(SPAWN_FOOTPRINT))
}

fn is_free(origin: Vec2, player: Vec2, taken: &[Rect], clearance: f32) -> bool {
    if origin.distance(player) < clearance {
        return false;
    }
    let candidate = footprint(origin);
    !taken.iter().any(|rect| rect.intersects(&candidate))
}

fn span(rng: &mut ChaCha8Rng, low: f32, high: f32) -> f32 {
    if high <= low {
        (low + high) / 2.0
    } else {
        rng.gen_range(low..=high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_grows_with_area_and_respects_the_cap() {
        let config = Config::default();
        let small = Rect::new(0.0, 0.0, 6.0 * TILE_SIZE, 6.0 * TILE_SIZE);
        let medium = Rect::new(0.0, 0.0, 18.0 * TILE_SIZE, 13.0 * TILE_SIZE);
        let huge = Rect::new(0.0, 0.0, 60.0 * TILE_SIZE, 60.0 * TILE_SIZE);

        assert_eq!(batch_size(&config, &small), 3);
        assert_eq!(batch_size(&config, &medium), 4);
        assert_eq!(batch_size(&config, &huge), 6);
    }

    #[test]
    fn wall_spots_face_into_the_room() {
        let mut spawning = Spawning::new(Config::new(Some(3), 3, 6, 20, 96.0));
        let interior = Rect::new(64.0, 64.0, 320.0, 256.0);

        for _ in 0..32 {
            let (origin, facing) = spawning.wall_spot(&interior);
            let half = SPAWN_FOOTPRINT / 2.0;
            let expected = if (origin.y - (interior.top() + half)).abs() < 1e-3 {
                Direction::South
            } else if (origin.y - (interior.bottom() - half)).abs() < 1e-3 {
                Direction::North
            } else if (origin.x - (interior.left() + half)).abs() < 1e-3 {
                Direction::East
            } else {
                assert!(
                    (origin.x - (interior.right() - half)).abs() < 1e-3,
                    "turret at {origin:?} is not against any wall"
                );
                Direction::West
            };
            assert_eq!(facing, expected);
        }
    }
}
