#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural dungeon generator and level text loader.
//!
//! Generation grows a room graph from a single root room: rooms are attached
//! to random sides of frontier rooms, every successful attachment records a
//! link, and each link is later carved into a two-tile double door joined by a
//! corridor of hall tiles. The resulting tile grid is padded with void and
//! paired with room, door and adjacency metadata in a [`Dungeon`].

mod level;

use std::collections::{BTreeMap, BTreeSet};

use delve_core::{
    Direction, DoorKey, DoorMeta, Dungeon, Orientation, RoomId, RoomLink, RoomMeta, RoomState,
    Tile, TileGrid, TileRect, TILE_SIZE,
};
use glam::Vec2;
use log::{info, warn};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub use level::{parse_level, DoorMarker, LevelLayout, LevelParseError};

/// Tiles of void left between the walls of two attached rooms.
pub const ROOM_GAP: i32 = 2;
/// Margin added around every room before testing placements for overlap.
pub const OVERHANG_MARGIN: i32 = 1;
/// Rows and columns of void added around the finished grid.
pub const GRID_PADDING: i32 = 3;

const FRONTIER_RETIRE_PROBABILITY: f64 = 0.35;
const ATTEMPTS_PER_ROOM: usize = 20;
const MIN_ROOM_EDGE: i32 = 5;

/// Parameters controlling dungeon generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    seed: Option<u64>,
    target_rooms: usize,
    first_room_size: (i32, i32),
    min_size: i32,
    max_size: i32,
}

impl Config {
    /// Creates a configuration, normalising sizes that cannot hold a door.
    #[must_use]
    pub fn new(
        seed: Option<u64>,
        target_rooms: usize,
        first_room_size: (i32, i32),
        min_size: i32,
        max_size: i32,
    ) -> Self {
        let min_size = min_size.max(MIN_ROOM_EDGE);
        let max_size = max_size.max(min_size);
        Self {
            seed,
            target_rooms: target_rooms.max(1),
            first_room_size: (
                first_room_size.0.max(MIN_ROOM_EDGE),
                first_room_size.1.max(MIN_ROOM_EDGE),
            ),
            min_size,
            max_size,
        }
    }

    /// Returns the configuration with a different seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Seed used for reproducible generation; `None` draws one from entropy.
    #[must_use]
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Number of rooms the generator aims for.
    #[must_use]
    pub const fn target_rooms(&self) -> usize {
        self.target_rooms
    }

    /// Width and height of the root room in tiles.
    #[must_use]
    pub const fn first_room_size(&self) -> (i32, i32) {
        self.first_room_size
    }

    /// Smallest edge length of a generated room.
    #[must_use]
    pub const fn min_size(&self) -> i32 {
        self.min_size
    }

    /// Largest edge length of a generated room.
    #[must_use]
    pub const fn max_size(&self) -> i32 {
        self.max_size
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None, 6, (20, 15), 15, 30)
    }
}

/// Generates a dungeon.
///
/// Running twice with the same seeded configuration produces identical
/// dungeons. When the placement budget runs out early the dungeon simply
/// holds fewer rooms.
#[must_use]
pub fn generate(config: &Config) -> Dungeon {
    let mut rng = match config.seed() {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let layout = place_rooms(config, &mut rng);
    let (rooms, width, height) = normalise(&layout.rooms);
    let mut grid = rasterise(&rooms, width, height);

    let mut carved = Vec::with_capacity(layout.links.len());
    let mut dropped_links = Vec::new();
    for link in &layout.links {
        match carve_link(&mut grid, &rooms, link) {
            Some(door) => carved.push(door),
            None => {
                warn!(
                    "no door window between rooms {} and {}; dropping link",
                    link.base, link.added
                );
                dropped_links.push(link.to_room_link());
            }
        }
    }

    let grid = grid.padded(GRID_PADDING as u32);
    let rooms: Vec<TileRect> = rooms
        .iter()
        .map(|room| room.translated(GRID_PADDING, GRID_PADDING))
        .collect();
    let carved: Vec<CarvedDoor> = carved
        .into_iter()
        .map(|door| door.translated(GRID_PADDING))
        .collect();

    let dungeon = assemble(grid, &rooms, carved, dropped_links);
    info!(
        "generated dungeon: {} rooms, {} doors, {} dropped links, {}x{} tiles",
        dungeon.rooms.len(),
        dungeon.doors.len(),
        dungeon.dropped_links.len(),
        dungeon.grid.width(),
        dungeon.grid.height()
    );
    dungeon
}

struct Layout {
    rooms: Vec<TileRect>,
    links: Vec<Link>,
}

#[derive(Clone, Copy, Debug)]
struct Link {
    base: usize,
    added: usize,
    side: Direction,
}

impl Link {
    fn to_room_link(self) -> RoomLink {
        RoomLink {
            base: RoomId::new(self.base as u32),
            added: RoomId::new(self.added as u32),
            side: self.side,
        }
    }

    /// Orders the link so the first room is the upper or left one.
    fn canonical(self) -> (usize, usize, Orientation) {
        match self.side {
            Direction::North => (self.added, self.base, Orientation::Horizontal),
            Direction::South => (self.base, self.added, Orientation::Horizontal),
            Direction::West => (self.added, self.base, Orientation::Vertical),
            Direction::East => (self.base, self.added, Orientation::Vertical),
        }
    }
}

fn place_rooms(config: &Config, rng: &mut ChaCha8Rng) -> Layout {
    let (first_width, first_height) = config.first_room_size();
    let mut rooms = vec![TileRect::new(0, 0, first_width, first_height)];
    let mut links = Vec::new();
    let mut frontier = vec![0_usize];

    let budget = config.target_rooms() * ATTEMPTS_PER_ROOM;
    let mut attempts = 0;
    while rooms.len() < config.target_rooms() && attempts < budget && !frontier.is_empty() {
        attempts += 1;
        let Some(&base_index) = frontier.choose(rng) else {
            break;
        };
        let base = rooms[base_index];

        let mut sides = Direction::ALL;
        sides.shuffle(rng);
        for side in sides {
            let width = rng.gen_range(config.min_size()..=config.max_size());
            let height = rng.gen_range(config.min_size()..=config.max_size());
            let candidate = place_adjacent(&base, side, width, height);
            if rooms
                .iter()
                .any(|room| padded_overlap(&candidate, room))
            {
                continue;
            }

            let added = rooms.len();
            rooms.push(candidate);
            frontier.push(added);
            links.push(Link {
                base: base_index,
                added,
                side,
            });
            break;
        }

        if rng.gen_bool(FRONTIER_RETIRE_PROBABILITY) {
            frontier.retain(|index| *index != base_index);
        }
    }

    if rooms.len() < config.target_rooms() {
        warn!(
            "room placement stopped after {attempts} attempts with {} of {} rooms",
            rooms.len(),
            config.target_rooms()
        );
    }

    Layout { rooms, links }
}

fn place_adjacent(base: &TileRect, side: Direction, width: i32, height: i32) -> TileRect {
    let centred_column = base.column() + base.width() / 2 - width / 2;
    let centred_row = base.row() + base.height() / 2 - height / 2;
    match side {
        Direction::North => {
            TileRect::new(centred_column, base.row() - height - ROOM_GAP, width, height)
        }
        Direction::South => TileRect::new(centred_column, base.bottom() + ROOM_GAP, width, height),
        Direction::West => TileRect::new(base.column() - width - ROOM_GAP, centred_row, width, height),
        Direction::East => TileRect::new(base.right() + ROOM_GAP, centred_row, width, height),
    }
}

fn padded_overlap(a: &TileRect, b: &TileRect) -> bool {
    a.padded(OVERHANG_MARGIN)
        .overlaps(&b.padded(OVERHANG_MARGIN))
}

fn normalise(rooms: &[TileRect]) -> (Vec<TileRect>, u32, u32) {
    let min_column = rooms.iter().map(TileRect::column).min().unwrap_or(0);
    let min_row = rooms.iter().map(TileRect::row).min().unwrap_or(0);
    let shifted: Vec<TileRect> = rooms
        .iter()
        .map(|room| room.translated(-min_column, -min_row))
        .collect();
    let width = shifted.iter().map(TileRect::right).max().unwrap_or(0);
    let height = shifted.iter().map(TileRect::bottom).max().unwrap_or(0);
    (shifted, width.max(0) as u32, height.max(0) as u32)
}

fn rasterise(rooms: &[TileRect], width: u32, height: u32) -> TileGrid {
    let mut grid = TileGrid::filled(width, height, Tile::Void);
    for room in rooms {
        for row in room.row()..room.bottom() {
            for column in room.column()..room.right() {
                let border = column == room.column()
                    || column == room.right() - 1
                    || row == room.row()
                    || row == room.bottom() - 1;
                let tile = if border { Tile::Wall } else { Tile::Floor };
                let _ = grid.set(column, row, tile);
            }
        }
    }
    grid
}

/// Two adjacent door tiles carved into one room's wall, anchored at the lower tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct DoorHalf {
    orientation: Orientation,
    column: i32,
    row: i32,
}

impl DoorHalf {
    fn tiles(&self) -> [(i32, i32); 2] {
        match self.orientation {
            Orientation::Horizontal => [(self.column, self.row), (self.column + 1, self.row)],
            Orientation::Vertical => [(self.column, self.row), (self.column, self.row + 1)],
        }
    }

    fn stamp(&self, grid: &mut TileGrid) {
        for (column, row) in self.tiles() {
            let _ = grid.set(column, row, Tile::Door);
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct CarvedDoor {
    key: DoorKey,
    span: TileRect,
    rooms: (usize, usize),
}

impl CarvedDoor {
    fn translated(self, offset: i32) -> Self {
        Self {
            key: self.key.translated(offset, offset),
            span: self.span.translated(offset, offset),
            rooms: self.rooms,
        }
    }
}

/// First tile of a two-tile door window shared by two parallel walls.
///
/// Corners are excluded, so both tiles sit strictly inside both walls.
fn door_window(a_start: i32, a_end: i32, b_start: i32, b_end: i32) -> Option<i32> {
    let start = (a_start + 1).max(b_start + 1);
    let end = (a_end - 2).min(b_end - 2);
    if end - start < 1 {
        return None;
    }
    let midpoint = (start + end).div_euclid(2);
    Some(midpoint.min(end - 1))
}

fn carve_link(grid: &mut TileGrid, rooms: &[TileRect], link: &Link) -> Option<CarvedDoor> {
    let (upper, lower, orientation) = link.canonical();
    let a = rooms[upper];
    let b = rooms[lower];

    let (half_a, half_b) = match orientation {
        Orientation::Horizontal => {
            let column = door_window(a.column(), a.right(), b.column(), b.right())?;
            (
                DoorHalf {
                    orientation,
                    column,
                    row: a.bottom() - 1,
                },
                DoorHalf {
                    orientation,
                    column,
                    row: b.row(),
                },
            )
        }
        Orientation::Vertical => {
            let row = door_window(a.row(), a.bottom(), b.row(), b.bottom())?;
            (
                DoorHalf {
                    orientation,
                    column: a.right() - 1,
                    row,
                },
                DoorHalf {
                    orientation,
                    column: b.column(),
                    row,
                },
            )
        }
    };

    half_a.stamp(grid);
    half_b.stamp(grid);
    fill_corridor(grid, half_a, half_b);

    let span = match orientation {
        Orientation::Horizontal => {
            TileRect::new(half_a.column, half_a.row, 2, half_b.row - half_a.row + 1)
        }
        Orientation::Vertical => {
            TileRect::new(half_a.column, half_a.row, half_b.column - half_a.column + 1, 2)
        }
    };

    Some(CarvedDoor {
        key: DoorKey::new(orientation, half_a.column, half_a.row),
        span,
        rooms: (upper, lower),
    })
}

/// Fills the gap between two parallel door halves with hall tiles.
///
/// # Panics
///
/// Panics when the halves do not share an orientation.
fn fill_corridor(grid: &mut TileGrid, near: DoorHalf, far: DoorHalf) {
    assert_eq!(
        near.orientation, far.orientation,
        "corridor endpoints must share an orientation"
    );

    match near.orientation {
        Orientation::Horizontal => {
            for row in near.row + 1..far.row {
                for column in [near.column, near.column + 1] {
                    let _ = grid.set(column, row, Tile::Hall);
                }
            }
        }
        Orientation::Vertical => {
            for column in near.column + 1..far.column {
                for row in [near.row, near.row + 1] {
                    let _ = grid.set(column, row, Tile::Hall);
                }
            }
        }
    }
}

fn spawn_point(room: &TileRect) -> Vec2 {
    let column = room.column() + room.width() / 2;
    let row = room.row() + room.height() / 2;
    Vec2::new(
        (column as f32 + 0.5) * TILE_SIZE,
        (row as f32 + 0.5) * TILE_SIZE,
    )
}

fn assemble(
    grid: TileGrid,
    rooms: &[TileRect],
    carved: Vec<CarvedDoor>,
    dropped_links: Vec<RoomLink>,
) -> Dungeon {
    let start_room = RoomId::new(0);
    let mut metas: Vec<RoomMeta> = rooms
        .iter()
        .enumerate()
        .map(|(index, rect)| RoomMeta {
            id: RoomId::new(index as u32),
            rect_full: *rect,
            rect_inner: rect.shrunk(1),
            center: rect.to_pixels().center(),
            door_keys: Vec::new(),
            state: if index == 0 {
                RoomState::Cleared
            } else {
                RoomState::Unvisited
            },
        })
        .collect();

    let mut adjacency: BTreeMap<RoomId, BTreeSet<RoomId>> =
        metas.iter().map(|meta| (meta.id, BTreeSet::new())).collect();
    let mut doors = BTreeMap::new();

    for door in carved {
        let (first, second) = door.rooms;
        for index in [first, second] {
            let keys = &mut metas[index].door_keys;
            if !keys.contains(&door.key) {
                keys.push(door.key);
            }
        }

        let first = RoomId::new(first as u32);
        let second = RoomId::new(second as u32);
        let _ = adjacency.entry(first).or_default().insert(second);
        let _ = adjacency.entry(second).or_default().insert(first);
        let _ = doors.insert(
            door.key,
            DoorMeta {
                key: door.key,
                rect: door.span.to_pixels(),
                orientation: door.key.orientation,
                rooms: (first, second),
            },
        );
    }

    let spawn = rooms
        .first()
        .map_or(Vec2::splat(TILE_SIZE * 1.5), spawn_point);

    Dungeon {
        grid,
        rooms: metas,
        doors,
        adjacency,
        start_room,
        spawn,
        dropped_links,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn door_window_requires_two_interior_tiles() {
        assert_eq!(door_window(0, 10, 0, 10), Some(4));
        assert_eq!(door_window(0, 10, 6, 20), Some(7));
        assert_eq!(door_window(0, 10, 7, 20), None);
    }

    #[test]
    fn attached_rooms_leave_the_gap_and_pass_the_padded_test() {
        let base = TileRect::new(0, 0, 20, 15);
        for side in Direction::ALL {
            let candidate = place_adjacent(&base, side, 17, 16);
            assert!(!candidate.overlaps(&base));
            assert!(
                !padded_overlap(&candidate, &base),
                "attachment on {side:?} must not collide with its base"
            );
        }
        let south = place_adjacent(&base, Direction::South, 17, 16);
        assert_eq!(south.row(), base.bottom() + ROOM_GAP);
    }

    #[test]
    fn carving_a_vertical_link_fills_the_corridor() {
        let rooms = vec![TileRect::new(0, 0, 8, 8), TileRect::new(10, 0, 8, 8)];
        let mut grid = rasterise(&rooms, 18, 8);
        let link = Link {
            base: 0,
            added: 1,
            side: Direction::East,
        };

        let door = carve_link(&mut grid, &rooms, &link).expect("rooms share a wall window");

        assert_eq!(door.key, DoorKey::new(Orientation::Vertical, 7, 3));
        assert_eq!(door.span, TileRect::new(7, 3, 4, 2));
        assert_eq!(grid.tile_at(7, 3), Tile::Door);
        assert_eq!(grid.tile_at(7, 4), Tile::Door);
        assert_eq!(grid.tile_at(10, 3), Tile::Door);
        assert_eq!(grid.tile_at(8, 3), Tile::Hall);
        assert_eq!(grid.tile_at(9, 4), Tile::Hall);
        assert_eq!(grid.count(Tile::Hall), 4);
    }

    #[test]
    #[should_panic(expected = "corridor endpoints must share an orientation")]
    fn corridor_rejects_mismatched_halves() {
        let mut grid = TileGrid::filled(8, 8, Tile::Void);
        fill_corridor(
            &mut grid,
            DoorHalf {
                orientation: Orientation::Horizontal,
                column: 1,
                row: 1,
            },
            DoorHalf {
                orientation: Orientation::Vertical,
                column: 1,
                row: 4,
            },
        );
    }
}
