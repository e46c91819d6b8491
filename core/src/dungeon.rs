use std::collections::{BTreeMap, BTreeSet, VecDeque};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{Direction, Rect, TileGrid, TileRect};

/// Unique identifier assigned to a generated room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(u32);

impl RoomId {
    /// Creates a new room identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Orientation of the wall a double door is carved into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Orientation {
    /// Door sits in a horizontal wall and joins vertically stacked rooms.
    Horizontal,
    /// Door sits in a vertical wall and joins side-by-side rooms.
    Vertical,
}

/// Stable key of a double door: orientation plus the tile of its lower-coordinate half.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DoorKey {
    /// Orientation of the door.
    pub orientation: Orientation,
    /// Column of the lower-coordinate door half.
    pub column: i32,
    /// Row of the lower-coordinate door half.
    pub row: i32,
}

impl DoorKey {
    /// Creates a door key.
    #[must_use]
    pub const fn new(orientation: Orientation, column: i32, row: i32) -> Self {
        Self {
            orientation,
            column,
            row,
        }
    }

    /// Returns the key shifted by whole tiles.
    #[must_use]
    pub const fn translated(self, columns: i32, rows: i32) -> Self {
        Self::new(self.orientation, self.column + columns, self.row + rows)
    }
}

/// Static description of a carved double door.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DoorMeta {
    /// Key identifying the door.
    pub key: DoorKey,
    /// Pixel rectangle spanning both door halves and the corridor between them.
    pub rect: Rect,
    /// Orientation of the wall carrying the door.
    pub orientation: Orientation,
    /// The two rooms joined by the door, upper or left room first.
    pub rooms: (RoomId, RoomId),
}

impl DoorMeta {
    /// Reports whether the door borders the provided room.
    #[must_use]
    pub fn connects(&self, room: RoomId) -> bool {
        self.rooms.0 == room || self.rooms.1 == room
    }
}

/// Progression state of a room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomState {
    /// The player has never committed to the room.
    Unvisited,
    /// The player entered; the lock is pending.
    Arming,
    /// Doors are closed until every spawned enemy is defeated.
    Locked,
    /// Terminal state: the room has been cleared.
    Cleared,
}

/// Runtime metadata describing a single room.
#[derive(Clone, Debug, PartialEq)]
pub struct RoomMeta {
    /// Identifier of the room.
    pub id: RoomId,
    /// Tiles covered by the room including its wall ring.
    pub rect_full: TileRect,
    /// Walkable interior: `rect_full` shrunk by one tile on each side.
    pub rect_inner: TileRect,
    /// Pixel-space centre of the room.
    pub center: Vec2,
    /// Doors carved into this room's walls.
    pub door_keys: Vec<DoorKey>,
    /// Current progression state.
    pub state: RoomState,
}

/// Placement link recorded between two rooms during generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomLink {
    /// Room the new room was placed against.
    pub base: RoomId,
    /// Room placed during the expansion step.
    pub added: RoomId,
    /// Side of `base` the new room was attached to.
    pub side: Direction,
}

/// Complete output of dungeon generation.
#[derive(Clone, Debug, PartialEq)]
pub struct Dungeon {
    /// Rasterised tile grid, already padded with void.
    pub grid: TileGrid,
    /// Room metadata indexed by [`RoomId`].
    pub rooms: Vec<RoomMeta>,
    /// Every carved door keyed by its lower-coordinate half.
    pub doors: BTreeMap<DoorKey, DoorMeta>,
    /// Undirected adjacency containing only successfully carved links.
    pub adjacency: BTreeMap<RoomId, BTreeSet<RoomId>>,
    /// Room the player starts in.
    pub start_room: RoomId,
    /// Pixel position the player spawns at.
    pub spawn: Vec2,
    /// Links whose door could not be carved.
    pub dropped_links: Vec<RoomLink>,
}

impl Dungeon {
    /// Looks up room metadata by identifier.
    #[must_use]
    pub fn room(&self, id: RoomId) -> Option<&RoomMeta> {
        self.rooms.get(id.get() as usize)
    }

    /// Finds the room whose interior contains the provided pixel position.
    #[must_use]
    pub fn room_containing(&self, point: Vec2) -> Option<RoomId> {
        self.rooms
            .iter()
            .find(|room| room.rect_inner.to_pixels().contains_point(point))
            .map(|room| room.id)
    }

    /// Iterates over the doors carved into the provided room.
    pub fn doors_of(&self, room: RoomId) -> impl Iterator<Item = &DoorMeta> + '_ {
        self.room(room)
            .into_iter()
            .flat_map(|meta| meta.door_keys.iter())
            .filter_map(|key| self.doors.get(key))
    }

    /// Rooms reachable from `start` by walking the adjacency graph.
    #[must_use]
    pub fn reachable_from(&self, start: RoomId) -> BTreeSet<RoomId> {
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::new();
        let _ = visited.insert(start);
        queue.push_back(start);

        while let Some(room) = queue.pop_front() {
            let Some(neighbours) = self.adjacency.get(&room) else {
                continue;
            };
            for neighbour in neighbours {
                if visited.insert(*neighbour) {
                    queue.push_back(*neighbour);
                }
            }
        }

        visited
    }

    /// Rooms that cannot be reached from the start room.
    #[must_use]
    pub fn unreachable_rooms(&self) -> Vec<RoomId> {
        let reachable = self.reachable_from(self.start_room);
        self.rooms
            .iter()
            .map(|room| room.id)
            .filter(|id| !reachable.contains(id))
            .collect()
    }
}
