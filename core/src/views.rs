use glam::Vec2;

use crate::{Direction, EnemyId, EnemyKind, Rect, RoomId, RoomState, Team};

/// Read-only snapshot of the player exposed to renderers and the HUD.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Collision rectangle in pixels.
    pub rect: Rect,
    /// Remaining health.
    pub hp: u32,
    /// Maximum health.
    pub max_hp: u32,
    /// Direction the player faces.
    pub facing: Direction,
    /// Whether the player moved during the last tick.
    pub moving: bool,
    /// Logical animation frame index.
    pub frame: usize,
    /// Whether the post-hit invulnerability window is active.
    pub invulnerable: bool,
}

/// Read-only snapshot of a live enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier of the enemy.
    pub id: EnemyId,
    /// Behaviour family of the enemy.
    pub kind: EnemyKind,
    /// Room whose lock spawned the enemy.
    pub room: RoomId,
    /// Collision rectangle in pixels.
    pub rect: Rect,
    /// Remaining health.
    pub hp: u32,
    /// Maximum health.
    pub max_hp: u32,
    /// Direction the enemy faces.
    pub facing: Direction,
    /// Logical animation frame index.
    pub frame: usize,
    /// Whether an attack animation is playing.
    pub attacking: bool,
}

/// Read-only snapshot of an in-flight projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Collision rectangle in pixels.
    pub rect: Rect,
    /// Team that fired the projectile.
    pub team: Team,
}

/// Progress information about one room.
#[derive(Clone, Debug, PartialEq)]
pub struct RoomProgress {
    /// Identifier of the room.
    pub id: RoomId,
    /// Current progression state.
    pub state: RoomState,
    /// Walkable interior in pixels.
    pub interior: Rect,
    /// Pixel rectangles of the doors carved into the room.
    pub doors: Vec<Rect>,
    /// Number of live enemies spawned by this room.
    pub live_enemies: usize,
}

/// Immutable view consumed by the room progression system.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressionView {
    player: Rect,
    player_alive: bool,
    rooms: Vec<RoomProgress>,
}

impl ProgressionView {
    /// Builds a view from room progress records, ordering them by identifier.
    #[must_use]
    pub fn new(player: Rect, player_alive: bool, mut rooms: Vec<RoomProgress>) -> Self {
        rooms.sort_by_key(|room| room.id);
        Self {
            player,
            player_alive,
            rooms,
        }
    }

    /// Player collision rectangle.
    #[must_use]
    pub const fn player(&self) -> Rect {
        self.player
    }

    /// Centre of the player, used for room membership tests.
    #[must_use]
    pub fn player_center(&self) -> Vec2 {
        self.player.center()
    }

    /// Whether the player still has health left.
    #[must_use]
    pub const fn player_alive(&self) -> bool {
        self.player_alive
    }

    /// Iterates over every room in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &RoomProgress> {
        self.rooms.iter()
    }

    /// Looks up a single room.
    #[must_use]
    pub fn room(&self, id: RoomId) -> Option<&RoomProgress> {
        self.rooms.iter().find(|room| room.id == id)
    }

    /// Room whose interior contains the player's centre, if any.
    #[must_use]
    pub fn current_room(&self) -> Option<RoomId> {
        let center = self.player_center();
        self.rooms
            .iter()
            .find(|room| room.interior.contains_point(center))
            .map(|room| room.id)
    }

    /// Reports whether every room has reached [`RoomState::Cleared`].
    #[must_use]
    pub fn all_cleared(&self) -> bool {
        self.rooms
            .iter()
            .all(|room| room.state == RoomState::Cleared)
    }
}
