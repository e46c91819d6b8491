#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Delve engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The frame driver submits
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable views, and respond exclusively with new command batches.

mod dungeon;
mod geometry;
mod grid;
mod views;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use dungeon::{DoorKey, DoorMeta, Dungeon, Orientation, RoomId, RoomLink, RoomMeta, RoomState};
pub use geometry::{last_tile_before, tile_index, Rect, TileRect};
pub use grid::{Tile, TileGrid};
pub use views::{
    EnemySnapshot, PlayerSnapshot, ProgressionView, ProjectileSnapshot, RoomProgress,
};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Delve.";

/// Edge length of a square tile in pixels.
pub const TILE_SIZE: f32 = 32.0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation by one frame using the sampled player input.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
        /// Input captured by the adapter for this frame.
        input: FrameInput,
    },
    /// Starts the delayed lock of an unvisited room the player just entered.
    ArmRoom {
        /// Room to arm.
        room: RoomId,
    },
    /// Cancels a pending lock because the player left before it committed.
    DisarmRoom {
        /// Room to return to the unvisited state.
        room: RoomId,
    },
    /// Closes every door of an arming room and marks it locked.
    LockRoom {
        /// Room to lock.
        room: RoomId,
    },
    /// Reopens the doors of a locked room whose enemies are all defeated.
    ClearRoom {
        /// Room to clear.
        room: RoomId,
    },
    /// Requests that an enemy be created inside a locked room.
    SpawnEnemy {
        /// Room the enemy belongs to.
        room: RoomId,
        /// Behaviour family of the enemy.
        kind: EnemyKind,
        /// Pixel position of the enemy's centre.
        origin: Vec2,
        /// Direction the enemy initially faces.
        facing: Direction,
    },
    /// Applies damage to a single enemy.
    DamageEnemy {
        /// Enemy receiving the damage.
        enemy: EnemyId,
        /// Amount of health removed.
        amount: u32,
    },
    /// Declares that every room has been cleared.
    DeclareDungeonCleared,
    /// Declares that the player has died.
    DeclareGameOver,
    /// Asks the scene collaborator to show the pause screen.
    RequestPause,
    /// Changes the audio-muted flag carried by scene requests.
    SetAudioMuted {
        /// Whether audio should be muted.
        muted: bool,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Reports damage that landed on the player.
    PlayerDamaged {
        /// Health removed by the hit.
        amount: u32,
        /// Health remaining after the hit.
        hp: u32,
    },
    /// Reports that the player fired or an enemy spawned a projectile.
    ProjectileFired {
        /// Team owning the projectile.
        team: Team,
    },
    /// Discrete audio cue for the audio collaborator.
    Sound {
        /// Cue to play.
        cue: SoundCue,
    },
    /// Confirms that an enemy was created.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Room the enemy belongs to.
        room: RoomId,
        /// Behaviour family of the enemy.
        kind: EnemyKind,
    },
    /// Reports damage that landed on an enemy.
    EnemyDamaged {
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Health remaining after the hit.
        hp: u32,
    },
    /// Reports that an enemy's health reached zero.
    EnemyDefeated {
        /// Enemy that was defeated.
        enemy: EnemyId,
        /// Room the enemy belonged to.
        room: RoomId,
    },
    /// Announces that a room started arming its lock.
    RoomArmed {
        /// Room that is arming.
        room: RoomId,
    },
    /// Announces that a pending lock was cancelled.
    RoomDisarmed {
        /// Room that returned to unvisited.
        room: RoomId,
    },
    /// Announces that a room locked its doors.
    RoomLocked {
        /// Room that locked.
        room: RoomId,
    },
    /// Announces that a room was cleared.
    RoomCleared {
        /// Room that was cleared.
        room: RoomId,
    },
    /// Reports that a door opened or closed.
    DoorStateChanged {
        /// Door whose state changed.
        door: DoorKey,
        /// Whether the door is now open.
        open: bool,
    },
    /// One-shot notification that the whole dungeon was cleared.
    DungeonCleared,
    /// One-shot notification that the player died.
    GameOver,
    /// Asks the scene collaborator to switch scenes.
    SceneRequested {
        /// Requested scene together with its parameters.
        request: SceneRequest,
    },
}

/// Cardinal directions used for facing and placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    North,
    /// Toward increasing column indices.
    East,
    /// Toward increasing row indices.
    South,
    /// Toward decreasing column indices.
    West,
}

impl Direction {
    /// All directions in clockwise order starting from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit vector pointing in the direction, with y growing downward.
    #[must_use]
    pub fn unit(self) -> Vec2 {
        match self {
            Self::North => Vec2::new(0.0, -1.0),
            Self::East => Vec2::new(1.0, 0.0),
            Self::South => Vec2::new(0.0, 1.0),
            Self::West => Vec2::new(-1.0, 0.0),
        }
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Dominant direction of a vector; ties favour the vertical axis.
    #[must_use]
    pub fn from_vector(vector: Vec2) -> Option<Self> {
        if vector.x.abs() > vector.y.abs() {
            Some(if vector.x > 0.0 { Self::East } else { Self::West })
        } else if vector.y > 0.0 {
            Some(Self::South)
        } else if vector.y < 0.0 {
            Some(Self::North)
        } else {
            None
        }
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
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

/// Behaviour families available to enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EnemyKind {
    /// Melee enemy that keeps a standoff distance and swings when close.
    Chaser,
    /// Enemy that rests, winds up, then rolls and bounces off walls.
    Roller,
    /// Stationary enemy that periodically spits projectiles.
    Turret,
}

impl EnemyKind {
    /// Stable lowercase name of the kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Chaser => "chaser",
            Self::Roller => "roller",
            Self::Turret => "turret",
        }
    }
}

/// Side a projectile or damage source belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Team {
    /// Fired by the player; hurts enemies.
    Player,
    /// Fired by an enemy; hurts the player.
    Enemy,
}

/// One of eight discrete fire directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FireDirection {
    dx: i8,
    dy: i8,
}

impl FireDirection {
    /// Creates a fire direction from axis signs; returns `None` for the zero vector.
    #[must_use]
    pub const fn new(dx: i8, dy: i8) -> Option<Self> {
        let dx = dx.signum();
        let dy = dy.signum();
        if dx == 0 && dy == 0 {
            None
        } else {
            Some(Self { dx, dy })
        }
    }

    /// Horizontal sign of the direction.
    #[must_use]
    pub const fn dx(&self) -> i8 {
        self.dx
    }

    /// Vertical sign of the direction.
    #[must_use]
    pub const fn dy(&self) -> i8 {
        self.dy
    }

    /// Velocity of a shot fired at `speed`; diagonals keep the same speed.
    #[must_use]
    pub fn velocity(&self, speed: f32) -> Vec2 {
        let scale = if self.dx != 0 && self.dy != 0 {
            std::f32::consts::FRAC_1_SQRT_2
        } else {
            1.0
        };
        Vec2::new(f32::from(self.dx), f32::from(self.dy)) * speed * scale
    }
}

/// Input sampled by the adapter for a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Movement intent; components are clamped to -1.0..=1.0.
    pub movement: Vec2,
    /// Requested fire direction, if any.
    pub fire: Option<FireDirection>,
}

impl FrameInput {
    /// Input that neither moves nor fires.
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    /// Input that only moves.
    #[must_use]
    pub fn moving(movement: Vec2) -> Self {
        Self {
            movement,
            fire: None,
        }
    }
}

/// Discrete audio cues emitted by the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SoundCue {
    /// Damage landed on the player.
    PlayerHurt,
    /// The player fired a shot.
    PlayerShot,
    /// A shot hit an enemy.
    EnemyHit,
    /// An enemy was defeated.
    EnemyDefeated,
    /// A turret spat a projectile.
    EnemyShot,
    /// A room slammed its doors shut.
    DoorsClosed,
    /// A cleared room reopened its doors.
    DoorsOpened,
}

/// Parameters passed when entering the play scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PlayParams {
    /// Whether audio is muted.
    pub muted: bool,
    /// Whether the scene resumes an existing run instead of starting fresh.
    pub resume: bool,
}

/// Parameters passed when entering the pause scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PauseParams {
    /// Whether audio is muted.
    pub muted: bool,
}

/// Parameters passed when entering an end-of-run scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct EndParams {
    /// Whether audio is muted.
    pub muted: bool,
}

/// Closed set of scenes the scene collaborator can switch to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneRequest {
    /// Main menu.
    Menu,
    /// Gameplay.
    Play(PlayParams),
    /// Pause overlay.
    Pause(PauseParams),
    /// Loss screen.
    GameOver(EndParams),
    /// Victory screen.
    YouWin(EndParams),
}

impl SceneRequest {
    /// Stable name of the requested scene.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::Play(_) => "play",
            Self::Pause(_) => "pause",
            Self::GameOver(_) => "game_over",
            Self::YouWin(_) => "you_win",
        }
    }
}
