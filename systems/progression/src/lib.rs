#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Room progression state machine.
//!
//! Rooms move `unvisited -> arming -> locked -> cleared`. Entering an
//! unvisited room arms a delayed lock; the lock commits only once the arm
//! delay has elapsed and the player stands deep enough inside the room.
//! Leaving early disarms it. A locked room clears once none of its enemies
//! remain. The system evaluates once per simulated tick and is idempotent on
//! rooms that already reached `locked` or `cleared`.

use std::{collections::BTreeMap, time::Duration};

use delve_core::{Command, Event, ProgressionView, Rect, RoomId, RoomProgress, RoomState};
use log::debug;

/// Configuration parameters required to construct the progression system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    arm_delay: Duration,
    min_lock_depth: f32,
}

impl Config {
    /// Creates a configuration from the arm delay and the minimum lock depth in pixels.
    #[must_use]
    pub const fn new(arm_delay: Duration, min_lock_depth: f32) -> Self {
        Self {
            arm_delay,
            min_lock_depth,
        }
    }

    /// Time a room must stay armed before it may lock.
    #[must_use]
    pub const fn arm_delay(&self) -> Duration {
        self.arm_delay
    }

    /// Distance the player must keep from every door of the room before it locks.
    #[must_use]
    pub const fn min_lock_depth(&self) -> f32 {
        self.min_lock_depth
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_millis(300), 48.0)
    }
}

/// Pure system that reads room progress and emits room state commands.
#[derive(Debug)]
pub struct Progression {
    config: Config,
    arming: BTreeMap<RoomId, Duration>,
    dungeon_cleared_declared: bool,
    game_over_declared: bool,
}

impl Progression {
    /// Creates a new progression system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            arming: BTreeMap::new(),
            dungeon_cleared_declared: false,
            game_over_declared: false,
        }
    }

    /// Consumes world events and the progression view to emit room commands.
    ///
    /// Bookkeeping events are always recorded; room conditions are only
    /// evaluated for batches that advanced time.
    pub fn handle(&mut self, events: &[Event], view: &ProgressionView, out: &mut Vec<Command>) {
        let mut elapsed = Duration::ZERO;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => elapsed = elapsed.saturating_add(*dt),
                Event::RoomArmed { room } => {
                    let _ = self.arming.insert(*room, Duration::ZERO);
                }
                Event::RoomDisarmed { room } | Event::RoomLocked { room } => {
                    let _ = self.arming.remove(room);
                }
                _ => {}
            }
        }

        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        self.arming.retain(|room, _| {
            view.room(*room).map(|progress| progress.state) == Some(RoomState::Arming)
        });

        let current = view.current_room();
        for room in view.iter() {
            let inside = current == Some(room.id);
            match room.state {
                RoomState::Unvisited if inside => {
                    debug!("arming room {}", room.id.get());
                    out.push(Command::ArmRoom { room: room.id });
                }
                RoomState::Arming if !inside => {
                    debug!("player left room {} before it locked", room.id.get());
                    out.push(Command::DisarmRoom { room: room.id });
                }
                RoomState::Arming => {
                    let timer = self.arming.entry(room.id).or_default();
                    *timer = timer.saturating_add(elapsed);
                    let armed_for = *timer;
                    let depth = penetration_depth(&view.player(), room);
                    if armed_for >= self.config.arm_delay && depth >= self.config.min_lock_depth {
                        debug!("locking room {} at depth {depth:.1}", room.id.get());
                        out.push(Command::LockRoom { room: room.id });
                    }
                }
                RoomState::Locked if room.live_enemies == 0 => {
                    debug!("room {} has no enemies left", room.id.get());
                    out.push(Command::ClearRoom { room: room.id });
                }
                _ => {}
            }
        }

        if view.all_cleared() && !self.dungeon_cleared_declared {
            self.dungeon_cleared_declared = true;
            out.push(Command::DeclareDungeonCleared);
        }

        if !view.player_alive() && !self.game_over_declared {
            self.game_over_declared = true;
            out.push(Command::DeclareGameOver);
        }
    }
}

/// Distance between the player and the nearest door of the room.
///
/// A room without doors is treated as infinitely deep.
#[must_use]
pub fn penetration_depth(player: &Rect, room: &RoomProgress) -> f32 {
    room.doors
        .iter()
        .map(|door| player.edge_gap(door))
        .fold(f32::INFINITY, f32::min)
}
