//! Plain-text descriptions of dungeons, levels and events.

use std::fmt::Write as _;

use delve_core::{Dungeon, Event, RoomMeta, RoomState};
use delve_system_procgen::LevelLayout;

/// One-paragraph generation summary.
pub(crate) fn dungeon_summary(dungeon: &Dungeon) -> String {
    let mut out = format!(
        "{} rooms, {} doors, grid {}x{} tiles, spawn at ({:.0}, {:.0})",
        dungeon.rooms.len(),
        dungeon.doors.len(),
        dungeon.grid.width(),
        dungeon.grid.height(),
        dungeon.spawn.x,
        dungeon.spawn.y,
    );
    if !dungeon.dropped_links.is_empty() {
        let _ = write!(
            out,
            "\n{} placement links could not be carved",
            dungeon.dropped_links.len()
        );
    }
    let unreachable = dungeon.unreachable_rooms();
    if !unreachable.is_empty() {
        let ids: Vec<String> = unreachable.iter().map(|id| id.get().to_string()).collect();
        let _ = write!(out, "\nunreachable from start: {}", ids.join(", "));
    }
    out
}

/// Table of every room with its bounds, doors and progression state.
pub(crate) fn room_table(
    dungeon: &Dungeon,
    state_of: impl Fn(&RoomMeta) -> RoomState,
) -> String {
    let mut out = String::from("room  origin      size     doors  state");
    for room in &dungeon.rooms {
        let rect = room.rect_full;
        let marker = if room.id == dungeon.start_room { "*" } else { " " };
        let _ = write!(
            out,
            "\n{:>3}{marker}  ({:>3},{:>3})  {:>2}x{:<2}    {:>3}  {}",
            room.id.get(),
            rect.column(),
            rect.row(),
            rect.width(),
            rect.height(),
            room.door_keys.len(),
            state_name(state_of(room)),
        );
    }
    out
}

/// Summary of a parsed level file.
pub(crate) fn level_summary(layout: &LevelLayout) -> String {
    format!(
        "level {}x{} tiles, {} door markers, spawn at ({:.0}, {:.0})",
        layout.grid.width(),
        layout.grid.height(),
        layout.door_markers.len(),
        layout.spawn.x,
        layout.spawn.y,
    )
}

/// Line describing an event, or `None` for per-frame noise.
pub(crate) fn describe_event(event: &Event) -> Option<String> {
    let line = match event {
        Event::TimeAdvanced { .. } | Event::ProjectileFired { .. } | Event::Sound { .. } => {
            return None
        }
        Event::PlayerDamaged { amount, hp } => {
            format!("player took {amount} damage, {hp} hp left")
        }
        Event::EnemySpawned { enemy, room, kind } => format!(
            "{} #{} spawned in room {}",
            kind.name(),
            enemy.get(),
            room.get()
        ),
        Event::EnemyDamaged { enemy, hp } => format!("enemy #{} hit, {hp} hp left", enemy.get()),
        Event::EnemyDefeated { enemy, room } => {
            format!("enemy #{} defeated in room {}", enemy.get(), room.get())
        }
        Event::RoomArmed { room } => format!("room {} armed", room.get()),
        Event::RoomDisarmed { room } => format!("room {} disarmed", room.get()),
        Event::RoomLocked { room } => format!("room {} locked", room.get()),
        Event::RoomCleared { room } => format!("room {} cleared", room.get()),
        Event::DoorStateChanged { door, open } => format!(
            "door at ({}, {}) {}",
            door.column,
            door.row,
            if *open { "opened" } else { "closed" }
        ),
        Event::DungeonCleared => "dungeon cleared".to_owned(),
        Event::GameOver => "game over".to_owned(),
        Event::SceneRequested { request } => format!("scene request: {}", request.name()),
    };
    Some(line)
}

fn state_name(state: RoomState) -> &'static str {
    match state {
        RoomState::Unvisited => "unvisited",
        RoomState::Arming => "arming",
        RoomState::Locked => "locked",
        RoomState::Cleared => "cleared",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_core::{EnemyId, EnemyKind, RoomId};
    use delve_system_procgen::{generate, parse_level, Config};

    #[test]
    fn table_lists_every_room_and_marks_the_start() {
        let dungeon = generate(&Config::new(Some(42), 6, (20, 15), 15, 30));

        let table = room_table(&dungeon, |room| room.state);

        assert_eq!(table.lines().count(), dungeon.rooms.len() + 1);
        assert!(table.contains("0*"), "start room is starred:\n{table}");
        assert!(table.contains("cleared"));
    }

    #[test]
    fn level_summary_counts_markers() {
        let layout = parse_level("#####\n#P.R#\n#####\n").expect("level parses");

        assert_eq!(
            level_summary(&layout),
            "level 5x3 tiles, 1 door markers, spawn at (48, 48)"
        );
    }

    #[test]
    fn frame_noise_is_not_described() {
        assert_eq!(
            describe_event(&Event::TimeAdvanced {
                dt: std::time::Duration::from_millis(16)
            }),
            None
        );
        assert_eq!(
            describe_event(&Event::EnemySpawned {
                enemy: EnemyId::new(4),
                room: RoomId::new(2),
                kind: EnemyKind::Turret,
            })
            .as_deref(),
            Some("turret #4 spawned in room 2")
        );
    }
}
