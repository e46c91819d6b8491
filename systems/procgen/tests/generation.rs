use delve_core::{DoorKey, Dungeon, Orientation, RoomState, Tile, TileRect};
use delve_system_procgen::{generate, Config, GRID_PADDING};

fn seeded(seed: u64, rooms: usize) -> Config {
    Config::new(Some(seed), rooms, (20, 15), 15, 30)
}

fn encode(dungeon: &Dungeon) -> Vec<u8> {
    let rooms: Vec<(TileRect, Vec<DoorKey>, RoomState)> = dungeon
        .rooms
        .iter()
        .map(|room| (room.rect_full, room.door_keys.clone(), room.state))
        .collect();
    let doors: Vec<_> = dungeon.doors.values().collect();
    bincode::serialize(&(&dungeon.grid, rooms, doors, &dungeon.dropped_links))
        .expect("dungeon should serialise")
}

#[test]
fn same_seed_produces_identical_dungeons() {
    for seed in [0, 7, 42, 0xdead_beef] {
        let first = generate(&seeded(seed, 8));
        let second = generate(&seeded(seed, 8));

        assert_eq!(encode(&first), encode(&second), "seed {seed} diverged");
        assert_eq!(first.spawn, second.spawn);
        assert_eq!(first.adjacency, second.adjacency);
    }
}

#[test]
fn seed_42_with_six_rooms_yields_six_rooms() {
    let dungeon = generate(&seeded(42, 6));

    assert_eq!(dungeon.rooms.len(), 6);
    assert_eq!(
        dungeon.room(dungeon.start_room).map(|room| room.state),
        Some(RoomState::Cleared)
    );
    for room in dungeon.rooms.iter().filter(|room| room.id != dungeon.start_room) {
        assert_eq!(room.state, RoomState::Unvisited, "room {:?}", room.id);
    }
}

#[test]
fn rooms_never_overlap() {
    for seed in 0..32 {
        let dungeon = generate(&seeded(seed, 10));
        for (index, room) in dungeon.rooms.iter().enumerate() {
            for other in &dungeon.rooms[index + 1..] {
                assert!(
                    !room.rect_full.overlaps(&other.rect_full),
                    "seed {seed}: {:?} overlaps {:?}",
                    room.id,
                    other.id
                );
            }
        }
    }
}

#[test]
fn reachable_rooms_have_a_carved_connector() {
    for seed in 0..32 {
        let dungeon = generate(&seeded(seed, 8));
        let reachable = dungeon.reachable_from(dungeon.start_room);

        if reachable.len() > 1 {
            for room in dungeon.rooms.iter().filter(|room| reachable.contains(&room.id)) {
                let has_door = dungeon.doors_of(room.id).any(|door| {
                    let other = if door.rooms.0 == room.id {
                        door.rooms.1
                    } else {
                        door.rooms.0
                    };
                    reachable.contains(&other)
                });
                assert!(has_door, "seed {seed}: room {:?} has no carved door", room.id);
            }
        }

        if !dungeon.unreachable_rooms().is_empty() {
            assert!(
                !dungeon.dropped_links.is_empty(),
                "seed {seed}: unreachable rooms must be flagged by dropped links"
            );
        }
    }
}

#[test]
fn doors_are_double_tiles_listed_by_both_rooms() {
    let dungeon = generate(&seeded(3, 8));

    for (key, door) in &dungeon.doors {
        let (column, row) = (key.column, key.row);
        let second = match key.orientation {
            Orientation::Horizontal => (column + 1, row),
            Orientation::Vertical => (column, row + 1),
        };
        assert_eq!(dungeon.grid.tile_at(column, row), Tile::Door);
        assert_eq!(dungeon.grid.tile_at(second.0, second.1), Tile::Door);

        for room in [door.rooms.0, door.rooms.1] {
            let keys = &dungeon.room(room).expect("door room exists").door_keys;
            assert_eq!(
                keys.iter().filter(|candidate| *candidate == key).count(),
                1,
                "door {key:?} must be listed exactly once by room {room:?}"
            );
        }
    }

    assert_eq!(dungeon.grid.count(Tile::Door), dungeon.doors.len() * 4);
    assert_eq!(dungeon.grid.count(Tile::Hall), dungeon.doors.len() * 4);
}

#[test]
fn grid_is_surrounded_by_void_padding() {
    let dungeon = generate(&seeded(11, 6));
    let width = dungeon.grid.width() as i32;
    let height = dungeon.grid.height() as i32;

    for offset in 0..GRID_PADDING {
        for column in 0..width {
            assert_eq!(dungeon.grid.tile_at(column, offset), Tile::Void);
            assert_eq!(dungeon.grid.tile_at(column, height - 1 - offset), Tile::Void);
        }
        for row in 0..height {
            assert_eq!(dungeon.grid.tile_at(offset, row), Tile::Void);
            assert_eq!(dungeon.grid.tile_at(width - 1 - offset, row), Tile::Void);
        }
    }

    let spawn_room = dungeon
        .room_containing(dungeon.spawn)
        .expect("spawn lies inside a room");
    assert_eq!(spawn_room, dungeon.start_room);
}

#[test]
fn exhausted_budget_still_returns_a_valid_dungeon() {
    let config = Config::new(Some(5), 200, (6, 6), 5, 6);
    let dungeon = generate(&config);

    assert!(!dungeon.rooms.is_empty());
    assert!(dungeon.rooms.len() <= 200);
    assert_eq!(dungeon.adjacency.len(), dungeon.rooms.len());
}
