use std::time::Duration;

use delve_core::{
    Command, Direction, EnemyKind, Event, FireDirection, FrameInput, Orientation, Rect, RoomId,
    RoomState, SceneRequest, Team,
};
use delve_system_procgen::{generate, Config};
use delve_world::{apply, query, World};
use glam::Vec2;

const FRAME: Duration = Duration::from_millis(16);
const PLAYER_SPEED: f32 = 160.0;

fn world() -> World {
    World::new(generate(&Config::new(Some(42), 6, (20, 15), 15, 30)), 11)
}

fn run(world: &mut World, commands: impl IntoIterator<Item = Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        apply(world, command, &mut events);
    }
    events
}

/// First non-start room with at least one carved door.
fn doored_room(world: &World) -> RoomId {
    let dungeon = query::dungeon(world);
    dungeon
        .rooms
        .iter()
        .map(|room| room.id)
        .find(|room| *room != dungeon.start_room && dungeon.doors_of(*room).count() > 0)
        .expect("seed 42 carves at least one door")
}

fn lock(world: &mut World, room: RoomId) -> Vec<Event> {
    run(world, [Command::ArmRoom { room }, Command::LockRoom { room }])
}

fn tick(input: FrameInput) -> Command {
    Command::Tick { dt: FRAME, input }
}

fn firing(aim: FireDirection) -> FrameInput {
    FrameInput {
        movement: Vec2::ZERO,
        fire: Some(aim),
    }
}

/// Walks the player by `offset` in a single tick.
fn walk(world: &mut World, offset: Vec2) {
    let distance = offset.length();
    if distance < 0.01 {
        return;
    }
    let _ = run(
        world,
        [Command::Tick {
            dt: Duration::from_secs_f32(distance / PLAYER_SPEED),
            input: FrameInput::moving(offset / distance),
        }],
    );
}

/// Locks the room behind one of the start room's doors and walks the player
/// up to `gap` pixels in front of it. Returns the door and the aim toward it.
fn facing_locked_door(world: &mut World, gap: f32) -> (Rect, FireDirection) {
    let dungeon = query::dungeon(world);
    let start = dungeon.start_room;
    let door = *dungeon
        .doors_of(start)
        .next()
        .expect("seed 42 gives the start room a door");
    let start_is_first = door.rooms.0 == start;
    let beyond = if start_is_first {
        door.rooms.1
    } else {
        door.rooms.0
    };
    let _ = lock(world, beyond);
    assert_eq!(query::door_open(world, &door.key), Some(false));

    let half = query::player(world).rect.width() * 0.5;
    let rect = door.rect;
    let (aim, target) = match (door.orientation, start_is_first) {
        (Orientation::Horizontal, true) => (
            (0, 1),
            Vec2::new(rect.center().x, rect.top() - gap - half),
        ),
        (Orientation::Horizontal, false) => (
            (0, -1),
            Vec2::new(rect.center().x, rect.bottom() + gap + half),
        ),
        (Orientation::Vertical, true) => (
            (1, 0),
            Vec2::new(rect.left() - gap - half, rect.center().y),
        ),
        (Orientation::Vertical, false) => (
            (-1, 0),
            Vec2::new(rect.right() + gap + half, rect.center().y),
        ),
    };

    let center = query::player(world).rect.center();
    walk(world, Vec2::new(target.x - center.x, 0.0));
    let center = query::player(world).rect.center();
    walk(world, Vec2::new(0.0, target.y - center.y));
    let arrived = query::player(world).rect.center();
    assert!(
        arrived.distance(target) < 1.0,
        "player stopped at {arrived:?} instead of {target:?}"
    );

    let aim = FireDirection::new(aim.0, aim.1).expect("aim is non-zero");
    (rect, aim)
}

#[test]
fn locking_closes_every_door_of_the_room() {
    let mut world = world();
    let room = doored_room(&world);
    let door_count = query::dungeon(&world).doors_of(room).count();

    let events = lock(&mut world, room);

    let closed = events
        .iter()
        .filter(|event| matches!(event, Event::DoorStateChanged { open: false, .. }))
        .count();
    assert_eq!(closed, door_count);
    assert!(events.contains(&Event::RoomLocked { room }));
    assert_eq!(query::blockers(&world).len(), door_count);
    for door in query::dungeon(&world).doors_of(room) {
        assert_eq!(query::door_open(&world, &door.key), Some(false));
    }
}

#[test]
fn killing_the_last_of_three_enemies_allows_the_clear() {
    let mut world = world();
    let room = doored_room(&world);
    let center = query::dungeon(&world).rooms[room.get() as usize].center;
    let _ = lock(&mut world, room);

    let spawns = [Vec2::new(-64.0, 0.0), Vec2::ZERO, Vec2::new(64.0, 0.0)].map(|offset| {
        Command::SpawnEnemy {
            room,
            kind: EnemyKind::Turret,
            origin: center + offset,
            facing: Direction::North,
        }
    });
    let events = run(&mut world, spawns);
    let ids: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::EnemySpawned { enemy, .. } => Some(*enemy),
            _ => None,
        })
        .collect();
    assert_eq!(ids.len(), 3);

    let _ = run(
        &mut world,
        ids[..2].iter().map(|enemy| Command::DamageEnemy {
            enemy: *enemy,
            amount: 99,
        }),
    );
    let premature = run(&mut world, [Command::ClearRoom { room }]);
    assert!(premature.is_empty(), "one enemy is still alive");
    assert_eq!(query::live_enemies_in(&world, room), 1);

    let events = run(
        &mut world,
        [
            Command::DamageEnemy {
                enemy: ids[2],
                amount: 6,
            },
            Command::ClearRoom { room },
        ],
    );

    assert!(events.contains(&Event::EnemyDefeated {
        enemy: ids[2],
        room
    }));
    assert!(events.contains(&Event::RoomCleared { room }));
    assert_eq!(query::room_state(&world, room), Some(RoomState::Cleared));
    for door in query::dungeon(&world).doors_of(room) {
        assert_eq!(query::door_open(&world, &door.key), Some(true));
    }
}

#[test]
fn player_shots_damage_enemies() {
    let mut world = world();
    let room = doored_room(&world);
    let _ = lock(&mut world, room);
    let target = query::player(&world).rect.center() + Vec2::new(80.0, 0.0);
    let _ = run(
        &mut world,
        [Command::SpawnEnemy {
            room,
            kind: EnemyKind::Turret,
            origin: target,
            facing: Direction::North,
        }],
    );

    let fire = FrameInput {
        movement: Vec2::ZERO,
        fire: FireDirection::new(1, 0),
    };
    let events = run(&mut world, std::iter::repeat(tick(fire)).take(20));

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::EnemyDamaged { .. })));
}

#[test]
fn shots_stop_at_walls() {
    let mut world = world();
    let dungeon = query::dungeon(&world);
    let origin = query::player(&world).rect.center();
    let doors: Vec<Rect> = dungeon
        .doors_of(dungeon.start_room)
        .map(|door| door.rect)
        .collect();
    let (dx, dy) = [(0, -1), (1, 0), (0, 1), (-1, 0)]
        .into_iter()
        .find(|(dx, dy)| {
            let lane = Rect::from_center(origin, Vec2::splat(6.0))
                .union(&Rect::from_center(
                    origin + Vec2::new(f32::from(*dx), f32::from(*dy)) * 400.0,
                    Vec2::splat(6.0),
                ));
            !doors.iter().any(|door| door.intersects(&lane))
        })
        .expect("some wall of the start room has no door in line with the spawn");
    let aim = FireDirection::new(dx, dy).expect("aim is non-zero");

    // Long enough to reach any wall of the start room, short of the shot's lifetime.
    let events = run(
        &mut world,
        [Command::Tick {
            dt: Duration::from_millis(1100),
            input: firing(aim),
        }],
    );

    assert!(events.contains(&Event::ProjectileFired { team: Team::Player }));
    assert!(
        query::projectiles(&world).is_empty(),
        "the shot is removed when it reaches the wall"
    );
}

#[test]
fn shots_stop_at_closed_doors() {
    let mut world = world();
    let (door, aim) = facing_locked_door(&mut world, 20.0);

    let _ = run(&mut world, [tick(firing(aim))]);
    assert_eq!(query::projectiles(&world).len(), 1);

    for _ in 0..30 {
        let _ = run(&mut world, [tick(FrameInput::idle())]);
        for shot in query::projectiles(&world) {
            assert!(!shot.rect.intersects(&door), "shot entered the closed door");
        }
    }
    assert!(query::projectiles(&world).is_empty());
}

#[test]
fn long_frames_do_not_carry_shots_through_closed_doors() {
    let mut world = world();
    let (door, aim) = facing_locked_door(&mut world, 20.0);

    let events = run(
        &mut world,
        [Command::Tick {
            dt: Duration::from_millis(550),
            input: firing(aim),
        }],
    );

    assert!(events.contains(&Event::ProjectileFired { team: Team::Player }));
    let in_flight = query::projectiles(&world);
    assert!(
        in_flight.is_empty(),
        "the closed door at {door:?} absorbs the shot, still flying: {in_flight:?}"
    );
}

#[test]
fn dungeon_cleared_fires_exactly_once() {
    let mut world = world();
    let rooms: Vec<_> = query::dungeon(&world)
        .rooms
        .iter()
        .map(|room| room.id)
        .collect();
    for room in rooms {
        let _ = run(
            &mut world,
            [
                Command::ArmRoom { room },
                Command::LockRoom { room },
                Command::ClearRoom { room },
            ],
        );
    }

    let events = run(
        &mut world,
        [
            Command::DeclareDungeonCleared,
            tick(FrameInput::idle()),
            Command::DeclareDungeonCleared,
            Command::RequestPause,
        ],
    );

    let wins = events
        .iter()
        .filter(|event| **event == Event::DungeonCleared)
        .count();
    assert_eq!(wins, 1);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::SceneRequested {
            request: SceneRequest::YouWin(_)
        }
    )));
    assert!(
        !events.iter().any(|event| matches!(
            event,
            Event::SceneRequested {
                request: SceneRequest::Pause(_)
            }
        )),
        "pause is not offered once the run is over"
    );
}

#[test]
fn game_over_requires_a_dead_player() {
    let mut world = world();

    let events = run(&mut world, [Command::DeclareGameOver]);

    assert!(events.is_empty());
    assert!(query::run_is_live(&world));
}
