use delve_core::{Rect, Tile, TileGrid, TILE_SIZE};
use delve_system_collision::{
    move_axis_separated, move_bounce, overlaps_solid, resolve_overlaps, Arena, Body,
    SEPARATION_ITERATIONS,
};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn walled_room(width: u32, height: u32) -> TileGrid {
    let mut grid = TileGrid::filled(width, height, Tile::Floor);
    for column in 0..width as i32 {
        let _ = grid.set(column, 0, Tile::Wall);
        let _ = grid.set(column, height as i32 - 1, Tile::Wall);
    }
    for row in 0..height as i32 {
        let _ = grid.set(0, row, Tile::Wall);
        let _ = grid.set(width as i32 - 1, row, Tile::Wall);
    }
    grid
}

#[test]
fn movement_never_ends_inside_solid_tiles() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);

    for _ in 0..64 {
        let mut grid = walled_room(12, 10);
        for _ in 0..14 {
            let column = rng.gen_range(1..11);
            let row = rng.gen_range(1..9);
            let _ = grid.set(column, row, Tile::Wall);
        }
        let arena = Arena::new(&grid, &[]);

        for _ in 0..32 {
            let size = rng.gen_range(6.0..30.0_f32).round();
            let start = Rect::new(
                rng.gen_range(TILE_SIZE..grid.pixel_width() - TILE_SIZE - size),
                rng.gen_range(TILE_SIZE..grid.pixel_height() - TILE_SIZE - size),
                size,
                size,
            );
            if overlaps_solid(&arena, &start) {
                continue;
            }

            let delta = Vec2::new(rng.gen_range(-150.0..150.0), rng.gen_range(-150.0..150.0));
            let motion = move_axis_separated(&arena, start, delta);

            assert!(
                !overlaps_solid(&arena, &motion.rect),
                "{start:?} moved by {delta:?} ended at {:?}",
                motion.rect
            );
        }
    }
}

#[test]
fn fast_movement_does_not_tunnel_through_a_wall() {
    let mut grid = walled_room(10, 5);
    for row in 0..5 {
        let _ = grid.set(4, row, Tile::Wall);
    }
    let arena = Arena::new(&grid, &[]);
    let start = Rect::new(40.0, 40.0, 20.0, 20.0);

    let motion = move_axis_separated(&arena, start, Vec2::new(200.0, 0.0));

    assert!(motion.blocked_x);
    assert_eq!(motion.rect.right(), 4.0 * TILE_SIZE, "snaps to the wall face");
}

#[test]
fn blockers_clamp_movement_unless_already_overlapping() {
    let grid = walled_room(10, 6);
    let door = Rect::new(160.0, 32.0, 32.0, 128.0);
    let blockers = [door];
    let arena = Arena::new(&grid, &blockers);

    let approaching = Rect::new(100.0, 64.0, 28.0, 28.0);
    let motion = move_axis_separated(&arena, approaching, Vec2::new(50.0, 0.0));
    assert!(motion.blocked_x);
    assert_eq!(motion.rect.right(), door.left());

    let trapped = Rect::new(150.0, 64.0, 28.0, 28.0);
    let motion = move_axis_separated(&arena, trapped, Vec2::new(20.0, 0.0));
    assert!(!motion.blocked_x, "a door closing on a body must not trap it");
    assert_eq!(motion.rect.left(), 170.0);
}

#[test]
fn long_steps_cannot_skip_a_blocker() {
    let grid = walled_room(20, 6);
    let west = Rect::new(160.0, 32.0, 32.0, 128.0);
    let east = Rect::new(320.0, 32.0, 32.0, 128.0);
    let blockers = [east, west];
    let arena = Arena::new(&grid, &blockers);
    let shot = Rect::new(100.0, 80.0, 6.0, 6.0);

    let motion = move_axis_separated(&arena, shot, Vec2::new(330.0, 0.0));
    assert!(motion.blocked_x);
    assert_eq!(motion.rect.right(), west.left(), "stops at the first blocker crossed");

    let returning = shot.translated(Vec2::new(500.0, 0.0));
    let motion = move_axis_separated(&arena, returning, Vec2::new(-400.0, 0.0));
    assert!(motion.blocked_x);
    assert_eq!(motion.rect.left(), east.right());
}

#[test]
fn bouncing_reverses_only_the_blocked_axis() {
    let grid = walled_room(6, 6);
    let arena = Arena::new(&grid, &[]);
    let rect = Rect::new(130.0, 80.0, 22.0, 22.0);

    let bounce = move_bounce(&arena, rect, Vec2::new(240.0, 60.0), 0.1);

    assert!(bounce.bounced);
    assert_eq!(bounce.velocity, Vec2::new(-240.0, 60.0));
    assert_eq!(bounce.rect.right(), 5.0 * TILE_SIZE);
}

#[test]
fn separation_splits_between_pushables_and_respects_immovables() {
    let grid = walled_room(12, 12);
    let arena = Arena::new(&grid, &[]);

    let mut bodies = [
        Body {
            rect: Rect::new(100.0, 100.0, 24.0, 24.0),
            pushable: true,
        },
        Body {
            rect: Rect::new(116.0, 100.0, 24.0, 24.0),
            pushable: true,
        },
        Body {
            rect: Rect::new(200.0, 200.0, 24.0, 24.0),
            pushable: false,
        },
        Body {
            rect: Rect::new(220.0, 204.0, 24.0, 24.0),
            pushable: true,
        },
    ];

    resolve_overlaps(&arena, &mut bodies, SEPARATION_ITERATIONS);

    assert!(!bodies[0].rect.intersects(&bodies[1].rect));
    assert_eq!(bodies[0].rect.left(), 96.0);
    assert_eq!(bodies[1].rect.left(), 120.0);
    assert_eq!(bodies[2].rect, Rect::new(200.0, 200.0, 24.0, 24.0));
    assert_eq!(bodies[3].rect.left(), 224.0);
}

#[test]
fn separation_refuses_to_push_into_walls() {
    let grid = walled_room(6, 6);
    let arena = Arena::new(&grid, &[]);
    let mut bodies = [
        Body {
            rect: Rect::new(32.0, 64.0, 24.0, 24.0),
            pushable: true,
        },
        Body {
            rect: Rect::new(40.0, 64.0, 24.0, 24.0),
            pushable: false,
        },
    ];

    resolve_overlaps(&arena, &mut bodies, SEPARATION_ITERATIONS);

    assert_eq!(bodies[0].rect.left(), 32.0, "nudge into the wall is rejected");
}
