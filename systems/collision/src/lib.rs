#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tile-grid collision shared by the player, enemies and projectiles.
//!
//! Movement resolves one axis at a time: the full horizontal delta first,
//! then the vertical one. Each axis sweeps every tile column or row crossed by
//! the leading edge and snaps to the first solid boundary, then clamps against
//! dynamic blockers such as closed doors.

use std::ops::RangeInclusive;

use delve_core::{last_tile_before, tile_index, Rect, TileGrid, TILE_SIZE};
use glam::Vec2;

/// Relaxation passes used when separating overlapping bodies each frame.
pub const SEPARATION_ITERATIONS: usize = 2;

const MAX_BLOCKER_PASSES: usize = 16;

/// Static and dynamic solidity queried by the movement routines.
pub trait CollisionMap {
    /// Reports whether the tile at the coordinate blocks movement.
    fn is_solid_at(&self, column: i32, row: i32) -> bool;

    /// Returns a blocker intersecting `rect` that `origin` does not already intersect.
    ///
    /// Blockers that closed on top of a body are ignored for that body so it
    /// can walk out of them.
    fn blocker_hit(&self, rect: &Rect, origin: &Rect) -> Option<Rect>;
}

/// Collision map made of a tile grid plus closed-door blockers.
#[derive(Clone, Copy, Debug)]
pub struct Arena<'a> {
    grid: &'a TileGrid,
    blockers: &'a [Rect],
}

impl<'a> Arena<'a> {
    /// Creates an arena over the provided grid and blocker rectangles.
    #[must_use]
    pub const fn new(grid: &'a TileGrid, blockers: &'a [Rect]) -> Self {
        Self { grid, blockers }
    }

    /// Grid backing the arena.
    #[must_use]
    pub const fn grid(&self) -> &'a TileGrid {
        self.grid
    }

    /// Active blockers.
    #[must_use]
    pub const fn blockers(&self) -> &'a [Rect] {
        self.blockers
    }
}

impl CollisionMap for Arena<'_> {
    fn is_solid_at(&self, column: i32, row: i32) -> bool {
        self.grid.is_solid_at(column, row)
    }

    fn blocker_hit(&self, rect: &Rect, origin: &Rect) -> Option<Rect> {
        self.blockers
            .iter()
            .find(|blocker| blocker.intersects(rect) && !blocker.intersects(origin))
            .copied()
    }
}

/// Result of moving a rectangle with per-axis collision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    /// Rectangle after collision resolution.
    pub rect: Rect,
    /// Whether horizontal movement was cut short.
    pub blocked_x: bool,
    /// Whether vertical movement was cut short.
    pub blocked_y: bool,
}

impl Motion {
    /// Whether either axis was cut short.
    #[must_use]
    pub const fn blocked(&self) -> bool {
        self.blocked_x || self.blocked_y
    }
}

/// Moves `rect` by `delta`, resolving X fully before Y.
///
/// A rectangle that starts clear of solid tiles never ends overlapping one,
/// however large the delta.
#[must_use]
pub fn move_axis_separated<M: CollisionMap + ?Sized>(map: &M, rect: Rect, delta: Vec2) -> Motion {
    let (rect, blocked_x) = sweep(map, rect, delta.x, Axis::Horizontal);
    let (rect, blocked_y) = sweep(map, rect, delta.y, Axis::Vertical);
    Motion {
        rect,
        blocked_x,
        blocked_y,
    }
}

/// Result of moving a bouncing body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounce {
    /// Rectangle after collision resolution.
    pub rect: Rect,
    /// Velocity with every blocked component reversed.
    pub velocity: Vec2,
    /// Whether any axis bounced.
    pub bounced: bool,
}

/// Moves a body by `velocity * dt`, reflecting the velocity on blocked axes.
#[must_use]
pub fn move_bounce<M: CollisionMap + ?Sized>(
    map: &M,
    rect: Rect,
    velocity: Vec2,
    dt: f32,
) -> Bounce {
    let motion = move_axis_separated(map, rect, velocity * dt);
    let mut velocity = velocity;
    if motion.blocked_x {
        velocity.x = -velocity.x;
    }
    if motion.blocked_y {
        velocity.y = -velocity.y;
    }
    Bounce {
        rect: motion.rect,
        velocity,
        bounced: motion.blocked(),
    }
}

/// Reports whether any tile covered by `rect` is solid.
#[must_use]
pub fn overlaps_solid<M: CollisionMap + ?Sized>(map: &M, rect: &Rect) -> bool {
    let columns = tile_index(rect.left())..=last_tile_before(rect.right());
    let mut rows = tile_index(rect.top())..=last_tile_before(rect.bottom());
    rows.any(|row| columns.clone().any(|column| map.is_solid_at(column, row)))
}

/// Reports whether `rect` is obstructed, ignoring blockers `origin` already touches.
#[must_use]
pub fn is_obstructed<M: CollisionMap + ?Sized>(map: &M, rect: &Rect, origin: &Rect) -> bool {
    overlaps_solid(map, rect) || map.blocker_hit(rect, origin).is_some()
}

#[derive(Clone, Copy, Debug)]
enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    fn leading_span(self, rect: &Rect) -> (f32, f32) {
        match self {
            Self::Horizontal => (rect.left(), rect.right()),
            Self::Vertical => (rect.top(), rect.bottom()),
        }
    }

    fn extent(self, rect: &Rect) -> f32 {
        match self {
            Self::Horizontal => rect.width(),
            Self::Vertical => rect.height(),
        }
    }

    fn cross_lanes(self, rect: &Rect) -> RangeInclusive<i32> {
        match self {
            Self::Horizontal => tile_index(rect.top())..=last_tile_before(rect.bottom()),
            Self::Vertical => tile_index(rect.left())..=last_tile_before(rect.right()),
        }
    }

    fn lane_blocked<M: CollisionMap + ?Sized>(
        self,
        map: &M,
        lane: i32,
        mut cross: RangeInclusive<i32>,
    ) -> bool {
        match self {
            Self::Horizontal => cross.any(|row| map.is_solid_at(lane, row)),
            Self::Vertical => cross.any(|column| map.is_solid_at(column, lane)),
        }
    }

    fn offset(self, amount: f32) -> Vec2 {
        match self {
            Self::Horizontal => Vec2::new(amount, 0.0),
            Self::Vertical => Vec2::new(0.0, amount),
        }
    }

    fn place(self, rect: &Rect, start: f32) -> Rect {
        match self {
            Self::Horizontal => rect.with_left(start),
            Self::Vertical => rect.with_top(start),
        }
    }
}

fn sweep<M: CollisionMap + ?Sized>(map: &M, rect: Rect, delta: f32, axis: Axis) -> (Rect, bool) {
    if delta == 0.0 {
        return (rect, false);
    }

    let extent = axis.extent(&rect);
    let cross = axis.cross_lanes(&rect);
    let (start, end) = axis.leading_span(&rect);
    let mut moved = rect.translated(axis.offset(delta));
    let (moved_start, moved_end) = axis.leading_span(&moved);
    let mut blocked = false;

    if delta > 0.0 {
        let first = last_tile_before(end) + 1;
        let last = last_tile_before(moved_end);
        if let Some(lane) = (first..=last).find(|lane| axis.lane_blocked(map, *lane, cross.clone()))
        {
            moved = axis.place(&rect, lane as f32 * TILE_SIZE - extent);
            blocked = true;
        }
    } else {
        let first = tile_index(start) - 1;
        let last = tile_index(moved_start);
        if let Some(lane) = (last..=first)
            .rev()
            .find(|lane| axis.lane_blocked(map, *lane, cross.clone()))
        {
            moved = axis.place(&rect, (lane + 1) as f32 * TILE_SIZE);
            blocked = true;
        }
    }

    // Blockers are tested against the whole swept span so a long step cannot skip one.
    for _ in 0..MAX_BLOCKER_PASSES {
        let Some(blocker) = map.blocker_hit(&rect.union(&moved), &rect) else {
            break;
        };
        let (blocker_start, blocker_end) = axis.leading_span(&blocker);
        moved = if delta > 0.0 {
            axis.place(&moved, blocker_start - extent)
        } else {
            axis.place(&moved, blocker_end)
        };
        blocked = true;
    }

    (moved, blocked)
}

/// Body taking part in soft separation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    /// Collision rectangle.
    pub rect: Rect,
    /// Whether separation may move the body.
    pub pushable: bool,
}

/// Smallest displacement of `a` that ends its overlap with `b`.
#[must_use]
pub fn minimum_translation(a: &Rect, b: &Rect) -> Option<Vec2> {
    if !a.intersects(b) {
        return None;
    }

    let push_right = b.right() - a.left();
    let push_left = a.right() - b.left();
    let push_down = b.bottom() - a.top();
    let push_up = a.bottom() - b.top();

    let x = if push_right < push_left {
        push_right
    } else {
        -push_left
    };
    let y = if push_down < push_up {
        push_down
    } else {
        -push_up
    };

    Some(if x.abs() <= y.abs() {
        Vec2::new(x, 0.0)
    } else {
        Vec2::new(0.0, y)
    })
}

/// Pushes overlapping bodies apart along their minimum translation vector.
///
/// Two pushable bodies split the correction; a pushable body against an
/// immovable one takes all of it. Every nudge is re-validated against solid
/// tiles and blockers and skipped when obstructed.
pub fn resolve_overlaps<M: CollisionMap + ?Sized>(map: &M, bodies: &mut [Body], iterations: usize) {
    for _ in 0..iterations {
        for first in 0..bodies.len() {
            for second in first + 1..bodies.len() {
                let (a, b) = (bodies[first], bodies[second]);
                let Some(mtv) = minimum_translation(&a.rect, &b.rect) else {
                    continue;
                };
                let (nudge_a, nudge_b) = match (a.pushable, b.pushable) {
                    (true, true) => (mtv * 0.5, -mtv * 0.5),
                    (true, false) => (mtv, Vec2::ZERO),
                    (false, true) => (Vec2::ZERO, -mtv),
                    (false, false) => continue,
                };
                let _ = nudge(map, &mut bodies[first], nudge_a);
                let _ = nudge(map, &mut bodies[second], nudge_b);
            }
        }
    }
}

fn nudge<M: CollisionMap + ?Sized>(map: &M, body: &mut Body, offset: Vec2) -> bool {
    if offset == Vec2::ZERO {
        return false;
    }
    let moved = body.rect.translated(offset);
    if is_obstructed(map, &moved, &body.rect) {
        return false;
    }
    body.rect = moved;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimum_translation_picks_shallowest_axis() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(8.0, 2.0, 10.0, 10.0);

        assert_eq!(minimum_translation(&a, &b), Some(Vec2::new(-2.0, 0.0)));
        assert_eq!(
            minimum_translation(&a, &Rect::new(10.0, 0.0, 5.0, 5.0)),
            None
        );
    }
}
