use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::TILE_SIZE;

/// Axis-aligned rectangle measured in world pixels.
///
/// Rectangles are plain values: every transformation returns a new rectangle
/// and leaves the receiver untouched. The right and bottom edges are
/// exclusive, so two rectangles that merely share an edge do not intersect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle of the provided size centred on `center`.
    #[must_use]
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self::new(
            center.x - size.x * 0.5,
            center.y - size.y * 0.5,
            size.x,
            size.y,
        )
    }

    /// Left edge of the rectangle.
    #[must_use]
    pub const fn left(&self) -> f32 {
        self.x
    }

    /// Top edge of the rectangle.
    #[must_use]
    pub const fn top(&self) -> f32 {
        self.y
    }

    /// Exclusive right edge of the rectangle.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Exclusive bottom edge of the rectangle.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Width of the rectangle.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Height of the rectangle.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Top-left corner of the rectangle.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Width and height packed into a vector.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Centre point of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Returns the rectangle shifted by the provided offset.
    #[must_use]
    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Returns the rectangle with its left edge moved to `x`.
    #[must_use]
    pub const fn with_left(&self, x: f32) -> Self {
        Self::new(x, self.y, self.width, self.height)
    }

    /// Returns the rectangle with its top edge moved to `y`.
    #[must_use]
    pub const fn with_top(&self, y: f32) -> Self {
        Self::new(self.x, y, self.width, self.height)
    }

    /// Returns the rectangle grown by `amount` on every side.
    #[must_use]
    pub fn inflated(&self, amount: f32) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }

    /// Smallest rectangle covering both rectangles.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Self {
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        Self::new(
            left,
            top,
            self.right().max(other.right()) - left,
            self.bottom().max(other.bottom()) - top,
        )
    }

    /// Reports whether the two rectangles share a region of positive area.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Reports whether the point lies inside the rectangle.
    #[must_use]
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }

    /// Euclidean distance between the closest edges of two rectangles.
    ///
    /// Overlapping or touching rectangles report a gap of zero.
    #[must_use]
    pub fn edge_gap(&self, other: &Rect) -> f32 {
        let dx = (other.left() - self.right())
            .max(self.left() - other.right())
            .max(0.0);
        let dy = (other.top() - self.bottom())
            .max(self.top() - other.bottom())
            .max(0.0);
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned rectangle measured in whole tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRect {
    column: i32,
    row: i32,
    width: i32,
    height: i32,
}

impl TileRect {
    /// Creates a tile rectangle anchored at the provided column and row.
    #[must_use]
    pub const fn new(column: i32, row: i32, width: i32, height: i32) -> Self {
        Self {
            column,
            row,
            width,
            height,
        }
    }

    /// Leftmost column covered by the rectangle.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Topmost row covered by the rectangle.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Number of columns covered by the rectangle.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Number of rows covered by the rectangle.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// First column past the right edge.
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.column + self.width
    }

    /// First row past the bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.row + self.height
    }

    /// Number of tiles covered by the rectangle.
    #[must_use]
    pub const fn area(&self) -> i32 {
        self.width * self.height
    }

    /// Reports whether the two rectangles share at least one tile.
    #[must_use]
    pub const fn overlaps(&self, other: &TileRect) -> bool {
        !(self.right() <= other.column
            || other.right() <= self.column
            || self.bottom() <= other.row
            || other.bottom() <= self.row)
    }

    /// Reports whether the tile lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, column: i32, row: i32) -> bool {
        column >= self.column && column < self.right() && row >= self.row && row < self.bottom()
    }

    /// Returns the rectangle grown by `margin` tiles on every side.
    #[must_use]
    pub const fn padded(&self, margin: i32) -> Self {
        Self::new(
            self.column - margin,
            self.row - margin,
            self.width + margin * 2,
            self.height + margin * 2,
        )
    }

    /// Returns the rectangle shrunk by `amount` tiles on every side.
    #[must_use]
    pub const fn shrunk(&self, amount: i32) -> Self {
        self.padded(-amount)
    }

    /// Returns the rectangle shifted by whole tiles.
    #[must_use]
    pub const fn translated(&self, columns: i32, rows: i32) -> Self {
        Self::new(
            self.column + columns,
            self.row + rows,
            self.width,
            self.height,
        )
    }

    /// Pixel-space rectangle covering the same tiles.
    #[must_use]
    pub fn to_pixels(&self) -> Rect {
        Rect::new(
            self.column as f32 * TILE_SIZE,
            self.row as f32 * TILE_SIZE,
            self.width as f32 * TILE_SIZE,
            self.height as f32 * TILE_SIZE,
        )
    }
}

/// Index of the tile containing the provided pixel coordinate.
#[must_use]
pub fn tile_index(coordinate: f32) -> i32 {
    (coordinate / TILE_SIZE).floor() as i32
}

/// Index of the last tile touched by a span ending at the exclusive `edge`.
#[must_use]
pub fn last_tile_before(edge: f32) -> i32 {
    (edge / TILE_SIZE).ceil() as i32 - 1
}
