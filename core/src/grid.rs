use serde::{Deserialize, Serialize};

use crate::TILE_SIZE;

/// Enumerated kinds of dungeon tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Walkable room interior.
    Floor,
    /// Room border ring.
    Wall,
    /// One half of a double door carved into a wall.
    Door,
    /// Empty space outside every room and corridor.
    Void,
    /// Corridor connecting two door halves.
    Hall,
}

impl Tile {
    /// Reports whether the tile blocks movement regardless of door state.
    ///
    /// Doors and halls are passable in the static grid; closed doors are
    /// enforced separately through blockers.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        matches!(self, Self::Wall | Self::Void)
    }

    /// Single character used when drawing the tile as text.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Floor => '.',
            Self::Wall => '#',
            Self::Door => '+',
            Self::Void => ' ',
            Self::Hall => ':',
        }
    }

    /// Neutral RGB colour renderers fall back to when a sprite is missing.
    #[must_use]
    pub const fn fallback_rgb(self) -> (u8, u8, u8) {
        if self.is_solid() {
            (90, 90, 90)
        } else {
            (25, 25, 25)
        }
    }
}

/// Dense row-major grid of tiles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Creates a grid of the provided size filled with a single tile kind.
    #[must_use]
    pub fn filled(width: u32, height: u32, tile: Tile) -> Self {
        Self {
            width,
            height,
            tiles: vec![tile; width as usize * height as usize],
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Width of the grid in pixels.
    #[must_use]
    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * TILE_SIZE
    }

    /// Height of the grid in pixels.
    #[must_use]
    pub fn pixel_height(&self) -> f32 {
        self.height as f32 * TILE_SIZE
    }

    fn index(&self, column: i32, row: i32) -> Option<usize> {
        if column < 0 || row < 0 {
            return None;
        }
        let (column, row) = (column as u32, row as u32);
        if column >= self.width || row >= self.height {
            return None;
        }
        Some(row as usize * self.width as usize + column as usize)
    }

    /// Tile stored at the provided coordinate; out-of-bounds reads yield [`Tile::Void`].
    #[must_use]
    pub fn tile_at(&self, column: i32, row: i32) -> Tile {
        self.index(column, row)
            .map_or(Tile::Void, |index| self.tiles[index])
    }

    /// Reports whether the tile at the coordinate is solid. Out of bounds is solid.
    #[must_use]
    pub fn is_solid_at(&self, column: i32, row: i32) -> bool {
        self.tile_at(column, row).is_solid()
    }

    /// Overwrites a single tile, returning `false` when the coordinate is out of bounds.
    pub fn set(&mut self, column: i32, row: i32, tile: Tile) -> bool {
        match self.index(column, row) {
            Some(index) => {
                self.tiles[index] = tile;
                true
            }
            None => false,
        }
    }

    /// Iterates over the grid one row at a time.
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> + '_ {
        self.tiles.chunks(self.width.max(1) as usize)
    }

    /// Counts the tiles of the provided kind.
    #[must_use]
    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|candidate| **candidate == tile).count()
    }

    /// Returns a copy of the grid surrounded by `margin` rows and columns of void.
    #[must_use]
    pub fn padded(&self, margin: u32) -> Self {
        let mut padded = Self::filled(
            self.width + margin * 2,
            self.height + margin * 2,
            Tile::Void,
        );
        for (row, tiles) in self.rows().enumerate() {
            for (column, tile) in tiles.iter().enumerate() {
                let _ = padded.set(
                    column as i32 + margin as i32,
                    row as i32 + margin as i32,
                    *tile,
                );
            }
        }
        padded
    }
}
