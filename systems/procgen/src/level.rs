use delve_core::{Direction, Tile, TileGrid, TILE_SIZE};
use glam::Vec2;
use thiserror::Error;

/// Door marker found in a hand-authored level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DoorMarker {
    /// Side the marker glyph names (`U`, `R`, `D` or `L`).
    pub side: Direction,
    /// Column of the marker.
    pub column: i32,
    /// Row of the marker.
    pub row: i32,
}

/// Grid and markers parsed from level text.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelLayout {
    /// Parsed tiles; ragged rows are padded with void.
    pub grid: TileGrid,
    /// Pixel centre of the spawn tile.
    pub spawn: Vec2,
    /// Door markers in reading order.
    pub door_markers: Vec<DoorMarker>,
}

/// Errors raised while parsing level text.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LevelParseError {
    /// The text contains no rows.
    #[error("level text is empty")]
    Empty,
    /// A glyph outside the level alphabet was found.
    #[error("unknown glyph `{glyph}` at column {column}, row {row}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Column of the character.
        column: usize,
        /// Row of the character.
        row: usize,
    },
    /// More than one `P` marker was found.
    #[error("second spawn marker at column {column}, row {row}")]
    DuplicateSpawn {
        /// Column of the second marker.
        column: usize,
        /// Row of the second marker.
        row: usize,
    },
}

/// Parses ASCII level text.
///
/// `.` is floor, `#` wall, `U`/`D`/`L`/`R` door tiles, `P` the floor tile the
/// player spawns on and a space is void. A level without `P` spawns the
/// player on tile (1, 1).
pub fn parse_level(text: &str) -> Result<LevelLayout, LevelParseError> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.iter().all(|line| line.is_empty()) {
        return Err(LevelParseError::Empty);
    }

    let width = lines
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);
    let mut grid = TileGrid::filled(width as u32, lines.len() as u32, Tile::Void);
    let mut spawn_tile = None;
    let mut door_markers = Vec::new();

    for (row, line) in lines.iter().enumerate() {
        for (column, glyph) in line.chars().enumerate() {
            let tile = match glyph {
                '.' => Tile::Floor,
                '#' => Tile::Wall,
                ' ' => Tile::Void,
                'P' => {
                    if spawn_tile.replace((column, row)).is_some() {
                        return Err(LevelParseError::DuplicateSpawn { column, row });
                    }
                    Tile::Floor
                }
                'U' | 'D' | 'L' | 'R' => {
                    door_markers.push(DoorMarker {
                        side: marker_side(glyph),
                        column: column as i32,
                        row: row as i32,
                    });
                    Tile::Door
                }
                _ => return Err(LevelParseError::UnknownGlyph { glyph, column, row }),
            };
            let _ = grid.set(column as i32, row as i32, tile);
        }
    }

    let (column, row) = spawn_tile.unwrap_or((1, 1));
    Ok(LevelLayout {
        grid,
        spawn: Vec2::new(
            (column as f32 + 0.5) * TILE_SIZE,
            (row as f32 + 0.5) * TILE_SIZE,
        ),
        door_markers,
    })
}

fn marker_side(glyph: char) -> Direction {
    match glyph {
        'U' => Direction::North,
        'R' => Direction::East,
        'D' => Direction::South,
        _ => Direction::West,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOM: &str = "\
#####
#P..#
#...R
####";

    #[test]
    fn parses_tiles_markers_and_spawn() {
        let layout = parse_level(ROOM).expect("room should parse");

        assert_eq!(layout.grid.width(), 5);
        assert_eq!(layout.grid.height(), 4);
        assert_eq!(layout.grid.tile_at(1, 1), Tile::Floor);
        assert_eq!(layout.grid.tile_at(4, 2), Tile::Door);
        assert_eq!(layout.grid.tile_at(4, 3), Tile::Void, "ragged row is padded");
        assert_eq!(layout.spawn, Vec2::new(48.0, 48.0));
        assert_eq!(
            layout.door_markers,
            vec![DoorMarker {
                side: Direction::East,
                column: 4,
                row: 2,
            }]
        );
    }

    #[test]
    fn missing_spawn_defaults_to_first_interior_tile() {
        let layout = parse_level("###\n#.#\n###").expect("room should parse");
        assert_eq!(layout.spawn, Vec2::new(48.0, 48.0));
    }

    #[test]
    fn rejects_unknown_glyphs_and_duplicate_spawns() {
        assert_eq!(
            parse_level("#?#"),
            Err(LevelParseError::UnknownGlyph {
                glyph: '?',
                column: 1,
                row: 0,
            })
        );
        assert_eq!(
            parse_level("P.\n.P"),
            Err(LevelParseError::DuplicateSpawn { column: 1, row: 1 })
        );
        assert_eq!(parse_level(""), Err(LevelParseError::Empty));
    }
}
