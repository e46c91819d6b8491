use delve_core::TileGrid;

/// Debug picture of a grid, one line per row using each tile's glyph.
#[must_use]
pub fn render_ascii(grid: &TileGrid) -> String {
    let mut out = String::with_capacity(((grid.width() + 1) * grid.height()) as usize);
    for (index, row) in grid.rows().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        out.extend(row.iter().map(|tile| tile.glyph()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_core::Tile;

    #[test]
    fn draws_every_tile_kind() {
        let mut grid = TileGrid::filled(5, 2, Tile::Void);
        let _ = grid.set(0, 0, Tile::Wall);
        let _ = grid.set(1, 0, Tile::Floor);
        let _ = grid.set(2, 0, Tile::Door);
        let _ = grid.set(3, 0, Tile::Hall);

        assert_eq!(render_ascii(&grid), "#.+: \n     ");
    }
}
