use bitvec::prelude::{BitSlice, BitVec, Lsb0};

/// Square occupancy bitmap, stored row-major: `index = y * edge + x`.
///
/// Single-tile accessors only check bounds with `debug_assert!`. Out-of-range
/// coordinates in release builds either panic inside the bit vector or alias a
/// tile in the next row; callers validate regions before touching the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TileGrid {
    // bits.len() == edge * edge
    edge: u32,
    bits: BitVec<usize, Lsb0>,
}

impl TileGrid {
    pub(crate) fn new(edge: u32, tile_count: usize) -> Self {
        debug_assert_eq!(tile_count, edge as usize * edge as usize);
        Self {
            edge,
            bits: BitVec::repeat(false, tile_count),
        }
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.edge as usize + x as usize
    }

    #[inline]
    pub(crate) fn get(&self, x: u32, y: u32) -> bool {
        debug_assert!(
            x < self.edge && y < self.edge,
            "tile ({x}, {y}) is out of bounds for {edge}x{edge} grid",
            edge = self.edge
        );
        self.bits[self.index(x, y)]
    }

    pub(crate) fn try_get(&self, x: u32, y: u32) -> Option<bool> {
        if x >= self.edge || y >= self.edge {
            return None;
        }
        self.bits.get(self.index(x, y)).map(|bit| *bit)
    }

    #[inline]
    pub(crate) fn set(&mut self, x: u32, y: u32, flag: bool) {
        debug_assert!(
            x < self.edge && y < self.edge,
            "tile ({x}, {y}) is out of bounds for {edge}x{edge} grid",
            edge = self.edge
        );
        let index = self.index(x, y);
        self.bits.set(index, flag);
    }

    /// `width` tiles of row `y` starting at column `x`.
    #[inline]
    pub(crate) fn row_span(&self, x: u32, y: u32, width: u32) -> &BitSlice<usize, Lsb0> {
        let start = self.index(x, y);
        &self.bits[start..start + width as usize]
    }

    pub(crate) fn count_reserved(&self) -> usize {
        self.bits.count_ones()
    }

    pub(crate) fn fill(&mut self, flag: bool) {
        self.bits.fill(flag);
    }

    pub(crate) fn iter_reserved(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let edge = self.edge as usize;
        self.bits
            .iter_ones()
            .map(move |index| ((index % edge) as u32, (index / edge) as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::TileGrid;

    fn grid(edge: u32) -> TileGrid {
        TileGrid::new(edge, edge as usize * edge as usize)
    }

    #[test]
    fn new_grid_is_empty() {
        let grid = grid(4);
        assert_eq!(grid.count_reserved(), 0);
        assert_eq!(grid.iter_reserved().count(), 0);
    }

    #[test]
    fn set_and_get_are_row_major() {
        let mut grid = grid(4);
        grid.set(3, 1, true);
        assert!(grid.get(3, 1));
        assert!(!grid.get(1, 3));
        assert!(grid.row_span(0, 1, 4)[3]);
        assert_eq!(grid.iter_reserved().collect::<Vec<_>>(), vec![(3, 1)]);
    }

    #[test]
    fn try_get_rejects_out_of_range() {
        let mut grid = grid(2);
        grid.set(1, 1, true);
        assert_eq!(grid.try_get(1, 1), Some(true));
        assert_eq!(grid.try_get(0, 1), Some(false));
        assert_eq!(grid.try_get(2, 0), None);
        assert_eq!(grid.try_get(0, 2), None);
    }

    #[test]
    fn row_span_covers_only_requested_columns() {
        let mut grid = grid(4);
        grid.set(0, 2, true);
        grid.set(3, 2, true);
        assert!(grid.row_span(1, 2, 2).not_any());
        assert!(grid.row_span(0, 2, 2).any());
    }

    #[test]
    fn fill_sets_every_tile() {
        let mut grid = grid(3);
        grid.fill(true);
        assert_eq!(grid.count_reserved(), 9);
        grid.fill(false);
        assert_eq!(grid.count_reserved(), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "out of bounds")]
    fn get_out_of_range_asserts_in_debug() {
        let grid = grid(2);
        let _ = grid.get(2, 0);
    }
}
