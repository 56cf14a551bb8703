/// Single coordinate axis used for row/column counts and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Board position as `(row, column)`.
pub type Coord2 = (Coord, Coord);

/// `ndarray` index for a board position.
pub fn nd_index((row, column): Coord2) -> [usize; 2] {
    [row.into(), column.into()]
}

/// Row-major iteration over every position of a `rows × columns` board.
pub fn iter_coords((rows, columns): Coord2) -> impl Iterator<Item = Coord2> {
    (0..rows).flat_map(move |row| (0..columns).map(move |column| (row, column)))
}

/// Cells touching `center`, walked row by row over its 3×3 window clipped to
/// the board. Edges do not wrap.
#[derive(Clone, Debug)]
pub struct NeighborIter {
    center: Coord2,
    first_column: Coord,
    last: Coord2,
    next: Option<Coord2>,
}

impl NeighborIter {
    pub fn new(center: Coord2, (rows, columns): Coord2) -> Self {
        let (row, column) = center;
        let first = (row.saturating_sub(1), column.saturating_sub(1));
        let last = (
            row.saturating_add(1).min(rows.saturating_sub(1)),
            column.saturating_add(1).min(columns.saturating_sub(1)),
        );
        Self {
            center,
            first_column: first.1,
            last,
            next: (rows > 0 && columns > 0).then_some(first),
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let current @ (row, column) = self.next?;
            self.next = if column < self.last.1 {
                Some((row, column + 1))
            } else if row < self.last.0 {
                Some((row + 1, self.first_column))
            } else {
                None
            };

            if current != self.center {
                return Some(current);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn corner_has_three_neighbors() {
        let neighbors: Vec<_> = NeighborIter::new((0, 0), (3, 3)).collect();
        assert_eq!(neighbors, [(0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn center_has_eight_neighbors_in_row_major_order() {
        let neighbors: Vec<_> = NeighborIter::new((1, 1), (3, 3)).collect();
        assert_eq!(
            neighbors,
            [(0, 0), (0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1), (2, 2)]
        );
    }

    #[test]
    fn single_cell_grid_has_no_neighbors() {
        assert_eq!(NeighborIter::new((0, 0), (1, 1)).count(), 0);
    }

    #[test]
    fn far_edge_does_not_wrap() {
        let neighbors: Vec<_> = NeighborIter::new((2, 4), (3, 5)).collect();
        assert_eq!(neighbors, [(1, 3), (1, 4), (2, 3)]);
    }

    #[test]
    fn single_row_only_has_side_neighbors() {
        let neighbors: Vec<_> = NeighborIter::new((0, 2), (1, 4)).collect();
        assert_eq!(neighbors, [(0, 1), (0, 3)]);
    }

    #[test]
    fn iter_coords_is_row_major() {
        let coords: Vec<_> = iter_coords((2, 2)).collect();
        assert_eq!(coords, [(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn nd_index_keeps_row_then_column() {
        assert_eq!(nd_index((3, 7)), [3, 7]);
    }
}
