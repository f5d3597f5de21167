use serde::{Deserialize, Serialize};

use crate::Position;

/// Errors raised by grid access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Coordinates ({x}, {y}) are out of bounds for grid size ({width}, {height})")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}

/// A fixed-size 2D grid of cells stored row-major in a flat vector.
///
/// Cells are addressed by [`Position`]; every accessor is bounds-checked and
/// reports misses through `Option` or [`GridError`] instead of panicking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Builds a grid by calling `f(position)` for every cell in row-major order.
    pub fn from_generator<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(Position) -> T,
    {
        let mut cells = Vec::with_capacity(width.saturating_mul(height));
        for y in 0..height {
            for x in 0..width {
                cells.push(f(Position { x, y }));
            }
        }
        Grid {
            width,
            height,
            cells,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn is_valid(&self, position: Position) -> bool {
        position.x < self.width && position.y < self.height
    }

    #[inline]
    fn index_of(&self, position: Position) -> Result<usize, GridError> {
        if self.is_valid(position) {
            Ok(position.y * self.width + position.x)
        } else {
            Err(GridError::OutOfBounds {
                x: position.x,
                y: position.y,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Returns the cell at `position`, or `None` outside the grid.
    pub fn get(&self, position: Position) -> Option<&T> {
        let index = self.index_of(position).ok()?;
        self.cells.get(index)
    }

    /// Overwrites the cell at `position`, returning the previous value.
    pub fn set(&mut self, position: Position, value: T) -> Result<T, GridError> {
        let index = self.index_of(position)?;
        Ok(std::mem::replace(&mut self.cells[index], value))
    }

    /// Iterates `(position, &cell)` pairs in row-major order.
    pub fn enumerate(&self) -> impl Iterator<Item = (Position, &T)> {
        let width = self.width;
        self.cells.iter().enumerate().map(move |(index, cell)| {
            let position = Position {
                x: index % width,
                y: index / width,
            };
            (position, cell)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.cells.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_generator_is_row_major() {
        let grid = Grid::from_generator(2, 2, |p| p.y * 10 + p.x);
        assert_eq!(grid.iter().copied().collect::<Vec<_>>(), vec![0, 1, 10, 11]);
        assert_eq!(grid.get(Position { x: 1, y: 1 }), Some(&11));
    }

    #[test]
    fn test_out_of_bounds_access_is_reported() {
        let mut grid = Grid::from_generator(2, 1, |_| 0u8);
        assert_eq!(grid.get(Position { x: 2, y: 0 }), None);
        assert_eq!(
            grid.set(Position { x: 0, y: 1 }, 5),
            Err(GridError::OutOfBounds {
                x: 0,
                y: 1,
                width: 2,
                height: 1
            })
        );
    }

    #[test]
    fn test_set_returns_previous_value() {
        let mut grid = Grid::from_generator(1, 1, |_| 'a');
        assert_eq!(grid.set(Position { x: 0, y: 0 }, 'b'), Ok('a'));
        assert_eq!(grid.get(Position { x: 0, y: 0 }), Some(&'b'));
    }

    #[test]
    fn test_enumerate_yields_positions() {
        let grid = Grid::from_generator(2, 2, |p| p);
        for (position, cell) in grid.enumerate() {
            assert_eq!(position, *cell);
        }
    }
}
