/*
grid.rs

Copyright 2025 Hervé Quatremain

This file is part of Mazewalk.

Mazewalk is free software: you can redistribute it and/or modify it under the
terms of the GNU General Public License as published by the Free Software
Foundation, either version 3 of the License, or (at your option) any later
version.

Mazewalk is distributed in the hope that it will be useful, but WITHOUT ANY
WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR
A PARTICULAR PURPOSE. See the GNU General Public License for more details.

You should have received a copy of the GNU General Public License along with
Mazewalk. If not, see <https://www.gnu.org/licenses/>.

SPDX-License-Identifier: GPL-3.0-or-later
*/

//! Rectangular grid of maze cells.
//!
//! The [`Grid`] object owns all its [`Cell`] objects in a flat vector.
//! Neighbor links are cell identifiers (indexes in that vector), so the mesh of links between
//! the cells never creates ownership cycles and the cells are all freed with the grid.

use log::{Level, debug, log_enabled};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, FromRepr};

/// Largest number of columns or rows of a grid.
pub const MAX_SIDE: usize = 1024;

/// Cell identifier: the index of the cell in the grid, `y * width + x`.
pub type CellId = usize;

/// Directions to the four neighbors of a cell.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, FromRepr, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[repr(usize)]
pub enum Direction {
    Left,
    Right,
    Top,
    Bottom,
}

impl Direction {
    /// All the directions, in the order used for the neighbor slots.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Top,
        Direction::Bottom,
    ];

    /// Return the opposite direction.
    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Top => Direction::Bottom,
            Direction::Bottom => Direction::Top,
        }
    }

    /// Whether the two directions are on the same axis (horizontal or vertical).
    pub fn same_axis(self, other: Direction) -> bool {
        self == other || self.opposite() == other
    }

    /// Slot of the direction in the neighbor tables.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Logical state of a cell.
///
/// The discriminant is the code used by the export encoding (see [`super::codec`]).
#[derive(
    Serialize, Deserialize, Debug, Copy, Clone, Default, PartialEq, Eq, Hash, FromRepr, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum CellState {
    #[default]
    Wall = 0,
    Path = 1,
    Start = 2,
    End = 3,
}

impl CellState {
    /// Code of the state in the export encoding.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Whether the cell can be walked through.
    pub fn is_open(self) -> bool {
        self != CellState::Wall
    }
}

/// Presentation state of a cell.
///
/// It follows [`CellState`] plus transient highlighting set by the machines while they walk
/// the maze. Renderers read it to choose the cell color.
#[derive(
    Serialize, Deserialize, Debug, Copy, Clone, Default, PartialEq, Eq, Hash, FromRepr, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum CellDisplay {
    #[default]
    Empty,
    Wall,
    Path,
    Blocked,
    Start,
    Current,
    End,
    Mark,
}

impl From<CellState> for CellDisplay {
    fn from(state: CellState) -> Self {
        match state {
            CellState::Wall => CellDisplay::Wall,
            CellState::Path => CellDisplay::Path,
            CellState::Start => CellDisplay::Start,
            CellState::End => CellDisplay::End,
        }
    }
}

/// Maze cell.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Cell {
    /// Cell identifier (index in the grid).
    pub id: CellId,

    /// Column.
    pub x: usize,

    /// Row.
    pub y: usize,

    /// Adjacent cells, indexed by [`Direction::index`].
    /// Border cells have [`None`] in the outward directions.
    neighbors: [Option<CellId>; 4],

    /// Whether the maze generator already processed the cell.
    pub visited: bool,

    /// Logical state.
    pub state: CellState,

    /// Presentation state.
    pub display: CellDisplay,
}

impl Cell {
    /// Deterministic string key derived from the coordinates.
    pub fn key(&self) -> String {
        format!("{}:{}", self.x, self.y)
    }

    /// Return the adjacent cell in the given direction.
    pub fn neighbor(&self, direction: Direction) -> Option<CellId> {
        self.neighbors[direction.index()]
    }

    /// Iterate over the existing neighbors with their direction.
    pub fn neighbors(&self) -> impl Iterator<Item = (Direction, CellId)> + '_ {
        Direction::ALL
            .iter()
            .filter_map(|d| self.neighbor(*d).map(|id| (*d, id)))
    }
}

/// Grid of cells.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Grid {
    /// Number of columns.
    width: usize,

    /// Number of rows.
    height: usize,

    /// Cells in row-major order.
    cells: Vec<Cell>,
}

impl Grid {
    /// Build a `width` x `height` grid.
    ///
    /// Both sides are clamped between 1 and [`MAX_SIDE`].
    /// Cells are created in row-major order. Each cell is linked to its already built left and
    /// top neighbors, which are linked back to it. The `seed` closure sets the initial values of
    /// the mutable fields of each cell.
    pub fn build<F>(width: usize, height: usize, mut seed: F) -> Self
    where
        F: FnMut(&mut Cell),
    {
        let width: usize = width.clamp(1, MAX_SIDE);
        let height: usize = height.clamp(1, MAX_SIDE);
        let mut cells: Vec<Cell> = Vec::with_capacity(width * height);

        for y in 0..height {
            for x in 0..width {
                let id: CellId = y * width + x;
                let mut cell: Cell = Cell {
                    id,
                    x,
                    y,
                    neighbors: [None; 4],
                    visited: false,
                    state: CellState::Wall,
                    display: CellDisplay::Empty,
                };
                if x > 0 {
                    cell.neighbors[Direction::Left.index()] = Some(id - 1);
                    cells[id - 1].neighbors[Direction::Right.index()] = Some(id);
                }
                if y > 0 {
                    cell.neighbors[Direction::Top.index()] = Some(id - width);
                    cells[id - width].neighbors[Direction::Bottom.index()] = Some(id);
                }
                seed(&mut cell);
                cells.push(cell);
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Build a grid where all the cells are unvisited walls.
    pub fn new(width: usize, height: usize) -> Self {
        Self::build(width, height, |cell| {
            cell.visited = false;
            cell.state = CellState::Wall;
            cell.display = CellDisplay::Wall;
        })
    }

    /// Build a grid from a matrix of cell states (one vector per row).
    ///
    /// All the cells are marked visited. Return [`None`] if the matrix is empty, larger than
    /// [`MAX_SIDE`] in either direction, or if the rows do not have the same length.
    pub fn from_states(states: &[Vec<CellState>]) -> Option<Self> {
        let height: usize = states.len();
        let width: usize = states.first().map_or(0, |row| row.len());
        if width == 0
            || width > MAX_SIDE
            || height > MAX_SIDE
            || states.iter().any(|row| row.len() != width)
        {
            return None;
        }
        Some(Self::build(width, height, |cell| {
            let state: CellState = states[cell.y][cell.x];
            cell.visited = true;
            cell.state = state;
            cell.display = CellDisplay::from(state);
        }))
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Return the cell with the given identifier.
    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id]
    }

    /// Return the cell with the given identifier for updating it.
    pub fn cell_mut(&mut self, id: CellId) -> &mut Cell {
        &mut self.cells[id]
    }

    /// Return the identifier of the cell at the given coordinates.
    pub fn id_at(&self, x: usize, y: usize) -> Option<CellId> {
        if x >= self.width || y >= self.height {
            None
        } else {
            Some(y * self.width + x)
        }
    }

    /// Iterate over the cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Whether the cell is not a wall.
    pub fn is_open(&self, id: CellId) -> bool {
        self.cells[id].state.is_open()
    }

    /// Return the identifiers of the open cells, in row-major order.
    pub fn open_cells(&self) -> Vec<CellId> {
        self.cells
            .iter()
            .filter(|c| c.state.is_open())
            .map(|c| c.id)
            .collect()
    }

    /// Return the open neighbors of the given cell with their direction.
    pub fn open_neighbors(&self, id: CellId) -> Vec<(Direction, CellId)> {
        self.cells[id]
            .neighbors()
            .filter(|(_, n)| self.is_open(*n))
            .collect()
    }

    /// Return the direction to go from the `from` cell to the adjacent `to` cell.
    pub fn direction_between(&self, from: CellId, to: CellId) -> Option<Direction> {
        self.cells[from]
            .neighbors()
            .find(|(_, n)| *n == to)
            .map(|(d, _)| d)
    }

    /// Set the presentation state of a cell.
    pub fn set_display(&mut self, id: CellId, display: CellDisplay) {
        self.cells[id].display = display;
    }

    /// Reset the presentation state of all the cells to their logical state.
    pub fn reset_display(&mut self) {
        for cell in &mut self.cells {
            cell.display = CellDisplay::from(cell.state);
        }
    }

    /// Return the logical states as a matrix (one vector per row).
    pub fn states(&self) -> Vec<Vec<CellState>> {
        self.cells
            .chunks(self.width)
            .map(|row| row.iter().map(|c| c.state).collect())
            .collect()
    }

    /// Print the grid states.
    pub fn debug(&self) {
        if !log_enabled!(Level::Debug) {
            return;
        }
        let mut s: String = String::new();
        for row in self.cells.chunks(self.width) {
            s.clear();
            for cell in row {
                match cell.state {
                    CellState::Wall => s.push('#'),
                    CellState::Path => s.push('.'),
                    CellState::Start => s.push('S'),
                    CellState::End => s.push('E'),
                }
            }
            debug!("{s}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_are_symmetric() {
        let grid: Grid = Grid::new(5, 4);

        for cell in grid.cells() {
            for (direction, n) in cell.neighbors() {
                assert_eq!(grid.cell(n).neighbor(direction.opposite()), Some(cell.id));
            }
        }
    }

    #[test]
    fn border_cells_have_no_outward_links() {
        let grid: Grid = Grid::new(3, 3);

        let corner: &Cell = grid.cell(0);
        assert_eq!(corner.neighbor(Direction::Left), None);
        assert_eq!(corner.neighbor(Direction::Top), None);
        assert_eq!(corner.neighbor(Direction::Right), Some(1));
        assert_eq!(corner.neighbor(Direction::Bottom), Some(3));

        let center: &Cell = grid.cell(4);
        assert_eq!(center.neighbors().count(), 4);

        let last: &Cell = grid.cell(8);
        assert_eq!(last.neighbor(Direction::Right), None);
        assert_eq!(last.neighbor(Direction::Bottom), None);
    }

    #[test]
    fn cells_are_built_in_row_major_order() {
        let grid: Grid = Grid::new(4, 2);

        assert_eq!(grid.len(), 8);
        let cell: &Cell = grid.cell(6);
        assert_eq!((cell.x, cell.y), (2, 1));
        assert_eq!(cell.key(), "2:1");
        assert_eq!(grid.id_at(2, 1), Some(6));
        assert_eq!(grid.id_at(4, 1), None);
    }

    #[test]
    fn states_round_trip_through_from_states() {
        let states: Vec<Vec<CellState>> = vec![
            vec![CellState::Start, CellState::Path, CellState::Wall],
            vec![CellState::Wall, CellState::Path, CellState::End],
        ];
        let grid: Grid = Grid::from_states(&states).expect("rectangular matrix");

        assert_eq!(grid.states(), states);
        assert!(grid.cells().all(|c| c.visited));
        assert_eq!(grid.cell(0).display, CellDisplay::Start);
        assert_eq!(grid.open_neighbors(1).len(), 2);
        assert_eq!(grid.direction_between(1, 4), Some(Direction::Bottom));
    }

    #[test]
    fn from_states_rejects_ragged_matrix() {
        let states: Vec<Vec<CellState>> = vec![vec![CellState::Path], vec![]];
        assert!(Grid::from_states(&states).is_none());
        assert!(Grid::from_states(&[]).is_none());
    }

    #[test]
    fn sides_are_bounded() {
        let grid: Grid = Grid::new(usize::MAX, 0);
        assert_eq!(grid.width(), MAX_SIDE);
        assert_eq!(grid.height(), 1);
        assert_eq!(grid.len(), MAX_SIDE);

        let states: Vec<Vec<CellState>> = vec![vec![CellState::Path; MAX_SIDE + 1]];
        assert!(Grid::from_states(&states).is_none());
    }

    #[test]
    fn direction_codes() {
        assert_eq!(Direction::from_repr(2), Some(Direction::Top));
        assert_eq!(Direction::Bottom.to_string(), "bottom");
        assert!(Direction::Left.same_axis(Direction::Right));
        assert!(!Direction::Left.same_axis(Direction::Top));
        assert_eq!(CellState::from_repr(3), Some(CellState::End));
        assert_eq!(CellState::from_repr(4), None);
    }
}
