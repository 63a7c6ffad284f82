/*
path.rs

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

//! Path of cells walked in the maze.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::grid::CellId;

/// Path object.
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct Path {
    /// Path as an ordered list of cells.
    steps: Vec<CellId>,

    /// Stores the cells of the path.
    /// Instead of looking for the cell in the [`Path::steps`] vector, this
    /// [`std::collections::HashSet`] speeds up the lookup.
    visited: HashSet<CellId>,
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.steps == other.steps
    }
}

impl Path {
    /// Create an empty [`Path`] object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove all the cells from the path.
    pub fn clear(&mut self) {
        self.steps.clear();
        self.visited.clear();
    }

    /// Add a cell to the path.
    pub fn push(&mut self, cell: CellId) {
        self.steps.push(cell);
        self.visited.insert(cell);
    }

    /// Remove the last cell from the path.
    pub fn pop(&mut self) -> Option<CellId> {
        let cell: CellId = self.steps.pop()?;
        self.visited.remove(&cell);
        Some(cell)
    }

    /// Get the number of cells in the path.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the path has no cells.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether the cell is in the path or not.
    pub fn contains(&self, cell: CellId) -> bool {
        self.visited.contains(&cell)
    }

    /// Return the ordered cells.
    pub fn get(&self) -> &[CellId] {
        &self.steps
    }

    /// Return the cell before the last one.
    pub fn get_previous(&self) -> Option<CellId> {
        let l: usize = self.steps.len();
        if l > 1 { Some(self.steps[l - 2]) } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_pop_keep_lookup_in_sync() {
        let mut path: Path = Path::new();
        path.push(4);
        path.push(7);

        assert!(path.contains(7));
        assert_eq!(path.get_previous(), Some(4));
        assert_eq!(path.pop(), Some(7));
        assert!(!path.contains(7));
        assert_eq!(path.get(), &[4]);
        assert_eq!(path.get_previous(), None);
    }

    #[test]
    fn clear_empties_lookup() {
        let mut path: Path = Path::new();
        for cell in [1, 2, 3] {
            path.push(cell);
        }
        assert_eq!(path.len(), 3);
        assert!(path.contains(2));

        path.clear();
        assert!(path.is_empty());
        assert!(!path.contains(2));
        assert_eq!(path, Path::new());
    }
}
