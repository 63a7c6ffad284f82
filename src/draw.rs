/*
draw.rs

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

//! Draw the grid as text.
//!
//! One character per cell, one line per row.
//! The [`Overlay`] object marks the cells that the machines are working on, such as the root
//! and the current cell, on top of the grid.

use std::collections::HashSet;

use crate::maze::grid::{CellDisplay, CellId, CellState, Grid};

/// Character for a presentation state.
pub fn display_glyph(display: CellDisplay) -> char {
    match display {
        CellDisplay::Empty => ' ',
        CellDisplay::Wall => '#',
        CellDisplay::Path => '.',
        CellDisplay::Blocked => 'x',
        CellDisplay::Start => 'S',
        CellDisplay::Current => '@',
        CellDisplay::End => 'E',
        CellDisplay::Mark => 'o',
    }
}

/// Character for a logical state.
pub fn state_glyph(state: CellState) -> char {
    display_glyph(CellDisplay::from(state))
}

/// Cells to draw on top of the grid.
#[derive(Debug, Default, Clone)]
pub struct Overlay {
    pub root: Option<CellId>,
    pub current: Option<CellId>,

    /// Path to draw with `*` characters.
    pub path: Vec<CellId>,
}

impl Overlay {
    /// Create an [`Overlay`] object that only draws a path.
    pub fn with_path(path: &[CellId]) -> Self {
        Self {
            path: path.to_vec(),
            ..Default::default()
        }
    }

    fn glyph(&self, id: CellId, on_path: &HashSet<CellId>) -> Option<char> {
        if self.current == Some(id) {
            Some('@')
        } else if self.root == Some(id) {
            Some('R')
        } else if on_path.contains(&id) {
            Some('*')
        } else {
            None
        }
    }
}

fn render<F>(grid: &Grid, overlay: Option<&Overlay>, glyph: F) -> String
where
    F: Fn(CellId) -> char,
{
    let on_path: HashSet<CellId> = overlay
        .map(|o| o.path.iter().copied().collect())
        .unwrap_or_default();
    let mut s: String = String::with_capacity((grid.width() + 1) * grid.height());

    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let Some(id) = grid.id_at(x, y) else {
                continue;
            };
            let c: char = overlay
                .and_then(|o| o.glyph(id, &on_path))
                .unwrap_or_else(|| glyph(id));
            s.push(c);
        }
        s.push('\n');
    }
    s
}

/// Draw the presentation state of the cells.
pub fn displays(grid: &Grid, overlay: Option<&Overlay>) -> String {
    render(grid, overlay, |id| display_glyph(grid.cell(id).display))
}

/// Draw the logical state of the cells.
pub fn states(grid: &Grid, overlay: Option<&Overlay>) -> String {
    render(grid, overlay, |id| state_glyph(grid.cell(id).state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::codec::rebuild_maze;

    #[test]
    fn draw_states_and_path() {
        let matrix = rebuild_maze("3:2/1,1,2,0,3,1").expect("valid maze");
        let mut grid: Grid = Grid::from_states(&matrix).expect("rectangular maze");

        assert_eq!(states(&grid, None), "..S\n#E.\n");

        let overlay: Overlay = Overlay::with_path(&[0, 1]);
        assert_eq!(states(&grid, Some(&overlay)), "**S\n#E.\n");

        grid.set_display(5, CellDisplay::Blocked);
        let overlay: Overlay = Overlay {
            root: Some(0),
            current: Some(1),
            path: vec![0, 1, 2],
        };
        assert_eq!(displays(&grid, Some(&overlay)), "R@*\n#Ex\n");
    }
}
