/*
maze.rs

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

//! Save and restore a maze in the export encoding.

use log::debug;
use std::error::Error;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::maze::codec::{rebuild_maze, serialize_maze};
use crate::maze::grid::{CellState, Grid};

/// Object to save and restore a maze.
pub struct SaverMaze {
    save_file: PathBuf,
}

impl SaverMaze {
    /// Create a [`SaverMaze`] object for the given file.
    pub fn new(file: &Path) -> Self {
        debug!("Maze file: {file:?}");
        Self {
            save_file: file.to_path_buf(),
        }
    }

    /// Read and decode the maze file.
    ///
    /// Return None if the file does not exist.
    pub fn get_states(&self) -> Result<Option<Vec<Vec<CellState>>>, Box<dyn Error>> {
        let encoded: String = match fs::read_to_string(&self.save_file) {
            Ok(s) => s,
            Err(error) => match error.kind() {
                ErrorKind::NotFound => return Ok(None),
                _ => return Err(Box::new(error)),
            },
        };
        Ok(Some(rebuild_maze(&encoded)?))
    }

    /// Save the logical states of the grid.
    pub fn save_grid(&self, grid: &Grid) -> Result<(), Box<dyn Error>> {
        let file: File = File::create(&self.save_file)?;
        let mut writer: BufWriter<File> = BufWriter::new(file);

        writeln!(writer, "{}", serialize_maze(grid))?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::codec::ImportError;
    use std::env;

    #[test]
    fn save_and_restore() {
        let mut file: PathBuf = env::temp_dir();
        file.push(format!("mazewalk-maze-{}.txt", std::process::id()));
        let saver: SaverMaze = SaverMaze::new(&file);
        let _ = fs::remove_file(&file);

        assert!(saver.get_states().expect("missing file is not an error").is_none());

        let states: Vec<Vec<CellState>> = vec![
            vec![CellState::Start, CellState::Path, CellState::Wall],
            vec![CellState::Wall, CellState::Path, CellState::End],
        ];
        let grid: Grid = Grid::from_states(&states).expect("rectangular maze");
        saver.save_grid(&grid).expect("writable file");
        assert_eq!(fs::read_to_string(&file).expect("saved file"), "3:2/2,1,0,0,1,3\n");
        assert_eq!(saver.get_states().expect("valid file"), Some(states));

        fs::write(&file, "3:2/2,1,0").expect("writable file");
        let error = saver.get_states().expect_err("truncated maze");
        assert_eq!(
            error.downcast_ref::<ImportError>(),
            Some(&ImportError::CountMismatch {
                expected: 6,
                found: 3
            })
        );

        let _ = fs::remove_file(&file);
    }
}
