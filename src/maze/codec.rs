/*
codec.rs

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

//! Export and import a maze layout.
//!
//! The encoding is `<cols>:<rows>/<codes>` where `<codes>` is the comma-separated list of the
//! cell state codes in row-major order (`wall=0`, `path=1`, `start=2`, `end=3`):
//!
//! ```text
//! 3:2/1,1,1,0,0,1
//! ```

use std::error::Error;
use std::fmt;

use super::grid::{CellState, Grid, MAX_SIDE};

/// Type of errors.
#[derive(Debug, PartialEq)]
pub enum ImportError {
    /// The `/` between the dimensions and the codes is missing.
    MissingSeparator,

    /// The dimensions are not two positive integers separated by `:`.
    InvalidDimensions(String),

    /// The number of codes does not match the dimensions.
    CountMismatch { expected: usize, found: usize },

    /// A code is not a known cell state.
    UnknownState(String),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ImportError::MissingSeparator => write!(f, "missing '/' after the dimensions"),
            ImportError::InvalidDimensions(d) => write!(f, "invalid dimensions '{d}'"),
            ImportError::CountMismatch { expected, found } => {
                write!(f, "expected {expected} cells but found {found}")
            }
            ImportError::UnknownState(code) => write!(f, "unknown cell state '{code}'"),
        }
    }
}

impl Error for ImportError {}

/// Encode the logical states of the grid.
pub fn serialize_maze(grid: &Grid) -> String {
    let codes: Vec<String> = grid.cells().map(|c| c.state.code().to_string()).collect();
    format!("{}:{}/{}", grid.width(), grid.height(), codes.join(","))
}

/// Decode an encoded maze into a matrix of states (one vector per row).
///
/// # Errors
///
/// The function returns an error when the string is malformed, when a dimension is zero or
/// greater than [`MAX_SIDE`], when the number of codes does not match the dimensions, or when
/// a code is not a known state.
pub fn rebuild_maze(encoded: &str) -> Result<Vec<Vec<CellState>>, ImportError> {
    let (dimensions, codes) = encoded
        .trim()
        .split_once('/')
        .ok_or(ImportError::MissingSeparator)?;

    let (cols, rows) = dimensions
        .split_once(':')
        .and_then(|(c, r)| Some((c.trim().parse::<usize>().ok()?, r.trim().parse::<usize>().ok()?)))
        .filter(|(c, r)| (1..=MAX_SIDE).contains(c) && (1..=MAX_SIDE).contains(r))
        .ok_or_else(|| ImportError::InvalidDimensions(dimensions.to_string()))?;
    let count: usize = cols * rows;

    let states: Vec<CellState> = codes
        .split(',')
        .map(|code| {
            code.trim()
                .parse::<u8>()
                .ok()
                .and_then(CellState::from_repr)
                .ok_or_else(|| ImportError::UnknownState(code.to_string()))
        })
        .collect::<Result<Vec<CellState>, ImportError>>()?;

    if states.len() != count {
        return Err(ImportError::CountMismatch {
            expected: count,
            found: states.len(),
        });
    }

    Ok(states.chunks(cols).map(|row| row.to_vec()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_is_row_major() {
        let states: Vec<Vec<CellState>> = vec![
            vec![CellState::Path, CellState::Path, CellState::Start],
            vec![CellState::Wall, CellState::End, CellState::Path],
        ];
        let grid: Grid = Grid::from_states(&states).expect("rectangular matrix");

        assert_eq!(serialize_maze(&grid), "3:2/1,1,2,0,3,1");
    }

    #[test]
    fn import_of_export_is_identity() {
        let states: Vec<Vec<CellState>> = vec![
            vec![CellState::Wall, CellState::Path],
            vec![CellState::Path, CellState::Path],
            vec![CellState::End, CellState::Wall],
        ];
        let grid: Grid = Grid::from_states(&states).expect("rectangular matrix");

        assert_eq!(rebuild_maze(&serialize_maze(&grid)), Ok(states));
    }

    #[test]
    fn malformed_strings_are_rejected() {
        assert_eq!(rebuild_maze("2:2"), Err(ImportError::MissingSeparator));
        assert_eq!(
            rebuild_maze("2x2/1,1,1,1"),
            Err(ImportError::InvalidDimensions("2x2".to_string()))
        );
        assert_eq!(
            rebuild_maze("0:2/"),
            Err(ImportError::InvalidDimensions("0:2".to_string()))
        );
        assert_eq!(
            rebuild_maze("18446744073709551615:2/1"),
            Err(ImportError::InvalidDimensions(
                "18446744073709551615:2".to_string()
            ))
        );
        assert_eq!(
            rebuild_maze("1025:1/1"),
            Err(ImportError::InvalidDimensions("1025:1".to_string()))
        );
        assert_eq!(
            rebuild_maze("2:2/1,1,1"),
            Err(ImportError::CountMismatch {
                expected: 4,
                found: 3
            })
        );
        assert_eq!(
            rebuild_maze("2:1/1,7"),
            Err(ImportError::UnknownState("7".to_string()))
        );
    }
}
