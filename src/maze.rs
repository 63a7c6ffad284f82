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

//! Generate mazes and search their longest path.
//!
//! All the machines operate on a [`grid::Grid`] object, an arena of cells linked to their four
//! neighbors.
//!
//! * The [`generator::MazeGenerator`] owns the grid and carves the maze, one cell per step.
//!   It can also import a maze in the encoding of the [`codec`] module.
//!
//! * When the maze is complete, the generator spawns two machines that search the longest
//!   simple path:
//!
//!   - The [`brute_forcer::BruteForcer`] walks every path from every cell.
//!     It keeps [`path::Path`] snapshots of the cells where the path could go more than one
//!     way, and resumes from them when it reaches a dead end.
//!
//!   - The [`path_finder::PathFinder`] reduces the maze to its junctions (the branch cells)
//!     and the [`vector::Vector`] objects that join them.
//!     When it is done, it spawns a [`path_merger::PathMerger`] that chains the vectors and
//!     adds the dead ends at both extremities.
//!
//! Every machine can be stepped one transition at a time, or run automatically with a
//! [`timer::Timer`].
//! The generator forwards its [`generator::GeneratorCommand`] commands to the other
//! machines when the maze is complete.

pub mod brute_forcer;
pub mod codec;
pub mod generator;
pub mod grid;
pub mod path;
pub mod path_finder;
pub mod path_merger;
pub mod settings;
pub mod timer;
pub mod vector;
