/*
saver.rs

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

//! Save and restore the settings and the mazes.
//!
//! * [`settings::SaverSettings`] stores the [`crate::maze::settings::Settings`] object in JSON
//!   format.
//! * [`maze::SaverMaze`] stores a maze in the `<cols>:<rows>/<codes>` export encoding.

pub mod maze;
pub mod settings;
