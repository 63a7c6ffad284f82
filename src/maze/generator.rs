/*
generator.rs

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

//! Carve a maze with a growing-tree algorithm.
//!
//! The [`MazeGenerator`] owns the [`Grid`]. It keeps a frontier of carved cells. Each step
//! selects one of them, according to the [`GrowMode`] setting, and carves one of its
//! neighbors. A neighbor can be carved only if it would not touch another carved cell, so
//! the carved cells always form a tree.
//!
//! When the maze is complete, the generator spawns the [`Analyzers`]: a [`BruteForcer`] and a
//! [`PathFinder`] that both search the longest path. The commands the generator receives
//! after that are forwarded to them.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;
use strum_macros::Display;

use super::brute_forcer::{BruteForcer, BruteForcerEvent};
use super::codec::{ImportError, rebuild_maze, serialize_maze};
use super::grid::{CellDisplay, CellId, CellState, Direction, Grid};
use super::path_finder::{FinderDisplay, FinderEvent, PathFinder};
use super::settings::{GrowMode, SettingUpdate, Settings};
use super::timer::{self, RunMode, Timer};

/// Commands accepted by the [`MazeGenerator`].
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorCommand {
    /// Start over with a fresh grid.
    Reset,

    /// Carve one cell, or step the analyzers when the maze is complete.
    Step,

    /// Step automatically.
    Run,

    /// Stop stepping automatically.
    Pause,

    /// Replace the maze with the given cell states (one vector per row).
    Import(Vec<Vec<CellState>>),

    /// Change one setting.
    UpdateSettings(SettingUpdate),
}

/// States of the [`MazeGenerator`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum GeneratorState {
    Incomplete,
    Running,
    Done,
}

/// Child machines spawned when the maze is complete.
#[derive(Debug)]
pub struct Analyzers {
    pub brute_forcer: BruteForcer,
    pub path_finder: PathFinder,
}

/// [`MazeGenerator`] object.
#[derive(Debug)]
pub struct MazeGenerator {
    settings: Settings,
    grid: Grid,
    state: GeneratorState,

    /// Carved cells that may still have a neighbor to carve.
    cells: Vec<CellId>,

    /// Last carved or blocked cell.
    current_cell: Option<CellId>,

    rng: StdRng,
    timer: Timer,
    analyzers: Option<Analyzers>,

    /// Branch cell highlighting given to the path finder.
    finder_display: FinderDisplay,

    /// Number of steps since the last reset.
    pub iteration: usize,
}

impl MazeGenerator {
    /// Create a [`MazeGenerator`] object with a fresh grid.
    pub fn new(settings: Settings) -> Self {
        let mut generator: MazeGenerator = Self {
            grid: Grid::new(settings.width, settings.height),
            state: GeneratorState::Incomplete,
            cells: Vec::new(),
            current_cell: None,
            rng: Self::seeded_rng(settings.seed),
            timer: Timer::new(settings.step_delay_in_ms),
            analyzers: None,
            finder_display: FinderDisplay::None,
            iteration: 0,
            settings,
        };
        generator.reset();
        generator
    }

    fn seeded_rng(seed: Option<u64>) -> StdRng {
        match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Process a command.
    pub fn send(&mut self, command: GeneratorCommand) {
        debug!("Generator: {command:?} in {}", self.state);
        match command {
            GeneratorCommand::Reset => self.reset(),
            GeneratorCommand::Step => match self.state {
                GeneratorState::Done => self.forward_step(),
                _ => self.step(),
            },
            GeneratorCommand::Run => match self.state {
                GeneratorState::Done => self.forward_mode(RunMode::Auto),
                GeneratorState::Incomplete => {
                    self.state = GeneratorState::Running;
                    self.timer.schedule();
                }
                GeneratorState::Running => (),
            },
            GeneratorCommand::Pause => match self.state {
                GeneratorState::Done => self.forward_mode(RunMode::Manual),
                GeneratorState::Running => {
                    self.state = GeneratorState::Incomplete;
                    self.timer.cancel();
                }
                GeneratorState::Incomplete => (),
            },
            GeneratorCommand::Import(states) => self.import(&states),
            GeneratorCommand::UpdateSettings(update) => self.update_settings(update),
        }
    }

    /// Perform the pending timer steps, if they are due, parent first.
    pub fn on_timer(&mut self, now: Instant) {
        if self.timer.take_due(now) {
            self.step();
            if self.state == GeneratorState::Running {
                self.timer.schedule();
            }
        }
        if let Some(analyzers) = &mut self.analyzers {
            analyzers.brute_forcer.on_timer(now, &mut self.grid);
            analyzers.path_finder.on_timer(now, &mut self.grid);
        }
    }

    /// When the next timer step is due in the machine tree.
    pub fn next_deadline(&self) -> Option<Instant> {
        let children: Option<Instant> = self.analyzers.as_ref().and_then(|a| {
            timer::earliest(
                a.brute_forcer.next_deadline(),
                a.path_finder.next_deadline(),
            )
        });
        timer::earliest(self.timer.deadline(), children)
    }

    pub fn state(&self) -> GeneratorState {
        self.state
    }

    /// Current state as a string, such as `running`.
    pub fn state_path(&self) -> String {
        self.state.to_string()
    }

    pub fn is_complete(&self) -> bool {
        self.state == GeneratorState::Done
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Frontier of carved cells.
    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }

    pub fn current_cell(&self) -> Option<CellId> {
        self.current_cell
    }

    pub fn analyzers(&self) -> Option<&Analyzers> {
        self.analyzers.as_ref()
    }

    /// Change the highlighting of the branch cells, now and in the next path finders.
    pub fn set_finder_display(&mut self, display: FinderDisplay) {
        self.finder_display = display;
        if let Some(analyzers) = &mut self.analyzers {
            analyzers
                .path_finder
                .send(FinderEvent::SetDisplay(display), &mut self.grid);
        }
    }

    /// Export the maze in the `<cols>:<rows>/<codes>` encoding.
    pub fn export(&self) -> String {
        serialize_maze(&self.grid)
    }

    /// Decode an exported maze and import it.
    ///
    /// The maze is left unchanged if the string cannot be decoded.
    pub fn import_str(&mut self, encoded: &str) -> Result<(), ImportError> {
        match rebuild_maze(encoded) {
            Ok(states) => {
                self.send(GeneratorCommand::Import(states));
                Ok(())
            }
            Err(e) => {
                warn!("Cannot import the maze: {e}");
                Err(e)
            }
        }
    }

    /// Start over with an unvisited grid and a random start cell.
    fn reset(&mut self) {
        self.grid = Grid::new(self.settings.width, self.settings.height);
        self.rng = Self::seeded_rng(self.settings.seed);
        self.timer.cancel();
        self.analyzers = None;
        self.state = GeneratorState::Incomplete;
        self.iteration = 0;

        let start: CellId = self.rng.random_range(0..self.grid.len());
        let cell = self.grid.cell_mut(start);
        cell.visited = true;
        cell.state = CellState::Path;
        cell.display = CellDisplay::Current;
        self.cells = vec![start];
        self.current_cell = Some(start);
        debug!(
            "Generator: {}x{} grid, start at {}",
            self.grid.width(),
            self.grid.height(),
            self.grid.cell(start).key()
        );
    }

    /// Index in the frontier of the cell to grow the maze from.
    fn select_index(&mut self) -> usize {
        let last: usize = self.cells.len() - 1;
        match self.settings.mode {
            GrowMode::Latest => last,
            GrowMode::Random => self.rng.random_range(0..self.cells.len()),
            GrowMode::Both => {
                if self.rng.random::<f64>() < f64::from(self.settings.random) / 100.0 {
                    self.rng.random_range(0..self.cells.len())
                } else {
                    last
                }
            }
        }
    }

    /// Whether the cell can be carved from the candidate.
    fn is_eligible(&self, cell: CellId, candidate: CellId) -> bool {
        !self.grid.cell(cell).visited
            && self
                .grid
                .cell(cell)
                .neighbors()
                .all(|(_, n)| n == candidate || self.grid.cell(n).state != CellState::Path)
    }

    /// Carve one cell.
    fn step(&mut self) {
        if self.cells.is_empty() {
            self.complete();
            return;
        }
        self.iteration += 1;

        let index: usize = self.select_index();
        let candidate: CellId = self.cells[index];
        {
            let cell = self.grid.cell_mut(candidate);
            cell.visited = true;
            cell.state = CellState::Path;
            cell.display = CellDisplay::Path;
        }

        let eligible: Vec<(Direction, CellId)> = self
            .grid
            .cell(candidate)
            .neighbors()
            .filter(|(_, n)| self.is_eligible(*n, candidate))
            .collect();

        if eligible.is_empty() {
            self.cells.remove(index);
            self.grid.set_display(candidate, CellDisplay::Blocked);
            self.current_cell = Some(candidate);
        } else {
            let (direction, carved) = eligible[self.rng.random_range(0..eligible.len())];
            for (d, n) in &eligible {
                if !d.same_axis(direction) {
                    let cell = self.grid.cell_mut(*n);
                    cell.state = CellState::Wall;
                    cell.visited = true;
                    cell.display = CellDisplay::Wall;
                }
            }
            let cell = self.grid.cell_mut(carved);
            cell.visited = true;
            cell.state = CellState::Path;
            cell.display = CellDisplay::Current;
            self.cells.push(carved);
            self.current_cell = Some(carved);
        }

        if self.cells.is_empty() {
            self.complete();
        }
    }

    /// Enter the done state and spawn the analyzers.
    fn complete(&mut self) {
        let was_running: bool = self.state == GeneratorState::Running;
        self.state = GeneratorState::Done;
        self.timer.cancel();
        self.cells.clear();
        self.current_cell = None;
        self.grid.reset_display();
        self.grid.debug();

        let delay: u64 = self.settings.step_delay_in_ms;
        let mut analyzers: Analyzers = Analyzers {
            brute_forcer: BruteForcer::new(&self.grid, delay),
            path_finder: PathFinder::new(&self.grid, delay),
        };
        if self.finder_display != FinderDisplay::None {
            analyzers
                .path_finder
                .send(FinderEvent::SetDisplay(self.finder_display), &mut self.grid);
        }
        if was_running {
            analyzers
                .brute_forcer
                .send(BruteForcerEvent::ToggleMode, &mut self.grid);
            analyzers
                .path_finder
                .send(FinderEvent::ToggleMode, &mut self.grid);
        }
        self.analyzers = Some(analyzers);
        info!(
            "Generator: maze complete, {} open cells after {} steps",
            self.grid.open_cells().len(),
            self.iteration
        );
    }

    fn forward_step(&mut self) {
        if let Some(analyzers) = &mut self.analyzers {
            analyzers
                .brute_forcer
                .send(BruteForcerEvent::SolveStep, &mut self.grid);
            analyzers
                .path_finder
                .send(FinderEvent::FinderStep, &mut self.grid);
        }
    }

    /// Switch the analyzers that are not in the requested mode.
    fn forward_mode(&mut self, mode: RunMode) {
        if let Some(analyzers) = &mut self.analyzers {
            if analyzers.brute_forcer.mode() != mode {
                analyzers
                    .brute_forcer
                    .send(BruteForcerEvent::ToggleMode, &mut self.grid);
            }
            if analyzers.path_finder.mode() != mode {
                analyzers
                    .path_finder
                    .send(FinderEvent::ToggleMode, &mut self.grid);
            }
        }
    }

    fn import(&mut self, states: &[Vec<CellState>]) {
        let Some(grid) = Grid::from_states(states) else {
            warn!("Generator: ignoring an empty, oversized or non-rectangular import");
            return;
        };
        self.settings.width = grid.width();
        self.settings.height = grid.height();
        self.grid = grid;
        self.iteration = 0;
        self.complete();
    }

    fn update_settings(&mut self, update: SettingUpdate) {
        self.settings.apply(&update);
        debug!("Generator: setting {} updated", update.key());
        match update {
            u if u.refreshes_grid() => self.reset(),
            SettingUpdate::StepDelayInMs(delay) => self.timer.set_delay(delay),
            _ => (),
        }
    }
}
