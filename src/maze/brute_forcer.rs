/*
brute_forcer.rs

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

//! Find the longest path by walking every path from every root cell.
//!
//! Starting from each open cell in turn (the root), the [`BruteForcer`] follows the first
//! unvisited neighbor until a dead end. Each cell that offers more than one unvisited neighbor
//! is saved as a [`BranchSnapshot`] on a stack, so that the search can resume the alternate
//! branches without walking again from the root.
//! Each [`BruteForcerEvent::SolveStep`] event performs exactly one transition.

use log::{debug, info};
use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

use super::grid::{CellDisplay, CellId, Grid};
use super::path::Path;
use super::timer::{RunMode, Timer};

/// Events accepted by the [`BruteForcer`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BruteForcerEvent {
    /// Perform one transition.
    SolveStep,

    /// Switch between manual and automatic stepping.
    ToggleMode,
}

/// Sub-states while walking from a root.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Pathing {
    /// Walking the first path from the root (no choice point yet).
    FirstPathFromRoot,

    /// Walking after at least one choice point.
    InBranch,

    /// Every path from the root has been walked.
    WillChangeRoot,

    /// Resumed an alternate branch from a choice point.
    WillChangeBranch,
}

/// States of the [`BruteForcer`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BruteForcerState {
    AtRoot,
    Pathing(Pathing),
    Done,
}

impl fmt::Display for BruteForcerState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BruteForcerState::AtRoot => write!(f, "atRoot"),
            BruteForcerState::Pathing(Pathing::FirstPathFromRoot) => {
                write!(f, "pathing.firstPathFromRoot")
            }
            BruteForcerState::Pathing(Pathing::InBranch) => write!(f, "pathing.inBranch"),
            BruteForcerState::Pathing(Pathing::WillChangeRoot) => {
                write!(f, "pathing.willChangeRoot")
            }
            BruteForcerState::Pathing(Pathing::WillChangeBranch) => {
                write!(f, "pathing.willChangeBranch")
            }
            BruteForcerState::Done => write!(f, "done"),
        }
    }
}

/// Saved traversal state at a cell that offers several unvisited neighbors.
#[derive(Debug, Clone)]
struct BranchSnapshot {
    /// Cell where the choice was made.
    cell: CellId,

    /// Path from the root up to [`BranchSnapshot::cell`].
    steps: Path,

    /// Neighbors not walked yet from [`BranchSnapshot::cell`].
    unvisited_neighbors: VecDeque<CellId>,
}

/// [`BruteForcer`] object.
#[derive(Debug)]
pub struct BruteForcer {
    state: BruteForcerState,
    mode: RunMode,
    timer: Timer,

    /// All the open cells.
    path_cells: Vec<CellId>,

    /// Roots not tried yet.
    unvisited_roots: VecDeque<CellId>,

    /// Longest paths found for each finished root.
    complete_paths: Vec<Vec<CellId>>,

    /// Paths walked to a dead end from the current root.
    current_paths: Vec<Vec<CellId>>,

    root_cell: Option<CellId>,
    current_cell: Option<CellId>,

    /// Path being walked.
    steps: Path,

    /// Choice points, the most recent one on top.
    snapshots: Vec<BranchSnapshot>,

    /// Result, available in the [`BruteForcerState::Done`] state.
    longest_paths: Vec<Vec<CellId>>,

    /// Number of transitions performed.
    pub iteration: usize,
}

impl BruteForcer {
    /// Create a [`BruteForcer`] object for the open cells of the grid.
    pub fn new(grid: &Grid, step_delay_ms: u64) -> Self {
        let path_cells: Vec<CellId> = grid.open_cells();
        debug!("Brute-forcer: {} roots to try", path_cells.len());
        Self {
            state: BruteForcerState::AtRoot,
            mode: RunMode::Manual,
            timer: Timer::new(step_delay_ms),
            unvisited_roots: path_cells.iter().copied().collect(),
            path_cells,
            complete_paths: Vec::new(),
            current_paths: Vec::new(),
            root_cell: None,
            current_cell: None,
            steps: Path::new(),
            snapshots: Vec::new(),
            longest_paths: Vec::new(),
            iteration: 0,
        }
    }

    /// Process an event.
    pub fn send(&mut self, event: BruteForcerEvent, grid: &mut Grid) {
        match event {
            BruteForcerEvent::SolveStep => self.step(grid),
            BruteForcerEvent::ToggleMode => {
                self.mode = self.mode.toggled();
                debug!("Brute-forcer: mode {}", self.mode);
                if self.mode == RunMode::Auto && !self.is_done() {
                    self.timer.schedule();
                } else {
                    self.timer.cancel();
                }
            }
        }
    }

    /// Perform the pending timer step, if it is due.
    pub fn on_timer(&mut self, now: Instant, grid: &mut Grid) {
        if self.timer.take_due(now) {
            self.step(grid);
            if self.mode == RunMode::Auto && !self.is_done() {
                self.timer.schedule();
            }
        }
    }

    /// When the next timer step is due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    pub fn state(&self) -> BruteForcerState {
        self.state
    }

    /// Current state as a dotted string, such as `pathing.inBranch`.
    pub fn state_path(&self) -> String {
        self.state.to_string()
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn is_done(&self) -> bool {
        self.state == BruteForcerState::Done
    }

    pub fn root_cell(&self) -> Option<CellId> {
        self.root_cell
    }

    pub fn current_cell(&self) -> Option<CellId> {
        self.current_cell
    }

    /// Path being walked.
    pub fn steps(&self) -> &[CellId] {
        self.steps.get()
    }

    /// Number of open cells, which is also the number of roots.
    pub fn num_path_cells(&self) -> usize {
        self.path_cells.len()
    }

    /// Longest paths. Ties are all kept, but a path and its reverse are reported once.
    pub fn longest_paths(&self) -> &[Vec<CellId>] {
        &self.longest_paths
    }

    /// Perform one transition.
    pub fn step(&mut self, grid: &mut Grid) {
        if self.is_done() {
            debug!("Brute-forcer: already done");
            return;
        }
        self.iteration += 1;
        match self.state {
            BruteForcerState::Done => (),
            BruteForcerState::AtRoot => self.change_root(grid),
            BruteForcerState::Pathing(Pathing::WillChangeRoot) => self.finish_root(grid),
            BruteForcerState::Pathing(_) => self.follow_path(grid),
        }
        debug!("Brute-forcer: {} at {:?}", self.state, self.current_cell);
    }

    /// Start walking from the next root, or finish when all the roots have been tried.
    fn change_root(&mut self, grid: &mut Grid) {
        let Some(root) = self.unvisited_roots.pop_front() else {
            self.finish(grid);
            return;
        };
        debug!("Brute-forcer: new root {}", grid.cell(root).key());
        self.root_cell = Some(root);
        self.steps.clear();
        self.snapshots.clear();
        self.current_paths.clear();
        self.enter(root, grid);
        self.state = BruteForcerState::Pathing(Pathing::FirstPathFromRoot);
    }

    /// Move forward, or handle the dead end.
    fn follow_path(&mut self, grid: &mut Grid) {
        let Some(current) = self.current_cell else {
            self.state = BruteForcerState::Pathing(Pathing::WillChangeRoot);
            return;
        };

        if let Some(next) = self.unvisited_neighbors(current, grid).first().copied() {
            self.enter(next, grid);
            self.state = if self.snapshots.is_empty() {
                BruteForcerState::Pathing(Pathing::FirstPathFromRoot)
            } else {
                BruteForcerState::Pathing(Pathing::InBranch)
            };
            return;
        }

        // Dead end: the path is complete
        self.current_paths.push(self.steps.get().to_vec());

        let Some(snapshot) = self.snapshots.last_mut() else {
            self.state = BruteForcerState::Pathing(Pathing::WillChangeRoot);
            return;
        };
        let cell: CellId = snapshot.cell;
        let steps: Path = snapshot.steps.clone();
        let alternate: Option<CellId> = snapshot.unvisited_neighbors.pop_front();
        if snapshot.unvisited_neighbors.is_empty() {
            self.snapshots.pop();
        }

        // Unwind the cells walked after the choice point
        while self.steps.len() > steps.len() {
            if let Some(c) = self.steps.pop() {
                Self::restore_display(c, grid);
            }
        }
        self.steps = steps;
        self.current_cell = Some(cell);
        if let Some(next) = alternate {
            self.enter(next, grid);
        }
        self.state = BruteForcerState::Pathing(Pathing::WillChangeBranch);
    }

    /// Record the longest paths of the root and go to the next root.
    fn finish_root(&mut self, grid: &mut Grid) {
        let max: usize = self.current_paths.iter().map(Vec::len).max().unwrap_or(0);
        for path in self.current_paths.drain(..).filter(|p| p.len() == max) {
            self.complete_paths.push(path);
        }
        while let Some(c) = self.steps.pop() {
            Self::restore_display(c, grid);
        }
        self.snapshots.clear();
        self.current_cell = None;

        if self.unvisited_roots.is_empty() {
            self.finish(grid);
        } else {
            self.state = BruteForcerState::AtRoot;
        }
    }

    /// Select the longest paths among the paths of all the roots.
    fn finish(&mut self, grid: &mut Grid) {
        let max: usize = self.complete_paths.iter().map(Vec::len).max().unwrap_or(0);
        self.longest_paths.clear();
        for path in self.complete_paths.iter().filter(|p| p.len() == max) {
            let known: bool = self
                .longest_paths
                .iter()
                .any(|p| p == path || p.iter().rev().eq(path.iter()));
            if !known {
                self.longest_paths.push(path.clone());
            }
        }
        self.state = BruteForcerState::Done;
        self.timer.cancel();
        self.root_cell = None;
        self.current_cell = None;

        if let Some(path) = self.longest_paths.first() {
            for c in path {
                grid.set_display(*c, CellDisplay::Mark);
            }
        }
        info!(
            "Brute-forcer: longest path has {} cells ({} paths, {} iterations)",
            max,
            self.longest_paths.len(),
            self.iteration
        );
    }

    /// Add the cell to the path and save a snapshot if it offers several choices.
    fn enter(&mut self, cell: CellId, grid: &mut Grid) {
        if let Some(previous) = self.current_cell
            && Some(previous) != self.root_cell
            && self.steps.contains(previous)
        {
            grid.set_display(previous, CellDisplay::Mark);
        }
        self.steps.push(cell);
        self.current_cell = Some(cell);
        if Some(cell) == self.root_cell {
            grid.set_display(cell, CellDisplay::Start);
        } else {
            grid.set_display(cell, CellDisplay::Current);
        }

        let neighbors: Vec<CellId> = self.unvisited_neighbors(cell, grid);
        if neighbors.len() > 1 {
            self.snapshots.push(BranchSnapshot {
                cell,
                steps: self.steps.clone(),
                unvisited_neighbors: neighbors.into_iter().skip(1).collect(),
            });
        }
    }

    /// Open neighbors that are not in the path yet.
    fn unvisited_neighbors(&self, cell: CellId, grid: &Grid) -> Vec<CellId> {
        grid.open_neighbors(cell)
            .into_iter()
            .map(|(_, n)| n)
            .filter(|n| !self.steps.contains(*n))
            .collect()
    }

    fn restore_display(cell: CellId, grid: &mut Grid) {
        let display: CellDisplay = CellDisplay::from(grid.cell(cell).state);
        grid.set_display(cell, display);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::codec::rebuild_maze;

    fn grid_from(encoded: &str) -> Grid {
        let states = rebuild_maze(encoded).expect("valid maze");
        Grid::from_states(&states).expect("rectangular maze")
    }

    fn solve(grid: &mut Grid) -> BruteForcer {
        let mut solver: BruteForcer = BruteForcer::new(grid, 0);
        let mut guard: usize = 0;
        while !solver.is_done() {
            solver.send(BruteForcerEvent::SolveStep, grid);
            guard += 1;
            assert!(guard < 10_000, "brute-forcer does not terminate");
        }
        solver
    }

    #[test]
    fn straight_corridor_has_one_longest_path() {
        let mut grid: Grid = grid_from("3:3/0,0,0,1,1,1,0,0,0");
        let solver: BruteForcer = solve(&mut grid);

        assert_eq!(solver.longest_paths().len(), 1);
        assert_eq!(solver.longest_paths()[0].len(), 3);
        assert_eq!(solver.num_path_cells(), 3);
    }

    #[test]
    fn transitions_follow_the_walk() {
        let mut grid: Grid = grid_from("3:3/0,0,0,1,1,1,0,0,0");
        let mut solver: BruteForcer = BruteForcer::new(&grid, 0);
        assert_eq!(solver.state_path(), "atRoot");

        let expected: [&str; 10] = [
            "pathing.firstPathFromRoot",
            "pathing.firstPathFromRoot",
            "pathing.firstPathFromRoot",
            "pathing.willChangeRoot",
            "atRoot",
            "pathing.firstPathFromRoot",
            "pathing.inBranch",
            "pathing.willChangeBranch",
            "pathing.willChangeRoot",
            "atRoot",
        ];
        for state in expected {
            solver.send(BruteForcerEvent::SolveStep, &mut grid);
            assert_eq!(solver.state_path(), state);
        }
    }

    #[test]
    fn ties_are_kept() {
        // Plus sign: any two arms through the center are a longest path
        let mut grid: Grid = grid_from("3:3/0,1,0,1,1,1,0,1,0");
        let solver: BruteForcer = solve(&mut grid);

        assert_eq!(solver.longest_paths().len(), 6);
        assert!(solver.longest_paths().iter().all(|p| p.len() == 3));
        assert!(solver.longest_paths().iter().all(|p| p[1] == 4));
    }

    #[test]
    fn walls_only_maze_has_no_path() {
        let mut grid: Grid = grid_from("2:2/0,0,0,0");
        let solver: BruteForcer = solve(&mut grid);

        assert!(solver.longest_paths().is_empty());
    }

    #[test]
    fn branches_are_resumed_from_snapshots() {
        // Two junctions joined by a corridor, each with two dead ends
        let mut grid: Grid = grid_from("5:3/1,0,0,0,1,1,1,1,1,1,1,0,0,0,1");
        let solver: BruteForcer = solve(&mut grid);

        assert_eq!(solver.longest_paths().len(), 4);
        for path in solver.longest_paths() {
            assert_eq!(path.len(), 7);
            assert!(path.windows(2).all(|w| grid.direction_between(w[0], w[1]).is_some()));
        }
    }

    #[test]
    fn auto_mode_steps_on_timer() {
        let mut grid: Grid = grid_from("3:1/1,1,1");
        let mut solver: BruteForcer = BruteForcer::new(&grid, 0);

        solver.send(BruteForcerEvent::ToggleMode, &mut grid);
        assert_eq!(solver.mode(), RunMode::Auto);
        let mut guard: usize = 0;
        while let Some(deadline) = solver.next_deadline() {
            solver.on_timer(deadline, &mut grid);
            guard += 1;
            assert!(guard < 1_000);
        }
        assert!(solver.is_done());
        assert_eq!(solver.longest_paths()[0].len(), 3);
    }
}
