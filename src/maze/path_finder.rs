/*
path_finder.rs

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

//! Reduce the maze to the graph of its junctions.
//!
//! A branch cell is an open cell with more than two open neighbors.
//! From each branch cell (the root), the [`PathFinder`] walks every direction until it reaches
//! a dead end or another branch cell. Reaching a branch cell records it as the nearest branch
//! cell in that direction, for both ends, in the [`BranchNodes`] table.
//!
//! When all the branch cells have been used as roots, the [`PathFinder`] spawns a
//! [`PathMerger`] and forwards its events to it.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::fmt;
use std::time::Instant;
use strum_macros::Display;

use super::grid::{CellDisplay, CellId, Direction, Grid};
use super::path::Path;
use super::path_merger::{MergerEvent, PathMerger};
use super::timer::{self, RunMode, Timer};
use super::vector::VectorHash;

/// For each branch cell, the nearest branch cell in each direction
/// (indexed by [`Direction::index`]).
pub type BranchNodes = BTreeMap<CellId, [Option<CellId>; 4]>;

/// Highlighting of the branch cells.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Default, PartialEq, Eq, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum FinderDisplay {
    #[default]
    None,
    BranchCells,
}

/// Events accepted by the [`PathFinder`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FinderEvent {
    /// Perform one transition.
    FinderStep,

    /// Switch between manual and automatic stepping.
    ToggleMode,

    /// Change the highlighting of the branch cells.
    SetDisplay(FinderDisplay),
}

/// Sub-states while finding the branch cells.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Finding {
    /// Walking away from the root.
    Pathing,

    /// The walk is over (dead end or abandoned), the next direction is next.
    WillChangePath,

    /// The root has no direction left, the next root is next.
    WillChangeRoot,

    /// The walk reached another branch cell.
    WillChangeBranch,
}

/// States of the [`PathFinder`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FinderState {
    Finding(Finding),
    Done,
}

impl fmt::Display for FinderState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FinderState::Finding(Finding::Pathing) => write!(f, "finding.pathing"),
            FinderState::Finding(Finding::WillChangePath) => write!(f, "finding.willChangePath"),
            FinderState::Finding(Finding::WillChangeRoot) => write!(f, "finding.willChangeRoot"),
            FinderState::Finding(Finding::WillChangeBranch) => {
                write!(f, "finding.willChangeBranch")
            }
            FinderState::Done => write!(f, "done"),
        }
    }
}

/// [`PathFinder`] object.
#[derive(Debug)]
pub struct PathFinder {
    state: FinderState,
    mode: RunMode,
    timer: Timer,
    display: FinderDisplay,

    /// Branch cells in row-major order.
    branch_cell_ids: Vec<CellId>,

    /// Same as [`PathFinder::branch_cell_ids`], for quick lookups.
    branch_cells: HashSet<CellId>,

    /// Branch cells not used as root yet.
    unvisited_branch_cells: VecDeque<CellId>,

    root_branch_cell: Option<CellId>,

    /// Directions of the root not walked yet.
    unvisited_directions: VecDeque<Direction>,

    /// Direction of the current walk, from the root.
    went: Option<Direction>,

    current_cell: Option<CellId>,

    /// Cells of the current walk, root first.
    steps: Path,

    /// Walks between two branch cells, in both directions.
    current_paths: Vec<Vec<CellId>>,

    /// Walks from a branch cell to a dead end.
    tails: Vec<Vec<CellId>>,

    /// Branch cell pairs already joined.
    visited_vectors: HashSet<VectorHash>,

    branch_nodes: BranchNodes,

    /// Child machine, created when all the branch cells have been used as roots.
    path_merger: Option<PathMerger>,

    step_delay_ms: u64,

    /// Number of transitions performed.
    pub iteration: usize,
}

impl PathFinder {
    /// Create a [`PathFinder`] object for the open cells of the grid.
    pub fn new(grid: &Grid, step_delay_ms: u64) -> Self {
        let branch_cell_ids: Vec<CellId> = grid
            .open_cells()
            .into_iter()
            .filter(|c| grid.open_neighbors(*c).len() > 2)
            .collect();
        debug!("Finder: {} branch cells", branch_cell_ids.len());

        Self {
            state: FinderState::Finding(Finding::WillChangeRoot),
            mode: RunMode::Manual,
            timer: Timer::new(step_delay_ms),
            display: FinderDisplay::None,
            branch_cells: branch_cell_ids.iter().copied().collect(),
            unvisited_branch_cells: branch_cell_ids.iter().copied().collect(),
            branch_nodes: branch_cell_ids.iter().map(|c| (*c, [None; 4])).collect(),
            branch_cell_ids,
            root_branch_cell: None,
            unvisited_directions: VecDeque::new(),
            went: None,
            current_cell: None,
            steps: Path::new(),
            current_paths: Vec::new(),
            tails: Vec::new(),
            visited_vectors: HashSet::new(),
            path_merger: None,
            step_delay_ms,
            iteration: 0,
        }
    }

    /// Process an event.
    ///
    /// Once done, steps and mode changes are forwarded to the [`PathMerger`].
    pub fn send(&mut self, event: FinderEvent, grid: &mut Grid) {
        match event {
            FinderEvent::FinderStep => match &mut self.path_merger {
                Some(merger) => merger.send(MergerEvent::MergerStep, grid),
                None => self.step(grid),
            },
            FinderEvent::ToggleMode => match &mut self.path_merger {
                Some(merger) => merger.send(MergerEvent::ToggleMode, grid),
                None => {
                    self.mode = self.mode.toggled();
                    debug!("Finder: mode {}", self.mode);
                    if self.mode == RunMode::Auto && !self.is_done() {
                        self.timer.schedule();
                    } else {
                        self.timer.cancel();
                    }
                }
            },
            FinderEvent::SetDisplay(display) => {
                self.display = display;
                self.show_branch_cells(grid);
            }
        }
    }

    /// Perform the pending timer steps, if they are due.
    pub fn on_timer(&mut self, now: Instant, grid: &mut Grid) {
        if self.timer.take_due(now) {
            self.step(grid);
            if self.mode == RunMode::Auto && !self.is_done() {
                self.timer.schedule();
            }
        }
        if let Some(merger) = &mut self.path_merger {
            merger.on_timer(now, grid);
        }
    }

    /// When the next timer step is due, for the finder or its merger.
    pub fn next_deadline(&self) -> Option<Instant> {
        timer::earliest(
            self.timer.deadline(),
            self.path_merger.as_ref().and_then(|m| m.next_deadline()),
        )
    }

    pub fn state(&self) -> FinderState {
        self.state
    }

    /// Current state as a dotted string, such as `finding.pathing`.
    pub fn state_path(&self) -> String {
        self.state.to_string()
    }

    /// Mode of the active machine: the merger once spawned, the finder before.
    pub fn mode(&self) -> RunMode {
        self.path_merger.as_ref().map_or(self.mode, |m| m.mode())
    }

    pub fn is_done(&self) -> bool {
        self.state == FinderState::Done
    }

    pub fn display(&self) -> FinderDisplay {
        self.display
    }

    pub fn branch_cell_ids(&self) -> &[CellId] {
        &self.branch_cell_ids
    }

    pub fn branch_nodes(&self) -> &BranchNodes {
        &self.branch_nodes
    }

    /// Walks between two branch cells, in both directions.
    pub fn current_paths(&self) -> &[Vec<CellId>] {
        &self.current_paths
    }

    /// Walks from a branch cell to a dead end.
    pub fn tails(&self) -> &[Vec<CellId>] {
        &self.tails
    }

    pub fn root_branch_cell(&self) -> Option<CellId> {
        self.root_branch_cell
    }

    pub fn current_cell(&self) -> Option<CellId> {
        self.current_cell
    }

    pub fn steps(&self) -> &[CellId] {
        self.steps.get()
    }

    pub fn path_merger(&self) -> Option<&PathMerger> {
        self.path_merger.as_ref()
    }

    /// Detach the merger from the finder.
    pub fn take_path_merger(&mut self) -> Option<PathMerger> {
        self.path_merger.take()
    }

    /// Perform one transition.
    pub fn step(&mut self, grid: &mut Grid) {
        if self.is_done() {
            debug!("Finder: already done");
            return;
        }
        self.iteration += 1;
        match self.state {
            FinderState::Done => (),
            FinderState::Finding(Finding::WillChangeRoot) => self.change_root(grid),
            FinderState::Finding(Finding::WillChangePath)
            | FinderState::Finding(Finding::WillChangeBranch) => self.change_path(grid),
            FinderState::Finding(Finding::Pathing) => self.follow_path(grid),
        }
        debug!("Finder: {} at {:?}", self.state, self.current_cell);
    }

    /// Use the next branch cell as root, or finish when they have all been used.
    fn change_root(&mut self, grid: &mut Grid) {
        self.clear_walk(grid);
        let Some(root) = self.unvisited_branch_cells.pop_front() else {
            self.finish(grid);
            return;
        };
        debug!("Finder: new root {}", grid.cell(root).key());

        // Directions already joined from the other end do not need to be walked again
        let known: [Option<CellId>; 4] = self.branch_nodes.get(&root).copied().unwrap_or_default();
        self.root_branch_cell = Some(root);
        self.unvisited_directions = grid
            .open_neighbors(root)
            .into_iter()
            .map(|(d, _)| d)
            .filter(|d| known[d.index()].is_none())
            .collect();
        grid.set_display(root, CellDisplay::Start);
        self.state = FinderState::Finding(Finding::WillChangePath);
    }

    /// Start walking in the next direction of the root.
    fn change_path(&mut self, grid: &mut Grid) {
        self.clear_walk(grid);
        let (Some(root), Some(direction)) = (
            self.root_branch_cell,
            self.unvisited_directions.pop_front(),
        ) else {
            self.state = FinderState::Finding(Finding::WillChangeRoot);
            return;
        };
        let Some(next) = grid.cell(root).neighbor(direction) else {
            self.state = FinderState::Finding(Finding::WillChangePath);
            return;
        };

        self.steps.clear();
        self.steps.push(root);
        self.went = Some(direction);
        self.enter(next, grid);
    }

    /// Walk one cell further along the corridor.
    fn follow_path(&mut self, grid: &mut Grid) {
        let Some(current) = self.current_cell else {
            self.state = FinderState::Finding(Finding::WillChangePath);
            return;
        };
        let previous: Option<CellId> = self.steps.get_previous();
        let forward: Option<CellId> = grid
            .open_neighbors(current)
            .into_iter()
            .map(|(_, n)| n)
            .find(|n| Some(*n) != previous);

        match forward {
            None => {
                debug!("Finder: dead end at {}", grid.cell(current).key());
                self.tails.push(self.steps.get().to_vec());
                self.state = FinderState::Finding(Finding::WillChangePath);
            }
            Some(next) if self.steps.contains(next) => {
                debug!("Finder: loop at {}", grid.cell(next).key());
                self.state = FinderState::Finding(Finding::WillChangePath);
            }
            Some(next) => {
                grid.set_display(current, CellDisplay::Mark);
                self.enter(next, grid);
            }
        }
    }

    /// Add the cell to the walk, and record the vector if the cell is a branch cell.
    fn enter(&mut self, cell: CellId, grid: &mut Grid) {
        self.steps.push(cell);
        self.current_cell = Some(cell);
        grid.set_display(cell, CellDisplay::Current);

        if self.branch_cells.contains(&cell) {
            self.arrive(cell, grid);
            self.state = FinderState::Finding(Finding::WillChangeBranch);
        } else {
            self.state = FinderState::Finding(Finding::Pathing);
        }
    }

    /// Record the branch cell reached from the root.
    fn arrive(&mut self, branch: CellId, grid: &mut Grid) {
        let Some(root) = self.root_branch_cell else {
            return;
        };
        let hash: VectorHash = VectorHash::new(root, branch);
        if branch == root || !self.visited_vectors.insert(hash) {
            debug!("Finder: {hash} already known");
            return;
        }
        debug!(
            "Finder: {} joins {} in {} steps",
            grid.cell(root).key(),
            grid.cell(branch).key(),
            self.steps.len()
        );

        if let Some(went) = self.went
            && let Some(slots) = self.branch_nodes.get_mut(&root)
        {
            slots[went.index()] = Some(branch);
        }
        if let Some(back) = self
            .steps
            .get_previous()
            .and_then(|p| grid.direction_between(branch, p))
            && let Some(slots) = self.branch_nodes.get_mut(&branch)
        {
            slots[back.index()] = Some(root);
        }

        self.current_paths.push(self.steps.get().to_vec());
        self.current_paths
            .push(self.steps.get().iter().rev().copied().collect());
        grid.set_display(branch, CellDisplay::End);
    }

    /// Spawn the merger.
    fn finish(&mut self, grid: &mut Grid) {
        self.state = FinderState::Done;
        self.timer.cancel();
        self.root_branch_cell = None;
        self.current_cell = None;
        self.went = None;

        let corridor: Option<Vec<CellId>> = if self.branch_cell_ids.is_empty() {
            Self::corridor(grid)
        } else {
            None
        };
        info!(
            "Finder: {} branch cells, {} vectors, {} tails",
            self.branch_cell_ids.len(),
            self.visited_vectors.len(),
            self.tails.len()
        );

        let mut merger: PathMerger = PathMerger::new(
            &self.branch_nodes,
            &self.current_paths,
            &self.tails,
            corridor,
            self.step_delay_ms,
        );
        if self.mode == RunMode::Auto {
            merger.send(MergerEvent::ToggleMode, grid);
        }
        self.path_merger = Some(merger);
    }

    /// Walk the path network from one of its ends. Used when it has no branch cell.
    fn corridor(grid: &Grid) -> Option<Vec<CellId>> {
        let open: Vec<CellId> = grid.open_cells();
        let start: CellId = open
            .iter()
            .copied()
            .find(|c| grid.open_neighbors(*c).len() <= 1)
            .or_else(|| open.first().copied())?;

        let mut path: Path = Path::new();
        let mut current: CellId = start;
        path.push(current);
        loop {
            let next: Option<CellId> = grid
                .open_neighbors(current)
                .into_iter()
                .map(|(_, n)| n)
                .find(|n| !path.contains(*n));
            match next {
                Some(n) => {
                    path.push(n);
                    current = n;
                }
                None => break,
            }
        }
        Some(path.get().to_vec())
    }

    /// Restore the display of the walked cells.
    fn clear_walk(&mut self, grid: &mut Grid) {
        for c in self.steps.get() {
            let display: CellDisplay = CellDisplay::from(grid.cell(*c).state);
            grid.set_display(*c, display);
        }
        self.steps.clear();
        self.current_cell = None;
        self.show_branch_cells(grid);
    }

    /// Apply the branch cell highlighting.
    fn show_branch_cells(&self, grid: &mut Grid) {
        for c in &self.branch_cell_ids {
            let display: CellDisplay = match self.display {
                FinderDisplay::BranchCells => CellDisplay::Mark,
                FinderDisplay::None => CellDisplay::from(grid.cell(*c).state),
            };
            grid.set_display(*c, display);
        }
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

    fn find(grid: &mut Grid) -> PathFinder {
        let mut finder: PathFinder = PathFinder::new(grid, 0);
        let mut guard: usize = 0;
        while !finder.is_done() {
            finder.send(FinderEvent::FinderStep, grid);
            guard += 1;
            assert!(guard < 10_000, "finder does not terminate");
        }
        finder
    }

    #[test]
    fn single_intersection_has_no_neighbor_branch() {
        // Plus sign with arms of two cells
        let mut grid: Grid = grid_from(
            "5:5/0,0,1,0,0,0,0,1,0,0,1,1,1,1,1,0,0,1,0,0,0,0,1,0,0",
        );
        let finder: PathFinder = find(&mut grid);

        assert_eq!(finder.branch_cell_ids(), &[12]);
        assert_eq!(finder.branch_nodes().get(&12), Some(&[None; 4]));
        assert!(finder.current_paths().is_empty());
        assert_eq!(finder.tails().len(), 4);
        assert!(finder.tails().iter().all(|t| t.len() == 3 && t[0] == 12));
        assert!(finder.path_merger().is_some());
    }

    #[test]
    fn nearest_branch_is_recorded_for_both_ends() {
        let mut grid: Grid = grid_from("5:3/1,0,0,0,1,1,1,1,1,1,1,0,0,0,1");
        let finder: PathFinder = find(&mut grid);

        assert_eq!(finder.branch_cell_ids(), &[5, 9]);
        assert_eq!(
            finder.branch_nodes().get(&5),
            Some(&[None, Some(9), None, None])
        );
        assert_eq!(
            finder.branch_nodes().get(&9),
            Some(&[Some(5), None, None, None])
        );
        assert_eq!(
            finder.current_paths(),
            &[vec![5, 6, 7, 8, 9], vec![9, 8, 7, 6, 5]]
        );
        assert_eq!(finder.tails().len(), 4);
    }

    #[test]
    fn walked_direction_is_used_for_bent_corridors() {
        // The corridor leaves the first junction to the right and enters the second from the top
        let mut grid: Grid = grid_from("4:4/1,0,0,0,1,1,1,0,1,0,1,0,0,1,1,1");
        let finder: PathFinder = find(&mut grid);

        assert_eq!(finder.branch_cell_ids(), &[4, 14]);
        let first: [Option<CellId>; 4] = finder.branch_nodes()[&4];
        let second: [Option<CellId>; 4] = finder.branch_nodes()[&14];
        assert_eq!(first[Direction::Right.index()], Some(14));
        assert_eq!(second[Direction::Top.index()], Some(4));
        assert_eq!(second[Direction::Left.index()], None);
    }

    #[test]
    fn loops_terminate() {
        let mut grid: Grid = grid_from("4:3/1,1,1,1,1,0,1,0,1,1,1,0");
        let finder: PathFinder = find(&mut grid);

        assert_eq!(finder.branch_cell_ids(), &[2]);
        assert_eq!(finder.tails(), &[vec![2, 3]]);
    }

    #[test]
    fn ring_without_junction_uses_the_corridor() {
        let mut grid: Grid = grid_from("3:3/1,1,1,1,0,1,1,1,1");
        let mut finder: PathFinder = find(&mut grid);
        assert!(finder.branch_cell_ids().is_empty());

        let mut guard: usize = 0;
        while finder.path_merger().is_some_and(|m| !m.is_done()) {
            finder.send(FinderEvent::FinderStep, &mut grid);
            guard += 1;
            assert!(guard < 100);
        }
        let merger: PathMerger = finder.take_path_merger().expect("merger spawned");
        assert_eq!(merger.longest_paths()[0].len(), 8);
    }

    #[test]
    fn branch_cells_display() {
        let mut grid: Grid = grid_from("5:3/1,0,0,0,1,1,1,1,1,1,1,0,0,0,1");
        let mut finder: PathFinder = PathFinder::new(&grid, 0);

        finder.send(FinderEvent::SetDisplay(FinderDisplay::BranchCells), &mut grid);
        assert_eq!(grid.cell(5).display, CellDisplay::Mark);
        assert_eq!(grid.cell(9).display, CellDisplay::Mark);
        assert_eq!(grid.cell(6).display, CellDisplay::Path);

        finder.send(FinderEvent::SetDisplay(FinderDisplay::None), &mut grid);
        assert_eq!(grid.cell(5).display, CellDisplay::Path);
        assert_eq!(finder.display().to_string(), "none");
    }

    #[test]
    fn mode_change_is_forwarded_to_the_merger() {
        let mut grid: Grid = grid_from("3:1/1,1,1");
        let mut finder: PathFinder = PathFinder::new(&grid, 0);

        finder.send(FinderEvent::FinderStep, &mut grid);
        assert!(finder.is_done());
        assert_eq!(finder.mode(), RunMode::Manual);

        finder.send(FinderEvent::ToggleMode, &mut grid);
        assert_eq!(finder.mode(), RunMode::Auto);
        assert!(finder.next_deadline().is_some());
        while let Some(deadline) = finder.next_deadline() {
            finder.on_timer(deadline, &mut grid);
        }
        assert!(finder.path_merger().is_some_and(|m| m.is_done()));
    }
}
