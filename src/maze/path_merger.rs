/*
path_merger.rs

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

//! Merge the vectors of the junction graph and rebuild the longest paths.
//!
//! The [`PathMerger`] starts from the vectors between adjacent branch cells, as discovered by
//! the [`super::path_finder::PathFinder`].
//! For each vector, a [`PointState`] lists the branch cells adjacent to its two endpoints that
//! have not been tried yet. One [`MergerEvent::MergerStep`] event tries one of them: the vector
//! is extended by the base vector toward that branch cell, and the merged vector is added when
//! it is not already known. Merged vectors get their own [`PointState`], so when no branch cell
//! remains to be tried, the map holds a vector for every chain of the junction graph.
//!
//! The longest paths are then rebuilt by adding the longest dead-end tails at both ends of
//! each vector.

use log::{debug, info};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::fmt;
use std::time::Instant;

use super::grid::{CellDisplay, CellId, Grid};
use super::path_finder::BranchNodes;
use super::timer::{RunMode, Timer};
use super::vector::{Vector, VectorHash};

/// Events accepted by the [`PathMerger`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MergerEvent {
    /// Perform one transition.
    MergerStep,

    /// Switch between manual and automatic stepping.
    ToggleMode,
}

/// Sub-states while merging.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Merging {
    /// Trying the branch cells of the current vector.
    Picking,

    /// A merged vector has just been added.
    WillChangeNext,

    /// A new current vector has just been selected.
    WillChangeCurrent,

    /// No branch cell remains to be tried.
    HasAllVectors,
}

/// States of the [`PathMerger`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MergerState {
    Merging(Merging),
    Done,
}

impl fmt::Display for MergerState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MergerState::Merging(Merging::Picking) => write!(f, "merging.picking"),
            MergerState::Merging(Merging::WillChangeNext) => write!(f, "merging.willChangeNext"),
            MergerState::Merging(Merging::WillChangeCurrent) => {
                write!(f, "merging.willChangeCurrent")
            }
            MergerState::Merging(Merging::HasAllVectors) => write!(f, "merging.hasAllVectors"),
            MergerState::Done => write!(f, "done"),
        }
    }
}

/// Branch cells still to try at both ends of a vector.
#[derive(Debug, Clone, Default)]
pub struct PointState {
    pub start_nodes: VecDeque<CellId>,
    pub end_nodes: VecDeque<CellId>,
}

impl PointState {
    pub fn is_exhausted(&self) -> bool {
        self.start_nodes.is_empty() && self.end_nodes.is_empty()
    }
}

/// [`PathMerger`] object.
#[derive(Debug)]
pub struct PathMerger {
    state: MergerState,
    mode: RunMode,
    timer: Timer,

    /// Nearest branch cell in each direction of each branch cell.
    branch_nodes: BranchNodes,

    /// Known vectors.
    vectors: BTreeMap<VectorHash, Vector>,

    /// Branch cells to try for the vectors that are not exhausted.
    points: BTreeMap<VectorHash, PointState>,

    /// Dead-end walks, from a branch cell to the dead end.
    tails: Vec<Vec<CellId>>,

    /// The whole path network when it has no branch cell.
    corridor: Option<Vec<CellId>>,

    current_vector: Option<VectorHash>,
    next_vector: Option<VectorHash>,
    last_merged_vector: Option<VectorHash>,

    /// Result, available in the [`MergerState::Done`] state.
    longest_paths: Vec<Vec<CellId>>,

    /// Number of transitions performed.
    pub iteration: usize,
}

impl PathMerger {
    /// Create a [`PathMerger`] object.
    ///
    /// `current_paths` are the walks between adjacent branch cells. When two walks join the
    /// same branch cells, only the first one is kept.
    pub fn new(
        branch_nodes: &BranchNodes,
        current_paths: &[Vec<CellId>],
        tails: &[Vec<CellId>],
        corridor: Option<Vec<CellId>>,
        step_delay_ms: u64,
    ) -> Self {
        let mut merger: PathMerger = Self {
            state: MergerState::Merging(Merging::Picking),
            mode: RunMode::Manual,
            timer: Timer::new(step_delay_ms),
            branch_nodes: branch_nodes.clone(),
            vectors: BTreeMap::new(),
            points: BTreeMap::new(),
            tails: tails.to_vec(),
            corridor,
            current_vector: None,
            next_vector: None,
            last_merged_vector: None,
            longest_paths: Vec::new(),
            iteration: 0,
        };
        for steps in current_paths {
            if let Some(vector) = Vector::new(steps.clone())
                && vector.start != vector.end
                && !merger.vectors.contains_key(&vector.hash)
            {
                merger.insert(vector);
            }
        }
        debug!(
            "Merger: {} vectors, {} tails",
            merger.vectors.len(),
            merger.tails.len()
        );
        merger
    }

    /// Process an event.
    pub fn send(&mut self, event: MergerEvent, grid: &mut Grid) {
        match event {
            MergerEvent::MergerStep => self.step(grid),
            MergerEvent::ToggleMode => {
                self.mode = self.mode.toggled();
                debug!("Merger: mode {}", self.mode);
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

    pub fn state(&self) -> MergerState {
        self.state
    }

    /// Current state as a dotted string, such as `merging.picking`.
    pub fn state_path(&self) -> String {
        self.state.to_string()
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn is_done(&self) -> bool {
        self.state == MergerState::Done
    }

    pub fn current_vector(&self) -> Option<&Vector> {
        self.current_vector.and_then(|h| self.vectors.get(&h))
    }

    pub fn next_vector(&self) -> Option<&Vector> {
        self.next_vector.and_then(|h| self.vectors.get(&h))
    }

    pub fn last_merged_vector(&self) -> Option<&Vector> {
        self.last_merged_vector.and_then(|h| self.vectors.get(&h))
    }

    /// Known vectors.
    pub fn vectors(&self) -> impl Iterator<Item = &Vector> {
        self.vectors.values()
    }

    /// Number of vectors that still have branch cells to try.
    pub fn num_open_points(&self) -> usize {
        self.points.values().filter(|p| !p.is_exhausted()).count()
    }

    /// Longest paths. Ties are all kept, but a path and its reverse are reported once.
    pub fn longest_paths(&self) -> &[Vec<CellId>] {
        &self.longest_paths
    }

    /// Perform one transition.
    pub fn step(&mut self, grid: &mut Grid) {
        if self.is_done() {
            debug!("Merger: already done");
            return;
        }
        self.iteration += 1;
        match self.state {
            MergerState::Done => (),
            MergerState::Merging(Merging::HasAllVectors) => self.rebuild_paths(grid),
            MergerState::Merging(_) => {
                let extended: bool = match self.current_vector {
                    Some(hash) => self.extend(hash, grid),
                    None => false,
                };
                if !extended {
                    self.change_current(grid);
                }
            }
        }
        debug!("Merger: {} current {:?}", self.state, self.current_vector);
    }

    /// Add a vector and the branch cells to try at its endpoints.
    fn insert(&mut self, vector: Vector) {
        let nodes = |endpoint: CellId| -> VecDeque<CellId> {
            self.branch_nodes
                .get(&endpoint)
                .map(|slots| {
                    slots
                        .iter()
                        .flatten()
                        .copied()
                        .filter(|n| !vector.steps.contains(n))
                        .collect()
                })
                .unwrap_or_default()
        };
        let point: PointState = PointState {
            start_nodes: nodes(vector.start),
            end_nodes: nodes(vector.end),
        };
        self.points.insert(vector.hash, point);
        self.vectors.insert(vector.hash, vector);
    }

    /// Try the next branch cell of the vector.
    ///
    /// Return `false` when the vector has no branch cell left to try.
    fn extend(&mut self, hash: VectorHash, grid: &mut Grid) -> bool {
        let Some(vector) = self.vectors.get(&hash).cloned() else {
            return false;
        };
        let Some(point) = self.points.get_mut(&hash) else {
            return false;
        };
        let (endpoint, node) = if let Some(n) = point.start_nodes.pop_front() {
            (vector.start, n)
        } else if let Some(n) = point.end_nodes.pop_front() {
            (vector.end, n)
        } else {
            return false;
        };

        let next_hash: VectorHash = VectorHash::new(endpoint, node);
        self.next_vector = Some(next_hash);
        self.state = MergerState::Merging(Merging::Picking);

        let merged: Option<Vector> = self
            .vectors
            .get(&next_hash)
            .filter(|next| !vector.overlaps(next))
            .and_then(|next| vector.merge(next))
            .filter(|m| !self.vectors.contains_key(&m.hash));

        match merged {
            Some(m) => {
                debug!("Merger: {} + {} -> {}", hash, next_hash, m.hash);
                self.highlight(&m, grid);
                self.last_merged_vector = Some(m.hash);
                self.insert(m);
                self.state = MergerState::Merging(Merging::WillChangeNext);
            }
            None => debug!("Merger: {hash} + {next_hash} rejected"),
        }
        true
    }

    /// Drop the exhausted vectors and select a new current vector.
    fn change_current(&mut self, grid: &mut Grid) {
        self.points.retain(|_, p| !p.is_exhausted());

        let last: Option<&Vector> = self.last_merged_vector.and_then(|h| self.vectors.get(&h));
        let candidate: Option<VectorHash> = self
            .last_merged_vector
            .filter(|h| self.points.contains_key(h))
            .or_else(|| {
                let last: &Vector = last?;
                self.points
                    .keys()
                    .filter_map(|h| self.vectors.get(h))
                    .filter(|v| v.has_endpoint(last.start) || v.has_endpoint(last.end))
                    .max_by_key(|v| v.len())
                    .map(|v| v.hash)
            })
            .or_else(|| self.points.keys().next().copied());

        match candidate {
            Some(hash) => {
                self.current_vector = Some(hash);
                self.state = MergerState::Merging(Merging::WillChangeCurrent);
                if let Some(v) = self.vectors.get(&hash).cloned() {
                    self.highlight(&v, grid);
                }
            }
            None => {
                self.current_vector = None;
                self.next_vector = None;
                self.state = MergerState::Merging(Merging::HasAllVectors);
            }
        }
    }

    /// Return the longest tail at the branch cell that avoids the given cells.
    fn best_tail(&self, branch: CellId, avoid: &HashSet<CellId>) -> Option<&Vec<CellId>> {
        self.tails
            .iter()
            .filter(|t| t.first() == Some(&branch))
            .filter(|t| t.iter().skip(1).all(|c| !avoid.contains(c)))
            .max_by_key(|t| t.len())
    }

    /// Add the longest tails at both ends of the vector.
    fn full_path(&self, vector: &Vector) -> Vec<CellId> {
        let mut used: HashSet<CellId> = vector.steps.iter().copied().collect();
        let mut path: Vec<CellId> = Vec::new();

        if let Some(tail) = self.best_tail(vector.start, &used) {
            path.extend(tail.iter().skip(1).rev());
            used.extend(tail.iter().copied());
        }
        path.extend(vector.steps.iter());
        if let Some(tail) = self.best_tail(vector.end, &used) {
            path.extend(tail.iter().skip(1));
        }
        path
    }

    /// Join the two longest tails of a branch cell.
    fn branch_path(&self, branch: CellId) -> Option<Vec<CellId>> {
        let mut used: HashSet<CellId> = HashSet::from([branch]);
        let first: &Vec<CellId> = self.best_tail(branch, &used)?;
        used.extend(first.iter().copied());

        let mut path: Vec<CellId> = first.iter().rev().copied().collect();
        if let Some(second) = self.best_tail(branch, &used) {
            path.extend(second.iter().skip(1));
        }
        Some(path)
    }

    /// Rebuild the full paths and keep the longest ones.
    fn rebuild_paths(&mut self, grid: &mut Grid) {
        let mut candidates: Vec<Vec<CellId>> = self
            .vectors
            .values()
            .map(|v| self.full_path(v))
            .collect();

        let branches: Vec<CellId> = self.branch_nodes.keys().copied().collect();
        candidates.extend(branches.iter().filter_map(|b| self.branch_path(*b)));

        if let Some(corridor) = &self.corridor {
            candidates.push(corridor.clone());
        }

        let max: usize = candidates.iter().map(Vec::len).max().unwrap_or(0);
        self.longest_paths.clear();
        for path in candidates.into_iter().filter(|p| p.len() == max) {
            let known: bool = self
                .longest_paths
                .iter()
                .any(|p| *p == path || p.iter().rev().eq(path.iter()));
            if !known {
                self.longest_paths.push(path);
            }
        }

        self.state = MergerState::Done;
        self.timer.cancel();
        if let Some(path) = self.longest_paths.first() {
            for c in path {
                grid.set_display(*c, CellDisplay::Mark);
            }
        }
        info!(
            "Merger: {} vectors, longest path has {} cells ({} paths, {} iterations)",
            self.vectors.len(),
            max,
            self.longest_paths.len(),
            self.iteration
        );
    }

    /// Show the vector on the grid.
    fn highlight(&self, vector: &Vector, grid: &mut Grid) {
        for c in &vector.steps {
            grid.set_display(*c, CellDisplay::Current);
        }
        grid.set_display(vector.start, CellDisplay::Start);
        grid.set_display(vector.end, CellDisplay::End);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::codec::rebuild_maze;
    use crate::maze::path_finder::{FinderEvent, PathFinder};

    fn grid_from(encoded: &str) -> Grid {
        let states = rebuild_maze(encoded).expect("valid maze");
        Grid::from_states(&states).expect("rectangular maze")
    }

    /// Run the path finder and the merger to the end.
    fn merge(grid: &mut Grid) -> PathMerger {
        let mut finder: PathFinder = PathFinder::new(grid, 0);
        let mut guard: usize = 0;
        while finder.path_merger().is_none_or(|m| !m.is_done()) {
            finder.send(FinderEvent::FinderStep, grid);
            guard += 1;
            assert!(guard < 100_000, "finder and merger do not terminate");
        }
        finder.take_path_merger().expect("merger spawned")
    }

    /// Whether another merge would still add a vector.
    fn can_merge_again(merger: &PathMerger) -> bool {
        let vectors: Vec<&Vector> = merger.vectors().collect();
        vectors.iter().any(|a| {
            vectors.iter().any(|b| {
                a.hash != b.hash
                    && !a.overlaps(b)
                    && a.merge(b)
                        .is_some_and(|m| !vectors.iter().any(|v| v.hash == m.hash))
            })
        })
    }

    #[test]
    fn chained_branches_are_merged() {
        // Three junctions on one row
        let mut grid: Grid =
            grid_from("7:3/1,0,0,1,0,0,1,1,1,1,1,1,1,1,1,0,0,0,0,0,1");
        let merger: PathMerger = merge(&mut grid);

        let hashes: Vec<VectorHash> = merger.vectors().map(|v| v.hash).collect();
        assert_eq!(hashes.len(), 3);
        assert!(hashes.contains(&VectorHash::new(7, 13)));
        assert!(!can_merge_again(&merger));

        // Only the longest tails are stitched, so one path is rebuilt per vector
        assert_eq!(merger.longest_paths().len(), 1);
        let path: &Vec<CellId> = &merger.longest_paths()[0];
        assert_eq!(path.len(), 9);
        assert_eq!(&path[1..8], &[7, 8, 9, 10, 11, 12, 13]);
    }

    #[test]
    fn single_junction_joins_two_tails() {
        let mut grid: Grid = grid_from(
            "5:5/0,0,1,0,0,0,0,1,0,0,1,1,1,1,1,0,0,1,0,0,0,0,1,0,0",
        );
        let merger: PathMerger = merge(&mut grid);

        assert_eq!(merger.vectors().count(), 0);
        assert_eq!(merger.longest_paths().len(), 1);
        let path: &Vec<CellId> = &merger.longest_paths()[0];
        assert_eq!(path.len(), 5);
        assert_eq!(path[2], 12);
    }

    #[test]
    fn corridor_without_junction() {
        let mut grid: Grid = grid_from("3:2/1,1,1,0,0,1");
        let merger: PathMerger = merge(&mut grid);

        assert_eq!(merger.longest_paths(), &[vec![0, 1, 2, 5]]);
    }

    #[test]
    fn star_of_junctions_reaches_closure() {
        // Center junction with three junction arms, each arm ending in two dead ends
        let mut grid: Grid = grid_from(concat!(
            "7:7/",
            "0,0,1,0,1,0,0,",
            "0,0,1,1,1,0,0,",
            "1,0,0,1,0,0,1,",
            "1,1,1,1,1,1,1,",
            "1,0,0,0,0,0,1,",
            "0,0,0,0,0,0,0,",
            "0,0,0,0,0,0,0"
        ));
        let merger: PathMerger = merge(&mut grid);

        assert!(!can_merge_again(&merger));
        // 4 junctions in a tree: one vector per pair
        assert_eq!(merger.vectors().count(), 6);
        assert_eq!(merger.num_open_points(), 0);
        assert!(!merger.longest_paths().is_empty());
        assert!(merger.longest_paths().iter().all(|p| p.len() == 9));
    }

    #[test]
    fn step_states() {
        let mut grid: Grid =
            grid_from("7:3/1,0,0,1,0,0,1,1,1,1,1,1,1,1,1,0,0,0,0,0,1");
        let mut finder: PathFinder = PathFinder::new(&grid, 0);
        while !finder.is_done() {
            finder.send(FinderEvent::FinderStep, &mut grid);
        }
        let mut merger: PathMerger = finder.take_path_merger().expect("merger spawned");
        assert_eq!(merger.state_path(), "merging.picking");

        merger.send(MergerEvent::MergerStep, &mut grid);
        assert_eq!(merger.state_path(), "merging.willChangeCurrent");
        assert!(merger.current_vector().is_some());

        let mut seen_merge: bool = false;
        while !merger.is_done() {
            merger.send(MergerEvent::MergerStep, &mut grid);
            seen_merge |= merger.state() == MergerState::Merging(Merging::WillChangeNext);
        }
        assert!(seen_merge);
        assert_eq!(merger.state_path(), "done");
    }
}
