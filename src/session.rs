/*
session.rs

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

//! Drive the machines of one maze.
//!
//! A [`Session`] object either steps the [`MazeGenerator`] and its children by hand, or sleeps
//! until the earliest timer deadline of the machine tree and fires the due machines.

use log::debug;
use serde::Serialize;
use std::thread;
use std::time::Instant;

use crate::maze::generator::{GeneratorCommand, MazeGenerator};
use crate::maze::grid::CellId;
use crate::maze::settings::Settings;

/// Result of one longest path search.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// State of the machine, such as `done`.
    pub state: String,

    /// Number of transitions performed.
    pub iterations: usize,

    /// Number of cells in the longest paths.
    pub longest_length: usize,

    /// Longest paths, as lists of cell identifiers.
    pub longest_paths: Vec<Vec<CellId>>,
}

/// Summary of the session, printed with `--json`.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub width: usize,
    pub height: usize,

    /// Maze in the export encoding.
    pub maze: String,

    /// State of the generator.
    pub state: String,
    pub brute_forcer: Option<AnalysisReport>,
    pub path_merger: Option<AnalysisReport>,
}

/// Manage a maze generator and its children.
#[derive(Debug)]
pub struct Session {
    generator: MazeGenerator,
}

impl Session {
    /// Create a [`Session`] object.
    pub fn new(settings: Settings) -> Self {
        Self {
            generator: MazeGenerator::new(settings),
        }
    }

    pub fn send(&mut self, command: GeneratorCommand) {
        self.generator.send(command);
    }

    pub fn generator(&self) -> &MazeGenerator {
        &self.generator
    }

    pub fn generator_mut(&mut self) -> &mut MazeGenerator {
        &mut self.generator
    }

    /// Whether the maze is complete and both searches are over.
    pub fn is_finished(&self) -> bool {
        self.generator.analyzers().is_some_and(|a| {
            a.brute_forcer.is_done() && a.path_finder.path_merger().is_some_and(|m| m.is_done())
        })
    }

    /// Step the generator until the maze is complete.
    ///
    /// Return the number of steps, at most `max_steps`.
    pub fn step_until_complete(&mut self, max_steps: usize) -> usize {
        let mut steps: usize = 0;
        while !self.generator.is_complete() && steps < max_steps {
            self.generator.send(GeneratorCommand::Step);
            steps += 1;
        }
        steps
    }

    /// Step all the machines until the maze is complete and both searches are over.
    ///
    /// Return the number of steps, at most `max_steps`.
    pub fn step_to_completion(&mut self, max_steps: usize) -> usize {
        let mut steps: usize = 0;
        while !self.is_finished() && steps < max_steps {
            self.generator.send(GeneratorCommand::Step);
            steps += 1;
        }
        debug!("Session: {steps} steps");
        steps
    }

    /// Run the machines with their timers until no timer is armed.
    ///
    /// The `frame` closure is called after each wake up, for example to draw the grid.
    /// Return the number of wake ups, at most `max_wakeups`.
    pub fn run_until_idle<F>(&mut self, max_wakeups: usize, mut frame: F) -> usize
    where
        F: FnMut(&MazeGenerator),
    {
        let mut wakeups: usize = 0;
        while wakeups < max_wakeups {
            let Some(deadline) = self.generator.next_deadline() else {
                break;
            };
            let now: Instant = Instant::now();
            if deadline > now {
                thread::sleep(deadline - now);
            }
            self.generator.on_timer(Instant::now());
            wakeups += 1;
            frame(&self.generator);
        }
        debug!("Session: idle after {wakeups} wake ups");
        wakeups
    }

    /// Build the summary of the session.
    pub fn report(&self) -> Report {
        let grid = self.generator.grid();
        let analysis = |state: String, iterations: usize, paths: &[Vec<CellId>]| AnalysisReport {
            state,
            iterations,
            longest_length: paths.first().map_or(0, Vec::len),
            longest_paths: paths.to_vec(),
        };

        let analyzers = self.generator.analyzers();
        Report {
            width: grid.width(),
            height: grid.height(),
            maze: self.generator.export(),
            state: self.generator.state_path(),
            brute_forcer: analyzers.map(|a| {
                analysis(
                    a.brute_forcer.state_path(),
                    a.brute_forcer.iteration,
                    a.brute_forcer.longest_paths(),
                )
            }),
            path_merger: analyzers
                .and_then(|a| a.path_finder.path_merger())
                .map(|m| analysis(m.state_path(), m.iteration, m.longest_paths())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::settings::GrowMode;

    fn settings(seed: u64) -> Settings {
        Settings {
            width: 7,
            height: 5,
            mode: GrowMode::Both,
            random: 50,
            step_delay_in_ms: 0,
            seed: Some(seed),
        }
    }

    #[test]
    fn manual_session() {
        let mut session: Session = Session::new(settings(9));

        session.step_until_complete(10_000);
        assert!(session.generator().is_complete());
        assert!(!session.is_finished());

        session.step_to_completion(1_000_000);
        assert!(session.is_finished());

        let report: Report = session.report();
        assert_eq!(report.state, "done");
        let brute: AnalysisReport = report.brute_forcer.expect("brute-forcer spawned");
        let merger: AnalysisReport = report.path_merger.expect("merger spawned");
        assert_eq!(brute.state, "done");
        assert_eq!(brute.longest_length, merger.longest_length);
    }

    #[test]
    fn timer_session_matches_manual_session() {
        let mut manual: Session = Session::new(settings(4));
        manual.step_to_completion(1_000_000);

        let mut timed: Session = Session::new(settings(4));
        timed.send(GeneratorCommand::Run);
        let mut frames: usize = 0;
        timed.run_until_idle(1_000_000, |_| frames += 1);

        assert!(timed.is_finished());
        assert!(frames > 0);
        assert_eq!(timed.report(), manual.report());
    }

    #[test]
    fn json_report() {
        let mut session: Session = Session::new(settings(1));
        session.step_until_complete(10_000);

        let json: String = serde_json::to_string(&session.report()).expect("serializable report");
        assert!(json.contains("\"bruteForcer\":{\"state\":\"atRoot\""));
        assert!(json.contains("\"pathMerger\":null"));
        assert!(json.starts_with("{\"width\":7,\"height\":5,\"maze\":\"7:5/"));
    }
}
