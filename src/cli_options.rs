/*
cli_options.rs

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

//! Process command-line options.
//!
//! Mazewalk generates a maze, or imports one, and then searches its longest path twice: with
//! the brute-forcer and with the path finder and merger.
//!
//! # Examples
//!
//! Generate a reproducible maze and print it with its longest path:
//!
//! ```
//! $ mazewalk --width 9 --height 5 --seed 3 --mode latest
//! ```
//!
//! Watch the machines step with a 20 ms delay:
//!
//! ```
//! $ mazewalk --animate --set stepDelayInMs=20
//! ```
//!
//! Analyze an exported maze and print the JSON report:
//!
//! ```
//! $ mazewalk --import 3:2/1,1,1,0,0,1 --json
//! ```

use clap::Parser;
use log::{debug, warn};
use std::env;
use std::path::PathBuf;

use mazewalk::draw::{self, Overlay};
use mazewalk::maze::generator::{GeneratorCommand, MazeGenerator};
use mazewalk::maze::grid::MAX_SIDE;
use mazewalk::maze::path_finder::FinderDisplay;
use mazewalk::maze::settings::{GrowMode, SettingUpdate, Settings};
use mazewalk::saver::maze::SaverMaze;
use mazewalk::saver::settings::SaverSettings;
use mazewalk::session::{Report, Session};

/// Generate mazes and search their longest path.
#[derive(Parser)]
#[command(about, long_about = None, version)]
struct Args {
    /// Number of columns
    #[arg(long, value_parser = side_parser())]
    width: Option<usize>,

    /// Number of rows
    #[arg(long, value_parser = side_parser())]
    height: Option<usize>,

    /// How the next cell to grow the maze from is selected
    #[arg(value_enum, short, long)]
    mode: Option<GrowMode>,

    /// Percentage of random selections in the "both" mode
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
    random: Option<u8>,

    /// Delay between two automatic steps, in milliseconds
    #[arg(long)]
    delay: Option<u64>,

    /// Seed for the random generator
    #[arg(long)]
    seed: Option<u64>,

    /// Settings file in JSON format
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Write the resulting settings to the settings file
    #[arg(long, default_value_t = false, requires = "settings")]
    save_settings: bool,

    /// Update a setting (for example stepDelayInMs=10). Can be repeated
    #[arg(long = "set", value_name = "KEY=VALUE")]
    updates: Vec<SettingUpdate>,

    /// Import a maze in the <cols>:<rows>/<codes> encoding
    #[arg(long, conflicts_with = "import_file")]
    import: Option<String>,

    /// Import a maze from a file
    #[arg(long)]
    import_file: Option<PathBuf>,

    /// Print the maze in the <cols>:<rows>/<codes> encoding
    #[arg(short, long, default_value_t = false)]
    export: bool,

    /// Save the maze to a file
    #[arg(long)]
    export_file: Option<PathBuf>,

    /// Run the machines with their timers and draw each step
    #[arg(short, long, default_value_t = false)]
    animate: bool,

    /// Highlight the branch cells found by the path finder
    #[arg(long, default_value_t = false)]
    branch_cells: bool,

    /// Print the report in JSON format
    #[arg(short, long, default_value_t = false)]
    json: bool,

    /// Maximum number of steps (or timer wake ups with --animate)
    #[arg(long, default_value_t = 50_000_000)]
    max_steps: usize,

    /// Enable debug messages
    #[arg(short, long, default_value_t = false)]
    debug: bool,
}

/// Accept grid sides between 1 and [`MAX_SIDE`].
fn side_parser() -> clap::builder::RangedU64ValueParser<usize> {
    clap::builder::RangedU64ValueParser::<usize>::new().range(1..=MAX_SIDE as u64)
}

impl Args {
    /// Setting updates from the dedicated options.
    fn option_updates(&self) -> Vec<SettingUpdate> {
        [
            self.width.map(SettingUpdate::Width),
            self.height.map(SettingUpdate::Height),
            self.mode.map(SettingUpdate::Mode),
            self.random.map(SettingUpdate::Random),
            self.delay.map(SettingUpdate::StepDelayInMs),
            self.seed.map(|s| SettingUpdate::Seed(Some(s))),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Parse and process command-line options.
///
/// Return the exit code.
pub fn parse() -> u8 {
    let args: Args = Args::parse();

    if args.debug {
        unsafe {
            env::set_var("RUST_LOG", "debug");
        }
    }
    env_logger::init();

    //
    // Settings: defaults, then the settings file, then the options
    //
    let saver_settings: Option<SaverSettings> =
        args.settings.as_deref().map(SaverSettings::new);
    let mut settings: Settings = Settings::default();
    if let Some(saver) = &saver_settings {
        match saver.get_settings() {
            Ok(Some(s)) => settings = s,
            Ok(None) => debug!("No settings file, using the defaults"),
            Err(e) => {
                eprintln!("Cannot read {}: {e}", saver.path().display());
                return 1;
            }
        }
    }
    for update in args.option_updates() {
        settings.apply(&update);
    }

    let mut session: Session = Session::new(settings);
    for update in &args.updates {
        session.send(GeneratorCommand::UpdateSettings(*update));
    }

    if args.save_settings
        && let Some(saver) = &saver_settings
        && let Err(e) = saver.save_settings(session.generator().settings())
    {
        eprintln!("Cannot save {}: {e}", saver.path().display());
        return 1;
    }

    //
    // Import
    //
    if let Some(encoded) = &args.import
        && let Err(e) = session.generator_mut().import_str(encoded)
    {
        eprintln!("Cannot import the maze: {e}");
        return 1;
    }
    if let Some(file) = &args.import_file {
        match SaverMaze::new(file).get_states() {
            Ok(Some(states)) => session.send(GeneratorCommand::Import(states)),
            Ok(None) => {
                eprintln!("{}: no such file", file.display());
                return 1;
            }
            Err(e) => {
                eprintln!("Cannot import {}: {e}", file.display());
                return 1;
            }
        }
    }

    //
    // Generate and analyze
    //
    if args.branch_cells {
        session
            .generator_mut()
            .set_finder_display(FinderDisplay::BranchCells);
    }
    if args.animate {
        session.send(GeneratorCommand::Run);
        session.run_until_idle(args.max_steps, |generator| {
            print!("\x1b[2J\x1b[H{}", frame(generator));
        });
    } else {
        session.step_to_completion(args.max_steps);
    }
    if !session.is_finished() {
        warn!("Stopped after {} steps", args.max_steps);
        session.send(GeneratorCommand::Pause);
    }

    if let Some(file) = &args.export_file
        && let Err(e) = SaverMaze::new(file).save_grid(session.generator().grid())
    {
        eprintln!("Cannot save {}: {e}", file.display());
        return 1;
    }

    //
    // Print the results
    //
    let report: Report = session.report();
    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("Cannot build the report: {e}");
                return 1;
            }
        }
        return 0;
    }

    let grid = session.generator().grid();
    print!("{}", draw::states(grid, None));
    if args.export {
        println!("\n{}", report.maze);
    }
    for (name, analysis) in [
        ("Brute-forcer", &report.brute_forcer),
        ("Path merger", &report.path_merger),
    ] {
        let Some(analysis) = analysis else {
            println!("\n{name}: not started");
            continue;
        };
        println!(
            "\n{name}: {}, longest path has {} cells ({} paths, {} iterations)",
            analysis.state,
            analysis.longest_length,
            analysis.longest_paths.len(),
            analysis.iterations
        );
        if let Some(path) = analysis.longest_paths.first() {
            print!("{}", draw::states(grid, Some(&Overlay::with_path(path))));
        }
    }
    0
}

/// Draw the grid and the state of the machines.
fn frame(generator: &MazeGenerator) -> String {
    let mut overlay: Overlay = Overlay::default();
    let mut lines: Vec<String> = vec![format!("generator: {}", generator.state_path())];

    if let Some(analyzers) = generator.analyzers() {
        let brute_forcer = &analyzers.brute_forcer;
        let finder = &analyzers.path_finder;
        lines.push(format!("brute-forcer: {}", brute_forcer.state_path()));
        match finder.path_merger() {
            Some(merger) => {
                lines.push(format!("path merger: {}", merger.state_path()));
                if let Some(v) = merger.current_vector() {
                    overlay.path = v.steps.clone();
                }
                if let Some(v) = merger.next_vector().or(merger.last_merged_vector()) {
                    overlay.root = Some(v.start);
                    overlay.current = Some(v.end);
                }
            }
            None => {
                lines.push(format!("path finder: {}", finder.state_path()));
                overlay.root = finder.root_branch_cell();
                overlay.current = finder.current_cell();
            }
        }
        if !brute_forcer.is_done() {
            overlay.root = brute_forcer.root_cell();
            overlay.current = brute_forcer.current_cell();
            overlay.path = brute_forcer.steps().to_vec();
        }
    } else {
        overlay.current = generator.current_cell();
    }

    format!(
        "{}{}\n",
        draw::displays(generator.grid(), Some(&overlay)),
        lines.join("\n")
    )
}
