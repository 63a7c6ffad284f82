/*
settings.rs

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

//! Maze generator settings.
//!
//! [`Settings`] objects are read from a JSON file (see [`crate::saver::settings`]), from the
//! command line, and updated one key at a time with [`SettingUpdate`] objects.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use strum_macros::Display;

use super::grid::MAX_SIDE;

/// How the generator selects the next cell to grow the maze from.
#[derive(
    Serialize, Deserialize, Debug, Copy, Clone, Default, PartialEq, Eq, Hash, ValueEnum, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GrowMode {
    /// Last pushed cell (recursive backtracker).
    Latest,

    /// Uniformly random cell.
    Random,

    /// Random cell with a probability of `random` percent, otherwise the last pushed cell.
    #[default]
    Both,
}

/// Generator settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Number of columns.
    pub width: usize,

    /// Number of rows.
    pub height: usize,

    /// Cell selection policy.
    pub mode: GrowMode,

    /// Percentage of random selections in the [`GrowMode::Both`] mode.
    pub random: u8,

    /// Delay between two steps in automatic mode.
    pub step_delay_in_ms: u64,

    /// Seed for the random generator. A random seed is used when not set.
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 21,
            height: 15,
            mode: GrowMode::Both,
            random: 25,
            step_delay_in_ms: 50,
            seed: None,
        }
    }
}

impl Settings {
    /// Apply an update.
    pub fn apply(&mut self, update: &SettingUpdate) {
        match *update {
            SettingUpdate::Width(v) => self.width = v.clamp(1, MAX_SIDE),
            SettingUpdate::Height(v) => self.height = v.clamp(1, MAX_SIDE),
            SettingUpdate::Mode(v) => self.mode = v,
            SettingUpdate::Random(v) => self.random = v.min(100),
            SettingUpdate::StepDelayInMs(v) => self.step_delay_in_ms = v,
            SettingUpdate::Seed(v) => self.seed = v,
        }
    }
}

/// Type of errors.
#[derive(Debug, PartialEq)]
pub enum SettingError {
    /// The `key=value` string has no `=`.
    MissingValue(String),

    /// Unknown setting key.
    UnknownKey(String),

    /// The value cannot be parsed for the key.
    InvalidValue { key: String, value: String },
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SettingError::MissingValue(s) => write!(f, "expected key=value, got '{s}'"),
            SettingError::UnknownKey(k) => write!(f, "unknown setting '{k}'"),
            SettingError::InvalidValue { key, value } => {
                write!(f, "invalid value '{value}' for setting '{key}'")
            }
        }
    }
}

impl Error for SettingError {}

/// Update of one setting.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SettingUpdate {
    Width(usize),
    Height(usize),
    Mode(GrowMode),
    Random(u8),
    StepDelayInMs(u64),
    Seed(Option<u64>),
}

impl SettingUpdate {
    /// Setting key, as used in the settings file.
    pub fn key(&self) -> &'static str {
        match self {
            SettingUpdate::Width(_) => "width",
            SettingUpdate::Height(_) => "height",
            SettingUpdate::Mode(_) => "mode",
            SettingUpdate::Random(_) => "random",
            SettingUpdate::StepDelayInMs(_) => "stepDelayInMs",
            SettingUpdate::Seed(_) => "seed",
        }
    }

    /// Whether the grid must be rebuilt after the update.
    pub fn refreshes_grid(&self) -> bool {
        matches!(self, SettingUpdate::Width(_) | SettingUpdate::Height(_))
    }

    /// Build an update from a key and its value.
    pub fn parse(key: &str, value: &str) -> Result<Self, SettingError> {
        let invalid = || SettingError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        let value: &str = value.trim();
        match key.trim() {
            "width" => value.parse().map(SettingUpdate::Width).map_err(|_| invalid()),
            "height" => value.parse().map(SettingUpdate::Height).map_err(|_| invalid()),
            "mode" => <GrowMode as ValueEnum>::from_str(value, true)
                .map(SettingUpdate::Mode)
                .map_err(|_| invalid()),
            "random" => value
                .parse::<u8>()
                .ok()
                .filter(|v| *v <= 100)
                .map(SettingUpdate::Random)
                .ok_or_else(invalid),
            "stepDelayInMs" | "delay" => value
                .parse()
                .map(SettingUpdate::StepDelayInMs)
                .map_err(|_| invalid()),
            "seed" => {
                if value.eq_ignore_ascii_case("none") {
                    Ok(SettingUpdate::Seed(None))
                } else {
                    value
                        .parse()
                        .map(|v| SettingUpdate::Seed(Some(v)))
                        .map_err(|_| invalid())
                }
            }
            k => Err(SettingError::UnknownKey(k.to_string())),
        }
    }
}

impl FromStr for SettingUpdate {
    type Err = SettingError;

    /// Parse a `key=value` string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| SettingError::MissingValue(s.to_string()))?;
        SettingUpdate::parse(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_key_value() {
        assert_eq!(
            "width=12".parse::<SettingUpdate>(),
            Ok(SettingUpdate::Width(12))
        );
        assert_eq!(
            "mode=RANDOM".parse::<SettingUpdate>(),
            Ok(SettingUpdate::Mode(GrowMode::Random))
        );
        assert_eq!(
            "seed=none".parse::<SettingUpdate>(),
            Ok(SettingUpdate::Seed(None))
        );
        assert_eq!(
            "stepDelayInMs=5".parse::<SettingUpdate>(),
            Ok(SettingUpdate::StepDelayInMs(5))
        );
        assert_eq!(
            "random=150".parse::<SettingUpdate>(),
            Err(SettingError::InvalidValue {
                key: "random".to_string(),
                value: "150".to_string()
            })
        );
        assert_eq!(
            "colour=red".parse::<SettingUpdate>(),
            Err(SettingError::UnknownKey("colour".to_string()))
        );
        assert!(matches!(
            "width".parse::<SettingUpdate>(),
            Err(SettingError::MissingValue(_))
        ));
    }

    #[test]
    fn only_dimensions_refresh_the_grid() {
        assert!(SettingUpdate::Width(3).refreshes_grid());
        assert!(SettingUpdate::Height(3).refreshes_grid());
        assert!(!SettingUpdate::Random(3).refreshes_grid());
        assert!(!SettingUpdate::StepDelayInMs(3).refreshes_grid());
    }

    #[test]
    fn settings_json_uses_camel_case_and_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"width": 8, "stepDelayInMs": 0, "mode": "latest"}"#)
                .expect("valid settings");

        assert_eq!(settings.width, 8);
        assert_eq!(settings.height, Settings::default().height);
        assert_eq!(settings.step_delay_in_ms, 0);
        assert_eq!(settings.mode, GrowMode::Latest);

        let mut settings: Settings = settings;
        settings.apply(&SettingUpdate::Random(200));
        assert_eq!(settings.random, 100);
        settings.apply(&SettingUpdate::Width(usize::MAX));
        assert_eq!(settings.width, MAX_SIDE);
        settings.apply(&SettingUpdate::Height(0));
        assert_eq!(settings.height, 1);
    }
}
