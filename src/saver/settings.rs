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

//! Save and restore the generator settings.
//!
//! The saved object is a serialization of the [`Settings`] object in JSON format by using
//! [`serde`]. Missing keys take their default value.

use log::debug;
use std::error::Error;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::maze::settings::Settings;

/// Object to save and restore the settings.
pub struct SaverSettings {
    /// Path to the settings file.
    save_file: PathBuf,
}

impl SaverSettings {
    /// Create a [`SaverSettings`] object for the given file.
    pub fn new(file: &Path) -> Self {
        debug!("Settings file: {file:?}");
        Self {
            save_file: file.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.save_file
    }

    /// Retrieve the [`Settings`] object from the settings file.
    ///
    /// Return None if the settings file does not exist.
    pub fn get_settings(&self) -> Result<Option<Settings>, Box<dyn Error>> {
        let file: File = match File::open(&self.save_file) {
            Ok(f) => f,
            Err(error) => match error.kind() {
                ErrorKind::NotFound => return Ok(None),
                _ => return Err(Box::new(error)),
            },
        };
        let reader: BufReader<File> = BufReader::new(file);
        let settings: Settings = serde_json::from_reader(reader)?;
        Ok(Some(settings))
    }

    /// Save the provided [`Settings`] object.
    pub fn save_settings(&self, settings: &Settings) -> Result<(), Box<dyn Error>> {
        let file: File = File::create(&self.save_file)?;
        let mut writer: BufWriter<File> = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, settings)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::settings::GrowMode;
    use std::env;
    use std::fs;

    #[test]
    fn save_and_restore() {
        let mut file: PathBuf = env::temp_dir();
        file.push(format!("mazewalk-settings-{}.json", std::process::id()));
        let _ = fs::remove_file(&file);
        let saver: SaverSettings = SaverSettings::new(&file);

        assert!(saver.get_settings().expect("missing file is not an error").is_none());

        let settings: Settings = Settings {
            width: 9,
            mode: GrowMode::Latest,
            seed: Some(12),
            ..Default::default()
        };
        saver.save_settings(&settings).expect("writable file");
        assert_eq!(saver.get_settings().expect("valid file"), Some(settings));

        fs::write(saver.path(), "{ not json").expect("writable file");
        assert!(saver.get_settings().is_err());

        fs::remove_file(&file).expect("removable file");
    }
}
