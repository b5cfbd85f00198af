// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! src/config/loader.rs
//!
//! Reading specifications, base layouts and state definitions from disk

use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, Settings};
use crate::core::state::parse_state_definitions;
use crate::core::{BaseLayouts, KeylayoutSpec, StateRepository};

/// Extensions recognised for state definition files
const STATE_FILE_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Reads and parses one YAML file
///
/// # Errors
/// - `ConfigError::NotFound` if the file does not exist
/// - `ConfigError::Io` if it cannot be read
/// - `ConfigError::Parse` if it is not valid YAML
pub fn parse_yaml_file(path: &Path) -> Result<Value, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Loads every state definition file in the states directory
///
/// Files are read in name order. When two files define the same state the
/// later one wins, with a warning.
///
/// # Errors
/// - `ConfigError::NotFound` if the directory does not exist
/// - `ConfigError::Parse` for a file that is not a mapping of states
/// - `ConfigError::InvalidState` for a state that cannot be built
pub fn load_states(settings: &Settings) -> Result<StateRepository, ConfigError> {
    let dir = &settings.states_dir;
    info!("Loading states from {}", dir.display());

    let mut repository = StateRepository::new();
    for path in files_with_extension(dir, STATE_FILE_EXTENSIONS)? {
        debug!(file = %path.display(), "Reading state definitions");

        let content = fs::read_to_string(&path)?;
        let definitions = parse_state_definitions(&content).map_err(|message| {
            ConfigError::Parse {
                path: path.clone(),
                message,
            }
        })?;

        for (name, definition) in definitions {
            let state = definition
                .build(&name, &settings.output_delimiter, &settings.default_terminator)
                .map_err(|source| ConfigError::InvalidState {
                    path: path.clone(),
                    source,
                })?;

            if repository.contains(&name) {
                warn!(state = %name, file = %path.display(), "State defined twice, keeping the later one");
            }
            debug!(state = %name, actions = state.action_to_output_map.len(), "Loaded state");
            repository.insert(state);
        }
    }

    info!("Loaded {} states", repository.len());
    Ok(repository)
}

/// Loads every base layout in the keylayouts directory
///
/// A layout's name is its file name without the extension, so
/// `keylayouts/iso.yaml` becomes the base layout `iso`.
///
/// # Errors
/// - `ConfigError::NotFound` if the directory does not exist
/// - `ConfigError::Parse` for a file that is not a valid layout
pub fn load_base_layouts(settings: &Settings) -> Result<BaseLayouts, ConfigError> {
    let dir = &settings.keylayouts_dir;
    info!("Loading base layouts from {}", dir.display());

    let suffix = settings.keylayouts_file_suffix.as_str();
    let mut layouts = BaseLayouts::new();

    for path in files_with_extension(dir, &[suffix])? {
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            warn!(file = %path.display(), "Skipping base layout with a non UTF-8 name");
            continue;
        };

        let spec = KeylayoutSpec::from_value(parse_yaml_file(&path)?).map_err(|e| {
            ConfigError::Parse {
                path: path.clone(),
                message: e.to_string(),
            }
        })?;

        debug!(layout = name, "Loaded base layout");
        layouts.insert(name, spec);
    }

    Ok(layouts)
}

/// Lists the regular files in `dir` with one of `extensions`, sorted
fn files_with_extension(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>, ConfigError> {
    if !dir.is_dir() {
        return Err(ConfigError::NotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.contains(&e));

        if path.is_file() && matches {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
