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

//! src/config/settings.rs
//!
//! Runtime settings
//!
//! Every setting has a built-in default and can be overridden through a
//! `SYMBOARD_*` environment variable. Empty variables count as unset.
//!
//! | Setting                  | Default          | Variable                      |
//! |--------------------------|------------------|-------------------------------|
//! | `states_dir`             | `./states`       | `SYMBOARD_STATES_DIR`         |
//! | `keylayouts_dir`         | `./keylayouts`   | `SYMBOARD_KEYLAYOUTS_DIR`     |
//! | `keylayouts_file_suffix` | `yaml`           | `SYMBOARD_KEYLAYOUTS_SUFFIX`  |
//! | `default_output_path`    | `./a.keylayout`  | `SYMBOARD_OUTPUT_PATH`        |
//! | `output_delimiter`       | `,`              | `SYMBOARD_OUTPUT_DELIMITER`   |
//! | `default_terminator`     | a space          | `SYMBOARD_DEFAULT_TERMINATOR` |

use std::path::PathBuf;

use crate::core::state::{DEFAULT_STATE_TERMINATOR, OUTPUT_DELIMITER};

pub const DEFAULT_STATES_DIR: &str = "./states";
pub const DEFAULT_KEYLAYOUTS_DIR: &str = "./keylayouts";
pub const DEFAULT_KEYLAYOUTS_SUFFIX: &str = "yaml";
pub const DEFAULT_OUTPUT_PATH: &str = "./a.keylayout";

/// Extension every written keylayout file carries
pub const KEYLAYOUT_EXTENSION: &str = "keylayout";

pub const ENV_STATES_DIR: &str = "SYMBOARD_STATES_DIR";
pub const ENV_KEYLAYOUTS_DIR: &str = "SYMBOARD_KEYLAYOUTS_DIR";
pub const ENV_KEYLAYOUTS_SUFFIX: &str = "SYMBOARD_KEYLAYOUTS_SUFFIX";
pub const ENV_OUTPUT_PATH: &str = "SYMBOARD_OUTPUT_PATH";
pub const ENV_OUTPUT_DELIMITER: &str = "SYMBOARD_OUTPUT_DELIMITER";
pub const ENV_DEFAULT_TERMINATOR: &str = "SYMBOARD_DEFAULT_TERMINATOR";

/// Where inputs live and how they are interpreted
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settings {
    /// Directory of state definition files
    pub states_dir: PathBuf,

    /// Directory of base layout files
    pub keylayouts_dir: PathBuf,

    /// Extension of base layout files, without the dot
    pub keylayouts_file_suffix: String,

    /// Output path used when the caller does not name one
    pub default_output_path: PathBuf,

    /// Separator of `lower`/`upper` output lists
    pub output_delimiter: String,

    /// Terminator for states that do not declare one
    pub default_terminator: String,

    /// Version written into generated files
    pub version: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            states_dir: expand_path(DEFAULT_STATES_DIR),
            keylayouts_dir: expand_path(DEFAULT_KEYLAYOUTS_DIR),
            keylayouts_file_suffix: DEFAULT_KEYLAYOUTS_SUFFIX.to_string(),
            default_output_path: expand_path(DEFAULT_OUTPUT_PATH),
            output_delimiter: OUTPUT_DELIMITER.to_string(),
            default_terminator: DEFAULT_STATE_TERMINATOR.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Settings {
    /// Reads overrides from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`, falling back to the defaults
    ///
    /// # Example
    /// ```
    /// use symboard::config::Settings;
    ///
    /// let settings = Settings::from_lookup(|key| match key {
    ///     "SYMBOARD_OUTPUT_DELIMITER" => Some(";".to_string()),
    ///     _ => None,
    /// });
    /// assert_eq!(settings.output_delimiter, ";");
    /// assert_eq!(settings.keylayouts_file_suffix, "yaml");
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Self {
            states_dir: value(ENV_STATES_DIR)
                .map(|v| expand_path(&v))
                .unwrap_or(defaults.states_dir),
            keylayouts_dir: value(ENV_KEYLAYOUTS_DIR)
                .map(|v| expand_path(&v))
                .unwrap_or(defaults.keylayouts_dir),
            keylayouts_file_suffix: value(ENV_KEYLAYOUTS_SUFFIX)
                .map(|v| v.trim_start_matches('.').to_string())
                .unwrap_or(defaults.keylayouts_file_suffix),
            default_output_path: value(ENV_OUTPUT_PATH)
                .map(|v| expand_path(&v))
                .unwrap_or(defaults.default_output_path),
            output_delimiter: value(ENV_OUTPUT_DELIMITER).unwrap_or(defaults.output_delimiter),
            default_terminator: value(ENV_DEFAULT_TERMINATOR)
                .unwrap_or(defaults.default_terminator),
            version: defaults.version,
        }
    }

    /// Replaces the states directory
    pub fn with_states_dir(mut self, dir: impl AsRef<str>) -> Self {
        self.states_dir = expand_path(dir.as_ref());
        self
    }

    /// Replaces the base layouts directory
    pub fn with_keylayouts_dir(mut self, dir: impl AsRef<str>) -> Self {
        self.keylayouts_dir = expand_path(dir.as_ref());
        self
    }
}

/// Expands a leading `~` to the home directory
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}
